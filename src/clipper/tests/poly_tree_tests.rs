use crate::allocator::SimpleMemoryManager;
use crate::clipper::clipper::Clipper;
use crate::clipper::clipper_offset::ClipperOffset;
use crate::clipper::constants::UNASSIGNED;
use crate::clipper::enums::{ClipType, EndType, JoinType, PolyFillType, PolyType};
use crate::clipper::poly_tree::{closed_paths_from_poly_tree, open_paths_from_poly_tree, poly_tree_to_paths, PolyTree};
use crate::clipper_config::ClipperConfig;
use crate::geometry::point::{IntPoint, Path};
use crate::geometry::polygon::area;

fn square(left: i64, top: i64, size: i64) -> Path {
    vec![
        IntPoint::new(left, top),
        IntPoint::new(left + size, top),
        IntPoint::new(left + size, top + size),
        IntPoint::new(left, top + size),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concentric_squares_nest() {
        let mut manager = SimpleMemoryManager::new();
        let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

        clipper
            .add_paths(&[square(0, 0, 100), square(20, 20, 60), square(40, 40, 20)], PolyType::Subject, true)
            .unwrap();

        let tree = clipper.execute_tree(ClipType::Union, PolyFillType::EvenOdd).unwrap();

        assert_eq!(tree.total(), 3);
        assert_eq!(tree.child_count(), 1);

        let outer = tree.get_first().unwrap();
        let hole = outer.childs().next().unwrap();
        let island = hole.childs().next().unwrap();

        assert!(!outer.is_hole());
        assert!(hole.is_hole());
        assert!(!island.is_hole());
        assert_eq!(area(outer.contour()), 10000.0);
        assert_eq!(area(hole.contour()), -3600.0);
        assert_eq!(area(island.contour()), 400.0);
        assert_eq!(island.parent().map(|p| p.id()), Some(hole.id()));
        assert_eq!(island.child_count(), 0);

        let order: Vec<usize> = std::iter::successors(tree.get_first(), |node| node.get_next())
            .map(|node| node.id())
            .collect();

        assert_eq!(order, vec![outer.id(), hole.id(), island.id()]);
        assert_eq!(poly_tree_to_paths(tree).len(), 3);
        assert_eq!(closed_paths_from_poly_tree(tree).len(), 3);
        assert!(open_paths_from_poly_tree(tree).is_empty());
    }

    #[test]
    fn test_open_path_clipped_to_square() {
        let mut manager = SimpleMemoryManager::new();
        let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());
        let line = vec![IntPoint::new(-10, 50), IntPoint::new(110, 50)];

        clipper.add_path(&line, PolyType::Subject, false).unwrap();
        clipper.add_path(&square(0, 0, 100), PolyType::Clip, true).unwrap();

        assert!(clipper.has_open_paths());

        let tree = clipper.execute_tree(ClipType::Intersection, PolyFillType::NonZero).unwrap();
        let open = open_paths_from_poly_tree(tree);

        assert_eq!(open.len(), 1);
        assert!(closed_paths_from_poly_tree(tree).is_empty());

        let mut xs: Vec<i64> = open[0].iter().map(|pt| pt.x).collect();
        xs.sort();

        assert_eq!(xs, vec![0, 100]);
        assert!(open[0].iter().all(|pt| pt.y == 50));
        assert!(tree.get_first().unwrap().is_open());
    }

    #[test]
    fn test_negative_offset_tree_drops_enclosing_rect() {
        let mut manager = SimpleMemoryManager::new();
        let mut offset = ClipperOffset::with_defaults(&mut manager);

        offset
            .add_paths(&[square(0, 0, 100), square(200, 0, 100)], JoinType::Miter, EndType::ClosedPolygon)
            .unwrap();

        let tree = offset.execute_tree(-10.0).unwrap();

        assert_eq!(tree.child_count(), 2);
        assert_eq!(tree.total(), 2);

        for node in tree.childs() {
            assert!(!node.is_hole());
            assert_eq!(area(node.contour()), 6400.0);
        }
    }

    #[test]
    fn test_positive_offset_tree_keeps_hole() {
        let mut manager = SimpleMemoryManager::new();
        let mut offset = ClipperOffset::with_defaults(&mut manager);
        let mut hole = square(30, 30, 40);

        hole.reverse();

        offset.add_path(&square(0, 0, 100), JoinType::Miter, EndType::ClosedPolygon).unwrap();
        offset.add_path(&hole, JoinType::Miter, EndType::ClosedPolygon).unwrap();

        let tree = offset.execute_tree(5.0).unwrap();

        assert_eq!(tree.total(), 2);

        let outer = tree.get_first().unwrap();
        let inner = outer.childs().next().unwrap();

        assert!(inner.is_hole());
        assert_eq!(area(outer.contour()), 110.0 * 110.0);
        assert_eq!(area(inner.contour()), -30.0 * 30.0);
    }

    fn tree_with_nodes(manager: &mut SimpleMemoryManager, count: i64) -> PolyTree {
        let mut tree = PolyTree::new();

        for i in 0..count {
            tree.add_node(&mut *manager, square(i * 10, 0, 5), JoinType::Miter, EndType::ClosedPolygon)
                .unwrap();
        }

        tree
    }

    #[test]
    fn test_total_counts_every_node_when_roots_were_added_late() {
        let mut manager = SimpleMemoryManager::new();
        let mut tree = tree_with_nodes(&mut manager, 4);

        tree.add_child(UNASSIGNED, 3);
        tree.add_child(3, 1);
        tree.add_child(UNASSIGNED, 4);
        tree.add_child(4, 2);

        let walked = std::iter::successors(tree.get_first(), |node| node.get_next()).count();

        assert_eq!(tree.get_first().map(|node| node.id()), Some(3));
        assert_eq!(walked, 4);
        assert_eq!(tree.total(), walked);
        assert!(tree.node(1).is_hole());
        assert!(!tree.node(4).is_hole());

        tree.release(&mut manager);
        assert_eq!(tree.total(), 0);
        assert_eq!(manager.live_blocks(), 0);
    }

    #[test]
    fn test_total_skips_unwrapped_outer_node() {
        let mut manager = SimpleMemoryManager::new();
        let mut tree = tree_with_nodes(&mut manager, 3);

        tree.add_child(UNASSIGNED, 3);
        tree.add_child(3, 1);
        tree.add_child(3, 2);
        tree.unwrap_outer(&mut manager);

        let walked = std::iter::successors(tree.get_first(), |node| node.get_next()).count();

        assert_eq!(tree.get_first().map(|node| node.id()), Some(1));
        assert_eq!(walked, 2);
        assert_eq!(tree.total(), walked);
        assert!(tree.childs().all(|node| !node.is_hole()));

        tree.clear(&mut manager);
        assert_eq!(tree.total(), 0);
    }
}

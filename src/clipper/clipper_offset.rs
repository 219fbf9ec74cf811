use std::f64::consts::PI;

use crate::allocator::MemoryManager;
use crate::clipper::clipper::Clipper;
use crate::clipper::constants::{near_zero, DEF_ARC_TOLERANCE, DEF_MITER_LIMIT, TWO_PI, UNASSIGNED};
use crate::clipper::enums::{ClipType, EndType, JoinType, PolyFillType, PolyType};
use crate::clipper::poly_tree::PolyTree;
use crate::clipper_config::ClipperConfig;
use crate::error::ClipperError;
use crate::geometry::point::{DoublePoint, IntPoint, Path, Paths};
use crate::geometry::polygon::{area, orientation};
use crate::utils::round::round_to_i64;

/// Grows or shrinks paths by a fixed distance, then unions the raw offset
/// contours so the output never self-intersects.
pub struct ClipperOffset<'m> {
    clipper: Clipper<'m>,
    poly_nodes: PolyTree,
    dest_polys: Paths,
    src_poly: Path,
    dest_poly: Path,
    normals: Vec<DoublePoint>,
    delta: f64,
    sin_a: f64,
    sin: f64,
    cos: f64,
    miter_lim: f64,
    steps_per_rad: f64,
    /// Node id and vertex of the lowest closed polygon.
    lowest: Option<(usize, usize)>,
    pub miter_limit: f64,
    pub arc_tolerance: f64,
}

impl<'m> ClipperOffset<'m> {
    pub fn new(manager: &'m mut dyn MemoryManager, miter_limit: f64, arc_tolerance: f64) -> Self {
        Self {
            clipper: Clipper::new(manager, ClipperConfig::new()),
            poly_nodes: PolyTree::new(),
            dest_polys: Paths::new(),
            src_poly: Path::new(),
            dest_poly: Path::new(),
            normals: Vec::new(),
            delta: 0.0,
            sin_a: 0.0,
            sin: 0.0,
            cos: 0.0,
            miter_lim: 0.0,
            steps_per_rad: 0.0,
            lowest: None,
            miter_limit,
            arc_tolerance,
        }
    }

    pub fn with_defaults(manager: &'m mut dyn MemoryManager) -> Self {
        Self::new(manager, DEF_MITER_LIMIT, DEF_ARC_TOLERANCE)
    }

    pub fn memory_manager(&self) -> &dyn MemoryManager {
        self.clipper.memory_manager()
    }

    pub fn add_path(&mut self, path: &[IntPoint], join_type: JoinType, end_type: EndType) -> Result<(), ClipperError> {
        if path.is_empty() {
            return Ok(());
        }

        let mut high_i = path.len() - 1;

        if end_type == EndType::ClosedPolygon {
            while high_i > 0 && path[0] == path[high_i] {
                high_i -= 1;
            }
        }

        let mut contour = Path::with_capacity(high_i + 1);
        let mut k = 0;

        contour.push(path[0]);

        // drop consecutive duplicates and remember the lowest vertex
        for pt in &path[1..=high_i] {
            let last = contour[contour.len() - 1];

            if last != *pt {
                contour.push(*pt);

                if pt.y > contour[k].y || (pt.y == contour[k].y && pt.x < contour[k].x) {
                    k = contour.len() - 1;
                }
            }
        }

        if end_type == EndType::ClosedPolygon && contour.len() < 3 {
            return Ok(());
        }

        let lowest_pt = contour[k];
        let node = self
            .poly_nodes
            .add_node(&mut *self.clipper.manager, contour, join_type, end_type)?;

        self.poly_nodes.add_child(UNASSIGNED, node);

        if end_type != EndType::ClosedPolygon {
            return Ok(());
        }

        let is_lower = match self.lowest {
            None => true,
            Some((lowest_id, lowest_k)) => {
                let ip = self.poly_nodes.node_ref(lowest_id).contour[lowest_k];
                lowest_pt.y > ip.y || (lowest_pt.y == ip.y && lowest_pt.x < ip.x)
            }
        };

        if is_lower {
            self.lowest = Some((node, k));
        }

        Ok(())
    }

    pub fn add_paths(&mut self, paths: &[Path], join_type: JoinType, end_type: EndType) -> Result<(), ClipperError> {
        for path in paths {
            self.add_path(path, join_type, end_type)?;
        }

        Ok(())
    }

    /// Drops every added path and resets the memory manager.
    pub fn clear(&mut self) {
        self.poly_nodes.release(&mut *self.clipper.manager);
        self.lowest = None;
        self.clipper.clear();
    }

    fn root_ids(&self) -> Vec<usize> {
        self.poly_nodes.childs().map(|node| node.id()).collect()
    }

    /// Makes the lowest closed polygon, and with it every closed polygon,
    /// counter-clockwise in output orientation.
    fn fix_orientations(&mut self) {
        let ids = self.root_ids();
        let reverse_closed = match self.lowest {
            Some((id, _)) => area(&self.poly_nodes.node_ref(id).contour) < 0.0,
            None => false,
        };

        for id in ids {
            let node = self.poly_nodes.node_mut(id);

            let flip = if reverse_closed {
                node.end_type == EndType::ClosedPolygon
                    || (node.end_type == EndType::ClosedLine && orientation(&node.contour))
            } else {
                node.end_type == EndType::ClosedLine && !orientation(&node.contour)
            };

            if flip {
                node.contour.reverse();
            }
        }
    }

    pub fn execute(&mut self, delta: f64) -> Result<Paths, ClipperError> {
        self.prepare(delta)?;

        if delta > 0.0 {
            return self
                .clipper
                .execute_with(ClipType::Union, PolyFillType::Positive, PolyFillType::Positive);
        }

        self.add_outer_rect()?;

        let result = self
            .clipper
            .execute_with(ClipType::Union, PolyFillType::Negative, PolyFillType::Negative);

        self.clipper.config.reverse_solution = false;

        let mut solution = result?;

        if !solution.is_empty() {
            solution.remove(0);
        }

        Ok(solution)
    }

    /// Offsets into a tree. The tree lives until the next call on this offsetter.
    pub fn execute_tree(&mut self, delta: f64) -> Result<&PolyTree, ClipperError> {
        self.prepare(delta)?;

        if delta > 0.0 {
            return self
                .clipper
                .execute_tree_with(ClipType::Union, PolyFillType::Positive, PolyFillType::Positive);
        }

        self.add_outer_rect()?;

        let result = self
            .clipper
            .execute_tree_with(ClipType::Union, PolyFillType::Negative, PolyFillType::Negative)
            .map(|_| ());

        self.clipper.config.reverse_solution = false;
        result?;

        // drop the enclosing rectangle and lift what it contains
        self.clipper.poly_tree.unwrap_outer(&mut *self.clipper.manager);

        Ok(&self.clipper.poly_tree)
    }

    fn prepare(&mut self, delta: f64) -> Result<(), ClipperError> {
        self.clipper.release_input();
        self.fix_orientations();
        self.do_offset(delta);

        let dest_polys = std::mem::take(&mut self.dest_polys);

        self.clipper.add_paths(&dest_polys, PolyType::Subject, true)?;

        Ok(())
    }

    /// A negative offset is unioned inside a rectangle that encloses every
    /// contour, with the solution reversed so holes come out as outers.
    fn add_outer_rect(&mut self) -> Result<(), ClipperError> {
        let r = self.clipper.get_bounds();
        let outer = [
            IntPoint::new(r.left - 10, r.bottom + 10),
            IntPoint::new(r.right + 10, r.bottom + 10),
            IntPoint::new(r.right + 10, r.top - 10),
            IntPoint::new(r.left - 10, r.top - 10),
        ];

        self.clipper.add_path(&outer, PolyType::Subject, true)?;
        self.clipper.config.reverse_solution = true;

        Ok(())
    }

    fn push_offset(&mut self, pt: &IntPoint, x: f64, y: f64) {
        self.dest_poly.push(IntPoint::new(
            round_to_i64(pt.x as f64 + x),
            round_to_i64(pt.y as f64 + y),
        ));
    }

    fn do_offset(&mut self, delta: f64) {
        self.dest_polys.clear();
        self.delta = delta;

        let ids = self.root_ids();

        if near_zero(delta) {
            for id in ids {
                let node = self.poly_nodes.node_ref(id);

                if node.end_type == EndType::ClosedPolygon {
                    self.dest_polys.push(node.contour.clone());
                }
            }

            return;
        }

        self.miter_lim = if self.miter_limit > 2.0 {
            2.0 / (self.miter_limit * self.miter_limit)
        } else {
            0.5
        };

        let tolerance = if self.arc_tolerance <= 0.0 {
            DEF_ARC_TOLERANCE
        } else if self.arc_tolerance > delta.abs() * DEF_ARC_TOLERANCE {
            delta.abs() * DEF_ARC_TOLERANCE
        } else {
            self.arc_tolerance
        };

        let mut steps = PI / (1.0 - tolerance / delta.abs()).acos();

        if steps > delta.abs() * PI {
            steps = delta.abs() * PI;
        }

        self.sin = (TWO_PI / steps).sin();
        self.cos = (TWO_PI / steps).cos();
        self.steps_per_rad = steps / TWO_PI;

        if delta < 0.0 {
            self.sin = -self.sin;
        }

        self.dest_polys.reserve(ids.len() * 2);

        for id in ids {
            let node = self.poly_nodes.node_ref(id);
            let (join_type, end_type) = (node.join_type, node.end_type);

            self.src_poly.clone_from(&node.contour);

            let len = self.src_poly.len();

            if len == 0 || (delta <= 0.0 && (len < 3 || end_type != EndType::ClosedPolygon)) {
                continue;
            }

            self.dest_poly = Path::new();

            if len == 1 {
                self.offset_single_point(join_type, steps);
                continue;
            }

            self.normals.clear();
            self.normals.reserve(len);

            for j in 0..len - 1 {
                self.normals
                    .push(DoublePoint::unit_normal(&self.src_poly[j], &self.src_poly[j + 1]));
            }

            if end_type == EndType::ClosedLine || end_type == EndType::ClosedPolygon {
                self.normals
                    .push(DoublePoint::unit_normal(&self.src_poly[len - 1], &self.src_poly[0]));
            } else {
                let last = self.normals[len - 2];
                self.normals.push(last);
            }

            match end_type {
                EndType::ClosedPolygon => {
                    let mut k = len - 1;

                    for j in 0..len {
                        self.offset_point(j, &mut k, join_type);
                    }

                    self.flush_dest_poly();
                }
                EndType::ClosedLine => {
                    let mut k = len - 1;

                    for j in 0..len {
                        self.offset_point(j, &mut k, join_type);
                    }

                    self.flush_dest_poly();

                    // walk back along the other side
                    let n = self.normals[len - 1];

                    for j in (1..len).rev() {
                        self.normals[j] = self.normals[j - 1].reverse();
                    }

                    self.normals[0] = n.reverse();

                    k = 0;

                    for j in (0..len).rev() {
                        self.offset_point(j, &mut k, join_type);
                    }

                    self.flush_dest_poly();
                }
                _ => self.offset_open_path(len, join_type, end_type),
            }
        }
    }

    fn flush_dest_poly(&mut self) {
        let dest_poly = std::mem::take(&mut self.dest_poly);
        self.dest_polys.push(dest_poly);
    }

    fn offset_single_point(&mut self, join_type: JoinType, steps: f64) {
        let pt = self.src_poly[0];
        let delta = self.delta;

        if join_type == JoinType::Round {
            let (mut x, mut y) = (1.0, 0.0);
            let mut j = 1.0;

            while j <= steps {
                self.push_offset(&pt, x * delta, y * delta);

                let x2 = x;
                x = x * self.cos - self.sin * y;
                y = x2 * self.sin + y * self.cos;
                j += 1.0;
            }
        } else {
            let (mut x, mut y) = (-1.0, -1.0);

            for _ in 0..4 {
                self.push_offset(&pt, x * delta, y * delta);

                if x < 0.0 {
                    x = 1.0;
                } else if y < 0.0 {
                    y = 1.0;
                } else {
                    x = -1.0;
                }
            }
        }

        self.flush_dest_poly();
    }

    fn offset_open_path(&mut self, len: usize, join_type: JoinType, end_type: EndType) {
        let delta = self.delta;
        let mut k = 0;

        for j in 1..len - 1 {
            self.offset_point(j, &mut k, join_type);
        }

        let j = len - 1;
        let pt = self.src_poly[j];

        if end_type == EndType::OpenButt {
            let n = self.normals[j];

            self.push_offset(&pt, n.x * delta, n.y * delta);
            self.push_offset(&pt, -n.x * delta, -n.y * delta);
        } else {
            self.sin_a = 0.0;
            self.normals[j] = self.normals[j].reverse();

            if end_type == EndType::OpenSquare {
                self.do_square(j, len - 2);
            } else {
                self.do_round(j, len - 2);
            }
        }

        // walk back along the other side
        for j in (1..len).rev() {
            self.normals[j] = self.normals[j - 1].reverse();
        }

        self.normals[0] = self.normals[1].reverse();

        k = len - 1;

        for j in (1..len - 1).rev() {
            self.offset_point(j, &mut k, join_type);
        }

        let pt = self.src_poly[0];

        if end_type == EndType::OpenButt {
            let n = self.normals[0];

            self.push_offset(&pt, -n.x * delta, -n.y * delta);
            self.push_offset(&pt, n.x * delta, n.y * delta);
        } else {
            self.sin_a = 0.0;

            if end_type == EndType::OpenSquare {
                self.do_square(0, 1);
            } else {
                self.do_round(0, 1);
            }
        }

        self.flush_dest_poly();
    }

    fn offset_point(&mut self, j: usize, k: &mut usize, join_type: JoinType) {
        let (nj, nk) = (self.normals[j], self.normals[*k]);
        let pt = self.src_poly[j];
        let delta = self.delta;

        // cross product
        self.sin_a = nk.x * nj.y - nj.x * nk.y;

        if (self.sin_a * delta).abs() < 1.0 {
            // dot product
            let cos_a = nk.x * nj.x + nj.y * nk.y;

            if cos_a > 0.0 {
                // angle close to 0 degrees
                self.push_offset(&pt, nk.x * delta, nk.y * delta);
                return;
            }
        } else if self.sin_a > 1.0 {
            self.sin_a = 1.0;
        } else if self.sin_a < -1.0 {
            self.sin_a = -1.0;
        }

        if self.sin_a * delta < 0.0 {
            self.push_offset(&pt, nk.x * delta, nk.y * delta);
            self.dest_poly.push(pt);
            self.push_offset(&pt, nj.x * delta, nj.y * delta);
        } else {
            match join_type {
                JoinType::Miter => {
                    let r = 1.0 + (nj.x * nk.x + nj.y * nk.y);

                    if r >= self.miter_lim {
                        self.do_miter(j, *k, r);
                    } else {
                        self.do_square(j, *k);
                    }
                }
                JoinType::Square => self.do_square(j, *k),
                JoinType::Round => self.do_round(j, *k),
            }
        }

        *k = j;
    }

    fn do_square(&mut self, j: usize, k: usize) {
        let (nj, nk) = (self.normals[j], self.normals[k]);
        let pt = self.src_poly[j];
        let delta = self.delta;
        let dx = (self.sin_a.atan2(nk.x * nj.x + nk.y * nj.y) / 4.0).tan();

        self.push_offset(&pt, delta * (nk.x - nk.y * dx), delta * (nk.y + nk.x * dx));
        self.push_offset(&pt, delta * (nj.x + nj.y * dx), delta * (nj.y - nj.x * dx));
    }

    fn do_miter(&mut self, j: usize, k: usize, r: f64) {
        let (nj, nk) = (self.normals[j], self.normals[k]);
        let pt = self.src_poly[j];
        let q = self.delta / r;

        self.push_offset(&pt, (nk.x + nj.x) * q, (nk.y + nj.y) * q);
    }

    fn do_round(&mut self, j: usize, k: usize) {
        let (nj, nk) = (self.normals[j], self.normals[k]);
        let pt = self.src_poly[j];
        let delta = self.delta;
        let a = self.sin_a.atan2(nk.x * nj.x + nk.y * nj.y);
        let steps = round_to_i64(self.steps_per_rad * a.abs()).max(1);
        let (mut x, mut y) = (nk.x, nk.y);

        for _ in 0..steps {
            self.push_offset(&pt, x * delta, y * delta);

            let x2 = x;
            x = x * self.cos - self.sin * y;
            y = x2 * self.sin + y * self.cos;
        }

        self.push_offset(&pt, nj.x * delta, nj.y * delta);
    }
}

impl Drop for ClipperOffset<'_> {
    fn drop(&mut self) {
        self.poly_nodes.release(&mut *self.clipper.manager);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::SimpleMemoryManager;

    fn square(size: i64) -> Path {
        vec![
            IntPoint::new(0, 0),
            IntPoint::new(size, 0),
            IntPoint::new(size, size),
            IntPoint::new(0, size),
        ]
    }

    #[test]
    fn lowest_vertex_is_tracked_across_paths() {
        let mut manager = SimpleMemoryManager::new();
        let mut offset = ClipperOffset::with_defaults(&mut manager);

        offset.add_path(&square(10), JoinType::Square, EndType::ClosedPolygon).unwrap();
        offset
            .add_path(
                &[IntPoint::new(0, 50), IntPoint::new(10, 60), IntPoint::new(-10, 60)],
                JoinType::Square,
                EndType::ClosedPolygon,
            )
            .unwrap();

        assert_eq!(offset.lowest, Some((2, 2)));
    }

    #[test]
    fn duplicates_are_dropped_and_short_polygons_ignored() {
        let mut manager = SimpleMemoryManager::new();
        let mut offset = ClipperOffset::with_defaults(&mut manager);

        offset
            .add_path(
                &[IntPoint::new(0, 0), IntPoint::new(0, 0), IntPoint::new(5, 5), IntPoint::new(0, 0)],
                JoinType::Round,
                EndType::ClosedPolygon,
            )
            .unwrap();

        assert_eq!(offset.poly_nodes.child_count(), 0);

        offset
            .add_path(&[IntPoint::new(0, 0), IntPoint::new(5, 5)], JoinType::Round, EndType::OpenRound)
            .unwrap();

        assert_eq!(offset.poly_nodes.child_count(), 1);
    }

    #[test]
    fn zero_delta_returns_closed_input() {
        let mut manager = SimpleMemoryManager::new();
        let mut offset = ClipperOffset::with_defaults(&mut manager);

        offset.add_path(&square(10), JoinType::Miter, EndType::ClosedPolygon).unwrap();

        let solution = offset.execute(0.0).unwrap();

        assert_eq!(solution.len(), 1);
        assert_eq!(area(&solution[0]).abs(), 100.0);
    }

    #[test]
    fn square_join_grows_square() {
        let mut manager = SimpleMemoryManager::new();
        let mut offset = ClipperOffset::with_defaults(&mut manager);

        offset.add_path(&square(100), JoinType::Miter, EndType::ClosedPolygon).unwrap();

        let solution = offset.execute(10.0).unwrap();

        assert_eq!(solution.len(), 1);
        assert_eq!(area(&solution[0]), 120.0 * 120.0);
    }
}

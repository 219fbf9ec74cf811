use crate::allocator::MemoryManager;
use crate::clipper::clipper::Clipper;
use crate::clipper::enums::{ClipType, PolyFillType, PolyType};
use crate::clipper_config::ClipperConfig;
use crate::error::ClipperError;
use crate::geometry::point::{IntPoint, Path, Paths};
use crate::geometry::polygon::orientation;
use crate::utils::math::cycle_index;

/// Splits a self-intersecting polygon into simple ones.
pub fn simplify_polygon(
    manager: &mut dyn MemoryManager,
    path: &[IntPoint],
    fill_type: PolyFillType,
) -> Result<Paths, ClipperError> {
    let mut clipper = Clipper::new(manager, strictly_simple());

    clipper.add_path(path, PolyType::Subject, true)?;
    clipper.execute(ClipType::Union, fill_type)
}

pub fn simplify_polygons(
    manager: &mut dyn MemoryManager,
    paths: &[Path],
    fill_type: PolyFillType,
) -> Result<Paths, ClipperError> {
    let mut clipper = Clipper::new(manager, strictly_simple());

    clipper.add_paths(paths, PolyType::Subject, true)?;
    clipper.execute(ClipType::Union, fill_type)
}

fn strictly_simple() -> ClipperConfig {
    ClipperConfig {
        strictly_simple: true,
        ..ClipperConfig::new()
    }
}

fn points_are_close(pt1: &IntPoint, pt2: &IntPoint, dist_sqrd: f64) -> bool {
    let dx = pt1.x as f64 - pt2.x as f64;
    let dy = pt1.y as f64 - pt2.y as f64;

    dx * dx + dy * dy <= dist_sqrd
}

fn distance_from_line_sqrd(pt: &IntPoint, ln1: &IntPoint, ln2: &IntPoint) -> f64 {
    let a = ln1.y as f64 - ln2.y as f64;
    let b = ln2.x as f64 - ln1.x as f64;
    let c = a * pt.x as f64 + b * pt.y as f64 - (a * ln1.x as f64 + b * ln1.y as f64);

    c * c / (a * a + b * b)
}

/// True when the middle of the three points (along the dominant axis) lies
/// within `sqrt(dist_sqrd)` of the line through the other two.
fn slopes_near_collinear(pt1: &IntPoint, pt2: &IntPoint, pt3: &IntPoint, dist_sqrd: f64) -> bool {
    let by_x = (pt1.x - pt2.x).abs() > (pt1.y - pt2.y).abs();
    let coord = |pt: &IntPoint| if by_x { pt.x } else { pt.y };
    let (c1, c2, c3) = (coord(pt1), coord(pt2), coord(pt3));

    if (c1 > c2) == (c1 < c3) {
        distance_from_line_sqrd(pt1, pt2, pt3) < dist_sqrd
    } else if (c2 > c1) == (c2 < c3) {
        distance_from_line_sqrd(pt2, pt1, pt3) < dist_sqrd
    } else {
        distance_from_line_sqrd(pt3, pt1, pt2) < dist_sqrd
    }
}

/// Unlinks `op` and returns its predecessor, which has to be checked again.
fn exclude_op(op: usize, next: &mut [usize], prev: &mut [usize], done: &mut [bool]) -> usize {
    let result = prev[op];

    next[result] = next[op];
    prev[next[op]] = result;
    done[result] = false;

    result
}

/// Removes vertices that touch a neighbour, make a spike or lie (almost) on
/// the line through their neighbours. Returns an empty path when fewer than
/// three vertices survive.
pub fn clean_polygon(path: &[IntPoint], distance: f64) -> Path {
    let size = path.len();

    if size == 0 {
        return Path::new();
    }

    let mut next: Vec<usize> = (0..size).map(|i| cycle_index(i, size, 1)).collect();
    let mut prev: Vec<usize> = (0..size).map(|i| cycle_index(i, size, -1)).collect();
    let mut done = vec![false; size];
    let mut remaining = size;
    let dist_sqrd = distance * distance;

    let mut op = 0;

    while !done[op] && next[op] != prev[op] {
        let (p, c, n) = (&path[prev[op]], &path[op], &path[next[op]]);

        if points_are_close(c, p, dist_sqrd) {
            op = exclude_op(op, &mut next, &mut prev, &mut done);
            remaining -= 1;
        } else if points_are_close(p, n, dist_sqrd) {
            exclude_op(next[op], &mut next, &mut prev, &mut done);
            op = exclude_op(op, &mut next, &mut prev, &mut done);
            remaining -= 2;
        } else if slopes_near_collinear(p, c, n, dist_sqrd) {
            op = exclude_op(op, &mut next, &mut prev, &mut done);
            remaining -= 1;
        } else {
            done[op] = true;
            op = next[op];
        }
    }

    if remaining < 3 {
        return Path::new();
    }

    let mut result = Path::with_capacity(remaining);

    for _ in 0..remaining {
        result.push(path[op]);
        op = next[op];
    }

    result
}

pub fn clean_polygons(paths: &[Path], distance: f64) -> Paths {
    paths.iter().map(|path| clean_polygon(path, distance)).collect()
}

/// Quads swept by `pattern` between consecutive vertices of `path`.
fn minkowski(pattern: &[IntPoint], path: &[IntPoint], is_sum: bool, is_closed: bool) -> Paths {
    let pattern_count = pattern.len();
    let path_count = path.len();

    if pattern_count == 0 || path_count == 0 {
        return Paths::new();
    }

    let shifted: Paths = path
        .iter()
        .map(|origin| {
            pattern
                .iter()
                .map(|pt| {
                    if is_sum {
                        IntPoint::new(origin.x + pt.x, origin.y + pt.y)
                    } else {
                        IntPoint::new(origin.x - pt.x, origin.y - pt.y)
                    }
                })
                .collect()
        })
        .collect();

    let delta = usize::from(is_closed);
    let mut result = Paths::with_capacity((path_count + delta) * (pattern_count + 1));

    for i in 0..path_count - 1 + delta {
        let (a, b) = (&shifted[i % path_count], &shifted[(i + 1) % path_count]);

        for j in 0..pattern_count {
            let j2 = (j + 1) % pattern_count;
            let mut quad = vec![a[j], b[j], b[j2], a[j2]];

            if !orientation(&quad) {
                quad.reverse();
            }

            result.push(quad);
        }
    }

    result
}

fn union_non_zero(manager: &mut dyn MemoryManager, subject: &[Path], clip: &[Path]) -> Result<Paths, ClipperError> {
    let mut clipper = Clipper::new(manager, ClipperConfig::new());

    clipper.add_paths(subject, PolyType::Subject, true)?;
    clipper.add_paths(clip, PolyType::Clip, true)?;
    clipper.execute(ClipType::Union, PolyFillType::NonZero)
}

pub fn minkowski_sum(
    manager: &mut dyn MemoryManager,
    pattern: &[IntPoint],
    path: &[IntPoint],
    path_is_closed: bool,
) -> Result<Paths, ClipperError> {
    let quads = minkowski(pattern, path, true, path_is_closed);

    union_non_zero(manager, &quads, &[])
}

/// Sum over several paths; closed paths also contribute their own interior.
pub fn minkowski_sum_paths(
    manager: &mut dyn MemoryManager,
    pattern: &[IntPoint],
    paths: &[Path],
    path_is_closed: bool,
) -> Result<Paths, ClipperError> {
    let mut quads = Paths::new();
    let mut interiors = Paths::new();

    for path in paths {
        quads.extend(minkowski(pattern, path, true, path_is_closed));

        if path_is_closed {
            if let Some(origin) = pattern.first() {
                interiors.push(path.iter().map(|pt| IntPoint::new(pt.x + origin.x, pt.y + origin.y)).collect());
            }
        }
    }

    union_non_zero(manager, &quads, &interiors)
}

pub fn minkowski_diff(
    manager: &mut dyn MemoryManager,
    poly1: &[IntPoint],
    poly2: &[IntPoint],
) -> Result<Paths, ClipperError> {
    let quads = minkowski(poly1, poly2, false, true);

    union_non_zero(manager, &quads, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::SimpleMemoryManager;
    use crate::clipper::constants::DEF_CLEAN_DISTANCE;
    use crate::geometry::polygon::area;

    fn path(points: &[(i64, i64)]) -> Path {
        points.iter().map(|(x, y)| IntPoint::new(*x, *y)).collect()
    }

    fn total_area(paths: &Paths) -> f64 {
        paths.iter().map(|p| area(p)).sum()
    }

    #[test]
    fn clean_polygon_drops_near_duplicates_and_collinear_points() {
        let dirty = path(&[(0, 0), (50, 0), (100, 0), (100, 100), (100, 100), (0, 100)]);
        let cleaned = clean_polygon(&dirty, DEF_CLEAN_DISTANCE);

        assert_eq!(cleaned.len(), 4);
        assert_eq!(area(&cleaned).abs(), 10000.0);
    }

    #[test]
    fn clean_polygon_collapses_slivers() {
        let sliver = path(&[(0, 0), (100, 0), (0, 1)]);

        assert!(clean_polygon(&sliver, DEF_CLEAN_DISTANCE).is_empty());
        assert!(clean_polygon(&[], DEF_CLEAN_DISTANCE).is_empty());
    }

    #[test]
    fn bowtie_simplifies_into_two_triangles() {
        let mut manager = SimpleMemoryManager::new();
        let bowtie = path(&[(0, 0), (100, 100), (100, 0), (0, 100)]);
        let solution = simplify_polygon(&mut manager, &bowtie, PolyFillType::EvenOdd).unwrap();

        assert_eq!(solution.len(), 2);
        assert_eq!(total_area(&solution).abs(), 5000.0);
    }

    #[test]
    fn minkowski_sum_sweeps_pattern_along_segment() {
        let mut manager = SimpleMemoryManager::new();
        let pattern = path(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let segment = path(&[(0, 0), (100, 0)]);
        let solution = minkowski_sum(&mut manager, &pattern, &segment, false).unwrap();

        assert_eq!(solution.len(), 1);
        assert_eq!(total_area(&solution), 1100.0);
    }

    #[test]
    fn minkowski_sum_of_closed_path_fills_interior() {
        let mut manager = SimpleMemoryManager::new();
        let pattern = path(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let outline = vec![path(&[(0, 0), (100, 0), (100, 100), (0, 100)])];
        let solution = minkowski_sum_paths(&mut manager, &pattern, &outline, true).unwrap();

        assert_eq!(solution.len(), 1);
        assert_eq!(total_area(&solution), 110.0 * 110.0);
    }

    #[test]
    fn minkowski_diff_of_equal_squares_is_centered() {
        let mut manager = SimpleMemoryManager::new();
        let square = path(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let solution = minkowski_diff(&mut manager, &square, &square).unwrap();

        assert_eq!(solution.len(), 1);
        assert_eq!(total_area(&solution), 400.0);
    }
}

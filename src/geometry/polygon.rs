use crate::geometry::point::{IntPoint, Path, Paths};

/// Signed area, positive for counter-clockwise rings in a y-up frame.
pub fn area(path: &[IntPoint]) -> f64 {
    let size = path.len();
    if size < 3 {
        return 0.0;
    }

    let mut result = 0.0;
    let mut j = size - 1;

    for i in 0..size {
        result += (path[j].x as f64 + path[i].x as f64) * (path[j].y as f64 - path[i].y as f64);
        j = i;
    }

    -result * 0.5
}

pub fn orientation(path: &[IntPoint]) -> bool {
    area(path) >= 0.0
}

pub fn reverse_path(path: &mut Path) {
    path.reverse();
}

pub fn reverse_paths(paths: &mut Paths) {
    paths.iter_mut().for_each(reverse_path);
}

/// Returns 0 when `pt` is outside, 1 when inside and -1 when on the boundary.
pub fn point_in_polygon(pt: &IntPoint, path: &[IntPoint]) -> i32 {
    if path.len() < 3 {
        return 0;
    }

    point_in_ring(pt, path.iter().copied())
}

/// Winding test over any closed sequence of vertices; the closing edge is implied.
pub fn point_in_ring<I: IntoIterator<Item = IntPoint>>(pt: &IntPoint, ring: I) -> i32 {
    let mut iter = ring.into_iter();
    let first = match iter.next() {
        Some(point) => point,
        None => return 0,
    };

    let mut result = 0;
    let mut ip = first;

    for ip_next in iter.chain(std::iter::once(first)) {
        if ip_next.y == pt.y
            && (ip_next.x == pt.x || (ip.y == pt.y && ((ip_next.x > pt.x) == (ip.x < pt.x))))
        {
            return -1;
        }

        if (ip.y < pt.y) != (ip_next.y < pt.y) {
            if ip.x >= pt.x && ip_next.x > pt.x {
                result = 1 - result;
            } else if ip.x >= pt.x || ip_next.x > pt.x {
                let d = (ip.x - pt.x) as f64 * (ip_next.y - pt.y) as f64
                    - (ip_next.x - pt.x) as f64 * (ip.y - pt.y) as f64;

                if d == 0.0 {
                    return -1;
                }

                if (d > 0.0) == (ip_next.y > ip.y) {
                    result = 1 - result;
                }
            }
        }

        ip = ip_next;
    }

    result
}

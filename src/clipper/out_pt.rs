use crate::allocator::{MemoryManager, Pool};
use crate::clipper::constants::UNASSIGNED;
use crate::clipper::t_edge::get_dx;
use crate::error::ClipperError;
use crate::geometry::point::IntPoint;
use crate::geometry::polygon::point_in_ring;

/// Vertex of an output ring. `idx` names the owning output record.
#[derive(Debug, Clone, Copy)]
pub struct OutPt {
    pub idx: usize,
    pub pt: IntPoint,
    pub next: usize,
    pub prev: usize,
}

impl OutPt {
    pub fn new(idx: usize, pt: IntPoint) -> Self {
        Self {
            idx,
            pt,
            next: UNASSIGNED,
            prev: UNASSIGNED,
        }
    }
}

/// Walks a ring forward from `start` exactly once.
pub struct RingIter<'a> {
    pts: &'a Pool<OutPt>,
    start: usize,
    current: usize,
    done: bool,
}

impl<'a> Iterator for RingIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.done || self.start == UNASSIGNED {
            return None;
        }

        let result = self.current;
        self.current = self.pts[result].next;
        self.done = self.current == self.start;

        Some(result)
    }
}

pub fn ring(pts: &Pool<OutPt>, start: usize) -> RingIter<'_> {
    RingIter {
        pts,
        start,
        current: start,
        done: false,
    }
}

pub fn point_count(pts: &Pool<OutPt>, start: usize) -> usize {
    ring(pts, start).count()
}

pub fn reverse_links(pts: &mut Pool<OutPt>, start: usize) {
    if start == UNASSIGNED {
        return;
    }

    let mut pp1 = start;

    loop {
        let pp2 = pts[pp1].next;
        pts[pp1].next = pts[pp1].prev;
        pts[pp1].prev = pp2;
        pp1 = pp2;

        if pp1 == start {
            break;
        }
    }
}

/// Copies `op` into a new vertex spliced next to it.
pub fn dup_out_pt(
    pts: &mut Pool<OutPt>,
    manager: &mut dyn MemoryManager,
    op: usize,
    insert_after: bool,
) -> Result<usize, ClipperError> {
    let source = pts[op];
    let result = pts.alloc(manager, OutPt::new(source.idx, source.pt))?;

    if insert_after {
        pts[result].next = source.next;
        pts[result].prev = op;
        pts[source.next].prev = result;
        pts[op].next = result;
    } else {
        pts[result].prev = source.prev;
        pts[result].next = op;
        pts[source.prev].next = result;
        pts[op].prev = result;
    }

    Ok(result)
}

/// Signed area of the ring; positive when the ring read backwards is counter-clockwise.
pub fn ring_area(pts: &Pool<OutPt>, start: usize) -> f64 {
    let result: f64 = ring(pts, start)
        .map(|op| {
            let prev = &pts[pts[op].prev].pt;
            let curr = &pts[op].pt;
            (prev.x as f64 + curr.x as f64) * (prev.y as f64 - curr.y as f64)
        })
        .sum();

    result * 0.5
}

pub fn point_in_out_ring(pts: &Pool<OutPt>, pt: &IntPoint, start: usize) -> i32 {
    point_in_ring(pt, ring(pts, start).map(|op| pts[op].pt))
}

/// True when every vertex of ring 1 that is not on ring 2 lies inside it.
pub fn poly2_contains_poly1(pts: &Pool<OutPt>, out_pt1: usize, out_pt2: usize) -> bool {
    for op in ring(pts, out_pt1) {
        let res = point_in_out_ring(pts, &pts[op].pt, out_pt2);

        if res >= 0 {
            return res > 0;
        }
    }

    true
}

fn neighbour_dx(pts: &Pool<OutPt>, op: usize, forward: bool) -> f64 {
    let step = |p: usize| if forward { pts[p].next } else { pts[p].prev };
    let mut p = step(op);

    while pts[p].pt == pts[op].pt && p != op {
        p = step(p);
    }

    get_dx(&pts[op].pt, &pts[p].pt).abs()
}

pub fn first_is_bottom_pt(pts: &Pool<OutPt>, btm_pt1: usize, btm_pt2: usize) -> bool {
    let dx1p = neighbour_dx(pts, btm_pt1, false);
    let dx1n = neighbour_dx(pts, btm_pt1, true);
    let dx2p = neighbour_dx(pts, btm_pt2, false);
    let dx2n = neighbour_dx(pts, btm_pt2, true);

    if dx1p.max(dx1n) == dx2p.max(dx2n) && dx1p.min(dx1n) == dx2p.min(dx2n) {
        ring_area(pts, btm_pt1) > 0.0
    } else {
        (dx1p >= dx2p && dx1p >= dx2n) || (dx1n >= dx2p && dx1n >= dx2n)
    }
}

/// Lowest (largest y, then smallest x) vertex of the ring.
pub fn get_bottom_pt(pts: &Pool<OutPt>, start: usize) -> usize {
    let mut pp = start;
    let mut dups = UNASSIGNED;
    let mut p = pts[pp].next;

    while p != pp {
        if pts[p].pt.y > pts[pp].pt.y {
            pp = p;
            dups = UNASSIGNED;
        } else if pts[p].pt.y == pts[pp].pt.y && pts[p].pt.x <= pts[pp].pt.x {
            if pts[p].pt.x < pts[pp].pt.x {
                dups = UNASSIGNED;
                pp = p;
            } else if pts[p].next != pp && pts[p].prev != pp {
                dups = p;
            }
        }

        p = pts[p].next;
    }

    if dups != UNASSIGNED {
        // several vertices share the bottom point
        while dups != p {
            if !first_is_bottom_pt(pts, p, dups) {
                pp = dups;
            }

            dups = pts[dups].next;

            while pts[dups].pt != pts[pp].pt {
                dups = pts[dups].next;
            }
        }
    }

    pp
}

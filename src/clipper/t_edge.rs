use crate::allocator::Pool;
use crate::clipper::constants::{HORIZONTAL, SKIP, UNASSIGNED};
use crate::clipper::enums::{EdgeSide, PolyType};
use crate::geometry::point::IntPoint;
use crate::utils::round::round_to_i64;

/// One segment of an input contour. Links are pool indices, 0 meaning none.
#[derive(Debug, Clone)]
pub struct TEdge {
    pub bot: IntPoint,
    pub curr: IntPoint,
    pub top: IntPoint,
    pub delta: IntPoint,
    pub dx: f64,
    pub poly_typ: PolyType,
    pub side: EdgeSide,
    pub wind_delta: i32,
    pub wind_cnt: i32,
    pub wind_cnt2: i32,
    pub out_idx: usize,
    pub next: usize,
    pub prev: usize,
    pub next_in_lml: usize,
    pub next_in_ael: usize,
    pub prev_in_ael: usize,
    pub next_in_sel: usize,
    pub prev_in_sel: usize,
}

impl TEdge {
    pub fn new(curr: IntPoint, next: usize, prev: usize) -> Self {
        Self {
            bot: IntPoint::default(),
            curr,
            top: IntPoint::default(),
            delta: IntPoint::default(),
            dx: 0.0,
            poly_typ: PolyType::Subject,
            side: EdgeSide::Left,
            wind_delta: 0,
            wind_cnt: 0,
            wind_cnt2: 0,
            out_idx: UNASSIGNED,
            next,
            prev,
            next_in_lml: UNASSIGNED,
            next_in_ael: UNASSIGNED,
            prev_in_ael: UNASSIGNED,
            next_in_sel: UNASSIGNED,
            prev_in_sel: UNASSIGNED,
        }
    }

    /// Orients the edge so `bot` is the vertex with the larger y.
    pub fn init_from_poly_type(&mut self, next_curr: IntPoint, poly_type: PolyType) {
        if self.curr.y >= next_curr.y {
            self.bot = self.curr;
            self.top = next_curr;
        } else {
            self.top = self.curr;
            self.bot = next_curr;
        }

        self.set_dx();
        self.poly_typ = poly_type;
    }

    pub fn set_dx(&mut self) {
        self.delta = IntPoint::new(self.top.x - self.bot.x, self.top.y - self.bot.y);
        self.dx = if self.delta.y == 0 {
            HORIZONTAL
        } else {
            self.delta.x as f64 / self.delta.y as f64
        };
    }

    #[inline(always)]
    pub fn is_horizontal(&self) -> bool {
        self.dx == HORIZONTAL
    }

    #[inline(always)]
    pub fn is_assigned(&self) -> bool {
        self.out_idx != UNASSIGNED && self.out_idx != SKIP
    }

    #[inline(always)]
    pub fn is_skip(&self) -> bool {
        self.out_idx == SKIP
    }

    #[inline(always)]
    pub fn is_open(&self) -> bool {
        self.wind_delta == 0
    }

    pub fn top_x(&self, current_y: i64) -> i64 {
        if current_y == self.top.y {
            self.top.x
        } else {
            self.bot.x + round_to_i64(self.dx * (current_y - self.bot.y) as f64)
        }
    }

    /// Swaps the x ends so horizontals follow the progression of their bound.
    pub fn reverse_horizontal(&mut self) {
        std::mem::swap(&mut self.top.x, &mut self.bot.x);
        #[cfg(feature = "xyz")]
        std::mem::swap(&mut self.top.z, &mut self.bot.z);
    }

    pub fn is_maxima(&self, y: i64) -> bool {
        self.top.y == y && self.next_in_lml == UNASSIGNED
    }

    pub fn is_intermediate(&self, y: i64) -> bool {
        self.top.y == y && self.next_in_lml != UNASSIGNED
    }

    /// Returns `(left, right, left_to_right)` for a horizontal edge.
    pub fn horz_direction(&self) -> (i64, i64, bool) {
        if self.bot.x < self.top.x {
            (self.bot.x, self.top.x, true)
        } else {
            (self.top.x, self.bot.x, false)
        }
    }
}

pub fn edge_slopes_equal(e1: &TEdge, e2: &TEdge, use_full_range: bool) -> bool {
    if use_full_range {
        e1.delta.y as i128 * e2.delta.x as i128 == e1.delta.x as i128 * e2.delta.y as i128
    } else {
        e1.delta.y * e2.delta.x == e1.delta.x * e2.delta.y
    }
}

pub fn points_slopes_equal(pt1: &IntPoint, pt2: &IntPoint, pt3: &IntPoint, use_full_range: bool) -> bool {
    segments_slopes_equal(pt1, pt2, pt2, pt3, use_full_range)
}

pub fn segments_slopes_equal(
    pt1: &IntPoint,
    pt2: &IntPoint,
    pt3: &IntPoint,
    pt4: &IntPoint,
    use_full_range: bool,
) -> bool {
    if use_full_range {
        (pt1.y - pt2.y) as i128 * (pt3.x - pt4.x) as i128 == (pt1.x - pt2.x) as i128 * (pt3.y - pt4.y) as i128
    } else {
        (pt1.y - pt2.y) * (pt3.x - pt4.x) == (pt1.x - pt2.x) * (pt3.y - pt4.y)
    }
}

pub fn get_dx(pt1: &IntPoint, pt2: &IntPoint) -> f64 {
    if pt1.y == pt2.y {
        HORIZONTAL
    } else {
        (pt2.x - pt1.x) as f64 / (pt2.y - pt1.y) as f64
    }
}

/// True when `pt2` lies strictly between `pt1` and `pt3` on their common line.
pub fn pt2_is_between_pt1_and_pt3(pt1: &IntPoint, pt2: &IntPoint, pt3: &IntPoint) -> bool {
    if pt1 == pt3 || pt1 == pt2 || pt3 == pt2 {
        false
    } else if pt1.x != pt3.x {
        (pt2.x > pt1.x) == (pt2.x < pt3.x)
    } else {
        (pt2.y > pt1.y) == (pt2.y < pt3.y)
    }
}

pub fn horz_segments_overlap(seg1a: i64, seg1b: i64, seg2a: i64, seg2b: i64) -> bool {
    let (seg1a, seg1b) = if seg1a > seg1b { (seg1b, seg1a) } else { (seg1a, seg1b) };
    let (seg2a, seg2b) = if seg2a > seg2b { (seg2b, seg2a) } else { (seg2a, seg2b) };

    seg1a < seg2b && seg2a < seg1b
}

/// Intersection of two non-parallel edges, clamped to the current scanbeam.
pub fn intersect_point(edge1: &TEdge, edge2: &TEdge) -> IntPoint {
    let mut ip = IntPoint::default();

    if edge1.dx == edge2.dx {
        ip.y = edge1.curr.y;
        ip.x = edge1.top_x(ip.y);
        return ip;
    }

    if edge1.dx == 0.0 {
        ip.x = edge1.bot.x;
        ip.y = if edge2.is_horizontal() {
            edge2.bot.y
        } else {
            let b2 = edge2.bot.y as f64 - edge2.bot.x as f64 / edge2.dx;
            round_to_i64(ip.x as f64 / edge2.dx + b2)
        };
    } else if edge2.dx == 0.0 {
        ip.x = edge2.bot.x;
        ip.y = if edge1.is_horizontal() {
            edge1.bot.y
        } else {
            let b1 = edge1.bot.y as f64 - edge1.bot.x as f64 / edge1.dx;
            round_to_i64(ip.x as f64 / edge1.dx + b1)
        };
    } else {
        let b1 = edge1.bot.x as f64 - edge1.bot.y as f64 * edge1.dx;
        let b2 = edge2.bot.x as f64 - edge2.bot.y as f64 * edge2.dx;
        let q = (b2 - b1) / (edge1.dx - edge2.dx);

        ip.y = round_to_i64(q);
        ip.x = if edge1.dx.abs() < edge2.dx.abs() {
            round_to_i64(edge1.dx * q + b1)
        } else {
            round_to_i64(edge2.dx * q + b2)
        };
    }

    if ip.y < edge1.top.y || ip.y < edge2.top.y {
        ip.y = edge1.top.y.max(edge2.top.y);
        ip.x = if edge1.dx.abs() < edge2.dx.abs() {
            edge1.top_x(ip.y)
        } else {
            edge2.top_x(ip.y)
        };
    }

    // never below the bottom of the scanbeam
    if ip.y > edge1.curr.y {
        ip.y = edge1.curr.y;
        ip.x = if edge1.dx.abs() > edge2.dx.abs() {
            edge2.top_x(ip.y)
        } else {
            edge1.top_x(ip.y)
        };
    }

    ip
}

/// Ordering used when an edge enters the active list at a shared x.
pub fn e2_inserts_before_e1(e1: &TEdge, e2: &TEdge) -> bool {
    if e2.curr.x == e1.curr.x {
        if e2.top.y > e1.top.y {
            e2.top.x < e1.top_x(e2.top.y)
        } else {
            e1.top.x > e2.top_x(e1.top.y)
        }
    } else {
        e2.curr.x < e1.curr.x
    }
}

/// Unlinks `index` from its contour ring and returns the following edge.
pub fn remove_edge(edges: &mut Pool<TEdge>, index: usize) -> usize {
    let next = edges[index].next;
    let prev = edges[index].prev;

    edges[prev].next = next;
    edges[next].prev = prev;
    edges[index].prev = UNASSIGNED;

    next
}

pub fn find_next_loc_min(edges: &Pool<TEdge>, start: usize) -> usize {
    let mut e = start;

    loop {
        while edges[e].bot != edges[edges[e].prev].bot || edges[e].curr == edges[e].top {
            e = edges[e].next;
        }

        if !edges[e].is_horizontal() && !edges[edges[e].prev].is_horizontal() {
            break;
        }

        while edges[edges[e].prev].is_horizontal() {
            e = edges[e].prev;
        }

        let e2 = e;

        while edges[e].is_horizontal() {
            e = edges[e].next;
        }

        // an intermediate horizontal
        if edges[e].top.y == edges[edges[e].prev].bot.y {
            continue;
        }

        if edges[edges[e2].prev].bot.x < edges[e].bot.x {
            e = e2;
        }

        break;
    }

    e
}

pub fn get_maxima_pair(edges: &Pool<TEdge>, e: usize) -> usize {
    let edge = &edges[e];
    let next = &edges[edge.next];
    let prev = &edges[edge.prev];

    if next.top == edge.top && next.next_in_lml == UNASSIGNED {
        edge.next
    } else if prev.top == edge.top && prev.next_in_lml == UNASSIGNED {
        edge.prev
    } else {
        UNASSIGNED
    }
}

/// Like [`get_maxima_pair`] but ignores a pair that already left the active list.
pub fn get_maxima_pair_ex(edges: &Pool<TEdge>, e: usize) -> usize {
    let result = get_maxima_pair(edges, e);

    if result == UNASSIGNED {
        return result;
    }

    let pair = &edges[result];
    let detached = pair.next_in_ael == pair.prev_in_ael;

    if pair.is_skip() || (detached && !pair.is_horizontal()) {
        UNASSIGNED
    } else {
        result
    }
}

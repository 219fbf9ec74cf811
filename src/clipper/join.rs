use crate::allocator::{MemoryManager, Pool};
use crate::clipper::constants::UNASSIGNED;
use crate::clipper::out_pt::{dup_out_pt, OutPt};
use crate::clipper::t_edge::points_slopes_equal;
use crate::error::ClipperError;
use crate::geometry::point::IntPoint;

/// Two output vertices that sit on a shared edge and must be merged once the
/// sweep is done. A ghost join has no second vertex yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Join {
    pub out_pt1: usize,
    pub out_pt2: usize,
    pub off_pt: IntPoint,
}

impl Join {
    pub fn new(out_pt1: usize, out_pt2: usize, off_pt: IntPoint) -> Self {
        Self {
            out_pt1,
            out_pt2,
            off_pt,
        }
    }

    pub fn ghost(out_pt: usize, off_pt: IntPoint) -> Self {
        Self::new(out_pt, UNASSIGNED, off_pt)
    }

    fn apply_join(
        &mut self,
        pts: &mut Pool<OutPt>,
        manager: &mut dyn MemoryManager,
        op1: usize,
        op2: usize,
        reverse: bool,
    ) -> Result<(), ClipperError> {
        let op1b = dup_out_pt(pts, manager, op1, !reverse)?;
        let op2b = dup_out_pt(pts, manager, op2, reverse)?;

        if reverse {
            pts[op1].prev = op2;
            pts[op2].next = op1;
            pts[op1b].next = op2b;
            pts[op2b].prev = op1b;
        } else {
            pts[op1].next = op2;
            pts[op2].prev = op1;
            pts[op1b].prev = op2b;
            pts[op2b].next = op1b;
        }

        self.out_pt1 = op1;
        self.out_pt2 = op1b;

        Ok(())
    }

    fn horizontal_reverse(&self, pts: &Pool<OutPt>, op: usize) -> bool {
        let mut opb = pts[op].next;

        while opb != op && pts[opb].pt == self.off_pt {
            opb = pts[opb].next;
        }

        pts[opb].pt.y > self.off_pt.y
    }

    fn should_reverse(&self, pts: &Pool<OutPt>, op: usize, opb: usize, use_full_range: bool) -> bool {
        pts[opb].pt.y > pts[op].pt.y || !points_slopes_equal(&pts[op].pt, &pts[opb].pt, &self.off_pt, use_full_range)
    }

    /// Finds the partner vertex along the shared edge. Returns `(opb, reverse, rejected)`.
    fn join_stats(&self, pts: &Pool<OutPt>, op: usize, use_full_range: bool) -> (usize, bool, bool) {
        let unique = |forward: bool| {
            let mut opb = if forward { pts[op].next } else { pts[op].prev };

            while pts[opb].pt == pts[op].pt && opb != op {
                opb = if forward { pts[opb].next } else { pts[opb].prev };
            }

            opb
        };

        let mut opb = unique(true);
        let reverse = self.should_reverse(pts, op, opb, use_full_range);
        let mut rejected = false;

        if reverse {
            opb = unique(false);
            rejected = self.should_reverse(pts, op, opb, use_full_range);
        }

        (opb, reverse, rejected || opb == op)
    }

    /// Splices the two rings at the join. Returns false when the join does not apply.
    pub fn join_points(
        &mut self,
        pts: &mut Pool<OutPt>,
        manager: &mut dyn MemoryManager,
        is_records_same: bool,
        use_full_range: bool,
    ) -> Result<bool, ClipperError> {
        let op1 = self.out_pt1;
        let op2 = self.out_pt2;
        let is_horizontal = pts[op1].pt.y == self.off_pt.y;

        if is_horizontal && self.off_pt == pts[op1].pt && self.off_pt == pts[op2].pt {
            // strictly simple join
            if !is_records_same {
                return Ok(false);
            }

            let reverse1 = self.horizontal_reverse(pts, op1);
            let reverse2 = self.horizontal_reverse(pts, op2);

            if reverse1 == reverse2 {
                return Ok(false);
            }

            self.apply_join(pts, manager, op1, op2, reverse1)?;

            return Ok(true);
        }

        if is_horizontal {
            // the overlap position along the horizontals is not known yet
            let mut op1 = op1;
            let mut op1b = op1;

            while pts[pts[op1].prev].pt.y == pts[op1].pt.y && pts[op1].prev != op1b && pts[op1].prev != op2 {
                op1 = pts[op1].prev;
            }

            while pts[pts[op1b].next].pt.y == pts[op1b].pt.y && pts[op1b].next != op1 && pts[op1b].next != op2 {
                op1b = pts[op1b].next;
            }

            if pts[op1b].next == op1 || pts[op1b].next == op2 {
                return Ok(false);
            }

            let mut op2 = op2;
            let mut op2b = op2;

            while pts[pts[op2].prev].pt.y == pts[op2].pt.y && pts[op2].prev != op2b && pts[op2].prev != op1b {
                op2 = pts[op2].prev;
            }

            while pts[pts[op2b].next].pt.y == pts[op2b].pt.y && pts[op2b].next != op2 && pts[op2b].next != op1 {
                op2b = pts[op2b].next;
            }

            if pts[op2b].next == op2 || pts[op2b].next == op1 {
                return Ok(false);
            }

            let (left, right) = match get_overlap(pts[op1].pt.x, pts[op1b].pt.x, pts[op2].pt.x, pts[op2b].pt.x) {
                Some(range) => range,
                None => return Ok(false),
            };

            let within = |op: usize| pts[op].pt.x >= left && pts[op].pt.x <= right;

            // keep op1 and op2 off the discarded side, other joins may still need them
            let (pt, discard_left_side) = if within(op1) {
                (pts[op1].pt, pts[op1].pt.x > pts[op1b].pt.x)
            } else if within(op2) {
                (pts[op2].pt, pts[op2].pt.x > pts[op2b].pt.x)
            } else if within(op1b) {
                (pts[op1b].pt, pts[op1b].pt.x > pts[op1].pt.x)
            } else {
                (pts[op2b].pt, pts[op2b].pt.x > pts[op2].pt.x)
            };

            self.out_pt1 = op1;
            self.out_pt2 = op2;

            return join_horz(pts, manager, op1, op1b, op2, op2b, pt, discard_left_side);
        }

        let (op1b, reverse1, rejected1) = self.join_stats(pts, op1, use_full_range);

        if rejected1 {
            return Ok(false);
        }

        let (op2b, reverse2, rejected2) = self.join_stats(pts, op2, use_full_range);

        if rejected2 || op1b == op2b || (is_records_same && reverse1 == reverse2) {
            return Ok(false);
        }

        self.apply_join(pts, manager, op1, op2, reverse1)?;

        Ok(true)
    }
}

/// Range shared by two horizontal spans, if it has positive length.
pub fn get_overlap(a1: i64, a2: i64, b1: i64, b2: i64) -> Option<(i64, i64)> {
    let (left, right) = match (a1 < a2, b1 < b2) {
        (true, true) => (a1.max(b1), a2.min(b2)),
        (true, false) => (a1.max(b2), a2.min(b1)),
        (false, true) => (a2.max(b1), a1.min(b2)),
        (false, false) => (a2.max(b2), a1.min(b1)),
    };

    (left < right).then_some((left, right))
}

/// Moves `op` along its horizontal run towards `pt`, then pins a vertex at
/// `pt` and returns it with the duplicate that continues the ring.
fn split_at(
    pts: &mut Pool<OutPt>,
    manager: &mut dyn MemoryManager,
    mut op: usize,
    pt: IntPoint,
    left_to_right: bool,
    discard_left: bool,
) -> Result<(usize, usize), ClipperError> {
    let insert_after = if left_to_right { !discard_left } else { discard_left };

    if left_to_right {
        while pts[pts[op].next].pt.x <= pt.x
            && pts[pts[op].next].pt.x >= pts[op].pt.x
            && pts[pts[op].next].pt.y == pt.y
        {
            op = pts[op].next;
        }

        if discard_left && pts[op].pt.x != pt.x {
            op = pts[op].next;
        }
    } else {
        while pts[pts[op].next].pt.x >= pt.x
            && pts[pts[op].next].pt.x <= pts[op].pt.x
            && pts[pts[op].next].pt.y == pt.y
        {
            op = pts[op].next;
        }

        if !discard_left && pts[op].pt.x != pt.x {
            op = pts[op].next;
        }
    }

    let mut opb = dup_out_pt(pts, manager, op, insert_after)?;

    if pts[opb].pt != pt {
        op = opb;
        pts[op].pt = pt;
        opb = dup_out_pt(pts, manager, op, insert_after)?;
    }

    Ok((op, opb))
}

#[allow(clippy::too_many_arguments)]
fn join_horz(
    pts: &mut Pool<OutPt>,
    manager: &mut dyn MemoryManager,
    op1: usize,
    op1b: usize,
    op2: usize,
    op2b: usize,
    pt: IntPoint,
    discard_left: bool,
) -> Result<bool, ClipperError> {
    let dir1_left_to_right = pts[op1].pt.x <= pts[op1b].pt.x;
    let dir2_left_to_right = pts[op2].pt.x <= pts[op2b].pt.x;

    if dir1_left_to_right == dir2_left_to_right {
        return Ok(false);
    }

    let (op1, op1b) = split_at(pts, manager, op1, pt, dir1_left_to_right, discard_left)?;
    let (op2, op2b) = split_at(pts, manager, op2, pt, dir2_left_to_right, discard_left)?;

    if dir1_left_to_right == discard_left {
        pts[op1].prev = op2;
        pts[op2].next = op1;
        pts[op1b].next = op2b;
        pts[op2b].prev = op1b;
    } else {
        pts[op1].next = op2;
        pts[op2].prev = op1;
        pts[op1b].prev = op2b;
        pts[op2b].next = op1b;
    }

    Ok(true)
}

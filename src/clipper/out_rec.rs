use crate::allocator::{MemoryManager, Pool};
use crate::clipper::constants::UNASSIGNED;
use crate::clipper::out_pt::{
    first_is_bottom_pt, get_bottom_pt, point_count, poly2_contains_poly1, reverse_links, ring_area, OutPt,
};
use crate::clipper::t_edge::{points_slopes_equal, pt2_is_between_pt1_and_pt3};
use crate::error::ClipperError;
use crate::geometry::point::{Path, Paths};

/// One output contour under construction. `pts` is the left-most vertex and
/// `pts.prev` the right-most while the sweep runs.
#[derive(Debug, Clone, Copy)]
pub struct OutRec {
    pub idx: usize,
    pub is_hole: bool,
    pub is_open: bool,
    pub first_left: usize,
    pub pts: usize,
    pub bottom_pt: usize,
    pub poly_nd: usize,
}

impl OutRec {
    fn new() -> Self {
        Self {
            idx: UNASSIGNED,
            is_hole: false,
            is_open: false,
            first_left: UNASSIGNED,
            pts: UNASSIGNED,
            bottom_pt: UNASSIGNED,
            poly_nd: UNASSIGNED,
        }
    }
}

/// Output records together with the vertices of their rings.
#[derive(Default)]
pub struct OutPolygons {
    pub recs: Pool<OutRec>,
    pub pts: Pool<OutPt>,
}

impl OutPolygons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, manager: &mut dyn MemoryManager) -> Result<usize, ClipperError> {
        let index = self.recs.alloc(manager, OutRec::new())?;
        self.recs[index].idx = index;

        Ok(index)
    }

    pub fn clear(&mut self, manager: &mut dyn MemoryManager) {
        self.pts.clear(manager);
        self.recs.clear(manager);
    }

    pub fn len(&self) -> usize {
        self.recs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recs.is_empty()
    }

    /// Follows merge forwarding until the record that still owns the ring.
    pub fn get_out_rec(&self, index: usize) -> usize {
        let mut result = index;

        while result != self.recs[result].idx {
            result = self.recs[result].idx;
        }

        result
    }

    pub fn parse_first_left(&self, first_left: usize) -> usize {
        let mut result = first_left;

        while result != UNASSIGNED && self.recs[result].pts == UNASSIGNED {
            result = self.recs[result].first_left;
        }

        result
    }

    pub fn out_rec1_right_of_out_rec2(&self, out_rec1: usize, out_rec2: usize) -> bool {
        let mut rec = out_rec1;

        loop {
            rec = self.recs[rec].first_left;

            if rec == out_rec2 {
                return true;
            }

            if rec == UNASSIGNED {
                return false;
            }
        }
    }

    fn bottom_pt(&mut self, rec: usize) -> usize {
        if self.recs[rec].bottom_pt == UNASSIGNED {
            self.recs[rec].bottom_pt = get_bottom_pt(&self.pts, self.recs[rec].pts);
        }

        self.recs[rec].bottom_pt
    }

    /// The record whose hole state is authoritative when two fragments meet.
    pub fn get_lowermost_rec(&mut self, out_rec1: usize, out_rec2: usize) -> usize {
        let out_pt1 = self.bottom_pt(out_rec1);
        let out_pt2 = self.bottom_pt(out_rec2);
        let pt1 = self.pts[out_pt1].pt;
        let pt2 = self.pts[out_pt2].pt;

        if pt1.y > pt2.y {
            out_rec1
        } else if pt1.y < pt2.y {
            out_rec2
        } else if pt1.x < pt2.x {
            out_rec1
        } else if pt1.x > pt2.x {
            out_rec2
        } else if self.pts[out_pt1].next == out_pt1 {
            out_rec2
        } else if self.pts[out_pt2].next == out_pt2 {
            out_rec1
        } else if first_is_bottom_pt(&self.pts, out_pt1, out_pt2) {
            out_rec1
        } else {
            out_rec2
        }
    }

    pub fn get_hole_state_rec(&mut self, out_rec1: usize, out_rec2: usize) -> usize {
        if out_rec1 == out_rec2 {
            out_rec1
        } else if self.out_rec1_right_of_out_rec2(out_rec1, out_rec2) {
            out_rec2
        } else if self.out_rec1_right_of_out_rec2(out_rec2, out_rec1) {
            out_rec1
        } else {
            self.get_lowermost_rec(out_rec1, out_rec2)
        }
    }

    pub fn update_out_pt_idxs(&mut self, rec: usize) {
        let start = self.recs[rec].pts;
        let mut op = start;

        loop {
            self.pts[op].idx = rec;
            op = self.pts[op].prev;

            if op == start {
                break;
            }
        }
    }

    /// True when the ring of `inner` lies inside the ring of `outer`.
    pub fn contains(&self, outer: usize, inner: usize) -> bool {
        poly2_contains_poly1(&self.pts, self.recs[inner].pts, self.recs[outer].pts)
    }

    pub fn area(&self, rec: usize) -> f64 {
        ring_area(&self.pts, self.recs[rec].pts)
    }

    /// After a split into two separate rings, moves children that now sit inside the new one.
    pub fn fixup_first_lefts1(&mut self, old_out_rec: usize, new_out_rec: usize) {
        for i in self.recs.indices() {
            let first_left = self.parse_first_left(self.recs[i].first_left);

            if self.recs[i].pts != UNASSIGNED && first_left == old_out_rec && self.contains(new_out_rec, i) {
                self.recs[i].first_left = new_out_rec;
            }
        }
    }

    /// After a split where one ring ended up inside the other, rehomes every
    /// record that was owned by either ring or by their common owner.
    pub fn fixup_first_lefts2(&mut self, inner_out_rec: usize, outer_out_rec: usize) {
        let orfl = self.recs[outer_out_rec].first_left;

        for i in self.recs.indices() {
            if self.recs[i].pts == UNASSIGNED || i == outer_out_rec || i == inner_out_rec {
                continue;
            }

            let first_left = self.parse_first_left(self.recs[i].first_left);

            if first_left != orfl && first_left != inner_out_rec && first_left != outer_out_rec {
                continue;
            }

            if self.contains(inner_out_rec, i) {
                self.recs[i].first_left = inner_out_rec;
            } else if self.contains(outer_out_rec, i) {
                self.recs[i].first_left = outer_out_rec;
            } else if self.recs[i].first_left == inner_out_rec || self.recs[i].first_left == outer_out_rec {
                self.recs[i].first_left = orfl;
            }
        }
    }

    /// After a merge, hands every child of the absorbed record to the survivor.
    pub fn fixup_first_lefts3(&mut self, old_out_rec: usize, new_out_rec: usize) {
        for i in self.recs.indices() {
            let first_left = self.parse_first_left(self.recs[i].first_left);

            if self.recs[i].pts != UNASSIGNED && first_left == old_out_rec {
                self.recs[i].first_left = new_out_rec;
            }
        }
    }

    /// Points the record at the nearest live owner of opposite hole state.
    pub fn fix_hole_linkage(&mut self, rec: usize) {
        let first_left = self.recs[rec].first_left;

        if first_left == UNASSIGNED
            || (self.recs[rec].is_hole != self.recs[first_left].is_hole && self.recs[first_left].pts != UNASSIGNED)
        {
            return;
        }

        let is_hole = self.recs[rec].is_hole;
        let mut orfl = first_left;

        while orfl != UNASSIGNED && (self.recs[orfl].is_hole == is_hole || self.recs[orfl].pts == UNASSIGNED) {
            orfl = self.recs[orfl].first_left;
        }

        self.recs[rec].first_left = orfl;
    }

    fn orient(&mut self, rec: usize, reverse_solution: bool) {
        if (self.recs[rec].is_hole ^ reverse_solution) == (self.area(rec) > 0.0) {
            reverse_links(&mut self.pts, self.recs[rec].pts);
        }
    }

    /// Orients closed rings: outers positive and holes negative, flipped when reversed.
    pub fn fix_orientations(&mut self, reverse_solution: bool) {
        for i in self.recs.indices() {
            if self.recs[i].pts != UNASSIGNED && !self.recs[i].is_open {
                self.orient(i, reverse_solution);
            }
        }
    }

    /// Drops duplicate vertices and merges collinear runs. Rings that collapse
    /// below three vertices are discarded.
    pub fn fixup_out_polygon(&mut self, rec: usize, preserve_collinear: bool, use_full_range: bool) {
        let mut last_ok = UNASSIGNED;
        let mut pp = self.recs[rec].pts;

        self.recs[rec].bottom_pt = UNASSIGNED;

        loop {
            let prev = self.pts[pp].prev;
            let next = self.pts[pp].next;

            if prev == pp || prev == next {
                self.recs[rec].pts = UNASSIGNED;
                return;
            }

            let pt = self.pts[pp].pt;
            let prev_pt = self.pts[prev].pt;
            let next_pt = self.pts[next].pt;

            if pt == next_pt
                || pt == prev_pt
                || (points_slopes_equal(&prev_pt, &pt, &next_pt, use_full_range)
                    && (!preserve_collinear || !pt2_is_between_pt1_and_pt3(&prev_pt, &pt, &next_pt)))
            {
                last_ok = UNASSIGNED;
                self.pts[prev].next = next;
                self.pts[next].prev = prev;
                pp = prev;
            } else if pp == last_ok {
                break;
            } else {
                if last_ok == UNASSIGNED {
                    last_ok = pp;
                }

                pp = next;
            }
        }

        self.recs[rec].pts = pp;
    }

    pub fn fixup_out_polyline(&mut self, rec: usize) {
        let mut pp = self.recs[rec].pts;
        let mut last_pp = self.pts[pp].prev;

        while pp != last_pp {
            pp = self.pts[pp].next;

            let prev = self.pts[pp].prev;

            if self.pts[pp].pt == self.pts[prev].pt {
                if pp == last_pp {
                    last_pp = prev;
                }

                let next = self.pts[pp].next;
                self.pts[prev].next = next;
                self.pts[next].prev = prev;
                pp = prev;
            }
        }

        if pp == self.pts[pp].prev {
            self.recs[rec].pts = UNASSIGNED;
        }
    }

    /// Classifies a freshly split pair of rings and repairs ownership. With
    /// `orient` set the ring that became a hole is re-oriented as well.
    pub fn settle_split(&mut self, rec1: usize, rec2: usize, using_tree: bool, orient: Option<bool>) {
        if self.contains(rec1, rec2) {
            self.recs[rec2].is_hole = !self.recs[rec1].is_hole;
            self.recs[rec2].first_left = rec1;

            if using_tree {
                self.fixup_first_lefts2(rec2, rec1);
            }

            if let Some(reverse_solution) = orient {
                self.orient(rec2, reverse_solution);
            }
        } else if self.contains(rec2, rec1) {
            self.recs[rec2].is_hole = self.recs[rec1].is_hole;
            self.recs[rec1].is_hole = !self.recs[rec2].is_hole;
            self.recs[rec2].first_left = self.recs[rec1].first_left;
            self.recs[rec1].first_left = rec2;

            if using_tree {
                self.fixup_first_lefts2(rec1, rec2);
            }

            if let Some(reverse_solution) = orient {
                self.orient(rec1, reverse_solution);
            }
        } else {
            self.recs[rec2].is_hole = self.recs[rec1].is_hole;
            self.recs[rec2].first_left = self.recs[rec1].first_left;

            if using_tree {
                self.fixup_first_lefts1(rec1, rec2);
            }
        }
    }

    /// Splits every ring at repeated vertices so no output touches itself.
    pub fn do_simple_polygons(&mut self, manager: &mut dyn MemoryManager, using_tree: bool) -> Result<(), ClipperError> {
        let mut i = 1;

        // records created while splitting are visited too
        while i <= self.recs.len() {
            let rec = i;
            i += 1;

            let mut op = self.recs[rec].pts;

            if op == UNASSIGNED || self.recs[rec].is_open {
                continue;
            }

            loop {
                let mut op2 = self.pts[op].next;

                while op2 != self.recs[rec].pts {
                    if self.pts[op].pt == self.pts[op2].pt && self.pts[op2].next != op && self.pts[op2].prev != op {
                        let op3 = self.pts[op].prev;
                        let op4 = self.pts[op2].prev;

                        self.pts[op].prev = op4;
                        self.pts[op4].next = op;
                        self.pts[op2].prev = op3;
                        self.pts[op3].next = op2;

                        self.recs[rec].pts = op;

                        let rec2 = self.create(manager)?;
                        self.recs[rec2].pts = op2;
                        self.update_out_pt_idxs(rec2);
                        self.settle_split(rec, rec2, using_tree, None);

                        op2 = op;
                    }

                    op2 = self.pts[op2].next;
                }

                op = self.pts[op].next;

                if op == self.recs[rec].pts {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Copies a ring out in output order.
    pub fn export(&self, rec: usize) -> Path {
        let start = self.recs[rec].pts;

        if start == UNASSIGNED {
            return Path::new();
        }

        let count = point_count(&self.pts, start);
        let mut result = Path::with_capacity(count);
        let mut op = self.pts[start].prev;

        for _ in 0..count {
            result.push(self.pts[op].pt);
            op = self.pts[op].prev;
        }

        result
    }

    pub fn build_result(&self) -> Paths {
        self.recs
            .indices()
            .filter(|i| {
                let out_rec = &self.recs[*i];
                let count = point_count(&self.pts, out_rec.pts);

                count >= if out_rec.is_open { 2 } else { 3 }
            })
            .map(|i| self.export(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::SimpleMemoryManager;
    use crate::geometry::point::IntPoint;

    fn add_ring(out: &mut OutPolygons, manager: &mut SimpleMemoryManager, points: &[(i64, i64)], is_open: bool) {
        let idx = out.create(manager).unwrap();
        let ids: Vec<usize> = points
            .iter()
            .map(|(x, y)| out.pts.alloc(manager, OutPt::new(idx, IntPoint::new(*x, *y))).unwrap())
            .collect();

        for (i, id) in ids.iter().enumerate() {
            out.pts[*id].next = ids[(i + 1) % ids.len()];
            out.pts[*id].prev = ids[(i + ids.len() - 1) % ids.len()];
        }

        out.recs[idx].pts = ids[0];
        out.recs[idx].is_open = is_open;
    }

    #[test]
    fn degenerate_rings_are_left_out_of_flat_result() {
        let mut manager = SimpleMemoryManager::new();
        let mut out = OutPolygons::new();

        add_ring(&mut out, &mut manager, &[(0, 0), (10, 0)], false);
        add_ring(&mut out, &mut manager, &[(0, 0), (10, 0), (10, 10)], false);
        add_ring(&mut out, &mut manager, &[(0, 5), (10, 5)], true);
        add_ring(&mut out, &mut manager, &[(3, 3)], true);
        out.create(&mut manager).unwrap();

        let result = out.build_result();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].len(), 3);
        assert_eq!(result[1].len(), 2);

        out.clear(&mut manager);
        assert_eq!(manager.live_blocks(), 0);
    }
}

use crate::clipper::clipper::Clipper;
use crate::clipper::constants::{SKIP, UNASSIGNED};
use crate::clipper::enums::{EdgeSide, PolyType};
use crate::clipper::local_minima::LocalMinimum;
use crate::clipper::t_edge::{
    e2_inserts_before_e1, find_next_loc_min, points_slopes_equal, pt2_is_between_pt1_and_pt3, remove_edge, TEdge,
};
use crate::error::ClipperError;
use crate::geometry::bound_rect::IntRect;
use crate::geometry::point::{IntPoint, Path};

impl<'m> Clipper<'m> {
    /// Adds one contour. Returns `Ok(false)` when the path degenerates after
    /// duplicate and collinear vertices are removed.
    pub fn add_path(&mut self, path: &[IntPoint], poly_type: PolyType, closed: bool) -> Result<bool, ClipperError> {
        if !closed && poly_type == PolyType::Clip {
            return Err(ClipperError::OpenPathsNotSupported);
        }

        if path.is_empty() {
            return Ok(false);
        }

        let mut high_i = path.len() - 1;

        if closed {
            while high_i > 0 && path[high_i] == path[0] {
                high_i -= 1;
            }
        }

        while high_i > 0 && path[high_i] == path[high_i - 1] {
            high_i -= 1;
        }

        if (closed && high_i < 2) || (!closed && high_i < 1) {
            return Ok(false);
        }

        let mut use_full_range = self.use_full_range;

        for pt in &path[..=high_i] {
            pt.range_test(&mut use_full_range)?;
        }

        self.use_full_range = use_full_range;

        // the new edges occupy consecutive slots starting at `first`
        let first = self.edges.len() + 1;

        for (i, pt) in path[..=high_i].iter().enumerate() {
            let next = first + if i == high_i { 0 } else { i + 1 };
            let prev = first + if i == 0 { high_i } else { i - 1 };

            self.edges.alloc(&mut *self.manager, TEdge::new(*pt, next, prev))?;
        }

        let mut e_start = first;
        let mut e = e_start;
        let mut e_loop_stop = e_start;

        // remove duplicate vertices and, for closed paths, collinear edges
        loop {
            let next = self.edges[e].next;
            let prev = self.edges[e].prev;

            if self.edges[e].curr == self.edges[next].curr && (closed || next != e_start) {
                if e == next {
                    break;
                }
                if e == e_start {
                    e_start = next;
                }

                e = remove_edge(&mut self.edges, e);
                e_loop_stop = e;
                continue;
            }

            if prev == next {
                break;
            }

            let (p1, p2, p3) = (self.edges[prev].curr, self.edges[e].curr, self.edges[next].curr);

            if closed
                && points_slopes_equal(&p1, &p2, &p3, self.use_full_range)
                && (!self.config.preserve_collinear || !pt2_is_between_pt1_and_pt3(&p1, &p2, &p3))
            {
                if e == e_start {
                    e_start = next;
                }

                e = remove_edge(&mut self.edges, e);
                e = self.edges[e].prev;
                e_loop_stop = e;
                continue;
            }

            e = next;

            if e == e_loop_stop || (!closed && self.edges[e].next == e_start) {
                break;
            }
        }

        if (!closed && e == self.edges[e].next) || (closed && self.edges[e].prev == self.edges[e].next) {
            log::warn!("dropping degenerate {:?} path of {} points", poly_type, path.len());
            return Ok(false);
        }

        if !closed {
            self.has_open_paths = true;
            let last = self.edges[e_start].prev;
            self.edges[last].out_idx = SKIP;
        }

        let mut is_flat = true;
        e = e_start;

        loop {
            let next = self.edges[e].next;
            let next_curr = self.edges[next].curr;

            self.edges[e].init_from_poly_type(next_curr, poly_type);
            e = next;

            if is_flat && self.edges[e].curr.y != self.edges[e_start].curr.y {
                is_flat = false;
            }

            if e == e_start {
                break;
            }
        }

        // a flat open path becomes a single right bound of horizontals
        if is_flat {
            if closed {
                return Ok(false);
            }

            let last = self.edges[e].prev;
            self.edges[last].out_idx = SKIP;

            let minimum = LocalMinimum::new(self.edges[e].bot.y, UNASSIGNED, e);

            self.edges[e].side = EdgeSide::Right;
            self.edges[e].wind_delta = 0;

            loop {
                let prev = self.edges[e].prev;

                if self.edges[e].bot.x != self.edges[prev].top.x {
                    self.edges[e].reverse_horizontal();
                }

                let next = self.edges[e].next;

                if self.edges[next].is_skip() {
                    break;
                }

                self.edges[e].next_in_lml = next;
                e = next;
            }

            self.minima.push(minimum);

            return Ok(true);
        }

        let mut e_min = UNASSIGNED;

        // a closed path starting on a horizontal would break the bound walk
        let prev = self.edges[e].prev;

        if self.edges[prev].bot == self.edges[prev].top {
            e = self.edges[e].next;
        }

        loop {
            e = find_next_loc_min(&self.edges, e);

            if e == e_min {
                break;
            }

            if e_min == UNASSIGNED {
                e_min = e;
            }

            let prev = self.edges[e].prev;
            let y = self.edges[e].bot.y;

            let (mut left, mut right, left_bound_is_forward) = if self.edges[e].dx < self.edges[prev].dx {
                (prev, e, false)
            } else {
                (e, prev, true)
            };

            self.edges[left].side = EdgeSide::Left;
            self.edges[right].side = EdgeSide::Right;

            if closed {
                let delta = if self.edges[left].next == right { -1 } else { 1 };
                self.edges[left].wind_delta = delta;
                self.edges[right].wind_delta = -delta;
            } else {
                self.edges[left].wind_delta = 0;
                self.edges[right].wind_delta = 0;
            }

            e = self.process_bound(left, left_bound_is_forward);

            if self.edges[e].is_skip() {
                e = self.process_bound(e, left_bound_is_forward);
            }

            let mut e2 = self.process_bound(right, !left_bound_is_forward);

            if self.edges[e2].is_skip() {
                e2 = self.process_bound(e2, !left_bound_is_forward);
            }

            if self.edges[left].is_skip() {
                left = UNASSIGNED;
            } else if self.edges[right].is_skip() {
                right = UNASSIGNED;
            }

            self.minima.push(LocalMinimum::new(y, left, right));

            if !left_bound_is_forward {
                e = e2;
            }
        }

        Ok(true)
    }

    /// Adds every path; returns true when at least one was accepted.
    pub fn add_paths(&mut self, paths: &[Path], poly_type: PolyType, closed: bool) -> Result<bool, ClipperError> {
        let mut result = false;

        for path in paths {
            if self.add_path(path, poly_type, closed)? {
                result = true;
            }
        }

        Ok(result)
    }

    fn step(&self, e: usize, forward: bool) -> usize {
        if forward {
            self.edges[e].next
        } else {
            self.edges[e].prev
        }
    }

    /// Chains the edges of one bound through `next_in_lml` and returns the
    /// first edge past the bound's maximum.
    fn process_bound(&mut self, mut e: usize, forward: bool) -> usize {
        let mut result = e;

        if self.edges[e].is_skip() {
            // the end of an open path; a bound may still continue past it
            if forward {
                while self.edges[e].top.y == self.edges[self.edges[e].next].bot.y {
                    e = self.edges[e].next;
                }
                while e != result && self.edges[e].is_horizontal() {
                    e = self.edges[e].prev;
                }
            } else {
                while self.edges[e].top.y == self.edges[self.edges[e].prev].bot.y {
                    e = self.edges[e].prev;
                }
                while e != result && self.edges[e].is_horizontal() {
                    e = self.edges[e].next;
                }
            }

            if e == result {
                result = self.step(result, forward);
            } else {
                e = self.step(result, forward);

                let minimum = LocalMinimum::new(self.edges[e].bot.y, UNASSIGNED, e);

                self.edges[e].wind_delta = 0;
                result = self.process_bound(e, forward);
                self.minima.push(minimum);
            }

            return result;
        }

        if self.edges[e].is_horizontal() {
            // a horizontal at the start of a bound must run away from the
            // minimum, unless it continues a horizontal on the other bound
            let e_start = self.step(e, !forward);

            if self.edges[e_start].is_horizontal() {
                if self.edges[e_start].bot.x != self.edges[e].bot.x && self.edges[e_start].top.x != self.edges[e].bot.x {
                    self.edges[e].reverse_horizontal();
                }
            } else if self.edges[e_start].bot.x != self.edges[e].bot.x {
                self.edges[e].reverse_horizontal();
            }
        }

        let e_start = e;

        if forward {
            loop {
                let next = self.edges[result].next;
                if self.edges[result].top.y != self.edges[next].bot.y || self.edges[next].is_skip() {
                    break;
                }
                result = next;
            }

            let next = self.edges[result].next;

            if self.edges[result].is_horizontal() && !self.edges[next].is_skip() {
                // horizontals at a maximum belong to the bound that turns last
                let mut horz = result;

                while self.edges[self.edges[horz].prev].is_horizontal() {
                    horz = self.edges[horz].prev;
                }

                let horz_prev = self.edges[horz].prev;

                if self.edges[horz_prev].top.x > self.edges[next].top.x {
                    result = horz_prev;
                }
            }

            while e != result {
                let next = self.edges[e].next;
                self.edges[e].next_in_lml = next;
                self.reverse_trailing_horizontal(e, e_start, self.edges[e].prev);
                e = next;
            }

            self.reverse_trailing_horizontal(e, e_start, self.edges[e].prev);

            self.edges[result].next
        } else {
            loop {
                let prev = self.edges[result].prev;
                if self.edges[result].top.y != self.edges[prev].bot.y || self.edges[prev].is_skip() {
                    break;
                }
                result = prev;
            }

            let prev = self.edges[result].prev;

            if self.edges[result].is_horizontal() && !self.edges[prev].is_skip() {
                let mut horz = result;

                while self.edges[self.edges[horz].next].is_horizontal() {
                    horz = self.edges[horz].next;
                }

                let horz_next = self.edges[horz].next;

                if self.edges[horz_next].top.x >= self.edges[prev].top.x {
                    result = horz_next;
                }
            }

            while e != result {
                let prev = self.edges[e].prev;
                self.edges[e].next_in_lml = prev;
                self.reverse_trailing_horizontal(e, e_start, self.edges[e].next);
                e = prev;
            }

            self.reverse_trailing_horizontal(e, e_start, self.edges[e].next);

            self.edges[result].prev
        }
    }

    fn reverse_trailing_horizontal(&mut self, e: usize, e_start: usize, behind: usize) {
        if self.edges[e].is_horizontal() && e != e_start && self.edges[e].bot.x != self.edges[behind].top.x {
            self.edges[e].reverse_horizontal();
        }
    }

    /// Bounding rectangle of every ingested vertex; all zero when empty.
    pub fn get_bounds(&self) -> IntRect {
        let mut result: Option<IntRect> = None;

        for minimum in self.minima.iter() {
            for bound in [minimum.left_bound, minimum.right_bound] {
                let mut e = bound;

                while e != UNASSIGNED {
                    let edge = &self.edges[e];

                    for pt in [&edge.bot, &edge.top] {
                        match result.as_mut() {
                            Some(rect) => rect.extend(pt),
                            None => result = Some(IntRect::from_point(pt)),
                        }
                    }

                    e = edge.next_in_lml;
                }
            }
        }

        result.unwrap_or_default()
    }

    /// Rewinds the minima and seeds the scanbeam for a new sweep.
    pub(crate) fn reset(&mut self) {
        self.minima.sort();
        self.scanbeam.clear();

        for minimum in self.minima.iter() {
            self.scanbeam.insert(minimum.y);

            for (bound, side) in [
                (minimum.left_bound, EdgeSide::Left),
                (minimum.right_bound, EdgeSide::Right),
            ] {
                if bound != UNASSIGNED {
                    let edge = &mut self.edges[bound];
                    edge.curr = edge.bot;
                    edge.side = side;
                    edge.out_idx = UNASSIGNED;
                }
            }
        }

        self.active_edges = UNASSIGNED;
        self.sorted_edges = UNASSIGNED;
    }

    /// Drops all ingested paths and hands their memory back to the manager.
    pub(crate) fn release_input(&mut self) {
        self.minima.clear();
        self.scanbeam.clear();
        self.edges.clear(&mut *self.manager);
        self.active_edges = UNASSIGNED;
        self.sorted_edges = UNASSIGNED;
        self.use_full_range = false;
        self.has_open_paths = false;
    }

    /// Discards all input and results and resets the memory manager. Trees
    /// returned earlier are gone afterwards.
    pub fn clear(&mut self) {
        self.release_storage();
        self.manager.reset();
    }

    /// Drops input and results and gives every pool's storage back to the manager.
    pub(crate) fn release_storage(&mut self) {
        self.release_input();
        self.edges.release(&mut *self.manager);
        self.out.pts.release(&mut *self.manager);
        self.out.recs.release(&mut *self.manager);
        self.joins.release(&mut *self.manager);
        self.ghost_joins.release(&mut *self.manager);
        self.intersections.release(&mut *self.manager);
        self.poly_tree.release(&mut *self.manager);
    }

    pub(crate) fn insert_edge_into_ael(&mut self, edge: usize, start_edge: usize) {
        if self.active_edges == UNASSIGNED {
            self.edges[edge].prev_in_ael = UNASSIGNED;
            self.edges[edge].next_in_ael = UNASSIGNED;
            self.active_edges = edge;
        } else if start_edge == UNASSIGNED && e2_inserts_before_e1(&self.edges[self.active_edges], &self.edges[edge]) {
            self.edges[edge].prev_in_ael = UNASSIGNED;
            self.edges[edge].next_in_ael = self.active_edges;
            self.edges[self.active_edges].prev_in_ael = edge;
            self.active_edges = edge;
        } else {
            let mut start = if start_edge == UNASSIGNED {
                self.active_edges
            } else {
                start_edge
            };

            loop {
                let next = self.edges[start].next_in_ael;
                if next == UNASSIGNED || e2_inserts_before_e1(&self.edges[next], &self.edges[edge]) {
                    break;
                }
                start = next;
            }

            let next = self.edges[start].next_in_ael;

            self.edges[edge].next_in_ael = next;
            if next != UNASSIGNED {
                self.edges[next].prev_in_ael = edge;
            }
            self.edges[edge].prev_in_ael = start;
            self.edges[start].next_in_ael = edge;
        }
    }

    pub(crate) fn delete_from_ael(&mut self, e: usize) {
        let prev = self.edges[e].prev_in_ael;
        let next = self.edges[e].next_in_ael;

        if prev == UNASSIGNED && next == UNASSIGNED && e != self.active_edges {
            return;
        }

        if prev != UNASSIGNED {
            self.edges[prev].next_in_ael = next;
        } else {
            self.active_edges = next;
        }

        if next != UNASSIGNED {
            self.edges[next].prev_in_ael = prev;
        }

        self.edges[e].next_in_ael = UNASSIGNED;
        self.edges[e].prev_in_ael = UNASSIGNED;
    }

    pub(crate) fn add_edge_to_sel(&mut self, e: usize) {
        self.edges[e].prev_in_sel = UNASSIGNED;
        self.edges[e].next_in_sel = self.sorted_edges;

        if self.sorted_edges != UNASSIGNED {
            self.edges[self.sorted_edges].prev_in_sel = e;
        }

        self.sorted_edges = e;
    }

    pub(crate) fn delete_from_sel(&mut self, e: usize) {
        let prev = self.edges[e].prev_in_sel;
        let next = self.edges[e].next_in_sel;

        if prev == UNASSIGNED && next == UNASSIGNED && e != self.sorted_edges {
            return;
        }

        if prev != UNASSIGNED {
            self.edges[prev].next_in_sel = next;
        } else {
            self.sorted_edges = next;
        }

        if next != UNASSIGNED {
            self.edges[next].prev_in_sel = prev;
        }

        self.edges[e].next_in_sel = UNASSIGNED;
        self.edges[e].prev_in_sel = UNASSIGNED;
    }

    pub(crate) fn swap_positions_in_ael(&mut self, e1: usize, e2: usize) {
        // an edge with no neighbours has already left the list
        if self.edges[e1].next_in_ael == self.edges[e1].prev_in_ael
            || self.edges[e2].next_in_ael == self.edges[e2].prev_in_ael
        {
            return;
        }

        if self.edges[e1].next_in_ael == e2 {
            self.swap_adjacent_in_ael(e1, e2);
        } else if self.edges[e2].next_in_ael == e1 {
            self.swap_adjacent_in_ael(e2, e1);
        } else {
            let next = self.edges[e1].next_in_ael;
            let prev = self.edges[e1].prev_in_ael;

            self.edges[e1].next_in_ael = self.edges[e2].next_in_ael;
            if self.edges[e1].next_in_ael != UNASSIGNED {
                let n = self.edges[e1].next_in_ael;
                self.edges[n].prev_in_ael = e1;
            }

            self.edges[e1].prev_in_ael = self.edges[e2].prev_in_ael;
            if self.edges[e1].prev_in_ael != UNASSIGNED {
                let p = self.edges[e1].prev_in_ael;
                self.edges[p].next_in_ael = e1;
            }

            self.edges[e2].next_in_ael = next;
            if next != UNASSIGNED {
                self.edges[next].prev_in_ael = e2;
            }

            self.edges[e2].prev_in_ael = prev;
            if prev != UNASSIGNED {
                self.edges[prev].next_in_ael = e2;
            }
        }

        if self.edges[e1].prev_in_ael == UNASSIGNED {
            self.active_edges = e1;
        } else if self.edges[e2].prev_in_ael == UNASSIGNED {
            self.active_edges = e2;
        }
    }

    /// Swaps `left` with the edge directly right of it.
    fn swap_adjacent_in_ael(&mut self, left: usize, right: usize) {
        let next = self.edges[right].next_in_ael;
        let prev = self.edges[left].prev_in_ael;

        if next != UNASSIGNED {
            self.edges[next].prev_in_ael = left;
        }
        if prev != UNASSIGNED {
            self.edges[prev].next_in_ael = right;
        }

        self.edges[right].prev_in_ael = prev;
        self.edges[right].next_in_ael = left;
        self.edges[left].prev_in_ael = right;
        self.edges[left].next_in_ael = next;
    }

    pub(crate) fn swap_positions_in_sel(&mut self, e1: usize, e2: usize) {
        if (self.edges[e1].next_in_sel == UNASSIGNED && self.edges[e1].prev_in_sel == UNASSIGNED)
            || (self.edges[e2].next_in_sel == UNASSIGNED && self.edges[e2].prev_in_sel == UNASSIGNED)
        {
            return;
        }

        if self.edges[e1].next_in_sel == e2 {
            self.swap_adjacent_in_sel(e1, e2);
        } else if self.edges[e2].next_in_sel == e1 {
            self.swap_adjacent_in_sel(e2, e1);
        } else {
            let next = self.edges[e1].next_in_sel;
            let prev = self.edges[e1].prev_in_sel;

            self.edges[e1].next_in_sel = self.edges[e2].next_in_sel;
            if self.edges[e1].next_in_sel != UNASSIGNED {
                let n = self.edges[e1].next_in_sel;
                self.edges[n].prev_in_sel = e1;
            }

            self.edges[e1].prev_in_sel = self.edges[e2].prev_in_sel;
            if self.edges[e1].prev_in_sel != UNASSIGNED {
                let p = self.edges[e1].prev_in_sel;
                self.edges[p].next_in_sel = e1;
            }

            self.edges[e2].next_in_sel = next;
            if next != UNASSIGNED {
                self.edges[next].prev_in_sel = e2;
            }

            self.edges[e2].prev_in_sel = prev;
            if prev != UNASSIGNED {
                self.edges[prev].next_in_sel = e2;
            }
        }

        if self.edges[e1].prev_in_sel == UNASSIGNED {
            self.sorted_edges = e1;
        } else if self.edges[e2].prev_in_sel == UNASSIGNED {
            self.sorted_edges = e2;
        }
    }

    fn swap_adjacent_in_sel(&mut self, left: usize, right: usize) {
        let next = self.edges[right].next_in_sel;
        let prev = self.edges[left].prev_in_sel;

        if next != UNASSIGNED {
            self.edges[next].prev_in_sel = left;
        }
        if prev != UNASSIGNED {
            self.edges[prev].next_in_sel = right;
        }

        self.edges[right].prev_in_sel = prev;
        self.edges[right].next_in_sel = left;
        self.edges[left].prev_in_sel = right;
        self.edges[left].next_in_sel = next;
    }

    /// Replaces `e` in the active list by the next edge of its bound.
    pub(crate) fn update_edge_into_ael(&mut self, e: usize) -> usize {
        let next = self.edges[e].next_in_lml;

        debug_assert!(next != UNASSIGNED, "edge has no successor in its bound");

        let prev_in_ael = self.edges[e].prev_in_ael;
        let next_in_ael = self.edges[e].next_in_ael;
        let source = self.edges[e].clone();

        if prev_in_ael != UNASSIGNED {
            self.edges[prev_in_ael].next_in_ael = next;
        } else {
            self.active_edges = next;
        }

        if next_in_ael != UNASSIGNED {
            self.edges[next_in_ael].prev_in_ael = next;
        }

        let edge = &mut self.edges[next];

        edge.out_idx = source.out_idx;
        edge.side = source.side;
        edge.wind_delta = source.wind_delta;
        edge.wind_cnt = source.wind_cnt;
        edge.wind_cnt2 = source.wind_cnt2;
        edge.prev_in_ael = prev_in_ael;
        edge.next_in_ael = next_in_ael;
        edge.curr = edge.bot;

        if !edge.is_horizontal() {
            let top_y = edge.top.y;
            self.scanbeam.insert(top_y);
        }

        next
    }
}

use crate::allocator::{MemoryManager, Pool};
use crate::clipper::constants::UNASSIGNED;
use crate::clipper::enums::{ClipType, EdgeSide, EndType, JoinType, PolyFillType, PolyType};
use crate::clipper::intersect_node::{fixup_intersection_order, EdgeOrder, IntersectNode};
use crate::clipper::join::Join;
use crate::clipper::local_minima::MinimaList;
use crate::clipper::out_pt::{point_count, reverse_links, OutPt};
use crate::clipper::out_rec::OutPolygons;
use crate::clipper::poly_tree::PolyTree;
use crate::clipper::scanbeam::Scanbeam;
use crate::clipper::t_edge::{
    edge_slopes_equal, get_maxima_pair, get_maxima_pair_ex, horz_segments_overlap, intersect_point,
    segments_slopes_equal, TEdge,
};
use crate::clipper_config::ClipperConfig;
use crate::error::ClipperError;
use crate::geometry::point::{IntPoint, Paths};

/// Fills in `z` of an intersection point from the two edges that produced it:
/// `(e1.bot, e1.top, e2.bot, e2.top, pt)`.
#[cfg(feature = "xyz")]
pub type ZFillCallback = fn(&IntPoint, &IntPoint, &IntPoint, &IntPoint, &mut IntPoint);

/// Sweep-line clipping engine.
///
/// Every structure the engine creates is charged to the borrowed
/// [`MemoryManager`], so results handed out by reference (see
/// [`Clipper::execute_tree`]) cannot outlive the next `clear` or `execute`.
pub struct Clipper<'m> {
    pub(crate) manager: &'m mut dyn MemoryManager,
    pub(crate) config: ClipperConfig,
    pub(crate) edges: Pool<TEdge>,
    pub(crate) minima: MinimaList,
    pub(crate) scanbeam: Scanbeam,
    pub(crate) active_edges: usize,
    pub(crate) sorted_edges: usize,
    pub(crate) out: OutPolygons,
    pub(crate) joins: Pool<Join>,
    pub(crate) ghost_joins: Pool<Join>,
    pub(crate) intersections: Pool<IntersectNode>,
    pub(crate) maxima: Vec<i64>,
    pub(crate) poly_tree: PolyTree,
    pub(crate) clip_type: ClipType,
    pub(crate) subj_fill_type: PolyFillType,
    pub(crate) clip_fill_type: PolyFillType,
    pub(crate) use_full_range: bool,
    pub(crate) has_open_paths: bool,
    pub(crate) using_poly_tree: bool,
    pub(crate) is_execute_locked: bool,
    #[cfg(feature = "xyz")]
    pub(crate) z_fill: Option<ZFillCallback>,
}

impl<'m> Clipper<'m> {
    pub fn new(manager: &'m mut dyn MemoryManager, config: ClipperConfig) -> Self {
        Self {
            manager,
            config,
            edges: Pool::new(),
            minima: MinimaList::new(),
            scanbeam: Scanbeam::new(),
            active_edges: UNASSIGNED,
            sorted_edges: UNASSIGNED,
            out: OutPolygons::new(),
            joins: Pool::new(),
            ghost_joins: Pool::new(),
            intersections: Pool::new(),
            maxima: Vec::new(),
            poly_tree: PolyTree::new(),
            clip_type: ClipType::Intersection,
            subj_fill_type: PolyFillType::EvenOdd,
            clip_fill_type: PolyFillType::EvenOdd,
            use_full_range: false,
            has_open_paths: false,
            using_poly_tree: false,
            is_execute_locked: false,
            #[cfg(feature = "xyz")]
            z_fill: None,
        }
    }

    pub fn config(&self) -> ClipperConfig {
        self.config
    }

    pub fn set_config(&mut self, config: ClipperConfig) {
        self.config = config;
    }

    #[cfg(feature = "xyz")]
    pub fn set_z_fill(&mut self, z_fill: Option<ZFillCallback>) {
        self.z_fill = z_fill;
    }

    pub fn is_execute_locked(&self) -> bool {
        self.is_execute_locked
    }

    pub fn has_open_paths(&self) -> bool {
        self.has_open_paths
    }

    pub fn memory_manager(&self) -> &dyn MemoryManager {
        &*self.manager
    }

    /// Last tree built by [`Clipper::execute_tree`].
    pub fn poly_tree(&self) -> &PolyTree {
        &self.poly_tree
    }

    pub fn execute(&mut self, clip_type: ClipType, fill_type: PolyFillType) -> Result<Paths, ClipperError> {
        self.execute_with(clip_type, fill_type, fill_type)
    }

    /// Runs the sweep and copies the closed and open contours out.
    pub fn execute_with(
        &mut self,
        clip_type: ClipType,
        subj_fill_type: PolyFillType,
        clip_fill_type: PolyFillType,
    ) -> Result<Paths, ClipperError> {
        self.begin_execute(clip_type, subj_fill_type, clip_fill_type, false)?;

        let result = match self.execute_internal() {
            Ok(()) => Ok(self.out.build_result()),
            Err(err) => Err(err),
        };

        self.end_execute(&result);

        result
    }

    pub fn execute_tree(&mut self, clip_type: ClipType, fill_type: PolyFillType) -> Result<&PolyTree, ClipperError> {
        self.execute_tree_with(clip_type, fill_type, fill_type)
    }

    /// Runs the sweep and nests the result. The tree stays valid until the
    /// engine is cleared or executed again.
    pub fn execute_tree_with(
        &mut self,
        clip_type: ClipType,
        subj_fill_type: PolyFillType,
        clip_fill_type: PolyFillType,
    ) -> Result<&PolyTree, ClipperError> {
        self.begin_execute(clip_type, subj_fill_type, clip_fill_type, true)?;

        let result = self.execute_internal().and_then(|_| self.build_tree());

        if result.is_err() {
            self.poly_tree.clear(&mut *self.manager);
        }

        self.end_execute(&result);

        result.map(|_| &self.poly_tree)
    }

    fn begin_execute(
        &mut self,
        clip_type: ClipType,
        subj_fill_type: PolyFillType,
        clip_fill_type: PolyFillType,
        using_poly_tree: bool,
    ) -> Result<(), ClipperError> {
        if self.is_execute_locked {
            return Err(ClipperError::ExecuteLocked);
        }

        self.is_execute_locked = true;
        self.clip_type = clip_type;
        self.subj_fill_type = subj_fill_type;
        self.clip_fill_type = clip_fill_type;
        self.using_poly_tree = using_poly_tree;

        if using_poly_tree {
            self.poly_tree.clear(&mut *self.manager);
        }

        Ok(())
    }

    fn end_execute<T>(&mut self, result: &Result<T, ClipperError>) {
        match result {
            Ok(_) => log::debug!(
                "{:?} finished: {} edges, {} output records",
                self.clip_type,
                self.edges.len(),
                self.out.len()
            ),
            Err(err) => log::error!("{:?} aborted: {}", self.clip_type, err),
        }

        self.out.clear(&mut *self.manager);
        self.joins.clear(&mut *self.manager);
        self.ghost_joins.clear(&mut *self.manager);
        self.intersections.clear(&mut *self.manager);
        self.maxima.clear();
        self.is_execute_locked = false;
    }

    fn execute_internal(&mut self) -> Result<(), ClipperError> {
        self.reset();
        self.maxima.clear();
        self.sorted_edges = UNASSIGNED;

        let bot_y = match self.scanbeam.pop() {
            Some(y) => y,
            None => return Ok(()),
        };

        self.insert_local_minima_into_ael(bot_y)?;

        while let Some(top_y) = self.scanbeam.pop() {
            self.process_horizontals()?;
            self.ghost_joins.clear(&mut *self.manager);
            self.process_intersections(top_y)?;
            self.process_edges_at_top_of_scanbeam(top_y)?;
            self.insert_local_minima_into_ael(top_y)?;
        }

        self.out.fix_orientations(self.config.reverse_solution);

        if !self.joins.is_empty() {
            self.join_common_edges()?;
        }

        let preserve_collinear = self.config.preserve_collinear || self.config.strictly_simple;

        for rec in self.out.recs.indices() {
            if self.out.recs[rec].pts == UNASSIGNED {
                continue;
            }

            if self.out.recs[rec].is_open {
                self.out.fixup_out_polyline(rec);
            } else {
                self.out.fixup_out_polygon(rec, preserve_collinear, self.use_full_range);
            }
        }

        if self.config.strictly_simple {
            self.out.do_simple_polygons(&mut *self.manager, self.using_poly_tree)?;
        }

        Ok(())
    }

    fn fill_types(&self, poly_typ: PolyType) -> (PolyFillType, PolyFillType) {
        match poly_typ {
            PolyType::Subject => (self.subj_fill_type, self.clip_fill_type),
            PolyType::Clip => (self.clip_fill_type, self.subj_fill_type),
        }
    }

    fn is_even_odd_fill_type(&self, edge: usize) -> bool {
        self.fill_types(self.edges[edge].poly_typ).0 == PolyFillType::EvenOdd
    }

    fn is_even_odd_alt_fill_type(&self, edge: usize) -> bool {
        self.fill_types(self.edges[edge].poly_typ).1 == PolyFillType::EvenOdd
    }

    fn insert_local_minima_into_ael(&mut self, bot_y: i64) -> Result<(), ClipperError> {
        let full = self.use_full_range;

        while let Some(minimum) = self.minima.pop(bot_y) {
            let lb = minimum.left_bound;
            let rb = minimum.right_bound;
            let mut op1 = UNASSIGNED;

            if lb == UNASSIGNED {
                self.insert_edge_into_ael(rb, UNASSIGNED);
                self.set_winding_count(rb);

                if self.is_contributing(rb) {
                    op1 = self.add_out_pt(rb, self.edges[rb].bot)?;
                }
            } else if rb == UNASSIGNED {
                self.insert_edge_into_ael(lb, UNASSIGNED);
                self.set_winding_count(lb);

                if self.is_contributing(lb) {
                    op1 = self.add_out_pt(lb, self.edges[lb].bot)?;
                }

                self.scanbeam.insert(self.edges[lb].top.y);
            } else {
                self.insert_edge_into_ael(lb, UNASSIGNED);
                self.insert_edge_into_ael(rb, lb);
                self.set_winding_count(lb);
                self.edges[rb].wind_cnt = self.edges[lb].wind_cnt;
                self.edges[rb].wind_cnt2 = self.edges[lb].wind_cnt2;

                if self.is_contributing(lb) {
                    op1 = self.add_local_min_poly(lb, rb, self.edges[lb].bot)?;
                }

                self.scanbeam.insert(self.edges[lb].top.y);
            }

            if rb != UNASSIGNED {
                if self.edges[rb].is_horizontal() {
                    self.add_edge_to_sel(rb);

                    let next_in_lml = self.edges[rb].next_in_lml;

                    if next_in_lml != UNASSIGNED {
                        self.scanbeam.insert(self.edges[next_in_lml].top.y);
                    }
                } else {
                    self.scanbeam.insert(self.edges[rb].top.y);
                }
            }

            if lb == UNASSIGNED || rb == UNASSIGNED {
                continue;
            }

            // a horizontal right bound may close against horizontals that
            // already left the active list in this scanbeam
            if op1 != UNASSIGNED
                && self.edges[rb].is_horizontal()
                && !self.ghost_joins.is_empty()
                && self.edges[rb].wind_delta != 0
            {
                for i in self.ghost_joins.indices() {
                    let ghost = self.ghost_joins[i];

                    if horz_segments_overlap(
                        self.out.pts[ghost.out_pt1].pt.x,
                        ghost.off_pt.x,
                        self.edges[rb].bot.x,
                        self.edges[rb].top.x,
                    ) {
                        self.add_join(ghost.out_pt1, op1, ghost.off_pt)?;
                    }
                }
            }

            let lb_prev = self.edges[lb].prev_in_ael;

            if self.edges[lb].is_assigned() && lb_prev != UNASSIGNED {
                let (lbe, prev) = (&self.edges[lb], &self.edges[lb_prev]);

                if prev.curr.x == lbe.bot.x
                    && prev.is_assigned()
                    && segments_slopes_equal(&prev.bot, &prev.top, &lbe.curr, &lbe.top, full)
                    && lbe.wind_delta != 0
                    && prev.wind_delta != 0
                {
                    let (bot, top) = (lbe.bot, lbe.top);
                    let op2 = self.add_out_pt(lb_prev, bot)?;
                    self.add_join(op1, op2, top)?;
                }
            }

            if self.edges[lb].next_in_ael != rb {
                let rb_prev = self.edges[rb].prev_in_ael;

                if rb_prev != UNASSIGNED {
                    let (rbe, prev) = (&self.edges[rb], &self.edges[rb_prev]);

                    if rbe.is_assigned()
                        && prev.is_assigned()
                        && segments_slopes_equal(&prev.curr, &prev.top, &rbe.curr, &rbe.top, full)
                        && rbe.wind_delta != 0
                        && prev.wind_delta != 0
                    {
                        let (bot, top) = (rbe.bot, rbe.top);
                        let op2 = self.add_out_pt(rb_prev, bot)?;
                        self.add_join(op1, op2, top)?;
                    }
                }

                let mut e = self.edges[lb].next_in_ael;

                while e != UNASSIGNED && e != rb {
                    // the left bound only matters for its position here
                    let pt = self.edges[lb].curr;
                    self.intersect_edges(rb, e, pt)?;
                    e = self.edges[e].next_in_ael;
                }
            }
        }

        Ok(())
    }

    fn set_winding_count(&mut self, edge: usize) {
        let poly_typ = self.edges[edge].poly_typ;
        let wind_delta = self.edges[edge].wind_delta;
        let mut e = self.edges[edge].prev_in_ael;

        // nearest edge of the same polytype that is not an open path
        while e != UNASSIGNED && (self.edges[e].poly_typ != poly_typ || self.edges[e].wind_delta == 0) {
            e = self.edges[e].prev_in_ael;
        }

        if e == UNASSIGNED {
            let fill_type = self.fill_types(poly_typ).0;

            self.edges[edge].wind_cnt = if wind_delta != 0 {
                wind_delta
            } else if fill_type == PolyFillType::Negative {
                -1
            } else {
                1
            };
            self.edges[edge].wind_cnt2 = 0;
            e = self.active_edges;
        } else if wind_delta == 0 && self.clip_type != ClipType::Union {
            self.edges[edge].wind_cnt = 1;
            self.edges[edge].wind_cnt2 = self.edges[e].wind_cnt2;
            e = self.edges[e].next_in_ael;
        } else if self.is_even_odd_fill_type(edge) {
            if wind_delta == 0 {
                // open paths are inside when an odd number of closed edges lie to the left
                let mut inside = true;
                let mut e2 = self.edges[e].prev_in_ael;

                while e2 != UNASSIGNED {
                    if self.edges[e2].poly_typ == self.edges[e].poly_typ && self.edges[e2].wind_delta != 0 {
                        inside = !inside;
                    }
                    e2 = self.edges[e2].prev_in_ael;
                }

                self.edges[edge].wind_cnt = if inside { 0 } else { 1 };
            } else {
                self.edges[edge].wind_cnt = wind_delta;
            }

            self.edges[edge].wind_cnt2 = self.edges[e].wind_cnt2;
            e = self.edges[e].next_in_ael;
        } else {
            let prev_cnt = self.edges[e].wind_cnt;
            let prev_delta = self.edges[e].wind_delta;

            self.edges[edge].wind_cnt = if prev_cnt * prev_delta < 0 {
                // the previous edge is decreasing the winding count toward zero
                if prev_cnt.abs() > 1 {
                    if prev_delta * wind_delta < 0 {
                        prev_cnt
                    } else {
                        prev_cnt + wind_delta
                    }
                } else if wind_delta == 0 {
                    1
                } else {
                    wind_delta
                }
            } else if wind_delta == 0 {
                if prev_cnt < 0 {
                    prev_cnt - 1
                } else {
                    prev_cnt + 1
                }
            } else if prev_delta * wind_delta < 0 {
                prev_cnt
            } else {
                prev_cnt + wind_delta
            };

            self.edges[edge].wind_cnt2 = self.edges[e].wind_cnt2;
            e = self.edges[e].next_in_ael;
        }

        if self.is_even_odd_alt_fill_type(edge) {
            while e != edge {
                if self.edges[e].wind_delta != 0 {
                    let cnt2 = self.edges[edge].wind_cnt2;
                    self.edges[edge].wind_cnt2 = if cnt2 == 0 { 1 } else { 0 };
                }
                e = self.edges[e].next_in_ael;
            }
        } else {
            while e != edge {
                self.edges[edge].wind_cnt2 += self.edges[e].wind_delta;
                e = self.edges[e].next_in_ael;
            }
        }
    }

    fn is_contributing(&self, edge: usize) -> bool {
        let e = &self.edges[edge];
        let (fill_type, alt_fill_type) = self.fill_types(e.poly_typ);

        let own_inside = match fill_type {
            PolyFillType::EvenOdd => e.wind_delta != 0 || e.wind_cnt == 1,
            PolyFillType::NonZero => e.wind_cnt.abs() == 1,
            PolyFillType::Positive => e.wind_cnt == 1,
            PolyFillType::Negative => e.wind_cnt == -1,
        };

        if !own_inside {
            return false;
        }

        let inside_other = || match alt_fill_type {
            PolyFillType::EvenOdd | PolyFillType::NonZero => e.wind_cnt2 != 0,
            PolyFillType::Positive => e.wind_cnt2 > 0,
            PolyFillType::Negative => e.wind_cnt2 < 0,
        };

        let outside_other = || match alt_fill_type {
            PolyFillType::EvenOdd | PolyFillType::NonZero => e.wind_cnt2 == 0,
            PolyFillType::Positive => e.wind_cnt2 <= 0,
            PolyFillType::Negative => e.wind_cnt2 >= 0,
        };

        match self.clip_type {
            ClipType::Intersection => inside_other(),
            ClipType::Union => outside_other(),
            ClipType::Difference => {
                if e.poly_typ == PolyType::Subject {
                    outside_other()
                } else {
                    inside_other()
                }
            }
            ClipType::Xor => e.wind_delta != 0 || outside_other(),
        }
    }

    fn add_local_min_poly(&mut self, e1: usize, e2: usize, pt: IntPoint) -> Result<usize, ClipperError> {
        let result;
        let e;
        let prev_e;

        if self.edges[e2].is_horizontal() || self.edges[e1].dx > self.edges[e2].dx {
            result = self.add_out_pt(e1, pt)?;
            self.edges[e2].out_idx = self.edges[e1].out_idx;
            self.edges[e1].side = EdgeSide::Left;
            self.edges[e2].side = EdgeSide::Right;
            e = e1;
            prev_e = if self.edges[e].prev_in_ael == e2 {
                self.edges[e2].prev_in_ael
            } else {
                self.edges[e].prev_in_ael
            };
        } else {
            result = self.add_out_pt(e2, pt)?;
            self.edges[e1].out_idx = self.edges[e2].out_idx;
            self.edges[e1].side = EdgeSide::Right;
            self.edges[e2].side = EdgeSide::Left;
            e = e2;
            prev_e = if self.edges[e].prev_in_ael == e1 {
                self.edges[e1].prev_in_ael
            } else {
                self.edges[e].prev_in_ael
            };
        }

        if prev_e != UNASSIGNED {
            let (edge, prev) = (&self.edges[e], &self.edges[prev_e]);

            if prev.is_assigned() && prev.top.y < pt.y && edge.top.y < pt.y {
                let x_prev = prev.top_x(pt.y);
                let x_e = edge.top_x(pt.y);

                if x_prev == x_e
                    && edge.wind_delta != 0
                    && prev.wind_delta != 0
                    && segments_slopes_equal(
                        &IntPoint::new(x_prev, pt.y),
                        &prev.top,
                        &IntPoint::new(x_e, pt.y),
                        &edge.top,
                        self.use_full_range,
                    )
                {
                    let top = edge.top;
                    let out_pt = self.add_out_pt(prev_e, pt)?;
                    self.add_join(result, out_pt, top)?;
                }
            }
        }

        Ok(result)
    }

    fn add_local_max_poly(&mut self, e1: usize, e2: usize, pt: IntPoint) -> Result<(), ClipperError> {
        self.add_out_pt(e1, pt)?;

        if self.edges[e2].wind_delta == 0 {
            self.add_out_pt(e2, pt)?;
        }

        let out_idx1 = self.edges[e1].out_idx;
        let out_idx2 = self.edges[e2].out_idx;

        if out_idx1 == out_idx2 {
            self.edges[e1].out_idx = UNASSIGNED;
            self.edges[e2].out_idx = UNASSIGNED;
        } else if out_idx1 < out_idx2 {
            self.append_polygon(e1, e2);
        } else {
            self.append_polygon(e2, e1);
        }

        Ok(())
    }

    /// Merges the ring of `e2` into the ring of `e1` where the two meet at a maximum.
    fn append_polygon(&mut self, e1: usize, e2: usize) {
        let out_rec1 = self.edges[e1].out_idx;
        let out_rec2 = self.edges[e2].out_idx;

        let hole_state_rec = if self.out.out_rec1_right_of_out_rec2(out_rec1, out_rec2) {
            out_rec2
        } else if self.out.out_rec1_right_of_out_rec2(out_rec2, out_rec1) {
            out_rec1
        } else {
            self.out.get_lowermost_rec(out_rec1, out_rec2)
        };

        let pts = &mut self.out.pts;
        let recs = &mut self.out.recs;
        let p1_lft = recs[out_rec1].pts;
        let p1_rt = pts[p1_lft].prev;
        let p2_lft = recs[out_rec2].pts;
        let p2_rt = pts[p2_lft].prev;
        let e1_side = self.edges[e1].side;
        let e2_side = self.edges[e2].side;

        match (e1_side, e2_side) {
            (EdgeSide::Left, EdgeSide::Left) => {
                // z y x a b c
                reverse_links(pts, p2_lft);
                pts[p2_lft].next = p1_lft;
                pts[p1_lft].prev = p2_lft;
                pts[p1_rt].next = p2_rt;
                pts[p2_rt].prev = p1_rt;
                recs[out_rec1].pts = p2_rt;
            }
            (EdgeSide::Left, EdgeSide::Right) => {
                // x y z a b c
                pts[p2_rt].next = p1_lft;
                pts[p1_lft].prev = p2_rt;
                pts[p2_lft].prev = p1_rt;
                pts[p1_rt].next = p2_lft;
                recs[out_rec1].pts = p2_lft;
            }
            (EdgeSide::Right, EdgeSide::Right) => {
                // a b c z y x
                reverse_links(pts, p2_lft);
                pts[p1_rt].next = p2_rt;
                pts[p2_rt].prev = p1_rt;
                pts[p2_lft].next = p1_lft;
                pts[p1_lft].prev = p2_lft;
            }
            (EdgeSide::Right, EdgeSide::Left) => {
                // a b c x y z
                pts[p1_rt].next = p2_lft;
                pts[p2_lft].prev = p1_rt;
                pts[p1_lft].prev = p2_rt;
                pts[p2_rt].next = p1_lft;
            }
        }

        recs[out_rec1].bottom_pt = UNASSIGNED;

        if hole_state_rec == out_rec2 {
            if recs[out_rec2].first_left != out_rec1 {
                recs[out_rec1].first_left = recs[out_rec2].first_left;
            }
            recs[out_rec1].is_hole = recs[out_rec2].is_hole;
        }

        recs[out_rec2].pts = UNASSIGNED;
        recs[out_rec2].bottom_pt = UNASSIGNED;
        recs[out_rec2].first_left = out_rec1;

        let ok_idx = self.edges[e1].out_idx;
        let obsolete_idx = self.edges[e2].out_idx;

        self.edges[e1].out_idx = UNASSIGNED;
        self.edges[e2].out_idx = UNASSIGNED;

        let mut e = self.active_edges;

        while e != UNASSIGNED {
            if self.edges[e].out_idx == obsolete_idx {
                self.edges[e].out_idx = ok_idx;
                self.edges[e].side = e1_side;
                break;
            }
            e = self.edges[e].next_in_ael;
        }

        recs[out_rec2].idx = recs[out_rec1].idx;
    }

    fn add_out_pt(&mut self, e: usize, pt: IntPoint) -> Result<usize, ClipperError> {
        if !self.edges[e].is_assigned() {
            let rec = self.out.create(&mut *self.manager)?;
            let is_open = self.edges[e].wind_delta == 0;
            let op = self.out.pts.alloc(&mut *self.manager, OutPt::new(rec, pt))?;

            self.out.pts[op].next = op;
            self.out.pts[op].prev = op;
            self.out.recs[rec].is_open = is_open;
            self.out.recs[rec].pts = op;

            if !is_open {
                self.set_hole_state(e, rec);
            }

            self.edges[e].out_idx = rec;

            return Ok(op);
        }

        let rec = self.edges[e].out_idx;
        let op = self.out.recs[rec].pts;
        let op_prev = self.out.pts[op].prev;
        let to_front = self.edges[e].side == EdgeSide::Left;

        if to_front && pt == self.out.pts[op].pt {
            return Ok(op);
        }

        if !to_front && pt == self.out.pts[op_prev].pt {
            return Ok(op_prev);
        }

        let new_op = self.out.pts.alloc(&mut *self.manager, OutPt::new(rec, pt))?;

        self.out.pts[new_op].next = op;
        self.out.pts[new_op].prev = op_prev;
        self.out.pts[op_prev].next = new_op;
        self.out.pts[op].prev = new_op;

        if to_front {
            self.out.recs[rec].pts = new_op;
        }

        Ok(new_op)
    }

    fn get_last_out_pt(&self, e: usize) -> usize {
        let rec = &self.out.recs[self.edges[e].out_idx];

        if self.edges[e].side == EdgeSide::Left {
            rec.pts
        } else {
            self.out.pts[rec.pts].prev
        }
    }

    fn set_hole_state(&mut self, e: usize, rec: usize) {
        let mut e2 = self.edges[e].prev_in_ael;
        let mut e_tmp = UNASSIGNED;

        while e2 != UNASSIGNED {
            if self.edges[e2].is_assigned() && self.edges[e2].wind_delta != 0 {
                if e_tmp == UNASSIGNED {
                    e_tmp = e2;
                } else if self.edges[e_tmp].out_idx == self.edges[e2].out_idx {
                    e_tmp = UNASSIGNED;
                }
            }
            e2 = self.edges[e2].prev_in_ael;
        }

        if e_tmp == UNASSIGNED {
            self.out.recs[rec].first_left = UNASSIGNED;
            self.out.recs[rec].is_hole = false;
        } else {
            let first_left = self.edges[e_tmp].out_idx;
            self.out.recs[rec].first_left = first_left;
            self.out.recs[rec].is_hole = !self.out.recs[first_left].is_hole;
        }
    }

    fn add_join(&mut self, out_pt1: usize, out_pt2: usize, off_pt: IntPoint) -> Result<(), ClipperError> {
        self.joins.alloc(&mut *self.manager, Join::new(out_pt1, out_pt2, off_pt))?;

        Ok(())
    }

    fn add_ghost_join(&mut self, out_pt: usize, off_pt: IntPoint) -> Result<(), ClipperError> {
        self.ghost_joins.alloc(&mut *self.manager, Join::ghost(out_pt, off_pt))?;

        Ok(())
    }

    #[cfg(feature = "xyz")]
    fn set_z(&self, pt: &mut IntPoint, e1: usize, e2: usize) {
        let z_fill = match self.z_fill {
            Some(z_fill) if pt.z == 0 => z_fill,
            _ => return,
        };

        let (e1, e2) = (&self.edges[e1], &self.edges[e2]);

        if *pt == e1.bot {
            pt.z = e1.bot.z;
        } else if *pt == e1.top {
            pt.z = e1.top.z;
        } else if *pt == e2.bot {
            pt.z = e2.bot.z;
        } else if *pt == e2.top {
            pt.z = e2.top.z;
        } else {
            z_fill(&e1.bot, &e1.top, &e2.bot, &e2.top, pt);
        }
    }

    fn swap_sides(&mut self, e1: usize, e2: usize) {
        let side = self.edges[e1].side;
        self.edges[e1].side = self.edges[e2].side;
        self.edges[e2].side = side;
    }

    fn swap_poly_indexes(&mut self, e1: usize, e2: usize) {
        let out_idx = self.edges[e1].out_idx;
        self.edges[e1].out_idx = self.edges[e2].out_idx;
        self.edges[e2].out_idx = out_idx;
    }

    fn intersect_edges(&mut self, e1: usize, e2: usize, pt: IntPoint) -> Result<(), ClipperError> {
        #[cfg(feature = "xyz")]
        let pt = {
            let mut pt = pt;
            self.set_z(&mut pt, e1, e2);
            pt
        };

        let e1_contributing = self.edges[e1].is_assigned();
        let e2_contributing = self.edges[e2].is_assigned();
        let e1_delta = self.edges[e1].wind_delta;
        let e2_delta = self.edges[e2].wind_delta;

        if e1_delta == 0 || e2_delta == 0 {
            // at least one open path; two open paths never interact
            if e1_delta == 0 && e2_delta == 0 {
                return Ok(());
            }

            let same_type = self.edges[e1].poly_typ == self.edges[e2].poly_typ;

            if same_type && e1_delta != e2_delta && self.clip_type == ClipType::Union {
                if e1_delta == 0 {
                    if e2_contributing {
                        self.add_out_pt(e1, pt)?;
                        if e1_contributing {
                            self.edges[e1].out_idx = UNASSIGNED;
                        }
                    }
                } else if e1_contributing {
                    self.add_out_pt(e2, pt)?;
                    if e2_contributing {
                        self.edges[e2].out_idx = UNASSIGNED;
                    }
                }
            } else if !same_type {
                let union = self.clip_type == ClipType::Union;

                if e1_delta == 0
                    && self.edges[e2].wind_cnt.abs() == 1
                    && (!union || self.edges[e2].wind_cnt2 == 0)
                {
                    self.add_out_pt(e1, pt)?;
                    if e1_contributing {
                        self.edges[e1].out_idx = UNASSIGNED;
                    }
                } else if e2_delta == 0
                    && self.edges[e1].wind_cnt.abs() == 1
                    && (!union || self.edges[e1].wind_cnt2 == 0)
                {
                    self.add_out_pt(e2, pt)?;
                    if e2_contributing {
                        self.edges[e2].out_idx = UNASSIGNED;
                    }
                }
            }

            return Ok(());
        }

        // e1 sits right of e2 below the intersection
        if self.edges[e1].poly_typ == self.edges[e2].poly_typ {
            if self.is_even_odd_fill_type(e1) {
                let cnt = self.edges[e1].wind_cnt;
                self.edges[e1].wind_cnt = self.edges[e2].wind_cnt;
                self.edges[e2].wind_cnt = cnt;
            } else {
                let cnt1 = self.edges[e1].wind_cnt;
                self.edges[e1].wind_cnt = if cnt1 + e2_delta == 0 { -cnt1 } else { cnt1 + e2_delta };

                let cnt2 = self.edges[e2].wind_cnt;
                self.edges[e2].wind_cnt = if cnt2 - e1_delta == 0 { -cnt2 } else { cnt2 - e1_delta };
            }
        } else {
            if !self.is_even_odd_fill_type(e2) {
                self.edges[e1].wind_cnt2 += e2_delta;
            } else {
                self.edges[e1].wind_cnt2 = if self.edges[e1].wind_cnt2 == 0 { 1 } else { 0 };
            }

            if !self.is_even_odd_fill_type(e1) {
                self.edges[e2].wind_cnt2 -= e1_delta;
            } else {
                self.edges[e2].wind_cnt2 = if self.edges[e2].wind_cnt2 == 0 { 1 } else { 0 };
            }
        }

        let (e1_fill, e1_fill2) = self.fill_types(self.edges[e1].poly_typ);
        let (e2_fill, e2_fill2) = self.fill_types(self.edges[e2].poly_typ);

        let signed_count = |fill: PolyFillType, cnt: i32| match fill {
            PolyFillType::Positive => cnt,
            PolyFillType::Negative => -cnt,
            _ => cnt.abs(),
        };

        let e1_wc = signed_count(e1_fill, self.edges[e1].wind_cnt);
        let e2_wc = signed_count(e2_fill, self.edges[e2].wind_cnt);
        let unit = |wc: i32| wc == 0 || wc == 1;

        if e1_contributing && e2_contributing {
            if !unit(e1_wc)
                || !unit(e2_wc)
                || (self.edges[e1].poly_typ != self.edges[e2].poly_typ && self.clip_type != ClipType::Xor)
            {
                self.add_local_max_poly(e1, e2, pt)?;
            } else {
                self.add_out_pt(e1, pt)?;
                self.add_out_pt(e2, pt)?;
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if e1_contributing {
            if unit(e2_wc) {
                self.add_out_pt(e1, pt)?;
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if e2_contributing {
            if unit(e1_wc) {
                self.add_out_pt(e2, pt)?;
                self.swap_sides(e1, e2);
                self.swap_poly_indexes(e1, e2);
            }
        } else if unit(e1_wc) && unit(e2_wc) {
            // neither edge is currently contributing
            let e1_wc2 = signed_count(e1_fill2, self.edges[e1].wind_cnt2);
            let e2_wc2 = signed_count(e2_fill2, self.edges[e2].wind_cnt2);
            let e1_typ = self.edges[e1].poly_typ;

            if e1_typ != self.edges[e2].poly_typ {
                self.add_local_min_poly(e1, e2, pt)?;
            } else if e1_wc == 1 && e2_wc == 1 {
                let starts_polygon = match self.clip_type {
                    ClipType::Intersection => e1_wc2 > 0 && e2_wc2 > 0,
                    ClipType::Union => e1_wc2 <= 0 && e2_wc2 <= 0,
                    ClipType::Difference => {
                        (e1_typ == PolyType::Clip && e1_wc2 > 0 && e2_wc2 > 0)
                            || (e1_typ == PolyType::Subject && e1_wc2 <= 0 && e2_wc2 <= 0)
                    }
                    ClipType::Xor => true,
                };

                if starts_polygon {
                    self.add_local_min_poly(e1, e2, pt)?;
                }
            } else {
                self.swap_sides(e1, e2);
            }
        }

        Ok(())
    }

    fn process_horizontals(&mut self) -> Result<(), ClipperError> {
        while self.sorted_edges != UNASSIGNED {
            let horz_edge = self.sorted_edges;
            self.delete_from_sel(horz_edge);
            self.process_horizontal(horz_edge)?;
        }

        Ok(())
    }

    fn next_in_ael_towards(&self, e: usize, left_to_right: bool) -> usize {
        if left_to_right {
            self.edges[e].next_in_ael
        } else {
            self.edges[e].prev_in_ael
        }
    }

    /// Joins `op` to every pending horizontal in the SEL that overlaps `horz_edge`.
    fn join_overlapping_horizontals(&mut self, horz_edge: usize, op: usize) -> Result<(), ClipperError> {
        let mut e = self.sorted_edges;

        while e != UNASSIGNED {
            let (horz, other) = (&self.edges[horz_edge], &self.edges[e]);

            if other.is_assigned() && horz_segments_overlap(horz.bot.x, horz.top.x, other.bot.x, other.top.x) {
                let top = other.top;
                let op2 = self.get_last_out_pt(e);
                self.add_join(op2, op, top)?;
            }

            e = self.edges[e].next_in_sel;
        }

        Ok(())
    }

    /// Sweeps one horizontal edge (and the horizontals that continue its
    /// bound) across the active list, intersecting every edge it passes.
    fn process_horizontal(&mut self, mut horz_edge: usize) -> Result<(), ClipperError> {
        let is_open = self.edges[horz_edge].wind_delta == 0;
        let (mut horz_left, mut horz_right, mut left_to_right) = self.edges[horz_edge].horz_direction();

        let mut e_last_horz = horz_edge;
        let mut e_max_pair = UNASSIGNED;

        loop {
            let next = self.edges[e_last_horz].next_in_lml;
            if next == UNASSIGNED || !self.edges[next].is_horizontal() {
                break;
            }
            e_last_horz = next;
        }

        if self.edges[e_last_horz].next_in_lml == UNASSIGNED {
            e_max_pair = get_maxima_pair(&self.edges, e_last_horz);
        }

        // maxima already passed on this scanline become vertices of a
        // strictly simple horizontal
        let maxima_count = self.maxima.len();
        let mut max_fwd = 0usize;
        let mut max_back = 0usize;
        let back_value = |maxima: &[i64], back: usize| maxima[maxima.len() - 1 - back];

        if maxima_count > 0 {
            let bot_x = self.edges[horz_edge].bot.x;
            let last_top_x = self.edges[e_last_horz].top.x;

            if left_to_right {
                while max_fwd < maxima_count && self.maxima[max_fwd] <= bot_x {
                    max_fwd += 1;
                }
                if max_fwd < maxima_count && self.maxima[max_fwd] >= last_top_x {
                    max_fwd = maxima_count;
                }
            } else {
                while max_back < maxima_count && back_value(&self.maxima, max_back) > bot_x {
                    max_back += 1;
                }
                if max_back < maxima_count && back_value(&self.maxima, max_back) <= last_top_x {
                    max_back = maxima_count;
                }
            }
        }

        let mut op1 = UNASSIGNED;

        loop {
            let is_last_horz = horz_edge == e_last_horz;
            let mut e = self.next_in_ael_towards(horz_edge, left_to_right);

            while e != UNASSIGNED {
                if maxima_count > 0 {
                    let curr_x = self.edges[e].curr.x;
                    let horz_y = self.edges[horz_edge].bot.y;
                    let emits = self.edges[horz_edge].is_assigned() && !is_open;

                    if left_to_right {
                        while max_fwd < maxima_count && self.maxima[max_fwd] < curr_x {
                            if emits {
                                self.add_out_pt(horz_edge, IntPoint::new(self.maxima[max_fwd], horz_y))?;
                            }
                            max_fwd += 1;
                        }
                    } else {
                        while max_back < maxima_count && back_value(&self.maxima, max_back) > curr_x {
                            if emits {
                                let x = back_value(&self.maxima, max_back);
                                self.add_out_pt(horz_edge, IntPoint::new(x, horz_y))?;
                            }
                            max_back += 1;
                        }
                    }
                }

                let curr_x = self.edges[e].curr.x;

                if (left_to_right && curr_x > horz_right) || (!left_to_right && curr_x < horz_left) {
                    break;
                }

                // stop at the end of an intermediate horizontal when `e` is
                // below the edge that continues the bound
                let horz_next = self.edges[horz_edge].next_in_lml;

                if curr_x == self.edges[horz_edge].top.x
                    && horz_next != UNASSIGNED
                    && self.edges[e].dx < self.edges[horz_next].dx
                {
                    break;
                }

                if self.edges[horz_edge].is_assigned() && !is_open {
                    #[cfg(feature = "xyz")]
                    {
                        let mut curr = self.edges[e].curr;
                        if left_to_right {
                            self.set_z(&mut curr, horz_edge, e);
                        } else {
                            self.set_z(&mut curr, e, horz_edge);
                        }
                        self.edges[e].curr = curr;
                    }

                    op1 = self.add_out_pt(horz_edge, self.edges[e].curr)?;
                    self.join_overlapping_horizontals(horz_edge, op1)?;
                    self.add_ghost_join(op1, self.edges[horz_edge].bot)?;
                }

                if e == e_max_pair && is_last_horz {
                    if self.edges[horz_edge].is_assigned() {
                        self.add_local_max_poly(horz_edge, e_max_pair, self.edges[horz_edge].top)?;
                    }

                    self.delete_from_ael(horz_edge);
                    self.delete_from_ael(e_max_pair);

                    return Ok(());
                }

                let pt = IntPoint::new(self.edges[e].curr.x, self.edges[horz_edge].curr.y);

                if left_to_right {
                    self.intersect_edges(horz_edge, e, pt)?;
                } else {
                    self.intersect_edges(e, horz_edge, pt)?;
                }

                let e_next = self.next_in_ael_towards(e, left_to_right);
                self.swap_positions_in_ael(horz_edge, e);
                e = e_next;
            }

            let next_in_lml = self.edges[horz_edge].next_in_lml;

            if next_in_lml == UNASSIGNED || !self.edges[next_in_lml].is_horizontal() {
                break;
            }

            horz_edge = self.update_edge_into_ael(horz_edge);

            if self.edges[horz_edge].is_assigned() {
                self.add_out_pt(horz_edge, self.edges[horz_edge].bot)?;
            }

            (horz_left, horz_right, left_to_right) = self.edges[horz_edge].horz_direction();
        }

        if self.edges[horz_edge].is_assigned() && op1 == UNASSIGNED {
            op1 = self.get_last_out_pt(horz_edge);
            self.join_overlapping_horizontals(horz_edge, op1)?;
            self.add_ghost_join(op1, self.edges[horz_edge].top)?;
        }

        if self.edges[horz_edge].next_in_lml == UNASSIGNED {
            if self.edges[horz_edge].is_assigned() {
                self.add_out_pt(horz_edge, self.edges[horz_edge].top)?;
            }
            self.delete_from_ael(horz_edge);

            return Ok(());
        }

        if !self.edges[horz_edge].is_assigned() {
            self.update_edge_into_ael(horz_edge);

            return Ok(());
        }

        op1 = self.add_out_pt(horz_edge, self.edges[horz_edge].top)?;
        horz_edge = self.update_edge_into_ael(horz_edge);

        if self.edges[horz_edge].wind_delta == 0 {
            return Ok(());
        }

        // the edge leaving the horizontal may continue a neighbour's line
        let full = self.use_full_range;
        let horz = &self.edges[horz_edge];
        let (bot, top) = (horz.bot, horz.top);
        let e_prev = horz.prev_in_ael;
        let e_next = horz.next_in_ael;

        let continues = |other: usize| {
            if other == UNASSIGNED {
                return false;
            }
            let o = &self.edges[other];
            o.curr.x == bot.x
                && o.curr.y == bot.y
                && o.wind_delta != 0
                && o.is_assigned()
                && o.curr.y > o.top.y
                && edge_slopes_equal(&self.edges[horz_edge], o, full)
        };

        let neighbour = if continues(e_prev) {
            e_prev
        } else if continues(e_next) {
            e_next
        } else {
            UNASSIGNED
        };

        if neighbour != UNASSIGNED {
            let op2 = self.add_out_pt(neighbour, bot)?;
            self.add_join(op1, op2, top)?;
        }

        Ok(())
    }

    fn process_intersections(&mut self, top_y: i64) -> Result<(), ClipperError> {
        if self.active_edges == UNASSIGNED {
            return Ok(());
        }

        self.build_intersect_list(top_y)?;

        if self.intersections.is_empty() {
            return Ok(());
        }

        if self.intersections.len() > 1 {
            let mut order = EdgeOrder::from_sequence(self.active_edge_order());

            let mut nodes: Vec<IntersectNode> = self.intersections.iter().copied().collect();

            if !fixup_intersection_order(&mut nodes, &mut order) {
                self.intersections.clear(&mut *self.manager);
                return Err(ClipperError::IntersectionOrder);
            }

            for (index, node) in self.intersections.indices().zip(nodes) {
                self.intersections[index] = node;
            }
        }

        self.process_intersect_list()
    }

    fn active_edge_order(&self) -> Vec<usize> {
        let mut result = Vec::new();
        let mut e = self.active_edges;

        while e != UNASSIGNED {
            result.push(e);
            e = self.edges[e].next_in_ael;
        }

        result
    }

    /// Bubble sorts a copy of the active list by the x each edge reaches at
    /// `top_y`, recording every swap as an intersection.
    fn build_intersect_list(&mut self, top_y: i64) -> Result<(), ClipperError> {
        let mut e = self.active_edges;
        self.sorted_edges = e;

        while e != UNASSIGNED {
            let x = self.edges[e].top_x(top_y);
            let edge = &mut self.edges[e];

            edge.prev_in_sel = edge.prev_in_ael;
            edge.next_in_sel = edge.next_in_ael;
            edge.curr.x = x;
            e = edge.next_in_ael;
        }

        loop {
            let mut is_modified = false;
            e = self.sorted_edges;

            while self.edges[e].next_in_sel != UNASSIGNED {
                let e_next = self.edges[e].next_in_sel;

                if self.edges[e].curr.x > self.edges[e_next].curr.x {
                    let mut pt = intersect_point(&self.edges[e], &self.edges[e_next]);

                    if pt.y < top_y {
                        pt = IntPoint::new(self.edges[e].top_x(top_y), top_y);
                    }

                    self.intersections
                        .alloc(&mut *self.manager, IntersectNode::new(e, e_next, pt))?;
                    self.swap_positions_in_sel(e, e_next);
                    is_modified = true;
                } else {
                    e = e_next;
                }
            }

            let prev = self.edges[e].prev_in_sel;

            if prev == UNASSIGNED || !is_modified {
                break;
            }

            self.edges[prev].next_in_sel = UNASSIGNED;
        }

        self.sorted_edges = UNASSIGNED;

        Ok(())
    }

    fn process_intersect_list(&mut self) -> Result<(), ClipperError> {
        for i in self.intersections.indices() {
            let node = self.intersections[i];
            self.intersect_edges(node.edge1, node.edge2, node.pt)?;
            self.swap_positions_in_ael(node.edge1, node.edge2);
        }

        self.intersections.clear(&mut *self.manager);

        Ok(())
    }

    fn do_maxima(&mut self, e: usize) -> Result<(), ClipperError> {
        let e_max_pair = get_maxima_pair_ex(&self.edges, e);

        if e_max_pair == UNASSIGNED {
            if self.edges[e].is_assigned() {
                self.add_out_pt(e, self.edges[e].top)?;
            }
            self.delete_from_ael(e);

            return Ok(());
        }

        let mut e_next = self.edges[e].next_in_ael;

        while e_next != UNASSIGNED && e_next != e_max_pair {
            self.intersect_edges(e, e_next, self.edges[e].top)?;
            self.swap_positions_in_ael(e, e_next);
            e_next = self.edges[e].next_in_ael;
        }

        let top = self.edges[e].top;

        if self.edges[e].out_idx == UNASSIGNED && self.edges[e_max_pair].out_idx == UNASSIGNED {
            self.delete_from_ael(e);
            self.delete_from_ael(e_max_pair);
        } else if self.edges[e].is_assigned() && self.edges[e_max_pair].is_assigned() {
            self.add_local_max_poly(e, e_max_pair, top)?;
            self.delete_from_ael(e);
            self.delete_from_ael(e_max_pair);
        } else if self.edges[e].wind_delta == 0 {
            for edge in [e, e_max_pair] {
                if self.edges[edge].is_assigned() {
                    self.add_out_pt(edge, top)?;
                    self.edges[edge].out_idx = UNASSIGNED;
                }
                self.delete_from_ael(edge);
            }
        } else {
            return Err(ClipperError::MaximaResolution);
        }

        Ok(())
    }

    fn process_edges_at_top_of_scanbeam(&mut self, top_y: i64) -> Result<(), ClipperError> {
        let full = self.use_full_range;
        let strictly_simple = self.config.strictly_simple;
        let mut e = self.active_edges;

        while e != UNASSIGNED {
            // maxima with a horizontal pair are left for the horizontal pass
            let mut is_maxima_edge = self.edges[e].is_maxima(top_y);

            if is_maxima_edge {
                let e_max_pair = get_maxima_pair_ex(&self.edges, e);
                is_maxima_edge = e_max_pair == UNASSIGNED || !self.edges[e_max_pair].is_horizontal();
            }

            if is_maxima_edge {
                if strictly_simple {
                    self.maxima.push(self.edges[e].top.x);
                }

                let e_prev = self.edges[e].prev_in_ael;
                self.do_maxima(e)?;

                e = if e_prev == UNASSIGNED {
                    self.active_edges
                } else {
                    self.edges[e_prev].next_in_ael
                };

                continue;
            }

            let next_in_lml = self.edges[e].next_in_lml;

            if self.edges[e].is_intermediate(top_y) && self.edges[next_in_lml].is_horizontal() {
                e = self.update_edge_into_ael(e);

                if self.edges[e].is_assigned() {
                    self.add_out_pt(e, self.edges[e].bot)?;
                }

                self.add_edge_to_sel(e);
            } else {
                let x = self.edges[e].top_x(top_y);
                let edge = &mut self.edges[e];

                edge.curr.x = x;
                edge.curr.y = top_y;

                #[cfg(feature = "xyz")]
                {
                    edge.curr.z = if top_y == edge.top.y {
                        edge.top.z
                    } else if top_y == edge.bot.y {
                        edge.bot.z
                    } else {
                        0
                    };
                }
            }

            // touching contributing edges must be split when output has to
            // be strictly simple
            if strictly_simple {
                let e_prev = self.edges[e].prev_in_ael;

                if e_prev != UNASSIGNED {
                    let (edge, prev) = (&self.edges[e], &self.edges[e_prev]);

                    if edge.is_assigned()
                        && edge.wind_delta != 0
                        && prev.is_assigned()
                        && prev.curr.x == edge.curr.x
                        && prev.wind_delta != 0
                    {
                        #[allow(unused_mut)]
                        let mut pt = edge.curr;

                        #[cfg(feature = "xyz")]
                        self.set_z(&mut pt, e_prev, e);

                        let op = self.add_out_pt(e_prev, pt)?;
                        let op2 = self.add_out_pt(e, pt)?;
                        self.add_join(op, op2, pt)?;
                    }
                }
            }

            e = self.edges[e].next_in_ael;
        }

        self.maxima.sort_unstable();
        self.process_horizontals()?;
        self.maxima.clear();

        // promote intermediate vertices to the next edge of their bound
        e = self.active_edges;

        while e != UNASSIGNED {
            if self.edges[e].is_intermediate(top_y) {
                let mut op = UNASSIGNED;

                if self.edges[e].is_assigned() {
                    op = self.add_out_pt(e, self.edges[e].top)?;
                }

                e = self.update_edge_into_ael(e);

                let edge = &self.edges[e];
                let (bot, top) = (edge.bot, edge.top);

                let continues = |other: usize| {
                    if other == UNASSIGNED || op == UNASSIGNED {
                        return false;
                    }
                    let (edge, o) = (&self.edges[e], &self.edges[other]);
                    o.curr.x == bot.x
                        && o.curr.y == bot.y
                        && o.is_assigned()
                        && o.curr.y > o.top.y
                        && segments_slopes_equal(&edge.curr, &edge.top, &o.curr, &o.top, full)
                        && edge.wind_delta != 0
                        && o.wind_delta != 0
                };

                let neighbour = if continues(edge.prev_in_ael) {
                    edge.prev_in_ael
                } else if continues(edge.next_in_ael) {
                    edge.next_in_ael
                } else {
                    UNASSIGNED
                };

                if neighbour != UNASSIGNED {
                    let op2 = self.add_out_pt(neighbour, bot)?;
                    self.add_join(op, op2, top)?;
                }
            }

            e = self.edges[e].next_in_ael;
        }

        Ok(())
    }

    fn join_common_edges(&mut self) -> Result<(), ClipperError> {
        let full = self.use_full_range;

        for i in self.joins.indices() {
            let mut join = self.joins[i];
            let out_rec1 = self.out.get_out_rec(self.out.pts[join.out_pt1].idx);
            let mut out_rec2 = self.out.get_out_rec(self.out.pts[join.out_pt2].idx);

            if self.out.recs[out_rec1].pts == UNASSIGNED || self.out.recs[out_rec2].pts == UNASSIGNED {
                continue;
            }

            if self.out.recs[out_rec1].is_open || self.out.recs[out_rec2].is_open {
                continue;
            }

            // the record that decides hole state when two records merge
            let hole_state_rec = self.out.get_hole_state_rec(out_rec1, out_rec2);

            if !join.join_points(&mut self.out.pts, &mut *self.manager, out_rec1 == out_rec2, full)? {
                continue;
            }

            if out_rec1 == out_rec2 {
                // the join split one ring in two
                self.out.recs[out_rec1].pts = join.out_pt1;
                self.out.recs[out_rec1].bottom_pt = UNASSIGNED;
                out_rec2 = self.out.create(&mut *self.manager)?;
                self.out.recs[out_rec2].pts = join.out_pt2;
                self.out.update_out_pt_idxs(out_rec2);
                self.out.settle_split(
                    out_rec1,
                    out_rec2,
                    self.using_poly_tree,
                    Some(self.config.reverse_solution),
                );
            } else {
                // the join merged two rings
                let recs = &mut self.out.recs;

                recs[out_rec2].pts = UNASSIGNED;
                recs[out_rec2].bottom_pt = UNASSIGNED;
                recs[out_rec2].idx = recs[out_rec1].idx;
                recs[out_rec1].is_hole = recs[hole_state_rec].is_hole;

                if hole_state_rec == out_rec2 {
                    recs[out_rec1].first_left = recs[out_rec2].first_left;
                }

                recs[out_rec2].first_left = out_rec1;

                if self.using_poly_tree {
                    self.out.fixup_first_lefts3(out_rec2, out_rec1);
                }
            }
        }

        Ok(())
    }

    fn build_tree(&mut self) -> Result<(), ClipperError> {
        self.poly_tree.clear(&mut *self.manager);

        for rec in self.out.recs.indices() {
            let out_rec = self.out.recs[rec];
            let count = point_count(&self.out.pts, out_rec.pts);

            if (out_rec.is_open && count < 2) || (!out_rec.is_open && count < 3) {
                continue;
            }

            self.out.fix_hole_linkage(rec);

            let contour = self.out.export(rec);
            let node = self.poly_tree.add_node(
                &mut *self.manager,
                contour,
                JoinType::Square,
                EndType::ClosedPolygon,
            )?;

            self.out.recs[rec].poly_nd = node;
        }

        for rec in self.out.recs.indices() {
            let out_rec = self.out.recs[rec];

            if out_rec.poly_nd == UNASSIGNED {
                continue;
            }

            if out_rec.is_open {
                self.poly_tree.set_open(out_rec.poly_nd, true);
                self.poly_tree.add_child(UNASSIGNED, out_rec.poly_nd);
            } else if out_rec.first_left != UNASSIGNED && self.out.recs[out_rec.first_left].poly_nd != UNASSIGNED {
                let parent = self.out.recs[out_rec.first_left].poly_nd;
                self.poly_tree.add_child(parent, out_rec.poly_nd);
            } else {
                self.poly_tree.add_child(UNASSIGNED, out_rec.poly_nd);
            }
        }

        Ok(())
    }
}

impl Drop for Clipper<'_> {
    fn drop(&mut self) {
        self.release_storage();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::SimpleMemoryManager;
    use crate::geometry::polygon::area;

    fn square(x: i64, y: i64, size: i64) -> Vec<IntPoint> {
        vec![
            IntPoint::new(x, y),
            IntPoint::new(x + size, y),
            IntPoint::new(x + size, y + size),
            IntPoint::new(x, y + size),
        ]
    }

    #[test]
    fn locked_engine_refuses_to_execute() {
        let mut manager = SimpleMemoryManager::new();
        let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

        clipper.add_path(&square(0, 0, 10), PolyType::Subject, true).unwrap();
        clipper.is_execute_locked = true;

        assert!(matches!(
            clipper.execute(ClipType::Union, PolyFillType::EvenOdd),
            Err(ClipperError::ExecuteLocked)
        ));

        clipper.is_execute_locked = false;
        let solution = clipper.execute(ClipType::Union, PolyFillType::EvenOdd).unwrap();

        assert_eq!(solution.len(), 1);
        assert!(!clipper.is_execute_locked());
    }

    #[test]
    fn output_records_are_released_after_execute() {
        let mut manager = SimpleMemoryManager::new();
        {
            let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

            clipper.add_path(&square(0, 0, 10), PolyType::Subject, true).unwrap();
            clipper.add_path(&square(5, 5, 10), PolyType::Clip, true).unwrap();

            let solution = clipper.execute(ClipType::Intersection, PolyFillType::EvenOdd).unwrap();

            assert_eq!(solution.len(), 1);
            assert_eq!(area(&solution[0]).abs(), 25.0);
            assert!(clipper.out.is_empty());
            assert!(clipper.joins.is_empty());
        }

        assert_eq!(manager.live_blocks(), 0);
    }

    #[test]
    fn empty_engine_produces_empty_result() {
        let mut manager = SimpleMemoryManager::new();
        let mut clipper = Clipper::new(&mut manager, ClipperConfig::new());

        assert!(clipper.execute(ClipType::Union, PolyFillType::NonZero).unwrap().is_empty());
        assert_eq!(clipper.execute_tree(ClipType::Union, PolyFillType::NonZero).unwrap().total(), 0);
    }
}

//! The scanline sweep: active edge list maintenance, winding accounting,
//! intersection scheduling and horizontal edge processing.

use crate::engine::{
    Active, ActiveId, ClipType, Clipper64, FillRule, IntersectNode, OutPtId, PathType, VertexFlags,
    VertexId,
};
use crate::error::ClipError;
use crate::geometry::{cross_product, get_intersect_point, Crossing, Point64};

/// Sets the inverse slope. Horizontals get a signed sentinel so slope
/// tie-breaking sorts a rightward horizontal after everything it overlaps.
pub(crate) fn set_dx(e: &mut Active) {
    let dy = e.top.y - e.bot.y;
    e.dx = if dy != 0 {
        (e.top.x - e.bot.x) as f64 / dy as f64
    } else if e.top.x > e.bot.x {
        -f64::MAX
    } else {
        f64::MAX
    };
}

#[inline]
pub(crate) fn is_horizontal(e: &Active) -> bool {
    e.top.y == e.bot.y
}

/// X coordinate of the edge at scanline `y`.
pub(crate) fn top_x(e: &Active, y: i64) -> i64 {
    if y == e.top.y || e.top.x == e.bot.x {
        e.top.x
    } else if y == e.bot.y {
        e.bot.x
    } else {
        e.bot.x + (e.dx * (y - e.bot.y) as f64).round() as i64
    }
}

impl Clipper64 {
    // ------------------------------------------------------------------
    // Edge predicates
    // ------------------------------------------------------------------

    #[inline]
    pub(crate) fn is_open(&self, e: ActiveId) -> bool {
        self.edge(e).local_min.is_open
    }

    #[inline]
    pub(crate) fn polytype(&self, e: ActiveId) -> PathType {
        self.edge(e).local_min.polytype
    }

    #[inline]
    pub(crate) fn is_same_polytype(&self, e1: ActiveId, e2: ActiveId) -> bool {
        self.polytype(e1) == self.polytype(e2)
    }

    /// A "hot" edge is currently bounding an output ring.
    #[inline]
    pub(crate) fn is_hot(&self, e: ActiveId) -> bool {
        self.edge(e).outrec.is_some()
    }

    #[inline]
    pub(crate) fn is_maxima(&self, e: ActiveId) -> bool {
        self.vertex(self.edge(e).vertex_top)
            .flags
            .contains(VertexFlags::LOCAL_MAX)
    }

    /// True when the edge terminates at an unpaired open-path end.
    #[inline]
    pub(crate) fn is_open_end(&self, e: ActiveId) -> bool {
        self.edge(e).local_min.is_open
            && self
                .vertex(self.edge(e).vertex_top)
                .flags
                .intersects(VertexFlags::OPEN_START | VertexFlags::OPEN_END)
    }

    /// The vertex the edge's bound moves to after `vertex_top`. Bounds with
    /// a positive winding delta walk the ring backwards.
    #[inline]
    pub(crate) fn next_vertex_of(&self, e: ActiveId) -> VertexId {
        let ed = self.edge(e);
        if ed.wind_dx > 0 {
            self.vertex(ed.vertex_top).prev
        } else {
            self.vertex(ed.vertex_top).next
        }
    }

    /// Two vertices behind `vertex_top` along the bound direction.
    fn prev_prev_vertex(&self, e: ActiveId) -> VertexId {
        let ed = self.edge(e);
        if ed.wind_dx > 0 {
            self.vertex(self.vertex(ed.vertex_top).next).next
        } else {
            self.vertex(self.vertex(ed.vertex_top).prev).prev
        }
    }

    /// Finds the edge sharing `e`'s top vertex (its local-maximum partner).
    pub(crate) fn get_maxima_pair(&self, e: ActiveId) -> Option<ActiveId> {
        let vt = self.edge(e).vertex_top;
        let mut e2 = self.edge(e).next_in_ael;
        while let Some(x) = e2 {
            if self.edge(x).vertex_top == vt {
                return Some(x);
            }
            e2 = self.edge(x).next_in_ael;
        }
        None
    }

    // ------------------------------------------------------------------
    // AEL maintenance (C3)
    // ------------------------------------------------------------------

    /// Decides whether `newcomer` belongs to the right of `resident` when
    /// both cross the scanline at the same X. Slope decides first; for
    /// collinear starts the bends above the scanline and finally the bound
    /// orientation at a shared minimum break the tie.
    fn is_valid_ael_order(&self, resident: ActiveId, newcomer: ActiveId) -> bool {
        let r = self.edge(resident);
        let n = self.edge(newcomer);

        if n.curr_x != r.curr_x {
            return n.curr_x > r.curr_x;
        }

        let d = cross_product(r.top, n.bot, n.top);
        if d != 0 {
            return d > 0;
        }

        // Edges are collinear at the insertion point: look at where each
        // bends next.
        if !self.is_maxima(resident) && r.top.y < n.top.y {
            return cross_product(
                n.bot,
                r.top,
                self.vertex(self.next_vertex_of(resident)).pt,
            ) >= 0;
        }
        if !self.is_maxima(newcomer) && n.top.y < r.top.y {
            return cross_product(
                n.bot,
                n.top,
                self.vertex(self.next_vertex_of(newcomer)).pt,
            ) <= 0;
        }

        let y = n.bot.y;
        let newcomer_is_left = n.is_left_bound;
        if r.bot.y != y || self.vertex(r.local_min.vertex).pt.y != y {
            return newcomer_is_left;
        }
        // The resident was inserted at this same scanline. Left bounds sort
        // before right bounds of another minimum; otherwise compare how the
        // shared-slope bounds turn underneath.
        if r.is_left_bound != newcomer_is_left {
            return newcomer_is_left;
        }
        if cross_product(self.vertex(self.prev_prev_vertex(resident)).pt, r.bot, r.top) == 0 {
            return true;
        }
        (cross_product(
            self.vertex(self.prev_prev_vertex(newcomer)).pt,
            n.bot,
            n.top,
        ) < 0)
            == newcomer_is_left
    }

    /// Inserts a left bound by walking rightward from the AEL head.
    fn insert_left_edge(&mut self, e: ActiveId) {
        match self.ael_first {
            None => {
                let ed = self.edge_mut(e);
                ed.prev_in_ael = None;
                ed.next_in_ael = None;
                self.ael_first = Some(e);
            }
            Some(first) if !self.is_valid_ael_order(first, e) => {
                self.edge_mut(first).prev_in_ael = Some(e);
                let ed = self.edge_mut(e);
                ed.prev_in_ael = None;
                ed.next_in_ael = Some(first);
                self.ael_first = Some(e);
            }
            Some(first) => {
                let mut cur = first;
                while let Some(next) = self.edge(cur).next_in_ael {
                    if !self.is_valid_ael_order(next, e) {
                        break;
                    }
                    cur = next;
                }
                let next = self.edge(cur).next_in_ael;
                self.edge_mut(e).prev_in_ael = Some(cur);
                self.edge_mut(e).next_in_ael = next;
                if let Some(next) = next {
                    self.edge_mut(next).prev_in_ael = Some(e);
                }
                self.edge_mut(cur).next_in_ael = Some(e);
            }
        }
    }

    /// Inserts the right bound of a pair immediately right of its partner.
    fn insert_right_edge(&mut self, left: ActiveId, right: ActiveId) {
        let next = self.edge(left).next_in_ael;
        self.edge_mut(right).next_in_ael = next;
        self.edge_mut(right).prev_in_ael = Some(left);
        if let Some(next) = next {
            self.edge_mut(next).prev_in_ael = Some(right);
        }
        self.edge_mut(left).next_in_ael = Some(right);
    }

    /// Swaps two edges that are adjacent in the AEL (`e1` directly left of
    /// `e2`).
    pub(crate) fn swap_positions_in_ael(&mut self, e1: ActiveId, e2: ActiveId) {
        debug_assert_eq!(self.edge(e1).next_in_ael, Some(e2));
        let next = self.edge(e2).next_in_ael;
        let prev = self.edge(e1).prev_in_ael;
        if let Some(next) = next {
            self.edge_mut(next).prev_in_ael = Some(e1);
        }
        if let Some(prev) = prev {
            self.edge_mut(prev).next_in_ael = Some(e2);
        }
        self.edge_mut(e2).prev_in_ael = prev;
        self.edge_mut(e2).next_in_ael = Some(e1);
        self.edge_mut(e1).prev_in_ael = Some(e2);
        self.edge_mut(e1).next_in_ael = next;
        if prev.is_none() {
            self.ael_first = Some(e2);
        }
    }

    pub(crate) fn delete_from_ael(&mut self, e: ActiveId) {
        let prev = self.edge(e).prev_in_ael;
        let next = self.edge(e).next_in_ael;
        if prev.is_none() && next.is_none() && self.ael_first != Some(e) {
            return; // already removed
        }
        match prev {
            Some(prev) => self.edge_mut(prev).next_in_ael = next,
            None => self.ael_first = next,
        }
        if let Some(next) = next {
            self.edge_mut(next).prev_in_ael = prev;
        }
        let ed = self.edge_mut(e);
        ed.prev_in_ael = None;
        ed.next_in_ael = None;
    }

    // ------------------------------------------------------------------
    // Winding accounting (4.5)
    // ------------------------------------------------------------------

    fn set_wind_count_closed(&mut self, e: ActiveId) {
        let pt = self.polytype(e);

        // Nearest closed edge of the same polytype to the left.
        let mut e2 = self.edge(e).prev_in_ael;
        while let Some(x) = e2 {
            if self.polytype(x) == pt && !self.is_open(x) {
                break;
            }
            e2 = self.edge(x).prev_in_ael;
        }

        let mut scan;
        match e2 {
            None => {
                let wind_dx = self.edge(e).wind_dx;
                self.edge_mut(e).wind_cnt = wind_dx;
                scan = self.ael_first;
            }
            Some(left) if self.fill_rule == FillRule::EvenOdd => {
                let wind_dx = self.edge(e).wind_dx;
                let cnt2 = self.edge(left).wind_cnt2;
                let ed = self.edge_mut(e);
                ed.wind_cnt = wind_dx;
                ed.wind_cnt2 = cnt2;
                scan = self.edge(left).next_in_ael;
            }
            Some(left) => {
                // NonZero, Positive or Negative filling: the count of the
                // nearest same-type edge seeds this one.
                let lc = self.edge(left).wind_cnt;
                let ld = self.edge(left).wind_dx;
                let d = self.edge(e).wind_dx;
                let wind_cnt = if lc * ld < 0 {
                    // The left edge is winding down its count, so `e`
                    // starts outside that region.
                    if lc.abs() > 1 {
                        if ld * d < 0 {
                            lc
                        } else {
                            lc + d
                        }
                    } else {
                        d
                    }
                } else if lc * d < 0 {
                    lc
                } else {
                    lc + d
                };
                let cnt2 = self.edge(left).wind_cnt2;
                let ed = self.edge_mut(e);
                ed.wind_cnt = wind_cnt;
                ed.wind_cnt2 = cnt2;
                scan = self.edge(left).next_in_ael;
            }
        }

        // Accumulate the opposite polytype's winding from `scan` up to `e`.
        if self.fill_rule == FillRule::EvenOdd {
            while scan != Some(e) {
                let s = scan.expect("edge must be reachable from its left");
                if self.polytype(s) != pt && !self.is_open(s) {
                    let ed = self.edge_mut(e);
                    ed.wind_cnt2 = i32::from(ed.wind_cnt2 == 0);
                }
                scan = self.edge(s).next_in_ael;
            }
        } else {
            while scan != Some(e) {
                let s = scan.expect("edge must be reachable from its left");
                if self.polytype(s) != pt && !self.is_open(s) {
                    let delta = self.edge(s).wind_dx;
                    self.edge_mut(e).wind_cnt2 += delta;
                }
                scan = self.edge(s).next_in_ael;
            }
        }
    }

    fn set_wind_count_open(&mut self, e: ActiveId) {
        let mut scan = self.ael_first;
        if self.fill_rule == FillRule::EvenOdd {
            let mut cnt1 = 0;
            let mut cnt2 = 0;
            while scan != Some(e) {
                let s = scan.expect("edge must be reachable from the AEL head");
                if self.polytype(s) == PathType::Clip {
                    cnt2 += 1;
                } else if !self.is_open(s) {
                    cnt1 += 1;
                }
                scan = self.edge(s).next_in_ael;
            }
            let ed = self.edge_mut(e);
            ed.wind_cnt = cnt1 & 1;
            ed.wind_cnt2 = cnt2 & 1;
        } else {
            let mut cnt1 = 0;
            let mut cnt2 = 0;
            while scan != Some(e) {
                let s = scan.expect("edge must be reachable from the AEL head");
                if self.polytype(s) == PathType::Clip {
                    cnt2 += self.edge(s).wind_dx;
                } else if !self.is_open(s) {
                    cnt1 += self.edge(s).wind_dx;
                }
                scan = self.edge(s).next_in_ael;
            }
            let ed = self.edge_mut(e);
            ed.wind_cnt = cnt1;
            ed.wind_cnt2 = cnt2;
        }
    }

    fn is_contributing_closed(&self, e: ActiveId) -> bool {
        let ed = self.edge(e);
        match self.fill_rule {
            FillRule::EvenOdd => {}
            FillRule::NonZero => {
                if ed.wind_cnt.abs() != 1 {
                    return false;
                }
            }
            FillRule::Positive => {
                if ed.wind_cnt != 1 {
                    return false;
                }
            }
            FillRule::Negative => {
                if ed.wind_cnt != -1 {
                    return false;
                }
            }
        }

        match self.clip_type {
            ClipType::Intersection => match self.fill_rule {
                FillRule::Positive => ed.wind_cnt2 > 0,
                FillRule::Negative => ed.wind_cnt2 < 0,
                _ => ed.wind_cnt2 != 0,
            },
            ClipType::Union => match self.fill_rule {
                FillRule::Positive => ed.wind_cnt2 <= 0,
                FillRule::Negative => ed.wind_cnt2 >= 0,
                _ => ed.wind_cnt2 == 0,
            },
            ClipType::Difference => {
                let outside_clip = match self.fill_rule {
                    FillRule::Positive => ed.wind_cnt2 <= 0,
                    FillRule::Negative => ed.wind_cnt2 >= 0,
                    _ => ed.wind_cnt2 == 0,
                };
                if self.polytype(e) == PathType::Subject {
                    outside_clip
                } else {
                    !outside_clip
                }
            }
            ClipType::Xor => true,
            ClipType::None => false,
        }
    }

    /// Open edges contribute under restricted rules that never open holes.
    fn is_contributing_open(&self, e: ActiveId) -> bool {
        let ed = self.edge(e);
        match self.clip_type {
            ClipType::Intersection => ed.wind_cnt2 != 0,
            ClipType::Union => ed.wind_cnt == 0 && ed.wind_cnt2 == 0,
            ClipType::Difference => ed.wind_cnt2 == 0,
            ClipType::Xor => (ed.wind_cnt != 0) != (ed.wind_cnt2 != 0),
            ClipType::None => false,
        }
    }

    // ------------------------------------------------------------------
    // Local minima insertion (4.4 step 2)
    // ------------------------------------------------------------------

    pub(crate) fn insert_local_minima_into_ael(&mut self, bot_y: i64) {
        while let Some(lm) = self.pop_local_minima(bot_y) {
            let vflags = self.vertex(lm.vertex).flags;
            let pt = self.vertex(lm.vertex).pt;

            // A bound ascending the ring backwards crosses the scan ray
            // with the ring's interior opening on its right: winding +1.
            let left = if vflags.contains(VertexFlags::OPEN_START) {
                None
            } else {
                let vt = self.vertex(lm.vertex).prev;
                Some(self.new_active(pt, vt, 1, lm, true))
            };
            let right = if vflags.contains(VertexFlags::OPEN_END) {
                None
            } else {
                let vt = self.vertex(lm.vertex).next;
                Some(self.new_active(pt, vt, -1, lm, false))
            };

            match (left, right) {
                (Some(mut left), Some(mut right)) => {
                    // Decide which bound really is the left one: horizontals
                    // sort by heading, everything else by slope (smaller dx
                    // lies further left just above the minimum).
                    let le = self.edge(left);
                    let re = self.edge(right);
                    let swap = if is_horizontal(le) {
                        le.top.x > le.bot.x
                    } else if is_horizontal(re) {
                        re.top.x < re.bot.x
                    } else {
                        le.dx > re.dx
                    };
                    if swap {
                        std::mem::swap(&mut left, &mut right);
                    }
                    self.edge_mut(left).is_left_bound = true;
                    self.edge_mut(right).is_left_bound = false;

                    self.insert_left_edge(left);
                    let contributing = if lm.is_open {
                        self.set_wind_count_open(left);
                        self.is_contributing_open(left)
                    } else {
                        self.set_wind_count_closed(left);
                        self.is_contributing_closed(left)
                    };
                    let (wc, wc2) = {
                        let le = self.edge(left);
                        (le.wind_cnt, le.wind_cnt2)
                    };
                    {
                        let re = self.edge_mut(right);
                        re.wind_cnt = wc;
                        re.wind_cnt2 = wc2;
                    }
                    self.insert_right_edge(left, right);

                    if contributing {
                        self.add_local_min_poly(left, right, pt, true);
                    }

                    if is_horizontal(self.edge(right)) {
                        self.push_horz(right);
                    } else {
                        let top_y = self.edge(right).top.y;
                        self.insert_scanline(top_y);
                    }
                    if is_horizontal(self.edge(left)) {
                        self.push_horz(left);
                    } else {
                        let top_y = self.edge(left).top.y;
                        self.insert_scanline(top_y);
                    }
                }
                (Some(single), None) | (None, Some(single)) => {
                    // One-sided bound at an open-path end.
                    self.edge_mut(single).is_left_bound = true;
                    self.insert_left_edge(single);
                    self.set_wind_count_open(single);
                    if self.is_contributing_open(single) {
                        self.start_open_path(single, pt);
                    }
                    if is_horizontal(self.edge(single)) {
                        self.push_horz(single);
                    } else {
                        let top_y = self.edge(single).top.y;
                        self.insert_scanline(top_y);
                    }
                }
                (None, None) => {}
            }
        }
    }

    fn new_active(
        &mut self,
        bot: Point64,
        vertex_top: VertexId,
        wind_dx: i32,
        local_min: crate::engine::LocalMinima,
        is_left_bound: bool,
    ) -> ActiveId {
        let top = self.vertex(vertex_top).pt;
        let mut e = Active {
            bot,
            top,
            curr_x: bot.x,
            dx: 0.0,
            wind_dx,
            wind_cnt: 0,
            wind_cnt2: 0,
            outrec: None,
            prev_in_ael: None,
            next_in_ael: None,
            prev_in_sel: None,
            next_in_sel: None,
            jump: None,
            vertex_top,
            local_min,
            is_left_bound,
        };
        set_dx(&mut e);
        let id = ActiveId(self.actives.len() as u32);
        self.actives.push(e);
        id
    }

    /// Advances an edge to the next edge of its bound.
    pub(crate) fn update_edge_into_ael(&mut self, e: ActiveId) {
        let nv = self.next_vertex_of(e);
        let nv_pt = self.vertex(nv).pt;
        let ed = self.edge_mut(e);
        ed.bot = ed.top;
        ed.vertex_top = nv;
        ed.top = nv_pt;
        ed.curr_x = ed.bot.x;
        set_dx(ed);
        if !is_horizontal(self.edge(e)) {
            let top_y = self.edge(e).top.y;
            self.insert_scanline(top_y);
        }
    }

    // ------------------------------------------------------------------
    // Edge crossings (4.5 / 4.7)
    // ------------------------------------------------------------------

    /// Handles two edges meeting at `pt`: updates winding counts, emits
    /// output points for contributing pairs, and exchanges output-ring
    /// ownership where the crossing transfers it.
    ///
    /// The caller must pass `e1` as the edge currently left of `e2`.
    pub(crate) fn intersect_edges(
        &mut self,
        e1: ActiveId,
        e2: ActiveId,
        pt: Point64,
    ) -> Option<OutPtId> {
        // An open edge against a closed boundary toggles the open path in
        // and out of the solution; two open edges ignore each other.
        if self.has_open_paths && (self.is_open(e1) || self.is_open(e2)) {
            if self.is_open(e1) && self.is_open(e2) {
                return None;
            }
            let (open_e, closed_e) = if self.is_open(e1) { (e1, e2) } else { (e2, e1) };
            match self.clip_type {
                ClipType::Intersection | ClipType::Difference => {
                    if self.is_same_polytype(open_e, closed_e)
                        || self.edge(closed_e).wind_cnt.abs() != 1
                    {
                        return None;
                    }
                }
                ClipType::Union => {
                    if self.is_hot(open_e)
                        != (self.edge(closed_e).wind_cnt.abs() != 1
                            || (self.is_hot(open_e) == (self.edge(closed_e).wind_cnt2 != 0)))
                    {
                        return None;
                    }
                }
                ClipType::Xor => {
                    if self.edge(closed_e).wind_cnt.abs() != 1 {
                        return None;
                    }
                }
                ClipType::None => return None,
            }
            return if self.is_hot(open_e) {
                let op = self.add_out_pt(open_e, pt);
                self.edge_mut(open_e).outrec = None;
                Some(op)
            } else {
                Some(self.start_open_path(open_e, pt))
            };
        }

        // Update winding counts. Both edges are closed here, and e1 sits
        // left of e2 until the caller swaps them.
        if self.is_same_polytype(e1, e2) {
            if self.fill_rule == FillRule::EvenOdd {
                let c = self.edge(e1).wind_cnt;
                self.edge_mut(e1).wind_cnt = self.edge(e2).wind_cnt;
                self.edge_mut(e2).wind_cnt = c;
            } else {
                let d2 = self.edge(e2).wind_dx;
                let d1 = self.edge(e1).wind_dx;
                self.edge_mut(e1).wind_cnt += d2;
                self.edge_mut(e2).wind_cnt -= d1;
            }
        } else if self.fill_rule == FillRule::EvenOdd {
            let c1 = self.edge(e1).wind_cnt2;
            let c2 = self.edge(e2).wind_cnt2;
            self.edge_mut(e1).wind_cnt2 = i32::from(c1 == 0);
            self.edge_mut(e2).wind_cnt2 = i32::from(c2 == 0);
        } else {
            let d2 = self.edge(e2).wind_dx;
            let d1 = self.edge(e1).wind_dx;
            self.edge_mut(e1).wind_cnt2 += d2;
            self.edge_mut(e2).wind_cnt2 -= d1;
        }

        let (e1_wc, e2_wc) = match self.fill_rule {
            FillRule::Positive => (self.edge(e1).wind_cnt, self.edge(e2).wind_cnt),
            FillRule::Negative => (-self.edge(e1).wind_cnt, -self.edge(e2).wind_cnt),
            _ => (self.edge(e1).wind_cnt.abs(), self.edge(e2).wind_cnt.abs()),
        };
        let e1_wc_in_01 = e1_wc == 0 || e1_wc == 1;
        let e2_wc_in_01 = e2_wc == 0 || e2_wc == 1;
        if (!self.is_hot(e1) && !e1_wc_in_01) || (!self.is_hot(e2) && !e2_wc_in_01) {
            return None;
        }

        if self.is_hot(e1) && self.is_hot(e2) {
            if !e1_wc_in_01
                || !e2_wc_in_01
                || (!self.is_same_polytype(e1, e2) && self.clip_type != ClipType::Xor)
            {
                self.add_local_max_poly(e1, e2, pt)
            } else if self.is_front(e1) || self.edge(e1).outrec == self.edge(e2).outrec {
                // Edges only touch at a vertex: close and immediately
                // reopen, splitting the polygons apart there.
                let op = self.add_local_max_poly(e1, e2, pt);
                let op2 = self.add_local_min_poly(e1, e2, pt, false);
                if let Some(op) = op {
                    if self.outpt(op).pt == self.outpt(op2).pt
                        && !is_horizontal(self.edge(e1))
                        && !is_horizontal(self.edge(e2))
                        && cross_product(self.edge(e1).bot, self.outpt(op).pt, self.edge(e2).bot)
                            == 0
                    {
                        self.add_join(op, op2);
                    }
                }
                op
            } else {
                let op = self.add_out_pt(e1, pt);
                self.add_out_pt(e2, pt);
                self.swap_outrecs(e1, e2);
                Some(op)
            }
        } else if self.is_hot(e1) {
            let op = self.add_out_pt(e1, pt);
            self.swap_outrecs(e1, e2);
            Some(op)
        } else if self.is_hot(e2) {
            let op = self.add_out_pt(e2, pt);
            self.swap_outrecs(e1, e2);
            Some(op)
        } else {
            // Neither edge is bounding output: the crossing may still open
            // a new local-minimum polygon.
            let (e1_wc2, e2_wc2) = match self.fill_rule {
                FillRule::Positive => (self.edge(e1).wind_cnt2, self.edge(e2).wind_cnt2),
                FillRule::Negative => (-self.edge(e1).wind_cnt2, -self.edge(e2).wind_cnt2),
                _ => (self.edge(e1).wind_cnt2.abs(), self.edge(e2).wind_cnt2.abs()),
            };
            if !self.is_same_polytype(e1, e2) {
                Some(self.add_local_min_poly(e1, e2, pt, false))
            } else if e1_wc == 1 && e2_wc == 1 {
                match self.clip_type {
                    ClipType::Union => {
                        if e1_wc2 <= 0 && e2_wc2 <= 0 {
                            Some(self.add_local_min_poly(e1, e2, pt, false))
                        } else {
                            None
                        }
                    }
                    ClipType::Difference => {
                        let wanted = (self.polytype(e1) == PathType::Clip
                            && e1_wc2 > 0
                            && e2_wc2 > 0)
                            || (self.polytype(e1) == PathType::Subject
                                && e1_wc2 <= 0
                                && e2_wc2 <= 0);
                        if wanted {
                            Some(self.add_local_min_poly(e1, e2, pt, false))
                        } else {
                            None
                        }
                    }
                    ClipType::Xor => Some(self.add_local_min_poly(e1, e2, pt, false)),
                    ClipType::Intersection => {
                        if e1_wc2 > 0 && e2_wc2 > 0 {
                            Some(self.add_local_min_poly(e1, e2, pt, false))
                        } else {
                            None
                        }
                    }
                    ClipType::None => None,
                }
            } else {
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Scan-beam intersections (4.7)
    // ------------------------------------------------------------------

    pub(crate) fn do_intersections(&mut self, top_y: i64) {
        if self.build_intersect_list(top_y) {
            if self.error.is_none() {
                self.process_intersect_list();
            }
            self.intersects.clear();
        }
    }

    fn adjust_curr_x_and_copy_to_sel(&mut self, top_y: i64) {
        let mut e = self.ael_first;
        self.sel_first = e;
        while let Some(id) = e {
            let next = self.edge(id).next_in_ael;
            let cx = top_x(self.edge(id), top_y);
            let ed = self.edge_mut(id);
            ed.prev_in_sel = ed.prev_in_ael;
            ed.next_in_sel = next;
            ed.jump = next;
            ed.curr_x = cx;
            e = next;
        }
    }

    /// Merge-sorts the SEL by X-at-top; every out-of-order pair encountered
    /// is an edge crossing somewhere within the beam.
    fn build_intersect_list(&mut self, top_y: i64) -> bool {
        match self.ael_first {
            Some(first) if self.edge(first).next_in_ael.is_some() => {}
            _ => return false,
        }
        self.adjust_curr_x_and_copy_to_sel(top_y);

        let mut left = self.sel_first;
        while left.map_or(false, |l| self.edge(l).jump.is_some()) {
            let mut prev_base: Option<ActiveId> = None;
            while let Some(l) = left {
                let jump = match self.edge(l).jump {
                    Some(j) => j,
                    None => break,
                };
                let mut curr_base = l;
                let mut lhs = Some(l);
                let mut rhs = Some(jump);
                let mut l_end = Some(jump);
                let r_end = self.edge(jump).jump;
                self.edge_mut(l).jump = r_end;

                while lhs != l_end && rhs != r_end {
                    let le = lhs.unwrap();
                    let re = rhs.unwrap();
                    if self.edge(re).curr_x < self.edge(le).curr_x {
                        // `re` crosses everything from `le` up to the end of
                        // the left run.
                        let mut tmp = self.edge(re).prev_in_sel.unwrap();
                        loop {
                            self.add_new_intersect_node(tmp, re, top_y);
                            if tmp == le {
                                break;
                            }
                            tmp = self.edge(tmp).prev_in_sel.unwrap();
                        }
                        // Move `re` in front of `le` in the SEL.
                        let moved = re;
                        rhs = self.extract_from_sel(moved);
                        l_end = rhs;
                        self.insert_before_in_sel(moved, le);
                        if lhs == Some(curr_base) {
                            curr_base = moved;
                            self.edge_mut(curr_base).jump = r_end;
                            match prev_base {
                                None => self.sel_first = Some(curr_base),
                                Some(pb) => self.edge_mut(pb).jump = Some(curr_base),
                            }
                        }
                    } else {
                        lhs = self.edge(le).next_in_sel;
                    }
                }
                prev_base = Some(curr_base);
                left = r_end;
            }
            left = self.sel_first;
        }
        !self.intersects.is_empty()
    }

    fn extract_from_sel(&mut self, e: ActiveId) -> Option<ActiveId> {
        let prev = self.edge(e).prev_in_sel;
        let next = self.edge(e).next_in_sel;
        if let Some(next) = next {
            self.edge_mut(next).prev_in_sel = prev;
        }
        if let Some(prev) = prev {
            self.edge_mut(prev).next_in_sel = next;
        } else {
            self.sel_first = next;
        }
        next
    }

    fn insert_before_in_sel(&mut self, e1: ActiveId, e2: ActiveId) {
        let prev = self.edge(e2).prev_in_sel;
        self.edge_mut(e1).next_in_sel = Some(e2);
        self.edge_mut(e1).prev_in_sel = prev;
        self.edge_mut(e2).prev_in_sel = Some(e1);
        match prev {
            Some(prev) => self.edge_mut(prev).next_in_sel = Some(e1),
            None => self.sel_first = Some(e1),
        }
    }

    fn add_new_intersect_node(&mut self, e1: ActiveId, e2: ActiveId, top_y: i64) {
        let (b1, t1) = (self.edge(e1).bot, self.edge(e1).top);
        let (b2, t2) = (self.edge(e2).bot, self.edge(e2).top);
        let mut pt = match get_intersect_point(b1, t1, b2, t2) {
            Crossing::At(pt) => pt,
            Crossing::Parallel => Point64::new(self.edge(e1).curr_x, top_y), // collinear overlap
            Crossing::OutOfRange => {
                self.error = Some(ClipError::ArithmeticOverflow);
                return;
            }
        };
        // Rounding can land the crossing outside the beam; clamp it back.
        if pt.y > top_y || pt.y < self.bot_y {
            let clamp_y = if pt.y > top_y { top_y } else { self.bot_y };
            let use_e1 = if clamp_y == top_y {
                self.edge(e1).top.y == top_y
            } else {
                self.edge(e1).dx.abs() < self.edge(e2).dx.abs()
            };
            pt.y = clamp_y;
            pt.x = if use_e1 {
                top_x(self.edge(e1), clamp_y)
            } else {
                top_x(self.edge(e2), clamp_y)
            };
        }
        self.intersects.push(IntersectNode {
            edge1: e1,
            edge2: e2,
            pt,
        });
    }

    fn edges_adjacent(&self, node: &IntersectNode) -> bool {
        self.edge(node.edge1).next_in_ael == Some(node.edge2)
            || self.edge(node.edge1).prev_in_ael == Some(node.edge2)
    }

    fn process_intersect_list(&mut self) {
        // Crossings lowest-first; equal heights processed left to right.
        // Two crossings snapped to the same point stay in arrival order.
        self.intersects.sort_by_key(|n| (n.pt.y, n.pt.x));

        for i in 0..self.intersects.len() {
            if !self.edges_adjacent(&self.intersects[i]) {
                // The recorded pair drifted apart; find a later node whose
                // edges are adjacent now and do that one first.
                let mut j = i + 1;
                while j < self.intersects.len() && !self.edges_adjacent(&self.intersects[j]) {
                    j += 1;
                }
                if j < self.intersects.len() {
                    self.intersects.swap(i, j);
                } else {
                    self.error = Some(ClipError::InvariantViolation(
                        "no adjacent edge pair while processing intersections",
                    ));
                    return;
                }
            }
            let node = self.intersects[i];
            // Keep the pair ordered left-right before crossing them.
            let (e1, e2) = if self.edge(node.edge1).next_in_ael == Some(node.edge2) {
                (node.edge1, node.edge2)
            } else {
                (node.edge2, node.edge1)
            };
            self.intersect_edges(e1, e2, node.pt);
            self.swap_positions_in_ael(e1, e2);
            self.edge_mut(e1).curr_x = node.pt.x;
            self.edge_mut(e2).curr_x = node.pt.x;
        }
    }

    // ------------------------------------------------------------------
    // Top of scan-beam (4.4 step 4)
    // ------------------------------------------------------------------

    pub(crate) fn do_top_of_scanbeam(&mut self, y: i64) {
        self.sel_first = None; // the SEL doubles as the horizontal stack
        let mut e_opt = self.ael_first;
        while let Some(e) = e_opt {
            if self.edge(e).top.y == y {
                let top = self.edge(e).top;
                self.edge_mut(e).curr_x = top.x;
                if self.is_maxima(e) {
                    e_opt = self.do_maxima(e);
                    continue;
                }
                // An intermediate vertex: bend into the next bound edge.
                if self.is_hot(e) {
                    self.add_out_pt(e, top);
                }
                self.update_edge_into_ael(e);
                if is_horizontal(self.edge(e)) {
                    self.push_horz(e);
                } else if self.test_join_with_prev(e) {
                    let bot = self.edge(e).bot;
                    let prev = self.edge(e).prev_in_ael.unwrap();
                    let op1 = self.add_out_pt(prev, bot);
                    let op2 = self.add_out_pt(e, bot);
                    self.add_join(op1, op2);
                }
            } else {
                let cx = top_x(self.edge(e), y);
                self.edge_mut(e).curr_x = cx;
            }
            e_opt = self.edge(e).next_in_ael;
        }
    }

    /// True when `e` runs collinear into its hot AEL predecessor at the
    /// current point, making their rings candidates for merging.
    fn test_join_with_prev(&self, e: ActiveId) -> bool {
        if !self.is_hot(e) || self.is_open(e) {
            return false;
        }
        let Some(prev) = self.edge(e).prev_in_ael else {
            return false;
        };
        if !self.is_hot(prev) || self.is_open(prev) || is_horizontal(self.edge(prev)) {
            return false;
        }
        let (ed, pd) = (self.edge(e), self.edge(prev));
        pd.curr_x == ed.curr_x
            && cross_product(pd.top, ed.bot, ed.top) == 0
            && pd.bot.y <= ed.bot.y
    }

    fn do_maxima(&mut self, e: ActiveId) -> Option<ActiveId> {
        let prev_e = self.edge(e).prev_in_ael;
        let next_e = self.edge(e).next_in_ael;

        if self.is_open_end(e) {
            if self.is_hot(e) {
                let top = self.edge(e).top;
                self.add_out_pt(e, top);
            }
            if !is_horizontal(self.edge(e)) {
                if self.is_hot(e) {
                    self.edge_mut(e).outrec = None;
                }
                self.delete_from_ael(e);
            }
            return next_e;
        }

        let max_pair = match self.get_maxima_pair(e) {
            Some(p) => p,
            // The pair is a horizontal not yet swept; this edge retires
            // when the horizontal reaches it.
            None => return next_e,
        };

        // Every edge between the pair crosses both at the shared top.
        let mut between = self.edge(e).next_in_ael;
        while let Some(b) = between {
            if b == max_pair {
                break;
            }
            let top = self.edge(e).top;
            self.intersect_edges(e, b, top);
            self.swap_positions_in_ael(e, b);
            between = self.edge(e).next_in_ael;
        }

        if self.is_hot(e) {
            let top = self.edge(e).top;
            self.add_local_max_poly(e, max_pair, top);
        }
        self.delete_from_ael(e);
        self.delete_from_ael(max_pair);
        match prev_e {
            Some(p) => self.edge(p).next_in_ael,
            None => self.ael_first,
        }
    }

    // ------------------------------------------------------------------
    // Horizontal edges (4.8)
    // ------------------------------------------------------------------

    pub(crate) fn push_horz(&mut self, e: ActiveId) {
        self.edge_mut(e).next_in_sel = self.sel_first;
        self.sel_first = Some(e);
    }

    pub(crate) fn pop_horz(&mut self) -> Option<ActiveId> {
        let e = self.sel_first?;
        self.sel_first = self.edge(e).next_in_sel;
        Some(e)
    }

    /// The last vertex of the run of consecutive horizontals at this
    /// scanline, when that run ends at a local maximum (or open end).
    fn get_curr_y_maxima_vertex(&self, horz: ActiveId) -> Option<VertexId> {
        let forward = self.edge(horz).wind_dx < 0;
        let mut v = self.edge(horz).vertex_top;
        let y = self.vertex(v).pt.y;
        loop {
            let flags = self.vertex(v).flags;
            if flags.intersects(VertexFlags::OPEN_START | VertexFlags::OPEN_END)
                || flags.contains(VertexFlags::LOCAL_MAX)
            {
                break;
            }
            let next = if forward {
                self.vertex(v).next
            } else {
                self.vertex(v).prev
            };
            if self.vertex(next).pt.y != y {
                break;
            }
            v = next;
        }
        if self
            .vertex(v)
            .flags
            .intersects(VertexFlags::LOCAL_MAX | VertexFlags::OPEN_END)
        {
            Some(v)
        } else {
            None
        }
    }

    /// Finds the active edge ending at `vert_max` (slope rounding makes
    /// `get_maxima_pair` unreliable around horizontals, so search both ways).
    fn get_horz_maxima_pair(&self, horz: ActiveId, vert_max: VertexId) -> Option<ActiveId> {
        let mut e = self.edge(horz).next_in_ael;
        while let Some(x) = e {
            if self.edge(x).vertex_top == vert_max {
                return Some(x);
            }
            e = self.edge(x).next_in_ael;
        }
        let mut e = self.edge(horz).prev_in_ael;
        while let Some(x) = e {
            if self.edge(x).vertex_top == vert_max {
                return Some(x);
            }
            e = self.edge(x).prev_in_ael;
        }
        None
    }

    /// Determines the traversal direction and X range of a horizontal.
    /// Returns `(is_left_to_right, left_x, right_x)`.
    fn reset_horz_direction(
        &self,
        horz: ActiveId,
        max_pair: Option<ActiveId>,
    ) -> (bool, i64, i64) {
        let ed = self.edge(horz);
        if ed.bot.x == ed.top.x {
            // Degenerate width: direction is wherever the maxima pair sits.
            let mut e = ed.next_in_ael;
            while let Some(x) = e {
                if Some(x) == max_pair {
                    break;
                }
                e = self.edge(x).next_in_ael;
            }
            (e.is_some(), ed.curr_x, ed.curr_x)
        } else if ed.curr_x < ed.top.x {
            (true, ed.curr_x, ed.top.x)
        } else {
            (false, ed.top.x, ed.curr_x)
        }
    }

    /// Sweeps a horizontal edge across the AEL, crossing everything it
    /// overlaps, then either retires it at a maxima pair or bends it back
    /// into the AEL (4.8). Horizontal runs pass through in one call.
    pub(crate) fn do_horizontal(&mut self, horz: ActiveId) {
        let horz_is_open = self.is_open(horz);
        let y = self.edge(horz).bot.y;

        let vertex_max = if self.is_open_end(horz) {
            Some(self.edge(horz).vertex_top)
        } else {
            self.get_curr_y_maxima_vertex(horz)
        };
        let max_pair = vertex_max.and_then(|vm| {
            if self
                .vertex(vm)
                .flags
                .intersects(VertexFlags::OPEN_START | VertexFlags::OPEN_END)
            {
                None
            } else {
                self.get_horz_maxima_pair(horz, vm)
            }
        });

        let (mut is_left_to_right, mut horz_left, mut horz_right) =
            self.reset_horz_direction(horz, max_pair);

        if self.is_hot(horz) {
            let cx = self.edge(horz).curr_x;
            let op = self.add_out_pt(horz, Point64::new(cx, y));
            if !horz_is_open {
                self.add_trial_horz_join(op);
            }
        }

        loop {
            let mut e_opt = if is_left_to_right {
                self.edge(horz).next_in_ael
            } else {
                self.edge(horz).prev_in_ael
            };

            while let Some(e) = e_opt {
                if Some(e) == max_pair {
                    // The horizontal run ends against its maxima partner.
                    if self.is_hot(horz) {
                        while self.edge(horz).vertex_top != self.edge(e).vertex_top {
                            let t = self.edge(horz).top;
                            self.add_out_pt(horz, t);
                            self.update_edge_into_ael(horz);
                        }
                        let t = self.edge(horz).top;
                        if is_left_to_right {
                            self.add_local_max_poly(horz, e, t);
                        } else {
                            self.add_local_max_poly(e, horz, t);
                        }
                    }
                    self.delete_from_ael(e);
                    self.delete_from_ael(horz);
                    return;
                }

                // Stop at the end of this horizontal segment...
                let ecx = self.edge(e).curr_x;
                if is_left_to_right {
                    if ecx > horz_right {
                        break;
                    }
                } else if ecx < horz_left {
                    break;
                }

                // ... and when exactly at the end, pass over `e` only while
                // it slopes away from the horizontal's continuation.
                if ecx == self.edge(horz).top.x && !is_horizontal(self.edge(e)) {
                    let next_pt = self.vertex(self.next_vertex_of(horz)).pt;
                    let ex_at = top_x(self.edge(e), next_pt.y);
                    if (is_left_to_right && ex_at >= next_pt.x)
                        || (!is_left_to_right && ex_at <= next_pt.x)
                    {
                        break;
                    }
                }

                let pt = Point64::new(ecx, y);
                let op = if is_left_to_right {
                    let op = self.intersect_edges(horz, e, pt);
                    self.swap_positions_in_ael(horz, e);
                    op
                } else {
                    let op = self.intersect_edges(e, horz, pt);
                    self.swap_positions_in_ael(e, horz);
                    op
                };
                if let Some(op) = op {
                    if !horz_is_open && self.is_hot(horz) && self.outpt(op).pt == pt {
                        self.add_trial_horz_join(op);
                    }
                }
                self.edge_mut(horz).curr_x = ecx;
                e_opt = if is_left_to_right {
                    self.edge(horz).next_in_ael
                } else {
                    self.edge(horz).prev_in_ael
                };
            }

            if horz_is_open && self.is_open_end(horz) {
                // The horizontal simply stops at the open end.
                if self.is_hot(horz) {
                    let t = self.edge(horz).top;
                    self.add_out_pt(horz, t);
                    self.edge_mut(horz).outrec = None;
                }
                self.delete_from_ael(horz);
                return;
            }

            // Another horizontal in the same bound continues the run.
            if self.vertex(self.next_vertex_of(horz)).pt.y != y {
                break;
            }
            if self.is_hot(horz) {
                let t = self.edge(horz).top;
                self.add_out_pt(horz, t);
            }
            self.update_edge_into_ael(horz);
            let dir = self.reset_horz_direction(horz, max_pair);
            is_left_to_right = dir.0;
            horz_left = dir.1;
            horz_right = dir.2;
        }

        // An intermediate horizontal: emit its far point and bend upward.
        if self.is_hot(horz) {
            let t = self.edge(horz).top;
            let op = self.add_out_pt(horz, t);
            if !horz_is_open {
                self.add_trial_horz_join(op);
            }
        }
        self.update_edge_into_ael(horz);
    }
}

//! Output ring construction: local-minimum polygon starts, point appends at
//! ring fronts/backs, local-maximum closes, ring joining, and the final
//! flattening into paths or a nesting tree.

use crate::engine::{ActiveId, Clipper64, OutPt, OutPtId, OutRec, OutRecId, OutRecState};
use crate::error::ClipError;
use crate::geometry::{point_in_polygon, Path64, Paths64, Point64, PointInPolygonResult, Rect64};
use crate::tree::{PolyPath64, PolyTree64};

impl Clipper64 {
    /// True when `e` is the front edge of its output ring (its points are
    /// prepended rather than appended).
    #[inline]
    pub(crate) fn is_front(&self, e: ActiveId) -> bool {
        match self.edge(e).outrec {
            Some(or) => self.outrec(or).front_edge == Some(e),
            None => false,
        }
    }

    fn outrec_is_ascending(&self, e: ActiveId) -> bool {
        self.is_front(e)
    }

    /// Nearest closed edge left of `e` that is bounding an output ring.
    fn prev_hot_edge(&self, e: ActiveId) -> Option<ActiveId> {
        let mut prev = self.edge(e).prev_in_ael;
        while let Some(p) = prev {
            if self.is_hot(p) && !self.is_open(p) {
                return Some(p);
            }
            prev = self.edge(p).prev_in_ael;
        }
        None
    }

    fn new_outrec(&mut self) -> OutRecId {
        let id = OutRecId(self.outrecs.len() as u32);
        self.outrecs.push(OutRec::default());
        id
    }

    fn new_outpt(&mut self, pt: Point64, outrec: OutRecId) -> OutPtId {
        let id = OutPtId(self.outpts.len() as u32);
        self.outpts.push(OutPt {
            pt,
            next: id,
            prev: id,
            outrec,
        });
        id
    }

    fn set_sides(&mut self, outrec: OutRecId, front: ActiveId, back: ActiveId) {
        let or = self.outrec_mut(outrec);
        or.front_edge = Some(front);
        or.back_edge = Some(back);
    }

    pub(crate) fn swap_sides(&mut self, outrec: OutRecId) {
        let or = self.outrec_mut(outrec);
        std::mem::swap(&mut or.front_edge, &mut or.back_edge);
    }

    /// Opens an output ring where a contributing bound pair enters the AEL
    /// (4.6). The orientation convention makes outer rings counter-clockwise:
    /// a fresh outer takes the right bound as its front edge, and rings
    /// opened inside another ring reverse with their owner's orientation.
    pub(crate) fn add_local_min_poly(
        &mut self,
        e1: ActiveId,
        e2: ActiveId,
        pt: Point64,
        is_new: bool,
    ) -> OutPtId {
        let outrec = self.new_outrec();
        self.edge_mut(e1).outrec = Some(outrec);
        self.edge_mut(e2).outrec = Some(outrec);

        if self.is_open(e1) {
            self.outrec_mut(outrec).state = OutRecState::Open;
            if self.edge(e1).wind_dx < 0 {
                self.set_sides(outrec, e1, e2);
            } else {
                self.set_sides(outrec, e2, e1);
            }
        } else if let Some(prev_hot) = self.prev_hot_edge(e1) {
            // Front edges carry the filled region on their left. If the
            // nearest hot edge is a front edge, the region between it and
            // this minimum is unfilled, so the new ring is another outer;
            // behind a back edge the minimum sits in filled territory and
            // the ring opens a hole.
            let owner = self.edge(prev_hot).outrec.unwrap();
            self.outrec_mut(outrec).owner = Some(owner);
            if self.outrec_is_ascending(prev_hot) == is_new {
                self.outrec_mut(outrec).state = OutRecState::Outer;
                self.set_sides(outrec, e2, e1);
            } else {
                self.outrec_mut(outrec).state = OutRecState::Inner;
                self.set_sides(outrec, e1, e2);
            }
        } else {
            self.outrec_mut(outrec).state = OutRecState::Outer;
            if is_new {
                self.set_sides(outrec, e2, e1);
            } else {
                self.set_sides(outrec, e1, e2);
            }
        }

        let op = self.new_outpt(pt, outrec);
        self.outrec_mut(outrec).pts = Some(op);
        op
    }

    /// Appends `pt` to the ring bounded by `e`, at the front or back end
    /// depending on which side `e` is.
    pub(crate) fn add_out_pt(&mut self, e: ActiveId, pt: Point64) -> OutPtId {
        let outrec = self.edge(e).outrec.expect("add_out_pt requires a hot edge");
        let to_front = self.is_front(e);
        let op_front = self.outrec(outrec).pts.expect("ring has a point");
        let op_back = self.outpt(op_front).next;

        // Duplicate end points collapse in place.
        if to_front {
            if pt == self.outpt(op_front).pt {
                return op_front;
            }
        } else if pt == self.outpt(op_back).pt {
            return op_back;
        }

        let new_op = self.new_outpt(pt, outrec);
        self.outpt_mut(op_back).prev = new_op;
        self.outpt_mut(new_op).prev = op_front;
        self.outpt_mut(new_op).next = op_back;
        self.outpt_mut(op_front).next = new_op;
        if to_front {
            self.outrec_mut(outrec).pts = Some(new_op);
        }
        new_op
    }

    /// Begins collecting an open path at `pt`.
    pub(crate) fn start_open_path(&mut self, e: ActiveId, pt: Point64) -> OutPtId {
        let outrec = self.new_outrec();
        self.outrec_mut(outrec).state = OutRecState::Open;
        self.edge_mut(e).outrec = Some(outrec);
        let op = self.new_outpt(pt, outrec);
        self.outrec_mut(outrec).pts = Some(op);
        op
    }

    /// Closes an output ring where two of its edges meet at a common top
    /// (4.6), or splices two rings when the meeting edges bound different
    /// ones.
    pub(crate) fn add_local_max_poly(
        &mut self,
        e1: ActiveId,
        e2: ActiveId,
        pt: Point64,
    ) -> Option<OutPtId> {
        if !self.is_hot(e1) || !self.is_hot(e2) {
            self.error = Some(ClipError::InvariantViolation(
                "local maximum reached with an unpaired edge",
            ));
            return None;
        }
        if self.is_front(e1) == self.is_front(e2) {
            // Mismatched sides are only recoverable at an open-path end.
            if self.is_open_end(e1) {
                let or = self.edge(e1).outrec.unwrap();
                self.swap_sides(or);
            } else if self.is_open_end(e2) {
                let or = self.edge(e2).outrec.unwrap();
                self.swap_sides(or);
            } else {
                self.error = Some(ClipError::InvariantViolation(
                    "output ring sides mismatched at a local maximum",
                ));
                return None;
            }
        }

        let result = self.add_out_pt(e1, pt);
        let or1 = self.edge(e1).outrec.unwrap();
        let or2 = self.edge(e2).outrec.unwrap();
        if or1 == or2 {
            self.outrec_mut(or1).pts = Some(result);
            self.uncouple_outrec(e1);
        } else if self.is_open(e1) {
            self.join_outrec_paths(e1, e2);
        } else if or1.0 < or2.0 {
            // Splice the younger ring into the older one, preserving the
            // older ring's winding orientation.
            self.join_outrec_paths(e1, e2);
        } else {
            self.join_outrec_paths(e2, e1);
        }
        Some(result)
    }

    /// Splices the OutPt rings of two open-ended OutRecs into one when
    /// edges from different rings meet (e.g. a union merge).
    fn join_outrec_paths(&mut self, e1: ActiveId, e2: ActiveId) {
        if self.is_front(e1) == self.is_front(e2) {
            self.error = Some(ClipError::InvariantViolation(
                "cannot join output rings from the same side",
            ));
            return;
        }
        let or1 = self.edge(e1).outrec.unwrap();
        let or2 = self.edge(e2).outrec.unwrap();
        let p1_start = self.outrec(or1).pts.unwrap();
        let p2_start = self.outrec(or2).pts.unwrap();
        let p1_end = self.outpt(p1_start).next;
        let p2_end = self.outpt(p2_start).next;

        if self.is_front(e1) {
            self.outpt_mut(p2_end).prev = p1_start;
            self.outpt_mut(p1_start).next = p2_end;
            self.outpt_mut(p2_start).next = p1_end;
            self.outpt_mut(p1_end).prev = p2_start;
            self.outrec_mut(or1).pts = Some(p2_start);
            let fe2 = self.outrec(or2).front_edge;
            self.outrec_mut(or1).front_edge = fe2;
            if let Some(fe) = fe2 {
                self.edge_mut(fe).outrec = Some(or1);
            }
        } else {
            self.outpt_mut(p1_end).prev = p2_start;
            self.outpt_mut(p2_start).next = p1_end;
            self.outpt_mut(p1_start).next = p2_end;
            self.outpt_mut(p2_end).prev = p1_start;
            let be2 = self.outrec(or2).back_edge;
            self.outrec_mut(or1).back_edge = be2;
            if let Some(be) = be2 {
                self.edge_mut(be).outrec = Some(or1);
            }
        }

        // The absorbed ring keeps an owner link so nesting still resolves
        // through it.
        {
            let o2 = self.outrec_mut(or2);
            o2.front_edge = None;
            o2.back_edge = None;
            o2.pts = None;
            o2.owner = Some(or1);
        }
        self.edge_mut(e1).outrec = None;
        self.edge_mut(e2).outrec = None;
    }

    /// Exchanges ring ownership between two edges that cross.
    pub(crate) fn swap_outrecs(&mut self, e1: ActiveId, e2: ActiveId) {
        let or1 = self.edge(e1).outrec;
        let or2 = self.edge(e2).outrec;
        if or1 == or2 {
            if let Some(or) = or1 {
                self.swap_sides(or);
            }
            return;
        }
        if let Some(or) = or1 {
            if self.outrec(or).front_edge == Some(e1) {
                self.outrec_mut(or).front_edge = Some(e2);
            } else {
                self.outrec_mut(or).back_edge = Some(e2);
            }
        }
        if let Some(or) = or2 {
            if self.outrec(or).front_edge == Some(e2) {
                self.outrec_mut(or).front_edge = Some(e1);
            } else {
                self.outrec_mut(or).back_edge = Some(e1);
            }
        }
        self.edge_mut(e1).outrec = or2;
        self.edge_mut(e2).outrec = or1;
    }

    /// Detaches a closed ring from its bounding edges.
    pub(crate) fn uncouple_outrec(&mut self, e: ActiveId) {
        let Some(outrec) = self.edge(e).outrec else {
            return;
        };
        let front = self.outrec(outrec).front_edge;
        let back = self.outrec(outrec).back_edge;
        if let Some(fe) = front {
            self.edge_mut(fe).outrec = None;
        }
        if let Some(be) = back {
            self.edge_mut(be).outrec = None;
        }
        let or = self.outrec_mut(outrec);
        or.front_edge = None;
        or.back_edge = None;
    }

    /// Follows owner links through rings absorbed by joins.
    pub(crate) fn get_real_outrec(&self, mut outrec: OutRecId) -> Option<OutRecId> {
        let mut hops = 0;
        while self.outrec(outrec).pts.is_none() {
            outrec = self.outrec(outrec).owner?;
            hops += 1;
            if hops > self.outrecs.len() {
                return None; // defensive break on a corrupt owner cycle
            }
        }
        Some(outrec)
    }

    // ------------------------------------------------------------------
    // Final output (C9)
    // ------------------------------------------------------------------

    /// Walks a ring into a path, collapsing repeated points. Returns `None`
    /// for degenerate rings.
    pub(crate) fn build_path(&self, start: OutPtId, is_open: bool) -> Option<Path64> {
        let mut path: Path64 = Vec::new();
        let mut op = start;
        loop {
            let node = self.outpt(op);
            if path.last() != Some(&node.pt) {
                path.push(node.pt);
            }
            op = node.next;
            if op == start {
                break;
            }
        }
        if !is_open && path.len() > 1 && path.first() == path.last() {
            path.pop();
        }
        if path.len() < if is_open { 2 } else { 3 } {
            None
        } else {
            Some(path)
        }
    }

    pub(crate) fn build_paths(&mut self) -> Result<(Paths64, Paths64), ClipError> {
        let mut closed = Vec::new();
        let mut open = Vec::new();
        for i in 0..self.outrecs.len() {
            let Some(pts) = self.outrecs[i].pts else {
                continue;
            };
            if self.outrecs[i].state == OutRecState::Open {
                if let Some(path) = self.build_path(pts, true) {
                    open.push(path);
                }
            } else if let Some(path) = self.build_path(pts, false) {
                closed.push(path);
            }
        }
        Ok((closed, open))
    }

    /// Reconstructs the nesting hierarchy (4.10): each ring's parent is the
    /// innermost enclosing ring reached through its owner chain, verified by
    /// bounding box and point-in-polygon tests. Open paths bypass the tree.
    pub(crate) fn build_tree(&mut self) -> Result<(PolyTree64, Paths64), ClipError> {
        let n = self.outrecs.len();
        let mut open = Vec::new();
        let mut paths: Vec<Option<Path64>> = vec![None; n];
        let mut bounds: Vec<Rect64> = vec![Rect64::invalid(); n];

        for i in 0..n {
            let Some(pts) = self.outrecs[i].pts else {
                continue;
            };
            if self.outrecs[i].state == OutRecState::Open {
                if let Some(path) = self.build_path(pts, true) {
                    open.push(path);
                }
            } else if let Some(path) = self.build_path(pts, false) {
                bounds[i] = Rect64::bounding(&path);
                paths[i] = Some(path);
            }
        }

        let contains = |outer: usize, inner: usize, paths: &[Option<Path64>]| -> bool {
            let (Some(op), Some(ip)) = (&paths[outer], &paths[inner]) else {
                return false;
            };
            if !bounds[outer].contains_rect(&bounds[inner]) {
                return false;
            }
            for &pt in ip {
                match point_in_polygon(pt, op) {
                    PointInPolygonResult::IsInside => return true,
                    PointInPolygonResult::IsOutside => return false,
                    PointInPolygonResult::IsOn => continue,
                }
            }
            true // every point on the boundary: treat as nested
        };

        let mut parent: Vec<Option<usize>> = vec![None; n];
        for i in 0..n {
            if paths[i].is_none() {
                continue;
            }
            let mut owner = self.outrecs[i].owner;
            let mut hops = 0;
            'chain: while let Some(o) = owner {
                let oi = o.idx();
                hops += 1;
                if hops > n {
                    break;
                }
                // Rings split off an owner may be the tighter container.
                for &s in &self.outrecs[oi].splits {
                    let si = s.idx();
                    if si != i && contains(si, i, &paths) {
                        parent[i] = Some(si);
                        break 'chain;
                    }
                }
                if contains(oi, i, &paths) {
                    parent[i] = Some(oi);
                    break;
                }
                owner = self.outrecs[oi].owner;
            }
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut top_level = Vec::new();
        for i in 0..n {
            if paths[i].is_none() {
                continue;
            }
            match parent[i] {
                Some(p) => children[p].push(i),
                None => top_level.push(i),
            }
        }

        fn attach(
            node: &mut PolyPath64,
            idx: usize,
            paths: &mut [Option<Path64>],
            children: &[Vec<usize>],
        ) {
            let path = paths[idx].take().unwrap_or_default();
            let child = node.add_child(path);
            for &c in &children[idx] {
                attach(child, c, paths, children);
            }
        }

        let mut tree = PolyTree64::new();
        for i in top_level {
            attach(tree.root_mut(), i, &mut paths, &children);
        }
        Ok((tree, open))
    }
}

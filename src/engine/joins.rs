//! Post-sweep ring repair: resolving pending joins between rings that touch
//! at shared points, splitting rings that revisit a point, removing
//! collinear vertices and repairing self-intersections.

use crate::engine::{Clipper64, OutPtId, OutRecId, OutRecState};
use crate::geometry::{
    area_triangle, dot_product, get_intersect_point, is_collinear, segments_intersect, Crossing,
};

impl Clipper64 {
    /// Records a pending merge of two output ring fragments at a shared
    /// point.
    pub(crate) fn add_join(&mut self, op1: OutPtId, op2: OutPtId) {
        if op1 != op2 {
            self.joins.push((op1, op2));
        }
    }

    /// Records an output point on a horizontal edge as a merge candidate.
    pub(crate) fn add_trial_horz_join(&mut self, op: OutPtId) {
        if !self.horz_trials.contains(&op) {
            self.horz_trials.push(op);
        }
    }

    /// Promotes trial horizontal joiners to real joins (4.8 step 4): two
    /// trial points that coincide but sit apart in the ring graph mark rings
    /// that touch along a horizontal and should be merged (or split).
    pub(crate) fn convert_horz_trials_to_joins(&mut self) {
        if self.horz_trials.len() < 2 {
            self.horz_trials.clear();
            return;
        }
        let trials = std::mem::take(&mut self.horz_trials);
        for i in 0..trials.len() {
            for &b in &trials[i + 1..] {
                let a = trials[i];
                if a == b || self.outpt(a).pt != self.outpt(b).pt {
                    continue;
                }
                if self.outpt(a).next == b || self.outpt(a).prev == b {
                    continue; // already neighbours; nothing to merge
                }
                self.add_join(a, b);
            }
        }
    }

    /// Resolves the join list (4.9), then runs collinear cleanup and
    /// self-intersection repair over every surviving ring.
    pub(crate) fn process_joins(&mut self) {
        let mut idx = 0;
        while idx < self.joins.len() {
            let (op1, op2) = self.joins[idx];
            idx += 1;
            if op1 == op2 {
                continue; // tombstoned
            }
            let Some(or1) = self.get_real_outrec(self.outpt(op1).outrec) else {
                continue;
            };
            let Some(or2) = self.get_real_outrec(self.outpt(op2).outrec) else {
                continue;
            };
            if self.outrec(or1).state == OutRecState::Open
                || self.outrec(or2).state == OutRecState::Open
            {
                continue;
            }
            if self.outpt(op1).pt != self.outpt(op2).pt {
                continue;
            }
            if self.outpt(op1).next == op2 || self.outpt(op1).prev == op2 {
                continue; // collapsed to neighbours by an earlier join
            }

            // Splice the two rings at the shared point. When both points
            // belong to the same ring this cuts it in two instead.
            let n1 = self.outpt(op1).next;
            let n2 = self.outpt(op2).next;
            self.outpt_mut(op1).next = n2;
            self.outpt_mut(n2).prev = op1;
            self.outpt_mut(op2).next = n1;
            self.outpt_mut(n1).prev = op2;

            if or1 != or2 {
                let o2 = self.outrec_mut(or2);
                o2.pts = None;
                o2.front_edge = None;
                o2.back_edge = None;
                o2.owner = Some(or1);
            } else {
                self.split_ring(or1, op1, op2);
            }
        }
        self.joins.clear();

        for i in 0..self.outrecs.len() {
            let id = OutRecId(i as u32);
            if self.outrec(id).pts.is_some() && self.outrec(id).state != OutRecState::Open {
                self.clean_collinear(id);
            }
        }
    }

    /// After a same-ring splice, `op1` and `op2` head two now-disjoint
    /// rings. The fragment holding the original start keeps the OutRec; the
    /// spur becomes a new one recorded in `splits`.
    fn split_ring(&mut self, outrec: OutRecId, op1: OutPtId, op2: OutPtId) {
        let pts = self.outrec(outrec).pts.expect("split ring has points");
        let keep_op1 = self.ring_contains(op1, pts);
        let (keep, spur) = if keep_op1 { (op1, op2) } else { (op2, op1) };
        self.outrec_mut(outrec).pts = Some(keep);

        let new_or = self.new_split_outrec(outrec);
        let mut op = spur;
        loop {
            self.outpt_mut(op).outrec = new_or;
            op = self.outpt(op).next;
            if op == spur {
                break;
            }
        }
        self.outrec_mut(new_or).pts = Some(spur);
        self.outrec_mut(outrec).splits.push(new_or);
    }

    fn new_split_outrec(&mut self, parent: OutRecId) -> OutRecId {
        let state = self.outrec(parent).state;
        let id = OutRecId(self.outrecs.len() as u32);
        self.outrecs.push(Default::default());
        let or = self.outrec_mut(id);
        or.state = state;
        or.owner = Some(parent);
        id
    }

    fn ring_contains(&self, start: OutPtId, target: OutPtId) -> bool {
        let mut op = start;
        loop {
            if op == target {
                return true;
            }
            op = self.outpt(op).next;
            if op == start {
                return false;
            }
        }
    }

    /// Unlinks an output point, returning its successor.
    fn dispose_outpt(&mut self, op: OutPtId) -> OutPtId {
        let prev = self.outpt(op).prev;
        let next = self.outpt(op).next;
        self.outpt_mut(prev).next = next;
        self.outpt_mut(next).prev = prev;
        next
    }

    /// Drops any still-pending join that references a point about to be
    /// unlinked.
    fn purge_joins_of(&mut self, op: OutPtId) {
        for join in &mut self.joins {
            if join.0 == op || join.1 == op {
                *join = (op, op);
            }
        }
    }

    fn is_valid_closed_ring(&self, op: OutPtId) -> bool {
        let next = self.outpt(op).next;
        next != op && next != self.outpt(op).prev
    }

    /// Removes vertices where three consecutive ring points are collinear
    /// (always removing exact duplicates and 180-degree spikes), then checks
    /// the ring for self-intersections (4.9). Rings reduced below three
    /// distinct points are discarded.
    pub(crate) fn clean_collinear(&mut self, outrec: OutRecId) {
        let Some(outrec) = self.get_real_outrec(outrec) else {
            return;
        };
        if self.outrec(outrec).state == OutRecState::Open {
            return;
        }
        let Some(mut start) = self.outrec(outrec).pts else {
            return;
        };
        if !self.is_valid_closed_ring(start) {
            self.outrec_mut(outrec).pts = None;
            return;
        }

        let mut op2 = start;
        loop {
            let prev = self.outpt(op2).prev;
            let next = self.outpt(op2).next;
            let (pp, cp, np) = (
                self.outpt(prev).pt,
                self.outpt(op2).pt,
                self.outpt(next).pt,
            );
            if is_collinear(pp, cp, np)
                && (cp == pp
                    || cp == np
                    || !self.preserve_collinear()
                    || dot_product(pp, cp, np) < 0)
            {
                if op2 == start {
                    start = prev;
                }
                self.purge_joins_of(op2);
                let nxt = self.dispose_outpt(op2);
                if !self.is_valid_closed_ring(nxt) {
                    self.outrec_mut(outrec).pts = None;
                    return;
                }
                start = nxt;
                op2 = nxt;
                continue;
            }
            op2 = next;
            if op2 == start {
                break;
            }
        }
        self.outrec_mut(outrec).pts = Some(start);
        self.fix_self_intersects(outrec);
    }

    /// Detects a ring edge properly crossing its second-next edge, cuts the
    /// ring at the crossing, and re-validates both halves (4.9).
    fn fix_self_intersects(&mut self, outrec: OutRecId) {
        let Some(mut start) = self.outrec(outrec).pts else {
            return;
        };
        let mut op2 = start;
        loop {
            // Triangles cannot self-intersect.
            if self.outpt(op2).prev == self.outpt(self.outpt(op2).next).next {
                break;
            }
            let next = self.outpt(op2).next;
            let a = self.outpt(self.outpt(op2).prev).pt;
            let b = self.outpt(op2).pt;
            let c = self.outpt(next).pt;
            let d = self.outpt(self.outpt(next).next).pt;
            if segments_intersect(a, b, c, d) {
                if op2 == start || next == start {
                    start = self.outpt(op2).prev;
                }
                let repaired = self.do_split_op(outrec, op2);
                self.outrec_mut(outrec).pts = Some(repaired);
                if !self.is_valid_closed_ring(repaired) {
                    self.outrec_mut(outrec).pts = None;
                    return;
                }
                start = repaired;
                op2 = repaired;
                continue;
            }
            op2 = next;
            if op2 == start {
                break;
            }
        }
    }

    /// Cuts out the pair of edges crossing at `split` and closes the ring
    /// over the crossing point. The excised pair survives as a new ring when
    /// its area is significant, otherwise it is discarded as a sliver.
    fn do_split_op(&mut self, outrec: OutRecId, split: OutPtId) -> OutPtId {
        let prev = self.outpt(split).prev;
        let next = self.outpt(split).next;
        let next_next = self.outpt(next).next;
        let result = prev;

        // The segments properly cross, so the crossing lies within their
        // bounds; anything else degrades to cutting at the split point.
        let ip = match get_intersect_point(
            self.outpt(prev).pt,
            self.outpt(split).pt,
            self.outpt(next).pt,
            self.outpt(next_next).pt,
        ) {
            Crossing::At(ip) => ip,
            _ => self.outpt(split).pt,
        };

        let area1 = self.ring_area(prev);
        let area2 = area_triangle(ip, self.outpt(split).pt, self.outpt(next).pt);

        if ip == self.outpt(prev).pt || ip == self.outpt(next_next).pt {
            self.outpt_mut(next_next).prev = prev;
            self.outpt_mut(prev).next = next_next;
        } else {
            let new_ip = self.new_ring_pt(ip, outrec, prev, next_next);
            self.outpt_mut(next_next).prev = new_ip;
            self.outpt_mut(prev).next = new_ip;
        }

        // The split pair keeps its own ring when it outweighs the remainder
        // or winds the same way; slivers vanish.
        if area2.abs() >= 1.0 && (area2.abs() > area1.abs() || (area2 > 0.0) == (area1 > 0.0)) {
            let new_or = self.new_split_outrec(outrec);
            self.outpt_mut(split).outrec = new_or;
            self.outpt_mut(next).outrec = new_or;
            let new_op = self.new_ring_pt(ip, new_or, next, split);
            self.outpt_mut(split).prev = new_op;
            self.outpt_mut(next).next = new_op;
            self.outrec_mut(new_or).pts = Some(new_op);
            self.outrec_mut(outrec).splits.push(new_or);
        } else {
            self.purge_joins_of(split);
            self.purge_joins_of(next);
        }
        result
    }

    fn new_ring_pt(
        &mut self,
        pt: crate::geometry::Point64,
        outrec: OutRecId,
        prev: OutPtId,
        next: OutPtId,
    ) -> OutPtId {
        let id = OutPtId(self.outpts.len() as u32);
        self.outpts.push(crate::engine::OutPt {
            pt,
            next,
            prev,
            outrec,
        });
        id
    }

    /// Signed area of the ring containing `start`.
    fn ring_area(&self, start: OutPtId) -> f64 {
        let mut sum = 0.0;
        let mut op = start;
        loop {
            let node = self.outpt(op);
            let prev_pt = self.outpt(node.prev).pt;
            sum += (prev_pt.x as i128 * node.pt.y as i128 - node.pt.x as i128 * prev_pt.y as i128)
                as f64;
            op = node.next;
            if op == start {
                break;
            }
        }
        sum * 0.5
    }
}

//! The scanline clipping engine.
//!
//! A Vatti-style sweep over the local minima of the subject and clip paths.
//! Edges crossing the current scanline live in the active edge list (AEL),
//! ordered left to right; winding counts accumulated across the AEL decide
//! which edge pairs contribute to the solution under the chosen fill rule.
//! Output rings are stitched together at local minima and maxima, repaired
//! by the join pass, and finally flattened into paths or nested into a
//! [`PolyTree64`].
//!
//! All graph nodes (vertices, active edges, output points and rings) live in
//! arenas owned by the engine and addressed by index, so the pervasive
//! next/prev cycles need no reference counting; cleanup drops the arenas
//! wholesale.
//!
//! # Example
//!
//! ```
//! use scanbeam::{Clipper64, ClipType, FillRule, Point64};
//!
//! let subject = vec![vec![
//!     Point64::new(0, 0),
//!     Point64::new(10, 0),
//!     Point64::new(10, 10),
//!     Point64::new(0, 10),
//! ]];
//! let clip = vec![vec![
//!     Point64::new(5, 5),
//!     Point64::new(15, 5),
//!     Point64::new(15, 15),
//!     Point64::new(5, 15),
//! ]];
//!
//! let mut clipper = Clipper64::new();
//! clipper.add_subject(&subject);
//! clipper.add_clip(&clip);
//! let (closed, _open) = clipper
//!     .execute(ClipType::Intersection, FillRule::EvenOdd)
//!     .unwrap();
//! assert_eq!(closed.len(), 1);
//! ```

mod joins;
mod output;
mod sweep;
mod vertex;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use bitflags::bitflags;

use crate::error::ClipError;
use crate::geometry::{Path64, Paths64, Point64};
use crate::tree::PolyTree64;

/// The boolean operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipType {
    /// No operation; execute returns nothing.
    #[default]
    None,
    /// Regions covered by both subject and clip.
    Intersection,
    /// Regions covered by subject or clip (or both).
    Union,
    /// Regions covered by subject but not clip.
    Difference,
    /// Regions covered by exactly one of subject and clip.
    Xor,
}

/// Maps winding numbers to filled regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// A region is filled if its winding count is odd.
    #[default]
    EvenOdd,
    /// A region is filled if its winding count is non-zero.
    NonZero,
    /// A region is filled if its winding count is positive.
    Positive,
    /// A region is filled if its winding count is negative.
    Negative,
}

/// Whether a path belongs to the subject or the clip set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    Subject,
    Clip,
}

bitflags! {
    /// Per-vertex annotations assigned while building the vertex rings.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct VertexFlags: u8 {
        const OPEN_START = 1;
        const OPEN_END = 2;
        const LOCAL_MAX = 4;
        const LOCAL_MIN = 8;
    }
}

macro_rules! arena_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub(crate) struct $name(pub(crate) u32);

        impl $name {
            #[inline]
            pub(crate) fn idx(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(VertexId);
arena_id!(ActiveId);
arena_id!(OutPtId);
arena_id!(OutRecId);

/// A point in a doubly linked input ring.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Vertex {
    pub pt: Point64,
    pub next: VertexId,
    pub prev: VertexId,
    pub flags: VertexFlags,
}

/// A vertex where both adjacent edges head upward; one per sweep bound pair.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LocalMinima {
    pub vertex: VertexId,
    pub polytype: PathType,
    pub is_open: bool,
}

/// An edge currently crossing the scanline.
#[derive(Debug, Clone)]
pub(crate) struct Active {
    pub bot: Point64,
    pub top: Point64,
    /// X where this edge crosses the current scanline.
    pub curr_x: i64,
    /// Inverse slope (dx per unit dy); +/-MAX for horizontals.
    pub dx: f64,
    /// Winding delta contributed when the scan crosses this edge. Also
    /// encodes the bound's ring-walk direction: positive bounds walk the
    /// vertex ring backwards (prev), negative forwards (next).
    pub wind_dx: i32,
    /// Running winding count for this edge's own polytype.
    pub wind_cnt: i32,
    /// Running winding count for the opposite polytype.
    pub wind_cnt2: i32,
    pub outrec: Option<OutRecId>,
    pub prev_in_ael: Option<ActiveId>,
    pub next_in_ael: Option<ActiveId>,
    /// Sorted-list links, reused by intersection sorting and horizontals.
    pub prev_in_sel: Option<ActiveId>,
    pub next_in_sel: Option<ActiveId>,
    pub jump: Option<ActiveId>,
    pub vertex_top: VertexId,
    pub local_min: LocalMinima,
    pub is_left_bound: bool,
}

/// Construction state of an output ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum OutRecState {
    #[default]
    Undefined,
    Open,
    Outer,
    Inner,
}

/// A point in a doubly linked output ring.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OutPt {
    pub pt: Point64,
    pub next: OutPtId,
    pub prev: OutPtId,
    pub outrec: OutRecId,
}

/// An output polygon under construction.
#[derive(Debug, Clone, Default)]
pub(crate) struct OutRec {
    pub owner: Option<OutRecId>,
    /// Rings split off from this one by the join pass.
    pub splits: Vec<OutRecId>,
    pub front_edge: Option<ActiveId>,
    pub back_edge: Option<ActiveId>,
    pub pts: Option<OutPtId>,
    pub state: OutRecState,
}

/// An edge crossing scheduled within the current scan-beam.
#[derive(Debug, Clone, Copy)]
pub(crate) struct IntersectNode {
    pub edge1: ActiveId,
    pub edge2: ActiveId,
    pub pt: Point64,
}

/// The 64-bit integer clipping engine.
///
/// Paths are added up front (`add_subject` / `add_open_subject` /
/// `add_clip`), then one or more `execute` calls run boolean operations
/// over them. Added paths persist across executes until [`Clipper64::clear`].
#[derive(Debug, Default)]
pub struct Clipper64 {
    pub(crate) clip_type: ClipType,
    pub(crate) fill_rule: FillRule,
    preserve_collinear: bool,

    // Built at path-add time, persistent across executes.
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) minima: Vec<LocalMinima>,
    minima_sorted: bool,
    pub(crate) has_open_paths: bool,

    // Per-execute sweep state.
    pub(crate) cur_min: usize,
    pub(crate) scanlines: BinaryHeap<Reverse<i64>>,
    pub(crate) actives: Vec<Active>,
    pub(crate) ael_first: Option<ActiveId>,
    pub(crate) sel_first: Option<ActiveId>,
    pub(crate) outrecs: Vec<OutRec>,
    pub(crate) outpts: Vec<OutPt>,
    pub(crate) joins: Vec<(OutPtId, OutPtId)>,
    pub(crate) horz_trials: Vec<OutPtId>,
    pub(crate) intersects: Vec<IntersectNode>,
    pub(crate) bot_y: i64,
    pub(crate) error: Option<ClipError>,
}

impl Clipper64 {
    /// Creates an empty engine with collinear preservation on (points that
    /// sit on an output edge without turning it are kept).
    pub fn new() -> Self {
        Self {
            preserve_collinear: true,
            ..Self::default()
        }
    }

    /// Keep collinear output vertices instead of eliding them.
    pub fn set_preserve_collinear(&mut self, preserve: bool) {
        self.preserve_collinear = preserve;
    }

    /// Whether collinear output vertices are kept.
    pub fn preserve_collinear(&self) -> bool {
        self.preserve_collinear
    }

    /// Adds closed subject paths.
    pub fn add_subject(&mut self, paths: &Paths64) {
        self.add_paths(paths, PathType::Subject, false);
    }

    /// Adds open (polyline) subject paths.
    pub fn add_open_subject(&mut self, paths: &Paths64) {
        self.add_paths(paths, PathType::Subject, true);
    }

    /// Adds closed clip paths.
    pub fn add_clip(&mut self, paths: &Paths64) {
        self.add_paths(paths, PathType::Clip, false);
    }

    /// Adds a single path.
    pub fn add_path(&mut self, path: &Path64, polytype: PathType, is_open: bool) {
        self.minima_sorted = false;
        self.has_open_paths |= is_open;
        self.add_path_to_vertex_list(path, polytype, is_open);
    }

    /// Adds several paths of the same polytype.
    pub fn add_paths(&mut self, paths: &Paths64, polytype: PathType, is_open: bool) {
        for path in paths {
            self.add_path(path, polytype, is_open);
        }
    }

    /// Drops all added paths and any per-execute state.
    pub fn clear(&mut self) {
        self.cleanup();
        self.vertices.clear();
        self.minima.clear();
        self.minima_sorted = false;
        self.has_open_paths = false;
    }

    /// Runs a boolean operation over the added paths.
    ///
    /// Returns the closed solution polygons and the clipped open paths.
    /// No partial output is exposed on error.
    pub fn execute(
        &mut self,
        clip_type: ClipType,
        fill_rule: FillRule,
    ) -> Result<(Paths64, Paths64), ClipError> {
        let result = self
            .execute_internal(clip_type, fill_rule)
            .and_then(|()| self.build_paths());
        self.cleanup();
        result
    }

    /// Runs a boolean operation, returning closed polygons as a nesting
    /// hierarchy. Open paths bypass the tree and are returned flat.
    pub fn execute_tree(
        &mut self,
        clip_type: ClipType,
        fill_rule: FillRule,
    ) -> Result<(PolyTree64, Paths64), ClipError> {
        let result = self
            .execute_internal(clip_type, fill_rule)
            .and_then(|()| self.build_tree());
        self.cleanup();
        result
    }

    /// Releases per-execute state but keeps the added paths, so the same
    /// inputs can be executed again with different parameters.
    pub(crate) fn cleanup(&mut self) {
        // Arena teardown breaks every next/prev and owner cycle at once.
        self.actives.clear();
        self.outrecs.clear();
        self.outpts.clear();
        self.joins.clear();
        self.horz_trials.clear();
        self.intersects.clear();
        self.scanlines.clear();
        self.ael_first = None;
        self.sel_first = None;
        self.cur_min = 0;
        self.error = None;
    }

    fn execute_internal(&mut self, clip_type: ClipType, fill_rule: FillRule) -> Result<(), ClipError> {
        self.clip_type = clip_type;
        self.fill_rule = fill_rule;
        if clip_type == ClipType::None {
            return Ok(());
        }
        self.reset();

        let mut y = match self.pop_scanline() {
            Some(y) => y,
            None => return Ok(()),
        };
        loop {
            self.insert_local_minima_into_ael(y);
            while let Some(horz) = self.pop_horz() {
                self.do_horizontal(horz);
            }
            self.convert_horz_trials_to_joins();
            self.bot_y = y; // bottom of the next scan-beam

            let top_y = match self.pop_scanline() {
                Some(top_y) => top_y,
                None => break,
            };
            self.do_intersections(top_y);
            self.do_top_of_scanbeam(top_y);
            while let Some(horz) = self.pop_horz() {
                self.do_horizontal(horz);
            }
            y = top_y;

            if let Some(err) = self.error {
                return Err(err);
            }
        }
        self.process_joins();
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Re-seeds the sweep from the stored minima.
    fn reset(&mut self) {
        if !self.minima_sorted {
            // Stable: equal (y, x) minima keep insertion order so their
            // left bounds land in the AEL in a deterministic order.
            self.minima_sorted = true;
            let vertices = &self.vertices;
            self.minima.sort_by_key(|lm| {
                let pt = vertices[lm.vertex.idx()].pt;
                (pt.y, pt.x)
            });
        }
        for lm in self.minima.iter().rev() {
            self.scanlines.push(Reverse(self.vertices[lm.vertex.idx()].pt.y));
        }
        self.cur_min = 0;
    }

    pub(crate) fn insert_scanline(&mut self, y: i64) {
        self.scanlines.push(Reverse(y));
    }

    fn pop_scanline(&mut self) -> Option<i64> {
        let Reverse(y) = self.scanlines.pop()?;
        // Drain duplicates; every beam boundary is processed once.
        while self.scanlines.peek() == Some(&Reverse(y)) {
            self.scanlines.pop();
        }
        Some(y)
    }

    // ------------------------------------------------------------------
    // Arena accessors
    // ------------------------------------------------------------------

    #[inline]
    pub(crate) fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.idx()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id.idx()]
    }

    #[inline]
    pub(crate) fn edge(&self, id: ActiveId) -> &Active {
        &self.actives[id.idx()]
    }

    #[inline]
    pub(crate) fn edge_mut(&mut self, id: ActiveId) -> &mut Active {
        &mut self.actives[id.idx()]
    }

    #[inline]
    pub(crate) fn outpt(&self, id: OutPtId) -> &OutPt {
        &self.outpts[id.idx()]
    }

    #[inline]
    pub(crate) fn outpt_mut(&mut self, id: OutPtId) -> &mut OutPt {
        &mut self.outpts[id.idx()]
    }

    #[inline]
    pub(crate) fn outrec(&self, id: OutRecId) -> &OutRec {
        &self.outrecs[id.idx()]
    }

    #[inline]
    pub(crate) fn outrec_mut(&mut self, id: OutRecId) -> &mut OutRec {
        &mut self.outrecs[id.idx()]
    }
}

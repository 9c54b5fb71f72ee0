//! Polygon and polyline offsetting (inflating/deflating).
//!
//! Paths are widened by a signed distance with mitered, squared or rounded
//! joins, open paths get butt, square, round or joined end caps, and the
//! widened outlines are merged through a Positive-fill union to remove the
//! self-overlaps the per-vertex construction leaves behind.
//!
//! # Example
//!
//! ```
//! use scanbeam::{ClipperOffset, EndType, JoinType, Point64};
//!
//! let square = vec![
//!     Point64::new(0, 0),
//!     Point64::new(10, 0),
//!     Point64::new(10, 10),
//!     Point64::new(0, 10),
//! ];
//!
//! let mut offset = ClipperOffset::new();
//! offset.add_path(&square, JoinType::Miter, EndType::Polygon);
//! let expanded = offset.execute(1.0).unwrap();
//! assert_eq!(expanded.len(), 1);
//! ```

use std::f64::consts::PI;

use crate::engine::{ClipType, Clipper64, FillRule};
use crate::error::ClipError;
use crate::geometry::{area, strip_duplicates, Path64, Paths64, Point64, PointD};

/// Corner treatment where two offset edges meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    /// Cut the corner off square at the offset distance.
    Square,
    /// Approximate a circular arc around the corner.
    Round,
    /// Extend the edges to their natural crossing, falling back to a square
    /// join past the miter limit.
    Miter,
}

/// Treatment of open-path ends (and the closed-path marker).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndType {
    /// The path is a closed polygon offset on one side only.
    Polygon,
    /// The path is treated as closed, offset on both sides.
    Joined,
    /// Open path with flat ends cut at the end point.
    Butt,
    /// Open path with flat ends extended by the offset distance.
    Square,
    /// Open path with semicircular ends.
    Round,
}

#[derive(Debug, Clone)]
struct PathGroup {
    paths: Paths64,
    join_type: JoinType,
    end_type: EndType,
}

/// Builds polygon offsets (Minkowski sums with a disk or square).
///
/// Paths are collected into groups via [`add_path`](Self::add_path) /
/// [`add_paths`](Self::add_paths), then [`execute`](Self::execute) produces
/// the merged offset outlines at a given distance.
#[derive(Debug)]
pub struct ClipperOffset {
    groups: Vec<PathGroup>,
    miter_limit: f64,
    arc_tolerance: f64,
    merge_groups: bool,
    preserve_collinear: bool,

    // Per-execute scratch.
    delta: f64,
    temp_lim: f64,
    steps_per_rad: f64,
    join_type: JoinType,
    norms: Vec<PointD>,
}

impl Default for ClipperOffset {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            miter_limit: 2.0,
            arc_tolerance: 0.0,
            merge_groups: true,
            preserve_collinear: false,
            delta: 0.0,
            temp_lim: 0.0,
            steps_per_rad: 0.0,
            join_type: JoinType::Square,
            norms: Vec::new(),
        }
    }
}

impl ClipperOffset {
    /// Creates an offsetter with default miter limit (2.0) and automatic
    /// arc tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum allowed ratio of miter length to offset distance before a
    /// miter join falls back to a square join.
    pub fn set_miter_limit(&mut self, limit: f64) {
        self.miter_limit = limit;
    }

    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    /// Maximum chord-to-arc distance for round joins; `0` derives it from
    /// the offset distance.
    pub fn set_arc_tolerance(&mut self, tolerance: f64) {
        self.arc_tolerance = tolerance;
    }

    pub fn arc_tolerance(&self) -> f64 {
        self.arc_tolerance
    }

    /// Union every group's offsets together rather than per group.
    pub fn set_merge_groups(&mut self, merge: bool) {
        self.merge_groups = merge;
    }

    pub fn merge_groups(&self) -> bool {
        self.merge_groups
    }

    pub fn set_preserve_collinear(&mut self, preserve: bool) {
        self.preserve_collinear = preserve;
    }

    pub fn preserve_collinear(&self) -> bool {
        self.preserve_collinear
    }

    /// Adds a path to a new group.
    pub fn add_path(&mut self, path: &Path64, join_type: JoinType, end_type: EndType) {
        self.groups.push(PathGroup {
            paths: vec![path.clone()],
            join_type,
            end_type,
        });
    }

    /// Adds paths sharing one join and end type as a group.
    pub fn add_paths(&mut self, paths: &[Path64], join_type: JoinType, end_type: EndType) {
        if paths.is_empty() {
            return;
        }
        self.groups.push(PathGroup {
            paths: paths.to_vec(),
            join_type,
            end_type,
        });
    }

    /// Drops all path groups.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.norms.clear();
    }

    /// Offsets every group by `delta` (positive inflates, negative
    /// deflates) and unions the results.
    pub fn execute(&mut self, delta: f64) -> Result<Paths64, ClipError> {
        let groups = self.groups.clone();
        if self.merge_groups {
            let mut raw = Paths64::new();
            for group in &groups {
                self.do_group_offset(group, delta, &mut raw);
            }
            self.merge(raw)
        } else {
            let mut solution = Paths64::new();
            for group in &groups {
                let mut raw = Paths64::new();
                self.do_group_offset(group, delta, &mut raw);
                solution.extend(self.merge(raw)?);
            }
            Ok(solution)
        }
    }

    /// Removes the self-overlaps the per-vertex construction leaves behind.
    fn merge(&self, raw: Paths64) -> Result<Paths64, ClipError> {
        let mut clipper = Clipper64::new();
        clipper.set_preserve_collinear(self.preserve_collinear);
        clipper.add_subject(&raw);
        let (closed, _open) = clipper.execute(ClipType::Union, FillRule::Positive)?;
        Ok(closed)
    }

    fn do_group_offset(&mut self, group: &PathGroup, delta: f64, out: &mut Paths64) {
        let mut delta = delta;
        if group.end_type == EndType::Polygon {
            // The lowest path fixes the group's outer orientation; holes
            // (opposite winding) then offset to the correct side on their
            // own.
            let Some(lowest) = lowest_path_idx(&group.paths) else {
                return;
            };
            if area(&group.paths[lowest]) < 0.0 {
                delta = -delta;
            }
        } else {
            // Open paths grow symmetrically; the sign carries no meaning.
            delta = delta.abs();
        }
        self.delta = delta;
        self.join_type = group.join_type;
        let abs_delta = delta.abs();
        if abs_delta < 0.5 {
            // Nothing measurable to offset; pass the group through.
            out.extend(group.paths.iter().cloned());
            return;
        }

        let arc_tol = if self.arc_tolerance > 0.0 {
            self.arc_tolerance
        } else {
            // Auto: a quarter percent of the offset, floored at half an
            // integer grid unit so arcs never step below snap resolution.
            (abs_delta * 0.0025).max(0.5)
        };
        let step_angle = (1.0 - arc_tol / abs_delta).clamp(-1.0, 1.0).acos();
        self.steps_per_rad = if step_angle > 0.0 {
            (1.0 / step_angle).min(abs_delta * PI)
        } else {
            abs_delta * PI
        };
        self.temp_lim = if self.miter_limit <= 1.0 {
            2.0
        } else {
            2.0 / (self.miter_limit * self.miter_limit)
        };

        for path in &group.paths {
            let path = strip_duplicates(path, group.end_type == EndType::Polygon);
            match path.len() {
                0 => continue,
                1 => {
                    // A lone point inflates into a disk or square.
                    self.offset_point_path(path[0], group, out);
                    continue;
                }
                _ => {}
            }
            match group.end_type {
                EndType::Polygon => {
                    let ring = self.offset_polygon_ring(&path);
                    out.push(ring);
                }
                EndType::Joined => {
                    out.push(self.offset_polygon_ring(&path));
                    let reversed: Path64 = path.iter().rev().copied().collect();
                    out.push(self.offset_polygon_ring(&reversed));
                }
                end_type => {
                    out.push(self.offset_open(&path, end_type));
                }
            }
        }
    }

    fn offset_point_path(&mut self, pt: Point64, group: &PathGroup, out: &mut Paths64) {
        let r = self.delta.abs();
        let rounded =
            group.join_type == JoinType::Round || group.end_type == EndType::Round;
        let mut ring = Path64::new();
        if rounded {
            self.emit_arc(&mut ring, pt, PointD::new(r, 0.0), 2.0 * PI);
        } else {
            let d = r.round() as i64;
            ring.extend([
                Point64::new(pt.x - d, pt.y - d),
                Point64::new(pt.x + d, pt.y - d),
                Point64::new(pt.x + d, pt.y + d),
                Point64::new(pt.x - d, pt.y + d),
            ]);
        }
        out.push(ring);
    }

    /// Offsets one side of a closed ring.
    fn offset_polygon_ring(&mut self, path: &Path64) -> Path64 {
        self.build_normals(path);
        let mut ring = Path64::new();
        let mut k = path.len() - 1;
        for j in 0..path.len() {
            self.offset_vertex(path, j, &mut k, &mut ring);
        }
        ring
    }

    /// Offsets both sides of an open path, capping the ends.
    fn offset_open(&mut self, path: &Path64, end_type: EndType) -> Path64 {
        let hi = path.len() - 1;
        let mut ring = Path64::new();

        // One side out...
        self.build_normals(path);
        ring.push(self.perpendic(path[0], self.norms[0]));
        let mut k = 0;
        for j in 1..hi {
            self.offset_vertex(path, j, &mut k, &mut ring);
        }
        self.do_cap(&mut ring, path[hi], self.norms[hi - 1], end_type);

        // ... and the other side back.
        let reversed: Path64 = path.iter().rev().copied().collect();
        self.build_normals(&reversed);
        ring.push(self.perpendic(reversed[0], self.norms[0]));
        let mut k = 0;
        for j in 1..hi {
            self.offset_vertex(&reversed, j, &mut k, &mut ring);
        }
        self.do_cap(&mut ring, reversed[hi], self.norms[hi - 1], end_type);
        ring
    }

    /// Unit normals, rotated a quarter turn from each edge direction so a
    /// positive delta pushes counter-clockwise rings outward.
    fn build_normals(&mut self, path: &Path64) {
        let n = path.len();
        self.norms.clear();
        self.norms.reserve(n);
        for i in 0..n {
            let a = path[i];
            let b = path[(i + 1) % n];
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            let len = (dx * dx + dy * dy).sqrt();
            if len == 0.0 {
                self.norms.push(PointD::new(0.0, 0.0));
            } else {
                self.norms.push(PointD::new(dy / len, -dx / len));
            }
        }
    }

    #[inline]
    fn perpendic(&self, pt: Point64, n: PointD) -> Point64 {
        Point64::new(
            (pt.x as f64 + n.x * self.delta).round() as i64,
            (pt.y as f64 + n.y * self.delta).round() as i64,
        )
    }

    /// Emits the join for the vertex at `j`, whose incoming edge is `*k`.
    fn offset_vertex(&mut self, path: &Path64, j: usize, k: &mut usize, out: &mut Path64) {
        let pj = path[j];
        let nk = self.norms[*k];
        let nj = self.norms[j];
        let mut sin_a = nk.cross(nj);
        let cos_a = nk.dot(nj);
        sin_a = sin_a.clamp(-1.0, 1.0);

        if sin_a * self.delta < 0.0 {
            // Concave on the offset side: emit both single-edge offsets with
            // the vertex pinned between them; the union pass swallows the
            // resulting self-overlap.
            out.push(self.perpendic(pj, nk));
            out.push(pj);
            out.push(self.perpendic(pj, nj));
        } else if self.join_type == JoinType::Miter {
            if cos_a + 1.0 >= self.temp_lim {
                self.do_miter(pj, nk, nj, cos_a, out);
            } else {
                self.do_square(pj, nk, nj, out);
            }
        } else if cos_a > 0.9998 {
            // Nearly straight: a miter join is exact and cheapest.
            self.do_miter(pj, nk, nj, cos_a, out);
        } else if self.join_type == JoinType::Round {
            self.do_round(pj, nk, nj, sin_a.atan2(cos_a), out);
        } else {
            self.do_square(pj, nk, nj, out);
        }
        *k = j;
    }

    fn do_miter(&self, pj: Point64, nk: PointD, nj: PointD, cos_a: f64, out: &mut Path64) {
        let q = self.delta / (1.0 + cos_a);
        out.push(Point64::new(
            (pj.x as f64 + (nk.x + nj.x) * q).round() as i64,
            (pj.y as f64 + (nk.y + nj.y) * q).round() as i64,
        ));
    }

    /// Blunts the corner with two points on the offset edge lines, squared
    /// off at the full offset distance along the corner bisector.
    fn do_square(&self, pj: Point64, nk: PointD, nj: PointD, out: &mut Path64) {
        let bis = PointD::new(nk.x + nj.x, nk.y + nj.y);
        let len = bis.length();
        if len == 0.0 {
            // Edges double back; fall back to the two plain offsets.
            out.push(self.perpendic(pj, nk));
            out.push(self.perpendic(pj, nj));
            return;
        }
        let m = PointD::new(bis.x / len, bis.y / len);
        // The cap line passes through pj + delta*m, perpendicular to m.
        let cap = PointD::new(
            pj.x as f64 + m.x * self.delta,
            pj.y as f64 + m.y * self.delta,
        );
        for n in [nk, nj] {
            let p = PointD::new(
                pj.x as f64 + n.x * self.delta,
                pj.y as f64 + n.y * self.delta,
            );
            let dir = PointD::new(-n.y, n.x);
            let denom = dir.dot(m);
            let t = if denom.abs() > f64::EPSILON {
                (cap - p).dot(m) / denom
            } else {
                0.0
            };
            out.push(Point64::new(
                (p.x + t * dir.x).round() as i64,
                (p.y + t * dir.y).round() as i64,
            ));
        }
    }

    fn do_round(&self, pj: Point64, nk: PointD, nj: PointD, angle: f64, out: &mut Path64) {
        let start = PointD::new(nk.x * self.delta, nk.y * self.delta);
        self.emit_arc(out, pj, start, angle);
        out.push(self.perpendic(pj, nj));
    }

    /// Emits arc points around `center` from `start_vec`, sweeping `angle`
    /// radians with chord height bounded by the arc tolerance.
    fn emit_arc(&self, out: &mut Path64, center: Point64, start_vec: PointD, angle: f64) {
        let steps = ((self.steps_per_rad * angle.abs()).ceil() as usize).max(1);
        let step_angle = angle / steps as f64;
        let (s, c) = (step_angle.sin(), step_angle.cos());
        let mut v = start_vec;
        out.push(Point64::new(
            (center.x as f64 + v.x).round() as i64,
            (center.y as f64 + v.y).round() as i64,
        ));
        for _ in 0..steps {
            v = PointD::new(v.x * c - v.y * s, v.x * s + v.y * c);
            out.push(Point64::new(
                (center.x as f64 + v.x).round() as i64,
                (center.y as f64 + v.y).round() as i64,
            ));
        }
    }

    /// Caps an open-path end whose outgoing normal is `n`.
    fn do_cap(&mut self, out: &mut Path64, pt: Point64, n: PointD, cap: EndType) {
        match cap {
            EndType::Butt => {
                out.push(self.perpendic(pt, n));
                out.push(self.perpendic(pt, PointD::new(-n.x, -n.y)));
            }
            EndType::Square => {
                let d = PointD::new(-n.y, n.x);
                out.push(self.perpendic(pt, n));
                out.push(self.perpendic(pt, PointD::new(d.x + n.x, d.y + n.y)));
                out.push(self.perpendic(pt, PointD::new(d.x - n.x, d.y - n.y)));
                out.push(self.perpendic(pt, PointD::new(-n.x, -n.y)));
            }
            _ => {
                // Round (Polygon/Joined never reach a cap).
                let start = PointD::new(n.x * self.delta, n.y * self.delta);
                self.emit_arc(out, pt, start, PI);
            }
        }
    }
}

/// Index of the path holding the bottom-most (then left-most) point.
fn lowest_path_idx(paths: &Paths64) -> Option<usize> {
    let mut best: Option<(usize, Point64)> = None;
    for (i, path) in paths.iter().enumerate() {
        for &pt in path {
            match best {
                Some((_, bp)) if (pt.y, pt.x) >= (bp.y, bp.x) => {}
                _ => best = Some((i, pt)),
            }
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: i64) -> Path64 {
        vec![
            Point64::new(0, 0),
            Point64::new(side, 0),
            Point64::new(side, side),
            Point64::new(0, side),
        ]
    }

    fn total_area(paths: &Paths64) -> f64 {
        paths.iter().map(|p| area(p)).sum()
    }

    #[test]
    fn test_inflate_square_miter() {
        let mut off = ClipperOffset::new();
        off.add_path(&square(10), JoinType::Miter, EndType::Polygon);
        let result = off.execute(1.0).unwrap();
        assert_eq!(result.len(), 1);
        // 12 x 12
        assert!((total_area(&result) - 144.0).abs() < 1.0);
    }

    #[test]
    fn test_deflate_square_miter() {
        let mut off = ClipperOffset::new();
        off.add_path(&square(10), JoinType::Miter, EndType::Polygon);
        let result = off.execute(-1.0).unwrap();
        assert_eq!(result.len(), 1);
        // 8 x 8
        assert!((total_area(&result) - 64.0).abs() < 1.0);
    }

    #[test]
    fn test_round_join_adds_arc_points() {
        let mut off = ClipperOffset::new();
        off.add_path(&square(100), JoinType::Round, EndType::Polygon);
        let result = off.execute(10.0).unwrap();
        assert_eq!(result.len(), 1);
        assert!(result[0].len() > 8);
        // Between the sharp-cornered square (120^2) and the inscribed area
        // with perfect quarter-circle corners.
        let expected = 120.0 * 120.0 - (4.0 - PI) * 100.0;
        assert!((total_area(&result) - expected).abs() < 30.0);
    }

    #[test]
    fn test_square_join_blunts_corners() {
        let mut off = ClipperOffset::new();
        off.add_path(&square(100), JoinType::Square, EndType::Polygon);
        let result = off.execute(10.0).unwrap();
        assert_eq!(result.len(), 1);
        // Each corner is cut off; area sits between round and miter.
        let a = total_area(&result);
        assert!(a < 120.0 * 120.0);
        assert!(a > 120.0 * 120.0 - 4.0 * 100.0);
    }

    #[test]
    fn test_miter_limit_falls_back_to_square() {
        // A sharp spike would miter far beyond twice the offset.
        let spike = vec![
            Point64::new(0, 0),
            Point64::new(100, 0),
            Point64::new(50, 8),
        ];
        let mut off = ClipperOffset::new();
        off.set_miter_limit(2.0);
        off.add_path(&spike, JoinType::Miter, EndType::Polygon);
        let result = off.execute(5.0).unwrap();
        assert!(!result.is_empty());
        // The mitre at the sharp tips must not extend anywhere near the
        // unbounded intersection distance.
        let bounds = crate::geometry::Rect64::bounding(&result[0]);
        assert!(bounds.right < 140);
        assert!(bounds.left > -40);
    }

    #[test]
    fn test_deflate_collapse_returns_empty() {
        let mut off = ClipperOffset::new();
        off.add_path(&square(4), JoinType::Miter, EndType::Polygon);
        let result = off.execute(-3.0).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_point_round() {
        let mut off = ClipperOffset::new();
        off.add_path(
            &vec![Point64::new(0, 0)],
            JoinType::Round,
            EndType::Round,
        );
        let result = off.execute(10.0).unwrap();
        assert_eq!(result.len(), 1);
        assert!((total_area(&result) - PI * 100.0).abs() < 10.0);
    }

    #[test]
    fn test_open_butt_caps() {
        let line = vec![Point64::new(0, 0), Point64::new(100, 0)];
        let mut off = ClipperOffset::new();
        off.add_path(&line, JoinType::Square, EndType::Butt);
        let result = off.execute(5.0).unwrap();
        assert_eq!(result.len(), 1);
        // A plain 100 x 10 rectangle.
        assert!((total_area(&result) - 1000.0).abs() < 2.0);
    }

    #[test]
    fn test_open_square_caps_extend() {
        let line = vec![Point64::new(0, 0), Point64::new(100, 0)];
        let mut off = ClipperOffset::new();
        off.add_path(&line, JoinType::Square, EndType::Square);
        let result = off.execute(5.0).unwrap();
        // Extended by delta at both ends: 110 x 10.
        assert!((total_area(&result) - 1100.0).abs() < 2.0);
    }

    #[test]
    fn test_open_round_caps() {
        let line = vec![Point64::new(0, 0), Point64::new(100, 0)];
        let mut off = ClipperOffset::new();
        off.add_path(&line, JoinType::Round, EndType::Round);
        let result = off.execute(5.0).unwrap();
        // Rectangle plus two semicircle caps.
        let expected = 1000.0 + PI * 25.0;
        assert!((total_area(&result) - expected).abs() < 10.0);
    }

    #[test]
    fn test_groups_merge() {
        let mut off = ClipperOffset::new();
        off.add_path(&square(10), JoinType::Miter, EndType::Polygon);
        let shifted: Path64 = square(10)
            .into_iter()
            .map(|p| Point64::new(p.x + 5, p.y))
            .collect();
        off.add_path(&shifted, JoinType::Miter, EndType::Polygon);
        let merged = off.execute(1.0).unwrap();
        // Overlapping offsets fuse into a single outline.
        assert_eq!(merged.len(), 1);
    }
}

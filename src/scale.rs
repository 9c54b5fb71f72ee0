//! Floating-point boundary adapter.
//!
//! The clipping core runs entirely on integer coordinates. Floating-point
//! callers pick a decimal precision; inputs are scaled by that power of ten,
//! clipped as integers, and unscaled on output. The core is never
//! parameterized over the coordinate type.

use num_traits::Float;

use crate::engine::{ClipType, Clipper64, FillRule};
use crate::error::ClipError;
use crate::geometry::{Path64, PathD, Paths64, PathsD, Point2, Point64, PointD};
use crate::tree::{PolyPath64, PolyTree64};

/// Scales a floating-point path onto the integer grid.
pub fn scale_path<F: Float>(path: &[Point2<F>], scale: F) -> Path64 {
    path.iter()
        .map(|p| {
            Point64::new(
                (p.x * scale).round().to_i64().unwrap_or(0),
                (p.y * scale).round().to_i64().unwrap_or(0),
            )
        })
        .collect()
}

/// Scales a set of floating-point paths onto the integer grid.
pub fn scale_paths<F: Float>(paths: &[Vec<Point2<F>>], scale: F) -> Paths64 {
    paths.iter().map(|p| scale_path(p, scale)).collect()
}

/// Converts an integer path back to floating point at `1 / scale`.
pub fn unscale_path<F: Float>(path: &Path64, scale: F) -> Vec<Point2<F>> {
    path.iter()
        .map(|p| {
            Point2::new(
                F::from(p.x).unwrap() / scale,
                F::from(p.y).unwrap() / scale,
            )
        })
        .collect()
}

/// Converts integer paths back to floating point at `1 / scale`.
pub fn unscale_paths<F: Float>(paths: &Paths64, scale: F) -> Vec<Vec<Point2<F>>> {
    paths.iter().map(|p| unscale_path(p, scale)).collect()
}

/// A nesting-tree node with floating-point coordinates.
#[derive(Debug, Clone, Default)]
pub struct PolyPathD {
    polygon: PathD,
    children: Vec<PolyPathD>,
    is_hole: bool,
}

impl PolyPathD {
    /// The polygon at this node.
    pub fn polygon(&self) -> &PathD {
        &self.polygon
    }

    /// True when this polygon is a hole (outer/hole status alternates with
    /// each nesting level).
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    /// Direct children.
    pub fn children(&self) -> &[PolyPathD] {
        &self.children
    }

    fn from_int(node: &PolyPath64, inv_scale: f64) -> Self {
        Self {
            polygon: node
                .polygon()
                .iter()
                .map(|p| PointD::new(p.x as f64 * inv_scale, p.y as f64 * inv_scale))
                .collect(),
            children: node
                .children()
                .iter()
                .map(|c| Self::from_int(c, inv_scale))
                .collect(),
            is_hole: node.is_hole(),
        }
    }
}

/// The floating-point nesting hierarchy returned by
/// [`ClipperD::execute_tree`].
#[derive(Debug, Clone, Default)]
pub struct PolyTreeD {
    children: Vec<PolyPathD>,
}

impl PolyTreeD {
    /// Top-level (outermost) polygons.
    pub fn children(&self) -> &[PolyPathD] {
        &self.children
    }

    fn from_int(tree: &PolyTree64, inv_scale: f64) -> Self {
        Self {
            children: tree
                .children()
                .iter()
                .map(|c| PolyPathD::from_int(c, inv_scale))
                .collect(),
        }
    }
}

/// Floating-point clipping engine: a thin fixed-point scaling wrapper over
/// [`Clipper64`].
///
/// # Example
///
/// ```
/// use scanbeam::{ClipType, ClipperD, FillRule, PointD};
///
/// let subject = vec![vec![
///     PointD::new(0.0, 0.0),
///     PointD::new(1.0, 0.0),
///     PointD::new(1.0, 1.0),
///     PointD::new(0.0, 1.0),
/// ]];
/// let clip = vec![vec![
///     PointD::new(0.5, 0.5),
///     PointD::new(1.5, 0.5),
///     PointD::new(1.5, 1.5),
///     PointD::new(0.5, 1.5),
/// ]];
///
/// let mut clipper = ClipperD::new(2);
/// clipper.add_subject(&subject);
/// clipper.add_clip(&clip);
/// let (closed, _open) = clipper
///     .execute(ClipType::Intersection, FillRule::EvenOdd)
///     .unwrap();
/// assert_eq!(closed.len(), 1);
/// ```
#[derive(Debug)]
pub struct ClipperD {
    clipper: Clipper64,
    scale: f64,
}

impl ClipperD {
    /// Creates an engine keeping `precision` decimal digits (scale factor
    /// `10^precision`).
    pub fn new(precision: i32) -> Self {
        Self {
            clipper: Clipper64::new(),
            scale: 10f64.powi(precision),
        }
    }

    /// Keep collinear output vertices instead of eliding them.
    pub fn set_preserve_collinear(&mut self, preserve: bool) {
        self.clipper.set_preserve_collinear(preserve);
    }

    /// Adds closed subject paths.
    pub fn add_subject(&mut self, paths: &PathsD) {
        let scaled = scale_paths(paths, self.scale);
        self.clipper.add_subject(&scaled);
    }

    /// Adds open (polyline) subject paths.
    pub fn add_open_subject(&mut self, paths: &PathsD) {
        let scaled = scale_paths(paths, self.scale);
        self.clipper.add_open_subject(&scaled);
    }

    /// Adds closed clip paths.
    pub fn add_clip(&mut self, paths: &PathsD) {
        let scaled = scale_paths(paths, self.scale);
        self.clipper.add_clip(&scaled);
    }

    /// Drops all added paths.
    pub fn clear(&mut self) {
        self.clipper.clear();
    }

    /// Runs a boolean operation, returning unscaled closed and open paths.
    pub fn execute(
        &mut self,
        clip_type: ClipType,
        fill_rule: FillRule,
    ) -> Result<(PathsD, PathsD), ClipError> {
        let (closed, open) = self.clipper.execute(clip_type, fill_rule)?;
        Ok((
            unscale_paths(&closed, self.scale),
            unscale_paths(&open, self.scale),
        ))
    }

    /// Runs a boolean operation, returning the nesting hierarchy and the
    /// clipped open paths, unscaled.
    pub fn execute_tree(
        &mut self,
        clip_type: ClipType,
        fill_rule: FillRule,
    ) -> Result<(PolyTreeD, PathsD), ClipError> {
        let (tree, open) = self.clipper.execute_tree(clip_type, fill_rule)?;
        let inv = self.scale.recip();
        Ok((
            PolyTreeD::from_int(&tree, inv),
            open.iter()
                .map(|p| {
                    p.iter()
                        .map(|pt| PointD::new(pt.x as f64 * inv, pt.y as f64 * inv))
                        .collect()
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_round_trip() {
        let path: PathD = vec![PointD::new(1.234, -5.678), PointD::new(0.005, 0.004)];
        let scaled = scale_path(&path, 100.0);
        assert_eq!(scaled[0], Point64::new(123, -568));
        assert_eq!(scaled[1], Point64::new(1, 0));
        let back = unscale_path::<f64>(&scaled, 100.0);
        assert!((back[0].x - 1.23).abs() < 1e-12);
    }

    #[test]
    fn test_clipper_d_union_area() {
        let subj = vec![vec![
            PointD::new(0.0, 0.0),
            PointD::new(1.0, 0.0),
            PointD::new(1.0, 1.0),
            PointD::new(0.0, 1.0),
        ]];
        let clip = vec![vec![
            PointD::new(0.5, 0.5),
            PointD::new(1.5, 0.5),
            PointD::new(1.5, 1.5),
            PointD::new(0.5, 1.5),
        ]];
        let mut c = ClipperD::new(2);
        c.add_subject(&subj);
        c.add_clip(&clip);
        let (closed, _) = c.execute(ClipType::Union, FillRule::NonZero).unwrap();
        assert_eq!(closed.len(), 1);
        let area: f64 = closed[0]
            .windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum::<f64>()
            + (closed[0].last().unwrap().x * closed[0][0].y
                - closed[0][0].x * closed[0].last().unwrap().y);
        assert!((area / 2.0 - 1.75).abs() < 0.01);
    }
}

//! Exact integer geometric predicates and constructions.
//!
//! Sign tests are computed in 128-bit integer arithmetic so they are exact
//! for the full 64-bit coordinate range. Crossing points are constructed in
//! integer arithmetic when the intermediate products fit, falling back to
//! rounded double precision when they would overflow.

use crate::geometry::point::{Path64, Point64};

/// Result of a point-in-polygon query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointInPolygonResult {
    /// The point lies on the polygon boundary.
    IsOn,
    /// The point lies strictly inside.
    IsInside,
    /// The point lies strictly outside.
    IsOutside,
}

/// Twice the signed area of triangle `(a, b, c)`, exact.
///
/// Positive when `c` lies to the left of the directed line `a -> b`
/// (counter-clockwise turn).
#[inline]
pub(crate) fn cross_product(a: Point64, b: Point64, c: Point64) -> i128 {
    (b.x - a.x) as i128 * (c.y - b.y) as i128 - (b.y - a.y) as i128 * (c.x - b.x) as i128
}

/// Dot product of vectors `b - a` and `c - b`.
///
/// Negative when the path `a -> b -> c` doubles back past perpendicular
/// (used to detect 180-degree spikes among collinear points).
#[inline]
pub(crate) fn dot_product(a: Point64, b: Point64, c: Point64) -> i128 {
    (b.x - a.x) as i128 * (c.x - b.x) as i128 + (b.y - a.y) as i128 * (c.y - b.y) as i128
}

/// Returns true if `a`, `b`, `c` are collinear.
#[inline]
pub(crate) fn is_collinear(a: Point64, b: Point64, c: Point64) -> bool {
    cross_product(a, b, c) == 0
}

/// Signed area of a closed path by the shoelace formula.
///
/// Positive for counter-clockwise winding. Accumulated in double precision;
/// each term is computed exactly first.
pub fn area(path: &[Point64]) -> f64 {
    if path.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut prev = path[path.len() - 1];
    for &pt in path {
        sum += (prev.x as i128 * pt.y as i128 - pt.x as i128 * prev.y as i128) as f64;
        prev = pt;
    }
    sum * 0.5
}

/// Returns true if the path winds counter-clockwise (positive area).
#[inline]
pub fn is_positive(path: &[Point64]) -> bool {
    area(path) >= 0.0
}

/// Signed area of the triangle `(a, b, c)`.
#[inline]
pub(crate) fn area_triangle(a: Point64, b: Point64, c: Point64) -> f64 {
    cross_product(a, b, c) as f64 * 0.5
}

/// Locates `pt` relative to a closed path using exact ray crossing counts.
pub fn point_in_polygon(pt: Point64, path: &[Point64]) -> PointInPolygonResult {
    let n = path.len();
    if n < 3 {
        return PointInPolygonResult::IsOutside;
    }

    let mut inside = false;
    let mut a = path[n - 1];
    for &b in path {
        // Exact on-boundary test first.
        let cross = (b.x - a.x) as i128 * (pt.y - a.y) as i128
            - (pt.x - a.x) as i128 * (b.y - a.y) as i128;
        if cross == 0
            && pt.x >= a.x.min(b.x)
            && pt.x <= a.x.max(b.x)
            && pt.y >= a.y.min(b.y)
            && pt.y <= a.y.max(b.y)
        {
            return PointInPolygonResult::IsOn;
        }

        // Toggle when the edge crosses the horizontal ray extending +x.
        if (a.y > pt.y) != (b.y > pt.y) {
            if b.y > a.y {
                if cross > 0 {
                    inside = !inside;
                }
            } else if cross < 0 {
                inside = !inside;
            }
        }
        a = b;
    }

    if inside {
        PointInPolygonResult::IsInside
    } else {
        PointInPolygonResult::IsOutside
    }
}

/// Returns true if segments `(a1, a2)` and `(b1, b2)` properly cross
/// (a single interior intersection point, endpoints excluded).
pub(crate) fn segments_intersect(a1: Point64, a2: Point64, b1: Point64, b2: Point64) -> bool {
    let d1 = cross_product(b1, b2, a1);
    let d2 = cross_product(b1, b2, a2);
    let d3 = cross_product(a1, a2, b1);
    let d4 = cross_product(a1, a2, b2);
    (d1 > 0) != (d2 > 0) && (d3 > 0) != (d4 > 0) && d1 != 0 && d2 != 0 && d3 != 0 && d4 != 0
}

/// Outcome of constructing the crossing of two lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Crossing {
    /// The crossing, snapped to the nearest integer point.
    At(Point64),
    /// The lines never cross.
    Parallel,
    /// The crossing exists but cannot be represented in 64-bit
    /// coordinates; the engine surfaces this as an arithmetic overflow.
    OutOfRange,
}

/// Rounded division of exact 128-bit intermediates (round half away from
/// zero, matching coordinate snapping everywhere else in the engine).
#[inline]
fn round_div(num: i128, den: i128) -> i128 {
    let q = num / den;
    let r = num % den;
    if 2 * r.abs() >= den.abs() {
        q + if (num < 0) == (den < 0) { 1 } else { -1 }
    } else {
        q
    }
}

/// Computes the crossing of the infinite lines through `(a1, a2)` and
/// `(b1, b2)`.
///
/// Intermediate products are checked; when they would overflow 128 bits the
/// crossing is computed in double precision instead and rounded. Either way
/// a crossing outside the 64-bit coordinate range reports `OutOfRange`
/// rather than clamping.
pub(crate) fn get_intersect_point(a1: Point64, a2: Point64, b1: Point64, b2: Point64) -> Crossing {
    let d1x = (a2.x - a1.x) as i128;
    let d1y = (a2.y - a1.y) as i128;
    let d2x = (b2.x - b1.x) as i128;
    let d2y = (b2.y - b1.y) as i128;

    let den = d1x * d2y - d1y * d2x;
    if den == 0 {
        return Crossing::Parallel;
    }
    let t_num = (b1.x - a1.x) as i128 * d2y - (b1.y - a1.y) as i128 * d2x;

    if let (Some(nx), Some(ny)) = (t_num.checked_mul(d1x), t_num.checked_mul(d1y)) {
        let x = a1.x as i128 + round_div(nx, den);
        let y = a1.y as i128 + round_div(ny, den);
        return match (i64::try_from(x), i64::try_from(y)) {
            (Ok(x), Ok(y)) => Crossing::At(Point64::new(x, y)),
            _ => Crossing::OutOfRange,
        };
    }

    // Magnitudes too large for exact arithmetic.
    let t = t_num as f64 / den as f64;
    let x = a1.x as f64 + t * d1x as f64;
    let y = a1.y as f64 + t * d1y as f64;
    let limit = 2f64.powi(63);
    if !x.is_finite() || !y.is_finite() || x.abs() >= limit || y.abs() >= limit {
        return Crossing::OutOfRange;
    }
    Crossing::At(Point64::new(x.round() as i64, y.round() as i64))
}

/// Strips repeated points and, for closed paths, a trailing point equal to
/// the first. Single-point runs collapse silently (degenerate input policy).
pub(crate) fn strip_duplicates(path: &[Point64], is_closed: bool) -> Path64 {
    let mut out: Path64 = Vec::with_capacity(path.len());
    for &pt in path {
        if out.last() != Some(&pt) {
            out.push(pt);
        }
    }
    if is_closed {
        while out.len() > 1 && out.first() == out.last() {
            out.pop();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Path64 {
        vec![
            Point64::new(0, 0),
            Point64::new(10, 0),
            Point64::new(10, 10),
            Point64::new(0, 10),
        ]
    }

    #[test]
    fn test_area_square() {
        assert_eq!(area(&square()), 100.0);
        let mut cw = square();
        cw.reverse();
        assert_eq!(area(&cw), -100.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = square();
        assert_eq!(
            point_in_polygon(Point64::new(5, 5), &sq),
            PointInPolygonResult::IsInside
        );
        assert_eq!(
            point_in_polygon(Point64::new(15, 5), &sq),
            PointInPolygonResult::IsOutside
        );
        assert_eq!(
            point_in_polygon(Point64::new(10, 5), &sq),
            PointInPolygonResult::IsOn
        );
        assert_eq!(
            point_in_polygon(Point64::new(0, 0), &sq),
            PointInPolygonResult::IsOn
        );
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape: the notch interior is outside.
        let u = vec![
            Point64::new(0, 0),
            Point64::new(30, 0),
            Point64::new(30, 30),
            Point64::new(20, 30),
            Point64::new(20, 10),
            Point64::new(10, 10),
            Point64::new(10, 30),
            Point64::new(0, 30),
        ];
        assert_eq!(
            point_in_polygon(Point64::new(15, 20), &u),
            PointInPolygonResult::IsOutside
        );
        assert_eq!(
            point_in_polygon(Point64::new(5, 20), &u),
            PointInPolygonResult::IsInside
        );
    }

    #[test]
    fn test_intersect_point_exact() {
        let crossing = get_intersect_point(
            Point64::new(0, 0),
            Point64::new(10, 10),
            Point64::new(0, 10),
            Point64::new(10, 0),
        );
        assert_eq!(crossing, Crossing::At(Point64::new(5, 5)));
    }

    #[test]
    fn test_intersect_point_rounds() {
        // x=5 vertical against y = x/2: lines cross at (5, 2.5), which
        // snaps away from zero to (5, 3).
        let crossing = get_intersect_point(
            Point64::new(5, -10),
            Point64::new(5, 10),
            Point64::new(0, 0),
            Point64::new(10, 5),
        );
        assert_eq!(crossing, Crossing::At(Point64::new(5, 3)));
    }

    #[test]
    fn test_intersect_parallel() {
        let crossing = get_intersect_point(
            Point64::new(0, 0),
            Point64::new(10, 0),
            Point64::new(0, 5),
            Point64::new(10, 5),
        );
        assert_eq!(crossing, Crossing::Parallel);
    }

    #[test]
    fn test_intersect_point_out_of_range() {
        // Slopes 1/2^62 and 2/2^62 diverge from offsets 0 and -2: the
        // lines cross at x = 2^63, one past the representable maximum.
        let big = 1_i64 << 62;
        let crossing = get_intersect_point(
            Point64::new(0, 0),
            Point64::new(big, 1),
            Point64::new(0, -2),
            Point64::new(big, 0),
        );
        assert_eq!(crossing, Crossing::OutOfRange);
    }

    #[test]
    fn test_segments_intersect_proper_only() {
        let a1 = Point64::new(0, 0);
        let a2 = Point64::new(10, 10);
        assert!(segments_intersect(
            a1,
            a2,
            Point64::new(0, 10),
            Point64::new(10, 0)
        ));
        // Shared endpoint is not a proper crossing.
        assert!(!segments_intersect(
            a1,
            a2,
            Point64::new(10, 10),
            Point64::new(20, 0)
        ));
    }

    #[test]
    fn test_strip_duplicates() {
        let path = vec![
            Point64::new(0, 0),
            Point64::new(0, 0),
            Point64::new(5, 0),
            Point64::new(5, 5),
            Point64::new(0, 0),
        ];
        assert_eq!(strip_duplicates(&path, true).len(), 3);
        assert_eq!(strip_duplicates(&path, false).len(), 4);
    }
}

//! One-shot boolean operations and offsetting over path sets.
//!
//! These wrap [`Clipper64`] / [`ClipperOffset`] for the common case of a
//! single operation with no engine reuse.

use crate::engine::{ClipType, Clipper64, FillRule};
use crate::error::ClipError;
use crate::geometry::Paths64;
use crate::offset::{ClipperOffset, EndType, JoinType};
use crate::tree::PolyTree64;

/// Runs one boolean operation over closed subject and clip paths.
pub fn boolean_op(
    clip_type: ClipType,
    fill_rule: FillRule,
    subjects: &Paths64,
    clips: &Paths64,
) -> Result<Paths64, ClipError> {
    let mut clipper = Clipper64::new();
    clipper.add_subject(subjects);
    clipper.add_clip(clips);
    let (closed, _open) = clipper.execute(clip_type, fill_rule)?;
    Ok(closed)
}

/// Regions covered by both `subjects` and `clips`.
///
/// # Example
///
/// ```
/// use scanbeam::{paths_intersection, FillRule, Point64};
///
/// let subject = vec![vec![
///     Point64::new(0, 0),
///     Point64::new(10, 0),
///     Point64::new(10, 10),
///     Point64::new(0, 10),
/// ]];
/// let clip = vec![vec![
///     Point64::new(5, 5),
///     Point64::new(15, 5),
///     Point64::new(15, 15),
///     Point64::new(5, 15),
/// ]];
/// let result = paths_intersection(&subject, &clip, FillRule::EvenOdd).unwrap();
/// assert_eq!(result.len(), 1);
/// ```
pub fn paths_intersection(
    subjects: &Paths64,
    clips: &Paths64,
    fill_rule: FillRule,
) -> Result<Paths64, ClipError> {
    boolean_op(ClipType::Intersection, fill_rule, subjects, clips)
}

/// Regions covered by `subjects` or `clips` (or both).
pub fn paths_union(
    subjects: &Paths64,
    clips: &Paths64,
    fill_rule: FillRule,
) -> Result<Paths64, ClipError> {
    boolean_op(ClipType::Union, fill_rule, subjects, clips)
}

/// Regions covered by `subjects` but not `clips`.
pub fn paths_difference(
    subjects: &Paths64,
    clips: &Paths64,
    fill_rule: FillRule,
) -> Result<Paths64, ClipError> {
    boolean_op(ClipType::Difference, fill_rule, subjects, clips)
}

/// Regions covered by exactly one of `subjects` and `clips`.
pub fn paths_xor(
    subjects: &Paths64,
    clips: &Paths64,
    fill_rule: FillRule,
) -> Result<Paths64, ClipError> {
    boolean_op(ClipType::Xor, fill_rule, subjects, clips)
}

/// Runs one boolean operation, returning the closed output as a nesting
/// hierarchy.
pub fn boolean_op_tree(
    clip_type: ClipType,
    fill_rule: FillRule,
    subjects: &Paths64,
    clips: &Paths64,
) -> Result<PolyTree64, ClipError> {
    let mut clipper = Clipper64::new();
    clipper.add_subject(subjects);
    clipper.add_clip(clips);
    let (tree, _open) = clipper.execute_tree(clip_type, fill_rule)?;
    Ok(tree)
}

/// Offsets `paths` by `delta` (positive inflates), merging overlaps.
pub fn inflate_paths(
    paths: &Paths64,
    delta: f64,
    join_type: JoinType,
    end_type: EndType,
) -> Result<Paths64, ClipError> {
    let mut offset = ClipperOffset::new();
    offset.add_paths(paths, join_type, end_type);
    offset.execute(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{area, Path64, Point64};

    fn square(x: i64, y: i64, side: i64) -> Path64 {
        vec![
            Point64::new(x, y),
            Point64::new(x + side, y),
            Point64::new(x + side, y + side),
            Point64::new(x, y + side),
        ]
    }

    fn total_area(paths: &Paths64) -> f64 {
        paths.iter().map(|p| area(p)).sum()
    }

    #[test]
    fn test_intersection_of_offset_squares() {
        let result = paths_intersection(
            &vec![square(0, 0, 10)],
            &vec![square(5, 5, 10)],
            FillRule::EvenOdd,
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(total_area(&result), 25.0);
    }

    #[test]
    fn test_union_of_offset_squares() {
        let result = paths_union(
            &vec![square(0, 0, 10)],
            &vec![square(5, 5, 10)],
            FillRule::EvenOdd,
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(total_area(&result), 175.0);
    }

    #[test]
    fn test_difference_of_offset_squares() {
        let result = paths_difference(
            &vec![square(0, 0, 10)],
            &vec![square(5, 5, 10)],
            FillRule::EvenOdd,
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(total_area(&result), 75.0);
    }

    #[test]
    fn test_xor_of_offset_squares() {
        let result = paths_xor(
            &vec![square(0, 0, 10)],
            &vec![square(5, 5, 10)],
            FillRule::EvenOdd,
        )
        .unwrap();
        // 175 union - 25 intersection = 150, across however many rings.
        assert!((total_area(&result) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_union_keeps_both() {
        let result = paths_union(
            &vec![square(0, 0, 10)],
            &vec![square(100, 100, 10)],
            FillRule::EvenOdd,
        )
        .unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(total_area(&result), 200.0);
    }

    #[test]
    fn test_contained_difference_leaves_hole() {
        let result = paths_difference(
            &vec![square(0, 0, 20)],
            &vec![square(5, 5, 10)],
            FillRule::EvenOdd,
        )
        .unwrap();
        // Outer ring plus a hole ring of opposite winding.
        assert_eq!(result.len(), 2);
        assert!((total_area(&result) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_inputs() {
        let empty = Paths64::new();
        assert!(paths_intersection(&empty, &empty, FillRule::EvenOdd)
            .unwrap()
            .is_empty());
        let result = paths_union(&vec![square(0, 0, 4)], &empty, FillRule::EvenOdd).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(total_area(&result), 16.0);
    }
}

// Offset builder scenarios with area verification.

mod common;

use std::f64::consts::PI;

use common::{square, total_area};
use scanbeam::{inflate_paths, ClipperOffset, EndType, JoinType, Point64};

#[test]
fn miter_inflate_square() {
    let result = inflate_paths(
        &vec![square(0, 0, 10)],
        1.0,
        JoinType::Miter,
        EndType::Polygon,
    )
    .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(total_area(&result), 144.0);
}

#[test]
fn miter_deflate_square() {
    let result = inflate_paths(
        &vec![square(0, 0, 10)],
        -1.0,
        JoinType::Miter,
        EndType::Polygon,
    )
    .unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(total_area(&result), 64.0);
}

#[test]
fn round_offset_of_open_elbow() {
    // An elbow of two length-10 segments, radius 2 round joins and caps:
    // area ~= pi * r^2 (two half-disc caps + the outer corner arc minus the
    // inner corner overlap) + 2 * r * length.
    let path = vec![
        Point64::new(0, 0),
        Point64::new(10, 0),
        Point64::new(10, 10),
    ];
    let mut offset = ClipperOffset::new();
    offset.add_path(&path, JoinType::Round, EndType::Round);
    let result = offset.execute(2.0).unwrap();
    assert_eq!(result.len(), 1);
    let expected = PI * 4.0 + 80.0;
    let got = total_area(&result);
    assert!(
        (got - expected).abs() < expected * 0.08,
        "expected ~{expected}, got {got}"
    );
    common::assert_no_self_intersections(&result[0]);
}

#[test]
fn joined_end_type_offsets_both_sides() {
    // A Joined open path behaves as a closed ring offset on both sides:
    // a thin rectangular frame around the original segment loop.
    let path = vec![
        Point64::new(0, 0),
        Point64::new(100, 0),
        Point64::new(100, 100),
        Point64::new(0, 100),
    ];
    let mut offset = ClipperOffset::new();
    offset.add_path(&path, JoinType::Miter, EndType::Joined);
    let result = offset.execute(2.0).unwrap();
    // Outer ring 104x104 with a 96x96 hole.
    let total = total_area(&result);
    assert!(
        (total - (104.0 * 104.0 - 96.0 * 96.0)).abs() < 40.0,
        "got {total}"
    );
}

#[test]
fn hole_deflates_outward() {
    // A ring with a hole: positive offset grows the outer boundary and
    // shrinks the hole.
    let outer = square(0, 0, 100);
    let hole: Vec<Point64> = square(30, 30, 40).into_iter().rev().collect();
    let result = inflate_paths(
        &vec![outer, hole],
        5.0,
        JoinType::Miter,
        EndType::Polygon,
    )
    .unwrap();
    // 110x110 outer minus 30x30 hole.
    let expected = 110.0 * 110.0 - 30.0 * 30.0;
    assert!((total_area(&result) - expected).abs() < 2.0);
}

#[test]
fn arc_tolerance_controls_step_count() {
    let mut coarse = ClipperOffset::new();
    coarse.set_arc_tolerance(5.0);
    coarse.add_path(&square(0, 0, 100), JoinType::Round, EndType::Polygon);
    let coarse_out = coarse.execute(20.0).unwrap();

    let mut fine = ClipperOffset::new();
    fine.set_arc_tolerance(0.1);
    fine.add_path(&square(0, 0, 100), JoinType::Round, EndType::Polygon);
    let fine_out = fine.execute(20.0).unwrap();

    assert!(fine_out[0].len() > coarse_out[0].len());
}

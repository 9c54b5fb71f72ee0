// File-driven clipping cases using the line-based test format.

mod common;

use scanbeam::{ClipType, Clipper64};

#[test]
fn runs_every_case_in_clipping_txt() {
    let text = include_str!("data/clipping.txt");
    let cases = common::parse_cases(text);
    assert_eq!(cases.len(), 6, "loader must find every CAPTION block");

    for case in cases {
        let mut clipper = Clipper64::new();
        clipper.add_subject(&case.subjects);
        clipper.add_open_subject(&case.subjects_open);
        clipper.add_clip(&case.clips);
        let (closed, _open) = clipper
            .execute(case.clip_type, case.fill_rule)
            .unwrap_or_else(|e| panic!("case {} failed: {e}", case.caption));

        assert_eq!(
            closed.len() as i64,
            case.sol_count,
            "case {}: solution count",
            case.caption
        );
        let area = common::total_area(&closed);
        assert!(
            (area - case.sol_area as f64).abs() < 1.0,
            "case {}: area {area} expected {}",
            case.caption,
            case.sol_area
        );
        for path in &closed {
            common::assert_no_self_intersections(path);
        }
    }
}

#[test]
fn loader_is_case_insensitive() {
    let text = "caption: 7.\ncliptype: union\nfillrule: nonzero\nSOL_AREA: 0\nSOL_COUNT: 0\nsubjects\n  0,0, 5,0, 5,5\n";
    let cases = common::parse_cases(text);
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].caption, 7);
    assert_eq!(cases[0].clip_type, ClipType::Union);
    assert_eq!(cases[0].subjects.len(), 1);
    assert_eq!(cases[0].subjects[0].len(), 3);
}

#[test]
fn bmh_search_finds_keywords_anywhere() {
    let hay = b"xxxCapTION: 1.yyyCAPTION: 2.";
    assert_eq!(common::find_caseless(hay, b"CAPTION:", 0), Some(3));
    assert_eq!(common::find_caseless(hay, b"CAPTION:", 4), Some(17));
    assert_eq!(common::find_caseless(hay, b"missing", 0), None);
}

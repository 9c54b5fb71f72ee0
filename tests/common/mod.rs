//! Shared helpers for the integration suites: the line-based clipping test
//! file format, plus geometry assertions.

#![allow(dead_code)]

use scanbeam::{area, ClipType, FillRule, Path64, Paths64, Point64};

/// One test case from a clipping test file.
#[derive(Debug, Clone)]
pub struct ClipCase {
    pub caption: i64,
    pub clip_type: ClipType,
    pub fill_rule: FillRule,
    pub sol_area: i64,
    pub sol_count: i64,
    pub subjects: Paths64,
    pub subjects_open: Paths64,
    pub clips: Paths64,
}

/// Case-insensitive Boyer-Moore-Horspool substring search.
pub fn find_caseless(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    let n = needle.len();
    if n == 0 || from + n > haystack.len() {
        return None;
    }
    let needle: Vec<u8> = needle.iter().map(|b| b.to_ascii_lowercase()).collect();
    let mut shift = [n; 256];
    for (i, &b) in needle.iter().enumerate().take(n - 1) {
        shift[b as usize] = n - 1 - i;
    }
    let mut i = from;
    while i + n <= haystack.len() {
        let mut j = n;
        while j > 0 && haystack[i + j - 1].to_ascii_lowercase() == needle[j - 1] {
            j -= 1;
        }
        if j == 0 {
            return Some(i);
        }
        i += shift[haystack[i + n - 1].to_ascii_lowercase() as usize];
    }
    None
}

/// Parses every `CAPTION:`-delimited case in a test file.
pub fn parse_cases(text: &str) -> Vec<ClipCase> {
    let bytes = text.as_bytes();
    let mut cases = Vec::new();
    let mut pos = 0;
    while let Some(start) = find_caseless(bytes, b"CAPTION:", pos) {
        let end = find_caseless(bytes, b"CAPTION:", start + 8).unwrap_or(bytes.len());
        if let Some(case) = parse_block(&text[start..end]) {
            cases.push(case);
        }
        pos = end;
    }
    cases
}

#[derive(PartialEq, Clone, Copy)]
enum Section {
    None,
    Subjects,
    SubjectsOpen,
    Clips,
}

fn parse_block(block: &str) -> Option<ClipCase> {
    let mut case = ClipCase {
        caption: 0,
        clip_type: ClipType::None,
        fill_rule: FillRule::EvenOdd,
        sol_area: 0,
        sol_count: 0,
        subjects: Vec::new(),
        subjects_open: Vec::new(),
        clips: Vec::new(),
    };
    let mut section = Section::None;

    for raw in block.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let upper = line.to_ascii_uppercase();
        if let Some(rest) = upper.strip_prefix("CAPTION:") {
            case.caption = rest.trim().trim_end_matches('.').parse().ok()?;
        } else if let Some(rest) = upper.strip_prefix("CLIPTYPE:") {
            case.clip_type = match rest.trim() {
                "INTERSECTION" => ClipType::Intersection,
                "UNION" => ClipType::Union,
                "DIFFERENCE" => ClipType::Difference,
                "XOR" => ClipType::Xor,
                _ => ClipType::None,
            };
        } else if let Some(rest) = upper.strip_prefix("FILLRULE:") {
            case.fill_rule = match rest.trim() {
                "NONZERO" => FillRule::NonZero,
                "POSITIVE" => FillRule::Positive,
                "NEGATIVE" => FillRule::Negative,
                _ => FillRule::EvenOdd,
            };
        } else if let Some(rest) = upper.strip_prefix("SOL_AREA:") {
            case.sol_area = rest.trim().parse().ok()?;
        } else if let Some(rest) = upper.strip_prefix("SOL_COUNT:") {
            case.sol_count = rest.trim().parse().ok()?;
        } else if upper == "SUBJECTS" {
            section = Section::Subjects;
        } else if upper == "SUBJECTS_OPEN" {
            section = Section::SubjectsOpen;
        } else if upper == "CLIPS" {
            section = Section::Clips;
        } else if let Some(path) = parse_path(line) {
            match section {
                Section::Subjects => case.subjects.push(path),
                Section::SubjectsOpen => case.subjects_open.push(path),
                Section::Clips => case.clips.push(path),
                Section::None => {}
            }
        }
    }
    Some(case)
}

/// Parses `x,y, x,y, ...` into a path.
fn parse_path(line: &str) -> Option<Path64> {
    let nums: Result<Vec<i64>, _> = line
        .split(',')
        .map(|tok| tok.trim().parse::<i64>())
        .collect();
    let nums = nums.ok()?;
    if nums.len() < 2 || nums.len() % 2 != 0 {
        return None;
    }
    Some(
        nums.chunks(2)
            .map(|xy| Point64::new(xy[0], xy[1]))
            .collect(),
    )
}

/// Sum of signed areas over a path set.
pub fn total_area(paths: &Paths64) -> f64 {
    paths.iter().map(|p| area(p)).sum()
}

/// Sum of absolute areas over a path set.
pub fn total_abs_area(paths: &Paths64) -> f64 {
    paths.iter().map(|p| area(p).abs()).sum()
}

/// Asserts that no two non-adjacent edges of `path` properly cross.
pub fn assert_no_self_intersections(path: &Path64) {
    let n = path.len();
    if n < 4 {
        return;
    }
    let cross = |a: Point64, b: Point64, c: Point64| -> i128 {
        (b.x - a.x) as i128 * (c.y - a.y) as i128 - (b.y - a.y) as i128 * (c.x - a.x) as i128
    };
    let proper = |a1: Point64, a2: Point64, b1: Point64, b2: Point64| -> bool {
        let d1 = cross(b1, b2, a1);
        let d2 = cross(b1, b2, a2);
        let d3 = cross(a1, a2, b1);
        let d4 = cross(a1, a2, b2);
        (d1 > 0) != (d2 > 0) && (d3 > 0) != (d4 > 0) && d1 != 0 && d2 != 0 && d3 != 0 && d4 != 0
    };
    for i in 0..n {
        let a1 = path[i];
        let a2 = path[(i + 1) % n];
        for j in i + 2..n {
            if i == 0 && j == n - 1 {
                continue; // adjacent through the wrap
            }
            let b1 = path[j];
            let b2 = path[(j + 1) % n];
            assert!(
                !proper(a1, a2, b1, b2),
                "edges {}-{} and {}-{} cross in {:?}",
                i,
                (i + 1) % n,
                j,
                (j + 1) % n,
                path
            );
        }
    }
}

/// A square path with its bottom-left corner at `(x, y)`.
pub fn square(x: i64, y: i64, side: i64) -> Path64 {
    vec![
        Point64::new(x, y),
        Point64::new(x + side, y),
        Point64::new(x + side, y + side),
        Point64::new(x, y + side),
    ]
}

/// A five-point star (pentagram) of circumradius 100 around the origin;
/// the path self-overlaps, giving the core a winding count of two.
pub fn pentagram() -> Path64 {
    vec![
        Point64::new(0, 100),
        Point64::new(-59, -81),
        Point64::new(95, 31),
        Point64::new(-95, 31),
        Point64::new(59, -81),
    ]
}

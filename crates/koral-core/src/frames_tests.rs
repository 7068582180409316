use crate::frames::{
    ANNIS_FRAMES, COSMAS_IN_FRAMES, COSMAS_OV_FRAMES, FrameTable, POLIQARP_FRAMES,
    is_identity_position,
};
use crate::vocab::Frame;

fn names(table: FrameTable, operator: &str) -> String {
    match table.lookup(operator) {
        Some(frames) => frames
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(","),
        None => "-".to_string(),
    }
}

#[test]
fn poliqarp_operators() {
    assert_eq!(names(POLIQARP_FRAMES, "contains"), "isAround");
    assert_eq!(names(POLIQARP_FRAMES, "startswith"), "startsWith,matches");
    assert_eq!(names(POLIQARP_FRAMES, "overlaps"), "overlapsLeft,overlapsRight");
    assert_eq!(names(POLIQARP_FRAMES, "within"), "-");
}

#[test]
fn annis_operators() {
    assert_eq!(names(ANNIS_FRAMES, "_=_"), "matches");
    assert_eq!(names(ANNIS_FRAMES, "_r_"), "endsWith,matches");
    assert_eq!(names(ANNIS_FRAMES, "_ol_"), "overlapsLeft");
    assert_eq!(names(ANNIS_FRAMES, "_x_"), "-");
}

#[test]
fn cosmas_positions() {
    assert_eq!(names(COSMAS_IN_FRAMES, ""), "isAround");
    assert_eq!(names(COSMAS_IN_FRAMES, "L"), "startsWith");
    assert_eq!(names(COSMAS_IN_FRAMES, "FE"), "matches");
    assert_eq!(names(COSMAS_IN_FRAMES, "X"), "-");

    assert_eq!(names(COSMAS_OV_FRAMES, ""), "overlapsLeft,overlapsRight");
    assert_eq!(names(COSMAS_OV_FRAMES, "R"), "endsWith,overlapsRight");
    assert_eq!(names(COSMAS_OV_FRAMES, "X"), "isAround");
    assert_eq!(names(COSMAS_OV_FRAMES, "N"), "-");
}

#[test]
fn tables_are_total_over_their_operators() {
    for table in [POLIQARP_FRAMES, ANNIS_FRAMES, COSMAS_IN_FRAMES, COSMAS_OV_FRAMES] {
        for operator in table.operators() {
            let frames = table.lookup(operator).unwrap();
            assert!(!frames.is_empty(), "{operator} has no frames");
        }
    }
}

#[test]
fn identity_positions() {
    assert!(is_identity_position("FE"));
    assert!(is_identity_position("FI"));
    assert!(!is_identity_position("F"));
    assert_eq!(COSMAS_IN_FRAMES.lookup("FI"), Some(&[Frame::Matches][..]));
}

use crate::vocab::{BooleanOp, Frame, MatchOperator, ValueType};

const ALL_OPERATORS: [MatchOperator; 8] = [
    MatchOperator::Eq,
    MatchOperator::Ne,
    MatchOperator::Geq,
    MatchOperator::Leq,
    MatchOperator::Gt,
    MatchOperator::Lt,
    MatchOperator::Contains,
    MatchOperator::NotContains,
];

#[test]
fn inverse_is_involutive() {
    for op in ALL_OPERATORS {
        assert_ne!(op.inverse(), op);
        assert_eq!(op.inverse().inverse(), op);
    }
}

#[test]
fn inverse_table() {
    assert_eq!(MatchOperator::Geq.inverse(), MatchOperator::Lt);
    assert_eq!(MatchOperator::Leq.inverse(), MatchOperator::Gt);
    assert_eq!(MatchOperator::Contains.inverse(), MatchOperator::NotContains);
}

#[test]
fn dual_is_involutive() {
    assert_eq!(BooleanOp::And.dual(), BooleanOp::Or);
    assert_eq!(BooleanOp::Or.dual().dual(), BooleanOp::Or);
}

#[test]
fn serde_names_match_wire_names() {
    assert_eq!(
        serde_json::to_string(&MatchOperator::NotContains).unwrap(),
        r#""containsnot""#
    );
    assert_eq!(serde_json::to_string(&Frame::IsAround).unwrap(), r#""isAround""#);
    assert_eq!(serde_json::to_string(&ValueType::Regex).unwrap(), r#""regex""#);

    let frame: Frame = serde_json::from_str(r#""overlapsLeft""#).unwrap();
    assert_eq!(frame.as_str(), "overlapsLeft");
}

use koral_core::{Frame, FrameTable, Node, Operation};
use rowan::TextRange;

use crate::diagnostics::DiagnosticKind;

use super::Context;

/// Frames for a dialect position operator, `UnknownQueryElement` if unmapped.
pub fn map_frames(
    ctx: &mut Context,
    table: &FrameTable,
    operator: &str,
    range: TextRange,
) -> Option<Vec<Frame>> {
    match table.lookup(operator) {
        Some(frames) => Some(frames.to_vec()),
        None => {
            ctx.report(DiagnosticKind::UnknownQueryElement, range)
                .message(operator)
                .emit();
            None
        }
    }
}

pub fn position(frames: Vec<Frame>, exclude: bool, operands: Vec<Node>) -> Node {
    Node::group(Operation::Position { frames, exclude }, operands)
}

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Canonical query graph for the Koral corpus-query gateway.
//!
//! - [`node`]: tokens, spans, groups, references, terms and the filter graph
//! - [`vocab`]: closed vocabularies (match operators, frames, value types)
//! - [`layers`]: layer aliases and foundry tables
//! - [`frames`]: position operator tables
//! - [`printer`]: indented text dump used for inspection and snapshots

pub mod frames;
pub mod layers;
pub mod node;
pub mod printer;
pub mod vocab;

#[cfg(test)]
mod frames_tests;
#[cfg(test)]
mod vocab_tests;

pub use node::{
    Boundary, Distance, Doc, DocGroup, Filter, Group, Node, Operation, Reference, Relation,
    Span, SpanRef, Term, TermGroup, Token, Wrap,
};
pub use frames::FrameTable;
pub use layers::{Layer, LayerTable};
pub use printer::GraphPrinter;
pub use vocab::{BooleanOp, ClassRefOp, Flags, Frame, MatchOperator, RefOperation, ValueType};

/// Largest distance accepted between two sequence operands.
pub const MAXIMUM_DISTANCE: u32 = 100;

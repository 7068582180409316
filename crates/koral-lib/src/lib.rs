//! Koral: compiles corpus queries into KoralQuery.
//!
//! Dialect parsers hand over generic labeled trees; this crate turns them into
//! the canonical query graph of `koral-core` and renders the versioned JSON-LD
//! request.
//!
//! # Example
//!
//! ```
//! use koral_lib::QueryBuilder;
//!
//! let tree = "(token (term layer=orth key=Mann))";
//! let query = QueryBuilder::from_notation("poliqarp", tree)
//!     .version("1.0")
//!     .build();
//!
//! assert!(query.is_valid());
//! assert_eq!(query.to_json()["query"]["wrap"]["key"], "Mann");
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod compile;
pub mod diagnostics;
pub mod dialect;
pub mod emit;
pub mod filter;
pub mod query;
pub mod tree;

#[cfg(test)]
mod test_utils;

use rowan::TextRange;

pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use dialect::Dialect;
pub use emit::ApiVersion;
pub use query::{CompileOptions, Query, QueryBuilder};

/// Fatal conditions that abort a compile.
///
/// These never leave the crate's public entry points: [`Query`] reports them
/// as diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Recursion fuel exhausted (query nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    /// The tree notation could not be read.
    #[error("unexpected `{symbol}` at {range:?}")]
    ParseFailure { symbol: String, range: TextRange },

    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Result type for compile operations.
pub type Result<T> = std::result::Result<T, Error>;

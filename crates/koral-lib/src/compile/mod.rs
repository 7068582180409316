//! Building blocks shared by the dialect drivers.
//!
//! Every builder takes the compile [`Context`] and reports recoverable
//! problems there. Builders return `None` for a subtree they had to give up
//! on; only the chain folder, which calls back into driver code, returns a
//! [`Result`](crate::Result).

pub mod chain;
pub mod classes;
pub mod context;
pub mod distance;
pub mod frames;
pub mod negation;
pub mod repetition;
pub mod term;

#[cfg(test)]
mod negation_tests;

pub use context::{Context, DEFAULT_RECURSION_FUEL};

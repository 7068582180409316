use koral_core::{Filter, GraphPrinter, Node};

use crate::compile::Context;
use crate::diagnostics::Diagnostics;
use crate::query::{Query, QueryBuilder};

pub fn dump(node: &Node) -> String {
    GraphPrinter::new(node).dump()
}

pub fn dump_filter(filter: &Filter) -> String {
    GraphPrinter::filter(filter).dump()
}

/// One diagnostic per line, in report order.
pub fn dump_diagnostics(diagnostics: &Diagnostics) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{d}\n"))
        .collect()
}

pub fn ctx_diagnostics(ctx: &Context) -> String {
    dump_diagnostics(ctx.diagnostics())
}

/// Compiles tree notation with API version 1.0.
pub fn compile(dialect: &str, notation: &str) -> Query {
    QueryBuilder::from_notation(dialect, notation)
        .version("1.0")
        .build()
}

/// Graph dump of a query that must compile cleanly.
#[track_caller]
pub fn graph(dialect: &str, notation: &str) -> String {
    let query = compile(dialect, notation);
    assert!(
        query.diagnostics().is_empty(),
        "unexpected diagnostics:\n{}",
        dump_diagnostics(query.diagnostics())
    );
    dump(query.graph().expect("query has a graph"))
}

/// Diagnostics of a query, one per line.
pub fn errors(dialect: &str, notation: &str) -> String {
    dump_diagnostics(compile(dialect, notation).diagnostics())
}

//! The compile entry point.
//!
//! [`QueryBuilder`] collects the content query (a dialect parse tree or its
//! notation), the optional corpus filter and the options; [`Query`] holds the
//! result. Nothing here fails: every problem ends up in the diagnostics.

#[cfg(test)]
mod mod_tests;
#[cfg(test)]
mod options_tests;

use koral_core::{Filter, GraphPrinter, Node};
use rowan::TextRange;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::compile::{Context, DEFAULT_RECURSION_FUEL};
use crate::diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter};
use crate::dialect::annis::AnnisNode;
use crate::dialect::cosmas::CosmasNode;
use crate::dialect::cqp::CqpNode;
use crate::dialect::poliqarp::PoliqarpNode;
use crate::dialect::{Dialect, annis, cosmas, cqp, poliqarp};
use crate::emit::{ApiVersion, Emitter};
use crate::filter::{self, FilterNode};
use crate::tree::read;
use crate::{Error, Result};

/// A content query parse tree of one of the supported dialects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTree {
    Poliqarp(PoliqarpNode),
    Annis(AnnisNode),
    Cosmas(CosmasNode),
    Cqp(CqpNode),
}

impl QueryTree {
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Poliqarp(_) => Dialect::Poliqarp,
            Self::Annis(_) => Dialect::Annis,
            Self::Cosmas(_) => Dialect::Cosmas,
            Self::Cqp(_) => Dialect::Cqp,
        }
    }

    /// Reads the tree notation with the node kinds of `dialect`.
    pub fn read(dialect: Dialect, notation: &str) -> Result<Self> {
        Ok(match dialect {
            Dialect::Poliqarp => Self::Poliqarp(read(notation)?),
            Dialect::Annis => Self::Annis(read(notation)?),
            Dialect::Cosmas => Self::Cosmas(read(notation)?),
            Dialect::Cqp => Self::Cqp(read(notation)?),
        })
    }

    fn range(&self) -> TextRange {
        match self {
            Self::Poliqarp(root) => root.range(),
            Self::Annis(root) => root.range(),
            Self::Cosmas(root) => root.range(),
            Self::Cqp(root) => root.range(),
        }
    }

    fn compile(&self, ctx: &mut Context) -> Result<Option<Node>> {
        match self {
            Self::Poliqarp(root) => poliqarp::compile(ctx, root),
            Self::Annis(root) => annis::compile(ctx, root),
            Self::Cosmas(root) => cosmas::compile(ctx, root),
            Self::Cqp(root) => cqp::compile(ctx, root),
        }
    }
}

impl From<PoliqarpNode> for QueryTree {
    fn from(root: PoliqarpNode) -> Self {
        Self::Poliqarp(root)
    }
}

impl From<AnnisNode> for QueryTree {
    fn from(root: AnnisNode) -> Self {
        Self::Annis(root)
    }
}

impl From<CosmasNode> for QueryTree {
    fn from(root: CosmasNode) -> Self {
        Self::Cosmas(root)
    }
}

impl From<CqpNode> for QueryTree {
    fn from(root: CqpNode) -> Self {
        Self::Cqp(root)
    }
}

/// Compile options, also loadable from JSON.
///
/// ```
/// use koral_lib::CompileOptions;
///
/// let options: CompileOptions =
///     serde_json::from_str(r#"{ "version": "v1.0", "lenient": true }"#).unwrap();
/// assert!(options.lenient);
/// assert_eq!(options.recursion_fuel, Some(256));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompileOptions {
    /// API version of the rendered request. Required.
    pub version: Option<String>,
    /// Return the partial graph even when errors were reported.
    pub lenient: bool,
    /// Maximum nesting depth. None = infinite.
    pub recursion_fuel: Option<u32>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            version: None,
            lenient: false,
            recursion_fuel: Some(DEFAULT_RECURSION_FUEL),
        }
    }
}

#[derive(Debug, Clone)]
enum Source {
    Tree(QueryTree),
    Notation { dialect: String, text: String },
}

#[derive(Debug, Clone)]
enum FilterSource {
    Tree(FilterNode),
    Notation(String),
}

/// Builder for a compile.
///
/// ```
/// use koral_lib::QueryBuilder;
///
/// let query = QueryBuilder::from_notation("annis", r#"(tok key="/Mann.*/")"#)
///     .version("0.3")
///     .filter_notation("(doc key=pubDate op=since value=2014)")
///     .build();
///
/// let json = query.to_json();
/// assert_eq!(json["query"]["@type"], "korap:token");
/// assert_eq!(json["collection"]["type"], "type:date");
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    source: Source,
    filter: Option<FilterSource>,
    options: CompileOptions,
}

impl QueryBuilder {
    pub fn new(tree: impl Into<QueryTree>) -> Self {
        Self {
            source: Source::Tree(tree.into()),
            filter: None,
            options: CompileOptions::default(),
        }
    }

    /// Query given as tree notation of the named dialect.
    ///
    /// An unknown dialect name or unreadable notation is reported by
    /// [`build`](Self::build).
    pub fn from_notation(dialect: &str, notation: &str) -> Self {
        Self {
            source: Source::Notation {
                dialect: dialect.to_string(),
                text: notation.to_string(),
            },
            filter: None,
            options: CompileOptions::default(),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.options.version = Some(version.into());
        self
    }

    pub fn filter(mut self, tree: FilterNode) -> Self {
        self.filter = Some(FilterSource::Tree(tree));
        self
    }

    pub fn filter_notation(mut self, notation: &str) -> Self {
        self.filter = Some(FilterSource::Notation(notation.to_string()));
        self
    }

    pub fn lenient(mut self, lenient: bool) -> Self {
        self.options.lenient = lenient;
        self
    }

    /// Set recursion depth limit. None = infinite.
    pub fn with_recursion_fuel(mut self, limit: Option<u32>) -> Self {
        self.options.recursion_fuel = limit;
        self
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Query {
        let mut ctx = Context::new().with_recursion_fuel(self.options.recursion_fuel);
        let version = resolve_version(&mut ctx, self.options.version.as_deref());

        let (tree, source) = match self.source {
            Source::Tree(tree) => (Some(tree), None),
            Source::Notation { dialect, text } => (read_query(&mut ctx, &dialect, &text), Some(text)),
        };
        let dialect = tree.as_ref().map(QueryTree::dialect);
        debug!(
            dialect = dialect.map(Dialect::as_str),
            %version,
            "compiling query"
        );

        let graph = match &tree {
            Some(tree) => run(&mut ctx, tree.range(), |ctx| tree.compile(ctx)),
            None => None,
        };
        let filter = match self.filter {
            _ if ctx.diagnostics().has_fatal() => None,
            Some(FilterSource::Tree(root)) => {
                run(&mut ctx, root.range(), |ctx| filter::compile(ctx, &root))
            }
            Some(FilterSource::Notation(text)) => match read::<filter::FilterKind>(&text) {
                Ok(root) => run(&mut ctx, root.range(), |ctx| filter::compile(ctx, &root)),
                Err(err) => {
                    report_error(&mut ctx, err, TextRange::default());
                    None
                }
            },
            None => None,
        };

        let diagnostics = ctx.into_diagnostics();
        debug!(
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "query compiled"
        );

        Query {
            dialect,
            version,
            graph,
            filter,
            diagnostics,
            lenient: self.options.lenient,
            source,
        }
    }
}

fn resolve_version(ctx: &mut Context, version: Option<&str>) -> ApiVersion {
    let Some(text) = version else {
        ctx.report(DiagnosticKind::MissingVersion, TextRange::default())
            .emit();
        return ApiVersion::default();
    };
    match text.parse() {
        Ok(version) => version,
        Err(_) => {
            ctx.report(DiagnosticKind::UnsupportedVersion, TextRange::default())
                .message(text)
                .emit();
            ApiVersion::default()
        }
    }
}

fn read_query(ctx: &mut Context, dialect: &str, text: &str) -> Option<QueryTree> {
    let Some(dialect) = Dialect::from_name(dialect) else {
        ctx.report(DiagnosticKind::UnknownQueryLanguage, TextRange::default())
            .message(dialect)
            .emit();
        return None;
    };
    if text.trim().is_empty() {
        ctx.report(DiagnosticKind::NoQuery, TextRange::default())
            .emit();
        return None;
    }
    match QueryTree::read(dialect, text) {
        Ok(tree) => Some(tree),
        Err(err) => {
            report_error(ctx, err, TextRange::default());
            None
        }
    }
}

/// Runs a driver, turning a fatal error into a diagnostic.
fn run<T>(
    ctx: &mut Context,
    range: TextRange,
    f: impl FnOnce(&mut Context) -> Result<Option<T>>,
) -> Option<T> {
    match f(ctx) {
        Ok(result) => result,
        Err(err) => {
            report_error(ctx, err, range);
            None
        }
    }
}

fn report_error(ctx: &mut Context, err: Error, range: TextRange) {
    match err {
        Error::RecursionLimitExceeded => ctx
            .report(DiagnosticKind::QueryTooComplex, range)
            .message("nested too deeply")
            .emit(),
        Error::ParseFailure { symbol, range } => ctx
            .report(DiagnosticKind::ParseFailure, range)
            .message(symbol)
            .emit(),
        Error::Serialization(detail) => ctx
            .report(DiagnosticKind::SerializationFailed, range)
            .message(detail)
            .emit(),
    }
}

/// Result of a compile.
///
/// Holds the graphs as built plus everything reported on the way. Use
/// [`is_valid`](Self::is_valid) to check for errors.
#[derive(Debug, Clone)]
pub struct Query {
    dialect: Option<Dialect>,
    version: ApiVersion,
    graph: Option<Node>,
    filter: Option<Filter>,
    diagnostics: Diagnostics,
    lenient: bool,
    source: Option<String>,
}

impl Query {
    pub fn is_valid(&self) -> bool {
        !self.diagnostics.has_errors()
    }

    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The content graph as built, even if errors were reported.
    pub fn graph(&self) -> Option<&Node> {
        self.graph.as_ref()
    }

    /// The content graph as delivered: absent after errors unless lenient,
    /// and always absent after a parse failure or fuel exhaustion.
    pub fn query(&self) -> Option<&Node> {
        self.usable(self.graph.as_ref())
    }

    /// The corpus filter as delivered, under the same rules as
    /// [`query`](Self::query).
    pub fn filter(&self) -> Option<&Filter> {
        self.usable(self.filter.as_ref())
    }

    fn usable<'a, T>(&self, value: Option<&'a T>) -> Option<&'a T> {
        if self.diagnostics.has_fatal() {
            return None;
        }
        if self.lenient || self.is_valid() {
            value
        } else {
            None
        }
    }

    /// The request object in the shape of the requested version.
    pub fn to_json(&self) -> Value {
        Emitter::new(self.version).request(self.query(), self.filter(), &self.diagnostics)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(&self.to_json()).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn dump_graph(&self) -> String {
        self.graph
            .as_ref()
            .map(|graph| GraphPrinter::new(graph).dump())
            .unwrap_or_default()
    }

    /// Diagnostics rendered against the tree notation the query was read from.
    pub fn dump_diagnostics(&self) -> String {
        let printer = DiagnosticsPrinter::new(&self.diagnostics);
        match &self.source {
            Some(source) => printer.source(source).render(),
            None => printer.render(),
        }
    }
}

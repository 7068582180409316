use rowan::TextRange;

/// Diagnostic kinds with their wire status codes.
///
/// Several kinds share a code: the code is what clients see, the kind is what
/// the compiler reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // Request-level problems
    SerializationFailed,
    NoQuery,
    UnknownQueryLanguage,
    MissingVersion,
    UnsupportedVersion,

    // The tree handed over by the dialect parser is unusable
    ParseFailure,
    MalformedQuery,
    QueryTooComplex,

    // Leaf and operator problems
    InvalidClassReference,
    IncompatibleOperatorAndOperand,
    UnknownQueryElement,
    UnboundRelation,
    LemmaWildcards,

    // COSMAS II proximity operators
    ProxUnknownMeasure,
    ProxMissingMeasure,
    ProxMissingValue,
    ProxWrongCharacters,

    UnknownQueryError,

    // Warnings
    DeprecatedQueryElement,
    DistanceCropped,
    LooksLikeDate,
    IgnoredQueryElement,
}

impl DiagnosticKind {
    /// Status code reported to clients.
    pub fn code(&self) -> u16 {
        match self {
            Self::SerializationFailed => 300,
            Self::NoQuery => 301,
            Self::MalformedQuery | Self::ParseFailure => 302,
            Self::DeprecatedQueryElement => 303,
            Self::InvalidClassReference => 304,
            Self::IncompatibleOperatorAndOperand | Self::LooksLikeDate => 305,
            Self::UnknownQueryElement | Self::IgnoredQueryElement => 306,
            Self::UnknownQueryLanguage => 307,
            Self::UnboundRelation => 308,
            Self::MissingVersion => 309,
            Self::UnsupportedVersion => 310,
            Self::QueryTooComplex | Self::DistanceCropped => 311,
            Self::ProxUnknownMeasure => 320,
            Self::ProxMissingMeasure => 321,
            Self::ProxMissingValue => 323,
            Self::ProxWrongCharacters => 326,
            Self::LemmaWildcards => 350,
            Self::UnknownQueryError => 399,
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            Self::DeprecatedQueryElement
            | Self::DistanceCropped
            | Self::LooksLikeDate
            | Self::IgnoredQueryElement => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Whether the compile cannot continue past this diagnostic.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ParseFailure | Self::QueryTooComplex)
    }

    /// Default hint for this kind, appended to the plain rendering.
    pub fn default_hint(&self) -> Option<&'static str> {
        match self {
            Self::LooksLikeDate => Some("use `in`, `since` or `until` to compare dates"),
            Self::MissingVersion => Some("the request is rendered as version 1.0"),
            Self::LemmaWildcards => Some("use a regular expression instead"),
            _ => None,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::SerializationFailed => "could not serialize the query",
            Self::NoQuery => "no query given",
            Self::UnknownQueryLanguage => "unknown query language",
            Self::MissingVersion => "no API version given",
            Self::UnsupportedVersion => "unsupported API version",

            Self::ParseFailure => "could not parse the query",
            Self::MalformedQuery => "malformed query",
            Self::QueryTooComplex => "query too complex",

            Self::InvalidClassReference => "reference to an undefined class",
            Self::IncompatibleOperatorAndOperand => "operator cannot be used with this operand",
            Self::UnknownQueryElement => "unknown query element",
            Self::UnboundRelation => "operand is not bound to any relation",
            Self::LemmaWildcards => "wildcards are not allowed in lemmas",

            Self::ProxUnknownMeasure => "unknown proximity measure",
            Self::ProxMissingMeasure => "proximity operator without measure",
            Self::ProxMissingValue => "proximity operator without distance value",
            Self::ProxWrongCharacters => "invalid characters in proximity operator",

            Self::UnknownQueryError => "unknown error while compiling the query",

            Self::DeprecatedQueryElement => "deprecated query element",
            Self::DistanceCropped => "distance cropped",
            Self::LooksLikeDate => "value looks like a date but is compared as a string",
            Self::IgnoredQueryElement => "query element ignored",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::UnknownQueryLanguage => "`{}` is not a supported query language".to_string(),
            Self::UnsupportedVersion => "`{}` is not a supported API version".to_string(),
            Self::ParseFailure => "could not parse the query at `{}`".to_string(),
            Self::InvalidClassReference => "class {} is not defined in its operand".to_string(),
            Self::UnknownQueryElement => "`{}` is not a known query element".to_string(),
            Self::DistanceCropped => "distance {} cropped to the maximum".to_string(),

            // Free-form detail
            Self::MalformedQuery
            | Self::IncompatibleOperatorAndOperand
            | Self::UnboundRelation => "{}".to_string(),

            // Standard pattern: fallback + context
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, msg: Option<&str>) -> String {
        match msg {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl RelatedInfo {
    pub fn new(range: TextRange, message: impl Into<String>) -> Self {
        Self {
            range,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// Range in the query text the parse tree was built from.
    pub(crate) range: TextRange,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
    pub(crate) hints: Vec<String>,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            kind,
            range,
            message: message.into(),
            related: Vec::new(),
            hints: kind.default_hint().map(String::from).into_iter().collect(),
        }
    }

    pub(crate) fn with_default_message(kind: DiagnosticKind, range: TextRange) -> Self {
        Self::new(kind, range, kind.fallback_message())
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn severity(&self) -> Severity {
        self.kind.default_severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} at {}..{}: {}",
            self.severity(),
            self.code(),
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )?;
        for related in &self.related {
            write!(
                f,
                " (related: {} at {}..{})",
                related.message,
                u32::from(related.range.start()),
                u32::from(related.range.end())
            )?;
        }
        for hint in &self.hints {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

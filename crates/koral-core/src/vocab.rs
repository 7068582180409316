//! Closed vocabularies of the canonical graph.
//!
//! Every enum here has a fixed wire name (`as_str`) that the emitter prefixes
//! with its namespace (`match:`, `frames:`, `operation:` ...). The serde names
//! are the same strings without the prefix.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a term value is compared against the annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    #[default]
    Eq,
    Ne,
    Geq,
    Leq,
    Gt,
    Lt,
    Contains,
    #[serde(rename = "containsnot")]
    NotContains,
}

impl MatchOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Geq => "geq",
            Self::Leq => "leq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Contains => "contains",
            Self::NotContains => "containsnot",
        }
    }

    /// Operator symbol as written in filter queries.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Geq => ">=",
            Self::Leq => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Contains => "~",
            Self::NotContains => "!~",
        }
    }

    /// The operator matching exactly the complement. Involutive.
    pub fn inverse(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
            Self::Geq => Self::Lt,
            Self::Lt => Self::Geq,
            Self::Leq => Self::Gt,
            Self::Gt => Self::Leq,
            Self::Contains => Self::NotContains,
            Self::NotContains => Self::Contains,
        }
    }

    /// `<`, `>`, `<=`, `>=`: only meaningful for ordered values.
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Geq | Self::Leq | Self::Gt | Self::Lt)
    }
}

/// Interpretation of a term key or doc value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Regex,
    Date,
    Integer,
    Punct,
    Wildcard,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Regex => "regex",
            Self::Date => "date",
            Self::Integer => "integer",
            Self::Punct => "punct",
            Self::Wildcard => "wildcard",
        }
    }
}

/// Boolean connective of a term group or doc group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanOp {
    And,
    Or,
}

impl BooleanOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }

    /// De Morgan dual.
    pub fn dual(self) -> Self {
        match self {
            Self::And => Self::Or,
            Self::Or => Self::And,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
        }
    }
}

/// Canonical relation between the boundaries of two spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Frame {
    Succeeds,
    SucceedsDirectly,
    OverlapsRight,
    AlignsRight,
    IsWithin,
    StartsWith,
    Matches,
    AlignsLeft,
    IsAround,
    EndsWith,
    OverlapsLeft,
    PrecedesDirectly,
    Precedes,
}

impl Frame {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Succeeds => "succeeds",
            Self::SucceedsDirectly => "succeedsDirectly",
            Self::OverlapsRight => "overlapsRight",
            Self::AlignsRight => "alignsRight",
            Self::IsWithin => "isWithin",
            Self::StartsWith => "startsWith",
            Self::Matches => "matches",
            Self::AlignsLeft => "alignsLeft",
            Self::IsAround => "isAround",
            Self::EndsWith => "endsWith",
            Self::OverlapsLeft => "overlapsLeft",
            Self::PrecedesDirectly => "precedesDirectly",
            Self::Precedes => "precedes",
        }
    }
}

/// Operation tag of a reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefOperation {
    Focus,
    Split,
}

impl RefOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Split => "split",
        }
    }
}

/// How several class references of one reference node combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassRefOp {
    Intersection,
}

impl ClassRefOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intersection => "intersection",
        }
    }
}

/// Term matching flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    pub case_insensitive: bool,
    pub diacritics_insensitive: bool,
}

impl Flags {
    pub const NONE: Flags = Flags {
        case_insensitive: false,
        diacritics_insensitive: false,
    };

    pub fn is_empty(&self) -> bool {
        !self.case_insensitive && !self.diacritics_insensitive
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for MatchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Versioned JSON-LD rendering of compiled queries.
//!
//! Two wire shapes exist. They differ in the `@context`, the `@type` prefix,
//! the key of the corpus filter and the key carrying class numbers; the node
//! structure is the same.

mod json;


use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use json::Emitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    /// `0.1` to `0.3`
    Legacy,
    /// `1.0`
    #[default]
    Current,
}

impl ApiVersion {
    pub fn context(self) -> &'static str {
        match self {
            Self::Legacy => "http://korap.ids-mannheim.de/ns/koral/0.3/context.jsonld",
            Self::Current => "http://korap.ids-mannheim.de/ns/KoralQuery/v1.0/context.jsonld",
        }
    }

    /// Namespace of `@type` values.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Legacy => "korap",
            Self::Current => "koral",
        }
    }

    /// Key of the corpus filter in the request object.
    pub fn filter_key(self) -> &'static str {
        match self {
            Self::Legacy => "collection",
            Self::Current => "corpus",
        }
    }

    /// Key of the class number on class groups.
    pub fn class_key(self) -> &'static str {
        match self {
            Self::Legacy => "class",
            Self::Current => "classOut",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("0.3"),
            Self::Current => f.write_str("1.0"),
        }
    }
}

/// Version string that names no supported API version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a supported API version")]
pub struct UnsupportedVersion(pub String);

impl FromStr for ApiVersion {
    type Err = UnsupportedVersion;

    /// Accepts `0.1`, `0.2`, `0.3` and `1.0`, each with an optional leading `v`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        match number {
            "0.1" | "0.2" | "0.3" => Ok(Self::Legacy),
            "1.0" => Ok(Self::Current),
            _ => Err(UnsupportedVersion(s.to_string())),
        }
    }
}

//! Terms from dialect leaf predicates.
//!
//! Resolves layer aliases, foundry defaults, match operator, flags and the
//! value type of the key. The same literal classification drives the typing
//! of corpus filter values.

use koral_core::layers::{DEFAULT_LAYER, default_foundry, is_foundry};
use koral_core::{Flags, Layer, LayerTable, MatchOperator, Term, ValueType};
use rowan::TextRange;

use crate::diagnostics::DiagnosticKind;

use super::Context;

/// A leaf predicate as written in the query, before any resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermSpec<'a> {
    pub foundry: Option<&'a str>,
    pub layer: Option<&'a str>,
    pub key: &'a str,
    pub value: Option<&'a str>,
    pub negated: bool,
    pub flags: Option<&'a str>,
}

impl<'a> TermSpec<'a> {
    pub fn new(key: &'a str) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }
}

/// Shape of a literal, independent of the operator it is used with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralShape {
    /// `/.../`
    Regex,
    /// `YYYY-MM` or `YYYY-MM-DD`
    Date,
    /// Four digits: a year or a plain number.
    Year,
    Integer,
    String,
}

pub fn literal_shape(text: &str) -> LiteralShape {
    if regex_body(text).is_some() {
        return LiteralShape::Regex;
    }
    let parts: Vec<&str> = text.split('-').collect();
    let is_date = match parts.as_slice() {
        [year, month] => all_digits(year, 4) && all_digits(month, 2),
        [year, month, day] => all_digits(year, 4) && all_digits(month, 2) && all_digits(day, 2),
        _ => false,
    };
    if is_date {
        LiteralShape::Date
    } else if all_digits(text, 4) {
        LiteralShape::Year
    } else if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        LiteralShape::Integer
    } else {
        LiteralShape::String
    }
}

fn all_digits(text: &str, len: usize) -> bool {
    text.len() == len && text.bytes().all(|b| b.is_ascii_digit())
}

/// Pattern between the slashes of a `/.../` literal.
pub fn regex_body(text: &str) -> Option<&str> {
    (text.len() >= 2 && text.starts_with('/') && text.ends_with('/'))
        .then(|| &text[1..text.len() - 1])
}

/// Term wrapped by a token. Without a layer the term matches the surface form.
pub fn token_term(
    ctx: &mut Context,
    table: &LayerTable,
    spec: &TermSpec<'_>,
    range: TextRange,
) -> Option<Term> {
    let layer = match spec.layer {
        Some(name) => resolve_layer(ctx, table, name, range)?,
        None => Layer {
            code: DEFAULT_LAYER,
            punct: false,
        },
    };
    build(ctx, spec, Some(layer), range)
}

/// Term wrapped by a span or used as an attribute. The layer stays absent
/// unless named.
pub fn span_term(
    ctx: &mut Context,
    table: &LayerTable,
    spec: &TermSpec<'_>,
    range: TextRange,
) -> Option<Term> {
    let layer = match spec.layer {
        Some(name) => Some(resolve_layer(ctx, table, name, range)?),
        None => None,
    };
    build(ctx, spec, layer, range)
}

pub fn resolve_layer(
    ctx: &mut Context,
    table: &LayerTable,
    name: &str,
    range: TextRange,
) -> Option<Layer> {
    let layer = table.resolve(name);
    if layer.is_none() {
        ctx.report(DiagnosticKind::UnknownQueryElement, range)
            .message(name)
            .emit();
    }
    layer
}

/// Checks an explicit foundry against the supported set.
pub fn resolve_foundry(ctx: &mut Context, name: &str, range: TextRange) -> Option<String> {
    if is_foundry(name) {
        return Some(name.to_string());
    }
    ctx.report(DiagnosticKind::UnknownQueryElement, range)
        .message(name)
        .emit();
    None
}

fn build(
    ctx: &mut Context,
    spec: &TermSpec<'_>,
    layer: Option<Layer>,
    range: TextRange,
) -> Option<Term> {
    if spec.key.is_empty() {
        ctx.report(DiagnosticKind::MalformedQuery, range)
            .message("a term needs a non-empty key")
            .emit();
        return None;
    }
    let foundry = match spec.foundry {
        Some(name) => Some(resolve_foundry(ctx, name, range)?),
        None => layer
            .and_then(|l| default_foundry(l.code))
            .map(String::from),
    };
    let (flags, substring) = parse_flags(ctx, spec.flags.unwrap_or(""), range)?;

    let (mut key, mut value_type) = match regex_body(spec.key) {
        Some(body) => (validate_regex(ctx, body, range)?.to_string(), ValueType::Regex),
        None => (spec.key.to_string(), ValueType::String),
    };
    if substring && !key.is_empty() {
        if value_type != ValueType::Regex {
            key = regex_syntax::escape(&key);
        }
        key = format!(".*?{key}.*?");
        value_type = ValueType::Regex;
    }

    let value = match spec.value.map(|v| (v, regex_body(v))) {
        Some((_, Some(body))) => {
            value_type = ValueType::Regex;
            Some(validate_regex(ctx, body, range)?.to_string())
        }
        Some((plain, None)) => Some(plain.to_string()),
        None => None,
    };

    if layer.is_some_and(|l| l.punct) && value_type == ValueType::String {
        value_type = ValueType::Punct;
    }

    Some(Term {
        foundry,
        layer: layer.map(|l| l.code.to_string()),
        key,
        value,
        value_type,
        match_op: if spec.negated {
            MatchOperator::Ne
        } else {
            MatchOperator::Eq
        },
        flags,
    })
}

fn validate_regex<'a>(ctx: &mut Context, pattern: &'a str, range: TextRange) -> Option<&'a str> {
    if regex_syntax::Parser::new().parse(pattern).is_ok() {
        return Some(pattern);
    }
    ctx.report(DiagnosticKind::MalformedQuery, range)
        .message(format!("invalid regular expression `{pattern}`"))
        .emit();
    None
}

/// Parses flag letters. Returns the flags and whether `x` (substring) was set.
pub fn parse_flags(ctx: &mut Context, letters: &str, range: TextRange) -> Option<(Flags, bool)> {
    let mut flags = Flags::NONE;
    let mut substring = false;
    let (mut case_sensitive, mut diacritics_sensitive) = (false, false);

    for letter in letters.chars() {
        match letter {
            'i' => flags.case_insensitive = true,
            'I' => case_sensitive = true,
            'd' => flags.diacritics_insensitive = true,
            'D' => diacritics_sensitive = true,
            'x' => substring = true,
            _ => {
                ctx.report(DiagnosticKind::UnknownQueryElement, range)
                    .message(format!("/{letter}"))
                    .emit();
                return None;
            }
        }
    }

    let contradictory = (flags.case_insensitive && case_sensitive)
        || (flags.diacritics_insensitive && diacritics_sensitive);
    if contradictory {
        ctx.report(DiagnosticKind::UnknownQueryElement, range)
            .message(format!("/{letters}"))
            .hint("flags contradict each other")
            .emit();
        return None;
    }
    Some((flags, substring))
}

/// Types a corpus filter value for the given operator.
///
/// | shape   | `=` `!=`               | `<` `>` `<=` `>=`        |
/// |---------|------------------------|--------------------------|
/// | regex   | regex                  | incompatible             |
/// | date    | string, `LooksLikeDate`| date                     |
/// | year    | string                 | integer, `LooksLikeDate` |
/// | integer | string                 | integer                  |
/// | string  | string                 | incompatible             |
///
/// `~` and `!~` follow the equality column.
pub fn type_literal(
    ctx: &mut Context,
    op: MatchOperator,
    text: &str,
    range: TextRange,
) -> Option<(String, ValueType)> {
    let shape = literal_shape(text);
    if !op.is_comparison() {
        return match shape {
            LiteralShape::Regex => {
                let body = regex_body(text).unwrap_or(text);
                Some((validate_regex(ctx, body, range)?.to_string(), ValueType::Regex))
            }
            LiteralShape::Date => {
                ctx.report(DiagnosticKind::LooksLikeDate, range)
                    .related_to(format!("`{text}`"), range)
                    .emit();
                Some((text.to_string(), ValueType::String))
            }
            _ => Some((text.to_string(), ValueType::String)),
        };
    }

    match shape {
        LiteralShape::Date => Some((text.to_string(), ValueType::Date)),
        LiteralShape::Year => {
            ctx.report(DiagnosticKind::LooksLikeDate, range)
                .related_to(format!("`{text}`"), range)
                .emit();
            Some((text.to_string(), ValueType::Integer))
        }
        LiteralShape::Integer => Some((text.to_string(), ValueType::Integer)),
        LiteralShape::Regex | LiteralShape::String => {
            ctx.report(DiagnosticKind::IncompatibleOperatorAndOperand, range)
                .message(format!(
                    "`{}` cannot compare the non-numeric value `{text}`",
                    op.symbol()
                ))
                .emit();
            None
        }
    }
}

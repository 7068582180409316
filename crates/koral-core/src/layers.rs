//! Annotation layer and foundry tables.
//!
//! Dialects name layers differently (`pos`, `ANA`, `cat` ...). Each dialect
//! owns a [`LayerTable`] of aliases; canonical codes are accepted everywhere.

/// Canonical layer codes.
pub const CANONICAL_LAYERS: &[&str] = &["orth", "l", "p", "m", "c", "d", "s"];

/// Layers annotated on single tokens. Anything else denotes a span.
pub const TOKEN_LAYERS: &[&str] = &["p", "l", "m", "orth"];

/// Annotation sources a term may name explicitly.
pub const FOUNDRIES: &[&str] = &[
    "base", "cnx", "corenlp", "dereko", "drukola", "lwc", "malt", "marmot", "mate", "mdp",
    "opennlp", "sgbr", "tt", "ud", "xip",
];

/// Layer used when a term names neither layer nor foundry.
pub const DEFAULT_LAYER: &str = "orth";

/// Resolved layer: canonical code plus whether the alias selects punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layer {
    pub code: &'static str,
    pub punct: bool,
}

/// Per-dialect alias table.
#[derive(Debug, Clone, Copy)]
pub struct LayerTable {
    aliases: &'static [(&'static str, &'static str)],
}

pub const POLIQARP_LAYERS: LayerTable = LayerTable {
    aliases: &[("base", "l"), ("lemma", "l"), ("pos", "p"), ("text", "orth")],
};

pub const ANNIS_LAYERS: LayerTable = LayerTable {
    aliases: &[
        ("pos", "p"),
        ("cat", "c"),
        ("lemma", "l"),
        ("tok", "orth"),
        ("text", "orth"),
    ],
};

pub const COSMAS_LAYERS: LayerTable = LayerTable {
    aliases: &[("ANA", "p"), ("POS", "p"), ("MORPH", "m"), ("LEM", "l")],
};

pub const CQP_LAYERS: LayerTable = LayerTable {
    aliases: &[("word", "orth"), ("lemma", "l"), ("pos", "p"), ("text", "orth")],
};

impl LayerTable {
    /// Canonical layer for a dialect layer name, `None` if unmapped.
    pub fn resolve(&self, name: &str) -> Option<Layer> {
        if name == "punct" {
            return Some(Layer {
                code: "orth",
                punct: true,
            });
        }
        if let Some(code) = CANONICAL_LAYERS.iter().find(|code| **code == name) {
            return Some(Layer { code, punct: false });
        }
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, code)| Layer { code, punct: false })
    }
}

pub fn is_foundry(name: &str) -> bool {
    FOUNDRIES.contains(&name)
}

pub fn is_token_layer(code: &str) -> bool {
    TOKEN_LAYERS.contains(&code)
}

/// Foundry assumed when a term omits it. Only the structure layer has one.
pub fn default_foundry(layer: &str) -> Option<&'static str> {
    match layer {
        "s" => Some("base"),
        _ => None,
    }
}

//! Reader for the tree notation.
//!
//! ```text
//! node  = "(" WORD attr* node* ")"
//! attr  = WORD "=" (WORD | STR | REGEX)
//! ```
//!
//! Attributes and children may interleave. Quoted values are unescaped;
//! regex values keep their slashes so that the literal shape survives.
//! Nesting is handled with an explicit stack.

use rowan::TextRange;

use super::lexer::{Token, TokenKind, lex, range_to_text_range, token_text, unquote};
use super::{NodeKind, ParseNode};
use crate::{Error, Result};

/// Reads one tree of dialect `K` from `source`.
pub fn read<K: NodeKind>(source: &str) -> Result<ParseNode<K>> {
    Reader::new(source).read()
}

struct Reader<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Reader<'src> {
    fn new(source: &'src str) -> Self {
        let tokens = lex(source)
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).copied();
        self.pos += 1;
        token
    }

    fn text(&self, token: &Token) -> &'src str {
        token_text(self.source, token)
    }

    fn end_range(&self) -> TextRange {
        range_to_text_range(self.source.len()..self.source.len())
    }

    fn unexpected(&self, token: Option<Token>) -> Error {
        match token {
            Some(token) => Error::ParseFailure {
                symbol: self.text(&token).to_string(),
                range: token.span,
            },
            None => Error::ParseFailure {
                symbol: "end of input".to_string(),
                range: self.end_range(),
            },
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        match self.bump() {
            Some(token) if token.kind == kind => Ok(token),
            other => Err(self.unexpected(other)),
        }
    }

    fn read<K: NodeKind>(mut self) -> Result<ParseNode<K>> {
        let mut stack: Vec<ParseNode<K>> = Vec::new();
        let mut root = None;

        while let Some(token) = self.bump() {
            match token.kind {
                TokenKind::ParenOpen if root.is_none() => {
                    let name = self.expect(TokenKind::Word)?;
                    let kind = K::from_name(self.text(&name))
                        .ok_or_else(|| self.unexpected(Some(name)))?;
                    stack.push(ParseNode::new(kind, token.span));
                }
                TokenKind::ParenClose => {
                    let Some(mut node) = stack.pop() else {
                        return Err(self.unexpected(Some(token)));
                    };
                    node.set_range(TextRange::new(node.range().start(), token.span.end()));
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(node),
                        None => root = Some(node),
                    }
                }
                TokenKind::Word if !stack.is_empty() => {
                    let name = self.text(&token);
                    self.expect(TokenKind::Equals)?;
                    let value = match self.bump() {
                        Some(v) if v.kind == TokenKind::Str => unquote(self.text(&v)),
                        Some(v) if matches!(v.kind, TokenKind::Word | TokenKind::Regex) => {
                            self.text(&v).to_string()
                        }
                        other => return Err(self.unexpected(other)),
                    };
                    if let Some(node) = stack.last_mut() {
                        node.set_attr(name, value);
                    }
                }
                _ => return Err(self.unexpected(Some(token))),
            }
        }

        if !stack.is_empty() {
            return Err(self.unexpected(None));
        }
        root.ok_or_else(|| self.unexpected(None))
    }
}

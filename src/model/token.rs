//! Lexer token types.

use serde::{Deserialize, Serialize};

/// Kind of a lexer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A literal text run
    Text,
    /// A complete `<table>...</table>` block
    HtmlTable,
}

/// A slice of the source document.
///
/// Concatenating the values of all tokens produced for a document gives
/// back the document unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token<'a> {
    /// What the token holds
    pub kind: TokenKind,

    /// Source text covered by the token
    pub value: &'a str,

    /// Byte offset of `value` in the source document
    pub offset: usize,
}

impl<'a> Token<'a> {
    /// Create a text token.
    pub fn text(value: &'a str, offset: usize) -> Self {
        Self {
            kind: TokenKind::Text,
            value,
            offset,
        }
    }

    /// Create a table token.
    pub fn table(value: &'a str, offset: usize) -> Self {
        Self {
            kind: TokenKind::HtmlTable,
            value,
            offset,
        }
    }

    /// Check if this token is a table block.
    pub fn is_table(&self) -> bool {
        self.kind == TokenKind::HtmlTable
    }
}

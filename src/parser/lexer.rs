//! Splits a Markdown document into text runs and HTML table blocks.

use std::iter::FusedIterator;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::Token;

static TABLE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<table(?:\s[^>]*)?>").expect("BUG: hardcoded table opener regex is valid")
});

static TABLE_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</table\s*>").expect("BUG: hardcoded table closer regex is valid")
});

/// Lazy, single-pass tokenizer over a document.
///
/// A table block runs from `<table>` to the first `</table>` after it.
/// Nested tables are not supported: the inner closing tag ends the block.
/// Adjacent text is merged into a single [`Token`].
///
/// # Example
///
/// ```
/// use tabmark::parser::Lexer;
///
/// let doc = "intro\n<table><tr><td>x</td></tr></table>\noutro";
/// let tokens: Vec<_> = Lexer::new(doc).collect::<tabmark::Result<_>>().unwrap();
/// assert_eq!(tokens.len(), 3);
/// assert!(tokens[1].is_table());
/// ```
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over a whole document.
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            done: false,
        }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.src.len() {
            self.done = true;
            return None;
        }

        let start = self.pos;
        let Some(open) = TABLE_OPEN.find_at(self.src, start) else {
            self.pos = self.src.len();
            return Some(Ok(Token::text(&self.src[start..], start)));
        };

        if open.start() > start {
            self.pos = open.start();
            return Some(Ok(Token::text(&self.src[start..open.start()], start)));
        }

        match TABLE_CLOSE.find_at(self.src, open.end()) {
            Some(close) => {
                self.pos = close.end();
                Some(Ok(Token::table(&self.src[start..close.end()], start)))
            }
            None => {
                self.done = true;
                Some(Err(Error::structural(
                    start,
                    "unterminated <table> block (no closing </table>)",
                )))
            }
        }
    }
}

impl FusedIterator for Lexer<'_> {}

/// Tokenize a whole document eagerly.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>> {
    Lexer::new(src).collect()
}

//! Markdown document tokenization and HTML table parsing.

mod html;
mod lexer;

pub use html::{parse_table, visible_text, MAX_COLSPAN, MAX_ROWSPAN};
pub use lexer::{tokenize, Lexer};

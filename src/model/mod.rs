//! Document model types for table extraction.
//!
//! Tokens are borrowed slices of the source document; tables are the
//! structural view of a single `<table>` block, built once and discarded
//! after rendering.

mod table;
mod token;

pub use table::{ParsedTable, TableCell, TableRow};
pub use token::{Token, TokenKind};

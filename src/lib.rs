//! # tabmark
//!
//! Table extraction and rendering for converter-generated Markdown.
//!
//! Word-to-Markdown converters leave tables behind as raw HTML blocks.
//! This library finds those blocks, renders the simple ones as compact
//! fixed-width text and writes the rest (merged cells, multi-line cells,
//! wide rows) to a spreadsheet workbook, leaving an embed directive in
//! the document where the table was.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tabmark::{convert_str, ConvertOptions};
//!
//! fn main() -> tabmark::Result<()> {
//!     let markdown = std::fs::read_to_string("report.md")?;
//!     let options = ConvertOptions::new().with_workbook_path("assets/report.xlsx");
//!     let result = convert_str(&markdown, &options)?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Inline tables**: small regular tables become plain-text tables
//! - **Spreadsheet tables**: merges, bold cells and fitted column widths
//! - **Unique sheet names**: derived from captions, at most 31 characters
//! - **Parallel batches**: uses Rayon to convert many documents at once
//! - **Cleanup pipeline**: entity, tag and escape normalization

pub mod convert;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod sheet;

// Re-export commonly used types
pub use convert::{convert_file, convert_files, convert_str, ConvertOptions, ConvertResult};
pub use error::{Error, Result};
pub use model::{ParsedTable, TableCell, TableRow, Token, TokenKind};
pub use parser::{parse_table, tokenize, Lexer};
pub use render::{
    classify, CleanupOptions, CleanupPreset, ComplexReason, ConversionStats, RenderOptions,
    TableLayout, TableMode,
};
pub use sheet::{SheetRef, WidthBudget, Workbook};

use std::path::{Path, PathBuf};

/// Builder for converting documents.
///
/// # Example
///
/// ```no_run
/// use tabmark::{CleanupPreset, Tabmark};
///
/// let result = Tabmark::new()
///     .with_cleanup(CleanupPreset::Aggressive)
///     .with_max_inline_row_chars(80)
///     .convert_file("report.md", "out")?;
/// println!("{} sheets", result.stats.sheet_count);
/// # Ok::<(), tabmark::Error>(())
/// ```
pub struct Tabmark {
    options: ConvertOptions,
}

impl Tabmark {
    /// Create a new Tabmark builder.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
        }
    }

    /// Send every table to the workbook.
    pub fn spreadsheet_only(mut self) -> Self {
        self.options.render = self.options.render.with_table_mode(TableMode::Spreadsheet);
        self
    }

    /// Set the inline row length limit.
    pub fn with_max_inline_row_chars(mut self, chars: usize) -> Self {
        self.options.render = self.options.render.with_max_inline_row_chars(chars);
        self
    }

    /// Set the worksheet width budget.
    pub fn with_width_budget(mut self, budget: WidthBudget) -> Self {
        self.options.render = self.options.render.with_width_budget(budget);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.options.render = self.options.render.with_cleanup_preset(preset);
        self
    }

    /// Disable text cleanup.
    pub fn without_cleanup(mut self) -> Self {
        self.options.render = self.options.render.without_cleanup();
        self
    }

    /// Set the workbook path used by [`convert_str`](Self::convert_str).
    pub fn with_workbook_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_workbook_path(path);
        self
    }

    /// Disable parallel batch conversion.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Get the options built so far.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert text held in memory.
    pub fn convert_str(&self, text: &str) -> Result<ConvertResult> {
        convert_str(text, &self.options)
    }

    /// Convert one file into `output_dir`.
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        output_dir: Q,
    ) -> Result<ConvertResult> {
        convert_file(source.as_ref(), output_dir.as_ref(), &self.options)
    }

    /// Convert several files into `output_dir`.
    pub fn convert_files<P>(
        &self,
        sources: &[P],
        output_dir: impl AsRef<Path>,
    ) -> Vec<Result<ConvertResult>>
    where
        P: AsRef<Path> + Sync,
    {
        convert_files(sources, output_dir.as_ref(), &self.options)
    }
}

impl Default for Tabmark {
    fn default() -> Self {
        Self::new()
    }
}

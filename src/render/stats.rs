//! Statistics collected while converting a document.

use serde::{Deserialize, Serialize};

/// Counters for one document conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Table blocks found by the lexer
    pub table_count: u32,

    /// Tables rendered as inline text
    pub inline_table_count: u32,

    /// Tables written to worksheets
    pub sheet_count: u32,

    /// Merge ranges registered across all worksheets
    pub merged_range_count: u32,

    /// Warnings raised by the post-pass
    pub warning_count: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a table rendered inline.
    pub fn add_inline_table(&mut self) {
        self.table_count += 1;
        self.inline_table_count += 1;
    }

    /// Record a table written to a worksheet.
    pub fn add_sheet(&mut self, merged_ranges: usize) {
        self.table_count += 1;
        self.sheet_count += 1;
        self.merged_range_count += merged_ranges as u32;
    }

    /// Record a warning.
    pub fn add_warning(&mut self) {
        self.warning_count += 1;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.table_count += other.table_count;
        self.inline_table_count += other.inline_table_count;
        self.sheet_count += other.sheet_count;
        self.merged_range_count += other.merged_range_count;
        self.warning_count += other.warning_count;
    }
}

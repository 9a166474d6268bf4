//! Rendering options and configuration.

use super::CleanupOptions;
use crate::sheet::WidthBudget;

/// Options for rendering table blocks.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// How table blocks are routed
    pub table_mode: TableMode,

    /// Longest concatenated row text (in characters) still rendered inline
    pub max_inline_row_chars: usize,

    /// Text substituted for empty cells in inline tables
    pub empty_cell_placeholder: String,

    /// Total worksheet width budget and shrink parameters
    pub width_budget: WidthBudget,

    /// Extra width added to every fitted column
    pub column_slack: f64,

    /// Text cleanup applied before table extraction
    pub cleanup: Option<CleanupOptions>,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table mode.
    pub fn with_table_mode(mut self, mode: TableMode) -> Self {
        self.table_mode = mode;
        self
    }

    /// Set the inline row length limit.
    pub fn with_max_inline_row_chars(mut self, chars: usize) -> Self {
        self.max_inline_row_chars = chars;
        self
    }

    /// Set the empty cell placeholder.
    pub fn with_empty_cell_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.empty_cell_placeholder = placeholder.into();
        self
    }

    /// Set the worksheet width budget.
    pub fn with_width_budget(mut self, budget: WidthBudget) -> Self {
        self.width_budget = budget;
        self
    }

    /// Set the per-column slack.
    pub fn with_column_slack(mut self, slack: f64) -> Self {
        self.column_slack = slack.max(0.0);
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = Some(cleanup);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: super::CleanupPreset) -> Self {
        self.cleanup = Some(CleanupOptions::from_preset(preset));
        self
    }

    /// Disable text cleanup.
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup = None;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            table_mode: TableMode::Auto,
            max_inline_row_chars: 100,
            empty_cell_placeholder: "&nbsp;".to_string(),
            width_budget: WidthBudget::default(),
            column_slack: 1.0,
            cleanup: Some(CleanupOptions::standard()),
        }
    }
}

/// How table blocks are routed between the inline and spreadsheet paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    /// Render simple tables inline, everything else to the workbook
    #[default]
    Auto,
    /// Send every table to the workbook
    Spreadsheet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_table_mode(TableMode::Spreadsheet)
            .with_max_inline_row_chars(40)
            .with_column_slack(-3.0)
            .without_cleanup();

        assert_eq!(options.table_mode, TableMode::Spreadsheet);
        assert_eq!(options.max_inline_row_chars, 40);
        assert_eq!(options.column_slack, 0.0);
        assert!(options.cleanup.is_none());
    }

    #[test]
    fn test_render_options_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.table_mode, TableMode::Auto);
        assert_eq!(options.max_inline_row_chars, 100);
        assert_eq!(options.empty_cell_placeholder, "&nbsp;");
        assert_eq!(options.width_budget.total, 190.0);
        assert!(options.cleanup.is_some());
    }
}

//! Table classification and inline text rendering.
//!
//! Small regular tables read better as plain text than as a reference to
//! an external workbook. A table is rendered inline unless it has a merged
//! cell, a multi-line cell, or a row whose text is too long; those go to
//! the spreadsheet path instead.

use std::fmt;

use crate::model::{ParsedTable, TableRow};

use super::{RenderOptions, TableMode};

/// Column separator for inline tables.
const COLUMN_GAP: &str = "  ";

/// Minimum padding between a header and its column edge.
const HEADER_PADDING: usize = 2;

/// Where a table ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLayout {
    /// Rendered text to place directly in the document
    Inline(String),
    /// The table needs a worksheet
    Complex(ComplexReason),
}

impl TableLayout {
    /// Check if the table is rendered inline.
    pub fn is_inline(&self) -> bool {
        matches!(self, TableLayout::Inline(_))
    }
}

/// Why a table could not be rendered inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexReason {
    /// A cell spans more than one row or column
    MergedCell,
    /// A cell holds more than one line of text
    MultilineCell,
    /// A row's text is longer than the inline limit
    RowTooLong {
        /// Characters in the offending row
        chars: usize,
    },
    /// Inline rendering is disabled
    Forced,
}

impl fmt::Display for ComplexReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexReason::MergedCell => write!(f, "merged cell"),
            ComplexReason::MultilineCell => write!(f, "multi-line cell"),
            ComplexReason::RowTooLong { chars } => write!(f, "row of {} characters", chars),
            ComplexReason::Forced => write!(f, "spreadsheet mode"),
        }
    }
}

/// Decide how a table is rendered, producing the inline text when possible.
pub fn classify(table: &ParsedTable, options: &RenderOptions) -> TableLayout {
    if options.table_mode == TableMode::Spreadsheet {
        return TableLayout::Complex(ComplexReason::Forced);
    }

    let mut rows: Vec<(bool, Vec<String>)> = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        match inline_row(row, options) {
            Ok(cells) => rows.push((row.is_header, cells)),
            Err(reason) => return TableLayout::Complex(reason),
        }
    }

    // The last header row heads the table; earlier ones stay as body rows.
    let header_index = rows.iter().rposition(|(is_header, _)| *is_header);
    let mut header = None;
    let mut body = Vec::with_capacity(rows.len());
    for (i, (_, cells)) in rows.into_iter().enumerate() {
        if Some(i) == header_index {
            header = Some(cells);
        } else {
            body.push(cells);
        }
    }

    let mut text = render_text_table(header.as_deref(), &body);
    if let Some(ref caption) = table.caption {
        text = format!("{}\n\nTable: {}\n", text.trim_end(), caption);
    }
    TableLayout::Inline(text)
}

/// Prepare one row for inline rendering, or say why it can't be.
fn inline_row(row: &TableRow, options: &RenderOptions) -> Result<Vec<String>, ComplexReason> {
    let mut cells = Vec::with_capacity(row.cells.len());
    let mut row_chars = 0;

    for cell in &row.cells {
        if cell.is_merged() {
            return Err(ComplexReason::MergedCell);
        }
        let text = cell.trimmed();
        if text.contains('\n') {
            return Err(ComplexReason::MultilineCell);
        }
        row_chars += text.chars().count();

        if text.is_empty() {
            cells.push(options.empty_cell_placeholder.clone());
        } else {
            cells.push(text.replace('<', "&lt;"));
        }
    }

    if row_chars > options.max_inline_row_chars {
        return Err(ComplexReason::RowTooLong { chars: row_chars });
    }
    Ok(cells)
}

/// Render rows as a fixed-width text table.
///
/// With a header the layout is header line, dashed divider, body rows.
/// Without one the body is framed by dashed lines above and below.
/// Columns whose body values are all numbers are right-aligned.
pub fn render_text_table(header: Option<&[String]>, rows: &[Vec<String>]) -> String {
    let col_count = rows
        .iter()
        .map(Vec::len)
        .chain(header.map(<[String]>::len))
        .max()
        .unwrap_or(0);
    if col_count == 0 {
        return String::new();
    }

    let mut widths = vec![0usize; col_count];
    let mut numeric = vec![!rows.is_empty(); col_count];
    for row in rows {
        for (i, width) in widths.iter_mut().enumerate() {
            let value = cell_at(row, i);
            *width = (*width).max(value.chars().count());
            numeric[i] &= is_number(value);
        }
    }
    if let Some(header) = header {
        for (i, width) in widths.iter_mut().enumerate() {
            *width = (*width).max(cell_at(header, i).chars().count() + HEADER_PADDING);
        }
    }

    let format_line = |row: &[String]| -> String {
        let line = (0..col_count)
            .map(|i| pad(cell_at(row, i), widths[i], numeric[i]))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        line.trim_end().to_string()
    };
    let divider = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);

    let mut lines = Vec::with_capacity(rows.len() + 2);
    match header {
        Some(header) => {
            lines.push(format_line(header));
            lines.push(divider);
            lines.extend(rows.iter().map(|r| format_line(r)));
        }
        None => {
            lines.push(divider.clone());
            lines.extend(rows.iter().map(|r| format_line(r)));
            lines.push(divider);
        }
    }
    lines.join("\n")
}

fn pad(text: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.chars().count()));
    if right {
        format!("{}{}", fill, text)
    } else {
        format!("{}{}", text, fill)
    }
}

fn cell_at(row: &[String], i: usize) -> &str {
    row.get(i).map(String::as_str).unwrap_or("")
}

fn is_number(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty() && text.parse::<f64>().is_ok()
}

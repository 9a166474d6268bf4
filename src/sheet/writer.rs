//! Spreadsheet table writer.
//!
//! Lays a complex table out on a worksheet. A row's literal cell list
//! omits the cells covered by an earlier row's vertical span, so the
//! writer keeps a grid occupancy set and skips claimed coordinates before
//! placing each cell.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::width::{fit_columns, ColumnWidthMap};
use super::workbook::{CellStyle, Workbook, Worksheet, MAX_COLUMN, MAX_ROW};
use crate::model::{ParsedTable, TableCell};
use crate::render::RenderOptions;

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n)+").expect("BUG: blank line regex is valid"));

static SPLIT_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{2,}\n\*{2,}").expect("BUG: split bold regex is valid"));

/// Reference to a worksheet written for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRef {
    /// Short, unique worksheet name
    pub name: String,

    /// Display caption
    pub full_name: String,

    /// Number of merge ranges on the sheet
    pub merged_ranges: usize,
}

/// Cell text prepared for the worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellContent {
    /// Text without a whole-cell bold wrapper
    pub text: String,

    /// Whether a bold wrapper was stripped
    pub bold: bool,
}

impl CellContent {
    /// Trim, collapse blank lines and extract a whole-cell bold wrapper.
    pub fn from_raw(raw: &str) -> Self {
        let text = BLANK_LINES.replace_all(raw.trim(), "\n");
        bold_to_style(&text)
    }

    /// Character count of the longest line.
    pub fn longest_line(&self) -> usize {
        longest_line(&self.text)
    }
}

/// Turn a whole-cell `**...**` wrapper into a bold flag.
///
/// Markers closing one line and reopening the next (`**a**\n**b**`) are
/// joined first, so a cell bolded line by line still counts as one
/// wrapper. Text with further `**` inside the wrapper is left as is.
pub fn bold_to_style(text: &str) -> CellContent {
    let joined = SPLIT_BOLD.replace_all(text, |caps: &Captures| {
        let (close, open) = caps[0].split_once('\n').unwrap_or((&caps[0], ""));
        let common = close.len().min(open.len());
        format!("{}\n{}", &close[common..], &open[common..])
    });
    let text = joined.trim();

    let bytes = text.as_bytes();
    let run = bytes.iter().take_while(|b| **b == b'*').count();
    for n in (2..=run).rev() {
        if bytes.len() < 2 * n || !bytes[bytes.len() - n..].iter().all(|b| *b == b'*') {
            continue;
        }
        let inner = text[n..text.len() - n].trim_start();
        if inner.contains("**") {
            break;
        }
        return CellContent {
            text: inner.trim_end().to_string(),
            bold: true,
        };
    }

    CellContent {
        text: text.to_string(),
        bold: false,
    }
}

/// Character count of the longest line in `text`.
pub fn longest_line(text: &str) -> usize {
    text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0)
}

/// Write every cell of `table` onto `sheet` and measure column widths.
///
/// Spans are clipped so no coordinate is claimed twice: a rowspan stops
/// at the last row of the table, a colspan stops at the first coordinate
/// already covered by an earlier merge, and a rowspan then stops at the
/// first row where its columns are no longer free.
///
/// Nothing is placed outside the worksheet grid. Spans stop at the last
/// column, and cells or rows that start beyond it are dropped with a
/// warning.
pub fn write_cells(sheet: &mut Worksheet, table: &ParsedTable) -> ColumnWidthMap {
    let mut widths = ColumnWidthMap::new();
    let mut occupied: HashSet<(u32, u32)> = HashSet::new();
    let row_count = u32::try_from(table.rows.len())
        .unwrap_or(u32::MAX)
        .min(MAX_ROW + 1);
    if table.rows.len() > row_count as usize {
        log::warn!(
            "Sheet '{}': {} row(s) beyond the last worksheet row dropped",
            sheet.name(),
            table.rows.len() - row_count as usize
        );
    }

    for (y, row) in (0..row_count).zip(&table.rows) {
        let mut x = 0u32;
        for (i, cell) in row.cells.iter().enumerate() {
            while occupied.contains(&(x, y)) {
                x += 1;
            }
            if x > MAX_COLUMN {
                log::warn!(
                    "Sheet '{}': {} cell(s) in row {} beyond the last worksheet column dropped",
                    sheet.name(),
                    row.cells.len() - i,
                    y
                );
                break;
            }

            let content = CellContent::from_raw(&cell.text);
            let (colspan, rowspan) = clip_span(cell, x, y, row_count, &occupied);

            if colspan + rowspan > 2 {
                sheet.merge_range(
                    y,
                    x,
                    y + rowspan - 1,
                    x + colspan - 1,
                    content.text.as_str(),
                    CellStyle::merged(content.bold),
                );
                for dy in 0..rowspan {
                    for dx in 0..colspan {
                        if dx + dy > 0 {
                            occupied.insert((x + dx, y + dy));
                        }
                    }
                }
                let width = content.longest_line() as f64 / f64::from(colspan);
                for dx in 0..colspan {
                    widths.observe(x + dx, width);
                }
            } else {
                let style = if cell.is_header {
                    CellStyle::Header
                } else {
                    CellStyle::body(content.bold)
                };
                widths.observe(x, content.longest_line() as f64);
                sheet.write(y, x, content.text, style);
            }

            x += colspan;
        }
    }

    widths
}

fn clip_span(
    cell: &TableCell,
    x: u32,
    y: u32,
    row_count: u32,
    occupied: &HashSet<(u32, u32)>,
) -> (u32, u32) {
    let colspan = cell.colspan.max(1).min(MAX_COLUMN - x + 1);
    let colspan = (1..colspan)
        .find(|dx| occupied.contains(&(x + dx, y)))
        .unwrap_or(colspan);
    let rowspan = cell.rowspan.max(1).min(row_count - y);
    let rowspan = (1..rowspan)
        .find(|dy| (0..colspan).any(|dx| occupied.contains(&(x + dx, y + dy))))
        .unwrap_or(rowspan);
    (colspan, rowspan)
}

/// Write a complex table to a new worksheet and size its columns.
pub fn write_table(
    table: &ParsedTable,
    workbook: &mut Workbook,
    options: &RenderOptions,
) -> SheetRef {
    let sheet = workbook.add_worksheet(table.caption.as_deref());
    let measured = write_cells(sheet, table);

    let widths = fit_columns(&measured.to_vec(), &options.width_budget)
        .into_iter()
        .map(|w| w + options.column_slack)
        .collect();
    sheet.set_column_widths(widths);

    log::debug!(
        "Wrote table to sheet '{}' ({} rows, {} columns, {} merges)",
        sheet.name(),
        table.row_count(),
        measured.len(),
        sheet.merges().len()
    );

    SheetRef {
        name: sheet.name().to_string(),
        full_name: sheet.full_name().to_string(),
        merged_ranges: sheet.merges().len(),
    }
}

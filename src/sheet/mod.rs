//! Spreadsheet output for complex tables.
//!
//! A [`Workbook`] is shared by every complex table of one document. Each
//! table gets its own [`Worksheet`], named after its caption, with merged
//! regions, bold styling and fitted column widths.

mod namer;
mod width;
mod workbook;
mod writer;

pub use namer::{sanitize_caption, unique_sheet_name, MAX_SHEET_NAME_LEN};
pub use width::{fit_columns, ColumnWidthMap, WidthBudget};
pub use workbook::{
    CellStyle, CellWrite, MergeRange, Workbook, Worksheet, MAX_CELL_CHARS, MAX_COLUMN, MAX_ROW,
};
pub use writer::{bold_to_style, longest_line, write_cells, write_table, CellContent, SheetRef};

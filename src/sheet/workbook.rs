//! Workbook and worksheet model.
//!
//! Worksheets are built in memory while a document is processed and only
//! written to disk when the workbook is closed. A conversion that fails
//! part-way drops the workbook and leaves no partial file behind.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};

use super::namer::unique_sheet_name;
use crate::error::{Error, Result};

/// Widest column index Excel can address (0-based).
pub const MAX_COLUMN: u32 = 16_383;

/// Widest row index Excel can address (0-based).
pub const MAX_ROW: u32 = 1_048_575;

/// Longest text Excel stores in a single cell, in characters.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Names Excel refuses for worksheets.
const RESERVED_NAMES: &[&str] = &["history"];

/// Named cell format presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    /// Header cell: centered, bold
    Header,
    /// Body cell: left-aligned
    Body,
    /// Body cell with bold text
    BodyBold,
    /// Merged region: centered
    Merged,
    /// Merged region with bold text
    MergedBold,
}

impl CellStyle {
    /// Style for a single body cell.
    pub fn body(bold: bool) -> Self {
        if bold {
            CellStyle::BodyBold
        } else {
            CellStyle::Body
        }
    }

    /// Style for a merged region.
    pub fn merged(bold: bool) -> Self {
        if bold {
            CellStyle::MergedBold
        } else {
            CellStyle::Merged
        }
    }

    /// Check if the style renders bold text.
    pub fn is_bold(self) -> bool {
        matches!(
            self,
            CellStyle::Header | CellStyle::BodyBold | CellStyle::MergedBold
        )
    }

    fn to_format(self) -> Format {
        let align = match self {
            CellStyle::Body | CellStyle::BodyBold => FormatAlign::Left,
            CellStyle::Header | CellStyle::Merged | CellStyle::MergedBold => FormatAlign::Center,
        };
        let format = Format::new()
            .set_align(align)
            .set_border(FormatBorder::Thin)
            .set_text_wrap();
        if self.is_bold() {
            format.set_bold()
        } else {
            format
        }
    }
}

/// Formats shared by every worksheet of a workbook.
struct FormatSet {
    header: Format,
    body: Format,
    body_bold: Format,
    merged: Format,
    merged_bold: Format,
}

impl FormatSet {
    fn new() -> Self {
        Self {
            header: CellStyle::Header.to_format(),
            body: CellStyle::Body.to_format(),
            body_bold: CellStyle::BodyBold.to_format(),
            merged: CellStyle::Merged.to_format(),
            merged_bold: CellStyle::MergedBold.to_format(),
        }
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Header => &self.header,
            CellStyle::Body => &self.body,
            CellStyle::BodyBold => &self.body_bold,
            CellStyle::Merged => &self.merged,
            CellStyle::MergedBold => &self.merged_bold,
        }
    }
}

/// A single cell write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    /// Cell text
    pub text: String,
    /// Cell format preset
    pub style: CellStyle,
}

/// A rectangular merged region; its text lives in the top-left cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRange {
    /// First row (0-based)
    pub first_row: u32,
    /// First column (0-based)
    pub first_col: u32,
    /// Last row, inclusive
    pub last_row: u32,
    /// Last column, inclusive
    pub last_col: u32,
    /// Text shown in the region
    pub text: String,
    /// Format preset
    pub style: CellStyle,
}

impl MergeRange {
    /// Check if the region covers a coordinate.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    /// Number of grid positions covered.
    pub fn cell_count(&self) -> u64 {
        let rows = u64::from(self.last_row - self.first_row + 1);
        let cols = u64::from(self.last_col - self.first_col + 1);
        rows * cols
    }
}

/// One worksheet of a [`Workbook`].
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    full_name: String,
    cells: BTreeMap<(u32, u32), CellWrite>,
    merges: Vec<MergeRange>,
    column_widths: Vec<f64>,
}

impl Worksheet {
    fn new(name: String, full_name: String) -> Self {
        Self {
            name,
            full_name,
            cells: BTreeMap::new(),
            merges: Vec::new(),
            column_widths: Vec::new(),
        }
    }

    /// Short, unique worksheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display caption (not length-limited).
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Write a single cell.
    ///
    /// Text beyond [`MAX_CELL_CHARS`] is cut off.
    pub fn write(&mut self, row: u32, col: u32, text: impl Into<String>, style: CellStyle) {
        debug_assert!(!self.is_claimed(row, col), "cell ({row}, {col}) written twice");
        self.cells.insert(
            (row, col),
            CellWrite {
                text: cell_text(text.into(), row, col),
                style,
            },
        );
    }

    /// Register a merged region spanning `first..=last` in both directions.
    pub fn merge_range(
        &mut self,
        first_row: u32,
        first_col: u32,
        last_row: u32,
        last_col: u32,
        text: impl Into<String>,
        style: CellStyle,
    ) {
        let range = MergeRange {
            first_row,
            first_col,
            last_row,
            last_col,
            text: cell_text(text.into(), first_row, first_col),
            style,
        };
        debug_assert!(
            !self.merges.iter().any(|m| overlaps(m, &range)),
            "merge range overlaps an earlier one"
        );
        self.merges.push(range);
    }

    /// Check if a coordinate already holds a write or lies in a merge.
    pub fn is_claimed(&self, row: u32, col: u32) -> bool {
        self.cells.contains_key(&(row, col)) || self.merges.iter().any(|m| m.contains(row, col))
    }

    /// Get a directly written cell.
    pub fn cell(&self, row: u32, col: u32) -> Option<&CellWrite> {
        self.cells.get(&(row, col))
    }

    /// Iterate over direct writes in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ((u32, u32), &CellWrite)> {
        self.cells.iter().map(|(pos, cell)| (*pos, cell))
    }

    /// Registered merge ranges.
    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    /// Set the final column widths.
    pub fn set_column_widths(&mut self, widths: Vec<f64>) {
        self.column_widths = widths;
    }

    /// Final column widths, starting at column 0.
    pub fn column_widths(&self) -> &[f64] {
        &self.column_widths
    }

    fn to_xlsx(&self, formats: &FormatSet) -> Result<rust_xlsxwriter::Worksheet> {
        let mut sheet = rust_xlsxwriter::Worksheet::new();
        sheet.set_name(&self.name)?;

        for ((row, col), cell) in &self.cells {
            let (row, col) = grid_position(*row, *col)?;
            sheet.write_string_with_format(row, col, cell.text.as_str(), formats.get(cell.style))?;
        }

        for m in &self.merges {
            let (first_row, first_col) = grid_position(m.first_row, m.first_col)?;
            let (last_row, last_col) = grid_position(m.last_row, m.last_col)?;
            sheet.merge_range(
                first_row,
                first_col,
                last_row,
                last_col,
                &m.text,
                formats.get(m.style),
            )?;
        }

        for (col, width) in self.column_widths.iter().enumerate() {
            let (_, col) = grid_position(0, col as u32)?;
            sheet.set_column_width(col, *width)?;
        }

        Ok(sheet)
    }
}

fn overlaps(a: &MergeRange, b: &MergeRange) -> bool {
    a.first_row <= b.last_row
        && b.first_row <= a.last_row
        && a.first_col <= b.last_col
        && b.first_col <= a.last_col
}

fn cell_text(mut text: String, row: u32, col: u32) -> String {
    if let Some((cut, _)) = text.char_indices().nth(MAX_CELL_CHARS) {
        log::warn!(
            "Cell ({}, {}) holds {} characters; truncated to {}",
            row,
            col,
            text.chars().count(),
            MAX_CELL_CHARS
        );
        text.truncate(cut);
    }
    text
}

fn grid_position(row: u32, col: u32) -> Result<(u32, u16)> {
    if row > MAX_ROW || col > MAX_COLUMN {
        return Err(Error::InvalidInput(format!(
            "cell ({}, {}) is outside the worksheet grid",
            row, col
        )));
    }
    Ok((row, col as u16))
}

/// Document-scoped workbook shared by every complex table.
pub struct Workbook {
    path: PathBuf,
    used_names: HashSet<String>,
    sheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create an empty workbook that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            used_names: RESERVED_NAMES.iter().map(|n| n.to_string()).collect(),
            sheets: Vec::new(),
        }
    }

    /// Where the workbook is saved on close.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a worksheet, named after `caption` when there is one.
    ///
    /// Tables without a usable caption get the next free `SheetN` name,
    /// which also serves as their display caption.
    pub fn add_worksheet(&mut self, caption: Option<&str>) -> &mut Worksheet {
        let caption = caption.map(str::trim).filter(|c| !c.is_empty());
        let name = caption
            .and_then(|c| unique_sheet_name(c, &mut self.used_names))
            .unwrap_or_else(|| self.next_default_name());
        let full_name = caption.map(str::to_string).unwrap_or_else(|| name.clone());

        self.sheets.push(Worksheet::new(name, full_name));
        let index = self.sheets.len() - 1;
        &mut self.sheets[index]
    }

    fn next_default_name(&mut self) -> String {
        let mut n = self.sheets.len() + 1;
        loop {
            let name = format!("Sheet{}", n);
            if self.used_names.insert(name.to_lowercase()) {
                return name;
            }
            n += 1;
        }
    }

    /// Worksheets in creation order.
    pub fn worksheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    /// Look up a worksheet by name (case-insensitive).
    pub fn worksheet(&self, name: &str) -> Option<&Worksheet> {
        let name = name.to_lowercase();
        self.sheets.iter().find(|s| s.name.to_lowercase() == name)
    }

    /// Check if a name is already taken (case-insensitive).
    pub fn is_name_used(&self, name: &str) -> bool {
        self.used_names.contains(&name.to_lowercase())
    }

    /// Build the spreadsheet without saving it.
    pub fn to_xlsx(&self) -> Result<rust_xlsxwriter::Workbook> {
        let formats = FormatSet::new();
        let mut workbook = rust_xlsxwriter::Workbook::new();
        for sheet in &self.sheets {
            workbook.push_worksheet(sheet.to_xlsx(&formats)?);
        }
        Ok(workbook)
    }

    /// Save every worksheet and consume the workbook.
    pub fn close(self) -> Result<PathBuf> {
        let mut workbook = self.to_xlsx()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        workbook.save(&self.path)?;
        log::info!(
            "Saved {} worksheet(s) to {}",
            self.sheets.len(),
            self.path.display()
        );
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let mut wb = Workbook::new("out.xlsx");
        assert_eq!(wb.add_worksheet(None).name(), "Sheet1");
        assert_eq!(wb.add_worksheet(Some("Data")).name(), "Data");
        let sheet = wb.add_worksheet(None);
        assert_eq!(sheet.name(), "Sheet3");
        assert_eq!(sheet.full_name(), "Sheet3");
    }

    #[test]
    fn test_caption_cannot_take_default_name() {
        let mut wb = Workbook::new("out.xlsx");
        wb.add_worksheet(None);
        assert_eq!(wb.add_worksheet(Some("sheet1")).name(), "sheet1_1");
    }

    #[test]
    fn test_default_name_skips_caption_name() {
        let mut wb = Workbook::new("out.xlsx");
        wb.add_worksheet(Some("Sheet2"));
        assert_eq!(wb.add_worksheet(None).name(), "Sheet3");
    }

    #[test]
    fn test_full_name_keeps_caption() {
        let mut wb = Workbook::new("out.xlsx");
        let caption = "Table 7: Power \"typical\" values, measured at 25C over the full range";
        let sheet = wb.add_worksheet(Some(caption));
        assert_eq!(sheet.full_name(), caption);
        assert!(sheet.name().chars().count() <= 31);
    }

    #[test]
    fn test_reserved_name() {
        let mut wb = Workbook::new("out.xlsx");
        assert_eq!(wb.add_worksheet(Some("History")).name(), "History_1");
    }

    #[test]
    fn test_unusable_caption_gets_default_name() {
        let mut wb = Workbook::new("out.xlsx");
        let sheet = wb.add_worksheet(Some("???"));
        assert_eq!(sheet.name(), "Sheet1");
        assert_eq!(sheet.full_name(), "???");
    }

    #[test]
    fn test_claims() {
        let mut wb = Workbook::new("out.xlsx");
        let sheet = wb.add_worksheet(None);
        sheet.write(0, 0, "a", CellStyle::Header);
        sheet.merge_range(1, 0, 2, 1, "m", CellStyle::Merged);

        assert!(sheet.is_claimed(0, 0));
        assert!(sheet.is_claimed(2, 1));
        assert!(!sheet.is_claimed(0, 1));
        assert_eq!(sheet.merges()[0].cell_count(), 4);
        assert_eq!(sheet.cell(0, 0).unwrap().style, CellStyle::Header);
    }

    #[test]
    fn test_long_text_truncated() {
        let mut wb = Workbook::new("out.xlsx");
        let sheet = wb.add_worksheet(None);
        sheet.write(0, 0, "é".repeat(MAX_CELL_CHARS + 10), CellStyle::Body);
        sheet.merge_range(1, 0, 1, 1, "x".repeat(40_000), CellStyle::Merged);
        sheet.write(2, 0, "x".repeat(MAX_CELL_CHARS), CellStyle::Body);

        assert_eq!(sheet.cell(0, 0).unwrap().text.chars().count(), MAX_CELL_CHARS);
        assert_eq!(sheet.merges()[0].text.len(), MAX_CELL_CHARS);
        assert_eq!(sheet.cell(2, 0).unwrap().text.len(), MAX_CELL_CHARS);
        assert!(wb.to_xlsx().is_ok());
    }

    #[test]
    fn test_style_presets() {
        assert_eq!(CellStyle::body(true), CellStyle::BodyBold);
        assert_eq!(CellStyle::merged(false), CellStyle::Merged);
        assert!(CellStyle::Header.is_bold());
        assert!(!CellStyle::Body.is_bold());
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let mut wb = Workbook::new("out.xlsx");
        wb.add_worksheet(Some("Results"));
        assert!(wb.worksheet("RESULTS").is_some());
        assert!(wb.is_name_used("results"));
        assert!(!wb.is_name_used("other"));
    }
}

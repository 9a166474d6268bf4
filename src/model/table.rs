//! Table types.

use serde::{Deserialize, Serialize};

/// Structural view of one HTML table block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedTable {
    /// Rows in source order
    pub rows: Vec<TableRow>,

    /// Table caption (trimmed text of the `<caption>` element)
    pub caption: Option<String>,
}

impl ParsedTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the caption and return self.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get header rows.
    pub fn header_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| r.is_header)
    }

    /// Get body rows (non-header).
    pub fn body_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| !r.is_header)
    }

    /// Check if the table has complex structure (merged cells).
    pub fn has_merged_cells(&self) -> bool {
        self.cells().any(TableCell::is_merged)
    }

    /// Iterate over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.rows.iter().flat_map(|r| &r.cells)
    }
}

/// A table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    /// Cells in the row, as serialized (cells covered by a rowspan are absent)
    pub cells: Vec<TableCell>,

    /// Whether this is a header row
    pub is_header: bool,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            cells,
            is_header: false,
        }
    }

    /// Create a header row.
    pub fn header(cells: Vec<TableCell>) -> Self {
        let cells = cells
            .into_iter()
            .map(|mut c| {
                c.is_header = true;
                c
            })
            .collect();
        Self {
            cells,
            is_header: true,
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Create a header row from text values.
    pub fn header_from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::header(values.into_iter().map(TableCell::text).collect())
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    /// Raw cell text; may still carry bold markers
    pub text: String,

    /// Number of columns this cell spans (at least 1)
    pub colspan: u32,

    /// Number of rows this cell spans (at least 1)
    pub rowspan: u32,

    /// Whether the cell came from a `<th>` element
    pub is_header: bool,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colspan: 1,
            rowspan: 1,
            is_header: false,
        }
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::text("")
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: u32) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: u32) -> Self {
        self.rowspan = span.max(1);
        self
    }

    /// Mark the cell as a header cell and return self.
    pub fn as_header(mut self) -> Self {
        self.is_header = true;
        self
    }

    /// Get the trimmed text.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.rowspan + self.colspan > 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = ParsedTable::new();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert!(table.caption.is_none());
    }

    #[test]
    fn test_table_with_data() {
        let mut table = ParsedTable::new().with_caption("People");
        table.add_row(TableRow::header_from_strings(["Name", "Age"]));
        table.add_row(TableRow::from_strings(["Alice", "30"]));
        table.add_row(TableRow::from_strings(["Bob", "25"]));

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.header_rows().count(), 1);
        assert_eq!(table.body_rows().count(), 2);
        assert!(table.rows[0].cells.iter().all(|c| c.is_header));
        assert_eq!(table.caption.as_deref(), Some("People"));
    }

    #[test]
    fn test_merged_cells() {
        let mut table = ParsedTable::new();
        table.add_row(TableRow::new(vec![TableCell::text("Merged").colspan(2)]));

        assert!(table.has_merged_cells());
    }

    #[test]
    fn test_span_never_zero() {
        let cell = TableCell::text("x").colspan(0).rowspan(0);
        assert_eq!(cell.colspan, 1);
        assert_eq!(cell.rowspan, 1);
        assert!(!cell.is_merged());
    }

    #[test]
    fn test_cell_text() {
        let cell = TableCell::text("  Hello \n");
        assert_eq!(cell.trimmed(), "Hello");
        assert!(!cell.is_empty());
        assert!(TableCell::empty().is_empty());
    }
}

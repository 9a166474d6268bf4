//! HTML table block parsing.
//!
//! Turns the raw markup of one `<table>` token into a [`ParsedTable`].
//! Only `tr`, `th`, `td` and `caption` carry meaning; everything else in a
//! cell contributes its text content.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::model::{ParsedTable, TableCell, TableRow};

static TR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("tr").expect("BUG: hardcoded selector 'tr' is statically valid")
});

static CAPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("caption").expect("BUG: hardcoded selector 'caption' is statically valid")
});

/// Upper bound for `colspan`, as in the HTML table model.
pub const MAX_COLSPAN: u32 = 1000;

/// Upper bound for `rowspan`, as in the HTML table model.
pub const MAX_ROWSPAN: u32 = 65534;

/// Elements whose text never reaches the output.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "template"];

/// Parse one table block.
///
/// Rows without any `td`/`th` children are skipped. A row made only of
/// `th` cells is a header row. Missing or malformed span attributes
/// default to 1.
pub fn parse_table(html: &str) -> ParsedTable {
    let fragment = Html::parse_fragment(html);
    let mut table = ParsedTable::new();

    table.caption = fragment
        .select(&CAPTION_SELECTOR)
        .next()
        .map(|caption| visible_text(caption).trim().to_string())
        .filter(|caption| !caption.is_empty());

    for row in fragment.select(&TR_SELECTOR) {
        let cells: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| matches!(e.value().name(), "td" | "th"))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let is_header = cells.iter().all(|c| c.value().name() == "th");
        let cells: Vec<TableCell> = cells.into_iter().map(parse_cell).collect();
        table.add_row(TableRow { cells, is_header });
    }

    table
}

fn parse_cell(cell: ElementRef) -> TableCell {
    let element = cell.value();
    TableCell {
        text: visible_text(cell),
        colspan: parse_span(element.attr("colspan"), MAX_COLSPAN),
        rowspan: parse_span(element.attr("rowspan"), MAX_ROWSPAN),
        is_header: element.name() == "th",
    }
}

/// Concatenated text of an element, skipping script-like content.
///
/// Cells sometimes embed scripts written for other renderers (obfuscated
/// mailto links and the like); only their `noscript` fallback is kept.
pub fn visible_text(element: ElementRef) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(fragment);
        }
    }
    text
}

/// Parse a span attribute, taking its leading digits.
fn parse_span(value: Option<&str>, max: u32) -> u32 {
    let digits: String = value
        .unwrap_or("")
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u32>().unwrap_or(1).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let table = parse_table(
            "<table>\n<tr><th>Name</th><th>Age</th></tr>\n<tr><td>Alice</td><td>30</td></tr>\n</table>",
        );
        assert_eq!(table.row_count(), 2);
        assert!(table.rows[0].is_header);
        assert!(!table.rows[1].is_header);
        assert_eq!(table.rows[1].cells[0].text, "Alice");
        assert!(table.caption.is_none());
    }

    #[test]
    fn test_parse_caption() {
        let table =
            parse_table("<table><caption>\n Results <br> 2024 </caption><tr><td>x</td></tr></table>");
        assert_eq!(table.caption.as_deref(), Some("Results  2024"));
    }

    #[test]
    fn test_empty_caption_is_none() {
        let table = parse_table("<table><caption>  </caption><tr><td>x</td></tr></table>");
        assert!(table.caption.is_none());
    }

    #[test]
    fn test_parse_spans() {
        let table = parse_table(
            "<table><tr><td colspan=\"2\" rowspan=\"3\">m</td><td colspan=\"x\">a</td><td rowspan=\"0\">b</td><td colspan=\"4px\">c</td></tr></table>",
        );
        let cells = &table.rows[0].cells;
        assert_eq!((cells[0].colspan, cells[0].rowspan), (2, 3));
        assert_eq!(cells[1].colspan, 1);
        assert_eq!(cells[2].rowspan, 1);
        assert_eq!(cells[3].colspan, 4);
    }

    #[test]
    fn test_span_clamped() {
        assert_eq!(parse_span(Some("5000"), MAX_COLSPAN), MAX_COLSPAN);
        assert_eq!(parse_span(None, MAX_COLSPAN), 1);
        assert_eq!(parse_span(Some(" 7 "), MAX_ROWSPAN), 7);
    }

    #[test]
    fn test_script_removed() {
        let table = parse_table(
            "<table><tr><td><script type=\"text/javascript\">document.write('x');</script>kept</td></tr></table>",
        );
        assert_eq!(table.rows[0].cells[0].text, "kept");
    }

    #[test]
    fn test_mixed_row_is_body() {
        let table = parse_table("<table><tr><th>k</th><td>v</td></tr></table>");
        assert!(!table.rows[0].is_header);
        assert!(table.rows[0].cells[0].is_header);
        assert!(!table.rows[0].cells[1].is_header);
    }

    #[test]
    fn test_rows_without_cells_skipped() {
        let table = parse_table("<table><tr></tr><tr><td>x</td></tr></table>");
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_entities_decoded() {
        let table = parse_table("<table><tr><td>a &lt; b &amp; c</td></tr></table>");
        assert_eq!(table.rows[0].cells[0].text, "a < b & c");
    }
}

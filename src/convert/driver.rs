//! Pipeline driver: lexes a document, routes each table and reassembles
//! the output text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::{ConvertOptions, ConvertResult};
use crate::error::Result;
use crate::model::TokenKind;
use crate::parser::{parse_table, Lexer};
use crate::render::{classify, CleanupPipeline, ConversionStats, TableLayout};
use crate::sheet::{write_table, SheetRef, Workbook};

static UNCONVERTED_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^.*\(media/.*\.png\).*$").expect("BUG: image reference regex is valid")
});

/// Convert a document held in memory.
///
/// Text runs are copied verbatim. Simple tables are replaced by their
/// inline rendering; complex tables are written to the workbook at
/// [`ConvertOptions::workbook_path`] and replaced by an embed directive.
/// The workbook is created on the first complex table and saved once at
/// the end. On a structural error nothing is saved.
///
/// # Example
///
/// ```
/// use tabmark::{convert_str, ConvertOptions};
///
/// let doc = "<table><tr><th>A</th><th>B</th></tr><tr><td>1</td><td>2</td></tr></table>";
/// let result = convert_str(doc, &ConvertOptions::default())?;
/// assert!(result.workbook.is_none());
/// assert!(result.content.contains("A    B"));
/// # Ok::<(), tabmark::Error>(())
/// ```
pub fn convert_str(text: &str, options: &ConvertOptions) -> Result<ConvertResult> {
    let source: Cow<str> = match &options.render.cleanup {
        Some(cleanup) => Cow::Owned(CleanupPipeline::new(cleanup.clone()).process(text)),
        None => Cow::Borrowed(text),
    };

    let mut pipeline = TablePipeline::new(options, source.len());
    for token in Lexer::new(&source) {
        let token = token?;
        match token.kind {
            TokenKind::Text => pipeline.push_text(token.value),
            TokenKind::HtmlTable => pipeline.push_table(token.value, token.offset),
        }
    }
    pipeline.finish()
}

/// Fenced directive that points a downstream renderer at a worksheet.
pub fn embed_directive(workbook_ref: &str, sheet: &SheetRef) -> String {
    format!(
        "\n```xls(\"{}\", \"{}\", \"{}\")\n```\n\n",
        workbook_ref,
        sheet.name,
        sheet.full_name.replace('"', "'")
    )
}

/// Lines still pointing at unconverted `media/*.png` images.
pub fn unconverted_images(text: &str) -> Vec<String> {
    UNCONVERTED_IMAGE
        .find_iter(text)
        .map(|m| format!("not converted image: {}", m.as_str().trim()))
        .collect()
}

struct TablePipeline<'o> {
    options: &'o ConvertOptions,
    workbook_ref: String,
    workbook: Option<Workbook>,
    content: String,
    sheets: Vec<SheetRef>,
    stats: ConversionStats,
}

impl<'o> TablePipeline<'o> {
    fn new(options: &'o ConvertOptions, capacity: usize) -> Self {
        Self {
            options,
            workbook_ref: options.workbook_ref(),
            workbook: None,
            content: String::with_capacity(capacity),
            sheets: Vec::new(),
            stats: ConversionStats::new(),
        }
    }

    fn push_text(&mut self, text: &str) {
        self.content.push_str(text);
    }

    fn push_table(&mut self, html: &str, offset: usize) {
        let table = parse_table(html);
        match classify(&table, &self.options.render) {
            TableLayout::Inline(text) => {
                log::debug!("Table at byte {} rendered inline", offset);
                self.stats.add_inline_table();
                self.content.push('\n');
                self.content.push_str(&text);
                self.content.push('\n');
            }
            TableLayout::Complex(reason) => {
                log::debug!("Table at byte {} sent to a worksheet ({})", offset, reason);
                let path = &self.options.workbook_path;
                let workbook = self.workbook.get_or_insert_with(|| {
                    log::info!("Converting tables to {}", path.display());
                    Workbook::new(path.clone())
                });
                let sheet = write_table(&table, workbook, &self.options.render);
                self.stats.add_sheet(sheet.merged_ranges);
                self.content
                    .push_str(&embed_directive(&self.workbook_ref, &sheet));
                self.sheets.push(sheet);
            }
        }
    }

    fn finish(mut self) -> Result<ConvertResult> {
        let workbook = self.workbook.map(Workbook::close).transpose()?;

        let warnings = unconverted_images(&self.content);
        for warning in &warnings {
            log::warn!("{}", warning);
            self.stats.add_warning();
        }

        Ok(ConvertResult {
            content: self.content,
            workbook,
            sheets: self.sheets,
            stats: self.stats,
            warnings,
            output: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options_in(dir: &std::path::Path) -> ConvertOptions {
        ConvertOptions::new()
            .with_workbook_path(dir.join("assets").join("doc.xlsx"))
            .with_workbook_ref("assets/doc.xlsx")
    }

    #[test]
    fn test_text_only_document() {
        let dir = tempfile::tempdir().unwrap();
        let result = convert_str("# Title\n\nNo tables here.\n", &options_in(dir.path())).unwrap();
        assert_eq!(result.content, "# Title\n\nNo tables here.\n");
        assert!(result.workbook.is_none());
        assert_eq!(result.stats.table_count, 0);
        assert!(!dir.path().join("assets").exists());
    }

    #[test]
    fn test_inline_table_wrapped_in_newlines() {
        let dir = tempfile::tempdir().unwrap();
        let doc = "before<table><tr><td>a</td><td>b</td></tr></table>after";
        let result = convert_str(doc, &options_in(dir.path())).unwrap();
        assert_eq!(result.content, "before\n-  -\na  b\n-  -\nafter");
        assert_eq!(result.stats.inline_table_count, 1);
    }

    #[test]
    fn test_complex_table_directive() {
        let dir = tempfile::tempdir().unwrap();
        let doc = "x\n<table><caption>Say \"hi\"</caption>\
                   <tr><td colspan=\"2\">wide</td></tr><tr><td>1</td><td>2</td></tr></table>\ny";
        let result = convert_str(doc, &options_in(dir.path())).unwrap();

        assert_eq!(
            result.content,
            "x\n\n```xls(\"assets/doc.xlsx\", \"Say hi\", \"Say 'hi'\")\n```\n\n\ny"
        );
        assert_eq!(result.sheets.len(), 1);
        assert_eq!(result.stats.merged_range_count, 1);
        let path = result.workbook.unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unterminated_table_saves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let doc = "<table><tr><td colspan=\"2\">x</td></tr></table><table><tr>";
        let err = convert_str(doc, &options_in(dir.path())).unwrap_err();
        assert!(err.is_structural());
        assert!(!dir.path().join("assets").join("doc.xlsx").exists());
    }

    #[test]
    fn test_unconverted_image_warning() {
        let dir = tempfile::tempdir().unwrap();
        let doc = "ok\n![fig](media/image1.png){width=\"2in\"}\n";
        let result = convert_str(doc, &options_in(dir.path())).unwrap();
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("media/image1.png"));
        assert_eq!(result.stats.warning_count, 1);
    }

    #[test]
    fn test_cleanup_runs_before_tables() {
        let dir = tempfile::tempdir().unwrap();
        let doc = "<table><tr><td>a&#8211;b</td><td>c\\_d</td></tr></table>";
        let result = convert_str(doc, &options_in(dir.path())).unwrap();
        assert!(result.content.contains("a-b"));
        assert!(result.content.contains("c_d"));
    }
}

//! Text cleanup pipeline for converter-generated Markdown.
//!
//! Word-to-Markdown converters leave numeric entities, empty spans and
//! needless backslash escapes behind. These passes run before table
//! extraction so table cells see the cleaned text too.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use unicode_normalization::UnicodeNormalization;

/// Numeric entities replaced with their plain-text equivalents.
const ENTITY_MAP: &[(&str, &str)] = &[
    ("&#160;", " "),      // no-break space
    ("&#169;", "&copy;"), // copyright sign
    ("&#174;", "&reg;"),  // registered sign
    ("&#8216;", "'"),
    ("&#8217;", "'"),
    ("&#8209;", "-"), // non-breaking hyphen
    ("&#8211;", "-"), // en dash
    ("&#8220;", "\""),
    ("&#8221;", "\""),
    ("&#8230;", "..."),
    ("\r\n", "\n"),
];

static EMPTY_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<span[^>]*>\s*</span>").expect("BUG: empty span regex is valid")
});

static EMPTY_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--\s*-->").expect("BUG: empty comment regex is valid"));

static FORMULA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$.*?\$\$").expect("BUG: formula regex is valid"));

static ESCAPED_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)\\_").expect("BUG: escaped underscore regex is valid"));

static ESCAPED_INDEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\\[(\d+:\d+)\\\]").expect("BUG: escaped index regex is valid")
});

static EMPTY_ORDERED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\.\s*$").expect("BUG: list item regex is valid"));

static EMPTY_BULLET_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^-\s*$").expect("BUG: bullet item regex is valid"));

static EMPTY_SIMPLE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ms)^\s*\n(?:\s+-+)+\n\s*\n(?:\s+-+)+\n\s*$")
        .expect("BUG: empty table regex is valid")
});

static TRAILING_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)\s+\n").expect("BUG: trailing space regex is valid"));

static EXTRA_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("BUG: newline regex is valid"));

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupPreset {
    /// Minimal cleanup: entity and line-ending normalization only
    Minimal,
    /// Standard cleanup: entities + empty tags + backslash escapes
    #[default]
    Standard,
    /// Aggressive cleanup: everything, plus Markdown tidying and NFC
    Aggressive,
}

/// Options for text cleanup.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Replace numeric typographic entities and normalize CRLF
    pub normalize_entities: bool,

    /// Remove empty `<span>` elements and empty comments
    pub strip_empty_tags: bool,

    /// Drop backslash escapes the Markdown compiler doesn't need
    pub unescape_backslashes: bool,

    /// Remove empty list items and bogus tables, collapse blank lines
    pub tidy_markdown: bool,

    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_entities: true,
            strip_empty_tags: false,
            unescape_backslashes: false,
            tidy_markdown: false,
            normalize_unicode: false,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            normalize_entities: true,
            strip_empty_tags: true,
            unescape_backslashes: true,
            tidy_markdown: false,
            normalize_unicode: false,
        }
    }

    /// Aggressive cleanup options.
    pub fn aggressive() -> Self {
        Self {
            normalize_entities: true,
            strip_empty_tags: true,
            unescape_backslashes: true,
            tidy_markdown: true,
            normalize_unicode: true,
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text cleanup pipeline.
pub struct CleanupPipeline {
    options: CleanupOptions,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Self {
        Self { options }
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Process text through the cleanup pipeline.
    pub fn process(&self, text: &str) -> String {
        let mut result = text.to_string();

        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        if self.options.normalize_entities {
            result = normalize_entities(&result);
        }

        if self.options.strip_empty_tags {
            result = strip_empty_tags(&result);
        }

        if self.options.unescape_backslashes {
            result = unescape_backslashes(&result);
        }

        if self.options.tidy_markdown {
            result = tidy_markdown(&result);
        }

        result
    }
}

fn normalize_entities(text: &str) -> String {
    let mut result = text.to_string();
    for (entity, replacement) in ENTITY_MAP {
        result = result.replace(entity, replacement);
    }
    result
}

fn strip_empty_tags(text: &str) -> String {
    // Removing an inner span can leave its parent empty.
    let mut result = text.to_string();
    while EMPTY_SPAN.is_match(&result) {
        result = EMPTY_SPAN.replace_all(&result, "").into_owned();
    }
    EMPTY_COMMENT.replace_all(&result, "").into_owned()
}

fn unescape_backslashes(text: &str) -> String {
    // Underscores inside $$...$$ formulas keep their escapes.
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for formula in FORMULA.find_iter(text) {
        result.push_str(&ESCAPED_UNDERSCORE.replace_all(&text[last..formula.start()], "${1}_"));
        result.push_str(formula.as_str());
        last = formula.end();
    }
    result.push_str(&ESCAPED_UNDERSCORE.replace_all(&text[last..], "${1}_"));

    let result = ESCAPED_INDEX.replace_all(&result, |caps: &Captures| format!("[{}]", &caps[1]));
    result.replace("\\~", "~")
}

fn tidy_markdown(text: &str) -> String {
    let result = EMPTY_ORDERED_ITEM.replace_all(text, "");
    let result = EMPTY_BULLET_ITEM.replace_all(&result, "");
    let result = EMPTY_SIMPLE_TABLE.replace_all(&result, "");
    let result = TRAILING_SPACE.replace_all(&result, "\n");
    EXTRA_NEWLINES.replace_all(&result, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_entities() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Minimal);
        assert_eq!(
            pipeline.process("&#8220;A&#8221;&#160;&#8211; B&#8230;\r\n&#169;"),
            "\"A\" - B...\n&copy;"
        );
    }

    #[test]
    fn test_strip_nested_empty_spans() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        assert_eq!(
            pipeline.process("a<span id=\"x\"><span> </span>\n</span>b<!-- -->c"),
            "abc"
        );
        assert_eq!(pipeline.process("<span>kept</span>"), "<span>kept</span>");
    }

    #[test]
    fn test_unescape_backslashes() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Standard);
        assert_eq!(pipeline.process(r"foo\_bar"), "foo_bar");
        assert_eq!(pipeline.process(r"$$a\_b$$ c\_d"), r"$$a\_b$$ c_d");
        assert_eq!(pipeline.process(r"reg\[31:16\] \~x"), "reg[31:16] ~x");
    }

    #[test]
    fn test_minimal_keeps_escapes() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Minimal);
        assert_eq!(pipeline.process(r"foo\_bar"), r"foo\_bar");
    }

    #[test]
    fn test_tidy_markdown() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Aggressive);
        let result = pipeline.process("1.\nitem  \n-\n\n\n\ntext");
        assert!(!result.contains("1."));
        assert!(!result.contains("\n\n\n"));
        assert!(result.contains("item\n"));
    }

    #[test]
    fn test_unicode_nfc() {
        let pipeline = CleanupPipeline::from_preset(CleanupPreset::Aggressive);
        assert_eq!(pipeline.process("e\u{0301}"), "\u{00e9}");
    }
}

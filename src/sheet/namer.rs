//! Worksheet naming from table captions.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Longest worksheet name Excel accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Length a colliding name is cut to before its `_N` suffix.
const COLLISION_STEM_LEN: usize = 28;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w ]").expect("BUG: non-word regex is valid"));

/// Reduce a caption to a worksheet name candidate.
///
/// Keeps word characters and spaces, trims, and cuts to
/// [`MAX_SHEET_NAME_LEN`] characters.
pub fn sanitize_caption(caption: &str) -> String {
    let cleaned = NON_WORD.replace_all(caption, "");
    truncate_chars(cleaned.trim(), MAX_SHEET_NAME_LEN)
        .trim()
        .to_string()
}

/// Derive a unique worksheet name from a caption and register it.
///
/// `used` holds the lowercase names already taken in the workbook. On a
/// collision the candidate is cut to 28 characters and `_1`, `_2`, ... is
/// appended until the lowercase form is free. Returns `None` when nothing
/// usable is left of the caption.
pub fn unique_sheet_name(caption: &str, used: &mut HashSet<String>) -> Option<String> {
    let candidate = sanitize_caption(caption);
    if candidate.is_empty() {
        return None;
    }

    let mut name = candidate.clone();
    let mut n = 1u32;
    while used.contains(&name.to_lowercase()) {
        let suffix = format!("_{}", n);
        let stem_len = COLLISION_STEM_LEN.min(MAX_SHEET_NAME_LEN - suffix.len());
        name = format!("{}{}", truncate_chars(&candidate, stem_len), suffix);
        n += 1;
    }

    used.insert(name.to_lowercase());
    Some(name)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_caption() {
        assert_eq!(sanitize_caption("  Table 3: Results (2024)!  "), "Table 3 Results 2024");
        assert_eq!(sanitize_caption("***"), "");
        assert_eq!(sanitize_caption("Ünïcödé_ok"), "Ünïcödé_ok");
    }

    #[test]
    fn test_sanitize_truncates() {
        let name = sanitize_caption(&"x".repeat(40));
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_duplicate_captions() {
        let mut used = HashSet::new();
        assert_eq!(unique_sheet_name("Results", &mut used).unwrap(), "Results");
        assert_eq!(unique_sheet_name("Results", &mut used).unwrap(), "Results_1");
        assert_eq!(unique_sheet_name("results", &mut used).unwrap(), "results_2");
        assert!(used.contains("results_1"));
    }

    #[test]
    fn test_collision_after_truncation() {
        let mut used = HashSet::new();
        let base = "A".repeat(31);
        let first = unique_sheet_name(&format!("{}one", base), &mut used).unwrap();
        let second = unique_sheet_name(&format!("{}two", base), &mut used).unwrap();
        assert_eq!(first, base);
        assert_eq!(second, format!("{}_1", "A".repeat(28)));
    }

    #[test]
    fn test_suffix_stays_within_limit() {
        let mut used = HashSet::new();
        let caption = "B".repeat(40);
        let names: Vec<String> = (0..150)
            .map(|_| unique_sheet_name(&caption, &mut used).unwrap())
            .collect();
        let distinct: HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
        assert_eq!(distinct.len(), names.len());
        assert!(names.iter().all(|n| n.chars().count() <= MAX_SHEET_NAME_LEN));
    }

    #[test]
    fn test_empty_caption() {
        let mut used = HashSet::new();
        assert!(unique_sheet_name("?!", &mut used).is_none());
        assert!(used.is_empty());
    }
}

//! The truncation marker.
//!
//! Text longer than a cell can hold is cut on export and tagged with a
//! literal suffix. On import the same literal is searched for as a plain
//! substring, so user text that happens to contain it is flagged as well.

use std::borrow::Cow;

/// Suffix appended to text that was cut to fit into a cell
pub const TRUNCATION_MARKER: &str = "...[cut]";

/// Number of characters in [`TRUNCATION_MARKER`]
pub const MARKER_CHARS: usize = 8;

/// Cut `text` so that it holds at most `limit` characters, marker included.
///
/// Returns `None` when the text already fits. Characters are Unicode scalar
/// values, and a cut never splits one.
pub fn truncate_cell_text(text: &str, limit: usize) -> Option<String> {
    if text.chars().count() <= limit {
        return None;
    }
    if limit <= MARKER_CHARS {
        return Some(TRUNCATION_MARKER.chars().take(limit).collect());
    }

    let keep = limit - MARKER_CHARS;
    let cut_at = text
        .char_indices()
        .nth(keep)
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    let mut out = String::with_capacity(cut_at + TRUNCATION_MARKER.len());
    out.push_str(&text[..cut_at]);
    out.push_str(TRUNCATION_MARKER);
    Some(out)
}

/// Whether `text` carries the marker anywhere
pub fn has_truncation_marker(text: &str) -> bool {
    text.contains(TRUNCATION_MARKER)
}

/// Remove every occurrence of the marker
pub fn strip_truncation_marker(text: &str) -> Cow<'_, str> {
    if has_truncation_marker(text) {
        Cow::Owned(text.replace(TRUNCATION_MARKER, ""))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_chars_constant() {
        assert_eq!(TRUNCATION_MARKER.chars().count(), MARKER_CHARS);
    }

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(truncate_cell_text("Budi", 32_767), None);
        assert_eq!(truncate_cell_text(&"x".repeat(32_767), 32_767), None);
    }

    #[test]
    fn test_long_text_cut_to_limit() {
        let out = truncate_cell_text(&"x".repeat(32_768), 32_767).unwrap();
        assert_eq!(out.chars().count(), 32_767);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(&out[..5], "xxxxx");
    }

    #[test]
    fn test_cut_counts_characters_not_bytes() {
        let out = truncate_cell_text("日本語のテキストです", 9).unwrap();
        assert_eq!(out, "日...[cut]");
    }

    #[test]
    fn test_tiny_limit() {
        assert_eq!(truncate_cell_text("abcdefghij", 3).unwrap(), "...");
    }

    #[test]
    fn test_strip() {
        assert_eq!(strip_truncation_marker("abc...[cut]"), "abc");
        assert!(matches!(strip_truncation_marker("abc"), Cow::Borrowed(_)));
    }
}

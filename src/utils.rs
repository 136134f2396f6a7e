//! Text helpers shared by the batch pipeline and the single-article service.
//!
//! - Line-level deduplication of extracted article text
//! - Non-empty line counting for the quality gate
//! - HTML entity decoding for upstream headlines
//! - String truncation and capitalization for logging

use html_escape::decode_html_entities;
use std::collections::HashSet;

/// Remove repeated lines from article text.
///
/// Each line is compared by its trimmed value; only the first occurrence is
/// kept, in its original untrimmed form. Blank lines are dropped and never
/// count as seen. Running this on its own output returns the same string.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(clean_content("a\n\n a \nb\na"), "a\nb");
/// ```
pub fn clean_content(text: &str) -> String {
    let mut seen = HashSet::new();
    text.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && seen.insert(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Count lines that contain something other than whitespace.
pub fn non_empty_line_count(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Decode HTML entities in a headline (`&amp;` -> `&`, `&#39;` -> `'`).
///
/// Only entities are touched; anything that looks like a tag is left in the
/// text verbatim.
pub fn unescape_html(s: &str) -> String {
    decode_html_entities(s).into_owned()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (backing off to a char
/// boundary) with an ellipsis and a byte count appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Capitalize the first character of a string ("europe" -> "Europe").
pub fn upcase(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_content_drops_repeats_and_blanks() {
        let raw = "First line\n\nSecond line\n  First line  \n   \nThird line\nSecond line";
        assert_eq!(clean_content(raw), "First line\nSecond line\nThird line");
    }

    #[test]
    fn test_clean_content_keeps_original_indentation() {
        let raw = "  indented\nindented\nplain";
        assert_eq!(clean_content(raw), "  indented\nplain");
    }

    #[test]
    fn test_clean_content_is_idempotent() {
        let samples = [
            "",
            "\n\n\n",
            "a\nb\na\n\nc",
            "  spaced  \nspaced\n\tTabbed\nTabbed\n",
            "Line one\r\nLine two\r\nLine one\r\n",
        ];
        for raw in samples {
            let once = clean_content(raw);
            assert_eq!(clean_content(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn test_clean_content_empty() {
        assert_eq!(clean_content(""), "");
    }

    #[test]
    fn test_non_empty_line_count() {
        assert_eq!(non_empty_line_count(""), 0);
        assert_eq!(non_empty_line_count("a\n \nb\n\t\nc"), 3);
    }

    #[test]
    fn test_unescape_html() {
        assert_eq!(unescape_html("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(unescape_html("It&#39;s &quot;here&quot;"), "It's \"here\"");
        assert_eq!(unescape_html("a < b"), "a < b");
        assert_eq!(unescape_html("Plain title"), "Plain title");
    }

    #[test]
    fn test_unescape_html_keeps_tag_like_text() {
        assert_eq!(
            unescape_html("Q&amp;A: <Exclusive> interview"),
            "Q&A: <Exclusive> interview"
        );
        assert_eq!(unescape_html("AT&amp;T <b>deal</b>"), "AT&T <b>deal</b>");
        assert_eq!(unescape_html("&lt;b&gt; &amp; <i>"), "<b> & <i>");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        let result = truncate_for_log("ééééé", 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("(+8 bytes)"));
    }

    #[test]
    fn test_upcase() {
        assert_eq!(upcase("europe"), "Europe");
        assert_eq!(upcase(""), "");
    }
}

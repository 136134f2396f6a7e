//! Title-based deduplication for a single fetch.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid regex"));

/// Reduce a title to its dedup key: word characters only, lowercased.
///
/// ```ignore
/// assert_eq!(normalize_title("Hello, World!"), "helloworld");
/// ```
pub fn normalize_title(title: &str) -> String {
    NON_WORD.replace_all(title, "").to_lowercase()
}

/// Normalized titles accepted so far in the current fetch.
#[derive(Debug, Default)]
pub struct TitleSet {
    seen: HashSet<String>,
}

impl TitleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `title` and return `true`, or `false` if an equivalent title
    /// was already accepted.
    pub fn insert(&mut self, title: &str) -> bool {
        self.seen.insert(normalize_title(title))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }
}

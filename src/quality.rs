//! Quality gate deciding whether cleaned article text is worth showing.
//!
//! Two rules run in order:
//! 1. At least [`MIN_LINES`] non-empty lines must remain after cleaning.
//! 2. The text must not contain any [`BLOCKLIST`] phrase, which flags video
//!    pages, login walls, and live blogs.
//!
//! Blocklist matching is a case-insensitive substring test with no word
//! boundaries, so "playground" trips on "play". Existing clients rely on
//! exactly this set of rejections.

use crate::utils::non_empty_line_count;
use thiserror::Error;

/// Minimum number of non-empty lines for an article to be displayable.
pub const MIN_LINES: usize = 4;

/// Lowercase phrases that mark multimedia, login-gated, or live content.
pub const BLOCKLIST: &[&str] = &[
    "video",
    "watch",
    "player",
    "play",
    "stream",
    "log in to comment",
    "join in on the fun",
    "this live page is now closed",
    "live updates",
    "follow our live coverage",
];

/// Why cleaned text failed the gate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("content has {lines} non-empty lines, need at least {}", MIN_LINES)]
    TooShort { lines: usize },
    #[error("content matches blocked phrase `{keyword}`")]
    Blocked { keyword: &'static str },
}

/// Return the first blocklist phrase found in `text`, if any.
pub fn blocked_keyword(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    BLOCKLIST.iter().copied().find(|k| lower.contains(k))
}

/// Run both rules against already-cleaned text.
pub fn check(cleaned: &str) -> Result<(), Rejection> {
    let lines = non_empty_line_count(cleaned);
    if lines < MIN_LINES {
        return Err(Rejection::TooShort { lines });
    }
    if let Some(keyword) = blocked_keyword(cleaned) {
        return Err(Rejection::Blocked { keyword });
    }
    Ok(())
}

//! Article scraping.
//!
//! NewsAPI only ships a truncated snippet with each headline, so the full
//! text is pulled from the publisher's own page. The [`article`] module
//! holds the generic extractor used for every source.
//!
//! Failures are returned as [`article::ExtractionError`] values; callers
//! decide whether to skip the article (batch fetch) or report it
//! (single-article request).

pub mod article;

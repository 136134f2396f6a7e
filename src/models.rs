//! Data models for regions, upstream payloads, and filtered articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Region`]: The fixed set of regions driving source selection and translation
//! - [`SourcesResponse`] / [`HeadlinesResponse`]: Typed NewsAPI payloads
//! - [`CandidateArticle`]: A headline entry before extraction and filtering
//! - [`FilteredArticle`]: An article that passed every gate
//! - [`RegionDigest`]: The result of one `fetch_news` call
//!
//! Upstream payloads are decoded into explicit structs so that a malformed
//! response surfaces as a decode error at the boundary instead of leaking
//! untyped JSON into the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A region key that the pipeline knows how to serve.
///
/// Each region maps to a set of ISO country codes used to pick upstream
/// sources, and to the language its articles are translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Europe,
    Asia,
    NorthAmerica,
    SouthAmerica,
}

impl Region {
    /// Every region, in the order the periodic task walks them.
    pub const ALL: [Region; 4] = [
        Region::Europe,
        Region::Asia,
        Region::NorthAmerica,
        Region::SouthAmerica,
    ];

    /// The key used on the command line and in serialized output.
    pub fn key(self) -> &'static str {
        match self {
            Region::Europe => "europe",
            Region::Asia => "asia",
            Region::NorthAmerica => "north-america",
            Region::SouthAmerica => "south-america",
        }
    }

    /// ISO 3166 country codes whose sources belong to this region.
    pub fn country_codes(self) -> &'static [&'static str] {
        match self {
            Region::Europe => &["gb", "fr", "de", "it", "es", "ie", "nl"],
            Region::Asia => &["in", "cn", "jp", "kr", "sg"],
            Region::NorthAmerica => &["us", "ca", "mx"],
            Region::SouthAmerica => &["br", "ar", "co", "cl", "pe"],
        }
    }

    /// Language code articles from this region are translated into.
    pub fn target_language(self) -> &'static str {
        match self {
            Region::SouthAmerica => "es",
            Region::Europe | Region::Asia | Region::NorthAmerica => "en",
        }
    }

    /// Apply the region-specific URL rewrite.
    ///
    /// North American Al Jazeera links are swapped for their CNN equivalents
    /// before anything downloads or translates them.
    pub fn rewrite_url(self, url: &str) -> String {
        if self == Region::NorthAmerica && url.contains("aljazeera.com") {
            url.replace("aljazeera.com", "cnn.com")
        } else {
            url.to_string()
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a region key is not one of the supported regions.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown region `{0}` (expected one of: europe, asia, north-america, south-america)")]
pub struct InvalidRegion(pub String);

impl FromStr for Region {
    type Err = InvalidRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Region::ALL
            .into_iter()
            .find(|r| r.key() == key)
            .ok_or_else(|| InvalidRegion(s.to_string()))
    }
}

/// An upstream content provider as listed by the sources endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub id: Option<String>,
    pub country: Option<String>,
}

/// Body of `GET /v2/top-headlines/sources`.
#[derive(Debug, Deserialize)]
pub struct SourcesResponse {
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// A headline entry as returned by the upstream listing, before extraction.
///
/// `content` is the truncated snippet NewsAPI ships with each headline; it is
/// only used when the full page yields no readable text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateArticle {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
}

/// Body of `GET /v2/top-headlines`.
#[derive(Debug, Deserialize)]
pub struct HeadlinesResponse {
    #[serde(default)]
    pub articles: Vec<CandidateArticle>,
}

/// An article that passed extraction, cleaning, the quality gate, and dedup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredArticle {
    /// HTML-unescaped headline.
    pub title: String,
    /// Article URL after any region rewrite.
    pub url: String,
    /// Same as `url`; kept for clients that request the full text by it.
    pub api_url: String,
}

impl FilteredArticle {
    pub fn new(title: String, url: String) -> Self {
        Self {
            title,
            api_url: url.clone(),
            url,
        }
    }
}

/// Everything one `fetch_news` call produced for a region.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegionDigest {
    pub region: Region,
    pub fetched_at: DateTime<Utc>,
    pub articles: Vec<FilteredArticle>,
}

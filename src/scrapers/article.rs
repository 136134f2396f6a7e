//! Full-text extraction for arbitrary news article pages.
//!
//! Pages are downloaded with the shared client and parsed with `scraper`.
//! Readable text is taken from headings, paragraphs, and list items inside
//! the first `<article>` or `<main>` element, or from the whole document when
//! neither exists. Each element becomes one line with its inner whitespace
//! collapsed.

use crate::api::{RetryPolicy, send_with_retry};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info, instrument};

static SCOPE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article, main").expect("valid selector"));
static BLOCKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, p, li").expect("valid selector"));

/// Why an article produced no text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("article returned {0}")]
    Status(StatusCode),
    #[error("no readable text on the page and no snippet to fall back on")]
    Empty,
}

/// Downloads article pages and pulls out their text.
#[derive(Debug, Clone)]
pub struct Extractor {
    client: Client,
    retry: RetryPolicy,
}

impl Extractor {
    pub fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Fetch `url` and return its text, or `snippet` when the page has none.
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn extract(
        &self,
        url: &str,
        snippet: Option<&str>,
    ) -> Result<String, ExtractionError> {
        let resp = send_with_retry(&self.retry, || self.client.get(url)).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ExtractionError::Status(status));
        }
        let body = resp.text().await?;
        let text = parse_text(&body);

        if !text.trim().is_empty() {
            info!(bytes = text.len(), "Parsed article");
            return Ok(text);
        }

        match snippet.filter(|s| !s.trim().is_empty()) {
            Some(s) => {
                debug!("Page had no readable text; using headline snippet");
                Ok(s.to_string())
            }
            None => Err(ExtractionError::Empty),
        }
    }
}

fn element_line(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Pull readable lines out of an HTML document.
pub fn parse_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let lines: Vec<String> = match document.select(&SCOPE).next() {
        Some(scope) => scope.select(&BLOCKS).map(element_line).collect(),
        None => document.select(&BLOCKS).map(element_line).collect(),
    };
    lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

//! NewsAPI client with bounded retry for transient network failures.
//!
//! Every outbound call in the crate goes through [`send_with_retry`]: the
//! request is rebuilt and resent after a short jittered delay when it fails
//! at the transport level (connect error or timeout), at most
//! [`RetryPolicy::max_retries`] times. A response with a non-success status
//! is a definitive answer and is never retried.
//!
//! # Endpoints
//!
//! | Method | Path | Used by |
//! |--------|------|---------|
//! | GET | `/v2/top-headlines/sources` | [`NewsApiClient::sources_for_region`] |
//! | GET | `/v2/top-headlines` | [`NewsApiClient::top_headlines`] |

use crate::models::{CandidateArticle, HeadlinesResponse, Region, SourcesResponse};
use crate::utils::truncate_for_log;
use itertools::Itertools;
use rand::{Rng, rng};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Number of headlines requested per page.
pub const PAGE_SIZE: usize = 12;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Why an upstream call produced no usable payload.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Retry settings for transport-level failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: usize,
    /// Delay before the first retry; doubles on each further attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: usize) -> Duration {
        let delay = self
            .base_delay
            .saturating_mul(1 << (attempt.saturating_sub(1)).min(16));
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }
}

/// Connect errors and timeouts are worth one more try; anything else is not.
pub fn is_transient(e: &reqwest::Error) -> bool {
    e.is_connect() || e.is_timeout()
}

/// Build the shared HTTP client with a per-request timeout.
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Send the request produced by `build`, retrying transient failures.
///
/// `build` is called once per attempt because a sent `RequestBuilder` is
/// consumed.
///
/// # Arguments
///
/// * `policy` - How many times to retry and how long to back off
/// * `build` - Produces a fresh request for each attempt
///
/// # Returns
///
/// The first response received, whatever its status, or the last transport
/// error once retries run out.
///
/// # Retry Behavior
///
/// - Only connect errors and timeouts are retried
/// - A response with a non-success status is returned as-is, never retried
/// - Backoff doubles per attempt with up to 250 ms of random jitter
#[instrument(level = "debug", skip_all)]
pub async fn send_with_retry<F>(policy: &RetryPolicy, build: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> RequestBuilder,
{
    let total_t0 = Instant::now();
    let mut attempt = 0usize;

    loop {
        match build().send().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < policy.max_retries && is_transient(&e) => {
                attempt += 1;
                let delay = policy.delay_for(attempt);
                warn!(
                    attempt,
                    max = policy.max_retries,
                    elapsed_ms_total = total_t0.elapsed().as_millis(),
                    ?delay,
                    error = %e,
                    "request failed; backing off"
                );
                sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Client for a NewsAPI-compatible service.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl NewsApiClient {
    pub fn new(client: Client, base_url: &str, api_key: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retry,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = send_with_retry(&self.retry, || {
            self.client
                .get(&url)
                .query(query)
                .query(&[("apiKey", self.api_key.as_str())])
        })
        .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status,
                body: truncate_for_log(&body, 300),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Source ids for `region`: country in the region's set, id present and
    /// not a `google-news` aggregate. Upstream order is kept.
    ///
    /// Any upstream failure is logged and yields an empty list.
    #[instrument(level = "info", skip_all, fields(%region))]
    pub async fn sources_for_region(&self, region: Region) -> Vec<String> {
        let response: SourcesResponse = match self.get_json("/v2/top-headlines/sources", &[]).await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Error fetching sources");
                return Vec::new();
            }
        };

        let countries = region.country_codes();
        let ids: Vec<String> = response
            .sources
            .into_iter()
            .filter(|s| {
                s.country
                    .as_deref()
                    .is_some_and(|c| countries.contains(&c))
            })
            .filter_map(|s| s.id)
            .filter(|id| !id.is_empty() && !id.contains("google-news"))
            .collect();

        info!(count = ids.len(), "Resolved sources");
        debug!(sources = ?ids, "Source ids");
        ids
    }

    /// One page of headlines from the given sources.
    #[instrument(level = "info", skip_all, fields(sources = sources.len(), page = page))]
    pub async fn top_headlines(
        &self,
        sources: &[String],
        page: usize,
    ) -> Result<Vec<CandidateArticle>, UpstreamError> {
        let query = [
            ("sources", sources.iter().join(",")),
            ("pageSize", PAGE_SIZE.to_string()),
            ("page", page.to_string()),
        ];
        let response: HeadlinesResponse = self.get_json("/v2/top-headlines", &query).await?;
        info!(count = response.articles.len(), "Fetched headline page");
        Ok(response.articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> NewsApiClient {
        NewsApiClient::new(
            build_client(Duration::from_secs(5)).unwrap(),
            &server.base_url(),
            "test-key",
            RetryPolicy::default(),
        )
    }

    #[test]
    fn test_retry_delay_grows() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert!(policy.delay_for(1) >= Duration::from_millis(100));
        assert!(policy.delay_for(1) <= Duration::from_millis(350));
        assert!(policy.delay_for(3) >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_sources_filtered_by_country_and_google_news() {
        let server = MockServer::start_async().await;
        let sources_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/top-headlines/sources")
                    .query_param("apiKey", "test-key");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "sources": [
                        {"id": "bbc-news", "country": "gb"},
                        {"id": "google-news-uk", "country": "gb"},
                        {"id": "cnn", "country": "us"},
                        {"id": "le-monde", "country": "fr"},
                        {"id": null, "country": "de"},
                        {"id": "no-country"}
                    ]
                }));
            })
            .await;

        let ids = client_for(&server).sources_for_region(Region::Europe).await;
        sources_mock.assert_async().await;
        assert_eq!(ids, vec!["bbc-news".to_string(), "le-monde".to_string()]);
    }

    #[tokio::test]
    async fn test_sources_non_success_yields_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines/sources");
                then.status(401).body(r#"{"status":"error","code":"apiKeyInvalid"}"#);
            })
            .await;

        let ids = client_for(&server).sources_for_region(Region::Asia).await;
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_sources_malformed_body_yields_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/top-headlines/sources");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let ids = client_for(&server).sources_for_region(Region::Asia).await;
        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_top_headlines_query_and_status() {
        let server = MockServer::start_async().await;
        let page_mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/top-headlines")
                    .query_param("sources", "bbc-news,le-monde")
                    .query_param("pageSize", "12")
                    .query_param("page", "2")
                    .query_param("apiKey", "test-key");
                then.status(200).json_body(json!({
                    "status": "ok",
                    "articles": [{"title": "A", "url": "https://example.com/a", "content": null}]
                }));
            })
            .await;

        let client = client_for(&server);
        let sources = vec!["bbc-news".to_string(), "le-monde".to_string()];
        let articles = client.top_headlines(&sources, 2).await.unwrap();
        page_mock.assert_async().await;
        assert_eq!(articles.len(), 1);

        let err = client.top_headlines(&sources, 3).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status { .. }));
    }
}

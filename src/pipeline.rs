//! The fetch → extract → clean → gate → dedup → translate pipeline.
//!
//! [`NewsPipeline::fetch_news`] builds a regional digest of up to
//! [`MAX_ARTICLES`] articles across at most [`MAX_PAGES`] headline pages.
//! [`NewsPipeline::fetch_article`] runs the same extraction and gating on a
//! single URL and translates the result.
//!
//! In batch mode every per-article failure becomes a [`SkipReason`] that is
//! logged and absorbed; in single-article mode the first failure is returned
//! as an [`ArticleError`].

use crate::api::{NewsApiClient, RetryPolicy, build_client};
use crate::dedup::TitleSet;
use crate::models::{CandidateArticle, FilteredArticle, Region};
use crate::quality::{self, Rejection};
use crate::scrapers::article::{ExtractionError, Extractor};
use crate::translate::Translator;
use crate::utils::{clean_content, unescape_html};
use futures::stream::{self, StreamExt};
use std::pin::pin;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Upper bound on articles returned per region per fetch.
pub const MAX_ARTICLES: usize = 12;
/// Headline pages tried before giving up on a full digest.
pub const MAX_PAGES: usize = 3;

/// Runtime settings injected into the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: String,
    pub news_api_url: String,
    pub translate_url: String,
    /// Timeout applied to every outbound request.
    pub request_timeout: Duration,
    /// Wall-clock budget for one `fetch_news` call.
    pub fetch_budget: Duration,
    /// Article downloads in flight at once within a page.
    pub extract_concurrency: usize,
}

/// Why a candidate was left out of a digest.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("candidate has no URL")]
    MissingUrl,
    #[error("extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Rejected(#[from] Rejection),
}

/// Failure of a single-article request, worded for the end user.
#[derive(Debug, Error)]
pub enum ArticleError {
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("This is a video article. Please view it on the website.")]
    VideoContent,
    #[error("Article content is too short to display.")]
    TooShort,
    #[error(
        "This article contains multimedia, video, login requirements, or is a live page and cannot be displayed."
    )]
    Blocked,
    #[error("Failed to fetch content: {0}")]
    Extraction(#[from] ExtractionError),
}

impl ArticleError {
    /// HTTP status an outer request layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ArticleError::Extraction(_) => 500,
            _ => 400,
        }
    }
}

impl From<Rejection> for ArticleError {
    fn from(r: Rejection) -> Self {
        match r {
            Rejection::TooShort { .. } => ArticleError::TooShort,
            Rejection::Blocked { .. } => ArticleError::Blocked,
        }
    }
}

/// A candidate whose text passed the quality gate, pending dedup.
#[derive(Debug)]
struct Screened {
    title: Option<String>,
    url: String,
}

/// A candidate dropped before dedup, with its title kept for logging.
#[derive(Debug)]
struct Skipped {
    title: Option<String>,
    reason: SkipReason,
}

impl Skipped {
    fn new(title: Option<String>, reason: impl Into<SkipReason>) -> Self {
        Self {
            title,
            reason: reason.into(),
        }
    }
}

pub struct NewsPipeline {
    api: NewsApiClient,
    extractor: Extractor,
    translator: Translator,
    fetch_budget: Duration,
    extract_concurrency: usize,
}

impl NewsPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(config.request_timeout)?;
        let retry = RetryPolicy::default();
        Ok(Self {
            api: NewsApiClient::new(client.clone(), &config.news_api_url, &config.api_key, retry),
            extractor: Extractor::new(client.clone(), retry),
            translator: Translator::new(client, &config.translate_url, retry),
            fetch_budget: config.fetch_budget,
            extract_concurrency: config.extract_concurrency.max(1),
        })
    }

    /// Collect up to [`MAX_ARTICLES`] displayable, distinct articles for
    /// `region`, in discovery order.
    ///
    /// # Arguments
    ///
    /// * `region` - Decides the source countries and the North America URL rewrite
    ///
    /// # Returns
    ///
    /// At most [`MAX_ARTICLES`] articles with distinct normalized titles.
    /// Never fails: upstream outages, a blown time budget, or a thin news
    /// day all produce a shorter (possibly empty) list plus a warning.
    #[instrument(level = "info", skip_all, fields(%region))]
    pub async fn fetch_news(&self, region: Region) -> Vec<FilteredArticle> {
        let t0 = Instant::now();
        let mut articles = Vec::with_capacity(MAX_ARTICLES);
        let mut titles = TitleSet::new();

        let collect = self.collect_pages(region, &mut articles, &mut titles);
        if timeout_at(t0 + self.fetch_budget, collect).await.is_err() {
            warn!(budget = ?self.fetch_budget, "Fetch budget exhausted; returning partial result");
        }

        if articles.len() < MAX_ARTICLES {
            warn!(
                count = articles.len(),
                "Only {} articles found for region {}",
                articles.len(),
                region
            );
        }
        info!(
            count = articles.len(),
            titles_seen = titles.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetch complete"
        );
        articles
    }

    async fn collect_pages(
        &self,
        region: Region,
        articles: &mut Vec<FilteredArticle>,
        titles: &mut TitleSet,
    ) {
        for page in 1..=MAX_PAGES {
            if articles.len() >= MAX_ARTICLES {
                break;
            }

            let sources = self.api.sources_for_region(region).await;
            if sources.is_empty() {
                warn!(page, "No valid sources found");
                break;
            }

            let candidates = match self.api.top_headlines(&sources, page).await {
                Ok(c) => c,
                Err(e) => {
                    warn!(page, error = %e, "Error fetching headlines");
                    break;
                }
            };
            if candidates.is_empty() {
                info!(page, "Headline page is empty");
                break;
            }

            let mut screened = pin!(
                stream::iter(candidates)
                    .map(|c| self.screen(region, c))
                    .buffered(self.extract_concurrency)
            );

            while articles.len() < MAX_ARTICLES {
                let Some(outcome) = screened.next().await else {
                    break;
                };
                match outcome {
                    Ok(s) => {
                        let raw_title = s.title.as_deref().unwrap_or_default();
                        let title = unescape_html(raw_title);
                        if !titles.insert(&title) {
                            info!(%title, "Skipping duplicate article");
                            continue;
                        }
                        let title = if s.title.is_some() {
                            title
                        } else {
                            "No Title".to_string()
                        };
                        debug!(%title, url = %s.url, "Accepted article");
                        articles.push(FilteredArticle::new(title, s.url));
                    }
                    Err(Skipped { title, reason }) => {
                        info!(
                            title = %title.as_deref().unwrap_or("No Title"),
                            %reason,
                            "Skipping article"
                        );
                    }
                }
            }
        }
    }

    /// Extract, clean, and gate one candidate.
    async fn screen(
        &self,
        region: Region,
        candidate: CandidateArticle,
    ) -> Result<Screened, Skipped> {
        let CandidateArticle { title, url, content } = candidate;

        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            return Err(Skipped::new(title, SkipReason::MissingUrl));
        };
        let url = region.rewrite_url(&url);

        let text = match self.extractor.extract(&url, content.as_deref()).await {
            Ok(t) => t,
            Err(e) => return Err(Skipped::new(title, e)),
        };
        if let Err(rejection) = quality::check(&clean_content(&text)) {
            return Err(Skipped::new(title, rejection));
        }
        Ok(Screened { title, url })
    }

    /// Fetch, gate, and translate a single article for on-demand reading.
    ///
    /// Dropping the returned future aborts any download or translation still
    /// in flight.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute `http`/`https` article URL; surrounding whitespace is ignored
    /// * `region` - Picks the translation language and the URL rewrite
    ///
    /// # Returns
    ///
    /// The cleaned article text in the region's language, or the cleaned
    /// original when translation is unavailable.
    ///
    /// # Errors
    ///
    /// - [`ArticleError::InvalidUrl`] for blank or non-web URLs
    /// - [`ArticleError::VideoContent`] for `/videos/` URLs, without downloading
    /// - [`ArticleError::Extraction`] when the page cannot be fetched or has no text
    /// - [`ArticleError::TooShort`] / [`ArticleError::Blocked`] from the quality gate
    #[instrument(level = "info", skip_all, fields(%url, %region))]
    pub async fn fetch_article(&self, url: &str, region: Region) -> Result<String, ArticleError> {
        let url = region.rewrite_url(url.trim());
        if !Url::parse(&url).is_ok_and(|u| matches!(u.scheme(), "http" | "https")) {
            return Err(ArticleError::InvalidUrl);
        }
        if url.contains("/videos/") {
            return Err(ArticleError::VideoContent);
        }

        let text = self.extractor.extract(&url, None).await?;
        let cleaned = clean_content(&text);
        quality::check(&cleaned)?;

        Ok(self
            .translator
            .translate(&cleaned, region.target_language())
            .await)
    }
}

//! # Regional News
//!
//! Aggregates regional headlines from a NewsAPI-compatible service, pulls the
//! full text of each story, drops pages that are too short, video-only,
//! login-gated, or live blogs, removes duplicate headlines, and translates
//! single articles into the region's language on request.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... regional_news fetch --region asia
//! NEWS_API_KEY=... regional_news article --url https://example.com/story --region south-america
//! NEWS_API_KEY=... regional_news watch --interval-hours 24
//! ```
//!
//! ## Architecture
//!
//! 1. **Sources**: Resolve the region's source ids from the upstream listing
//! 2. **Headlines**: Page through top headlines (12 per page, up to 3 pages)
//! 3. **Extraction**: Download each story and parse its text, falling back to the snippet
//! 4. **Filtering**: Drop repeated lines, then gate on length and the blocklist
//! 5. **Dedup**: Keep the first story for each normalized title
//! 6. **Translation**: Best-effort, single-article requests only
//!
//! Logs go to stderr; stdout carries only JSON.

use chrono::Utc;
use clap::Parser;
use serde_json::json;
use std::error::Error;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod dedup;
mod models;
mod pipeline;
mod quality;
mod scrapers;
mod translate;
mod utils;

use cli::{Cli, Command};
use models::{Region, RegionDigest};
use pipeline::NewsPipeline;
use utils::upcase;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    info!(
        news_api_url = %args.news_api_url,
        translate_url = %args.translate_url,
        "regional_news starting up"
    );

    let pipeline = NewsPipeline::new(args.pipeline_config())?;

    match args.command {
        Command::Fetch { region } => {
            let articles = pipeline.fetch_news(region).await;
            let digest = RegionDigest {
                region,
                fetched_at: Utc::now(),
                articles,
            };
            println!("{}", serde_json::to_string_pretty(&digest)?);
        }
        Command::Article { url, region } => {
            tokio::select! {
                result = pipeline.fetch_article(&url, region) => match result {
                    Ok(full_content) => {
                        println!("{}", json!({ "full_content": full_content }));
                    }
                    Err(e) => {
                        error!(status = e.status_code(), error = %e, "Article request failed");
                        println!("{}", json!({ "error": e.to_string() }));
                        return Err(e.into());
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted; article request abandoned");
                }
            }
        }
        Command::Watch { interval_hours } => {
            let period = Duration::from_secs(interval_hours.saturating_mul(60 * 60));
            let mut ticker = tokio::time::interval(period);
            info!(?period, "Scheduled regional fetch");
            let run = async {
                loop {
                    ticker.tick().await;
                    scheduled_task(&pipeline).await;
                }
            };
            tokio::select! {
                _ = run => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down scheduler");
                }
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}

/// Fetch every region once and log the resulting headlines.
#[instrument(level = "info", skip_all)]
async fn scheduled_task(pipeline: &NewsPipeline) {
    for region in Region::ALL {
        let news = pipeline.fetch_news(region).await;
        info!(count = news.len(), "News for {}:", upcase(region.key()));
        for article in &news {
            info!(%region, title = %article.title, url = %article.url, "- {}", article.title);
        }
    }
}

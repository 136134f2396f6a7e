//! Command-line interface definitions for Regional News.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Upstream settings can be provided via flags or environment variables; the
//! parsed values are turned into a [`PipelineConfig`] that is injected into
//! the pipeline.

use crate::models::Region;
use crate::pipeline::PipelineConfig;
use clap::{Parser, Subcommand};
use std::time::Duration;

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org";
pub const DEFAULT_TRANSLATE_URL: &str = "https://libretranslate.de/translate";

/// Command-line arguments for the Regional News application.
///
/// # Examples
///
/// ```sh
/// # Twelve filtered European headlines as JSON
/// regional_news --api-key KEY fetch --region europe
///
/// # Full text of one article, translated for South America
/// regional_news article --url https://example.com/story --region south-america
///
/// # Refresh every region once a day
/// regional_news watch --interval-hours 24
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// NewsAPI key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Base URL of the NewsAPI-compatible service
    #[arg(long, env = "NEWS_API_URL", default_value = DEFAULT_NEWS_API_URL)]
    pub news_api_url: String,

    /// LibreTranslate-compatible translation endpoint
    #[arg(long, env = "TRANSLATE_URL", default_value = DEFAULT_TRANSLATE_URL)]
    pub translate_url: String,

    /// Timeout for each outbound request, in seconds
    #[arg(long, default_value_t = 15)]
    pub request_timeout_secs: u64,

    /// Wall-clock budget for one regional fetch, in seconds
    #[arg(long, default_value_t = 120)]
    pub fetch_budget_secs: u64,

    /// Article downloads in flight at once
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..=32))]
    pub extract_concurrency: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch up to twelve filtered headlines for a region and print them as JSON
    Fetch {
        #[arg(short, long, default_value = "europe")]
        region: Region,
    },
    /// Fetch, check, and translate the full text of one article
    Article {
        #[arg(short, long)]
        url: String,
        #[arg(short, long, default_value = "europe")]
        region: Region,
    },
    /// Fetch every region now and then again on a fixed interval
    Watch {
        #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u64).range(1..))]
        interval_hours: u64,
    },
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            api_key: self.api_key.clone(),
            news_api_url: self.news_api_url.clone(),
            translate_url: self.translate_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            fetch_budget: Duration::from_secs(self.fetch_budget_secs),
            extract_concurrency: self.extract_concurrency as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_fetch_parsing() {
        let cli = Cli::parse_from([
            "regional_news",
            "--api-key",
            "k",
            "fetch",
            "--region",
            "north-america",
        ]);

        assert_eq!(cli.api_key, "k");
        assert!(matches!(
            cli.command,
            Command::Fetch {
                region: Region::NorthAmerica
            }
        ));
    }

    #[test]
    fn test_cli_article_short_flags_and_defaults() {
        let cli = Cli::parse_from([
            "regional_news",
            "--api-key",
            "k",
            "article",
            "-u",
            "https://example.com/story",
        ]);

        match cli.command {
            Command::Article { url, region } => {
                assert_eq!(url, "https://example.com/story");
                assert_eq!(region, Region::Europe);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_region() {
        let res = Cli::try_parse_from([
            "regional_news",
            "--api-key",
            "k",
            "fetch",
            "--region",
            "africa",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_rejects_zero_interval() {
        let res = Cli::try_parse_from([
            "regional_news",
            "--api-key",
            "k",
            "watch",
            "--interval-hours",
            "0",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_pipeline_config_from_cli() {
        let cli = Cli::parse_from([
            "regional_news",
            "--api-key",
            "k",
            "--news-api-url",
            "http://localhost:9000",
            "--translate-url",
            "http://localhost:5000/translate",
            "--request-timeout-secs",
            "3",
            "--extract-concurrency",
            "2",
            "watch",
        ]);

        let config = cli.pipeline_config();
        assert_eq!(config.news_api_url, "http://localhost:9000");
        assert_eq!(config.translate_url, "http://localhost:5000/translate");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.fetch_budget, Duration::from_secs(120));
        assert_eq!(config.extract_concurrency, 2);
    }
}

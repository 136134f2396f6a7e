//! Best-effort translation through a LibreTranslate-compatible endpoint.
//!
//! The source language is always auto-detected. Any failure (transport
//! error, non-success status, unexpected body) is logged and the input text
//! is handed back unchanged, so callers never see a translation error.

use crate::api::{RetryPolicy, send_with_retry};
use crate::utils::truncate_for_log;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Debug, Clone)]
pub struct Translator {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl Translator {
    pub fn new(client: Client, url: &str, retry: RetryPolicy) -> Self {
        Self {
            client,
            url: url.to_string(),
            retry,
        }
    }

    /// Translate `text` into `target_lang`, or return it untouched on failure.
    ///
    /// # Arguments
    ///
    /// * `text` - The cleaned article text
    /// * `target_lang` - Language code sent as `target` (e.g. `es`)
    ///
    /// # Returns
    ///
    /// The translated text. Blank input, a transport error, a non-success
    /// status, or a body without `translatedText` all yield `text` unchanged.
    #[instrument(level = "info", skip_all, fields(%target_lang, bytes = text.len()))]
    pub async fn translate(&self, text: &str, target_lang: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        let params = [
            ("q", text),
            ("source", "auto"),
            ("target", target_lang),
            ("format", "text"),
        ];
        let resp = match send_with_retry(&self.retry, || self.client.post(&self.url).form(&params))
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Error in translation");
                return text.to_string();
            }
        };

        let status = resp.status();
        let body = match resp.text().await {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "Error reading translation response");
                return text.to_string();
            }
        };
        if !status.is_success() {
            warn!(%status, body = %truncate_for_log(&body, 300), "Translation API error");
            return text.to_string();
        }

        match serde_json::from_str::<TranslateResponse>(&body) {
            Ok(r) => {
                info!(bytes = r.translated_text.len(), "Translated text");
                r.translated_text
            }
            Err(e) => {
                warn!(error = %e, "Malformed translation response");
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_client;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn translator(url: &str) -> Translator {
        Translator::new(
            build_client(Duration::from_secs(5)).unwrap(),
            url,
            RetryPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_translate_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/translate")
                    .body_contains("source=auto")
                    .body_contains("target=es")
                    .body_contains("format=text");
                then.status(200)
                    .json_body(json!({"translatedText": "Hola mundo"}));
            })
            .await;

        let out = translator(&server.url("/translate"))
            .translate("Hello world", "es")
            .await;
        mock.assert_async().await;
        assert_eq!(out, "Hola mundo");
    }

    #[tokio::test]
    async fn test_translate_non_success_returns_original() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/translate");
                then.status(503).body("overloaded");
            })
            .await;

        let out = translator(&server.url("/translate"))
            .translate("Hello world", "es")
            .await;
        assert_eq!(out, "Hello world");
    }

    #[tokio::test]
    async fn test_translate_malformed_body_returns_original() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/translate");
                then.status(200).json_body(json!({"error": "nope"}));
            })
            .await;

        let out = translator(&server.url("/translate"))
            .translate("Hello world", "en")
            .await;
        assert_eq!(out, "Hello world");
    }

    #[tokio::test]
    async fn test_translate_unreachable_returns_original() {
        let out = translator("http://127.0.0.1:1/translate")
            .translate("Hello world", "en")
            .await;
        assert_eq!(out, "Hello world");
    }

    #[tokio::test]
    async fn test_translate_empty_skips_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/translate");
                then.status(200).json_body(json!({"translatedText": "x"}));
            })
            .await;

        let out = translator(&server.url("/translate")).translate("  ", "en").await;
        assert_eq!(out, "  ");
        assert_eq!(mock.hits_async().await, 0);
    }
}

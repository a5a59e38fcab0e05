//! Google Translate backend.
//!
//! Uses the public `translate_a/single` endpoint, one blocking request per
//! text. A single [`GoogleTranslate`] holds one HTTP client with its
//! connection pool and is shared by all slide workers.

use deck_core::{ServiceError, TranslationService};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

/// Public endpoint used by the Google Translate web widgets.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Connection settings for [`GoogleTranslate`].
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Full URL of the `translate_a/single` endpoint.
    pub endpoint: String,
    /// Source language code, or `auto` to let the service detect it.
    pub source_language: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with each request.
    pub user_agent: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            source_language: "auto".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("deck-translate/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Blocking Google Translate client.
#[derive(Debug, Clone)]
pub struct GoogleTranslate {
    client: Client,
    config: GoogleConfig,
}

impl GoogleTranslate {
    /// Build a client with the given settings.
    pub fn new(config: GoogleConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ServiceError::RequestFailed(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

impl TranslationService for GoogleTranslate {
    fn translate(&self, text: &str, target_language: &str) -> Result<String, ServiceError> {
        log::debug!("Translating {} chars to '{}'", text.chars().count(), target_language);

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", self.config.source_language.as_str()),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ServiceError::RequestFailed(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(ServiceError::ApiError {
                status_code: status.as_u16(),
                message: truncate(&body, 200),
            });
        }

        parse_response(&body)
    }
}

/// Extract the translation from a `translate_a/single` response.
///
/// The body is a nested JSON array; element `[0]` lists translated segments
/// as `[translated, original, ...]`. Long inputs come back split into several
/// segments, which are concatenated in order.
pub fn parse_response(body: &str) -> Result<String, ServiceError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ServiceError::ParseError(e.to_string()))?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ServiceError::ParseError("missing translation segments".to_string()))?;

    let mut translated = String::new();
    for segment in segments {
        match segment.get(0) {
            Some(Value::String(part)) => translated.push_str(part),
            Some(Value::Null) => {}
            _ => {
                return Err(ServiceError::ParseError(format!(
                    "unexpected segment: {}",
                    truncate(&segment.to_string(), 80)
                )))
            }
        }
    }

    Ok(translated)
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

pub mod response;
pub mod retry;

use crate::{Config, CorrectionError};
use response::ParseError;
use serde_json::json;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// A grammar-check collaborator. Injected rather than global so that
/// callers (and the session tests) can swap in fakes with controllable
/// timing.
pub trait GrammarProvider {
    fn check_text(&self, text: &str) -> Result<Vec<CorrectionError>, CheckError>;
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("api key is not configured")]
    MissingKey,
    #[error("api key was rejected")]
    InvalidKey,
    #[error("rate limit or quota exceeded")]
    QuotaExceeded,
    #[error("server returned status {status}")]
    Server { status: u16 },
    #[error("unexpected status {status}: {body}")]
    Unexpected { status: u16, body: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CheckError {
    /// User-facing message for each failure class.
    pub fn user_message(&self) -> &'static str {
        match self {
            CheckError::MissingKey | CheckError::InvalidKey => {
                "Grammar service configuration error. Please check your API key."
            }
            CheckError::QuotaExceeded => {
                "Too many requests. Please wait a moment and try again."
            }
            CheckError::Server { .. } => "Server error. Please try again later.",
            CheckError::Unexpected { .. } => "Grammar check failed. Please try again.",
            CheckError::Network(_) => {
                "Unable to connect to the grammar service. Please check your internet connection."
            }
            CheckError::Parse(_) => "Grammar service returned an unexpected response.",
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckError::Network(_) | CheckError::Server { .. } | CheckError::QuotaExceeded
        )
    }
}

/// Blocking client for a Sapling-style edits endpoint.
pub struct HttpChecker {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: String,
    max_retries: usize,
    retry_delay: Duration,
}

impl HttpChecker {
    pub fn new(config: &Config) -> Result<Self, CheckError> {
        let api_key = config.api_key.clone().ok_or(CheckError::MissingKey)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    fn request(&self, text: &str, session_id: &str) -> Result<Vec<CorrectionError>, CheckError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(&json!({
                "key": self.api_key,
                "text": text,
                "session_id": session_id,
            }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => CheckError::InvalidKey,
                429 => CheckError::QuotaExceeded,
                s if s >= 500 => CheckError::Server { status: s },
                s => CheckError::Unexpected {
                    status: s,
                    body: response.text().unwrap_or_else(|_| "unknown error".to_string()),
                },
            });
        }

        let body = response.text()?;
        Ok(response::parse_response(&body, text)?)
    }
}

impl GrammarProvider for HttpChecker {
    fn check_text(&self, text: &str) -> Result<Vec<CorrectionError>, CheckError> {
        // Nothing to check; skip the network round trip entirely.
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let session_id = format!("redline-{}", unix_millis());
        retry::retry_with_backoff(
            self.max_retries,
            self.retry_delay,
            CheckError::is_retryable,
            || self.request(text, &session_id),
        )
    }
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

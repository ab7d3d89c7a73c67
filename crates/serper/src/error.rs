//! Typed error enum for the Serper client.

use thiserror::Error;

/// Errors from Serper API operations.
#[derive(Debug, Error)]
pub enum SerperError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("SERPER_API_KEY não configurada")]
    MissingApiKey,
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("all retries exhausted, last error: {0}")]
    RetriesExhausted(Box<SerperError>),
}

impl SerperError {
    /// Network errors, 429 and 5xx are retried; every other failure is final.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpStatus { code, .. } => *code == 429 || (500..=599).contains(code),
            Self::JsonParse { .. }
            | Self::MissingApiKey
            | Self::ClientInit(_)
            | Self::RetriesExhausted(_) => false,
        }
    }
}

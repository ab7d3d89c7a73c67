use std::time::Duration;

use leadmatch_core::env_config::env_non_empty;

use crate::error::SerperError;
use crate::retry::RetryPolicy;
use crate::types::{OrganicResult, SearchRequest, SearchResponse};

pub const DEFAULT_BASE_URL: &str = "https://google.serper.dev";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the Serper search API.
#[derive(Clone)]
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for SerperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerperClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}

impl SerperClient {
    /// Creates a client with the default retry policy.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(api_key: String, base_url: &str) -> Result<Self, SerperError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SerperError::ClientInit(e.to_string()))?;
        Ok(Self { client, api_key, base_url, retry: RetryPolicy::default() })
    }

    /// Builds a client from `SERPER_API_KEY`, `SERPER_BASE_URL` and the retry variables.
    ///
    /// # Errors
    /// [`SerperError::MissingApiKey`] when `SERPER_API_KEY` is unset or blank.
    pub fn from_env() -> Result<Self, SerperError> {
        let api_key = env_non_empty("SERPER_API_KEY").ok_or(SerperError::MissingApiKey)?;
        let base_url = env_non_empty("SERPER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Ok(Self::new(api_key, &base_url)?.with_retry_policy(RetryPolicy::from_env()))
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs one search and returns its organic results.
    ///
    /// Transient failures (network, 429, 5xx) are retried with exponential
    /// backoff; any other non-success status fails immediately.
    ///
    /// # Errors
    /// The terminal HTTP error, a body parse error, or
    /// [`SerperError::RetriesExhausted`] wrapping the last transient error.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<OrganicResult>, SerperError> {
        let mut last_error: Option<SerperError> = None;

        for attempt in 1..=self.retry.max_attempts {
            if attempt > 1 {
                let delay = self.retry.delay_for(attempt.saturating_sub(1));
                tracing::warn!(
                    attempt,
                    max_attempts = self.retry.max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = ?last_error,
                    "Serper retry"
                );
                tokio::time::sleep(delay).await;
            }

            let response_result = self
                .client
                .post(format!("{}/search", self.base_url))
                .header("X-API-KEY", &self.api_key)
                .json(request)
                .send()
                .await;

            let response = match response_result {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(SerperError::HttpRequest(e));
                    continue;
                },
            };

            let status = response.status();
            if status.is_success() {
                let body = match response.text().await {
                    Ok(b) => b,
                    Err(e) => {
                        last_error = Some(SerperError::HttpRequest(e));
                        continue;
                    },
                };
                let parsed: SearchResponse =
                    serde_json::from_str(&body).map_err(|e| SerperError::JsonParse {
                        context: format!("search response (body: {})", truncate(&body, 200)),
                        source: e,
                    })?;
                tracing::debug!(query = %request.q, results = parsed.organic.len(), "Serper search ok");
                return Ok(parsed.organic);
            }

            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
            let err = SerperError::HttpStatus { code: status.as_u16(), body };
            if err.is_transient() {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        Err(SerperError::RetriesExhausted(Box::new(
            last_error.unwrap_or_else(|| SerperError::ClientInit("no attempt was made".to_owned())),
        )))
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}

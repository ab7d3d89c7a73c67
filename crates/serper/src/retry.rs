//! Exponential backoff policy for outbound search calls.

use std::time::Duration;

use leadmatch_core::env_config::env_parse_with_default;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;
pub const BACKOFF_MULTIPLIER: u32 = 2;

/// How many times a call is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            multiplier: BACKOFF_MULTIPLIER,
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Reads `LEADMATCH_SERPER_MAX_ATTEMPTS`, `LEADMATCH_SERPER_INITIAL_DELAY_MS`
    /// and `LEADMATCH_SERPER_MAX_DELAY_MS`.
    pub fn from_env() -> Self {
        Self {
            max_attempts: env_parse_with_default("LEADMATCH_SERPER_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)
                .max(1),
            initial_delay: Duration::from_millis(env_parse_with_default(
                "LEADMATCH_SERPER_INITIAL_DELAY_MS",
                DEFAULT_INITIAL_DELAY_MS,
            )),
            multiplier: BACKOFF_MULTIPLIER,
            max_delay: Duration::from_millis(env_parse_with_default(
                "LEADMATCH_SERPER_MAX_DELAY_MS",
                DEFAULT_MAX_DELAY_MS,
            )),
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Wait before retry number `retry` (1 = the wait after the first failure).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.checked_pow(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

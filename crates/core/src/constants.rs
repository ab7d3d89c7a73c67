//! Shared constants for leadmatch.
//!
//! Centralizes magic numbers used by more than one crate.

/// Length of a CNPJ once punctuation is stripped.
pub const CNPJ_DIGITS: usize = 14;

/// Name given to a row when no column yields a company name.
pub const FALLBACK_COMPANY_NAME: &str = "Empresa sem nome";

/// Country assumed when a row does not carry one.
pub const DEFAULT_COUNTRY: &str = "Brasil";

/// Maximum target products considered by the similarity scorer.
pub const MAX_SCORED_PRODUCTS: usize = 5;

/// Default number of competitor candidates returned.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Upper bound on competitor candidates returned (DoS protection).
pub const MAX_RESULTS_CAP: usize = 50;

/// Maximum number of rows accepted in one import batch (DoS protection).
pub const MAX_IMPORT_ROWS: usize = 10_000;

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

//! Storage layer for leadmatch
//!
//! Tenant-scoped stores for confirmed companies and pending prospecting
//! candidates, with an in-memory backend and a PostgreSQL backend behind the
//! `postgres` feature.

mod backend;
pub mod error;
mod memory;
#[cfg(feature = "postgres")]
mod pg_migrations;
#[cfg(feature = "postgres")]
mod pg_storage;
pub mod traits;
mod types;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::MemoryStorage;
#[cfg(feature = "postgres")]
pub use pg_storage::PgStorage;
pub use traits::{CandidateStore, CompanyStore};
pub use types::{Company, InsertOutcome};

//! Typed error enum for the service layer.
//!
//! Unifies core, storage and Serper failures into a single error type so the
//! HTTP layer can map them to status codes without downcasting.

use leadmatch_core::CoreError;
use leadmatch_serper::SerperError;
use leadmatch_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Store read or write failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Serper search call failed.
    #[error("serper: {0}")]
    Serper(#[from] SerperError),

    /// Catalog, keyword or mapping configuration was rejected.
    #[error("{0}")]
    Core(#[from] CoreError),

    /// Caller provided invalid input; the message names the offending parameter.
    #[error("{0}")]
    InvalidInput(String),

    /// Required external collaborator is not configured.
    #[error("{0}")]
    NotConfigured(String),
}

impl ServiceError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Serper(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Whether the caller, not the system, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::Core(CoreError::UnknownField(_)))
    }
}

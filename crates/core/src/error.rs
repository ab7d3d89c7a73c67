use std::io;
use std::result::Result as StdResult;

use thiserror::Error;

/// Errors raised by the pure domain layer.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown column mapping field: {0}")]
    UnknownField(String),

    #[error("Unknown business type: {0}")]
    InvalidBusinessType(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid keyword configuration: {0}")]
    InvalidKeywords(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = StdResult<T, CoreError>;

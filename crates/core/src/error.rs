//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("document body is empty")]
    EmptyBody,

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid asset kind: {0}")]
    InvalidAssetKind(String),

    #[error("invalid asset status: {0}")]
    InvalidAssetStatus(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

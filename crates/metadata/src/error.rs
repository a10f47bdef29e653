//! Metadata store error types.

use thiserror::Error;

/// Metadata store operation errors.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MetadataError {
    /// Map a unique-constraint violation to `AlreadyExists`, anything else to `Database`.
    pub(crate) fn on_unique_violation(err: sqlx::Error, what: impl FnOnce() -> String) -> Self {
        let is_unique = err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation());
        if is_unique {
            Self::AlreadyExists(what())
        } else {
            Self::Database(err)
        }
    }
}

/// Result type for metadata operations.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_error_stays_database() {
        let err = MetadataError::on_unique_violation(sqlx::Error::RowNotFound, || {
            "slug 'x'".to_string()
        });
        assert!(matches!(err, MetadataError::Database(sqlx::Error::RowNotFound)));
    }
}

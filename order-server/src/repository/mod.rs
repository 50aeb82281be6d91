//! Repository Module
//!
//! Persists domain records in the key-value store. Records are JSON documents
//! under `<kind>:<id>` keys; a set per kind indexes every live key.

pub mod order;

pub use order::{FindAllPage, FindResult, INDEX_KEY, OrderRepository, order_key};

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::store::StoreError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Failed to (de)serialize record {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store error while trying to {context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Attach what the repository was doing to a store failure
pub(crate) trait StoreContext<T> {
    fn context(self, context: impl Into<String>) -> RepoResult<T>;
}

impl<T> StoreContext<T> for Result<T, StoreError> {
    fn context(self, context: impl Into<String>) -> RepoResult<T> {
        self.map_err(|source| RepoError::Store {
            context: context.into(),
            source,
        })
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(key) => {
                AppError::new(ErrorCode::OrderNotFound).with_detail("key", key)
            }
            RepoError::AlreadyExists(key) => {
                AppError::new(ErrorCode::OrderAlreadyExists).with_detail("key", key)
            }
            RepoError::Serialization { .. } => {
                AppError::with_message(ErrorCode::SerializationError, err.to_string())
            }
            RepoError::Store { .. } => AppError::store(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_repo_error_status_mapping() {
        let err: AppError = RepoError::NotFound("order:1".into()).into();
        assert_eq!(err.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(err.code, ErrorCode::OrderNotFound);

        let err: AppError = RepoError::AlreadyExists("order:1".into()).into();
        assert_eq!(err.http_status(), StatusCode::CONFLICT);

        let err: AppError = RepoError::Store {
            context: "read order:1".into(),
            source: StoreError::Unavailable("connection refused".into()),
        }
        .into();
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::StoreError);
        assert!(err.message.contains("read order:1"));
    }

    #[test]
    fn test_decode_error_is_internal() {
        let source = serde_json::from_str::<u64>("nope").unwrap_err();
        let err: AppError = RepoError::Serialization {
            key: "order:1".into(),
            source,
        }
        .into();
        assert_eq!(err.code, ErrorCode::SerializationError);
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

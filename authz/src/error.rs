//! Error types for the authorization system.
//!
//! # Security Note
//! [`AuthzError::Authorization`] messages are part of the observable contract
//! and reach callers verbatim. They name the user id, the action and the
//! record type, never the rules that were evaluated.

use thiserror::Error;

/// Errors raised by a [`PolicyStorage`](crate::storage::PolicyStorage) implementation.
///
/// `NotFound` is a normal negative answer; everything else is fatal to the
/// authorization call that hit it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No record of `record_type` exists with `id`.
    #[error("No record exists with recordType: {record_type} and recordId: {id}")]
    NotFound { record_type: String, id: String },

    /// The storage backend failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn not_found(record_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            record_type: record_type.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors that can occur during authorization operations.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// The user is not allowed to do what was asked, or does not exist or is inactive.
    ///
    /// When the user lookup failed, the storage error is kept as the source.
    #[error("{message}")]
    Authorization {
        message: String,
        #[source]
        source: Option<StorageError>,
    },

    /// A storage failure other than not-found, propagated unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The authorizer configuration is invalid or could not be read.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AuthzError {
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
            source: None,
        }
    }

    pub fn authorization_caused_by(message: impl Into<String>, source: StorageError) -> Self {
        Self::Authorization {
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }
}

/// A specialized Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;

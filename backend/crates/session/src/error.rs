//! Session Error Types
//!
//! This module provides session-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::document::StoreError;
use platform::storage::StorageError;
use thiserror::Error;

use crate::domain::provider::ProviderError;

/// Session-specific result type alias
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific error variants
#[derive(Debug, Error)]
pub enum SessionError {
    /// Wrong user name or password
    #[error("Invalid user name or password")]
    InvalidCredentials,

    /// Authenticated, but no account record exists
    #[error("User not found")]
    UserNotFound,

    /// Account exists but has not been approved
    #[error("Account is awaiting administrator approval")]
    PendingApproval,

    /// User name already used by another account
    #[error("User name already in use")]
    UsernameTaken,

    /// Operation requires a signed-in identity
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Identity may not perform this operation
    #[error("Operation not permitted")]
    Forbidden,

    /// Provider throttled sign-in attempts
    #[error("Too many sign-in attempts")]
    RateLimited,

    /// User name failed validation
    #[error("Invalid user name: {0}")]
    InvalidUserName(String),

    /// Remote document does not match its schema
    #[error("Malformed {collection}/{id} record: {reason}")]
    MalformedRecord {
        collection: String,
        id: String,
        reason: String,
    },

    /// Administrator credentials are not configured
    #[error("No administrator is configured")]
    AdminNotConfigured,

    /// Identity provider error
    #[error("Identity provider error: {0}")]
    Provider(ProviderError),

    /// Document store error
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    /// Local cache error
    #[error("Local cache error: {0}")]
    Cache(#[from] StorageError),

    /// Cached value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::InvalidCredentials | SessionError::NotAuthenticated => {
                ErrorKind::Unauthorized
            }
            SessionError::UserNotFound => ErrorKind::NotFound,
            SessionError::PendingApproval | SessionError::Forbidden => ErrorKind::Forbidden,
            SessionError::UsernameTaken => ErrorKind::Conflict,
            SessionError::RateLimited => ErrorKind::TooManyRequests,
            SessionError::InvalidUserName(_) => ErrorKind::BadRequest,
            SessionError::MalformedRecord { .. } | SessionError::Serialization(_) => {
                ErrorKind::UnprocessableEntity
            }
            SessionError::AdminNotConfigured => ErrorKind::ServiceUnavailable,
            SessionError::Provider(e) => match e {
                ProviderError::TooManyRequests => ErrorKind::TooManyRequests,
                ProviderError::InvalidCredential => ErrorKind::Unauthorized,
                ProviderError::EmailInUse => ErrorKind::Conflict,
                ProviderError::WeakPassword(_) => ErrorKind::BadRequest,
                ProviderError::Unavailable(_) => ErrorKind::ServiceUnavailable,
            },
            SessionError::Store(StoreError::NotFound { .. }) => ErrorKind::NotFound,
            SessionError::Store(_) => ErrorKind::ServiceUnavailable,
            SessionError::Cache(_) | SessionError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let error = AppError::new(self.kind(), self.to_string());
        match self {
            SessionError::PendingApproval => {
                error.with_action("Wait for an administrator to approve your account")
            }
            SessionError::RateLimited => error.with_action("Wait a few minutes and try again"),
            SessionError::NotAuthenticated => error.with_action("Sign in and try again"),
            SessionError::UsernameTaken => error.with_action("Choose a different user name"),
            _ => error,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            SessionError::Store(e) => {
                tracing::error!(error = %e, "Session document store error");
            }
            SessionError::Cache(e) => {
                tracing::error!(error = %e, "Session cache error");
            }
            SessionError::Provider(e) => {
                tracing::error!(error = %e, "Identity provider error");
            }
            SessionError::MalformedRecord {
                collection,
                id,
                reason,
            } => {
                tracing::error!(%collection, %id, %reason, "Malformed remote record");
            }
            SessionError::Internal(msg) => {
                tracing::error!(message = %msg, "Session internal error");
            }
            SessionError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            SessionError::RateLimited => {
                tracing::warn!("Login attempts throttled by provider");
            }
            _ => {
                tracing::debug!(error = %self, "Session error");
            }
        }
    }
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::TooManyRequests => SessionError::RateLimited,
            ProviderError::InvalidCredential => SessionError::InvalidCredentials,
            ProviderError::EmailInUse => SessionError::UsernameTaken,
            other => SessionError::Provider(other),
        }
    }
}

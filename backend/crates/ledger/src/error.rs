//! Ledger Error Types

use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::id::GoalId;
use platform::storage::StorageError;
use thiserror::Error;

pub type LedgerResult<T> = Result<T, LedgerError>;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Goal not found: {0}")]
    GoalNotFound(GoalId),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Stored goals could not be read: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::GoalNotFound(_) => ErrorKind::NotFound,
            LedgerError::InvalidGoal(_) => ErrorKind::BadRequest,
            LedgerError::Storage(_) => ErrorKind::Internal,
            LedgerError::Serialization(_) => ErrorKind::UnprocessableEntity,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        if self.kind().is_system_error() {
            tracing::error!(error = %self, "Ledger error");
        }
        AppError::new(self.kind(), self.to_string())
    }
}

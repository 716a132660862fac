//! Account Entity
//!
//! The `users/{uid}` document. Every field is required; a document missing
//! one is reported as malformed instead of being read with defaults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::user_id::UserId;

/// Stored account record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    pub username: String,
    pub is_admin: bool,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl AccountRecord {
    /// A freshly signed-up account awaiting approval
    pub fn pending(username: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            is_admin: false,
            is_approved: false,
            created_at,
        }
    }

    /// The administrator's own record, always approved
    pub fn administrator(username: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            is_admin: true,
            is_approved: true,
            created_at,
        }
    }
}

/// Account record together with its uid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: UserId,
    pub record: AccountRecord,
}

/// Approval counts over a set of accounts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub approved: usize,
    pub pending: usize,
}

impl UserStats {
    pub fn from_accounts(accounts: &[Account]) -> Self {
        let approved = accounts.iter().filter(|a| a.record.is_approved).count();
        Self {
            total: accounts.len(),
            approved,
            pending: accounts.len() - approved,
        }
    }
}

//! Identity Entity
//!
//! The currently signed-in principal, as held in memory and mirrored to the
//! local cache under the identity key.

use serde::{Deserialize, Serialize};

use crate::domain::entity::account::AccountRecord;
use crate::domain::value_object::user_id::{UserId, admin_user_id};

/// Current identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: UserId,
    pub username: String,
    pub is_admin: bool,
    pub is_approved: bool,
}

impl Identity {
    /// Synthetic administrator identity; never backed by a provider session
    pub fn administrator(username: impl Into<String>) -> Self {
        Self {
            uid: admin_user_id(),
            username: username.into(),
            is_admin: true,
            is_approved: true,
        }
    }

    pub fn from_record(uid: UserId, record: &AccountRecord) -> Self {
        Self {
            uid,
            username: record.username.clone(),
            is_admin: record.is_admin,
            is_approved: record.is_approved,
        }
    }

    /// Whether this identity may hold a session
    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_admin || self.is_approved
    }
}

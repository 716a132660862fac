//! Email Value Object
//!
//! Accounts never enter an email: the identity provider is addressed with a
//! synthetic `<user name>@<domain>` address derived from the user name.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::user_name::UserName;

/// Default domain for derived addresses
pub const DEFAULT_EMAIL_DOMAIN: &str = "user.com";

/// Provider login address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Derive the provider address for `user_name`
    pub fn derive(user_name: &UserName, domain: &str) -> Self {
        Self(format!(
            "{}@{}",
            user_name.canonical(),
            domain.trim().to_lowercase()
        ))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

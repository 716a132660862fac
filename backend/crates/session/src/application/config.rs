//! Application Configuration
//!
//! Configuration for the Session application layer.

use std::fmt;

use crate::domain::value_object::email::DEFAULT_EMAIL_DOMAIN;
use crate::domain::value_object::{user_id::UserId, user_name::UserName};

/// Administrator sign-in credentials
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Exact match on both fields
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Local cache keys
#[derive(Debug, Clone)]
pub struct CacheKeys {
    /// Current identity
    pub user: String,
    /// Current data snapshot
    pub user_data: String,
    /// Prefix of the per-user goal list key
    pub goals: String,
}

impl Default for CacheKeys {
    fn default() -> Self {
        Self {
            user: "jf_user".to_string(),
            user_data: "jf_user_data".to_string(),
            goals: "jf_goals".to_string(),
        }
    }
}

/// Session application configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Administrator credentials; admin sign-in is refused when unset
    pub admin: Option<AdminCredentials>,
    /// Domain of the synthetic provider email
    pub email_domain: String,
    pub cache_keys: CacheKeys,
    /// Unauthenticated entry point, returned by sign-out
    pub login_route: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            admin: None,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            cache_keys: CacheKeys::default(),
            login_route: "/login".to_string(),
        }
    }
}

impl SessionConfig {
    /// Create config for development (well-known administrator credentials)
    pub fn development() -> Self {
        Self::default().with_admin("januzzi", "januzzi@!")
    }

    pub fn with_admin(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin = Some(AdminCredentials::new(username, password));
        self
    }

    pub fn with_email_domain(mut self, domain: impl Into<String>) -> Self {
        self.email_domain = domain.into();
        self
    }

    /// Whether `user_name` is the administrator's sign-in name
    pub fn is_admin_name(&self, user_name: &UserName) -> bool {
        self.admin
            .as_ref()
            .is_some_and(|admin| user_name.matches(&admin.username))
    }

    /// Cache key of the goal list owned by `uid`
    pub fn goals_key(&self, uid: &UserId) -> String {
        format!("{}:{}", self.cache_keys.goals, uid)
    }
}

//! Identity Provider Port
//!
//! Interface to the external authentication service. The provider owns
//! credentials and the remote session; everything else about an account
//! lives in the document store.

use thiserror::Error;
use tokio::sync::watch;

use crate::domain::value_object::{email::Email, user_id::UserId};

/// Remote session established by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub uid: UserId,
    pub email: Email,
}

/// Errors reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Too many requests")]
    TooManyRequests,

    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Password rejected: {0}")]
    WeakPassword(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Identity provider trait
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Sign in with email and password
    async fn authenticate(&self, email: &Email, password: &str) -> ProviderResult<ProviderSession>;

    /// Register a credential; the new account becomes the current session
    async fn create_account(&self, email: &Email, password: &str)
    -> ProviderResult<ProviderSession>;

    /// End the current remote session, if any
    async fn end_session(&self) -> ProviderResult<()>;

    /// Session the provider currently considers signed in
    async fn current_session(&self) -> Option<ProviderSession>;

    /// Session-change notifications
    fn subscribe(&self) -> watch::Receiver<Option<ProviderSession>>;
}

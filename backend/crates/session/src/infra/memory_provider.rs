//! Embedded Identity Provider
//!
//! Self-contained stand-in for the hosted authentication service:
//! - Argon2id password hashes (optional pepper, tunable cost)
//! - "Too many requests" after repeated failed sign-ins per email
//! - A single current session broadcast over a `watch` channel
//!
//! With a snapshot path, accounts and the current session survive restarts,
//! which is what lets the CLI restore a session on startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use platform::password::{ClearTextPassword, HashCost, HashedPassword};
use platform::rate_limit::{MemoryRateLimitStore, RateLimitConfig, RateLimitStore};
use platform::storage::{StorageError, read_json_or_default, write_json_atomic};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::domain::provider::{IdentityProvider, ProviderError, ProviderResult, ProviderSession};
use crate::domain::value_object::{email::Email, user_id::UserId};

/// Embedded provider options
#[derive(Debug, Clone, Default)]
pub struct MemoryProviderConfig {
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    pub hash_cost: HashCost,
    /// Failed sign-ins allowed per email before throttling
    pub failed_attempts: RateLimitConfig,
}

impl MemoryProviderConfig {
    /// Minimal hash cost, for tests and local development
    pub fn fast() -> Self {
        Self {
            hash_cost: HashCost::minimal(),
            ..Self::default()
        }
    }

    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    uid: UserId,
    password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    uid: UserId,
    email: Email,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProviderSnapshot {
    /// Keyed by email
    accounts: BTreeMap<String, StoredCredential>,
    #[serde(default)]
    session: Option<StoredSession>,
}

/// In-process identity provider
pub struct MemoryIdentityProvider {
    accounts: RwLock<BTreeMap<String, StoredCredential>>,
    session: watch::Sender<Option<ProviderSession>>,
    failures: MemoryRateLimitStore,
    config: MemoryProviderConfig,
    snapshot: Option<PathBuf>,
}

impl MemoryIdentityProvider {
    pub fn new(config: MemoryProviderConfig) -> Self {
        Self::from_snapshot(ProviderSnapshot::default(), config, None)
    }

    /// Load accounts and session from `path` (empty if missing) and write back on changes
    pub fn open(path: impl Into<PathBuf>, config: MemoryProviderConfig) -> Result<Self, StorageError> {
        let path = path.into();
        let snapshot: ProviderSnapshot = read_json_or_default(&path)?;

        tracing::debug!(
            path = %path.display(),
            accounts = snapshot.accounts.len(),
            signed_in = snapshot.session.is_some(),
            "Identity provider loaded"
        );

        Ok(Self::from_snapshot(snapshot, config, Some(path)))
    }

    fn from_snapshot(
        snapshot: ProviderSnapshot,
        config: MemoryProviderConfig,
        path: Option<PathBuf>,
    ) -> Self {
        let session = snapshot.session.map(|s| ProviderSession {
            uid: s.uid,
            email: s.email,
        });
        let (sender, _) = watch::channel(session);

        Self {
            accounts: RwLock::new(snapshot.accounts),
            session: sender,
            failures: MemoryRateLimitStore::new(),
            config,
            snapshot: path,
        }
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn set_session(&self, session: Option<ProviderSession>) -> ProviderResult<()> {
        self.session.send_replace(session);
        self.persist()
    }

    fn persist(&self) -> ProviderResult<()> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let snapshot = ProviderSnapshot {
            accounts: self.accounts.read().clone(),
            session: self.session.borrow().as_ref().map(|s| StoredSession {
                uid: s.uid.clone(),
                email: s.email.clone(),
            }),
        };
        write_json_atomic(path, &snapshot).map_err(|e| ProviderError::Unavailable(e.to_string()))
    }

    async fn reject(&self, email: &Email) -> ProviderError {
        let result = self
            .failures
            .check_and_increment(email.as_str(), &self.config.failed_attempts)
            .await;

        tracing::debug!(
            email = %email,
            remaining = result.remaining,
            "Rejected sign-in"
        );
        ProviderError::InvalidCredential
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    async fn authenticate(&self, email: &Email, password: &str) -> ProviderResult<ProviderSession> {
        let limit = self
            .failures
            .peek(email.as_str(), &self.config.failed_attempts)
            .await;
        if !limit.allowed {
            tracing::warn!(
                email = %email,
                reset_in_secs = limit.reset_in.as_secs(),
                "Sign-in throttled"
            );
            return Err(ProviderError::TooManyRequests);
        }

        let Ok(password) = ClearTextPassword::new(password) else {
            return Err(self.reject(email).await);
        };

        let credential = self.accounts.read().get(email.as_str()).cloned();
        let Some(credential) = credential else {
            return Err(self.reject(email).await);
        };

        let hash = HashedPassword::from_phc_string(credential.password_hash)
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        if !hash.verify(&password, self.config.pepper()) {
            return Err(self.reject(email).await);
        }

        self.failures.reset(email.as_str()).await;

        let session = ProviderSession {
            uid: credential.uid,
            email: email.clone(),
        };
        self.set_session(Some(session.clone()))?;
        Ok(session)
    }

    async fn create_account(
        &self,
        email: &Email,
        password: &str,
    ) -> ProviderResult<ProviderSession> {
        let password = ClearTextPassword::new(password)
            .map_err(|e| ProviderError::WeakPassword(e.to_string()))?;
        let hash = password
            .hash(self.config.pepper(), self.config.hash_cost)
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let uid = UserId::generate();
        {
            let mut accounts = self.accounts.write();
            if accounts.contains_key(email.as_str()) {
                return Err(ProviderError::EmailInUse);
            }
            accounts.insert(
                email.as_str().to_string(),
                StoredCredential {
                    uid: uid.clone(),
                    password_hash: hash.as_phc_string().to_string(),
                },
            );
        }

        tracing::debug!(uid = %uid, email = %email, "Provider account created");

        let session = ProviderSession {
            uid,
            email: email.clone(),
        };
        self.set_session(Some(session.clone()))?;
        Ok(session)
    }

    async fn end_session(&self) -> ProviderResult<()> {
        if self.session.borrow().is_none() {
            return Ok(());
        }
        self.set_session(None)
    }

    async fn current_session(&self) -> Option<ProviderSession> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<ProviderSession>> {
        self.session.subscribe()
    }
}

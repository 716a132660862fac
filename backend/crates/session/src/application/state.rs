//! Session State
//!
//! The current identity and its data snapshot, held in memory and mirrored
//! to the local cache. All transitions are serialized through one gate so
//! that a sign-in and a provider-driven restoration never interleave.

use std::sync::Arc;

use ledger::UserData;
use platform::storage::KeyValueStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::application::config::CacheKeys;
use crate::domain::entity::identity::Identity;
use crate::error::SessionResult;

/// Explicit session context owned by the composition root
pub struct SessionState {
    identity: RwLock<Option<Identity>>,
    user_data: RwLock<Option<UserData>>,
    transitions: Mutex<()>,
    cache: Arc<dyn KeyValueStore>,
    keys: CacheKeys,
}

impl SessionState {
    /// Anonymous state; the cache is not read
    pub fn new(cache: Arc<dyn KeyValueStore>, keys: CacheKeys) -> Self {
        Self::with(None, None, cache, keys)
    }

    /// Rebuild state from the local cache
    ///
    /// Unreadable entries, a snapshot without an identity, and unapproved
    /// non-administrator identities are removed from the cache.
    pub fn load(cache: Arc<dyn KeyValueStore>, keys: CacheKeys) -> SessionResult<Self> {
        let identity: Option<Identity> = read_entry(cache.as_ref(), &keys.user)?;

        let identity = match identity {
            Some(identity) if !identity.is_active() => {
                tracing::warn!(uid = %identity.uid, "Dropping cached identity pending approval");
                None
            }
            other => other,
        };

        let Some(identity) = identity else {
            cache.remove(&keys.user)?;
            cache.remove(&keys.user_data)?;
            return Ok(Self::new(cache, keys));
        };

        let user_data: Option<UserData> = read_entry(cache.as_ref(), &keys.user_data)?;

        tracing::debug!(
            uid = %identity.uid,
            has_data = user_data.is_some(),
            "Session loaded from cache"
        );
        Ok(Self::with(Some(identity), user_data, cache, keys))
    }

    fn with(
        identity: Option<Identity>,
        user_data: Option<UserData>,
        cache: Arc<dyn KeyValueStore>,
        keys: CacheKeys,
    ) -> Self {
        Self {
            identity: RwLock::new(identity),
            user_data: RwLock::new(user_data),
            transitions: Mutex::new(()),
            cache,
            keys,
        }
    }

    /// Wait for exclusive access to perform a state transition
    pub async fn begin_transition(&self) -> MutexGuard<'_, ()> {
        self.transitions.lock().await
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.identity.read().await.clone()
    }

    pub async fn user_data(&self) -> Option<UserData> {
        self.user_data.read().await.clone()
    }

    pub fn cache(&self) -> &Arc<dyn KeyValueStore> {
        &self.cache
    }

    /// Replace identity and snapshot together
    pub async fn establish(&self, identity: Identity, data: UserData) -> SessionResult<()> {
        write_entry(self.cache.as_ref(), &self.keys.user, &identity)?;
        write_entry(self.cache.as_ref(), &self.keys.user_data, &data)?;

        *self.identity.write().await = Some(identity);
        *self.user_data.write().await = Some(data);
        Ok(())
    }

    pub async fn set_identity(&self, identity: Identity) -> SessionResult<()> {
        write_entry(self.cache.as_ref(), &self.keys.user, &identity)?;
        *self.identity.write().await = Some(identity);
        Ok(())
    }

    pub async fn set_user_data(&self, data: UserData) -> SessionResult<()> {
        write_entry(self.cache.as_ref(), &self.keys.user_data, &data)?;
        *self.user_data.write().await = Some(data);
        Ok(())
    }

    /// Return to anonymous; memory is cleared even if the cache cannot be
    pub async fn clear(&self) -> SessionResult<()> {
        *self.identity.write().await = None;
        *self.user_data.write().await = None;

        let user = self.cache.remove(&self.keys.user);
        let user_data = self.cache.remove(&self.keys.user_data);
        user?;
        user_data?;
        Ok(())
    }
}

/// Decode a cache entry; an unreadable entry is removed and read as absent
fn read_entry<T: DeserializeOwned>(cache: &dyn KeyValueStore, key: &str) -> SessionResult<Option<T>> {
    let Some(raw) = cache.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry");
            cache.remove(key)?;
            Ok(None)
        }
    }
}

fn write_entry<T: Serialize>(cache: &dyn KeyValueStore, key: &str, value: &T) -> SessionResult<()> {
    let raw = serde_json::to_string(value)?;
    cache.set(key, &raw)?;
    Ok(())
}

//! User Data Use Case
//!
//! Keeps the local mirror of the data snapshot and propagates changes to the
//! remote store for non-administrator identities.

use std::sync::Arc;

use ledger::{UserData, UserDataPatch};

use crate::application::state::SessionState;
use crate::domain::repository::UserDataRepository;
use crate::error::SessionResult;

/// User data use case
pub struct UserDataUseCase<D>
where
    D: UserDataRepository,
{
    user_data_repo: Arc<D>,
    state: Arc<SessionState>,
}

impl<D> UserDataUseCase<D>
where
    D: UserDataRepository,
{
    pub fn new(user_data_repo: Arc<D>, state: Arc<SessionState>) -> Self {
        Self {
            user_data_repo,
            state,
        }
    }

    /// Current snapshot, `None` when anonymous
    pub async fn get(&self) -> Option<UserData> {
        if self.state.identity().await.is_none() {
            return None;
        }
        self.state.user_data().await
    }

    /// Merge `patch` into the snapshot
    ///
    /// Returns the merged snapshot, or `None` without doing anything when
    /// anonymous. A failed remote write leaves local state untouched.
    pub async fn update(&self, patch: UserDataPatch) -> SessionResult<Option<UserData>> {
        let _transition = self.state.begin_transition().await;

        let Some(identity) = self.state.identity().await else {
            tracing::debug!("Ignoring data update without a current identity");
            return Ok(None);
        };

        let merged = self.state.user_data().await.unwrap_or_default().merge(patch);

        if identity.is_admin {
            tracing::debug!("Administrator data stays local");
        } else {
            self.user_data_repo.update(&identity.uid, &merged).await?;
        }

        self.state.set_user_data(merged.clone()).await?;

        tracing::info!(
            uid = %identity.uid,
            transactions = merged.transactions.len(),
            categories = merged.categories.len(),
            "User data updated"
        );
        Ok(Some(merged))
    }
}

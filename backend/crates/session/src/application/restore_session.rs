//! Restore Session Use Case
//!
//! Reacts to provider session changes by rebuilding the identity and its data
//! snapshot from the remote store. Also hosts the post-authentication step it
//! shares with sign-in.

use std::sync::Arc;

use ledger::UserData;

use crate::application::state::SessionState;
use crate::domain::entity::identity::Identity;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{AccountRepository, UserDataRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{SessionError, SessionResult};

/// Outcome of a restoration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The provider has no session
    NoSession,
    /// The current identity already covers the provider session
    AlreadyCurrent,
    /// Identity rebuilt from the remote store
    Restored(Identity),
}

/// Build the identity and snapshot of an authenticated account
///
/// The account record must exist and be approved. A missing snapshot is
/// seeded remotely with an empty one.
pub(crate) async fn load_account_session<A, D>(
    accounts: &A,
    user_data: &D,
    uid: &UserId,
) -> SessionResult<(Identity, UserData)>
where
    A: AccountRepository,
    D: UserDataRepository,
{
    let record = accounts
        .find_by_id(uid)
        .await?
        .ok_or(SessionError::UserNotFound)?;

    if !record.is_approved {
        return Err(SessionError::PendingApproval);
    }

    let identity = Identity::from_record(uid.clone(), &record);

    let data = match user_data.find(uid).await? {
        Some(data) => data,
        None => {
            tracing::info!(uid = %uid, "Seeding empty data snapshot");
            let data = UserData::default();
            user_data.save(uid, &data).await?;
            data
        }
    };

    Ok((identity, data))
}

/// Restore session use case
pub struct RestoreSessionUseCase<P, A, D>
where
    P: IdentityProvider,
    A: AccountRepository,
    D: UserDataRepository,
{
    provider: Arc<P>,
    account_repo: Arc<A>,
    user_data_repo: Arc<D>,
    state: Arc<SessionState>,
}

impl<P, A, D> RestoreSessionUseCase<P, A, D>
where
    P: IdentityProvider,
    A: AccountRepository,
    D: UserDataRepository,
{
    pub fn new(
        provider: Arc<P>,
        account_repo: Arc<A>,
        user_data_repo: Arc<D>,
        state: Arc<SessionState>,
    ) -> Self {
        Self {
            provider,
            account_repo,
            user_data_repo,
            state,
        }
    }

    /// Any failure ends the remote session and clears local state before it is returned
    pub async fn execute(&self) -> SessionResult<RestoreOutcome> {
        let _transition = self.state.begin_transition().await;

        // Read after acquiring the gate: the notification may be stale by now
        let Some(session) = self.provider.current_session().await else {
            return Ok(RestoreOutcome::NoSession);
        };

        if let Some(current) = self.state.identity().await {
            if current.is_admin || current.uid == session.uid {
                tracing::debug!(uid = %current.uid, "Session already current");
                return Ok(RestoreOutcome::AlreadyCurrent);
            }
        }

        let result = async {
            let (identity, data) = load_account_session(
                self.account_repo.as_ref(),
                self.user_data_repo.as_ref(),
                &session.uid,
            )
            .await?;
            self.state.establish(identity.clone(), data).await?;
            Ok::<_, SessionError>(identity)
        }
        .await;

        match result {
            Ok(identity) => {
                tracing::info!(
                    uid = %identity.uid,
                    username = %identity.username,
                    "Session restored"
                );
                Ok(RestoreOutcome::Restored(identity))
            }
            Err(e) => {
                tracing::warn!(uid = %session.uid, error = %e, "Session restoration rejected");
                if let Err(end) = self.provider.end_session().await {
                    tracing::warn!(error = %end, "Failed to end remote session");
                }
                if let Err(clear) = self.state.clear().await {
                    clear.log();
                }
                Err(e)
            }
        }
    }
}

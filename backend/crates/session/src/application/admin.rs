//! Admin Use Case
//!
//! User directory and approval for the administrator. These operations act on
//! account records directly and never touch the caller's own session.

use std::sync::Arc;

use crate::application::state::SessionState;
use crate::domain::entity::account::{Account, UserStats};
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{SessionError, SessionResult};

/// Admin use case
pub struct AdminUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    state: Arc<SessionState>,
}

impl<A> AdminUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, state: Arc<SessionState>) -> Self {
        Self {
            account_repo,
            state,
        }
    }

    /// Every account record
    pub async fn list_users(&self) -> SessionResult<Vec<Account>> {
        self.require_admin().await?;
        self.account_repo.list().await
    }

    /// Accounts whose username contains `term`, ignoring case
    pub async fn search_users(&self, term: &str) -> SessionResult<Vec<Account>> {
        let term = term.trim().to_lowercase();
        let accounts = self.list_users().await?;

        Ok(accounts
            .into_iter()
            .filter(|a| a.record.username.to_lowercase().contains(&term))
            .collect())
    }

    pub async fn stats(&self) -> SessionResult<UserStats> {
        let accounts = self.list_users().await?;
        Ok(UserStats::from_accounts(&accounts))
    }

    pub async fn approve(&self, uid: &UserId) -> SessionResult<()> {
        self.set_approved(uid, true).await
    }

    pub async fn disapprove(&self, uid: &UserId) -> SessionResult<()> {
        self.set_approved(uid, false).await
    }

    async fn set_approved(&self, uid: &UserId, approved: bool) -> SessionResult<()> {
        self.require_admin().await?;
        self.account_repo.set_approved(uid, approved).await?;

        tracing::info!(uid = %uid, approved, "Account approval changed");
        Ok(())
    }

    async fn require_admin(&self) -> SessionResult<()> {
        match self.state.identity().await {
            None => Err(SessionError::NotAuthenticated),
            Some(identity) if !identity.is_admin => {
                tracing::warn!(uid = %identity.uid, "Non-administrator attempted an admin operation");
                Err(SessionError::Forbidden)
            }
            Some(_) => Ok(()),
        }
    }
}

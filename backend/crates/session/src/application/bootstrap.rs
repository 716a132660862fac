//! Bootstrap Admin Use Case
//!
//! Creates the administrator's own `users/admin` and `userData/admin`
//! documents so the account shows up in the user directory and its name
//! cannot be claimed at sign-up. The administrator session itself still
//! never writes remotely.

use std::sync::Arc;

use chrono::Utc;
use ledger::UserData;

use crate::application::config::SessionConfig;
use crate::domain::entity::account::AccountRecord;
use crate::domain::repository::{AccountRepository, UserDataRepository};
use crate::domain::value_object::user_id::admin_user_id;
use crate::error::{SessionError, SessionResult};

/// Bootstrap admin use case
pub struct BootstrapAdminUseCase<A, D>
where
    A: AccountRepository,
    D: UserDataRepository,
{
    account_repo: Arc<A>,
    user_data_repo: Arc<D>,
    config: Arc<SessionConfig>,
}

impl<A, D> BootstrapAdminUseCase<A, D>
where
    A: AccountRepository,
    D: UserDataRepository,
{
    pub fn new(account_repo: Arc<A>, user_data_repo: Arc<D>, config: Arc<SessionConfig>) -> Self {
        Self {
            account_repo,
            user_data_repo,
            config,
        }
    }

    /// Returns `true` when the documents were created, `false` if they already existed
    pub async fn execute(&self) -> SessionResult<bool> {
        let admin = self
            .config
            .admin
            .as_ref()
            .ok_or(SessionError::AdminNotConfigured)?;
        let uid = admin_user_id();

        if self.account_repo.find_by_id(&uid).await?.is_some() {
            tracing::debug!("Administrator record already present");
            return Ok(false);
        }

        let record = AccountRecord::administrator(admin.username.as_str(), Utc::now());
        self.account_repo.create(&uid, &record).await?;
        self.user_data_repo.save(&uid, &UserData::default()).await?;

        tracing::info!(username = %admin.username, "Administrator record created");
        Ok(true)
    }
}

//! Sign Up Use Case
//!
//! Creates a new account awaiting administrator approval. The new identity
//! is not signed in.

use std::sync::Arc;

use chrono::Utc;
use ledger::UserData;

use crate::application::config::SessionConfig;
use crate::application::state::SessionState;
use crate::domain::entity::account::AccountRecord;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{AccountRepository, UserDataRepository};
use crate::domain::value_object::{email::Email, user_id::UserId, user_name::UserName};
use crate::error::{SessionError, SessionResult};

/// Sign up input
pub struct SignUpInput {
    pub username: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<P, A, D>
where
    P: IdentityProvider,
    A: AccountRepository,
    D: UserDataRepository,
{
    provider: Arc<P>,
    account_repo: Arc<A>,
    user_data_repo: Arc<D>,
    state: Arc<SessionState>,
    config: Arc<SessionConfig>,
}

impl<P, A, D> SignUpUseCase<P, A, D>
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
        config: Arc<SessionConfig>,
    ) -> Self {
        Self {
            provider,
            account_repo,
            user_data_repo,
            state,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> SessionResult<UserId> {
        let _transition = self.state.begin_transition().await;

        // Validate user name
        let user_name = UserName::new(&input.username)
            .map_err(|e| SessionError::InvalidUserName(e.to_string()))?;

        // Check if user name is taken
        if self.config.is_admin_name(&user_name)
            || self
                .account_repo
                .is_user_name_taken(&user_name, None)
                .await?
        {
            return Err(SessionError::UsernameTaken);
        }

        // Create the provider credential
        let email = Email::derive(&user_name, &self.config.email_domain);
        let session = self
            .provider
            .create_account(&email, &input.password)
            .await?;
        let uid = session.uid;

        // Persist
        let result = async {
            let record = AccountRecord::pending(user_name.as_str(), Utc::now());
            self.account_repo.create(&uid, &record).await?;
            self.user_data_repo.save(&uid, &UserData::default()).await
        }
        .await;

        // Account creation signs the new account in; a pending account may not keep that session
        if let Err(e) = self.provider.end_session().await {
            tracing::warn!(uid = %uid, error = %e, "Failed to end sign-up session");
        }

        result?;

        tracing::info!(uid = %uid, user_name = %user_name, "User signed up");
        Ok(uid)
    }
}

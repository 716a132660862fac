//! Sign In Use Case
//!
//! Authenticates a user and establishes the session.

use std::sync::Arc;

use ledger::UserData;

use crate::application::config::SessionConfig;
use crate::application::restore_session::load_account_session;
use crate::application::state::SessionState;
use crate::domain::entity::identity::Identity;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{AccountRepository, UserDataRepository};
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{SessionError, SessionResult};

/// Sign in input
pub struct SignInInput {
    pub username: String,
    pub password: String,
    /// Use the administrator credential path
    pub admin: bool,
}

/// Sign in use case
pub struct SignInUseCase<P, A, D>
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

impl<P, A, D> SignInUseCase<P, A, D>
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

    pub async fn execute(&self, input: SignInInput) -> SessionResult<Identity> {
        let _transition = self.state.begin_transition().await;

        if input.admin {
            return self.sign_in_admin(&input).await;
        }

        let user_name =
            UserName::new(&input.username).map_err(|_| SessionError::InvalidCredentials)?;
        let email = Email::derive(&user_name, &self.config.email_domain);

        let session = match self.provider.authenticate(&email, &input.password).await {
            Ok(session) => session,
            Err(e) => {
                let err = SessionError::from(e);
                tracing::warn!(user_name = %user_name, error = %err, "Sign-in rejected by provider");
                return Err(err);
            }
        };

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
                    "User signed in"
                );
                Ok(identity)
            }
            Err(e) => {
                // Leave no remote session behind a rejected sign-in
                if let Err(end) = self.provider.end_session().await {
                    tracing::warn!(error = %end, "Failed to end remote session");
                }
                tracing::warn!(uid = %session.uid, error = %e, "Sign-in rejected");
                Err(e)
            }
        }
    }

    async fn sign_in_admin(&self, input: &SignInInput) -> SessionResult<Identity> {
        let admin = self
            .config
            .admin
            .as_ref()
            .filter(|admin| admin.matches(&input.username, &input.password));

        let Some(admin) = admin else {
            tracing::warn!(username = %input.username, "Invalid administrator credentials");
            return Err(SessionError::InvalidCredentials);
        };

        // The administrator never coexists with a remote session, or sign-out would leave it behind
        self.provider.end_session().await?;

        let identity = Identity::administrator(admin.username.clone());
        self.state
            .establish(identity.clone(), UserData::default())
            .await?;

        tracing::info!(username = %identity.username, "Administrator signed in");
        Ok(identity)
    }
}

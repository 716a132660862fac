//! Update Username Use Case

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::application::state::SessionState;
use crate::domain::entity::identity::Identity;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::user_name::UserName;
use crate::error::{SessionError, SessionResult};

/// Update username use case
pub struct UpdateUsernameUseCase<A>
where
    A: AccountRepository,
{
    account_repo: Arc<A>,
    state: Arc<SessionState>,
    config: Arc<SessionConfig>,
}

impl<A> UpdateUsernameUseCase<A>
where
    A: AccountRepository,
{
    pub fn new(account_repo: Arc<A>, state: Arc<SessionState>, config: Arc<SessionConfig>) -> Self {
        Self {
            account_repo,
            state,
            config,
        }
    }

    pub async fn execute(&self, new_username: &str) -> SessionResult<Identity> {
        let _transition = self.state.begin_transition().await;

        let mut identity = self
            .state
            .identity()
            .await
            .ok_or(SessionError::NotAuthenticated)?;

        if identity.is_admin {
            return Err(SessionError::Forbidden);
        }

        let user_name = UserName::new(new_username)
            .map_err(|e| SessionError::InvalidUserName(e.to_string()))?;

        if self.config.is_admin_name(&user_name)
            || self
                .account_repo
                .is_user_name_taken(&user_name, Some(&identity.uid))
                .await?
        {
            return Err(SessionError::UsernameTaken);
        }

        self.account_repo
            .set_user_name(&identity.uid, &user_name)
            .await?;

        let previous = std::mem::replace(&mut identity.username, user_name.to_string());
        self.state.set_identity(identity.clone()).await?;

        tracing::info!(
            uid = %identity.uid,
            from = %previous,
            to = %identity.username,
            "Username updated"
        );
        Ok(identity)
    }
}

//! Session Manager
//!
//! Composition of the session use cases around one [`SessionState`]. The
//! composition root creates it with [`SessionManager::init`] and tears the
//! session down with [`SessionManager::sign_out`].

use std::sync::{Arc, Weak};

use ledger::{GoalsUseCase, UserData, UserDataPatch};
use platform::storage::KeyValueStore;
use tokio::task::JoinHandle;

use crate::application::admin::AdminUseCase;
use crate::application::bootstrap::BootstrapAdminUseCase;
use crate::application::config::SessionConfig;
use crate::application::restore_session::{RestoreOutcome, RestoreSessionUseCase};
use crate::application::route_guard::{self, Route, RouteDecision};
use crate::application::sign_in::{SignInInput, SignInUseCase};
use crate::application::sign_out::SignOutUseCase;
use crate::application::sign_up::{SignUpInput, SignUpUseCase};
use crate::application::state::SessionState;
use crate::application::update_username::UpdateUsernameUseCase;
use crate::application::user_data::UserDataUseCase;
use crate::domain::entity::account::{Account, UserStats};
use crate::domain::entity::identity::Identity;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::{AccountRepository, UserDataRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{SessionError, SessionResult};

/// Session manager
pub struct SessionManager<P, R> {
    provider: Arc<P>,
    repo: Arc<R>,
    state: Arc<SessionState>,
    config: Arc<SessionConfig>,
}

impl<P, R> SessionManager<P, R>
where
    P: IdentityProvider,
    R: AccountRepository + UserDataRepository,
{
    /// Create the manager, restoring any session left in the local cache
    pub fn init(
        provider: Arc<P>,
        repo: Arc<R>,
        cache: Arc<dyn KeyValueStore>,
        config: SessionConfig,
    ) -> SessionResult<Self> {
        let state = SessionState::load(cache, config.cache_keys.clone())?;
        Ok(Self {
            provider,
            repo,
            state: Arc::new(state),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
        admin: bool,
    ) -> SessionResult<Identity> {
        let use_case = SignInUseCase::new(
            self.provider.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.state.clone(),
            self.config.clone(),
        );
        use_case
            .execute(SignInInput {
                username: username.to_string(),
                password: password.to_string(),
                admin,
            })
            .await
    }

    pub async fn sign_up(&self, username: &str, password: &str) -> SessionResult<UserId> {
        let use_case = SignUpUseCase::new(
            self.provider.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.state.clone(),
            self.config.clone(),
        );
        use_case
            .execute(SignUpInput {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await
    }

    /// Returns the route to navigate to
    pub async fn sign_out(&self) -> SessionResult<String> {
        SignOutUseCase::new(
            self.provider.clone(),
            self.state.clone(),
            self.config.clone(),
        )
        .execute()
        .await
    }

    pub async fn update_username(&self, new_username: &str) -> SessionResult<Identity> {
        UpdateUsernameUseCase::new(self.repo.clone(), self.state.clone(), self.config.clone())
            .execute(new_username)
            .await
    }

    /// Align local state with the provider's current session
    pub async fn restore_session(&self) -> SessionResult<RestoreOutcome> {
        RestoreSessionUseCase::new(
            self.provider.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.state.clone(),
        )
        .execute()
        .await
    }

    pub async fn current_identity(&self) -> Option<Identity> {
        self.state.identity().await
    }

    // ========================================================================
    // Data synchronization
    // ========================================================================

    pub async fn get_user_data(&self) -> Option<UserData> {
        self.user_data().get().await
    }

    pub async fn update_user_data(&self, patch: UserDataPatch) -> SessionResult<Option<UserData>> {
        self.user_data().update(patch).await
    }

    fn user_data(&self) -> UserDataUseCase<R> {
        UserDataUseCase::new(self.repo.clone(), self.state.clone())
    }

    /// Goal list of the current identity
    pub async fn goals(&self) -> SessionResult<GoalsUseCase> {
        let identity = self
            .current_identity()
            .await
            .ok_or(SessionError::NotAuthenticated)?;

        Ok(GoalsUseCase::new(
            self.state.cache().clone(),
            self.config.goals_key(&identity.uid),
        ))
    }

    // ========================================================================
    // Administration
    // ========================================================================

    pub async fn get_all_users(&self) -> SessionResult<Vec<Account>> {
        self.admin().list_users().await
    }

    pub async fn search_users(&self, term: &str) -> SessionResult<Vec<Account>> {
        self.admin().search_users(term).await
    }

    pub async fn user_stats(&self) -> SessionResult<UserStats> {
        self.admin().stats().await
    }

    pub async fn approve_user(&self, uid: &UserId) -> SessionResult<()> {
        self.admin().approve(uid).await
    }

    pub async fn disapprove_user(&self, uid: &UserId) -> SessionResult<()> {
        self.admin().disapprove(uid).await
    }

    fn admin(&self) -> AdminUseCase<R> {
        AdminUseCase::new(self.repo.clone(), self.state.clone())
    }

    /// Create the administrator's remote records if missing
    pub async fn bootstrap_admin(&self) -> SessionResult<bool> {
        BootstrapAdminUseCase::new(self.repo.clone(), self.repo.clone(), self.config.clone())
            .execute()
            .await
    }

    // ========================================================================
    // Routing
    // ========================================================================

    /// Guard verdict for `path`, `None` for unknown paths
    pub async fn check_route(&self, path: &str) -> Option<RouteDecision> {
        let route = Route::from_path(path)?;
        let identity = self.current_identity().await;
        Some(route_guard::guard(route, identity.as_ref()))
    }
}

impl<P, R> SessionManager<P, R>
where
    P: IdentityProvider + Sync + 'static,
    R: AccountRepository + UserDataRepository + Sync + 'static,
{
    /// Restore the session on every provider session change
    ///
    /// The task holds only a weak reference and stops once the manager is
    /// dropped or the provider closes its channel.
    pub fn spawn_session_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let manager: Weak<Self> = Arc::downgrade(self);
        let mut changes = self.provider.subscribe();

        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let Some(manager) = manager.upgrade() else {
                    break;
                };

                match manager.restore_session().await {
                    Ok(outcome) => tracing::debug!(?outcome, "Session change handled"),
                    Err(e) => e.log(),
                }
            }
            tracing::debug!("Session listener stopped");
        })
    }
}

//! Sign Out Use Case
//!
//! Ends the remote session and returns the client to anonymous.

use std::sync::Arc;

use crate::application::config::SessionConfig;
use crate::application::state::SessionState;
use crate::domain::provider::IdentityProvider;
use crate::error::SessionResult;

/// Sign out use case
pub struct SignOutUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
    state: Arc<SessionState>,
    config: Arc<SessionConfig>,
}

impl<P> SignOutUseCase<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>, state: Arc<SessionState>, config: Arc<SessionConfig>) -> Self {
        Self {
            provider,
            state,
            config,
        }
    }

    /// Returns the route to navigate to
    ///
    /// Local state is cleared even when the remote session cannot be ended;
    /// that failure is returned afterwards.
    pub async fn execute(&self) -> SessionResult<String> {
        let _transition = self.state.begin_transition().await;

        let identity = self.state.identity().await;

        // The administrator never holds a remote session
        let remote = match &identity {
            Some(identity) if identity.is_admin => Ok(()),
            _ => self.provider.end_session().await,
        };

        let cleared = self.state.clear().await;

        if let Err(e) = &remote {
            tracing::error!(error = %e, "Failed to end remote session");
        }
        remote?;
        cleared?;

        match identity {
            Some(identity) => tracing::info!(uid = %identity.uid, "User signed out"),
            None => tracing::debug!("Sign-out without a current identity"),
        }

        Ok(self.config.login_route.clone())
    }
}

//! Logout Use Case
//!
//! Invalidates a user session. Idempotent: an unknown or already
//! deleted session logs out cleanly.

use std::sync::Arc;

use crate::application::{config::AuthConfig, session_token};
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, session_token: &str) -> AuthResult<()> {
        // A forged or stale token still clears the cookie on the way out.
        let Ok(session_id) = session_token::parse(&self.config.session_secret, session_token)
        else {
            return Ok(());
        };

        self.session_repo.delete(session_id).await?;

        tracing::info!(session_id = %session_id, "User logged out");
        Ok(())
    }
}

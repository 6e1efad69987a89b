//! Check Session Use Case
//!
//! Verifies the session cookie and loads the authenticated user.

use std::sync::Arc;

use crate::application::{config::AuthConfig, session_token};
use crate::domain::entity::{session::AuthSession, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    /// Just check if the session is valid (returns bool)
    pub async fn is_valid(&self, session_token: &str) -> bool {
        self.get_session(session_token).await.is_ok()
    }

    /// Verify the token, load the session, and evict it when expired
    pub async fn get_session(&self, session_token: &str) -> AuthResult<AuthSession> {
        let session_id = session_token::parse(&self.config.session_secret, session_token)?;

        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired() {
            self.session_repo.delete(session_id).await?;
            return Err(AuthError::SessionInvalid);
        }

        Ok(session)
    }

    /// Resolve the session to its user
    pub async fn current_user(&self, session_token: &str) -> AuthResult<User> {
        let session = self.get_session(session_token).await?;

        self.user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AuthError::SessionInvalid)
    }
}

//! Provider Sign-In Use Case
//!
//! Exchanges a Google access token for a profile, then signs the user
//! in, creating the account on first contact. Provider accounts carry
//! no password and start out verified.

use std::sync::Arc;

use crate::application::{config::AuthConfig, session_token};
use crate::domain::entity::{credential::Credential, session::AuthSession, user::User};
use crate::domain::gateway::ProviderIdentity;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{account_type::AccountType, email::Email};
use crate::error::{AuthError, AuthResult};

/// Provider sign-in output
pub struct ProviderSignInOutput {
    pub session_token: String,
    pub user: User,
    /// Whether this call created the account
    pub created: bool,
}

/// Provider sign-in use case
pub struct ProviderSignInUseCase<U, S, P>
where
    U: UserRepository,
    S: SessionRepository,
    P: ProviderIdentity,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<U, S, P> ProviderSignInUseCase<U, S, P>
where
    U: UserRepository,
    S: SessionRepository,
    P: ProviderIdentity,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        provider: Arc<P>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            provider,
            config,
        }
    }

    pub async fn execute(&self, access_token: &str) -> AuthResult<ProviderSignInOutput> {
        let profile = self.provider.exchange_access_token(access_token).await?;

        if !profile.email_verified {
            return Err(AuthError::ProviderRejected(
                "Provider email address is not verified".to_string(),
            ));
        }

        let email = Email::new(profile.email).map_err(AuthError::from)?;

        let (mut user, created) = match self.user_repo.find_by_email(&email).await? {
            Some(existing) => {
                if existing.account_type != AccountType::Google {
                    return Err(AuthError::ProviderRejected(
                        "Email is registered with password sign-in".to_string(),
                    ));
                }
                (existing, false)
            }
            None => {
                let user = User::new_provider(profile.name, email, profile.picture);
                let credential = Credential::new_provider(user.user_id);
                self.user_repo.create(&user, &credential).await?;

                tracing::info!(public_id = %user.public_id, "Provider account created");
                (user, true)
            }
        };

        user.record_login();
        self.user_repo.update(&user).await?;

        let session = AuthSession::new(
            user.user_id,
            user.public_id,
            self.config.session_ttl_chrono(),
        );
        self.session_repo.create(&session).await?;

        let token = session_token::sign(&self.config.session_secret, session.session_id);

        tracing::info!(
            public_id = %user.public_id,
            session_id = %session.session_id,
            created,
            "Provider sign-in"
        );

        Ok(ProviderSignInOutput {
            session_token: token,
            user,
            created,
        })
    }
}

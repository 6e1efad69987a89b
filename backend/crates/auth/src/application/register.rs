//! Registration Use Cases
//!
//! Account creation, verification-mail resend, and email verification.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::{credential::Credential, user::User};
use crate::domain::gateway::Mailer;
use crate::domain::repository::{CredentialRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub keywords: Vec<String>,
}

/// Register output
pub struct RegisterOutput {
    pub public_id: String,
}

/// Register use case
pub struct RegisterUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, M> RegisterUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("Name is required".to_string()));
        }

        let email = Email::new(input.email).map_err(AuthError::from)?;

        // Advisory pre-check; the unique index is the real guard and a
        // concurrent duplicate still surfaces as EmailTaken below.
        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password = ClearTextPassword::new(input.password)?;
        let password_hash = password.hash(self.config.pepper())?;

        let mut user = User::new_credentials(name, email);
        user.merge_keywords(input.keywords);

        let credential = Credential::new_credentials(
            user.user_id,
            password_hash,
            self.config.verify_token_ttl_secs,
        );

        self.user_repo
            .create(&user, &credential)
            .await
            .map_err(|e| match e {
                AuthError::Database(sqlx::Error::Database(db))
                    if db.code().as_deref() == Some("23505") =>
                {
                    AuthError::EmailTaken
                }
                other => other,
            })?;

        tracing::info!(public_id = %user.public_id, "User registered");

        // The account is kept even when the mail bounces; the resend
        // endpoint exists for retry.
        if let Some(token) = &credential.verify_token {
            self.mailer.send_verification(&user, token.as_str()).await?;
        }

        Ok(RegisterOutput {
            public_id: user.public_id.to_string(),
        })
    }
}

/// Resend-verification use case
pub struct ResendVerificationUseCase<U, C, M>
where
    U: UserRepository,
    C: CredentialRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    credential_repo: Arc<C>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, C, M> ResendVerificationUseCase<U, C, M>
where
    U: UserRepository,
    C: CredentialRepository,
    M: Mailer,
{
    pub fn new(
        user_repo: Arc<U>,
        credential_repo: Arc<C>,
        mailer: Arc<M>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            credential_repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let email = Email::new(email).map_err(AuthError::from)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.is_verified {
            return Err(AuthError::Validation(
                "Email is already verified".to_string(),
            ));
        }

        let mut credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        // The pending token is rotated so only the newest mail works.
        let token = credential
            .rotate_verify_token(self.config.verify_token_ttl_secs)
            .clone();
        self.credential_repo.update(&credential).await?;

        self.mailer.send_verification(&user, token.as_str()).await?;

        tracing::info!(public_id = %user.public_id, "Verification mail resent");
        Ok(())
    }
}

/// Verify-email use case
pub struct VerifyEmailUseCase<C>
where
    C: CredentialRepository,
{
    credential_repo: Arc<C>,
}

impl<C> VerifyEmailUseCase<C>
where
    C: CredentialRepository,
{
    pub fn new(credential_repo: Arc<C>) -> Self {
        Self { credential_repo }
    }

    /// Consume the verification token. Exactly one of two concurrent
    /// requests with the same token succeeds.
    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        if token.is_empty() {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        let user_id = self
            .credential_repo
            .consume_verify_token(token)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;

        tracing::info!(user_id = %user_id, "Email verified");
        Ok(())
    }
}

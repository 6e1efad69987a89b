//! Password Use Cases
//!
//! Forgot-password token issuance, reset via token, and authenticated
//! password change.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::gateway::Mailer;
use crate::domain::repository::{CredentialRepository, UserRepository};
use crate::domain::value_object::{email::Email, public_id::PublicId};
use crate::error::{AuthError, AuthResult};

/// Forgot-password use case
pub struct ForgotPasswordUseCase<U, C, M>
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

impl<U, C, M> ForgotPasswordUseCase<U, C, M>
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

        let mut credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        if credential.password_hash.is_none() {
            return Err(AuthError::Validation(
                "This account signs in through an identity provider".to_string(),
            ));
        }

        let token = credential
            .rotate_reset_token(self.config.reset_token_ttl_secs)
            .clone();
        self.credential_repo.update(&credential).await?;

        self.mailer
            .send_password_reset(&user, token.as_str())
            .await?;

        tracing::info!(public_id = %user.public_id, "Password reset mail sent");
        Ok(())
    }
}

/// Reset-password use case
pub struct ResetPasswordUseCase<U, C>
where
    U: UserRepository,
    C: CredentialRepository,
{
    user_repo: Arc<U>,
    credential_repo: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<U, C> ResetPasswordUseCase<U, C>
where
    U: UserRepository,
    C: CredentialRepository,
{
    pub fn new(user_repo: Arc<U>, credential_repo: Arc<C>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            credential_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        public_id: &str,
        token: &str,
        new_password: String,
    ) -> AuthResult<()> {
        let public_id: PublicId = public_id
            .parse()
            .map_err(|_| AuthError::UserNotFound)?;

        let user = self
            .user_repo
            .find_by_public_id(&public_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        // Mismatch and expiry answer differently; the mismatch check is
        // advisory and the conditional consume below is authoritative.
        let pending = credential
            .reset_token
            .as_ref()
            .ok_or(AuthError::InvalidResetToken)?;
        if !pending.matches(token) {
            return Err(AuthError::InvalidResetToken);
        }
        if pending.is_expired() {
            return Err(AuthError::ResetTokenExpired);
        }

        let password = ClearTextPassword::new(new_password)?;
        let new_hash = password.hash(self.config.pepper())?;

        let consumed = self
            .credential_repo
            .consume_reset_token(&user.user_id, token, &new_hash)
            .await?;
        if !consumed {
            // A concurrent request won the race for this token.
            return Err(AuthError::InvalidOrExpiredToken);
        }

        tracing::info!(public_id = %user.public_id, "Password reset");
        Ok(())
    }
}

/// Change-password use case (authenticated)
pub struct ChangePasswordUseCase<C>
where
    C: CredentialRepository,
{
    credential_repo: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<C> ChangePasswordUseCase<C>
where
    C: CredentialRepository,
{
    pub fn new(credential_repo: Arc<C>, config: Arc<AuthConfig>) -> Self {
        Self {
            credential_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        user: &User,
        old_password: String,
        new_password: String,
        confirm_password: String,
    ) -> AuthResult<()> {
        if old_password.is_empty() || new_password.is_empty() || confirm_password.is_empty() {
            return Err(AuthError::Validation(
                "All password fields are required".to_string(),
            ));
        }
        if new_password != confirm_password {
            return Err(AuthError::Validation(
                "New password and confirmation do not match".to_string(),
            ));
        }

        let mut credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        let current_hash = credential
            .password_hash
            .as_ref()
            .ok_or(AuthError::InvalidCredentials)?;

        let old = ClearTextPassword::new(old_password)
            .map_err(|_| AuthError::InvalidCredentials)?;
        if !current_hash.verify(&old, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        let new = ClearTextPassword::new(new_password)?;
        let new_hash = new.hash(self.config.pepper())?;

        credential.update_password(new_hash);
        self.credential_repo.update(&credential).await?;

        tracing::info!(public_id = %user.public_id, "Password changed");
        Ok(())
    }
}

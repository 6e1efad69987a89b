//! Two-Factor Use Cases
//!
//! Enabling, disabling, and confirming TOTP 2FA for an authenticated
//! user. The secret itself is created at signup; these operations only
//! flip the activation flag or check a code.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::CredentialRepository;
use crate::error::{AuthError, AuthResult};

/// Enable / disable 2FA use case
pub struct SetTwoFactorUseCase<C>
where
    C: CredentialRepository,
{
    credential_repo: Arc<C>,
}

impl<C> SetTwoFactorUseCase<C>
where
    C: CredentialRepository,
{
    pub fn new(credential_repo: Arc<C>) -> Self {
        Self { credential_repo }
    }

    pub async fn execute(&self, user: &User, enabled: bool) -> AuthResult<()> {
        let mut credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        if enabled {
            credential.enable_totp();
        } else {
            credential.disable_totp();
        }
        self.credential_repo.update(&credential).await?;

        tracing::info!(public_id = %user.public_id, enabled, "Two-factor setting changed");
        Ok(())
    }
}

/// Standalone code check, used to confirm a 2FA setup
pub struct VerifyTwoFactorUseCase<C>
where
    C: CredentialRepository,
{
    credential_repo: Arc<C>,
    config: Arc<AuthConfig>,
}

impl<C> VerifyTwoFactorUseCase<C>
where
    C: CredentialRepository,
{
    pub fn new(credential_repo: Arc<C>, config: Arc<AuthConfig>) -> Self {
        Self {
            credential_repo,
            config,
        }
    }

    pub async fn execute(&self, user: &User, code: &str) -> AuthResult<()> {
        let credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        let valid = credential
            .totp_secret
            .verify(self.config.totp, code, user.email.as_str())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidTwoFactorCode);
        }

        Ok(())
    }
}

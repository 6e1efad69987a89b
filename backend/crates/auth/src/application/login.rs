//! Login Use Case
//!
//! Authenticates a user and creates a session. When two-factor is
//! enabled and no code accompanies the request, the current code is
//! mailed out and no session is created.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::{config::AuthConfig, session_token};
use crate::domain::entity::{session::AuthSession, user::User};
use crate::domain::gateway::Mailer;
use crate::domain::repository::{CredentialRepository, SessionRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
    /// TOTP code (if 2FA is enabled)
    pub totp_code: Option<String>,
}

/// Login output
pub struct LoginOutput {
    /// Session token for the cookie; None while 2FA is still pending
    pub session_token: Option<String>,
    /// Whether a two-factor code was mailed and must be presented
    pub requires_2fa: bool,
    /// The authenticated user; None while 2FA is still pending
    pub user: Option<User>,
}

/// Login use case
pub struct LoginUseCase<U, C, S, M>
where
    U: UserRepository,
    C: CredentialRepository,
    S: SessionRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    credential_repo: Arc<C>,
    session_repo: Arc<S>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, C, S, M> LoginUseCase<U, C, S, M>
where
    U: UserRepository,
    C: CredentialRepository,
    S: SessionRepository,
    M: Mailer,
{
    pub fn new(
        user_repo: Arc<U>,
        credential_repo: Arc<C>,
        session_repo: Arc<S>,
        mailer: Arc<M>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            credential_repo,
            session_repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        // Unknown email and wrong password answer identically so login
        // cannot be used to enumerate accounts.
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let credential = self
            .credential_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials not found".to_string()))?;

        // Provider accounts have no password to check.
        let password_hash = credential
            .password_hash
            .as_ref()
            .ok_or(AuthError::InvalidCredentials)?;

        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        if !password_hash.verify(&password, self.config.pepper()) {
            return Err(AuthError::InvalidCredentials);
        }

        // Only reachable with valid credentials, so the distinct answer
        // leaks nothing a password-holder does not already know.
        if !user.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        if credential.requires_2fa() {
            match input.totp_code.as_deref() {
                None => {
                    let code = credential
                        .totp_secret
                        .current_code(self.config.totp, user.email.as_str())
                        .map_err(|e| AuthError::Internal(e.to_string()))?;

                    self.mailer
                        .send_two_factor_code(user.email.as_str(), &code)
                        .await?;

                    tracing::info!(public_id = %user.public_id, "Two-factor code mailed");

                    return Ok(LoginOutput {
                        session_token: None,
                        requires_2fa: true,
                        user: None,
                    });
                }
                Some(code) => {
                    let valid = credential
                        .totp_secret
                        .verify(self.config.totp, code, user.email.as_str())
                        .map_err(|e| AuthError::Internal(e.to_string()))?;

                    if !valid {
                        return Err(AuthError::InvalidTwoFactorCode);
                    }
                }
            }
        }

        let mut user = user;
        user.record_login();
        self.user_repo.update(&user).await?;

        // Fresh session id on every login, never reused across logins.
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
            "User logged in"
        );

        Ok(LoginOutput {
            session_token: Some(token),
            requires_2fa: false,
            user: Some(user),
        })
    }
}

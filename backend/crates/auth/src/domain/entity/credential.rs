//! Credential Entity
//!
//! Authentication credentials for a user.
//! Separated from User entity to isolate sensitive data.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{
    one_shot_token::OneShotToken, totp_secret::TotpSecret, user_id::UserId,
};

/// Credential entity
///
/// Contains sensitive authentication data:
/// - Password hash (absent for provider accounts)
/// - TOTP secret, generated at signup and activated on demand
/// - Pending email verification / password reset tokens
#[derive(Debug, Clone)]
pub struct Credential {
    /// Reference to User
    pub user_id: UserId,
    /// Hashed password; None iff the account was created by a provider
    pub password_hash: Option<HashedPassword>,
    /// TOTP secret; present from creation, activation is a separate flag
    pub totp_secret: TotpSecret,
    /// Whether TOTP 2FA is enabled
    pub totp_enabled: bool,
    /// Pending email verification token
    pub verify_token: Option<OneShotToken>,
    /// Pending password reset token
    pub reset_token: Option<OneShotToken>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Create credentials for an email + password signup, with a pending
    /// verification token.
    pub fn new_credentials(
        user_id: UserId,
        password_hash: HashedPassword,
        verify_ttl_secs: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash: Some(password_hash),
            totp_secret: TotpSecret::generate(),
            totp_enabled: false,
            verify_token: Some(OneShotToken::issue(verify_ttl_secs)),
            reset_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create credentials for a provider-backed account (no password,
    /// nothing pending).
    pub fn new_provider(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            password_hash: None,
            totp_secret: TotpSecret::generate(),
            totp_enabled: false,
            verify_token: None,
            reset_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace any pending verification token with a fresh one.
    pub fn rotate_verify_token(&mut self, ttl_secs: i64) -> &OneShotToken {
        self.updated_at = Utc::now();
        self.verify_token.insert(OneShotToken::issue(ttl_secs))
    }

    /// Replace any pending reset token with a fresh one.
    pub fn rotate_reset_token(&mut self, ttl_secs: i64) -> &OneShotToken {
        self.updated_at = Utc::now();
        self.reset_token.insert(OneShotToken::issue(ttl_secs))
    }

    /// Check if 2FA is active for this account
    pub fn requires_2fa(&self) -> bool {
        self.totp_enabled
    }

    /// Enable TOTP 2FA (the secret already exists)
    pub fn enable_totp(&mut self) {
        self.totp_enabled = true;
        self.updated_at = Utc::now();
    }

    /// Disable TOTP 2FA; the secret is kept for later re-activation
    pub fn disable_totp(&mut self) {
        self.totp_enabled = false;
        self.updated_at = Utc::now();
    }

    /// Update password
    pub fn update_password(&mut self, new_hash: HashedPassword) {
        self.password_hash = Some(new_hash);
        self.updated_at = Utc::now();
    }
}

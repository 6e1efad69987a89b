//! Gateway Traits
//!
//! Interfaces to the outside world: outbound mail and external identity
//! providers. Implementations live in the infrastructure layer.

use crate::domain::entity::user::User;
use crate::error::AuthResult;

/// Outbound notification mailer
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Send the email-verification message carrying the one-shot token
    async fn send_verification(&self, user: &User, token: &str) -> AuthResult<()>;

    /// Send the password-reset message carrying the one-shot token
    async fn send_password_reset(&self, user: &User, token: &str) -> AuthResult<()>;

    /// Send a login two-factor code
    async fn send_two_factor_code(&self, email: &str, code: &str) -> AuthResult<()>;
}

/// Profile as reported by an external identity provider
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub email: String,
    pub email_verified: bool,
    pub name: String,
    pub picture: Option<String>,
}

/// External identity provider
#[trait_variant::make(ProviderIdentity: Send)]
pub trait LocalProviderIdentity {
    /// Exchange a provider access token for the profile it belongs to
    async fn exchange_access_token(&self, access_token: &str) -> AuthResult<ProviderProfile>;
}

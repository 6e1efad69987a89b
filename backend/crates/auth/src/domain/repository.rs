//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{credential::Credential, session::AuthSession, user::User};
use crate::domain::value_object::{email::Email, public_id::PublicId, user_id::UserId};
use crate::error::AuthResult;
use platform::password::HashedPassword;
use uuid::Uuid;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user together with its credentials, in one transaction
    async fn create(&self, user: &User, credential: &Credential) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by public ID
    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Auth credentials repository trait
#[trait_variant::make(CredentialRepository: Send)]
pub trait LocalCredentialRepository {
    /// Find credentials by user ID
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credential>>;

    /// Update credentials
    async fn update(&self, credential: &Credential) -> AuthResult<()>;

    /// Atomically consume an unexpired verification token: clears it and
    /// marks the user verified. Returns the owning user ID, or `None` when
    /// the token is unknown, expired, or already consumed.
    async fn consume_verify_token(&self, token: &str) -> AuthResult<Option<UserId>>;

    /// Atomically consume an unexpired reset token and store the new
    /// password hash. Returns false when the token is unknown, expired, or
    /// already consumed; exactly one of two concurrent callers succeeds.
    async fn consume_reset_token(
        &self,
        user_id: &UserId,
        token: &str,
        new_hash: &HashedPassword,
    ) -> AuthResult<bool>;
}

/// Auth session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Create a new session
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Find session by ID
    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>>;

    /// Delete a session
    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Clean up expired sessions, returning the number removed
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

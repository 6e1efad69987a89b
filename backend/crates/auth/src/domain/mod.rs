//! Domain Layer
//!
//! Contains entities, value objects, repository and gateway traits.

pub mod entity;
pub mod gateway;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{credential::Credential, session::AuthSession, user::User};
pub use repository::{CredentialRepository, SessionRepository, UserRepository};

//! Profile Use Case
//!
//! Authenticated profile updates: optional rename and keyword merge.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Update-profile input
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub keywords: Option<Vec<String>>,
}

/// Update-profile use case
pub struct UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, mut user: User, input: UpdateProfileInput) -> AuthResult<User> {
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AuthError::Validation("Name cannot be empty".to_string()));
            }
            user.set_name(name);
        }

        // Keywords are merged, never replaced; existing interests stay.
        if let Some(keywords) = input.keywords {
            user.merge_keywords(keywords);
        }

        self.user_repo.update(&user).await?;

        tracing::info!(public_id = %user.public_id, "Profile updated");
        Ok(user)
    }
}

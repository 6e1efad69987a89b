//! User Entity
//!
//! Core user profile entity containing non-sensitive user data.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_type::AccountType, email::Email, public_id::PublicId, user_id::UserId,
};

/// User entity
///
/// Contains public user profile information.
/// Sensitive auth data is in the Credential entity.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Public-facing nanoid identifier (URL-safe)
    pub public_id: PublicId,
    /// Display name
    pub name: String,
    /// Email address (unique, lowercased)
    pub email: Email,
    /// Avatar URL, if one was supplied (provider accounts usually have one)
    pub image: Option<String>,
    /// Interest keywords attached to the profile
    pub keywords: Vec<String>,
    /// How the account was created
    pub account_type: AccountType,
    /// Whether the email has been verified
    pub is_verified: bool,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new email + password user (unverified until the
    /// verification token is consumed).
    pub fn new_credentials(name: impl Into<String>, email: Email) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            name: name.into(),
            email,
            image: None,
            keywords: Vec::new(),
            account_type: AccountType::Credentials,
            is_verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new provider-backed user. The provider has already
    /// verified the address, so the account starts verified.
    pub fn new_provider(name: impl Into<String>, email: Email, image: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            name: name.into(),
            email,
            image,
            keywords: Vec::new(),
            account_type: AccountType::Google,
            is_verified: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Mark the email address as verified
    pub fn mark_verified(&mut self) {
        self.is_verified = true;
        self.updated_at = Utc::now();
    }

    /// Update display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.updated_at = Utc::now();
    }

    /// Merge new keywords into the profile, keeping existing ones and
    /// skipping duplicates.
    pub fn merge_keywords(&mut self, incoming: Vec<String>) {
        for keyword in incoming {
            if !self.keywords.contains(&keyword) {
                self.keywords.push(keyword);
            }
        }
        self.updated_at = Utc::now();
    }
}

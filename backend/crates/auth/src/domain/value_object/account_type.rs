//! Account Type Value Object
//!
//! Discriminates locally-authenticated (password) accounts from accounts
//! created through an external identity provider. Governs whether the
//! password fields are meaningful and whether provider login is allowed.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(i16)]
pub enum AccountType {
    /// Email + password signup; always has a password hash.
    #[default]
    Credentials = 0,
    /// Created via Google sign-in; no password, email pre-verified.
    Google = 1,
}

impl AccountType {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            AccountType::Credentials => "CREDENTIALS",
            AccountType::Google => "GOOGLE",
        }
    }

    #[inline]
    pub const fn is_credentials(&self) -> bool {
        matches!(self, AccountType::Credentials)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(AccountType::Credentials),
            1 => Some(AccountType::Google),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

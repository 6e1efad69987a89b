//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest vocabulary every crate in the workspace agrees on:
//! - Unified error type, kind taxonomy, and result alias
//! - Typed entity IDs
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;

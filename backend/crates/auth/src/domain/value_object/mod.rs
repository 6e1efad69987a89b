//! Value Object Module

pub mod account_type;
pub mod email;
pub mod one_shot_token;
pub mod public_id;
pub mod totp_secret;
pub mod user_id;

//! Infrastructure Layer
//!
//! Database implementations and external service integrations.

pub mod google;
pub mod postgres;
pub mod smtp;

pub use google::GoogleIdentity;
pub use postgres::PgAuthRepository;
pub use smtp::{MailerConfig, SmtpMailer};

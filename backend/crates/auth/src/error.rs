//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Request payload failed validation
    #[error("{0}")]
    Validation(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Invalid credentials (unknown email or wrong password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Email address not yet verified
    #[error("Email address has not been verified")]
    EmailNotVerified,

    /// Invalid 2FA code
    #[error("Invalid two-factor authentication code")]
    InvalidTwoFactorCode,

    /// Verification token unknown, expired, or already used
    #[error("Invalid or expired token")]
    InvalidOrExpiredToken,

    /// Reset token does not match the pending one
    #[error("Invalid reset token")]
    InvalidResetToken,

    /// Reset token has expired
    #[error("Reset token has expired")]
    ResetTokenExpired,

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Outbound mail delivery failed
    #[error("Failed to send email: {0}")]
    MailDelivery(String),

    /// Identity provider rejected the token or the account
    #[error("{0}")]
    ProviderRejected(String),

    /// Identity provider unreachable
    #[error("Identity provider unavailable")]
    ProviderUnavailable,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::Validation(_)
            | AuthError::PasswordValidation(_)
            | AuthError::InvalidOrExpiredToken
            | AuthError::InvalidResetToken
            | AuthError::ResetTokenExpired
            | AuthError::MailDelivery(_) => ErrorKind::BadRequest,
            AuthError::InvalidCredentials
            | AuthError::EmailNotVerified
            | AuthError::InvalidTwoFactorCode
            | AuthError::SessionInvalid
            | AuthError::ProviderRejected(_) => ErrorKind::Unauthorized,
            AuthError::ProviderUnavailable => ErrorKind::BadGateway,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        // Store and internal failures keep their detail server-side only.
        match self {
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::MailDelivery(msg) => {
                tracing::error!(message = %msg, "Outbound mail delivery failed");
            }
            AuthError::ProviderUnavailable => {
                tracing::error!("Identity provider unreachable");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::PasswordValidation(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::UserNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::InvalidOrExpiredToken.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::ProviderUnavailable.status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_internal_detail_stays_server_side() {
        let err = AuthError::Internal("secret detail".into());
        let app = err.to_app_error();
        assert!(!app.to_string().contains("secret detail"));
    }
}

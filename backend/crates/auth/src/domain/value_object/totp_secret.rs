//! TOTP Secret Value Object
//!
//! Wraps a base32-encoded TOTP secret for two-factor authentication.
//! Step size and accepted skew come from [`TotpParams`] so deployments
//! can tune the code lifetime without touching the domain logic.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use totp_rs::{Algorithm, Secret, TOTP};

const TOTP_ISSUER: &str = "enhancivity";

/// TOTP generation and verification parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpParams {
    /// Time-step length in seconds.
    pub step_secs: u64,
    /// Accepted steps of clock drift on either side of the current step.
    pub skew: u8,
    /// Number of digits in a code.
    pub digits: usize,
}

impl Default for TotpParams {
    fn default() -> Self {
        // One-hour codes with six steps of tolerance, matching the codes
        // delivered over email rather than an authenticator app.
        Self {
            step_secs: 3600,
            skew: 6,
            digits: 6,
        }
    }
}

impl TotpParams {
    /// Standard authenticator-app parameters (30s step, one step skew).
    pub const fn authenticator_app() -> Self {
        Self {
            step_secs: 30,
            skew: 1,
            digits: 6,
        }
    }
}

/// TOTP Secret for two-factor authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpSecret {
    /// Base32-encoded secret
    secret_base32: String,
}

impl TotpSecret {
    /// Generate a new random TOTP secret
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        Self {
            secret_base32: secret.to_encoded().to_string(),
        }
    }

    /// Create from a base32-encoded string (from database)
    pub fn from_base32(secret: impl Into<String>) -> AppResult<Self> {
        let secret_str = secret.into();
        // Validate by trying to decode
        Secret::Encoded(secret_str.clone())
            .to_bytes()
            .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {}", e)))?;

        Ok(Self {
            secret_base32: secret_str,
        })
    }

    /// Get the base32-encoded secret for storage
    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    fn to_totp(&self, params: TotpParams, account_name: &str) -> AppResult<TOTP> {
        let secret = Secret::Encoded(self.secret_base32.clone());

        TOTP::new(
            Algorithm::SHA1,
            params.digits,
            params.skew,
            params.step_secs,
            secret
                .to_bytes()
                .map_err(|e| AppError::internal(format!("Invalid TOTP secret: {}", e)))?,
            Some(TOTP_ISSUER.to_string()),
            account_name.to_string(),
        )
        .map_err(|e| AppError::internal(format!("Failed to create TOTP: {}", e)))
    }

    /// Generate the code for an arbitrary unix timestamp.
    pub fn code_at(&self, params: TotpParams, account_name: &str, unix_secs: u64) -> AppResult<String> {
        let totp = self.to_totp(params, account_name)?;
        Ok(totp.generate(unix_secs))
    }

    /// Generate the current code, for delivery to the user over email.
    pub fn current_code(&self, params: TotpParams, account_name: &str) -> AppResult<String> {
        let totp = self.to_totp(params, account_name)?;
        totp.generate_current()
            .map_err(|e| AppError::internal(format!("Failed to generate TOTP: {}", e)))
    }

    /// Verify a code against the current time window.
    ///
    /// Malformed codes (wrong length, non-digits) never match.
    pub fn verify(&self, params: TotpParams, code: &str, account_name: &str) -> AppResult<bool> {
        if code.len() != params.digits || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(false);
        }
        let totp = self.to_totp(params, account_name)?;
        Ok(totp.check_current(code).unwrap_or(false))
    }

    /// Verify a code at an arbitrary unix timestamp.
    pub fn verify_at(
        &self,
        params: TotpParams,
        code: &str,
        account_name: &str,
        unix_secs: u64,
    ) -> AppResult<bool> {
        if code.len() != params.digits || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(false);
        }
        let totp = self.to_totp(params, account_name)?;
        Ok(totp.check(code, unix_secs))
    }

    /// Get the otpauth:// URL for manual entry into an authenticator app
    pub fn get_otpauth_url(&self, params: TotpParams, account_name: &str) -> AppResult<String> {
        let totp = self.to_totp(params, account_name)?;
        Ok(totp.get_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "test@example.com";

    #[test]
    fn test_totp_secret_generate() {
        let secret = TotpSecret::generate();
        assert!(!secret.as_base32().is_empty());
    }

    #[test]
    fn test_totp_secret_verify() {
        let secret = TotpSecret::generate();
        let params = TotpParams::default();

        let code = secret.current_code(params, ACCOUNT).unwrap();
        assert!(secret.verify(params, &code, ACCOUNT).unwrap());
        assert!(!secret.verify(params, "000000", ACCOUNT).unwrap());
    }

    #[test]
    fn test_totp_secret_rejects_malformed_codes() {
        let secret = TotpSecret::generate();
        let params = TotpParams::default();

        assert!(!secret.verify(params, "", ACCOUNT).unwrap());
        assert!(!secret.verify(params, "12345", ACCOUNT).unwrap());
        assert!(!secret.verify(params, "abcdef", ACCOUNT).unwrap());
        assert!(!secret.verify(params, "1234567", ACCOUNT).unwrap());
    }

    #[test]
    fn test_totp_skew_window() {
        let secret = TotpSecret::generate();
        let params = TotpParams::default();
        let now = 1_700_000_000u64;

        // A code from six steps ago is still inside the accepted window.
        let old = secret
            .code_at(params, ACCOUNT, now - 6 * params.step_secs)
            .unwrap();
        assert!(secret.verify_at(params, &old, ACCOUNT, now).unwrap());

        // Seven steps ago is outside it.
        let stale = secret
            .code_at(params, ACCOUNT, now - 7 * params.step_secs)
            .unwrap();
        assert!(!secret.verify_at(params, &stale, ACCOUNT, now).unwrap());
    }

    #[test]
    fn test_totp_secret_from_base32() {
        let secret = TotpSecret::generate();
        let base32 = secret.as_base32().to_string();

        let restored = TotpSecret::from_base32(base32).unwrap();
        assert_eq!(secret.as_base32(), restored.as_base32());
    }

    #[test]
    fn test_otpauth_url() {
        let secret = TotpSecret::generate();
        let url = secret
            .get_otpauth_url(TotpParams::authenticator_app(), ACCOUNT)
            .unwrap();
        assert!(url.starts_with("otpauth://totp/"));
    }
}

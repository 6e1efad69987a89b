//! SMTP Mailer Implementation
//!
//! Sends verification, password-reset, and two-factor mails over an
//! async SMTP transport with a bounded timeout.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::domain::entity::user::User;
use crate::domain::gateway::Mailer;
use crate::error::{AuthError, AuthResult};

/// SMTP mailer configuration
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    /// From header, e.g. `Enhancivity <no-reply@example.com>`
    pub from_address: String,
    /// Base URL the mail links point at
    pub dashboard_url: String,
    /// Transport timeout
    pub timeout: Duration,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: "Enhancivity <no-reply@localhost>".to_string(),
            dashboard_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Lettre-backed SMTP mailer
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: MailerConfig,
}

impl SmtpMailer {
    pub fn new(config: MailerConfig) -> AuthResult<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| AuthError::Internal(format!("SMTP transport setup failed: {}", e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();

        Ok(Self { transport, config })
    }

    async fn send(&self, to: &str, subject: &str, html_body: String) -> AuthResult<()> {
        let message = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| AuthError::Internal(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AuthError::MailDelivery(format!("Invalid recipient: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AuthError::Internal(format!("Failed to build mail: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::MailDelivery(e.to_string()))?;

        tracing::debug!(to, subject, "Mail sent");
        Ok(())
    }
}

impl Mailer for SmtpMailer {
    async fn send_verification(&self, user: &User, token: &str) -> AuthResult<()> {
        let link = format!(
            "{}/verify?token={}&id={}",
            self.config.dashboard_url,
            token,
            user.public_id.as_str()
        );
        let body = format!(
            "<html><body>\
             <h2>Welcome to Enhancivity, {name}!</h2>\
             <p>Please confirm your email address by clicking the link below. \
             The link expires in one hour.</p>\
             <p><a href=\"{link}\">Verify your email</a></p>\
             <p>If you did not create this account, you can ignore this mail.</p>\
             </body></html>",
            name = user.name,
            link = link,
        );

        self.send(user.email.as_str(), "Verify your email address", body)
            .await
    }

    async fn send_password_reset(&self, user: &User, token: &str) -> AuthResult<()> {
        let link = format!(
            "{}/reset?resetToken={}&id={}",
            self.config.dashboard_url,
            token,
            user.public_id.as_str()
        );
        let body = format!(
            "<html><body>\
             <h2>Password reset requested</h2>\
             <p>Hello {name}, a password reset was requested for your account. \
             The link below expires in one hour.</p>\
             <p><a href=\"{link}\">Reset your password</a></p>\
             <p>If you did not request this, please ignore this mail and your \
             password will stay unchanged.</p>\
             </body></html>",
            name = user.name,
            link = link,
        );

        self.send(user.email.as_str(), "Reset your password", body)
            .await
    }

    async fn send_two_factor_code(&self, email: &str, code: &str) -> AuthResult<()> {
        let body = format!(
            "<html><body>\
             <h2>Your sign-in code</h2>\
             <p>Enter the following code to finish signing in:</p>\
             <p style=\"font-size:24px;letter-spacing:4px\"><strong>{code}</strong></p>\
             <p>If you did not try to sign in, change your password now.</p>\
             </body></html>",
            code = code,
        );

        self.send(email, "Your two-factor sign-in code", body).await
    }
}

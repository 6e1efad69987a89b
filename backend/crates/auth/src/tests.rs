//! Use-case tests against in-memory fakes
//!
//! Covers the register -> verify -> login -> change-password scenario,
//! the two-factor paths, single-use token semantics, provider sign-in,
//! and logout idempotence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use platform::password::HashedPassword;

use crate::application::{
    AuthConfig, ChangePasswordUseCase, CheckSessionUseCase, ForgotPasswordUseCase, LoginInput,
    LoginUseCase, LogoutUseCase, ProviderSignInUseCase, RegisterInput, RegisterUseCase,
    ResendVerificationUseCase, ResetPasswordUseCase, SetTwoFactorUseCase, VerifyEmailUseCase,
};
use crate::domain::entity::{credential::Credential, session::AuthSession, user::User};
use crate::domain::gateway::{Mailer, ProviderIdentity, ProviderProfile};
use crate::domain::repository::{CredentialRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, one_shot_token::OneShotToken, public_id::PublicId, user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

// ============================================================================
// In-memory fakes
// ============================================================================

#[derive(Default)]
struct StoreInner {
    users: Mutex<HashMap<UserId, User>>,
    credentials: Mutex<HashMap<UserId, Credential>>,
    sessions: Mutex<HashMap<Uuid, AuthSession>>,
}

#[derive(Clone, Default)]
struct InMemoryStore(Arc<StoreInner>);

impl InMemoryStore {
    fn session_count(&self) -> usize {
        self.0.sessions.lock().unwrap().len()
    }

    /// Test hook: force a pending token into the past.
    fn expire_verify_token(&self, user_id: &UserId) {
        let mut credentials = self.0.credentials.lock().unwrap();
        let credential = credentials.get_mut(user_id).unwrap();
        if let Some(token) = credential.verify_token.take() {
            let nanoid = token.as_str().parse().unwrap();
            credential.verify_token = Some(OneShotToken::from_parts(
                nanoid,
                Utc::now() - Duration::seconds(1),
            ));
        }
    }

    fn expire_reset_token(&self, user_id: &UserId) {
        let mut credentials = self.0.credentials.lock().unwrap();
        let credential = credentials.get_mut(user_id).unwrap();
        if let Some(token) = credential.reset_token.take() {
            let nanoid = token.as_str().parse().unwrap();
            credential.reset_token = Some(OneShotToken::from_parts(
                nanoid,
                Utc::now() - Duration::seconds(1),
            ));
        }
    }
}

impl UserRepository for InMemoryStore {
    async fn create(&self, user: &User, credential: &Credential) -> AuthResult<()> {
        let mut users = self.0.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        users.insert(user.user_id, user.clone());
        self.0
            .credentials
            .lock()
            .unwrap()
            .insert(credential.user_id, credential.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.0.users.lock().unwrap().get(user_id).cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.public_id == *public_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.email == *email))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        self.0
            .users
            .lock()
            .unwrap()
            .insert(user.user_id, user.clone());
        Ok(())
    }
}

impl CredentialRepository for InMemoryStore {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Credential>> {
        Ok(self.0.credentials.lock().unwrap().get(user_id).cloned())
    }

    async fn update(&self, credential: &Credential) -> AuthResult<()> {
        self.0
            .credentials
            .lock()
            .unwrap()
            .insert(credential.user_id, credential.clone());
        Ok(())
    }

    async fn consume_verify_token(&self, token: &str) -> AuthResult<Option<UserId>> {
        let mut credentials = self.0.credentials.lock().unwrap();
        let hit = credentials.values_mut().find(|c| {
            c.verify_token
                .as_ref()
                .is_some_and(|t| t.matches(token) && !t.is_expired())
        });

        let Some(credential) = hit else {
            return Ok(None);
        };
        credential.verify_token = None;
        let user_id = credential.user_id;
        drop(credentials);

        let mut users = self.0.users.lock().unwrap();
        if let Some(user) = users.get_mut(&user_id) {
            user.is_verified = true;
        }
        Ok(Some(user_id))
    }

    async fn consume_reset_token(
        &self,
        user_id: &UserId,
        token: &str,
        new_hash: &HashedPassword,
    ) -> AuthResult<bool> {
        let mut credentials = self.0.credentials.lock().unwrap();
        let Some(credential) = credentials.get_mut(user_id) else {
            return Ok(false);
        };
        let valid = credential
            .reset_token
            .as_ref()
            .is_some_and(|t| t.matches(token) && !t.is_expired());
        if !valid {
            return Ok(false);
        }
        credential.reset_token = None;
        credential.password_hash = Some(new_hash.clone());
        Ok(true)
    }
}

impl SessionRepository for InMemoryStore {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.0
            .sessions
            .lock()
            .unwrap()
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>> {
        Ok(self.0.sessions.lock().unwrap().get(&session_id).cloned())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.0.sessions.lock().unwrap().remove(&session_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = self.0.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SentMail {
    Verification { to: String, token: String },
    Reset { to: String, token: String },
    TwoFactor { to: String, code: String },
}

#[derive(Default)]
struct FakeMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: Mutex<bool>,
}

impl FakeMailer {
    fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    fn last_verification_token(&self) -> Option<String> {
        self.sent().iter().rev().find_map(|m| match m {
            SentMail::Verification { token, .. } => Some(token.clone()),
            _ => None,
        })
    }

    fn last_reset_token(&self) -> Option<String> {
        self.sent().iter().rev().find_map(|m| match m {
            SentMail::Reset { token, .. } => Some(token.clone()),
            _ => None,
        })
    }

    fn last_two_factor_code(&self) -> Option<String> {
        self.sent().iter().rev().find_map(|m| match m {
            SentMail::TwoFactor { code, .. } => Some(code.clone()),
            _ => None,
        })
    }

    fn record(&self, mail: SentMail) -> AuthResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(AuthError::MailDelivery("smtp unreachable".to_string()));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

impl Mailer for FakeMailer {
    async fn send_verification(&self, user: &User, token: &str) -> AuthResult<()> {
        self.record(SentMail::Verification {
            to: user.email.as_str().to_string(),
            token: token.to_string(),
        })
    }

    async fn send_password_reset(&self, user: &User, token: &str) -> AuthResult<()> {
        self.record(SentMail::Reset {
            to: user.email.as_str().to_string(),
            token: token.to_string(),
        })
    }

    async fn send_two_factor_code(&self, email: &str, code: &str) -> AuthResult<()> {
        self.record(SentMail::TwoFactor {
            to: email.to_string(),
            code: code.to_string(),
        })
    }
}

enum FakeProviderMode {
    Profile(ProviderProfile),
    Unavailable,
}

struct FakeProvider {
    mode: FakeProviderMode,
}

impl FakeProvider {
    fn verified(email: &str, name: &str) -> Self {
        Self {
            mode: FakeProviderMode::Profile(ProviderProfile {
                email: email.to_string(),
                email_verified: true,
                name: name.to_string(),
                picture: Some("https://example.com/pic.png".to_string()),
            }),
        }
    }

    fn unverified(email: &str) -> Self {
        Self {
            mode: FakeProviderMode::Profile(ProviderProfile {
                email: email.to_string(),
                email_verified: false,
                name: "Someone".to_string(),
                picture: None,
            }),
        }
    }

    fn unavailable() -> Self {
        Self {
            mode: FakeProviderMode::Unavailable,
        }
    }
}

impl ProviderIdentity for FakeProvider {
    async fn exchange_access_token(&self, _access_token: &str) -> AuthResult<ProviderProfile> {
        match &self.mode {
            FakeProviderMode::Profile(profile) => Ok(profile.clone()),
            FakeProviderMode::Unavailable => Err(AuthError::ProviderUnavailable),
        }
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    store: Arc<InMemoryStore>,
    mailer: Arc<FakeMailer>,
    config: Arc<AuthConfig>,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: Arc::new(InMemoryStore::default()),
            mailer: Arc::new(FakeMailer::default()),
            config: Arc::new(AuthConfig::development()),
        }
    }

    async fn register(&self, name: &str, email: &str, password: &str) -> AuthResult<String> {
        let use_case = RegisterUseCase::new(
            self.store.clone(),
            self.mailer.clone(),
            self.config.clone(),
        );
        let output = use_case
            .execute(RegisterInput {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                keywords: vec![],
            })
            .await?;
        Ok(output.public_id)
    }

    async fn verify_latest(&self) -> AuthResult<()> {
        let token = self.mailer.last_verification_token().unwrap();
        VerifyEmailUseCase::new(self.store.clone())
            .execute(&token)
            .await
    }

    async fn login(&self, email: &str, password: &str) -> AuthResult<crate::application::LoginOutput> {
        self.login_with_code(email, password, None).await
    }

    async fn login_with_code(
        &self,
        email: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> AuthResult<crate::application::LoginOutput> {
        let use_case = LoginUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.mailer.clone(),
            self.config.clone(),
        );
        use_case
            .execute(LoginInput {
                email: email.to_string(),
                password: password.to_string(),
                totp_code: totp_code.map(str::to_string),
            })
            .await
    }

    async fn registered_verified_user(&self, email: &str, password: &str) -> User {
        self.register("Ada Lovelace", email, password).await.unwrap();
        self.verify_latest().await.unwrap();
        let out = self.login(email, password).await.unwrap();
        out.user.unwrap()
    }
}

// ============================================================================
// Registration and verification
// ============================================================================

#[tokio::test]
async fn register_verify_login_change_password_scenario() {
    let h = Harness::new();

    h.register("Ada Lovelace", "ada@example.com", "correct horse battery")
        .await
        .unwrap();

    // Unverified accounts with the right password are told to verify.
    let err = h.login("ada@example.com", "correct horse battery").await;
    assert!(matches!(err, Err(AuthError::EmailNotVerified)));

    h.verify_latest().await.unwrap();

    let out = h.login("ada@example.com", "correct horse battery").await.unwrap();
    assert!(!out.requires_2fa);
    assert!(out.session_token.is_some());
    let user = out.user.unwrap();
    assert!(user.is_verified);
    assert!(user.last_login_at.is_some());

    // Change the password and check both directions.
    let change = ChangePasswordUseCase::new(h.store.clone(), h.config.clone());
    change
        .execute(
            &user,
            "correct horse battery".to_string(),
            "brand new passphrase".to_string(),
            "brand new passphrase".to_string(),
        )
        .await
        .unwrap();

    assert!(matches!(
        h.login("ada@example.com", "correct horse battery").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(h.login("ada@example.com", "brand new passphrase").await.is_ok());
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let h = Harness::new();
    h.register("Ada", "ada@example.com", "correct horse battery")
        .await
        .unwrap();

    let err = h
        .register("Impostor", "ada@example.com", "another password!")
        .await;
    assert!(matches!(err, Err(AuthError::EmailTaken)));
}

#[tokio::test]
async fn register_rejects_weak_password() {
    let h = Harness::new();
    let err = h.register("Ada", "ada@example.com", "short").await;
    assert!(matches!(err, Err(AuthError::PasswordValidation(_))));
}

#[tokio::test]
async fn verify_token_is_single_use() {
    let h = Harness::new();
    h.register("Ada", "ada@example.com", "correct horse battery")
        .await
        .unwrap();

    let token = h.mailer.last_verification_token().unwrap();
    VerifyEmailUseCase::new(h.store.clone())
        .execute(&token)
        .await
        .unwrap();

    let second = VerifyEmailUseCase::new(h.store.clone()).execute(&token).await;
    assert!(matches!(second, Err(AuthError::InvalidOrExpiredToken)));
}

#[tokio::test]
async fn expired_verify_token_is_rejected() {
    let h = Harness::new();
    h.register("Ada", "ada@example.com", "correct horse battery")
        .await
        .unwrap();

    let user = h
        .store
        .find_by_email(&Email::new("ada@example.com").unwrap())
        .await
        .unwrap()
        .unwrap();
    h.store.expire_verify_token(&user.user_id);

    let token = h.mailer.last_verification_token().unwrap();
    let result = VerifyEmailUseCase::new(h.store.clone()).execute(&token).await;
    assert!(matches!(result, Err(AuthError::InvalidOrExpiredToken)));
}

#[tokio::test]
async fn resend_rotates_the_verify_token() {
    let h = Harness::new();
    h.register("Ada", "ada@example.com", "correct horse battery")
        .await
        .unwrap();
    let old_token = h.mailer.last_verification_token().unwrap();

    ResendVerificationUseCase::new(
        h.store.clone(),
        h.store.clone(),
        h.mailer.clone(),
        h.config.clone(),
    )
    .execute("ada@example.com")
    .await
    .unwrap();

    let new_token = h.mailer.last_verification_token().unwrap();
    assert_ne!(old_token, new_token);

    // Only the newest mail works.
    assert!(
        VerifyEmailUseCase::new(h.store.clone())
            .execute(&old_token)
            .await
            .is_err()
    );
    assert!(
        VerifyEmailUseCase::new(h.store.clone())
            .execute(&new_token)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn resend_rejects_unknown_and_verified_accounts() {
    let h = Harness::new();
    let resend = ResendVerificationUseCase::new(
        h.store.clone(),
        h.store.clone(),
        h.mailer.clone(),
        h.config.clone(),
    );

    assert!(matches!(
        resend.execute("nobody@example.com").await,
        Err(AuthError::UserNotFound)
    ));

    h.register("Ada", "ada@example.com", "correct horse battery")
        .await
        .unwrap();
    h.verify_latest().await.unwrap();
    assert!(matches!(
        resend.execute("ada@example.com").await,
        Err(AuthError::Validation(_))
    ));
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_answers_uniformly_for_unknown_email_and_wrong_password() {
    let h = Harness::new();
    h.register("Ada", "ada@example.com", "correct horse battery")
        .await
        .unwrap();
    h.verify_latest().await.unwrap();

    let unknown = h.login("ghost@example.com", "correct horse battery").await;
    let wrong = h.login("ada@example.com", "totally wrong pass").await;

    assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

    // Failed logins never leave sessions behind.
    assert_eq!(h.store.session_count(), 0);
}

#[tokio::test]
async fn each_login_gets_a_fresh_session() {
    let h = Harness::new();
    h.registered_verified_user("ada@example.com", "correct horse battery")
        .await;
    let first = h
        .login("ada@example.com", "correct horse battery")
        .await
        .unwrap()
        .session_token
        .unwrap();
    let second = h
        .login("ada@example.com", "correct horse battery")
        .await
        .unwrap()
        .session_token
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(h.store.session_count(), 3);
}

// ============================================================================
// Two-factor
// ============================================================================

#[tokio::test]
async fn two_factor_login_round_trip() {
    let h = Harness::new();
    let user = h
        .registered_verified_user("ada@example.com", "correct horse battery")
        .await;

    SetTwoFactorUseCase::new(h.store.clone())
        .execute(&user, true)
        .await
        .unwrap();

    // No code: a code is mailed and no session is created.
    let sessions_before = h.store.session_count();
    let pending = h.login("ada@example.com", "correct horse battery").await.unwrap();
    assert!(pending.requires_2fa);
    assert!(pending.session_token.is_none());
    assert_eq!(h.store.session_count(), sessions_before);

    // Wrong code is rejected.
    let wrong = h
        .login_with_code("ada@example.com", "correct horse battery", Some("000000"))
        .await;
    assert!(matches!(wrong, Err(AuthError::InvalidTwoFactorCode)));

    // The mailed code finishes the login.
    let code = h.mailer.last_two_factor_code().unwrap();
    let done = h
        .login_with_code("ada@example.com", "correct horse battery", Some(&code))
        .await
        .unwrap();
    assert!(!done.requires_2fa);
    assert!(done.session_token.is_some());
}

#[tokio::test]
async fn two_factor_code_is_not_required_after_disable() {
    let h = Harness::new();
    let user = h
        .registered_verified_user("ada@example.com", "correct horse battery")
        .await;

    let toggle = SetTwoFactorUseCase::new(h.store.clone());
    toggle.execute(&user, true).await.unwrap();
    toggle.execute(&user, false).await.unwrap();

    let out = h.login("ada@example.com", "correct horse battery").await.unwrap();
    assert!(!out.requires_2fa);
}

// ============================================================================
// Password reset
// ============================================================================

#[tokio::test]
async fn forgot_and_reset_password_round_trip() {
    let h = Harness::new();
    let user = h
        .registered_verified_user("ada@example.com", "correct horse battery")
        .await;

    ForgotPasswordUseCase::new(
        h.store.clone(),
        h.store.clone(),
        h.mailer.clone(),
        h.config.clone(),
    )
    .execute("ada@example.com")
    .await
    .unwrap();

    let token = h.mailer.last_reset_token().unwrap();
    let reset = ResetPasswordUseCase::new(h.store.clone(), h.store.clone(), h.config.clone());
    reset
        .execute(
            &user.public_id.to_string(),
            &token,
            "replacement password".to_string(),
        )
        .await
        .unwrap();

    assert!(matches!(
        h.login("ada@example.com", "correct horse battery").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(h.login("ada@example.com", "replacement password").await.is_ok());

    // The token was consumed by the first reset.
    let again = reset
        .execute(
            &user.public_id.to_string(),
            &token,
            "yet another password".to_string(),
        )
        .await;
    assert!(matches!(again, Err(AuthError::InvalidResetToken)));
}

#[tokio::test]
async fn forgot_password_404s_on_unknown_email() {
    let h = Harness::new();
    let result = ForgotPasswordUseCase::new(
        h.store.clone(),
        h.store.clone(),
        h.mailer.clone(),
        h.config.clone(),
    )
    .execute("ghost@example.com")
    .await;
    assert!(matches!(result, Err(AuthError::UserNotFound)));
}

#[tokio::test]
async fn expired_reset_token_is_rejected() {
    let h = Harness::new();
    let user = h
        .registered_verified_user("ada@example.com", "correct horse battery")
        .await;

    ForgotPasswordUseCase::new(
        h.store.clone(),
        h.store.clone(),
        h.mailer.clone(),
        h.config.clone(),
    )
    .execute("ada@example.com")
    .await
    .unwrap();

    h.store.expire_reset_token(&user.user_id);

    let token = h.mailer.last_reset_token().unwrap();
    let result = ResetPasswordUseCase::new(h.store.clone(), h.store.clone(), h.config.clone())
        .execute(
            &user.public_id.to_string(),
            &token,
            "replacement password".to_string(),
        )
        .await;
    assert!(matches!(result, Err(AuthError::ResetTokenExpired)));
}

#[tokio::test]
async fn reset_rejects_mismatched_token() {
    let h = Harness::new();
    let user = h
        .registered_verified_user("ada@example.com", "correct horse battery")
        .await;

    ForgotPasswordUseCase::new(
        h.store.clone(),
        h.store.clone(),
        h.mailer.clone(),
        h.config.clone(),
    )
    .execute("ada@example.com")
    .await
    .unwrap();

    let result = ResetPasswordUseCase::new(h.store.clone(), h.store.clone(), h.config.clone())
        .execute(
            &user.public_id.to_string(),
            "definitely-not-the-token42",
            "replacement password".to_string(),
        )
        .await;
    assert!(matches!(result, Err(AuthError::InvalidResetToken)));
}

// ============================================================================
// Provider sign-in
// ============================================================================

#[tokio::test]
async fn provider_sign_in_creates_then_reuses_the_account() {
    let h = Harness::new();
    let provider = Arc::new(FakeProvider::verified("ada@gmail.com", "Ada Lovelace"));
    let use_case = ProviderSignInUseCase::new(
        h.store.clone(),
        h.store.clone(),
        provider,
        h.config.clone(),
    );

    let first = use_case.execute("provider-token").await.unwrap();
    assert!(first.created);
    assert!(first.user.is_verified);
    assert_eq!(first.user.name, "Ada Lovelace");

    let second = use_case.execute("provider-token").await.unwrap();
    assert!(!second.created);
    assert_eq!(second.user.user_id, first.user.user_id);
}

#[tokio::test]
async fn provider_sign_in_rejects_credentials_accounts() {
    let h = Harness::new();
    h.registered_verified_user("ada@example.com", "correct horse battery")
        .await;

    let provider = Arc::new(FakeProvider::verified("ada@example.com", "Ada"));
    let result = ProviderSignInUseCase::new(
        h.store.clone(),
        h.store.clone(),
        provider,
        h.config.clone(),
    )
    .execute("provider-token")
    .await;

    assert!(matches!(result, Err(AuthError::ProviderRejected(_))));
}

#[tokio::test]
async fn provider_sign_in_rejects_unverified_provider_email() {
    let h = Harness::new();
    let provider = Arc::new(FakeProvider::unverified("ada@gmail.com"));
    let result = ProviderSignInUseCase::new(
        h.store.clone(),
        h.store.clone(),
        provider,
        h.config.clone(),
    )
    .execute("provider-token")
    .await;

    assert!(matches!(result, Err(AuthError::ProviderRejected(_))));
}

#[tokio::test]
async fn provider_outage_surfaces_as_unavailable() {
    let h = Harness::new();
    let provider = Arc::new(FakeProvider::unavailable());
    let result = ProviderSignInUseCase::new(
        h.store.clone(),
        h.store.clone(),
        provider,
        h.config.clone(),
    )
    .execute("provider-token")
    .await;

    assert!(matches!(result, Err(AuthError::ProviderUnavailable)));
}

// ============================================================================
// Sessions and logout
// ============================================================================

#[tokio::test]
async fn logout_invalidates_the_session_and_is_idempotent() {
    let h = Harness::new();
    h.registered_verified_user("ada@example.com", "correct horse battery")
        .await;
    let token = h
        .login("ada@example.com", "correct horse battery")
        .await
        .unwrap()
        .session_token
        .unwrap();

    let check =
        CheckSessionUseCase::new(h.store.clone(), h.store.clone(), h.config.clone());
    assert!(check.is_valid(&token).await);

    let logout = LogoutUseCase::new(h.store.clone(), h.config.clone());
    logout.execute(&token).await.unwrap();
    assert!(!check.is_valid(&token).await);

    // Logging out again is a no-op, not an error.
    logout.execute(&token).await.unwrap();
    logout.execute("garbage-token").await.unwrap();
}

#[tokio::test]
async fn session_check_rejects_forged_tokens() {
    let h = Harness::new();
    h.registered_verified_user("ada@example.com", "correct horse battery")
        .await;

    let check =
        CheckSessionUseCase::new(h.store.clone(), h.store.clone(), h.config.clone());
    assert!(!check.is_valid("").await);
    assert!(!check.is_valid(&format!("{}.Zm9yZ2Vk", Uuid::new_v4())).await);
}

#[tokio::test]
async fn mail_failure_keeps_the_registration() {
    let h = Harness::new();
    *h.mailer.fail.lock().unwrap() = true;

    let result = h
        .register("Ada", "ada@example.com", "correct horse battery")
        .await;
    assert!(matches!(result, Err(AuthError::MailDelivery(_))));

    // The account exists; resend can retry the mail later.
    let exists = h
        .store
        .exists_by_email(&Email::new("ada@example.com").unwrap())
        .await
        .unwrap();
    assert!(exists);
}

//! HTTP Handlers

use axum::Json;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::cookie::{CookieConfig, extract_cookie};

use crate::application::config::AuthConfig;
use crate::application::{
    ChangePasswordUseCase, CheckSessionUseCase, ForgotPasswordUseCase, LoginInput, LoginUseCase,
    LogoutUseCase, ProviderSignInUseCase, RegisterInput, RegisterUseCase, ResendVerificationUseCase,
    ResetPasswordUseCase, SetTwoFactorUseCase, UpdateProfileInput, UpdateProfileUseCase,
    VerifyEmailUseCase, VerifyTwoFactorUseCase,
};
use crate::domain::entity::user::User;
use crate::domain::gateway::{Mailer, ProviderIdentity};
use crate::domain::repository::{CredentialRepository, SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangePasswordRequest, ForgotPasswordRequest, GoogleSignInRequest, LoginRequest, LoginResponse,
    MessageResponse, RegisterRequest, RegisterResponse, ResendVerificationRequest,
    ResetPasswordQuery, ResetPasswordRequest, SessionStatusResponse, TwoFactorEnableRequest,
    TwoFactorVerifyRequest, UpdateProfileRequest, UserResponse, VerifyEmailQuery,
};

/// Everything the handlers need from a storage backend
pub trait AuthStore:
    UserRepository + CredentialRepository + SessionRepository + Clone + Send + Sync + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository + CredentialRepository + SessionRepository + Clone + Send + Sync + 'static
{
}

/// Shared state for auth handlers
pub struct AuthAppState<R, M, P>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub provider: Arc<P>,
    pub config: Arc<AuthConfig>,
}

impl<R, M, P> Clone for AuthAppState<R, M, P>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            provider: self.provider.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Registration
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let use_case =
        RegisterUseCase::new(state.repo.clone(), state.mailer.clone(), state.config.clone());

    let output = use_case
        .execute(RegisterInput {
            name: req.name,
            email: req.email,
            password: req.password,
            keywords: req.keywords,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            public_id: output.public_id,
            message: "Account created. Check your inbox to verify your email.".to_string(),
        }),
    ))
}

/// POST /api/auth/resend-verification
pub async fn resend_verification<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    Json(req): Json<ResendVerificationRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let use_case = ResendVerificationUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    use_case.execute(&req.email).await?;

    Ok(Json(MessageResponse::new("Verification email sent")))
}

/// GET /api/auth/verify-email?token=
pub async fn verify_email<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    Query(query): Query<VerifyEmailQuery>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(state.repo.clone());
    use_case.execute(&query.token).await?;

    Ok(Json(MessageResponse::new("Email verified")))
}

// ============================================================================
// Login / Logout
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
            totp_code: req.totp_code,
        })
        .await?;

    if output.requires_2fa {
        // A code was mailed; no session yet.
        return Ok((
            StatusCode::OK,
            Json(LoginResponse {
                requires_2fa: true,
                user: None,
            }),
        )
            .into_response());
    }

    let token = output
        .session_token
        .ok_or_else(|| AuthError::Internal("Login produced no session".to_string()))?;
    let user = output
        .user
        .ok_or_else(|| AuthError::Internal("Login produced no user".to_string()))?;

    let cookie = session_cookie(&state.config).build_set_cookie(&token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            requires_2fa: false,
            user: Some(UserResponse::from(&user)),
        }),
    )
        .into_response())
}

/// POST /api/auth/logout
pub async fn logout<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    if let Some(token) = extract_cookie(&headers, &state.config.session_cookie_name) {
        let use_case = LogoutUseCase::new(state.repo.clone(), state.config.clone());
        // The cookie is cleared even when deletion fails.
        if let Err(e) = use_case.execute(&token).await {
            tracing::warn!(error = %e, "Session deletion failed during logout");
        }
    }

    let cookie = session_cookie(&state.config).build_delete_cookie();

    Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]))
}

// ============================================================================
// Session
// ============================================================================

/// GET /api/auth/status
pub async fn session_status<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    headers: HeaderMap,
) -> AuthResult<Json<SessionStatusResponse>>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let use_case =
        CheckSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let session = match extract_cookie(&headers, &state.config.session_cookie_name) {
        Some(token) => use_case.get_session(&token).await.ok(),
        None => None,
    };

    match session {
        Some(session) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            public_id: Some(session.public_id.to_string()),
            expires_at_ms: Some(session.expires_at_ms),
        })),
        None => Ok(Json(SessionStatusResponse {
            authenticated: false,
            public_id: None,
            expires_at_ms: None,
        })),
    }
}

/// GET /api/auth/me
pub async fn me<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    headers: HeaderMap,
) -> AuthResult<Json<UserResponse>>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let user = require_user(&state, &headers).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// PATCH /api/auth/profile
pub async fn update_profile<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    headers: HeaderMap,
    Json(req): Json<UpdateProfileRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let user = require_user(&state, &headers).await?;

    let use_case = UpdateProfileUseCase::new(state.repo.clone());
    let updated = use_case
        .execute(
            user,
            UpdateProfileInput {
                name: req.name,
                keywords: req.keywords,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(&updated)))
}

// ============================================================================
// Passwords
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let use_case = ForgotPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    use_case.execute(&req.email).await?;

    Ok(Json(MessageResponse::new("Password reset email sent")))
}

/// POST /api/auth/reset-password?id=&token=
pub async fn reset_password<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    Query(query): Query<ResetPasswordQuery>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let use_case =
        ResetPasswordUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    use_case
        .execute(&query.id, &query.token, req.password)
        .await?;

    Ok(Json(MessageResponse::new("Password has been reset")))
}

/// POST /api/auth/change-password
pub async fn change_password<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let user = require_user(&state, &headers).await?;

    let use_case = ChangePasswordUseCase::new(state.repo.clone(), state.config.clone());
    use_case
        .execute(&user, req.old_password, req.new_password, req.confirm_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Two-factor
// ============================================================================

/// POST /api/auth/2fa/enable
pub async fn two_factor_enable<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    headers: HeaderMap,
    Json(req): Json<TwoFactorEnableRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let user = require_user(&state, &headers).await?;

    let use_case = SetTwoFactorUseCase::new(state.repo.clone());
    use_case.execute(&user, req.enabled).await?;

    let message = if req.enabled {
        "Two-factor authentication enabled"
    } else {
        "Two-factor authentication disabled"
    };
    Ok(Json(MessageResponse::new(message)))
}

/// POST /api/auth/2fa/verify
pub async fn two_factor_verify<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    headers: HeaderMap,
    Json(req): Json<TwoFactorVerifyRequest>,
) -> AuthResult<StatusCode>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let user = require_user(&state, &headers).await?;

    let use_case = VerifyTwoFactorUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute(&user, &req.code).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Provider sign-in
// ============================================================================

/// POST /api/auth/google
pub async fn google_sign_in<R, M, P>(
    State(state): State<AuthAppState<R, M, P>>,
    Json(req): Json<GoogleSignInRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let use_case = ProviderSignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.provider.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(&req.access_token).await?;

    let status = if output.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let cookie = session_cookie(&state.config).build_set_cookie(&output.session_token);

    Ok((
        status,
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from(&output.user)),
    ))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolve the session cookie to a user, or 401
async fn require_user<R, M, P>(
    state: &AuthAppState<R, M, P>,
    headers: &HeaderMap,
) -> AuthResult<User>
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let token = extract_cookie(headers, &state.config.session_cookie_name)
        .ok_or(AuthError::SessionInvalid)?;

    let use_case =
        CheckSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    use_case.current_user(&token).await
}

fn session_cookie(config: &AuthConfig) -> CookieConfig {
    CookieConfig {
        name: config.session_cookie_name.clone(),
        secure: config.cookie_secure,
        http_only: true,
        same_site: config.cookie_same_site,
        path: "/".to_string(),
        max_age_secs: Some(config.session_ttl_secs()),
    }
}

//! Auth Router

use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::gateway::{Mailer, ProviderIdentity};
use crate::infra::{GoogleIdentity, PgAuthRepository, SmtpMailer};
use crate::presentation::handlers::{self, AuthAppState, AuthStore};

/// Create the Auth router with the production backends
pub fn auth_router(
    repo: PgAuthRepository,
    mailer: SmtpMailer,
    provider: GoogleIdentity,
    config: AuthConfig,
) -> Router {
    auth_router_generic(repo, mailer, provider, config)
}

/// Create the Auth router over any repository/mailer/provider implementation
pub fn auth_router_generic<R, M, P>(repo: R, mailer: M, provider: P, config: AuthConfig) -> Router
where
    R: AuthStore,
    M: Mailer + Send + Sync + 'static,
    P: ProviderIdentity + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        mailer: Arc::new(mailer),
        provider: Arc::new(provider),
        config: Arc::new(config),
    };

    Router::new()
        .route("/register", post(handlers::register::<R, M, P>))
        .route(
            "/resend-verification",
            post(handlers::resend_verification::<R, M, P>),
        )
        .route("/verify-email", get(handlers::verify_email::<R, M, P>))
        .route("/login", post(handlers::login::<R, M, P>))
        .route("/logout", post(handlers::logout::<R, M, P>))
        .route("/status", get(handlers::session_status::<R, M, P>))
        .route("/me", get(handlers::me::<R, M, P>))
        .route("/profile", patch(handlers::update_profile::<R, M, P>))
        .route(
            "/forgot-password",
            post(handlers::forgot_password::<R, M, P>),
        )
        .route("/reset-password", post(handlers::reset_password::<R, M, P>))
        .route(
            "/change-password",
            post(handlers::change_password::<R, M, P>),
        )
        .route("/2fa/enable", post(handlers::two_factor_enable::<R, M, P>))
        .route("/2fa/verify", post(handlers::two_factor_verify::<R, M, P>))
        .route("/google", post(handlers::google_sign_in::<R, M, P>))
        .with_state(state)
}

//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod logout;
pub mod password;
pub mod profile;
pub mod provider;
pub mod register;
pub mod session;
pub mod session_token;
pub mod two_factor;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use password::{ChangePasswordUseCase, ForgotPasswordUseCase, ResetPasswordUseCase};
pub use profile::{UpdateProfileInput, UpdateProfileUseCase};
pub use provider::{ProviderSignInOutput, ProviderSignInUseCase};
pub use register::{
    RegisterInput, RegisterOutput, RegisterUseCase, ResendVerificationUseCase, VerifyEmailUseCase,
};
pub use session::CheckSessionUseCase;
pub use two_factor::{SetTwoFactorUseCase, VerifyTwoFactorUseCase};

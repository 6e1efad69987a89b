//! Google Identity Provider
//!
//! Exchanges an OAuth2 access token for the Google userinfo profile.

use std::time::Duration;

use serde::Deserialize;

use crate::domain::gateway::{ProviderIdentity, ProviderProfile};
use crate::error::{AuthError, AuthResult};

const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Google userinfo response (OpenID Connect claims)
#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    name: String,
    #[serde(default)]
    picture: Option<String>,
}

/// Google-backed identity provider
#[derive(Clone)]
pub struct GoogleIdentity {
    client: reqwest::Client,
    userinfo_url: String,
}

impl GoogleIdentity {
    pub fn new() -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::Internal(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            userinfo_url: USERINFO_URL.to_string(),
        })
    }

    /// Point the exchange at a different endpoint (local stub servers)
    pub fn with_userinfo_url(mut self, url: impl Into<String>) -> Self {
        self.userinfo_url = url.into();
        self
    }
}

impl ProviderIdentity for GoogleIdentity {
    async fn exchange_access_token(&self, access_token: &str) -> AuthResult<ProviderProfile> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Google userinfo request failed");
                AuthError::ProviderUnavailable
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Google rejected the access token");
            return Err(AuthError::ProviderRejected(
                "Provider rejected the access token".to_string(),
            ));
        }

        let info: UserInfo = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Google userinfo response unreadable");
            AuthError::ProviderUnavailable
        })?;

        Ok(ProviderProfile {
            email: info.email,
            email_verified: info.email_verified,
            name: info.name,
            picture: info.picture,
        })
    }
}

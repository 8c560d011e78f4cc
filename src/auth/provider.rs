// src/auth/provider.rs
//! Identity provider client
//!
//! Everything the login flow needs from the third-party provider goes
//! through the [`IdentityProvider`] trait: code exchange, token
//! introspection, profile lookup, and revocation. The production
//! implementation is [`GoogleProvider`]; tests substitute a stub so the
//! verifier sequence can be exercised without network access.

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("state nonce mismatch")]
    InvalidState,

    #[error("authorization code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("identity provider error: {0}")]
    ProviderError(String),

    #[error("token subject does not match identity claims")]
    SubjectMismatch,

    #[error("token audience does not match client id")]
    AudienceMismatch,

    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

/// Access credential returned by the code exchange, paired with the
/// subject claim extracted from the accompanying identity token.
#[derive(Debug, Clone)]
pub struct ExchangedToken {
    pub access_token: String,
    pub subject: String,
}

/// Fields consumed from the provider's token-introspection endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfo {
    pub user_id: Option<String>,
    pub issued_to: Option<String>,
    pub error: Option<String>,
}

/// Profile fields consumed from the provider's user-info endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Build the URL the client is sent to for consent.
    fn authorization_url(&self, state: &str, redirect_uri: &str) -> String;

    /// Exchange an authorization code for an access credential.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExchangedToken, AuthError>;

    /// Introspect an access credential.
    async fn token_info(&self, access_token: &str) -> Result<TokenInfo, AuthError>;

    /// Fetch profile fields for an access credential.
    async fn user_info(&self, access_token: &str) -> Result<UserProfile, AuthError>;

    /// Revoke an access credential. Callers treat failures as best-effort.
    async fn revoke(&self, access_token: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
    id_token: String,
}

/// Google OAuth2 implementation of [`IdentityProvider`]
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    client: Client,
    client_id: String,
    client_secret: String,
}

impl GoogleProvider {
    pub fn new(client_id: String, client_secret: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            client_id,
            client_secret,
        }
    }

    /// Map a reqwest failure onto the auth taxonomy. Timeouts are
    /// retryable; everything else on the wire is a provider fault.
    fn transport_error(e: reqwest::Error) -> AuthError {
        if e.is_timeout() {
            AuthError::ProviderUnavailable(e.to_string())
        } else {
            AuthError::ProviderError(e.to_string())
        }
    }
}

/// Extract the `sub` claim from an identity token without signature
/// verification. The subject is cross-checked against the introspection
/// endpoint afterwards, which is what actually authenticates it.
fn id_token_subject(id_token: &str) -> Result<String, AuthError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::ExchangeFailed("malformed id_token".to_string()))?;

    let raw = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::ExchangeFailed("malformed id_token payload".to_string()))?;

    let claims: serde_json::Value = serde_json::from_slice(&raw)
        .map_err(|_| AuthError::ExchangeFailed("unparseable id_token claims".to_string()))?;

    claims
        .get("sub")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| AuthError::ExchangeFailed("id_token missing sub claim".to_string()))
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self, state: &str, redirect_uri: &str) -> String {
        let scope = "openid email profile";
        format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(scope),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExchangedToken, AuthError> {
        let params = [
            ("code", code),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        debug!("Exchanging authorization code for tokens");

        let response = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::ProviderUnavailable(e.to_string())
                } else {
                    AuthError::ExchangeFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, error = %error_text, "Token exchange rejected");
            return Err(AuthError::ExchangeFailed(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let token = response
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| AuthError::ExchangeFailed(e.to_string()))?;

        let subject = id_token_subject(&token.id_token)?;

        Ok(ExchangedToken {
            access_token: token.access_token,
            subject,
        })
    }

    async fn token_info(&self, access_token: &str) -> Result<TokenInfo, AuthError> {
        let url = format!(
            "https://www.googleapis.com/oauth2/v1/tokeninfo?access_token={}",
            urlencoding::encode(access_token)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        // Google reports introspection failures in the body, not the
        // status line, so parse either way and let the caller inspect
        // the error field.
        response
            .json::<TokenInfo>()
            .await
            .map_err(|e| AuthError::ProviderError(e.to_string()))
    }

    async fn user_info(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let response = self
            .client
            .get("https://www.googleapis.com/oauth2/v1/userinfo?alt=json")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::ProviderError(format!(
                "userinfo endpoint returned HTTP {}",
                status
            )));
        }

        response
            .json::<UserProfile>()
            .await
            .map_err(|e| AuthError::ProviderError(e.to_string()))
    }

    async fn revoke(&self, access_token: &str) -> Result<(), AuthError> {
        let url = format!(
            "https://accounts.google.com/o/oauth2/revoke?token={}",
            urlencoding::encode(access_token)
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            // An already-invalid token comes back as 400; the caller
            // treats any revocation failure as success for clearing.
            warn!(status = %status, "Token revocation returned non-success status");
            return Err(AuthError::ProviderError(format!(
                "revocation endpoint returned HTTP {}",
                status
            )));
        }

        Ok(())
    }
}

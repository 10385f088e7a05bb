//! REST API client for the auth backend.
//!
//! Wraps the session, passwordless (email code) and OAuth endpoints
//! under `{base_url}/api/v1` using [`reqwest`]. Every request carries the
//! application identification headers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use walletlink_core::RawUser;

use crate::config::AuthConfig;

const HEADER_APP_ID: &str = "privy-app-id";
const HEADER_CLIENT_ID: &str = "privy-client-id";
const HEADER_NATIVE_APP_ID: &str = "privy-native-app-identifier";
const HEADER_CLIENT: &str = "privy-client";

/// SDK identifier sent in the `privy-client` header.
const CLIENT_NAME: &str = concat!("walletlink-rust:", env!("CARGO_PKG_VERSION"));

/// Body of every successful session-issuing response.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionResponse {
    pub user: RawUser,
    /// Access token (JWT).
    pub token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
}

/// Response of `POST /oauth/init`.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthInitResponse {
    /// Provider authorization URL the user must visit.
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Discord,
    Apple,
}

impl OAuthProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Discord => "discord",
            Self::Apple => "apple",
        }
    }
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the auth REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum AuthApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("Auth API error ({status}): {body}")]
    ApiError {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl AuthApiError {
    /// `true` when the backend rejected the request itself (4xx), as
    /// opposed to a network failure or server error.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if (400..500).contains(status))
    }
}

/// The operations [`AuthSession`](crate::AuthSession) needs from the
/// backend. Implemented by [`AuthApi`]; tests substitute fakes.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<SessionResponse, AuthApiError>;

    /// Invalidate the session server-side.
    async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthApiError>;

    /// Email a one-time login code to `email`.
    async fn send_email_code(&self, email: &str) -> Result<(), AuthApiError>;

    async fn authenticate_email(&self, email: &str, code: &str) -> Result<SessionResponse, AuthApiError>;

    /// Start an OAuth flow, returning the provider authorization URL.
    async fn oauth_init(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
        state_code: &str,
    ) -> Result<OAuthInitResponse, AuthApiError>;

    /// Complete an OAuth flow with the code returned to the redirect URL.
    async fn oauth_authenticate(
        &self,
        authorization_code: &str,
        state_code: &str,
        code_verifier: &str,
    ) -> Result<SessionResponse, AuthApiError>;
}

/// HTTP client for the auth backend.
pub struct AuthApi {
    client: reqwest::Client,
    api_url: String,
    app_id: String,
    client_id: String,
    native_app_identifier: String,
}

impl AuthApi {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &AuthConfig) -> Self {
        Self {
            client,
            api_url: format!("{}/api/v1", config.base_url.trim_end_matches('/')),
            app_id: config.app_id.clone(),
            client_id: config.client_id.clone(),
            native_app_identifier: config.native_app_identifier.clone(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    // ---- private helpers ----

    /// A `POST {api_url}/{path}` builder with the identification headers.
    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}/{path}", self.api_url))
            .header(HEADER_APP_ID, &self.app_id)
            .header(HEADER_CLIENT_ID, &self.client_id)
            .header(HEADER_NATIVE_APP_ID, &self.native_app_identifier)
            .header(HEADER_CLIENT, CLIENT_NAME)
    }

    /// Ensure the response has a success status code, otherwise return an
    /// [`AuthApiError::ApiError`] with the status and body text.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AuthApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AuthApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AuthApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: reqwest::Response) -> Result<(), AuthApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for AuthApi {
    async fn refresh_session(&self, refresh_token: &str) -> Result<SessionResponse, AuthApiError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let response = self.post("sessions").json(&body).send().await?;
        Self::parse_response(response).await
    }

    async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), AuthApiError> {
        let body = serde_json::json!({ "refresh_token": refresh_token });
        let response = self
            .post("sessions/logout")
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn send_email_code(&self, email: &str) -> Result<(), AuthApiError> {
        let body = serde_json::json!({ "email": email });
        let response = self.post("passwordless/init").json(&body).send().await?;
        Self::check_status(response).await
    }

    async fn authenticate_email(&self, email: &str, code: &str) -> Result<SessionResponse, AuthApiError> {
        let body = serde_json::json!({ "email": email, "code": code });
        let response = self
            .post("passwordless/authenticate")
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn oauth_init(
        &self,
        provider: OAuthProvider,
        redirect_to: &str,
        code_challenge: &str,
        state_code: &str,
    ) -> Result<OAuthInitResponse, AuthApiError> {
        let body = serde_json::json!({
            "provider": provider,
            "redirect_to": redirect_to,
            "code_challenge": code_challenge,
            "state_code": state_code,
        });
        let response = self.post("oauth/init").json(&body).send().await?;
        Self::parse_response(response).await
    }

    async fn oauth_authenticate(
        &self,
        authorization_code: &str,
        state_code: &str,
        code_verifier: &str,
    ) -> Result<SessionResponse, AuthApiError> {
        let body = serde_json::json!({
            "authorization_code": authorization_code,
            "state_code": state_code,
            "code_verifier": code_verifier,
        });
        let response = self.post("oauth/authenticate").json(&body).send().await?;
        Self::parse_response(response).await
    }
}

//! Token client for the client-credentials grant.
//!
//! The client posts `grant_type=client_credentials` with HTTP Basic auth to
//! the environment's login host and extracts `access_token` from the JSON
//! response. Storing the token is the caller's job; see [`Session`].

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::error::{AuthError, Result};
use crate::session::{Credentials, Session};
use crate::AuthConfig;

/// Client for the platform's OAuth token endpoint.
#[derive(Debug, Clone)]
pub struct TokenClient {
    config: AuthConfig,
    client: reqwest::Client,
}

impl TokenClient {
    /// Create a new token client with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created (should never happen with default TLS).
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    /// Create a token client with a custom reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, config: AuthConfig) -> Self {
        Self { config, client }
    }

    /// Get the client configuration.
    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Exchange client credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request cannot be sent (`Network`)
    /// - The endpoint answers with anything but 200 (`Http`)
    /// - The body is not JSON or has no string `access_token` (`MalformedResponse`)
    pub async fn request_token(&self, credentials: &Credentials) -> Result<String> {
        if self.config.api_base().is_empty() {
            return Err(AuthError::InvalidConfig("empty base path".to_string()));
        }
        if credentials.client_id().is_empty() {
            return Err(AuthError::InvalidConfig("empty client id".to_string()));
        }

        let url = self.config.token_url();
        tracing::debug!(url = %url, client_id = %credentials.client_id(), "Requesting access token");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, credentials.basic_authorization())
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(self.config.token_request_body())
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Network(format!("failed to read response body: {e}")))?;

        if status != StatusCode::OK {
            tracing::warn!(status = %status, "Token request rejected");
            return Err(AuthError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_access_token(&body)
    }

    /// Exchange credentials and wrap the token in a [`Session`].
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`TokenClient::request_token`].
    pub async fn open_session(&self, credentials: &Credentials) -> Result<Session> {
        let token = self.request_token(credentials).await?;
        tracing::info!(base_path = %self.config.api_base(), "Authenticated");
        Ok(Session::new(token, self.config.api_base()))
    }
}

/// Pull a non-empty `access_token` string out of a JSON body.
fn parse_access_token(body: &str) -> Result<String> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AuthError::MalformedResponse(format!("invalid JSON: {e}")))?;

    match json.get("access_token").and_then(serde_json::Value::as_str) {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AuthError::MalformedResponse(
            "missing access_token field".to_string(),
        )),
    }
}

//! Client-credentials authentication for presence-monitor.
//!
//! This crate exchanges an OAuth client id and secret for a bearer token
//! and wraps the result in a [`Session`]:
//!
//! - [`TokenClient`] performs the `POST /oauth/token` exchange
//! - [`AuthError`] classifies failures (invalid credentials, missing scope)
//! - [`Session`] carries the token and API base path for later calls
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Monitor        │────▶│   TokenClient    │
//! │   (login)        │     │                  │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │ HTTPS (Basic auth)
//!                          ┌────────▼─────────┐
//!                          │  login.<env>     │
//!                          │  /oauth/token    │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use presence_auth::{AuthConfig, Credentials, TokenClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::new("https://api.mypurecloud.com");
//! let client = TokenClient::new(config);
//!
//! let credentials = Credentials::new("client-id", "client-secret");
//! let session = client.open_session(&credentials).await?;
//!
//! println!("Authenticated against {}", session.base_path());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod error;
pub mod session;

pub use client::TokenClient;
pub use error::{AuthError, AuthFailureKind, Result};
pub use session::{Credentials, Session};

/// Scopes requested with every token.
pub const DEFAULT_SCOPES: &[&str] = &["users:read", "routing:read", "presence:read"];

/// Configuration for the token exchange.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// API base path of the environment (e.g., `https://api.mypurecloud.com`).
    pub base_path: String,
    /// OAuth scopes to request.
    pub scopes: Vec<String>,
    /// Timeout for the token request, in seconds.
    pub request_timeout_seconds: u64,
}

impl AuthConfig {
    /// Create a configuration for the given environment with default scopes.
    #[must_use]
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// API base path without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.base_path.trim_end_matches('/')
    }

    /// Login host derived from the API base path.
    ///
    /// A leading `api.` host label becomes `login.`; any other base path
    /// is used as is.
    #[must_use]
    pub fn login_base_url(&self) -> String {
        let base = self.api_base();
        let Ok(mut url) = reqwest::Url::parse(base) else {
            return base.to_string();
        };
        let Some(login_host) = url
            .host_str()
            .and_then(|host| host.strip_prefix("api."))
            .map(|rest| format!("login.{rest}"))
        else {
            return base.to_string();
        };
        if url.set_host(Some(&login_host)).is_err() {
            return base.to_string();
        }
        url.as_str().trim_end_matches('/').to_string()
    }

    /// Get the token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}/oauth/token", self.login_base_url())
    }

    /// Form-encoded body for the client-credentials grant.
    #[must_use]
    pub fn token_request_body(&self) -> String {
        format!(
            "grant_type=client_credentials&scope={}",
            self.scopes.join("+")
        )
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_path: "https://api.mypurecloud.com".to_string(),
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
            request_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AuthConfig::default();
        assert_eq!(config.base_path, "https://api.mypurecloud.com");
        assert_eq!(
            config.scopes,
            vec!["users:read", "routing:read", "presence:read"]
        );
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn config_urls() {
        let config = AuthConfig::new("https://api.mypurecloud.com/");
        assert_eq!(config.api_base(), "https://api.mypurecloud.com");
        assert_eq!(config.login_base_url(), "https://login.mypurecloud.com");
        assert_eq!(
            config.token_url(),
            "https://login.mypurecloud.com/oauth/token"
        );
    }

    #[test]
    fn login_url_without_api_prefix_is_unchanged() {
        let config = AuthConfig::new("http://127.0.0.1:9000");
        assert_eq!(config.token_url(), "http://127.0.0.1:9000/oauth/token");
    }

    #[test]
    fn only_a_leading_api_label_is_rewritten() {
        let config = AuthConfig::new("https://myapi.example.com");
        assert_eq!(config.login_base_url(), "https://myapi.example.com");

        let config = AuthConfig::new("https://x.api.example.com");
        assert_eq!(
            config.token_url(),
            "https://x.api.example.com/oauth/token"
        );

        let config = AuthConfig::new("https://api.example.com/tenant/");
        assert_eq!(config.login_base_url(), "https://login.example.com/tenant");
    }

    #[test]
    fn token_request_body() {
        let config = AuthConfig::default();
        assert_eq!(
            config.token_request_body(),
            "grant_type=client_credentials&scope=users:read+routing:read+presence:read"
        );
    }
}

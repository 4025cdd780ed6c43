//! Credentials and authenticated sessions.
//!
//! A [`Session`] exists from a successful token exchange until logout.
//! It is passed explicitly to every platform call; nothing here is global.

use std::fmt;

use base64::prelude::*;
use chrono::{DateTime, Utc};

/// OAuth client credentials, held only in memory.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Create a credential pair.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// The OAuth client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// `Authorization` header value for HTTP Basic auth.
    #[must_use]
    pub fn basic_authorization(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", BASE64_STANDARD.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// An authenticated session against one platform environment.
#[derive(Clone)]
pub struct Session {
    access_token: String,
    base_path: String,
    opened_at: DateTime<Utc>,
}

impl Session {
    /// Wrap a freshly issued token.
    #[must_use]
    pub fn new(access_token: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_path: base_path.into().trim_end_matches('/').to_string(),
            opened_at: Utc::now(),
        }
    }

    /// The bearer token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// API base path, without a trailing slash.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// When the session was opened.
    #[must_use]
    pub const fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// `Authorization` header value for API calls.
    #[must_use]
    pub fn bearer_authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_path", &self.base_path)
            .field("opened_at", &self.opened_at)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

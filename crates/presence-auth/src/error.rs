//! Authentication error types.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur while obtaining a token.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The token endpoint answered with a non-200 status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// 200 response without a usable `access_token`.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    /// The configuration cannot produce a valid request.
    #[error("invalid auth configuration: {0}")]
    InvalidConfig(String),
}

/// Broad classification of an authentication failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// Client id or secret rejected.
    InvalidCredentials,
    /// The OAuth client lacks a required scope.
    MissingScope,
    /// Anything else (network, server, malformed response).
    Other,
}

impl AuthError {
    /// Classify the failure for user-facing reporting.
    #[must_use]
    pub fn failure_kind(&self) -> AuthFailureKind {
        match self {
            Self::Http { body, .. } if body.contains("invalid_scope") => {
                AuthFailureKind::MissingScope
            }
            Self::Http { status, body }
                if matches!(status, 400 | 401) || body.contains("invalid_client") =>
            {
                AuthFailureKind::InvalidCredentials
            }
            _ => AuthFailureKind::Other,
        }
    }

    /// Describe the failure for whoever supplied the credentials.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.failure_kind() {
            AuthFailureKind::InvalidCredentials => "authentication failed: invalid client id or \
                secret for this environment"
                .to_string(),
            AuthFailureKind::MissingScope => "permission error: OAuth client is missing one of \
                users:read, presence:read, routing:read"
                .to_string(),
            AuthFailureKind::Other => format!("connection failed: {self}"),
        }
    }

    /// Returns `true` if retrying the same request might succeed.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::MalformedResponse(_) | Self::InvalidConfig(_) => false,
        }
    }
}

//! Error types for the monitor.
//!
//! A refresh cycle either fails as a whole (user listing could not be
//! fetched) or succeeds with some per-user presence lookups degraded.
//! `PresenceLookup` is the only non-fatal variant.

use presence_auth::AuthError;
use presence_core::UserId;
use thiserror::Error;

/// A result type using `MonitorError`.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that can occur while aggregating presence data.
#[derive(Debug, Clone, Error)]
pub enum MonitorError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The platform answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The platform answered with a body we could not parse.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The user listing came back empty.
    #[error("no users found")]
    NoUsers,

    /// Presence for a single user could not be resolved.
    #[error("presence lookup failed for user {user_id}: {reason}")]
    PresenceLookup {
        /// The user whose presence was requested.
        user_id: UserId,
        /// What went wrong.
        reason: String,
    },

    /// No session is open, or it was closed while the call was in flight.
    #[error("session closed")]
    SessionClosed,

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Why a refresh fell back to the fixed dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// 403 from the platform.
    PermissionDenied,
    /// 401 from the platform.
    Unauthorized,
    /// 404 from the platform.
    NotFound,
    /// Anything else.
    Other,
}

impl FallbackReason {
    /// Short machine-readable name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::Other => "other",
        }
    }
}

impl MonitorError {
    /// Classify a cycle-aborting error for the fallback warning.
    #[must_use]
    pub const fn fallback_reason(&self) -> FallbackReason {
        match self {
            Self::Http { status: 403, .. } | Self::Auth(AuthError::Http { status: 403, .. }) => {
                FallbackReason::PermissionDenied
            }
            Self::Http { status: 401, .. } | Self::Auth(AuthError::Http { status: 401, .. }) => {
                FallbackReason::Unauthorized
            }
            Self::Http { status: 404, .. } => FallbackReason::NotFound,
            _ => FallbackReason::Other,
        }
    }

    /// Warning attached to a fallback snapshot.
    #[must_use]
    pub fn fallback_message(&self) -> String {
        match self.fallback_reason() {
            FallbackReason::PermissionDenied => "permission denied - showing sample data; the \
                OAuth client needs users:read, presence:read and routing:read"
                .to_string(),
            FallbackReason::Unauthorized => "authentication failed - showing sample data; check \
                the client id, secret and token lifetime"
                .to_string(),
            FallbackReason::NotFound => "API endpoint not found - showing sample data; check the \
                environment base path"
                .to_string(),
            FallbackReason::Other => format!("API call failed - showing sample data: {self}"),
        }
    }

    /// Returns true if this error might be resolved by retrying.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        match self {
            Self::Network(_) | Self::PresenceLookup { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            Self::Auth(err) => err.is_retriable(),
            Self::MalformedResponse(_) | Self::NoUsers | Self::SessionClosed | Self::Internal(_) => {
                false
            }
        }
    }
}

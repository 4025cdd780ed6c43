//! HTTP request handlers.

pub mod agents;
pub mod health;
pub mod queues;
pub mod refresh;

use crate::api::error::ApiError;

/// Handler for unmatched routes.
pub async fn not_found(uri: axum::http::Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_string())
}

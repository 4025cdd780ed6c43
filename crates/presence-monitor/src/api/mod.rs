//! JSON surface over the published snapshots.
//!
//! Consumers get records and statistics as plain data; nothing here is
//! tied to a rendering framework.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

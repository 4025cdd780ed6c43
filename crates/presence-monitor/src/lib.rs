//! Agent presence aggregation service.
//!
//! This crate turns the platform's user and presence endpoints into
//! complete, periodically refreshed snapshots of agent records:
//!
//! - [`PresenceAggregator`] fetches one page of users and looks up every
//!   user's presence concurrently, with a bounded per-lookup timeout
//! - [`RefreshScheduler`] re-runs the pipeline on a timer and on demand,
//!   coalescing overlapping requests and falling back to a fixed dataset
//!   when the platform cannot be reached
//! - [`PresenceMonitor`] owns the single authenticated session
//! - [`api`] serves the snapshots as JSON
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  tick / POST /v1/refresh  ┌──────────────────┐
//! │  JSON API    │──────────────────────────▶│ RefreshScheduler │
//! │  (axum)      │◀──── watch<Snapshot> ─────│  Idle/Refreshing │
//! └──────────────┘                           └────────┬─────────┘
//!                                                     │
//!                                            ┌────────▼─────────┐
//!                                            │PresenceAggregator│
//!                                            └────────┬─────────┘
//!                                 GET /users          │   N x GET /presence/{id}
//!                                            ┌────────▼─────────┐
//!                                            │  PlatformApi     │
//!                                            └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use presence_auth::{AuthConfig, Credentials};
//! use presence_monitor::{MonitorConfig, PresenceMonitor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let monitor = PresenceMonitor::new(
//!     MonitorConfig::default(),
//!     AuthConfig::new("https://api.mypurecloud.com"),
//! );
//!
//! let scheduler = monitor.login(&Credentials::new("client-id", "secret")).await?;
//! scheduler.subscribe().wait_for(Option::is_some).await?;
//!
//! let snapshot = monitor.snapshot()?;
//! println!("{}", snapshot.message);
//!
//! monitor.logout();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod aggregator;
pub mod api;
pub mod config;
pub mod error;
pub mod monitor;
pub mod platform;
pub mod refresh;

pub use aggregator::{Aggregation, AggregatorConfig, PresenceAggregator};
pub use api::{create_router, ApiError, AppState};
pub use config::MonitorConfig;
pub use error::{FallbackReason, MonitorError, Result};
pub use monitor::{LiveScheduler, PresenceMonitor};
pub use platform::{HttpPlatformClient, PlatformApi, PlatformUser, UserPresence};
pub use refresh::{RefreshOutcome, RefreshScheduler, RefreshState, Snapshot, SnapshotSource};

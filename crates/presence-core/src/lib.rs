//! Core types and pure logic for presence-monitor.
//!
//! This crate holds everything that does not touch the network:
//!
//! - **Records**: [`AgentRecord`] snapshots and the normalized [`PresenceStatus`]
//! - **Queues**: the department to queue heuristic in [`queues`]
//! - **Statistics**: counts, queue sets and utilization via [`DerivedStats`]
//! - **Fallback data**: the fixed dataset served when a refresh fails
//!
//! # Example
//!
//! ```
//! use presence_core::{AgentRecord, DerivedStats, PresenceStatus};
//!
//! let agents = vec![
//!     AgentRecord::new("u-1", "Ada", "ada@example.com", Some("Sales".into()), PresenceStatus::Available),
//!     AgentRecord::new("u-2", "Grace", "grace@example.com", None, PresenceStatus::Offline),
//! ];
//!
//! let stats = DerivedStats::new(&agents);
//! assert_eq!(stats.total_count(), 2);
//! assert_eq!(stats.online_count(), 1);
//! assert_eq!(stats.utilization(), 50);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod queues;
pub mod record;
pub mod sample;
pub mod stats;

pub use ids::UserId;
pub use queues::queues_for_department;
pub use record::{
    sort_by_display_name, AgentRecord, PresenceStatus, StatusColor, NO_DEPARTMENT,
    UNKNOWN_AGENT_NAME,
};
pub use sample::fallback_agents;
pub use stats::{DerivedStats, QueueCount, StatsSummary};

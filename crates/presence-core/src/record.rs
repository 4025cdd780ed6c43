//! Agent records and presence normalization.
//!
//! An [`AgentRecord`] is one platform user joined with their resolved
//! presence. Records are rebuilt wholesale on every refresh cycle and are
//! plain data, independent of any rendering layer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;
use crate::queues::queues_for_department;

/// Name shown for agents whose platform name is empty.
pub const UNKNOWN_AGENT_NAME: &str = "Unknown Agent";

/// Department label shown when an agent has none.
pub const NO_DEPARTMENT: &str = "No Department";

/// Normalized presence of an agent.
///
/// Recognized platform presences are matched case-insensitively. Anything
/// else keeps its raw label so consumers can still display it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum PresenceStatus {
    /// Ready to take interactions.
    Available,
    /// Signed in but occupied.
    Busy,
    /// Signed in but away from the desk.
    Away,
    /// Signed out.
    Offline,
    /// Presence could not be determined (including failed lookups).
    Unknown,
    /// A platform presence without a normalized mapping (e.g. "Meal").
    Other(String),
}

impl PresenceStatus {
    /// Normalize a platform `systemPresence` value.
    #[must_use]
    pub fn from_system_presence(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "available" => Self::Available,
            "busy" => Self::Busy,
            "away" => Self::Away,
            "offline" => Self::Offline,
            "" | "unknown" => Self::Unknown,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Display label for this status.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Available => "Available",
            Self::Busy => "Busy",
            Self::Away => "Away",
            Self::Offline => "Offline",
            Self::Unknown => "Unknown",
            Self::Other(raw) => raw,
        }
    }

    /// Whether an agent with this status counts as online.
    ///
    /// Only `Offline` is offline; unknown and unrecognized presences are
    /// treated as online.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        !matches!(self, Self::Offline)
    }

    /// Rendering hint for this status.
    #[must_use]
    pub const fn color(&self) -> StatusColor {
        match self {
            Self::Available => StatusColor::Green,
            Self::Busy => StatusColor::Red,
            Self::Away => StatusColor::Orange,
            Self::Offline => StatusColor::Gray,
            Self::Unknown | Self::Other(_) => StatusColor::Blue,
        }
    }

    /// Case-insensitive comparison against a raw status label.
    #[must_use]
    pub fn matches_label(&self, label: &str) -> bool {
        self.label().eq_ignore_ascii_case(label)
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for PresenceStatus {
    fn from(value: String) -> Self {
        Self::from_system_presence(&value)
    }
}

impl From<PresenceStatus> for String {
    fn from(status: PresenceStatus) -> Self {
        status.label().to_string()
    }
}

/// Color hint associated with a presence status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusColor {
    /// Available.
    Green,
    /// Busy.
    Red,
    /// Away.
    Orange,
    /// Offline.
    Gray,
    /// Unknown or unrecognized.
    Blue,
}

/// One platform user joined with their presence for a single refresh cycle.
///
/// Equality and hashing are by `id` only, so two snapshots of the same
/// user compare equal regardless of status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Platform user identifier.
    pub id: UserId,
    /// Display name as reported by the platform. May be empty.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Department, if the platform reports one.
    pub department: Option<String>,
    /// Job title, if the platform reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Normalized presence.
    pub presence_status: PresenceStatus,
    /// Derived from `presence_status` when the record is built.
    pub is_online: bool,
    /// Queues this agent is associated with. Order is significant.
    pub queue_names: Vec<String>,
    /// When the presence last changed, if known.
    pub last_status_change: Option<DateTime<Utc>>,
}

impl AgentRecord {
    /// Build a record, deriving `is_online` and `queue_names`.
    #[must_use]
    pub fn new(
        id: impl Into<UserId>,
        name: impl Into<String>,
        email: impl Into<String>,
        department: Option<String>,
        presence_status: PresenceStatus,
    ) -> Self {
        let queue_names = queues_for_department(department.as_deref());
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            department,
            title: None,
            is_online: presence_status.is_online(),
            presence_status,
            queue_names,
            last_status_change: None,
        }
    }

    /// Set the job title.
    #[must_use]
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Set the last presence change timestamp.
    #[must_use]
    pub fn with_last_status_change(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.last_status_change = at;
        self
    }

    /// Name to display, substituting a placeholder for empty names.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            UNKNOWN_AGENT_NAME
        } else {
            &self.name
        }
    }

    /// Department to display, substituting a placeholder when absent.
    #[must_use]
    pub fn display_department(&self) -> &str {
        self.department.as_deref().unwrap_or(NO_DEPARTMENT)
    }

    /// Online and not reporting an offline presence.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_online && !self.presence_status.matches_label("offline")
    }

    /// Whether this agent is associated with the named queue.
    #[must_use]
    pub fn in_queue(&self, queue: &str) -> bool {
        self.queue_names.iter().any(|q| q == queue)
    }
}

impl PartialEq for AgentRecord {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AgentRecord {}

impl std::hash::Hash for AgentRecord {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Sort records by display name, ascending, using ordinal comparison.
pub fn sort_by_display_name(records: &mut [AgentRecord]) {
    records.sort_by(|a, b| a.display_name().cmp(b.display_name()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_known_presences_case_insensitively() {
        assert_eq!(
            PresenceStatus::from_system_presence("AVAILABLE"),
            PresenceStatus::Available
        );
        assert_eq!(PresenceStatus::from_system_presence("Busy"), PresenceStatus::Busy);
        assert_eq!(PresenceStatus::from_system_presence("away"), PresenceStatus::Away);
        assert_eq!(
            PresenceStatus::from_system_presence("Offline"),
            PresenceStatus::Offline
        );
        assert_eq!(PresenceStatus::from_system_presence(""), PresenceStatus::Unknown);
    }

    #[test]
    fn unrecognized_presence_keeps_label() {
        let status = PresenceStatus::from_system_presence("Meal");
        assert_eq!(status, PresenceStatus::Other("Meal".to_string()));
        assert_eq!(status.label(), "Meal");
        assert!(status.is_online());
        assert_eq!(status.color(), StatusColor::Blue);
    }

    #[test]
    fn colors_and_online_flags() {
        assert_eq!(PresenceStatus::Available.color(), StatusColor::Green);
        assert_eq!(PresenceStatus::Busy.color(), StatusColor::Red);
        assert_eq!(PresenceStatus::Away.color(), StatusColor::Orange);
        assert_eq!(PresenceStatus::Offline.color(), StatusColor::Gray);
        assert_eq!(PresenceStatus::Unknown.color(), StatusColor::Blue);

        assert!(PresenceStatus::Available.is_online());
        assert!(PresenceStatus::Away.is_online());
        assert!(PresenceStatus::Unknown.is_online());
        assert!(!PresenceStatus::Offline.is_online());
    }

    #[test]
    fn new_record_derives_online_and_queues() {
        let record = AgentRecord::new(
            "u-1",
            "Ada",
            "ada@example.com",
            Some("Sales".to_string()),
            PresenceStatus::Offline,
        );
        assert!(!record.is_online);
        assert_eq!(record.queue_names, vec!["Sales Queue", "General Support"]);
        assert!(!record.is_active());
        assert!(record.in_queue("Sales Queue"));
        assert!(!record.in_queue("General Queue"));
    }

    #[test]
    fn display_helpers_substitute_placeholders() {
        let record = AgentRecord::new("u-1", "", "x@example.com", None, PresenceStatus::Unknown);
        assert_eq!(record.display_name(), UNKNOWN_AGENT_NAME);
        assert_eq!(record.display_department(), NO_DEPARTMENT);
        // Stored name stays empty.
        assert!(record.name.is_empty());
    }

    #[test]
    fn equality_is_by_id() {
        let a = AgentRecord::new("same", "A", "a@x", None, PresenceStatus::Busy);
        let b = AgentRecord::new("same", "B", "b@x", None, PresenceStatus::Offline);
        assert_eq!(a, b);
    }

    #[test]
    fn sort_is_ordinal() {
        let mut records = vec![
            AgentRecord::new("1", "bob", "", None, PresenceStatus::Busy),
            AgentRecord::new("2", "Alice", "", None, PresenceStatus::Busy),
            AgentRecord::new("3", "Bob", "", None, PresenceStatus::Busy),
        ];
        sort_by_display_name(&mut records);
        let names: Vec<_> = records.iter().map(AgentRecord::display_name).collect();
        // Uppercase sorts before lowercase in ordinal order.
        assert_eq!(names, vec!["Alice", "Bob", "bob"]);
    }

    #[test]
    fn status_serializes_as_label() {
        let record = AgentRecord::new("u", "N", "e", None, PresenceStatus::Available);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["presence_status"], "Available");
        assert_eq!(json["queue_names"][0], "General Queue");
    }
}

//! Statistics derived from an agent snapshot.
//!
//! Everything here is a pure function of the record slice. Nothing is
//! cached, so the numbers always agree with the records they came from.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::record::{sort_by_display_name, AgentRecord};

/// Read-only view computing statistics over a set of agent records.
#[derive(Debug, Clone, Copy)]
pub struct DerivedStats<'a> {
    agents: &'a [AgentRecord],
}

impl<'a> DerivedStats<'a> {
    /// Wrap a record slice.
    #[must_use]
    pub const fn new(agents: &'a [AgentRecord]) -> Self {
        Self { agents }
    }

    /// Number of records.
    #[must_use]
    pub const fn total_count(&self) -> usize {
        self.agents.len()
    }

    /// Records flagged online.
    #[must_use]
    pub fn online_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_online).count()
    }

    /// Records whose status is `available` (case-insensitive).
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.count_status("available")
    }

    /// Records whose status is `busy` (case-insensitive).
    #[must_use]
    pub fn busy_count(&self) -> usize {
        self.count_status("busy")
    }

    fn count_status(&self, label: &str) -> usize {
        self.agents
            .iter()
            .filter(|a| a.presence_status.matches_label(label))
            .count()
    }

    /// Records that are online and not offline.
    #[must_use]
    pub fn total_active(&self) -> usize {
        self.agents.iter().filter(|a| a.is_active()).count()
    }

    /// Sorted, de-duplicated union of every record's queues.
    #[must_use]
    pub fn active_queues(&self) -> Vec<String> {
        collect_queues(self.agents.iter())
    }

    /// Sorted, de-duplicated union of queues that have an active agent.
    #[must_use]
    pub fn queues_with_active_agents(&self) -> Vec<String> {
        collect_queues(self.agents.iter().filter(|a| a.is_active()))
    }

    /// Percentage of agents that are available or busy, rounded to the
    /// nearest integer (halves round up). Zero when there are no agents.
    #[must_use]
    pub fn utilization(&self) -> usize {
        let total = self.total_count();
        if total == 0 {
            return 0;
        }
        let engaged = self.available_count() + self.busy_count();
        (200 * engaged + total) / (2 * total)
    }

    /// Records associated with `queue`, in snapshot order.
    #[must_use]
    pub fn agents_in_queue(&self, queue: &str) -> Vec<&'a AgentRecord> {
        self.agents.iter().filter(|a| a.in_queue(queue)).collect()
    }

    /// Number of records associated with `queue`.
    #[must_use]
    pub fn count_in_queue(&self, queue: &str) -> usize {
        self.agents.iter().filter(|a| a.in_queue(queue)).count()
    }

    /// Active records de-duplicated by id, sorted by display name.
    ///
    /// When two records share an id the later one wins.
    #[must_use]
    pub fn distinct_active_agents(&self) -> Vec<AgentRecord> {
        let mut by_id: HashMap<&str, &AgentRecord> = HashMap::new();
        for agent in self.agents.iter().filter(|a| a.is_active()) {
            by_id.insert(agent.id.as_str(), agent);
        }

        let mut distinct: Vec<AgentRecord> = by_id.into_values().cloned().collect();
        // Tie-break on id so equal names come out in a stable order.
        distinct.sort_by(|a, b| a.id.cmp(&b.id));
        sort_by_display_name(&mut distinct);
        distinct
    }

    /// Per-queue counts for every active queue.
    #[must_use]
    pub fn queue_counts(&self) -> Vec<QueueCount> {
        self.active_queues()
            .into_iter()
            .map(|name| QueueCount {
                agent_count: self.count_in_queue(&name),
                active_count: self
                    .agents
                    .iter()
                    .filter(|a| a.is_active() && a.in_queue(&name))
                    .count(),
                name,
            })
            .collect()
    }

    /// Bundle every derived value into a serializable summary.
    #[must_use]
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            total_count: self.total_count(),
            online_count: self.online_count(),
            available_count: self.available_count(),
            busy_count: self.busy_count(),
            total_active: self.total_active(),
            utilization: self.utilization(),
            active_queues: self.active_queues(),
            queues_with_active_agents: self.queues_with_active_agents(),
        }
    }
}

fn collect_queues<'b>(agents: impl Iterator<Item = &'b AgentRecord>) -> Vec<String> {
    agents
        .flat_map(|a| a.queue_names.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Snapshot of every derived statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Number of records.
    pub total_count: usize,
    /// Records flagged online.
    pub online_count: usize,
    /// Records with an available status.
    pub available_count: usize,
    /// Records with a busy status.
    pub busy_count: usize,
    /// Records online and not offline.
    pub total_active: usize,
    /// Rounded percentage of available plus busy agents.
    pub utilization: usize,
    /// Sorted union of all queues.
    pub active_queues: Vec<String>,
    /// Sorted union of queues with at least one active agent.
    pub queues_with_active_agents: Vec<String>,
}

/// Agent counts for a single queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCount {
    /// Queue name.
    pub name: String,
    /// Agents associated with the queue.
    pub agent_count: usize,
    /// Associated agents that are currently active.
    pub active_count: usize,
}

//! Fixed fallback dataset.
//!
//! When a refresh cycle cannot reach the platform the monitor publishes
//! these eight agents instead of keeping stale data, so consumers always
//! see a complete, internally consistent snapshot.

use chrono::{DateTime, Utc};

use crate::record::{sort_by_display_name, AgentRecord, PresenceStatus};

const SAMPLE_AGENTS: [(&str, &str, &str, &str); 8] = [
    ("John Smith", "john.smith@company.com", "Available", "Customer Service"),
    ("Sarah Johnson", "sarah.j@company.com", "Busy", "Technical Support"),
    ("Mike Wilson", "mike.w@company.com", "Away", "Customer Service"),
    ("Lisa Brown", "lisa.b@company.com", "Available", "Sales"),
    ("David Lee", "david.l@company.com", "Offline", "Technical Support"),
    ("Emma Davis", "emma.d@company.com", "Available", "Customer Service"),
    ("Alex Chen", "alex.c@company.com", "Busy", "Sales"),
    ("Maria Garcia", "maria.g@company.com", "Available", "Customer Service"),
];

/// Build the fallback dataset, stamped with `now`.
///
/// Ids are `agent-0` through `agent-7` in declaration order; the returned
/// collection is sorted by display name like a live snapshot.
#[must_use]
pub fn fallback_agents(now: DateTime<Utc>) -> Vec<AgentRecord> {
    let mut agents: Vec<AgentRecord> = SAMPLE_AGENTS
        .iter()
        .enumerate()
        .map(|(index, (name, email, status, department))| {
            AgentRecord::new(
                format!("agent-{index}"),
                *name,
                *email,
                Some((*department).to_string()),
                PresenceStatus::from_system_presence(status),
            )
            .with_title(Some("Agent".to_string()))
            .with_last_status_change(Some(now))
        })
        .collect();

    sort_by_display_name(&mut agents);
    agents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queues::queues_for_department;
    use crate::stats::DerivedStats;

    #[test]
    fn has_eight_agents_with_mapped_queues() {
        let agents = fallback_agents(Utc::now());
        assert_eq!(agents.len(), 8);
        for agent in &agents {
            assert!(!agent.queue_names.is_empty());
            assert_eq!(
                agent.queue_names,
                queues_for_department(agent.department.as_deref())
            );
        }
    }

    #[test]
    fn sorted_and_stable() {
        let now = Utc::now();
        let first = fallback_agents(now);
        let second = fallback_agents(now);
        let names: Vec<_> = first.iter().map(|a| a.name.clone()).collect();
        assert_eq!(names[0], "Alex Chen");
        assert_eq!(names[7], "Sarah Johnson");
        assert_eq!(
            names,
            second.iter().map(|a| a.name.clone()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn stats_over_fallback() {
        let agents = fallback_agents(Utc::now());
        let stats = DerivedStats::new(&agents);
        assert_eq!(stats.online_count(), 7);
        assert_eq!(stats.available_count(), 4);
        assert_eq!(stats.busy_count(), 2);
        assert_eq!(stats.utilization(), 75);
    }

    #[test]
    fn offline_sample_agent() {
        let agents = fallback_agents(Utc::now());
        let david = agents.iter().find(|a| a.name == "David Lee").unwrap();
        assert_eq!(david.id.as_str(), "agent-4");
        assert!(!david.is_online);
        assert_eq!(david.presence_status, PresenceStatus::Offline);
    }
}

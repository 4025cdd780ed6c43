//! Department to queue mapping.
//!
//! This is a placeholder heuristic, not authoritative routing data: queue
//! membership is guessed from the department name with a case-insensitive
//! substring match. A real deployment would ask the platform's routing API
//! which queues each user belongs to.
//!
//! Rules are checked in order and the first match wins:
//!
//! | department contains      | queues                                      |
//! |--------------------------|---------------------------------------------|
//! | `sales`                  | Sales Queue, General Support                |
//! | `support` or `service`   | Technical Support, Customer Service         |
//! | `billing` or `finance`   | Billing Queue, Account Management           |
//! | `technical` or `it`      | Technical Support, IT Help Desk             |
//! | anything else            | General Queue, Customer Service             |
//! | *(no department)*        | General Queue                               |

/// Queue assigned to agents without a department.
pub const GENERAL_QUEUE: &str = "General Queue";

const RULES: &[(&[&str], [&str; 2])] = &[
    (&["sales"], ["Sales Queue", "General Support"]),
    (&["support", "service"], ["Technical Support", "Customer Service"]),
    (&["billing", "finance"], ["Billing Queue", "Account Management"]),
    (&["technical", "it"], ["Technical Support", "IT Help Desk"]),
];

const UNMATCHED: [&str; 2] = [GENERAL_QUEUE, "Customer Service"];

/// Every queue name the mapping can produce, sorted.
pub const ALL_QUEUES: &[&str] = &[
    "Account Management",
    "Billing Queue",
    "Customer Service",
    "General Queue",
    "General Support",
    "IT Help Desk",
    "Sales Queue",
    "Technical Support",
];

/// Map a department to its ordered list of queue names.
#[must_use]
pub fn queues_for_department(department: Option<&str>) -> Vec<String> {
    let Some(department) = department else {
        return vec![GENERAL_QUEUE.to_string()];
    };

    let department = department.to_lowercase();
    let queues = RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| department.contains(n)))
        .map_or(UNMATCHED, |(_, queues)| *queues);

    queues.iter().map(ToString::to_string).collect()
}

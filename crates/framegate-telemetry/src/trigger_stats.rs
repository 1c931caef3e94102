use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Accept/reject tallies for one evaluation outcome, broken down by the
/// label that decided it.
#[derive(Debug, Clone, Default)]
pub struct OutcomeStats {
    pub total: u64,
    pub breakdown: HashMap<String, u64>,
}

impl OutcomeStats {
    pub fn update(&mut self, label: &str) {
        self.total += 1;
        *self.breakdown.entry(label.to_string()).or_insert(0) += 1;
    }
}

/// Diagnostic counters for trigger evaluation. Owned by the capture buffer
/// and updated under its lock; read via a cloned snapshot.
#[derive(Debug, Clone)]
pub struct TriggerStats {
    pub accepted: OutcomeStats,
    pub rejected: OutcomeStats,
    pub started_at: DateTime<Utc>,
}

impl TriggerStats {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            accepted: OutcomeStats::default(),
            rejected: OutcomeStats::default(),
            started_at,
        }
    }

    pub fn record_accept(&mut self, label: &str) {
        self.accepted.update(label);
    }

    pub fn record_reject(&mut self, label: &str) {
        self.rejected.update(label);
    }
}

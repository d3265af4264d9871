use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a queue entry. Transitions are one-way: a waiting entry is
/// assigned to an inspector or times out, an assigned entry can still time
/// out, and an expired entry never comes back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QueueEntryState {
    Waiting,
    Assigned {
        inspector_id: Uuid,
        session_handle: String,
    },
    Expired {
        expired_at: DateTime<Utc>,
    },
}

impl QueueEntryState {
    pub fn is_active(&self) -> bool {
        matches!(self, QueueEntryState::Waiting | QueueEntryState::Assigned { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, QueueEntryState::Expired { .. })
    }

    pub fn can_transition_to(&self, next: &QueueEntryState) -> bool {
        match (self, next) {
            (QueueEntryState::Waiting, QueueEntryState::Assigned { .. }) => true,
            // Both active states time out; Expired never comes back.
            (QueueEntryState::Waiting, QueueEntryState::Expired { .. }) => true,
            (QueueEntryState::Assigned { .. }, QueueEntryState::Expired { .. }) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub enqueued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub state: QueueEntryState,
}

impl QueueEntry {
    pub fn new(order_id: Uuid, now: DateTime<Utc>, inactivity_minutes: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            enqueued_at: now,
            expires_at: now + chrono::Duration::minutes(inactivity_minutes),
            state: QueueEntryState::Waiting,
        }
    }

    /// Seconds left before the entry expires, clamped at zero.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.state.is_active() && self.expires_at <= now
    }
}

/// Result of an admission request. `created` distinguishes a fresh entry
/// from an idempotent return of one already in flight.
#[derive(Debug, Clone, Serialize)]
pub struct AdmissionOutcome {
    pub entry: QueueEntry,
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueStatusResponse {
    pub entry: QueueEntry,
    pub remaining_seconds: i64,
    pub position: Option<usize>,
}

/// Event pushed to subscribed clients over the queue socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    Assigned {
        entry_id: Uuid,
        order_id: Uuid,
        inspector_id: Uuid,
        session_handle: String,
    },
    Expired {
        entry_id: Uuid,
        order_id: Uuid,
        expired_at: DateTime<Utc>,
    },
}

#[derive(Debug, Deserialize)]
pub struct AssignNextRequest {
    pub inspector_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowStatus {
    pub open: bool,
    pub reason: WindowReason,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum WindowReason {
    Open,
    OutsideHours,
    Sunday,
    Holiday { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_forward_only() {
        let waiting = QueueEntryState::Waiting;
        let assigned = QueueEntryState::Assigned {
            inspector_id: Uuid::new_v4(),
            session_handle: "room-1".to_string(),
        };
        let expired = QueueEntryState::Expired {
            expired_at: Utc::now(),
        };

        assert!(waiting.can_transition_to(&assigned));
        assert!(waiting.can_transition_to(&expired));
        assert!(assigned.can_transition_to(&expired));
        assert!(!assigned.can_transition_to(&QueueEntryState::Waiting));
        assert!(!expired.can_transition_to(&assigned));
        assert!(!expired.can_transition_to(&QueueEntryState::Waiting));
    }

    #[test]
    fn remaining_seconds_never_goes_negative() {
        let now = Utc::now();
        let entry = QueueEntry::new(Uuid::new_v4(), now, 10);
        assert_eq!(entry.remaining_seconds(now), 600);
        assert_eq!(entry.remaining_seconds(now + chrono::Duration::minutes(11)), 0);
    }
}

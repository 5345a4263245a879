use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pattern::PhaseKind;

/// Every observable scheduler transition produces an Event.
/// Presentation adapters render them; a session-history collaborator may
/// store the final [`Event::SessionCompleted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        session_id: Uuid,
        pattern_id: String,
        total_ms: u64,
        at: DateTime<Utc>,
    },
    PhaseEntered {
        phase_index: usize,
        kind: PhaseKind,
        label: String,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// The phase index wrapped from the last phase back to 0.
    CycleCompleted {
        cycle_count: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        summary: SessionSummary,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionReason {
    /// Remaining time reached zero.
    Countdown,
    /// The user ended the session early.
    Stopped,
}

/// What a finished session hands to whoever keeps history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub pattern_id: String,
    pub cycles_completed: u64,
    pub elapsed_ms: u64,
    /// Untouched by an early stop, so a stopped session reports the time it
    /// still had left.
    pub remaining_ms: u64,
    pub reason: CompletionReason,
    pub at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn ended_early(&self) -> bool {
        self.reason == CompletionReason::Stopped && self.remaining_ms > 0
    }
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(reason: CompletionReason, remaining_ms: u64) -> SessionSummary {
        SessionSummary {
            session_id: Uuid::new_v4(),
            pattern_id: "box".into(),
            cycles_completed: 1,
            elapsed_ms: 10_000,
            remaining_ms,
            reason,
            at: Utc::now(),
        }
    }

    #[test]
    fn event_is_tagged_by_type() {
        let event = Event::CycleCompleted {
            cycle_count: 3,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "cycle_completed");
        assert_eq!(json["cycle_count"], 3);
        assert!(!event.is_terminal());
    }

    #[test]
    fn ended_early_only_for_stops_with_time_left() {
        assert!(summary(CompletionReason::Stopped, 110_000).ended_early());
        assert!(!summary(CompletionReason::Stopped, 0).ended_early());
        assert!(!summary(CompletionReason::Countdown, 0).ended_early());
    }
}

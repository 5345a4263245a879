//! Phase scheduler.
//!
//! The scheduler is a tick-driven state machine. It has no clock and no
//! thread: whoever owns the session feeds it time deltas with `tick()`.
//! Every operation takes `&self` and returns a fresh [`SchedulerState`], so
//! readers can hold a snapshot between ticks while the driving loop replaces
//! its own copy.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Complete
//! ```
//!
//! `Complete` is terminal. It is reached either when the remaining time runs
//! out or when `stop()` is called.
//!
//! ## Usage
//!
//! ```ignore
//! let mut state = SchedulerState::start(&config);
//! // In a loop:
//! state = state.tick(delta);
//! ```
//!
//! Time is held in integer microseconds. Carrying the remainder across phase
//! boundaries in integers means any split of the same total time lands on
//! exactly the same phase position.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::{duration_to_micros, secs_to_micros};
use crate::events::{CompletionReason, Event, SessionSummary};
use crate::pattern::Phase;
use crate::presentation::Snapshot;
use crate::session::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Running,
    Complete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerState {
    config: SessionConfig,
    session_id: Uuid,
    status: Status,
    phase_index: usize,
    elapsed_in_phase_us: u64,
    remaining_us: u64,
    cycle_count: u64,
    completion: Option<CompletionReason>,
}

impl SchedulerState {
    /// A session that has not started yet. `tick()` is a no-op until
    /// [`begin`](Self::begin) is called.
    pub fn idle(config: &SessionConfig) -> Self {
        Self {
            config: config.clone(),
            session_id: Uuid::new_v4(),
            status: Status::Idle,
            phase_index: 0,
            elapsed_in_phase_us: 0,
            remaining_us: config.total_us(),
            cycle_count: 0,
            completion: None,
        }
    }

    /// A running session positioned at the start of the first phase.
    pub fn start(config: &SessionConfig) -> Self {
        Self::idle(config).begin()
    }

    /// Idle -> Running. Any other status is returned unchanged.
    pub fn begin(&self) -> Self {
        if self.status != Status::Idle {
            return self.clone();
        }
        info!(
            session_id = %self.session_id,
            pattern = %self.config.pattern().id,
            total_us = self.remaining_us,
            "breathing session started"
        );
        Self {
            status: Status::Running,
            ..self.clone()
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn is_complete(&self) -> bool {
        self.status == Status::Complete
    }

    pub fn completion_reason(&self) -> Option<CompletionReason> {
        self.completion
    }

    pub fn phase_index(&self) -> usize {
        self.phase_index
    }

    pub fn current_phase(&self) -> &Phase {
        &self.config.pattern().phases[self.phase_index]
    }

    pub fn elapsed_in_phase(&self) -> Duration {
        Duration::from_micros(self.elapsed_in_phase_us)
    }

    pub fn elapsed_in_phase_us(&self) -> u64 {
        self.elapsed_in_phase_us
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_micros(self.remaining_us)
    }

    pub fn remaining_us(&self) -> u64 {
        self.remaining_us
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        let duration = self.current_phase().duration_us();
        if duration == 0 {
            return 0.0;
        }
        (self.elapsed_in_phase_us as f64 / duration as f64).clamp(0.0, 1.0)
    }

    /// 0.0 .. 1.0 share of the session's total time already used.
    pub fn session_progress(&self) -> f64 {
        let total = self.config.total_us();
        if total == 0 {
            return 0.0;
        }
        let used = total.saturating_sub(self.remaining_us);
        (used as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Remaining time as `m:ss`.
    ///
    /// Partial seconds round up, so the display reads `0:01` until the
    /// countdown actually reaches zero.
    pub fn remaining_formatted(&self) -> String {
        format_clock(self.remaining_us)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(self)
    }

    /// Summary for the history collaborator, once the session is over.
    pub fn summary(&self) -> Option<SessionSummary> {
        let reason = self.completion?;
        let total = self.config.total_us();
        Some(SessionSummary {
            session_id: self.session_id,
            pattern_id: self.config.pattern().id.clone(),
            cycles_completed: self.cycle_count,
            elapsed_ms: total.saturating_sub(self.remaining_us) / 1000,
            remaining_ms: self.remaining_us / 1000,
            reason,
            at: Utc::now(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the session by `delta`.
    ///
    /// No-op unless Running. `delta` is assumed to be a plausible wall-clock
    /// step; clamping deltas from a suspended timer is the caller's job.
    pub fn tick(&self, delta: Duration) -> Self {
        self.apply(duration_to_micros(delta), None)
    }

    /// [`tick`](Self::tick) with the delta in seconds. Negative or
    /// non-finite deltas count as zero.
    pub fn tick_secs(&self, delta_secs: f64) -> Self {
        self.apply(secs_to_micros(delta_secs), None)
    }

    /// Same as [`tick`](Self::tick), also returning the transitions the
    /// delta caused, in order.
    pub fn advance(&self, delta: Duration) -> (Self, Vec<Event>) {
        let mut events = Vec::new();
        let next = self.apply(duration_to_micros(delta), Some(&mut events));
        (next, events)
    }

    /// End the session now. Remaining time is left as it is.
    ///
    /// Idempotent: stopping a completed session returns it unchanged.
    pub fn stop(&self) -> Self {
        if self.status == Status::Complete {
            return self.clone();
        }
        info!(
            session_id = %self.session_id,
            remaining_us = self.remaining_us,
            cycles = self.cycle_count,
            "breathing session stopped early"
        );
        Self {
            status: Status::Complete,
            completion: Some(CompletionReason::Stopped),
            ..self.clone()
        }
    }

    /// [`stop`](Self::stop), returning the completion event if this call
    /// was the one that ended the session.
    pub fn stop_with_event(&self) -> (Self, Option<Event>) {
        if self.status == Status::Complete {
            return (self.clone(), None);
        }
        let next = self.stop();
        let event = next.summary().map(|summary| Event::SessionCompleted { summary });
        (next, event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&self, delta_us: u64, mut events: Option<&mut Vec<Event>>) -> Self {
        if self.status != Status::Running {
            return self.clone();
        }
        let mut next = self.clone();

        // The final tick only credits the time that was actually left.
        let consumed = delta_us.min(next.remaining_us);
        next.remaining_us -= consumed;
        next.elapsed_in_phase_us += consumed;
        next.roll_over(&mut events);

        if next.remaining_us == 0 {
            next.status = Status::Complete;
            next.completion = Some(CompletionReason::Countdown);
            info!(
                session_id = %next.session_id,
                cycles = next.cycle_count,
                "breathing session complete"
            );
            if let (Some(out), Some(summary)) = (events.as_deref_mut(), next.summary()) {
                out.push(Event::SessionCompleted { summary });
            }
        }
        next
    }

    /// Carry elapsed time across as many phase boundaries as it covers.
    fn roll_over(&mut self, events: &mut Option<&mut Vec<Event>>) {
        let phase_count = self.config.pattern().phase_count();
        loop {
            let duration = self.current_phase().duration_us();
            if self.elapsed_in_phase_us < duration {
                break;
            }
            self.elapsed_in_phase_us -= duration;
            self.phase_index = (self.phase_index + 1) % phase_count;
            if self.phase_index == 0 {
                self.cycle_count += 1;
                debug!(cycle_count = self.cycle_count, "cycle completed");
                if let Some(out) = events.as_deref_mut() {
                    out.push(Event::CycleCompleted {
                        cycle_count: self.cycle_count,
                        at: Utc::now(),
                    });
                }
            }
            let phase = self.current_phase();
            debug!(phase_index = self.phase_index, label = %phase.label, "phase entered");
            if let Some(out) = events.as_deref_mut() {
                out.push(Event::PhaseEntered {
                    phase_index: self.phase_index,
                    kind: phase.kind,
                    label: phase.label.clone(),
                    duration_ms: phase.duration_ms,
                    at: Utc::now(),
                });
            }
        }
    }
}

fn format_clock(us: u64) -> String {
    let secs = us.div_ceil(1_000_000);
    format!("{}:{:02}", secs / 60, secs % 60)
}

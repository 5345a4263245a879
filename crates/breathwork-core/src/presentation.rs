//! Boundary towards whatever draws the session.
//!
//! The core does not animate anything. It exposes a [`Snapshot`] of the
//! scheduler after every tick and pushes [`Event`]s to a [`PresentationSink`];
//! mapping those onto visuals is the adapter's business.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::pacer::{SchedulerState, Status};
use crate::pattern::{Pattern, PhaseKind};

/// Everything a presentation adapter needs from one scheduler state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub status: Status,
    pub pattern_id: String,
    pub phase_index: usize,
    pub phase_label: String,
    pub phase_kind: PhaseKind,
    /// 0.0 .. 1.0 progress within the current phase.
    pub progress: f64,
    /// 0.0 .. 1.0 size of the breathing visual, see [`breath_scale`].
    pub scale: f64,
    pub cycle_count: u64,
    pub remaining_ms: u64,
    pub remaining: String,
    pub at: DateTime<Utc>,
}

impl Snapshot {
    pub fn of(state: &SchedulerState) -> Self {
        let pattern = state.config().pattern();
        let phase = state.current_phase();
        let progress = state.progress();
        Self {
            status: state.status(),
            pattern_id: pattern.id.clone(),
            phase_index: state.phase_index(),
            phase_label: phase.label.clone(),
            phase_kind: phase.kind,
            progress,
            scale: breath_scale(pattern, state.phase_index(), progress),
            cycle_count: state.cycle_count(),
            remaining_ms: state.remaining_us() / 1000,
            remaining: state.remaining_formatted(),
            at: Utc::now(),
        }
    }
}

/// Reference mapping from phase position to visual size.
///
/// Expanding phases grow from 0 to 1, contracting phases shrink from 1 to 0,
/// and holds keep the size the previous movement ended on.
pub fn breath_scale(pattern: &Pattern, phase_index: usize, progress: f64) -> f64 {
    let progress = progress.clamp(0.0, 1.0);
    let Some(phase) = pattern.phases.get(phase_index) else {
        return 0.0;
    };
    match phase.kind {
        PhaseKind::Expand => progress,
        PhaseKind::Contract => 1.0 - progress,
        PhaseKind::Hold => match pattern.preceding_movement(phase_index) {
            Some(PhaseKind::Expand) => 1.0,
            Some(PhaseKind::Contract) => 0.0,
            _ => 0.5,
        },
    }
}

/// Receiver for scheduler output.
pub trait PresentationSink {
    fn on_snapshot(&mut self, snapshot: &Snapshot);

    fn on_event(&mut self, event: &Event);
}

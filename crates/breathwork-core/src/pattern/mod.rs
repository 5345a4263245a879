//! Breathing patterns.
//!
//! A [`Pattern`] is one full breathing cycle: an ordered, non-empty list of
//! [`Phase`]s, each with a fixed duration and a [`PhaseKind`] that tells the
//! presentation layer which way the breath is moving. Patterns are authored
//! statically (built in, or loaded once from the user's config file) and are
//! never mutated afterwards.

mod catalog;

pub use catalog::PatternCatalog;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigurationError;

/// Longest cycle a pattern may describe (one hour).
pub const MAX_CYCLE_MS: u64 = 60 * 60 * 1000;

/// Direction of the breath during a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    /// Breathing in; the visual grows.
    Expand,
    /// Breath held; the visual keeps its size.
    Hold,
    /// Breathing out; the visual shrinks.
    Contract,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub label: String,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl Phase {
    pub fn new(kind: PhaseKind, label: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            kind,
            label: label.into(),
            duration_ms,
        }
    }

    pub fn inhale(duration_ms: u64) -> Self {
        Self::new(PhaseKind::Expand, "Inhale", duration_ms)
    }

    pub fn hold(duration_ms: u64) -> Self {
        Self::new(PhaseKind::Hold, "Hold", duration_ms)
    }

    pub fn exhale(duration_ms: u64) -> Self {
        Self::new(PhaseKind::Contract, "Exhale", duration_ms)
    }

    /// Get phase duration in microseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_us(&self) -> u64 {
        self.duration_ms.saturating_mul(1000)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Lookup key, e.g. `"box"` or `"4-7-8"`.
    pub id: String,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub phases: Vec<Phase>,
}

impl Pattern {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        phases: Vec<Phase>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            phases,
        }
    }

    /// Check that the pattern can drive a scheduler: at least one phase,
    /// every phase strictly longer than zero, and a cycle no longer than
    /// [`MAX_CYCLE_MS`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |message: String| ConfigurationError::InvalidPattern {
            id: self.id.clone(),
            message,
        };
        if self.id.trim().is_empty() {
            return Err(invalid("pattern id is empty".into()));
        }
        if self.phases.is_empty() {
            return Err(invalid("pattern has no phases".into()));
        }
        if let Some((i, phase)) = self
            .phases
            .iter()
            .enumerate()
            .find(|(_, p)| p.duration_ms == 0)
        {
            return Err(invalid(format!(
                "phase {} ('{}') has zero duration",
                i, phase.label
            )));
        }
        let cycle_ms = self
            .phases
            .iter()
            .try_fold(0u64, |acc, p| acc.checked_add(p.duration_ms));
        match cycle_ms {
            Some(ms) if ms <= MAX_CYCLE_MS => Ok(()),
            _ => Err(invalid(format!(
                "cycle duration too long (limit {MAX_CYCLE_MS} ms)"
            ))),
        }
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    /// Saturates at `u64::MAX` for patterns that never passed [`validate`](Self::validate).
    pub fn cycle_duration_ms(&self) -> u64 {
        self.phases
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(p.duration_ms))
    }

    pub fn cycle_duration(&self) -> Duration {
        Duration::from_millis(self.cycle_duration_ms())
    }

    /// Shortest phase in milliseconds, `0` for an empty pattern.
    pub fn shortest_phase_ms(&self) -> u64 {
        self.phases.iter().map(|p| p.duration_ms).min().unwrap_or(0)
    }

    pub fn breaths_per_minute(&self) -> f64 {
        let cycle = self.cycle_duration_ms();
        if cycle == 0 {
            return 0.0;
        }
        60_000.0 / cycle as f64
    }

    /// Kind of the closest non-hold phase before `index`, wrapping around the
    /// cycle. `None` when the pattern is made only of holds.
    pub fn preceding_movement(&self, index: usize) -> Option<PhaseKind> {
        let n = self.phases.len();
        (1..=n)
            .map(|back| &self.phases[(index + n - back) % n])
            .map(|p| p.kind)
            .find(|k| *k != PhaseKind::Hold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_pattern() -> Pattern {
        Pattern::new(
            "box",
            "Box",
            "",
            vec![
                Phase::inhale(4000),
                Phase::hold(4000),
                Phase::exhale(4000),
                Phase::hold(4000),
            ],
        )
    }

    #[test]
    fn cycle_duration_sums_phases() {
        let p = box_pattern();
        assert_eq!(p.cycle_duration_ms(), 16_000);
        assert_eq!(p.cycle_duration(), Duration::from_secs(16));
        assert_eq!(p.shortest_phase_ms(), 4000);
    }

    #[test]
    fn breaths_per_minute() {
        let p = box_pattern();
        assert!((p.breaths_per_minute() - 3.75).abs() < 1e-9);
    }

    #[test]
    fn validate_rejects_empty_and_zero_phases() {
        let mut p = box_pattern();
        assert!(p.validate().is_ok());

        p.phases[2].duration_ms = 0;
        assert!(matches!(
            p.validate(),
            Err(ConfigurationError::InvalidPattern { .. })
        ));

        p.phases.clear();
        assert!(p.validate().is_err());
    }

    #[test]
    fn validate_rejects_overlong_cycles() {
        let huge = Pattern::new(
            "huge",
            "Huge",
            "",
            vec![
                Phase::inhale(7_000_000_000_000_000_000),
                Phase::hold(7_000_000_000_000_000_000),
                Phase::exhale(7_000_000_000_000_000_000),
            ],
        );
        assert!(matches!(
            huge.validate(),
            Err(ConfigurationError::InvalidPattern { ref message, .. })
                if message.contains("too long")
        ));
        // Derived values saturate instead of overflowing.
        assert_eq!(huge.cycle_duration_ms(), u64::MAX);
        assert!(huge.breaths_per_minute() >= 0.0);

        let just_over = Pattern::new(
            "long",
            "Long",
            "",
            vec![Phase::inhale(MAX_CYCLE_MS), Phase::exhale(1)],
        );
        assert!(just_over.validate().is_err());

        let at_limit = Pattern::new("limit", "Limit", "", vec![Phase::inhale(MAX_CYCLE_MS)]);
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn preceding_movement_wraps() {
        let p = box_pattern();
        assert_eq!(p.preceding_movement(1), Some(PhaseKind::Expand));
        assert_eq!(p.preceding_movement(3), Some(PhaseKind::Contract));
        // The inhale at index 0 is preceded by the trailing hold, then the exhale.
        assert_eq!(p.preceding_movement(0), Some(PhaseKind::Contract));
    }

    #[test]
    fn phase_kind_serializes_lowercase() {
        let json = serde_json::to_string(&PhaseKind::Contract).unwrap();
        assert_eq!(json, "\"contract\"");
    }
}

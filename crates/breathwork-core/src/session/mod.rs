//! Session configuration.
//!
//! A [`SessionConfig`] is validated once when the user starts a session and
//! frozen for the session's lifetime. A failed validation rejects the start
//! request; no scheduler state is created.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigurationError;
use crate::pacer::{duration_to_micros, secs_to_micros};
use crate::pattern::{Pattern, PatternCatalog};

/// A tick interval at or above this fraction of the shortest phase makes the
/// progress animation visibly step.
const SMOOTH_TICK_DIVISOR: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pattern: Arc<Pattern>,
    total_us: u64,
    tick_interval_us: u64,
}

impl SessionConfig {
    /// Validate and freeze the parameters of one session.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::UnknownPattern`] if `pattern_id` is not in `catalog`
    /// - [`ConfigurationError::NonPositiveDuration`] if `total` is zero
    /// - [`ConfigurationError::NonPositiveTickInterval`] if `tick_interval` is zero
    pub fn create(
        catalog: &PatternCatalog,
        pattern_id: &str,
        total: Duration,
        tick_interval: Duration,
    ) -> Result<Self, ConfigurationError> {
        let pattern = Arc::clone(catalog.lookup(pattern_id)?);
        Self::build(
            pattern,
            duration_to_micros(total),
            duration_to_micros(tick_interval),
        )
    }

    /// Same as [`create`](Self::create) with durations in seconds.
    ///
    /// Non-finite and non-positive values are rejected.
    pub fn from_seconds(
        catalog: &PatternCatalog,
        pattern_id: &str,
        total_secs: f64,
        tick_interval_secs: f64,
    ) -> Result<Self, ConfigurationError> {
        let pattern = Arc::clone(catalog.lookup(pattern_id)?);
        Self::build(
            pattern,
            secs_to_micros(total_secs),
            secs_to_micros(tick_interval_secs),
        )
    }

    /// Session lasting exactly `cycles` full passes through the pattern.
    pub fn from_cycles(
        catalog: &PatternCatalog,
        pattern_id: &str,
        cycles: u32,
        tick_interval: Duration,
    ) -> Result<Self, ConfigurationError> {
        let pattern = Arc::clone(catalog.lookup(pattern_id)?);
        if cycles == 0 {
            return Err(ConfigurationError::NoCycles);
        }
        let total_us = pattern
            .cycle_duration_ms()
            .saturating_mul(1000)
            .saturating_mul(u64::from(cycles));
        Self::build(pattern, total_us, duration_to_micros(tick_interval))
    }

    fn build(
        pattern: Arc<Pattern>,
        total_us: u64,
        tick_interval_us: u64,
    ) -> Result<Self, ConfigurationError> {
        pattern.validate()?;
        if total_us == 0 {
            return Err(ConfigurationError::NonPositiveDuration);
        }
        if tick_interval_us == 0 {
            return Err(ConfigurationError::NonPositiveTickInterval);
        }

        let shortest_us = pattern.shortest_phase_ms().saturating_mul(1000);
        if tick_interval_us.saturating_mul(SMOOTH_TICK_DIVISOR) > shortest_us {
            warn!(
                pattern = %pattern.id,
                tick_interval_us,
                shortest_phase_us = shortest_us,
                "tick interval is coarse relative to the shortest phase; progress will look choppy"
            );
        }
        let config = Self {
            pattern,
            total_us,
            tick_interval_us,
        };
        if config.is_partial_cycle() {
            warn!(
                pattern = %config.pattern.id,
                total_us,
                cycle_us = config.cycle_us(),
                "session is shorter than one full cycle"
            );
        }
        Ok(config)
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn total(&self) -> Duration {
        Duration::from_micros(self.total_us)
    }

    pub fn total_us(&self) -> u64 {
        self.total_us
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_micros(self.tick_interval_us)
    }

    fn cycle_us(&self) -> u64 {
        self.pattern.cycle_duration_ms().saturating_mul(1000)
    }

    /// `true` when the session ends before the first cycle completes.
    ///
    /// Such sessions are accepted; the caller decides whether to tell the user.
    pub fn is_partial_cycle(&self) -> bool {
        self.total_us < self.cycle_us()
    }

    /// Number of whole cycles that fit in the session.
    pub fn planned_cycles(&self) -> u64 {
        match self.cycle_us() {
            0 => 0,
            cycle => self.total_us / cycle,
        }
    }
}

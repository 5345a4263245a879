mod driver;
mod scheduler;

pub use driver::{NullSink, SessionDriver, SessionHandle};
pub use scheduler::{SchedulerState, Status};

use std::time::Duration;

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Seconds to whole microseconds, rounding to nearest.
///
/// Anything that is not a positive finite number maps to `0`.
pub(crate) fn secs_to_micros(secs: f64) -> u64 {
    if !secs.is_finite() || secs <= 0.0 {
        return 0;
    }
    // `as` saturates at u64::MAX.
    (secs * MICROS_PER_SEC).round() as u64
}

pub(crate) fn duration_to_micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

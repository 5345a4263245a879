//! Real-time driver for one session.
//!
//! The driver is the single owner of a [`SchedulerState`]. It ticks on a
//! `tokio` interval, measures the real time that passed, and swaps in the
//! state `tick` returns. Other tasks observe the session through the
//! [`SessionHandle`]'s snapshot channel and end it with
//! [`SessionHandle::stop`].

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::SchedulerState;
use crate::events::Event;
use crate::presentation::{PresentationSink, Snapshot};
use crate::session::SessionConfig;

/// Sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}

    fn on_event(&mut self, _event: &Event) {}
}

/// Control side of a running [`SessionDriver`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    stop_tx: watch::Sender<bool>,
    snapshot_rx: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    /// Ask the driver to end the session early. Safe to call repeatedly.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Latest published snapshot.
    pub fn latest(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver that wakes on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }
}

pub struct SessionDriver {
    state: SchedulerState,
    max_tick_delta: Duration,
    stop_rx: watch::Receiver<bool>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl SessionDriver {
    /// Prepare a driver for `config`. The session is Idle until [`run`](Self::run).
    ///
    /// `max_tick_delta` caps the time credited per tick, so a process that
    /// was suspended resumes where it left off instead of fast-forwarding.
    pub fn new(config: &SessionConfig, max_tick_delta: Duration) -> (Self, SessionHandle) {
        let state = SchedulerState::idle(config);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let max_tick_delta = max_tick_delta.max(config.tick_interval());
        (
            Self {
                state,
                max_tick_delta,
                stop_rx,
                snapshot_tx,
            },
            SessionHandle {
                stop_tx,
                snapshot_rx,
            },
        )
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Most real time a single tick may credit; never below the tick interval.
    pub fn max_tick_delta(&self) -> Duration {
        self.max_tick_delta
    }

    /// Pace the session until it completes or is stopped, and return the
    /// final state.
    pub async fn run<S: PresentationSink>(mut self, sink: &mut S) -> SchedulerState {
        self.state = self.state.begin();
        let config = self.state.config();
        sink.on_event(&Event::SessionStarted {
            session_id: self.state.session_id(),
            pattern_id: config.pattern().id.clone(),
            total_ms: config.total_us() / 1000,
            at: chrono::Utc::now(),
        });
        self.publish(sink);

        let mut ticker = time::interval(config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick of an interval fires immediately.
        ticker.tick().await;
        let mut last = Instant::now();
        let mut stop_open = true;

        while !self.state.is_complete() {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let measured = now.duration_since(last);
                    last = now;
                    let delta = if measured > self.max_tick_delta {
                        warn!(
                            measured_ms = measured.as_millis() as u64,
                            credited_ms = self.max_tick_delta.as_millis() as u64,
                            "tick delta clamped; timer was likely suspended"
                        );
                        self.max_tick_delta
                    } else {
                        measured
                    };
                    let (next, events) = self.state.advance(delta);
                    self.state = next;
                    for event in &events {
                        sink.on_event(event);
                    }
                    self.publish(sink);
                }
                changed = self.stop_rx.changed(), if stop_open => {
                    match changed {
                        Ok(()) if *self.stop_rx.borrow_and_update() => {
                            let (next, event) = self.state.stop_with_event();
                            self.state = next;
                            if let Some(event) = event {
                                sink.on_event(&event);
                            }
                            self.publish(sink);
                        }
                        Ok(()) => {}
                        Err(_) => {
                            debug!("session handle dropped; running to completion");
                            stop_open = false;
                        }
                    }
                }
            }
        }
        self.state
    }

    fn publish<S: PresentationSink>(&self, sink: &mut S) {
        let snapshot = self.state.snapshot();
        sink.on_snapshot(&snapshot);
        self.snapshot_tx.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CompletionReason;
    use crate::pattern::PatternCatalog;

    #[derive(Default)]
    struct Recorder {
        snapshots: usize,
        events: Vec<Event>,
    }

    impl PresentationSink for Recorder {
        fn on_snapshot(&mut self, _snapshot: &Snapshot) {
            self.snapshots += 1;
        }

        fn on_event(&mut self, event: &Event) {
            self.events.push(event.clone());
        }
    }

    fn config(pattern: &str, total: Duration) -> SessionConfig {
        SessionConfig::create(
            &PatternCatalog::builtin(),
            pattern,
            total,
            Duration::from_millis(50),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn runs_until_countdown_completes() {
        let (driver, handle) = SessionDriver::new(
            &config("calm", Duration::from_secs(20)),
            Duration::from_secs(1),
        );
        let mut sink = Recorder::default();
        let state = driver.run(&mut sink).await;

        assert!(state.is_complete());
        assert_eq!(state.remaining(), Duration::ZERO);
        assert_eq!(state.cycle_count(), 2);
        assert_eq!(state.completion_reason(), Some(CompletionReason::Countdown));
        assert!(matches!(sink.events.first(), Some(Event::SessionStarted { .. })));
        assert!(sink.events.last().is_some_and(Event::is_terminal));
        // Start snapshot plus one per 50ms tick.
        assert_eq!(sink.snapshots, 1 + 400);
        assert_eq!(handle.latest().remaining_ms, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_session_early() {
        let (driver, handle) = SessionDriver::new(
            &config("box", Duration::from_secs(120)),
            Duration::from_secs(1),
        );
        let task = tokio::spawn(async move {
            let mut sink = NullSink;
            driver.run(&mut sink).await
        });

        time::sleep(Duration::from_secs(10)).await;
        handle.stop();
        let state = task.await.unwrap();

        assert!(state.is_complete());
        assert_eq!(state.completion_reason(), Some(CompletionReason::Stopped));
        let remaining = state.remaining();
        assert!(remaining >= Duration::from_millis(109_900), "{remaining:?}");
        assert!(remaining <= Duration::from_millis(110_100), "{remaining:?}");

        // A second stop after completion changes nothing.
        handle.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_runs_to_completion() {
        let (driver, handle) = SessionDriver::new(
            &config("box", Duration::from_secs(2)),
            Duration::from_secs(1),
        );
        drop(handle);
        let state = driver.run(&mut NullSink).await;
        assert_eq!(state.completion_reason(), Some(CompletionReason::Countdown));
    }

    #[tokio::test(start_paused = true)]
    async fn clock_jump_is_clamped_to_max_tick_delta() {
        let (driver, handle) = SessionDriver::new(
            &config("box", Duration::from_secs(120)),
            Duration::from_secs(1),
        );
        let task = tokio::spawn(async move { driver.run(&mut NullSink).await });

        time::sleep(Duration::from_secs(2)).await;
        // Simulates the process being suspended for 30 seconds.
        time::advance(Duration::from_secs(30)).await;
        time::sleep(Duration::from_millis(100)).await;
        handle.stop();
        let state = task.await.unwrap();

        assert_eq!(state.completion_reason(), Some(CompletionReason::Stopped));
        // About 2s + 1s (clamped jump) + 0.1s credited, not 32s.
        let remaining = state.remaining();
        assert!(remaining >= Duration::from_secs(116), "{remaining:?}");
        assert!(remaining <= Duration::from_secs(118), "{remaining:?}");
    }

    #[test]
    fn max_tick_delta_is_at_least_the_tick_interval() {
        let cfg = config("box", Duration::from_secs(60));
        let (driver, _handle) = SessionDriver::new(&cfg, Duration::from_millis(1));
        assert_eq!(driver.max_tick_delta(), Duration::from_millis(50));

        let (driver, _handle) = SessionDriver::new(&cfg, Duration::from_secs(2));
        assert_eq!(driver.max_tick_delta(), Duration::from_secs(2));
    }
}

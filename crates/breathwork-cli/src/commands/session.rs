use std::io::Write;
use std::time::Duration;

use breathwork_core::{
    Config, CoreError, Event, PresentationSink, SchedulerState, SessionConfig, SessionDriver,
    SessionSummary, Snapshot,
};
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct SessionParams {
    /// Pattern id (defaults to session.default_pattern)
    #[arg(long, short)]
    pattern: Option<String>,
    /// Session length in seconds (defaults to session.default_duration_secs)
    #[arg(long, conflicts_with = "cycles")]
    seconds: Option<f64>,
    /// Session length as a number of full cycles
    #[arg(long)]
    cycles: Option<u32>,
    /// Tick interval in milliseconds (defaults to session.tick_interval_ms)
    #[arg(long)]
    tick_ms: Option<u64>,
}

#[derive(Subcommand)]
pub enum SessionAction {
    /// Pace a session in real time (Ctrl+C ends it early)
    Run {
        #[command(flatten)]
        params: SessionParams,
    },
    /// Fast-forward a session and print JSON lines
    Simulate {
        #[command(flatten)]
        params: SessionParams,
        /// Print every Nth snapshot
        #[arg(long, default_value = "20")]
        every: usize,
        /// Print transitions instead of snapshots
        #[arg(long)]
        events: bool,
        /// End the session early after this many seconds
        #[arg(long)]
        stop_after: Option<f64>,
    },
}

fn build_session(config: &Config, params: &SessionParams) -> Result<SessionConfig, CoreError> {
    let catalog = config.catalog()?;
    let pattern = params
        .pattern
        .as_deref()
        .unwrap_or(&config.session.default_pattern);
    let tick = params
        .tick_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.tick_interval());

    let session = match (params.cycles, params.seconds) {
        (Some(cycles), _) => SessionConfig::from_cycles(&catalog, pattern, cycles, tick)?,
        (None, Some(secs)) => {
            SessionConfig::from_seconds(&catalog, pattern, secs, tick.as_secs_f64())?
        }
        (None, None) => SessionConfig::create(
            &catalog,
            pattern,
            Duration::from_secs(config.session.default_duration_secs),
            tick,
        )?,
    };
    Ok(session)
}

/// Single-line terminal rendering of the running session.
struct TerminalSink {
    show_bar: bool,
    bar_width: usize,
}

impl TerminalSink {
    fn bar(&self, scale: f64) -> String {
        let filled = ((scale * self.bar_width as f64).round() as usize).min(self.bar_width);
        format!("[{}{}]", "#".repeat(filled), " ".repeat(self.bar_width - filled))
    }
}

impl PresentationSink for TerminalSink {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        let bar = if self.show_bar {
            self.bar(snapshot.scale)
        } else {
            String::new()
        };
        print!(
            "\r{:<8} {} {:>6}  cycles {}  ",
            snapshot.phase_label, bar, snapshot.remaining, snapshot.cycle_count
        );
        let _ = std::io::stdout().flush();
    }

    fn on_event(&mut self, event: &Event) {
        match event {
            Event::SessionStarted { pattern_id, total_ms, .. } => {
                println!("{pattern_id}: {}s session", total_ms / 1000);
            }
            Event::SessionCompleted { summary } => {
                println!();
                print_summary(summary);
            }
            _ => {}
        }
    }
}

fn print_summary(summary: &SessionSummary) {
    if summary.ended_early() {
        println!(
            "Stopped early after {} cycle(s), {}s remaining",
            summary.cycles_completed,
            summary.remaining_ms / 1000
        );
    } else {
        println!("Session complete: {} cycle(s)", summary.cycles_completed);
    }
}

fn run_realtime(config: &Config, session: SessionConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut sink = TerminalSink {
        show_bar: config.display.show_progress_bar,
        bar_width: config.display.bar_width as usize,
    };
    let (driver, handle) = SessionDriver::new(&session, config.max_tick_delta());

    runtime.block_on(async move {
        let ctrl_c = handle.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c.stop();
            }
        });
        driver.run(&mut sink).await;
    });
    Ok(())
}

fn simulate(
    session: SessionConfig,
    every: usize,
    events: bool,
    stop_after: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = session.tick_interval();
    let stop_at = stop_after.and_then(|secs| Duration::try_from_secs_f64(secs).ok());
    let every = every.max(1);

    let mut state = SchedulerState::start(&session);
    let mut elapsed = Duration::ZERO;
    let mut ticks = 0usize;
    while !state.is_complete() {
        if stop_at.is_some_and(|at| elapsed >= at) {
            let (next, event) = state.stop_with_event();
            state = next;
            if let (true, Some(event)) = (events, event) {
                println!("{}", serde_json::to_string(&event)?);
            }
            break;
        }
        let (next, transitions) = state.advance(tick);
        state = next;
        elapsed += tick;
        ticks += 1;
        if events {
            for event in &transitions {
                println!("{}", serde_json::to_string(event)?);
            }
        } else if ticks % every == 0 || state.is_complete() {
            println!("{}", serde_json::to_string(&state.snapshot())?);
        }
    }
    if !events {
        if let Some(summary) = state.summary() {
            println!("{}", serde_json::to_string(&summary)?);
        }
    }
    Ok(())
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();

    match action {
        SessionAction::Run { params } => {
            let session = build_session(&config, &params)?;
            run_realtime(&config, session)?;
        }
        SessionAction::Simulate {
            params,
            every,
            events,
            stop_after,
        } => {
            let session = build_session(&config, &params)?;
            simulate(session, every, events, stop_after)?;
        }
    }
    Ok(())
}

//! # Breathwork Core Library
//!
//! This library provides the core logic for the Breathwork guided breathing
//! pacer. All operations are available via a standalone CLI binary; any
//! graphical front end is a thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Patterns**: An immutable catalog of named breathing patterns, each an
//!   ordered cycle of timed phases
//! - **Session**: Validated, frozen parameters for one session
//! - **Pacer**: A tick-driven state machine that requires the caller to
//!   periodically invoke `tick()`, plus an async driver that does so
//! - **Presentation**: Snapshots and events for whatever draws the session
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PatternCatalog`]: Pattern lookup
//! - [`SessionConfig`]: Session parameter validation
//! - [`SchedulerState`]: Core phase scheduler
//! - [`SessionDriver`]: Real-time tick source for one session
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod pacer;
pub mod pattern;
pub mod presentation;
pub mod session;
pub mod storage;

pub use error::{ConfigError, ConfigurationError, CoreError};
pub use events::{CompletionReason, Event, SessionSummary};
pub use pacer::{NullSink, SchedulerState, SessionDriver, SessionHandle, Status};
pub use pattern::{Pattern, PatternCatalog, Phase, PhaseKind};
pub use presentation::{breath_scale, PresentationSink, Snapshot};
pub use session::SessionConfig;
pub use storage::Config;

//! # Tomata Core Library
//!
//! Core business logic for the Tomata Pomodoro timer. The CLI binary is a
//! thin presentation layer over this crate; anything that renders or plays
//! sound lives behind the [`NotificationSink`] trait.
//!
//! ## Architecture
//!
//! - **SessionController**: the session state machine. Owns the repetition
//!   counter, current stage, and pause state; decides every stage transition.
//! - **CountdownScheduler**: emits one tick per second for an interval,
//!   delivered as messages on a channel; runs are cancellable mid-flight.
//! - **Notification**: every externally visible effect (display updates,
//!   cues, cycle tallies) is a notification pushed to a sink.
//!
//! ## Key Components
//!
//! - [`SessionController`]: command entry points (`start`, `pause`, `reset`)
//!   plus the tick path
//! - [`TokioCountdown`]: wall-clock scheduler backed by a tokio task
//! - [`SessionConfig`]: TOML-backed duration and cue settings

pub mod config;
pub mod error;
pub mod events;
pub mod session;

pub use config::{CuesConfig, DurationsConfig, SessionConfig};
pub use error::ConfigError;
pub use events::{Notification, NotificationSink, RecordingSink};
pub use session::{
    CountdownHandle, CountdownScheduler, EagerCountdown, RunId, SessionController, SessionState,
    Stage, TimerMessage, TokioCountdown, FULL_CYCLE_REPS,
};

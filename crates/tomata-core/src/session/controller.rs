//! Session state machine.
//!
//! The controller owns all session state and is the single serialization
//! point: operator commands (`start`, `pause`, `reset`) and scheduler
//! messages (`handle_message`) must be called from one event loop.
//!
//! ## State transitions
//!
//! ```text
//! idle -> running <-> paused -> idle (full reset)
//!           |
//!           v (remaining hits zero)
//!         advance -> running (next interval, unattended)
//! ```
//!
//! `reset` mirrors play/pause/stop affordances: pressed while running it is a
//! soft stop (identical to `pause`), pressed again while paused it performs a
//! full reset back to repetition 1.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::scheduler::{CountdownHandle, CountdownScheduler, RunId, TimerMessage};
use super::stage::{Stage, FULL_CYCLE_REPS};
use crate::config::SessionConfig;
use crate::events::{Notification, NotificationSink};

/// Countdown cue window: one cue per tick while remaining is 3, 2, 1.
const CUE_WINDOW_SECS: u64 = 3;

/// The session's mutable record. Mutated exclusively by
/// [`SessionController`]; lives for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// 1-based position within the current 8-interval cycle.
    pub repetition: u8,
    /// Current or most recently started interval's type.
    pub stage: Stage,
    /// True while a countdown is actively ticking.
    pub running: bool,
    /// True while a countdown is suspended mid-interval. Never true together
    /// with `running`.
    pub paused: bool,
    /// Remaining seconds; only meaningful while running or paused.
    pub remaining_secs: u64,
    /// Full 8-interval cycles completed. Survives a full reset.
    pub completed_cycles: u32,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            repetition: 1,
            stage: Stage::Work,
            running: false,
            paused: false,
            remaining_secs: 0,
            completed_cycles: 0,
        }
    }
}

/// Sequences intervals and mediates pause/resume/reset against the scheduler.
pub struct SessionController<S, N> {
    scheduler: S,
    sink: N,
    config: SessionConfig,
    state: SessionState,
    /// Current run generation; messages tagged with any other id are stale.
    run: RunId,
    handle: Option<CountdownHandle>,
    timer_tx: UnboundedSender<TimerMessage>,
}

impl<S: CountdownScheduler, N: NotificationSink> SessionController<S, N> {
    /// Create a controller plus the receiving half of its timer channel.
    /// The caller pumps received messages back in via [`handle_message`].
    ///
    /// [`handle_message`]: SessionController::handle_message
    pub fn new(scheduler: S, sink: N, config: SessionConfig) -> (Self, UnboundedReceiver<TimerMessage>) {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let controller = Self {
            scheduler,
            sink,
            config,
            state: SessionState::default(),
            run: 0,
            handle: None,
            timer_tx,
        };
        (controller, timer_rx)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start the current interval, or resume a paused one from its retained
    /// remaining time. No-op while already running.
    pub fn start(&mut self) {
        if self.state.running {
            return;
        }
        if self.state.paused && self.state.remaining_secs > 0 {
            self.state.paused = false;
            self.state.running = true;
            self.run += 1;
            self.handle = Some(self.scheduler.run(
                self.run,
                self.state.remaining_secs,
                self.timer_tx.clone(),
            ));
            self.sink.notify(Notification::StageResumed {
                stage: self.state.stage,
                remaining_secs: self.state.remaining_secs,
                at: Utc::now(),
            });
            return;
        }
        self.begin_stage();
    }

    /// Suspend the active countdown, retaining remaining time. No-op while
    /// not running.
    pub fn pause(&mut self) {
        if !self.state.running {
            return;
        }
        self.cancel_run();
        self.state.running = false;
        self.state.paused = true;
        self.sink.notify(Notification::Paused {
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        });
    }

    /// First press while running: soft stop, identical to [`pause`].
    /// Press while paused: full reset to repetition 1. The all-time cycle
    /// tally is kept. No-op while idle.
    ///
    /// [`pause`]: SessionController::pause
    pub fn reset(&mut self) {
        if self.state.running {
            self.pause();
            return;
        }
        if self.state.paused {
            self.cancel_run();
            self.state = SessionState {
                completed_cycles: self.state.completed_cycles,
                ..SessionState::default()
            };
            self.sink.notify(Notification::Reset { at: Utc::now() });
        }
    }

    // ── Tick path ────────────────────────────────────────────────────

    /// Channel-facing entry point for scheduler messages. Messages from a
    /// cancelled or superseded run are dropped here, which is what makes
    /// cancellation synchronous from the caller's perspective.
    pub fn handle_message(&mut self, msg: TimerMessage) {
        if msg.run() != self.run || !self.state.running {
            return;
        }
        match msg {
            TimerMessage::Tick { remaining_secs, .. } => self.on_tick(remaining_secs),
            TimerMessage::Done { .. } => self.on_done(),
        }
    }

    fn on_tick(&mut self, remaining_secs: u64) {
        self.state.remaining_secs = remaining_secs;
        self.sink.notify(Notification::Tick {
            display: format_clock(remaining_secs),
            stage: self.state.stage,
            remaining_secs,
            at: Utc::now(),
        });
        if (1..=CUE_WINDOW_SECS).contains(&remaining_secs) {
            self.sink.notify(Notification::CountdownCue {
                remaining_secs,
                at: Utc::now(),
            });
        }
    }

    fn on_done(&mut self) {
        self.state.remaining_secs = 0;
        self.handle = None;
        // The zero value is rendered before the completion cue sounds.
        self.sink.notify(Notification::Tick {
            display: format_clock(0),
            stage: self.state.stage,
            remaining_secs: 0,
            at: Utc::now(),
        });
        self.sink.notify(Notification::CompletionCue {
            stage: self.state.stage,
            at: Utc::now(),
        });
        self.advance();
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Called only at remaining == 0. Steps the repetition counter, wrapping
    /// at the end of the long break, and starts the next interval
    /// unattended.
    fn advance(&mut self) {
        self.state.repetition += 1;
        if self.state.repetition > FULL_CYCLE_REPS {
            self.state.repetition = 1;
            self.state.completed_cycles += 1;
            self.sink.notify(Notification::CycleCompleted {
                completed_cycles: self.state.completed_cycles,
                at: Utc::now(),
            });
        }
        self.state.running = false;
        self.state.paused = false;
        self.begin_stage();
    }

    fn begin_stage(&mut self) {
        let stage = Stage::for_repetition(self.state.repetition);
        let duration_secs = self.config.stage_duration_secs(stage);
        self.state.stage = stage;
        self.state.paused = false;
        self.state.running = true;
        self.state.remaining_secs = duration_secs;
        self.run += 1;
        self.handle = Some(
            self.scheduler
                .run(self.run, duration_secs, self.timer_tx.clone()),
        );
        self.sink.notify(Notification::StageStarted {
            stage,
            duration_secs,
            repetition: self.state.repetition,
            at: Utc::now(),
        });
    }

    /// Cancel the in-flight run and invalidate anything it already queued.
    fn cancel_run(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.cancel();
        }
        self.run += 1;
    }
}

/// Format remaining seconds as `MM:SS`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

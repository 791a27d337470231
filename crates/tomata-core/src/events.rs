use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::Stage;

/// Every externally visible effect of the session core is a Notification.
/// Sinks render them (terminal, JSON lines); the core never awaits a result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// A fresh interval began.
    StageStarted {
        stage: Stage,
        duration_secs: u64,
        /// 1-based position within the 8-interval cycle.
        repetition: u8,
        at: DateTime<Utc>,
    },
    /// A paused interval resumed from its retained remaining time.
    StageResumed {
        stage: Stage,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    Paused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Full reset back to repetition 1.
    Reset {
        at: DateTime<Utc>,
    },
    /// One-second display update.
    Tick {
        /// Remaining time formatted `MM:SS`.
        display: String,
        stage: Stage,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Pre-terminal alert, fired once per tick while remaining is 3, 2, 1.
    CountdownCue {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// An interval reached zero.
    CompletionCue {
        stage: Stage,
        at: DateTime<Utc>,
    },
    /// The long break finished and the cycle tally advanced.
    CycleCompleted {
        completed_cycles: u32,
        at: DateTime<Utc>,
    },
}

/// Receiver for notifications. Fire-and-forget: the signature is infallible
/// and implementations must not block tick delivery.
pub trait NotificationSink {
    fn notify(&mut self, note: Notification);
}

/// Sink that records everything it receives. Used by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub notes: Vec<Notification>,
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, note: Notification) {
        self.notes.push(note);
    }
}

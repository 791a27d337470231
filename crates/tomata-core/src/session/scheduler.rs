//! Countdown scheduling.
//!
//! A scheduler run emits `Tick(duration)` immediately, then one tick per
//! second down to `Tick(1)`, then `Done` instead of a further tick. Ticks are
//! delivered as messages on an mpsc channel so that all session mutation
//! stays on the single consuming event loop.
//!
//! Every run carries a [`RunId`]; the consumer drops messages whose run id is
//! no longer current. Together with [`CountdownHandle::cancel`] this makes
//! cancellation race-free even for ticks already sitting in the channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

/// Generation tag for a single countdown run.
pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMessage {
    /// One-second tick; `remaining_secs` is in `[1, duration]`.
    Tick { run: RunId, remaining_secs: u64 },
    /// Terminal message of an un-cancelled run. Exactly one per run.
    Done { run: RunId },
}

impl TimerMessage {
    pub fn run(&self) -> RunId {
        match self {
            TimerMessage::Tick { run, .. } | TimerMessage::Done { run } => *run,
        }
    }
}

/// Cancellation handle for an in-flight countdown run.
///
/// `cancel` is idempotent; cancelling a run that already completed is a
/// benign no-op.
#[derive(Debug, Clone, Default)]
pub struct CountdownHandle {
    cancelled: Arc<AtomicBool>,
}

impl CountdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Emits ticks over time for one interval. Implementations decide how time
/// advances; the session controller only consumes the message stream.
pub trait CountdownScheduler {
    /// Begin a countdown of `duration_secs`, tagged with `run`.
    ///
    /// A `duration_secs` of zero yields an immediate `Done`.
    fn run(
        &mut self,
        run: RunId,
        duration_secs: u64,
        out: UnboundedSender<TimerMessage>,
    ) -> CountdownHandle;
}

/// Wall-clock scheduler backed by a spawned tokio task.
///
/// The task checks the cancellation flag before every send, so a cancelled
/// run stops producing within one tick; stale messages already queued are
/// filtered out by run id on the consumer side.
#[derive(Debug, Default)]
pub struct TokioCountdown;

impl CountdownScheduler for TokioCountdown {
    fn run(
        &mut self,
        run: RunId,
        duration_secs: u64,
        out: UnboundedSender<TimerMessage>,
    ) -> CountdownHandle {
        let handle = CountdownHandle::new();
        let cancelled = handle.cancelled.clone();
        tokio::spawn(async move {
            let mut remaining = duration_secs;
            loop {
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }
                if remaining == 0 {
                    let _ = out.send(TimerMessage::Done { run });
                    return;
                }
                if out
                    .send(TimerMessage::Tick {
                        run,
                        remaining_secs: remaining,
                    })
                    .is_err()
                {
                    // Consumer gone; nothing left to tick for.
                    return;
                }
                tokio::time::sleep(Duration::from_secs(1)).await;
                remaining -= 1;
            }
        });
        handle
    }
}

/// Deterministic scheduler: emits an entire run into the channel
/// synchronously. This is the injected clock used by the tests; wall-clock
/// time never passes.
#[derive(Debug, Default)]
pub struct EagerCountdown;

impl CountdownScheduler for EagerCountdown {
    fn run(
        &mut self,
        run: RunId,
        duration_secs: u64,
        out: UnboundedSender<TimerMessage>,
    ) -> CountdownHandle {
        for remaining in (1..=duration_secs).rev() {
            let _ = out.send(TimerMessage::Tick {
                run,
                remaining_secs: remaining,
            });
        }
        let _ = out.send(TimerMessage::Done { run });
        CountdownHandle::new()
    }
}

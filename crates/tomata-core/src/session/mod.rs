mod controller;
mod scheduler;
mod stage;

pub use controller::{format_clock, SessionController, SessionState};
pub use scheduler::{
    CountdownHandle, CountdownScheduler, EagerCountdown, RunId, TimerMessage, TokioCountdown,
};
pub use stage::{Stage, FULL_CYCLE_REPS};

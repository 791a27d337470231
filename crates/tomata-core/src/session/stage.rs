use serde::{Deserialize, Serialize};

/// Number of intervals in a full cycle: 4 work + 3 short breaks + 1 long break.
pub const FULL_CYCLE_REPS: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Work,
    ShortBreak,
    LongBreak,
}

impl Stage {
    /// Stage is a pure function of the 1-based repetition counter:
    /// {1,3,5,7} work, {2,4,6} short break, 8 long break.
    pub fn for_repetition(repetition: u8) -> Self {
        match repetition {
            FULL_CYCLE_REPS => Stage::LongBreak,
            r if r % 2 == 0 => Stage::ShortBreak,
            _ => Stage::Work,
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, Stage::Work)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Work => "Work",
            Stage::ShortBreak => "Short Break",
            Stage::LongBreak => "Long Break",
        }
    }
}

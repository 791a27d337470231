//! Notification sinks: everything the core calls back into to be seen or
//! heard. Rendering failures stay in here; the session never learns of them.

use std::io::Write;

use tomata_core::session::format_clock;
use tomata_core::{Notification, NotificationSink, Stage, FULL_CYCLE_REPS};

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";
const BELL: char = '\x07';

const CHECKMARK: &str = "\u{2714} ";

/// Renders the session in the terminal: an `MM:SS` clock line redrawn in
/// place, stage banners, bell cues, and the checkmark tallies (green per
/// completed work interval in the cycle, red per completed cycle).
pub struct TerminalSink {
    bell: bool,
}

impl TerminalSink {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }

    fn ring(&self) {
        if self.bell {
            print!("{BELL}");
            let _ = std::io::stdout().flush();
        }
    }

    fn banner(&self, stage: Stage, repetition: u8, clock: &str) {
        let color = if stage.is_break() { RED } else { GREEN };
        println!();
        println!(
            "[{repetition}/{FULL_CYCLE_REPS}] {color}{}{RESET} {clock}",
            stage.label()
        );
        // One green mark per work interval already completed this cycle.
        let marks = u64::from(repetition) / 2;
        if marks > 0 {
            println!("{GREEN}{}{RESET}", CHECKMARK.repeat(marks as usize));
        }
    }
}

impl NotificationSink for TerminalSink {
    fn notify(&mut self, note: Notification) {
        match note {
            Notification::StageStarted {
                stage,
                duration_secs,
                repetition,
                ..
            } => {
                self.banner(stage, repetition, &format_clock(duration_secs));
            }
            Notification::StageResumed {
                stage,
                remaining_secs,
                ..
            } => {
                println!();
                println!("resumed {} at {}", stage.label(), format_clock(remaining_secs));
            }
            Notification::Paused { remaining_secs, .. } => {
                println!();
                println!(
                    "paused at {} -- 's' resumes, 'r' resets",
                    format_clock(remaining_secs)
                );
            }
            Notification::Reset { .. } => {
                println!();
                println!("reset");
            }
            Notification::Tick { display, stage, .. } => {
                print!("\r{display} {}   ", stage.label());
                let _ = std::io::stdout().flush();
            }
            Notification::CountdownCue { .. } => self.ring(),
            Notification::CompletionCue { stage, .. } => {
                self.ring();
                println!();
                println!("{} finished", stage.label());
            }
            Notification::CycleCompleted { completed_cycles, .. } => {
                println!(
                    "cycle complete: {RED}{}{RESET}",
                    CHECKMARK.repeat(completed_cycles as usize)
                );
            }
        }
    }
}

/// Emits each notification as one JSON line on stdout.
#[derive(Debug, Default)]
pub struct JsonSink;

impl NotificationSink for JsonSink {
    fn notify(&mut self, note: Notification) {
        if let Ok(line) = serde_json::to_string(&note) {
            println!("{line}");
        }
    }
}

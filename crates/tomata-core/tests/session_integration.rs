//! End-to-end session sequencing tests.
//!
//! Runs whole intervals and full cycles through the controller using the
//! deterministic EagerCountdown scheduler, so no wall-clock time passes.

use tokio::sync::mpsc::UnboundedReceiver;

use tomata_core::{
    EagerCountdown, Notification, RecordingSink, SessionConfig, SessionController, Stage,
    TimerMessage,
};

type Controller = SessionController<EagerCountdown, RecordingSink>;

fn controller_with(config: SessionConfig) -> (Controller, UnboundedReceiver<TimerMessage>) {
    SessionController::new(EagerCountdown, RecordingSink::default(), config)
}

fn short_config() -> SessionConfig {
    // 1-minute intervals keep the eager runs small while exercising the same
    // sequencing logic as the real durations.
    let mut config = SessionConfig::default();
    config.durations.work_min = 1;
    config.durations.short_break_min = 1;
    config.durations.long_break_min = 1;
    config
}

/// Pump queued timer messages until `stop` says to halt or the queue drains.
fn drain_until(
    c: &mut Controller,
    rx: &mut UnboundedReceiver<TimerMessage>,
    mut stop: impl FnMut(&Controller) -> bool,
) {
    while !stop(c) {
        match rx.try_recv() {
            Ok(msg) => c.handle_message(msg),
            Err(_) => break,
        }
    }
}

fn notes(c: &mut Controller) -> &[Notification] {
    &c.sink_mut().notes
}

#[test]
fn first_interval_completion_starts_short_break() {
    let (mut c, mut rx) = controller_with(SessionConfig::default());
    c.start();
    drain_until(&mut c, &mut rx, |c| c.state().repetition == 2);

    let state = c.state();
    assert_eq!(state.repetition, 2);
    assert_eq!(state.stage, Stage::ShortBreak);
    assert!(state.running);

    // CompletionCue for the 1500 s work interval is immediately followed by
    // StageStarted(ShortBreak, 300).
    let all = notes(&mut c);
    let cue_idx = all
        .iter()
        .position(|n| matches!(n, Notification::CompletionCue { stage: Stage::Work, .. }))
        .expect("work interval completion cue");
    match &all[cue_idx + 1] {
        Notification::StageStarted {
            stage,
            duration_secs,
            repetition,
            ..
        } => {
            assert_eq!(*stage, Stage::ShortBreak);
            assert_eq!(*duration_secs, 300);
            assert_eq!(*repetition, 2);
        }
        other => panic!("expected StageStarted after completion cue, got {other:?}"),
    }
}

#[test]
fn full_cycle_emits_one_cycle_completed() {
    let (mut c, mut rx) = controller_with(short_config());
    c.start();
    drain_until(&mut c, &mut rx, |c| c.state().completed_cycles == 1);

    let state = c.state();
    assert_eq!(state.completed_cycles, 1);
    // Wrapped back to the start of the next cycle, already running.
    assert_eq!(state.repetition, 1);
    assert_eq!(state.stage, Stage::Work);
    assert!(state.running);

    let all = notes(&mut c);
    let cycle_events: Vec<_> = all
        .iter()
        .filter(|n| matches!(n, Notification::CycleCompleted { .. }))
        .collect();
    assert_eq!(cycle_events.len(), 1);
    assert!(matches!(
        cycle_events[0],
        Notification::CycleCompleted { completed_cycles: 1, .. }
    ));

    // The cycle tally flips right after the long break's completion cue, not
    // the last work interval's.
    let long_break_cue = all
        .iter()
        .position(|n| matches!(n, Notification::CompletionCue { stage: Stage::LongBreak, .. }))
        .expect("long break completion cue");
    assert!(matches!(
        all[long_break_cue + 1],
        Notification::CycleCompleted { completed_cycles: 1, .. }
    ));
}

#[test]
fn two_full_cycles_count_two() {
    let (mut c, mut rx) = controller_with(short_config());
    c.start();
    drain_until(&mut c, &mut rx, |c| c.state().completed_cycles == 2);

    assert_eq!(c.state().completed_cycles, 2);
    let cycle_count = notes(&mut c)
        .iter()
        .filter(|n| matches!(n, Notification::CycleCompleted { .. }))
        .count();
    assert_eq!(cycle_count, 2);
}

#[test]
fn stage_sequence_over_one_cycle() {
    let (mut c, mut rx) = controller_with(short_config());
    c.start();
    drain_until(&mut c, &mut rx, |c| c.state().completed_cycles == 1);

    let started: Vec<(Stage, u8)> = notes(&mut c)
        .iter()
        .filter_map(|n| match n {
            Notification::StageStarted { stage, repetition, .. } => Some((*stage, *repetition)),
            _ => None,
        })
        .take(8)
        .collect();
    assert_eq!(
        started,
        vec![
            (Stage::Work, 1),
            (Stage::ShortBreak, 2),
            (Stage::Work, 3),
            (Stage::ShortBreak, 4),
            (Stage::Work, 5),
            (Stage::ShortBreak, 6),
            (Stage::Work, 7),
            (Stage::LongBreak, 8),
        ]
    );
}

#[test]
fn countdown_cues_fire_only_in_final_three_seconds() {
    let (mut c, mut rx) = controller_with(short_config());
    c.start();
    // Run exactly one interval.
    drain_until(&mut c, &mut rx, |c| c.state().repetition == 2);

    let cues: Vec<u64> = notes(&mut c)
        .iter()
        .filter_map(|n| match n {
            Notification::CountdownCue { remaining_secs, .. } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(cues, vec![3, 2, 1]);
}

#[test]
fn one_completion_cue_per_interval() {
    let (mut c, mut rx) = controller_with(short_config());
    c.start();
    drain_until(&mut c, &mut rx, |c| c.state().completed_cycles == 1);

    let all = notes(&mut c);
    let completions = all
        .iter()
        .filter(|n| matches!(n, Notification::CompletionCue { .. }))
        .count();
    assert_eq!(completions, 8);

    // Each completion cue is immediately followed by CycleCompleted or the
    // next StageStarted.
    for (i, n) in all.iter().enumerate() {
        if matches!(n, Notification::CompletionCue { .. }) {
            assert!(matches!(
                all[i + 1],
                Notification::StageStarted { .. } | Notification::CycleCompleted { .. }
            ));
        }
    }
}

#[test]
fn final_tick_renders_zero() {
    let (mut c, mut rx) = controller_with(short_config());
    c.start();
    drain_until(&mut c, &mut rx, |c| c.state().repetition == 2);

    let all = notes(&mut c);
    let cue_idx = all
        .iter()
        .position(|n| matches!(n, Notification::CompletionCue { .. }))
        .unwrap();
    match &all[cue_idx - 1] {
        Notification::Tick { display, remaining_secs, .. } => {
            assert_eq!(display, "00:00");
            assert_eq!(*remaining_secs, 0);
        }
        other => panic!("expected zero tick before completion cue, got {other:?}"),
    }
}

#[test]
fn pause_resume_mid_interval_loses_no_time() {
    let (mut c, mut rx) = controller_with(SessionConfig::default());
    c.start();
    // Consume the first ten ticks: 1500 down to 1491.
    for _ in 0..10 {
        let msg = rx.try_recv().unwrap();
        c.handle_message(msg);
    }
    assert_eq!(c.state().remaining_secs, 1491);

    c.pause();
    // Stale queued ticks must not move the clock while paused.
    drain_until(&mut c, &mut rx, |_| false);
    let state = c.state();
    assert_eq!(state.remaining_secs, 1491);
    assert_eq!(state.repetition, 1);
    assert_eq!(state.stage, Stage::Work);

    c.start();
    let msg = rx.try_recv().unwrap();
    c.handle_message(msg);
    assert_eq!(c.state().remaining_secs, 1491);
}

#[test]
fn double_reset_returns_to_initial_state() {
    let (mut c, mut rx) = controller_with(SessionConfig::default());
    c.start();
    for _ in 0..5 {
        let msg = rx.try_recv().unwrap();
        c.handle_message(msg);
    }

    c.reset();
    assert!(c.state().paused);
    assert_eq!(c.state().remaining_secs, 1496);

    c.reset();
    let state = c.state();
    assert_eq!(state.repetition, 1);
    assert_eq!(state.remaining_secs, 0);
    assert!(!state.running && !state.paused);

    // Starting again begins a fresh work interval from the top.
    c.start();
    assert_eq!(c.state().remaining_secs, 1500);
    assert_eq!(c.state().stage, Stage::Work);
}

//! The interactive `run` command.
//!
//! One event loop consumes scheduler ticks and stdin commands; every session
//! mutation happens here, which is the serialization point the core requires.

use std::io::BufRead;

use clap::Args;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use tomata_core::{NotificationSink, SessionConfig, SessionController, TokioCountdown};

use crate::sink::{JsonSink, TerminalSink};

#[derive(Args)]
pub struct RunArgs {
    /// Emit notifications as JSON lines instead of the terminal display
    #[arg(long)]
    pub json: bool,
    /// Work interval length in minutes (overrides config)
    #[arg(long)]
    pub work: Option<u64>,
    /// Short break length in minutes (overrides config)
    #[arg(long)]
    pub short_break: Option<u64>,
    /// Long break length in minutes (overrides config)
    #[arg(long)]
    pub long_break: Option<u64>,
}

/// Operator commands accepted on stdin.
enum Command {
    Start,
    Pause,
    Reset,
    Quit,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SessionConfig::load()?;
    if let Some(minutes) = args.work {
        config.durations.work_min = minutes;
    }
    if let Some(minutes) = args.short_break {
        config.durations.short_break_min = minutes;
    }
    if let Some(minutes) = args.long_break {
        config.durations.long_break_min = minutes;
    }
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    if args.json {
        runtime.block_on(event_loop(config, JsonSink))
    } else {
        println!("tomata -- s start/resume, p pause, r reset, q quit");
        runtime.block_on(event_loop(config, TerminalSink::new(config.cues.bell)))
    }
}

async fn event_loop<N: NotificationSink>(
    config: SessionConfig,
    sink: N,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut controller, mut timer_rx) = SessionController::new(TokioCountdown, sink, config);
    let mut commands = spawn_stdin_commands();

    controller.start();
    loop {
        tokio::select! {
            Some(msg) = timer_rx.recv() => controller.handle_message(msg),
            cmd = commands.recv() => match cmd {
                Some(Command::Start) => controller.start(),
                Some(Command::Pause) => controller.pause(),
                Some(Command::Reset) => controller.reset(),
                // Stdin closing ends the session too.
                Some(Command::Quit) | None => break,
            },
        }
    }
    Ok(())
}

/// Read stdin on a blocking thread and forward parsed commands.
fn spawn_stdin_commands() -> UnboundedReceiver<Command> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let cmd = match line.trim() {
                "" => continue,
                "s" | "start" => Command::Start,
                "p" | "pause" => Command::Pause,
                "r" | "reset" => Command::Reset,
                "q" | "quit" | "exit" => Command::Quit,
                other => {
                    eprintln!("unknown command: {other} (s/p/r/q)");
                    continue;
                }
            };
            if tx.send(cmd).is_err() {
                break;
            }
        }
    });
    rx
}

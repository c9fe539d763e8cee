//! Operator commands typed on standard input.
//!
//! | Command | Effect |
//! |---------|--------|
//! | `pause` | Hold the tick loop before its next tick |
//! | `resume` | Continue a paused loop |
//! | `speed <ms>` | Change the tick interval |
//! | `status` | Log the loop state |
//! | `stop` | Stop after the current tick |
//!
//! Stdin is read on a plain thread and forwarded over a channel, so an
//! unfinished read never holds up runtime shutdown.

use std::io::BufRead;
use std::str::FromStr;
use std::sync::Arc;

use dispatch_core::control::{MIN_TICK_INTERVAL_MS, RunControl};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Lines buffered between the reader thread and the command task.
const LINE_BUFFER: usize = 16;

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pause the tick loop.
    Pause,
    /// Resume the tick loop.
    Resume,
    /// Set the tick interval in milliseconds.
    Speed(u64),
    /// Log the loop state.
    Status,
    /// Request a clean stop.
    Stop,
}

/// Errors from parsing or applying a command.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line is not a known command.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// `speed` was given no value or a non-numeric one.
    #[error("speed needs an interval in milliseconds, got {0:?}")]
    InvalidSpeed(String),

    /// The requested interval is below the minimum.
    #[error("tick interval {requested}ms is below the {MIN_TICK_INTERVAL_MS}ms minimum")]
    TooFast {
        /// The rejected interval.
        requested: u64,
    },
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        match verb.as_str() {
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "status" => Ok(Self::Status),
            "stop" | "quit" => Ok(Self::Stop),
            "speed" => {
                let value = words.next().unwrap_or_default();
                value
                    .parse()
                    .map(Self::Speed)
                    .map_err(|_parse| CommandError::InvalidSpeed(value.to_owned()))
            }
            _ => Err(CommandError::Unknown(line.trim().to_owned())),
        }
    }
}

impl Command {
    /// Apply the command to the run control.
    pub fn apply(self, control: &RunControl) -> Result<(), CommandError> {
        match self {
            Self::Pause => {
                control.pause();
                info!("Operator paused the simulation");
            }
            Self::Resume => {
                control.resume();
                info!("Operator resumed the simulation");
            }
            Self::Speed(ms) => {
                let previous = control
                    .set_tick_interval_ms(ms)
                    .ok_or(CommandError::TooFast { requested: ms })?;
                info!(previous_ms = previous, tick_interval_ms = ms, "Operator changed tick interval");
            }
            Self::Status => info!(
                paused = control.is_paused(),
                stop_requested = control.is_stop_requested(),
                tick_interval_ms = control.tick_interval_ms(),
                max_ticks = control.max_ticks(),
                elapsed_seconds = control.elapsed_seconds(),
                "Simulation status"
            ),
            Self::Stop => {
                control.request_stop();
                info!("Operator requested stop");
            }
        }
        Ok(())
    }
}

/// Apply each received line until the channel closes or a stop is
/// requested. Bad lines are logged and skipped.
pub async fn run_commands(mut lines: mpsc::Receiver<String>, control: Arc<RunControl>) {
    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = line.parse::<Command>().and_then(|cmd| cmd.apply(&control)) {
            warn!(error = %err, "Operator command rejected");
        }
        if control.is_stop_requested() {
            break;
        }
    }
    debug!("Operator console closed");
}

/// Start reading operator commands from stdin.
pub fn spawn_stdin_console(control: Arc<RunControl>) {
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    tokio::spawn(run_commands(rx, control));
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive playback loop.
//!
//! A current-thread tokio runtime drives the session on a fixed interval
//! and reads single-line commands from stdin on the same task.

use crate::error::AppResult;
use crate::presenter::ConsolePresenter;
use std::io::Write;
use std::time::Duration;
use stretchflow_routine::{Clock, PlayerListener, PlayerPhase, RoutineSession, RoutineStorage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Commands typed during playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Pause if running, resume if paused
    TogglePause,
    /// Skip to the next pose
    Next,
    /// Change speed
    Speed(String),
    /// Start over from the first pose
    Restart,
    /// Leave playback
    Quit,
    /// List the commands
    Help,
}

/// Short command reference
pub const HELP: &str = "Commands: p pause/resume, n next, s <slow|normal|fast> speed, r restart, q quit";

impl PlayerCommand {
    /// Parse one input line; `None` for blank or unknown input
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?.to_ascii_lowercase();
        let argument = words.next();

        match (command.as_str(), argument) {
            ("p" | "pause" | "resume", None) => Some(Self::TogglePause),
            ("n" | "next" | "skip", None) => Some(Self::Next),
            ("s" | "speed", Some(speed)) => Some(Self::Speed(speed.to_string())),
            ("r" | "restart", None) => Some(Self::Restart),
            ("q" | "quit" | "exit", None) => Some(Self::Quit),
            ("h" | "help" | "?", None) => Some(Self::Help),
            _ => None,
        }
    }
}

/// Whether the loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep playing
    Continue,
    /// Leave playback
    Quit,
}

fn deliver_pending<S: RoutineStorage, C: Clock, L: PlayerListener>(
    session: &mut RoutineSession<S, C>,
    listener: &mut L,
) {
    for event in session.take_events() {
        event.deliver(listener);
    }
}

/// Apply one typed line to the session
pub fn handle_line<S, C, W>(
    session: &mut RoutineSession<S, C>,
    presenter: &mut ConsolePresenter<W>,
    line: &str,
) -> Flow
where
    S: RoutineStorage,
    C: Clock,
    W: Write,
{
    if line.trim().is_empty() {
        return Flow::Continue;
    }
    let Some(command) = PlayerCommand::parse(line) else {
        presenter.show_error(&format!("Unknown command '{}'. {HELP}", line.trim()));
        return Flow::Continue;
    };
    debug!("Player command: {command:?}");

    let result = match &command {
        PlayerCommand::TogglePause if !session.phase().is_in_progress() => {
            presenter.show_info("Nothing to pause.");
            Ok(())
        }
        PlayerCommand::TogglePause => session.toggle_pause().map(|()| {
            let playing = session.store().playback().is_playing;
            presenter.show_info(if playing { "Resumed." } else { "Paused." });
        }),
        PlayerCommand::Next => session.advance(),
        PlayerCommand::Speed(value) => session.set_speed(value).map(|()| {
            presenter.show_info(&format!("Speed: {}", session.store().playback().speed));
        }),
        PlayerCommand::Restart => session.restart(),
        PlayerCommand::Quit => return Flow::Quit,
        PlayerCommand::Help => {
            presenter.show_info(HELP);
            Ok(())
        }
    };

    if let Err(e) = result {
        presenter.show_error(&e.to_string());
        session.clear_error();
    }
    deliver_pending(session, presenter);
    Flow::Continue
}

/// Play the routine until it completes with no input left, or the user quits
pub fn run_playback<S, C, W>(
    mut session: RoutineSession<S, C>,
    tick: Duration,
    mut presenter: ConsolePresenter<W>,
) -> AppResult<()>
where
    S: RoutineStorage,
    C: Clock,
    W: Write,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(drive(&mut session, tick, &mut presenter));
    // Stdin reads block a worker thread that would otherwise hold up shutdown
    runtime.shutdown_background();
    result
}

async fn drive<S, C, W>(
    session: &mut RoutineSession<S, C>,
    tick: Duration,
    presenter: &mut ConsolePresenter<W>,
) -> AppResult<()>
where
    S: RoutineStorage,
    C: Clock,
    W: Write,
{
    let mut interval = tokio::time::interval(tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    session.start_routine()?;
    presenter.show_info(HELP);
    deliver_pending(session, presenter);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => {
                        if handle_line(session, presenter, &line) == Flow::Quit {
                            break;
                        }
                    }
                    None => {
                        debug!("Input closed; playing to the end");
                        stdin_open = false;
                    }
                }
            }
            _ = interval.tick() => {
                session.pump(presenter);
                if !stdin_open && session.phase() == &PlayerPhase::Complete {
                    break;
                }
            }
        }
    }

    session.close()?;
    deliver_pending(session, presenter);
    info!("Playback finished");
    Ok(())
}

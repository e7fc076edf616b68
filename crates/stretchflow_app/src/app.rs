// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command dispatch.

use crate::cli::{Command, ThemeArg};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::presenter::ConsolePresenter;
use crate::runner;
use crate::theme;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use stretchflow_routine::{
    format_clock, JsonFileStorage, RoutineError, RoutineSession, RoutineSpeed, RoutineStorage,
    RoutineStore, SystemClock,
};

/// The command-line application
pub struct StretchApp {
    config: AppConfig,
    config_path: PathBuf,
    data_file: PathBuf,
}

impl StretchApp {
    /// Create the app; `data_file` overrides the configured location
    pub fn new(config: AppConfig, config_path: PathBuf, data_file: Option<PathBuf>) -> Self {
        let data_file = data_file.unwrap_or_else(|| config.data_file_path());
        Self {
            config,
            config_path,
            data_file,
        }
    }

    /// Run one command, playing the routine when none is given
    pub fn run(&self, command: Option<Command>) -> AppResult<()> {
        let mut out = std::io::stdout().lock();

        match command.unwrap_or(Command::Play { speed: None }) {
            Command::List { speed } => {
                let speed = resolve_speed(speed.as_deref(), self.config.default_speed)?;
                list(&self.open_store(), speed, &mut out)
            }
            Command::Reorder { from, to } => reorder(&mut self.open_store(), from, to, &mut out),
            Command::Theme { mode } => set_theme(&mut self.open_store(), mode, &mut out),
            Command::Config => write_config(&self.config, &self.config_path, &mut out),
            Command::Play { speed } => {
                drop(out);
                self.play(self.open_store(), speed.as_deref())
            }
        }
    }

    fn open_store(&self) -> RoutineStore<JsonFileStorage> {
        tracing::debug!(path = %self.data_file.display(), "Opening saved routine");
        RoutineStore::open(
            JsonFileStorage::new(&self.data_file),
            theme::system_prefers_dark(),
        )
    }

    fn play<S: RoutineStorage>(&self, store: RoutineStore<S>, speed: Option<&str>) -> AppResult<()> {
        let speed = resolve_speed(speed, self.config.default_speed)?;
        let mut presenter =
            ConsolePresenter::new(std::io::stdout(), store.sequence(), store.dark_mode());
        if !std::io::stdout().is_terminal() || std::env::var_os("NO_COLOR").is_some() {
            presenter = presenter.without_color();
        }
        let mut session = RoutineSession::new(store, self.config.timings(), SystemClock);
        session.set_speed(speed.name())?;

        tracing::info!(%speed, poses = session.store().sequence().len(), "Starting playback");
        runner::run_playback(session, self.config.tick_interval(), presenter)
    }
}

/// Speed from the flag, or the configured default
fn resolve_speed(flag: Option<&str>, default: RoutineSpeed) -> AppResult<RoutineSpeed> {
    match flag {
        Some(value) => Ok(value.parse()?),
        None => Ok(default),
    }
}

/// Save the active config so it can be edited
pub fn write_config<W: Write>(config: &AppConfig, path: &Path, out: &mut W) -> AppResult<()> {
    config.save(path)?;
    tracing::info!(path = %path.display(), "Wrote config");
    writeln!(out, "{}", path.display())?;
    Ok(())
}

/// Print poses in play order with the total at `speed`
pub fn list<S: RoutineStorage, W: Write>(
    store: &RoutineStore<S>,
    speed: RoutineSpeed,
    out: &mut W,
) -> AppResult<()> {
    let sequence = store.sequence();
    if sequence.is_empty() {
        writeln!(out, "No poses in the routine.")?;
        return Ok(());
    }

    for (i, pose) in sequence.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. {:<22} {:>5}  {}",
            i + 1,
            pose.name,
            format_clock(f64::from(pose.duration_secs)),
            pose.description
        )?;
    }

    let total = speed.wall_clock_secs(sequence.total_duration_secs() as f64);
    writeln!(
        out,
        "{} poses, {} at {speed} speed",
        sequence.len(),
        format_clock(total.round())
    )?;
    Ok(())
}

/// Convert a 1-based position, rejecting anything outside the sequence
fn to_index(position: usize, len: usize) -> AppResult<usize> {
    if position == 0 || position > len {
        return Err(AppError::InvalidPosition { position, len });
    }
    Ok(position - 1)
}

fn check_saved<S: RoutineStorage>(store: &RoutineStore<S>) -> AppResult<()> {
    match store.last_error() {
        Some(err @ RoutineError::Persistence(_)) => Err(err.clone().into()),
        _ => Ok(()),
    }
}

/// Move a pose between 1-based positions and save
pub fn reorder<S: RoutineStorage, W: Write>(
    store: &mut RoutineStore<S>,
    from: usize,
    to: usize,
    out: &mut W,
) -> AppResult<()> {
    let len = store.sequence().len();
    let source = to_index(from, len)?;
    let target = to_index(to, len)?;

    store.reorder(source, target)?;
    check_saved(store)?;

    if let Some(pose) = store.sequence().get(target) {
        writeln!(out, "Moved {} to position {to}.", pose.name)?;
    }
    Ok(())
}

/// Apply a theme choice and save it
pub fn set_theme<S: RoutineStorage, W: Write>(
    store: &mut RoutineStore<S>,
    mode: ThemeArg,
    out: &mut W,
) -> AppResult<()> {
    match mode {
        ThemeArg::Dark => store.set_dark_mode(true)?,
        ThemeArg::Light => store.set_dark_mode(false)?,
        ThemeArg::Toggle => store.toggle_dark_mode()?,
    }
    check_saved(store)?;
    writeln!(out, "Theme: {}", theme::mode_name(store.dark_mode()))?;
    Ok(())
}

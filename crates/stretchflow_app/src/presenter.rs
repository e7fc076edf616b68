// SPDX-License-Identifier: MIT OR Apache-2.0
//! Terminal presenter for routine playback.

use crate::theme::{Palette, RESET};
use std::io::Write;
use stretchflow_routine::{format_clock, PlayerListener, PlayerPhase, Pose, PoseSequence, TimeBand};

/// Width of the countdown bar in cells
const BAR_WIDTH: usize = 24;

/// Renders player events as terminal lines
pub struct ConsolePresenter<W: Write> {
    out: W,
    palette: Palette,
    poses: Vec<Pose>,
    /// Last whole second drawn, to avoid redrawing every tick
    last_drawn: Option<u64>,
    color: bool,
}

impl<W: Write> ConsolePresenter<W> {
    /// Presenter for a fixed pose order
    pub fn new(out: W, sequence: &PoseSequence, dark: bool) -> Self {
        Self {
            out,
            palette: Palette::for_mode(dark),
            poses: sequence.iter().cloned().collect(),
            last_drawn: None,
            color: true,
        }
    }

    /// Disable ANSI colour codes
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    /// Consume the presenter and return its writer
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, color: &'static str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn line(&mut self, text: &str) {
        // Finish any in-place countdown line first
        let prefix = if self.last_drawn.take().is_some() { "\n" } else { "" };
        if let Err(e) = writeln!(self.out, "{prefix}{text}").and_then(|()| self.out.flush()) {
            tracing::warn!("Failed to write to terminal: {e}");
        }
    }

    /// Show a failure from a user command
    pub fn show_error(&mut self, message: &str) {
        let text = self.paint(self.palette.error, &format!("! {message}"));
        self.line(&text);
    }

    /// Show a plain informational line
    pub fn show_info(&mut self, message: &str) {
        let text = self.paint(self.palette.muted, message);
        self.line(&text);
    }

    fn pose_heading(&self, index: usize) -> Option<String> {
        let pose = self.poses.get(index)?;
        let heading = format!(
            "Pose {} of {}: {} ({})",
            index + 1,
            self.poses.len(),
            pose.name,
            format_clock(f64::from(pose.duration_secs))
        );
        Some(format!(
            "{}\n  {}",
            self.paint(self.palette.accent, &heading),
            self.paint(self.palette.muted, &pose.description)
        ))
    }
}

/// Countdown bar, filled for the part already done
pub fn progress_bar(remaining_fraction: f64, width: usize) -> String {
    let remaining = remaining_fraction.clamp(0.0, 1.0);
    let done = ((1.0 - remaining) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(done), "-".repeat(width - done))
}

impl<W: Write> PlayerListener for ConsolePresenter<W> {
    fn on_tick(&mut self, time_left: f64, remaining_fraction: f64) {
        let second = time_left.ceil() as u64;
        if self.last_drawn == Some(second) {
            return;
        }
        self.last_drawn = Some(second);

        let band = TimeBand::from_fraction(remaining_fraction);
        let text = format!(
            "{} {} {:>3.0}% remaining",
            format_clock(time_left.ceil()),
            progress_bar(remaining_fraction, BAR_WIDTH),
            remaining_fraction * 100.0
        );
        let text = self.paint(self.palette.band(band), &text);
        if let Err(e) = write!(self.out, "\r  {text}").and_then(|()| self.out.flush()) {
            tracing::warn!("Failed to write to terminal: {e}");
        }
    }

    fn on_pose_complete(&mut self, index: usize) {
        if let Some(pose) = self.poses.get(index) {
            let text = self.paint(self.palette.success, &format!("Done: {}", pose.name));
            self.line(&text);
        }
    }

    fn on_state_change(&mut self, phase: &PlayerPhase, pose_index: Option<usize>) {
        match phase {
            PlayerPhase::Idle => self.show_info("Routine closed."),
            PlayerPhase::GetReady => {
                let text = self.paint(self.palette.accent, "Get ready...");
                self.line(&text);
            }
            PlayerPhase::Playing => {
                if let Some(heading) = pose_index.and_then(|i| self.pose_heading(i)) {
                    self.line(&heading);
                }
            }
            PlayerPhase::Transition { next_pose_name } => {
                let text = self.paint(self.palette.muted, &format!("Next up: {next_pose_name}"));
                self.line(&text);
            }
            PlayerPhase::Complete => {
                let text = self.paint(
                    self.palette.success,
                    "Routine complete! Press r to restart or q to quit.",
                );
                self.line(&text);
            }
        }
    }
}

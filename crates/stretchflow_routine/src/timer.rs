// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-pose countdown timer.
//!
//! Elapsed time is always recomputed from absolute instants:
//! `elapsed = total_elapsed + (now - run_started_at) / multiplier`.
//! Irregular or missing ticks therefore never lose or double-count time.
//! Pausing and speed changes fold the current run segment into
//! `total_elapsed` before the segment ends.

use crate::speed::RoutineSpeed;
use std::time::{Duration, Instant};

/// Remaining time below this counts as finished
const COMPLETION_EPSILON: f64 = 1e-6;

/// Result of one timer recomputation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerTick {
    /// Not running, nothing to report
    Idle,
    /// Still counting down
    Running {
        /// Seconds left on the pose
        time_left: f64,
        /// `time_left / duration`, 1.0 at start and 0.0 at the end
        remaining_fraction: f64,
    },
    /// Reached zero on this tick; reported once per pose
    Completed {
        /// When the countdown actually ran out, at or before the tick
        at: Instant,
    },
}

/// Urgency band of a countdown, by remaining fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBand {
    /// More than two thirds left
    Plenty,
    /// Between one and two thirds left
    Half,
    /// Under a third left
    Low,
}

impl TimeBand {
    /// Band for a remaining fraction
    pub fn from_fraction(remaining_fraction: f64) -> Self {
        if remaining_fraction > 0.66 {
            TimeBand::Plenty
        } else if remaining_fraction > 0.33 {
            TimeBand::Half
        } else {
            TimeBand::Low
        }
    }
}

/// Countdown for the active pose
#[derive(Debug, Clone)]
pub struct PoseTimer {
    duration: f64,
    total_elapsed: f64,
    run_started_at: Option<Instant>,
    speed: RoutineSpeed,
    completed: bool,
}

impl PoseTimer {
    /// Create a stopped timer for a pose duration
    pub fn new(duration_secs: u32, speed: RoutineSpeed) -> Self {
        Self {
            duration: f64::from(duration_secs),
            total_elapsed: 0.0,
            run_started_at: None,
            speed,
            completed: false,
        }
    }

    /// Pose duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Current speed
    pub fn speed(&self) -> RoutineSpeed {
        self.speed
    }

    /// Whether a run segment is open
    pub fn is_running(&self) -> bool {
        self.run_started_at.is_some()
    }

    /// Whether completion has already been reported
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Accumulated seconds from closed run segments only
    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    /// Begin or continue counting down. No-op if already running or done.
    pub fn resume(&mut self, now: Instant) {
        if self.completed || self.run_started_at.is_some() {
            return;
        }
        self.run_started_at = Some(now);
    }

    /// Alias of [`PoseTimer::resume`] for the first run
    pub fn start(&mut self, now: Instant) {
        self.resume(now);
    }

    /// Stop counting down, keeping elapsed time. No-op if not running.
    pub fn pause(&mut self, now: Instant) {
        if self.run_started_at.is_none() {
            return;
        }
        self.total_elapsed = self.elapsed_at(now);
        self.run_started_at = None;
    }

    /// Change speed without a jump in `time_left`.
    ///
    /// The open segment is closed at the old rate and reopened at `now`.
    pub fn set_speed(&mut self, speed: RoutineSpeed, now: Instant) {
        if speed == self.speed {
            return;
        }
        if self.run_started_at.is_some() {
            self.total_elapsed = self.elapsed_at(now);
            self.run_started_at = Some(now);
        }
        self.speed = speed;
    }

    /// Countdown seconds consumed as of `now`
    pub fn elapsed_at(&self, now: Instant) -> f64 {
        let segment = match self.run_started_at {
            Some(start) => {
                now.saturating_duration_since(start).as_secs_f64() / self.speed.multiplier()
            }
            None => 0.0,
        };
        (self.total_elapsed + segment).min(self.duration)
    }

    /// Seconds left as of `now`, never negative
    pub fn time_left(&self, now: Instant) -> f64 {
        (self.duration - self.elapsed_at(now)).max(0.0)
    }

    /// When the open run segment reaches zero, if one is open
    pub fn finishes_at(&self) -> Option<Instant> {
        let start = self.run_started_at?;
        let remaining = (self.duration - self.total_elapsed).max(0.0);
        Some(start + Duration::from_secs_f64(remaining * self.speed.multiplier()))
    }

    /// `time_left / duration` as of `now`
    pub fn remaining_fraction(&self, now: Instant) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        self.time_left(now) / self.duration
    }

    /// Recompute from absolute time.
    ///
    /// Returns [`TimerTick::Completed`] exactly once, on the first tick where
    /// nothing is left; the timer then stays stopped until replaced.
    pub fn tick(&mut self, now: Instant) -> TimerTick {
        if self.completed || self.run_started_at.is_none() {
            return TimerTick::Idle;
        }

        let time_left = self.time_left(now);
        if time_left <= COMPLETION_EPSILON {
            let at = self.finishes_at().map_or(now, |end| end.min(now));
            self.total_elapsed = self.duration;
            self.run_started_at = None;
            self.completed = true;
            return TimerTick::Completed { at };
        }

        TimerTick::Running {
            time_left,
            remaining_fraction: self.remaining_fraction(now),
        }
    }
}

/// Render seconds as `M:SS`, rounding partial seconds down
pub fn format_clock(secs: f64) -> String {
    let whole = secs.max(0.0).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    #[test]
    fn test_counts_down_at_normal_speed() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(30, RoutineSpeed::Normal);
        timer.start(t0);
        assert!((timer.time_left(t0 + secs(10.0)) - 20.0).abs() < 1e-9);
        assert!(matches!(timer.tick(t0 + secs(10.0)), TimerTick::Running { .. }));
    }

    #[test]
    fn test_not_started_does_not_count() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(30, RoutineSpeed::Normal);
        assert_eq!(timer.tick(t0 + secs(100.0)), TimerTick::Idle);
        assert!((timer.time_left(t0 + secs(100.0)) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_resume_keeps_elapsed() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(30, RoutineSpeed::Normal);
        timer.start(t0);
        timer.pause(t0 + secs(5.0));
        // Time passing while paused is not counted
        assert!((timer.time_left(t0 + secs(60.0)) - 25.0).abs() < 1e-9);
        timer.resume(t0 + secs(60.0));
        assert!((timer.time_left(t0 + secs(65.0)) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_double_pause_and_double_resume_are_idempotent() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(30, RoutineSpeed::Normal);
        timer.start(t0);
        timer.pause(t0 + secs(4.0));
        let after_first = timer.total_elapsed();
        timer.pause(t0 + secs(9.0));
        assert_eq!(timer.total_elapsed(), after_first);

        timer.resume(t0 + secs(10.0));
        timer.resume(t0 + secs(12.0));
        assert_eq!(timer.total_elapsed(), after_first);
        // Second resume must not move the segment start
        assert!((timer.time_left(t0 + secs(14.0)) - 22.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_change_has_no_jump() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(60, RoutineSpeed::Normal);
        timer.start(t0);
        let at = t0 + secs(12.0);
        let before = timer.time_left(at);
        timer.set_speed(RoutineSpeed::Slow, at);
        assert!((timer.time_left(at) - before).abs() < 1e-9);

        // 3 wall seconds at slow = 2 countdown seconds
        assert!((timer.time_left(at + secs(3.0)) - (before - 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_speed_change_while_paused_applies_on_resume() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(30, RoutineSpeed::Normal);
        timer.start(t0);
        timer.pause(t0 + secs(10.0));
        timer.set_speed(RoutineSpeed::Fast, t0 + secs(11.0));
        assert!((timer.time_left(t0 + secs(11.0)) - 20.0).abs() < 1e-9);
        timer.resume(t0 + secs(20.0));
        assert!((timer.time_left(t0 + secs(27.0)) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_completion_fires_once() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(10, RoutineSpeed::Normal);
        timer.start(t0);
        assert_eq!(
            timer.tick(t0 + secs(10.5)),
            TimerTick::Completed { at: t0 + secs(10.0) }
        );
        assert_eq!(timer.tick(t0 + secs(11.0)), TimerTick::Idle);
        assert!(timer.is_completed());
        assert!(!timer.is_running());

        // Resuming a finished timer does nothing
        timer.resume(t0 + secs(12.0));
        assert_eq!(timer.tick(t0 + secs(20.0)), TimerTick::Idle);
        assert_eq!(timer.time_left(t0 + secs(20.0)), 0.0);
    }

    #[test]
    fn test_sparse_ticks_do_not_drift() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(30, RoutineSpeed::Normal);
        timer.start(t0);
        // One tick after a long suspension lands at the right place
        match timer.tick(t0 + secs(29.0)) {
            TimerTick::Running { time_left, .. } => assert!((time_left - 1.0).abs() < 1e-9),
            other => panic!("unexpected tick {other:?}"),
        }
    }

    #[test]
    fn test_completion_reports_when_time_ran_out() {
        let t0 = Instant::now();
        let mut timer = PoseTimer::new(20, RoutineSpeed::Slow);
        timer.start(t0);
        timer.pause(t0 + secs(6.0));
        timer.resume(t0 + secs(50.0));
        // 4 countdown seconds done, 16 left at 1.5x = 24 wall seconds
        assert_eq!(timer.finishes_at(), Some(t0 + secs(74.0)));

        // Ticked long after the end; completion is dated at the real end
        match timer.tick(t0 + secs(500.0)) {
            TimerTick::Completed { at } => {
                let drift = at.saturating_duration_since(t0 + secs(74.0))
                    + (t0 + secs(74.0)).saturating_duration_since(at);
                assert!(drift < Duration::from_millis(1));
            }
            other => panic!("unexpected tick {other:?}"),
        }
        assert_eq!(timer.finishes_at(), None);
    }

    #[test]
    fn test_fast_and_slow_wall_clock_lengths() {
        let t0 = Instant::now();
        let mut fast = PoseTimer::new(10, RoutineSpeed::Fast);
        fast.start(t0);
        assert!(matches!(fast.tick(t0 + secs(6.9)), TimerTick::Running { .. }));
        assert!(matches!(fast.tick(t0 + secs(7.0)), TimerTick::Completed { .. }));

        let mut slow = PoseTimer::new(10, RoutineSpeed::Slow);
        slow.start(t0);
        assert!(matches!(slow.tick(t0 + secs(14.9)), TimerTick::Running { .. }));
        assert!(matches!(slow.tick(t0 + secs(15.0)), TimerTick::Completed { .. }));
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(59.9), "0:59");
        assert_eq!(format_clock(75.0), "1:15");
        assert_eq!(format_clock(-3.0), "0:00");
    }

    #[test]
    fn test_time_band() {
        assert_eq!(TimeBand::from_fraction(1.0), TimeBand::Plenty);
        assert_eq!(TimeBand::from_fraction(0.5), TimeBand::Half);
        assert_eq!(TimeBand::from_fraction(0.1), TimeBand::Low);
    }
}

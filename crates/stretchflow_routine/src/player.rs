// SPDX-License-Identifier: MIT OR Apache-2.0
//! Routine playback state machine.
//!
//! ```text
//! start ──> GetReady ──(3 s)──> Playing ──(timer done, more poses)──> Transition
//!                                  ^                                      │
//!                                  └────────────(2 s, advance)────────────┘
//!                                  │
//!                                  └──(timer done, last pose)──> Complete
//! ```
//!
//! Delays are deferred tasks tagged with the player's generation. Starting,
//! restarting, closing and every pose change bump the generation, so a task
//! that fires after its run was superseded is dropped.

use crate::error::Result;
use crate::events::{PlayerEvent, PlayerPhase};
use crate::scheduler::DeferredQueue;
use crate::storage::RoutineStorage;
use crate::store::RoutineStore;
use crate::timer::{PoseTimer, TimerTick};
use std::time::{Duration, Instant};

/// Fixed presentation delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerTimings {
    /// Hold on the get-ready screen
    pub get_ready: Duration,
    /// Hold on the next-pose announcement
    pub transition: Duration,
}

impl Default for PlayerTimings {
    fn default() -> Self {
        Self {
            get_ready: Duration::from_secs(3),
            transition: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    BeginPlaying,
    FinishTransition,
}

/// Drives a routine through its phases
#[derive(Debug)]
pub struct RoutinePlayer {
    phase: PlayerPhase,
    timings: PlayerTimings,
    timer: Option<PoseTimer>,
    deferred: DeferredQueue<Deferred>,
    generation: u64,
    pending_events: Vec<PlayerEvent>,
}

impl RoutinePlayer {
    /// Create an idle player
    pub fn new(timings: PlayerTimings) -> Self {
        Self {
            phase: PlayerPhase::Idle,
            timings,
            timer: None,
            deferred: DeferredQueue::new(),
            generation: 0,
            pending_events: Vec::new(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> &PlayerPhase {
        &self.phase
    }

    /// Configured delays
    pub fn timings(&self) -> PlayerTimings {
        self.timings
    }

    /// Current run/pose generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Timer of the active pose
    pub fn timer(&self) -> Option<&PoseTimer> {
        self.timer.as_ref()
    }

    /// Seconds left on the active pose
    pub fn time_left(&self, now: Instant) -> Option<f64> {
        self.timer.as_ref().map(|timer| timer.time_left(now))
    }

    /// Events produced since the last call
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Start the routine from the first pose, via the get-ready hold
    pub fn start<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) -> Result<()> {
        store.start_routine()?;
        self.enter_get_ready(now);
        Ok(())
    }

    /// Start over from the first pose
    pub fn restart<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) -> Result<()> {
        self.invalidate();
        store.reset()?;
        if let Err(e) = store.start_routine() {
            self.set_phase(PlayerPhase::Idle, None);
            return Err(e);
        }
        tracing::info!("Routine restarted");
        self.enter_get_ready(now);
        Ok(())
    }

    /// End the routine and return to not-started
    pub fn close<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>) -> Result<()> {
        self.invalidate();
        self.timer = None;
        store.reset()?;
        if self.phase.is_active() {
            tracing::info!("Routine closed");
            self.set_phase(PlayerPhase::Idle, None);
        }
        Ok(())
    }

    /// Stop the countdown. Never changes phase; ignored unless a routine is
    /// in progress.
    pub fn pause<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) -> Result<()> {
        if !self.phase.is_in_progress() {
            tracing::debug!(phase = %self.phase, "Ignoring pause outside playback");
            return Ok(());
        }
        store.pause()?;
        if let Some(timer) = &mut self.timer {
            timer.pause(now);
        }
        Ok(())
    }

    /// Continue the countdown. Never changes phase; ignored unless a routine
    /// is in progress.
    pub fn resume<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) -> Result<()> {
        if !self.phase.is_in_progress() {
            tracing::debug!(phase = %self.phase, "Ignoring resume outside playback");
            return Ok(());
        }
        store.resume()?;
        if self.phase == PlayerPhase::Playing {
            if let Some(timer) = &mut self.timer {
                timer.resume(now);
            }
        }
        Ok(())
    }

    /// Pause if playing, resume otherwise
    pub fn toggle_pause<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) -> Result<()> {
        if store.playback().is_playing {
            self.pause(store, now)
        } else {
            self.resume(store, now)
        }
    }

    /// Change speed; the active countdown continues without a jump
    pub fn set_speed<S: RoutineStorage>(
        &mut self,
        store: &mut RoutineStore<S>,
        value: &str,
        now: Instant,
    ) -> Result<()> {
        store.set_speed(value)?;
        let speed = store.playback().speed;
        if let Some(timer) = &mut self.timer {
            timer.set_speed(speed, now);
        }
        tracing::debug!(%speed, "Routine speed changed");
        Ok(())
    }

    /// Skip the rest of the active pose.
    ///
    /// Only acts while playing or in a transition. Skipping the last pose
    /// completes the routine.
    pub fn advance<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) -> Result<()> {
        if !matches!(self.phase, PlayerPhase::Playing | PlayerPhase::Transition { .. }) {
            tracing::debug!(phase = %self.phase, "Ignoring skip outside playback");
            return Ok(());
        }

        if store.state().is_on_last_pose() {
            self.finish_routine(store)
        } else {
            store.advance()?;
            self.enter_playing(store, now);
            Ok(())
        }
    }

    /// Fire due deferred transitions, then recompute the active timer.
    ///
    /// A late call catches up through every boundary it missed: each pose
    /// completion is dated at the instant its timer ran out, and the next
    /// transition is measured from there.
    pub fn update<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) {
        loop {
            self.run_due_tasks(store, now);
            if !self.tick_timer(store, now) {
                break;
            }
        }
    }

    fn run_due_tasks<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) {
        for task in self.deferred.take_due(now) {
            if task.generation != self.generation {
                tracing::debug!(
                    stale = task.generation,
                    current = self.generation,
                    "Dropping stale deferred task"
                );
                continue;
            }

            let applies = match task.kind {
                Deferred::BeginPlaying => self.phase == PlayerPhase::GetReady,
                Deferred::FinishTransition => {
                    matches!(self.phase, PlayerPhase::Transition { .. })
                }
            };
            if !applies {
                tracing::debug!(kind = ?task.kind, phase = %self.phase, "Deferred task no longer applies");
                continue;
            }

            if task.kind == Deferred::FinishTransition {
                if let Err(e) = store.advance() {
                    tracing::warn!("Failed to advance after transition: {e}");
                    continue;
                }
            }
            self.enter_playing(store, task.due);
        }
    }

    /// Recompute the active timer; true when a pose completed
    fn tick_timer<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) -> bool {
        if self.phase != PlayerPhase::Playing {
            return false;
        }

        let Some(timer) = &mut self.timer else {
            return false;
        };

        match timer.tick(now) {
            TimerTick::Idle => false,
            TimerTick::Running {
                time_left,
                remaining_fraction,
            } => {
                self.pending_events.push(PlayerEvent::Tick {
                    time_left,
                    remaining_fraction,
                });
                false
            }
            TimerTick::Completed { at } => {
                self.pending_events.push(PlayerEvent::Tick {
                    time_left: 0.0,
                    remaining_fraction: 0.0,
                });
                self.on_pose_complete(store, at);
                true
            }
        }
    }

    fn on_pose_complete<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>, now: Instant) {
        let Some(index) = store.playback().current_index else {
            return;
        };
        self.pending_events.push(PlayerEvent::PoseComplete { index });

        // Decide on the index before it moves: the last pose goes straight
        // to Complete and never shows a transition.
        if store.state().is_on_last_pose() {
            if let Err(e) = self.finish_routine(store) {
                tracing::warn!("Failed to finish routine: {e}");
            }
            return;
        }

        let Some(next) = store.sequence().get(index + 1) else {
            return;
        };
        let next_pose_name = next.name.clone();
        tracing::debug!(index, next = %next_pose_name, "Pose complete");

        self.set_phase(PlayerPhase::Transition { next_pose_name }, Some(index));
        self.deferred.schedule(
            Deferred::FinishTransition,
            now,
            self.timings.transition,
            self.generation,
        );
    }

    fn finish_routine<S: RoutineStorage>(&mut self, store: &mut RoutineStore<S>) -> Result<()> {
        self.invalidate();
        let index = store.playback().current_index;
        // Advancing past the last pose only clears the playing flag.
        store.advance()?;
        tracing::info!("Routine complete");
        self.set_phase(PlayerPhase::Complete, index);
        Ok(())
    }

    fn enter_get_ready(&mut self, now: Instant) {
        self.invalidate();
        self.timer = None;
        self.set_phase(PlayerPhase::GetReady, Some(0));
        self.deferred.schedule(
            Deferred::BeginPlaying,
            now,
            self.timings.get_ready,
            self.generation,
        );
    }

    fn enter_playing<S: RoutineStorage>(&mut self, store: &RoutineStore<S>, at: Instant) {
        self.invalidate();

        let playback = *store.playback();
        let Some(pose) = store.current_pose() else {
            tracing::warn!("No current pose to play");
            self.timer = None;
            self.set_phase(PlayerPhase::Idle, None);
            return;
        };

        let mut timer = PoseTimer::new(pose.duration_secs, playback.speed);
        if playback.is_playing {
            timer.start(at);
        }
        tracing::debug!(pose = %pose.id, duration = pose.duration_secs, "Pose started");
        self.timer = Some(timer);
        self.set_phase(PlayerPhase::Playing, playback.current_index);
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.deferred.cancel_all();
    }

    fn set_phase(&mut self, phase: PlayerPhase, pose_index: Option<usize>) {
        tracing::debug!(from = %self.phase, to = %phase, "Player phase change");
        self.phase = phase.clone();
        self.pending_events
            .push(PlayerEvent::StateChange { phase, pose_index });
    }
}

impl Default for RoutinePlayer {
    fn default() -> Self {
        Self::new(PlayerTimings::default())
    }
}

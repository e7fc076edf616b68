// SPDX-License-Identifier: MIT OR Apache-2.0
//! Routine store.
//!
//! All state changes go through [`reduce`], a pure function from the current
//! state and an [`Action`] to the next state. [`RoutineStore`] is the
//! explicit context object that owns the state, applies actions and mirrors
//! the persisted subset to storage.
//!
//! Failed actions never change the model. The error is recorded in
//! [`RoutineState::last_error`] for the presentation layer to inspect and
//! clear.

use crate::error::{Result, RoutineError};
use crate::pose::Pose;
use crate::sequence::PoseSequence;
use crate::speed::RoutineSpeed;
use crate::storage::{PersistedRoutine, RoutineStorage};

/// Where playback is in the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    /// Active pose, `None` before the routine starts
    pub current_index: Option<usize>,
    /// Whether the countdown should advance
    pub is_playing: bool,
    /// Countdown speed
    pub speed: RoutineSpeed,
}

impl PlaybackState {
    /// Active index with `-1` meaning not started
    pub fn current_index_signed(&self) -> i64 {
        self.current_index.map_or(-1, |i| i as i64)
    }
}

/// Everything the store owns
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutineState {
    /// Pose order
    pub sequence: PoseSequence,
    /// Playback position and flags
    pub playback: PlaybackState,
    /// Dark theme preference
    pub dark_mode: bool,
    /// Most recent failure, until cleared or a later action succeeds
    pub last_error: Option<RoutineError>,
}

impl RoutineState {
    /// Fresh state around a sequence
    pub fn new(sequence: PoseSequence, dark_mode: bool) -> Self {
        Self {
            sequence,
            playback: PlaybackState::default(),
            dark_mode,
            last_error: None,
        }
    }

    /// The pose at the current index
    pub fn current_pose(&self) -> Option<&Pose> {
        self.playback
            .current_index
            .and_then(|index| self.sequence.get(index))
    }

    /// Whether the current index is the final pose
    pub fn is_on_last_pose(&self) -> bool {
        self.playback.current_index.is_some()
            && self.playback.current_index == self.sequence.last_index()
    }

    /// The subset written to storage
    pub fn persisted(&self) -> PersistedRoutine {
        PersistedRoutine {
            sequence: Some(self.sequence.clone()),
            theme_preference: Some(self.dark_mode),
        }
    }
}

/// A request to change routine state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Move the pose at `from` to `to`
    Reorder {
        /// Source position
        from: usize,
        /// Destination position
        to: usize,
    },
    /// Begin at the first pose
    StartRoutine,
    /// Stop the countdown
    Pause,
    /// Continue the countdown
    Resume,
    /// Move to the next pose, or stop on the last one
    Advance,
    /// Return to not-started
    Reset,
    /// Change speed from a raw value
    SetSpeed(String),
    /// Flip dark mode
    ToggleDarkMode,
    /// Set dark mode
    SetDarkMode(bool),
    /// Forget the last error
    ClearError,
}

impl Action {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Reorder { .. } => "reorder",
            Action::StartRoutine => "start_routine",
            Action::Pause => "pause",
            Action::Resume => "resume",
            Action::Advance => "advance",
            Action::Reset => "reset",
            Action::SetSpeed(_) => "set_speed",
            Action::ToggleDarkMode => "toggle_dark_mode",
            Action::SetDarkMode(_) => "set_dark_mode",
            Action::ClearError => "clear_error",
        }
    }
}

/// Apply an action, failing without side effects
pub fn try_reduce(state: &RoutineState, action: &Action) -> Result<RoutineState> {
    let mut next = state.clone();
    let playback = &mut next.playback;

    match action {
        Action::Reorder { from, to } => {
            next.sequence.reorder(*from, *to);
        }
        Action::StartRoutine => {
            if next.sequence.is_empty() {
                return Err(RoutineError::EmptySequence);
            }
            playback.current_index = Some(0);
            playback.is_playing = true;
        }
        Action::Pause => playback.is_playing = false,
        Action::Resume => playback.is_playing = true,
        Action::Advance => match (playback.current_index, next.sequence.last_index()) {
            (_, None) => {
                playback.current_index = None;
                playback.is_playing = false;
            }
            (Some(index), Some(last)) if index >= last => {
                playback.current_index = Some(last);
                playback.is_playing = false;
            }
            (Some(index), Some(_)) => playback.current_index = Some(index + 1),
            (None, Some(_)) => playback.current_index = Some(0),
        },
        Action::Reset => {
            playback.current_index = None;
            playback.is_playing = false;
        }
        Action::SetSpeed(value) => playback.speed = value.parse()?,
        Action::ToggleDarkMode => next.dark_mode = !next.dark_mode,
        Action::SetDarkMode(dark) => next.dark_mode = *dark,
        Action::ClearError => {}
    }

    next.last_error = None;
    Ok(next)
}

/// Apply an action, recording any failure in `last_error` instead
pub fn reduce(state: &RoutineState, action: &Action) -> RoutineState {
    try_reduce(state, action).unwrap_or_else(|err| RoutineState {
        last_error: Some(err),
        ..state.clone()
    })
}

/// Owner of routine state and its persistence
#[derive(Debug)]
pub struct RoutineStore<S> {
    state: RoutineState,
    storage: S,
}

impl<S: RoutineStorage> RoutineStore<S> {
    /// Load the persisted routine, falling back to the built-in sequence and
    /// `system_dark` for anything missing or unreadable
    pub fn open(storage: S, system_dark: bool) -> Self {
        let persisted = match storage.load() {
            Ok(found) => found.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable saved routine: {e}");
                PersistedRoutine::default()
            }
        };

        let sequence = persisted.sequence.unwrap_or_else(PoseSequence::builtin);
        let dark_mode = persisted.theme_preference.unwrap_or(system_dark);
        tracing::debug!(poses = sequence.len(), dark_mode, "Opened routine store");

        Self {
            state: RoutineState::new(sequence, dark_mode),
            storage,
        }
    }

    /// Wrap an existing state without loading
    pub fn with_state(storage: S, state: RoutineState) -> Self {
        Self { state, storage }
    }

    /// Current state
    pub fn state(&self) -> &RoutineState {
        &self.state
    }

    /// Pose order
    pub fn sequence(&self) -> &PoseSequence {
        &self.state.sequence
    }

    /// Playback position and flags
    pub fn playback(&self) -> &PlaybackState {
        &self.state.playback
    }

    /// Dark theme preference
    pub fn dark_mode(&self) -> bool {
        self.state.dark_mode
    }

    /// Most recent failure
    pub fn last_error(&self) -> Option<&RoutineError> {
        self.state.last_error.as_ref()
    }

    /// The active pose
    pub fn current_pose(&self) -> Option<&Pose> {
        self.state.current_pose()
    }

    /// Backing storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply an action.
    ///
    /// On failure the state is unchanged apart from `last_error`, and the
    /// error is also returned. Storage failures after a successful action
    /// are only logged and recorded.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        match try_reduce(&self.state, &action) {
            Ok(next) => {
                let persist = next.sequence != self.state.sequence
                    || next.dark_mode != self.state.dark_mode;
                tracing::debug!(action = action.name(), "Applied routine action");
                self.state = next;
                if persist {
                    self.persist();
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(action = action.name(), "Routine action failed: {err}");
                self.state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.storage.save(&self.state.persisted()) {
            tracing::warn!("Failed to save routine: {e}");
            self.state.last_error = Some(RoutineError::Persistence(e.to_string()));
        }
    }

    /// Move a pose; out-of-range positions change nothing
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.dispatch(Action::Reorder { from, to })
    }

    /// Start at the first pose
    pub fn start_routine(&mut self) -> Result<()> {
        self.dispatch(Action::StartRoutine)?;
        tracing::info!(poses = self.state.sequence.len(), "Routine started");
        Ok(())
    }

    /// Stop the countdown
    pub fn pause(&mut self) -> Result<()> {
        self.dispatch(Action::Pause)
    }

    /// Continue the countdown
    pub fn resume(&mut self) -> Result<()> {
        self.dispatch(Action::Resume)
    }

    /// Next pose, or stop on the last
    pub fn advance(&mut self) -> Result<()> {
        self.dispatch(Action::Advance)
    }

    /// Back to not-started
    pub fn reset(&mut self) -> Result<()> {
        self.dispatch(Action::Reset)
    }

    /// Change speed from a raw value
    pub fn set_speed(&mut self, value: &str) -> Result<()> {
        self.dispatch(Action::SetSpeed(value.to_string()))
    }

    /// Flip dark mode
    pub fn toggle_dark_mode(&mut self) -> Result<()> {
        self.dispatch(Action::ToggleDarkMode)
    }

    /// Set dark mode
    pub fn set_dark_mode(&mut self, dark: bool) -> Result<()> {
        self.dispatch(Action::SetDarkMode(dark))
    }

    /// Forget the last error
    pub fn clear_error(&mut self) {
        self.state.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn two_poses() -> PoseSequence {
        PoseSequence::from_poses([
            Pose::new("a", "A", 30, "").unwrap(),
            Pose::new("b", "B", 45, "").unwrap(),
        ])
        .unwrap()
    }

    fn store_with(sequence: PoseSequence) -> RoutineStore<MemoryStorage> {
        RoutineStore::with_state(MemoryStorage::new(), RoutineState::new(sequence, false))
    }

    #[test]
    fn test_start_on_empty_sequence_fails() {
        let mut store = store_with(PoseSequence::new());
        assert_eq!(store.start_routine(), Err(RoutineError::EmptySequence));
        assert_eq!(store.playback().current_index_signed(), -1);
        assert!(!store.playback().is_playing);
        assert_eq!(store.last_error(), Some(&RoutineError::EmptySequence));
    }

    #[test]
    fn test_start_sets_first_pose_playing() {
        let mut store = store_with(two_poses());
        store.start_routine().unwrap();
        assert_eq!(store.playback().current_index, Some(0));
        assert!(store.playback().is_playing);
        assert_eq!(store.current_pose().unwrap().name, "A");
    }

    #[test]
    fn test_advance_on_last_pose_stops() {
        let mut store = store_with(two_poses());
        store.start_routine().unwrap();
        store.advance().unwrap();
        assert_eq!(store.playback().current_index, Some(1));
        assert!(store.playback().is_playing);

        store.advance().unwrap();
        assert_eq!(store.playback().current_index, Some(1));
        assert!(!store.playback().is_playing);
    }

    #[test]
    fn test_advance_keeps_paused_flag() {
        let mut store = store_with(two_poses());
        store.start_routine().unwrap();
        store.pause().unwrap();
        store.advance().unwrap();
        assert_eq!(store.playback().current_index, Some(1));
        assert!(!store.playback().is_playing);
    }

    #[test]
    fn test_pause_resume_idempotent() {
        let mut store = store_with(two_poses());
        store.start_routine().unwrap();
        store.pause().unwrap();
        store.pause().unwrap();
        assert!(!store.playback().is_playing);
        store.resume().unwrap();
        store.resume().unwrap();
        assert!(store.playback().is_playing);
    }

    #[test]
    fn test_reset() {
        let mut store = store_with(two_poses());
        store.start_routine().unwrap();
        store.reset().unwrap();
        assert_eq!(store.playback().current_index, None);
        assert!(!store.playback().is_playing);
    }

    #[test]
    fn test_invalid_speed_keeps_previous() {
        let mut store = store_with(two_poses());
        store.set_speed("fast").unwrap();
        let err = store.set_speed("invalid").unwrap_err();
        assert_eq!(err, RoutineError::InvalidSpeed("invalid".into()));
        assert_eq!(store.playback().speed, RoutineSpeed::Fast);
        assert_eq!(store.last_error(), Some(&err));

        store.clear_error();
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_success_clears_previous_error() {
        let mut store = store_with(two_poses());
        let _ = store.set_speed("warp");
        assert!(store.last_error().is_some());
        store.pause().unwrap();
        assert!(store.last_error().is_none());
    }

    #[test]
    fn test_reorder_does_not_touch_playback() {
        let mut store = store_with(two_poses());
        store.start_routine().unwrap();
        store.advance().unwrap();
        store.reorder(1, 0).unwrap();
        assert_eq!(store.playback().current_index, Some(1));
        assert!(store.playback().is_playing);
        assert_eq!(store.sequence().get(0).unwrap().name, "B");
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = RoutineState::new(two_poses(), false);
        let next = reduce(&state, &Action::StartRoutine);
        assert_eq!(state.playback.current_index, None);
        assert_eq!(next.playback.current_index, Some(0));

        let failed = reduce(&RoutineState::new(PoseSequence::new(), false), &Action::StartRoutine);
        assert_eq!(failed.last_error, Some(RoutineError::EmptySequence));
        assert_eq!(failed.playback, PlaybackState::default());
    }

    #[test]
    fn test_persists_sequence_and_theme_changes() {
        let mut store = store_with(two_poses());
        store.reorder(0, 1).unwrap();
        let saved = store.storage().saved().unwrap();
        let ids: Vec<_> = saved.sequence.unwrap().ids().map(|id| id.0.clone()).collect();
        assert_eq!(ids, ["b", "a"]);

        store.toggle_dark_mode().unwrap();
        assert_eq!(store.storage().saved().unwrap().theme_preference, Some(true));
        assert_eq!(store.storage().save_count(), 2);

        // Playback changes are not part of the persisted subset
        store.start_routine().unwrap();
        store.pause().unwrap();
        assert_eq!(store.storage().save_count(), 2);
    }

    #[test]
    fn test_out_of_range_reorder_not_persisted() {
        let mut store = store_with(two_poses());
        store.reorder(5, 0).unwrap();
        assert_eq!(store.storage().save_count(), 0);
        assert_eq!(store.sequence(), &two_poses());
    }

    #[test]
    fn test_persistence_failure_is_recorded_not_returned() {
        let mut store = RoutineStore::with_state(
            MemoryStorage::failing(),
            RoutineState::new(two_poses(), false),
        );
        assert!(store.reorder(0, 1).is_ok());
        assert_eq!(store.sequence().get(0).unwrap().name, "B");
        assert!(matches!(store.last_error(), Some(RoutineError::Persistence(_))));
    }

    #[test]
    fn test_open_falls_back_to_defaults() {
        let store = RoutineStore::open(MemoryStorage::new(), true);
        assert_eq!(store.sequence(), &PoseSequence::builtin());
        assert!(store.dark_mode());
        assert_eq!(store.playback().current_index, None);
    }

    #[test]
    fn test_open_uses_saved_values() {
        let saved = PersistedRoutine {
            sequence: Some(two_poses()),
            theme_preference: Some(false),
        };
        let store = RoutineStore::open(MemoryStorage::with_saved(saved), true);
        assert_eq!(store.sequence(), &two_poses());
        assert!(!store.dark_mode());
    }

    #[test]
    fn test_open_partial_saved_values() {
        let saved = PersistedRoutine {
            sequence: None,
            theme_preference: Some(true),
        };
        let store = RoutineStore::open(MemoryStorage::with_saved(saved), false);
        assert_eq!(store.sequence().len(), 6);
        assert!(store.dark_mode());
    }
}

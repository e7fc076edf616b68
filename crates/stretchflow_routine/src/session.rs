// SPDX-License-Identifier: MIT OR Apache-2.0
//! A routine store, player and clock wired together.
//!
//! This is the surface a presentation layer talks to: it exposes the
//! routine operations without making callers thread `now` and the store
//! through every call.

use crate::clock::Clock;
use crate::error::{Result, RoutineError};
use crate::events::{PlayerEvent, PlayerListener, PlayerPhase};
use crate::player::{PlayerTimings, RoutinePlayer};
use crate::storage::RoutineStorage;
use crate::store::RoutineStore;

/// Store, player and time source for one app instance
#[derive(Debug)]
pub struct RoutineSession<S, C> {
    store: RoutineStore<S>,
    player: RoutinePlayer,
    clock: C,
}

impl<S: RoutineStorage, C: Clock> RoutineSession<S, C> {
    /// Wrap an opened store
    pub fn new(store: RoutineStore<S>, timings: PlayerTimings, clock: C) -> Self {
        Self {
            store,
            player: RoutinePlayer::new(timings),
            clock,
        }
    }

    /// The routine store
    pub fn store(&self) -> &RoutineStore<S> {
        &self.store
    }

    /// Current phase
    pub fn phase(&self) -> &PlayerPhase {
        self.player.phase()
    }

    /// Seconds left on the active pose
    pub fn time_left(&self) -> Option<f64> {
        self.player.time_left(self.clock.now())
    }

    /// Most recent failure
    pub fn last_error(&self) -> Option<&RoutineError> {
        self.store.last_error()
    }

    /// Move a pose in the sequence
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        self.store.reorder(from, to)
    }

    /// Open the routine at the first pose
    pub fn start_routine(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.player.start(&mut self.store, now)
    }

    /// Stop the countdown
    pub fn pause(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.player.pause(&mut self.store, now)
    }

    /// Continue the countdown
    pub fn resume(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.player.resume(&mut self.store, now)
    }

    /// Pause or resume
    pub fn toggle_pause(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.player.toggle_pause(&mut self.store, now)
    }

    /// Skip to the next pose
    pub fn advance(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.player.advance(&mut self.store, now)
    }

    /// Return to not-started, ending any routine
    pub fn reset(&mut self) -> Result<()> {
        self.player.close(&mut self.store)
    }

    /// Change speed from a raw value
    pub fn set_speed(&mut self, value: &str) -> Result<()> {
        let now = self.clock.now();
        self.player.set_speed(&mut self.store, value, now)
    }

    /// Start over after completion (or at any point)
    pub fn restart(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.player.restart(&mut self.store, now)
    }

    /// End the routine
    pub fn close(&mut self) -> Result<()> {
        self.player.close(&mut self.store)
    }

    /// Flip dark mode
    pub fn toggle_dark_mode(&mut self) -> Result<()> {
        self.store.toggle_dark_mode()
    }

    /// Forget the last error
    pub fn clear_error(&mut self) {
        self.store.clear_error();
    }

    /// Run one scheduler step and return what happened
    pub fn update(&mut self) -> Vec<PlayerEvent> {
        let now = self.clock.now();
        self.player.update(&mut self.store, now);
        self.player.take_events()
    }

    /// Run one scheduler step and hand events to a listener
    pub fn pump<L: PlayerListener + ?Sized>(&mut self, listener: &mut L) {
        for event in self.update() {
            event.deliver(listener);
        }
    }

    /// Events from operations since the last update
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        self.player.take_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_session_uses_clock() {
        let clock = ManualClock::new();
        let store = RoutineStore::open(MemoryStorage::new(), false);
        let mut session = RoutineSession::new(store, PlayerTimings::default(), &clock);

        session.start_routine().unwrap();
        clock.advance_secs(3.0);
        session.update();
        assert_eq!(session.phase(), &PlayerPhase::Playing);

        clock.advance_secs(10.0);
        assert!((session.time_left().unwrap() - 20.0).abs() < 1e-9);

        session.pause().unwrap();
        clock.advance_secs(100.0);
        assert!((session.time_left().unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_closes_routine() {
        let clock = ManualClock::new();
        let store = RoutineStore::open(MemoryStorage::new(), false);
        let mut session = RoutineSession::new(store, PlayerTimings::default(), &clock);
        session.start_routine().unwrap();
        session.reset().unwrap();
        assert_eq!(session.phase(), &PlayerPhase::Idle);
        assert_eq!(session.store().playback().current_index_signed(), -1);
    }
}

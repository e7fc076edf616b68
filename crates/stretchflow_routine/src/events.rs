// SPDX-License-Identifier: MIT OR Apache-2.0
//! Phases and events emitted by the routine player.

use std::fmt;

/// Player state machine phases
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlayerPhase {
    /// No routine open
    #[default]
    Idle,
    /// Short countdown before the first pose
    GetReady,
    /// A pose timer is active
    Playing,
    /// Pause between poses, announcing the next one
    Transition {
        /// Name of the pose about to start
        next_pose_name: String,
    },
    /// Every pose finished
    Complete,
}

impl PlayerPhase {
    /// Whether a routine is open
    pub fn is_active(&self) -> bool {
        !matches!(self, PlayerPhase::Idle)
    }

    /// Whether a routine is under way and can be paused
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            PlayerPhase::GetReady | PlayerPhase::Playing | PlayerPhase::Transition { .. }
        )
    }

    /// Short label for display and logs
    pub fn label(&self) -> &'static str {
        match self {
            PlayerPhase::Idle => "idle",
            PlayerPhase::GetReady => "get_ready",
            PlayerPhase::Playing => "playing",
            PlayerPhase::Transition { .. } => "transition",
            PlayerPhase::Complete => "complete",
        }
    }
}

impl fmt::Display for PlayerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Countdown update for the active pose
    Tick {
        /// Seconds left
        time_left: f64,
        /// Fraction of the pose still to go
        remaining_fraction: f64,
    },
    /// The pose at `index` finished; emitted once per pose
    PoseComplete {
        /// Finished pose position
        index: usize,
    },
    /// The player entered a new phase
    StateChange {
        /// New phase, with its payload
        phase: PlayerPhase,
        /// Active pose at the time of the change
        pose_index: Option<usize>,
    },
}

impl PlayerEvent {
    /// Forward this event to the matching listener callback
    pub fn deliver<L: PlayerListener + ?Sized>(&self, listener: &mut L) {
        match self {
            PlayerEvent::Tick {
                time_left,
                remaining_fraction,
            } => listener.on_tick(*time_left, *remaining_fraction),
            PlayerEvent::PoseComplete { index } => listener.on_pose_complete(*index),
            PlayerEvent::StateChange { phase, pose_index } => {
                listener.on_state_change(phase, *pose_index);
            }
        }
    }
}

/// Receiver of player events. Every callback defaults to doing nothing.
pub trait PlayerListener {
    /// Countdown update
    fn on_tick(&mut self, _time_left: f64, _remaining_fraction: f64) {}

    /// A pose finished
    fn on_pose_complete(&mut self, _index: usize) {}

    /// Phase changed
    fn on_state_change(&mut self, _phase: &PlayerPhase, _pose_index: Option<usize>) {}
}

/// Collects events in order
impl PlayerListener for Vec<PlayerEvent> {
    fn on_tick(&mut self, time_left: f64, remaining_fraction: f64) {
        self.push(PlayerEvent::Tick {
            time_left,
            remaining_fraction,
        });
    }

    fn on_pose_complete(&mut self, index: usize) {
        self.push(PlayerEvent::PoseComplete { index });
    }

    fn on_state_change(&mut self, phase: &PlayerPhase, pose_index: Option<usize>) {
        self.push(PlayerEvent::StateChange {
            phase: phase.clone(),
            pose_index,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deliver_round_trips_through_recorder() {
        let events = vec![
            PlayerEvent::StateChange {
                phase: PlayerPhase::Transition {
                    next_pose_name: "Tree Pose".into(),
                },
                pose_index: Some(2),
            },
            PlayerEvent::Tick {
                time_left: 4.5,
                remaining_fraction: 0.5,
            },
            PlayerEvent::PoseComplete { index: 2 },
        ];
        let mut recorded: Vec<PlayerEvent> = Vec::new();
        for event in &events {
            event.deliver(&mut recorded);
        }
        assert_eq!(recorded, events);
    }

    #[test]
    fn test_phase_labels() {
        assert_eq!(PlayerPhase::GetReady.to_string(), "get_ready");
        assert!(!PlayerPhase::Idle.is_active());
        assert!(PlayerPhase::Complete.is_active());
        assert!(!PlayerPhase::Complete.is_in_progress());
        assert!(!PlayerPhase::Idle.is_in_progress());
        assert!(PlayerPhase::Transition {
            next_pose_name: "B".into()
        }
        .is_in_progress());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stretch routine model for `StretchFlow`.
//!
//! This crate holds everything about a routine that is not presentation:
//! - Poses and their user-chosen order
//! - A countdown timer that survives pause, resume and speed changes
//!   without drift
//! - A reducer-based store mirrored to durable storage
//! - The playback state machine (get ready, playing, transition, complete)
//!
//! ## Architecture
//!
//! Everything runs on one cooperative update loop. Nothing blocks or
//! spawns; the owner calls [`RoutineSession::update`] on a regular cadence
//! and time is always read from an injected [`Clock`].

pub mod clock;
pub mod error;
pub mod events;
pub mod player;
pub mod pose;
pub mod scheduler;
pub mod sequence;
pub mod session;
pub mod speed;
pub mod storage;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, RoutineError};
pub use events::{PlayerEvent, PlayerListener, PlayerPhase};
pub use player::{PlayerTimings, RoutinePlayer};
pub use pose::{default_poses, Pose, PoseId};
pub use scheduler::{DeferredQueue, ScheduledTask};
pub use sequence::{reorder_items, PoseSequence};
pub use session::RoutineSession;
pub use speed::RoutineSpeed;
pub use storage::{JsonFileStorage, MemoryStorage, PersistedRoutine, RoutineStorage, StorageError};
pub use store::{reduce, try_reduce, Action, PlaybackState, RoutineState, RoutineStore};
pub use timer::{format_clock, PoseTimer, TimeBand, TimerTick};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for routine operations.

use thiserror::Error;

/// Errors raised by routine store mutations and model construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutineError {
    /// Attempted to start a routine with no poses
    #[error("No poses available to start routine")]
    EmptySequence,

    /// Speed value is not one of slow, normal, fast
    #[error("Invalid speed setting: {0:?}")]
    InvalidSpeed(String),

    /// Best-effort write of the persisted routine failed
    #[error("Failed to persist routine: {0}")]
    Persistence(String),

    /// Pose failed validation
    #[error("Invalid pose {id:?}: {reason}")]
    InvalidPose {
        /// Offending pose id
        id: String,
        /// What was wrong with it
        reason: &'static str,
    },

    /// Two poses share the same id
    #[error("Duplicate pose id: {0}")]
    DuplicatePose(String),
}

/// Result type for routine operations
pub type Result<T> = std::result::Result<T, RoutineError>;

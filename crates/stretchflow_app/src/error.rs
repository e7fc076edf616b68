// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application errors.

use crate::config::ConfigError;
use stretchflow_routine::RoutineError;
use thiserror::Error;

/// Errors surfaced by the command line
#[derive(Debug, Error)]
pub enum AppError {
    /// Config could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Routine rejected an operation
    #[error(transparent)]
    Routine(#[from] RoutineError),

    /// Terminal or runtime IO failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A 1-based pose position outside the sequence
    #[error("Position {position} is out of range (routine has {len} poses)")]
    InvalidPosition {
        /// Position as typed
        position: usize,
        /// Number of poses
        len: usize,
    },
}

/// Result alias for application operations
pub type AppResult<T> = Result<T, AppError>;

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Routine speed setting.

use crate::error::RoutineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How fast pose countdowns run relative to the wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineSpeed {
    /// Holds take 1.5x as long
    Slow,
    /// Real time
    #[default]
    Normal,
    /// Holds take 0.7x as long
    Fast,
}

impl RoutineSpeed {
    /// All speeds, slowest first
    pub fn all() -> &'static [RoutineSpeed] {
        &[RoutineSpeed::Slow, RoutineSpeed::Normal, RoutineSpeed::Fast]
    }

    /// Wall-clock seconds needed per second of pose duration.
    ///
    /// Elapsed countdown time is wall time divided by this value.
    pub fn multiplier(&self) -> f64 {
        match self {
            RoutineSpeed::Slow => 1.5,
            RoutineSpeed::Normal => 1.0,
            RoutineSpeed::Fast => 0.7,
        }
    }

    /// Wall-clock seconds to exhaust `duration_secs` at this speed
    pub fn wall_clock_secs(&self, duration_secs: f64) -> f64 {
        duration_secs * self.multiplier()
    }

    /// Lowercase name, as stored and typed
    pub fn name(&self) -> &'static str {
        match self {
            RoutineSpeed::Slow => "slow",
            RoutineSpeed::Normal => "normal",
            RoutineSpeed::Fast => "fast",
        }
    }
}

impl fmt::Display for RoutineSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoutineSpeed {
    type Err = RoutineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RoutineSpeed::all()
            .iter()
            .copied()
            .find(|speed| speed.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RoutineError::InvalidSpeed(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!("slow".parse::<RoutineSpeed>().unwrap(), RoutineSpeed::Slow);
        assert_eq!(" Normal ".parse::<RoutineSpeed>().unwrap(), RoutineSpeed::Normal);
        assert_eq!("FAST".parse::<RoutineSpeed>().unwrap(), RoutineSpeed::Fast);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "invalid".parse::<RoutineSpeed>().unwrap_err();
        assert_eq!(err, RoutineError::InvalidSpeed("invalid".into()));
        assert!("".parse::<RoutineSpeed>().is_err());
    }

    #[test]
    fn test_wall_clock_time() {
        assert!((RoutineSpeed::Slow.wall_clock_secs(30.0) - 45.0).abs() < 1e-9);
        assert!((RoutineSpeed::Normal.wall_clock_secs(30.0) - 30.0).abs() < 1e-9);
        assert!((RoutineSpeed::Fast.wall_clock_secs(30.0) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&RoutineSpeed::Fast).unwrap(), "\"fast\"");
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pose definitions and the built-in routine.

use crate::error::{Result, RoutineError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a pose
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoseId(pub String);

impl PoseId {
    /// Create a pose ID from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoseId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single stretch held for a fixed duration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    /// Unique pose ID
    pub id: PoseId,
    /// Display name
    pub name: String,
    /// Hold time in seconds, always positive
    #[serde(rename = "durationSeconds")]
    pub duration_secs: u32,
    /// How to perform the pose
    pub description: String,
}

impl Pose {
    /// Create a validated pose
    pub fn new(
        id: impl Into<PoseId>,
        name: impl Into<String>,
        duration_secs: u32,
        description: impl Into<String>,
    ) -> Result<Self> {
        let pose = Self {
            id: id.into(),
            name: name.into(),
            duration_secs,
            description: description.into(),
        };
        pose.validate()?;
        Ok(pose)
    }

    /// Check the pose invariants
    pub fn validate(&self) -> Result<()> {
        if self.id.0.is_empty() {
            return Err(RoutineError::InvalidPose {
                id: self.id.0.clone(),
                reason: "id must not be empty",
            });
        }
        if self.duration_secs == 0 {
            return Err(RoutineError::InvalidPose {
                id: self.id.0.clone(),
                reason: "duration must be positive",
            });
        }
        Ok(())
    }
}

impl From<String> for PoseId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The routine shipped with the app, used when nothing has been saved yet
pub fn default_poses() -> Vec<Pose> {
    const POSES: [(&str, &str, u32, &str); 6] = [
        (
            "1",
            "Forward Fold",
            30,
            "Bend forward from the base of the hips, keeping back straight until you feel a stretch.",
        ),
        (
            "2",
            "Downward Dog",
            45,
            "Form an inverted V shape with your body, pushing your hips up and back.",
        ),
        (
            "3",
            "Warrior II",
            60,
            "Front knee bent at 90°, back leg straight, arms parallel to the ground.",
        ),
        (
            "4",
            "Tree Pose",
            40,
            "Balance on one leg with the other foot placed on inner thigh, hands in prayer position.",
        ),
        (
            "5",
            "Child's Pose",
            50,
            "Kneel and stretch forward with arms extended, forehead touching the ground.",
        ),
        (
            "6",
            "Cobra Pose",
            35,
            "Lie on your stomach, push up with arms while keeping hips on the ground.",
        ),
    ];

    POSES
        .iter()
        .map(|&(id, name, duration_secs, description)| Pose {
            id: PoseId::new(id),
            name: name.to_string(),
            duration_secs,
            description: description.to_string(),
        })
        .collect()
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ordered, id-unique pose sequence.

use crate::error::{Result, RoutineError};
use crate::pose::{default_poses, Pose, PoseId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Poses in playback order, unique by id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pose>", into = "Vec<Pose>")]
pub struct PoseSequence {
    poses: IndexMap<PoseId, Pose>,
}

impl PoseSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self {
            poses: IndexMap::new(),
        }
    }

    /// Build a sequence, rejecting invalid poses and duplicate ids
    pub fn from_poses(poses: impl IntoIterator<Item = Pose>) -> Result<Self> {
        let mut map = IndexMap::new();
        for pose in poses {
            pose.validate()?;
            if map.contains_key(&pose.id) {
                return Err(RoutineError::DuplicatePose(pose.id.0));
            }
            map.insert(pose.id.clone(), pose);
        }
        Ok(Self { poses: map })
    }

    /// The built-in routine
    pub fn builtin() -> Self {
        let poses = default_poses()
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        Self { poses }
    }

    /// Number of poses
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Whether there are no poses
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Index of the final pose
    pub fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    /// Pose at a position
    pub fn get(&self, index: usize) -> Option<&Pose> {
        self.poses.get_index(index).map(|(_, pose)| pose)
    }

    /// Poses in order
    pub fn iter(&self) -> impl Iterator<Item = &Pose> {
        self.poses.values()
    }

    /// Ids in order
    pub fn ids(&self) -> impl Iterator<Item = &PoseId> {
        self.poses.keys()
    }

    /// Sum of all hold times, ignoring speed
    pub fn total_duration_secs(&self) -> u64 {
        self.iter().map(|p| u64::from(p.duration_secs)).sum()
    }

    /// Move the pose at `from` to `to`, shifting everything in between.
    ///
    /// Returns `false` and leaves the order untouched if either index is out
    /// of range.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.len();
        if from >= len || to >= len {
            tracing::debug!(from, to, len, "Ignoring out-of-range reorder");
            return false;
        }
        self.poses.move_index(from, to);
        true
    }

    /// Copy of this sequence with one pose moved
    pub fn reordered(&self, from: usize, to: usize) -> Option<Self> {
        let mut next = self.clone();
        next.reorder(from, to).then_some(next)
    }
}

impl Default for PoseSequence {
    fn default() -> Self {
        Self::builtin()
    }
}

// Order matters for equality, unlike `IndexMap`'s own comparison.
impl PartialEq for PoseSequence {
    fn eq(&self, other: &Self) -> bool {
        self.poses.iter().eq(other.poses.iter())
    }
}

impl Eq for PoseSequence {}

impl TryFrom<Vec<Pose>> for PoseSequence {
    type Error = RoutineError;

    fn try_from(poses: Vec<Pose>) -> Result<Self> {
        Self::from_poses(poses)
    }
}

impl From<PoseSequence> for Vec<Pose> {
    fn from(sequence: PoseSequence) -> Self {
        sequence.poses.into_values().collect()
    }
}

/// Remove the item at `from` and reinsert it at `to`.
///
/// Out-of-range indices return an unchanged copy.
pub fn reorder_items<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut out = items.to_vec();
    if from < out.len() && to < out.len() {
        let moved = out.remove(from);
        out.insert(to, moved);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pose(id: &str, secs: u32) -> Pose {
        Pose::new(id, format!("Pose {id}"), secs, "").unwrap()
    }

    fn ids(seq: &PoseSequence) -> Vec<&str> {
        seq.ids().map(PoseId::as_str).collect()
    }

    fn abcd() -> PoseSequence {
        PoseSequence::from_poses(["a", "b", "c", "d"].map(|id| pose(id, 10))).unwrap()
    }

    #[test]
    fn test_reorder_forward_shifts() {
        let mut seq = abcd();
        assert!(seq.reorder(0, 2));
        assert_eq!(ids(&seq), ["b", "c", "a", "d"]);
    }

    #[test]
    fn test_reorder_backward_shifts() {
        let mut seq = abcd();
        assert!(seq.reorder(3, 1));
        assert_eq!(ids(&seq), ["a", "d", "b", "c"]);
    }

    #[test]
    fn test_reorder_same_index_is_identity() {
        let mut seq = abcd();
        assert!(seq.reorder(2, 2));
        assert_eq!(ids(&seq), ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let mut seq = abcd();
        assert!(!seq.reorder(4, 0));
        assert!(!seq.reorder(0, 9));
        assert_eq!(ids(&seq), ["a", "b", "c", "d"]);
        assert!(seq.reordered(7, 0).is_none());
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let seq = abcd();
        assert_ne!(seq.reordered(0, 1).unwrap(), seq);
        assert_eq!(seq.reordered(0, 0).unwrap(), seq);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = PoseSequence::from_poses([pose("a", 5), pose("a", 6)]).unwrap_err();
        assert_eq!(err, RoutineError::DuplicatePose("a".into()));
    }

    #[test]
    fn test_serializes_as_array() {
        let seq = PoseSequence::from_poses([pose("x", 12)]).unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        assert!(json.starts_with('['));
        let back: PoseSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let json = r#"[
            {"id":"1","name":"A","durationSeconds":5,"description":""},
            {"id":"1","name":"B","durationSeconds":6,"description":""}
        ]"#;
        assert!(serde_json::from_str::<PoseSequence>(json).is_err());
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(PoseSequence::builtin().total_duration_secs(), 260);
        assert_eq!(PoseSequence::builtin().last_index(), Some(5));
        assert_eq!(PoseSequence::new().last_index(), None);
    }

    proptest! {
        #[test]
        fn prop_reorder_preserves_ids_and_relative_order(
            len in 1usize..12,
            from_seed in any::<usize>(),
            to_seed in any::<usize>(),
        ) {
            let from = from_seed % len;
            let to = to_seed % len;
            let poses: Vec<Pose> = (0..len).map(|i| pose(&i.to_string(), 10)).collect();
            let mut seq = PoseSequence::from_poses(poses).unwrap();
            let before: Vec<String> = seq.ids().map(|id| id.0.clone()).collect();

            prop_assert!(seq.reorder(from, to));
            let after: Vec<String> = seq.ids().map(|id| id.0.clone()).collect();

            let mut sorted_before = before.clone();
            let mut sorted_after = after.clone();
            sorted_before.sort();
            sorted_after.sort();
            prop_assert_eq!(sorted_before, sorted_after);

            let moved = &before[from];
            prop_assert_eq!(&after[to], moved);
            let rest_before: Vec<&String> = before.iter().filter(|id| *id != moved).collect();
            let rest_after: Vec<&String> = after.iter().filter(|id| *id != moved).collect();
            prop_assert_eq!(rest_before, rest_after);

            prop_assert_eq!(after, reorder_items(&before, from, to));
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Deferred tasks for the cooperative update loop.
//!
//! Nothing here sleeps or spawns. The owner polls [`DeferredQueue::take_due`]
//! from its regular update and decides what to do with each task. Every task
//! carries the generation that was current when it was scheduled, so the
//! owner can drop tasks that belong to a superseded run.

use std::time::{Duration, Instant};

/// A task waiting for its due time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask<K> {
    /// When the task becomes runnable
    pub due: Instant,
    /// Generation at scheduling time
    pub generation: u64,
    /// What to do
    pub kind: K,
}

/// Pending deferred tasks
#[derive(Debug, Clone)]
pub struct DeferredQueue<K> {
    tasks: Vec<ScheduledTask<K>>,
}

impl<K> DeferredQueue<K> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Queue `kind` to run `delay` after `now`
    pub fn schedule(&mut self, kind: K, now: Instant, delay: Duration, generation: u64) {
        self.tasks.push(ScheduledTask {
            due: now + delay,
            generation,
            kind,
        });
    }

    /// Drop every pending task
    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Remove and return all tasks due at `now`, earliest first
    pub fn take_due(&mut self, now: Instant) -> Vec<ScheduledTask<K>> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.tasks.drain(..).partition(|task| task.due <= now);
        self.tasks = pending;
        due.sort_by_key(|task| task.due);
        due
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<K> Default for DeferredQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

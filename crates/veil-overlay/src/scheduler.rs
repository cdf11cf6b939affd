#![forbid(unsafe_code)]

//! Virtual-time timer queue.
//!
//! Timers are ordered by due time, then by insertion. The clock only moves
//! when the owner advances it, so tests drive time explicitly; hosts map
//! wall-clock time onto it with [`Scheduler::real_elapsed`].
//!
//! # Invariants
//!
//! - `now` never decreases.
//! - Timers due at the same instant fire in scheduling order.
//! - A timer scheduled with a zero delay while draining fires in the same
//!   drain.

use std::collections::BTreeMap;
use std::time::Duration;

use web_time::Instant;

/// Timer queue over a virtual clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    seq: u64,
    queue: BTreeMap<(Duration, u64), T>,
    epoch: Instant,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            queue: BTreeMap::new(),
            epoch: Instant::now(),
        }
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Wall-clock time since the scheduler was created.
    pub fn real_elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Queue `task` to fire `delay` from now.
    pub fn schedule(&mut self, delay: Duration, task: T) {
        let due = self.now.saturating_add(delay);
        self.queue.insert((due, self.seq), task);
        self.seq += 1;
    }

    /// Due time of the next timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|&(due, _)| due)
    }

    /// Remove the next timer due at or before `until`, moving the clock to
    /// its due time.
    pub fn pop_due(&mut self, until: Duration) -> Option<T> {
        let entry = self.queue.first_entry()?;
        let (due, _) = *entry.key();
        if due > until {
            return None;
        }
        let task = entry.remove();
        self.now = self.now.max(due);
        Some(task)
    }

    /// Move the clock forward to `until` (never backwards).
    pub fn set_now(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Pending timers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

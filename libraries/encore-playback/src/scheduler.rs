//! Deterministic timer queue
//!
//! The player never sleeps or spawns. Delayed work is queued here and run
//! when the host advances the clock, so every retry loop and settle delay is
//! reproducible in tests.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    due: Duration,
    seq: u64,
}

/// Queue of tasks ordered by due time, then insertion order
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<TaskId, T>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler at time zero
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
        }
    }

    /// Current clock value
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Move the clock forward
    ///
    /// The clock is monotonic; earlier values are ignored.
    pub fn set_now(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Queue a task to run `delay` after the current clock value
    pub fn schedule_in(&mut self, delay: Duration, task: T) -> TaskId {
        let id = TaskId {
            due: self.now + delay,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.queue.insert(id, task);
        id
    }

    /// Remove a task before it runs
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        self.queue.remove(&id)
    }

    /// Keep only the tasks matching the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.queue.retain(|_, task| keep(task));
    }

    /// Whether any queued task matches the predicate
    pub fn contains(&self, mut matches: impl FnMut(&T) -> bool) -> bool {
        self.queue.values().any(|task| matches(task))
    }

    /// Drop every queued task
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Take the earliest task that is due
    pub fn pop_due(&mut self) -> Option<T> {
        let (&id, _) = self.queue.first_key_value()?;
        if id.due > self.now {
            return None;
        }
        self.queue.remove(&id)
    }

    /// Due time of the earliest task
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|id| id.due)
    }

    /// Number of queued tasks
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn runs_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_in(ms(200), "late");
        scheduler.schedule_in(ms(100), "early");
        scheduler.schedule_in(ms(100), "early-second");

        assert_eq!(scheduler.pop_due(), None);

        scheduler.set_now(ms(150));
        assert_eq!(scheduler.pop_due(), Some("early"));
        assert_eq!(scheduler.pop_due(), Some("early-second"));
        assert_eq!(scheduler.pop_due(), None);

        scheduler.set_now(ms(500));
        assert_eq!(scheduler.pop_due(), Some("late"));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn clock_is_monotonic() {
        let mut scheduler: Scheduler<()> = Scheduler::new();
        scheduler.set_now(ms(300));
        scheduler.set_now(ms(100));
        assert_eq!(scheduler.now(), ms(300));
    }

    #[test]
    fn cancel_and_retain() {
        let mut scheduler = Scheduler::new();
        let a = scheduler.schedule_in(ms(10), 1);
        scheduler.schedule_in(ms(10), 2);
        scheduler.schedule_in(ms(10), 3);

        assert_eq!(scheduler.cancel(a), Some(1));
        assert_eq!(scheduler.cancel(a), None);

        scheduler.retain(|n| *n != 2);
        assert!(scheduler.contains(|n| *n == 3));
        assert!(!scheduler.contains(|n| *n == 2));
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.next_due(), Some(ms(10)));
    }

    #[test]
    fn delay_is_relative_to_current_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.set_now(ms(1_000));
        scheduler.schedule_in(ms(100), ());
        assert_eq!(scheduler.next_due(), Some(ms(1_100)));
    }
}

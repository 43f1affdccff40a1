//! Bounded readiness polling
//!
//! Replaces ad-hoc retry loops: each check reports a [`Probe`], and the
//! poll decides whether to retry, give up, or proceed.

use std::time::Duration;

/// Result of a single readiness check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The awaited condition holds
    Ready,

    /// Not yet, check again later
    NotYet,

    /// The thing being waited on went away; stop without retrying
    Gone,
}

/// What the caller should do after a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Condition met
    Ready,

    /// Check again after the given delay
    RetryIn(Duration),

    /// Attempt budget spent without success
    Exhausted,

    /// Target disappeared mid-poll
    Abandoned,
}

/// Retry budget for one readiness wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedPoll {
    interval: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl BoundedPoll {
    /// Poll every `interval`, making at most `max_attempts` checks
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: max_attempts.max(1),
            attempts: 0,
        }
    }

    /// Record one check and decide what happens next
    pub fn attempt(&mut self, probe: Probe) -> PollOutcome {
        self.attempts += 1;
        match probe {
            Probe::Ready => PollOutcome::Ready,
            Probe::Gone => PollOutcome::Abandoned,
            Probe::NotYet if self.attempts >= self.max_attempts => PollOutcome::Exhausted,
            Probe::NotYet => PollOutcome::RetryIn(self.interval),
        }
    }

    /// Checks made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Check budget
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausts_after_budget() {
        let mut poll = BoundedPoll::new(Duration::from_millis(200), 3);
        assert_eq!(
            poll.attempt(Probe::NotYet),
            PollOutcome::RetryIn(Duration::from_millis(200))
        );
        assert_eq!(
            poll.attempt(Probe::NotYet),
            PollOutcome::RetryIn(Duration::from_millis(200))
        );
        assert_eq!(poll.attempt(Probe::NotYet), PollOutcome::Exhausted);
        assert_eq!(poll.attempts(), 3);
    }

    #[test]
    fn ready_and_gone_end_immediately() {
        let mut poll = BoundedPoll::new(Duration::from_millis(10), 5);
        assert_eq!(
            poll.attempt(Probe::NotYet),
            PollOutcome::RetryIn(Duration::from_millis(10))
        );
        assert_eq!(poll.attempt(Probe::Ready), PollOutcome::Ready);

        let mut poll = BoundedPoll::new(Duration::from_millis(10), 5);
        assert_eq!(poll.attempt(Probe::Gone), PollOutcome::Abandoned);
    }

    #[test]
    fn zero_budget_still_checks_once() {
        let mut poll = BoundedPoll::new(Duration::from_millis(10), 0);
        assert_eq!(poll.max_attempts(), 1);
        assert_eq!(poll.attempt(Probe::NotYet), PollOutcome::Exhausted);
    }
}

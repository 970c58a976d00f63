//! Cycle throttle.
//!
//! The host scheduler may tick far more often than batch processing should
//! run. [`CycleClock`] decides whether a given tick is due: the first tick
//! always is, afterwards only once `interval` has elapsed since the last run.
//! Time is whatever the host passes in (wall or simulation clock); the clock
//! never reads the system time itself.

use chrono::{DateTime, TimeDelta, Utc};

/// Tracks when the last batch cycle ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleClock {
    /// Minimum spacing between runs.
    interval: TimeDelta,
    /// When the last cycle ran, `None` before the first.
    last_run: Option<DateTime<Utc>>,
    /// Number of cycles run so far.
    cycles: u64,
}

impl CycleClock {
    /// Create a clock that has never run.
    pub const fn new(interval: TimeDelta) -> Self {
        Self {
            interval,
            last_run: None,
            cycles: 0,
        }
    }

    /// Minimum spacing between runs.
    pub const fn interval(&self) -> TimeDelta {
        self.interval
    }

    /// When the last cycle ran.
    pub const fn last_run(&self) -> Option<DateTime<Utc>> {
        self.last_run
    }

    /// Number of cycles run so far.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether a cycle should run at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_run {
            None => true,
            Some(last) => last
                .checked_add_signed(self.interval)
                .is_some_and(|next| now >= next),
        }
    }

    /// Record that a cycle ran at `now`.
    pub const fn mark_run(&mut self, now: DateTime<Utc>) {
        self.last_run = Some(now);
        self.cycles = self.cycles.saturating_add(1);
    }

    /// Check and record in one step. Returns `true` if the cycle is due.
    pub fn try_start(&mut self, now: DateTime<Utc>) -> bool {
        let due = self.is_due(now);
        if due {
            self.mark_run(now);
        }
        due
    }

    /// Forget the last run.
    pub const fn reset(&mut self) {
        self.last_run = None;
        self.cycles = 0;
    }
}

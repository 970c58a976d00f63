//! Async scheduler loop.
//!
//! [`run_scheduler`] offers the engine a tick on a fixed tokio interval until
//! a stop is requested through [`SchedulerControl`]. The engine's own
//! [`CycleClock`](crate::clock::CycleClock) still decides whether each tick
//! runs a cycle, so a scheduler ticking faster than the configured interval
//! is harmless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tracing::info;

use crate::engine::{Engine, TickOutcome};
use crate::host::Host;

/// Shortest tick period the scheduler will use.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Shared stop switch for a running scheduler.
#[derive(Debug, Default)]
pub struct SchedulerControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,
    /// Wakes the loop when a stop is requested.
    stop_notify: Notify,
}

impl SchedulerControl {
    /// A control with no stop requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the scheduler to stop after the current tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Wait until a stop is requested. Returns immediately if one already was.
    pub async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }
}

/// Totals for one scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    /// Cycles that ran.
    pub cycles: u64,
    /// Ticks skipped by the throttle.
    pub throttled: u64,
    /// Rewards issued.
    pub grants: u64,
    /// Sum of all rewards issued.
    pub awarded: i64,
    /// Kills whose attribution faulted.
    pub failures: u64,
}

impl SchedulerSummary {
    fn absorb(&mut self, outcome: &TickOutcome) {
        let Some(report) = outcome.report() else {
            self.throttled = self.throttled.saturating_add(1);
            return;
        };
        self.cycles = self.cycles.saturating_add(1);
        for grant in &report.grants {
            self.grants = self.grants.saturating_add(1);
            self.awarded = self.awarded.saturating_add(grant.amount);
        }
        let failures = u64::try_from(report.failures.len()).unwrap_or(u64::MAX);
        self.failures = self.failures.saturating_add(failures);
    }
}

/// Tick `engine` against `host` using the wall clock until `control` stops.
pub async fn run_scheduler<H: Host>(
    engine: &mut Engine,
    host: &mut H,
    control: &SchedulerControl,
) -> SchedulerSummary {
    run_scheduler_with_clock(engine, host, control, Utc::now).await
}

/// Like [`run_scheduler`] but reads the time from `clock` on every tick.
pub async fn run_scheduler_with_clock<H, C>(
    engine: &mut Engine,
    host: &mut H,
    control: &SchedulerControl,
    mut clock: C,
) -> SchedulerSummary
where
    H: Host,
    C: FnMut() -> DateTime<Utc>,
{
    let period = engine
        .clock()
        .interval()
        .to_std()
        .map_or(MIN_PERIOD, |d| d.max(MIN_PERIOD));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(
        interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
        window_seconds = engine.window().num_seconds(),
        "Scheduler starting"
    );

    let mut summary = SchedulerSummary::default();
    while !control.is_stop_requested() {
        tokio::select! {
            _ = ticker.tick() => {}
            () = control.stopped() => break,
        }
        let outcome = engine.tick(clock(), host);
        summary.absorb(&outcome);
    }

    info!(
        cycles = summary.cycles,
        throttled = summary.throttled,
        grants = summary.grants,
        awarded = summary.awarded,
        failures = summary.failures,
        "Scheduler stopped"
    );
    summary
}

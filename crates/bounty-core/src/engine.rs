//! The batch attribution and distribution step.
//!
//! Each cycle runs three phases in a fixed order:
//!
//! 1. **Prune** -- expire ledger records older than the window.
//! 2. **Merge** -- refresh the roster snapshot, drain the intake queue,
//!    resolve every attacker, record the damage.
//! 3. **Attribute** -- drain the kill queue and distribute each bounty among
//!    hostile, reachable contributors.
//!
//! Merging strictly before attributing means a kill whose damage arrived in
//! the same cycle still sees that damage. A fault while attributing one kill
//! is logged and recorded in the [`CycleReport`]; it never stops the cycle.

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use bounty_ledger::DamageLedger;
use bounty_types::{EntityRef, KillId, KillSignal, RewardGrant, RosterEntry};

use crate::clock::CycleClock;
use crate::config::{ConfigError, EngineConfig};
use crate::distribution::{self, AttributionError};
use crate::host::Host;
use crate::queue::EventQueues;
use crate::resolver::IdentityResolver;

/// A kill whose attribution faulted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillFailure {
    /// The kill that failed.
    pub kill_id: KillId,
    /// The victim.
    pub victim: EntityRef,
    /// Human-readable victim name.
    pub victim_label: String,
    /// Description of the fault.
    pub reason: String,
}

/// What one batch cycle did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    /// 1-based cycle number.
    pub cycle: u64,
    /// The time the cycle ran at.
    pub at: DateTime<Utc>,
    /// Ledger records expired in the prune phase.
    pub pruned: usize,
    /// Damage notifications merged into the ledger.
    pub damage_merged: usize,
    /// Kill signals consumed.
    pub kills_processed: usize,
    /// Rewards issued, in processing order.
    pub grants: Vec<RewardGrant>,
    /// Kills whose attribution faulted.
    pub failures: Vec<KillFailure>,
}

/// Result of offering a tick to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The interval has not elapsed; nothing was drained.
    Throttled,
    /// A cycle ran.
    Ran(CycleReport),
}

impl TickOutcome {
    /// The report, if a cycle ran.
    pub const fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Throttled => None,
            Self::Ran(report) => Some(report),
        }
    }

    /// Consume into the report, if a cycle ran.
    pub fn into_report(self) -> Option<CycleReport> {
        match self {
            Self::Throttled => None,
            Self::Ran(report) => Some(report),
        }
    }
}

/// Owns the ledger and roster snapshot; the only consumer of the queues.
#[derive(Debug)]
pub struct Engine {
    /// Per-victim damage records.
    ledger: DamageLedger,
    /// Producer-side buffers, shared with host callbacks.
    queues: EventQueues,
    /// Cycle throttle.
    clock: CycleClock,
    /// How long damage stays eligible.
    window: TimeDelta,
    /// Connected players as of the current cycle.
    roster: Vec<RosterEntry>,
}

impl Engine {
    /// Create an engine with empty state.
    pub fn new(cycle_interval: TimeDelta, window: TimeDelta) -> Self {
        Self {
            ledger: DamageLedger::new(),
            queues: EventQueues::new(),
            clock: CycleClock::new(cycle_interval),
            window,
            roster: Vec::new(),
        }
    }

    /// Create an engine from the `engine` configuration section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero interval or window.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.cycle_interval()?, config.damage_window()?))
    }

    /// A producer handle for host callbacks.
    pub fn queues(&self) -> EventQueues {
        self.queues.clone()
    }

    /// The damage ledger.
    pub const fn ledger(&self) -> &DamageLedger {
        &self.ledger
    }

    /// The attribution window.
    pub const fn window(&self) -> TimeDelta {
        self.window
    }

    /// The cycle throttle.
    pub const fn clock(&self) -> &CycleClock {
        &self.clock
    }

    /// Drop all tracked damage, pending notifications and the roster
    /// snapshot, and forget when the last cycle ran.
    pub fn reset(&mut self) {
        self.ledger.clear();
        self.queues.clear();
        self.roster.clear();
        self.clock.reset();
        info!("Engine reset");
    }

    /// Offer a scheduler tick. Runs a cycle only if the interval has elapsed.
    pub fn tick<H: Host>(&mut self, now: DateTime<Utc>, host: &mut H) -> TickOutcome {
        if !self.clock.try_start(now) {
            return TickOutcome::Throttled;
        }
        TickOutcome::Ran(self.run_cycle(now, host))
    }

    fn run_cycle<H: Host>(&mut self, now: DateTime<Utc>, host: &mut H) -> CycleReport {
        let cycle = self.clock.cycles();

        // --- Phase 1: Prune ---
        let pruned = self.ledger.prune(now, self.window);

        // --- Phase 2: Merge ---
        self.roster = host.players();
        let damage_merged = self.merge_damage(&*host);

        // --- Phase 3: Attribute ---
        let kills = self.queues.drain_kills();
        let kills_processed = kills.len();
        let mut grants = Vec::new();
        let mut failures = Vec::new();
        for kill in kills {
            match self.attribute_and_distribute(&kill, now, host) {
                Ok(mut issued) => grants.append(&mut issued),
                Err(e) => {
                    warn!(
                        kill_id = %kill.id,
                        victim = %kill.victim,
                        victim_label = %kill.victim_label,
                        error = %e,
                        "Kill attribution failed"
                    );
                    failures.push(KillFailure {
                        kill_id: kill.id,
                        victim: kill.victim,
                        victim_label: kill.victim_label,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if damage_merged > 0 || kills_processed > 0 {
            info!(
                cycle,
                pruned,
                damage_merged,
                kills_processed,
                grants = grants.len(),
                failures = failures.len(),
                tracked_victims = self.ledger.victim_count(),
                "Cycle complete"
            );
        } else {
            debug!(cycle, pruned, "Cycle idle");
        }

        CycleReport {
            cycle,
            at: now,
            pruned,
            damage_merged,
            kills_processed,
            grants,
            failures,
        }
    }

    fn merge_damage<H: Host>(&mut self, host: &H) -> usize {
        let pending = self.queues.drain_damage();
        let resolver = IdentityResolver::new(&self.roster, host);
        for damage in &pending {
            let identity = resolver.resolve(damage.attacker);
            self.ledger
                .record(damage.victim, identity, damage.amount, damage.observed_at);
        }
        pending.len()
    }

    /// Distribute one kill's bounty. The victim's ledger entry is removed
    /// whether or not this succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AttributionError`] on non-finite damage or if the damage
    /// total overflows. Nothing is granted for the kill in that case.
    pub fn attribute_and_distribute<H: Host>(
        &mut self,
        kill: &KillSignal,
        now: DateTime<Utc>,
        host: &mut H,
    ) -> Result<Vec<RewardGrant>, AttributionError> {
        let result = self.distribute(kill, now, host);
        self.ledger.remove(kill.victim);
        result
    }

    fn distribute<H: Host>(
        &mut self,
        kill: &KillSignal,
        now: DateTime<Utc>,
        host: &mut H,
    ) -> Result<Vec<RewardGrant>, AttributionError> {
        if let Some(cutoff) = now.checked_sub_signed(self.window) {
            self.ledger.prune_victim(kill.victim, cutoff);
        }
        if !self.ledger.is_tracking(kill.victim) {
            debug!(kill_id = %kill.id, victim_label = %kill.victim_label, "No tracked damage for kill");
            return Ok(Vec::new());
        }
        debug!(
            kill_id = %kill.id,
            victim_label = %kill.victim_label,
            total_damage = self.ledger.total_damage(kill.victim),
            "Attributing kill"
        );

        let mut recipients = Vec::new();
        let mut hostile = Vec::new();
        for contribution in self.ledger.aggregate(kill.victim) {
            let identity = contribution.attacker_identity;
            if identity.is_unknown() || !host.is_hostile(identity, kill.victim_owner_identity) {
                continue;
            }
            if let Some(recipient) = host.recipient(identity) {
                recipients.push(recipient);
                hostile.push(contribution);
            }
        }

        let Some(shares) = distribution::compute_shares(&hostile, kill.reward_pool)? else {
            debug!(kill_id = %kill.id, victim_label = %kill.victim_label, "No hostile damage for kill");
            return Ok(Vec::new());
        };

        let mut grants = Vec::new();
        for (share, recipient) in shares.into_iter().zip(recipients) {
            if share.amount <= 0 {
                continue;
            }
            host.grant(share.identity, share.amount);
            if let Err(e) = host.notify(&kill.victim_label, share.amount, &recipient.display_name) {
                debug!(kill_id = %kill.id, error = %e, "Grant notification not delivered");
            }
            info!(
                kill_id = %kill.id,
                victim_label = %kill.victim_label,
                recipient = %share.identity,
                recipient_label = %recipient.display_name,
                amount = share.amount,
                "Bounty granted"
            );
            grants.push(RewardGrant {
                kill_id: kill.id,
                victim: kill.victim,
                victim_label: kill.victim_label.clone(),
                recipient: share.identity,
                recipient_label: recipient.display_name,
                amount: share.amount,
            });
        }
        Ok(grants)
    }
}

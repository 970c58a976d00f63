//! The damage ledger: per-victim, time-stamped damage records.
//!
//! The [`DamageLedger`] holds one record list per tracked victim. It is owned
//! by a single batch consumer (the engine cycle); nothing here is shared
//! across threads.
//!
//! # Design
//!
//! - **Append on ingest**: records are never edited, only appended or removed.
//! - **Windowed**: [`prune`](DamageLedger::prune) drops records strictly older
//!   than `now - window` and forgets victims left with no records.
//! - **Unclamped**: amounts pass through exactly as the host reported them.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};

use bounty_types::{AttackerContribution, DamageRecord, EntityRef, IdentityId};

use crate::contribution::group_by_attacker;

/// Per-victim damage history within the attribution window.
#[derive(Debug, Default, Clone)]
pub struct DamageLedger {
    /// Records keyed by victim, in arrival order.
    entries: BTreeMap<EntityRef, Vec<DamageRecord>>,
}

impl DamageLedger {
    /// Create a new empty ledger.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Number of victims currently tracked.
    pub fn victim_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of records across all victims.
    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Whether the ledger tracks nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `victim` has at least one record.
    pub fn is_tracking(&self, victim: EntityRef) -> bool {
        self.entries.get(&victim).is_some_and(|r| !r.is_empty())
    }

    /// The records held for `victim`, in arrival order.
    pub fn records(&self, victim: EntityRef) -> &[DamageRecord] {
        self.entries.get(&victim).map_or(&[], Vec::as_slice)
    }

    /// Append a damage record, creating the victim's entry if absent.
    pub fn record(
        &mut self,
        victim: EntityRef,
        attacker_identity: IdentityId,
        amount: f32,
        observed_at: DateTime<Utc>,
    ) {
        self.entries.entry(victim).or_default().push(DamageRecord {
            attacker_identity,
            victim,
            amount,
            observed_at,
        });
    }

    /// Remove every record strictly older than `now - window`.
    ///
    /// Victims left with no records are forgotten. Returns the number of
    /// records removed.
    pub fn prune(&mut self, now: DateTime<Utc>, window: TimeDelta) -> usize {
        let Some(cutoff) = now.checked_sub_signed(window) else {
            return 0;
        };
        self.prune_before(cutoff)
    }

    /// Remove every record observed before `cutoff`. Records exactly at the
    /// cutoff are kept.
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let before = self.record_count();
        self.entries.retain(|_, records| {
            records.retain(|r| r.observed_at >= cutoff);
            !records.is_empty()
        });
        let removed = before.saturating_sub(self.record_count());
        if removed > 0 {
            tracing::debug!(removed, %cutoff, "Pruned expired damage records");
        }
        removed
    }

    /// Like [`prune_before`](Self::prune_before) but for a single victim.
    pub fn prune_victim(&mut self, victim: EntityRef, cutoff: DateTime<Utc>) -> usize {
        let Some(records) = self.entries.get_mut(&victim) else {
            return 0;
        };
        let before = records.len();
        records.retain(|r| r.observed_at >= cutoff);
        let removed = before.saturating_sub(records.len());
        if records.is_empty() {
            self.entries.remove(&victim);
        }
        removed
    }

    /// Group the victim's records by attacker and sum the amounts.
    ///
    /// Returns an empty list if the victim is untracked. Results are ordered
    /// by attacker identity.
    pub fn aggregate(&self, victim: EntityRef) -> Vec<AttackerContribution> {
        group_by_attacker(self.records(victim))
    }

    /// Sum of every record held for `victim`, regardless of attacker.
    pub fn total_damage(&self, victim: EntityRef) -> f64 {
        self.records(victim)
            .iter()
            .map(|r| f64::from(r.amount))
            .sum()
    }

    /// Drop the victim's entry entirely. Removing an untracked victim is a
    /// no-op. Returns the records that were held.
    pub fn remove(&mut self, victim: EntityRef) -> Vec<DamageRecord> {
        self.entries.remove(&victim).unwrap_or_default()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

//! Intake and kill queues.
//!
//! Host notifications arrive at arbitrary frequency, possibly from another
//! execution context, and must never touch the ledger directly. They append
//! to these buffers instead; the engine swaps each buffer out in one locked
//! step at the start of its cycle. Damage is always drained before kills in
//! the same cycle, so a kill can never be attributed before the hits that
//! caused it have been merged.
//!
//! [`EventQueues`] is a cheap handle: clones share the same buffers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use bounty_types::{EntityRef, IdentityId, KillId, KillSignal, PendingDamage};

/// Shared buffers behind an [`EventQueues`] handle.
#[derive(Debug, Default)]
struct Buffers {
    /// Raw damage notifications since the last drain.
    damage: Mutex<Vec<PendingDamage>>,
    /// Kill signals since the last drain.
    kills: Mutex<Vec<KillSignal>>,
}

/// Producer/consumer handle for pending damage and kill notifications.
#[derive(Debug, Clone, Default)]
pub struct EventQueues {
    buffers: Arc<Buffers>,
}

/// Lock a buffer. Buffers hold plain values, so a panic in another holder
/// cannot leave them half-written; recover the guard instead of failing.
fn lock<T>(buffer: &Mutex<Vec<T>>) -> MutexGuard<'_, Vec<T>> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EventQueues {
    /// Create empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw damage notification.
    pub fn on_damage(
        &self,
        victim: EntityRef,
        attacker: EntityRef,
        amount: f32,
        observed_at: DateTime<Utc>,
    ) {
        self.push_damage(PendingDamage {
            victim,
            attacker,
            amount,
            observed_at,
        });
    }

    /// Queue a pre-built damage notification.
    pub fn push_damage(&self, pending: PendingDamage) {
        lock(&self.buffers.damage).push(pending);
    }

    /// Queue a kill. Returns the id assigned to it.
    pub fn on_destroyed(
        &self,
        victim: EntityRef,
        victim_owner_identity: IdentityId,
        reward_pool: i64,
        victim_label: impl Into<String>,
    ) -> KillId {
        let signal = KillSignal::new(victim, victim_owner_identity, reward_pool, victim_label);
        let id = signal.id;
        self.push_kill(signal);
        id
    }

    /// Queue a pre-built kill signal.
    pub fn push_kill(&self, signal: KillSignal) {
        lock(&self.buffers.kills).push(signal);
    }

    /// Take every pending damage notification, leaving the buffer empty.
    pub fn drain_damage(&self) -> Vec<PendingDamage> {
        std::mem::take(&mut *lock(&self.buffers.damage))
    }

    /// Take every pending kill, leaving the buffer empty.
    pub fn drain_kills(&self) -> Vec<KillSignal> {
        std::mem::take(&mut *lock(&self.buffers.kills))
    }

    /// Number of damage notifications waiting.
    pub fn pending_damage(&self) -> usize {
        lock(&self.buffers.damage).len()
    }

    /// Number of kills waiting.
    pub fn pending_kills(&self) -> usize {
        lock(&self.buffers.kills).len()
    }

    /// Discard everything pending.
    pub fn clear(&self) {
        lock(&self.buffers.damage).clear();
        lock(&self.buffers.kills).clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn drain_takes_everything_once() {
        let queues = EventQueues::new();
        let now = Utc::now();
        queues.on_damage(EntityRef::new(1), EntityRef::new(2), 5.0, now);
        queues.on_damage(EntityRef::new(1), EntityRef::new(3), 6.0, now);

        let drained = queues.drain_damage();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained.first().map(|d| d.attacker), Some(EntityRef::new(2)));
        assert!(queues.drain_damage().is_empty());
    }

    #[test]
    fn clones_share_buffers() {
        let producer = EventQueues::new();
        let consumer = producer.clone();
        let id = producer.on_destroyed(EntityRef::new(9), IdentityId::new(4), 100, "Drone");

        assert_eq!(consumer.pending_kills(), 1);
        let kills = consumer.drain_kills();
        assert_eq!(kills.first().map(|k| k.id), Some(id));
        assert_eq!(producer.pending_kills(), 0);
    }

    #[test]
    fn concurrent_producers_lose_nothing() {
        let queues = EventQueues::new();
        let now = Utc::now();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let q = queues.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        q.on_damage(EntityRef::new(t), EntityRef::new(i), 1.0, now);
                    }
                })
            })
            .collect();

        let mut drained = 0;
        for handle in handles {
            handle.join().unwrap();
            drained += queues.drain_damage().len();
        }
        drained += queues.drain_damage().len();
        assert_eq!(drained, 1000);
    }

    #[test]
    fn clear_discards_pending() {
        let queues = EventQueues::new();
        queues.on_damage(EntityRef::new(1), EntityRef::new(2), 1.0, Utc::now());
        let _ = queues.on_destroyed(EntityRef::new(1), IdentityId::UNKNOWN, 10, "x");
        queues.clear();
        assert_eq!(queues.pending_damage(), 0);
        assert_eq!(queues.pending_kills(), 0);
    }

    #[test]
    fn poisoned_buffer_keeps_working() {
        let queues = EventQueues::new();
        let now = Utc::now();
        queues.on_damage(EntityRef::new(1), EntityRef::new(2), 5.0, now);

        let holder = queues.clone();
        let crashed = thread::spawn(move || {
            let _guard = holder.buffers.damage.lock().unwrap();
            panic!("holder crashed");
        })
        .join();
        assert!(crashed.is_err());
        assert!(queues.buffers.damage.is_poisoned());

        queues.on_damage(EntityRef::new(1), EntityRef::new(3), 6.0, now);
        let drained = queues.drain_damage();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained.get(1).map(|d| d.attacker), Some(EntityRef::new(3)));
        assert_eq!(queues.pending_damage(), 0);
    }
}

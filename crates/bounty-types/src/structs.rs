//! Damage, kill, and reward value types.
//!
//! Everything here is plain data: immutable once built, cheap to clone, and
//! serializable so reports can be logged or written out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EntityRef, IdentityId, KillId};

/// One attributed damage event, as stored by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    /// Who dealt the damage (may be [`IdentityId::UNKNOWN`]).
    pub attacker_identity: IdentityId,
    /// What was damaged.
    pub victim: EntityRef,
    /// Damage amount as reported by the host. Not clamped.
    pub amount: f32,
    /// When the damage was observed.
    pub observed_at: DateTime<Utc>,
}

/// A raw damage notification awaiting identity resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingDamage {
    /// What was damaged.
    pub victim: EntityRef,
    /// Opaque handle to whatever dealt the damage.
    pub attacker: EntityRef,
    /// Damage amount as reported by the host.
    pub amount: f32,
    /// When the damage was observed.
    pub observed_at: DateTime<Utc>,
}

/// Cumulative damage by one attacker against one victim. Derived on demand,
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackerContribution {
    /// The attacker.
    pub attacker_identity: IdentityId,
    /// Sum of all in-window damage by this attacker.
    pub cumulative_damage: f64,
}

/// A terminal "object destroyed" notification with a configured bounty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillSignal {
    /// Correlation id for logs and reports.
    pub id: KillId,
    /// The destroyed object.
    pub victim: EntityRef,
    /// Primary owner of the victim, used for hostility checks.
    pub victim_owner_identity: IdentityId,
    /// Total reward to divide among hostile contributors.
    pub reward_pool: i64,
    /// Human-readable victim name for notifications.
    pub victim_label: String,
}

impl KillSignal {
    /// Build a signal with a fresh [`KillId`].
    pub fn new(
        victim: EntityRef,
        victim_owner_identity: IdentityId,
        reward_pool: i64,
        victim_label: impl Into<String>,
    ) -> Self {
        Self {
            id: KillId::new(),
            victim,
            victim_owner_identity,
            reward_pool,
            victim_label: victim_label.into(),
        }
    }
}

/// A reward issued to one contributor for one kill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    /// The kill this grant belongs to.
    pub kill_id: KillId,
    /// The destroyed object.
    pub victim: EntityRef,
    /// Human-readable victim name.
    pub victim_label: String,
    /// Who received the reward.
    pub recipient: IdentityId,
    /// Recipient display name.
    pub recipient_label: String,
    /// Amount granted. Always positive.
    pub amount: i64,
}

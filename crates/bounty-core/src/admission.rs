//! Host-shaped entry points that turn raw block callbacks into queue entries.
//!
//! The host reports damage and destruction at block granularity, but bounties
//! are tracked per grid. Damage to any block is credited against its parent
//! grid. A destroyed block only produces a [`KillSignal`](bounty_types::KillSignal)
//! if it is a bounty-capable remote control of an admitted subtype whose
//! metadata configures a readable reward pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bounty_types::{BlockClass, EntityRef, IdentityId, KillId};

use crate::bounty::read_bounty;
use crate::config::AdmissionConfig;
use crate::host::EntityDirectory;
use crate::queue::EventQueues;

/// A block-destroyed callback as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyedBlock {
    /// Unique host name of the destroyed block.
    pub entity_name: String,
    /// Name of the grid the block belonged to.
    #[serde(default)]
    pub grid_name: String,
    /// Host type identifier.
    #[serde(default)]
    pub type_id: String,
    /// Host subtype identifier.
    #[serde(default)]
    pub subtype_id: String,
}

/// Queue damage dealt to `block` against its parent grid.
///
/// Returns the grid the damage was credited to, or `None` if `block` is
/// unknown or not mounted on a grid.
pub fn on_block_damaged(
    queues: &EventQueues,
    directory: &dyn EntityDirectory,
    block: EntityRef,
    attacker: EntityRef,
    amount: f32,
    observed_at: DateTime<Utc>,
) -> Option<EntityRef> {
    let Some(grid) = directory.lookup(block).and_then(|p| p.parent_grid()) else {
        tracing::trace!(%block, "Damaged object is not on a grid, ignoring");
        return None;
    };
    queues.on_damage(grid, attacker, amount, observed_at);
    Some(grid)
}

/// Queue a kill for a destroyed block if it carries a bounty.
///
/// Returns the id of the queued kill, or `None` if the block was not
/// admitted.
pub fn on_block_destroyed(
    queues: &EventQueues,
    directory: &dyn EntityDirectory,
    config: &AdmissionConfig,
    event: &DestroyedBlock,
) -> Option<KillId> {
    if event.entity_name.is_empty() {
        return None;
    }
    let Some(profile) = directory.lookup_by_name(&event.entity_name) else {
        tracing::debug!(entity_name = %event.entity_name, "Destroyed block not found");
        return None;
    };
    let block = profile.block()?;
    if block.class != BlockClass::RemoteControl
        || !config.valid_subtypes.iter().any(|s| *s == event.subtype_id)
    {
        tracing::trace!(
            entity_name = %event.entity_name,
            subtype_id = %event.subtype_id,
            "Destroyed block cannot carry a bounty"
        );
        return None;
    }

    let pool = match read_bounty(&block.metadata, &config.bounty_key) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::debug!(entity_name = %event.entity_name, error = %e, "No bounty configured");
            return None;
        }
    };

    let grid = directory.lookup(block.grid);
    let owner = grid
        .as_ref()
        .and_then(bounty_types::EntityProfile::primary_owner)
        .unwrap_or(IdentityId::UNKNOWN);
    let label = grid
        .map(|g| g.display_name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| event.grid_name.clone());

    let id = queues.on_destroyed(block.grid, owner, pool, label.clone());
    tracing::debug!(
        kill_id = %id,
        victim = %block.grid,
        owner = %owner,
        pool,
        label = %label,
        "Kill queued"
    );
    Some(id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use bounty_types::{BlockInfo, Capability, EntityProfile};

    use super::*;

    #[derive(Default)]
    struct Directory(BTreeMap<EntityRef, EntityProfile>);

    impl Directory {
        fn add(&mut self, profile: EntityProfile) {
            self.0.insert(profile.entity, profile);
        }
    }

    impl EntityDirectory for Directory {
        fn lookup(&self, entity: EntityRef) -> Option<EntityProfile> {
            self.0.get(&entity).cloned()
        }

        fn lookup_by_name(&self, name: &str) -> Option<EntityProfile> {
            self.0.values().find(|p| p.name.as_deref() == Some(name)).cloned()
        }
    }

    const GRID: EntityRef = EntityRef::new(10);
    const REMOTE: EntityRef = EntityRef::new(11);
    const ARMOR: EntityRef = EntityRef::new(12);

    fn drone(class: BlockClass, metadata: &str) -> Directory {
        let mut dir = Directory::default();
        dir.add(EntityProfile::new(GRID, "Raider Drone").with(Capability::Grid {
            primary_owners: vec![IdentityId::new(77)],
        }));
        dir.add(
            EntityProfile::new(REMOTE, "Remote Control")
                .named("RC-11")
                .with(Capability::Block(BlockInfo {
                    grid: GRID,
                    class,
                    subtype_id: "RivalAIRemoteControlSmall".to_owned(),
                    metadata: metadata.to_owned(),
                })),
        );
        dir.add(EntityProfile::new(ARMOR, "Armor").with(Capability::Block(BlockInfo {
            grid: GRID,
            class: BlockClass::Other,
            subtype_id: String::new(),
            metadata: String::new(),
        })));
        dir
    }

    fn destroyed(subtype: &str) -> DestroyedBlock {
        DestroyedBlock {
            entity_name: "RC-11".to_owned(),
            grid_name: "fallback".to_owned(),
            type_id: "MyObjectBuilder_RemoteControl".to_owned(),
            subtype_id: subtype.to_owned(),
        }
    }

    #[test]
    fn damage_is_credited_to_parent_grid() {
        let dir = drone(BlockClass::RemoteControl, "");
        let queues = EventQueues::new();
        let grid = on_block_damaged(&queues, &dir, ARMOR, EntityRef::new(99), 12.0, Utc::now());
        assert_eq!(grid, Some(GRID));
        let pending = queues.drain_damage();
        assert_eq!(pending.first().map(|d| d.victim), Some(GRID));
    }

    #[test]
    fn damage_to_loose_objects_is_ignored() {
        let mut dir = drone(BlockClass::RemoteControl, "");
        dir.add(EntityProfile::new(EntityRef::new(50), "Floating crate"));
        let queues = EventQueues::new();
        assert!(on_block_damaged(&queues, &dir, EntityRef::new(50), EntityRef::new(1), 1.0, Utc::now()).is_none());
        assert!(on_block_damaged(&queues, &dir, EntityRef::new(404), EntityRef::new(1), 1.0, Utc::now()).is_none());
        assert_eq!(queues.pending_damage(), 0);
    }

    #[test]
    fn admitted_kill_targets_grid_with_owner_and_label() {
        let dir = drone(BlockClass::RemoteControl, "BountyOnKill=500;");
        let queues = EventQueues::new();
        let id = on_block_destroyed(
            &queues,
            &dir,
            &AdmissionConfig::default(),
            &destroyed("RivalAIRemoteControlSmall"),
        );
        assert!(id.is_some());

        let kills = queues.drain_kills();
        let kill = kills.first().unwrap();
        assert_eq!(kill.id, id.unwrap());
        assert_eq!(kill.victim, GRID);
        assert_eq!(kill.victim_owner_identity, IdentityId::new(77));
        assert_eq!(kill.reward_pool, 500);
        assert_eq!(kill.victim_label, "Raider Drone");
    }

    #[test]
    fn missing_bounty_queues_nothing() {
        let dir = drone(BlockClass::RemoteControl, "Behavior=Fighter;");
        let queues = EventQueues::new();
        let id = on_block_destroyed(
            &queues,
            &dir,
            &AdmissionConfig::default(),
            &destroyed("RivalAIRemoteControlSmall"),
        );
        assert!(id.is_none());
        assert_eq!(queues.pending_kills(), 0);
    }

    #[test]
    fn malformed_bounty_queues_nothing() {
        let dir = drone(BlockClass::RemoteControl, "BountyOnKill=plenty;");
        let queues = EventQueues::new();
        assert!(
            on_block_destroyed(&queues, &dir, &AdmissionConfig::default(), &destroyed("RivalAIRemoteControlSmall"))
                .is_none()
        );
    }

    #[test]
    fn unlisted_subtype_or_class_is_rejected() {
        let queues = EventQueues::new();
        let config = AdmissionConfig::default();

        let dir = drone(BlockClass::RemoteControl, "BountyOnKill=500;");
        assert!(on_block_destroyed(&queues, &dir, &config, &destroyed("LargeBlockRemoteControl")).is_none());

        let dir = drone(BlockClass::Turret, "BountyOnKill=500;");
        assert!(on_block_destroyed(&queues, &dir, &config, &destroyed("RivalAIRemoteControlSmall")).is_none());

        assert_eq!(queues.pending_kills(), 0);
    }

    #[test]
    fn empty_or_unknown_name_is_ignored() {
        let dir = drone(BlockClass::RemoteControl, "BountyOnKill=500;");
        let queues = EventQueues::new();
        let config = AdmissionConfig::default();

        let mut event = destroyed("RivalAIRemoteControlSmall");
        event.entity_name = String::new();
        assert!(on_block_destroyed(&queues, &dir, &config, &event).is_none());

        event.entity_name = "RC-404".to_owned();
        assert!(on_block_destroyed(&queues, &dir, &config, &event).is_none());
    }

    #[test]
    fn vanished_grid_falls_back_to_reported_name() {
        let mut dir = drone(BlockClass::RemoteControl, "BountyOnKill=5;");
        dir.0.remove(&GRID);
        let queues = EventQueues::new();
        on_block_destroyed(&queues, &dir, &AdmissionConfig::default(), &destroyed("RivalAIRemoteControlSmall"))
            .unwrap();
        let kills = queues.drain_kills();
        let kill = kills.first().unwrap();
        assert_eq!(kill.victim_owner_identity, IdentityId::UNKNOWN);
        assert_eq!(kill.victim_label, "fallback");
    }
}

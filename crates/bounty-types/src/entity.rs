//! Capability-tagged descriptions of host objects.
//!
//! The host's object model is a zoo: grids own blocks, blocks may be turrets,
//! drones have remote controllers, characters carry hand-held weapons. Rather
//! than mirror that taxonomy, the host describes an object as an
//! [`EntityProfile`] listing whichever [`Capability`] values it exposes, and
//! consumers pick out the ones they care about.

use serde::{Deserialize, Serialize};

use crate::ids::{EntityRef, IdentityId};

/// Broad class of a block, as far as bounty handling cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockClass {
    /// A remote-control block; the only class that can carry a bounty.
    RemoteControl,
    /// A turret or other stationary weapon block.
    Turret,
    /// Anything else.
    Other,
}

/// Block membership and metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// The grid this block is mounted on.
    pub grid: EntityRef,
    /// Broad class of the block.
    pub class: BlockClass,
    /// Host subtype identifier (e.g. `RivalAIRemoteControlLarge`).
    #[serde(default)]
    pub subtype_id: String,
    /// Free-text metadata the owner attached to the block.
    #[serde(default)]
    pub metadata: String,
}

/// One ownership-relevant capability an object exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "capability", rename_all = "snake_case")]
pub enum Capability {
    /// The object is a composite structure (grid).
    Grid {
        /// Majority owners, most significant first. May be empty.
        #[serde(default)]
        primary_owners: Vec<IdentityId>,
    },
    /// The object is a sub-component of a grid.
    Block(BlockInfo),
    /// The object has a designated controller (remote-piloted or AI unit).
    Controllable {
        /// Identity currently in control.
        controlling_identity: IdentityId,
    },
    /// The object is a stationary weapon with a fixed owner.
    OwnedWeapon {
        /// Owning identity.
        owner_identity: IdentityId,
    },
    /// The object is a hand-held weapon.
    HandheldWeapon {
        /// Identity carrying the weapon.
        wielder_identity: IdentityId,
    },
}

/// Queryable description of a host object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProfile {
    /// The object being described.
    pub entity: EntityRef,
    /// Unique host name, if the object has one.
    #[serde(default)]
    pub name: Option<String>,
    /// Human-readable label.
    #[serde(default)]
    pub display_name: String,
    /// Capabilities the object exposes.
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl EntityProfile {
    /// Create a profile with no capabilities.
    pub fn new(entity: EntityRef, display_name: impl Into<String>) -> Self {
        Self {
            entity,
            name: None,
            display_name: display_name.into(),
            capabilities: Vec::new(),
        }
    }

    /// Set the unique host name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add a capability.
    #[must_use]
    pub fn with(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    /// Primary owners if this object is a grid.
    pub fn grid_owners(&self) -> Option<&[IdentityId]> {
        self.capabilities.iter().find_map(|c| match c {
            Capability::Grid { primary_owners } => Some(primary_owners.as_slice()),
            _ => None,
        })
    }

    /// First primary owner if this object is a grid with one recorded.
    pub fn primary_owner(&self) -> Option<IdentityId> {
        self.grid_owners()
            .and_then(|owners| owners.first().copied())
            .filter(|id| !id.is_unknown())
    }

    /// Block details if this object is a sub-component of a grid.
    pub fn block(&self) -> Option<&BlockInfo> {
        self.capabilities.iter().find_map(|c| match c {
            Capability::Block(info) => Some(info),
            _ => None,
        })
    }

    /// The parent grid if this object is a block.
    pub fn parent_grid(&self) -> Option<EntityRef> {
        self.block().map(|b| b.grid)
    }

    /// Designated controller, if any.
    pub fn controlling_identity(&self) -> Option<IdentityId> {
        self.capabilities.iter().find_map(|c| match c {
            Capability::Controllable {
                controlling_identity,
            } => Some(*controlling_identity),
            _ => None,
        })
    }

    /// Fixed weapon owner, if any.
    pub fn owner_identity(&self) -> Option<IdentityId> {
        self.capabilities.iter().find_map(|c| match c {
            Capability::OwnedWeapon { owner_identity } => Some(*owner_identity),
            _ => None,
        })
    }

    /// Hand-held weapon carrier, if any.
    pub fn wielder_identity(&self) -> Option<IdentityId> {
        self.capabilities.iter().find_map(|c| match c {
            Capability::HandheldWeapon { wielder_identity } => Some(*wielder_identity),
            _ => None,
        })
    }
}

/// A connected player as seen by the roster snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The player's identity.
    pub identity: IdentityId,
    /// Player display name.
    #[serde(default)]
    pub display_name: String,
    /// The player's avatar (character), if spawned.
    #[serde(default)]
    pub avatar: Option<EntityRef>,
    /// The object the player is currently piloting, if any.
    #[serde(default)]
    pub controlled: Option<EntityRef>,
}

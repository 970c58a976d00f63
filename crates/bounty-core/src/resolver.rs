//! Attacker identity resolution.
//!
//! Damage arrives tagged with an opaque [`EntityRef`]: a character, a turret
//! block, a drone, a rifle. Each exposes ownership differently, so resolution
//! runs an ordered chain of [`Strategy`] values and takes the first one that
//! yields a known identity. Live bindings come first: a grid being piloted is
//! credited to its pilot, not to the grid's nominal owner.
//!
//! | # | Strategy | Source |
//! |---|----------|--------|
//! | 1 | `player_avatar` | roster: attacker is a player's character |
//! | 2 | `player_pilot` | roster: attacker (or its grid) is piloted by a player |
//! | 3 | `grid_owner` | attacker is a grid with a primary owner |
//! | 4 | `parent_grid_owner` | attacker is a block on such a grid |
//! | 5 | `controller` | attacker has a designated controlling identity |
//! | 6 | `weapon_owner` | attacker is a stationary weapon with an owner |
//! | 7 | `wielder` | attacker is a hand-held weapon |
//!
//! If nothing matches the result is [`IdentityId::UNKNOWN`]. A strategy whose
//! capability is present but reports identity `0` counts as no match.

use bounty_types::{EntityProfile, EntityRef, IdentityId, RosterEntry};

use crate::host::EntityDirectory;

/// Everything a strategy may consult.
pub struct ResolutionContext<'a> {
    /// Roster snapshot taken at the start of the cycle.
    pub roster: &'a [RosterEntry],
    /// Host object lookup.
    pub directory: &'a dyn EntityDirectory,
}

impl core::fmt::Debug for ResolutionContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("roster", &self.roster.len())
            .finish_non_exhaustive()
    }
}

/// Signature of a strategy extractor. `profile` is `None` when the host no
/// longer knows the attacker.
pub type Extractor =
    fn(&ResolutionContext<'_>, EntityRef, Option<&EntityProfile>) -> Option<IdentityId>;

/// One step in the fallback chain.
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    /// Name used in trace logs.
    pub name: &'static str,
    /// Attempts to extract an identity.
    pub extract: Extractor,
}

/// The default chain, most specific binding first.
pub const DEFAULT_CHAIN: [Strategy; 7] = [
    Strategy {
        name: "player_avatar",
        extract: player_avatar,
    },
    Strategy {
        name: "player_pilot",
        extract: player_pilot,
    },
    Strategy {
        name: "grid_owner",
        extract: grid_owner,
    },
    Strategy {
        name: "parent_grid_owner",
        extract: parent_grid_owner,
    },
    Strategy {
        name: "controller",
        extract: controller,
    },
    Strategy {
        name: "weapon_owner",
        extract: weapon_owner,
    },
    Strategy {
        name: "wielder",
        extract: wielder,
    },
];

fn player_avatar(
    ctx: &ResolutionContext<'_>,
    attacker: EntityRef,
    _: Option<&EntityProfile>,
) -> Option<IdentityId> {
    ctx.roster
        .iter()
        .find(|p| p.avatar == Some(attacker))
        .map(|p| p.identity)
}

fn player_pilot(
    ctx: &ResolutionContext<'_>,
    attacker: EntityRef,
    profile: Option<&EntityProfile>,
) -> Option<IdentityId> {
    let grid = profile.and_then(EntityProfile::parent_grid);
    ctx.roster
        .iter()
        .find(|p| p.controlled.is_some() && (p.controlled == Some(attacker) || p.controlled == grid))
        .map(|p| p.identity)
}

fn grid_owner(
    _: &ResolutionContext<'_>,
    _: EntityRef,
    profile: Option<&EntityProfile>,
) -> Option<IdentityId> {
    profile.and_then(EntityProfile::primary_owner)
}

fn parent_grid_owner(
    ctx: &ResolutionContext<'_>,
    _: EntityRef,
    profile: Option<&EntityProfile>,
) -> Option<IdentityId> {
    let grid = profile.and_then(EntityProfile::parent_grid)?;
    ctx.directory.lookup(grid)?.primary_owner()
}

fn controller(
    _: &ResolutionContext<'_>,
    _: EntityRef,
    profile: Option<&EntityProfile>,
) -> Option<IdentityId> {
    profile.and_then(EntityProfile::controlling_identity)
}

fn weapon_owner(
    _: &ResolutionContext<'_>,
    _: EntityRef,
    profile: Option<&EntityProfile>,
) -> Option<IdentityId> {
    profile.and_then(EntityProfile::owner_identity)
}

fn wielder(
    _: &ResolutionContext<'_>,
    _: EntityRef,
    profile: Option<&EntityProfile>,
) -> Option<IdentityId> {
    profile.and_then(EntityProfile::wielder_identity)
}

/// Resolves attacker references against one roster snapshot.
#[derive(Debug)]
pub struct IdentityResolver<'a> {
    ctx: ResolutionContext<'a>,
    chain: &'a [Strategy],
}

impl<'a> IdentityResolver<'a> {
    /// Resolver using [`DEFAULT_CHAIN`].
    pub const fn new(roster: &'a [RosterEntry], directory: &'a dyn EntityDirectory) -> Self {
        Self::with_chain(roster, directory, &DEFAULT_CHAIN)
    }

    /// Resolver using a custom chain.
    pub const fn with_chain(
        roster: &'a [RosterEntry],
        directory: &'a dyn EntityDirectory,
        chain: &'a [Strategy],
    ) -> Self {
        Self {
            ctx: ResolutionContext { roster, directory },
            chain,
        }
    }

    /// Resolve `attacker` to an identity. Never fails.
    pub fn resolve(&self, attacker: EntityRef) -> IdentityId {
        let profile = self.ctx.directory.lookup(attacker);
        for strategy in self.chain {
            if let Some(identity) = (strategy.extract)(&self.ctx, attacker, profile.as_ref())
                .filter(|id| !id.is_unknown())
            {
                tracing::trace!(%attacker, %identity, strategy = strategy.name, "Attacker resolved");
                return identity;
            }
        }
        tracing::trace!(%attacker, "Attacker unresolved");
        IdentityId::UNKNOWN
    }
}

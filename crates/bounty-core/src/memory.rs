//! In-memory host built from plain data.
//!
//! [`StaticHost`] implements every collaborator trait from maps and lists
//! that can be written by hand or loaded from YAML. Used by the tests and by
//! the replay binary.
//!
//! Hostility follows faction membership: two distinct, known identities are
//! hostile unless they share a faction tag or their factions are listed as
//! allied. Identity `0` (no owner) is never hostile to anyone. Only
//! identities on the roster can receive rewards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bounty_types::{EntityProfile, EntityRef, IdentityId, RosterEntry};

use crate::host::{
    EntityDirectory, HostilityFilter, Notifier, NotifyError, PlayerRoster, Recipient, RewardSink,
};

/// A host whose world is a fixed set of profiles and players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticHost {
    /// Every object the directory knows about.
    #[serde(default)]
    pub entities: Vec<EntityProfile>,

    /// Connected players.
    #[serde(default)]
    pub roster: Vec<RosterEntry>,

    /// Faction tag per identity. Identities without one are loners.
    #[serde(default)]
    pub factions: BTreeMap<IdentityId, String>,

    /// Pairs of faction tags at peace with each other.
    #[serde(default)]
    pub alliances: Vec<(String, String)>,

    /// Current balance per identity. Grants are credited here.
    #[serde(default)]
    pub balances: BTreeMap<IdentityId, i64>,

    /// Broadcast messages, oldest first.
    #[serde(default, skip_deserializing)]
    pub notifications: Vec<String>,
}

impl StaticHost {
    /// An empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the directory.
    #[must_use]
    pub fn with_entity(mut self, profile: EntityProfile) -> Self {
        self.entities.push(profile);
        self
    }

    /// Add a connected player.
    #[must_use]
    pub fn with_player(mut self, player: RosterEntry) -> Self {
        self.roster.push(player);
        self
    }

    /// Put `identity` in `faction`.
    #[must_use]
    pub fn with_faction(mut self, identity: IdentityId, faction: impl Into<String>) -> Self {
        self.factions.insert(identity, faction.into());
        self
    }

    /// Declare two factions allied.
    #[must_use]
    pub fn with_alliance(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.alliances.push((a.into(), b.into()));
        self
    }

    /// Balance of `identity`, zero if never credited.
    pub fn balance(&self, identity: IdentityId) -> i64 {
        self.balances.get(&identity).copied().unwrap_or(0)
    }

    fn allied(&self, a: &str, b: &str) -> bool {
        a == b
            || self
                .alliances
                .iter()
                .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }
}

impl EntityDirectory for StaticHost {
    fn lookup(&self, entity: EntityRef) -> Option<EntityProfile> {
        self.entities.iter().find(|p| p.entity == entity).cloned()
    }

    fn lookup_by_name(&self, name: &str) -> Option<EntityProfile> {
        self.entities
            .iter()
            .find(|p| p.name.as_deref() == Some(name))
            .cloned()
    }
}

impl PlayerRoster for StaticHost {
    fn players(&self) -> Vec<RosterEntry> {
        self.roster.clone()
    }
}

impl HostilityFilter for StaticHost {
    fn is_hostile(&self, a: IdentityId, b: IdentityId) -> bool {
        if a.is_unknown() || b.is_unknown() || a == b {
            return false;
        }
        match (self.factions.get(&a), self.factions.get(&b)) {
            (Some(fa), Some(fb)) => !self.allied(fa, fb),
            _ => true,
        }
    }
}

impl RewardSink for StaticHost {
    fn recipient(&self, identity: IdentityId) -> Option<Recipient> {
        if identity.is_unknown() {
            return None;
        }
        self.roster
            .iter()
            .find(|p| p.identity == identity)
            .map(|p| Recipient {
                identity,
                display_name: p.display_name.clone(),
            })
    }

    fn grant(&mut self, identity: IdentityId, amount: i64) {
        let balance = self.balances.entry(identity).or_insert(0);
        *balance = balance.saturating_add(amount);
    }
}

impl Notifier for StaticHost {
    fn notify(
        &mut self,
        victim_label: &str,
        amount: i64,
        recipient_label: &str,
    ) -> Result<(), NotifyError> {
        self.notifications.push(format!(
            "{victim_label} Killed - Assigning {amount} bounty to {recipient_label}."
        ));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bounty_types::Capability;

    use super::*;

    fn player(id: i64, name: &str) -> RosterEntry {
        RosterEntry {
            identity: IdentityId::new(id),
            display_name: name.to_owned(),
            avatar: None,
            controlled: None,
        }
    }

    #[test]
    fn hostility_follows_factions() {
        let host = StaticHost::new()
            .with_faction(IdentityId::new(1), "SPRT")
            .with_faction(IdentityId::new(2), "SPRT")
            .with_faction(IdentityId::new(3), "MINR")
            .with_faction(IdentityId::new(4), "TRDR")
            .with_alliance("MINR", "TRDR");

        assert!(!host.is_hostile(IdentityId::new(1), IdentityId::new(2)));
        assert!(host.is_hostile(IdentityId::new(1), IdentityId::new(3)));
        assert!(!host.is_hostile(IdentityId::new(4), IdentityId::new(3)));
        assert!(host.is_hostile(IdentityId::new(5), IdentityId::new(1)));
        assert!(!host.is_hostile(IdentityId::new(5), IdentityId::new(5)));
        assert!(!host.is_hostile(IdentityId::new(5), IdentityId::UNKNOWN));
    }

    #[test]
    fn only_connected_players_are_recipients() {
        let host = StaticHost::new().with_player(player(8, "Ripley"));
        assert_eq!(
            host.recipient(IdentityId::new(8)).map(|r| r.display_name),
            Some("Ripley".to_owned())
        );
        assert!(host.recipient(IdentityId::new(9)).is_none());
        assert!(host.recipient(IdentityId::UNKNOWN).is_none());
    }

    #[test]
    fn grants_accumulate_and_notifications_are_logged() {
        let mut host = StaticHost::new().with_player(player(8, "Ripley"));
        host.grant(IdentityId::new(8), 40);
        host.grant(IdentityId::new(8), 2);
        host.notify("Raider", 42, "Ripley").unwrap();

        assert_eq!(host.balance(IdentityId::new(8)), 42);
        assert_eq!(host.balance(IdentityId::new(9)), 0);
        assert_eq!(
            host.notifications,
            vec!["Raider Killed - Assigning 42 bounty to Ripley.".to_owned()]
        );
    }

    #[test]
    fn deserializes_from_yaml() {
        let yaml = r#"
entities:
  - entity: 10
    name: "Drone-10"
    display_name: "Raider"
    capabilities:
      - capability: grid
        primary_owners: [500]
roster:
  - identity: 8
    display_name: "Ripley"
    avatar: 80
factions:
  8: "SPRT"
alliances:
  - ["SPRT", "MINR"]
"#;
        let host: StaticHost = serde_yml::from_str(yaml).unwrap();
        let drone = host.lookup_by_name("Drone-10").unwrap();
        assert_eq!(drone.primary_owner(), Some(IdentityId::new(500)));
        assert_eq!(
            host.lookup(EntityRef::new(10)).map(|p| p.capabilities.len()),
            Some(1)
        );
        assert!(matches!(
            drone.capabilities.first(),
            Some(Capability::Grid { .. })
        ));
        assert_eq!(host.players().len(), 1);
        assert!(host.is_hostile(IdentityId::new(8), IdentityId::new(500)));
    }
}

//! Collaborator traits implemented by the host simulation.
//!
//! The engine never touches the host's object model directly. Everything it
//! needs (object lookup, the player roster, faction relations, paying out,
//! broadcasting) comes through these traits, so the core can be driven by a
//! live game session, a replay file, or a test double alike.

use bounty_types::{EntityProfile, EntityRef, IdentityId, RosterEntry};

/// Error returned by a best-effort [`Notifier`].
#[derive(Debug, thiserror::Error)]
#[error("notification failed: {message}")]
pub struct NotifyError {
    /// Description of the failure.
    pub message: String,
}

/// A reward recipient that can currently be paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// The identity to pay.
    pub identity: IdentityId,
    /// Display label used in notifications.
    pub display_name: String,
}

/// Resolves host object references to capability-tagged profiles.
pub trait EntityDirectory {
    /// Look up an object by reference. `None` if it no longer exists.
    fn lookup(&self, entity: EntityRef) -> Option<EntityProfile>;

    /// Look up an object by its unique host name.
    fn lookup_by_name(&self, name: &str) -> Option<EntityProfile>;
}

/// Snapshot source for connected players.
pub trait PlayerRoster {
    /// Every currently connected player.
    fn players(&self) -> Vec<RosterEntry>;
}

/// Relationship query between two identities.
pub trait HostilityFilter {
    /// Whether `a` and `b` are mutually hostile.
    fn is_hostile(&self, a: IdentityId, b: IdentityId) -> bool;
}

/// Pays out rewards.
pub trait RewardSink {
    /// The recipient behind `identity`, if a reward can be delivered right
    /// now. Must return `None` for [`IdentityId::UNKNOWN`].
    fn recipient(&self, identity: IdentityId) -> Option<Recipient>;

    /// Credit `amount` to `identity`. Irreversible; assumed to succeed.
    fn grant(&mut self, identity: IdentityId, amount: i64);
}

/// Best-effort broadcast of grant announcements.
pub trait Notifier {
    /// Announce that `recipient_label` received `amount` for `victim_label`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the broadcast could not be delivered. The
    /// engine logs and ignores it.
    fn notify(
        &mut self,
        victim_label: &str,
        amount: i64,
        recipient_label: &str,
    ) -> Result<(), NotifyError>;
}

/// Everything the engine needs from the host, bundled.
pub trait Host: EntityDirectory + PlayerRoster + HostilityFilter + RewardSink + Notifier {}

impl<T> Host for T where T: EntityDirectory + PlayerRoster + HostilityFilter + RewardSink + Notifier {}

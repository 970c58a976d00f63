//! Shared type definitions for the kill bounty engine.
//!
//! This crate is the single source of truth for values that flow between the
//! ledger, the engine, and the host adapters.
//!
//! # Modules
//!
//! - [`ids`] -- Host identifier newtypes and the kill correlation id
//! - [`entity`] -- Capability-tagged host object descriptions and roster entries
//! - [`structs`] -- Damage records, kill signals, and reward grants

pub mod entity;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use entity::{BlockClass, BlockInfo, Capability, EntityProfile, RosterEntry};
pub use ids::{EntityRef, IdentityId, KillId};
pub use structs::{AttackerContribution, DamageRecord, KillSignal, PendingDamage, RewardGrant};

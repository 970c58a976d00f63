//! Damage attribution and reward distribution for the kill bounty engine.
//!
//! Host callbacks append raw damage and kill notifications to shared queues.
//! Once per cycle the [`Engine`] prunes expired damage, resolves and merges
//! the queued hits into the ledger, then splits each destroyed victim's
//! bounty among the hostile players who damaged it.
//!
//! # Modules
//!
//! - [`admission`] -- Block-level host callbacks mapped onto the queues.
//! - [`bounty`] -- Reading the reward pool from block metadata.
//! - [`clock`] -- Cycle throttle.
//! - [`config`] -- Configuration loading from `bounty-config.yaml` into
//!   strongly-typed structs.
//! - [`distribution`] -- Proportional share arithmetic in `Decimal`.
//! - [`engine`] -- The three-phase batch cycle.
//! - [`host`] -- Collaborator traits the host implements.
//! - [`memory`] -- [`StaticHost`], an in-memory host for tests and replays.
//! - [`queue`] -- Intake and kill queues.
//! - [`resolver`] -- Attacker identity fallback chain.
//! - [`runner`] -- Async scheduler loop.
//!
//! [`Engine`]: engine::Engine
//! [`StaticHost`]: memory::StaticHost

pub mod admission;
pub mod bounty;
pub mod clock;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod host;
pub mod memory;
pub mod queue;
pub mod resolver;
pub mod runner;

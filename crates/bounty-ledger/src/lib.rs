//! Windowed damage ledger for the kill bounty engine.
//!
//! Every damage event that survives identity resolution lands in this ledger,
//! keyed by the victim it hit. When the victim is destroyed, the engine asks
//! the ledger who contributed how much within the attribution window, then
//! removes the victim for good.
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`DamageLedger`] struct: append, prune, aggregate, remove.
//! - [`contribution`] -- Grouping records into per-attacker sums.
//!
//! # Window rule
//!
//! A record observed at `t` is eligible at time `now` iff
//! `t >= now - window`. Anything strictly older is expired.
//!
//! # Usage
//!
//! ```
//! use bounty_ledger::DamageLedger;
//! use bounty_types::{EntityRef, IdentityId};
//! use chrono::{TimeDelta, Utc};
//!
//! let mut ledger = DamageLedger::new();
//! let drone = EntityRef::new(42);
//! let now = Utc::now();
//!
//! ledger.record(drone, IdentityId::new(1), 70.0, now);
//! ledger.record(drone, IdentityId::new(2), 30.0, now - TimeDelta::seconds(400));
//!
//! ledger.prune(now, TimeDelta::seconds(300));
//! assert_eq!(ledger.aggregate(drone).len(), 1);
//! ```

pub mod contribution;
pub mod ledger;

pub use ledger::DamageLedger;

//! Type-safe identifier wrappers.
//!
//! The host simulation hands out two unrelated kinds of 64-bit numbers: entity
//! references (transient handles to grids, blocks, characters, weapons) and
//! identities (stable owner/player ids). Mixing them up is the classic bug in
//! attribution code, so each gets its own newtype.
//!
//! Kill signals additionally carry a [`KillId`] (UUID v7) that correlates log
//! lines and grant reports for one distribution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around a raw host `i64` with standard derives.
macro_rules! define_host_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw host value.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the raw host value.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_host_id! {
    /// Opaque reference to a host object (grid, block, character, weapon).
    ///
    /// Only meaningful while the host keeps the object alive; never use it
    /// as a reward recipient.
    EntityRef
}

define_host_id! {
    /// Stable owner or player identity.
    IdentityId
}

impl IdentityId {
    /// The "unknown / environment" identity. Produced when no resolution
    /// strategy matches; never a valid reward recipient.
    pub const UNKNOWN: Self = Self(0);

    /// Whether this is the [`UNKNOWN`](Self::UNKNOWN) sentinel.
    pub const fn is_unknown(self) -> bool {
        self.0 == 0
    }
}

/// Unique identifier for one queued kill, used for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KillId(pub Uuid);

impl KillId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for KillId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for KillId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Type-safe wrapper for the tribe identifier.
//!
//! Tribe ids are assigned by the host game server and carry no internal
//! meaning here beyond equality and lookup. The newtype exists so a tribe
//! id can never be confused with a member count or a timestamp at a call
//! site -- all three are plain integers on the wire.

use serde::{Deserialize, Serialize};

/// Unique identifier for a tribe, supplied by the host game server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TribeId(pub i64);

impl TribeId {
    /// Wrap a raw host-supplied tribe id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Return the inner integer value.
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for TribeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TribeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<TribeId> for i64 {
    fn from(id: TribeId) -> Self {
        id.0
    }
}

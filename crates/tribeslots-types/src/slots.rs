//! Cooldown timestamps, admission decisions, and slot reports.
//!
//! A cooldown is represented as the server run-time second at which the
//! withheld slot becomes free again. Sets of cooldowns are plain
//! `Vec<SlotStamp>` values; the ordering and expiry invariants live in the
//! policy layer (`tribeslots-core`), not in the representation.

use serde::{Deserialize, Serialize};

use crate::ids::TribeId;

/// A cooldown expiry timestamp: seconds of server run-time at which the
/// withheld slot becomes available again.
///
/// Server run-time is a monotonically increasing clock supplied by the host,
/// starting at an arbitrary epoch (typically world load). Stored stamps are
/// always non-negative.
pub type SlotStamp = i64;

/// Outcome of a join admission check.
///
/// Carries no payload -- the gate either lets the join through or it does
/// not. A tribe with no cooldown record is always `Admitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionDecision {
    /// The tribe has room for the new member.
    Admitted,
    /// Occupied slots plus slots on cooldown leave no room.
    Denied,
}

impl AdmissionDecision {
    /// True when the join may proceed.
    pub const fn is_admitted(self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Outcome of a merge admission check.
///
/// On admission the decision carries the merged cooldown set that was
/// written to the surviving tribe, so the caller can report it without a
/// second read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeDecision {
    /// The merge fits within capacity; cooldowns were combined.
    Admitted {
        /// Normalized union of both tribes' unexpired cooldowns, as written
        /// to the surviving tribe's record.
        merged: Vec<SlotStamp>,
    },
    /// Combined members and cooldowns exceed capacity; nothing was mutated.
    Denied,
}

impl MergeDecision {
    /// True when the merge may proceed.
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }
}

/// Per-slot line in a [`SlotReport`]: when a cooldown expires and how long
/// remains until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotReportEntry {
    /// Server run-time second at which the slot frees up.
    pub expires_at: SlotStamp,
    /// Seconds left until expiry, relative to the report's clock reading.
    pub remaining_secs: i64,
}

/// Snapshot of a tribe's active cooldowns, for host-side display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotReport {
    /// The tribe the report describes.
    pub tribe_id: TribeId,
    /// One entry per unexpired cooldown, soonest expiry first.
    pub entries: Vec<SlotReportEntry>,
}

impl SlotReport {
    /// Number of slots currently withheld from the tribe.
    pub fn slots_on_cooldown(&self) -> usize {
        self.entries.len()
    }
}

//! Pure slot-cooldown policy functions.
//!
//! Everything here is a function of its arguments -- no clock reads, no
//! storage. The engine feeds these the stored set and the host-supplied
//! server run-time; the same functions serve as read-time filters and as
//! pre-write cleanup.
//!
//! # Boundary convention
//!
//! A stamp equal to `now` counts as expired everywhere: [`normalize`]
//! removes it, [`count_active`] does not count it, and [`has_free_slot`]
//! treats it as reclaimable. Keeping the three aligned at the boundary is
//! what makes `count_active(s, now) == normalize(s, now).len()` hold.

use tribeslots_types::SlotStamp;

/// Drop every expired stamp (`stamp <= now`) and sort the rest ascending.
///
/// Idempotent: normalizing an already-normalized set with the same clock
/// reading returns it unchanged.
pub fn normalize(slots: &[SlotStamp], now: SlotStamp) -> Vec<SlotStamp> {
    let mut live: Vec<SlotStamp> = slots.iter().copied().filter(|&stamp| stamp > now).collect();
    live.sort_unstable();
    live
}

/// Number of unexpired cooldowns: stamps strictly greater than `now`.
pub fn count_active(slots: &[SlotStamp], now: SlotStamp) -> usize {
    slots.iter().filter(|&&stamp| stamp > now).count()
}

/// Whether a departure can still be assigned a cooldown slot.
///
/// True when the raw set is smaller than `capacity - 1`, or when at least
/// one entry has expired and can be reclaimed. The raw-size check against
/// `capacity - 1` (not live-count against `capacity`) deliberately leaves
/// one slot of margin; it is not a rounding error.
pub fn has_free_slot(slots: &[SlotStamp], now: SlotStamp, capacity: usize) -> bool {
    slots.len() < capacity.saturating_sub(1) || slots.iter().any(|&stamp| stamp <= now)
}

//! The cooldown engine: slot reservation, admission gates, merge
//! reconciliation.
//!
//! Stateless policy over the store: every operation is one read-decide-write
//! cycle against [`SlotStore`] with no in-memory caching, so restart
//! consistency reduces to the store's own durability. A single async mutex
//! serializes the cycles; contention is a handful of tribe events per
//! second at worst, so one global lock is sufficient and keeps the
//! read-modify-write race impossible by construction.
//!
//! # Admission comparators
//!
//! The join gate uses strict `capacity > members + active` while the merge
//! gate uses inclusive `capacity >= combined`. The asymmetry is deliberate
//! and load-bearing; the tests at the bottom of this file pin both
//! boundaries.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use tribeslots_db::{DbError, SlotStore};
use tribeslots_types::{
    AdmissionDecision, MergeDecision, SlotReport, SlotReportEntry, SlotStamp, TribeId,
};

use crate::config::CooldownSettings;
use crate::policy;

/// Errors that can occur during an engine operation.
///
/// Always means "no change happened": every engine operation aborts its
/// mutation when the store reports a failure, and nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The storage layer failed; the operation's mutation did not happen.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying storage error.
        #[from]
        source: DbError,
    },
}

/// Slot-cooldown policy engine over a [`SlotStore`].
///
/// Constructed once at startup with resolved [`CooldownSettings`] and the
/// store handle; injected into whatever event layer the host uses.
pub struct CooldownEngine {
    store: SlotStore,
    settings: CooldownSettings,
    /// Serializes read-decide-write cycles across concurrent host events.
    op_lock: Mutex<()>,
}

impl CooldownEngine {
    /// Create an engine over the given store with resolved settings.
    pub fn new(store: SlotStore, settings: CooldownSettings) -> Self {
        Self {
            store,
            settings,
            op_lock: Mutex::new(()),
        }
    }

    /// The engine's resolved settings.
    pub const fn settings(&self) -> &CooldownSettings {
        &self.settings
    }

    /// The underlying store handle.
    pub const fn store(&self) -> &SlotStore {
        &self.store
    }

    /// Record a departure: put one of the tribe's slots on cooldown.
    ///
    /// Ensures a record exists, then appends `now + cooldown_secs` if the
    /// tribe still has a slot to withhold ([`policy::has_free_slot`]).
    /// The fetched set is written back even when nothing was appended, so
    /// the record always exists after a departure. Returns whether a
    /// cooldown was recorded.
    ///
    /// Precondition: callers honor the activation delay (`now` past
    /// `activation_delay_secs`). The event layer enforces it; calling
    /// earlier records a cooldown anyway.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if any store call fails; the
    /// cooldown is then not recorded.
    pub async fn reserve_slot(
        &self,
        tribe_id: TribeId,
        capacity: usize,
        now: SlotStamp,
    ) -> Result<bool, EngineError> {
        let _guard = self.op_lock.lock().await;

        if !self.store.tribe_exists(tribe_id).await? {
            self.store.add_tribe(tribe_id).await?;
        }

        let mut slots = self.store.get_slots(tribe_id).await?;

        let reserved = policy::has_free_slot(&slots, now, capacity);
        if reserved {
            let blocked_until = now.saturating_add(self.settings.cooldown_secs);
            slots.push(blocked_until);
            debug!(%tribe_id, blocked_until, "Slot set on cooldown");
        } else {
            // Already full of cooldowns: the departure goes unrecorded.
            debug!(%tribe_id, "No free slot to put on cooldown");
        }

        self.store.set_slots(tribe_id, &slots).await?;
        Ok(reserved)
    }

    /// Join gate: may a new member be admitted to the tribe?
    ///
    /// A tribe with no record admits unconditionally. Otherwise admission
    /// requires `capacity > members + active_cooldowns` (strict).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if a store read fails.
    pub async fn can_admit_new_member(
        &self,
        tribe_id: TribeId,
        members: usize,
        capacity: usize,
        now: SlotStamp,
    ) -> Result<AdmissionDecision, EngineError> {
        let _guard = self.op_lock.lock().await;

        if !self.store.tribe_exists(tribe_id).await? {
            // Never removed a player: nothing is withheld.
            return Ok(AdmissionDecision::Admitted);
        }

        let slots = self.store.get_slots(tribe_id).await?;
        let active = policy::count_active(&slots, now);

        let decision = if capacity > members.saturating_add(active) {
            AdmissionDecision::Admitted
        } else {
            AdmissionDecision::Denied
        };
        debug!(%tribe_id, members, capacity, active, ?decision, "Join admission check");
        Ok(decision)
    }

    /// Merge gate: may the old tribe fold into the new one, and if so,
    /// combine their cooldowns.
    ///
    /// Admission requires `capacity >= members_old + active_new +
    /// members_new + active_old` (inclusive). On admission the surviving
    /// tribe's record is overwritten with the normalized union of both
    /// sets' unexpired entries and the old tribe's record is deleted. On
    /// denial nothing is mutated.
    ///
    /// A merged set that reaches capacity is a data inconsistency: it is
    /// logged and the merge proceeds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if a store call fails. A failure
    /// after admission but before both writes completed leaves the old
    /// record in place; re-running the merge is safe because the union is
    /// idempotent.
    pub async fn can_admit_merge(
        &self,
        new_tribe_id: TribeId,
        old_tribe_id: TribeId,
        members_new: usize,
        members_old: usize,
        capacity: usize,
        now: SlotStamp,
    ) -> Result<MergeDecision, EngineError> {
        let _guard = self.op_lock.lock().await;

        let old_in_store = self.store.tribe_exists(old_tribe_id).await?;
        let old_slots = if old_in_store {
            self.store.get_slots(old_tribe_id).await?
        } else {
            Vec::new()
        };
        let active_old = policy::count_active(&old_slots, now);

        let new_slots = self.store.get_slots(new_tribe_id).await?;
        let active_new = policy::count_active(&new_slots, now);

        let needed = members_old
            .saturating_add(active_new)
            .saturating_add(members_new)
            .saturating_add(active_old);
        if capacity < needed {
            debug!(
                %new_tribe_id, %old_tribe_id, needed, capacity,
                "Merge denied: combined members and cooldowns exceed capacity"
            );
            return Ok(MergeDecision::Denied);
        }

        let mut combined = new_slots;
        combined.extend(old_slots.iter().copied().filter(|&stamp| stamp > now));
        let merged = policy::normalize(&combined, now);

        if merged.len() >= capacity {
            warn!(
                %new_tribe_id,
                slots = merged.len(),
                capacity,
                "Data inconsistency: merged tribe holds at least a full capacity of cooldowns"
            );
        }

        self.store.set_slots(new_tribe_id, &merged).await?;
        if old_in_store {
            self.store.delete_tribe(old_tribe_id).await?;
        }

        debug!(%new_tribe_id, %old_tribe_id, inherited = merged.len(), "Tribes merged");
        Ok(MergeDecision::Admitted { merged })
    }

    /// Read-only snapshot of a tribe's unexpired cooldowns, for display.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the store read fails.
    pub async fn slot_report(
        &self,
        tribe_id: TribeId,
        now: SlotStamp,
    ) -> Result<SlotReport, EngineError> {
        let slots = self.store.get_slots(tribe_id).await?;
        let entries = policy::normalize(&slots, now)
            .into_iter()
            .map(|expires_at| SlotReportEntry {
                expires_at,
                remaining_secs: expires_at.saturating_sub(now),
            })
            .collect();
        Ok(SlotReport { tribe_id, entries })
    }

    /// Remove every tribe record. Administrative reset only.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Storage`] if the store wipe fails.
    pub async fn wipe(&self) -> Result<(), EngineError> {
        let _guard = self.op_lock.lock().await;
        self.store.wipe_all().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use tribeslots_db::MemorySlotStore;

    use super::*;

    const HOUR: i64 = 3600;

    fn engine(cooldown_secs: i64) -> CooldownEngine {
        CooldownEngine::new(
            SlotStore::from(MemorySlotStore::new()),
            CooldownSettings {
                cooldown_secs,
                activation_delay_secs: 0,
                auto_wipe: false,
            },
        )
    }

    #[tokio::test]
    async fn first_reservation_creates_record_with_one_entry() {
        let engine = engine(24 * HOUR);
        let id = TribeId::new(1);

        assert!(engine.reserve_slot(id, 6, 1000).await.unwrap());

        assert!(engine.store().tribe_exists(id).await.unwrap());
        let slots = engine.store().get_slots(id).await.unwrap();
        assert_eq!(slots, vec![1000 + 24 * HOUR]);
    }

    #[tokio::test]
    async fn reservation_skipped_when_full_of_live_cooldowns() {
        let engine = engine(HOUR);
        let id = TribeId::new(2);

        // capacity 3: raw margin is 2, so two live entries saturate it.
        let before = vec![5000, 6000];
        engine.store().set_slots(id, &before).await.unwrap();

        assert!(!engine.reserve_slot(id, 3, 100).await.unwrap());
        // The unchanged set is still written back.
        assert_eq!(engine.store().get_slots(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn reservation_reclaims_expired_entry() {
        let engine = engine(HOUR);
        let id = TribeId::new(3);

        // Two entries at the margin, but one already expired.
        engine.store().set_slots(id, &[50, 6000]).await.unwrap();

        assert!(engine.reserve_slot(id, 3, 100).await.unwrap());
        let slots = engine.store().get_slots(id).await.unwrap();
        assert!(slots.contains(&(100 + HOUR)));
    }

    #[tokio::test]
    async fn join_admitted_for_unknown_tribe() {
        let engine = engine(HOUR);
        let decision = engine
            .can_admit_new_member(TribeId::new(4), 6, 6, 500)
            .await
            .unwrap();
        assert!(decision.is_admitted());
    }

    #[tokio::test]
    async fn join_gate_is_strict_at_capacity() {
        let engine = engine(HOUR);
        let id = TribeId::new(5);
        let t = 1000;

        // capacity 6, 4 members, 2 active cooldowns: 6 > 6 fails.
        engine.store().set_slots(id, &[t + 10, t + 20]).await.unwrap();
        let decision = engine.can_admit_new_member(id, 4, 6, t).await.unwrap();
        assert_eq!(decision, AdmissionDecision::Denied);

        // One active cooldown: 6 > 5 admits.
        engine.store().set_slots(id, &[t + 10]).await.unwrap();
        let decision = engine.can_admit_new_member(id, 4, 6, t).await.unwrap();
        assert_eq!(decision, AdmissionDecision::Admitted);
    }

    #[tokio::test]
    async fn join_ignores_expired_cooldowns() {
        let engine = engine(HOUR);
        let id = TribeId::new(6);
        let t = 1000;

        // Both entries expired (one exactly at now).
        engine.store().set_slots(id, &[t - 5, t]).await.unwrap();
        let decision = engine.can_admit_new_member(id, 5, 6, t).await.unwrap();
        assert!(decision.is_admitted());
    }

    #[tokio::test]
    async fn merge_admitted_inclusive_at_capacity() {
        let engine = engine(HOUR);
        let new_id = TribeId::new(10);
        let old_id = TribeId::new(11);
        let t = 1000;

        // old: 2 members + 1 active cooldown; new: 3 members + 0 cooldowns.
        // 2 + 0 + 3 + 1 = 6 <= 6 admits (inclusive comparator).
        engine.store().set_slots(old_id, &[t + 500]).await.unwrap();

        let decision = engine
            .can_admit_merge(new_id, old_id, 3, 2, 6, t)
            .await
            .unwrap();
        assert_eq!(
            decision,
            MergeDecision::Admitted {
                merged: vec![t + 500]
            }
        );

        // Old record deleted, new record holds the inherited cooldown.
        assert!(!engine.store().tribe_exists(old_id).await.unwrap());
        assert_eq!(engine.store().get_slots(new_id).await.unwrap(), vec![t + 500]);
    }

    #[tokio::test]
    async fn merge_denied_leaves_both_records_intact() {
        let engine = engine(HOUR);
        let new_id = TribeId::new(12);
        let old_id = TribeId::new(13);
        let t = 1000;

        // old: 3 members + 2 active; new: 3 members + 1 active.
        // 3 + 1 + 3 + 2 = 9 > 6 denies.
        let old_slots = vec![t + 100, t + 200];
        let new_slots = vec![t + 300];
        engine.store().set_slots(old_id, &old_slots).await.unwrap();
        engine.store().set_slots(new_id, &new_slots).await.unwrap();

        let decision = engine
            .can_admit_merge(new_id, old_id, 3, 3, 6, t)
            .await
            .unwrap();
        assert_eq!(decision, MergeDecision::Denied);

        assert_eq!(engine.store().get_slots(old_id).await.unwrap(), old_slots);
        assert_eq!(engine.store().get_slots(new_id).await.unwrap(), new_slots);
    }

    #[tokio::test]
    async fn merge_unions_and_normalizes_cooldowns() {
        let engine = engine(HOUR);
        let new_id = TribeId::new(14);
        let old_id = TribeId::new(15);
        let t = 1000;

        // Expired entries on both sides disappear; survivors sort ascending.
        engine
            .store()
            .set_slots(old_id, &[t - 10, t + 300])
            .await
            .unwrap();
        engine
            .store()
            .set_slots(new_id, &[t + 100, t])
            .await
            .unwrap();

        let decision = engine
            .can_admit_merge(new_id, old_id, 1, 1, 6, t)
            .await
            .unwrap();
        assert_eq!(
            decision,
            MergeDecision::Admitted {
                merged: vec![t + 100, t + 300]
            }
        );
    }

    #[tokio::test]
    async fn merge_at_full_cooldown_capacity_still_proceeds() {
        let engine = engine(HOUR);
        let new_id = TribeId::new(30);
        let old_id = TribeId::new(31);
        let t = 1000;

        // Memberless shells, one live cooldown each, capacity 2:
        // 0 + 1 + 0 + 1 = 2 <= 2 admits, and the merged set fills the
        // whole capacity. That is logged as a data inconsistency but the
        // merge must still go through.
        engine.store().set_slots(old_id, &[t + 50]).await.unwrap();
        engine.store().set_slots(new_id, &[t + 60]).await.unwrap();

        let decision = engine
            .can_admit_merge(new_id, old_id, 0, 0, 2, t)
            .await
            .unwrap();
        assert_eq!(
            decision,
            MergeDecision::Admitted {
                merged: vec![t + 50, t + 60]
            }
        );

        assert_eq!(
            engine.store().get_slots(new_id).await.unwrap(),
            vec![t + 50, t + 60]
        );
        assert!(!engine.store().tribe_exists(old_id).await.unwrap());
    }

    #[tokio::test]
    async fn merge_with_no_old_record_still_writes_new() {
        let engine = engine(HOUR);
        let new_id = TribeId::new(16);
        let old_id = TribeId::new(17);

        let decision = engine
            .can_admit_merge(new_id, old_id, 2, 2, 6, 500)
            .await
            .unwrap();
        assert!(decision.is_admitted());
        // set_slots creates the surviving record even with nothing inherited.
        assert!(engine.store().tribe_exists(new_id).await.unwrap());
    }

    #[tokio::test]
    async fn slot_report_lists_remaining_seconds() {
        let engine = engine(HOUR);
        let id = TribeId::new(18);
        let t = 1000;

        engine
            .store()
            .set_slots(id, &[t + 120, t - 5, t + 60])
            .await
            .unwrap();

        let report = engine.slot_report(id, t).await.unwrap();
        assert_eq!(report.slots_on_cooldown(), 2);
        assert_eq!(
            report.entries,
            vec![
                SlotReportEntry {
                    expires_at: t + 60,
                    remaining_secs: 60
                },
                SlotReportEntry {
                    expires_at: t + 120,
                    remaining_secs: 120
                },
            ]
        );
    }

    #[tokio::test]
    async fn wipe_forgets_every_tribe() {
        let engine = engine(HOUR);
        engine.store().set_slots(TribeId::new(20), &[99]).await.unwrap();
        engine.store().set_slots(TribeId::new(21), &[99]).await.unwrap();

        engine.wipe().await.unwrap();

        assert!(!engine.store().tribe_exists(TribeId::new(20)).await.unwrap());
        assert!(!engine.store().tribe_exists(TribeId::new(21)).await.unwrap());
    }
}

//! Backend-agnostic store handle.
//!
//! [`SlotStore`] is the single type the policy layer talks to. The backing
//! engine is chosen once at construction and every operation dispatches to
//! it; swapping `PostgreSQL` for `Dragonfly` (or the in-memory store) never
//! changes engine behavior. Concrete variants rather than a trait object:
//! the set of backends is closed and known at compile time.

use tribeslots_types::{SlotStamp, TribeId};

use crate::dragonfly::DragonflySlotStore;
use crate::error::DbError;
use crate::memory::MemorySlotStore;
use crate::postgres::PostgresSlotStore;

/// Durable mapping from tribe id to cooldown set, over one of the
/// interchangeable backing engines.
///
/// Every mutating operation is committed before it returns; a successful
/// return means persisted. The store enforces no capacity policy -- it is
/// a dumb ledger for whatever the policy layer writes.
pub enum SlotStore {
    /// `PostgreSQL` backend (`tribe_slots` table).
    Postgres(PostgresSlotStore),
    /// `Dragonfly`/Redis backend (`tribe:{id}:slots` keys).
    Dragonfly(DragonflySlotStore),
    /// In-memory backend for tests and infra-free operation.
    Memory(MemorySlotStore),
}

impl SlotStore {
    /// True when a record for the tribe exists, regardless of set contents.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read fails.
    pub async fn tribe_exists(&self, tribe_id: TribeId) -> Result<bool, DbError> {
        match self {
            Self::Postgres(store) => store.tribe_exists(tribe_id).await,
            Self::Dragonfly(store) => store.tribe_exists(tribe_id).await,
            Self::Memory(store) => store.tribe_exists(tribe_id).await,
        }
    }

    /// Create an empty record for the tribe. Idempotent across all backends.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend write fails.
    pub async fn add_tribe(&self, tribe_id: TribeId) -> Result<(), DbError> {
        match self {
            Self::Postgres(store) => store.add_tribe(tribe_id).await,
            Self::Dragonfly(store) => store.add_tribe(tribe_id).await,
            Self::Memory(store) => store.add_tribe(tribe_id).await,
        }
    }

    /// Read the stored cooldown set, or an empty vec when the tribe has no
    /// record. Never an error for a missing tribe.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend read fails.
    pub async fn get_slots(&self, tribe_id: TribeId) -> Result<Vec<SlotStamp>, DbError> {
        match self {
            Self::Postgres(store) => store.get_slots(tribe_id).await,
            Self::Dragonfly(store) => store.get_slots(tribe_id).await,
            Self::Memory(store) => store.get_slots(tribe_id).await,
        }
    }

    /// Atomically overwrite the stored cooldown set, creating the record if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend write fails; on error the previous
    /// value is intact (single-statement writes on every backend).
    pub async fn set_slots(&self, tribe_id: TribeId, slots: &[SlotStamp]) -> Result<(), DbError> {
        match self {
            Self::Postgres(store) => store.set_slots(tribe_id, slots).await,
            Self::Dragonfly(store) => store.set_slots(tribe_id, slots).await,
            Self::Memory(store) => store.set_slots(tribe_id, slots).await,
        }
    }

    /// Remove the tribe's record. No-op when absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend delete fails.
    pub async fn delete_tribe(&self, tribe_id: TribeId) -> Result<(), DbError> {
        match self {
            Self::Postgres(store) => store.delete_tribe(tribe_id).await,
            Self::Dragonfly(store) => store.delete_tribe(tribe_id).await,
            Self::Memory(store) => store.delete_tribe(tribe_id).await,
        }
    }

    /// Remove every record. Administrative reset only.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend delete fails.
    pub async fn wipe_all(&self) -> Result<(), DbError> {
        match self {
            Self::Postgres(store) => store.wipe_all().await,
            Self::Dragonfly(store) => store.wipe_all().await,
            Self::Memory(store) => store.wipe_all().await,
        }
    }
}

impl From<PostgresSlotStore> for SlotStore {
    fn from(store: PostgresSlotStore) -> Self {
        Self::Postgres(store)
    }
}

impl From<DragonflySlotStore> for SlotStore {
    fn from(store: DragonflySlotStore) -> Self {
        Self::Dragonfly(store)
    }
}

impl From<MemorySlotStore> for SlotStore {
    fn from(store: MemorySlotStore) -> Self {
        Self::Memory(store)
    }
}

//! In-memory backing store for tribe cooldown slots.
//!
//! Not durable -- state vanishes with the process. Exists so the policy
//! layer can be exercised end-to-end (unit tests, local development,
//! throwaway worlds) without a database, the same way a stub stands in for
//! a real collaborator elsewhere. The operations mirror the durable stores
//! exactly, including idempotent `add_tribe` and absent-record semantics.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tribeslots_types::{SlotStamp, TribeId};

use crate::error::DbError;

/// In-memory store over a `BTreeMap`, guarded by an async `RwLock`.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    records: RwLock<BTreeMap<TribeId, Vec<SlotStamp>>>,
}

impl MemorySlotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when a record for the tribe exists, regardless of set contents.
    ///
    /// # Errors
    ///
    /// Infallible; `Result` keeps the signature uniform across backends.
    pub async fn tribe_exists(&self, tribe_id: TribeId) -> Result<bool, DbError> {
        Ok(self.records.read().await.contains_key(&tribe_id))
    }

    /// Create an empty record for the tribe. Idempotent.
    ///
    /// # Errors
    ///
    /// Infallible; `Result` keeps the signature uniform across backends.
    pub async fn add_tribe(&self, tribe_id: TribeId) -> Result<(), DbError> {
        self.records.write().await.entry(tribe_id).or_default();
        Ok(())
    }

    /// Read the stored cooldown set, or an empty vec when absent.
    ///
    /// # Errors
    ///
    /// Infallible; `Result` keeps the signature uniform across backends.
    pub async fn get_slots(&self, tribe_id: TribeId) -> Result<Vec<SlotStamp>, DbError> {
        Ok(self
            .records
            .read()
            .await
            .get(&tribe_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Overwrite the stored cooldown set, creating the record if missing.
    ///
    /// # Errors
    ///
    /// Infallible; `Result` keeps the signature uniform across backends.
    pub async fn set_slots(&self, tribe_id: TribeId, slots: &[SlotStamp]) -> Result<(), DbError> {
        self.records.write().await.insert(tribe_id, slots.to_vec());
        Ok(())
    }

    /// Remove the tribe's record. No-op when absent.
    ///
    /// # Errors
    ///
    /// Infallible; `Result` keeps the signature uniform across backends.
    pub async fn delete_tribe(&self, tribe_id: TribeId) -> Result<(), DbError> {
        self.records.write().await.remove(&tribe_id);
        Ok(())
    }

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Infallible; `Result` keeps the signature uniform across backends.
    pub async fn wipe_all(&self) -> Result<(), DbError> {
        self.records.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn absent_tribe_reads_as_empty() {
        let store = MemorySlotStore::new();
        assert!(!store.tribe_exists(TribeId::new(1)).await.unwrap());
        assert!(store.get_slots(TribeId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_tribe_is_idempotent() {
        let store = MemorySlotStore::new();
        let id = TribeId::new(5);
        store.set_slots(id, &[100, 200]).await.unwrap();
        store.add_tribe(id).await.unwrap();
        assert_eq!(store.get_slots(id).await.unwrap(), vec![100, 200]);
    }

    #[tokio::test]
    async fn set_then_get_preserves_order() {
        let store = MemorySlotStore::new();
        let id = TribeId::new(9);
        let slots = vec![300, 100, 200];
        store.set_slots(id, &slots).await.unwrap();
        assert_eq!(store.get_slots(id).await.unwrap(), slots);
    }

    #[tokio::test]
    async fn delete_and_wipe() {
        let store = MemorySlotStore::new();
        store.set_slots(TribeId::new(1), &[10]).await.unwrap();
        store.set_slots(TribeId::new(2), &[20]).await.unwrap();

        store.delete_tribe(TribeId::new(1)).await.unwrap();
        assert!(!store.tribe_exists(TribeId::new(1)).await.unwrap());
        assert!(store.tribe_exists(TribeId::new(2)).await.unwrap());

        store.wipe_all().await.unwrap();
        assert!(!store.tribe_exists(TribeId::new(2)).await.unwrap());
    }
}

//! `Dragonfly` (Redis-compatible) backing store for tribe cooldown slots.
//!
//! An alternative to the `PostgreSQL` store for hosts that already run a
//! Redis-compatible instance. Key patterns:
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `tribe:{id}:slots` | JSON array | Cooldown set of one tribe |
//! | `tribes` | Set | Index of every tribe id with a record |
//!
//! The `tribes` index set exists so `wipe_all` can enumerate records without
//! a `KEYS`/`SCAN` pass; every mutating operation keeps it in step with the
//! per-tribe keys.

use fred::prelude::*;
use fred::types::SetOptions;
use tribeslots_types::{SlotStamp, TribeId};

use crate::error::DbError;

/// Index set holding every tribe id that has a slots record.
const TRIBE_INDEX_KEY: &str = "tribes";

/// `Dragonfly`-backed store for tribe cooldown sets.
#[derive(Clone)]
pub struct DragonflySlotStore {
    client: Client,
}

impl DragonflySlotStore {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL follows the Redis URL scheme: `redis://host:port` or
    /// `redis://host:port/db`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Key of one tribe's slots value.
    fn slots_key(tribe_id: TribeId) -> String {
        format!("tribe:{tribe_id}:slots")
    }

    /// True when a record for the tribe exists, regardless of set contents.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn tribe_exists(&self, tribe_id: TribeId) -> Result<bool, DbError> {
        let exists: bool = self
            .client
            .sismember(TRIBE_INDEX_KEY, tribe_id.into_inner())
            .await?;
        Ok(exists)
    }

    /// Create an empty record for the tribe. Idempotent: an existing slots
    /// value is left untouched (SET NX).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if a write fails.
    pub async fn add_tribe(&self, tribe_id: TribeId) -> Result<(), DbError> {
        let key = Self::slots_key(tribe_id);
        let _: () = self
            .client
            .set(&key, "[]", None, Some(SetOptions::NX), false)
            .await?;
        let _: u64 = self
            .client
            .sadd(TRIBE_INDEX_KEY, tribe_id.into_inner())
            .await?;
        Ok(())
    }

    /// Read the stored cooldown set, or an empty vec when the tribe has no
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the read fails.
    /// Returns [`DbError::Serialization`] if the stored value is not a JSON
    /// array of integers.
    pub async fn get_slots(&self, tribe_id: TribeId) -> Result<Vec<SlotStamp>, DbError> {
        let key = Self::slots_key(tribe_id);
        let value: Option<String> = self.client.get(&key).await?;
        value.map_or_else(|| Ok(Vec::new()), |s| Ok(serde_json::from_str(&s)?))
    }

    /// Atomically overwrite the stored cooldown set, creating the record if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails.
    /// Returns [`DbError::Dragonfly`] if a write fails.
    pub async fn set_slots(&self, tribe_id: TribeId, slots: &[SlotStamp]) -> Result<(), DbError> {
        let key = Self::slots_key(tribe_id);
        let json = serde_json::to_string(slots)?;
        let _: () = self.client.set(&key, json.as_str(), None, None, false).await?;
        let _: u64 = self
            .client
            .sadd(TRIBE_INDEX_KEY, tribe_id.into_inner())
            .await?;
        Ok(())
    }

    /// Remove the tribe's record. No-op when absent.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if a delete fails.
    pub async fn delete_tribe(&self, tribe_id: TribeId) -> Result<(), DbError> {
        let key = Self::slots_key(tribe_id);
        let _: u32 = self.client.del(&key).await?;
        let _: u64 = self
            .client
            .srem(TRIBE_INDEX_KEY, tribe_id.into_inner())
            .await?;
        Ok(())
    }

    /// Remove every record. Administrative reset only (new world detected).
    ///
    /// Enumerates the `tribes` index set rather than flushing the instance,
    /// so unrelated keys on a shared instance survive.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if a read or delete fails.
    pub async fn wipe_all(&self) -> Result<(), DbError> {
        let members: Vec<i64> = self.client.smembers(TRIBE_INDEX_KEY).await?;
        let count = members.len();
        for id in members {
            let key = Self::slots_key(TribeId::new(id));
            let _: u32 = self.client.del(&key).await?;
        }
        let _: u32 = self.client.del(TRIBE_INDEX_KEY).await?;
        tracing::info!(tribes = count, "Wiped Dragonfly slot records");
        Ok(())
    }
}

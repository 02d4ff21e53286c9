//! Storage layer for the tribe slot cooldown service.
//!
//! One durable mapping: tribe id -> ordered cooldown expiry timestamps.
//! Two interchangeable durable backends plus an in-memory stand-in, all
//! behind the [`SlotStore`] handle so the policy layer never knows which
//! engine it is talking to.
//!
//! ```text
//! Cooldown Engine (tribeslots-core)
//!     |
//!     +-- SlotStore (backend chosen at construction)
//!         |-- PostgresSlotStore   (tribe_slots table, sqlx)
//!         |-- DragonflySlotStore  (tribe:{id}:slots keys, fred)
//!         +-- MemorySlotStore     (BTreeMap, tests / infra-free)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- Backend-agnostic [`SlotStore`] handle
//! - [`postgres`] -- `PostgreSQL` backend and pool configuration
//! - [`dragonfly`] -- `Dragonfly` (Redis-compatible) backend
//! - [`memory`] -- In-memory backend
//! - [`error`] -- Shared error types

pub mod dragonfly;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export primary types for convenience.
pub use dragonfly::DragonflySlotStore;
pub use error::DbError;
pub use memory::MemorySlotStore;
pub use postgres::{PostgresConfig, PostgresSlotStore};
pub use store::SlotStore;

//! Slot cooldown policy engine for game tribes.
//!
//! When a player is removed from a tribe, the vacated membership slot is
//! withheld for a configurable cooldown so the tribe cannot instantly
//! replace the member. This crate holds the policy side of that
//! bookkeeping: deciding slot availability, expiring stale cooldowns,
//! reconciling cooldowns when two tribes merge, and gating everything
//! behind the activation delay that follows a world start. Durable state
//! lives in `tribeslots-db`; each operation is one read-decide-write cycle
//! against it.
//!
//! ```text
//! Host game server events
//!     |
//!     +-- TribeEventHandler   (grace period, exemptions, auto-wipe window)
//!         |
//!         +-- CooldownEngine  (availability, reservation, merge policy)
//!             |
//!             +-- SlotStore   (tribeslots-db: Postgres / Dragonfly / memory)
//! ```
//!
//! # Modules
//!
//! - [`policy`] -- Pure availability/expiry functions
//! - [`engine`] -- [`CooldownEngine`]: stateful operations over the store
//! - [`events`] -- [`TribeEventHandler`]: the four host-facing entry points
//! - [`config`] -- YAML configuration and resolved settings
//! - [`logging`] -- Tracing subscriber setup for embedding hosts

pub mod config;
pub mod engine;
pub mod events;
pub mod logging;
pub mod policy;

// Re-export primary types for convenience.
pub use config::{ConfigError, CooldownSettings, ServiceConfig, StoreBackend};
pub use engine::{CooldownEngine, EngineError};
pub use events::TribeEventHandler;
pub use logging::init_logging;

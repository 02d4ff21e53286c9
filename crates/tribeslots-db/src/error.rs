//! Error types for the storage layer.
//!
//! All failures are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] and [`fred`] errors. A missing tribe record is *not* an error
//! anywhere in this crate -- absence means "no cooldowns recorded" and the
//! read operations return an empty set instead.

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A `Dragonfly`/Redis operation failed.
    #[error("Dragonfly error: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A stored cooldown set could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration error (bad URL, unknown backend).
    #[error("Configuration error: {0}")]
    Config(String),
}

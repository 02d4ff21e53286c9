//! Configuration loading and typed config structures.
//!
//! The canonical configuration is a small YAML file. This module defines
//! strongly-typed structs mirroring it, a loader with validation, and the
//! conversion from human-facing hour values to the engine's second-based
//! settings. All sections have defaults; a file that parses but carries a
//! nonsensical value (negative hours, unknown backend) is rejected at load
//! time rather than surfacing later as engine misbehavior.
//!
//! Cooldown and activation-delay durations are configured in hours and
//! truncated to whole hours before conversion, matching the behavior the
//! game-server operators already rely on.

use std::path::Path;

use serde::Deserialize;

use tribeslots_db::{DbError, DragonflySlotStore, MemorySlotStore, PostgresSlotStore, SlotStore};

/// Seconds per hour, for the config-value conversion.
const FACTOR_HOURS_TO_SECONDS: i64 = 3600;

/// Upper bound on configured hour values. Generous (more than a century);
/// exists so the float-to-integer conversion below is provably in range.
const MAX_CONFIG_HOURS: f64 = 1_000_000.0;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its valid range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the value.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// Cooldown policy settings.
    #[serde(default)]
    pub cooldown: CooldownSection,

    /// Storage backend selection and connection URLs.
    #[serde(default)]
    pub storage: StorageSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for store URLs:
    /// - `DATABASE_URL` overrides `storage.postgres_url`
    /// - `DRAGONFLY_URL` overrides `storage.dragonfly_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on parse failure or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.storage.apply_env_overrides();
        config.cooldown.settings()?; // validate up front: bad durations are fatal
        Ok(config)
    }
}

/// Cooldown policy section of the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CooldownSection {
    /// Hours a slot stays reserved after a departure.
    pub slot_cooldown_hours: f64,
    /// Hours after world start during which no new cooldowns are created.
    pub delay_activation_hours: f64,
    /// Whether to clear the store when a fresh world is detected.
    pub auto_wipe_database: bool,
}

impl Default for CooldownSection {
    fn default() -> Self {
        Self {
            slot_cooldown_hours: 24.0,
            delay_activation_hours: 0.0,
            auto_wipe_database: false,
        }
    }
}

impl CooldownSection {
    /// Resolve the section into second-based engine settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either duration is negative,
    /// non-finite, or beyond [`MAX_CONFIG_HOURS`].
    pub fn settings(&self) -> Result<CooldownSettings, ConfigError> {
        Ok(CooldownSettings {
            cooldown_secs: hours_to_secs(self.slot_cooldown_hours, "slot_cooldown_hours")?,
            activation_delay_secs: hours_to_secs(
                self.delay_activation_hours,
                "delay_activation_hours",
            )?,
            auto_wipe: self.auto_wipe_database,
        })
    }
}

/// Resolved cooldown settings consumed by the engine. Immutable for the
/// process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownSettings {
    /// Seconds a slot stays reserved after a departure.
    pub cooldown_secs: i64,
    /// Seconds after world start during which no new cooldowns are created.
    pub activation_delay_secs: i64,
    /// Whether to clear the store when a fresh world is detected.
    pub auto_wipe: bool,
}

/// Convert a configured hour value to whole seconds, truncating to whole
/// hours first (fractional hours are ignored, as operators expect).
#[allow(clippy::cast_possible_truncation)]
fn hours_to_secs(hours: f64, field: &str) -> Result<i64, ConfigError> {
    if !hours.is_finite() || hours < 0.0 || hours > MAX_CONFIG_HOURS {
        return Err(ConfigError::Invalid {
            reason: format!("{field} must be between 0 and {MAX_CONFIG_HOURS} hours, got {hours}"),
        });
    }
    let whole_hours = hours.trunc() as i64;
    Ok(whole_hours.saturating_mul(FACTOR_HOURS_TO_SECONDS))
}

/// Which backing engine the store should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// `PostgreSQL` via the `tribe_slots` table.
    #[default]
    Postgres,
    /// `Dragonfly`/Redis via `tribe:{id}:slots` keys.
    Dragonfly,
    /// In-memory, non-durable. Tests and throwaway worlds only.
    Memory,
}

/// Storage section of the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Selected backing engine.
    pub backend: StoreBackend,
    /// `PostgreSQL` connection URL (`DATABASE_URL` overrides).
    pub postgres_url: String,
    /// `Dragonfly` connection URL (`DRAGONFLY_URL` overrides).
    pub dragonfly_url: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            postgres_url: "postgresql://localhost:5432/tribeslots".to_owned(),
            dragonfly_url: "redis://localhost:6379".to_owned(),
        }
    }
}

impl StorageSection {
    /// Apply environment variable overrides for connection URLs.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.postgres_url = url;
        }
        if let Ok(url) = std::env::var("DRAGONFLY_URL") {
            self.dragonfly_url = url;
        }
    }

    /// Connect to the selected backend and return the store handle.
    ///
    /// For the `PostgreSQL` backend this also runs pending migrations, so a
    /// fresh database is usable without a separate provisioning step.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or migration fails.
    pub async fn connect(&self) -> Result<SlotStore, DbError> {
        match self.backend {
            StoreBackend::Postgres => {
                let store = PostgresSlotStore::connect_url(&self.postgres_url).await?;
                store.run_migrations().await?;
                Ok(SlotStore::from(store))
            }
            StoreBackend::Dragonfly => {
                let store = DragonflySlotStore::connect(&self.dragonfly_url).await?;
                Ok(SlotStore::from(store))
            }
            StoreBackend::Memory => Ok(SlotStore::from(MemorySlotStore::new())),
        }
    }
}

/// Logging section of the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default log filter when `RUST_LOG` is not set (e.g. `info`,
    /// `tribeslots_core=debug`).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ServiceConfig::parse("{}").unwrap();
        assert_eq!(config.cooldown, CooldownSection::default());
        assert_eq!(config.storage.backend, StoreBackend::Postgres);
        assert_eq!(config.logging.level, "info");

        let settings = config.cooldown.settings().unwrap();
        assert_eq!(settings.cooldown_secs, 24 * 3600);
        assert_eq!(settings.activation_delay_secs, 0);
        assert!(!settings.auto_wipe);
    }

    #[test]
    fn full_yaml_parses() {
        let yaml = r"
cooldown:
  slot_cooldown_hours: 48.0
  delay_activation_hours: 2.0
  auto_wipe_database: true
storage:
  backend: dragonfly
  dragonfly_url: redis://cache:6379
logging:
  level: debug
";
        let config = ServiceConfig::parse(yaml).unwrap();
        let settings = config.cooldown.settings().unwrap();
        assert_eq!(settings.cooldown_secs, 48 * 3600);
        assert_eq!(settings.activation_delay_secs, 2 * 3600);
        assert!(settings.auto_wipe);
        assert_eq!(config.storage.backend, StoreBackend::Dragonfly);
        assert_eq!(config.storage.dragonfly_url, "redis://cache:6379");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn fractional_hours_truncate_to_whole_hours() {
        let yaml = "cooldown:\n  slot_cooldown_hours: 1.9\n";
        let config = ServiceConfig::parse(yaml).unwrap();
        assert_eq!(config.cooldown.settings().unwrap().cooldown_secs, 3600);
    }

    #[test]
    fn negative_hours_are_fatal() {
        let yaml = "cooldown:\n  slot_cooldown_hours: -1.0\n";
        assert!(matches!(
            ServiceConfig::parse(yaml),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn unknown_backend_is_fatal() {
        let yaml = "storage:\n  backend: cassandra\n";
        assert!(matches!(
            ServiceConfig::parse(yaml),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn malformed_yaml_is_fatal() {
        assert!(matches!(
            ServiceConfig::parse("cooldown: ["),
            Err(ConfigError::Yaml { .. })
        ));
    }
}

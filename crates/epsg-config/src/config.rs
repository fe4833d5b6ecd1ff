// crates/epsg-config/src/config.rs
// ============================================================================
// Module: EPSG Configuration
// Description: Configuration loading and validation for the EPSG factory.
// Purpose: Provide strict config parsing with hard limits.
// Dependencies: epsg-factory, epsg-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! The file is located by an explicit path, then the `EPSG_FACTORY_CONFIG`
//! environment variable, then `epsg-factory.toml` in the working directory.
//! A relative dataset path is resolved against the directory of the file
//! that names it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use epsg_factory::DEFAULT_AUTHORITY;
use epsg_factory::DEFAULT_CODE_BATCH_SIZE;
use epsg_factory::DEFAULT_MAX_STRONG_REFERENCES;
use epsg_factory::FactoryOptions;
use epsg_factory::SqlDialect;
use epsg_store_sqlite::SqliteStoreConfig;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "epsg-factory.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "EPSG_FACTORY_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum naming authority length.
pub(crate) const MAX_AUTHORITY_LENGTH: usize = 64;
/// Largest accepted enumeration batch.
pub(crate) const MAX_CODE_BATCH_SIZE: usize = 10_000;
/// Largest accepted strong reference buffer.
pub(crate) const MAX_STRONG_REFERENCES: usize = 100_000;
/// Largest accepted busy timeout in milliseconds.
pub(crate) const MAX_BUSY_TIMEOUT_MS: u64 = 60_000;
/// Default busy timeout in milliseconds.
pub(crate) const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default idle timeout in milliseconds (30 minutes).
pub(crate) const DEFAULT_IDLE_TIMEOUT_MS: u64 = 30 * 60 * 1_000;
/// Default sweep interval in milliseconds.
pub(crate) const DEFAULT_SWEEP_INTERVAL_MS: u64 = 60_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// EPSG factory configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EpsgConfig {
    /// Dataset location and access settings.
    pub database: DatabaseConfig,
    /// Factory and facade tunables.
    #[serde(default)]
    pub factory: FactoryConfig,
}

impl EpsgConfig {
    /// Returns a configuration for the dataset at `path` with default tunables.
    #[must_use]
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseConfig {
                path: path.into(),
                dialect: SqlDialect::default(),
                busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
                read_only: true,
            },
            factory: FactoryConfig::default(),
        }
    }

    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::parse(content)?;
        if let Some(base) = resolved.parent() {
            config.database.anchor_to(base);
        }
        Ok(config)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] when validation fails.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.factory.validate()
    }

    /// Returns the dataset connection settings.
    #[must_use]
    pub fn store_config(&self) -> SqliteStoreConfig {
        SqliteStoreConfig {
            path: self.database.path.clone(),
            busy_timeout_ms: self.database.busy_timeout_ms,
            read_only: self.database.read_only,
        }
    }

    /// Returns the factory options.
    #[must_use]
    pub fn factory_options(&self) -> FactoryOptions {
        FactoryOptions {
            authority: self.factory.authority.trim().to_string(),
            dialect: self.database.dialect,
            code_batch_size: self.factory.code_batch_size,
            idle_timeout: Duration::from_millis(self.factory.idle_timeout_ms),
            sweep_interval: Duration::from_millis(self.factory.sweep_interval_ms),
            max_strong_references: self.factory.max_strong_references,
        }
    }
}

/// Dataset configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the `SQLite` dataset file.
    pub path: PathBuf,
    /// Table naming and quoting used by the dataset.
    #[serde(default)]
    pub dialect: SqlDialect,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Opens the dataset read-only.
    #[serde(default = "default_read_only")]
    pub read_only: bool,
}

impl DatabaseConfig {
    /// Validates dataset settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".to_string()));
        }
        validate_path(&self.path)?;
        if self.busy_timeout_ms > MAX_BUSY_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "database.busy_timeout_ms must be at most {MAX_BUSY_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    /// Resolves a relative dataset path against `base`.
    fn anchor_to(&mut self, base: &Path) {
        if self.path.is_relative() && !base.as_os_str().is_empty() {
            self.path = base.join(&self.path);
        }
    }
}

/// Factory and facade tunables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactoryConfig {
    /// Naming authority of the dataset.
    #[serde(default = "default_authority")]
    pub authority: String,
    /// Inactivity before the backing store is released; zero disables it.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
    /// Period between idle checks.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
    /// Recently created objects kept strongly referenced.
    #[serde(default = "default_max_strong_references")]
    pub max_strong_references: usize,
    /// Codes fetched per enumeration batch.
    #[serde(default = "default_code_batch_size")]
    pub code_batch_size: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            authority: default_authority(),
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            max_strong_references: DEFAULT_MAX_STRONG_REFERENCES,
            code_batch_size: DEFAULT_CODE_BATCH_SIZE,
        }
    }
}

impl FactoryConfig {
    /// Validates factory tunables.
    fn validate(&self) -> Result<(), ConfigError> {
        let authority = self.authority.trim();
        if authority.is_empty() {
            return Err(ConfigError::Invalid("factory.authority must not be empty".to_string()));
        }
        if authority.len() > MAX_AUTHORITY_LENGTH {
            return Err(ConfigError::Invalid("factory.authority exceeds length limit".to_string()));
        }
        if authority.contains(':') {
            return Err(ConfigError::Invalid("factory.authority must not contain ':'".to_string()));
        }
        if self.code_batch_size == 0 || self.code_batch_size > MAX_CODE_BATCH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "factory.code_batch_size must be between 1 and {MAX_CODE_BATCH_SIZE}"
            )));
        }
        if self.idle_timeout_ms > 0 && self.sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "factory.sweep_interval_ms must be positive when idle teardown is enabled"
                    .to_string(),
            ));
        }
        if self.max_strong_references > MAX_STRONG_REFERENCES {
            return Err(ConfigError::Invalid(format!(
                "factory.max_strong_references must be at most {MAX_STRONG_REFERENCES}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read-only flag.
const fn default_read_only() -> bool {
    true
}

/// Returns the default naming authority.
fn default_authority() -> String {
    DEFAULT_AUTHORITY.to_string()
}

/// Returns the default idle timeout.
const fn default_idle_timeout_ms() -> u64 {
    DEFAULT_IDLE_TIMEOUT_MS
}

/// Returns the default sweep interval.
const fn default_sweep_interval_ms() -> u64 {
    DEFAULT_SWEEP_INTERVAL_MS
}

/// Returns the default strong reference buffer size.
const fn default_max_strong_references() -> usize {
    DEFAULT_MAX_STRONG_REFERENCES
}

/// Returns the default enumeration batch size.
const fn default_code_batch_size() -> usize {
    DEFAULT_CODE_BATCH_SIZE
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Path Resolution
// ============================================================================

/// Resolves the config path from CLI input or environment.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    resolve_path_with(path, env::var(CONFIG_ENV_VAR).ok())
}

/// Resolves the config path given the environment override value.
fn resolve_path_with(path: Option<&Path>, env_path: Option<String>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = env_path.filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::path::PathBuf;

    use super::DEFAULT_CONFIG_NAME;
    use super::resolve_path_with;

    #[test]
    fn explicit_path_wins_over_environment() {
        let resolved =
            resolve_path_with(Some(Path::new("explicit.toml")), Some("env.toml".to_string()));
        assert!(matches!(resolved, Ok(path) if path == Path::new("explicit.toml")));
    }

    #[test]
    fn environment_wins_over_default() {
        let resolved = resolve_path_with(None, Some("env.toml".to_string()));
        assert!(matches!(resolved, Ok(path) if path == Path::new("env.toml")));
    }

    #[test]
    fn blank_environment_falls_back_to_default() {
        let resolved = resolve_path_with(None, Some("  ".to_string()));
        assert!(matches!(resolved, Ok(path) if path == PathBuf::from(DEFAULT_CONFIG_NAME)));
    }

    #[test]
    fn overlong_environment_path_is_rejected() {
        let resolved = resolve_path_with(None, Some("a".repeat(5000)));
        assert!(resolved.is_err());
    }
}

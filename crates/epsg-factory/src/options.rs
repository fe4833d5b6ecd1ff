// crates/epsg-factory/src/options.rs
// ============================================================================
// Module: Factory Options
// Description: Tunables shared by the raw factory and the deferred facade.
// Purpose: Carry authority, dialect, enumeration, and idle-teardown settings.
// Dependencies: crate::dialect
// ============================================================================

//! ## Overview
//! [`FactoryOptions`] is built from configuration by the caller; the factory
//! crate never reads files or environment variables itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use crate::dialect::SqlDialect;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default naming authority.
pub const DEFAULT_AUTHORITY: &str = "EPSG";
/// Default number of codes fetched per enumeration batch.
pub const DEFAULT_CODE_BATCH_SIZE: usize = 256;
/// Default inactivity period before the backing store is released.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Default period between idle checks.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
/// Default number of recently created objects kept strongly referenced.
pub const DEFAULT_MAX_STRONG_REFERENCES: usize = 100;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Factory tunables.
///
/// # Invariants
/// - `code_batch_size` is at least one.
/// - A zero `idle_timeout` disables idle teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryOptions {
    /// Naming authority stripped from codes and stamped on identifiers.
    pub authority: String,
    /// Query text dialect of the backend.
    pub dialect: SqlDialect,
    /// Codes fetched per enumeration batch.
    pub code_batch_size: usize,
    /// Inactivity period before the facade releases its backing store.
    pub idle_timeout: Duration,
    /// Period between idle checks of the facade.
    pub sweep_interval: Duration,
    /// Recently created objects the facade keeps strongly referenced.
    pub max_strong_references: usize,
}

impl Default for FactoryOptions {
    fn default() -> Self {
        Self {
            authority: DEFAULT_AUTHORITY.to_string(),
            dialect: SqlDialect::default(),
            code_batch_size: DEFAULT_CODE_BATCH_SIZE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_strong_references: DEFAULT_MAX_STRONG_REFERENCES,
        }
    }
}

impl FactoryOptions {
    /// Returns options using `dialect` and defaults elsewhere.
    #[must_use]
    pub fn with_dialect(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Returns the enumeration batch size, never zero.
    #[must_use]
    pub fn batch_size(&self) -> usize {
        self.code_batch_size.max(1)
    }

    /// Returns `true` when idle teardown is enabled.
    #[must_use]
    pub const fn idle_teardown_enabled(&self) -> bool {
        !self.idle_timeout.is_zero()
    }
}

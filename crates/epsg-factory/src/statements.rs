// crates/epsg-factory/src/statements.rs
// ============================================================================
// Module: Prepared Statement Pool
// Description: Per-factory cache of prepared statement handles.
// Purpose: Prepare each logical query once and release all handles on disposal.
// Dependencies: epsg-core
// ============================================================================

//! ## Overview
//! Handles are keyed by a logical query name. A pool belongs to exactly one
//! factory and is only touched while that factory's lock is held.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use epsg_core::BackendError;
use epsg_core::EpsgConnection;
use epsg_core::StatementHandle;

// ============================================================================
// SECTION: Pool
// ============================================================================

/// Prepared statement handles by logical key.
#[derive(Debug, Default)]
pub struct StatementPool {
    /// Handles by key.
    handles: HashMap<String, StatementHandle>,
}

impl StatementPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `key`, preparing `sql()` on first use.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when preparation fails.
    pub fn handle(
        &mut self,
        connection: &mut dyn EpsgConnection,
        key: &str,
        sql: impl FnOnce() -> String,
    ) -> Result<StatementHandle, BackendError> {
        if let Some(handle) = self.handles.get(key) {
            return Ok(*handle);
        }
        let handle = connection.prepare(&sql())?;
        self.handles.insert(key.to_string(), handle);
        Ok(handle)
    }

    /// Returns the number of prepared statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` when no statement is prepared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Releases every handle, returning the failures.
    pub fn close_all(&mut self, connection: &mut dyn EpsgConnection) -> Vec<BackendError> {
        self.handles
            .drain()
            .filter_map(|(_, handle)| connection.close_statement(handle).err())
            .collect()
    }

    /// Forgets every handle without releasing them.
    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

// crates/epsg-store-sqlite/src/lib.rs
// ============================================================================
// Module: EPSG SQLite Store Library
// Description: SQLite-backed EPSG dataset connections.
// Purpose: Serve factory queries from an SQLite copy of the EPSG dataset.
// Dependencies: crate::store
// ============================================================================

//! ## Overview
//! This crate provides the [`epsg_core::EpsgConnection`] implementation used
//! in production: an `SQLite` database holding the EPSG tables under their
//! shipped (bracket-quoted) names or their `epsg_*` names.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteConnector;
pub use store::SqliteEpsgConnection;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;

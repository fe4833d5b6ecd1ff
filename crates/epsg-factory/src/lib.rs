// crates/epsg-factory/src/lib.rs
// ============================================================================
// Module: EPSG Factory Library
// Description: Object factory and caching facade over an EPSG dataset.
// Purpose: Turn authority codes into fully wired referencing objects.
// Dependencies: crate::{codes, deferred, factory}
// ============================================================================

//! ## Overview
//! [`EpsgFactory`] resolves EPSG codes (or names) against a relational copy of
//! the EPSG dataset and builds the referencing objects defined in
//! [`epsg_core`]: units, ellipsoids, datums with their datum shifts,
//! coordinate systems, CRSs, and coordinate operations. [`AuthorityCodeSet`]
//! enumerates the codes of one object type lazily, and
//! [`DeferredEpsgFactory`] opens a factory on demand and releases it after a
//! period of inactivity.
//!
//! The crate never opens databases itself; callers supply an
//! [`epsg_core::EpsgConnection`] or [`epsg_core::EpsgConnector`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod codes;
pub mod decoder;
pub mod deferred;
pub mod dialect;
pub mod factory;
pub mod options;
pub mod queries;
pub mod statements;
pub mod tables;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use codes::AuthorityCodeSet;
pub use codes::CodeIter;
pub use codes::NameMap;
pub use decoder::RowDecoder;
pub use deferred::DeferredEpsgFactory;
pub use dialect::SqlDialect;
pub use factory::ConnectionOwnership;
pub use factory::EpsgFactory;
pub use options::DEFAULT_AUTHORITY;
pub use options::DEFAULT_CODE_BATCH_SIZE;
pub use options::DEFAULT_IDLE_TIMEOUT;
pub use options::DEFAULT_MAX_STRONG_REFERENCES;
pub use options::DEFAULT_SWEEP_INTERVAL;
pub use options::FactoryOptions;
pub use tables::TableDescriptor;

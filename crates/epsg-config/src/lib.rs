// crates/epsg-config/src/lib.rs
// ============================================================================
// Module: EPSG Config Library
// Description: Configuration model and validation for the EPSG factory.
// Purpose: Single source of truth for epsg-factory.toml semantics.
// Dependencies: epsg-factory, epsg-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `epsg-config` defines the TOML configuration read by the `epsg` command
//! line and by embedders that do not build [`epsg_factory::FactoryOptions`]
//! themselves. Validation is strict and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;

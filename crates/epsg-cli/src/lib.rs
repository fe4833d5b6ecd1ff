// crates/epsg-cli/src/lib.rs
// ============================================================================
// Module: EPSG CLI Library
// Description: Command execution shared by the `epsg` binary and its tests.
// Purpose: Keep the binary a thin argument-parsing shell.
// Dependencies: crate::commands
// ============================================================================

//! ## Overview
//! Library half of the `epsg` command line. The binary parses arguments,
//! installs logging, and forwards a [`Request`] to [`execute`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod commands;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use commands::CliError;
pub use commands::CliResult;
pub use commands::Request;
pub use commands::execute;
pub use commands::open_factory;

// crates/epsg-cli/src/commands.rs
// ============================================================================
// Module: EPSG CLI Commands
// Description: Command execution against the deferred factory.
// Purpose: Render factory answers as JSON on a caller-supplied writer.
// Dependencies: epsg-config, epsg-core, epsg-factory, epsg-store-sqlite, serde_json
// ============================================================================

//! ## Overview
//! Each [`Request`] runs against a [`DeferredEpsgFactory`] and writes one JSON
//! document followed by a newline. Nothing here touches the process streams;
//! the binary hands in a locked stdout.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Arc;

use epsg_config::ConfigError;
use epsg_config::EpsgConfig;
use epsg_core::CoordinateOperation;
use epsg_core::FactoryError;
use epsg_core::IdentifiedObject;
use epsg_core::ObjectType;
use epsg_factory::DeferredEpsgFactory;
use epsg_store_sqlite::SqliteConnector;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures of a CLI invocation.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The dataset connector could not be created.
    #[error("failed to open dataset: {0}")]
    Store(String),
    /// The factory rejected the request.
    #[error(transparent)]
    Factory(#[from] FactoryError),
    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Output(String),
}

/// CLI result alias for fallible operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// One CLI request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Build the object a code identifies.
    Object {
        /// Code or name.
        code: String,
    },
    /// List the codes of a type.
    Codes {
        /// Type enumerated.
        object_type: ObjectType,
        /// Maximum number of codes listed.
        limit: Option<usize>,
        /// Include the name of every listed code.
        names: bool,
    },
    /// Print the name of the object a code identifies.
    Describe {
        /// Code or name.
        code: String,
    },
    /// List the operations between two CRS codes.
    Operations {
        /// Source CRS code.
        source: String,
        /// Target CRS code.
        target: String,
    },
}

// ============================================================================
// SECTION: Output Documents
// ============================================================================

/// Output of [`Request::Codes`].
#[derive(Debug, Serialize)]
struct CodeListing {
    /// Type enumerated.
    object_type: ObjectType,
    /// Number of codes of the type.
    size: usize,
    /// Listed codes.
    codes: Vec<CodeEntry>,
}

/// One listed code.
#[derive(Debug, Serialize)]
struct CodeEntry {
    /// Primary key.
    code: String,
    /// Object name, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Output of [`Request::Describe`].
#[derive(Debug, Serialize)]
struct Description<'a> {
    /// Code as given.
    code: &'a str,
    /// Object name.
    name: String,
}

/// Output of [`Request::Operations`].
#[derive(Debug, Serialize)]
struct OperationListing<'a> {
    /// Source CRS code as given.
    source: &'a str,
    /// Target CRS code as given.
    target: &'a str,
    /// Operations, preferred first.
    operations: Vec<Arc<CoordinateOperation>>,
}

/// Output of [`Request::Object`].
#[derive(Debug, Serialize)]
struct ObjectDocument<'a> {
    /// Code as given.
    code: &'a str,
    /// Built object.
    value: IdentifiedObject,
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Opens a deferred factory over the dataset `config` names.
///
/// # Errors
///
/// Returns [`CliError::Store`] when the dataset path is rejected.
pub fn open_factory(config: &EpsgConfig) -> CliResult<DeferredEpsgFactory> {
    let connector = SqliteConnector::new(config.store_config())
        .map_err(|err| CliError::Store(err.to_string()))?;
    Ok(DeferredEpsgFactory::new(Arc::new(connector), config.factory_options()))
}

/// Runs `request` and writes its JSON answer to `out`.
///
/// # Errors
///
/// Returns [`CliError::Factory`] when the factory rejects the request and
/// [`CliError::Output`] when the answer cannot be written.
pub fn execute(
    factory: &DeferredEpsgFactory,
    request: &Request,
    out: &mut impl Write,
) -> CliResult<()> {
    debug!(request = request.name(), "executing request");
    match request {
        Request::Object {
            code,
        } => {
            let value = factory.create_object(code)?;
            write_json(
                out,
                &ObjectDocument {
                    code,
                    value,
                },
            )
        }
        Request::Codes {
            object_type,
            limit,
            names,
        } => {
            let set = factory.authority_codes(*object_type)?;
            let view = set.names();
            let codes = set
                .iter()?
                .take(limit.unwrap_or(usize::MAX))
                .map(|code| {
                    let name = if *names { view.get(&code) } else { None };
                    CodeEntry {
                        code,
                        name,
                    }
                })
                .collect();
            let listing = CodeListing {
                object_type: *object_type,
                size: set.size(),
                codes,
            };
            write_json(out, &listing)
        }
        Request::Describe {
            code,
        } => {
            let name = factory.description_text(code)?;
            write_json(
                out,
                &Description {
                    code,
                    name,
                },
            )
        }
        Request::Operations {
            source,
            target,
        } => {
            let operations =
                factory.create_from_coordinate_reference_system_codes(source, target)?;
            write_json(
                out,
                &OperationListing {
                    source,
                    target,
                    operations,
                },
            )
        }
    }
}

impl Request {
    /// Returns the subcommand name of the request.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Object {
                ..
            } => "object",
            Self::Codes {
                ..
            } => "codes",
            Self::Describe {
                ..
            } => "describe",
            Self::Operations {
                ..
            } => "operations",
        }
    }
}

/// Writes `value` as pretty JSON followed by a newline.
fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(out).map_err(|err| CliError::Output(err.to_string()))
}

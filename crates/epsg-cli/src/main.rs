// crates/epsg-cli/src/main.rs
// ============================================================================
// Module: EPSG CLI Entry Point
// Description: Command dispatcher for EPSG dataset lookups.
// Purpose: Print factory objects, code lists, and operations as JSON.
// Dependencies: clap, epsg-cli, epsg-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! `epsg` resolves codes against an EPSG dataset and prints the answer as
//! JSON on stdout. Errors go to stderr with a failing exit code. Logging is
//! controlled through `RUST_LOG` and also goes to stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use epsg_cli::CliResult;
use epsg_cli::Request;
use epsg_cli::execute;
use epsg_cli::open_factory;
use epsg_config::EpsgConfig;
use epsg_core::ObjectType;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "epsg", version, about = "Look up objects in an EPSG dataset")]
struct Cli {
    /// Configuration file (overrides `EPSG_FACTORY_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Dataset file; skips the configuration file and uses defaults.
    #[arg(long, value_name = "PATH", global = true, conflicts_with = "config")]
    database: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the object identified by a code or name.
    Object {
        /// EPSG code (`4326`, `EPSG:4326`) or object name.
        code: String,
    },
    /// List the codes of an object type.
    Codes {
        /// Object type, for example `geographic_crs` or `unit`.
        object_type: ObjectType,
        /// Maximum number of codes listed.
        #[arg(long)]
        limit: Option<usize>,
        /// Include object names.
        #[arg(long)]
        names: bool,
    },
    /// Print the name of the object identified by a code.
    Describe {
        /// EPSG code or object name.
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

impl From<Commands> for Request {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Object {
                code,
            } => Self::Object {
                code,
            },
            Commands::Codes {
                object_type,
                limit,
                names,
            } => Self::Codes {
                object_type,
                limit,
                names,
            },
            Commands::Describe {
                code,
            } => Self::Describe {
                code,
            },
            Commands::Operations {
                source,
                target,
            } => Self::Operations {
                source,
                target,
            },
        }
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration, opens the factory, and runs the command.
fn run(cli: Cli) -> CliResult<()> {
    let config = match cli.database {
        Some(path) => {
            let config = EpsgConfig::with_database(path);
            config.validate()?;
            config
        }
        None => EpsgConfig::load(cli.config.as_deref())?,
    };
    let factory = open_factory(&config)?;
    let request = Request::from(cli.command);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&factory, &request, &mut out)
}

/// Installs the stderr log subscriber filtered by `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "{message}");
    ExitCode::FAILURE
}

// crates/epsg-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite EPSG Store
// Description: EPSG dataset connection and connector backed by SQLite.
// Purpose: Prepare and run factory queries, materializing every row.
// Dependencies: epsg-core, rusqlite, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`SqliteEpsgConnection`] keeps the SQL text of every prepared handle and
//! relies on the `SQLite` statement cache for reuse. Each query materializes
//! its rows before returning, so no statement stays open between calls.
//! Dataset files are opened read-only unless configured otherwise and are
//! never created.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use epsg_core::BackendError;
use epsg_core::EpsgConnection;
use epsg_core::EpsgConnector;
use epsg_core::Row;
use epsg_core::SqlValue;
use epsg_core::StatementHandle;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use rusqlite::types::ValueRef;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Capacity of the per-connection prepared statement cache.
const STATEMENT_CACHE_CAPACITY: usize = 64;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for an `SQLite` EPSG dataset.
///
/// # Invariants
/// - `path` must name an existing file (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` dataset file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// Opens the dataset read-only.
    #[serde(default = "default_read_only")]
    pub read_only: bool,
}

impl SqliteStoreConfig {
    /// Creates a read-only configuration with default timeouts.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            read_only: true,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Returns the default read-only flag.
const fn default_read_only() -> bool {
    true
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding row payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Invalid store configuration.
    #[error("sqlite store invalid config: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for BackendError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) | SqliteStoreError::Invalid(message) => {
                Self::Connection(message)
            }
            SqliteStoreError::Db(message) => Self::Query(message),
        }
    }
}

// ============================================================================
// SECTION: Connection
// ============================================================================

/// EPSG dataset connection over `SQLite`.
pub struct SqliteEpsgConnection {
    /// Open connection; `None` once closed.
    connection: Option<Connection>,
    /// SQL text by handle index; `None` for released handles.
    statements: Vec<Option<String>>,
    /// Data source path for diagnostics.
    path: PathBuf,
}

impl std::fmt::Debug for SqliteEpsgConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEpsgConnection")
            .field("path", &self.path)
            .field("open", &self.connection.is_some())
            .finish_non_exhaustive()
    }
}

impl SqliteEpsgConnection {
    /// Opens the dataset described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is invalid or the database
    /// cannot be opened.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        let connection = open_connection(config)?;
        debug!(path = %config.path.display(), read_only = config.read_only, "opened epsg dataset");
        Ok(Self {
            connection: Some(connection),
            statements: Vec::new(),
            path: config.path.clone(),
        })
    }

    /// Returns the open connection.
    fn connection(&self) -> Result<&Connection, BackendError> {
        self.connection.as_ref().ok_or(BackendError::Closed)
    }

    /// Returns the SQL text registered under `handle`.
    fn sql(&self, handle: StatementHandle) -> Result<&str, BackendError> {
        self.statements
            .get(handle.index())
            .and_then(Option::as_deref)
            .ok_or(BackendError::UnknownStatement(handle.index()))
    }
}

impl EpsgConnection for SqliteEpsgConnection {
    fn prepare(&mut self, sql: &str) -> Result<StatementHandle, BackendError> {
        self.connection()?
            .prepare_cached(sql)
            .map_err(|err| BackendError::Query(err.to_string()))?;
        self.statements.push(Some(sql.to_string()));
        Ok(StatementHandle::new(self.statements.len() - 1))
    }

    fn query(
        &mut self,
        handle: StatementHandle,
        params: &[SqlValue],
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, BackendError> {
        let sql = self.sql(handle)?;
        let connection = self.connection()?;
        let mut statement =
            connection.prepare_cached(sql).map_err(|err| BackendError::Query(err.to_string()))?;
        let columns = statement.column_count();
        let mut rows = statement
            .query(params_from_iter(params.iter().map(to_sql_value)))
            .map_err(|err| BackendError::Query(err.to_string()))?;
        let limit = max_rows.unwrap_or(usize::MAX);
        let mut output = Vec::new();
        while output.len() < limit {
            let Some(row) = rows.next().map_err(|err| BackendError::Query(err.to_string()))? else {
                break;
            };
            let mut values = Vec::with_capacity(columns);
            for index in 0 .. columns {
                let value =
                    row.get_ref(index).map_err(|err| BackendError::Query(err.to_string()))?;
                values.push(from_sql_value(value));
            }
            output.push(Row::new(values));
        }
        Ok(output)
    }

    fn close_statement(&mut self, handle: StatementHandle) -> Result<(), BackendError> {
        let slot = self
            .statements
            .get_mut(handle.index())
            .ok_or(BackendError::UnknownStatement(handle.index()))?;
        if slot.take().is_none() {
            return Err(BackendError::UnknownStatement(handle.index()));
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.statements.clear();
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        connection.close().map_err(|(_, err)| BackendError::Connection(err.to_string()))?;
        debug!(path = %self.path.display(), "closed epsg dataset");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("SQLite {}", self.path.display())
    }
}

// ============================================================================
// SECTION: Connector
// ============================================================================

/// Opens [`SqliteEpsgConnection`]s on demand.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    /// Dataset configuration.
    config: SqliteStoreConfig,
}

impl SqliteConnector {
    /// Creates a connector after validating the dataset path.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when the path violates limits.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        Ok(Self {
            config,
        })
    }

    /// Returns the dataset configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }
}

impl EpsgConnector for SqliteConnector {
    fn connect(&self) -> Result<Box<dyn EpsgConnection>, BackendError> {
        Ok(Box::new(SqliteEpsgConnection::open(&self.config)?))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Converts a bound parameter to an `SQLite` value.
fn to_sql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(value) => Value::Integer(*value),
        SqlValue::Real(value) => Value::Real(*value),
        SqlValue::Text(value) => Value::Text(value.clone()),
    }
}

/// Converts an `SQLite` column value; blobs are decoded as lossy UTF-8 text.
fn from_sql_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(value) => SqlValue::Integer(value),
        ValueRef::Real(value) => SqlValue::Real(value),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Opens an `SQLite` connection to an existing dataset.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    if !config.path.is_file() {
        return Err(SqliteStoreError::Io(format!(
            "epsg dataset not found: {}",
            config.path.display()
        )));
    }
    let access = if config.read_only {
        OpenFlags::SQLITE_OPEN_READ_ONLY
    } else {
        OpenFlags::SQLITE_OPEN_READ_WRITE
    };
    let flags = access | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    connection.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
    Ok(connection)
}

/// Applies `SQLite` pragmas for dataset reads.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    if config.read_only {
        connection
            .execute_batch("PRAGMA query_only = ON;")
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    }
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

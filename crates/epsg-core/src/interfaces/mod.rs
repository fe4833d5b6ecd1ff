// crates/epsg-core/src/interfaces/mod.rs
// ============================================================================
// Module: EPSG Interfaces
// Description: Backend-agnostic query and math-transform contracts.
// Purpose: Define the seams between the factory, its storage, and numerics.
// Dependencies: crate::core, crate::runtime, thiserror
// ============================================================================

//! ## Overview
//! Interfaces describe how the factory reaches the EPSG dataset without
//! embedding any driver, and how operations obtain executable transforms
//! without embedding projection kernels.
//!
//! Query backends return fully materialized rows. A caller therefore never
//! holds a live cursor while it recurses into another query on the same
//! connection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::operation::OperationMethod;
use crate::core::operation::ParameterValueGroup;
use crate::runtime::Matrix;

// ============================================================================
// SECTION: Query Values
// ============================================================================

/// Scalar value bound to, or returned by, a query.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// Integer value.
    Integer(i64),
    /// Floating-point value.
    Real(f64),
    /// Text value.
    Text(String),
}

impl SqlValue {
    /// Returns the value as text; integers are rendered in decimal.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Real(_) | Self::Null => None,
        }
    }

    /// Returns the value as a float; numeric text is parsed.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            #[allow(clippy::cast_precision_loss, reason = "EPSG integers fit in f64 mantissa.")]
            Self::Integer(value) => Some(*value as f64),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Returns the value as an integer; integral text is parsed.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Real(_) | Self::Null => None,
        }
    }

    /// Returns `true` for SQL `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

/// Materialized result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    /// Column values in select-list order.
    pub values: Vec<SqlValue>,
}

impl Row {
    /// Creates a row from column values.
    #[must_use]
    pub const fn new(values: Vec<SqlValue>) -> Self {
        Self {
            values,
        }
    }

    /// Returns the value at zero-based column `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Handle to a statement prepared on one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementHandle(usize);

impl StatementHandle {
    /// Wraps a backend-assigned statement index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the backend-assigned statement index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

// ============================================================================
// SECTION: Query Backend
// ============================================================================

/// Query backend errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Connection could not be opened or was lost.
    #[error("connection error: {0}")]
    Connection(String),
    /// Statement preparation or execution failed.
    #[error("query error: {0}")]
    Query(String),
    /// Connection was already closed.
    #[error("connection closed")]
    Closed,
    /// Statement handle does not belong to this connection.
    #[error("unknown statement handle {0}")]
    UnknownStatement(usize),
}

/// Open connection to an EPSG dataset.
///
/// Implementations are used by one factory at a time, under its lock.
pub trait EpsgConnection: Send {
    /// Prepares `sql` and returns a reusable handle.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the statement cannot be prepared.
    fn prepare(&mut self, sql: &str) -> Result<StatementHandle, BackendError>;

    /// Executes a prepared statement and materializes up to `max_rows` rows.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when execution or decoding fails.
    fn query(
        &mut self,
        handle: StatementHandle,
        params: &[SqlValue],
        max_rows: Option<usize>,
    ) -> Result<Vec<Row>, BackendError>;

    /// Releases a prepared statement.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the handle is unknown.
    fn close_statement(&mut self, handle: StatementHandle) -> Result<(), BackendError>;

    /// Closes the connection; later calls fail with [`BackendError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the backend fails to close cleanly.
    fn close(&mut self) -> Result<(), BackendError>;

    /// Returns a short human-readable description of the data source.
    fn describe(&self) -> String;
}

/// Opens connections on demand.
pub trait EpsgConnector: Send + Sync {
    /// Opens a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the data source is unreachable.
    fn connect(&self) -> Result<Box<dyn EpsgConnection>, BackendError>;
}

// ============================================================================
// SECTION: Math Transforms
// ============================================================================

/// Math transform errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Input or chained dimensions disagree.
    #[error("mismatched dimension: expected {expected}, got {actual}")]
    MismatchedDimension {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },
    /// A required method parameter is absent.
    #[error("missing parameter: {0}")]
    MissingParameter(String),
    /// The transform cannot be evaluated.
    #[error("unsupported transform: {0}")]
    Unsupported(String),
    /// The transform has no inverse.
    #[error("transform is not invertible")]
    NonInvertible,
}

/// Executable mapping between ordinate tuples.
pub trait MathTransform: Send + Sync + fmt::Debug {
    /// Returns the input dimension.
    fn source_dimensions(&self) -> usize;

    /// Returns the output dimension.
    fn target_dimensions(&self) -> usize;

    /// Returns `true` when the transform leaves every position unchanged.
    fn is_identity(&self) -> bool {
        false
    }

    /// Transforms one position.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when the input has the wrong dimension or the
    /// transform cannot be evaluated.
    fn transform(&self, point: &[f64]) -> Result<Vec<f64>, TransformError>;

    /// Returns the inverse transform.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonInvertible`] when no inverse exists.
    fn inverse(&self) -> Result<Arc<dyn MathTransform>, TransformError>;

    /// Returns a well-known-text rendering; equal text means equal transforms.
    fn to_wkt(&self) -> String;

    /// Returns the augmented matrix when the transform is affine.
    fn as_affine(&self) -> Option<&Matrix> {
        None
    }

    /// Returns the chained steps when the transform is a concatenation.
    fn steps(&self) -> Option<&[Arc<dyn MathTransform>]> {
        None
    }
}

/// Builds math transforms.
pub trait MathTransformFactory: Send + Sync {
    /// Creates the identity transform of `dimension` ordinates.
    fn create_identity(&self, dimension: usize) -> Arc<dyn MathTransform>;

    /// Creates an affine transform from an augmented matrix.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when the matrix is not a valid affine matrix.
    fn create_affine(&self, matrix: Matrix) -> Result<Arc<dyn MathTransform>, TransformError>;

    /// Creates `second ∘ first`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MismatchedDimension`] when `first` outputs a
    /// different dimension than `second` accepts.
    fn create_concatenated(
        &self,
        first: Arc<dyn MathTransform>,
        second: Arc<dyn MathTransform>,
    ) -> Result<Arc<dyn MathTransform>, TransformError>;

    /// Creates a transform applying `sub` to a contiguous ordinate range.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError`] when the sub-transform cannot be wrapped.
    fn create_pass_through(
        &self,
        first_affected_ordinate: usize,
        sub: Arc<dyn MathTransform>,
        num_trailing_ordinates: usize,
    ) -> Result<Arc<dyn MathTransform>, TransformError>;

    /// Creates the transform of `method` with `parameters`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MissingParameter`] when a parameter required
    /// by a known method is absent.
    fn create_parameterized(
        &self,
        method: &OperationMethod,
        parameters: &ParameterValueGroup,
        source_dimensions: usize,
        target_dimensions: usize,
    ) -> Result<Arc<dyn MathTransform>, TransformError>;
}

// crates/epsg-core/src/core/error.rs
// ============================================================================
// Module: EPSG Error Taxonomy
// Description: Errors surfaced by the factory and the operation assembler.
// Purpose: Give callers a closed, stable set of failure classes.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every low-level failure is re-wrapped into [`FactoryError`] at the
//! construction-method boundary, so no raw backend error escapes the factory
//! surface. None of these errors are retried internally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::ObjectType;
use crate::interfaces::TransformError;

// ============================================================================
// SECTION: Operation Errors
// ============================================================================

/// Errors raised while assembling coordinate operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperationError {
    /// Adjacent operations or a sub-range disagree on dimension.
    #[error("mismatched dimension in {context}: expected {expected}, found {actual}")]
    MismatchedDimension {
        /// Where the mismatch was detected.
        context: String,
        /// Dimension required by the preceding element.
        expected: usize,
        /// Dimension actually found.
        actual: usize,
    },
    /// A required parameter or step is absent.
    #[error("missing parameter: {0}")]
    MissingParameter(String),
    /// The operation list or operation kind is not acceptable here.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// The math-transform factory rejected the request.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),
}

// ============================================================================
// SECTION: Factory Errors
// ============================================================================

/// Errors surfaced by the EPSG object factory.
///
/// # Invariants
/// - Low-level backend failures only appear wrapped in [`FactoryError::BackingStore`].
/// - Messages identify the object type and code, never whole rows.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FactoryError {
    /// The code does not resolve to any row in any applicable table.
    #[error("no such authority code: {object_type} {code}")]
    NotFound {
        /// Object type requested.
        object_type: ObjectType,
        /// Code as supplied by the caller.
        code: String,
    },
    /// A name resolves to more than one record.
    #[error("duplicate values for code {code}: {detail}")]
    Ambiguous {
        /// Code as supplied by the caller.
        code: String,
        /// Where the duplicates were found.
        detail: String,
    },
    /// The database content for the code is structurally inconsistent.
    #[error("malformed data for {object_type} {code}{}: {message}", column_suffix(.column.as_deref()))]
    MalformedData {
        /// Object type being constructed.
        object_type: ObjectType,
        /// Primary key being constructed.
        code: String,
        /// Offending column when one is identified.
        column: Option<String>,
        /// Description of the defect.
        message: String,
    },
    /// The backing store failed while constructing an object.
    #[error("database failure while constructing a {object_type} for code {code}: {cause}")]
    BackingStore {
        /// Object type being constructed.
        object_type: ObjectType,
        /// Code being constructed.
        code: String,
        /// Underlying cause.
        cause: String,
    },
    /// The request needs a capability this factory does not provide.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    /// Operation assembly failed.
    #[error("operation error: {0}")]
    Operation(#[from] OperationError),
    /// The factory was disposed and can no longer serve requests.
    #[error("factory has been disposed")]
    Disposed,
}

impl FactoryError {
    /// Builds a [`FactoryError::NotFound`] error.
    #[must_use]
    pub fn not_found(object_type: ObjectType, code: impl Into<String>) -> Self {
        Self::NotFound {
            object_type,
            code: code.into(),
        }
    }

    /// Builds a [`FactoryError::MalformedData`] error naming a column.
    #[must_use]
    pub fn malformed_column(
        object_type: ObjectType,
        code: impl Into<String>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedData {
            object_type,
            code: code.into(),
            column: Some(column.into()),
            message: message.into(),
        }
    }

    /// Builds a [`FactoryError::MalformedData`] error without a column.
    #[must_use]
    pub fn malformed(
        object_type: ObjectType,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedData {
            object_type,
            code: code.into(),
            column: None,
            message: message.into(),
        }
    }

    /// Returns `true` for [`FactoryError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Formats the optional column suffix of a malformed-data message.
fn column_suffix(column: Option<&str>) -> String {
    column.map_or_else(String::new, |column| format!(" (column {column})"))
}

#[cfg(test)]
mod tests {
    use super::FactoryError;
    use crate::core::identifiers::ObjectType;

    #[test]
    fn malformed_message_names_the_column() {
        let err = FactoryError::malformed_column(
            ObjectType::Ellipsoid,
            "7001",
            "SEMI_MINOR_AXIS",
            "missing required value",
        );
        assert_eq!(
            err.to_string(),
            "malformed data for ellipsoid 7001 (column SEMI_MINOR_AXIS): missing required value"
        );
    }

    #[test]
    fn not_found_message_names_type_and_code() {
        let err = FactoryError::not_found(ObjectType::Datum, "9999");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no such authority code: datum 9999");
    }
}

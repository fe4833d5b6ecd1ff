// crates/epsg-factory/src/decoder.rs
// ============================================================================
// Module: Row Decoder
// Description: Typed, column-named accessors over materialized rows.
// Purpose: Fail with the object code and column when a required value is absent.
// Dependencies: epsg-core
// ============================================================================

//! ## Overview
//! A [`RowDecoder`] reads one row of a query whose column layout is known.
//! Blank text counts as absent. Required accessors fail with
//! [`FactoryError::MalformedData`] naming the code being built and the
//! column. Rows are fully materialized before decoding, so no cursor is open
//! when an error propagates.
//!
//! Asking for a column outside the query's layout is a query defect, not a
//! data defect, and is reported as [`FactoryError::BackingStore`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use epsg_core::FactoryError;
use epsg_core::ObjectType;
use epsg_core::Row;
use epsg_core::SqlValue;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Message of a missing required value.
const MISSING_VALUE: &str = "missing required value";

// ============================================================================
// SECTION: Decoder
// ============================================================================

/// Column-named view of a row.
#[derive(Debug, Clone, Copy)]
pub struct RowDecoder<'a> {
    /// Row being decoded.
    row: &'a Row,
    /// Column names in row order.
    columns: &'a [&'a str],
    /// Object type being constructed.
    object_type: ObjectType,
    /// Code being constructed.
    code: &'a str,
}

impl<'a> RowDecoder<'a> {
    /// Creates a decoder for `row` laid out as `columns`.
    #[must_use]
    pub const fn new(
        row: &'a Row,
        columns: &'a [&'a str],
        object_type: ObjectType,
        code: &'a str,
    ) -> Self {
        Self {
            row,
            columns,
            object_type,
            code,
        }
    }

    /// Returns the raw value of `column`, treating blanks as absent.
    fn value(&self, column: &str) -> Result<Option<&'a SqlValue>, FactoryError> {
        let Some(index) = self.columns.iter().position(|candidate| *candidate == column) else {
            return Err(FactoryError::BackingStore {
                object_type: self.object_type,
                code: self.code.to_string(),
                cause: format!("column {column} is not selected by the query"),
            });
        };
        Ok(match self.row.get(index) {
            None | Some(SqlValue::Null) => None,
            Some(SqlValue::Text(text)) if text.trim().is_empty() => None,
            Some(other) => Some(other),
        })
    }

    /// Builds the error reported for `column`.
    #[must_use]
    pub fn error(&self, column: &str, message: impl Into<String>) -> FactoryError {
        FactoryError::malformed_column(self.object_type, self.code, column, message)
    }

    /// Returns the trimmed text of `column`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::BackingStore`] when the query does not select
    /// `column`.
    pub fn optional_string(&self, column: &str) -> Result<Option<String>, FactoryError> {
        Ok(self.value(column)?.and_then(SqlValue::as_text).map(|text| text.trim().to_string()))
    }

    /// Returns the trimmed text of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::MalformedData`] when the value is absent.
    pub fn required_string(&self, column: &str) -> Result<String, FactoryError> {
        self.optional_string(column)?.ok_or_else(|| self.error(column, MISSING_VALUE))
    }

    /// Returns the number in `column`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::MalformedData`] when the value is not numeric.
    pub fn optional_f64(&self, column: &str) -> Result<Option<f64>, FactoryError> {
        self.value(column)?
            .map(|value| value.as_f64().ok_or_else(|| self.error(column, "not a number")))
            .transpose()
    }

    /// Returns the number in `column`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::MalformedData`] when the value is absent or not
    /// numeric.
    pub fn required_f64(&self, column: &str) -> Result<f64, FactoryError> {
        self.optional_f64(column)?.ok_or_else(|| self.error(column, MISSING_VALUE))
    }

    /// Returns the integer in `column`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::MalformedData`] when the value is not an integer.
    pub fn optional_i64(&self, column: &str) -> Result<Option<i64>, FactoryError> {
        self.value(column)?
            .map(|value| value.as_i64().ok_or_else(|| self.error(column, "not an integer")))
            .transpose()
    }

    /// Returns the integer in `column`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::MalformedData`] when the value is absent or not
    /// an integer.
    pub fn required_i64(&self, column: &str) -> Result<i64, FactoryError> {
        self.optional_i64(column)?.ok_or_else(|| self.error(column, MISSING_VALUE))
    }

    /// Returns the referenced code in `column` as text, if present.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::MalformedData`] when the value is not an integer.
    pub fn optional_code(&self, column: &str) -> Result<Option<String>, FactoryError> {
        Ok(self.optional_i64(column)?.map(|code| code.to_string()))
    }

    /// Returns the referenced code in `column` as text.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::MalformedData`] when the value is absent or not
    /// an integer.
    pub fn required_code(&self, column: &str) -> Result<String, FactoryError> {
        Ok(self.required_i64(column)?.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use epsg_core::FactoryError;
    use epsg_core::ObjectType;
    use epsg_core::Row;
    use epsg_core::SqlValue;

    use super::RowDecoder;

    const COLUMNS: &[&str] = &["ELLIPSOID_CODE", "ELLIPSOID_NAME", "INV_FLATTENING", "REMARKS"];

    fn row() -> Row {
        Row::new(vec![
            SqlValue::Integer(7030),
            SqlValue::Text("  WGS 84 ".to_string()),
            SqlValue::Text("298.257223563".to_string()),
            SqlValue::Text("   ".to_string()),
        ])
    }

    #[test]
    fn text_is_trimmed_and_blanks_are_absent() {
        let row = row();
        let decoder = RowDecoder::new(&row, COLUMNS, ObjectType::Ellipsoid, "7030");
        assert_eq!(decoder.required_string("ELLIPSOID_NAME").unwrap(), "WGS 84");
        assert_eq!(decoder.optional_string("REMARKS").unwrap(), None);
    }

    #[test]
    fn numbers_are_parsed_from_text_and_integers() {
        let row = row();
        let decoder = RowDecoder::new(&row, COLUMNS, ObjectType::Ellipsoid, "7030");
        assert!((decoder.required_f64("INV_FLATTENING").unwrap() - 298.257_223_563).abs() < 1e-12);
        assert_eq!(decoder.required_code("ELLIPSOID_CODE").unwrap(), "7030");
    }

    #[test]
    fn missing_required_values_name_the_column() {
        let row = row();
        let decoder = RowDecoder::new(&row, COLUMNS, ObjectType::Ellipsoid, "7030");
        let err = decoder.required_string("REMARKS").unwrap_err();
        assert_eq!(
            err,
            FactoryError::malformed_column(
                ObjectType::Ellipsoid,
                "7030",
                "REMARKS",
                "missing required value"
            )
        );
    }

    #[test]
    fn non_numeric_text_is_malformed() {
        let row = row();
        let decoder = RowDecoder::new(&row, COLUMNS, ObjectType::Ellipsoid, "7030");
        assert!(matches!(
            decoder.optional_f64("ELLIPSOID_NAME"),
            Err(FactoryError::MalformedData { .. })
        ));
    }

    #[test]
    fn unselected_columns_are_query_defects() {
        let row = row();
        let decoder = RowDecoder::new(&row, COLUMNS, ObjectType::Ellipsoid, "7030");
        let err = decoder.required_f64("SEMI_MAJOR_AXIS").unwrap_err();
        assert_eq!(
            err,
            FactoryError::BackingStore {
                object_type: ObjectType::Ellipsoid,
                code: "7030".to_string(),
                cause: "column SEMI_MAJOR_AXIS is not selected by the query".to_string(),
            }
        );
    }
}

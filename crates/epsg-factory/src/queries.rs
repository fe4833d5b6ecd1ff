// crates/epsg-factory/src/queries.rs
// ============================================================================
// Module: Factory Queries
// Description: Fixed query text issued by the object factory.
// Purpose: Keep table and column names of the EPSG schema in one place.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Each [`QuerySpec`] names the table, the selected columns, and the clause
//! that follows the `FROM`. The column list doubles as the row layout read by
//! [`crate::decoder::RowDecoder`], so decoders address values by column name.
//! Text is authored with bracketed identifiers and passed through
//! [`crate::dialect::SqlDialect::rewrite`] before preparation.

// ============================================================================
// SECTION: Query Spec
// ============================================================================

/// Static description of a `SELECT` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuerySpec {
    /// Statement pool key.
    pub key: &'static str,
    /// Shipped table name, without brackets.
    pub table: &'static str,
    /// Selected columns, in row order.
    pub columns: &'static [&'static str],
    /// Clause following the table (filters, ordering).
    pub tail: &'static str,
}

impl QuerySpec {
    /// Renders the statement with bracketed identifiers.
    #[must_use]
    pub fn sql(&self) -> String {
        format!("SELECT {} FROM [{}] {}", self.columns.join(", "), self.table, self.tail)
    }
}

// ============================================================================
// SECTION: Referencing Queries
// ============================================================================

/// Unit of measure by code.
pub const UNIT: QuerySpec = QuerySpec {
    key: "unit",
    table: "Unit of Measure",
    columns: &[
        "UOM_CODE",
        "UNIT_OF_MEAS_NAME",
        "UNIT_OF_MEAS_TYPE",
        "TARGET_UOM_CODE",
        "FACTOR_B",
        "FACTOR_C",
        "REMARKS",
    ],
    tail: "WHERE UOM_CODE = ?",
};

/// Ellipsoid by code.
pub const ELLIPSOID: QuerySpec = QuerySpec {
    key: "ellipsoid",
    table: "Ellipsoid",
    columns: &[
        "ELLIPSOID_CODE",
        "ELLIPSOID_NAME",
        "SEMI_MAJOR_AXIS",
        "INV_FLATTENING",
        "SEMI_MINOR_AXIS",
        "UOM_CODE",
        "REMARKS",
    ],
    tail: "WHERE ELLIPSOID_CODE = ?",
};

/// Prime meridian by code.
pub const PRIME_MERIDIAN: QuerySpec = QuerySpec {
    key: "prime_meridian",
    table: "Prime Meridian",
    columns: &[
        "PRIME_MERIDIAN_CODE",
        "PRIME_MERIDIAN_NAME",
        "GREENWICH_LONGITUDE",
        "UOM_CODE",
        "REMARKS",
    ],
    tail: "WHERE PRIME_MERIDIAN_CODE = ?",
};

/// Area of use by code.
pub const AREA: QuerySpec = QuerySpec {
    key: "area",
    table: "Area",
    columns: &[
        "AREA_CODE",
        "AREA_NAME",
        "AREA_OF_USE",
        "AREA_SOUTH_BOUND_LAT",
        "AREA_NORTH_BOUND_LAT",
        "AREA_WEST_BOUND_LON",
        "AREA_EAST_BOUND_LON",
    ],
    tail: "WHERE AREA_CODE = ?",
};

/// Datum by code.
pub const DATUM: QuerySpec = QuerySpec {
    key: "datum",
    table: "Datum",
    columns: &[
        "DATUM_CODE",
        "DATUM_NAME",
        "DATUM_TYPE",
        "ORIGIN_DESCRIPTION",
        "REALIZATION_EPOCH",
        "AREA_OF_USE_CODE",
        "DATUM_SCOPE",
        "REMARKS",
        "ELLIPSOID_CODE",
        "PRIME_MERIDIAN_CODE",
    ],
    tail: "WHERE DATUM_CODE = ?",
};

/// Datum-shift candidates leaving a datum, best candidate per target first.
///
/// Kept as raw text because it joins two tables.
pub const BURSA_WOLF_SQL: &str = "SELECT CO.COORD_OP_CODE, CO.COORD_OP_METHOD_CODE, \
     CRS2.DATUM_CODE FROM [Coordinate_Operation] AS CO INNER JOIN \
     [Coordinate Reference System] AS CRS2 ON CO.TARGET_CRS_CODE = CRS2.COORD_REF_SYS_CODE \
     WHERE CO.COORD_OP_METHOD_CODE >= 9603 AND CO.COORD_OP_METHOD_CODE <= 9607 \
     AND CO.COORD_OP_VARIANT = 1 AND CO.SOURCE_CRS_CODE IN (SELECT CRS1.COORD_REF_SYS_CODE \
     FROM [Coordinate Reference System] AS CRS1 WHERE CRS1.DATUM_CODE = ?) \
     ORDER BY CRS2.DATUM_CODE, ABS(CO.DEPRECATED), CO.COORD_OP_ACCURACY, CO.COORD_OP_CODE DESC";

/// Pool key of [`BURSA_WOLF_SQL`].
pub const BURSA_WOLF_KEY: &str = "bursa_wolf";

/// Row layout of [`BURSA_WOLF_SQL`].
pub const BURSA_WOLF_COLUMNS: &[&str] = &["COORD_OP_CODE", "COORD_OP_METHOD_CODE", "DATUM_CODE"];

// ============================================================================
// SECTION: Coordinate System Queries
// ============================================================================

/// Coordinate system by code.
pub const COORDINATE_SYSTEM: QuerySpec = QuerySpec {
    key: "coordinate_system",
    table: "Coordinate System",
    columns: &["COORD_SYS_CODE", "COORD_SYS_NAME", "COORD_SYS_TYPE", "DIMENSION", "REMARKS"],
    tail: "WHERE COORD_SYS_CODE = ?",
};

/// Axis codes of a coordinate system in axis order.
pub const AXES_OF_CS: QuerySpec = QuerySpec {
    key: "axes_of_cs",
    table: "Coordinate Axis",
    columns: &["COORD_AXIS_CODE"],
    tail: "WHERE COORD_SYS_CODE = ? ORDER BY [ORDER]",
};

/// Coordinate system axis by code.
pub const AXIS: QuerySpec = QuerySpec {
    key: "axis",
    table: "Coordinate Axis",
    columns: &[
        "COORD_AXIS_CODE",
        "COORD_AXIS_NAME_CODE",
        "COORD_AXIS_ORIENTATION",
        "COORD_AXIS_ABBREVIATION",
        "UOM_CODE",
    ],
    tail: "WHERE COORD_AXIS_CODE = ?",
};

/// Axis name by code.
pub const AXIS_NAME: QuerySpec = QuerySpec {
    key: "axis_name",
    table: "Coordinate Axis Name",
    columns: &["COORD_AXIS_NAME_CODE", "COORD_AXIS_NAME", "DESCRIPTION", "REMARKS"],
    tail: "WHERE COORD_AXIS_NAME_CODE = ?",
};

// ============================================================================
// SECTION: CRS Queries
// ============================================================================

/// Coordinate reference system by code.
pub const CRS: QuerySpec = QuerySpec {
    key: "crs",
    table: "Coordinate Reference System",
    columns: &[
        "COORD_REF_SYS_CODE",
        "COORD_REF_SYS_NAME",
        "AREA_OF_USE_CODE",
        "CRS_SCOPE",
        "REMARKS",
        "COORD_REF_SYS_KIND",
        "COORD_SYS_CODE",
        "DATUM_CODE",
        "SOURCE_GEOGCRS_CODE",
        "PROJECTION_CONV_CODE",
        "CMPD_HORIZCRS_CODE",
        "CMPD_VERTCRS_CODE",
    ],
    tail: "WHERE COORD_REF_SYS_CODE = ?",
};

// ============================================================================
// SECTION: Operation Queries
// ============================================================================

/// Operation method by code.
pub const METHOD: QuerySpec = QuerySpec {
    key: "method",
    table: "Coordinate_Operation Method",
    columns: &["COORD_OP_METHOD_CODE", "COORD_OP_METHOD_NAME", "FORMULA", "REMARKS"],
    tail: "WHERE COORD_OP_METHOD_CODE = ?",
};

/// Parameter codes used by a method, in sort order.
pub const PARAMETER_USAGE: QuerySpec = QuerySpec {
    key: "parameter_usage",
    table: "Coordinate_Operation Parameter Usage",
    columns: &["PARAMETER_CODE"],
    tail: "WHERE COORD_OP_METHOD_CODE = ? ORDER BY SORT_ORDER",
};

/// Parameter descriptor by code.
pub const PARAMETER: QuerySpec = QuerySpec {
    key: "parameter",
    table: "Coordinate_Operation Parameter",
    columns: &["PARAMETER_CODE", "PARAMETER_NAME", "DESCRIPTION"],
    tail: "WHERE PARAMETER_CODE = ?",
};

/// Parameter values of an operation for its method.
pub const PARAMETER_VALUES: QuerySpec = QuerySpec {
    key: "parameter_values",
    table: "Coordinate_Operation Parameter Value",
    columns: &["PARAMETER_CODE", "PARAMETER_VALUE", "PARAM_VALUE_FILE_REF", "UOM_CODE"],
    tail: "WHERE COORD_OP_CODE = ? AND COORD_OP_METHOD_CODE = ?",
};

/// Coordinate operation by code.
pub const OPERATION: QuerySpec = QuerySpec {
    key: "operation",
    table: "Coordinate_Operation",
    columns: &[
        "COORD_OP_CODE",
        "COORD_OP_NAME",
        "COORD_OP_TYPE",
        "SOURCE_CRS_CODE",
        "TARGET_CRS_CODE",
        "COORD_OP_METHOD_CODE",
        "COORD_TFM_VERSION",
        "COORD_OP_ACCURACY",
        "AREA_OF_USE_CODE",
        "COORD_OP_SCOPE",
        "REMARKS",
    ],
    tail: "WHERE COORD_OP_CODE = ?",
};

/// Steps of a concatenated operation in path order.
pub const OPERATION_PATH: QuerySpec = QuerySpec {
    key: "operation_path",
    table: "Coordinate_Operation Path",
    columns: &["SINGLE_OPERATION_CODE"],
    tail: "WHERE CONCAT_OPERATION_CODE = ? ORDER BY OP_PATH_STEP",
};

/// Operations between two CRS codes, non-deprecated and most accurate first.
pub const OPERATIONS_BETWEEN: QuerySpec = QuerySpec {
    key: "operations_between",
    table: "Coordinate_Operation",
    columns: &["COORD_OP_CODE"],
    tail: "WHERE SOURCE_CRS_CODE = ? AND TARGET_CRS_CODE = ? \
           ORDER BY ABS(DEPRECATED), COORD_OP_ACCURACY, COORD_OP_CODE",
};

// ============================================================================
// SECTION: Identification Queries
// ============================================================================

/// Aliases of an object.
pub const ALIASES: QuerySpec = QuerySpec {
    key: "aliases",
    table: "Alias",
    columns: &["NAMING_SYSTEM_CODE", "ALIAS"],
    tail: "WHERE OBJECT_TABLE_NAME = ? AND OBJECT_CODE = ?",
};

/// Naming system by code.
pub const NAMING_SYSTEM: QuerySpec = QuerySpec {
    key: "naming_system",
    table: "Naming System",
    columns: &["NAMING_SYSTEM_CODE", "NAMING_SYSTEM_NAME"],
    tail: "WHERE NAMING_SYSTEM_CODE = ?",
};

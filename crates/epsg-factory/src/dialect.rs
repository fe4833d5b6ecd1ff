// crates/epsg-factory/src/dialect.rs
// ============================================================================
// Module: SQL Dialects
// Description: Rewrites of the factory's query text for other backends.
// Purpose: Keep table naming differences out of the construction logic.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every query is authored once against the table names shipped with the EPSG
//! dataset, quoted with brackets (`[Coordinate Reference System]`). The
//! [`SqlDialect::Ansi`] rewrite maps each bracketed name to the lower-case
//! `epsg_*` names used by the EPSG SQL scripts and quotes anything unknown
//! with double quotes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Name Tables
// ============================================================================

/// Shipped table names and their script counterparts.
const TABLE_NAMES: [(&str, &str); 18] = [
    ("Alias", "epsg_alias"),
    ("Area", "epsg_area"),
    ("Coordinate Axis", "epsg_coordinateaxis"),
    ("Coordinate Axis Name", "epsg_coordinateaxisname"),
    ("Coordinate Reference System", "epsg_coordinatereferencesystem"),
    ("Coordinate System", "epsg_coordinatesystem"),
    ("Coordinate_Operation", "epsg_coordoperation"),
    ("Coordinate_Operation Method", "epsg_coordoperationmethod"),
    ("Coordinate_Operation Parameter", "epsg_coordoperationparam"),
    ("Coordinate_Operation Parameter Usage", "epsg_coordoperationparamusage"),
    ("Coordinate_Operation Parameter Value", "epsg_coordoperationparamvalue"),
    ("Coordinate_Operation Path", "epsg_coordoperationpath"),
    ("Datum", "epsg_datum"),
    ("Ellipsoid", "epsg_ellipsoid"),
    ("Naming System", "epsg_namingsystem"),
    ("Prime Meridian", "epsg_primemeridian"),
    ("Unit of Measure", "epsg_unitofmeasure"),
    ("ORDER", "coord_axis_order"),
];

// ============================================================================
// SECTION: Dialect
// ============================================================================

/// Backend naming convention for table identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlDialect {
    /// Bracket-quoted table names as shipped in the dataset.
    #[default]
    Access,
    /// Lower-case `epsg_*` table names.
    Ansi,
}

impl SqlDialect {
    /// Rewrites query text authored with bracketed identifiers.
    #[must_use]
    pub fn rewrite(self, sql: &str) -> String {
        match self {
            Self::Access => sql.to_string(),
            Self::Ansi => rewrite_brackets(sql),
        }
    }

    /// Returns the value stored in the alias table's `OBJECT_TABLE_NAME`
    /// column for objects of `table`.
    #[must_use]
    pub fn object_table_name(self, table: &str) -> String {
        match self {
            Self::Access => table.to_string(),
            Self::Ansi => ansi_name(table).map_or_else(|| table.to_string(), str::to_string),
        }
    }
}

/// Returns the script name of a shipped identifier.
fn ansi_name(name: &str) -> Option<&'static str> {
    TABLE_NAMES.iter().find(|(shipped, _)| *shipped == name).map(|(_, ansi)| *ansi)
}

/// Replaces every `[identifier]` in `sql` with its script counterpart.
fn rewrite_brackets(sql: &str) -> String {
    let mut output = String::with_capacity(sql.len());
    let mut rest = sql;
    while let Some(open) = rest.find('[') {
        output.push_str(&rest[.. open]);
        let tail = &rest[open + 1 ..];
        let Some(close) = tail.find(']') else {
            output.push_str(&rest[open ..]);
            return output;
        };
        let identifier = &tail[.. close];
        match ansi_name(identifier) {
            Some(renamed) => output.push_str(renamed),
            None => {
                output.push('"');
                output.push_str(identifier);
                output.push('"');
            }
        }
        rest = &tail[close + 1 ..];
    }
    output.push_str(rest);
    output
}

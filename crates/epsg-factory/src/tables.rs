// crates/epsg-factory/src/tables.rs
// ============================================================================
// Module: Table Descriptors
// Description: Static table metadata and type-discriminator dispatch tables.
// Purpose: Map object types to tables and discriminator text to variants.
// Dependencies: epsg-core
// ============================================================================

//! ## Overview
//! [`TABLES`] lists every table holding constructible objects, in the
//! priority order used by generic lookups. Each descriptor also carries the
//! discriminator patterns that select a subtype when enumerating codes.
//! Discriminator text read while constructing objects is parsed through the
//! closed dispatch tables below; unknown text has no variant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use epsg_core::ObjectType;

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Static metadata of one EPSG table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Base object type stored in the table.
    pub object_type: ObjectType,
    /// Shipped table name, without brackets.
    pub table: &'static str,
    /// Primary key column.
    pub code_column: &'static str,
    /// Name column, absent when names live in another table.
    pub name_column: Option<&'static str>,
    /// Type-discriminator column.
    pub type_column: Option<&'static str>,
    /// Subtypes and the `LIKE` pattern selecting them.
    pub subtypes: &'static [(ObjectType, &'static str)],
}

impl TableDescriptor {
    /// Returns the `LIKE` pattern selecting `object_type`, if it is a subtype.
    #[must_use]
    pub fn subtype_pattern(&self, object_type: ObjectType) -> Option<&'static str> {
        self.subtypes
            .iter()
            .find(|(candidate, _)| *candidate == object_type)
            .map(|(_, pattern)| *pattern)
    }
}

/// Tables in generic-lookup priority order.
pub const TABLES: [TableDescriptor; 11] = [
    TableDescriptor {
        object_type: ObjectType::CoordinateReferenceSystem,
        table: "Coordinate Reference System",
        code_column: "COORD_REF_SYS_CODE",
        name_column: Some("COORD_REF_SYS_NAME"),
        type_column: Some("COORD_REF_SYS_KIND"),
        subtypes: &[
            (ObjectType::GeographicCrs, "geographic%"),
            (ObjectType::ProjectedCrs, "projected"),
            (ObjectType::GeocentricCrs, "geocentric"),
            (ObjectType::VerticalCrs, "vertical"),
            (ObjectType::CompoundCrs, "compound"),
            (ObjectType::EngineeringCrs, "engineering"),
        ],
    },
    TableDescriptor {
        object_type: ObjectType::CoordinateSystem,
        table: "Coordinate System",
        code_column: "COORD_SYS_CODE",
        name_column: Some("COORD_SYS_NAME"),
        type_column: Some("COORD_SYS_TYPE"),
        subtypes: &[
            (ObjectType::CartesianCs, "cartesian"),
            (ObjectType::EllipsoidalCs, "ellipsoidal"),
            (ObjectType::SphericalCs, "spherical"),
            (ObjectType::VerticalCs, "vertical"),
        ],
    },
    TableDescriptor {
        object_type: ObjectType::CoordinateSystemAxis,
        table: "Coordinate Axis",
        code_column: "COORD_AXIS_CODE",
        name_column: None,
        type_column: None,
        subtypes: &[],
    },
    TableDescriptor {
        object_type: ObjectType::Datum,
        table: "Datum",
        code_column: "DATUM_CODE",
        name_column: Some("DATUM_NAME"),
        type_column: Some("DATUM_TYPE"),
        subtypes: &[
            (ObjectType::GeodeticDatum, "geodetic"),
            (ObjectType::VerticalDatum, "vertical"),
            (ObjectType::EngineeringDatum, "engineering"),
        ],
    },
    TableDescriptor {
        object_type: ObjectType::Ellipsoid,
        table: "Ellipsoid",
        code_column: "ELLIPSOID_CODE",
        name_column: Some("ELLIPSOID_NAME"),
        type_column: None,
        subtypes: &[],
    },
    TableDescriptor {
        object_type: ObjectType::PrimeMeridian,
        table: "Prime Meridian",
        code_column: "PRIME_MERIDIAN_CODE",
        name_column: Some("PRIME_MERIDIAN_NAME"),
        type_column: None,
        subtypes: &[],
    },
    TableDescriptor {
        object_type: ObjectType::CoordinateOperation,
        table: "Coordinate_Operation",
        code_column: "COORD_OP_CODE",
        name_column: Some("COORD_OP_NAME"),
        type_column: Some("COORD_OP_TYPE"),
        subtypes: &[
            (ObjectType::Conversion, "conversion"),
            (ObjectType::Transformation, "transformation"),
            (ObjectType::ConcatenatedOperation, "concatenated operation"),
        ],
    },
    TableDescriptor {
        object_type: ObjectType::OperationMethod,
        table: "Coordinate_Operation Method",
        code_column: "COORD_OP_METHOD_CODE",
        name_column: Some("COORD_OP_METHOD_NAME"),
        type_column: None,
        subtypes: &[],
    },
    TableDescriptor {
        object_type: ObjectType::ParameterDescriptor,
        table: "Coordinate_Operation Parameter",
        code_column: "PARAMETER_CODE",
        name_column: Some("PARAMETER_NAME"),
        type_column: None,
        subtypes: &[],
    },
    TableDescriptor {
        object_type: ObjectType::Unit,
        table: "Unit of Measure",
        code_column: "UOM_CODE",
        name_column: Some("UNIT_OF_MEAS_NAME"),
        type_column: None,
        subtypes: &[],
    },
    TableDescriptor {
        object_type: ObjectType::Extent,
        table: "Area",
        code_column: "AREA_CODE",
        name_column: Some("AREA_NAME"),
        type_column: None,
        subtypes: &[],
    },
];

/// Coordinate reference system table.
pub const CRS_TABLE: &TableDescriptor = &TABLES[0];
/// Coordinate system table.
pub const CS_TABLE: &TableDescriptor = &TABLES[1];
/// Coordinate axis table.
pub const AXIS_TABLE: &TableDescriptor = &TABLES[2];
/// Datum table.
pub const DATUM_TABLE: &TableDescriptor = &TABLES[3];
/// Ellipsoid table.
pub const ELLIPSOID_TABLE: &TableDescriptor = &TABLES[4];
/// Prime meridian table.
pub const PRIME_MERIDIAN_TABLE: &TableDescriptor = &TABLES[5];
/// Coordinate operation table.
pub const OPERATION_TABLE: &TableDescriptor = &TABLES[6];
/// Operation method table.
pub const METHOD_TABLE: &TableDescriptor = &TABLES[7];
/// Operation parameter table.
pub const PARAMETER_TABLE: &TableDescriptor = &TABLES[8];
/// Unit of measure table.
pub const UNIT_TABLE: &TableDescriptor = &TABLES[9];
/// Area table.
pub const AREA_TABLE: &TableDescriptor = &TABLES[10];

/// Returns the descriptor of the table owning `object_type`.
#[must_use]
pub fn descriptor(object_type: ObjectType) -> Option<&'static TableDescriptor> {
    let base = object_type.base();
    TABLES.iter().find(|descriptor| descriptor.object_type == base)
}

// ============================================================================
// SECTION: Discriminators
// ============================================================================

/// Finds `text` in a discriminator table, case-insensitively.
fn lookup<T: Copy>(table: &[(&str, T)], text: &str) -> Option<T> {
    let normalized = text.trim().to_ascii_lowercase();
    table.iter().find(|(name, _)| *name == normalized).map(|(_, variant)| *variant)
}

/// CRS variants selected by `COORD_REF_SYS_KIND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsDiscriminator {
    /// Geographic CRS with two or three ellipsoidal axes.
    Geographic,
    /// Projected CRS.
    Projected,
    /// Geocentric CRS.
    Geocentric,
    /// Vertical CRS.
    Vertical,
    /// Compound CRS.
    Compound,
    /// Engineering CRS.
    Engineering,
}

/// Discriminator text of CRS variants.
const CRS_KINDS: [(&str, CrsDiscriminator); 7] = [
    ("geographic 2d", CrsDiscriminator::Geographic),
    ("geographic 3d", CrsDiscriminator::Geographic),
    ("projected", CrsDiscriminator::Projected),
    ("geocentric", CrsDiscriminator::Geocentric),
    ("vertical", CrsDiscriminator::Vertical),
    ("compound", CrsDiscriminator::Compound),
    ("engineering", CrsDiscriminator::Engineering),
];

impl CrsDiscriminator {
    /// Parses `COORD_REF_SYS_KIND` text.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        lookup(&CRS_KINDS, text)
    }
}

/// Datum variants selected by `DATUM_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatumDiscriminator {
    /// Geodetic datum.
    Geodetic,
    /// Vertical datum.
    Vertical,
    /// Engineering datum.
    Engineering,
}

/// Discriminator text of datum variants.
const DATUM_KINDS: [(&str, DatumDiscriminator); 3] = [
    ("geodetic", DatumDiscriminator::Geodetic),
    ("vertical", DatumDiscriminator::Vertical),
    ("engineering", DatumDiscriminator::Engineering),
];

impl DatumDiscriminator {
    /// Parses `DATUM_TYPE` text.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        lookup(&DATUM_KINDS, text)
    }
}

/// Operation variants selected by `COORD_OP_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationDiscriminator {
    /// Conversion.
    Conversion,
    /// Transformation.
    Transformation,
    /// Concatenated operation.
    Concatenated,
}

/// Discriminator text of operation variants.
const OPERATION_KINDS: [(&str, OperationDiscriminator); 3] = [
    ("conversion", OperationDiscriminator::Conversion),
    ("transformation", OperationDiscriminator::Transformation),
    ("concatenated operation", OperationDiscriminator::Concatenated),
];

impl OperationDiscriminator {
    /// Parses `COORD_OP_TYPE` text.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        lookup(&OPERATION_KINDS, text)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use epsg_core::ObjectType;

    use super::CrsDiscriminator;
    use super::DatumDiscriminator;
    use super::OperationDiscriminator;
    use super::TABLES;
    use super::descriptor;

    #[test]
    fn every_base_type_has_one_table() {
        for table in &TABLES {
            assert_eq!(table.object_type.base(), table.object_type);
            let owners = TABLES.iter().filter(|other| other.object_type == table.object_type);
            assert_eq!(owners.count(), 1);
        }
    }

    #[test]
    fn subtypes_resolve_to_their_table_and_pattern() {
        let crs = descriptor(ObjectType::ProjectedCrs).unwrap();
        assert_eq!(crs.table, "Coordinate Reference System");
        assert_eq!(crs.subtype_pattern(ObjectType::GeographicCrs), Some("geographic%"));
        assert_eq!(crs.subtype_pattern(ObjectType::CoordinateReferenceSystem), None);
        assert!(descriptor(ObjectType::IdentifiedObject).is_none());
    }

    #[test]
    fn discriminators_are_case_insensitive() {
        assert_eq!(CrsDiscriminator::parse("Geographic 2D"), Some(CrsDiscriminator::Geographic));
        assert_eq!(CrsDiscriminator::parse("ENGINEERING"), Some(CrsDiscriminator::Engineering));
        assert_eq!(CrsDiscriminator::parse("derived"), None);
        assert_eq!(DatumDiscriminator::parse(" Vertical "), Some(DatumDiscriminator::Vertical));
        assert_eq!(
            OperationDiscriminator::parse("Concatenated Operation"),
            Some(OperationDiscriminator::Concatenated)
        );
    }
}

// crates/epsg-core/src/core/identifiers.rs
// ============================================================================
// Module: EPSG Identifiers
// Description: Authority-qualified codes and the closed set of object types.
// Purpose: Provide typed identifiers and code classification helpers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Codes arrive as free text. A code is either a *primary key* (all non-space
//! characters are digits) or a *name* that must be resolved against a name
//! column. [`ObjectType`] names every constructible object kind, including
//! the subtypes selected through a table's type-discriminator column.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Authority Code
// ============================================================================

/// Authority-qualified identifier such as `EPSG:4326`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AuthorityCode {
    /// Naming authority (for example `EPSG`).
    authority: String,
    /// Code within the authority.
    code: String,
}

impl AuthorityCode {
    /// Creates a new authority-qualified code.
    #[must_use]
    pub fn new(authority: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
            code: code.into(),
        }
    }

    /// Returns the naming authority.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Returns the code within the authority.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl fmt::Display for AuthorityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}

// ============================================================================
// SECTION: Code Classification
// ============================================================================

/// Returns `true` when every non-space character in `code` is an ASCII digit.
///
/// An empty or blank code is classified as a primary key so that its lookup
/// fails with a plain "not found" rather than a name search.
#[must_use]
pub fn is_primary_key(code: &str) -> bool {
    code.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
}

/// Strips a leading `AUTHORITY:` prefix when it names `authority`.
///
/// The comparison is case-insensitive and surrounding whitespace is removed,
/// so `" epsg : 4326 "` becomes `"4326"` for authority `EPSG`.
#[must_use]
pub fn trim_authority<'a>(code: &'a str, authority: &str) -> &'a str {
    let trimmed = code.trim();
    if let Some((prefix, rest)) = trimmed.split_once(':')
        && prefix.trim().eq_ignore_ascii_case(authority)
    {
        return rest.trim_start_matches(':').trim();
    }
    trimmed
}

// ============================================================================
// SECTION: Object Types
// ============================================================================

/// Closed set of object kinds the factory can construct or enumerate.
///
/// # Invariants
/// - Every subtype maps to exactly one base type via [`ObjectType::base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// Any identified object (generic dispatch).
    IdentifiedObject,
    /// Unit of measure.
    Unit,
    /// Ellipsoid.
    Ellipsoid,
    /// Prime meridian.
    PrimeMeridian,
    /// Area of use.
    Extent,
    /// Any datum.
    Datum,
    /// Geodetic datum.
    GeodeticDatum,
    /// Vertical datum.
    VerticalDatum,
    /// Engineering datum.
    EngineeringDatum,
    /// Coordinate system axis.
    CoordinateSystemAxis,
    /// Any coordinate system.
    CoordinateSystem,
    /// Cartesian coordinate system.
    CartesianCs,
    /// Ellipsoidal coordinate system.
    EllipsoidalCs,
    /// Spherical coordinate system.
    SphericalCs,
    /// Vertical coordinate system.
    VerticalCs,
    /// Any coordinate reference system.
    CoordinateReferenceSystem,
    /// Geographic CRS (2D or 3D).
    GeographicCrs,
    /// Projected CRS.
    ProjectedCrs,
    /// Geocentric CRS.
    GeocentricCrs,
    /// Vertical CRS.
    VerticalCrs,
    /// Compound CRS.
    CompoundCrs,
    /// Engineering CRS.
    EngineeringCrs,
    /// Operation method.
    OperationMethod,
    /// Operation parameter descriptor.
    ParameterDescriptor,
    /// Any coordinate operation.
    CoordinateOperation,
    /// Conversion.
    Conversion,
    /// Transformation.
    Transformation,
    /// Concatenated operation.
    ConcatenatedOperation,
}

impl ObjectType {
    /// Every enumerable object type, base types before their subtypes.
    pub const ALL: [Self; 27] = [
        Self::Unit,
        Self::Ellipsoid,
        Self::PrimeMeridian,
        Self::Extent,
        Self::Datum,
        Self::GeodeticDatum,
        Self::VerticalDatum,
        Self::EngineeringDatum,
        Self::CoordinateSystemAxis,
        Self::CoordinateSystem,
        Self::CartesianCs,
        Self::EllipsoidalCs,
        Self::SphericalCs,
        Self::VerticalCs,
        Self::CoordinateReferenceSystem,
        Self::GeographicCrs,
        Self::ProjectedCrs,
        Self::GeocentricCrs,
        Self::VerticalCrs,
        Self::CompoundCrs,
        Self::EngineeringCrs,
        Self::OperationMethod,
        Self::ParameterDescriptor,
        Self::CoordinateOperation,
        Self::Conversion,
        Self::Transformation,
        Self::ConcatenatedOperation,
    ];

    /// Returns the base type that owns the table for this type.
    #[must_use]
    pub const fn base(self) -> Self {
        match self {
            Self::GeodeticDatum | Self::VerticalDatum | Self::EngineeringDatum => Self::Datum,
            Self::CartesianCs | Self::EllipsoidalCs | Self::SphericalCs | Self::VerticalCs => {
                Self::CoordinateSystem
            }
            Self::GeographicCrs
            | Self::ProjectedCrs
            | Self::GeocentricCrs
            | Self::VerticalCrs
            | Self::CompoundCrs
            | Self::EngineeringCrs => Self::CoordinateReferenceSystem,
            Self::Conversion | Self::Transformation | Self::ConcatenatedOperation => {
                Self::CoordinateOperation
            }
            other => other,
        }
    }

    /// Returns a stable label for the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IdentifiedObject => "identified_object",
            Self::Unit => "unit",
            Self::Ellipsoid => "ellipsoid",
            Self::PrimeMeridian => "prime_meridian",
            Self::Extent => "extent",
            Self::Datum => "datum",
            Self::GeodeticDatum => "geodetic_datum",
            Self::VerticalDatum => "vertical_datum",
            Self::EngineeringDatum => "engineering_datum",
            Self::CoordinateSystemAxis => "coordinate_system_axis",
            Self::CoordinateSystem => "coordinate_system",
            Self::CartesianCs => "cartesian_cs",
            Self::EllipsoidalCs => "ellipsoidal_cs",
            Self::SphericalCs => "spherical_cs",
            Self::VerticalCs => "vertical_cs",
            Self::CoordinateReferenceSystem => "coordinate_reference_system",
            Self::GeographicCrs => "geographic_crs",
            Self::ProjectedCrs => "projected_crs",
            Self::GeocentricCrs => "geocentric_crs",
            Self::VerticalCrs => "vertical_crs",
            Self::CompoundCrs => "compound_crs",
            Self::EngineeringCrs => "engineering_crs",
            Self::OperationMethod => "operation_method",
            Self::ParameterDescriptor => "parameter_descriptor",
            Self::CoordinateOperation => "coordinate_operation",
            Self::Conversion => "conversion",
            Self::Transformation => "transformation",
            Self::ConcatenatedOperation => "concatenated_operation",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        if normalized == Self::IdentifiedObject.as_str() {
            return Ok(Self::IdentifiedObject);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown object type: {value}"))
    }
}

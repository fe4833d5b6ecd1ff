// crates/epsg-core/src/core/object.rs
// ============================================================================
// Module: Identified Objects
// Description: Closed sum of every object kind a factory can construct.
// Purpose: Give generic lookups a single typed return value.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`IdentifiedObject`] is returned by generic code lookups that must first
//! discover which table owns a code. Each variant shares the concrete object
//! with any typed lookup of the same code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::core::crs::CoordinateReferenceSystem;
use crate::core::cs::CoordinateSystem;
use crate::core::cs::CoordinateSystemAxis;
use crate::core::datum::Datum;
use crate::core::datum::Ellipsoid;
use crate::core::datum::PrimeMeridian;
use crate::core::extent::Extent;
use crate::core::identifiers::AuthorityCode;
use crate::core::identifiers::ObjectType;
use crate::core::operation::CoordinateOperation;
use crate::core::operation::OperationMethod;
use crate::core::operation::ParameterDescriptor;
use crate::core::properties::Properties;
use crate::core::units::Unit;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Any object constructible from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "object", content = "definition", rename_all = "snake_case")]
pub enum IdentifiedObject {
    /// Unit of measure.
    Unit(Arc<Unit>),
    /// Reference ellipsoid.
    Ellipsoid(Arc<Ellipsoid>),
    /// Prime meridian.
    PrimeMeridian(Arc<PrimeMeridian>),
    /// Area of use.
    Extent(Arc<Extent>),
    /// Datum.
    Datum(Arc<Datum>),
    /// Coordinate system axis.
    Axis(Arc<CoordinateSystemAxis>),
    /// Coordinate system.
    CoordinateSystem(Arc<CoordinateSystem>),
    /// Coordinate reference system.
    Crs(Arc<CoordinateReferenceSystem>),
    /// Operation method.
    OperationMethod(Arc<OperationMethod>),
    /// Parameter descriptor.
    ParameterDescriptor(Arc<ParameterDescriptor>),
    /// Coordinate operation.
    CoordinateOperation(Arc<CoordinateOperation>),
}

impl IdentifiedObject {
    /// Returns the identification properties of the wrapped object.
    ///
    /// Extents carry only an identifier and a description, so they report
    /// `None`.
    #[must_use]
    pub fn properties(&self) -> Option<&Properties> {
        match self {
            Self::Unit(value) => Some(&value.properties),
            Self::Ellipsoid(value) => Some(&value.properties),
            Self::PrimeMeridian(value) => Some(&value.properties),
            Self::Extent(_) => None,
            Self::Datum(value) => Some(&value.properties),
            Self::Axis(value) => Some(&value.properties),
            Self::CoordinateSystem(value) => Some(&value.properties),
            Self::Crs(value) => Some(&value.properties),
            Self::OperationMethod(value) => Some(&value.properties),
            Self::ParameterDescriptor(value) => Some(&value.properties),
            Self::CoordinateOperation(value) => Some(&value.properties),
        }
    }

    /// Returns the object name (the area description for extents).
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Extent(extent) => extent.description.as_deref().unwrap_or_default(),
            other => other.properties().map_or("", |properties| properties.name.as_str()),
        }
    }

    /// Returns the authority code text, if identified.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Extent(extent) => extent.identifier.as_ref().map(AuthorityCode::code),
            other => other.properties().and_then(Properties::code),
        }
    }

    /// Returns the broad object type of the wrapped object.
    #[must_use]
    pub const fn object_type(&self) -> ObjectType {
        match self {
            Self::Unit(_) => ObjectType::Unit,
            Self::Ellipsoid(_) => ObjectType::Ellipsoid,
            Self::PrimeMeridian(_) => ObjectType::PrimeMeridian,
            Self::Extent(_) => ObjectType::Extent,
            Self::Datum(_) => ObjectType::Datum,
            Self::Axis(_) => ObjectType::CoordinateSystemAxis,
            Self::CoordinateSystem(_) => ObjectType::CoordinateSystem,
            Self::Crs(_) => ObjectType::CoordinateReferenceSystem,
            Self::OperationMethod(_) => ObjectType::OperationMethod,
            Self::ParameterDescriptor(_) => ObjectType::ParameterDescriptor,
            Self::CoordinateOperation(_) => ObjectType::CoordinateOperation,
        }
    }
}

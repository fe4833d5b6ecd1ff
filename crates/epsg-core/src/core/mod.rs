// crates/epsg-core/src/core/mod.rs
// ============================================================================
// Module: EPSG Core Types
// Description: Immutable georeferencing objects built from EPSG rows.
// Purpose: Provide stable, comparable, serializable referencing value types.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Core types are constructed once by a factory and never mutated afterwards.
//! Shared sub-objects are held behind [`std::sync::Arc`] so that repeated
//! references to the same definition can be reference-equal.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod crs;
pub mod cs;
pub mod datum;
pub mod error;
pub mod extent;
pub mod identifiers;
pub mod object;
pub mod operation;
pub mod properties;
pub mod units;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crs::CoordinateReferenceSystem;
pub use crs::CrsKind;
pub use cs::AxisDirection;
pub use cs::CoordinateSystem;
pub use cs::CoordinateSystemAxis;
pub use cs::CsKind;
pub use datum::BursaWolfParameters;
pub use datum::Datum;
pub use datum::DatumKind;
pub use datum::Ellipsoid;
pub use datum::PrimeMeridian;
pub use datum::helmert_rows;
pub use error::FactoryError;
pub use error::OperationError;
pub use extent::Extent;
pub use extent::GeographicBoundingBox;
pub use identifiers::AuthorityCode;
pub use identifiers::ObjectType;
pub use identifiers::is_primary_key;
pub use identifiers::trim_authority;
pub use object::IdentifiedObject;
pub use operation::CoordinateOperation;
pub use operation::OperationKind;
pub use operation::OperationMethod;
pub use operation::ParameterDescriptor;
pub use operation::ParameterValue;
pub use operation::ParameterValueGroup;
pub use operation::ParameterValueKind;
pub use operation::PositionalAccuracy;
pub use properties::Properties;
pub use properties::ScopedName;
pub use units::BASE_UNITS;
pub use units::Unit;
pub use units::UnitKind;
pub use units::base_unit;

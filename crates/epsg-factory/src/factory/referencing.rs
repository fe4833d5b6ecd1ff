// crates/epsg-factory/src/factory/referencing.rs
// ============================================================================
// Module: Referencing Constructors
// Description: Units, ellipsoids, prime meridians, and areas of use.
// Purpose: Build the leaf objects every datum and axis depends on.
// Dependencies: epsg-core, tracing
// ============================================================================

//! ## Overview
//! Units with a well-known base code take their factor from the base unit
//! table; every other unit scales the base unit named by `TARGET_UOM_CODE` by
//! `FACTOR_B / FACTOR_C`. An ellipsoid is defined by its inverse flattening
//! when present; zero values count as absent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use epsg_core::AuthorityCode;
use epsg_core::Ellipsoid;
use epsg_core::Extent;
use epsg_core::FactoryError;
use epsg_core::GeographicBoundingBox;
use epsg_core::ObjectType;
use epsg_core::PrimeMeridian;
use epsg_core::Row;
use epsg_core::Unit;
use epsg_core::base_unit;
use tracing::warn;

use super::Session;
use super::properties::Identity;
use crate::decoder::RowDecoder;
use crate::queries;

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl Session<'_> {
    /// Returns the unit of measure at primary key `key`.
    pub(super) fn unit_by_key(&mut self, key: &str) -> Result<Arc<Unit>, FactoryError> {
        self.pooled_or_build(&queries::UNIT, ObjectType::Unit, key, |session, row| {
            session.unit_from_row(key, row)
        })
    }

    /// Decodes one unit row.
    fn unit_from_row(&mut self, key: &str, row: &Row) -> Result<Unit, FactoryError> {
        let spec = &queries::UNIT;
        let decoder = RowDecoder::new(row, spec.columns, ObjectType::Unit, key);
        let code = decoder.required_i64("UOM_CODE")?;
        let identity = Identity::named(decoder.required_string("UNIT_OF_MEAS_NAME")?)
            .with_remarks(decoder.optional_string("REMARKS")?);
        if let Some(base) = base_unit(code) {
            let properties = self.properties(spec.table, key, identity)?;
            return Ok(Unit {
                properties,
                kind: base.kind,
                factor: base.factor,
            });
        }
        let target = decoder.required_i64("TARGET_UOM_CODE")?;
        let Some(base) = base_unit(target) else {
            return Err(decoder.error("TARGET_UOM_CODE", format!("unknown base unit {target}")));
        };
        let ratio = decoder.required_f64("FACTOR_B")? / decoder.required_f64("FACTOR_C")?;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(decoder.error("FACTOR_C", "conversion factor is not a positive number"));
        }
        let properties = self.properties(spec.table, key, identity)?;
        Ok(base.scaled(properties, ratio))
    }

    /// Returns the ellipsoid at primary key `key`.
    pub(super) fn ellipsoid_by_key(&mut self, key: &str) -> Result<Arc<Ellipsoid>, FactoryError> {
        self.pooled_or_build(&queries::ELLIPSOID, ObjectType::Ellipsoid, key, |session, row| {
            session.ellipsoid_from_row(key, row)
        })
    }

    /// Decodes one ellipsoid row.
    fn ellipsoid_from_row(&mut self, key: &str, row: &Row) -> Result<Ellipsoid, FactoryError> {
        let spec = &queries::ELLIPSOID;
        let decoder = RowDecoder::new(row, spec.columns, ObjectType::Ellipsoid, key);
        let semi_major = decoder.required_f64("SEMI_MAJOR_AXIS")?;
        let inverse_flattening =
            decoder.optional_f64("INV_FLATTENING")?.filter(|value| value.abs() > 0.0);
        let semi_minor = decoder.optional_f64("SEMI_MINOR_AXIS")?.filter(|value| value.abs() > 0.0);
        if inverse_flattening.is_none() && semi_minor.is_none() {
            return Err(decoder.error(
                "SEMI_MINOR_AXIS",
                "neither inverse flattening nor semi-minor axis is defined",
            ));
        }
        let unit = self.unit_by_key(&decoder.required_code("UOM_CODE")?)?;
        let identity = Identity::named(decoder.required_string("ELLIPSOID_NAME")?)
            .with_remarks(decoder.optional_string("REMARKS")?);
        let properties = self.properties(spec.table, key, identity)?;
        match (inverse_flattening, semi_minor) {
            (Some(inverse_flattening), semi_minor) => {
                if semi_minor.is_some() {
                    warn!(
                        code = key,
                        "ellipsoid defines both inverse flattening and semi-minor axis; using \
                         inverse flattening"
                    );
                }
                Ok(Ellipsoid::from_flattening(properties, semi_major, inverse_flattening, unit))
            }
            (None, Some(semi_minor)) => {
                Ok(Ellipsoid::from_axes(properties, semi_major, semi_minor, unit))
            }
            (None, None) => Err(decoder.error("SEMI_MINOR_AXIS", "missing required value")),
        }
    }

    /// Returns the prime meridian at primary key `key`.
    pub(super) fn prime_meridian_by_key(
        &mut self,
        key: &str,
    ) -> Result<Arc<PrimeMeridian>, FactoryError> {
        let spec = &queries::PRIME_MERIDIAN;
        self.pooled_or_build(spec, ObjectType::PrimeMeridian, key, |session, row| {
            let decoder = RowDecoder::new(row, spec.columns, ObjectType::PrimeMeridian, key);
            let greenwich_longitude = decoder.required_f64("GREENWICH_LONGITUDE")?;
            let angular_unit = session.unit_by_key(&decoder.required_code("UOM_CODE")?)?;
            let identity = Identity::named(decoder.required_string("PRIME_MERIDIAN_NAME")?)
                .with_remarks(decoder.optional_string("REMARKS")?);
            Ok(PrimeMeridian {
                properties: session.properties(spec.table, key, identity)?,
                greenwich_longitude,
                angular_unit,
            })
        })
    }

    /// Returns the area of use at primary key `key`.
    pub(super) fn extent_by_key(&mut self, key: &str) -> Result<Arc<Extent>, FactoryError> {
        let spec = &queries::AREA;
        let authority = self.authority;
        self.pooled_or_build(spec, ObjectType::Extent, key, |_, row| {
            let decoder = RowDecoder::new(row, spec.columns, ObjectType::Extent, key);
            let description = match decoder.optional_string("AREA_OF_USE")? {
                Some(description) => Some(description),
                None => decoder.optional_string("AREA_NAME")?,
            };
            let bounds = (
                decoder.optional_f64("AREA_WEST_BOUND_LON")?,
                decoder.optional_f64("AREA_EAST_BOUND_LON")?,
                decoder.optional_f64("AREA_SOUTH_BOUND_LAT")?,
                decoder.optional_f64("AREA_NORTH_BOUND_LAT")?,
            );
            let bounding_box = match bounds {
                (Some(west), Some(east), Some(south), Some(north)) => Some(GeographicBoundingBox {
                    west,
                    east,
                    south,
                    north,
                }),
                _ => None,
            };
            Ok(Extent {
                identifier: Some(AuthorityCode::new(authority, key)),
                description,
                bounding_box,
            })
        })
    }
}

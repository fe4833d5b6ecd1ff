// crates/epsg-factory/src/factory/datum.rs
// ============================================================================
// Module: Datum Constructors
// Description: Geodetic, vertical, and engineering datums with datum shifts.
// Purpose: Resolve datum rows and their Bursa-Wolf parameters without cycling.
// Dependencies: epsg-core, tracing
// ============================================================================

//! ## Overview
//! A geodetic datum carries the seven-parameter shifts recorded towards other
//! datums. Resolving a shift builds its target datum, whose own shifts may
//! point back. The datum being resolved is placed in a guard set for the
//! duration of each target resolution; a datum found in the guard gets no
//! shifts, which cuts the cycle after one level.
//!
//! Every shift target is built at most once per call and shared by all the
//! shifts that reach it.
//!
//! Only the best candidate per target datum is kept: the query orders
//! non-deprecated, most accurate operations first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use epsg_core::BursaWolfParameters;
use epsg_core::Datum;
use epsg_core::DatumKind;
use epsg_core::FactoryError;
use epsg_core::ObjectType;
use epsg_core::Row;
use epsg_core::SqlValue;
use epsg_core::base_unit;
use tracing::debug;

use super::Session;
use super::bind;
use super::properties::Identity;
use crate::decoder::RowDecoder;
use crate::queries;
use crate::tables::DatumDiscriminator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Coordinate frame rotation method; rotations use the opposite sign.
const COORDINATE_FRAME_METHOD: i64 = 9607;
/// Metre unit code.
const UOM_METRE: i64 = 9001;
/// Arc-second unit code.
const UOM_ARC_SECOND: i64 = 9104;
/// Parts per million unit code.
const UOM_PPM: i64 = 9202;

/// X-axis translation.
const X_TRANSLATION: i64 = 8605;
/// Y-axis translation.
const Y_TRANSLATION: i64 = 8606;
/// Z-axis translation.
const Z_TRANSLATION: i64 = 8607;
/// X-axis rotation.
const X_ROTATION: i64 = 8608;
/// Y-axis rotation.
const Y_ROTATION: i64 = 8609;
/// Z-axis rotation.
const Z_ROTATION: i64 = 8610;
/// Scale difference.
const SCALE_DIFFERENCE: i64 = 8611;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Datum-shift operation leaving the datum being resolved.
struct ShiftCandidate {
    /// Operation code.
    operation: String,
    /// Operation method code.
    method: i64,
    /// Target datum code.
    target: String,
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl Session<'_> {
    /// Returns the datum at primary key `key`.
    pub(super) fn datum_by_key(&mut self, key: &str) -> Result<Arc<Datum>, FactoryError> {
        self.pooled_or_build(&queries::DATUM, ObjectType::Datum, key, |session, row| {
            session.datum_from_row(key, row)
        })
    }

    /// Decodes one datum row.
    fn datum_from_row(&mut self, key: &str, row: &Row) -> Result<Datum, FactoryError> {
        let spec = &queries::DATUM;
        let decoder = RowDecoder::new(row, spec.columns, ObjectType::Datum, key);
        let type_text = decoder.required_string("DATUM_TYPE")?;
        let Some(discriminator) = DatumDiscriminator::parse(&type_text) else {
            return Err(decoder.error("DATUM_TYPE", format!("unknown datum type \"{type_text}\"")));
        };
        let identity = Identity {
            name: decoder.required_string("DATUM_NAME")?,
            remarks: decoder.optional_string("REMARKS")?,
            area_code: decoder.optional_code("AREA_OF_USE_CODE")?,
            scope: decoder.optional_string("DATUM_SCOPE")?,
        };
        let anchor = decoder.optional_string("ORIGIN_DESCRIPTION")?;
        let realization_epoch = decoder.optional_string("REALIZATION_EPOCH")?;
        let kind = match discriminator {
            DatumDiscriminator::Geodetic => {
                let ellipsoid = self.ellipsoid_by_key(&decoder.required_code("ELLIPSOID_CODE")?)?;
                let prime_meridian =
                    self.prime_meridian_by_key(&decoder.required_code("PRIME_MERIDIAN_CODE")?)?;
                let bursa_wolf = self.bursa_wolf(key)?;
                DatumKind::Geodetic {
                    ellipsoid,
                    prime_meridian,
                    bursa_wolf,
                }
            }
            DatumDiscriminator::Vertical => DatumKind::Vertical,
            DatumDiscriminator::Engineering => DatumKind::Engineering,
        };
        Ok(Datum {
            properties: self.properties(spec.table, key, identity)?,
            anchor,
            realization_epoch,
            kind,
        })
    }

    /// Runs `build` with `key` in the datum-shift guard.
    fn with_shift_guard<T>(
        &mut self,
        key: &str,
        build: impl FnOnce(&mut Self) -> Result<T, FactoryError>,
    ) -> Result<T, FactoryError> {
        let inserted = self.state.shift_guard.insert(key.to_string());
        let result = build(self);
        if inserted {
            self.state.shift_guard.remove(key);
        }
        result
    }

    /// Returns the target datum `target` of a shift leaving datum `key`.
    ///
    /// Targets are built once per call and reused by later shifts.
    fn shift_target(&mut self, key: &str, target: &str) -> Result<Arc<Datum>, FactoryError> {
        if let Some(datum) = self.state.shift_targets.get(target) {
            return Ok(Arc::clone(datum));
        }
        let datum = self.with_shift_guard(key, |session| session.datum_by_key(target))?;
        self.state.shift_targets.insert(target.to_string(), Arc::clone(&datum));
        Ok(datum)
    }

    /// Returns the datum shifts leaving datum `key`.
    ///
    /// Returns no shifts when `key` is already being resolved.
    fn bursa_wolf(&mut self, key: &str) -> Result<Vec<BursaWolfParameters>, FactoryError> {
        if self.state.shift_guard.contains(key) {
            return Ok(Vec::new());
        }
        let rows = self.fetch_sql(
            queries::BURSA_WOLF_KEY,
            || queries::BURSA_WOLF_SQL.to_string(),
            &[bind(key)],
            None,
            ObjectType::GeodeticDatum,
            key,
        )?;
        let mut candidates: Vec<ShiftCandidate> = Vec::new();
        for row in &rows {
            let decoder =
                RowDecoder::new(row, queries::BURSA_WOLF_COLUMNS, ObjectType::GeodeticDatum, key);
            let candidate = ShiftCandidate {
                operation: decoder.required_code("COORD_OP_CODE")?,
                method: decoder.required_i64("COORD_OP_METHOD_CODE")?,
                target: decoder.required_code("DATUM_CODE")?,
            };
            if candidate.target == key {
                continue;
            }
            if candidates.iter().any(|kept| kept.target == candidate.target) {
                debug!(
                    datum = key,
                    target = %candidate.target,
                    operation = %candidate.operation,
                    "skipping lower-ranked datum shift"
                );
                continue;
            }
            candidates.push(candidate);
        }
        let mut shifts = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let target = self.shift_target(key, &candidate.target)?;
            let mut shift = BursaWolfParameters::identity(target);
            self.fill_shift(&candidate, &mut shift)?;
            shifts.push(shift);
        }
        Ok(shifts)
    }

    /// Reads the parameter values of a datum-shift operation into `shift`.
    fn fill_shift(
        &mut self,
        candidate: &ShiftCandidate,
        shift: &mut BursaWolfParameters,
    ) -> Result<(), FactoryError> {
        let spec = &queries::PARAMETER_VALUES;
        let code = candidate.operation.as_str();
        let rows = self.fetch(
            spec,
            &[bind(code), SqlValue::Integer(candidate.method)],
            ObjectType::Transformation,
            code,
        )?;
        for row in &rows {
            let decoder = RowDecoder::new(row, spec.columns, ObjectType::Transformation, code);
            let parameter = decoder.required_i64("PARAMETER_CODE")?;
            let Some(value) = decoder.optional_f64("PARAMETER_VALUE")? else {
                continue;
            };
            let target_unit = match parameter {
                X_TRANSLATION | Y_TRANSLATION | Z_TRANSLATION => UOM_METRE,
                X_ROTATION | Y_ROTATION | Z_ROTATION => UOM_ARC_SECOND,
                SCALE_DIFFERENCE => UOM_PPM,
                _ => continue,
            };
            let value = match decoder.optional_code("UOM_CODE")? {
                Some(unit) => {
                    let unit = self.unit_by_key(&unit)?;
                    base_unit(target_unit)
                        .and_then(|target| unit.convert_to(value, &target))
                        .ok_or_else(|| {
                            decoder.error("UOM_CODE", "unit does not measure the parameter quantity")
                        })?
                }
                None => value,
            };
            let slot = match parameter {
                X_TRANSLATION => &mut shift.dx,
                Y_TRANSLATION => &mut shift.dy,
                Z_TRANSLATION => &mut shift.dz,
                X_ROTATION => &mut shift.ex,
                Y_ROTATION => &mut shift.ey,
                Z_ROTATION => &mut shift.ez,
                _ => &mut shift.ppm,
            };
            *slot = value;
        }
        if candidate.method == COORDINATE_FRAME_METHOD {
            shift.ex = -shift.ex;
            shift.ey = -shift.ey;
            shift.ez = -shift.ez;
        }
        Ok(())
    }
}

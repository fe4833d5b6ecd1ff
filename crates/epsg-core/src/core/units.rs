// crates/epsg-core/src/core/units.rs
// ============================================================================
// Module: Units of Measure
// Description: Base unit table and scaled unit definitions.
// Purpose: Resolve EPSG unit codes to SI-relative scale factors.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A fixed table of well-known base units is keyed by EPSG integer code. Every
//! other unit is derived by scaling one of these by the `FACTOR_B / FACTOR_C`
//! ratio stored in the dataset.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::f64::consts::PI;

use serde::Serialize;

use crate::core::identifiers::AuthorityCode;
use crate::core::properties::Properties;

// ============================================================================
// SECTION: Unit Types
// ============================================================================

/// Physical quantity measured by a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Length, SI base metre.
    Linear,
    /// Plane angle, SI base radian.
    Angular,
    /// Dimensionless scale, base unity.
    Scale,
    /// Duration, SI base second.
    Time,
}

/// Unit of measure expressed as a factor of its SI base unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unit {
    /// Identification properties.
    pub properties: Properties,
    /// Quantity measured.
    pub kind: UnitKind,
    /// Multiplier converting a value in this unit to the SI base unit.
    pub factor: f64,
}

impl Unit {
    /// Converts `value` expressed in this unit to the SI base unit.
    #[must_use]
    pub fn to_base(&self, value: f64) -> f64 {
        value * self.factor
    }

    /// Converts `value` expressed in this unit to `target`.
    ///
    /// Returns `None` when the two units measure different quantities.
    #[must_use]
    pub fn convert_to(&self, value: f64, target: &Self) -> Option<f64> {
        (self.kind == target.kind).then(|| value * self.factor / target.factor)
    }

    /// Returns a unit scaled from `self` by `ratio`, carrying new properties.
    #[must_use]
    pub fn scaled(&self, properties: Properties, ratio: f64) -> Self {
        Self {
            properties,
            kind: self.kind,
            factor: self.factor * ratio,
        }
    }
}

// ============================================================================
// SECTION: Base Unit Table
// ============================================================================

/// Radians per arc-second.
const ARC_SECOND: f64 = PI / (180.0 * 3600.0);

/// Well-known base units: EPSG code, name, kind, SI factor.
pub const BASE_UNITS: [(i64, &str, UnitKind, f64); 16] = [
    (9001, "metre", UnitKind::Linear, 1.0),
    (9002, "foot", UnitKind::Linear, 0.3048),
    (9003, "US survey foot", UnitKind::Linear, 1200.0 / 3937.0),
    (9030, "nautical mile", UnitKind::Linear, 1852.0),
    (9036, "kilometre", UnitKind::Linear, 1000.0),
    (9101, "radian", UnitKind::Angular, 1.0),
    (9102, "degree", UnitKind::Angular, PI / 180.0),
    (9103, "arc-minute", UnitKind::Angular, PI / (180.0 * 60.0)),
    (9104, "arc-second", UnitKind::Angular, ARC_SECOND),
    (9105, "grad", UnitKind::Angular, PI / 200.0),
    (9109, "microradian", UnitKind::Angular, 1.0e-6),
    (9110, "sexagesimal DMS", UnitKind::Angular, PI / 180.0),
    (9122, "degree (supplier to define representation)", UnitKind::Angular, PI / 180.0),
    (9201, "unity", UnitKind::Scale, 1.0),
    (9202, "parts per million", UnitKind::Scale, 1.0e-6),
    (1040, "second", UnitKind::Time, 1.0),
];

/// Returns the base unit registered under `code`, if any.
#[must_use]
pub fn base_unit(code: i64) -> Option<Unit> {
    BASE_UNITS.iter().find(|(candidate, ..)| *candidate == code).map(|(code, name, kind, factor)| {
        Unit {
            properties: Properties::identified(*name, AuthorityCode::new("EPSG", code.to_string())),
            kind: *kind,
            factor: *factor,
        }
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::UnitKind;
    use super::base_unit;
    use crate::core::properties::Properties;

    #[test]
    fn degree_converts_to_arc_seconds() {
        let degree = base_unit(9102).unwrap();
        let second = base_unit(9104).unwrap();
        let converted = degree.convert_to(1.0, &second).unwrap();
        assert!((converted - 3600.0).abs() < 1e-9);
    }

    #[test]
    fn mismatched_quantities_do_not_convert() {
        let metre = base_unit(9001).unwrap();
        let radian = base_unit(9101).unwrap();
        assert_eq!(metre.convert_to(1.0, &radian), None);
    }

    #[test]
    fn scaled_units_keep_their_kind() {
        let metre = base_unit(9001).unwrap();
        let chain = metre.scaled(Properties::named("British chain"), 20.1168);
        assert_eq!(chain.kind, UnitKind::Linear);
        assert!((chain.to_base(1.0) - 20.1168).abs() < 1e-12);
    }

    #[test]
    fn unknown_codes_have_no_base() {
        assert!(base_unit(9999).is_none());
    }
}

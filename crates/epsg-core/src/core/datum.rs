// crates/epsg-core/src/core/datum.rs
// ============================================================================
// Module: Datums
// Description: Ellipsoids, prime meridians, datums, and datum shifts.
// Purpose: Model the reference frames underlying coordinate reference systems.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A geodetic [`Datum`] owns its ellipsoid, prime meridian, and the list of
//! Bursa-Wolf shifts towards other geodetic datums. Shift targets are regular
//! datums; a target built while its own shifts pointed back at the origin
//! carries no shifts, so the object graph is always finite.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::core::properties::Properties;
use crate::core::units::Unit;

// ============================================================================
// SECTION: Ellipsoid
// ============================================================================

/// Reference ellipsoid.
///
/// # Invariants
/// - `semi_minor_axis <= semi_major_axis`, both in `unit`.
/// - `inverse_flattening` is infinite for spheres.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ellipsoid {
    /// Identification properties.
    pub properties: Properties,
    /// Semi-major axis length.
    pub semi_major_axis: f64,
    /// Semi-minor axis length.
    pub semi_minor_axis: f64,
    /// Inverse flattening (`a / (a - b)`).
    pub inverse_flattening: f64,
    /// `true` when the inverse flattening is the defining parameter.
    pub ivf_definitive: bool,
    /// Linear unit of both axes.
    pub unit: Arc<Unit>,
}

impl Ellipsoid {
    /// Builds an ellipsoid from its semi-major axis and inverse flattening.
    #[must_use]
    pub fn from_flattening(
        properties: Properties,
        semi_major_axis: f64,
        inverse_flattening: f64,
        unit: Arc<Unit>,
    ) -> Self {
        let semi_minor_axis = if inverse_flattening.is_infinite() {
            semi_major_axis
        } else {
            semi_major_axis * (1.0 - 1.0 / inverse_flattening)
        };
        Self {
            properties,
            semi_major_axis,
            semi_minor_axis,
            inverse_flattening,
            ivf_definitive: true,
            unit,
        }
    }

    /// Builds an ellipsoid (or sphere) from its two semi-axes.
    #[must_use]
    pub fn from_axes(
        properties: Properties,
        semi_major_axis: f64,
        semi_minor_axis: f64,
        unit: Arc<Unit>,
    ) -> Self {
        let inverse_flattening = if (semi_major_axis - semi_minor_axis).abs() < f64::EPSILON {
            f64::INFINITY
        } else {
            semi_major_axis / (semi_major_axis - semi_minor_axis)
        };
        Self {
            properties,
            semi_major_axis,
            semi_minor_axis,
            inverse_flattening,
            ivf_definitive: false,
            unit,
        }
    }

    /// Returns `true` when both semi-axes are equal.
    #[must_use]
    pub fn is_sphere(&self) -> bool {
        self.inverse_flattening.is_infinite()
    }

    /// Returns the semi-major axis in metres.
    #[must_use]
    pub fn semi_major_axis_metres(&self) -> f64 {
        self.unit.to_base(self.semi_major_axis)
    }

    /// Returns the semi-minor axis in metres.
    #[must_use]
    pub fn semi_minor_axis_metres(&self) -> f64 {
        self.unit.to_base(self.semi_minor_axis)
    }
}

// ============================================================================
// SECTION: Prime Meridian
// ============================================================================

/// Prime meridian defining the origin of longitudes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimeMeridian {
    /// Identification properties.
    pub properties: Properties,
    /// Longitude of the meridian relative to Greenwich, in `angular_unit`.
    pub greenwich_longitude: f64,
    /// Angular unit of the Greenwich longitude.
    pub angular_unit: Arc<Unit>,
}

// ============================================================================
// SECTION: Datum Shifts
// ============================================================================

/// Seven-parameter datum shift towards a target datum.
///
/// Rotations follow the position-vector convention; translations are in metres,
/// rotations in arc-seconds, and the scale difference in parts per million.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BursaWolfParameters {
    /// Datum the shift leads to.
    pub target_datum: Arc<Datum>,
    /// X translation (m).
    pub dx: f64,
    /// Y translation (m).
    pub dy: f64,
    /// Z translation (m).
    pub dz: f64,
    /// X rotation (arc-seconds).
    pub ex: f64,
    /// Y rotation (arc-seconds).
    pub ey: f64,
    /// Z rotation (arc-seconds).
    pub ez: f64,
    /// Scale difference (ppm).
    pub ppm: f64,
}

impl BursaWolfParameters {
    /// Creates an identity shift towards `target_datum`.
    #[must_use]
    pub const fn identity(target_datum: Arc<Datum>) -> Self {
        Self {
            target_datum,
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
            ex: 0.0,
            ey: 0.0,
            ez: 0.0,
            ppm: 0.0,
        }
    }

    /// Returns `true` when only the translation terms are non-zero.
    #[must_use]
    pub fn is_translation(&self) -> bool {
        self.ex == 0.0 && self.ey == 0.0 && self.ez == 0.0 && self.ppm == 0.0
    }

    /// Returns the 3x4 affine rows of the small-angle geocentric shift.
    #[must_use]
    pub fn affine_rows(&self) -> [[f64; 4]; 3] {
        helmert_rows([self.dx, self.dy, self.dz], [self.ex, self.ey, self.ez], self.ppm)
    }
}

/// Returns the 3x4 affine rows of a position-vector seven-parameter shift.
///
/// Translations are in metres, rotations in arc-seconds, and the scale
/// difference in parts per million.
#[must_use]
pub fn helmert_rows(translation: [f64; 3], rotation: [f64; 3], ppm: f64) -> [[f64; 4]; 3] {
    let arc_second = std::f64::consts::PI / (180.0 * 3600.0);
    let s = 1.0 + ppm * 1.0e-6;
    let [dx, dy, dz] = translation;
    let rx = rotation[0] * arc_second * s;
    let ry = rotation[1] * arc_second * s;
    let rz = rotation[2] * arc_second * s;
    [[s, -rz, ry, dx], [rz, s, -rx, dy], [-ry, rx, s, dz]]
}

// ============================================================================
// SECTION: Datum
// ============================================================================

/// Datum variants keyed by the dataset's `DATUM_TYPE` discriminator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatumKind {
    /// Geodetic datum.
    Geodetic {
        /// Reference ellipsoid.
        ellipsoid: Arc<Ellipsoid>,
        /// Prime meridian.
        prime_meridian: Arc<PrimeMeridian>,
        /// Known shifts towards other geodetic datums.
        bursa_wolf: Vec<BursaWolfParameters>,
    },
    /// Vertical datum.
    Vertical,
    /// Engineering (local) datum.
    Engineering,
}

/// Reference frame of a coordinate reference system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datum {
    /// Identification properties.
    pub properties: Properties,
    /// Description of the datum origin.
    pub anchor: Option<String>,
    /// Realization epoch text.
    pub realization_epoch: Option<String>,
    /// Datum variant.
    pub kind: DatumKind,
}

impl Datum {
    /// Returns the ellipsoid of a geodetic datum.
    #[must_use]
    pub const fn ellipsoid(&self) -> Option<&Arc<Ellipsoid>> {
        match &self.kind {
            DatumKind::Geodetic {
                ellipsoid, ..
            } => Some(ellipsoid),
            _ => None,
        }
    }

    /// Returns the datum shifts of a geodetic datum (empty otherwise).
    #[must_use]
    pub fn bursa_wolf(&self) -> &[BursaWolfParameters] {
        match &self.kind {
            DatumKind::Geodetic {
                bursa_wolf, ..
            } => bursa_wolf,
            _ => &[],
        }
    }
}

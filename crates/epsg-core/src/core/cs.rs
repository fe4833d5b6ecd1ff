// crates/epsg-core/src/core/cs.rs
// ============================================================================
// Module: Coordinate Systems
// Description: Axes, axis directions, and coordinate systems.
// Purpose: Model the ordered axis sets used by coordinate reference systems.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`CoordinateSystem`] is an ordered list of axes whose length equals its
//! declared dimension. Axis directions come from the dataset's orientation
//! text; geocentric axes use three dataset-specific phrases.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::core::properties::Properties;
use crate::core::units::Unit;

// ============================================================================
// SECTION: Axis Direction
// ============================================================================

/// Direction of a coordinate system axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisDirection {
    /// Towards north.
    North,
    /// Towards south.
    South,
    /// Towards east.
    East,
    /// Towards west.
    West,
    /// Upwards.
    Up,
    /// Downwards.
    Down,
    /// Geocentric X: from the geocentre towards the equator at the prime meridian.
    GeocentricX,
    /// Geocentric Y: from the geocentre towards the equator at 90°E.
    GeocentricY,
    /// Geocentric Z: from the geocentre towards the north pole.
    GeocentricZ,
    /// Towards the viewer in a display plane.
    DisplayRight,
    /// Downwards in a display plane.
    DisplayDown,
    /// Towards the future.
    Future,
    /// Towards the past.
    Past,
    /// Unspecified or other direction.
    Other,
}

/// Orientation phrases: dataset text (lower case) and direction.
const DIRECTION_NAMES: [(&str, AxisDirection); 12] = [
    ("north", AxisDirection::North),
    ("south", AxisDirection::South),
    ("east", AxisDirection::East),
    ("west", AxisDirection::West),
    ("up", AxisDirection::Up),
    ("down", AxisDirection::Down),
    ("display right", AxisDirection::DisplayRight),
    ("display down", AxisDirection::DisplayDown),
    ("future", AxisDirection::Future),
    ("past", AxisDirection::Past),
    ("other", AxisDirection::Other),
    ("unspecified", AxisDirection::Other),
];

/// Geocentric-specific orientation phrases used by the dataset.
const GEOCENTRIC_NAMES: [(&str, AxisDirection); 3] = [
    ("geocentre > equator/pm", AxisDirection::GeocentricX),
    ("geocentre > equator/90de", AxisDirection::GeocentricY),
    ("geocentre > north pole", AxisDirection::GeocentricZ),
];

impl AxisDirection {
    /// Parses a dataset orientation string, case-insensitively.
    ///
    /// Returns `None` for unrecognized text.
    #[must_use]
    pub fn parse(orientation: &str) -> Option<Self> {
        let normalized = orientation.trim().to_ascii_lowercase();
        DIRECTION_NAMES
            .iter()
            .chain(GEOCENTRIC_NAMES.iter())
            .find(|(name, _)| *name == normalized)
            .map(|(_, direction)| *direction)
    }
}

// ============================================================================
// SECTION: Axis
// ============================================================================

/// Coordinate system axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateSystemAxis {
    /// Identification properties.
    pub properties: Properties,
    /// Axis abbreviation (for example `Lat`).
    pub abbreviation: String,
    /// Axis direction.
    pub direction: AxisDirection,
    /// Unit of values along the axis.
    pub unit: Arc<Unit>,
}

// ============================================================================
// SECTION: Coordinate System
// ============================================================================

/// Coordinate system variants keyed by the dataset's `COORD_SYS_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CsKind {
    /// Cartesian (2D or 3D).
    Cartesian,
    /// Ellipsoidal (2D or 3D).
    Ellipsoidal,
    /// Spherical (3D).
    Spherical,
    /// Vertical (1D).
    Vertical,
    /// Linear (1D).
    Linear,
    /// Polar (2D).
    Polar,
    /// Cylindrical (3D).
    Cylindrical,
}

/// Known discriminators: dataset text (lower case), kind, accepted dimensions.
const CS_KINDS: [(&str, CsKind, &[usize]); 7] = [
    ("cartesian", CsKind::Cartesian, &[2, 3]),
    ("ellipsoidal", CsKind::Ellipsoidal, &[2, 3]),
    ("spherical", CsKind::Spherical, &[3]),
    ("vertical", CsKind::Vertical, &[1]),
    ("linear", CsKind::Linear, &[1]),
    ("polar", CsKind::Polar, &[2]),
    ("cylindrical", CsKind::Cylindrical, &[3]),
];

impl CsKind {
    /// Parses the type discriminator, case-insensitively.
    #[must_use]
    pub fn parse(discriminator: &str) -> Option<Self> {
        let normalized = discriminator.trim().to_ascii_lowercase();
        CS_KINDS.iter().find(|(name, ..)| *name == normalized).map(|(_, kind, _)| *kind)
    }

    /// Returns `true` when `dimension` is valid for this kind.
    #[must_use]
    pub fn accepts_dimension(self, dimension: usize) -> bool {
        CS_KINDS
            .iter()
            .find(|(_, kind, _)| *kind == self)
            .is_some_and(|(_, _, dimensions)| dimensions.contains(&dimension))
    }
}

/// Ordered set of axes.
///
/// # Invariants
/// - `axes.len()` is accepted by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateSystem {
    /// Identification properties.
    pub properties: Properties,
    /// Coordinate system variant.
    pub kind: CsKind,
    /// Axes in dataset order.
    pub axes: Vec<Arc<CoordinateSystemAxis>>,
}

impl CoordinateSystem {
    /// Returns the number of axes.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.axes.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::AxisDirection;
    use super::CsKind;

    #[test]
    fn orientation_text_is_case_insensitive() {
        assert_eq!(AxisDirection::parse("North"), Some(AxisDirection::North));
        assert_eq!(AxisDirection::parse(" EAST "), Some(AxisDirection::East));
        assert_eq!(AxisDirection::parse("sideways"), None);
    }

    #[test]
    fn geocentric_phrases_map_to_geocentric_axes() {
        assert_eq!(AxisDirection::parse("Geocentre > equator/PM"), Some(AxisDirection::GeocentricX));
        assert_eq!(
            AxisDirection::parse("Geocentre > equator/90dE"),
            Some(AxisDirection::GeocentricY)
        );
        assert_eq!(AxisDirection::parse("Geocentre > north pole"), Some(AxisDirection::GeocentricZ));
    }

    #[test]
    fn coordinate_system_kinds_validate_dimension() {
        let vertical = CsKind::parse("vertical").unwrap();
        assert!(vertical.accepts_dimension(1));
        assert!(!vertical.accepts_dimension(2));
        assert!(CsKind::parse("Ellipsoidal").unwrap().accepts_dimension(3));
        assert_eq!(CsKind::parse("affine"), None);
    }
}

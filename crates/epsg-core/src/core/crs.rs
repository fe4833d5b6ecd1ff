// crates/epsg-core/src/core/crs.rs
// ============================================================================
// Module: Coordinate Reference Systems
// Description: Geographic, projected, geocentric, vertical, engineering, and
//              compound CRS definitions.
// Purpose: Tie coordinate systems to datums (or to base CRSs for projections).
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`CoordinateReferenceSystem`] pairs identification properties with a
//! variant-specific payload. Projected systems own their base geographic CRS
//! and the defining conversion from it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::core::cs::CoordinateSystem;
use crate::core::datum::Datum;
use crate::core::operation::CoordinateOperation;
use crate::core::properties::Properties;

// ============================================================================
// SECTION: Types
// ============================================================================

/// CRS variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrsKind {
    /// Geographic CRS on an ellipsoidal coordinate system.
    Geographic {
        /// Geodetic datum.
        datum: Arc<Datum>,
        /// Ellipsoidal coordinate system.
        cs: Arc<CoordinateSystem>,
    },
    /// Geocentric CRS on a Cartesian coordinate system.
    Geocentric {
        /// Geodetic datum.
        datum: Arc<Datum>,
        /// Cartesian coordinate system.
        cs: Arc<CoordinateSystem>,
    },
    /// Projected CRS derived from a geographic CRS.
    Projected {
        /// Base geographic CRS.
        base: Arc<CoordinateReferenceSystem>,
        /// Defining conversion from the base CRS.
        conversion: Arc<CoordinateOperation>,
        /// Cartesian coordinate system.
        cs: Arc<CoordinateSystem>,
    },
    /// Vertical CRS.
    Vertical {
        /// Vertical datum.
        datum: Arc<Datum>,
        /// Vertical coordinate system.
        cs: Arc<CoordinateSystem>,
    },
    /// Engineering (local) CRS.
    Engineering {
        /// Engineering datum.
        datum: Arc<Datum>,
        /// Coordinate system.
        cs: Arc<CoordinateSystem>,
    },
    /// Compound CRS made of ordered components.
    Compound {
        /// Component CRSs, horizontal first.
        components: Vec<Arc<CoordinateReferenceSystem>>,
    },
}

/// Coordinate reference system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinateReferenceSystem {
    /// Identification properties.
    pub properties: Properties,
    /// CRS variant.
    pub kind: CrsKind,
}

impl CoordinateReferenceSystem {
    /// Returns the number of ordinates of a position in this CRS.
    #[must_use]
    pub fn dimension(&self) -> usize {
        match &self.kind {
            CrsKind::Compound {
                components,
            } => components.iter().map(|component| component.dimension()).sum(),
            _ => self.coordinate_system().map_or(0, |cs| cs.dimension()),
        }
    }

    /// Returns the coordinate system, absent for compound CRSs.
    #[must_use]
    pub const fn coordinate_system(&self) -> Option<&Arc<CoordinateSystem>> {
        match &self.kind {
            CrsKind::Geographic {
                cs, ..
            }
            | CrsKind::Geocentric {
                cs, ..
            }
            | CrsKind::Projected {
                cs, ..
            }
            | CrsKind::Vertical {
                cs, ..
            }
            | CrsKind::Engineering {
                cs, ..
            } => Some(cs),
            CrsKind::Compound {
                ..
            } => None,
        }
    }

    /// Returns the datum; projected CRSs report their base CRS datum.
    #[must_use]
    pub fn datum(&self) -> Option<&Arc<Datum>> {
        match &self.kind {
            CrsKind::Geographic {
                datum, ..
            }
            | CrsKind::Geocentric {
                datum, ..
            }
            | CrsKind::Vertical {
                datum, ..
            }
            | CrsKind::Engineering {
                datum, ..
            } => Some(datum),
            CrsKind::Projected {
                base, ..
            } => base.datum(),
            CrsKind::Compound {
                ..
            } => None,
        }
    }

    /// Returns the authority code text, if identified.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.properties.code()
    }
}

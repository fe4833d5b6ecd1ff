// crates/epsg-core/src/core/extent.rs
// ============================================================================
// Module: Areas of Use
// Description: Valid-area descriptions with optional geographic bounds.
// Purpose: Attach areas of use to identified objects.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! An [`Extent`] carries the textual area description and, when all four
//! bounds are known, a geographic bounding box in decimal degrees.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::identifiers::AuthorityCode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Geographic bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeographicBoundingBox {
    /// Western-most longitude.
    pub west: f64,
    /// Eastern-most longitude.
    pub east: f64,
    /// Southern-most latitude.
    pub south: f64,
    /// Northern-most latitude.
    pub north: f64,
}

impl GeographicBoundingBox {
    /// Returns `true` when the box crosses the anti-meridian.
    #[must_use]
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }
}

/// Area of use of an identified object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extent {
    /// Area code within the authority.
    pub identifier: Option<AuthorityCode>,
    /// Textual description of the area.
    pub description: Option<String>,
    /// Geographic bounds, present only when all four bounds are known.
    pub bounding_box: Option<GeographicBoundingBox>,
}

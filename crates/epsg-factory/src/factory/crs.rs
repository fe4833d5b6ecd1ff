// crates/epsg-factory/src/factory/crs.rs
// ============================================================================
// Module: CRS Constructors
// Description: Coordinate reference systems of every supported kind.
// Purpose: Dispatch on COORD_REF_SYS_KIND and resolve the CRS's components.
// Dependencies: epsg-core
// ============================================================================

//! ## Overview
//! Geographic, geocentric, vertical, and engineering CRSs combine one
//! coordinate system with one datum, each checked against the CRS kind.
//! A projected CRS resolves its base geographic CRS and its defining
//! conversion; the conversion's properties are merged into the CRS's bag
//! under the `conversion` prefix. A compound CRS resolves its horizontal and
//! vertical components.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use epsg_core::CoordinateReferenceSystem;
use epsg_core::CoordinateSystem;
use epsg_core::CrsKind;
use epsg_core::CsKind;
use epsg_core::Datum;
use epsg_core::DatumKind;
use epsg_core::FactoryError;
use epsg_core::ObjectType;
use epsg_core::Row;

use super::Session;
use super::properties::Identity;
use crate::decoder::RowDecoder;
use crate::queries;
use crate::tables::CrsDiscriminator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix of defining-conversion entries merged into projected CRS properties.
const CONVERSION_PREFIX: &str = "conversion";

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl Session<'_> {
    /// Returns the coordinate reference system at primary key `key`.
    pub(super) fn crs_by_key(
        &mut self,
        key: &str,
    ) -> Result<Arc<CoordinateReferenceSystem>, FactoryError> {
        self.pooled_or_build(
            &queries::CRS,
            ObjectType::CoordinateReferenceSystem,
            key,
            |session, row| session.crs_from_row(key, row),
        )
    }

    /// Decodes one CRS row.
    fn crs_from_row(
        &mut self,
        key: &str,
        row: &Row,
    ) -> Result<CoordinateReferenceSystem, FactoryError> {
        let spec = &queries::CRS;
        let decoder = RowDecoder::new(row, spec.columns, ObjectType::CoordinateReferenceSystem, key);
        let kind_text = decoder.required_string("COORD_REF_SYS_KIND")?;
        let Some(discriminator) = CrsDiscriminator::parse(&kind_text) else {
            return Err(
                decoder.error("COORD_REF_SYS_KIND", format!("unknown CRS kind \"{kind_text}\""))
            );
        };
        let identity = Identity {
            name: decoder.required_string("COORD_REF_SYS_NAME")?,
            remarks: decoder.optional_string("REMARKS")?,
            area_code: decoder.optional_code("AREA_OF_USE_CODE")?,
            scope: decoder.optional_string("CRS_SCOPE")?,
        };
        let kind = match discriminator {
            CrsDiscriminator::Geographic => {
                let (datum, cs) = self.datum_and_cs(&decoder, CsKind::Ellipsoidal)?;
                require_geodetic(&decoder, &datum)?;
                CrsKind::Geographic {
                    datum,
                    cs,
                }
            }
            CrsDiscriminator::Geocentric => {
                let (datum, cs) = self.datum_and_cs(&decoder, CsKind::Cartesian)?;
                require_geodetic(&decoder, &datum)?;
                CrsKind::Geocentric {
                    datum,
                    cs,
                }
            }
            CrsDiscriminator::Vertical => {
                let (datum, cs) = self.datum_and_cs(&decoder, CsKind::Vertical)?;
                if !matches!(datum.kind, DatumKind::Vertical) {
                    return Err(decoder.error("DATUM_CODE", "vertical CRS requires a vertical datum"));
                }
                CrsKind::Vertical {
                    datum,
                    cs,
                }
            }
            CrsDiscriminator::Engineering => {
                let cs = self.coordinate_system_by_key(&decoder.required_code("COORD_SYS_CODE")?)?;
                let datum = self.datum_by_key(&decoder.required_code("DATUM_CODE")?)?;
                if !matches!(datum.kind, DatumKind::Engineering) {
                    return Err(
                        decoder.error("DATUM_CODE", "engineering CRS requires an engineering datum")
                    );
                }
                CrsKind::Engineering {
                    datum,
                    cs,
                }
            }
            CrsDiscriminator::Projected => {
                return self.projected_crs(key, &decoder, identity);
            }
            CrsDiscriminator::Compound => {
                let horizontal = self.crs_by_key(&decoder.required_code("CMPD_HORIZCRS_CODE")?)?;
                let vertical = self.crs_by_key(&decoder.required_code("CMPD_VERTCRS_CODE")?)?;
                CrsKind::Compound {
                    components: vec![horizontal, vertical],
                }
            }
        };
        Ok(CoordinateReferenceSystem {
            properties: self.properties(spec.table, key, identity)?,
            kind,
        })
    }

    /// Resolves the datum and a coordinate system of kind `expected`.
    fn datum_and_cs(
        &mut self,
        decoder: &RowDecoder<'_>,
        expected: CsKind,
    ) -> Result<(Arc<Datum>, Arc<CoordinateSystem>), FactoryError> {
        let cs = self.coordinate_system_by_key(&decoder.required_code("COORD_SYS_CODE")?)?;
        if cs.kind != expected {
            return Err(decoder.error("COORD_SYS_CODE", "coordinate system does not fit the CRS kind"));
        }
        let datum = self.datum_by_key(&decoder.required_code("DATUM_CODE")?)?;
        Ok((datum, cs))
    }

    /// Builds a projected CRS over its base CRS and defining conversion.
    fn projected_crs(
        &mut self,
        key: &str,
        decoder: &RowDecoder<'_>,
        identity: Identity,
    ) -> Result<CoordinateReferenceSystem, FactoryError> {
        let base = self.crs_by_key(&decoder.required_code("SOURCE_GEOGCRS_CODE")?)?;
        let cs = self.coordinate_system_by_key(&decoder.required_code("COORD_SYS_CODE")?)?;
        if cs.kind != CsKind::Cartesian {
            return Err(
                decoder.error("COORD_SYS_CODE", "projected CRS requires a Cartesian coordinate system")
            );
        }
        let conversion =
            self.defining_conversion(&decoder.required_code("PROJECTION_CONV_CODE")?, &base)?;
        let mut properties = self.properties(queries::CRS.table, key, identity)?;
        properties.merge_prefixed(CONVERSION_PREFIX, &conversion.properties);
        Ok(CoordinateReferenceSystem {
            properties,
            kind: CrsKind::Projected {
                base,
                conversion,
                cs,
            },
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Fails unless `datum` is geodetic.
fn require_geodetic(decoder: &RowDecoder<'_>, datum: &Datum) -> Result<(), FactoryError> {
    if matches!(datum.kind, DatumKind::Geodetic { .. }) {
        Ok(())
    } else {
        Err(decoder.error("DATUM_CODE", "CRS requires a geodetic datum"))
    }
}

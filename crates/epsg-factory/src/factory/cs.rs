// crates/epsg-factory/src/factory/cs.rs
// ============================================================================
// Module: Coordinate System Constructors
// Description: Coordinate systems and their axes.
// Purpose: Build axes in dataset order and check them against the dimension.
// Dependencies: epsg-core
// ============================================================================

//! ## Overview
//! Axis names live in their own table, keyed by the axis row's name code. A
//! coordinate system's axis rows must match its declared dimension exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use epsg_core::AxisDirection;
use epsg_core::CoordinateSystem;
use epsg_core::CoordinateSystemAxis;
use epsg_core::CsKind;
use epsg_core::FactoryError;
use epsg_core::ObjectType;
use epsg_core::Row;

use super::Session;
use super::bind;
use super::properties::Identity;
use crate::decoder::RowDecoder;
use crate::queries;

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl Session<'_> {
    /// Returns the axis at primary key `key`.
    pub(super) fn axis_by_key(
        &mut self,
        key: &str,
    ) -> Result<Arc<CoordinateSystemAxis>, FactoryError> {
        self.pooled_or_build(&queries::AXIS, ObjectType::CoordinateSystemAxis, key, |session, row| {
            session.axis_from_row(key, row)
        })
    }

    /// Decodes one axis row.
    fn axis_from_row(&mut self, key: &str, row: &Row) -> Result<CoordinateSystemAxis, FactoryError> {
        let spec = &queries::AXIS;
        let decoder = RowDecoder::new(row, spec.columns, ObjectType::CoordinateSystemAxis, key);
        let orientation = decoder.required_string("COORD_AXIS_ORIENTATION")?;
        let Some(direction) = AxisDirection::parse(&orientation) else {
            return Err(decoder.error(
                "COORD_AXIS_ORIENTATION",
                format!("unknown axis orientation \"{orientation}\""),
            ));
        };
        let abbreviation = decoder.required_string("COORD_AXIS_ABBREVIATION")?;
        let unit = self.unit_by_key(&decoder.required_code("UOM_CODE")?)?;
        let identity = self.axis_name(&decoder.required_code("COORD_AXIS_NAME_CODE")?)?;
        Ok(CoordinateSystemAxis {
            properties: self.properties(spec.table, key, identity)?,
            abbreviation,
            direction,
            unit,
        })
    }

    /// Returns the name and remarks registered under axis name code `code`.
    fn axis_name(&mut self, code: &str) -> Result<Identity, FactoryError> {
        let spec = &queries::AXIS_NAME;
        let rows = self.fetch(spec, &[bind(code)], ObjectType::CoordinateSystemAxis, code)?;
        let (name, remarks) =
            self.singleton(ObjectType::CoordinateSystemAxis, code, &rows, |_, row| {
                let decoder =
                    RowDecoder::new(row, spec.columns, ObjectType::CoordinateSystemAxis, code);
                Ok((
                    decoder.required_string("COORD_AXIS_NAME")?,
                    match decoder.optional_string("REMARKS")? {
                        Some(remarks) => Some(remarks),
                        None => decoder.optional_string("DESCRIPTION")?,
                    },
                ))
            })?;
        Ok(Identity::named(name).with_remarks(remarks))
    }

    /// Returns the coordinate system at primary key `key`.
    pub(super) fn coordinate_system_by_key(
        &mut self,
        key: &str,
    ) -> Result<Arc<CoordinateSystem>, FactoryError> {
        self.pooled_or_build(
            &queries::COORDINATE_SYSTEM,
            ObjectType::CoordinateSystem,
            key,
            |session, row| session.coordinate_system_from_row(key, row),
        )
    }

    /// Decodes one coordinate system row.
    fn coordinate_system_from_row(
        &mut self,
        key: &str,
        row: &Row,
    ) -> Result<CoordinateSystem, FactoryError> {
        let spec = &queries::COORDINATE_SYSTEM;
        let decoder = RowDecoder::new(row, spec.columns, ObjectType::CoordinateSystem, key);
        let type_text = decoder.required_string("COORD_SYS_TYPE")?;
        let Some(kind) = CsKind::parse(&type_text) else {
            return Err(decoder.error(
                "COORD_SYS_TYPE",
                format!("unknown coordinate system type \"{type_text}\""),
            ));
        };
        let declared = decoder.required_i64("DIMENSION")?;
        let dimension = usize::try_from(declared)
            .ok()
            .filter(|dimension| kind.accepts_dimension(*dimension))
            .ok_or_else(|| {
                decoder.error("DIMENSION", format!("{declared} is not valid for {type_text}"))
            })?;
        let identity = Identity::named(decoder.required_string("COORD_SYS_NAME")?)
            .with_remarks(decoder.optional_string("REMARKS")?);
        let axis_rows =
            self.fetch(&queries::AXES_OF_CS, &[bind(key)], ObjectType::CoordinateSystem, key)?;
        if axis_rows.len() != dimension {
            return Err(decoder.error(
                "DIMENSION",
                format!("declares {dimension} axes but {} are recorded", axis_rows.len()),
            ));
        }
        let mut axes = Vec::with_capacity(dimension);
        for row in &axis_rows {
            let axis_decoder =
                RowDecoder::new(row, queries::AXES_OF_CS.columns, ObjectType::CoordinateSystem, key);
            axes.push(self.axis_by_key(&axis_decoder.required_code("COORD_AXIS_CODE")?)?);
        }
        Ok(CoordinateSystem {
            properties: self.properties(spec.table, key, identity)?,
            kind,
            axes,
        })
    }
}

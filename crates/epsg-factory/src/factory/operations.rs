// crates/epsg-factory/src/factory/operations.rs
// ============================================================================
// Module: Operation Constructors
// Description: Operation methods, parameters, and coordinate operations.
// Purpose: Read operation rows and hand them to the operation assembler.
// Dependencies: epsg-core
// ============================================================================

//! ## Overview
//! Conversions and transformations read their method and parameter values;
//! each value row holds exactly one of a number or a file reference. Values
//! follow the method's parameter order, with parameters the method does not
//! list appended last.
//!
//! Concatenated operations read their steps from the path table. A guard set
//! rejects a concatenation that reaches itself through its steps.
//!
//! Defining conversions of projected CRSs are built against their base CRS
//! and carry the base ellipsoid's semi-axes; they are not pooled by code since
//! the same code looked up directly has no source CRS.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use epsg_core::CoordinateOperation;
use epsg_core::CoordinateReferenceSystem;
use epsg_core::FactoryError;
use epsg_core::ObjectType;
use epsg_core::OperationKind;
use epsg_core::OperationMethod;
use epsg_core::ParameterDescriptor;
use epsg_core::ParameterValue;
use epsg_core::ParameterValueGroup;
use epsg_core::ParameterValueKind;
use epsg_core::PositionalAccuracy;
use epsg_core::Row;
use epsg_core::SingleOperationRequest;

use super::Session;
use super::bind;
use super::properties::Identity;
use crate::decoder::RowDecoder;
use crate::queries;
use crate::tables;
use crate::tables::OperationDiscriminator;

// ============================================================================
// SECTION: Methods and Parameters
// ============================================================================

impl Session<'_> {
    /// Returns the operation method at primary key `key`.
    pub(super) fn method_by_key(&mut self, key: &str) -> Result<Arc<OperationMethod>, FactoryError> {
        let spec = &queries::METHOD;
        self.pooled_or_build(spec, ObjectType::OperationMethod, key, |session, row| {
            let decoder = RowDecoder::new(row, spec.columns, ObjectType::OperationMethod, key);
            let identity = Identity::named(decoder.required_string("COORD_OP_METHOD_NAME")?)
                .with_remarks(decoder.optional_string("REMARKS")?);
            let formula = decoder.optional_string("FORMULA")?;
            let usage = session.fetch(
                &queries::PARAMETER_USAGE,
                &[bind(key)],
                ObjectType::OperationMethod,
                key,
            )?;
            let mut parameters = Vec::with_capacity(usage.len());
            for row in &usage {
                let usage_decoder = RowDecoder::new(
                    row,
                    queries::PARAMETER_USAGE.columns,
                    ObjectType::OperationMethod,
                    key,
                );
                parameters
                    .push(session.parameter_by_key(&usage_decoder.required_code("PARAMETER_CODE")?)?);
            }
            Ok(OperationMethod {
                properties: session.properties(spec.table, key, identity)?,
                formula,
                parameters,
            })
        })
    }

    /// Returns the parameter descriptor at primary key `key`.
    pub(super) fn parameter_by_key(
        &mut self,
        key: &str,
    ) -> Result<Arc<ParameterDescriptor>, FactoryError> {
        let spec = &queries::PARAMETER;
        self.pooled_or_build(spec, ObjectType::ParameterDescriptor, key, |session, row| {
            let decoder = RowDecoder::new(row, spec.columns, ObjectType::ParameterDescriptor, key);
            let identity = Identity::named(decoder.required_string("PARAMETER_NAME")?);
            Ok(ParameterDescriptor {
                properties: session.properties(spec.table, key, identity)?,
                description: decoder.optional_string("DESCRIPTION")?,
            })
        })
    }

    /// Reads the parameter values of operation `key` for `method`.
    fn parameter_values(
        &mut self,
        key: &str,
        method: &OperationMethod,
        method_code: &str,
    ) -> Result<ParameterValueGroup, FactoryError> {
        let spec = &queries::PARAMETER_VALUES;
        let rows = self.fetch(
            spec,
            &[bind(key), bind(method_code)],
            ObjectType::CoordinateOperation,
            key,
        )?;
        let mut values = Vec::with_capacity(rows.len());
        for row in &rows {
            let decoder = RowDecoder::new(row, spec.columns, ObjectType::CoordinateOperation, key);
            let parameter_code = decoder.required_code("PARAMETER_CODE")?;
            let descriptor = self.parameter_by_key(&parameter_code)?;
            let number = decoder.optional_f64("PARAMETER_VALUE")?;
            let file = decoder.optional_string("PARAM_VALUE_FILE_REF")?;
            let value = match (number, file) {
                (Some(value), None) => {
                    let unit = match decoder.optional_code("UOM_CODE")? {
                        Some(unit) => Some(self.unit_by_key(&unit)?),
                        None => None,
                    };
                    ParameterValueKind::Numeric {
                        value,
                        unit,
                    }
                }
                (None, Some(path)) => ParameterValueKind::FileRef {
                    path,
                },
                (Some(_), Some(_)) => {
                    return Err(decoder.error(
                        "PARAMETER_VALUE",
                        format!("parameter {parameter_code} holds both a value and a file"),
                    ));
                }
                (None, None) => {
                    return Err(decoder.error(
                        "PARAMETER_VALUE",
                        format!("parameter {parameter_code} holds neither a value nor a file"),
                    ));
                }
            };
            values.push(ParameterValue {
                code: Some(parameter_code),
                name: descriptor.properties.name.clone(),
                value,
            });
        }
        values.sort_by_key(|value| {
            method
                .parameters
                .iter()
                .position(|descriptor| descriptor.properties.code() == value.code.as_deref())
                .unwrap_or(usize::MAX)
        });
        Ok(ParameterValueGroup::new(values))
    }
}

// ============================================================================
// SECTION: Operations
// ============================================================================

impl Session<'_> {
    /// Returns the coordinate operation at primary key `key`.
    pub(super) fn operation_by_key(
        &mut self,
        key: &str,
    ) -> Result<Arc<CoordinateOperation>, FactoryError> {
        if let Some(operation) = self.pooled::<CoordinateOperation>(key) {
            return Ok(operation);
        }
        if !self.state.operation_guard.insert(key.to_string()) {
            return Err(FactoryError::malformed(
                ObjectType::ConcatenatedOperation,
                key,
                "operation path contains the operation itself",
            ));
        }
        let result = self.read_operation(key, None);
        self.state.operation_guard.remove(key);
        Ok(self.remember(key, result?))
    }

    /// Returns the defining conversion `key` of a CRS projected from `base`.
    pub(super) fn defining_conversion(
        &mut self,
        key: &str,
        base: &Arc<CoordinateReferenceSystem>,
    ) -> Result<Arc<CoordinateOperation>, FactoryError> {
        self.read_operation(key, Some(base))
    }

    /// Queries and builds operation `key`, optionally as a defining conversion.
    fn read_operation(
        &mut self,
        key: &str,
        base: Option<&Arc<CoordinateReferenceSystem>>,
    ) -> Result<Arc<CoordinateOperation>, FactoryError> {
        let rows =
            self.fetch(&queries::OPERATION, &[bind(key)], ObjectType::CoordinateOperation, key)?;
        self.singleton(ObjectType::CoordinateOperation, key, &rows, |session, row| {
            session.operation_from_row(key, row, base)
        })
    }

    /// Decodes one operation row.
    fn operation_from_row(
        &mut self,
        key: &str,
        row: &Row,
        base: Option<&Arc<CoordinateReferenceSystem>>,
    ) -> Result<Arc<CoordinateOperation>, FactoryError> {
        let spec = &queries::OPERATION;
        let decoder = RowDecoder::new(row, spec.columns, ObjectType::CoordinateOperation, key);
        let type_text = decoder.required_string("COORD_OP_TYPE")?;
        let Some(discriminator) = OperationDiscriminator::parse(&type_text) else {
            return Err(
                decoder.error("COORD_OP_TYPE", format!("unknown operation type \"{type_text}\""))
            );
        };
        if base.is_some() && discriminator != OperationDiscriminator::Conversion {
            return Err(decoder.error("COORD_OP_TYPE", "projection must be a conversion"));
        }
        let identity = Identity {
            name: decoder.required_string("COORD_OP_NAME")?,
            remarks: decoder.optional_string("REMARKS")?,
            area_code: decoder.optional_code("AREA_OF_USE_CODE")?,
            scope: decoder.optional_string("COORD_OP_SCOPE")?,
        };
        let positional_accuracy = decoder
            .optional_f64("COORD_OP_ACCURACY")?
            .map(|metres| PositionalAccuracy {
                metres,
            })
            .into_iter()
            .collect::<Vec<_>>();
        let properties = self.properties(spec.table, key, identity)?;
        if discriminator == OperationDiscriminator::Concatenated {
            let path = self.fetch(
                &queries::OPERATION_PATH,
                &[bind(key)],
                ObjectType::ConcatenatedOperation,
                key,
            )?;
            let mut steps = Vec::with_capacity(path.len());
            for row in &path {
                let step_decoder = RowDecoder::new(
                    row,
                    queries::OPERATION_PATH.columns,
                    ObjectType::ConcatenatedOperation,
                    key,
                );
                let step = step_decoder.required_code("SINGLE_OPERATION_CODE")?;
                steps.push(self.operation_by_key(&step)?);
            }
            let accuracy = (!positional_accuracy.is_empty()).then_some(positional_accuracy);
            return Ok(self.assembler.create_concatenated_operation(
                Some(properties),
                &steps,
                accuracy,
            )?);
        }
        let kind = if discriminator == OperationDiscriminator::Conversion {
            OperationKind::Conversion
        } else {
            OperationKind::Transformation
        };
        let method_code = decoder.required_code("COORD_OP_METHOD_CODE")?;
        let method = self.method_by_key(&method_code)?;
        let parameters = self.parameter_values(key, &method, &method_code)?;
        let (source_crs, target_crs) = match base {
            Some(base) => (Some(Arc::clone(base)), None),
            None => (
                self.optional_crs(&decoder, "SOURCE_CRS_CODE")?,
                self.optional_crs(&decoder, "TARGET_CRS_CODE")?,
            ),
        };
        let mut request = SingleOperationRequest::new(properties, kind, method);
        if matches!(request.kind, OperationKind::Conversion) {
            request.ellipsoid = source_crs
                .as_ref()
                .and_then(|crs| crs.datum())
                .and_then(|datum| datum.ellipsoid())
                .cloned();
        }
        request.source_crs = source_crs;
        request.target_crs = target_crs;
        request.parameters = parameters;
        request.operation_version = decoder.optional_string("COORD_TFM_VERSION")?;
        request.positional_accuracy = positional_accuracy;
        Ok(self.assembler.create_single_operation(request)?)
    }

    /// Resolves the CRS referenced by `column`, when present.
    fn optional_crs(
        &mut self,
        decoder: &RowDecoder<'_>,
        column: &str,
    ) -> Result<Option<Arc<CoordinateReferenceSystem>>, FactoryError> {
        match decoder.optional_code(column)? {
            Some(code) => Ok(Some(self.crs_by_key(&code)?)),
            None => Ok(None),
        }
    }

    /// Returns the operations recorded from CRS `source` to CRS `target`.
    pub(super) fn operations_between(
        &mut self,
        source: &str,
        target: &str,
    ) -> Result<Vec<Arc<CoordinateOperation>>, FactoryError> {
        let source_key = self.resolve(tables::CRS_TABLE, source)?;
        let target_key = self.resolve(tables::CRS_TABLE, target)?;
        self.crs_by_key(&source_key)?;
        self.crs_by_key(&target_key)?;
        let rows = self.fetch(
            &queries::OPERATIONS_BETWEEN,
            &[bind(&source_key), bind(&target_key)],
            ObjectType::CoordinateOperation,
            &source_key,
        )?;
        let mut codes: Vec<String> = Vec::with_capacity(rows.len());
        for row in &rows {
            let code = RowDecoder::new(
                row,
                queries::OPERATIONS_BETWEEN.columns,
                ObjectType::CoordinateOperation,
                &source_key,
            )
            .required_code("COORD_OP_CODE")?;
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
        codes.iter().map(|code| self.operation_by_key(code)).collect()
    }
}

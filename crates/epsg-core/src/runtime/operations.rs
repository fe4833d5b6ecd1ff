// crates/epsg-core/src/runtime/operations.rs
// ============================================================================
// Module: Operation Assembler
// Description: Single, concatenated, and pass-through operation construction.
// Purpose: Validate and compose coordinate operations into shared instances.
// Dependencies: crate::core, crate::interfaces, crate::runtime::pool, parking_lot
// ============================================================================

//! ## Overview
//! The [`OperationAssembler`] builds every coordinate operation handed out by
//! the factory. It derives transforms through a [`MathTransformFactory`],
//! flattens nested concatenations, checks dimension continuity, and passes
//! each result through a [`CanonicalPool`] so that equal operations share one
//! instance.
//!
//! Dimension continuity is checked between adjacent elements of the list the
//! caller supplied. The steps inside a nested concatenation were validated
//! when that concatenation was built and are not re-checked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::crs::CoordinateReferenceSystem;
use crate::core::datum::Ellipsoid;
use crate::core::error::OperationError;
use crate::core::operation::CoordinateOperation;
use crate::core::operation::OperationKind;
use crate::core::operation::OperationMethod;
use crate::core::operation::ParameterValue;
use crate::core::operation::ParameterValueGroup;
use crate::core::operation::PositionalAccuracy;
use crate::core::properties::Properties;
use crate::core::units::base_unit;
use crate::interfaces::MathTransform;
use crate::interfaces::MathTransformFactory;
use crate::runtime::pool::CanonicalPool;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name given to concatenations built without explicit properties.
pub const DEFAULT_CONCATENATED_NAME: &str = "Concatenated operation";

/// Implicit projection parameter holding the ellipsoid semi-major axis.
pub const SEMI_MAJOR_PARAMETER: &str = "semi_major";

/// Implicit projection parameter holding the ellipsoid semi-minor axis.
pub const SEMI_MINOR_PARAMETER: &str = "semi_minor";

/// Dimension assumed for defining conversions without source or target CRS.
const DEFAULT_DIMENSION: usize = 2;

/// Metre.
const UOM_METRE: i64 = 9001;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Inputs of a single operation.
#[derive(Debug, Clone)]
pub struct SingleOperationRequest {
    /// Identification properties.
    pub properties: Properties,
    /// Conversion, transformation, or unspecified single operation.
    pub kind: OperationKind,
    /// Source CRS; absent for defining conversions.
    pub source_crs: Option<Arc<CoordinateReferenceSystem>>,
    /// Target CRS; absent for defining conversions.
    pub target_crs: Option<Arc<CoordinateReferenceSystem>>,
    /// Operation method.
    pub method: Arc<OperationMethod>,
    /// Explicit parameter values in method order.
    pub parameters: ParameterValueGroup,
    /// Operation version text.
    pub operation_version: Option<String>,
    /// Declared positional accuracies.
    pub positional_accuracy: Vec<PositionalAccuracy>,
    /// Ellipsoid whose semi-axes are prepended as implicit parameters.
    pub ellipsoid: Option<Arc<Ellipsoid>>,
    /// Precomputed transform; derived from the method when absent.
    pub transform: Option<Arc<dyn MathTransform>>,
}

impl SingleOperationRequest {
    /// Creates a request with no CRSs, parameters, or accuracy.
    #[must_use]
    pub const fn new(
        properties: Properties,
        kind: OperationKind,
        method: Arc<OperationMethod>,
    ) -> Self {
        Self {
            properties,
            kind,
            source_crs: None,
            target_crs: None,
            method,
            parameters: ParameterValueGroup::new(Vec::new()),
            operation_version: None,
            positional_accuracy: Vec::new(),
            ellipsoid: None,
            transform: None,
        }
    }
}

// ============================================================================
// SECTION: Assembler
// ============================================================================

/// Builds, validates, and canonicalizes coordinate operations.
pub struct OperationAssembler {
    /// Math transform factory.
    transforms: Arc<dyn MathTransformFactory>,
    /// Canonical instances of previously built operations.
    pool: Mutex<CanonicalPool<CoordinateOperation>>,
}

impl std::fmt::Debug for OperationAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationAssembler").finish_non_exhaustive()
    }
}

impl OperationAssembler {
    /// Creates an assembler over a math transform factory.
    #[must_use]
    pub fn new(transforms: Arc<dyn MathTransformFactory>) -> Self {
        Self {
            transforms,
            pool: Mutex::new(CanonicalPool::new()),
        }
    }

    /// Returns the math transform factory.
    #[must_use]
    pub fn transforms(&self) -> &Arc<dyn MathTransformFactory> {
        &self.transforms
    }

    /// Builds a single operation.
    ///
    /// When `request.ellipsoid` is set, its semi-axes (in metres) are
    /// prepended to the parameters unless already present.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidOperation`] for non-single kinds and
    /// [`OperationError::Transform`] when no transform can be derived.
    pub fn create_single_operation(
        &self,
        request: SingleOperationRequest,
    ) -> Result<Arc<CoordinateOperation>, OperationError> {
        if !matches!(
            request.kind,
            OperationKind::Conversion | OperationKind::Transformation | OperationKind::Operation
        ) {
            return Err(OperationError::InvalidOperation(
                "single operations must be conversions or transformations".to_string(),
            ));
        }
        let parameters = match &request.ellipsoid {
            Some(ellipsoid) => with_ellipsoid_axes(request.parameters, ellipsoid)?,
            None => request.parameters,
        };
        let source_dimensions =
            request.source_crs.as_ref().map_or(DEFAULT_DIMENSION, |crs| crs.dimension());
        let target_dimensions =
            request.target_crs.as_ref().map_or(source_dimensions, |crs| crs.dimension());
        let transform = match request.transform {
            Some(transform) => transform,
            None => self.transforms.create_parameterized(
                &request.method,
                &parameters,
                source_dimensions,
                target_dimensions,
            )?,
        };
        Ok(self.canonicalize(Arc::new(CoordinateOperation {
            properties: request.properties,
            kind: request.kind,
            source_crs: request.source_crs,
            target_crs: request.target_crs,
            method: Some(request.method),
            parameters,
            operation_version: request.operation_version,
            positional_accuracy: request.positional_accuracy,
            transform,
        })))
    }

    /// Builds a concatenated operation from an ordered list.
    ///
    /// Nested concatenations are flattened in place. Identity steps stay in
    /// the step list but are left out of the composed transform. Accuracy
    /// defaults to the deduplicated union of the steps' accuracies.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::MissingParameter`] when fewer than two steps
    /// remain after flattening and [`OperationError::MismatchedDimension`]
    /// when adjacent list elements disagree on CRS dimension.
    pub fn create_concatenated_operation(
        &self,
        properties: Option<Properties>,
        operations: &[Arc<CoordinateOperation>],
        positional_accuracy: Option<Vec<PositionalAccuracy>>,
    ) -> Result<Arc<CoordinateOperation>, OperationError> {
        if operations.is_empty() {
            return Err(OperationError::MissingParameter("operations[0]".to_string()));
        }
        check_continuity(operations)?;
        let mut steps = Vec::with_capacity(operations.len());
        expand(operations, &mut steps);
        if steps.len() < 2 {
            return Err(OperationError::MissingParameter("operations[1]".to_string()));
        }
        let transform = self.compose(&steps)?;
        let accuracy = positional_accuracy.unwrap_or_else(|| union_accuracy(&steps));
        let source_crs = steps.first().and_then(|step| step.source_crs.clone());
        let target_crs = steps.last().and_then(|step| step.target_crs.clone());
        Ok(self.canonicalize(Arc::new(CoordinateOperation {
            properties: properties.unwrap_or_else(|| Properties::named(DEFAULT_CONCATENATED_NAME)),
            kind: OperationKind::Concatenated {
                operations: steps,
            },
            source_crs,
            target_crs,
            method: None,
            parameters: ParameterValueGroup::default(),
            operation_version: None,
            positional_accuracy: accuracy,
            transform,
        })))
    }

    /// Concatenates two optional operations.
    ///
    /// An absent or identity operand is skipped and the other operand is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] when the concatenation is invalid.
    pub fn concatenate(
        &self,
        first: Option<Arc<CoordinateOperation>>,
        second: Option<Arc<CoordinateOperation>>,
    ) -> Result<Option<Arc<CoordinateOperation>>, OperationError> {
        let (first, second) = match (first, second) {
            (None, other) | (other, None) => return Ok(other),
            (Some(first), Some(second)) => (first, second),
        };
        if first.is_identity() {
            return Ok(Some(second));
        }
        if second.is_identity() {
            return Ok(Some(first));
        }
        self.create_concatenated_operation(None, &[first, second], None).map(Some)
    }

    /// Concatenates three optional operations.
    ///
    /// Absent or identity operands are skipped; two remaining operands are
    /// handled by [`OperationAssembler::concatenate`].
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] when the concatenation is invalid.
    pub fn concatenate3(
        &self,
        first: Option<Arc<CoordinateOperation>>,
        second: Option<Arc<CoordinateOperation>>,
        third: Option<Arc<CoordinateOperation>>,
    ) -> Result<Option<Arc<CoordinateOperation>>, OperationError> {
        let skippable = |operation: &Option<Arc<CoordinateOperation>>| {
            operation.as_ref().is_none_or(|operation| operation.is_identity())
        };
        if skippable(&first) {
            return self.concatenate(second, third);
        }
        if skippable(&second) {
            return self.concatenate(first, third);
        }
        if skippable(&third) {
            return self.concatenate(first, second);
        }
        let operations = [first, second, third].into_iter().flatten().collect::<Vec<_>>();
        self.create_concatenated_operation(None, &operations, None).map(Some)
    }

    /// Wraps a single operation so it only affects a contiguous ordinate range.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidOperation`] when `operation` is a
    /// concatenation and [`OperationError::MismatchedDimension`] when the
    /// sub-range does not fit the source or target CRS.
    pub fn create_pass_through_operation(
        &self,
        properties: Properties,
        source_crs: Arc<CoordinateReferenceSystem>,
        target_crs: Arc<CoordinateReferenceSystem>,
        operation: Arc<CoordinateOperation>,
        first_affected_ordinate: usize,
        num_trailing_ordinates: usize,
    ) -> Result<Arc<CoordinateOperation>, OperationError> {
        if !operation.is_single() {
            return Err(OperationError::InvalidOperation(
                "pass-through operations wrap a single operation".to_string(),
            ));
        }
        let sub_source = operation.transform.source_dimensions();
        let sub_target = operation.transform.target_dimensions();
        let outer = first_affected_ordinate + num_trailing_ordinates;
        check_dimension("source_crs", outer + sub_source, source_crs.dimension())?;
        check_dimension("target_crs", outer + sub_target, target_crs.dimension())?;
        if let Some(inner) = &operation.source_crs {
            check_dimension("operation.source_crs", sub_source, inner.dimension())?;
        }
        if let Some(inner) = &operation.target_crs {
            check_dimension("operation.target_crs", sub_target, inner.dimension())?;
        }
        let transform = self.transforms.create_pass_through(
            first_affected_ordinate,
            Arc::clone(&operation.transform),
            num_trailing_ordinates,
        )?;
        Ok(self.canonicalize(Arc::new(CoordinateOperation {
            properties,
            method: operation.method.clone(),
            parameters: operation.parameters.clone(),
            operation_version: operation.operation_version.clone(),
            positional_accuracy: operation.positional_accuracy.clone(),
            kind: OperationKind::PassThrough {
                operation,
                first_affected_ordinate,
                num_trailing_ordinates,
            },
            source_crs: Some(source_crs),
            target_crs: Some(target_crs),
            transform,
        })))
    }

    /// Returns the pooled instance equal to `operation`.
    pub fn canonicalize(&self, operation: Arc<CoordinateOperation>) -> Arc<CoordinateOperation> {
        let fingerprint = operation.fingerprint();
        self.pool.lock().canonicalize(fingerprint, operation)
    }

    /// Composes the transforms of `steps`, skipping identities.
    fn compose(
        &self,
        steps: &[Arc<CoordinateOperation>],
    ) -> Result<Arc<dyn MathTransform>, OperationError> {
        let mut composed: Option<Arc<dyn MathTransform>> = None;
        for step in steps.iter().filter(|step| !step.is_identity()) {
            let next = Arc::clone(&step.transform);
            composed = Some(match composed {
                Some(previous) => self.transforms.create_concatenated(previous, next)?,
                None => next,
            });
        }
        Ok(composed.unwrap_or_else(|| {
            let dimension = steps.first().map_or(0, |step| step.transform.source_dimensions());
            self.transforms.create_identity(dimension)
        }))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Appends single operations, recursively expanding concatenations.
fn expand(operations: &[Arc<CoordinateOperation>], steps: &mut Vec<Arc<CoordinateOperation>>) {
    for operation in operations {
        match &operation.kind {
            OperationKind::Concatenated {
                operations,
            } => expand(operations, steps),
            _ => steps.push(Arc::clone(operation)),
        }
    }
}

/// Checks CRS dimensions between adjacent elements of the supplied list.
fn check_continuity(operations: &[Arc<CoordinateOperation>]) -> Result<(), OperationError> {
    for (index, pair) in operations.windows(2).enumerate() {
        if let [previous, next] = pair
            && let (Some(target), Some(source)) = (&previous.target_crs, &next.source_crs)
        {
            check_dimension(
                &format!("operations[{}]", index + 1),
                target.dimension(),
                source.dimension(),
            )?;
        }
    }
    Ok(())
}

/// Fails with a mismatched-dimension error unless the dimensions agree.
fn check_dimension(context: &str, expected: usize, actual: usize) -> Result<(), OperationError> {
    if expected == actual {
        return Ok(());
    }
    Err(OperationError::MismatchedDimension {
        context: context.to_string(),
        expected,
        actual,
    })
}

/// Returns the deduplicated union of step accuracies in step order.
fn union_accuracy(steps: &[Arc<CoordinateOperation>]) -> Vec<PositionalAccuracy> {
    let mut union: Vec<PositionalAccuracy> = Vec::new();
    for accuracy in steps.iter().flat_map(|step| step.positional_accuracy.iter()) {
        if !union.contains(accuracy) {
            union.push(*accuracy);
        }
    }
    union
}

/// Prepends the ellipsoid semi-axes (metres) to `parameters`.
fn with_ellipsoid_axes(
    parameters: ParameterValueGroup,
    ellipsoid: &Ellipsoid,
) -> Result<ParameterValueGroup, OperationError> {
    let metre = Arc::new(
        base_unit(UOM_METRE).ok_or_else(|| OperationError::MissingParameter("metre".to_string()))?,
    );
    let mut values = Vec::with_capacity(parameters.values.len() + 2);
    for (name, value) in [
        (SEMI_MAJOR_PARAMETER, ellipsoid.semi_major_axis_metres()),
        (SEMI_MINOR_PARAMETER, ellipsoid.semi_minor_axis_metres()),
    ] {
        if parameters.by_name(name).is_none() {
            values.push(ParameterValue::numeric(None, name, value, Some(Arc::clone(&metre))));
        }
    }
    values.extend(parameters.values);
    Ok(ParameterValueGroup::new(values))
}

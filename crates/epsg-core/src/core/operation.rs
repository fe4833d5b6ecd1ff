// crates/epsg-core/src/core/operation.rs
// ============================================================================
// Module: Coordinate Operations
// Description: Operation methods, parameters, and coordinate operations.
// Purpose: Describe mappings between CRSs backed by math transforms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`CoordinateOperation`] maps positions from a source CRS to a target CRS
//! through a [`MathTransform`]. Single operations (conversions,
//! transformations, pass-through operations) may name an [`OperationMethod`]
//! and its parameter values; concatenated operations own their flattened
//! steps. Equality compares transforms through their WKT form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;
use serde::Serializer;

use crate::core::crs::CoordinateReferenceSystem;
use crate::core::properties::Properties;
use crate::core::units::Unit;
use crate::interfaces::MathTransform;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Descriptor of an operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    /// Identification properties.
    pub properties: Properties,
    /// Free-text description of the parameter.
    pub description: Option<String>,
}

/// Value held by a parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterValueKind {
    /// Numeric value with an optional unit.
    Numeric {
        /// Value in `unit`.
        value: f64,
        /// Unit of the value, absent for unitless values.
        unit: Option<Arc<Unit>>,
    },
    /// Reference to a grid or data file.
    FileRef {
        /// File name as stored in the dataset.
        path: String,
    },
}

/// Named parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterValue {
    /// Parameter code within the authority, when known.
    pub code: Option<String>,
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: ParameterValueKind,
}

impl ParameterValue {
    /// Creates a numeric parameter value.
    #[must_use]
    pub fn numeric(
        code: Option<&str>,
        name: impl Into<String>,
        value: f64,
        unit: Option<Arc<Unit>>,
    ) -> Self {
        Self {
            code: code.map(str::to_string),
            name: name.into(),
            value: ParameterValueKind::Numeric {
                value,
                unit,
            },
        }
    }

    /// Returns the numeric value converted to `target`.
    ///
    /// Unitless values are returned unchanged; values whose unit measures a
    /// different quantity than `target` yield `None`.
    #[must_use]
    pub fn value_in(&self, target: &Unit) -> Option<f64> {
        match &self.value {
            ParameterValueKind::Numeric {
                value,
                unit: Some(unit),
            } => unit.convert_to(*value, target),
            ParameterValueKind::Numeric {
                value,
                unit: None,
            } => Some(*value),
            ParameterValueKind::FileRef {
                ..
            } => None,
        }
    }
}

/// Ordered group of parameter values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterValueGroup {
    /// Values in method sort order.
    pub values: Vec<ParameterValue>,
}

impl ParameterValueGroup {
    /// Creates a group from ordered values.
    #[must_use]
    pub const fn new(values: Vec<ParameterValue>) -> Self {
        Self {
            values,
        }
    }

    /// Returns the value registered under parameter `code`.
    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&ParameterValue> {
        self.values.iter().find(|value| value.code.as_deref() == Some(code))
    }

    /// Returns the value registered under `name`, case-insensitively.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ParameterValue> {
        self.values.iter().find(|value| value.name.eq_ignore_ascii_case(name))
    }

    /// Returns `true` when the group holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ============================================================================
// SECTION: Operation Method
// ============================================================================

/// Named algorithm and its declared parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationMethod {
    /// Identification properties.
    pub properties: Properties,
    /// Formula or reference text.
    pub formula: Option<String>,
    /// Declared parameters in sort order.
    pub parameters: Vec<Arc<ParameterDescriptor>>,
}

// ============================================================================
// SECTION: Coordinate Operation
// ============================================================================

/// Positional accuracy of an operation, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionalAccuracy {
    /// Accuracy in metres.
    pub metres: f64,
}

/// Operation variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationKind {
    /// Conversion (parameters defined by convention, no datum change).
    Conversion,
    /// Transformation (empirically derived parameters).
    Transformation,
    /// Single operation of unspecified nature.
    Operation,
    /// Operation applied to a contiguous sub-range of ordinates.
    PassThrough {
        /// Inner operation.
        operation: Arc<CoordinateOperation>,
        /// Index of the first affected ordinate.
        first_affected_ordinate: usize,
        /// Number of unaffected ordinates after the sub-range.
        num_trailing_ordinates: usize,
    },
    /// Ordered chain of single operations.
    Concatenated {
        /// Flattened single-operation steps.
        operations: Vec<Arc<CoordinateOperation>>,
    },
}

/// Coordinate operation between two CRSs.
#[derive(Debug, Clone, Serialize)]
pub struct CoordinateOperation {
    /// Identification properties.
    pub properties: Properties,
    /// Operation variant.
    pub kind: OperationKind,
    /// Source CRS; absent for defining conversions.
    pub source_crs: Option<Arc<CoordinateReferenceSystem>>,
    /// Target CRS; absent for defining conversions.
    pub target_crs: Option<Arc<CoordinateReferenceSystem>>,
    /// Operation method of single operations.
    pub method: Option<Arc<OperationMethod>>,
    /// Parameter values of single operations.
    pub parameters: ParameterValueGroup,
    /// Operation version text.
    pub operation_version: Option<String>,
    /// Declared positional accuracies.
    pub positional_accuracy: Vec<PositionalAccuracy>,
    /// Transform from source to target ordinates.
    #[serde(serialize_with = "serialize_transform")]
    pub transform: Arc<dyn MathTransform>,
}

impl CoordinateOperation {
    /// Returns `true` for every variant except concatenated operations.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        !matches!(self.kind, OperationKind::Concatenated { .. })
    }

    /// Returns `true` when the transform is the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.transform.is_identity()
    }

    /// Returns the flattened steps of a concatenated operation.
    #[must_use]
    pub fn steps(&self) -> &[Arc<Self>] {
        match &self.kind {
            OperationKind::Concatenated {
                operations,
            } => operations,
            _ => &[],
        }
    }

    /// Returns the authority code text, if identified.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.properties.code()
    }

    /// Returns a key grouping structurally similar operations.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let crs_code = |crs: Option<&Arc<CoordinateReferenceSystem>>| {
            crs.map_or_else(String::new, |crs| {
                crs.code().map_or_else(|| crs.properties.name.clone(), str::to_string)
            })
        };
        format!(
            "{}|{}|{}|{}",
            self.properties.name,
            crs_code(self.source_crs.as_ref()),
            crs_code(self.target_crs.as_ref()),
            self.transform.to_wkt()
        )
    }
}

impl PartialEq for CoordinateOperation {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
            && self.kind == other.kind
            && self.source_crs == other.source_crs
            && self.target_crs == other.target_crs
            && self.method == other.method
            && self.parameters == other.parameters
            && self.operation_version == other.operation_version
            && self.positional_accuracy == other.positional_accuracy
            && self.transform.to_wkt() == other.transform.to_wkt()
    }
}

/// Serializes a math transform as its WKT text.
fn serialize_transform<S>(transform: &Arc<dyn MathTransform>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&transform.to_wkt())
}

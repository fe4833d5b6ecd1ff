// crates/epsg-core/tests/common/mod.rs
// ============================================================================
// Module: Operation Test Builders
// Description: Shared CRS and operation builders for assembler tests.
// Purpose: Keep integration tests focused on assembly behavior.
// ============================================================================

//! Shared builders for operation assembler tests.

#![allow(dead_code, reason = "Each test binary uses a subset of the builders.")]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only helpers are permitted.")]

use std::sync::Arc;

use epsg_core::AuthorityCode;
use epsg_core::AxisDirection;
use epsg_core::CoordinateOperation;
use epsg_core::CoordinateReferenceSystem;
use epsg_core::CoordinateSystem;
use epsg_core::CoordinateSystemAxis;
use epsg_core::CrsKind;
use epsg_core::CsKind;
use epsg_core::Datum;
use epsg_core::DatumKind;
use epsg_core::DefaultMathTransformFactory;
use epsg_core::MathTransformFactory;
use epsg_core::Matrix;
use epsg_core::OperationAssembler;
use epsg_core::OperationKind;
use epsg_core::OperationMethod;
use epsg_core::PositionalAccuracy;
use epsg_core::Properties;
use epsg_core::SingleOperationRequest;
use epsg_core::base_unit;

/// Creates an assembler over the default transform factory.
pub fn assembler() -> OperationAssembler {
    OperationAssembler::new(Arc::new(DefaultMathTransformFactory::new()))
}

/// Creates an engineering CRS with `dimension` Cartesian axes.
pub fn crs(code: &str, dimension: usize) -> Arc<CoordinateReferenceSystem> {
    let metre = Arc::new(base_unit(9001).unwrap());
    let axes = (0 .. dimension)
        .map(|index| {
            Arc::new(CoordinateSystemAxis {
                properties: Properties::named(format!("axis {index}")),
                abbreviation: format!("A{index}"),
                direction: AxisDirection::Other,
                unit: Arc::clone(&metre),
            })
        })
        .collect();
    let datum = Arc::new(Datum {
        properties: Properties::named(format!("datum {code}")),
        anchor: None,
        realization_epoch: None,
        kind: DatumKind::Engineering,
    });
    let cs = Arc::new(CoordinateSystem {
        properties: Properties::named(format!("cs {dimension}D")),
        kind: CsKind::Cartesian,
        axes,
    });
    Arc::new(CoordinateReferenceSystem {
        properties: Properties::identified(format!("crs {code}"), AuthorityCode::new("TEST", code)),
        kind: CrsKind::Engineering {
            datum,
            cs,
        },
    })
}

/// Returns the affine parametric method used by shift operations.
pub fn affine_method() -> Arc<OperationMethod> {
    Arc::new(OperationMethod {
        properties: Properties::identified(
            "Affine parametric transformation",
            AuthorityCode::new("EPSG", "9624"),
        ),
        formula: None,
        parameters: Vec::new(),
    })
}

/// Creates a translation operation between two CRSs of equal dimension.
pub fn shift(
    assembler: &OperationAssembler,
    name: &str,
    source: &Arc<CoordinateReferenceSystem>,
    target: &Arc<CoordinateReferenceSystem>,
    offsets: &[f64],
) -> Arc<CoordinateOperation> {
    shift_with_accuracy(assembler, name, source, target, offsets, &[])
}

/// Creates a translation operation declaring positional accuracies.
pub fn shift_with_accuracy(
    assembler: &OperationAssembler,
    name: &str,
    source: &Arc<CoordinateReferenceSystem>,
    target: &Arc<CoordinateReferenceSystem>,
    offsets: &[f64],
    accuracy: &[f64],
) -> Arc<CoordinateOperation> {
    let dimension = offsets.len();
    let mut matrix = Matrix::identity(dimension + 1);
    for (row, offset) in offsets.iter().enumerate() {
        matrix.set(row, dimension, *offset);
    }
    let transform = DefaultMathTransformFactory::new().create_affine(matrix).unwrap();
    let mut request =
        SingleOperationRequest::new(Properties::named(name), OperationKind::Transformation, affine_method());
    request.source_crs = Some(Arc::clone(source));
    request.target_crs = Some(Arc::clone(target));
    request.transform = Some(transform);
    request.positional_accuracy =
        accuracy.iter().map(|metres| PositionalAccuracy { metres: *metres }).collect();
    assembler.create_single_operation(request).unwrap()
}

/// Creates an identity operation on `crs`.
pub fn identity(
    assembler: &OperationAssembler,
    crs: &Arc<CoordinateReferenceSystem>,
) -> Arc<CoordinateOperation> {
    let offsets = vec![0.0; crs.dimension()];
    shift(assembler, "identity", crs, crs, &offsets)
}

// crates/epsg-core/tests/operation_assembly.rs
// ============================================================================
// Module: Operation Assembly Tests
// Description: Concatenation, pass-through, and canonicalization behavior.
// Purpose: Validate operation chains against dimension and arity rules.
// ============================================================================

//! Operation assembler integration tests.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

use std::sync::Arc;

use epsg_core::DEFAULT_CONCATENATED_NAME;
use epsg_core::Ellipsoid;
use epsg_core::OperationError;
use epsg_core::OperationKind;
use epsg_core::PositionalAccuracy;
use epsg_core::Properties;
use epsg_core::SEMI_MAJOR_PARAMETER;
use epsg_core::SEMI_MINOR_PARAMETER;
use epsg_core::SingleOperationRequest;
use epsg_core::base_unit;

use crate::common::assembler;
use crate::common::crs;
use crate::common::identity;
use crate::common::shift;
use crate::common::shift_with_accuracy;

// ============================================================================
// SECTION: Concatenation
// ============================================================================

#[test]
fn concatenation_composes_transforms_and_spans_end_crs() {
    let assembler = assembler();
    let (a, b, c) = (crs("1", 2), crs("2", 2), crs("3", 2));
    let first = shift(&assembler, "a-b", &a, &b, &[1.0, 2.0]);
    let second = shift(&assembler, "b-c", &b, &c, &[10.0, 20.0]);

    let chain = assembler.concatenate(Some(first), Some(second)).unwrap().unwrap();

    assert_eq!(chain.properties.name, DEFAULT_CONCATENATED_NAME);
    assert_eq!(chain.source_crs.as_ref(), Some(&a));
    assert_eq!(chain.target_crs.as_ref(), Some(&c));
    assert_eq!(chain.steps().len(), 2);
    assert_eq!(chain.transform.transform(&[0.0, 0.0]).unwrap(), vec![11.0, 22.0]);
}

#[test]
fn identity_operands_are_skipped() {
    let assembler = assembler();
    let (a, b) = (crs("1", 2), crs("2", 2));
    let operation = shift(&assembler, "a-b", &a, &b, &[1.0, 1.0]);
    let before = identity(&assembler, &a);
    let after = identity(&assembler, &b);

    let left = assembler.concatenate(Some(before), Some(Arc::clone(&operation))).unwrap().unwrap();
    let right = assembler.concatenate(Some(Arc::clone(&operation)), Some(after)).unwrap().unwrap();

    assert!(Arc::ptr_eq(&left, &operation));
    assert!(Arc::ptr_eq(&right, &operation));
}

#[test]
fn absent_operands_are_skipped() {
    let assembler = assembler();
    let operation = shift(&assembler, "a-b", &crs("1", 2), &crs("2", 2), &[1.0, 1.0]);

    let result = assembler.concatenate(None, Some(Arc::clone(&operation))).unwrap().unwrap();
    assert!(Arc::ptr_eq(&result, &operation));
    assert!(assembler.concatenate(None, None).unwrap().is_none());
    let result = assembler.concatenate3(Some(Arc::clone(&operation)), None, None).unwrap().unwrap();
    assert!(Arc::ptr_eq(&result, &operation));
}

#[test]
fn single_step_concatenation_is_missing_a_parameter() {
    let assembler = assembler();
    let operation = shift(&assembler, "a-b", &crs("1", 2), &crs("2", 2), &[1.0, 1.0]);

    let single = assembler.create_concatenated_operation(None, &[operation], None);
    assert_eq!(single.unwrap_err(), OperationError::MissingParameter("operations[1]".to_string()));

    let empty = assembler.create_concatenated_operation(None, &[], None);
    assert_eq!(empty.unwrap_err(), OperationError::MissingParameter("operations[0]".to_string()));
}

#[test]
fn adjacent_dimension_mismatch_is_rejected() {
    let assembler = assembler();
    let planar = shift(&assembler, "2d", &crs("1", 2), &crs("2", 2), &[1.0, 1.0]);
    let spatial = shift(&assembler, "3d", &crs("3", 3), &crs("4", 3), &[1.0, 1.0, 1.0]);

    let result = assembler.concatenate(Some(planar), Some(spatial));

    assert_eq!(
        result.unwrap_err(),
        OperationError::MismatchedDimension {
            context: "operations[1]".to_string(),
            expected: 2,
            actual: 3,
        }
    );
}

#[test]
fn nested_concatenations_are_flattened_in_order() {
    let assembler = assembler();
    let (a, b, c, d) = (crs("1", 2), crs("2", 2), crs("3", 2), crs("4", 2));
    let ab = shift(&assembler, "a-b", &a, &b, &[1.0, 0.0]);
    let bc = shift(&assembler, "b-c", &b, &c, &[0.0, 1.0]);
    let cd = shift(&assembler, "c-d", &c, &d, &[1.0, 1.0]);

    let inner = assembler.concatenate(Some(Arc::clone(&ab)), Some(Arc::clone(&bc))).unwrap();
    let outer = assembler.concatenate(inner, Some(Arc::clone(&cd))).unwrap().unwrap();

    let names = outer.steps().iter().map(|step| step.properties.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["a-b", "b-c", "c-d"]);
    assert!(outer.steps().iter().all(|step| step.is_single()));
    assert_eq!(outer.transform.transform(&[0.0, 0.0]).unwrap(), vec![2.0, 2.0]);
}

#[test]
fn identity_steps_stay_listed_but_leave_the_transform() {
    let assembler = assembler();
    let (a, b) = (crs("1", 2), crs("2", 2));
    let first = shift(&assembler, "a-b", &a, &b, &[3.0, 4.0]);
    let noop = identity(&assembler, &b);
    let back = shift(&assembler, "b-a", &b, &a, &[-3.0, -4.0]);

    let chain = assembler
        .create_concatenated_operation(None, &[Arc::clone(&first), noop, back], None)
        .unwrap();

    assert_eq!(chain.steps().len(), 3);
    assert!(chain.is_identity());
}

#[test]
fn equal_concatenations_share_one_instance() {
    let assembler = assembler();
    let (a, b, c) = (crs("1", 2), crs("2", 2), crs("3", 2));
    let first = shift(&assembler, "a-b", &a, &b, &[1.0, 2.0]);
    let second = shift(&assembler, "b-c", &b, &c, &[3.0, 4.0]);

    let one = assembler.concatenate(Some(Arc::clone(&first)), Some(Arc::clone(&second))).unwrap();
    let two = assembler.concatenate(Some(first), Some(second)).unwrap();

    assert!(Arc::ptr_eq(&one.unwrap(), &two.unwrap()));
}

#[test]
fn accuracy_defaults_to_deduplicated_union() {
    let assembler = assembler();
    let (a, b, c) = (crs("1", 2), crs("2", 2), crs("3", 2));
    let first = shift_with_accuracy(&assembler, "a-b", &a, &b, &[1.0, 0.0], &[1.0]);
    let second = shift_with_accuracy(&assembler, "b-c", &b, &c, &[0.0, 1.0], &[1.0, 2.0]);

    let chain = assembler.concatenate(Some(Arc::clone(&first)), Some(Arc::clone(&second))).unwrap();
    let metres =
        chain.unwrap().positional_accuracy.iter().map(|accuracy| accuracy.metres).collect::<Vec<_>>();
    assert_eq!(metres, vec![1.0, 2.0]);

    let explicit = assembler
        .create_concatenated_operation(
            None,
            &[first, second],
            Some(vec![PositionalAccuracy {
                metres: 5.0,
            }]),
        )
        .unwrap();
    assert_eq!(explicit.positional_accuracy.len(), 1);
}

// ============================================================================
// SECTION: Pass-Through
// ============================================================================

#[test]
fn pass_through_applies_inner_operation_to_sub_range() {
    let assembler = assembler();
    let inner = shift(&assembler, "height", &crs("h1", 1), &crs("h2", 1), &[5.0]);
    let (source, target) = (crs("s", 3), crs("t", 3));

    let wrapped = assembler
        .create_pass_through_operation(Properties::named("wrapped"), source, target, inner, 1, 1)
        .unwrap();

    assert!(matches!(
        wrapped.kind,
        OperationKind::PassThrough {
            first_affected_ordinate: 1,
            num_trailing_ordinates: 1,
            ..
        }
    ));
    assert_eq!(wrapped.transform.transform(&[1.0, 2.0, 3.0]).unwrap(), vec![1.0, 7.0, 3.0]);
}

#[test]
fn pass_through_range_must_fit_the_crs() {
    let assembler = assembler();
    let inner = shift(&assembler, "height", &crs("h1", 1), &crs("h2", 1), &[5.0]);

    let result = assembler.create_pass_through_operation(
        Properties::named("wrapped"),
        crs("s", 3),
        crs("t", 3),
        inner,
        2,
        1,
    );

    assert!(matches!(result, Err(OperationError::MismatchedDimension { .. })));
}

#[test]
fn pass_through_rejects_concatenations() {
    let assembler = assembler();
    let (a, b, c) = (crs("1", 1), crs("2", 1), crs("3", 1));
    let ab = shift(&assembler, "a-b", &a, &b, &[1.0]);
    let bc = shift(&assembler, "b-c", &b, &c, &[1.0]);
    let chain = assembler.concatenate(Some(ab), Some(bc)).unwrap().unwrap();

    let result = assembler.create_pass_through_operation(
        Properties::named("wrapped"),
        crs("s", 2),
        crs("t", 2),
        chain,
        1,
        0,
    );

    assert!(matches!(result, Err(OperationError::InvalidOperation(_))));
}

// ============================================================================
// SECTION: Single Operations
// ============================================================================

#[test]
fn ellipsoid_axes_are_prepended_as_parameters() {
    let assembler = assembler();
    let metre = Arc::new(base_unit(9001).unwrap());
    let ellipsoid = Arc::new(Ellipsoid::from_flattening(
        Properties::named("WGS 84"),
        6_378_137.0,
        298.257_223_563,
        metre,
    ));
    let mut request = SingleOperationRequest::new(
        Properties::named("UTM zone 31N"),
        OperationKind::Conversion,
        common::affine_method(),
    );
    request.ellipsoid = Some(ellipsoid);
    request.transform = Some(Arc::clone(&identity(&assembler, &crs("1", 2)).transform));

    let conversion = assembler.create_single_operation(request).unwrap();

    let names =
        conversion.parameters.values.iter().map(|value| value.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec![SEMI_MAJOR_PARAMETER, SEMI_MINOR_PARAMETER]);
}

#[test]
fn single_operation_rejects_chain_kinds() {
    let assembler = assembler();
    let request = SingleOperationRequest::new(
        Properties::named("bogus"),
        OperationKind::Concatenated {
            operations: Vec::new(),
        },
        common::affine_method(),
    );

    let result = assembler.create_single_operation(request);

    assert!(matches!(result, Err(OperationError::InvalidOperation(_))));
}

// crates/epsg-core/src/lib.rs
// ============================================================================
// Module: EPSG Core Library
// Description: Public API surface for the EPSG referencing core.
// Purpose: Expose the object model, backend interfaces, and operation assembly.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! EPSG core defines the immutable georeferencing objects (units, ellipsoids,
//! datums, coordinate systems, coordinate reference systems, and coordinate
//! operations) that the EPSG factory materializes from relational rows. It also
//! defines the row-returning backend contract and the math-transform contract,
//! and provides the operation assembler that chains operations into validated
//! concatenated and pass-through operations. No database code lives here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::BackendError;
pub use interfaces::EpsgConnection;
pub use interfaces::EpsgConnector;
pub use interfaces::MathTransform;
pub use interfaces::MathTransformFactory;
pub use interfaces::Row;
pub use interfaces::SqlValue;
pub use interfaces::StatementHandle;
pub use interfaces::TransformError;
pub use runtime::AffineTransform;
pub use runtime::CanonicalPool;
pub use runtime::DEFAULT_CONCATENATED_NAME;
pub use runtime::DefaultMathTransformFactory;
pub use runtime::Matrix;
pub use runtime::OperationAssembler;
pub use runtime::ParameterizedTransform;
pub use runtime::SEMI_MAJOR_PARAMETER;
pub use runtime::SEMI_MINOR_PARAMETER;
pub use runtime::SingleOperationRequest;
pub use runtime::WeakValueMap;

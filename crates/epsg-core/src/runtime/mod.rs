// crates/epsg-core/src/runtime/mod.rs
// ============================================================================
// Module: EPSG Runtime
// Description: Operation assembly, math transforms, and object pools.
// Purpose: Provide the executable parts shared by every factory.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime components are backend agnostic. The factory crate drives them
//! with decoded rows; tests drive them directly.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod operations;
pub mod pool;
pub mod transform;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use operations::DEFAULT_CONCATENATED_NAME;
pub use operations::OperationAssembler;
pub use operations::SEMI_MAJOR_PARAMETER;
pub use operations::SEMI_MINOR_PARAMETER;
pub use operations::SingleOperationRequest;
pub use pool::CanonicalPool;
pub use pool::WeakValueMap;
pub use transform::AffineTransform;
pub use transform::DefaultMathTransformFactory;
pub use transform::Matrix;
pub use transform::ParameterizedTransform;

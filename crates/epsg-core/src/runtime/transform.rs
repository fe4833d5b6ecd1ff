// crates/epsg-core/src/runtime/transform.rs
// ============================================================================
// Module: Default Math Transforms
// Description: Identity, affine, concatenated, pass-through, and opaque
//              parameterized transforms plus their factory.
// Purpose: Give coordinate operations executable (or describable) transforms.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Transforms are immutable and shared behind [`Arc`]. Affine transforms are
//! stored as augmented matrices so that chains of affine steps collapse into
//! one matrix product. Methods that are not affine-expressible produce a
//! [`ParameterizedTransform`] that describes itself but reports
//! [`TransformError::Unsupported`] when evaluated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::sync::Arc;

use crate::core::datum::helmert_rows;
use crate::core::operation::OperationMethod;
use crate::core::operation::ParameterValueGroup;
use crate::core::operation::ParameterValueKind;
use crate::core::units::base_unit;
use crate::interfaces::MathTransform;
use crate::interfaces::MathTransformFactory;
use crate::interfaces::TransformError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tolerance used when testing matrix elements against identity values.
const IDENTITY_TOLERANCE: f64 = 1.0e-12;

/// Longitude rotation.
const METHOD_LONGITUDE_ROTATION: &str = "9601";
/// Geocentric translations.
const METHOD_GEOCENTRIC_TRANSLATIONS: &str = "9603";
/// Position vector seven-parameter transformation.
const METHOD_POSITION_VECTOR: &str = "9606";
/// Coordinate frame rotation.
const METHOD_COORDINATE_FRAME: &str = "9607";
/// Affine parametric transformation.
const METHOD_AFFINE_PARAMETRIC: &str = "9624";

/// Metre.
const UOM_METRE: i64 = 9001;
/// Degree.
const UOM_DEGREE: i64 = 9102;
/// Arc-second.
const UOM_ARC_SECOND: i64 = 9104;
/// Unity.
const UOM_UNITY: i64 = 9201;
/// Parts per million.
const UOM_PPM: i64 = 9202;

// ============================================================================
// SECTION: Matrix
// ============================================================================

/// Row-major dense matrix.
///
/// # Invariants
/// - `values.len() == rows * cols`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Elements in row-major order.
    values: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix from row-major elements.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MismatchedDimension`] when `values` does not
    /// hold exactly `rows * cols` elements.
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, TransformError> {
        if values.len() != rows * cols {
            return Err(TransformError::MismatchedDimension {
                expected: rows * cols,
                actual: values.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            values,
        })
    }

    /// Creates the `size x size` identity matrix.
    #[must_use]
    pub fn identity(size: usize) -> Self {
        let mut values = vec![0.0; size * size];
        for index in 0 .. size {
            values[index * size + index] = 1.0;
        }
        Self {
            rows: size,
            cols: size,
            values,
        }
    }

    /// Creates an augmented matrix from the top rows of an affine map.
    ///
    /// The homogeneous last row `[0 .. 0 1]` is appended.
    #[must_use]
    pub fn from_affine_rows<const N: usize>(rows: &[[f64; N]]) -> Self {
        let mut matrix = Self::identity(N);
        for (row, elements) in rows.iter().enumerate().take(N.saturating_sub(1)) {
            for (col, value) in elements.iter().enumerate() {
                matrix.set(row, col, *value);
            }
        }
        matrix
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the element at (`row`, `col`), or zero when out of range.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row < self.rows && col < self.cols {
            self.values[row * self.cols + col]
        } else {
            0.0
        }
    }

    /// Sets the element at (`row`, `col`); out-of-range writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        if row < self.rows && col < self.cols {
            self.values[row * self.cols + col] = value;
        }
    }

    /// Returns `self × other`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MismatchedDimension`] when the inner
    /// dimensions disagree.
    pub fn multiply(&self, other: &Self) -> Result<Self, TransformError> {
        if self.cols != other.rows {
            return Err(TransformError::MismatchedDimension {
                expected: self.cols,
                actual: other.rows,
            });
        }
        let mut values = vec![0.0; self.rows * other.cols];
        for row in 0 .. self.rows {
            for col in 0 .. other.cols {
                values[row * other.cols + col] =
                    (0 .. self.cols).map(|k| self.get(row, k) * other.get(k, col)).sum();
            }
        }
        Ok(Self {
            rows: self.rows,
            cols: other.cols,
            values,
        })
    }

    /// Returns the inverse of a square matrix.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::NonInvertible`] for singular or non-square
    /// matrices.
    pub fn invert(&self) -> Result<Self, TransformError> {
        if self.rows != self.cols {
            return Err(TransformError::NonInvertible);
        }
        let size = self.rows;
        let mut work = self.clone();
        let mut inverse = Self::identity(size);
        for pivot in 0 .. size {
            let best = (pivot .. size)
                .max_by(|a, b| work.get(*a, pivot).abs().total_cmp(&work.get(*b, pivot).abs()))
                .ok_or(TransformError::NonInvertible)?;
            if work.get(best, pivot).abs() < f64::EPSILON {
                return Err(TransformError::NonInvertible);
            }
            work.swap_rows(pivot, best);
            inverse.swap_rows(pivot, best);
            let scale = work.get(pivot, pivot);
            for col in 0 .. size {
                work.set(pivot, col, work.get(pivot, col) / scale);
                inverse.set(pivot, col, inverse.get(pivot, col) / scale);
            }
            for row in (0 .. size).filter(|row| *row != pivot) {
                let factor = work.get(row, pivot);
                for col in 0 .. size {
                    work.set(row, col, work.get(row, col) - factor * work.get(pivot, col));
                    inverse.set(row, col, inverse.get(row, col) - factor * inverse.get(pivot, col));
                }
            }
        }
        Ok(inverse)
    }

    /// Returns `true` for a square matrix equal to the identity.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.rows == self.cols
            && (0 .. self.rows).all(|row| {
                (0 .. self.cols).all(|col| {
                    let expected = if row == col { 1.0 } else { 0.0 };
                    (self.get(row, col) - expected).abs() <= IDENTITY_TOLERANCE
                })
            })
    }

    /// Swaps two rows in place.
    fn swap_rows(&mut self, first: usize, second: usize) {
        if first == second {
            return;
        }
        for col in 0 .. self.cols {
            self.values.swap(first * self.cols + col, second * self.cols + col);
        }
    }
}

// ============================================================================
// SECTION: Transforms
// ============================================================================

/// Affine transform stored as an augmented matrix.
///
/// # Invariants
/// - The matrix has at least one row and one column.
/// - The last row is homogeneous (`[0 .. 0 1]`).
#[derive(Debug, Clone, PartialEq)]
pub struct AffineTransform {
    /// Augmented `(target + 1) x (source + 1)` matrix.
    matrix: Matrix,
}

impl AffineTransform {
    /// Wraps an augmented matrix.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::MismatchedDimension`] when the matrix is
    /// empty.
    pub fn new(matrix: Matrix) -> Result<Self, TransformError> {
        if matrix.rows() == 0 || matrix.cols() == 0 {
            return Err(TransformError::MismatchedDimension {
                expected: 1,
                actual: 0,
            });
        }
        Ok(Self {
            matrix,
        })
    }

    /// Returns the identity transform of `dimension` ordinates.
    #[must_use]
    pub fn identity(dimension: usize) -> Self {
        Self {
            matrix: Matrix::identity(dimension + 1),
        }
    }

    /// Returns the augmented matrix.
    #[must_use]
    pub const fn matrix(&self) -> &Matrix {
        &self.matrix
    }
}

impl MathTransform for AffineTransform {
    fn source_dimensions(&self) -> usize {
        self.matrix.cols() - 1
    }

    fn target_dimensions(&self) -> usize {
        self.matrix.rows() - 1
    }

    fn is_identity(&self) -> bool {
        self.matrix.is_identity()
    }

    fn transform(&self, point: &[f64]) -> Result<Vec<f64>, TransformError> {
        let source = self.source_dimensions();
        check_dimension(source, point.len())?;
        Ok((0 .. self.target_dimensions())
            .map(|row| {
                let linear: f64 =
                    point.iter().enumerate().map(|(col, x)| self.matrix.get(row, col) * x).sum();
                linear + self.matrix.get(row, source)
            })
            .collect())
    }

    fn inverse(&self) -> Result<Arc<dyn MathTransform>, TransformError> {
        Ok(Arc::new(Self::new(self.matrix.invert()?)?))
    }

    fn to_wkt(&self) -> String {
        let mut wkt = format!(
            "PARAM_MT[\"Affine\", PARAMETER[\"num_row\", {}], PARAMETER[\"num_col\", {}]",
            self.matrix.rows(),
            self.matrix.cols()
        );
        for row in 0 .. self.matrix.rows() {
            for col in 0 .. self.matrix.cols() {
                let value = self.matrix.get(row, col);
                let default = if row == col { 1.0 } else { 0.0 };
                if (value - default).abs() > IDENTITY_TOLERANCE {
                    let _ = write!(wkt, ", PARAMETER[\"elt_{row}_{col}\", {value}]");
                }
            }
        }
        wkt.push(']');
        wkt
    }

    fn as_affine(&self) -> Option<&Matrix> {
        Some(&self.matrix)
    }
}

/// Ordered chain of at least two transforms.
///
/// # Invariants
/// - Adjacent steps agree on dimension and none is itself a chain.
#[derive(Debug, Clone)]
pub struct ConcatenatedTransform {
    /// Steps applied first to last.
    steps: Vec<Arc<dyn MathTransform>>,
}

impl MathTransform for ConcatenatedTransform {
    fn source_dimensions(&self) -> usize {
        self.steps.first().map_or(0, |step| step.source_dimensions())
    }

    fn target_dimensions(&self) -> usize {
        self.steps.last().map_or(0, |step| step.target_dimensions())
    }

    fn transform(&self, point: &[f64]) -> Result<Vec<f64>, TransformError> {
        check_dimension(self.source_dimensions(), point.len())?;
        let mut current = point.to_vec();
        for step in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }

    fn inverse(&self) -> Result<Arc<dyn MathTransform>, TransformError> {
        let steps = self.steps.iter().rev().map(|step| step.inverse()).collect::<Result<_, _>>()?;
        Ok(Arc::new(Self {
            steps,
        }))
    }

    fn to_wkt(&self) -> String {
        let inner = self.steps.iter().map(|step| step.to_wkt()).collect::<Vec<_>>();
        format!("CONCAT_MT[{}]", inner.join(", "))
    }

    fn steps(&self) -> Option<&[Arc<dyn MathTransform>]> {
        Some(&self.steps)
    }
}

/// Transform applied to a contiguous ordinate range.
#[derive(Debug, Clone)]
pub struct PassThroughTransform {
    /// Number of leading unaffected ordinates.
    first_affected_ordinate: usize,
    /// Transform applied to the affected range.
    sub: Arc<dyn MathTransform>,
    /// Number of trailing unaffected ordinates.
    num_trailing_ordinates: usize,
}

impl MathTransform for PassThroughTransform {
    fn source_dimensions(&self) -> usize {
        self.first_affected_ordinate + self.sub.source_dimensions() + self.num_trailing_ordinates
    }

    fn target_dimensions(&self) -> usize {
        self.first_affected_ordinate + self.sub.target_dimensions() + self.num_trailing_ordinates
    }

    fn transform(&self, point: &[f64]) -> Result<Vec<f64>, TransformError> {
        check_dimension(self.source_dimensions(), point.len())?;
        let lead = self.first_affected_ordinate;
        let end = lead + self.sub.source_dimensions();
        let mut output = Vec::with_capacity(self.target_dimensions());
        output.extend_from_slice(&point[.. lead]);
        output.extend(self.sub.transform(&point[lead .. end])?);
        output.extend_from_slice(&point[end ..]);
        Ok(output)
    }

    fn inverse(&self) -> Result<Arc<dyn MathTransform>, TransformError> {
        Ok(Arc::new(Self {
            first_affected_ordinate: self.first_affected_ordinate,
            sub: self.sub.inverse()?,
            num_trailing_ordinates: self.num_trailing_ordinates,
        }))
    }

    fn to_wkt(&self) -> String {
        format!(
            "PASSTHROUGH_MT[{}, {}, {}]",
            self.first_affected_ordinate,
            self.num_trailing_ordinates,
            self.sub.to_wkt()
        )
    }
}

/// Transform of a method without a numeric kernel.
///
/// Evaluation reports [`TransformError::Unsupported`]; the method name and
/// parameters remain available through the WKT rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterizedTransform {
    /// Method name.
    method: String,
    /// Parameter names and rendered values in method order.
    parameters: Vec<(String, String)>,
    /// Input dimension.
    source_dimensions: usize,
    /// Output dimension.
    target_dimensions: usize,
    /// `true` for the inverse direction.
    inverse: bool,
}

impl MathTransform for ParameterizedTransform {
    fn source_dimensions(&self) -> usize {
        self.source_dimensions
    }

    fn target_dimensions(&self) -> usize {
        self.target_dimensions
    }

    fn transform(&self, _point: &[f64]) -> Result<Vec<f64>, TransformError> {
        Err(TransformError::Unsupported(self.method.clone()))
    }

    fn inverse(&self) -> Result<Arc<dyn MathTransform>, TransformError> {
        Ok(Arc::new(Self {
            method: self.method.clone(),
            parameters: self.parameters.clone(),
            source_dimensions: self.target_dimensions,
            target_dimensions: self.source_dimensions,
            inverse: !self.inverse,
        }))
    }

    fn to_wkt(&self) -> String {
        let mut wkt = format!("PARAM_MT[\"{}\"", self.method);
        for (name, value) in &self.parameters {
            let _ = write!(wkt, ", PARAMETER[\"{name}\", {value}]");
        }
        wkt.push(']');
        if self.inverse { format!("INVERSE_MT[{wkt}]") } else { wkt }
    }
}

/// Fails unless `actual` equals `expected`.
const fn check_dimension(expected: usize, actual: usize) -> Result<(), TransformError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TransformError::MismatchedDimension {
            expected,
            actual,
        })
    }
}

// ============================================================================
// SECTION: Factory
// ============================================================================

/// Math transform factory with numeric support for affine-expressible methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMathTransformFactory;

impl DefaultMathTransformFactory {
    /// Creates the factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the augmented matrix of an affine-expressible method.
    ///
    /// Returns `Ok(None)` for methods without an affine form.
    fn affine_matrix(
        code: &str,
        parameters: &ParameterValueGroup,
        source_dimensions: usize,
    ) -> Result<Option<Matrix>, TransformError> {
        let matrix = match code {
            METHOD_LONGITUDE_ROTATION => {
                let offset = parameter(parameters, "8602", "Longitude offset", UOM_DEGREE)?;
                let mut matrix = Matrix::identity(source_dimensions + 1);
                matrix.set(1, source_dimensions, offset);
                matrix
            }
            METHOD_GEOCENTRIC_TRANSLATIONS => {
                let translation = translations(parameters)?;
                Matrix::from_affine_rows(&helmert_rows(translation, [0.0; 3], 0.0))
            }
            METHOD_POSITION_VECTOR | METHOD_COORDINATE_FRAME => {
                let translation = translations(parameters)?;
                let mut rotation = [
                    parameter(parameters, "8608", "X-axis rotation", UOM_ARC_SECOND)?,
                    parameter(parameters, "8609", "Y-axis rotation", UOM_ARC_SECOND)?,
                    parameter(parameters, "8610", "Z-axis rotation", UOM_ARC_SECOND)?,
                ];
                if code == METHOD_COORDINATE_FRAME {
                    rotation = rotation.map(|value| -value);
                }
                let ppm = parameter(parameters, "8611", "Scale difference", UOM_PPM)?;
                Matrix::from_affine_rows(&helmert_rows(translation, rotation, ppm))
            }
            METHOD_AFFINE_PARAMETRIC => {
                let a0 = parameter(parameters, "8623", "A0", UOM_METRE)?;
                let a1 = parameter(parameters, "8624", "A1", UOM_UNITY)?;
                let a2 = parameter(parameters, "8625", "A2", UOM_UNITY)?;
                let b0 = parameter(parameters, "8639", "B0", UOM_METRE)?;
                let b1 = parameter(parameters, "8640", "B1", UOM_UNITY)?;
                let b2 = parameter(parameters, "8641", "B2", UOM_UNITY)?;
                Matrix::from_affine_rows(&[[a1, a2, a0], [b1, b2, b0]])
            }
            _ => return Ok(None),
        };
        Ok(Some(matrix))
    }

    /// Wraps a matrix, collapsing identities.
    fn affine(&self, matrix: Matrix) -> Result<Arc<dyn MathTransform>, TransformError> {
        if matrix.is_identity() {
            return Ok(self.create_identity(matrix.rows() - 1));
        }
        Ok(Arc::new(AffineTransform::new(matrix)?))
    }
}

impl MathTransformFactory for DefaultMathTransformFactory {
    fn create_identity(&self, dimension: usize) -> Arc<dyn MathTransform> {
        Arc::new(AffineTransform::identity(dimension))
    }

    fn create_affine(&self, matrix: Matrix) -> Result<Arc<dyn MathTransform>, TransformError> {
        if matrix.rows() == 0 || matrix.cols() == 0 {
            return Err(TransformError::MismatchedDimension {
                expected: 1,
                actual: 0,
            });
        }
        self.affine(matrix)
    }

    fn create_concatenated(
        &self,
        first: Arc<dyn MathTransform>,
        second: Arc<dyn MathTransform>,
    ) -> Result<Arc<dyn MathTransform>, TransformError> {
        check_dimension(first.target_dimensions(), second.source_dimensions())?;
        if first.is_identity() {
            return Ok(second);
        }
        if second.is_identity() {
            return Ok(first);
        }
        if let (Some(a), Some(b)) = (first.as_affine(), second.as_affine()) {
            return self.affine(b.multiply(a)?);
        }
        let dimension = first.source_dimensions();
        let mut steps: Vec<Arc<dyn MathTransform>> = Vec::new();
        for transform in [first, second] {
            let parts =
                transform.steps().map_or_else(|| vec![Arc::clone(&transform)], <[_]>::to_vec);
            for part in parts {
                let previous = steps.last().and_then(|last| last.as_affine());
                let merged = match (previous, part.as_affine()) {
                    (Some(a), Some(b)) => Some(b.multiply(a)?),
                    _ => None,
                };
                if let Some(matrix) = merged {
                    steps.pop();
                    if !matrix.is_identity() {
                        steps.push(Arc::new(AffineTransform::new(matrix)?));
                    }
                } else {
                    steps.push(part);
                }
            }
        }
        match steps.len() {
            0 => Ok(self.create_identity(dimension)),
            1 => Ok(steps.remove(0)),
            _ => Ok(Arc::new(ConcatenatedTransform {
                steps,
            })),
        }
    }

    fn create_pass_through(
        &self,
        first_affected_ordinate: usize,
        sub: Arc<dyn MathTransform>,
        num_trailing_ordinates: usize,
    ) -> Result<Arc<dyn MathTransform>, TransformError> {
        if first_affected_ordinate == 0 && num_trailing_ordinates == 0 {
            return Ok(sub);
        }
        if let Some(inner) = sub.as_affine() {
            let source = first_affected_ordinate + sub.source_dimensions() + num_trailing_ordinates;
            let target = first_affected_ordinate + sub.target_dimensions() + num_trailing_ordinates;
            let lead = first_affected_ordinate;
            let (sub_source, sub_target) = (sub.source_dimensions(), sub.target_dimensions());
            let mut matrix =
                Matrix::new(target + 1, source + 1, vec![0.0; (target + 1) * (source + 1)])?;
            for index in 0 .. lead {
                matrix.set(index, index, 1.0);
            }
            for row in 0 .. sub_target {
                for col in 0 .. sub_source {
                    matrix.set(lead + row, lead + col, inner.get(row, col));
                }
                matrix.set(lead + row, source, inner.get(row, sub_source));
            }
            for index in 0 .. num_trailing_ordinates {
                matrix.set(lead + sub_target + index, lead + sub_source + index, 1.0);
            }
            matrix.set(target, source, 1.0);
            return self.affine(matrix);
        }
        Ok(Arc::new(PassThroughTransform {
            first_affected_ordinate,
            sub,
            num_trailing_ordinates,
        }))
    }

    fn create_parameterized(
        &self,
        method: &OperationMethod,
        parameters: &ParameterValueGroup,
        source_dimensions: usize,
        target_dimensions: usize,
    ) -> Result<Arc<dyn MathTransform>, TransformError> {
        let code = method.properties.code().unwrap_or_default();
        if let Some(matrix) = Self::affine_matrix(code, parameters, source_dimensions)? {
            return self.affine(matrix);
        }
        let rendered = parameters
            .values
            .iter()
            .map(|value| {
                let text = match &value.value {
                    ParameterValueKind::Numeric {
                        value, ..
                    } => value.to_string(),
                    ParameterValueKind::FileRef {
                        path,
                    } => format!("\"{path}\""),
                };
                (value.name.clone(), text)
            })
            .collect();
        Ok(Arc::new(ParameterizedTransform {
            method: method.properties.name.clone(),
            parameters: rendered,
            source_dimensions,
            target_dimensions,
            inverse: false,
        }))
    }
}

/// Reads the three geocentric translation parameters in metres.
fn translations(parameters: &ParameterValueGroup) -> Result<[f64; 3], TransformError> {
    Ok([
        parameter(parameters, "8605", "X-axis translation", UOM_METRE)?,
        parameter(parameters, "8606", "Y-axis translation", UOM_METRE)?,
        parameter(parameters, "8607", "Z-axis translation", UOM_METRE)?,
    ])
}

/// Reads a numeric parameter by code (or name) converted to unit `uom`.
fn parameter(
    parameters: &ParameterValueGroup,
    code: &str,
    name: &str,
    uom: i64,
) -> Result<f64, TransformError> {
    let target = base_unit(uom).ok_or_else(|| TransformError::Unsupported(format!("unit {uom}")))?;
    parameters
        .by_code(code)
        .or_else(|| parameters.by_name(name))
        .and_then(|value| value.value_in(&target))
        .ok_or_else(|| TransformError::MissingParameter(name.to_string()))
}

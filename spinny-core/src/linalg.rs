/// Vector and matrix value types with size-checked arithmetic
///
/// Both types wrap nalgebra's dynamically sized storage and are immutable:
/// every operation returns a fresh value. That is what keeps the cached
/// vector length and matrix determinant valid for the life of the value.
use std::cell::OnceCell;
use std::fmt;
use std::ops::Neg;

use nalgebra::{DMatrix, DVector};

use crate::error::LinalgError;

type Result<T> = std::result::Result<T, LinalgError>;

/// A column vector of arbitrary (usually 2 or 3) dimension.
#[derive(Debug, Clone)]
pub struct Vector {
    values: DVector<f64>,
    length: OnceCell<f64>,
}

impl Vector {
    pub fn from_slice(values: &[f64]) -> Self {
        Self::from(DVector::from_column_slice(values))
    }

    pub fn xy(x: f64, y: f64) -> Self {
        Self::from_slice(&[x, y])
    }

    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self::from_slice(&[x, y, z])
    }

    pub fn zeros(dim: usize) -> Self {
        let v = Self::from(DVector::zeros(dim));
        let _ = v.length.set(0.0);
        v
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        self.values.as_slice()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&x| x == 0.0)
    }

    fn check_dim(&self, other: &Vector) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(LinalgError::DimensionMismatch {
                left: self.dim(),
                right: other.dim(),
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Vector) -> Result<Vector> {
        self.check_dim(other)?;
        Ok(Self::from(&self.values + &other.values))
    }

    pub fn sub(&self, other: &Vector) -> Result<Vector> {
        self.check_dim(other)?;
        Ok(Self::from(&self.values - &other.values))
    }

    pub fn scale(&self, k: f64) -> Vector {
        let v = Self::from(&self.values * k);
        if let Some(len) = self.length.get() {
            let _ = v.length.set(len * k.abs());
        }
        v
    }

    pub fn dot(&self, other: &Vector) -> Result<f64> {
        self.check_dim(other)?;
        Ok(self.values.dot(&other.values))
    }

    /// Right-handed cross product, only defined for 3-vectors.
    pub fn cross(&self, other: &Vector) -> Result<Vector> {
        for v in [self, other] {
            if v.dim() != 3 {
                return Err(LinalgError::UnsupportedDimension {
                    operation: "cross product",
                    dimension: v.dim(),
                });
            }
        }
        let (a, b) = (&self.values, &other.values);
        Ok(Self::xyz(
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ))
    }

    pub fn length_squared(&self) -> f64 {
        self.values.norm_squared()
    }

    /// Euclidean norm, computed on first use and cached.
    pub fn length(&self) -> f64 {
        *self.length.get_or_init(|| self.values.norm())
    }

    pub fn is_length_cached(&self) -> bool {
        self.length.get().is_some()
    }

    pub fn unit(&self) -> Result<Vector> {
        let len = self.length();
        if len == 0.0 {
            return Err(LinalgError::DivideByZero);
        }
        Ok(Self::from(&self.values / len))
    }

    /// Projection onto the span of `basis`.
    ///
    /// The basis vectors must be mutually orthogonal; no Gram-Schmidt step
    /// is performed, so a skewed basis gives a wrong answer.
    pub fn project<'a, I>(&self, basis: I) -> Result<Vector>
    where
        I: IntoIterator<Item = &'a Vector>,
    {
        let mut res = DVector::zeros(self.dim());
        for b in basis {
            let bb = b.dot(b)?;
            if bb == 0.0 {
                return Err(LinalgError::DivideByZero);
            }
            res += &b.values * (self.dot(b)? / bb);
        }
        Ok(Self::from(res))
    }

    /// Shortens the vector to `bound` if it is longer than that.
    pub fn crop(&self, bound: f64) -> Result<Vector> {
        if self.length() <= bound {
            return Ok(self.clone());
        }
        Ok(self.unit()?.scale(bound))
    }

    /// Hashable identity for value-equality lookups. Negative zero maps to
    /// zero so the key agrees with `==`.
    pub(crate) fn bit_key(&self) -> Vec<u64> {
        self.values
            .iter()
            .map(|&x| if x == 0.0 { 0u64 } else { x.to_bits() })
            .collect()
    }
}

impl From<DVector<f64>> for Vector {
    fn from(values: DVector<f64>) -> Self {
        Self {
            values,
            length: OnceCell::new(),
        }
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Neg for &Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.scale(-1.0)
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        self.scale(-1.0)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, ")")
    }
}

/// A dense `rows x cols` matrix.
#[derive(Debug, Clone)]
pub struct Matrix {
    values: DMatrix<f64>,
    det: OnceCell<f64>,
}

impl Matrix {
    pub fn from_rows<const N: usize>(rows: &[[f64; N]]) -> Self {
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::from(DMatrix::from_row_slice(rows.len(), N, &data))
    }

    /// Seeds the determinant cache, but only for sizes `det` can answer.
    fn with_det(values: DMatrix<f64>, det: Option<f64>) -> Self {
        let m = Self::from(values);
        if let Some(d) = det {
            if m.det_dimension().is_ok() {
                let _ = m.det.set(d);
            }
        }
        m
    }

    pub fn identity(n: usize) -> Self {
        Self::with_det(DMatrix::identity(n, n), Some(1.0))
    }

    pub fn diagonal(entries: &[f64]) -> Self {
        let diag = DVector::from_column_slice(entries);
        Self::with_det(
            DMatrix::from_diagonal(&diag),
            Some(entries.iter().product()),
        )
    }

    pub fn uniform_scale(s: f64) -> Self {
        Self::diagonal(&[s, s, s])
    }

    /// Rotation about the x axis, right-hand rule.
    pub fn x_rotation(a: f64) -> Self {
        let (s, c) = a.sin_cos();
        Self::rotation([[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    /// Rotation about the y axis, right-hand rule.
    pub fn y_rotation(a: f64) -> Self {
        let (s, c) = a.sin_cos();
        Self::rotation([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    /// Rotation about the z axis, right-hand rule.
    pub fn z_rotation(a: f64) -> Self {
        let (s, c) = a.sin_cos();
        Self::rotation([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// A 3x3 matrix known to be a rotation, so its determinant is 1.
    pub(crate) fn rotation(rows: [[f64; 3]; 3]) -> Self {
        let m = Self::from_rows(&rows);
        let _ = m.det.set(1.0);
        m
    }

    /// `(rows, cols)`
    pub fn size(&self) -> (usize, usize) {
        self.values.shape()
    }

    pub fn is_square(&self) -> bool {
        self.values.is_square()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied()
    }

    fn check_size(&self, other: &Matrix) -> Result<()> {
        let (a, b) = (self.size(), other.size());
        if a.0 != b.0 {
            return Err(LinalgError::DimensionMismatch {
                left: a.0,
                right: b.0,
            });
        }
        if a.1 != b.1 {
            return Err(LinalgError::DimensionMismatch {
                left: a.1,
                right: b.1,
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.check_size(other)?;
        Ok(Self::from(&self.values + &other.values))
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.check_size(other)?;
        Ok(Self::from(&self.values - &other.values))
    }

    pub fn scale(&self, k: f64) -> Matrix {
        let det = match (self.det.get(), self.is_square()) {
            (Some(d), true) => Some(d * k.powi(self.size().0 as i32)),
            _ => None,
        };
        Self::with_det(&self.values * k, det)
    }

    pub fn matmul(&self, other: &Matrix) -> Result<Matrix> {
        if self.size().1 != other.size().0 {
            return Err(LinalgError::IncompatibleSize {
                left: self.size(),
                right: other.size(),
            });
        }
        let det = match (self.det.get(), other.det.get()) {
            (Some(a), Some(b)) if self.is_square() && other.is_square() => Some(a * b),
            _ => None,
        };
        Ok(Self::with_det(&self.values * &other.values, det))
    }

    /// Treats `v` as a column; the result is a vector, not a 1-column matrix.
    pub fn mul_vector(&self, v: &Vector) -> Result<Vector> {
        if self.size().1 != v.dim() {
            return Err(LinalgError::IncompatibleSize {
                left: self.size(),
                right: (v.dim(), 1),
            });
        }
        Ok(Vector::from(&self.values * &v.values))
    }

    pub fn transpose(&self) -> Matrix {
        Self::with_det(self.values.transpose(), self.det.get().copied())
    }

    /// Closed-form determinant for square matrices up to 3x3, cached.
    ///
    /// Non-square matrices report 0: the value is only used to ask whether
    /// a transform collapses a dimension.
    pub fn det(&self) -> Result<f64> {
        self.det_dimension()?;
        if let Some(&d) = self.det.get() {
            return Ok(d);
        }
        let d = self.compute_det()?;
        Ok(*self.det.get_or_init(|| d))
    }

    pub fn is_det_cached(&self) -> bool {
        self.det.get().is_some()
    }

    /// Square matrices of size 0 or above 3 have no supported determinant.
    fn det_dimension(&self) -> Result<()> {
        match self.size() {
            (n, m) if n == m && !(1..=3).contains(&n) => Err(LinalgError::UnsupportedDimension {
                operation: "determinant",
                dimension: n,
            }),
            _ => Ok(()),
        }
    }

    fn compute_det(&self) -> Result<f64> {
        if !self.is_square() {
            return Ok(0.0);
        }
        let v = &self.values;
        match v.nrows() {
            1 => Ok(v[(0, 0)]),
            2 => Ok(v[(0, 0)] * v[(1, 1)] - v[(0, 1)] * v[(1, 0)]),
            3 => Ok(v[(0, 0)] * (v[(1, 1)] * v[(2, 2)] - v[(1, 2)] * v[(2, 1)])
                - v[(0, 1)] * (v[(1, 0)] * v[(2, 2)] - v[(1, 2)] * v[(2, 0)])
                + v[(0, 2)] * (v[(1, 0)] * v[(2, 1)] - v[(1, 1)] * v[(2, 0)])),
            n => Err(LinalgError::UnsupportedDimension {
                operation: "determinant",
                dimension: n,
            }),
        }
    }
}

impl From<DMatrix<f64>> for Matrix {
    fn from(values: DMatrix<f64>) -> Self {
        Self {
            values,
            det: OnceCell::new(),
        }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

//! Ready-made functions to find roots of.
//! Handy for trying the solver out, and used throughout the tests.

use faer::{Col, Mat};

use crate::{Function, Jacobian, Point, Result, jacobian::check_dim};

/// A polynomial in one variable, coefficients highest degree first.
///
/// `Polynomial::new(vec![1.0, 2.0, 3.0])` is x² + 2x + 3.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// A polynomial with these coefficients, highest degree first.
    pub fn new(coeffs: Vec<f64>) -> Self {
        Self { coeffs }
    }

    /// The coefficients, highest degree first.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// The derivative, as another polynomial.
    pub fn derivative(&self) -> Self {
        let degree = self.coeffs.len().saturating_sub(1);
        let coeffs = self
            .coeffs
            .iter()
            .take(degree)
            .enumerate()
            .map(|(i, c)| c * (degree - i) as f64)
            .collect();
        Self { coeffs }
    }

    /// Horner's method. The empty polynomial is 0 everywhere.
    pub fn eval(&self, x: f64) -> f64 {
        self.coeffs.iter().fold(0.0, |acc, c| acc * x + c)
    }
}

impl std::fmt::Display for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let coeffs = self
            .coeffs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Polynomial({coeffs})")
    }
}

impl Function<f64> for Polynomial {
    fn evaluate(&self, x: &f64) -> f64 {
        self.eval(*x)
    }
}

impl Jacobian<f64> for Polynomial {
    fn jacobian(&self, x: &f64) -> f64 {
        self.derivative().eval(*x)
    }
}

/// The scalar line f(x) = slope * x + intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear1D {
    /// Multiplies x.
    pub slope: f64,
    /// Added on at the end.
    pub intercept: f64,
}

impl Linear1D {
    /// f(x) = slope * x + intercept
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }
}

impl Function<f64> for Linear1D {
    fn evaluate(&self, x: &f64) -> f64 {
        self.slope * x + self.intercept
    }
}

impl Jacobian<f64> for Linear1D {
    fn jacobian(&self, _x: &f64) -> f64 {
        self.slope
    }
}

/// The affine map f(x) = A·x + b, where A is n×n.
#[derive(Debug, Clone)]
pub struct LinearMap {
    a: Mat<f64>,
    b: Vec<f64>,
}

impl LinearMap {
    /// f(x) = A·x + b.
    ///
    /// Fails with [`crate::Error::DimensionMismatch`] unless A is square and b has one
    /// entry per row of A.
    pub fn new(a: Mat<f64>, b: Col<f64>) -> Result<Self> {
        check_dim(a.nrows(), a.ncols())?;
        check_dim(a.nrows(), b.nrows())?;
        Ok(Self {
            a,
            b: b.as_ref().iter().copied().collect(),
        })
    }

    /// f(x) = A·x.
    pub fn homogeneous(a: Mat<f64>) -> Result<Self> {
        let b = Col::zeros(a.nrows());
        Self::new(a, b)
    }

    fn apply(&self, x: &[f64]) -> Vec<f64> {
        (0..self.a.nrows())
            .map(|row| {
                x.iter()
                    .enumerate()
                    .fold(self.b[row], |acc, (col, xi)| acc + self.a[(row, col)] * xi)
            })
            .collect()
    }
}

impl<P: Point<Jacobian = Mat<f64>>> Function<P> for LinearMap {
    fn evaluate(&self, x: &P) -> P {
        P::from_components(&self.apply(&x.components()))
    }
}

impl<P: Point<Jacobian = Mat<f64>>> Jacobian<P> for LinearMap {
    fn jacobian(&self, _x: &P) -> Mat<f64> {
        self.a.clone()
    }
}

/// The nonlinear map (x, y, z) ↦ (x·y·z, y², x + z).
///
/// Its roots are the line y = 0, x = -z, where the Jacobian is singular.
///
/// # Panics
///
/// Evaluating it, or its Jacobian, at a point with fewer than 3 components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonLinear3D;

impl<P: Point<Jacobian = Mat<f64>>> Function<P> for NonLinear3D {
    fn evaluate(&self, p: &P) -> P {
        let v = p.components();
        let (x, y, z) = (v[0], v[1], v[2]);
        P::from_components(&[x * y * z, y * y, x + z])
    }
}

impl<P: Point<Jacobian = Mat<f64>>> Jacobian<P> for NonLinear3D {
    fn jacobian(&self, p: &P) -> Mat<f64> {
        let v = p.components();
        let (x, y, z) = (v[0], v[1], v[2]);
        let rows = [[y * z, x * z, x * y], [0.0, 2.0 * y, 0.0], [1.0, 0.0, 1.0]];
        Mat::from_fn(3, 3, |i, j| rows[i][j])
    }
}

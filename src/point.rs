use faer::{Col, Mat};

/// A point in the domain (and range) of a function whose root we're finding.
///
/// Scalars are the 1-dimensional case. Vectors are dense columns of reals.
/// Every implementation names the type its Jacobian is returned as,
/// so scalar functions get scalar derivatives and vector functions get matrices.
pub trait Point: Clone + std::fmt::Debug {
    /// Df(x) for functions over this point type.
    type Jacobian: Clone + std::fmt::Debug;

    /// How many components this point has.
    fn dim(&self) -> usize;

    /// Copy the components out, in order.
    fn components(&self) -> Vec<f64>;

    /// Build a point from its components.
    /// Callers must pass exactly as many components as the point type expects.
    ///
    /// # Panics
    ///
    /// Fixed-size points may panic on the wrong number of components.
    /// `f64` panics unless given exactly one value.
    fn from_components(values: &[f64]) -> Self;

    /// View a Jacobian as a dense matrix.
    fn jacobian_to_mat(jacobian: &Self::Jacobian) -> Mat<f64>;

    /// Convert a dense matrix into this point type's Jacobian.
    fn jacobian_from_mat(mat: Mat<f64>) -> Self::Jacobian;
}

impl Point for f64 {
    type Jacobian = f64;

    fn dim(&self) -> usize {
        1
    }

    fn components(&self) -> Vec<f64> {
        vec![*self]
    }

    fn from_components(values: &[f64]) -> Self {
        assert_eq!(values.len(), 1, "a scalar has exactly one component");
        values[0]
    }

    fn jacobian_to_mat(jacobian: &Self::Jacobian) -> Mat<f64> {
        Mat::from_fn(1, 1, |_, _| *jacobian)
    }

    fn jacobian_from_mat(mat: Mat<f64>) -> Self::Jacobian {
        mat[(0, 0)]
    }
}

impl Point for Vec<f64> {
    type Jacobian = Mat<f64>;

    fn dim(&self) -> usize {
        self.len()
    }

    fn components(&self) -> Vec<f64> {
        self.clone()
    }

    fn from_components(values: &[f64]) -> Self {
        values.to_vec()
    }

    fn jacobian_to_mat(jacobian: &Self::Jacobian) -> Mat<f64> {
        jacobian.clone()
    }

    fn jacobian_from_mat(mat: Mat<f64>) -> Self::Jacobian {
        mat
    }
}

impl Point for Col<f64> {
    type Jacobian = Mat<f64>;

    fn dim(&self) -> usize {
        self.nrows()
    }

    fn components(&self) -> Vec<f64> {
        self.as_ref().iter().copied().collect()
    }

    fn from_components(values: &[f64]) -> Self {
        Col::from_fn(values.len(), |i| values[i])
    }

    fn jacobian_to_mat(jacobian: &Self::Jacobian) -> Mat<f64> {
        jacobian.clone()
    }

    fn jacobian_from_mat(mat: Mat<f64>) -> Self::Jacobian {
        mat
    }
}

/// Euclidean norm of the components. For scalars, the absolute value.
pub(crate) fn norm(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, &v| libm::hypot(acc, v))
}

/// Euclidean distance between two points of the same dimension.
pub(crate) fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .fold(0.0, |acc, (&ai, &bi)| libm::hypot(acc, ai - bi))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_norm_is_abs() {
        assert!((norm(&(-3.5f64).components()) - 3.5).abs() < 1e-15);
    }

    #[test]
    fn vector_norm_is_euclidean() {
        assert!((norm(&[3.0, 4.0]) - 5.0).abs() < 1e-15);
        assert!((distance(&[1.0, 1.0], &[4.0, 5.0]) - 5.0).abs() < 1e-15);
    }

    #[test]
    fn col_components_round_trip() {
        let x = Col::<f64>::from_components(&[1.0, -2.0, 3.0]);
        assert_eq!(x.dim(), 3);
        assert_eq!(x.components(), vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn scalar_jacobian_is_one_by_one() {
        let m = f64::jacobian_to_mat(&7.0);
        assert_eq!((m.nrows(), m.ncols()), (1, 1));
        assert!((f64::jacobian_from_mat(m) - 7.0).abs() < 1e-15);
    }

    #[test]
    #[should_panic(expected = "a scalar has exactly one component")]
    fn scalar_from_no_components_panics() {
        let _ = f64::from_components(&[]);
    }
}

use faer::Mat;

use crate::{Error, Function, Point, Result, point::norm};

/// Default finite-difference step.
pub const DEFAULT_STEP: f64 = 1e-6;

/// Estimate the Jacobian Df(x) with forward finite differences.
///
/// Column `i` is `(f(x + dx * e_i) - f(x)) / dx`, so entry `(j, i)` approximates
/// `∂f_j/∂x_i`. f is evaluated n + 1 times: once at x, then once per coordinate.
/// Any evaluation that isn't finite is reported as [`Error::NonFiniteResidual`].
/// Scalars get a scalar back (the 1×1 case).
pub fn approximate_jacobian<P, F>(f: &F, x: &P, dx: f64) -> Result<P::Jacobian>
where
    P: Point,
    F: Function<P> + ?Sized,
{
    if dx == 0.0 || !dx.is_finite() {
        return Err(Error::InvalidStepSize { dx });
    }
    let n = x.dim();
    if n == 0 {
        return Err(Error::EmptySystem);
    }

    let base = x.components();
    let fx = f.evaluate(x).components();
    check_dim(n, fx.len())?;
    finite_norm(&fx)?;

    let mut jac = Mat::<f64>::zeros(n, n);
    let mut perturbed = base.clone();
    for col in 0..n {
        perturbed[col] = base[col] + dx;
        let f_perturbed = f.evaluate(&P::from_components(&perturbed)).components();
        check_dim(n, f_perturbed.len())?;
        finite_norm(&f_perturbed)?;
        for row in 0..n {
            jac[(row, col)] = (f_perturbed[row] - fx[row]) / dx;
        }
        // Restore before moving to the next coordinate.
        perturbed[col] = base[col];
    }

    Ok(P::jacobian_from_mat(jac))
}

pub(crate) fn check_dim(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, actual })
    }
}

/// The norm of f(x), or an error if any component is NaN or infinite.
pub(crate) fn finite_norm(fx: &[f64]) -> Result<f64> {
    let norm = norm(fx);
    if norm.is_finite() {
        Ok(norm)
    } else {
        tracing::warn!(norm, "Residual is not finite");
        Err(Error::NonFiniteResidual { norm })
    }
}

use faer::{Mat, prelude::Solve};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Function, Jacobian, Point, Result,
    jacobian::{DEFAULT_STEP, approximate_jacobian, check_dim, finite_norm},
    point::distance,
};

/// Settings for a Newton solve.
/// Fixed once the solver is built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stop once ‖f(x)‖ is strictly below this.
    pub tolerance: f64,
    /// How many Newton steps to try before giving up.
    pub max_iterations: usize,
    /// Step used when approximating the Jacobian with finite differences.
    pub finite_difference_step: f64,
    /// If set, abort as soon as an iterate is further than this from the initial guess.
    pub trust_radius: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 20,
            finite_difference_step: DEFAULT_STEP,
            trust_radius: None,
        }
    }
}

impl Config {
    /// Set the residual tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
    /// Set the finite-difference step.
    pub fn with_finite_difference_step(mut self, dx: f64) -> Self {
        self.finite_difference_step = dx;
        self
    }
    /// Only accept iterates within this distance of the initial guess.
    pub fn with_trust_radius(mut self, radius: f64) -> Self {
        self.trust_radius = Some(radius);
        self
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidConfig {
                field: "tolerance",
                value: self.tolerance,
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig {
                field: "max_iterations",
                value: 0.0,
            });
        }
        let dx = self.finite_difference_step;
        if dx == 0.0 || !dx.is_finite() {
            return Err(Error::InvalidStepSize { dx });
        }
        if let Some(radius) = self.trust_radius
            && (radius.is_nan() || radius <= 0.0)
        {
            return Err(Error::InvalidConfig {
                field: "trust_radius",
                value: radius,
            });
        }
        Ok(())
    }
}

/// Where a step got its Jacobian from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JacobianSource {
    /// The user-supplied Df.
    Analytic,
    /// Forward finite differences of f.
    FiniteDifference,
}

impl JacobianSource {
    /// Was the Jacobian approximated rather than computed exactly?
    pub fn used_approximate_jacobian(self) -> bool {
        matches!(self, Self::FiniteDifference)
    }
}

/// A single Newton update.
#[derive(Clone, Debug)]
pub struct Step<P> {
    pub(crate) x: P,
    pub(crate) jacobian_source: JacobianSource,
}

impl<P> Step<P> {
    /// The next iterate.
    pub fn x(&self) -> &P {
        &self.x
    }

    /// Take the next iterate.
    pub fn into_x(self) -> P {
        self.x
    }

    /// Where this step's Jacobian came from.
    pub fn jacobian_source(&self) -> JacobianSource {
        self.jacobian_source
    }

    /// Did this step use a finite-difference Jacobian?
    pub fn used_approximate_jacobian(&self) -> bool {
        self.jacobian_source.used_approximate_jacobian()
    }
}

/// Data from a successful solve.
#[derive(Clone, Debug)]
pub struct Root<P> {
    /// The root.
    pub(crate) x: P,
    /// How many Newton steps were taken. 0 if the initial guess was already a root.
    pub(crate) iterations: usize,
    /// ‖f(x)‖ at the root.
    pub(crate) residual: f64,
    /// Jacobian source of the last step taken.
    pub(crate) jacobian_source: JacobianSource,
}

impl<P> Root<P> {
    /// The root.
    pub fn x(&self) -> &P {
        &self.x
    }

    /// Take the root.
    pub fn into_x(self) -> P {
        self.x
    }

    /// How many Newton steps were taken. 0 if the initial guess was already a root.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// ‖f(x)‖ at the root.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Where the last step's Jacobian came from.
    /// If no step was taken, the solver's configured source.
    pub fn jacobian_source(&self) -> JacobianSource {
        self.jacobian_source
    }

    /// Did the last step use a finite-difference Jacobian?
    pub fn used_approximate_jacobian(&self) -> bool {
        self.jacobian_source.used_approximate_jacobian()
    }
}

/// Finds roots of f(x) = 0 with Newton's method.
///
/// Uses the analytic Jacobian if one was given via [`NewtonSolver::with_jacobian`],
/// otherwise approximates it with forward finite differences at every step.
/// The solver holds no mutable state, so one instance can serve many solves.
pub struct NewtonSolver<'a, P: Point> {
    function: &'a dyn Function<P>,
    jacobian: Option<&'a dyn Jacobian<P>>,
    config: Config,
}

impl<'a, P: Point> NewtonSolver<'a, P> {
    /// A solver for `function` which approximates its Jacobian.
    pub fn new<F: Function<P>>(function: &'a F, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            function,
            jacobian: None,
            config,
        })
    }

    /// Use this analytic Jacobian instead of finite differences.
    pub fn with_jacobian<J: Jacobian<P>>(mut self, jacobian: &'a J) -> Self {
        self.jacobian = Some(jacobian);
        self
    }

    /// The settings this solver was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where this solver gets its Jacobians from.
    pub fn jacobian_source(&self) -> JacobianSource {
        if self.jacobian.is_some() {
            JacobianSource::Analytic
        } else {
            JacobianSource::FiniteDifference
        }
    }

    /// Take a single Newton step from `x`.
    pub fn step(&self, x: &P) -> Result<Step<P>> {
        let fx = self.residual(x)?;
        self.step_from(x, &fx, 0)
    }

    /// Take a single Newton step from `x`, reusing an already-computed `fx` = f(x).
    pub fn step_with_residual(&self, x: &P, fx: &P) -> Result<Step<P>> {
        let fx = fx.components();
        check_dim(x.dim(), fx.len())?;
        self.step_from(x, &fx, 0)
    }

    /// Find a root, starting from the initial guess `x0`.
    ///
    /// Succeeds only once ‖f(x)‖ < tolerance. Fails if the iteration budget runs out,
    /// or an iterate leaves the trust radius around `x0`.
    pub fn solve(&self, x0: P) -> Result<Root<P>> {
        let origin = x0.components();
        if origin.is_empty() {
            return Err(Error::EmptySystem);
        }
        let tolerance = self.config.tolerance;
        let mut jacobian_source = self.jacobian_source();
        let mut x = x0;

        for iteration in 0..self.config.max_iterations {
            let fx = self.residual(&x)?;
            let residual = finite_norm(&fx)?;
            tracing::debug!(iteration, residual, "Newton iteration");

            // Convergence is only ever judged on the residual, never on the step size.
            if residual < tolerance {
                tracing::debug!(iterations = iteration, residual, "Newton converged");
                return Ok(Root {
                    x,
                    iterations: iteration,
                    residual,
                    jacobian_source,
                });
            }

            let step = self.newton_step(&x, &fx, iteration)?;
            jacobian_source = step.jacobian_source;

            // Checked after every step, not just at the end.
            if let Some(radius) = self.config.trust_radius {
                let distance = distance(&step.x, &origin);
                if distance > radius {
                    tracing::warn!(iteration, radius, distance, "Iterate left the trust radius");
                    return Err(Error::TrustRadiusExceeded { radius, distance });
                }
            }
            x = P::from_components(&step.x);
        }

        // The last step might have landed on the root.
        let fx = self.residual(&x)?;
        let residual = finite_norm(&fx)?;
        let iterations = self.config.max_iterations;
        if residual > tolerance {
            tracing::warn!(iterations, residual, "Newton did not converge");
            return Err(Error::DidNotConverge {
                iterations,
                residual,
            });
        }
        tracing::debug!(iterations, residual, "Newton converged on its final step");
        Ok(Root {
            x,
            iterations,
            residual,
            jacobian_source,
        })
    }

    /// Evaluate f(x) and check it has the same dimension as x.
    fn residual(&self, x: &P) -> Result<Vec<f64>> {
        let fx = self.function.evaluate(x).components();
        check_dim(x.dim(), fx.len())?;
        Ok(fx)
    }

    fn step_from(&self, x: &P, fx: &[f64], iteration: usize) -> Result<Step<P>> {
        finite_norm(fx)?;
        let step = self.newton_step(x, fx, iteration)?;
        Ok(Step {
            x: P::from_components(&step.x),
            jacobian_source: step.jacobian_source,
        })
    }

    /// Solve Df(x)·h = f(x) and return x - h.
    fn newton_step(&self, x: &P, fx: &[f64], iteration: usize) -> Result<Step<Vec<f64>>> {
        let n = x.dim();
        if n == 0 {
            return Err(Error::EmptySystem);
        }

        let (jac, jacobian_source) = match self.jacobian {
            Some(df) => {
                let jac = P::jacobian_to_mat(&df.jacobian(x));
                check_dim(n, jac.nrows())?;
                check_dim(n, jac.ncols())?;
                (jac, JacobianSource::Analytic)
            }
            None => {
                let jac = approximate_jacobian(self.function, x, self.config.finite_difference_step)?;
                (P::jacobian_to_mat(&jac), JacobianSource::FiniteDifference)
            }
        };
        tracing::trace!(iteration, ?jacobian_source, "Jacobian evaluated");

        let mut rhs = Mat::<f64>::zeros(n, 1);
        for (i, &fi) in fx.iter().enumerate() {
            rhs[(i, 0)] = fi;
        }
        let h = jac.full_piv_lu().solve(rhs.as_ref());

        let next: Vec<f64> = x
            .components()
            .iter()
            .enumerate()
            .map(|(i, xi)| xi - h[(i, 0)])
            .collect();
        // A singular Df(x) shows up as a division by zero somewhere in the solve.
        if next.iter().any(|v| !v.is_finite()) {
            tracing::warn!(iteration, "Singular Jacobian");
            return Err(Error::SingularJacobian { iteration });
        }

        Ok(Step {
            x: next,
            jacobian_source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!((config.tolerance - 1e-6).abs() < 1e-20);
        assert_eq!(config.max_iterations, 20);
        assert!((config.finite_difference_step - 1e-6).abs() < 1e-20);
        assert_eq!(config.trust_radius, None);
        config.validate().unwrap();
    }

    #[test]
    fn config_from_json() {
        let config: Config =
            serde_json::from_str(r#"{"tolerance": 1e-10, "trust_radius": 2.5}"#).unwrap();
        assert_eq!(
            config,
            Config::default()
                .with_tolerance(1e-10)
                .with_trust_radius(2.5)
        );
    }

    #[test]
    fn rejects_bad_config() {
        let f = |x: &f64| *x;
        let bad = [
            (
                Config::default().with_tolerance(0.0),
                Error::InvalidConfig {
                    field: "tolerance",
                    value: 0.0,
                },
            ),
            (
                Config::default().with_max_iterations(0),
                Error::InvalidConfig {
                    field: "max_iterations",
                    value: 0.0,
                },
            ),
            (
                Config::default().with_finite_difference_step(0.0),
                Error::InvalidStepSize { dx: 0.0 },
            ),
            (
                Config::default().with_trust_radius(-1.0),
                Error::InvalidConfig {
                    field: "trust_radius",
                    value: -1.0,
                },
            ),
        ];
        for (config, expected) in bad {
            let err = NewtonSolver::new(&f, config).err().unwrap();
            assert_eq!(err, expected);
        }
    }

    #[test]
    fn jacobian_source_follows_construction() {
        let f = |x: &f64| 3.0 * x + 6.0;
        let df = |_x: &f64| 3.0;
        let approx = NewtonSolver::new(&f, Config::default()).unwrap();
        assert_eq!(approx.jacobian_source(), JacobianSource::FiniteDifference);
        let exact = NewtonSolver::new(&f, Config::default())
            .unwrap()
            .with_jacobian(&df);
        assert_eq!(exact.jacobian_source(), JacobianSource::Analytic);
    }

    #[test]
    fn step_with_residual_matches_step() {
        let f = |x: &f64| x * x - 2.0;
        let solver = NewtonSolver::new(&f, Config::default()).unwrap();
        let a = solver.step(&1.5).unwrap().into_x();
        let b = solver.step_with_residual(&1.5, &0.25).unwrap().into_x();
        assert!((a - b).abs() < 1e-15);
    }

    #[test]
    fn analytic_jacobian_of_wrong_shape() {
        let f = |x: &Vec<f64>| x.clone();
        let df = |_x: &Vec<f64>| Mat::<f64>::zeros(3, 2);
        let solver = NewtonSolver::new(&f, Config::default())
            .unwrap()
            .with_jacobian(&df);
        let err = solver.step(&vec![1.0, 1.0]).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn step_reports_non_finite_residual() {
        let f = |x: &f64| if *x < 0.0 { f64::NAN } else { *x };
        let solver = NewtonSolver::new(&f, Config::default()).unwrap();
        let err = solver.step(&-1.0).unwrap_err();
        assert!(matches!(err, Error::NonFiniteResidual { .. }), "got {err:?}");
    }

    #[test]
    fn step_with_residual_reports_non_finite_residual() {
        let f = |x: &f64| x * x - 2.0;
        let df = |x: &f64| 2.0 * x;
        let solver = NewtonSolver::new(&f, Config::default())
            .unwrap()
            .with_jacobian(&df);
        let err = solver.step_with_residual(&1.5, &f64::INFINITY).unwrap_err();
        assert_eq!(
            err,
            Error::NonFiniteResidual {
                norm: f64::INFINITY
            }
        );
    }
}

//! Newton's method for roots of f(x) = 0.
//! Works on scalars and dense vectors, with either an analytic Jacobian
//! or one approximated by forward finite differences.
//!
//! ```
//! use newton_fd::{Config, NewtonSolver};
//!
//! let f = |x: &f64| 3.0 * x + 6.0;
//! let solver = NewtonSolver::new(&f, Config::default().with_tolerance(1e-12)).unwrap();
//! let root = solver.solve(2.0).unwrap();
//! assert!((root.x() + 2.0).abs() < 1e-9);
//! ```

pub use crate::error::{Error, Result};
pub use crate::function::{Function, Jacobian};
pub use crate::jacobian::{DEFAULT_STEP, approximate_jacobian};
pub use crate::point::Point;
pub use crate::solver::{Config, JacobianSource, NewtonSolver, Root, Step};

/// Errors from root finding.
mod error;
/// The function and Jacobian contracts.
mod function;
/// Sample functions: polynomials, linear maps, a nonlinear 3D map.
pub mod functions;
/// Finite-difference Jacobians.
mod jacobian;
/// Scalars and vectors the solver can iterate over.
mod point;
/// The Newton iteration itself.
mod solver;

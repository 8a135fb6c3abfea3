/// Errors that can stop a Newton root search.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The iteration budget ran out and the residual is still above tolerance.
    /// Consider raising the iterations, or starting closer to the root.
    #[error(
        "Newton's method did not converge after {iterations} iterations (residual norm {residual})"
    )]
    DidNotConverge {
        /// How many Newton steps were taken.
        iterations: usize,
        /// Norm of f(x) at the last iterate.
        residual: f64,
    },
    /// An iterate moved further from the initial guess than the configured trust radius.
    #[error(
        "The approximated root lies {distance} away from the initial guess, outside the trust radius {radius}"
    )]
    TrustRadiusExceeded {
        /// The configured trust radius.
        radius: f64,
        /// Distance between the offending iterate and the initial guess.
        distance: f64,
    },
    /// The Jacobian could not be inverted, so no Newton step exists.
    #[error("The Jacobian is singular at iteration {iteration}, cannot take a Newton step")]
    SingularJacobian {
        /// Which iteration (0-based) hit the singular Jacobian.
        iteration: usize,
    },
    /// The finite-difference step must be a non-zero, finite number.
    #[error("Finite-difference step must be non-zero and finite, got {dx}")]
    InvalidStepSize {
        /// The step that was given.
        dx: f64,
    },
    /// f(x) or Df(x) had a different dimension to x.
    #[error("Expected a value of dimension {expected}, but got dimension {actual}")]
    DimensionMismatch {
        /// Dimension of x.
        expected: usize,
        /// Dimension that was actually produced.
        actual: usize,
    },
    /// x had no components at all.
    #[error("Cannot find the root of a zero-dimensional system")]
    EmptySystem,
    /// f(x) evaluated to NaN or infinity.
    #[error("The residual norm is not finite ({norm})")]
    NonFiniteResidual {
        /// The offending norm.
        norm: f64,
    },
    /// A configuration field is out of range.
    #[error("Invalid solver configuration: {field} cannot be {value}")]
    InvalidConfig {
        /// Name of the configuration field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_numbers() {
        let e = Error::TrustRadiusExceeded {
            radius: 1.0,
            distance: 2.5,
        };
        assert_eq!(
            e.to_string(),
            "The approximated root lies 2.5 away from the initial guess, outside the trust radius 1"
        );
        let e = Error::DidNotConverge {
            iterations: 10,
            residual: 0.25,
        };
        assert!(e.to_string().contains("after 10 iterations"));
    }
}

use crate::Point;

/// A function f whose roots we want to find.
/// Maps a point to a point of the same dimension.
///
/// Implemented for any `Fn(&P) -> P`, so closures work directly.
pub trait Function<P: Point> {
    /// Evaluate f(x).
    fn evaluate(&self, x: &P) -> P;
}

impl<P, F> Function<P> for F
where
    P: Point,
    F: Fn(&P) -> P,
{
    fn evaluate(&self, x: &P) -> P {
        self(x)
    }
}

/// An analytic Jacobian Df for some [`Function`].
///
/// Implemented for any `Fn(&P) -> P::Jacobian`.
pub trait Jacobian<P: Point> {
    /// Evaluate Df(x).
    fn jacobian(&self, x: &P) -> P::Jacobian;
}

impl<P, F> Jacobian<P> for F
where
    P: Point,
    F: Fn(&P) -> P::Jacobian,
{
    fn jacobian(&self, x: &P) -> P::Jacobian {
        self(x)
    }
}

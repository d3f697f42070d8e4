//! Error types for the qdwell-roots crate.

/// Error type for all fallible operations in the qdwell-roots crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RootError {
    /// Returned when a bracket is not a finite interval with `lower < upper`.
    #[error("invalid bracket [{lower}, {upper}]: bounds must be finite with lower < upper")]
    InvalidBracket {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },

    /// Returned when the relative tolerance is not finite and positive.
    #[error("tolerance must be finite and positive, got {tolerance}")]
    InvalidTolerance {
        /// The invalid tolerance.
        tolerance: f64,
    },

    /// Returned when the iteration budget is zero.
    #[error("max_iter must be >= 1, got {max_iter}")]
    InvalidMaxIter {
        /// The invalid iteration budget.
        max_iter: usize,
    },

    /// Returned when the function has the same sign at both bracket ends.
    #[error("no sign change in [{lower}, {upper}]: f(lower) = {f_lower}, f(upper) = {f_upper}")]
    NoSignChange {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
        /// Function value at the lower bound.
        f_lower: f64,
        /// Function value at the upper bound.
        f_upper: f64,
    },

    /// Returned when bisection does not reach the tolerance in time.
    #[error("bisection in [{lower}, {upper}] did not converge after {max_iter} iterations")]
    MaxIterations {
        /// Lower bound of the last bracket.
        lower: f64,
        /// Upper bound of the last bracket.
        upper: f64,
        /// Iteration budget.
        max_iter: usize,
    },

    /// Returned when the interval does not hold the expected number of roots.
    #[error("interval [{lower}, {upper}] holds {found} roots, expected {expected}")]
    BracketCountMismatch {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
        /// Number of roots required.
        expected: usize,
        /// Number of roots counted.
        found: usize,
    },

    /// Returned when splitting stops before a sub-interval isolates one root.
    #[error("could not isolate the {roots} roots in [{lower}, {upper}]")]
    UnresolvedBracket {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
        /// Roots still sharing the interval.
        roots: usize,
    },

    /// Returned when the function evaluates to NaN or infinity.
    #[error("function is not finite at x = {x}")]
    NonFinite {
        /// Abscissa.
        x: f64,
    },
}

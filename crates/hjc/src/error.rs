//! Error types for the qdwell-hjc crate.

use qdwell_qmatrix::QMatrixError;
use qdwell_roots::RootError;

/// Error type for all fallible operations in the qdwell-hjc crate.
///
/// Numerical failures are never replaced by placeholder values: a wrong
/// pdf silently biases any likelihood built on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HjcError {
    /// Mechanism validation or linear algebra failure.
    #[error(transparent)]
    QMatrix(#[from] QMatrixError),

    /// Root search configuration or bracketing failure.
    #[error(transparent)]
    Root(#[from] RootError),

    /// Returned when bisection of one isolated asymptotic root fails.
    #[error("asymptotic root {index} could not be located: {source}")]
    RootSearch {
        /// 0-indexed root, in ascending order.
        index: usize,
        /// Underlying bisection error.
        source: RootError,
    },

    /// Returned when `H(s)` overflows because `-s·tres` is too large for the
    /// dead-time integral.
    #[error("H(s) is not finite at s = {s} with tres = {tres}; raise the lower end of the root search interval")]
    NonFiniteH {
        /// Abscissa (s⁻¹).
        s: f64,
        /// Time resolution (s).
        tres: f64,
    },

    /// Returned when the whole root search interval lies where `H(s)`
    /// overflows.
    #[error("root search interval [{lower}, {upper}] lies below s = {limit}, where H(s) overflows at tres = {tres}")]
    IntervalOverflow {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
        /// Lowest abscissa at which `H(s)` stays finite.
        limit: f64,
        /// Time resolution (s).
        tres: f64,
    },

    /// Returned when the time resolution is not finite and positive.
    #[error("time resolution must be finite and positive, got {tres}")]
    InvalidResolution {
        /// The invalid resolution (s).
        tres: f64,
    },

    /// Returned when an elapsed time is negative or not finite.
    #[error("time must be finite and >= 0, got {t}")]
    InvalidTime {
        /// The invalid time (s).
        t: f64,
    },

    /// Returned when a sub-generator has a non-positive decay rate.
    #[error("{what} is not stable: eigenvalue {eigenvalue} is not positive")]
    UnstableSubGenerator {
        /// Description of the matrix.
        what: String,
        /// The offending eigenvalue of the negated sub-generator.
        eigenvalue: f64,
    },

    /// Returned when a negated generator block has complex eigenvalues.
    #[error("{what} has complex eigenvalues: a cycle in the mechanism breaks microscopic reversibility, so the pdf is not a sum of real exponentials")]
    ComplexSpectrum {
        /// Description of the matrix.
        what: String,
    },

    /// Returned when a ratio has a vanishing denominator.
    #[error("denominator of {what} is too close to zero ({value:e})")]
    NearZeroDenominator {
        /// What was being computed.
        what: String,
        /// The denominator.
        value: f64,
    },

    /// Returned when two eigenvalues of -Q coincide, which the exact pdf
    /// coefficients cannot handle.
    #[error("eigenvalues {i} and {j} of -Q coincide ({value}); exact pdf needs distinct eigenvalues")]
    DegenerateEigenvalues {
        /// First index.
        i: usize,
        /// Second index.
        j: usize,
        /// The shared eigenvalue.
        value: f64,
    },

    /// Returned when a pdf table grid is invalid.
    #[error("invalid time grid: {reason}")]
    InvalidGrid {
        /// Description of the problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_resolution() {
        let e = HjcError::InvalidResolution { tres: -1e-4 };
        assert_eq!(
            e.to_string(),
            "time resolution must be finite and positive, got -0.0001"
        );
    }

    #[test]
    fn error_root_search_includes_source() {
        let e = HjcError::RootSearch {
            index: 1,
            source: RootError::MaxIterations {
                lower: -2.0,
                upper: -1.0,
                max_iter: 10,
            },
        };
        assert_eq!(
            e.to_string(),
            "asymptotic root 1 could not be located: bisection in [-2, -1] did not converge after 10 iterations"
        );
    }

    #[test]
    fn error_unstable() {
        let e = HjcError::UnstableSubGenerator {
            what: "-QAA".to_string(),
            eigenvalue: -0.5,
        };
        assert_eq!(e.to_string(), "-QAA is not stable: eigenvalue -0.5 is not positive");
    }

    #[test]
    fn error_complex_spectrum() {
        let e = HjcError::ComplexSpectrum {
            what: "-QAA".to_string(),
        };
        assert!(e.to_string().starts_with("-QAA has complex eigenvalues: a cycle"));
    }

    #[test]
    fn error_near_zero() {
        let e = HjcError::NearZeroDenominator {
            what: "area of root 0".to_string(),
            value: 1e-300,
        };
        assert_eq!(
            e.to_string(),
            "denominator of area of root 0 is too close to zero (1e-300)"
        );
    }

    #[test]
    fn error_non_finite_h_names_s_and_tres() {
        let e = HjcError::NonFiniteH { s: -1e9, tres: 1e-4 };
        assert_eq!(
            e.to_string(),
            "H(s) is not finite at s = -1000000000 with tres = 0.0001; raise the lower end of the root search interval"
        );
    }

    #[test]
    fn error_interval_overflow() {
        let e = HjcError::IntervalOverflow {
            lower: -1e12,
            upper: -1e11,
            limit: -1e6,
            tres: 1e-4,
        };
        assert_eq!(
            e.to_string(),
            "root search interval [-1000000000000, -100000000000] lies below s = -1000000, where H(s) overflows at tres = 0.0001"
        );
    }

    #[test]
    fn error_wraps_qmatrix_transparently() {
        let inner = QMatrixError::Singular {
            what: "-QFF".to_string(),
        };
        let e: HjcError = inner.into();
        assert_eq!(e.to_string(), "-QFF is singular");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: std::error::Error + Send + Sync>() {}
        assert_impl::<HjcError>();
    }
}

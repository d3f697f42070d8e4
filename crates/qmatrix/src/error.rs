//! Error types for the qdwell-qmatrix crate.

/// Error type for all fallible operations in the qdwell-qmatrix crate.
///
/// Covers Q-matrix validation failures and numerical failures of the
/// linear algebra kernel (singular blocks, non-real spectra).
#[derive(Debug, Clone, thiserror::Error)]
pub enum QMatrixError {
    /// Returned when the Q-matrix is not square.
    #[error("Q-matrix is not square: {rows} rows, {cols} columns")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// Returned when the mechanism has fewer than two states.
    #[error("mechanism needs at least 2 states, got {k}")]
    TooFewStates {
        /// Number of states.
        k: usize,
    },

    /// Returned when the open/shut partition does not cover the states.
    #[error("subset sizes do not match: kA={k_a} + kF={k_f} != k={k}")]
    SubsetMismatch {
        /// Number of open states.
        k_a: usize,
        /// Number of shut states.
        k_f: usize,
        /// Total number of states.
        k: usize,
    },

    /// Returned when a state subset that must be non-empty is empty.
    #[error("state subset {name} is empty")]
    EmptySubset {
        /// Subset label.
        name: &'static str,
    },

    /// Returned when the burst subset B does not fit in the shut subset F.
    #[error("burst subset kB={k_b} exceeds the number of shut states kF={k_f}")]
    BurstSubsetTooLarge {
        /// Requested size of subset B.
        k_b: usize,
        /// Number of shut states.
        k_f: usize,
    },

    /// Returned when a rate is NaN or infinite.
    #[error("rate q[{row}][{col}] is not finite")]
    NonFiniteRate {
        /// 0-indexed row.
        row: usize,
        /// 0-indexed column.
        col: usize,
    },

    /// Returned when an off-diagonal rate is negative.
    #[error("rate q[{row}][{col}] = {value} is negative")]
    NegativeRate {
        /// 0-indexed row.
        row: usize,
        /// 0-indexed column.
        col: usize,
        /// The offending value.
        value: f64,
    },

    /// Returned when a row of the Q-matrix does not sum to zero.
    #[error("row {row} of the Q-matrix sums to {sum}, expected 0")]
    NonZeroRowSum {
        /// 0-indexed row.
        row: usize,
        /// The row sum.
        sum: f64,
    },

    /// Returned when the number of state names does not match the states.
    #[error("expected {expected} state names, got {got}")]
    StateNameCount {
        /// Number of states.
        expected: usize,
        /// Number of names supplied.
        got: usize,
    },

    /// Returned when a state index is out of range.
    #[error("state {state} is out of range for a {k}-state mechanism")]
    InvalidState {
        /// 0-indexed state.
        state: usize,
        /// Number of states.
        k: usize,
    },

    /// Returned when a state range is empty or extends past the last state.
    #[error("state subset {start}..{end} is invalid for a {k}-state mechanism")]
    InvalidSubset {
        /// First state (inclusive).
        start: usize,
        /// Last state (exclusive).
        end: usize,
        /// Number of states.
        k: usize,
    },

    /// Returned when no rate leaves a state subset.
    #[error("state subset {start}..{end} is absorbing (no outward rate)")]
    AbsorbingSubset {
        /// First state (inclusive).
        start: usize,
        /// Last state (exclusive).
        end: usize,
    },

    /// Returned when a matrix that must be inverted is singular.
    #[error("{what} is singular")]
    Singular {
        /// Description of the matrix.
        what: String,
    },

    /// Returned when a matrix has complex eigenvalues.
    #[error("{what} has complex eigenvalues")]
    ComplexEigenvalues {
        /// Description of the matrix.
        what: String,
    },

    /// Returned when the eigenvalue iteration does not converge.
    #[error("eigen-decomposition of {what} did not converge")]
    EigenDecompositionFailed {
        /// Description of the matrix.
        what: String,
    },

    /// Returned when a sample mechanism parameter is invalid.
    #[error("invalid parameter {name}: {value} (must be finite and > 0)")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_not_square() {
        let e = QMatrixError::NotSquare { rows: 3, cols: 4 };
        assert_eq!(e.to_string(), "Q-matrix is not square: 3 rows, 4 columns");
    }

    #[test]
    fn error_subset_mismatch() {
        let e = QMatrixError::SubsetMismatch { k_a: 2, k_f: 2, k: 5 };
        assert_eq!(e.to_string(), "subset sizes do not match: kA=2 + kF=2 != k=5");
    }

    #[test]
    fn error_negative_rate() {
        let e = QMatrixError::NegativeRate {
            row: 1,
            col: 2,
            value: -3.5,
        };
        assert_eq!(e.to_string(), "rate q[1][2] = -3.5 is negative");
    }

    #[test]
    fn error_non_zero_row_sum() {
        let e = QMatrixError::NonZeroRowSum { row: 0, sum: 0.5 };
        assert_eq!(e.to_string(), "row 0 of the Q-matrix sums to 0.5, expected 0");
    }

    #[test]
    fn error_absorbing_subset() {
        let e = QMatrixError::AbsorbingSubset { start: 0, end: 2 };
        assert_eq!(e.to_string(), "state subset 0..2 is absorbing (no outward rate)");
    }

    #[test]
    fn error_singular() {
        let e = QMatrixError::Singular {
            what: "-QAA".to_string(),
        };
        assert_eq!(e.to_string(), "-QAA is singular");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<QMatrixError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<QMatrixError>();
    }
}

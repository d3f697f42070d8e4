//! Immutable Q-matrix snapshot with its open/shut partition.

use std::ops::Range;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::QMatrixError;
use crate::linalg;

/// Relative tolerance for the zero row-sum check, scaled by `max|q|`.
const ROW_SUM_TOL: f64 = 1e-9;

/// A validated generator matrix partitioned into open (A) and shut (F)
/// states.
///
/// States `0..k_a` are open and `k_a..k` are shut. The shut states are
/// further split into the burst subset B (`k_a..k_a + k_b`, short-lived
/// shut states within bursts) and the gap subset C (the rest). The split
/// only affects occupancy reporting; every dwell-time calculation uses the
/// A/F partition.
///
/// # Example
///
/// ```
/// use qdwell_qmatrix::Mechanism;
///
/// let mec = Mechanism::from_rows(&[vec![-1000.0, 1000.0], vec![2000.0, -2000.0]], 1, 1)?;
/// assert_eq!(mec.k(), 2);
/// assert_eq!(mec.qaa()[(0, 0)], -1000.0);
/// # Ok::<(), qdwell_qmatrix::QMatrixError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Mechanism {
    q: DMatrix<f64>,
    k_a: usize,
    k_b: usize,
    state_names: Vec<String>,
}

impl Mechanism {
    /// Validates `q` and wraps it with `k_a` open and `k_f` shut states.
    ///
    /// All shut states are placed in the burst subset B; use
    /// [`with_burst_subsets`](Self::with_burst_subsets) to split them.
    ///
    /// # Errors
    ///
    /// Returns a [`QMatrixError`] if `q` is not square, has fewer than two
    /// states, contains non-finite or negative off-diagonal rates, has a row
    /// that does not sum to zero, or if the subsets are empty or do not
    /// cover all states.
    pub fn new(q: DMatrix<f64>, k_a: usize, k_f: usize) -> Result<Self, QMatrixError> {
        let (rows, cols) = q.shape();
        if rows != cols {
            return Err(QMatrixError::NotSquare { rows, cols });
        }
        let k = rows;
        if k < 2 {
            return Err(QMatrixError::TooFewStates { k });
        }
        if k_a + k_f != k {
            return Err(QMatrixError::SubsetMismatch { k_a, k_f, k });
        }
        if k_a == 0 {
            return Err(QMatrixError::EmptySubset { name: "A" });
        }
        if k_f == 0 {
            return Err(QMatrixError::EmptySubset { name: "F" });
        }
        validate_generator(&q)?;

        debug!(k, k_a, k_f, "mechanism validated");
        Ok(Self {
            q,
            k_a,
            k_b: k_f,
            state_names: (1..=k).map(|i| format!("s{i}")).collect(),
        })
    }

    /// Builds a mechanism from row vectors.
    ///
    /// # Errors
    ///
    /// Returns [`QMatrixError::NotSquare`] if the rows are ragged or their
    /// count differs from their length, plus every error of [`new`](Self::new).
    pub fn from_rows(rows: &[Vec<f64>], k_a: usize, k_f: usize) -> Result<Self, QMatrixError> {
        let n = rows.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != n) {
            return Err(QMatrixError::NotSquare {
                rows: n,
                cols: bad.len(),
            });
        }
        let q = DMatrix::from_fn(n, n, |i, j| rows[i][j]);
        Self::new(q, k_a, k_f)
    }

    /// Splits the shut states into `k_b` burst states followed by
    /// `k_f - k_b` gap states.
    pub fn with_burst_subsets(mut self, k_b: usize) -> Result<Self, QMatrixError> {
        let k_f = self.k_f();
        if k_b > k_f {
            return Err(QMatrixError::BurstSubsetTooLarge { k_b, k_f });
        }
        self.k_b = k_b;
        Ok(self)
    }

    /// Attaches display names, one per state.
    pub fn with_state_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, QMatrixError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() != self.k() {
            return Err(QMatrixError::StateNameCount {
                expected: self.k(),
                got: names.len(),
            });
        }
        self.state_names = names;
        Ok(self)
    }

    // --- Accessors ---

    /// Returns the generator matrix.
    pub fn q(&self) -> &DMatrix<f64> {
        &self.q
    }

    /// Returns the total number of states.
    pub fn k(&self) -> usize {
        self.q.nrows()
    }

    /// Returns the number of open states.
    pub fn k_a(&self) -> usize {
        self.k_a
    }

    /// Returns the number of shut states.
    pub fn k_f(&self) -> usize {
        self.k() - self.k_a
    }

    /// Returns the number of shut states in the burst subset B.
    pub fn k_b(&self) -> usize {
        self.k_b
    }

    /// Returns the number of shut states in the gap subset C.
    pub fn k_c(&self) -> usize {
        self.k_f() - self.k_b
    }

    /// Returns the state display names.
    pub fn state_names(&self) -> &[String] {
        &self.state_names
    }

    /// Returns `true` if `state` is open.
    pub fn is_open(&self, state: usize) -> bool {
        state < self.k_a
    }

    /// Open states.
    pub fn open_states(&self) -> Range<usize> {
        0..self.k_a
    }

    /// Shut states.
    pub fn shut_states(&self) -> Range<usize> {
        self.k_a..self.k()
    }

    /// Burst shut states (subset B).
    pub fn burst_states(&self) -> Range<usize> {
        self.k_a..self.k_a + self.k_b
    }

    /// Gap shut states (subset C).
    pub fn gap_states(&self) -> Range<usize> {
        self.k_a + self.k_b..self.k()
    }

    // --- Blocks ---

    /// Copies the block `q[rows, cols]`.
    pub fn block(&self, rows: Range<usize>, cols: Range<usize>) -> DMatrix<f64> {
        self.q
            .view((rows.start, cols.start), (rows.len(), cols.len()))
            .into_owned()
    }

    /// Open to open rates.
    pub fn qaa(&self) -> DMatrix<f64> {
        self.block(self.open_states(), self.open_states())
    }

    /// Open to shut rates.
    pub fn qaf(&self) -> DMatrix<f64> {
        self.block(self.open_states(), self.shut_states())
    }

    /// Shut to open rates.
    pub fn qfa(&self) -> DMatrix<f64> {
        self.block(self.shut_states(), self.open_states())
    }

    /// Shut to shut rates.
    pub fn qff(&self) -> DMatrix<f64> {
        self.block(self.shut_states(), self.shut_states())
    }

    /// Checks that `range` is a non-empty range of states.
    pub fn check_subset(&self, range: &Range<usize>) -> Result<(), QMatrixError> {
        if range.is_empty() || range.end > self.k() {
            return Err(QMatrixError::InvalidSubset {
                start: range.start,
                end: range.end,
                k: self.k(),
            });
        }
        Ok(())
    }

    /// Checks that `state` is a valid state index.
    pub fn check_state(&self, state: usize) -> Result<(), QMatrixError> {
        if state >= self.k() {
            return Err(QMatrixError::InvalidState { state, k: self.k() });
        }
        Ok(())
    }

    /// Computes the equilibrium occupancies `p` with `p·Q = 0`, `Σp = 1`.
    pub fn equilibrium(&self) -> Result<DVector<f64>, QMatrixError> {
        linalg::stationary(&self.q)
    }
}

fn validate_generator(q: &DMatrix<f64>) -> Result<(), QMatrixError> {
    let k = q.nrows();
    for row in 0..k {
        for col in 0..k {
            let value = q[(row, col)];
            if !value.is_finite() {
                return Err(QMatrixError::NonFiniteRate { row, col });
            }
            if row != col && value < 0.0 {
                return Err(QMatrixError::NegativeRate { row, col, value });
            }
        }
    }

    let tol = ROW_SUM_TOL * q.amax().max(1.0);
    for (row, r) in q.row_iter().enumerate() {
        let sum = r.sum();
        if sum.abs() > tol {
            return Err(QMatrixError::NonZeroRowSum { row, sum });
        }
    }
    Ok(())
}

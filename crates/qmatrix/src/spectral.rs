//! Spectral decomposition into (eigenvalue, projector) pairs.
//!
//! For a diagonalizable matrix `M` with real eigenvalues `λ_i`, right
//! eigenvectors `v_i` (columns of `V`) and left eigenvectors `w_i` (rows of
//! `V⁻¹`), the projectors `A_i = v_i·w_i` satisfy
//!
//! ```text
//! M = Σ λ_i A_i        Σ A_i = I        f(M) = Σ f(λ_i) A_i
//! ```
//!
//! This is the representation used for every matrix function in the
//! dwell-time calculations (`exp(-M t)`, resolvents, dead-time terms).

use nalgebra::{DMatrix, Schur};
use tracing::trace;

use crate::error::QMatrixError;

/// Maximum Schur iterations before the decomposition is reported as failed.
const MAX_SCHUR_ITER: usize = 10_000;

/// Eigenvalues closer than this (relative to the matrix scale) share a
/// null space when eigenvectors are extracted.
const CLUSTER_TOL: f64 = 1e-10;

/// Eigenvalues of a square matrix paired with their spectral projectors.
///
/// Eigenvalues are sorted in ascending order; `projectors()[i]` belongs to
/// `eigenvalues()[i]`.
#[derive(Debug, Clone)]
pub struct SpectralDecomposition {
    eigenvalues: Vec<f64>,
    projectors: Vec<DMatrix<f64>>,
}

impl SpectralDecomposition {
    /// Decomposes `m`.
    ///
    /// `what` names the matrix in error messages (e.g. `"-QAA"`).
    ///
    /// # Errors
    ///
    /// - [`QMatrixError::NotSquare`] if `m` is not square.
    /// - [`QMatrixError::EigenDecompositionFailed`] if the Schur iteration
    ///   does not converge or no eigenvectors can be extracted.
    /// - [`QMatrixError::ComplexEigenvalues`] if the spectrum is not real.
    /// - [`QMatrixError::Singular`] if the eigenvectors are not linearly
    ///   independent (defective matrix).
    pub fn new(m: &DMatrix<f64>, what: &str) -> Result<Self, QMatrixError> {
        let (rows, cols) = m.shape();
        if rows != cols {
            return Err(QMatrixError::NotSquare { rows, cols });
        }
        let n = rows;
        if n == 0 {
            return Ok(Self {
                eigenvalues: Vec::new(),
                projectors: Vec::new(),
            });
        }

        let schur = Schur::try_new(m.clone(), f64::EPSILON, MAX_SCHUR_ITER).ok_or_else(|| {
            QMatrixError::EigenDecompositionFailed {
                what: what.to_string(),
            }
        })?;
        let values = schur
            .eigenvalues()
            .ok_or_else(|| QMatrixError::ComplexEigenvalues {
                what: what.to_string(),
            })?;
        let mut eigenvalues: Vec<f64> = values.iter().copied().collect();
        eigenvalues.sort_by(f64::total_cmp);

        let vectors = right_eigenvectors(m, &eigenvalues, what)?;
        let inverse = vectors.clone().try_inverse().ok_or_else(|| QMatrixError::Singular {
            what: format!("eigenvector matrix of {what}"),
        })?;

        let projectors: Vec<DMatrix<f64>> = (0..n)
            .map(|i| vectors.column(i) * inverse.row(i))
            .collect();

        trace!(what, n, ?eigenvalues, "spectral decomposition");
        Ok(Self {
            eigenvalues,
            projectors,
        })
    }

    /// Returns the eigenvalues in ascending order.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Returns the spectral projectors, one per eigenvalue.
    pub fn projectors(&self) -> &[DMatrix<f64>] {
        &self.projectors
    }

    /// Returns the number of (eigenvalue, projector) pairs.
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Returns `true` for the decomposition of an empty matrix.
    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    /// Iterates over `(eigenvalue, projector)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, &DMatrix<f64>)> {
        self.eigenvalues.iter().copied().zip(self.projectors.iter())
    }

    /// Evaluates the matrix function `Σ f(λ_i) A_i`.
    pub fn apply(&self, f: impl Fn(f64) -> f64) -> DMatrix<f64> {
        let n = self.projectors.first().map_or(0, |a| a.nrows());
        let mut out = DMatrix::zeros(n, n);
        for (lambda, a) in self.pairs() {
            out += a * f(lambda);
        }
        out
    }
}

/// Extracts one right eigenvector per eigenvalue as the null space of
/// `m - λI`, taken from the smallest right singular vectors.
///
/// Numerically equal eigenvalues are handled as a cluster: a cluster of
/// size `c` takes the `c` smallest singular directions of one shifted
/// matrix, so repeated eigenvalues of diagonalizable matrices still give
/// independent vectors.
fn right_eigenvectors(
    m: &DMatrix<f64>,
    eigenvalues: &[f64],
    what: &str,
) -> Result<DMatrix<f64>, QMatrixError> {
    let n = m.nrows();
    let scale = m.amax().max(1.0);
    let identity = DMatrix::<f64>::identity(n, n);
    let mut vectors = DMatrix::zeros(n, n);

    let mut start = 0;
    while start < n {
        let lambda = eigenvalues[start];
        let mut end = start + 1;
        while end < n && (eigenvalues[end] - lambda).abs() <= CLUSTER_TOL * scale {
            end += 1;
        }
        let size = end - start;

        let shifted = m - &identity * lambda;
        let v_t = shifted
            .svd(false, true)
            .v_t
            .ok_or_else(|| QMatrixError::EigenDecompositionFailed {
                what: what.to_string(),
            })?;
        // Singular values are sorted in descending order, so the null
        // space is spanned by the last rows of Vᵀ.
        for offset in 0..size {
            let row = n - size + offset;
            vectors.set_column(start + offset, &v_t.row(row).transpose());
        }
        start = end;
    }
    Ok(vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_state_minus_q() -> DMatrix<f64> {
        DMatrix::from_row_slice(2, 2, &[1000.0, -1000.0, -2000.0, 2000.0])
    }

    #[test]
    fn eigenvalues_sorted_ascending() {
        let s = SpectralDecomposition::new(&two_state_minus_q(), "-Q").unwrap();
        assert_eq!(s.len(), 2);
        assert_relative_eq!(s.eigenvalues()[0], 0.0, epsilon = 1e-9);
        assert_relative_eq!(s.eigenvalues()[1], 3000.0, max_relative = 1e-12);
    }

    #[test]
    fn projectors_sum_to_identity() {
        let m = two_state_minus_q();
        let s = SpectralDecomposition::new(&m, "-Q").unwrap();
        let sum = s.apply(|_| 1.0);
        assert_relative_eq!(sum, DMatrix::identity(2, 2), epsilon = 1e-12);
    }

    #[test]
    fn reconstructs_matrix() {
        let m = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 1.0, 0.0, 1.0, 2.0]);
        let s = SpectralDecomposition::new(&m, "m").unwrap();
        assert_relative_eq!(s.apply(|l| l), m, epsilon = 1e-10);
    }

    #[test]
    fn repeated_eigenvalue_of_diagonal_matrix() {
        let m = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![2.0, 2.0, 5.0]));
        let s = SpectralDecomposition::new(&m, "m").unwrap();
        assert_relative_eq!(s.eigenvalues()[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(s.eigenvalues()[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(s.apply(|_| 1.0), DMatrix::identity(3, 3), epsilon = 1e-12);
        assert_relative_eq!(s.apply(|l| l), m, epsilon = 1e-12);
    }

    #[test]
    fn rotation_has_complex_spectrum() {
        let m = DMatrix::from_row_slice(2, 2, &[0.0, -1.0, 1.0, 0.0]);
        let result = SpectralDecomposition::new(&m, "rotation");
        assert!(matches!(
            result,
            Err(QMatrixError::ComplexEigenvalues { .. })
        ));
    }

    #[test]
    fn rejects_non_square() {
        let m = DMatrix::zeros(2, 3);
        assert!(matches!(
            SpectralDecomposition::new(&m, "m"),
            Err(QMatrixError::NotSquare { .. })
        ));
    }

    #[test]
    fn exponential_matches_pade() {
        let q = DMatrix::from_row_slice(2, 2, &[-1000.0, 1000.0, 2000.0, -2000.0]);
        let s = SpectralDecomposition::new(&(-&q), "-Q").unwrap();
        let t = 2e-4;
        let spectral = s.apply(|l| (-l * t).exp());
        assert_relative_eq!(spectral, crate::linalg::expm(&q, t), epsilon = 1e-12);
    }
}

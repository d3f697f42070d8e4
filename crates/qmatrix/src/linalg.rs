//! Dense linear algebra kernel: matrix exponential, inversion and
//! stationary vectors.

use nalgebra::{DMatrix, DVector, Schur};

use crate::error::QMatrixError;

/// Returns the all-ones column vector of length `n`.
pub fn ones(n: usize) -> DVector<f64> {
    DVector::from_element(n, 1.0)
}

/// Computes `exp(m * t)`.
///
/// Uses nalgebra's Padé scaling-and-squaring exponential.
pub fn expm(m: &DMatrix<f64>, t: f64) -> DMatrix<f64> {
    (m * t).exp()
}

/// Inverts `m`, naming the matrix in the error when it is singular.
pub fn inverse(m: &DMatrix<f64>, what: &str) -> Result<DMatrix<f64>, QMatrixError> {
    let inv = m.clone().try_inverse().ok_or_else(|| QMatrixError::Singular {
        what: what.to_string(),
    })?;
    if inv.iter().any(|x| !x.is_finite()) {
        return Err(QMatrixError::Singular {
            what: what.to_string(),
        });
    }
    Ok(inv)
}

/// Returns the real parts of the eigenvalues of `m`, in no particular order.
///
/// Complex pairs contribute their (shared) real part twice.
pub fn eigenvalue_real_parts(m: &DMatrix<f64>, what: &str) -> Result<Vec<f64>, QMatrixError> {
    let (rows, cols) = m.shape();
    if rows != cols {
        return Err(QMatrixError::NotSquare { rows, cols });
    }
    let schur = Schur::try_new(m.clone(), f64::EPSILON, 10_000).ok_or_else(|| {
        QMatrixError::EigenDecompositionFailed {
            what: what.to_string(),
        }
    })?;
    Ok(schur.complex_eigenvalues().iter().map(|z| z.re).collect())
}

/// Computes the row vector `p` with `p·m = 0` and `p·1 = 1`.
///
/// With `S = [m | 1]` the system `p·S = [0 … 0 | 1]` is solved in the
/// least-squares sense as `p = 1ᵀ·(S·Sᵀ)⁻¹`. For a generator this is the
/// equilibrium occupancy; for `W(s)` at a root it is the left null vector.
///
/// The result is returned as a column vector.
pub fn stationary(m: &DMatrix<f64>) -> Result<DVector<f64>, QMatrixError> {
    let (rows, cols) = m.shape();
    if rows != cols {
        return Err(QMatrixError::NotSquare { rows, cols });
    }
    let n = rows;
    let mut s = DMatrix::zeros(n, n + 1);
    s.view_mut((0, 0), (n, n)).copy_from(m);
    s.column_mut(n).fill(1.0);

    let sst = &s * s.transpose();
    let inv = inverse(&sst, "S·Sᵀ in stationary vector")?;
    Ok(inv.tr_mul(&ones(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ones_has_requested_length() {
        let u = ones(4);
        assert_eq!(u.len(), 4);
        assert!(u.iter().all(|&x| x == 1.0));
    }

    #[test]
    fn expm_of_diagonal() {
        let m = DMatrix::from_row_slice(2, 2, &[-2.0, 0.0, 0.0, -5.0]);
        let e = expm(&m, 0.3);
        assert_relative_eq!(e[(0, 0)], (-0.6f64).exp(), max_relative = 1e-12);
        assert_relative_eq!(e[(1, 1)], (-1.5f64).exp(), max_relative = 1e-12);
        assert_relative_eq!(e[(0, 1)], 0.0, epsilon = 1e-14);
    }

    #[test]
    fn expm_of_generator_is_stochastic() {
        let q = DMatrix::from_row_slice(2, 2, &[-1000.0, 1000.0, 2000.0, -2000.0]);
        let p = expm(&q, 1e-3);
        for i in 0..2 {
            assert_relative_eq!(p.row(i).sum(), 1.0, epsilon = 1e-12);
        }
        // Two-state transition probability: p00(t) = (b + a e^{-(a+b)t}) / (a+b)
        let expected = (2000.0 + 1000.0 * (-3.0f64).exp()) / 3000.0;
        assert_relative_eq!(p[(0, 0)], expected, max_relative = 1e-12);
    }

    #[test]
    fn inverse_rejects_singular() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let result = inverse(&m, "test matrix");
        assert!(matches!(result, Err(QMatrixError::Singular { .. })));
    }

    #[test]
    fn real_parts_of_rotation() {
        let m = DMatrix::from_row_slice(2, 2, &[-1.0, -2.0, 2.0, -1.0]);
        let re = eigenvalue_real_parts(&m, "m").unwrap();
        assert_eq!(re.len(), 2);
        for x in re {
            assert_relative_eq!(x, -1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn real_parts_of_triangular() {
        let m = DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 0.0, -4.0]);
        let mut re = eigenvalue_real_parts(&m, "m").unwrap();
        re.sort_by(f64::total_cmp);
        assert_relative_eq!(re[0], -4.0, max_relative = 1e-12);
        assert_relative_eq!(re[1], 3.0, max_relative = 1e-12);
    }

    #[test]
    fn stationary_two_state() {
        let q = DMatrix::from_row_slice(2, 2, &[-1000.0, 1000.0, 2000.0, -2000.0]);
        let p = stationary(&q).unwrap();
        assert_relative_eq!(p[0], 2.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(p[1], 1.0 / 3.0, max_relative = 1e-12);
    }

    #[test]
    fn stationary_rejects_non_square() {
        let m = DMatrix::zeros(2, 3);
        assert!(matches!(
            stationary(&m),
            Err(QMatrixError::NotSquare { rows: 2, cols: 3 })
        ));
    }
}

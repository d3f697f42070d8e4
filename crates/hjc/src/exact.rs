//! Exact HJC distribution for the first three dead times.
//!
//! Within `[τ, 3τ)` the observed dwell pdf is a finite expression in the
//! spectral projectors `A_i` of `-Q`:
//!
//! ```text
//! f(t) = f0(t - τ)                  τ ≤ t < 2τ
//! f(t) = f0(t - τ) - f1(t - 2τ)     2τ ≤ t < 3τ
//! f0(u) = Σ g00_i e^{-λ_i u}
//! f1(u) = Σ (g10_i + g11_i u) e^{-λ_i u}
//! ```
//!
//! Beyond `3τ` the asymptotic form is used.

use nalgebra::{DMatrix, DVector};
use qdwell_qmatrix::Mechanism;
use tracing::debug;

use crate::asymptotic::AsymptoticDistribution;
use crate::checks::decompose;
use crate::error::HjcError;
use crate::missed::MissedEvents;

/// Relative gap below which two eigenvalues of `-Q` count as equal.
const DEGENERACY_TOL: f64 = 1e-9;

/// Coefficients `g00`, `g10`, `g11` of the exact pdf, one per eigenvalue of
/// `-Q`.
#[derive(Debug, Clone, PartialEq)]
pub struct GammaCoefficients {
    eigenvalues: Vec<f64>,
    g00: Vec<f64>,
    g10: Vec<f64>,
    g11: Vec<f64>,
}

impl GammaCoefficients {
    /// Computes the coefficients for the direction and resolution of `me`.
    ///
    /// With `C00_i = A_i[AA]` and `D_i = A_i[AF] e^{QFF τ} QFA`:
    ///
    /// ```text
    /// C11_i = D_i C00_i
    /// C10_i = Σ_{j≠i} (D_i C00_j + D_j C00_i) / (λ_j - λ_i)
    /// gXY_i = φ CXY_i QAF e^{QFF τ} 1
    /// ```
    ///
    /// # Errors
    ///
    /// - [`HjcError::ComplexSpectrum`] if `-Q` has complex eigenvalues.
    /// - [`HjcError::QMatrix`] if `-Q` cannot be decomposed.
    /// - [`HjcError::DegenerateEigenvalues`] if two eigenvalues coincide.
    #[tracing::instrument(skip_all, fields(direction = %me.direction(), tres = me.tres()))]
    pub fn new(mec: &Mechanism, me: &MissedEvents) -> Result<Self, HjcError> {
        let spectral = decompose(&(-mec.q()), "-Q")?;
        let eigenvalues = spectral.eigenvalues().to_vec();
        check_distinct(&eigenvalues)?;

        let dwell = me.direction().dwell_states(mec);
        let exit_states = me.direction().exit_states(mec);
        let exit = me.exit();
        let phi = me.phi();
        let leave = me.exp_ff() * &me.blocks().fa;

        // y_i = C00_i·exit and r_i = φ·D_i, so every coefficient is a dot
        // product of a row with a column.
        let mut y: Vec<DVector<f64>> = Vec::with_capacity(eigenvalues.len());
        let mut r: Vec<DVector<f64>> = Vec::with_capacity(eigenvalues.len());
        for a in spectral.projectors() {
            let c00: DMatrix<f64> = a
                .view((dwell.start, dwell.start), (dwell.len(), dwell.len()))
                .into_owned();
            let a_af = a.view(
                (dwell.start, exit_states.start),
                (dwell.len(), exit_states.len()),
            );
            let d = a_af * &leave;
            y.push(&c00 * exit);
            r.push(d.tr_mul(phi));
        }

        let n = eigenvalues.len();
        let g00 = (0..n).map(|i| phi.dot(&y[i])).collect();
        let g11 = (0..n).map(|i| r[i].dot(&y[i])).collect();
        let g10 = (0..n)
            .map(|i| {
                (0..n)
                    .filter(|&j| j != i)
                    .map(|j| {
                        (r[i].dot(&y[j]) + r[j].dot(&y[i])) / (eigenvalues[j] - eigenvalues[i])
                    })
                    .sum::<f64>()
            })
            .collect();

        let gamma = Self {
            eigenvalues,
            g00,
            g10,
            g11,
        };
        debug!(?gamma, "exact pdf coefficients");
        Ok(gamma)
    }

    /// Eigenvalues `λ_i` of `-Q`, ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Coefficients of `f0`.
    pub fn g00(&self) -> &[f64] {
        &self.g00
    }

    /// Constant coefficients of `f1`.
    pub fn g10(&self) -> &[f64] {
        &self.g10
    }

    /// Linear coefficients of `f1`.
    pub fn g11(&self) -> &[f64] {
        &self.g11
    }

    /// `f0(u) = Σ g00_i e^{-λ_i u}`.
    pub fn f0(&self, u: f64) -> f64 {
        self.eigenvalues
            .iter()
            .zip(&self.g00)
            .map(|(l, g)| g * (-l * u).exp())
            .sum()
    }

    /// `f1(u) = Σ (g10_i + g11_i u) e^{-λ_i u}`.
    pub fn f1(&self, u: f64) -> f64 {
        self.eigenvalues
            .iter()
            .zip(self.g10.iter().zip(&self.g11))
            .map(|(l, (g10, g11))| (g10 + g11 * u) * (-l * u).exp())
            .sum()
    }
}

fn check_distinct(eigenvalues: &[f64]) -> Result<(), HjcError> {
    let scale = eigenvalues.iter().fold(1.0_f64, |m, l| m.max(l.abs()));
    for (i, pair) in eigenvalues.windows(2).enumerate() {
        if (pair[1] - pair[0]).abs() <= DEGENERACY_TOL * scale {
            return Err(HjcError::DegenerateEigenvalues {
                i,
                j: i + 1,
                value: pair[0],
            });
        }
    }
    Ok(())
}

/// Evaluates the exact pdf at `t`, switching to `asymptotic` from `3·tres`.
pub fn exact_pdf(
    t: f64,
    tres: f64,
    asymptotic: &AsymptoticDistribution,
    gamma: &GammaCoefficients,
) -> f64 {
    if t < tres {
        0.0
    } else if t < 2.0 * tres {
        gamma.f0(t - tres)
    } else if t < 3.0 * tres {
        gamma.f0(t - tres) - gamma.f1(t - 2.0 * tres)
    } else {
        asymptotic.pdf(t)
    }
}

/// Exact pdf of observed dwells in one direction.
#[derive(Debug, Clone)]
pub struct ExactDistribution {
    gamma: GammaCoefficients,
    asymptotic: AsymptoticDistribution,
}

impl ExactDistribution {
    /// Combines the coefficients for `me` with an asymptotic distribution
    /// computed for the same direction and resolution.
    pub fn new(
        mec: &Mechanism,
        me: &MissedEvents,
        asymptotic: AsymptoticDistribution,
    ) -> Result<Self, HjcError> {
        let gamma = GammaCoefficients::new(mec, me)?;
        Ok(Self { gamma, asymptotic })
    }

    /// Time resolution (s).
    pub fn tres(&self) -> f64 {
        self.asymptotic.tres()
    }

    /// The `[τ, 3τ)` coefficients.
    pub fn gamma(&self) -> &GammaCoefficients {
        &self.gamma
    }

    /// The distribution used from `3τ`.
    pub fn asymptotic(&self) -> &AsymptoticDistribution {
        &self.asymptotic
    }

    /// Evaluates the pdf at `t` (s).
    pub fn pdf(&self, t: f64) -> f64 {
        exact_pdf(t, self.tres(), &self.asymptotic, &self.gamma)
    }
}

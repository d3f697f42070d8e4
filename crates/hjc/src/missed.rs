//! HJC matrices for a fixed time resolution.
//!
//! With dead time `τ`, an observed dwell in A is a sequence of true
//! sojourns in A joined by sojourns in F shorter than `τ`. Everything the
//! asymptotic and exact distributions need follows from a handful of
//! matrices built once per (mechanism, direction, τ):
//!
//! ```text
//! GAF  = (-QAA)⁻¹ QAF                         one-step exit probabilities
//! eGAF = (I - GAF (I - e^{QFF τ}) GFA)⁻¹ GAF e^{QFF τ}
//! φ    = stationary(I - eGAF eGFA)            initial vector of observed dwells
//! H(s) = QAA + QAF [∫₀^τ e^{-st} e^{QFF t} dt] QFA
//! W(s) = sI - H(s)
//! ```
//!
//! The integral in `H(s)` is evaluated through the spectral decomposition
//! of `-QFF` so that it stays finite when `s` approaches one of its
//! eigenvalues.

use nalgebra::{DMatrix, DVector};
use qdwell_qmatrix::{
    Mechanism, SpectralDecomposition, eigenvalue_real_parts, expm, inverse, ones, stationary,
};
use tracing::debug;

use crate::checks::{check_resolution, check_stable, decompose};
use crate::direction::{Blocks, Direction};
use crate::error::HjcError;

/// Below this `|x·τ|` the slope of the dead-time kernel uses its Taylor series.
const SERIES_THRESHOLD: f64 = 1e-3;

/// Largest `-(s + μ)·τ` admitted into the dead-time kernel. The entries of
/// `H(s)` grow as `e^{-(s+μ)τ}`, and past this point rounding in its
/// eigenvalues is no longer small against `s`.
const MAX_KERNEL_EXPONENT: f64 = 40.0;

/// Matrices describing observed dwells in one direction at resolution `tres`.
#[derive(Debug, Clone)]
pub struct MissedEvents {
    direction: Direction,
    tres: f64,
    blocks: Blocks,
    exit_spectral: SpectralDecomposition,
    g_af: DMatrix<f64>,
    g_fa: DMatrix<f64>,
    exp_ff: DMatrix<f64>,
    eg_af: DMatrix<f64>,
    eg_fa: DMatrix<f64>,
    phi: DVector<f64>,
    exit: DVector<f64>,
}

impl MissedEvents {
    /// Builds the HJC matrices for `direction` at resolution `tres` (s).
    ///
    /// # Errors
    ///
    /// - [`HjcError::InvalidResolution`] if `tres` is not finite and positive.
    /// - [`HjcError::UnstableSubGenerator`] if `-QFF` has a non-positive
    ///   eigenvalue.
    /// - [`HjcError::ComplexSpectrum`] if `-QFF` has complex eigenvalues.
    /// - [`HjcError::QMatrix`] if `-QAA`, `-QFF` or the eG normalising
    ///   matrices are singular.
    #[tracing::instrument(skip(mec), fields(k = mec.k()))]
    pub fn new(mec: &Mechanism, direction: Direction, tres: f64) -> Result<Self, HjcError> {
        check_resolution(tres)?;
        let blocks = Blocks::new(mec, direction);

        let g_af = inverse(&(-&blocks.aa), "-QAA")? * &blocks.af;
        let g_fa = inverse(&(-&blocks.ff), "-QFF")? * &blocks.fa;
        let exp_aa = expm(&blocks.aa, tres);
        let exp_ff = expm(&blocks.ff, tres);
        let eg_af = effective_transitions(&g_af, &g_fa, &exp_ff, "eGAF")?;
        let eg_fa = effective_transitions(&g_fa, &g_af, &exp_aa, "eGFA")?;

        let k_a = blocks.k_a();
        let embedded = DMatrix::identity(k_a, k_a) - &eg_af * &eg_fa;
        let phi = stationary(&embedded)?;

        let exit_spectral = decompose(&(-&blocks.ff), "-QFF")?;
        check_stable(&exit_spectral, "-QFF")?;

        let exit = &blocks.af * (&exp_ff * ones(blocks.k_f()));
        debug!(%direction, ?phi, "HJC initial vector");

        Ok(Self {
            direction,
            tres,
            blocks,
            exit_spectral,
            g_af,
            g_fa,
            exp_ff,
            eg_af,
            eg_fa,
            phi,
            exit,
        })
    }

    /// Returns the direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the time resolution (s).
    pub fn tres(&self) -> f64 {
        self.tres
    }

    /// Returns the oriented Q-matrix blocks.
    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Ideal one-step exit probabilities `GAF = (-QAA)⁻¹QAF`.
    pub fn g_af(&self) -> &DMatrix<f64> {
        &self.g_af
    }

    /// Ideal one-step return probabilities `GFA = (-QFF)⁻¹QFA`.
    pub fn g_fa(&self) -> &DMatrix<f64> {
        &self.g_fa
    }

    /// `e^{QFF·tres}`.
    pub fn exp_ff(&self) -> &DMatrix<f64> {
        &self.exp_ff
    }

    /// Transition probabilities from the start of an observed dwell in A to
    /// the start of the next observed dwell in F.
    pub fn eg_af(&self) -> &DMatrix<f64> {
        &self.eg_af
    }

    /// Transition probabilities from an observed dwell in F to the next in A.
    pub fn eg_fa(&self) -> &DMatrix<f64> {
        &self.eg_fa
    }

    /// Equilibrium initial vector of observed dwells (HJC `φ`).
    pub fn phi(&self) -> &DVector<f64> {
        &self.phi
    }

    /// Exit column `QAF·e^{QFF·tres}·1` shared by the area, mean and exact
    /// pdf contractions.
    pub fn exit(&self) -> &DVector<f64> {
        &self.exit
    }

    /// `Σ_j B_j k(s + μ_j)` over the spectral decomposition of `-QFF`.
    fn exit_integral(&self, s: f64, kernel: fn(f64, f64) -> f64) -> DMatrix<f64> {
        let tres = self.tres;
        self.exit_spectral.apply(|mu| kernel(s + mu, tres))
    }

    /// `H(s) = QAA + QAF [∫₀^τ e^{-(sI - QFF)t} dt] QFA`.
    pub fn h(&self, s: f64) -> DMatrix<f64> {
        let integral = self.exit_integral(s, dead_time_kernel);
        &self.blocks.aa + &self.blocks.af * integral * &self.blocks.fa
    }

    /// `W(s) = sI - H(s)`.
    pub fn w(&self, s: f64) -> DMatrix<f64> {
        let k_a = self.blocks.k_a();
        DMatrix::identity(k_a, k_a) * s - self.h(s)
    }

    /// `dW/ds = I + QAF [Σ_j B_j g(s + μ_j)] QFA`.
    pub fn dw(&self, s: f64) -> DMatrix<f64> {
        let k_a = self.blocks.k_a();
        let integral = self.exit_integral(s, dead_time_kernel_slope);
        DMatrix::identity(k_a, k_a) + &self.blocks.af * integral * &self.blocks.fa
    }

    /// `det W(s)`, the function whose roots give the asymptotic rates.
    pub fn det_w(&self, s: f64) -> f64 {
        self.w(s).determinant()
    }

    /// Lowest `s` at which root counting through `H(s)` is trusted: the
    /// dead-time kernel of the slowest exit rate stays below `e^40`.
    pub fn lowest_finite_s(&self) -> f64 {
        let slowest = self
            .exit_spectral
            .eigenvalues()
            .first()
            .copied()
            .unwrap_or(0.0);
        -MAX_KERNEL_EXPONENT / self.tres - slowest
    }

    /// Number of roots of `det W` below `s`.
    ///
    /// Counts the eigenvalues of `H(s)` whose real part lies below `s`; the
    /// count rises by one at each root.
    ///
    /// # Errors
    ///
    /// - [`HjcError::NonFiniteH`] if `H(s)` overflows.
    /// - [`HjcError::QMatrix`] if its eigenvalues cannot be computed.
    pub fn roots_below(&self, s: f64) -> Result<usize, HjcError> {
        let h = self.h(s);
        if h.iter().any(|x| !x.is_finite()) {
            return Err(HjcError::NonFiniteH { s, tres: self.tres });
        }
        let eig = eigenvalue_real_parts(&h, "H(s)")?;
        Ok(eig.into_iter().filter(|&x| x < s).count())
    }
}

/// `eGAB = (I - GAB (I - e^{QBB τ}) GBA)⁻¹ GAB e^{QBB τ}`.
fn effective_transitions(
    g_ab: &DMatrix<f64>,
    g_ba: &DMatrix<f64>,
    exp_bb: &DMatrix<f64>,
    what: &str,
) -> Result<DMatrix<f64>, HjcError> {
    let k_a = g_ab.nrows();
    let k_b = exp_bb.nrows();
    let missed = g_ab * (DMatrix::identity(k_b, k_b) - exp_bb) * g_ba;
    let normaliser = inverse(
        &(DMatrix::identity(k_a, k_a) - missed),
        &format!("normaliser of {what}"),
    )?;
    Ok(normaliser * g_ab * exp_bb)
}

/// `∫₀^τ e^{-x t} dt = (1 - e^{-xτ}) / x`, equal to `τ` at `x = 0`.
pub(crate) fn dead_time_kernel(x: f64, tres: f64) -> f64 {
    if x == 0.0 {
        tres
    } else {
        -(-x * tres).exp_m1() / x
    }
}

/// `-d/dx` of [`dead_time_kernel`]: `(1 - e^{-xτ})/x² - τ e^{-xτ}/x`.
pub(crate) fn dead_time_kernel_slope(x: f64, tres: f64) -> f64 {
    let y = x * tres;
    if y.abs() < SERIES_THRESHOLD {
        tres * tres * (0.5 - y / 3.0 + y * y / 8.0 - y * y * y / 30.0)
    } else {
        -(-y).exp_m1() / (x * x) - tres * (-y).exp() / x
    }
}

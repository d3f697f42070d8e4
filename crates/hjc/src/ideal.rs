//! Ideal dwell-time distributions (no missed events).
//!
//! The pdf of a sojourn in subset A entered with initial vector `φ` is
//! `f(t) = φ e^{QAA t} (-QAA) 1`, a mixture of `kA` exponentials whose
//! rates are the eigenvalues of `-QAA`.

use std::ops::Range;

use nalgebra::{DMatrix, DVector};
use qdwell_qmatrix::{Mechanism, expm, ones};
use tracing::debug;

use crate::checks::{check_stable, check_time, checked_ratio, decompose};
use crate::direction::{Blocks, Direction};
use crate::error::HjcError;

/// Evaluates `φ e^{QAA t} (-QAA) 1`.
///
/// # Errors
///
/// Returns [`HjcError::InvalidTime`] for negative or non-finite `t`.
pub fn ideal_dwell_time_pdf(
    t: f64,
    qaa: &DMatrix<f64>,
    phi: &DVector<f64>,
) -> Result<f64, HjcError> {
    check_time(t)?;
    let k = qaa.nrows();
    let rate_out = -qaa * ones(k);
    Ok(phi.dot(&(expm(qaa, t) * rate_out)))
}

/// Initial vector for ideal dwells in `direction`.
///
/// Openings start with `φA = pF·QFA / (pF·QFA·1)`, where `pF` is the
/// equilibrium occupancy of the shut states; shuttings symmetrically.
pub fn ideal_phi(mec: &Mechanism, direction: Direction) -> Result<DVector<f64>, HjcError> {
    let p = mec.equilibrium()?;
    let exit = direction.exit_states(mec);
    let p_exit = p.rows(exit.start, exit.len()).into_owned();
    let blocks = Blocks::new(mec, direction);
    let flux = blocks.fa.tr_mul(&p_exit);
    let total = flux.sum();
    let scale = checked_ratio(1.0, total, || format!("ideal {direction} initial vector"))?;
    Ok(flux * scale)
}

/// Exponential components of an ideal dwell-time pdf.
///
/// `pdf(t) = Σ weights[i]·exp(-eigenvalues[i]·t)`; component `i` has time
/// constant `1/eigenvalues[i]` and area `weights[i]/eigenvalues[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IdealComponents {
    eigenvalues: Vec<f64>,
    weights: Vec<f64>,
}

impl IdealComponents {
    /// Decomposes the pdf of dwells in the subset with generator `qaa`
    /// entered with initial vector `phi`.
    ///
    /// # Errors
    ///
    /// - [`HjcError::UnstableSubGenerator`] if `-QAA` has a non-positive
    ///   eigenvalue.
    /// - [`HjcError::ComplexSpectrum`] if `-QAA` has complex eigenvalues;
    ///   [`ideal_dwell_time_pdf`] still evaluates such a pdf.
    /// - [`HjcError::QMatrix`] if `-QAA` cannot be decomposed.
    pub fn new(qaa: &DMatrix<f64>, phi: &DVector<f64>) -> Result<Self, HjcError> {
        let minus_qaa = -qaa;
        let spectral = decompose(&minus_qaa, "-QAA")?;
        check_stable(&spectral, "-QAA")?;

        let rate_out = &minus_qaa * ones(qaa.nrows());
        let weights = spectral
            .projectors()
            .iter()
            .map(|a| phi.dot(&(a * &rate_out)))
            .collect();
        Ok(Self {
            eigenvalues: spectral.eigenvalues().to_vec(),
            weights,
        })
    }

    /// Rates `λ_i` (s⁻¹), ascending.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.eigenvalues
    }

    /// Amplitudes `w_i`; they sum to `f(0)`.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    /// `true` when there are no components.
    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    /// Time constants `1/λ_i` (s).
    pub fn taus(&self) -> Vec<f64> {
        self.eigenvalues.iter().map(|l| 1.0 / l).collect()
    }

    /// Areas `w_i/λ_i`; they sum to 1.
    pub fn areas(&self) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.eigenvalues)
            .map(|(w, l)| w / l)
            .collect()
    }

    /// Evaluates the mixture at `t`.
    pub fn pdf(&self, t: f64) -> f64 {
        self.weights
            .iter()
            .zip(&self.eigenvalues)
            .map(|(w, l)| w * (-l * t).exp())
            .sum()
    }

    /// Mean dwell `Σ w_i/λ_i²` (s).
    pub fn mean(&self) -> f64 {
        self.weights
            .iter()
            .zip(&self.eigenvalues)
            .map(|(w, l)| w / (l * l))
            .sum()
    }
}

/// Ideal open or shut time distribution of a mechanism.
#[derive(Debug, Clone)]
pub struct IdealDistribution {
    direction: Direction,
    qaa: DMatrix<f64>,
    phi: DVector<f64>,
    components: IdealComponents,
}

impl IdealDistribution {
    /// Builds the ideal distribution of dwells in `direction`.
    #[tracing::instrument(skip(mec), fields(k = mec.k()))]
    pub fn new(mec: &Mechanism, direction: Direction) -> Result<Self, HjcError> {
        let phi = ideal_phi(mec, direction)?;
        let qaa = Blocks::new(mec, direction).aa;
        let components = IdealComponents::new(&qaa, &phi)?;
        debug!(
            %direction,
            eigenvalues = ?components.eigenvalues(),
            areas = ?components.areas(),
            "ideal components"
        );
        Ok(Self {
            direction,
            qaa,
            phi,
            components,
        })
    }

    /// Returns the direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the initial vector.
    pub fn phi(&self) -> &DVector<f64> {
        &self.phi
    }

    /// Returns the exponential components.
    pub fn components(&self) -> &IdealComponents {
        &self.components
    }

    /// Evaluates the pdf at `t` from the matrix exponential.
    pub fn pdf(&self, t: f64) -> Result<f64, HjcError> {
        ideal_dwell_time_pdf(t, &self.qaa, &self.phi)
    }

    /// Mean dwell time (s).
    pub fn mean(&self) -> f64 {
        self.components.mean()
    }
}

/// Ideal pdf of a sojourn in the contiguous state subset `subset`, entered
/// from outside at equilibrium.
///
/// The initial vector is the equilibrium flux into the subset,
/// `φ_j ∝ Σ_{i∉S} p_i q_ij`.
///
/// # Errors
///
/// - [`HjcError::QMatrix`] if `subset` is empty or out of range.
/// - [`HjcError::NearZeroDenominator`] if no flux enters the subset.
pub fn subset_time_pdf(mec: &Mechanism, subset: Range<usize>, t: f64) -> Result<f64, HjcError> {
    mec.check_subset(&subset)?;
    check_time(t)?;
    let p = mec.equilibrium()?;
    let q = mec.q();
    let n = subset.len();

    let mut flux = DVector::zeros(n);
    for (col, j) in subset.clone().enumerate() {
        flux[col] = (0..mec.k())
            .filter(|i| !subset.contains(i))
            .map(|i| p[i] * q[(i, j)])
            .sum();
    }
    let scale = checked_ratio(1.0, flux.sum(), || {
        format!("entry flux of subset {}..{}", subset.start, subset.end)
    })?;
    let phi = flux * scale;
    let q_sub = mec.block(subset.clone(), subset);
    ideal_dwell_time_pdf(t, &q_sub, &phi)
}

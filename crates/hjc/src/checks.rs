//! Argument and stability checks shared by the distribution builders.

use nalgebra::DMatrix;
use qdwell_qmatrix::{QMatrixError, SpectralDecomposition};
use tracing::warn;

use crate::error::HjcError;

/// Magnitude below which a denominator is treated as zero.
pub(crate) const NEAR_ZERO: f64 = 1e-300;

/// Size of a contraction, relative to the terms it sums, below which it is
/// cancellation noise.
pub(crate) const CANCELLATION: f64 = 1e-12;

pub(crate) fn check_resolution(tres: f64) -> Result<(), HjcError> {
    if !tres.is_finite() || tres <= 0.0 {
        return Err(HjcError::InvalidResolution { tres });
    }
    Ok(())
}

pub(crate) fn check_time(t: f64) -> Result<(), HjcError> {
    if !t.is_finite() || t < 0.0 {
        return Err(HjcError::InvalidTime { t });
    }
    Ok(())
}

/// Spectral decomposition of a negated generator block.
///
/// A complex spectrum is reported as [`HjcError::ComplexSpectrum`].
pub(crate) fn decompose(m: &DMatrix<f64>, what: &str) -> Result<SpectralDecomposition, HjcError> {
    SpectralDecomposition::new(m, what).map_err(|e| match e {
        QMatrixError::ComplexEigenvalues { what } => {
            warn!(%what, "complex spectrum, mechanism is not microscopically reversible");
            HjcError::ComplexSpectrum { what }
        }
        other => other.into(),
    })
}

/// Every eigenvalue of the negated sub-generator must be positive.
pub(crate) fn check_stable(spectral: &SpectralDecomposition, what: &str) -> Result<(), HjcError> {
    if let Some(&eigenvalue) = spectral.eigenvalues().iter().find(|&&l| l <= 0.0) {
        return Err(HjcError::UnstableSubGenerator {
            what: what.to_string(),
            eigenvalue,
        });
    }
    Ok(())
}

/// Divides, failing when `den` is zero or not finite.
pub(crate) fn checked_ratio(num: f64, den: f64, what: impl FnOnce() -> String) -> Result<f64, HjcError> {
    if !den.is_finite() || den.abs() < NEAR_ZERO {
        return Err(HjcError::NearZeroDenominator {
            what: what(),
            value: den,
        });
    }
    Ok(num / den)
}

/// Divides by a contraction `den = r·M·c`, failing when `|den|` is small
/// against `scale = |r|·‖M‖·|c|` as well as when it is zero.
pub(crate) fn checked_contraction(
    num: f64,
    den: f64,
    scale: f64,
    what: impl FnOnce() -> String,
) -> Result<f64, HjcError> {
    if !den.is_finite() || den.abs() < NEAR_ZERO.max(CANCELLATION * scale) {
        return Err(HjcError::NearZeroDenominator {
            what: what(),
            value: den,
        });
    }
    Ok(num / den)
}

//! Tabulated pdfs on a logarithmic time grid.

use crate::asymptotic::AsymptoticDistribution;
use crate::error::HjcError;
use crate::exact::ExactDistribution;
use crate::ideal::IdealDistribution;

/// `points` times spaced evenly in `log t` from `t_min` to `t_max`
/// (both included).
///
/// # Errors
///
/// Returns [`HjcError::InvalidGrid`] unless `0 < t_min < t_max` and
/// `points >= 2`.
pub fn log_grid(t_min: f64, t_max: f64, points: usize) -> Result<Vec<f64>, HjcError> {
    if points < 2 {
        return Err(HjcError::InvalidGrid {
            reason: format!("need at least 2 points, got {points}"),
        });
    }
    if !(t_min.is_finite() && t_max.is_finite() && t_min > 0.0 && t_min < t_max) {
        return Err(HjcError::InvalidGrid {
            reason: format!("need 0 < t_min < t_max, got t_min = {t_min}, t_max = {t_max}"),
        });
    }
    let (lo, hi) = (t_min.ln(), t_max.ln());
    let step = (hi - lo) / (points - 1) as f64;
    let mut grid: Vec<f64> = (0..points).map(|i| (lo + step * i as f64).exp()).collect();
    grid[0] = t_min;
    grid[points - 1] = t_max;
    Ok(grid)
}

/// Densities at one time point (s⁻¹).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRow {
    /// Time (s).
    pub t: f64,
    /// Ideal pdf.
    pub ideal: f64,
    /// Asymptotic HJC pdf.
    pub asymptotic: f64,
    /// Exact HJC pdf.
    pub exact: f64,
}

impl PdfRow {
    /// Multiplies every density by `t`, the form plotted against `log t`.
    pub fn log_scaled(&self) -> Self {
        Self {
            t: self.t,
            ideal: self.ideal * self.t,
            asymptotic: self.asymptotic * self.t,
            exact: self.exact * self.t,
        }
    }
}

/// Evaluates the three pdfs at each time of `grid`.
///
/// The ideal pdf is rescaled by `1 / ∫_tres^∞ f(t) dt` so that it shares the
/// support of the missed-event pdfs.
pub fn pdf_table(
    ideal: &IdealDistribution,
    asymptotic: &AsymptoticDistribution,
    exact: &ExactDistribution,
    grid: &[f64],
) -> Result<Vec<PdfRow>, HjcError> {
    let tres = asymptotic.tres();
    let tail: f64 = ideal
        .components()
        .areas()
        .iter()
        .zip(ideal.components().taus())
        .map(|(a, tau)| a * (-tres / tau).exp())
        .sum();

    grid.iter()
        .map(|&t| {
            let ideal_density = if t < tres { 0.0 } else { ideal.pdf(t)? / tail };
            Ok(PdfRow {
                t,
                ideal: ideal_density,
                asymptotic: asymptotic.pdf(t),
                exact: exact.pdf(t),
            })
        })
        .collect()
}

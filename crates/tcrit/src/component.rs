//! Exponential components of a shut-time distribution.

use crate::error::TcritError;

/// One exponential term `(area/tau)·exp(-t/tau)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    /// Time constant (s).
    pub tau: f64,
    /// Area (fraction of events).
    pub area: f64,
}

/// Pairs `taus` with `areas` and sorts ascending by time constant, ties
/// broken by area.
///
/// # Errors
///
/// - [`TcritError::LengthMismatch`] if the slices differ in length.
/// - [`TcritError::TooFewComponents`] for fewer than two components.
/// - [`TcritError::InvalidComponent`] for a non-positive or non-finite
///   `tau`, or a negative or non-finite `area`.
pub fn sort_components(taus: &[f64], areas: &[f64]) -> Result<Vec<Component>, TcritError> {
    if taus.len() != areas.len() {
        return Err(TcritError::LengthMismatch {
            taus: taus.len(),
            areas: areas.len(),
        });
    }
    if taus.len() < 2 {
        return Err(TcritError::TooFewComponents { n: taus.len() });
    }
    let mut components = Vec::with_capacity(taus.len());
    for (index, (&tau, &area)) in taus.iter().zip(areas).enumerate() {
        if !(tau.is_finite() && tau > 0.0 && area.is_finite() && area >= 0.0) {
            return Err(TcritError::InvalidComponent { index, tau, area });
        }
        components.push(Component { tau, area });
    }
    components.sort_by(|a, b| a.tau.total_cmp(&b.tau).then(a.area.total_cmp(&b.area)));
    Ok(components)
}

//! Asymptotic HJC distribution, valid for `t` beyond a few dead times.
//!
//! For `t ≥ τ` the observed dwell pdf approaches
//! `Σ (a_i/τ_i) exp(-(t - τ)/τ_i)` where `s_i = -1/τ_i` are the `kA` roots
//! of `det W(s) = 0`. Roots are isolated by counting eigenvalues of `H(s)`
//! below `s`, then bisected independently.

use qdwell_qmatrix::stationary;
use qdwell_roots::{Bracket, RootSearch, split_brackets};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::checks::checked_contraction;
use crate::error::HjcError;
use crate::missed::MissedEvents;

/// Locates the `kA` roots of `det W(s)` in ascending order.
///
/// # Errors
///
/// The lower end of the interval is raised to
/// [`MissedEvents::lowest_finite_s`] when it reaches past it.
///
/// # Errors
///
/// - [`HjcError::Root`] if the search interval is invalid or does not hold
///   exactly `kA` roots.
/// - [`HjcError::IntervalOverflow`] if the whole interval lies below
///   [`MissedEvents::lowest_finite_s`].
/// - [`HjcError::RootSearch`] if bisection fails for one root.
#[tracing::instrument(skip_all, fields(direction = %me.direction(), tres = me.tres()))]
pub fn asymptotic_roots(me: &MissedEvents, search: &RootSearch) -> Result<Vec<f64>, HjcError> {
    search.validate()?;
    let k_a = me.blocks().k_a();
    let bracket = within_finite_range(search.bracket()?, me)?;
    let brackets = split_brackets(bracket, k_a, search.max_depth(), |s| me.roots_below(s))?;

    let bisection = search.bisection();
    let roots = brackets
        .par_iter()
        .enumerate()
        .map(|(index, &bracket)| {
            bisection
                .solve(bracket, |s| me.det_w(s))
                .map(|root| root.x)
                .map_err(|source| HjcError::RootSearch { index, source })
        })
        .collect::<Result<Vec<f64>, HjcError>>()?;

    debug!(?roots, "asymptotic roots");
    Ok(roots)
}

/// Clips `bracket` to the range where `H(s)` can be evaluated.
fn within_finite_range(bracket: Bracket, me: &MissedEvents) -> Result<Bracket, HjcError> {
    let limit = me.lowest_finite_s();
    if bracket.lower() >= limit {
        return Ok(bracket);
    }
    if bracket.upper() <= limit {
        return Err(HjcError::IntervalOverflow {
            lower: bracket.lower(),
            upper: bracket.upper(),
            limit,
            tres: me.tres(),
        });
    }
    warn!(
        lower = bracket.lower(),
        limit,
        "root search lower bound raised to keep H(s) finite"
    );
    Ok(Bracket::new(limit, bracket.upper())?)
}

/// Computes the area of each asymptotic component.
///
/// With `r` and `c` the left and right null vectors of `W(s_i)`:
///
/// ```text
/// a_i = (φ·c)(r·QAF·e^{QFF τ}·1) / (-s_i · r·W'(s_i)·c)
/// ```
///
/// # Errors
///
/// Returns [`HjcError::NearZeroDenominator`] if `r·W'(s_i)·c` vanishes or
/// is below rounding relative to `|s_i|·|r|·‖W'(s_i)‖·|c|`.
pub fn asymptotic_areas(me: &MissedEvents, roots: &[f64]) -> Result<Vec<f64>, HjcError> {
    roots
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = me.w(s);
            let row = stationary(&w)?;
            let col = stationary(&w.transpose())?;
            let num = me.phi().dot(&col) * row.dot(me.exit());
            let dw = me.dw(s);
            let den = -s * row.dot(&(&dw * &col));
            let scale = s.abs() * row.norm() * dw.norm() * col.norm();
            checked_contraction(num, den, scale, || {
                format!("area of asymptotic root {i}")
            })
        })
        .collect()
}

/// Evaluates `Σ (a_i/τ_i) exp(-(t - tres)/τ_i)`; zero below `tres`.
pub fn asymptotic_pdf(t: f64, tres: f64, taus: &[f64], areas: &[f64]) -> f64 {
    if t < tres {
        return 0.0;
    }
    taus.iter()
        .zip(areas)
        .map(|(tau, a)| a / tau * (-(t - tres) / tau).exp())
        .sum()
}

/// Roots and areas of the asymptotic distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct AsymptoticDistribution {
    tres: f64,
    roots: Vec<f64>,
    areas: Vec<f64>,
}

impl AsymptoticDistribution {
    /// Finds the roots and areas for `me`.
    pub fn new(me: &MissedEvents, search: &RootSearch) -> Result<Self, HjcError> {
        let roots = asymptotic_roots(me, search)?;
        let areas = asymptotic_areas(me, &roots)?;
        debug!(?areas, sum = areas.iter().sum::<f64>(), "asymptotic areas");
        Ok(Self {
            tres: me.tres(),
            roots,
            areas,
        })
    }

    /// Time resolution (s).
    pub fn tres(&self) -> f64 {
        self.tres
    }

    /// Roots `s_i` (s⁻¹), ascending.
    pub fn roots(&self) -> &[f64] {
        &self.roots
    }

    /// Areas of the components over `t ≥ tres`.
    pub fn areas(&self) -> &[f64] {
        &self.areas
    }

    /// Time constants `-1/s_i` (s).
    pub fn taus(&self) -> Vec<f64> {
        self.roots.iter().map(|s| -1.0 / s).collect()
    }

    /// Rate constants `-s_i` (s⁻¹).
    pub fn rates(&self) -> Vec<f64> {
        self.roots.iter().map(|s| -s).collect()
    }

    /// Sum of the areas; slightly below 1 because the exponential
    /// approximation is poor within the first dead times.
    pub fn area_sum(&self) -> f64 {
        self.areas.iter().sum()
    }

    /// Areas extrapolated to `t = 0` (`a_i·e^{tres/τ_i}`) and normalised to
    /// sum 1, comparable with ideal areas.
    pub fn renormalized_areas(&self) -> Vec<f64> {
        let scaled: Vec<f64> = self
            .roots
            .iter()
            .zip(&self.areas)
            .map(|(s, a)| a * (-self.tres * s).exp())
            .collect();
        let total: f64 = scaled.iter().sum();
        scaled.into_iter().map(|a| a / total).collect()
    }

    /// Evaluates the asymptotic pdf at `t` (s).
    pub fn pdf(&self, t: f64) -> f64 {
        asymptotic_pdf(t, self.tres, &self.taus(), &self.areas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use approx::assert_relative_eq;
    use qdwell_qmatrix::samples;

    fn ch82_open() -> AsymptoticDistribution {
        let mec = samples::ch82(1e-7).unwrap();
        let me = MissedEvents::new(&mec, Direction::Open, 1e-4).unwrap();
        AsymptoticDistribution::new(&me, &RootSearch::new()).unwrap()
    }

    #[test]
    fn ch82_open_roots() {
        let asy = ch82_open();
        assert_relative_eq!(asy.roots()[0], -3045.2858, max_relative = 1e-6);
        assert_relative_eq!(asy.roots()[1], -162.92947, max_relative = 1e-6);
    }

    #[test]
    fn ch82_open_areas() {
        let asy = ch82_open();
        assert_relative_eq!(asy.areas()[0], 0.150747, max_relative = 1e-4);
        assert_relative_eq!(asy.areas()[1], 0.849204, max_relative = 1e-5);
        assert!(asy.area_sum() <= 1.0);
        let renorm = asy.renormalized_areas();
        assert_relative_eq!(renorm[0], 0.19147, max_relative = 1e-3);
        assert_relative_eq!(renorm.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pdf_is_zero_below_resolution() {
        let asy = ch82_open();
        assert_eq!(asy.pdf(0.5e-4), 0.0);
        assert_relative_eq!(asy.pdf(1e-4), 597.43, max_relative = 1e-4);
    }

    #[test]
    fn wide_interval_is_clipped_to_finite_range() {
        let mec = samples::ch82(1e-7).unwrap();
        for direction in Direction::ALL {
            let me = MissedEvents::new(&mec, direction, 1e-4).unwrap();
            let default = asymptotic_roots(&me, &RootSearch::new()).unwrap();
            let wide = RootSearch::new().with_interval(-1e9, -1e-4);
            let clipped = asymptotic_roots(&me, &wide).unwrap();
            assert_eq!(clipped.len(), default.len());
            for (a, b) in clipped.iter().zip(&default) {
                assert_relative_eq!(*a, *b, max_relative = 1e-8);
            }
        }
    }

    #[test]
    fn interval_entirely_in_overflow_is_rejected() {
        let mec = samples::ch82(1e-7).unwrap();
        let me = MissedEvents::new(&mec, Direction::Shut, 1e-4).unwrap();
        let search = RootSearch::new().with_interval(-1e12, -1e11);
        let err = asymptotic_roots(&me, &search).unwrap_err();
        assert!(matches!(
            err,
            HjcError::IntervalOverflow { lower, upper, tres, .. }
                if lower == -1e12 && upper == -1e11 && tres == 1e-4
        ));
    }

    #[test]
    fn two_state_single_root() {
        let mec = samples::two_state(1000.0, 2000.0).unwrap();
        let me = MissedEvents::new(&mec, Direction::Open, 1e-4).unwrap();
        let asy = AsymptoticDistribution::new(&me, &RootSearch::new()).unwrap();
        assert_eq!(asy.roots().len(), 1);
        assert_relative_eq!(asy.roots()[0], -811.42848, max_relative = 1e-7);
        assert_relative_eq!(asy.areas()[0], 0.99976, max_relative = 1e-5);
    }

    #[test]
    fn narrow_interval_misses_roots() {
        let mec = samples::ch82(1e-7).unwrap();
        let me = MissedEvents::new(&mec, Direction::Open, 1e-4).unwrap();
        let search = RootSearch::new().with_interval(-1000.0, -1e-4);
        assert!(matches!(
            asymptotic_roots(&me, &search),
            Err(HjcError::Root(qdwell_roots::RootError::BracketCountMismatch {
                expected: 2,
                found: 1,
                ..
            }))
        ));
    }
}

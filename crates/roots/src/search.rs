//! Interval splitting driven by a root-counting function, plus the
//! configuration of a full bracket-then-bisect search.

use tracing::debug;

use crate::bisection::{Bisection, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE};
use crate::bracket::Bracket;
use crate::error::RootError;

/// Default lower end of the search interval (s⁻¹).
pub const DEFAULT_LOWER: f64 = -1e5;

/// Default upper end of the search interval (s⁻¹).
pub const DEFAULT_UPPER: f64 = -1e-4;

/// Default number of halvings allowed while isolating roots.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Configuration of a root search over a fixed interval.
///
/// Defaults: `lower = -1e5`, `upper = -1e-4`, `tolerance = 1e-10`,
/// `max_iter = 200`, `max_depth = 100`.
#[derive(Debug, Clone, Copy)]
pub struct RootSearch {
    lower: f64,
    upper: f64,
    tolerance: f64,
    max_iter: usize,
    max_depth: usize,
}

impl Default for RootSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl RootSearch {
    /// Creates a search with the default interval and tolerances.
    pub fn new() -> Self {
        Self {
            lower: DEFAULT_LOWER,
            upper: DEFAULT_UPPER,
            tolerance: DEFAULT_TOLERANCE,
            max_iter: DEFAULT_MAX_ITER,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the search interval.
    pub fn with_interval(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Sets the relative bisection tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the bisection iteration budget.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Sets the number of halvings allowed while isolating roots.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the lower end of the search interval.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Returns the upper end of the search interval.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Returns the relative bisection tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns the bisection iteration budget.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Returns the splitting depth limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the search interval as a bracket.
    pub fn bracket(&self) -> Result<Bracket, RootError> {
        Bracket::new(self.lower, self.upper)
    }

    /// Returns the bisection solver for individual roots.
    pub fn bisection(&self) -> Bisection {
        Bisection::new()
            .with_tolerance(self.tolerance)
            .with_max_iter(self.max_iter)
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), RootError> {
        self.bracket()?;
        self.bisection().validate()
    }
}

/// Splits `bracket` into sub-intervals that each hold exactly one root.
///
/// `count(x)` must return the number of roots below `x`, so that
/// `count(b) - count(a)` roots lie in `(a, b]`. The whole interval must hold
/// `expected` roots. Intervals holding several roots are halved until each
/// holds one, to at most `max_depth` levels; empty halves are dropped.
/// Sub-intervals are returned in ascending order.
///
/// # Errors
///
/// - [`RootError::BracketCountMismatch`] if the interval does not hold
///   `expected` roots.
/// - [`RootError::UnresolvedBracket`] if `max_depth` is reached first.
/// - Any error returned by `count`.
pub fn split_brackets<E, F>(
    bracket: Bracket,
    expected: usize,
    max_depth: usize,
    mut count: F,
) -> Result<Vec<Bracket>, E>
where
    E: From<RootError>,
    F: FnMut(f64) -> Result<usize, E>,
{
    let n_lower = count(bracket.lower())?;
    let n_upper = count(bracket.upper())?;
    let found = n_upper.saturating_sub(n_lower);
    if found != expected {
        return Err(RootError::BracketCountMismatch {
            lower: bracket.lower(),
            upper: bracket.upper(),
            expected,
            found,
        }
        .into());
    }

    let mut isolated = Vec::with_capacity(expected);
    let mut pending = vec![(bracket, n_lower, n_upper, 0usize)];
    while let Some((b, n_a, n_b, depth)) = pending.pop() {
        let roots = n_b.saturating_sub(n_a);
        match roots {
            0 => {}
            1 => isolated.push(b),
            _ if depth >= max_depth => {
                return Err(RootError::UnresolvedBracket {
                    lower: b.lower(),
                    upper: b.upper(),
                    roots,
                }
                .into());
            }
            _ => {
                let (left, right) = b.halves();
                let n_mid = count(left.upper())?;
                pending.push((left, n_a, n_mid, depth + 1));
                pending.push((right, n_mid, n_b, depth + 1));
            }
        }
    }

    isolated.sort_by(|x, y| x.lower().total_cmp(&y.lower()));
    debug!(n = isolated.len(), ?isolated, "isolated root brackets");
    Ok(isolated)
}

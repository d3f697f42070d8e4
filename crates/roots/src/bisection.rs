//! Bisection on a sign-changing bracket.

use tracing::trace;

use crate::bracket::Bracket;
use crate::error::RootError;

/// Default relative tolerance on the bracket width.
pub const DEFAULT_TOLERANCE: f64 = 1e-10;

/// Default iteration budget.
pub const DEFAULT_MAX_ITER: usize = 200;

/// A located root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Root {
    /// Abscissa of the root.
    pub x: f64,
    /// Bisection steps taken.
    pub iterations: usize,
}

/// Bisection solver for a continuous scalar function.
///
/// Iterates until the bracket width falls below `tolerance · |x|` (or the
/// function is exactly zero at a midpoint) and fails after `max_iter`
/// halvings.
///
/// # Example
///
/// ```
/// use qdwell_roots::{Bisection, Bracket};
///
/// let root = Bisection::new()
///     .solve(Bracket::new(1.0, 2.0)?, |x| x * x - 2.0)?;
/// assert!((root.x - 2f64.sqrt()).abs() < 1e-9);
/// # Ok::<(), qdwell_roots::RootError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Bisection {
    tolerance: f64,
    max_iter: usize,
}

impl Default for Bisection {
    fn default() -> Self {
        Self::new()
    }
}

impl Bisection {
    /// Creates a solver with `tolerance = 1e-10` and `max_iter = 200`.
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iter: DEFAULT_MAX_ITER,
        }
    }

    /// Sets the relative tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Returns the relative tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns the iteration budget.
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), RootError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(RootError::InvalidTolerance {
                tolerance: self.tolerance,
            });
        }
        if self.max_iter == 0 {
            return Err(RootError::InvalidMaxIter {
                max_iter: self.max_iter,
            });
        }
        Ok(())
    }

    /// Locates a root of `f` inside `bracket`.
    ///
    /// # Errors
    ///
    /// - [`RootError::NoSignChange`] if `f` has the same sign at both ends.
    /// - [`RootError::NonFinite`] if `f` returns NaN or infinity.
    /// - [`RootError::MaxIterations`] if the tolerance is not reached.
    pub fn solve<F>(&self, bracket: Bracket, f: F) -> Result<Root, RootError>
    where
        F: Fn(f64) -> f64,
    {
        self.validate()?;
        let eval = |x: f64| -> Result<f64, RootError> {
            let y = f(x);
            if y.is_finite() {
                Ok(y)
            } else {
                Err(RootError::NonFinite { x })
            }
        };

        let fa = eval(bracket.lower())?;
        let fb = eval(bracket.upper())?;
        if fa == 0.0 {
            return Ok(Root {
                x: bracket.lower(),
                iterations: 0,
            });
        }
        if fb == 0.0 {
            return Ok(Root {
                x: bracket.upper(),
                iterations: 0,
            });
        }
        if fa.signum() == fb.signum() {
            return Err(RootError::NoSignChange {
                lower: bracket.lower(),
                upper: bracket.upper(),
                f_lower: fa,
                f_upper: fb,
            });
        }

        let lower_sign = fa.signum();
        let mut bracket = bracket;
        for iteration in 1..=self.max_iter {
            let mid = bracket.midpoint();
            let fm = eval(mid)?;
            trace!(
                iteration,
                lower = bracket.lower(),
                upper = bracket.upper(),
                mid,
                fm,
                "bisection step"
            );
            if fm == 0.0 {
                return Ok(Root {
                    x: mid,
                    iterations: iteration,
                });
            }
            let (left, right) = bracket.halves();
            bracket = if fm.signum() == lower_sign { right } else { left };

            let x = bracket.midpoint();
            let width = bracket.width();
            if width <= self.tolerance * x.abs() || width <= f64::EPSILON * x.abs() {
                return Ok(Root {
                    x,
                    iterations: iteration,
                });
            }
        }
        Err(RootError::MaxIterations {
            lower: bracket.lower(),
            upper: bracket.upper(),
            max_iter: self.max_iter,
        })
    }
}

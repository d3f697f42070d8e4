//! Closed search intervals.

use crate::error::RootError;

/// A finite interval `[lower, upper]` with `lower < upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    lower: f64,
    upper: f64,
}

impl Bracket {
    /// Creates a bracket, rejecting non-finite or inverted bounds.
    pub fn new(lower: f64, upper: f64) -> Result<Self, RootError> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(RootError::InvalidBracket { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    /// Returns the lower bound.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Returns the upper bound.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Returns the midpoint.
    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Returns `upper - lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Returns `true` if `x` lies in the closed interval.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x <= self.upper
    }

    /// Splits at the midpoint.
    pub fn halves(&self) -> (Self, Self) {
        let mid = self.midpoint();
        (
            Self {
                lower: self.lower,
                upper: mid,
            },
            Self {
                lower: mid,
                upper: self.upper,
            },
        )
    }
}

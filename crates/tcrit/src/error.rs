//! Error types for the qdwell-tcrit crate.

use qdwell_roots::RootError;

use crate::criterion::Criterion;

/// Error type for all fallible operations in the qdwell-tcrit crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TcritError {
    /// Returned when fewer than two components are supplied.
    #[error("need at least 2 exponential components, got {n}")]
    TooFewComponents {
        /// Number of components.
        n: usize,
    },

    /// Returned when the time constant and area slices differ in length.
    #[error("taus length {taus} does not match areas length {areas}")]
    LengthMismatch {
        /// Length of the taus slice.
        taus: usize,
        /// Length of the areas slice.
        areas: usize,
    },

    /// Returned when a component has a non-positive time constant or a
    /// negative area.
    #[error("component {index} is invalid: tau = {tau}, area = {area}")]
    InvalidComponent {
        /// 0-indexed component.
        index: usize,
        /// Time constant (s).
        tau: f64,
        /// Area.
        area: f64,
    },

    /// Returned when a boundary index does not separate two components.
    #[error("boundary {boundary} is out of range for {n} components")]
    InvalidBoundary {
        /// 0-indexed boundary (between components `boundary` and `boundary + 1`).
        boundary: usize,
        /// Number of components.
        n: usize,
    },

    /// Returned when a criterion has no root between two components.
    #[error(
        "no {criterion} critical time between components {} and {}: {source}",
        .boundary + 1,
        .boundary + 2
    )]
    NoCriticalTime {
        /// 0-indexed boundary.
        boundary: usize,
        /// Criterion being solved.
        criterion: Criterion,
        /// Underlying root-finding error.
        source: RootError,
    },
}

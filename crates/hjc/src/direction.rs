//! Open or shut dwell direction and the matching Q-matrix blocks.

use std::fmt;
use std::ops::Range;

use nalgebra::DMatrix;
use qdwell_qmatrix::Mechanism;

/// Which sojourns are being described.
///
/// Every formula in this crate is written for dwells in a subset "A" left
/// for a subset "F". For open times A is the open subset; for shut times
/// the roles are swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Open times (A = open states).
    Open,
    /// Shut times (A = shut states).
    Shut,
}

impl Direction {
    /// Both directions, open first.
    pub const ALL: [Direction; 2] = [Direction::Open, Direction::Shut];

    /// Returns the opposite direction.
    pub fn other(self) -> Self {
        match self {
            Direction::Open => Direction::Shut,
            Direction::Shut => Direction::Open,
        }
    }

    /// States in which the dwell is spent.
    pub fn dwell_states(self, mec: &Mechanism) -> Range<usize> {
        match self {
            Direction::Open => mec.open_states(),
            Direction::Shut => mec.shut_states(),
        }
    }

    /// States that end the dwell.
    pub fn exit_states(self, mec: &Mechanism) -> Range<usize> {
        self.other().dwell_states(mec)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Open => f.write_str("open"),
            Direction::Shut => f.write_str("shut"),
        }
    }
}

/// Q-matrix blocks oriented for one direction.
///
/// `aa` holds rates within the dwell subset, `af` rates from it to the
/// exit subset, and so on.
#[derive(Debug, Clone)]
pub struct Blocks {
    /// Dwell to dwell.
    pub aa: DMatrix<f64>,
    /// Dwell to exit.
    pub af: DMatrix<f64>,
    /// Exit to dwell.
    pub fa: DMatrix<f64>,
    /// Exit to exit.
    pub ff: DMatrix<f64>,
}

impl Blocks {
    /// Extracts the blocks of `mec` for `direction`.
    pub fn new(mec: &Mechanism, direction: Direction) -> Self {
        match direction {
            Direction::Open => Self {
                aa: mec.qaa(),
                af: mec.qaf(),
                fa: mec.qfa(),
                ff: mec.qff(),
            },
            Direction::Shut => Self {
                aa: mec.qff(),
                af: mec.qfa(),
                fa: mec.qaf(),
                ff: mec.qaa(),
            },
        }
    }

    /// Number of dwell states.
    pub fn k_a(&self) -> usize {
        self.aa.nrows()
    }

    /// Number of exit states.
    pub fn k_f(&self) -> usize {
        self.ff.nrows()
    }
}

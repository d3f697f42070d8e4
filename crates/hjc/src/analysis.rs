//! One-call construction of every distribution for a direction.

use qdwell_qmatrix::Mechanism;
use qdwell_roots::RootSearch;
use tracing::info;

use crate::asymptotic::AsymptoticDistribution;
use crate::direction::Direction;
use crate::error::HjcError;
use crate::exact::ExactDistribution;
use crate::ideal::IdealDistribution;
use crate::missed::MissedEvents;
use crate::moments::exact_mean;

/// Ideal, asymptotic and exact distributions of dwells in one direction.
#[derive(Debug, Clone)]
pub struct DwellTimes {
    direction: Direction,
    ideal: IdealDistribution,
    missed: MissedEvents,
    exact: ExactDistribution,
    exact_mean: f64,
}

impl DwellTimes {
    /// Computes all distributions of `direction` at resolution `tres` (s).
    #[tracing::instrument(skip(mec, search), fields(k = mec.k()))]
    pub fn new(
        mec: &Mechanism,
        direction: Direction,
        tres: f64,
        search: &RootSearch,
    ) -> Result<Self, HjcError> {
        let ideal = IdealDistribution::new(mec, direction)?;
        let missed = MissedEvents::new(mec, direction, tres)?;
        let asymptotic = AsymptoticDistribution::new(&missed, search)?;
        let exact = ExactDistribution::new(mec, &missed, asymptotic)?;
        let exact_mean = exact_mean(&missed)?;
        info!(
            %direction,
            ideal_mean = ideal.mean(),
            exact_mean,
            "dwell-time distributions computed"
        );
        Ok(Self {
            direction,
            ideal,
            missed,
            exact,
            exact_mean,
        })
    }

    /// Computes open and shut distributions concurrently.
    pub fn both(
        mec: &Mechanism,
        tres: f64,
        search: &RootSearch,
    ) -> Result<(Self, Self), HjcError> {
        let (open, shut) = rayon::join(
            || Self::new(mec, Direction::Open, tres, search),
            || Self::new(mec, Direction::Shut, tres, search),
        );
        Ok((open?, shut?))
    }

    /// Returns the direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the time resolution (s).
    pub fn tres(&self) -> f64 {
        self.missed.tres()
    }

    /// Returns the ideal distribution.
    pub fn ideal(&self) -> &IdealDistribution {
        &self.ideal
    }

    /// Returns the HJC matrices.
    pub fn missed(&self) -> &MissedEvents {
        &self.missed
    }

    /// Returns the asymptotic distribution.
    pub fn asymptotic(&self) -> &AsymptoticDistribution {
        self.exact.asymptotic()
    }

    /// Returns the exact distribution.
    pub fn exact(&self) -> &ExactDistribution {
        &self.exact
    }

    /// Returns the mean observed dwell time with missed events (s).
    pub fn exact_mean(&self) -> f64 {
        self.exact_mean
    }
}

//! Mean dwell times, subset lifetimes and latencies.

use std::ops::Range;

use qdwell_qmatrix::{Mechanism, QMatrixError, inverse, ones};

use crate::checks::checked_ratio;
use crate::error::HjcError;
use crate::missed::MissedEvents;

/// Mean observed dwell time with missed events (s).
///
/// ```text
/// E[t] = τ + φ W(0)⁻¹ W'(0) W(0)⁻¹ QAF e^{QFF τ} 1
/// ```
///
/// # Errors
///
/// Returns [`HjcError::QMatrix`] if `W(0)` is singular.
pub fn exact_mean(me: &MissedEvents) -> Result<f64, HjcError> {
    let w0_inv = inverse(&me.w(0.0), "W(0)")?;
    let survivor_slope = &w0_inv * me.dw(0.0) * &w0_inv;
    Ok(me.tres() + me.phi().dot(&(survivor_slope * me.exit())))
}

/// Mean lifetime of a sojourn in the contiguous subset `subset` (s).
///
/// Equal to the subset's equilibrium occupancy divided by the equilibrium
/// flux leaving it.
///
/// # Errors
///
/// - [`HjcError::QMatrix`] if the subset is invalid or absorbing.
pub fn subset_mean_life(mec: &Mechanism, subset: Range<usize>) -> Result<f64, HjcError> {
    mec.check_subset(&subset)?;
    let p = mec.equilibrium()?;
    let q = mec.q();
    let occupancy: f64 = subset.clone().map(|i| p[i]).sum();

    let mut outflow = 0.0;
    for i in subset.clone() {
        for j in (0..mec.k()).filter(|j| !subset.contains(j)) {
            outflow += q[(i, j)] * p[i];
        }
    }
    if outflow <= 0.0 {
        return Err(QMatrixError::AbsorbingSubset {
            start: subset.start,
            end: subset.end,
        }
        .into());
    }
    checked_ratio(occupancy, outflow, || {
        format!("mean life of subset {}..{}", subset.start, subset.end)
    })
}

/// Mean time from entering `state` until the next crossing between the open
/// and shut subsets (s).
///
/// `p0 (-Q_S)⁻¹ 1`, where `S` is the subset containing `state` and `p0`
/// the unit vector on `state`.
pub fn mean_latency(mec: &Mechanism, state: usize) -> Result<f64, HjcError> {
    mec.check_state(state)?;
    let (subset, what) = if mec.is_open(state) {
        (mec.open_states(), "-QAA")
    } else {
        (mec.shut_states(), "-QFF")
    };
    let q_sub = mec.block(subset.clone(), subset.clone());
    let times = inverse(&(-q_sub), what)? * ones(subset.len());
    Ok(times[state - subset.start])
}

/// Equilibrium summary of one state.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSummary {
    /// 0-indexed state.
    pub state: usize,
    /// Display name.
    pub name: String,
    /// Equilibrium occupancy.
    pub occupancy: f64,
    /// Mean lifetime `-1/q_ii` (s).
    pub mean_life: f64,
    /// Mean latency to the next open/shut crossing (s).
    pub mean_latency: f64,
}

/// Equilibrium summary of a state subset.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetSummary {
    /// Subset label (`A`, `B` or `C`).
    pub name: &'static str,
    /// States in the subset.
    pub states: Range<usize>,
    /// Total equilibrium occupancy.
    pub occupancy: f64,
    /// Mean sojourn in the subset (s).
    pub mean_life: f64,
}

/// Per-state and per-subset equilibrium summary.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancySummary {
    /// One entry per state.
    pub states: Vec<StateSummary>,
    /// Subsets A (open), B (burst shut) and C (gap shut); empty subsets are
    /// omitted.
    pub subsets: Vec<SubsetSummary>,
}

/// Summarises occupancies, lifetimes and latencies of `mec`.
pub fn occupancy_summary(mec: &Mechanism) -> Result<OccupancySummary, HjcError> {
    let p = mec.equilibrium()?;
    let q = mec.q();

    let states = (0..mec.k())
        .map(|i| {
            Ok(StateSummary {
                state: i,
                name: mec.state_names()[i].clone(),
                occupancy: p[i],
                mean_life: checked_ratio(-1.0, q[(i, i)], || format!("lifetime of state {i}"))?,
                mean_latency: mean_latency(mec, i)?,
            })
        })
        .collect::<Result<Vec<_>, HjcError>>()?;

    let subsets = [
        ("A", mec.open_states()),
        ("B", mec.burst_states()),
        ("C", mec.gap_states()),
    ]
    .into_iter()
    .filter(|(_, range)| !range.is_empty())
    .map(|(name, range)| {
        Ok(SubsetSummary {
            name,
            occupancy: range.clone().map(|i| p[i]).sum(),
            mean_life: subset_mean_life(mec, range.clone())?,
            states: range,
        })
    })
    .collect::<Result<Vec<_>, HjcError>>()?;

    Ok(OccupancySummary { states, subsets })
}

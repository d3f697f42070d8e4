//! Pure conversion functions: TOML config structs -> crate API types.

use anyhow::{Context, Result, bail};

use qdwell_hjc::IdealComponents;
use qdwell_qmatrix::{Mechanism, samples};
use qdwell_roots::RootSearch;
use qdwell_tcrit::{Component, sort_components};

use crate::config::{MechanismToml, RootsToml};

/// Builds the mechanism named by `[mechanism]`.
///
/// Exactly one of `sample` or `q` may be set; with neither, CH82 is used.
pub fn build_mechanism(m: &MechanismToml) -> Result<Mechanism> {
    match (&m.sample, &m.q) {
        (Some(_), Some(_)) => {
            bail!("[mechanism] must have at most one of sample or q, got both")
        }
        (None, Some(rows)) => build_inline(rows, m),
        (Some(name), None) => build_sample(name, m),
        (None, None) => build_sample("ch82", m),
    }
}

/// Parses a built-in sample name into a mechanism.
fn build_sample(name: &str, m: &MechanismToml) -> Result<Mechanism> {
    let mec = match name.to_lowercase().as_str() {
        "ch82" => samples::ch82(m.concentration),
        "two-state" | "two_state" => samples::two_state(m.closing, m.opening),
        other => bail!("unknown sample mechanism: {other:?}"),
    };
    mec.with_context(|| format!("failed to build sample mechanism {name:?}"))
}

/// Builds a mechanism from inline rows, filling each diagonal with minus
/// its row's off-diagonal sum.
fn build_inline(rows: &[Vec<f64>], m: &MechanismToml) -> Result<Mechanism> {
    let k = rows.len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != k) {
        bail!("[mechanism].q row {i} has {} entries, expected {k}", row.len());
    }
    let Some(k_a) = m.k_a else {
        bail!("[mechanism].k_a is required with an inline q");
    };
    if k_a >= k {
        bail!("[mechanism].k_a = {k_a} leaves no shut states in a {k}-state mechanism");
    }

    let mut filled = rows.to_vec();
    for (i, row) in filled.iter_mut().enumerate() {
        row[i] = 0.0;
        let sum: f64 = row.iter().sum();
        row[i] = -sum;
    }

    let mut mec = Mechanism::from_rows(&filled, k_a, k - k_a).context("invalid Q-matrix")?;
    if let Some(k_b) = m.k_b {
        mec = mec.with_burst_subsets(k_b).context("invalid [mechanism].k_b")?;
    }
    if let Some(names) = &m.names {
        mec = mec
            .with_state_names(names.iter().cloned())
            .context("invalid [mechanism].names")?;
    }
    Ok(mec)
}

/// Builds a validated [`RootSearch`] from the TOML root settings.
pub fn build_root_search(roots: &RootsToml) -> Result<RootSearch> {
    let search = RootSearch::new()
        .with_interval(roots.lower, roots.upper)
        .with_tolerance(roots.tolerance)
        .with_max_iter(roots.max_iter)
        .with_max_depth(roots.max_depth);
    search.validate().context("invalid [roots] settings")?;
    Ok(search)
}

/// Sorted (tau, area) components of an ideal distribution, as consumed by
/// the critical-time solver.
///
/// A single shut state gives one component and therefore no boundary; it
/// is passed through unsorted rather than rejected.
pub fn tcrit_components(ideal: &IdealComponents) -> Result<Vec<Component>> {
    if ideal.len() < 2 {
        return Ok(ideal
            .taus()
            .into_iter()
            .zip(ideal.areas())
            .map(|(tau, area)| Component { tau, area })
            .collect());
    }
    sort_components(&ideal.taus(), &ideal.areas())
        .context("ideal shut-time components are unusable for tcrit")
}

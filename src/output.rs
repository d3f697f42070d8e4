//! JSON output structures. All times are in seconds, rates in s⁻¹.

use anyhow::{Context, Result};
use serde::Serialize;

use qdwell_hjc::{DwellTimes, OccupancySummary, PdfRow};

use crate::tcrit_cmd::TcritEntry;

/// Full report.
#[derive(Debug, Serialize)]
pub struct ReportOutput {
    pub tres: f64,
    pub states: Vec<StateOutput>,
    pub subsets: Vec<SubsetOutput>,
    pub open: DistributionOutput,
    pub shut: DistributionOutput,
    pub tcrit: Vec<TcritOutput>,
}

/// Equilibrium summary of one state.
#[derive(Debug, Serialize)]
pub struct StateOutput {
    /// 1-indexed state number.
    pub state: usize,
    pub name: String,
    pub occupancy: f64,
    pub mean_life: f64,
    pub mean_latency: f64,
}

/// Equilibrium summary of a subset.
#[derive(Debug, Serialize)]
pub struct SubsetOutput {
    pub name: &'static str,
    /// 1-indexed first and last states.
    pub first: usize,
    pub last: usize,
    pub occupancy: f64,
    pub mean_life: f64,
}

/// Ideal, asymptotic and exact distributions of one direction.
#[derive(Debug, Serialize)]
pub struct DistributionOutput {
    pub direction: String,
    pub ideal_phi: Vec<f64>,
    pub hjc_phi: Vec<f64>,
    pub ideal: Vec<ComponentOutput>,
    pub ideal_mean: f64,
    pub asymptotic: Vec<AsymptoticOutput>,
    pub asymptotic_area_sum: f64,
    pub exact_mean: f64,
    pub exact: Vec<GammaOutput>,
}

#[derive(Debug, Serialize)]
pub struct ComponentOutput {
    pub tau: f64,
    pub area: f64,
    pub rate: f64,
}

#[derive(Debug, Serialize)]
pub struct AsymptoticOutput {
    pub tau: f64,
    pub area: f64,
    pub rate: f64,
    /// Area renormalised to the `[0, ∞)` range.
    pub renormalized_area: f64,
}

#[derive(Debug, Serialize)]
pub struct GammaOutput {
    pub eigenvalue: f64,
    pub g00: f64,
    pub g10: f64,
    pub g11: f64,
}

/// One critical time, or the reason it could not be found.
#[derive(Debug, Serialize)]
pub struct TcritOutput {
    /// 1-indexed components on either side of the boundary.
    pub components: [usize; 2],
    pub criterion: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcrit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enf: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ens: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pf: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Tabulated pdfs of one direction.
#[derive(Debug, Serialize)]
pub struct PdfOutput {
    pub direction: String,
    pub tres: f64,
    pub log_scaled: bool,
    pub rows: Vec<PdfRowOutput>,
}

#[derive(Debug, Serialize)]
pub struct PdfRowOutput {
    pub t: f64,
    pub ideal: f64,
    pub asymptotic: f64,
    pub exact: f64,
}

impl From<&PdfRow> for PdfRowOutput {
    fn from(row: &PdfRow) -> Self {
        Self {
            t: row.t,
            ideal: row.ideal,
            asymptotic: row.asymptotic,
            exact: row.exact,
        }
    }
}

/// Splits an occupancy summary into state and subset rows.
pub fn occupancy_output(summary: &OccupancySummary) -> (Vec<StateOutput>, Vec<SubsetOutput>) {
    let states = summary
        .states
        .iter()
        .map(|s| StateOutput {
            state: s.state + 1,
            name: s.name.clone(),
            occupancy: s.occupancy,
            mean_life: s.mean_life,
            mean_latency: s.mean_latency,
        })
        .collect();
    let subsets = summary
        .subsets
        .iter()
        .map(|s| SubsetOutput {
            name: s.name,
            first: s.states.start + 1,
            last: s.states.end,
            occupancy: s.occupancy,
            mean_life: s.mean_life,
        })
        .collect();
    (states, subsets)
}

impl From<&DwellTimes> for DistributionOutput {
    fn from(d: &DwellTimes) -> Self {
        let components = d.ideal().components();
        let ideal = components
            .taus()
            .into_iter()
            .zip(components.areas())
            .zip(components.eigenvalues())
            .map(|((tau, area), &rate)| ComponentOutput { tau, area, rate })
            .collect();

        let asymptotic = d.asymptotic();
        let asymptotic_rows = asymptotic
            .taus()
            .into_iter()
            .zip(asymptotic.areas())
            .zip(asymptotic.renormalized_areas())
            .zip(asymptotic.rates())
            .map(|(((tau, &area), renormalized_area), rate)| AsymptoticOutput {
                tau,
                area,
                rate,
                renormalized_area,
            })
            .collect();

        let gamma = d.exact().gamma();
        let exact = gamma
            .eigenvalues()
            .iter()
            .zip(gamma.g00())
            .zip(gamma.g10())
            .zip(gamma.g11())
            .map(|(((&eigenvalue, &g00), &g10), &g11)| GammaOutput {
                eigenvalue,
                g00,
                g10,
                g11,
            })
            .collect();

        Self {
            direction: d.direction().to_string(),
            ideal_phi: d.ideal().phi().iter().copied().collect(),
            hjc_phi: d.missed().phi().iter().copied().collect(),
            ideal,
            ideal_mean: d.ideal().mean(),
            asymptotic: asymptotic_rows,
            asymptotic_area_sum: asymptotic.area_sum(),
            exact_mean: d.exact_mean(),
            exact,
        }
    }
}

impl From<&TcritEntry> for TcritOutput {
    fn from(entry: &TcritEntry) -> Self {
        let mut out = Self {
            components: [entry.boundary + 1, entry.boundary + 2],
            criterion: entry.criterion.label(),
            tcrit: None,
            enf: None,
            ens: None,
            pf: None,
            ps: None,
            error: None,
        };
        match &entry.result {
            Ok(ct) => {
                let m = ct.misclassification;
                out.tcrit = Some(m.tcrit);
                out.enf = Some(m.enf);
                out.ens = Some(m.ens);
                out.pf = Some(m.pf);
                out.ps = Some(m.ps);
            }
            Err(e) => out.error = Some(e.to_string()),
        }
        out
    }
}

/// Serialises `value` as pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialise JSON output")
}

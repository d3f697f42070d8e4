//! Report command: occupancies, open and shut distributions and tcrit.

use std::fmt::Write;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use qdwell_hjc::{DwellTimes, OccupancySummary, occupancy_summary};
use qdwell_qmatrix::Mechanism;
use qdwell_roots::{Bisection, RootSearch};

use crate::format::{ms, percent, sig};
use crate::output::{self, DistributionOutput, ReportOutput};
use crate::tcrit_cmd::TcritSection;

const RULE: &str = "*******************************************";

/// Every result shown in the report.
#[derive(Debug)]
pub struct Report {
    pub tres: f64,
    pub occupancy: OccupancySummary,
    pub open: DwellTimes,
    pub shut: DwellTimes,
    pub tcrit: TcritSection,
}

impl Report {
    /// Runs every calculation for `mec` at resolution `tres`.
    pub fn compute(mec: &Mechanism, tres: f64, search: &RootSearch) -> Result<Self> {
        let occupancy = occupancy_summary(mec).context("occupancy summary failed")?;
        let (open, shut) =
            DwellTimes::both(mec, tres, search).context("dwell-time distributions failed")?;
        let tcrit = TcritSection::for_mechanism(mec, &Bisection::new())?;
        Ok(Self {
            tres,
            occupancy,
            open,
            shut,
            tcrit,
        })
    }

    /// Formats the text report.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        writeln!(out, "Time resolution (ms) = {}", ms(self.tres))?;
        self.render_occupancies(&mut out)?;
        for dwell in [&self.open, &self.shut] {
            render_distribution(&mut out, dwell)?;
        }
        self.tcrit.render(&mut out)?;
        Ok(out)
    }

    fn render_occupancies(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "\n{RULE}")?;
        let mut shut_header = false;
        for subset in &self.occupancy.subsets {
            if subset.name == "A" {
                occupancy_header(out, "Open", "to next shutting")?;
            } else if !shut_header {
                occupancy_header(out, "Shut", "to next opening")?;
                shut_header = true;
            }
            writeln!(
                out,
                "{:<14}{:>14}{:>14}",
                format!("Subset {}", subset.name),
                sig(subset.occupancy, 5),
                ms(subset.mean_life)
            )?;
            for state in &self.occupancy.states[subset.states.clone()] {
                writeln!(
                    out,
                    "{:<14}{:>14}{:>14}{:>14}",
                    format!("{} {}", state.state + 1, state.name),
                    sig(state.occupancy, 5),
                    ms(state.mean_life),
                    ms(state.mean_latency)
                )?;
            }
        }

        writeln!(out, "\nInitial HJC vector for openings phiOp =")?;
        phi_row(out, self.open.missed().phi().iter())?;
        writeln!(out, "\nInitial HJC vector for shuttings phiSh =")?;
        phi_row(out, self.shut.missed().phi().iter())
    }

    /// Machine-readable form of the report.
    pub fn to_output(&self) -> ReportOutput {
        let (states, subsets) = output::occupancy_output(&self.occupancy);
        ReportOutput {
            tres: self.tres,
            states,
            subsets,
            open: DistributionOutput::from(&self.open),
            shut: DistributionOutput::from(&self.shut),
            tcrit: self.tcrit.to_output(),
        }
    }
}

fn occupancy_header(out: &mut String, kind: &str, latency: &str) -> std::fmt::Result {
    writeln!(
        out,
        "\n{:<14}{:>14}{:>14}{:>22}",
        kind, "Equilibrium", "Mean life", "Mean latency (ms)"
    )?;
    writeln!(
        out,
        "{:<14}{:>14}{:>14}{:>22}",
        "state", "occupancy", "(ms)", latency
    )
}

fn phi_row<'a>(out: &mut String, phi: impl Iterator<Item = &'a f64>) -> std::fmt::Result {
    for p in phi {
        write!(out, "{:>12}", sig(*p, 5))?;
    }
    writeln!(out)
}

fn render_distribution(out: &mut String, dwell: &DwellTimes) -> std::fmt::Result {
    let kind = dwell.direction().to_string().to_uppercase();
    let noun = dwell.direction().to_string();
    writeln!(out, "\n{RULE}")?;

    writeln!(out, "\nIDEAL {kind} TIME DISTRIBUTION")?;
    component_header(out)?;
    let components = dwell.ideal().components();
    for (i, ((tau, area), rate)) in components
        .taus()
        .into_iter()
        .zip(components.areas())
        .zip(components.eigenvalues())
        .enumerate()
    {
        component_row(out, i, tau, area, *rate)?;
    }
    writeln!(out, "Mean {noun} time (ms) = {}", ms(dwell.ideal().mean()))?;

    writeln!(out, "\nASYMPTOTIC {kind} TIME DISTRIBUTION")?;
    component_header(out)?;
    let asymptotic = dwell.asymptotic();
    for (i, ((tau, area), rate)) in asymptotic
        .taus()
        .into_iter()
        .zip(asymptotic.areas())
        .zip(asymptotic.rates())
        .enumerate()
    {
        component_row(out, i, tau, *area, rate)?;
    }
    writeln!(out, "Total area (%) = {}", percent(asymptotic.area_sum()))?;
    writeln!(
        out,
        "Areas for asymptotic pdf renormalised for t=0 to infinity (and sum=1), \
         so areas can be compared with ideal pdf."
    )?;
    for (i, area) in asymptotic.renormalized_areas().into_iter().enumerate() {
        writeln!(out, "{:<6}{:>14}", i + 1, percent(area))?;
    }
    writeln!(out, "Mean {noun} time (ms) = {}", ms(dwell.exact_mean()))?;

    writeln!(out, "\nEXACT {kind} TIME DISTRIBUTION")?;
    writeln!(
        out,
        "{:>14}{:>14}{:>14}{:>14}",
        "eigen", "g00(m)", "g10(m)", "g11(m)"
    )?;
    let gamma = dwell.exact().gamma();
    for i in 0..gamma.eigenvalues().len() {
        writeln!(
            out,
            "{:>14}{:>14}{:>14}{:>14}",
            sig(gamma.eigenvalues()[i], 5),
            sig(gamma.g00()[i], 5),
            sig(gamma.g10()[i], 5),
            sig(gamma.g11()[i], 5)
        )?;
    }
    Ok(())
}

fn component_header(out: &mut String) -> std::fmt::Result {
    writeln!(
        out,
        "{:<6}{:>14}{:>14}{:>22}",
        "term", "tau (ms)", "area (%)", "rate const (1/sec)"
    )
}

fn component_row(out: &mut String, i: usize, tau: f64, area: f64, rate: f64) -> std::fmt::Result {
    writeln!(
        out,
        "{:<6}{:>14}{:>14}{:>22}",
        i + 1,
        ms(tau),
        percent(area),
        sig(rate, 5)
    )
}

/// Run the report command.
pub fn run(mec: &Mechanism, tres: f64, search: &RootSearch, json: bool) -> Result<()> {
    let _cmd = info_span!("report").entered();
    let report = Report::compute(mec, tres, search)?;
    info!(
        open_roots = report.open.asymptotic().roots().len(),
        shut_roots = report.shut.asymptotic().roots().len(),
        "report computed"
    );

    if json {
        println!("{}", output::to_json(&report.to_output())?);
    } else {
        print!("{}", report.render()?);
    }
    Ok(())
}

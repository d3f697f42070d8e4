//! Tcrit command: burst critical times from the ideal shut-time components.

use std::fmt::Write;

use anyhow::Result;
use tracing::{info, info_span, warn};

use qdwell_hjc::{Direction, IdealDistribution};
use qdwell_qmatrix::Mechanism;
use qdwell_roots::Bisection;
use qdwell_tcrit::{Component, CriticalTime, Criterion, TcritError, critical_time};

use crate::convert;
use crate::format::{ms, percent, sig};
use crate::output::{self, TcritOutput};

/// Outcome of one criterion at one boundary.
#[derive(Debug)]
pub struct TcritEntry {
    pub boundary: usize,
    pub criterion: Criterion,
    pub result: Result<CriticalTime, TcritError>,
}

/// Sorted components with every boundary/criterion solved.
#[derive(Debug)]
pub struct TcritSection {
    pub components: Vec<Component>,
    pub entries: Vec<TcritEntry>,
}

impl TcritSection {
    /// Solves all criteria at every boundary of `components`.
    ///
    /// Failures are kept per entry so that one degenerate boundary does not
    /// hide the others.
    pub fn solve(components: Vec<Component>, bisection: &Bisection) -> Self {
        let mut entries = Vec::new();
        for boundary in 0..components.len().saturating_sub(1) {
            for criterion in Criterion::ALL {
                let result = critical_time(&components, boundary, criterion, bisection);
                if let Err(e) = &result {
                    warn!(boundary, %criterion, error = %e, "no critical time");
                }
                entries.push(TcritEntry {
                    boundary,
                    criterion,
                    result,
                });
            }
        }
        Self {
            components,
            entries,
        }
    }

    /// Computes the section for the ideal shut times of `mec`.
    pub fn for_mechanism(mec: &Mechanism, bisection: &Bisection) -> Result<Self> {
        let ideal = IdealDistribution::new(mec, Direction::Shut)?;
        let components = convert::tcrit_components(ideal.components())?;
        if components.len() < 2 {
            info!(
                components = components.len(),
                "fewer than two shut-time components, no critical time to solve"
            );
        }
        Ok(Self::solve(components, bisection))
    }

    /// Number of boundaries.
    pub fn boundaries(&self) -> usize {
        self.components.len().saturating_sub(1)
    }

    fn entry(&self, boundary: usize, criterion: Criterion) -> Option<&TcritEntry> {
        self.entries
            .iter()
            .find(|e| e.boundary == boundary && e.criterion == criterion)
    }

    /// Appends the detailed and summary tcrit tables to `out`.
    pub fn render(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out, "\n*******************************************")?;
        writeln!(
            out,
            "CALCULATIONS BASED ON DIVISION INTO BURSTS BY tcrit- CRITICAL TIME."
        )?;
        writeln!(out, "\nShut time components (sorted)")?;
        writeln!(out, "{:<6}{:>14}{:>14}", "term", "tau (ms)", "area (%)")?;
        for (i, c) in self.components.iter().enumerate() {
            writeln!(out, "{:<6}{:>14}{:>14}", i + 1, ms(c.tau), percent(c.area))?;
        }

        for boundary in 0..self.boundaries() {
            writeln!(
                out,
                "\nCritical time between components {} and {}",
                boundary + 1,
                boundary + 2
            )?;
            for criterion in Criterion::ALL {
                writeln!(out, "\n{}", criterion.description())?;
                match self.entry(boundary, criterion).map(|e| &e.result) {
                    Some(Ok(ct)) => render_misclassification(out, ct)?,
                    Some(Err(e)) => writeln!(out, "not found: {e}")?,
                    None => {}
                }
            }
        }

        writeln!(out, "\nSUMMARY of tcrit values (ms):")?;
        write!(out, "{:<12}", "Components")?;
        for criterion in Criterion::ALL {
            write!(out, "{:>12}", criterion.label())?;
        }
        writeln!(out)?;
        for boundary in 0..self.boundaries() {
            write!(out, "{:<12}", format!("{} to {}", boundary + 1, boundary + 2))?;
            for criterion in Criterion::ALL {
                let cell = match self.entry(boundary, criterion).map(|e| &e.result) {
                    Some(Ok(ct)) => ms(ct.tcrit()),
                    _ => "-".to_string(),
                };
                write!(out, "{cell:>12}")?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    /// JSON rows, one per boundary and criterion.
    pub fn to_output(&self) -> Vec<TcritOutput> {
        self.entries.iter().map(TcritOutput::from).collect()
    }
}

fn render_misclassification(out: &mut String, ct: &CriticalTime) -> std::fmt::Result {
    let m = ct.misclassification;
    writeln!(out, "tcrit = {} ms", ms(m.tcrit))?;
    writeln!(
        out,
        "% misclassified: short = {}; long = {}",
        percent(m.pf),
        percent(m.ps)
    )?;
    writeln!(
        out,
        "# misclassified (out of 100): short = {}; long = {}",
        sig(m.enf * 100.0, 5),
        sig(m.ens * 100.0, 5)
    )?;
    writeln!(
        out,
        "Total # misclassified (out of 100) = {}",
        sig(m.total() * 100.0, 5)
    )
}

/// Run the tcrit command.
pub fn run(mec: &Mechanism, json: bool) -> Result<()> {
    let _cmd = info_span!("tcrit").entered();
    let section = TcritSection::for_mechanism(mec, &Bisection::new())?;
    info!(
        components = section.components.len(),
        boundaries = section.boundaries(),
        "critical times solved"
    );

    if json {
        println!("{}", output::to_json(&section.to_output())?);
    } else {
        let mut text = String::new();
        section.render(&mut text)?;
        print!("{text}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qdwell_qmatrix::samples;

    #[test]
    fn ch82_boundaries_all_solved() {
        let mec = samples::ch82(1e-7).unwrap();
        let section = TcritSection::for_mechanism(&mec, &Bisection::new()).unwrap();
        assert_eq!(section.boundaries(), 2);
        assert_eq!(section.entries.len(), 6);
        assert!(section.entries.iter().all(|e| e.result.is_ok()));

        let dc = section.entry(0, Criterion::EqualPercent).unwrap();
        let tcrit = dc.result.as_ref().unwrap().tcrit();
        assert_relative_eq!(tcrit * 1000.0, 0.23317, max_relative = 1e-4);
    }

    #[test]
    fn render_contains_summary_rows() {
        let mec = samples::ch82(1e-7).unwrap();
        let section = TcritSection::for_mechanism(&mec, &Bisection::new()).unwrap();
        let mut text = String::new();
        section.render(&mut text).unwrap();
        assert!(text.contains("Critical time between components 1 and 2"));
        assert!(text.contains("SUMMARY of tcrit values"));
        assert!(text.contains("2 to 3"));
        assert!(text.contains("Jackson"));
    }

    #[test]
    fn single_shut_state_has_empty_summary() {
        let mec = samples::two_state(1000.0, 2000.0).unwrap();
        let section = TcritSection::for_mechanism(&mec, &Bisection::new()).unwrap();
        assert_eq!(section.components.len(), 1);
        assert_eq!(section.boundaries(), 0);
        assert!(section.entries.is_empty());
        assert!(section.to_output().is_empty());

        let mut text = String::new();
        section.render(&mut text).unwrap();
        assert!(text.contains("SUMMARY of tcrit values"));
        assert!(!text.contains("Critical time between components"));
    }

    #[test]
    fn failed_boundary_is_reported_not_dropped() {
        let components = qdwell_tcrit::sort_components(&[1.0, 1.01], &[0.999, 0.001]).unwrap();
        let section = TcritSection::solve(components, &Bisection::new());
        assert_eq!(section.entries.len(), 3);
        let cn = section.entry(0, Criterion::EqualCount).unwrap();
        assert!(cn.result.is_err());

        let json = section.to_output();
        let cn_json = json.iter().find(|o| o.criterion == "C&N").unwrap();
        assert!(cn_json.tcrit.is_none());
        assert!(cn_json.error.is_some());
    }
}

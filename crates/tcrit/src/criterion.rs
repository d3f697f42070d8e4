//! Misclassification criteria for choosing a critical time.
//!
//! Shut times shorter than `tcrit` are classed as gaps within bursts and
//! longer ones as gaps between bursts. For a boundary between the fast
//! components `0..=i` and the slow components `i+1..`:
//!
//! ```text
//! enf = Σ_fast a e^{-t/τ}          fast gaps longer than t
//! ens = Σ_slow a (1 - e^{-t/τ})    slow gaps shorter than t
//! pf  = enf / Σ_fast a
//! ps  = ens / Σ_slow a
//! ```

use std::fmt;

use crate::component::Component;

/// Rule that fixes the critical time between two groups of components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Equal fractions of each group misclassified (`pf = ps`).
    EqualPercent,
    /// Equal numbers misclassified (`enf = ens`), after Clapham & Neher.
    EqualCount,
    /// Minimum total number misclassified, after Jackson et al.
    MinTotal,
}

impl Criterion {
    /// All criteria in report order.
    pub const ALL: [Criterion; 3] = [
        Criterion::EqualPercent,
        Criterion::EqualCount,
        Criterion::MinTotal,
    ];

    /// Short label used in summary tables.
    pub fn label(self) -> &'static str {
        match self {
            Criterion::EqualPercent => "DC",
            Criterion::EqualCount => "C&N",
            Criterion::MinTotal => "Jackson",
        }
    }

    /// Long description.
    pub fn description(self) -> &'static str {
        match self {
            Criterion::EqualPercent => "Equal % misclassified (DC criterion)",
            Criterion::EqualCount => "Equal # misclassified (Clapham & Neher criterion)",
            Criterion::MinTotal => "Minimum total # misclassified (Jackson et al criterion)",
        }
    }

    /// Function whose root is the critical time at `boundary`.
    pub(crate) fn cost(self, t: f64, components: &[Component], boundary: usize) -> f64 {
        let (fast, slow) = components.split_at(boundary + 1);
        match self {
            Criterion::EqualPercent => {
                let m = Misclassification::at(t, components, boundary);
                m.ps - m.pf
            }
            Criterion::EqualCount => {
                let m = Misclassification::at(t, components, boundary);
                m.ens - m.enf
            }
            Criterion::MinTotal => density(t, fast) - density(t, slow),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn density(t: f64, components: &[Component]) -> f64 {
    components
        .iter()
        .map(|c| c.area / c.tau * (-t / c.tau).exp())
        .sum()
}

/// Expected misclassification at a trial critical time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Misclassification {
    /// Critical time (s).
    pub tcrit: f64,
    /// Fraction of all events that are fast but longer than `tcrit`.
    pub enf: f64,
    /// Fraction of all events that are slow but shorter than `tcrit`.
    pub ens: f64,
    /// Fraction of fast events misclassified.
    pub pf: f64,
    /// Fraction of slow events misclassified.
    pub ps: f64,
}

impl Misclassification {
    /// Evaluates misclassification at `t` for the boundary after component
    /// `boundary`.
    pub fn at(t: f64, components: &[Component], boundary: usize) -> Self {
        let (fast, slow) = components.split_at(boundary + 1);
        let enf: f64 = fast.iter().map(|c| c.area * (-t / c.tau).exp()).sum();
        let ens: f64 = slow.iter().map(|c| -c.area * (-t / c.tau).exp_m1()).sum();
        let fast_area: f64 = fast.iter().map(|c| c.area).sum();
        let slow_area: f64 = slow.iter().map(|c| c.area).sum();
        Self {
            tcrit: t,
            enf,
            ens,
            pf: enf / fast_area,
            ps: ens / slow_area,
        }
    }

    /// Total fraction of events misclassified.
    pub fn total(&self) -> f64 {
        self.enf + self.ens
    }
}

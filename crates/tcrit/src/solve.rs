//! Critical times by bisection between adjacent components.

use qdwell_roots::{Bisection, Bracket};
use tracing::debug;

use crate::component::Component;
use crate::criterion::{Criterion, Misclassification};
use crate::error::TcritError;

/// Critical time for one boundary and criterion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalTime {
    /// 0-indexed boundary (between components `boundary` and `boundary + 1`).
    pub boundary: usize,
    /// Criterion solved.
    pub criterion: Criterion,
    /// Misclassification at the critical time.
    pub misclassification: Misclassification,
}

impl CriticalTime {
    /// The critical time (s).
    pub fn tcrit(&self) -> f64 {
        self.misclassification.tcrit
    }
}

/// Solves `criterion` between components `boundary` and `boundary + 1`,
/// searching `(τ_boundary, τ_boundary+1)`.
///
/// `components` must be sorted ascending by time constant.
///
/// # Errors
///
/// - [`TcritError::InvalidBoundary`] if `boundary + 1` is not a component.
/// - [`TcritError::NoCriticalTime`] if the criterion has no sign change in
///   the bracket or bisection fails.
pub fn critical_time(
    components: &[Component],
    boundary: usize,
    criterion: Criterion,
    bisection: &Bisection,
) -> Result<CriticalTime, TcritError> {
    if boundary + 1 >= components.len() {
        return Err(TcritError::InvalidBoundary {
            boundary,
            n: components.len(),
        });
    }
    let no_root = |source| TcritError::NoCriticalTime {
        boundary,
        criterion,
        source,
    };
    let bracket = Bracket::new(components[boundary].tau, components[boundary + 1].tau)
        .map_err(no_root)?;
    let root = bisection
        .solve(bracket, |t| criterion.cost(t, components, boundary))
        .map_err(no_root)?;

    debug!(boundary, %criterion, tcrit = root.x, "critical time");
    Ok(CriticalTime {
        boundary,
        criterion,
        misclassification: Misclassification::at(root.x, components, boundary),
    })
}

/// Critical times under every criterion for every adjacent pair.
///
/// Returns one `[DC, C&N, Jackson]` triple per boundary.
pub fn critical_times(
    components: &[Component],
    bisection: &Bisection,
) -> Result<Vec<[CriticalTime; 3]>, TcritError> {
    if components.len() < 2 {
        return Err(TcritError::TooFewComponents {
            n: components.len(),
        });
    }
    (0..components.len() - 1)
        .map(|boundary| {
            let [dc, cn, jackson] = Criterion::ALL;
            Ok([
                critical_time(components, boundary, dc, bisection)?,
                critical_time(components, boundary, cn, bisection)?,
                critical_time(components, boundary, jackson, bisection)?,
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::sort_components;
    use approx::assert_relative_eq;

    #[test]
    fn equal_count_balances_counts() {
        let c = sort_components(&[1e-3, 1.0], &[0.5, 0.5]).unwrap();
        let ct = critical_time(&c, 0, Criterion::EqualCount, &Bisection::new()).unwrap();
        assert!(ct.tcrit() > 1e-3 && ct.tcrit() < 1.0);
        let m = ct.misclassification;
        assert_relative_eq!(m.enf, m.ens, max_relative = 1e-8);
    }

    #[test]
    fn equal_percent_balances_fractions() {
        let c = sort_components(&[1e-3, 0.1], &[0.9, 0.1]).unwrap();
        let ct = critical_time(&c, 0, Criterion::EqualPercent, &Bisection::new()).unwrap();
        let m = ct.misclassification;
        assert_relative_eq!(m.pf, m.ps, max_relative = 1e-8);
    }

    #[test]
    fn min_total_is_a_minimum() {
        let c = sort_components(&[1e-3, 0.1], &[0.7, 0.3]).unwrap();
        let ct = critical_time(&c, 0, Criterion::MinTotal, &Bisection::new()).unwrap();
        let at = |t: f64| Misclassification::at(t, &c, 0).total();
        let t = ct.tcrit();
        assert!(at(t) <= at(t * 1.01));
        assert!(at(t) <= at(t * 0.99));
    }

    #[test]
    fn boundary_out_of_range() {
        let c = sort_components(&[1e-3, 1.0], &[0.5, 0.5]).unwrap();
        assert!(matches!(
            critical_time(&c, 1, Criterion::EqualCount, &Bisection::new()),
            Err(TcritError::InvalidBoundary { boundary: 1, n: 2 })
        ));
    }

    #[test]
    fn overlapping_components_have_no_root() {
        // Nearly equal time constants: the slow group is too small for its
        // misclassified count to catch up within the bracket.
        let c = sort_components(&[1.0, 1.01], &[0.999, 0.001]).unwrap();
        assert!(matches!(
            critical_time(&c, 0, Criterion::EqualCount, &Bisection::new()),
            Err(TcritError::NoCriticalTime { boundary: 0, .. })
        ));
    }
}

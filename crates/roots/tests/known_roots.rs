use approx::assert_relative_eq;
use qdwell_roots::{Bisection, Bracket, RootError, RootSearch, split_brackets};

/// Characteristic polynomial of diag(-a1, -a2, ...) evaluated at s.
fn det(roots: &[f64], s: f64) -> f64 {
    roots.iter().map(|r| s - r).product()
}

fn count(roots: &[f64]) -> impl FnMut(f64) -> Result<usize, RootError> + '_ {
    move |s| Ok(roots.iter().filter(|&&r| r < s).count())
}

fn solve_all(roots: &[f64], search: &RootSearch) -> Vec<f64> {
    let brackets = split_brackets(search.bracket().unwrap(), roots.len(), 100, count(roots))
        .expect("brackets isolate every root");
    brackets
        .into_iter()
        .map(|b| search.bisection().solve(b, |s| det(roots, s)).unwrap().x)
        .collect()
}

#[test]
fn quadratic_roots_to_relative_tolerance() {
    let roots = [-7.0, -3.0];
    let found = solve_all(&roots, &RootSearch::new());
    for (f, r) in found.iter().zip(roots) {
        assert_relative_eq!(*f, r, max_relative = 1e-10);
    }
}

#[test]
fn rates_spanning_decades() {
    let roots = [-19011.05, -2062.929, -0.263872];
    let found = solve_all(&roots, &RootSearch::new());
    for (f, r) in found.iter().zip(roots) {
        assert_relative_eq!(*f, r, max_relative = 1e-10);
    }
}

#[test]
fn close_pair_is_separated() {
    let roots = [-1000.0, -1000.5, -10.0];
    let mut sorted = roots;
    sorted.sort_by(f64::total_cmp);
    let found = solve_all(&roots, &RootSearch::new());
    for (f, r) in found.iter().zip(sorted) {
        assert_relative_eq!(*f, r, max_relative = 1e-10);
    }
}

#[test]
fn looser_tolerance_stops_earlier() {
    let bracket = Bracket::new(-10.0, -5.0).unwrap();
    let tight = Bisection::new().solve(bracket, |s| s + 7.0).unwrap();
    let loose = Bisection::new()
        .with_tolerance(1e-3)
        .solve(bracket, |s| s + 7.0)
        .unwrap();
    assert!(loose.iterations < tight.iterations);
    assert_relative_eq!(loose.x, -7.0, max_relative = 1e-3);
}

#[test]
fn root_outside_interval_is_reported() {
    let roots = [-2e5, -3.0];
    let search = RootSearch::new();
    let result = split_brackets(search.bracket().unwrap(), 2, 100, count(&roots));
    assert!(matches!(
        result,
        Err(RootError::BracketCountMismatch {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

use approx::assert_relative_eq;
use nalgebra::DMatrix;
use qdwell_hjc::{
    AsymptoticDistribution, Direction, DwellTimes, ExactDistribution, IdealDistribution,
    MissedEvents, asymptotic_pdf, exact_mean, exact_pdf, ideal_dwell_time_pdf, log_grid,
    pdf_table,
};
use qdwell_qmatrix::{Mechanism, samples};
use qdwell_roots::RootSearch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random reversible linear scheme `O1 - ... - Ok_a - C1 - ... - Ck_f` with
/// rates between 1e2 and 1e4 s⁻¹.
fn random_mechanism(k: usize, k_a: usize, seed: u64) -> Mechanism {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut q = DMatrix::zeros(k, k);
    for i in 0..k - 1 {
        q[(i, i + 1)] = 10f64.powf(rng.random_range(2.0..4.0));
        q[(i + 1, i)] = 10f64.powf(rng.random_range(2.0..4.0));
    }
    samples::fill_diagonal(&mut q);
    Mechanism::new(q, k_a, k - k_a).expect("random mechanism is valid")
}

/// Composite Simpson rule with `n` (even) intervals.
fn simpson(f: impl Fn(f64) -> f64, a: f64, b: f64, n: usize) -> f64 {
    let h = (b - a) / n as f64;
    let inner: f64 = (1..n)
        .map(|i| {
            let w = if i % 2 == 1 { 4.0 } else { 2.0 };
            w * f(a + h * i as f64)
        })
        .sum();
    h / 3.0 * (f(a) + inner + f(b))
}

/// `∫ f dt` over `[t_min, t_max]` as `∫ t f(t) d(ln t)` with the trapezoid rule.
fn log_trapezoid(f: impl Fn(f64) -> f64, t_min: f64, t_max: f64, points: usize) -> f64 {
    let grid = log_grid(t_min, t_max, points).unwrap();
    grid.windows(2)
        .map(|w| 0.5 * (w[0] * f(w[0]) + w[1] * f(w[1])) * (w[1] / w[0]).ln())
        .sum()
}

// ---------------------------------------------------------------------------
// Ideal distribution
// ---------------------------------------------------------------------------
#[test]
fn ideal_pdf_integrates_to_one_and_is_non_negative() {
    for seed in 0..6 {
        let mec = random_mechanism(4, 2, seed);
        for direction in Direction::ALL {
            let ideal = IdealDistribution::new(&mec, direction).unwrap();
            let qaa = match direction {
                Direction::Open => mec.qaa(),
                Direction::Shut => mec.qff(),
            };
            let pdf = |t: f64| ideal_dwell_time_pdf(t, &qaa, ideal.phi()).unwrap();
            let integral = log_trapezoid(pdf, 1e-10, 10.0, 3000);
            assert_relative_eq!(integral, 1.0, epsilon = 1e-4);
            for t in log_grid(1e-6, 1.0, 50).unwrap() {
                assert!(pdf(t) >= 0.0, "negative density at t = {t}");
            }
        }
    }
}

#[test]
fn ideal_components_have_positive_rates_and_unit_area() {
    for seed in 10..20 {
        let mec = random_mechanism(5, 2, seed);
        for direction in Direction::ALL {
            let c = IdealDistribution::new(&mec, direction).unwrap().components().clone();
            assert!(c.eigenvalues().iter().all(|&l| l > 0.0));
            assert_relative_eq!(c.areas().iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
    }
}

// ---------------------------------------------------------------------------
// Asymptotic and exact distributions
// ---------------------------------------------------------------------------
#[test]
fn asymptotic_areas_sum_below_one_and_renormalise() {
    for seed in 20..26 {
        let mec = random_mechanism(4, 2, seed);
        for direction in Direction::ALL {
            let me = MissedEvents::new(&mec, direction, 1e-4).unwrap();
            let asy = AsymptoticDistribution::new(&me, &RootSearch::new()).unwrap();
            assert_eq!(asy.roots().len(), 2);
            assert!(asy.roots().iter().all(|&s| s < 0.0));
            assert!(asy.area_sum() <= 1.0 + 1e-9);
            let renorm: f64 = asy.renormalized_areas().iter().sum();
            assert_relative_eq!(renorm, 1.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn exact_mean_exceeds_ideal_mean_for_random_mechanisms() {
    for seed in 30..40 {
        let mec = random_mechanism(4, 2, seed);
        for direction in Direction::ALL {
            let ideal = IdealDistribution::new(&mec, direction).unwrap();
            let me = MissedEvents::new(&mec, direction, 1e-4).unwrap();
            assert!(exact_mean(&me).unwrap() > ideal.mean());
        }
    }
}

#[test]
fn exact_pdf_integrates_to_one() {
    let mec = samples::ch82(1e-7).unwrap();
    let tres = 1e-4;
    for direction in Direction::ALL {
        let me = MissedEvents::new(&mec, direction, tres).unwrap();
        let asy = AsymptoticDistribution::new(&me, &RootSearch::new()).unwrap();
        let exact = ExactDistribution::new(&mec, &me, asy.clone()).unwrap();
        let gamma = exact.gamma();
        let first = simpson(|u| gamma.f0(u), 0.0, tres, 2000);
        let second = simpson(|u| gamma.f0(u + tres) - gamma.f1(u), 0.0, tres, 2000);
        let tail: f64 = asy
            .taus()
            .iter()
            .zip(asy.areas())
            .map(|(tau, a)| a * (-2.0 * tres / tau).exp())
            .sum();
        assert_relative_eq!(first + second + tail, 1.0, epsilon = 1e-3);
    }
}

#[test]
fn exact_equals_asymptotic_beyond_three_resolutions() {
    let mec = samples::ch82(1e-7).unwrap();
    let tres = 1e-4;
    let me = MissedEvents::new(&mec, Direction::Open, tres).unwrap();
    let asy = AsymptoticDistribution::new(&me, &RootSearch::new()).unwrap();
    let exact = ExactDistribution::new(&mec, &me, asy.clone()).unwrap();
    for t in [3e-4, 5e-4, 1e-3, 1e-2] {
        assert_eq!(exact.pdf(t), asy.pdf(t));
        assert_eq!(exact_pdf(t, tres, &asy, exact.gamma()), asy.pdf(t));
        assert_eq!(asymptotic_pdf(t, tres, &asy.taus(), asy.areas()), asy.pdf(t));
    }
}

#[test]
fn small_resolution_converges_to_ideal() {
    let mec = samples::ch82(1e-7).unwrap();
    for direction in Direction::ALL {
        let ideal = IdealDistribution::new(&mec, direction).unwrap();
        let me = MissedEvents::new(&mec, direction, 1e-7).unwrap();
        let asy = AsymptoticDistribution::new(&me, &RootSearch::new()).unwrap();

        let mut ideal_rates = ideal.components().eigenvalues().to_vec();
        ideal_rates.reverse();
        let ideal_areas: Vec<f64> = ideal.components().areas().into_iter().rev().collect();
        for ((rate, area), (ideal_rate, ideal_area)) in asy
            .rates()
            .into_iter()
            .zip(asy.renormalized_areas())
            .zip(ideal_rates.into_iter().zip(ideal_areas))
        {
            assert_relative_eq!(rate, ideal_rate, max_relative = 5e-3);
            if ideal_area > 1e-3 {
                assert_relative_eq!(area, ideal_area, max_relative = 5e-3);
            }
        }
    }
}

#[test]
fn exact_coefficients_converge_to_ideal_weights() {
    // Both errors shrink linearly with tres, roughly 7e3·tres for the
    // coefficient sums and 1.4e4·tres for the shut pdf.
    let mec = samples::ch82(1e-7).unwrap();
    for direction in Direction::ALL {
        let ideal = IdealDistribution::new(&mec, direction).unwrap();
        let f_zero: f64 = ideal.components().weights().iter().sum();

        let mut previous: Option<(f64, f64)> = None;
        for tres in [1e-6, 1e-7, 1e-8] {
            let me = MissedEvents::new(&mec, direction, tres).unwrap();
            let asy = AsymptoticDistribution::new(&me, &RootSearch::new()).unwrap();
            let exact = ExactDistribution::new(&mec, &me, asy).unwrap();

            let g00_sum: f64 = exact.gamma().g00().iter().sum();
            let weight_error = ((g00_sum - f_zero) / f_zero).abs();
            let t = 1.5 * tres;
            let ideal_pdf = ideal.pdf(t).unwrap();
            let pdf_error = ((exact.pdf(t) - ideal_pdf) / ideal_pdf).abs();
            assert!(
                weight_error < 2e4 * tres,
                "{direction} at tres {tres}: sum g00 = {g00_sum}, f(0) = {f_zero}"
            );
            assert!(
                pdf_error < 2e4 * tres,
                "{direction} at tres {tres}: exact {} vs ideal {ideal_pdf}",
                exact.pdf(t)
            );

            if let Some((last_weight, last_pdf)) = previous {
                assert!(weight_error < 0.2 * last_weight);
                assert!(pdf_error < 0.2 * last_pdf);
            }
            previous = Some((weight_error, pdf_error));
        }
    }
}

#[test]
fn ch82_shut_roots() {
    let mec = samples::ch82(1e-7).unwrap();
    let shut = DwellTimes::new(&mec, Direction::Shut, 1e-4, &RootSearch::new()).unwrap();
    let roots = shut.asymptotic().roots();
    assert_relative_eq!(roots[0], -17090.19, max_relative = 1e-6);
    assert_relative_eq!(roots[1], -2058.081, max_relative = 1e-6);
    assert_relative_eq!(roots[2], -0.2435654, max_relative = 1e-6);
    assert_relative_eq!(shut.asymptotic().area_sum(), 0.98609, max_relative = 1e-4);
    assert_relative_eq!(shut.exact_mean(), 2.806526, max_relative = 1e-6);
}

#[test]
fn both_directions_match_individual_runs() {
    let mec = samples::ch82(1e-7).unwrap();
    let search = RootSearch::new();
    let (open, shut) = DwellTimes::both(&mec, 1e-4, &search).unwrap();
    let open_alone = DwellTimes::new(&mec, Direction::Open, 1e-4, &search).unwrap();
    assert_eq!(open.direction(), Direction::Open);
    assert_eq!(shut.direction(), Direction::Shut);
    assert_eq!(open.asymptotic().roots(), open_alone.asymptotic().roots());
}

#[test]
fn pdf_table_rows() {
    let mec = samples::ch82(1e-7).unwrap();
    let open = DwellTimes::new(&mec, Direction::Open, 1e-4, &RootSearch::new()).unwrap();
    let grid = log_grid(1e-5, 1e-1, 40).unwrap();
    let rows = pdf_table(open.ideal(), open.asymptotic(), open.exact(), &grid).unwrap();
    assert_eq!(rows.len(), 40);
    assert_eq!(rows[0].exact, 0.0);
    assert_eq!(rows[0].ideal, 0.0);
    let late = rows.last().unwrap();
    assert_relative_eq!(late.exact, late.asymptotic);
    assert!(rows.iter().all(|r| r.ideal >= 0.0 && r.asymptotic >= 0.0));
}

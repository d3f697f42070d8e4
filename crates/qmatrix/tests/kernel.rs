use approx::assert_relative_eq;
use nalgebra::DMatrix;
use qdwell_qmatrix::{Mechanism, SpectralDecomposition, expm, samples, stationary};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random reversible mechanism on a linear scheme with `k` states.
///
/// Rates are drawn log-uniformly over four decades so the sub-generators
/// have well separated real eigenvalues.
fn random_linear_mechanism(k: usize, k_a: usize, seed: u64) -> Mechanism {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut q = DMatrix::zeros(k, k);
    for i in 0..k - 1 {
        q[(i, i + 1)] = 10f64.powf(rng.random_range(1.0..5.0));
        q[(i + 1, i)] = 10f64.powf(rng.random_range(1.0..5.0));
    }
    samples::fill_diagonal(&mut q);
    Mechanism::new(q, k_a, k - k_a).expect("random mechanism is valid")
}

// ---------------------------------------------------------------------------
// Spectral projectors
// ---------------------------------------------------------------------------
#[test]
fn projectors_sum_to_identity_for_random_mechanisms() {
    for seed in 0..20 {
        let mec = random_linear_mechanism(5, 2, seed);
        let minus_q = -mec.q();
        let s = SpectralDecomposition::new(&minus_q, "-Q").unwrap();
        let identity = DMatrix::identity(5, 5);
        assert_relative_eq!(s.apply(|_| 1.0), identity, epsilon = 1e-8);
    }
}

#[test]
fn projectors_reconstruct_sub_generators() {
    for seed in 100..120 {
        let mec = random_linear_mechanism(6, 3, seed);
        for block in [-mec.qaa(), -mec.qff()] {
            let s = SpectralDecomposition::new(&block, "block").unwrap();
            let scale = block.amax();
            let rebuilt = s.apply(|l| l);
            assert_relative_eq!(rebuilt, block, epsilon = 1e-8 * scale);
            assert!(s.eigenvalues().iter().all(|&l| l > 0.0));
        }
    }
}

#[test]
fn generator_has_one_zero_eigenvalue() {
    let mec = samples::ch82(1e-7).unwrap();
    let s = SpectralDecomposition::new(&(-mec.q()), "-Q").unwrap();
    let eig = s.eigenvalues();
    assert!(eig[0].abs() < 1e-6);
    let expected = [101.818, 2022.119, 3093.527, 19408.20];
    for (got, want) in eig[1..].iter().zip(expected) {
        assert_relative_eq!(*got, want, max_relative = 1e-5);
    }
}

#[test]
fn spectral_exponential_matches_pade() {
    let mec = samples::ch82(1e-7).unwrap();
    let qff = mec.qff();
    let s = SpectralDecomposition::new(&(-&qff), "-QFF").unwrap();
    for t in [1e-5, 1e-4, 1e-3] {
        let spectral = s.apply(|l| (-l * t).exp());
        assert_relative_eq!(spectral, expm(&qff, t), epsilon = 1e-10);
    }
}

// ---------------------------------------------------------------------------
// Equilibrium
// ---------------------------------------------------------------------------
#[test]
fn equilibrium_is_stationary() {
    for seed in 200..210 {
        let mec = random_linear_mechanism(4, 1, seed);
        let p = mec.equilibrium().unwrap();
        let flux = mec.q().tr_mul(&p);
        assert_relative_eq!(p.sum(), 1.0, epsilon = 1e-10);
        assert!(flux.amax() < 1e-8 * mec.q().amax());
        assert!(p.iter().all(|&x| x > 0.0));
    }
}

#[test]
fn stationary_of_ch82_matches_long_time_limit() {
    let mec = samples::ch82(1e-7).unwrap();
    let p = stationary(mec.q()).unwrap();
    let pt = expm(mec.q(), 10.0);
    for j in 0..mec.k() {
        assert_relative_eq!(pt[(0, j)], p[j], epsilon = 1e-9, max_relative = 1e-6);
    }
}

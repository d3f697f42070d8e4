//! Built-in sample mechanisms.

use nalgebra::DMatrix;

use crate::error::QMatrixError;
use crate::mechanism::Mechanism;

/// Rate constants of the Colquhoun & Hawkes (1982) nicotinic receptor
/// scheme, in s⁻¹ (association rates in M⁻¹s⁻¹).
mod ch82_rates {
    pub const ALPHA1: f64 = 3000.0;
    pub const BETA1: f64 = 15.0;
    pub const ALPHA2: f64 = 500.0;
    pub const BETA2: f64 = 15000.0;
    pub const K_MINUS_1: f64 = 2000.0;
    pub const K_PLUS_1: f64 = 5.0e07;
    pub const K_MINUS_2: f64 = 2000.0;
    pub const K_PLUS_2: f64 = 5.0e08;
    pub const K_STAR_PLUS_2: f64 = 5.0e08;
    pub const K_STAR_MINUS_2: f64 = 1.0 / 3.0;
}

/// Five-state CH82 mechanism at agonist `concentration` (M).
///
/// States are `AR*`, `A2R*` (open), `AR`, `A2R` (burst shut states) and `R`
/// (gap state), so `kA = 2`, `kB = 2`, `kC = 1`.
///
/// # Errors
///
/// Returns [`QMatrixError::InvalidParameter`] if `concentration` is not
/// finite and positive.
pub fn ch82(concentration: f64) -> Result<Mechanism, QMatrixError> {
    use self::ch82_rates::*;

    check_positive("concentration", concentration)?;
    let c = concentration;

    let mut q = DMatrix::zeros(5, 5);
    q[(0, 1)] = K_STAR_PLUS_2 * c;
    q[(0, 2)] = ALPHA1;
    q[(1, 0)] = 2.0 * K_STAR_MINUS_2;
    q[(1, 3)] = ALPHA2;
    q[(2, 0)] = BETA1;
    q[(2, 3)] = K_PLUS_2 * c;
    q[(2, 4)] = K_MINUS_1;
    q[(3, 1)] = BETA2;
    q[(3, 2)] = 2.0 * K_MINUS_2;
    q[(4, 2)] = 2.0 * K_PLUS_1 * c;
    fill_diagonal(&mut q);

    Mechanism::new(q, 2, 3)?
        .with_burst_subsets(2)?
        .with_state_names(["AR*", "A2R*", "AR", "A2R", "R"])
}

/// Two-state scheme `O ⇄ S` with shutting rate `closing` (O→S) and opening
/// rate `opening` (S→O).
///
/// Open times are exponential with rate `closing`, shut times with rate
/// `opening`.
pub fn two_state(closing: f64, opening: f64) -> Result<Mechanism, QMatrixError> {
    check_positive("closing", closing)?;
    check_positive("opening", opening)?;
    let q = DMatrix::from_row_slice(2, 2, &[-closing, closing, opening, -opening]);
    Mechanism::new(q, 1, 1)?.with_state_names(["O", "S"])
}

fn check_positive(name: &'static str, value: f64) -> Result<(), QMatrixError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(QMatrixError::InvalidParameter { name, value });
    }
    Ok(())
}

/// Sets each diagonal entry to minus the sum of its row's off-diagonal rates.
pub fn fill_diagonal(q: &mut DMatrix<f64>) {
    for i in 0..q.nrows() {
        q[(i, i)] = 0.0;
        let sum = q.row(i).sum();
        q[(i, i)] = -sum;
    }
}

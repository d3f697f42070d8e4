//! Q-matrix mechanisms and the dense linear algebra they need.
//!
//! A [`Mechanism`] is an immutable, validated snapshot of a continuous-time
//! Markov generator partitioned into open (A) and shut (F) states. The
//! kernel functions in [`linalg`] and [`SpectralDecomposition`] supply the
//! matrix exponential, inverse, stationary vector and the
//! eigenvalue/projector representation used for every matrix function of a
//! sub-generator.
//!
//! # Quick start
//!
//! ```rust
//! use qdwell_qmatrix::{SpectralDecomposition, samples};
//!
//! let mec = samples::ch82(1e-7)?;
//! let minus_qaa = -mec.qaa();
//! let spectral = SpectralDecomposition::new(&minus_qaa, "-QAA")?;
//! assert_eq!(spectral.len(), mec.k_a());
//! # Ok::<(), qdwell_qmatrix::QMatrixError>(())
//! ```

pub mod error;
pub mod linalg;
pub mod mechanism;
pub mod samples;
pub mod spectral;

pub use error::QMatrixError;
pub use linalg::{eigenvalue_real_parts, expm, inverse, ones, stationary};
pub use mechanism::Mechanism;
pub use spectral::SpectralDecomposition;

//! Critical shut times for dividing single-channel records into bursts.
//!
//! Given the exponential components of a shut-time distribution, a critical
//! time `tcrit` between two adjacent components classifies shorter gaps as
//! within-burst and longer gaps as between-burst. Three criteria are
//! supported (see [`Criterion`]); each is solved by bisection between the
//! two time constants.
//!
//! ```rust
//! use qdwell_roots::Bisection;
//! use qdwell_tcrit::{Criterion, critical_time, sort_components};
//!
//! let components = sort_components(&[1.0, 1e-3], &[0.5, 0.5])?;
//! let ct = critical_time(&components, 0, Criterion::EqualCount, &Bisection::new())?;
//! assert!(ct.tcrit() > 1e-3 && ct.tcrit() < 1.0);
//! # Ok::<(), qdwell_tcrit::TcritError>(())
//! ```

pub mod component;
pub mod criterion;
pub mod error;
pub mod solve;

pub use component::{Component, sort_components};
pub use criterion::{Criterion, Misclassification};
pub use error::TcritError;
pub use solve::{CriticalTime, critical_time, critical_times};

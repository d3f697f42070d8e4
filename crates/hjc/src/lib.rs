//! Open and shut time distributions of single ion channels with missed
//! events.
//!
//! Given a [`Mechanism`](qdwell_qmatrix::Mechanism) and a time resolution
//! `tres`, this crate computes
//!
//! - the ideal pdf and its exponential components ([`IdealDistribution`]),
//! - the asymptotic HJC pdf from the roots of `det W(s)`
//!   ([`AsymptoticDistribution`]),
//! - the exact HJC pdf on `[tres, 3·tres)` ([`ExactDistribution`]),
//! - mean dwell times, subset lifetimes and latencies ([`moments`]).
//!
//! # Pipeline
//!
//! ```text
//!  ┌────────────┐     ┌──────────────┐     ┌──────────────┐     ┌──────────┐
//!  │ Mechanism  │────▶│ MissedEvents │────▶│  asymptotic  │────▶│  exact   │
//!  │ (Q, kA)    │     │ (eG, φ, W)   │     │ (roots, a_i) │     │ (g00..)  │
//!  └────────────┘     └──────────────┘     └──────────────┘     └──────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust
//! use qdwell_hjc::{Direction, DwellTimes};
//! use qdwell_qmatrix::samples;
//! use qdwell_roots::RootSearch;
//!
//! let mec = samples::ch82(1e-7)?;
//! let open = DwellTimes::new(&mec, Direction::Open, 1e-4, &RootSearch::new())?;
//! assert_eq!(open.asymptotic().roots().len(), 2);
//! assert!(open.exact_mean() > open.ideal().mean());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod analysis;
pub mod asymptotic;
mod checks;
pub mod direction;
pub mod error;
pub mod exact;
pub mod ideal;
pub mod missed;
pub mod moments;
pub mod table;

pub use analysis::DwellTimes;
pub use asymptotic::{AsymptoticDistribution, asymptotic_areas, asymptotic_pdf, asymptotic_roots};
pub use direction::{Blocks, Direction};
pub use error::HjcError;
pub use exact::{ExactDistribution, GammaCoefficients, exact_pdf};
pub use ideal::{IdealComponents, IdealDistribution, ideal_dwell_time_pdf, ideal_phi, subset_time_pdf};
pub use missed::MissedEvents;
pub use moments::{
    OccupancySummary, StateSummary, SubsetSummary, exact_mean, mean_latency, occupancy_summary,
    subset_mean_life,
};
pub use table::{PdfRow, log_grid, pdf_table};

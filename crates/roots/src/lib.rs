//! Scalar root finding by bracketing and bisection.
//!
//! Used for the asymptotic HJC roots (one bisection per isolated bracket of
//! `det W(s)`) and for critical times between exponential components.
//!
//! ```rust
//! use qdwell_roots::{Bracket, RootSearch, split_brackets};
//!
//! // Roots of (s + 3)(s + 7), counted as the number of roots below s.
//! let det = |s: f64| (s + 3.0) * (s + 7.0);
//! let count = |s: f64| Ok::<_, qdwell_roots::RootError>([-7.0, -3.0].iter().filter(|&&r| r < s).count());
//!
//! let search = RootSearch::new().with_interval(-100.0, -0.1);
//! let brackets = split_brackets(search.bracket()?, 2, search.max_depth(), count)?;
//! let roots: Vec<f64> = brackets
//!     .into_iter()
//!     .map(|b| search.bisection().solve(b, det).map(|r| r.x))
//!     .collect::<Result<_, _>>()?;
//! assert!((roots[0] + 7.0).abs() < 1e-8);
//! # Ok::<(), qdwell_roots::RootError>(())
//! ```

pub mod bisection;
pub mod bracket;
pub mod error;
pub mod search;

pub use bisection::{Bisection, Root};
pub use bracket::Bracket;
pub use error::RootError;
pub use search::{RootSearch, split_brackets};

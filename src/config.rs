use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use qdwell_roots::bisection::{DEFAULT_MAX_ITER, DEFAULT_TOLERANCE};
use qdwell_roots::search::{DEFAULT_LOWER, DEFAULT_MAX_DEPTH, DEFAULT_UPPER};

/// Top-level qdwell configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QdwellConfig {
    /// Time resolution (dead time) in seconds.
    #[serde(default = "default_tres")]
    pub tres: f64,

    /// Mechanism selection.
    #[serde(default)]
    pub mechanism: MechanismToml,

    /// Asymptotic root search settings.
    #[serde(default)]
    pub roots: RootsToml,

    /// PDF table settings.
    #[serde(default)]
    pub table: TableToml,
}

impl Default for QdwellConfig {
    fn default() -> Self {
        Self {
            tres: default_tres(),
            mechanism: MechanismToml::default(),
            roots: RootsToml::default(),
            table: TableToml::default(),
        }
    }
}

impl QdwellConfig {
    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        toml::from_str(&toml_str).context("failed to parse TOML config")
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if !self.tres.is_finite() || self.tres <= 0.0 {
            bail!("tres must be finite and > 0, got {}", self.tres);
        }
        if self.table.points < 2 {
            bail!("[table].points must be >= 2, got {}", self.table.points);
        }
        if !self.table.t_max_factor.is_finite() || self.table.t_max_factor <= 1.0 {
            bail!(
                "[table].t_max_factor must be finite and > 1, got {}",
                self.table.t_max_factor
            );
        }
        Ok(())
    }
}

fn default_tres() -> f64 {
    1e-4
}

/// Mechanism selection: a built-in sample or an inline Q-matrix.
///
/// With neither `sample` nor `q` set, the CH82 sample is used.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MechanismToml {
    /// Built-in sample name (`ch82` or `two-state`).
    #[serde(default)]
    pub sample: Option<String>,
    /// Agonist concentration (M) for `ch82`.
    #[serde(default = "default_concentration")]
    pub concentration: f64,
    /// Shutting rate (s⁻¹) for `two-state`.
    #[serde(default = "default_closing")]
    pub closing: f64,
    /// Opening rate (s⁻¹) for `two-state`.
    #[serde(default = "default_opening")]
    pub opening: f64,
    /// Inline Q-matrix rows, open states first. Diagonals may be left at 0.
    #[serde(default)]
    pub q: Option<Vec<Vec<f64>>>,
    /// Number of open states for an inline Q-matrix.
    #[serde(default)]
    pub k_a: Option<usize>,
    /// Number of burst (short-lived) shut states for an inline Q-matrix.
    #[serde(default)]
    pub k_b: Option<usize>,
    /// State names for an inline Q-matrix.
    #[serde(default)]
    pub names: Option<Vec<String>>,
}

impl Default for MechanismToml {
    fn default() -> Self {
        Self {
            sample: None,
            concentration: default_concentration(),
            closing: default_closing(),
            opening: default_opening(),
            q: None,
            k_a: None,
            k_b: None,
            names: None,
        }
    }
}

fn default_concentration() -> f64 {
    1e-7
}
fn default_closing() -> f64 {
    1000.0
}
fn default_opening() -> f64 {
    2000.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RootsToml {
    #[serde(default = "default_lower")]
    pub lower: f64,
    #[serde(default = "default_upper")]
    pub upper: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for RootsToml {
    fn default() -> Self {
        Self {
            lower: default_lower(),
            upper: default_upper(),
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_lower() -> f64 {
    DEFAULT_LOWER
}
fn default_upper() -> f64 {
    DEFAULT_UPPER
}
fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_max_iter() -> usize {
    DEFAULT_MAX_ITER
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableToml {
    /// Number of log-spaced grid points.
    #[serde(default = "default_points")]
    pub points: usize,
    /// The grid ends at this multiple of the slowest asymptotic time constant.
    #[serde(default = "default_t_max_factor")]
    pub t_max_factor: f64,
}

impl Default for TableToml {
    fn default() -> Self {
        Self {
            points: default_points(),
            t_max_factor: default_t_max_factor(),
        }
    }
}

fn default_points() -> usize {
    256
}
fn default_t_max_factor() -> f64 {
    10.0
}

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use qdwell_hjc::Direction;

/// qdwell ion-channel dwell-time calculator.
#[derive(Parser)]
#[command(
    name = "qdwell",
    version,
    about = "Ideal, asymptotic and exact HJC dwell-time distributions"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file. Built-in CH82 at 100 nM if omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the time resolution (s) from config.
    #[arg(short, long, global = true)]
    pub tres: Option<f64>,

    /// Write machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Print occupancies, open and shut distributions and critical times.
    Report,
    /// Tabulate ideal, asymptotic and exact pdfs on a log time grid.
    Pdf(PdfArgs),
    /// Compute burst critical times from the ideal shut-time components.
    Tcrit,
}

/// Arguments for the `pdf` subcommand.
#[derive(clap::Args)]
pub struct PdfArgs {
    /// Which dwell times to tabulate.
    #[arg(short, long, value_enum, default_value_t = DirectionArg::Open)]
    pub direction: DirectionArg,

    /// Override the number of grid points from config.
    #[arg(short, long)]
    pub points: Option<usize>,

    /// Tabulate `t·f(t)`, the form plotted against log time.
    #[arg(long)]
    pub log_scaled: bool,
}

/// Dwell-time direction as a CLI value.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DirectionArg {
    Open,
    Shut,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Open => Direction::Open,
            DirectionArg::Shut => Direction::Shut,
        }
    }
}

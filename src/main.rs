mod cli;
mod config;
mod convert;
mod format;
mod logging;
mod output;
mod pdf_cmd;
mod report;
mod tcrit_cmd;

use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::QdwellConfig;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = QdwellConfig::load(cli.config.as_deref())?;
    if let Some(tres) = cli.tres {
        config.tres = tres;
    }
    config.validate()?;

    let mec = convert::build_mechanism(&config.mechanism)?;
    let search = convert::build_root_search(&config.roots)?;
    info!(
        k = mec.k(),
        k_a = mec.k_a(),
        k_b = mec.k_b(),
        tres = config.tres,
        "mechanism loaded"
    );

    match cli.command {
        Command::Report => report::run(&mec, config.tres, &search, cli.json),
        Command::Pdf(args) => {
            pdf_cmd::run(&args, &mec, config.tres, &search, &config.table, cli.json)
        }
        Command::Tcrit => tcrit_cmd::run(&mec, cli.json),
    }
}

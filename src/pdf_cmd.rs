//! Pdf command: ideal, asymptotic and exact pdfs on a log time grid.

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::{debug, info_span};

use qdwell_hjc::{Direction, DwellTimes, PdfRow, log_grid, pdf_table};
use qdwell_qmatrix::Mechanism;
use qdwell_roots::RootSearch;

use crate::cli::PdfArgs;
use crate::config::TableToml;
use crate::output::{self, PdfOutput, PdfRowOutput};

/// Tabulates the pdfs of `dwell` from `tres` to `t_max_factor` times the
/// slowest asymptotic time constant.
pub fn tabulate(dwell: &DwellTimes, points: usize, table: &TableToml) -> Result<Vec<PdfRow>> {
    let tres = dwell.tres();
    let slowest = dwell
        .asymptotic()
        .taus()
        .into_iter()
        .fold(tres, f64::max);
    let t_max = table.t_max_factor * slowest;
    debug!(tres, t_max, points, "pdf grid");

    let grid = log_grid(tres, t_max, points)?;
    let rows = pdf_table(dwell.ideal(), dwell.asymptotic(), dwell.exact(), &grid)?;
    Ok(rows)
}

/// Writes `rows` as CSV with a header line.
pub fn write_csv(out: &mut impl Write, rows: &[PdfRow]) -> io::Result<()> {
    writeln!(out, "t,ideal,asymptotic,exact")?;
    for row in rows {
        writeln!(out, "{},{},{},{}", row.t, row.ideal, row.asymptotic, row.exact)?;
    }
    Ok(())
}

/// Run the pdf command.
pub fn run(
    args: &PdfArgs,
    mec: &Mechanism,
    tres: f64,
    search: &RootSearch,
    table: &TableToml,
    json: bool,
) -> Result<()> {
    let direction = Direction::from(args.direction);
    let _cmd = info_span!("pdf", %direction).entered();

    let points = args.points.unwrap_or(table.points);
    let dwell = DwellTimes::new(mec, direction, tres, search)
        .with_context(|| format!("{direction} time distributions failed"))?;
    let mut rows = tabulate(&dwell, points, table)?;
    if args.log_scaled {
        rows = rows.iter().map(PdfRow::log_scaled).collect();
    }

    if json {
        let out = PdfOutput {
            direction: direction.to_string(),
            tres,
            log_scaled: args.log_scaled,
            rows: rows.iter().map(PdfRowOutput::from).collect(),
        };
        println!("{}", output::to_json(&out)?);
    } else {
        let stdout = io::stdout();
        let mut lock = io::BufWriter::new(stdout.lock());
        write_csv(&mut lock, &rows).context("failed to write pdf table")?;
        lock.flush().context("failed to write pdf table")?;
    }
    Ok(())
}

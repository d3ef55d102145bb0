//! dcgrid - DC grid circuit solver
//!
//! Solves a resistive circuit described in the grid DSL and prints branch
//! currents, the per-branch component listing and terminal potentials.
//!
//! # Usage
//!
//! ```bash
//! dcgrid circuits/parallel.grid
//! dcgrid -vv --currents-only circuits/parallel.grid
//! ```

use std::io;
use std::path::PathBuf;

use clap::Parser;
use dcgrid_core::{
    circuit::Circuit,
    dsl,
    error::Result,
    report::ReportWriter,
    solver::{Solver, SolverConfig, DEFAULT_PIVOT_TOLERANCE},
};
use tracing::Level;

/// DC grid circuit solver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the circuit description file
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Relative pivot tolerance for singular system detection
    #[arg(long, default_value_t = DEFAULT_PIVOT_TOLERANCE)]
    pivot_tolerance: f64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print only the branch currents
    #[arg(long)]
    currents_only: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    // Parse the circuit file
    let ast = dsl::parse_file(&args.circuit_file)?;

    // Build the circuit
    let mut circuit = Circuit::from_ast(ast)?;
    tracing::info!(
        rows = circuit.rows(),
        cols = circuit.cols(),
        components = circuit.len(),
        "circuit loaded"
    );

    let solver = Solver::with_config(SolverConfig::new().with_pivot_tolerance(args.pivot_tolerance));
    let mut report = ReportWriter::new(io::stdout().lock());

    match circuit.solve_with(&solver) {
        Ok(currents) => report.write_solution(&circuit, &currents, args.currents_only),
        Err(e) => {
            if e.is_unsolvable() {
                report.write_listing(&circuit)?;
                report.flush()?;
            }
            Err(e)
        }
    }
}

//! Solution reports for the CLI frontend.
//!
//! Writes branch currents, the per-branch component listing and the grid of
//! terminal potentials to any output stream.

use std::io::Write;

use crate::circuit::{Circuit, TerminalId};
use crate::error::{GridError, Result};

/// Width of one potential cell in the table.
const CELL_WIDTH: usize = 10;

/// Report writer over an output stream.
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    /// Create a new report writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// One line per branch: `Current in branch i is x A`.
    pub fn write_currents(&mut self, currents: &[f64]) -> Result<()> {
        for (branch, current) in currents.iter().enumerate() {
            writeln!(self.out, "Current in branch {} is {} A", branch, current).map_err(output_error)?;
        }
        Ok(())
    }

    /// Components grouped by branch.
    pub fn write_listing(&mut self, circuit: &Circuit) -> Result<()> {
        write!(self.out, "{}", circuit).map_err(output_error)
    }

    /// Terminal potentials as a grid; unset terminals print as `-`.
    pub fn write_potentials(&mut self, circuit: &Circuit) -> Result<()> {
        writeln!(self.out, "Potentials (V):").map_err(output_error)?;
        for row in 0..circuit.rows() {
            let mut line = String::new();
            for col in 0..circuit.cols() {
                let cell = match circuit.potential(TerminalId::new(row, col)) {
                    Some(v) => format!("{:.4}", v),
                    None => "-".to_string(),
                };
                line.push_str(&format!("{:>width$}", cell, width = CELL_WIDTH));
            }
            writeln!(self.out, "{}", line).map_err(output_error)?;
        }
        Ok(())
    }

    /// Full report for a solved circuit.
    pub fn write_solution(&mut self, circuit: &Circuit, currents: &[f64], currents_only: bool) -> Result<()> {
        self.write_currents(currents)?;
        if !currents_only {
            writeln!(self.out).map_err(output_error)?;
            self.write_listing(circuit)?;
            writeln!(self.out).map_err(output_error)?;
            self.write_potentials(circuit)?;
        }
        self.flush()
    }

    /// Flush the output stream.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().map_err(output_error)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn output_error(e: std::io::Error) -> GridError {
    GridError::OutputError {
        message: e.to_string(),
    }
}

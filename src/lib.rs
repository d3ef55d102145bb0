//! # dcgrid Core
//!
//! A steady-state DC solver for resistive circuits laid out on a grid.
//!
//! This library provides:
//! - A grid circuit model: terminals at fixed (row, col) positions joined by
//!   wires, resistors and ideal batteries
//! - Topology discovery: junctions, branches, dead ends and independent loops
//! - Branch-current analysis with Kirchhoff's current and voltage laws
//! - Terminal potentials derived from the solved currents
//! - A small DSL for describing grid circuits in text files
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Parser for the grid circuit description language
//! - [`circuit`] - Circuit graph, topology analysis and validation
//! - [`components`] - Component payloads (wire, resistor, battery)
//! - [`solver`] - Kirchhoff equation assembly, solving and potentials
//! - [`report`] - Text reports (CLI only)
//!
//! ## Usage
//!
//! ```no_run
//! use dcgrid_core::circuit::{Circuit, TerminalId};
//!
//! let t = TerminalId::new;
//! let mut circuit = Circuit::new(2, 2)?;
//! circuit.add_battery(t(0, 0), t(1, 0), 6.0)?;
//! circuit.add_wire(t(0, 0), t(0, 1))?;
//! circuit.add_resistor(t(0, 1), t(1, 1), 3.0)?;
//! circuit.add_wire(t(1, 1), t(1, 0))?;
//!
//! let currents = circuit.solve()?;
//! assert_eq!(currents.len(), 1);
//! assert_eq!(circuit.potential(t(0, 1)), Some(6.0));
//! # Ok::<(), dcgrid_core::GridError>(())
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! dcgrid circuits/parallel.grid
//! ```
//!
//! ## Solution Method
//!
//! Each solve starts from a clean slate:
//!
//! 1. Find junctions and label every component with a branch and a current
//!    direction, stripping dead-end stubs that cannot carry current
//! 2. Enumerate independent loops and reject open or short circuits
//! 3. Assemble one current-law row per junction but one and one voltage-law
//!    row per loop, then solve by LU decomposition
//! 4. Propagate terminal potentials from the currents, lowest at 0 V

pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod solver;

#[cfg(feature = "cli")]
pub mod report;

// Re-export main types for convenience
pub use circuit::{Circuit, Topology};
pub use error::{GridError, Result, UnsolvableReason};
pub use solver::{Solver, SolverConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmGridCircuit;

//! Branch-current DC solver.
//!
//! This module turns an analysed circuit into equations and solves them.
//!
//! ## Kirchhoff's laws
//!
//! Each branch carries one unknown current. The solver assembles Ax = z
//! where:
//! - every junction but one contributes a current-law row: currents into
//!   the junction minus currents out sum to zero
//! - every independent loop contributes a voltage-law row: signed
//!   resistive drops around the loop equal the signed battery EMFs
//!
//! ```text
//! [ KCL ] [ I0 ]   [ 0   ]
//! [ KVL ] [ .. ] = [ EMF ]
//! ```
//!
//! The system is square whenever the circuit is a single connected
//! network. Terminal potentials are then propagated from the currents.

mod engine;
mod kirchhoff;
mod potentials;

pub use engine::{Solver, SolverConfig};
pub use kirchhoff::{assemble, KirchhoffMatrix};
pub use potentials::calculate_potentials;

/// Default relative pivot threshold for singularity detection.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-12;

//! Circuit graph representation, topology analysis and validation.
//!
//! A [`Circuit`] owns a fixed grid of [`Terminal`]s and an arena of
//! components joining them. [`Topology`] analyses the graph without
//! mutating it: junctions, branches, dead ends and independent loops.

mod graph;
mod terminal;
mod topology;
mod types;
mod validate;

pub use graph::{Circuit, MAX_TERMINALS};
pub use terminal::Terminal;
pub use topology::{ComponentLabel, Topology};
pub use types::*;
pub use validate::{has_short_circuit, validate_circuit};

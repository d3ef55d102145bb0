//! Main solver interface.

use tracing::{debug, trace};

use crate::circuit::{validate_circuit, Circuit, Topology};
use crate::error::{GridError, Result, UnsolvableReason};

use super::kirchhoff::assemble;
use super::potentials::calculate_potentials;
use super::DEFAULT_PIVOT_TOLERANCE;

/// Configuration for the solver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Relative pivot threshold below which the equation system is
    /// treated as singular.
    pub pivot_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relative pivot tolerance.
    ///
    /// The largest coefficient in the system is the reference: a pivot
    /// smaller than `tolerance` times it is treated as zero.
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }
}

/// Steady-state DC solver for grid circuits.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Create a solver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with custom configuration.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve a circuit in place.
    ///
    /// Clears any previous solution, analyses the topology, rejects
    /// incomplete and short circuits, solves the Kirchhoff system and writes
    /// back per-component currents and per-terminal potentials. Returns the
    /// branch currents indexed by branch id.
    ///
    /// Solving twice without edits gives the same result.
    pub fn solve(&self, circuit: &mut Circuit) -> Result<Vec<f64>> {
        circuit.reset_solution();

        let topology = Topology::discover(circuit);
        debug!(
            components = circuit.len(),
            nodes = topology.nodes.len(),
            branches = topology.num_branches,
            loops = topology.loops.len(),
            dead_ends = topology.dead_ends.len(),
            "topology discovered"
        );
        if !topology.is_complete() {
            return Err(GridError::unsolvable(UnsolvableReason::IncompleteCircuit));
        }

        apply_labels(circuit, &topology);
        circuit.set_num_branches(topology.num_branches);
        validate_circuit(circuit, &topology)?;

        let mut matrix = assemble(circuit, &topology)?;
        debug!(size = matrix.size, "equation system assembled");
        for row in 0..matrix.size {
            trace!(row, coefficients = ?matrix.row(row), constant = matrix.z[row], "equation");
        }
        matrix.factor(self.config.pivot_tolerance)?;
        matrix.solve()?;

        let currents = matrix.x.clone();
        for (branch, current) in currents.iter().enumerate() {
            debug!(branch, current, "branch current");
        }
        apply_currents(circuit, &currents);
        calculate_potentials(circuit, &topology.loops);

        Ok(currents)
    }
}

/// Copy branch labels and current directions onto the circuit.
fn apply_labels(circuit: &mut Circuit, topology: &Topology) {
    for component in circuit.components_mut() {
        let label = topology.label(component.id);
        component.set_branch(label.branch);
        component.set_current_direction(label.direction);
    }
}

/// Give each component its branch current; dead ends carry none.
fn apply_currents(circuit: &mut Circuit, currents: &[f64]) {
    for component in circuit.components_mut() {
        let current = component
            .branch()
            .branch()
            .and_then(|b| currents.get(b.0).copied())
            .unwrap_or(0.0);
        component.set_current(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{BranchLabel, TerminalId};
    use approx::assert_relative_eq;

    fn t(row: usize, col: usize) -> TerminalId {
        TerminalId::new(row, col)
    }

    #[test]
    fn test_config_builder() {
        let config = SolverConfig::new().with_pivot_tolerance(1e-9);
        assert_eq!(config.pivot_tolerance, 1e-9);
        assert_eq!(SolverConfig::default().pivot_tolerance, DEFAULT_PIVOT_TOLERANCE);
    }

    #[test]
    fn test_series_loop() {
        let mut circuit = Circuit::new(2, 2).unwrap();
        let battery = circuit.add_battery(t(0, 0), t(1, 0), 6.0).unwrap();
        circuit.add_wire(t(0, 0), t(0, 1)).unwrap();
        let resistor = circuit.add_resistor(t(0, 1), t(1, 1), 3.0).unwrap();
        circuit.add_wire(t(1, 1), t(1, 0)).unwrap();

        let currents = Solver::new().solve(&mut circuit).unwrap();
        assert_eq!(currents.len(), 1);
        assert_relative_eq!(currents[0].abs(), 2.0, epsilon = 1e-12);
        assert_eq!(circuit.num_branches(), 1);
        assert_relative_eq!(
            circuit.component(resistor).unwrap().current(),
            circuit.component(battery).unwrap().current()
        );
    }

    #[test]
    fn test_incomplete_leaves_labels_unassigned() {
        let mut circuit = Circuit::new(1, 3).unwrap();
        let r = circuit.add_resistor(t(0, 0), t(0, 1), 2.0).unwrap();
        let err = Solver::new().solve(&mut circuit).unwrap_err();
        assert_eq!(err.unsolvable_reason(), Some(UnsolvableReason::IncompleteCircuit));
        assert_eq!(circuit.component(r).unwrap().branch(), BranchLabel::Unassigned);
        assert!(circuit.potential(t(0, 0)).is_none());
    }

    #[test]
    fn test_tight_tolerance_still_solves_well_conditioned_system() {
        let mut circuit = Circuit::new(2, 2).unwrap();
        circuit.add_battery(t(0, 0), t(1, 0), 1.5).unwrap();
        circuit.add_resistor(t(0, 0), t(0, 1), 1.0).unwrap();
        circuit.add_wire(t(0, 1), t(1, 1)).unwrap();
        circuit.add_wire(t(1, 1), t(1, 0)).unwrap();

        let solver = Solver::with_config(SolverConfig::new().with_pivot_tolerance(1e-15));
        let currents = circuit.solve_with(&solver).unwrap();
        assert_relative_eq!(currents[0].abs(), 1.5, epsilon = 1e-12);
    }
}

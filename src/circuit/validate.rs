//! Circuit validation.

use crate::error::{GridError, Result, UnsolvableReason};

use super::topology::Topology;
use super::Circuit;

/// Validate a circuit before building its equations.
///
/// Checks:
/// - At least one complete branch exists
/// - No battery drives a loop made only of wires and batteries
pub fn validate_circuit(circuit: &Circuit, topology: &Topology) -> Result<()> {
    if !topology.is_complete() {
        return Err(GridError::unsolvable(UnsolvableReason::IncompleteCircuit));
    }

    if has_short_circuit(circuit) {
        return Err(GridError::unsolvable(UnsolvableReason::ShortCircuit));
    }

    Ok(())
}

/// True if a zero-resistance loop contains a battery.
///
/// Resistors are dropped from the network and the remainder is analysed
/// like a full circuit; any loop left that holds a battery is a short.
pub fn has_short_circuit(circuit: &Circuit) -> bool {
    let bare = Topology::discover_filtered(circuit, |c| !c.is_resistor());
    if !bare.is_complete() {
        return false;
    }
    bare.loops.iter().flatten().any(|id| {
        circuit
            .component(*id)
            .map(|c| c.is_battery())
            .unwrap_or(false)
    })
}

//! Terminal potentials from solved branch currents.

use crate::circuit::{Circuit, ComponentId, TerminalId};
use crate::components::ComponentKind;

/// Assign a potential to every terminal reachable from the first loop.
///
/// The first loop's first component anchors its first end at 0 V. Potentials
/// then spread one component at a time: each pass takes the first pending
/// component (in insertion order) with exactly one known end and derives the
/// other end from it. Finally everything is shifted so the lowest potential
/// is 0 V.
///
/// Components never reached this way (floating islands) get 0 V on both ends.
/// That value is a placeholder, not a solved quantity.
pub fn calculate_potentials(circuit: &mut Circuit, loops: &[Vec<ComponentId>]) {
    let Some(anchor) = loops
        .first()
        .and_then(|l| l.first())
        .and_then(|id| circuit.component(*id))
        .map(|c| c.ends[0])
    else {
        return;
    };
    set(circuit, anchor, 0.0);

    let mut pending = circuit.component_ids();
    while let Some(index) = pending.iter().position(|id| half_known(circuit, *id)) {
        let id = pending.remove(index);
        propagate(circuit, id);
    }

    normalize(circuit);

    let mut floating = 0;
    for id in pending {
        let Some(component) = circuit.component(id) else {
            continue;
        };
        let ends = component.ends;
        if circuit.potential(ends[0]).is_none() {
            set(circuit, ends[0], 0.0);
            set(circuit, ends[1], 0.0);
            floating += 1;
        }
    }
    if floating > 0 {
        tracing::warn!(
            floating,
            "components not connected to the solved circuit; their potentials default to 0 V"
        );
    }
}

/// True if exactly one end of the component has a potential.
fn half_known(circuit: &Circuit, id: ComponentId) -> bool {
    circuit.component(id).is_some_and(|c| {
        circuit.potential(c.ends[0]).is_some() != circuit.potential(c.ends[1]).is_some()
    })
}

/// Derive the unknown end of a half-known component.
fn propagate(circuit: &mut Circuit, id: ComponentId) {
    let Some(component) = circuit.component(id) else {
        return;
    };
    let [a, b] = component.ends;
    let (known, other, potential) = match (circuit.potential(a), circuit.potential(b)) {
        (Some(v), None) => (a, b, v),
        (None, Some(v)) => (b, a, v),
        _ => return,
    };

    let value = match &component.kind {
        ComponentKind::Battery(battery) => battery.other_potential(known, potential),
        ComponentKind::Resistor(resistor) if component.branch().branch().is_some() => {
            potential
                - resistor.drop_along(component.current(), component.current_direction(), known)
        }
        // Wires, and resistors outside the solved branches, carry no drop.
        _ => potential,
    };
    set(circuit, other, value);
}

/// Shift all known potentials so the minimum is 0 V.
fn normalize(circuit: &mut Circuit) {
    let lowest = circuit
        .terminals()
        .filter_map(|t| t.potential())
        .fold(f64::INFINITY, f64::min);
    if !lowest.is_finite() {
        return;
    }
    let known: Vec<(TerminalId, f64)> = circuit
        .terminals()
        .filter_map(|t| t.potential().map(|v| (t.id, v)))
        .collect();
    for (id, v) in known {
        set(circuit, id, v - lowest);
    }
}

fn set(circuit: &mut Circuit, terminal: TerminalId, potential: f64) {
    if let Some(t) = circuit.terminal_mut(terminal) {
        t.set_potential(potential);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn t(row: usize, col: usize) -> TerminalId {
        TerminalId::new(row, col)
    }

    #[test]
    fn test_battery_sets_potential_difference() {
        let mut circuit = Circuit::new(2, 2).unwrap();
        let battery = circuit.add_battery(t(0, 0), t(1, 0), 9.0).unwrap();
        circuit.add_wire(t(0, 0), t(0, 1)).unwrap();
        circuit.add_wire(t(1, 0), t(1, 1)).unwrap();

        calculate_potentials(&mut circuit, &[vec![battery]]);
        assert_relative_eq!(circuit.potential(t(0, 0)).unwrap(), 9.0);
        assert_relative_eq!(circuit.potential(t(0, 1)).unwrap(), 9.0);
        assert_relative_eq!(circuit.potential(t(1, 0)).unwrap(), 0.0);
        assert_relative_eq!(circuit.potential(t(1, 1)).unwrap(), 0.0);
    }

    #[test]
    fn test_no_loops_leaves_potentials_unset() {
        let mut circuit = Circuit::new(1, 2).unwrap();
        circuit.add_wire(t(0, 0), t(0, 1)).unwrap();
        calculate_potentials(&mut circuit, &[]);
        assert!(circuit.potential(t(0, 0)).is_none());
    }

    #[test]
    fn test_floating_component_defaults_to_zero() {
        let mut circuit = Circuit::new(3, 3).unwrap();
        let battery = circuit.add_battery(t(0, 0), t(1, 0), 4.0).unwrap();
        circuit.add_wire(t(2, 1), t(2, 2)).unwrap();

        calculate_potentials(&mut circuit, &[vec![battery]]);
        assert_relative_eq!(circuit.potential(t(0, 0)).unwrap(), 4.0);
        assert_relative_eq!(circuit.potential(t(2, 1)).unwrap(), 0.0);
        assert_relative_eq!(circuit.potential(t(2, 2)).unwrap(), 0.0);
        // Terminals with no components stay unset.
        assert!(circuit.potential(t(0, 2)).is_none());
    }
}

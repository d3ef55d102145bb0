//! Kirchhoff equation assembly and dense solving.

use crate::circuit::{Circuit, ComponentId, TerminalId, Topology};
use crate::components::Component;
use crate::error::{GridError, Result, UnsolvableReason};

/// Branch-current system Ax = z.
///
/// Column `b` of A holds the coefficients of branch current `b`. The first
/// rows are junction (current law) equations, the rest loop (voltage law)
/// equations.
#[derive(Debug)]
pub struct KirchhoffMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Constant vector z
    pub z: Vec<f64>,
    /// Solution vector x (branch currents)
    pub x: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
    /// LU decomposition of A
    pub lu: Vec<f64>,
    /// Pivot indices for LU decomposition
    pub pivots: Vec<usize>,
}

impl KirchhoffMatrix {
    /// Create a zeroed `size` x `size` system.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            x: vec![0.0; size],
            size,
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
        }
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Add to constant vector element.
    pub fn add_source(&mut self, row: usize, value: f64) {
        self.z[row] += value;
    }

    /// One row of A, for diagnostics.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.a[row * self.size..(row + 1) * self.size]
    }

    /// LU decomposition with partial pivoting.
    ///
    /// A pivot smaller than `tolerance` times the largest magnitude in A
    /// means the system is singular.
    pub fn factor(&mut self, tolerance: f64) -> Result<()> {
        let n = self.size;
        self.lu.copy_from_slice(&self.a);

        for i in 0..n {
            self.pivots[i] = i;
        }

        let scale = self.a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        if scale == 0.0 {
            return Err(GridError::unsolvable(UnsolvableReason::SingularMatrix));
        }
        let threshold = tolerance * scale;

        for k in 0..n {
            // Find pivot
            let mut max_val = self.lu[k * n + k].abs();
            let mut max_row = k;

            for i in (k + 1)..n {
                let val = self.lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val <= threshold {
                return Err(GridError::unsolvable(UnsolvableReason::SingularMatrix));
            }

            // Swap rows if needed
            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

            // Eliminate
            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        Ok(())
    }

    /// Solve the system using the pre-computed LU decomposition.
    pub fn solve(&mut self) -> Result<()> {
        let n = self.size;

        // Apply pivot permutation to z
        for i in 0..n {
            self.x[i] = self.z[self.pivots[i]];
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
            self.x[i] /= self.lu[i * n + i];
        }

        if self.x.iter().any(|v| !v.is_finite()) {
            return Err(GridError::unsolvable(UnsolvableReason::SingularMatrix));
        }
        Ok(())
    }
}

/// Build the Kirchhoff system for an analysed circuit.
///
/// One current-law row per junction except the last (the full set is
/// linearly dependent), then one voltage-law row per independent loop.
pub fn assemble(circuit: &Circuit, topology: &Topology) -> Result<KirchhoffMatrix> {
    let n = topology.num_branches;
    if n == 1 && topology.nodes.is_empty() {
        return single_loop(circuit, topology);
    }

    let junction_rows = topology.nodes.len().saturating_sub(1);
    let rows = junction_rows + topology.loops.len();
    if rows != n {
        tracing::warn!(
            rows,
            branches = n,
            "equation count does not match branch count; circuit may be fragmented"
        );
        return Err(GridError::unsolvable(UnsolvableReason::SingularMatrix));
    }

    let mut matrix = KirchhoffMatrix::new(n);
    for (row, &node) in topology.nodes[..junction_rows].iter().enumerate() {
        stamp_junction(circuit, topology, &mut matrix, row, node)?;
    }
    for (i, members) in topology.loops.iter().enumerate() {
        stamp_loop(circuit, topology, &mut matrix, junction_rows + i, members)?;
    }

    Ok(matrix)
}

/// A junction-free circuit is one loop carrying one current: total EMF over
/// total signed resistance.
fn single_loop(circuit: &Circuit, topology: &Topology) -> Result<KirchhoffMatrix> {
    let members = topology
        .loops
        .first()
        .ok_or(GridError::unsolvable(UnsolvableReason::IncompleteCircuit))?;
    let mut matrix = KirchhoffMatrix::new(1);
    stamp_loop(circuit, topology, &mut matrix, 0, members)?;
    Ok(matrix)
}

/// Current law: +1 for branches flowing into the junction, -1 for out.
fn stamp_junction(
    circuit: &Circuit,
    topology: &Topology,
    matrix: &mut KirchhoffMatrix,
    row: usize,
    node: TerminalId,
) -> Result<()> {
    for id in topology.core_connections(circuit, node) {
        let col = branch_column(topology, id, matrix.size)?;
        if topology.label(id).direction == Some(node) {
            matrix.add(row, col, 1.0);
        } else {
            matrix.add(row, col, -1.0);
        }
    }
    Ok(())
}

/// Voltage law around one loop, walked in stored order and closed back to
/// the first component.
///
/// A component contributes `+R` to its branch when the walk follows its
/// labelled current direction and `-R` otherwise. A battery adds its voltage
/// to the constant when the walk leaves through its positive end.
fn stamp_loop(
    circuit: &Circuit,
    topology: &Topology,
    matrix: &mut KirchhoffMatrix,
    row: usize,
    members: &[ComponentId],
) -> Result<()> {
    for (i, &id) in members.iter().enumerate() {
        let next_id = members[(i + 1) % members.len()];
        let component = live(circuit, id)?;
        let next = live(circuit, next_id)?;
        let exit = shared_end(component, next);

        let col = branch_column(topology, id, matrix.size)?;
        if topology.label(id).direction == Some(exit) {
            matrix.add(row, col, component.resistance());
        } else {
            matrix.add(row, col, -component.resistance());
        }

        if let Some(battery) = component.battery() {
            matrix.add_source(row, battery.emf_toward(exit));
        }
    }
    Ok(())
}

/// The end of `component` that `next` is attached to.
fn shared_end(component: &Component, next: &Component) -> TerminalId {
    if next.touches(component.ends[0]) {
        component.ends[0]
    } else {
        component.ends[1]
    }
}

fn live(circuit: &Circuit, id: ComponentId) -> Result<&Component> {
    circuit.component(id).ok_or(GridError::ComponentNotFound { id })
}

/// Matrix column of a component's branch.
///
/// A component in the equations without a live branch means the analysed
/// network was not a single connected circuit.
fn branch_column(topology: &Topology, id: ComponentId, size: usize) -> Result<usize> {
    match topology.label(id).branch.branch() {
        Some(b) if b.0 < size => Ok(b.0),
        _ => Err(GridError::unsolvable(UnsolvableReason::IncompleteCircuit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lu_solve() {
        // I1 - I5 - I2 = 0, -I1 - 5 I5 = -10, -I1 - 2 I2 = -10
        let mut m = KirchhoffMatrix::new(3);
        let rows = [[1.0, -1.0, -1.0], [-1.0, -5.0, 0.0], [-1.0, 0.0, -2.0]];
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                m.add(r, c, *v);
            }
        }
        m.add_source(1, -10.0);
        m.add_source(2, -10.0);

        m.factor(1e-12).unwrap();
        m.solve().unwrap();
        assert_relative_eq!(m.x[0], 70.0 / 17.0, epsilon = 1e-12);
        assert_relative_eq!(m.x[1], 20.0 / 17.0, epsilon = 1e-12);
        assert_relative_eq!(m.x[2], 50.0 / 17.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix() {
        let mut m = KirchhoffMatrix::new(2);
        m.add(0, 0, 1.0);
        m.add(0, 1, 2.0);
        m.add(1, 0, 2.0);
        m.add(1, 1, 4.0);
        let err = m.factor(1e-12).unwrap_err();
        assert_eq!(err.unsolvable_reason(), Some(UnsolvableReason::SingularMatrix));
    }

    #[test]
    fn test_zero_matrix_is_singular() {
        let mut m = KirchhoffMatrix::new(1);
        assert!(m.factor(1e-12).is_err());
    }

    #[test]
    fn test_single_loop_equation() {
        let t = TerminalId::new;
        let mut circuit = Circuit::new(2, 2).unwrap();
        circuit.add_battery(t(0, 0), t(1, 0), 6.0).unwrap();
        circuit.add_wire(t(0, 0), t(0, 1)).unwrap();
        circuit.add_resistor(t(0, 1), t(1, 1), 3.0).unwrap();
        circuit.add_wire(t(1, 1), t(1, 0)).unwrap();

        let topology = Topology::discover(&circuit);
        let m = assemble(&circuit, &topology).unwrap();
        assert_eq!(m.size, 1);
        // The walk leaves the battery at its negative end and crosses the
        // resistor with its labelled direction.
        assert_relative_eq!(m.row(0)[0], 3.0);
        assert_relative_eq!(m.z[0], -6.0);
    }

    #[test]
    fn test_parallel_system_shape() {
        let t = TerminalId::new;
        let mut circuit = Circuit::new(2, 3).unwrap();
        circuit.add_battery(t(0, 0), t(1, 0), 10.0).unwrap();
        circuit.add_resistor(t(0, 0), t(0, 1), 1.0).unwrap();
        circuit.add_wire(t(0, 1), t(0, 2)).unwrap();
        circuit.add_resistor(t(0, 1), t(1, 1), 5.0).unwrap();
        circuit.add_resistor(t(0, 2), t(1, 2), 2.0).unwrap();
        circuit.add_wire(t(1, 2), t(1, 1)).unwrap();
        circuit.add_wire(t(1, 1), t(1, 0)).unwrap();

        let topology = Topology::discover(&circuit);
        let m = assemble(&circuit, &topology).unwrap();
        assert_eq!(m.size, 3);
        // Every branch leaves the first junction.
        assert_eq!(m.row(0), &[-1.0, -1.0, -1.0]);
        assert_eq!(m.z[0], 0.0);
    }
}

//! WASM bindings for the grid circuit solver.
//!
//! JavaScript-friendly wrapper used by a browser front end that draws the
//! grid and lets the user place components.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmGridCircuit } from 'dcgrid_core';
//!
//! await init();
//!
//! const circuit = new WasmGridCircuit(2, 2);
//! circuit.add_battery(0, 0, 1, 0, 6);
//! circuit.add_wire(0, 0, 0, 1);
//! circuit.add_resistor(0, 1, 1, 1, 3);
//! circuit.add_wire(1, 1, 1, 0);
//!
//! const currents = circuit.solve();       // Float64Array
//! const v = circuit.potential(0, 1);       // 6
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{Circuit, ComponentId, TerminalId};
use crate::dsl;
use crate::error::GridError;
use crate::solver::{Solver, SolverConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_error(e: GridError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn pair(terminal: TerminalId) -> Vec<usize> {
    vec![terminal.row, terminal.col]
}

/// WASM-compatible grid circuit.
///
/// Components are addressed by their two terminals, since a terminal pair
/// holds at most one component.
#[wasm_bindgen]
pub struct WasmGridCircuit {
    circuit: Circuit,
    solver: Solver,
}

#[wasm_bindgen]
impl WasmGridCircuit {
    /// Create an empty circuit with a `rows` x `cols` terminal grid.
    #[wasm_bindgen(constructor)]
    pub fn new(rows: usize, cols: usize) -> Result<WasmGridCircuit, JsValue> {
        let circuit = Circuit::new(rows, cols).map_err(js_error)?;
        Ok(Self {
            circuit,
            solver: Solver::new(),
        })
    }

    /// Build a circuit from its DSL description.
    #[wasm_bindgen]
    pub fn from_dsl(circuit_dsl: &str) -> Result<WasmGridCircuit, JsValue> {
        let ast = dsl::parse(circuit_dsl).map_err(js_error)?;
        let circuit = Circuit::from_ast(ast).map_err(js_error)?;
        Ok(Self {
            circuit,
            solver: Solver::new(),
        })
    }

    /// Set the relative pivot tolerance used when solving.
    #[wasm_bindgen]
    pub fn set_pivot_tolerance(&mut self, tolerance: f64) {
        self.solver = Solver::with_config(SolverConfig::new().with_pivot_tolerance(tolerance));
    }

    #[wasm_bindgen]
    pub fn add_wire(&mut self, r1: usize, c1: usize, r2: usize, c2: usize) -> Result<(), JsValue> {
        self.circuit
            .add_wire(TerminalId::new(r1, c1), TerminalId::new(r2, c2))
            .map(|_| ())
            .map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn add_resistor(
        &mut self,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
        resistance: f64,
    ) -> Result<(), JsValue> {
        self.circuit
            .add_resistor(TerminalId::new(r1, c1), TerminalId::new(r2, c2), resistance)
            .map(|_| ())
            .map_err(js_error)
    }

    /// Add a battery; its positive end is the first terminal.
    #[wasm_bindgen]
    pub fn add_battery(
        &mut self,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
        voltage: f64,
    ) -> Result<(), JsValue> {
        self.circuit
            .add_battery(TerminalId::new(r1, c1), TerminalId::new(r2, c2), voltage)
            .map(|_| ())
            .map_err(js_error)
    }

    /// Add a battery with an explicit positive end at (`pos_row`, `pos_col`).
    #[wasm_bindgen]
    #[allow(clippy::too_many_arguments)]
    pub fn add_battery_with_positive(
        &mut self,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
        voltage: f64,
        pos_row: usize,
        pos_col: usize,
    ) -> Result<(), JsValue> {
        self.circuit
            .add_battery_with_positive(
                TerminalId::new(r1, c1),
                TerminalId::new(r2, c2),
                voltage,
                TerminalId::new(pos_row, pos_col),
            )
            .map(|_| ())
            .map_err(js_error)
    }

    /// Remove the component between two terminals.
    #[wasm_bindgen]
    pub fn remove(&mut self, r1: usize, c1: usize, r2: usize, c2: usize) -> Result<(), JsValue> {
        self.circuit
            .remove_between(TerminalId::new(r1, c1), TerminalId::new(r2, c2))
            .map(|_| ())
            .map_err(js_error)
    }

    /// Change the resistance of the resistor between two terminals.
    #[wasm_bindgen]
    pub fn set_resistance(
        &mut self,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
        resistance: f64,
    ) -> Result<(), JsValue> {
        let id = self.id_between(r1, c1, r2, c2)?;
        self.circuit.set_resistance(id, resistance).map_err(js_error)
    }

    /// Change the voltage of the battery between two terminals.
    #[wasm_bindgen]
    pub fn set_voltage(&mut self, r1: usize, c1: usize, r2: usize, c2: usize, voltage: f64) -> Result<(), JsValue> {
        let id = self.id_between(r1, c1, r2, c2)?;
        self.circuit.set_voltage(id, voltage).map_err(js_error)
    }

    /// Voltage of the battery between two terminals.
    #[wasm_bindgen]
    pub fn voltage(&self, r1: usize, c1: usize, r2: usize, c2: usize) -> Result<f64, JsValue> {
        let id = self.id_between(r1, c1, r2, c2)?;
        self.circuit.voltage(id).map_err(js_error)
    }

    /// Move the positive end of the battery between two terminals.
    #[wasm_bindgen]
    pub fn set_positive_end(
        &mut self,
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
        pos_row: usize,
        pos_col: usize,
    ) -> Result<(), JsValue> {
        let id = self.id_between(r1, c1, r2, c2)?;
        self.circuit
            .set_positive_end(id, TerminalId::new(pos_row, pos_col))
            .map_err(js_error)
    }

    /// Positive end `[row, col]` of the battery between two terminals.
    #[wasm_bindgen]
    pub fn positive_end(&self, r1: usize, c1: usize, r2: usize, c2: usize) -> Result<Vec<usize>, JsValue> {
        let id = self.id_between(r1, c1, r2, c2)?;
        self.circuit.positive_end(id).map(pair).map_err(js_error)
    }

    /// Solve the circuit and return the branch currents.
    ///
    /// Throws the error message if the circuit is incomplete, shorted or
    /// singular.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<Vec<f64>, JsValue> {
        self.circuit.solve_with(&self.solver).map_err(js_error)
    }

    /// Potential of a terminal after solving, or `undefined` if unset.
    #[wasm_bindgen]
    pub fn potential(&self, row: usize, col: usize) -> Option<f64> {
        self.circuit.potential(TerminalId::new(row, col))
    }

    /// Current through the component between two terminals, or `undefined`
    /// if there is none.
    #[wasm_bindgen]
    pub fn current_between(&self, r1: usize, c1: usize, r2: usize, c2: usize) -> Option<f64> {
        let id = self
            .circuit
            .component_between(TerminalId::new(r1, c1), TerminalId::new(r2, c2))?;
        self.circuit.component(id).map(|c| c.current())
    }

    /// Terminal `[row, col]` toward which `current_between` is measured, or
    /// `undefined` if the component carries no branch current.
    #[wasm_bindgen]
    pub fn current_direction_between(&self, r1: usize, c1: usize, r2: usize, c2: usize) -> Option<Vec<usize>> {
        let id = self
            .circuit
            .component_between(TerminalId::new(r1, c1), TerminalId::new(r2, c2))?;
        self.circuit.component(id)?.current_direction().map(pair)
    }

    /// Branch index of the component between two terminals, or `undefined`
    /// for dead ends, unsolved circuits and empty pairs.
    #[wasm_bindgen]
    pub fn branch_between(&self, r1: usize, c1: usize, r2: usize, c2: usize) -> Option<usize> {
        let id = self
            .circuit
            .component_between(TerminalId::new(r1, c1), TerminalId::new(r2, c2))?;
        self.circuit.component(id)?.branch().branch().map(|b| b.0)
    }

    /// True if the component between two terminals was pruned as a dead end.
    #[wasm_bindgen]
    pub fn is_dead_end_between(&self, r1: usize, c1: usize, r2: usize, c2: usize) -> bool {
        self.circuit
            .component_between(TerminalId::new(r1, c1), TerminalId::new(r2, c2))
            .and_then(|id| self.circuit.component(id))
            .is_some_and(|c| c.branch().is_dead_end())
    }

    /// Per-branch component listing.
    #[wasm_bindgen]
    pub fn describe(&self) -> String {
        self.circuit.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn num_branches(&self) -> usize {
        self.circuit.num_branches()
    }
}

impl WasmGridCircuit {
    fn id_between(&self, r1: usize, c1: usize, r2: usize, c2: usize) -> Result<ComponentId, JsValue> {
        let a = TerminalId::new(r1, c1);
        let b = TerminalId::new(r2, c2);
        self.circuit
            .component_between(a, b)
            .ok_or_else(|| js_error(GridError::NoComponentBetween { a, b }))
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_loop() -> WasmGridCircuit {
        let mut circuit = WasmGridCircuit::new(2, 2).unwrap();
        circuit.add_battery_with_positive(0, 0, 1, 0, 6.0, 0, 0).unwrap();
        circuit.add_wire(0, 0, 0, 1).unwrap();
        circuit.add_resistor(0, 1, 1, 1, 3.0).unwrap();
        circuit.add_wire(1, 1, 1, 0).unwrap();
        circuit
    }

    #[test]
    fn test_current_direction_resolves_sign() {
        let mut circuit = series_loop();
        circuit.solve().unwrap();

        let current = circuit.current_between(0, 1, 1, 1).unwrap();
        let toward = circuit.current_direction_between(0, 1, 1, 1).unwrap();
        let from = if toward == vec![0, 1] { (1, 1) } else { (0, 1) };
        // Flow runs from the high side to the low side of the resistor.
        let drop = circuit.potential(from.0, from.1).unwrap()
            - circuit.potential(toward[0], toward[1]).unwrap();
        assert!((drop - 3.0 * current).abs() < 1e-9);
        assert!((current.abs() - 2.0).abs() < 1e-12);

        assert_eq!(circuit.branch_between(0, 1, 1, 1), Some(0));
        assert!(!circuit.is_dead_end_between(0, 1, 1, 1));
        assert_eq!(circuit.current_direction_between(0, 0, 1, 1), None);
    }

    #[test]
    fn test_battery_setters_delegate() {
        let mut circuit = series_loop();
        assert_eq!(circuit.positive_end(0, 0, 1, 0).unwrap(), vec![0, 0]);
        circuit.set_positive_end(1, 0, 0, 0, 1, 0).unwrap();
        circuit.set_voltage(1, 0, 0, 0, 9.0).unwrap();
        assert_eq!(circuit.positive_end(0, 0, 1, 0).unwrap(), vec![1, 0]);
        assert_eq!(circuit.voltage(0, 0, 1, 0).unwrap(), 9.0);

        circuit.solve().unwrap();
        assert!((circuit.potential(1, 0).unwrap() - 9.0).abs() < 1e-12);
        assert!((circuit.potential(0, 0).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_dead_end_has_no_branch() {
        let mut circuit = WasmGridCircuit::new(2, 3).unwrap();
        circuit.add_battery(0, 0, 1, 0, 6.0).unwrap();
        circuit.add_wire(0, 0, 0, 1).unwrap();
        circuit.add_resistor(0, 1, 1, 1, 3.0).unwrap();
        circuit.add_wire(1, 1, 1, 0).unwrap();
        circuit.add_resistor(0, 1, 0, 2, 7.0).unwrap();
        circuit.solve().unwrap();

        assert!(circuit.is_dead_end_between(0, 1, 0, 2));
        assert_eq!(circuit.branch_between(0, 1, 0, 2), None);
        assert_eq!(circuit.current_direction_between(0, 1, 0, 2), None);
        assert_eq!(circuit.current_between(0, 1, 0, 2), Some(0.0));
    }
}

//! Circuit graph structure.

use std::fmt;

use super::terminal::Terminal;
use super::types::{BranchLabel, ComponentId, TerminalId};
use crate::components::{validate_resistance, validate_voltage, Battery, Component, ComponentKind, Resistor};
use crate::dsl::{CircuitAst, ComponentType};
use crate::error::{GridError, Result};
use crate::solver::Solver;

/// Largest number of terminals a grid may hold.
pub const MAX_TERMINALS: usize = 1 << 20;

/// A resistive DC network on a fixed grid of terminals.
#[derive(Debug, Clone)]
pub struct Circuit {
    rows: usize,
    cols: usize,
    /// Terminals in row-major order
    terminals: Vec<Terminal>,
    /// Component arena; removed slots stay `None` so ids are never reused
    components: Vec<Option<Component>>,
    /// Independent current variables found by the last solve
    num_branches: usize,
}

impl Circuit {
    /// Create an empty circuit with a `rows` x `cols` terminal grid.
    ///
    /// Both dimensions must be non-zero and the grid may hold at most
    /// [`MAX_TERMINALS`] terminals.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        let size = rows.checked_mul(cols).unwrap_or(usize::MAX);
        if size == 0 || size > MAX_TERMINALS {
            return Err(GridError::InvalidGrid { rows, cols });
        }
        let terminals = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Terminal::new(TerminalId::new(row, col))))
            .collect();
        Ok(Self {
            rows,
            cols,
            terminals,
            components: Vec::new(),
            num_branches: 0,
        })
    }

    /// Build a circuit from a parsed AST.
    ///
    /// The grid size comes from the `.grid` directive, or is the smallest
    /// grid holding every referenced terminal.
    pub fn from_ast(ast: CircuitAst) -> Result<Self> {
        let (rows, cols) = match ast.grid {
            Some(dims) => dims,
            None => ast.components.iter().flat_map(|c| c.ends.iter()).try_fold(
                (1, 1),
                |(rows, cols): (usize, usize), &(r, c)| match (r.checked_add(1), c.checked_add(1)) {
                    (Some(r), Some(c)) => Ok((rows.max(r), cols.max(c))),
                    _ => Err(GridError::InvalidGrid { rows: r, cols: c }),
                },
            )?,
        };
        let mut circuit = Circuit::new(rows, cols)?;

        for def in ast.components {
            let a = TerminalId::from(def.ends[0]);
            let b = TerminalId::from(def.ends[1]);
            let added = match def.component_type {
                ComponentType::Wire => {
                    if def.value.is_some() {
                        return Err(GridError::invalid_component(
                            &def.name,
                            def.line,
                            "wires do not take a value",
                        ));
                    }
                    circuit.add_wire(a, b)
                }
                ComponentType::Resistor => {
                    let value = def.value.ok_or_else(|| {
                        GridError::invalid_component(&def.name, def.line, "resistor requires a value")
                    })?;
                    circuit.add_resistor(a, b, value)
                }
                ComponentType::Battery => {
                    let value = def.value.ok_or_else(|| {
                        GridError::invalid_component(&def.name, def.line, "battery requires a value")
                    })?;
                    let positive = def.positive.map(TerminalId::from).unwrap_or(a);
                    circuit.add_battery_with_positive(a, b, value, positive)
                }
            };
            added.map_err(|e| GridError::invalid_component(&def.name, def.line, e.to_string()))?;
        }

        Ok(circuit)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, terminal: TerminalId) -> Result<usize> {
        if terminal.row < self.rows && terminal.col < self.cols {
            Ok(terminal.row * self.cols + terminal.col)
        } else {
            Err(GridError::TerminalOutOfRange {
                terminal,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Row-major index of a terminal, if it lies on the grid.
    pub(crate) fn terminal_index(&self, terminal: TerminalId) -> Option<usize> {
        self.index(terminal).ok()
    }

    /// Get a terminal by grid position.
    pub fn terminal(&self, terminal: TerminalId) -> Option<&Terminal> {
        self.index(terminal).ok().map(|i| &self.terminals[i])
    }

    pub(crate) fn terminal_mut(&mut self, terminal: TerminalId) -> Option<&mut Terminal> {
        match self.index(terminal) {
            Ok(i) => Some(&mut self.terminals[i]),
            Err(_) => None,
        }
    }

    /// Potential of a terminal, if it has one.
    pub fn potential(&self, terminal: TerminalId) -> Option<f64> {
        self.terminal(terminal).and_then(Terminal::potential)
    }

    /// All terminals in row-major order.
    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.terminals.iter()
    }

    /// Live components in insertion order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().flatten()
    }

    pub(crate) fn components_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.iter_mut().flatten()
    }

    /// Ids of live components in insertion order.
    pub fn component_ids(&self) -> Vec<ComponentId> {
        self.components().map(|c| c.id).collect()
    }

    /// Number of arena slots, including removed components.
    pub(crate) fn slot_count(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, id: ComponentId) -> Option<&Component> {
        self.components.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn component_mut(&mut self, id: ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn len(&self) -> usize {
        self.components().count()
    }

    pub fn is_empty(&self) -> bool {
        self.components().next().is_none()
    }

    /// The component joining an unordered terminal pair, if any.
    pub fn component_between(&self, a: TerminalId, b: TerminalId) -> Option<ComponentId> {
        self.components().find(|c| c.same_pair(a, b)).map(|c| c.id)
    }

    /// Number of independent branches found by the last successful solve.
    pub fn num_branches(&self) -> usize {
        self.num_branches
    }

    pub(crate) fn set_num_branches(&mut self, num_branches: usize) {
        self.num_branches = num_branches;
    }

    /// Add a wire between two terminals.
    pub fn add_wire(&mut self, a: TerminalId, b: TerminalId) -> Result<ComponentId> {
        self.add(ComponentKind::Wire, a, b)
    }

    /// Add a resistor between two terminals.
    pub fn add_resistor(&mut self, a: TerminalId, b: TerminalId, resistance: f64) -> Result<ComponentId> {
        let resistor = Resistor::new(resistance)?;
        self.add(ComponentKind::Resistor(resistor), a, b)
    }

    /// Add a battery whose positive end is `a`.
    pub fn add_battery(&mut self, a: TerminalId, b: TerminalId, voltage: f64) -> Result<ComponentId> {
        self.add_battery_with_positive(a, b, voltage, a)
    }

    /// Add a battery with an explicit positive end.
    pub fn add_battery_with_positive(
        &mut self,
        a: TerminalId,
        b: TerminalId,
        voltage: f64,
        positive: TerminalId,
    ) -> Result<ComponentId> {
        let battery = Battery::new(voltage, positive)?;
        if positive != a && positive != b {
            return Err(GridError::InvalidPositiveEnd {
                id: ComponentId(self.components.len()),
                terminal: positive,
            });
        }
        self.add(ComponentKind::Battery(battery), a, b)
    }

    fn add(&mut self, kind: ComponentKind, a: TerminalId, b: TerminalId) -> Result<ComponentId> {
        let ia = self.index(a)?;
        let ib = self.index(b)?;
        if a == b {
            return Err(GridError::DegenerateComponent { terminal: a });
        }
        if self.component_between(a, b).is_some() {
            return Err(GridError::Occupied { a, b });
        }

        let id = ComponentId(self.components.len());
        self.components.push(Some(Component::new(id, kind, [a, b])));
        self.terminals[ia].connect(id);
        self.terminals[ib].connect(id);
        tracing::trace!("added {} {} between {} and {}", kind.name(), id, a, b);
        Ok(id)
    }

    /// Remove a component, severing it from both terminals.
    pub fn remove(&mut self, id: ComponentId) -> Result<Component> {
        let component = self
            .components
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(GridError::ComponentNotFound { id })?;
        for end in component.ends {
            if let Some(t) = self.terminal_mut(end) {
                t.disconnect(id);
            }
        }
        tracing::trace!("removed {} {}", component.kind.name(), id);
        Ok(component)
    }

    /// Remove the component joining an unordered terminal pair.
    pub fn remove_between(&mut self, a: TerminalId, b: TerminalId) -> Result<Component> {
        let id = self
            .component_between(a, b)
            .ok_or(GridError::NoComponentBetween { a, b })?;
        self.remove(id)
    }

    /// Change a resistor's resistance.
    pub fn set_resistance(&mut self, id: ComponentId, resistance: f64) -> Result<()> {
        validate_resistance(resistance)?;
        match &mut self.live_mut(id)?.kind {
            ComponentKind::Resistor(r) => {
                r.resistance = resistance;
                Ok(())
            }
            _ => Err(GridError::WrongKind { id, expected: "resistor" }),
        }
    }

    /// Change a battery's voltage magnitude.
    pub fn set_voltage(&mut self, id: ComponentId, voltage: f64) -> Result<()> {
        validate_voltage(voltage)?;
        self.battery_mut(id)?.voltage = voltage;
        Ok(())
    }

    /// A battery's voltage magnitude.
    pub fn voltage(&self, id: ComponentId) -> Result<f64> {
        Ok(self.battery(id)?.voltage)
    }

    /// Move a battery's positive end to one of its terminals.
    pub fn set_positive_end(&mut self, id: ComponentId, positive: TerminalId) -> Result<()> {
        if !self.live(id)?.touches(positive) {
            return Err(GridError::InvalidPositiveEnd { id, terminal: positive });
        }
        self.battery_mut(id)?.positive = positive;
        Ok(())
    }

    /// A battery's positive end.
    pub fn positive_end(&self, id: ComponentId) -> Result<TerminalId> {
        Ok(self.battery(id)?.positive)
    }

    fn live(&self, id: ComponentId) -> Result<&Component> {
        self.component(id).ok_or(GridError::ComponentNotFound { id })
    }

    fn live_mut(&mut self, id: ComponentId) -> Result<&mut Component> {
        self.component_mut(id).ok_or(GridError::ComponentNotFound { id })
    }

    fn battery(&self, id: ComponentId) -> Result<&Battery> {
        self.live(id)?
            .battery()
            .ok_or(GridError::WrongKind { id, expected: "battery" })
    }

    fn battery_mut(&mut self, id: ComponentId) -> Result<&mut Battery> {
        match &mut self.live_mut(id)?.kind {
            ComponentKind::Battery(b) => Ok(b),
            _ => Err(GridError::WrongKind { id, expected: "battery" }),
        }
    }

    /// Reset every component's solution state and every terminal's potential.
    pub(crate) fn reset_solution(&mut self) {
        for component in self.components_mut() {
            component.reset();
        }
        for terminal in &mut self.terminals {
            terminal.clear_potential();
        }
        self.num_branches = 0;
    }

    /// Solve with the default solver.
    ///
    /// Returns the current of each branch, indexed by branch id. Afterwards
    /// every component carries its branch label, current and current
    /// direction, and every reachable terminal has a potential.
    pub fn solve(&mut self) -> Result<Vec<f64>> {
        Solver::new().solve(self)
    }

    /// Solve with a configured solver.
    pub fn solve_with(&mut self, solver: &Solver) -> Result<Vec<f64>> {
        solver.solve(self)
    }
}

impl fmt::Display for Circuit {
    /// Components grouped by branch, then dead ends, then unlabelled ones.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for branch in 0..self.num_branches {
            writeln!(f, "Branch {}", branch)?;
            for c in self.components() {
                if c.branch().branch().map(|b| b.0) == Some(branch) {
                    writeln!(f, "{}", c)?;
                }
            }
            writeln!(f)?;
        }
        if self.components().any(|c| c.branch().is_dead_end()) {
            writeln!(f, "Dead-end branch")?;
            for c in self.components().filter(|c| c.branch().is_dead_end()) {
                writeln!(f, "{}", c)?;
            }
        }
        // Left unlabelled by a solve that found no complete circuit.
        if self.components().any(|c| c.branch() == BranchLabel::Unassigned) {
            writeln!(f, "Unassigned")?;
            for c in self.components().filter(|c| c.branch() == BranchLabel::Unassigned) {
                writeln!(f, "{}", c)?;
            }
        }
        writeln!(f)
    }
}

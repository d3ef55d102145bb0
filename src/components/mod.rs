//! Component models for grid circuits.
//!
//! Every component is an edge between two grid terminals. The kind is a
//! tagged variant:
//! - Wire: ideal conductor, contributes only topology
//! - Resistor: contributes `R * I` drops to loop equations
//! - Battery: contributes a signed EMF to loop equations
//!
//! Per-solve state (branch label, current, current direction) lives on the
//! component and is reset at the start of every solve.

mod linear;
mod sources;

pub use linear::{validate_resistance, Resistor};
pub use sources::{validate_voltage, Battery};

use std::fmt;

use crate::circuit::{BranchLabel, ComponentId, TerminalId};

/// The kind of a component with its per-kind payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentKind {
    Wire,
    Resistor(Resistor),
    Battery(Battery),
}

impl ComponentKind {
    /// Short kind name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Wire => "wire",
            ComponentKind::Resistor(_) => "resistor",
            ComponentKind::Battery(_) => "battery",
        }
    }
}

/// Position-and-value key for comparing components across circuits.
///
/// Ends are stored in ascending order so the key does not depend on which
/// end was given first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentKey {
    pub ends: [TerminalId; 2],
    pub kind: ComponentKind,
}

/// A circuit component.
#[derive(Debug, Clone)]
pub struct Component {
    pub id: ComponentId,
    pub kind: ComponentKind,
    /// Endpoints in the order they were given when the component was added
    pub ends: [TerminalId; 2],
    branch: BranchLabel,
    current: f64,
    current_direction: Option<TerminalId>,
}

impl Component {
    /// Create a component between two terminals.
    pub fn new(id: ComponentId, kind: ComponentKind, ends: [TerminalId; 2]) -> Self {
        Self {
            id,
            kind,
            ends,
            branch: BranchLabel::Unassigned,
            current: 0.0,
            current_direction: None,
        }
    }

    /// Resistance in ohms; zero for wires and batteries.
    pub fn resistance(&self) -> f64 {
        match &self.kind {
            ComponentKind::Resistor(r) => r.resistance,
            ComponentKind::Wire | ComponentKind::Battery(_) => 0.0,
        }
    }

    pub fn is_resistor(&self) -> bool {
        matches!(self.kind, ComponentKind::Resistor(_))
    }

    pub fn is_battery(&self) -> bool {
        matches!(self.kind, ComponentKind::Battery(_))
    }

    pub fn battery(&self) -> Option<&Battery> {
        match &self.kind {
            ComponentKind::Battery(b) => Some(b),
            _ => None,
        }
    }

    /// True if `terminal` is one of the two ends.
    pub fn touches(&self, terminal: TerminalId) -> bool {
        self.ends[0] == terminal || self.ends[1] == terminal
    }

    /// The end opposite `terminal`.
    ///
    /// When `terminal` is not an end, the second end is returned.
    pub fn other_end(&self, terminal: TerminalId) -> TerminalId {
        if self.ends[1] == terminal {
            self.ends[0]
        } else {
            self.ends[1]
        }
    }

    /// True if this component joins the unordered terminal pair (a, b).
    pub fn same_pair(&self, a: TerminalId, b: TerminalId) -> bool {
        (self.ends[0] == a && self.ends[1] == b) || (self.ends[0] == b && self.ends[1] == a)
    }

    /// Key for cross-circuit comparison.
    pub fn key(&self) -> ComponentKey {
        let [a, b] = self.ends;
        ComponentKey {
            ends: if a <= b { [a, b] } else { [b, a] },
            kind: self.kind,
        }
    }

    pub fn branch(&self) -> BranchLabel {
        self.branch
    }

    pub fn set_branch(&mut self, branch: BranchLabel) {
        self.branch = branch;
    }

    /// Signed current; positive means flow toward [`Self::current_direction`].
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn set_current(&mut self, current: f64) {
        self.current = current;
    }

    /// The end toward which positive current is defined to flow.
    pub fn current_direction(&self) -> Option<TerminalId> {
        self.current_direction
    }

    pub fn set_current_direction(&mut self, direction: Option<TerminalId>) {
        self.current_direction = direction;
    }

    /// Clear branch label, current and direction.
    pub fn reset(&mut self) {
        self.branch = BranchLabel::Unassigned;
        self.current = 0.0;
        self.current_direction = None;
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}  Current Direction: ", self.ends[0], self.ends[1])?;
        match self.current_direction {
            Some(t) => write!(f, "{}", t)?,
            None => write!(f, "none")?,
        }
        write!(f, "  Current: {}  ", self.current)?;
        match &self.kind {
            ComponentKind::Wire => write!(f, "Wire"),
            ComponentKind::Resistor(r) => write!(f, "Resistor {} ohms", r.resistance),
            ComponentKind::Battery(b) => {
                write!(f, "Battery {} V  Pos. End {}", b.voltage, b.positive)
            }
        }
    }
}

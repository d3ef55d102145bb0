//! Abstract Syntax Tree types for the circuit DSL.

/// Complete AST representation of a parsed circuit.
#[derive(Debug, Clone, Default)]
pub struct CircuitAst {
    /// Grid size from the `.grid` directive, as (rows, cols)
    pub grid: Option<(usize, usize)>,
    /// All component instances, in file order
    pub components: Vec<ComponentDef>,
}

impl CircuitAst {
    /// Create a new empty circuit AST.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A component definition from the DSL.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub component_type: ComponentType,
    /// Unique component name
    pub name: String,
    /// Terminal coordinates as (row, col)
    pub ends: [(usize, usize); 2],
    /// Resistance or voltage
    pub value: Option<f64>,
    /// Battery positive end, if given with `pos=`
    pub positive: Option<(usize, usize)>,
    /// Source line number for error reporting
    pub line: usize,
}

/// Component types supported by the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Wire,
    Resistor,
    Battery,
}

impl ComponentType {
    /// Parse a component type from the first letter of its name.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'W' => Some(Self::Wire),
            'R' => Some(Self::Resistor),
            'B' | 'V' => Some(Self::Battery),
            _ => None,
        }
    }

    /// True if the component needs a value (resistance or voltage).
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::Wire)
    }
}

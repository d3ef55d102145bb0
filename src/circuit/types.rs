//! Core types for circuit representation.

use std::fmt;

/// Grid position of a terminal.
///
/// Two terminals are the same terminal iff row and column match, regardless
/// of which circuit they were obtained from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalId {
    pub row: usize,
    pub col: usize,
}

impl TerminalId {
    /// Terminal at (row, col).
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl From<(usize, usize)> for TerminalId {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A stable identifier for a component in a circuit.
///
/// Ids are never reused, so an id stays valid (or becomes dangling) across
/// removals of other components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub usize);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

/// Index of an independent current variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub usize);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "I{}", self.0)
    }
}

/// Branch assignment of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BranchLabel {
    /// Not yet visited by branch labelling.
    #[default]
    Unassigned,
    /// Carries the current of this branch.
    Live(BranchId),
    /// Dead-end stub or disconnected fragment; excluded from the equations.
    DeadEnd,
}

impl BranchLabel {
    /// The branch index, if this component carries a solved current.
    pub fn branch(&self) -> Option<BranchId> {
        match self {
            BranchLabel::Live(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_dead_end(&self) -> bool {
        matches!(self, BranchLabel::DeadEnd)
    }
}

impl fmt::Display for BranchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchLabel::Unassigned => write!(f, "unassigned"),
            BranchLabel::Live(b) => write!(f, "{}", b.0),
            BranchLabel::DeadEnd => write!(f, "dead end"),
        }
    }
}

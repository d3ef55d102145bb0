//! Error types for the grid circuit solver.
//!
//! This module provides a unified error type [`GridError`] that covers
//! all error conditions that can occur while parsing circuit files,
//! editing a circuit, and solving it.

use thiserror::Error;

use crate::circuit::{ComponentId, TerminalId};

/// Result type alias using [`GridError`].
pub type Result<T> = std::result::Result<T, GridError>;

/// Why a circuit could not be solved.
///
/// All reasons surface through [`GridError::Unsolvable`]; callers that only
/// care whether a solution exists can match on that single variant.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsolvableReason {
    /// No complete current-carrying loop exists.
    #[error("incomplete circuit")]
    IncompleteCircuit,

    /// A zero-resistance loop is driven by a battery.
    #[error("short circuit")]
    ShortCircuit,

    /// The Kirchhoff system has no unique solution.
    #[error("singular equation system")]
    SingularMatrix,
}

/// Unified error type for all circuit operations.
#[derive(Error, Debug)]
pub enum GridError {
    // ============ DSL Parsing Errors ============
    /// Error during lexical analysis
    #[error("Lexer error at line {line}, column {column}: {message}")]
    LexerError {
        line: usize,
        column: usize,
        message: String,
    },

    /// Error during parsing
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Invalid component definition
    #[error("Invalid component '{name}' at line {line}: {message}")]
    InvalidComponent {
        name: String,
        line: usize,
        message: String,
    },

    /// Unknown component type
    #[error("Unknown component type '{component_type}' at line {line}")]
    UnknownComponentType { component_type: String, line: usize },

    /// Duplicate component name
    #[error("Duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    // ============ Circuit Editing Errors ============
    /// Grid with a zero dimension, or too many terminals
    #[error("Invalid grid size {rows}x{cols}")]
    InvalidGrid { rows: usize, cols: usize },

    /// Terminal outside the grid
    #[error("Terminal {terminal} is outside the {rows}x{cols} grid")]
    TerminalOutOfRange {
        terminal: TerminalId,
        rows: usize,
        cols: usize,
    },

    /// Both ends of a component on the same terminal
    #[error("Component cannot start and end at terminal {terminal}")]
    DegenerateComponent { terminal: TerminalId },

    /// A component already joins this terminal pair
    #[error("Terminals {a} and {b} are already joined by a component")]
    Occupied { a: TerminalId, b: TerminalId },

    /// No component joins this terminal pair
    #[error("No component between {a} and {b}")]
    NoComponentBetween { a: TerminalId, b: TerminalId },

    /// Component id does not refer to a live component
    #[error("Component {id} not found in circuit")]
    ComponentNotFound { id: ComponentId },

    /// Resistance must be finite and strictly positive
    #[error("Invalid resistance {value} (must be finite and > 0)")]
    InvalidResistance { value: f64 },

    /// Voltage must be finite and non-negative
    #[error("Invalid voltage {value} (must be finite and >= 0)")]
    InvalidVoltage { value: f64 },

    /// Operation applied to the wrong kind of component
    #[error("Component {id} is not a {expected}")]
    WrongKind { id: ComponentId, expected: &'static str },

    /// Battery positive end must be one of its terminals
    #[error("Terminal {terminal} is not an end of battery {id}")]
    InvalidPositiveEnd { id: ComponentId, terminal: TerminalId },

    // ============ Solving Errors ============
    /// Short circuit, incomplete circuit, or singular system
    #[error("Circuit cannot be solved: {reason}")]
    Unsolvable { reason: UnsolvableReason },

    // ============ I/O Errors ============
    /// Error reading circuit file
    #[error("Failed to read circuit file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing a report
    #[error("Report output error: {message}")]
    OutputError { message: String },
}

impl GridError {
    /// Create a lexer error
    pub fn lexer(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::LexerError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid component error
    pub fn invalid_component(name: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidComponent {
            name: name.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an unsolvable-circuit error
    pub fn unsolvable(reason: UnsolvableReason) -> Self {
        Self::Unsolvable { reason }
    }

    /// True for the single "circuit not solvable" outcome of `solve()`.
    pub fn is_unsolvable(&self) -> bool {
        matches!(self, Self::Unsolvable { .. })
    }

    /// The diagnosis behind an unsolvable circuit, if this is one.
    pub fn unsolvable_reason(&self) -> Option<UnsolvableReason> {
        match self {
            Self::Unsolvable { reason } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsolvable_message() {
        let err = GridError::unsolvable(UnsolvableReason::ShortCircuit);
        assert!(err.is_unsolvable());
        assert_eq!(err.unsolvable_reason(), Some(UnsolvableReason::ShortCircuit));
        assert_eq!(err.to_string(), "Circuit cannot be solved: short circuit");
    }

    #[test]
    fn test_editing_errors_are_not_unsolvable() {
        let err = GridError::InvalidResistance { value: -1.0 };
        assert!(!err.is_unsolvable());
        assert_eq!(err.unsolvable_reason(), None);
    }
}

//! DSL (Domain Specific Language) parser for grid circuit descriptions.
//!
//! A small line-oriented format for circuits laid out on a grid of
//! terminals. Each terminal is addressed as `row,col`.
//!
//! # Grammar Overview
//!
//! ```text
//! circuit   = { line }
//! line      = comment | directive | component | empty
//! comment   = ('#' | ';') { any_char }
//! directive = ".grid" rows cols
//! component = name terminal terminal [value] [ "pos" "=" terminal ]
//! terminal  = row "," col
//!
//! name        = identifier
//! value       = number [unit_suffix]
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! ```
//!
//! # Component Types
//!
//! The first letter of the name selects the kind.
//!
//! | Prefix | Description | Syntax |
//! |--------|-------------|--------|
//! | W | Wire | `W<name> <a> <b>` |
//! | R | Resistor | `R<name> <a> <b> <ohms>` |
//! | B, V | Battery | `B<name> <a> <b> <volts> [pos=<t>]` |
//!
//! A battery's positive end is its first terminal unless `pos=` names
//! the other one. Without `.grid` the grid is sized to fit.
//!
//! # Example
//!
//! ```text
//! # 6 V across a 3 ohm resistor
//! .grid 2 2
//! B1 0,0 1,0 6
//! W1 0,0 0,1
//! R1 0,1 1,1 3
//! W2 1,1 1,0
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a circuit DSL string into an AST.
pub fn parse(input: &str) -> Result<CircuitAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer)?;
    parser.parse()
}

/// Parse a circuit DSL file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<CircuitAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::GridError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}

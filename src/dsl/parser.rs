//! Parser for the circuit DSL.

use std::collections::HashSet;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{GridError, Result};

/// Parser for circuit DSL.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(mut lexer: Lexer<'a>) -> Result<Self> {
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    /// Parse the entire circuit description.
    pub fn parse(&mut self) -> Result<CircuitAst> {
        let mut ast = CircuitAst::new();
        let mut names = HashSet::new();

        while self.current.kind != TokenKind::Eof {
            // Skip empty lines
            if self.current.kind == TokenKind::Newline {
                self.advance()?;
                continue;
            }

            match self.current.kind {
                TokenKind::Directive => {
                    self.parse_directive(&mut ast)?;
                }
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    if !names.insert(component.name.clone()) {
                        return Err(GridError::DuplicateComponent {
                            name: component.name,
                        });
                    }
                    ast.components.push(component);
                }
                _ => {
                    return Err(GridError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            match self.current.kind {
                TokenKind::Newline => self.advance()?,
                TokenKind::Eof => {}
                _ => {
                    return Err(GridError::parse(
                        self.current.line,
                        format!("unexpected trailing token: {:?}", self.current.text),
                    ));
                }
            }
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(GridError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn expect_index(&mut self) -> Result<usize> {
        let tok = self.expect(TokenKind::Number)?;
        tok.text
            .parse::<usize>()
            .map_err(|_| GridError::parse(tok.line, format!("invalid grid index: {}", tok.text)))
    }

    /// `row , col`
    fn parse_terminal(&mut self) -> Result<(usize, usize)> {
        let row = self.expect_index()?;
        self.expect(TokenKind::Comma)?;
        let col = self.expect_index()?;
        Ok((row, col))
    }

    fn parse_directive(&mut self, ast: &mut CircuitAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".grid" => {
                if ast.grid.is_some() {
                    return Err(GridError::parse(line, "grid size declared twice"));
                }
                let rows = self.expect_index()?;
                let cols = self.expect_index()?;
                ast.grid = Some((rows, cols));
            }
            _ => {
                return Err(GridError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let name = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        let first_char = name.chars().next().unwrap_or('?');
        let component_type =
            ComponentType::from_prefix(first_char).ok_or_else(|| GridError::UnknownComponentType {
                component_type: name.clone(),
                line,
            })?;

        let ends = [self.parse_terminal()?, self.parse_terminal()?];

        let value = if self.current.kind == TokenKind::Number {
            let text = self.current.text.clone();
            self.advance()?;
            let v = parse_value(&text)
                .ok_or_else(|| GridError::parse(line, format!("invalid number: {}", text)))?;
            Some(v)
        } else {
            None
        };

        let mut positive = None;
        while self.current.kind == TokenKind::Identifier {
            let key = self.current.text.clone();
            self.advance()?;
            self.expect(TokenKind::Equals)?;
            match key.to_lowercase().as_str() {
                "pos" => positive = Some(self.parse_terminal()?),
                _ => {
                    return Err(GridError::invalid_component(
                        &name,
                        line,
                        format!("unknown option '{}'", key),
                    ));
                }
            }
        }

        if component_type.takes_value() && value.is_none() {
            return Err(GridError::invalid_component(&name, line, "missing value"));
        }
        if !component_type.takes_value() && value.is_some() {
            return Err(GridError::invalid_component(&name, line, "wires do not take a value"));
        }
        if let Some(pos) = positive {
            if component_type != ComponentType::Battery {
                return Err(GridError::invalid_component(
                    &name,
                    line,
                    "only batteries have a positive end",
                ));
            }
            if pos != ends[0] && pos != ends[1] {
                return Err(GridError::invalid_component(
                    &name,
                    line,
                    "positive end must be one of the battery's terminals",
                ));
            }
        }

        Ok(ComponentDef {
            component_type,
            name,
            ends,
            value,
            positive,
            line,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;

    #[test]
    fn test_parse_resistor() {
        let ast = parse("R1 0,1 1,1 3k").unwrap();
        assert_eq!(ast.components.len(), 1);
        let r = &ast.components[0];
        assert_eq!(r.component_type, ComponentType::Resistor);
        assert_eq!(r.name, "R1");
        assert_eq!(r.ends, [(0, 1), (1, 1)]);
        assert_eq!(r.value, Some(3000.0));
        assert_eq!(r.line, 1);
    }

    #[test]
    fn test_parse_grid_and_battery() {
        let input = ".grid 2 3\nB1 0,0 1,0 6 pos=1,0\nW1 0,0 0,1\n";
        let ast = parse(input).unwrap();
        assert_eq!(ast.grid, Some((2, 3)));
        let b = &ast.components[0];
        assert_eq!(b.component_type, ComponentType::Battery);
        assert_eq!(b.value, Some(6.0));
        assert_eq!(b.positive, Some((1, 0)));
        assert_eq!(ast.components[1].component_type, ComponentType::Wire);
        assert_eq!(ast.components[1].line, 3);
    }

    #[test]
    fn test_parse_with_comments() {
        let input = "# A loop\n\nV1 0,0 1,0 9 ; nine volts\nW1 0,0 0,1\n";
        let ast = parse(input).unwrap();
        assert_eq!(ast.components.len(), 2);
        assert_eq!(ast.components[0].component_type, ComponentType::Battery);
    }

    #[test]
    fn test_duplicate_name() {
        let err = parse("W1 0,0 0,1\nW1 0,1 0,2").unwrap_err();
        assert!(matches!(err, GridError::DuplicateComponent { name } if name == "W1"));
    }

    #[test]
    fn test_value_rules() {
        assert!(matches!(
            parse("R1 0,0 0,1").unwrap_err(),
            GridError::InvalidComponent { .. }
        ));
        assert!(matches!(
            parse("W1 0,0 0,1 5").unwrap_err(),
            GridError::InvalidComponent { .. }
        ));
        assert!(matches!(
            parse("R1 0,0 0,1 5 pos=0,0").unwrap_err(),
            GridError::InvalidComponent { .. }
        ));
        assert!(matches!(
            parse("B1 0,0 0,1 5 pos=1,1").unwrap_err(),
            GridError::InvalidComponent { .. }
        ));
    }

    #[test]
    fn test_unknown_type_and_directive() {
        assert!(matches!(
            parse("C1 0,0 0,1 1u").unwrap_err(),
            GridError::UnknownComponentType { line: 1, .. }
        ));
        assert!(matches!(
            parse(".model X").unwrap_err(),
            GridError::ParseError { line: 1, .. }
        ));
    }

    #[test]
    fn test_malformed_terminal() {
        assert!(matches!(
            parse("W1 0 0,1").unwrap_err(),
            GridError::ParseError { .. }
        ));
        assert!(matches!(
            parse("W1 -1,0 0,1").unwrap_err(),
            GridError::ParseError { .. }
        ));
    }
}

//! Passive components: Resistor and Wire.

use crate::circuit::TerminalId;
use crate::error::{GridError, Result};

/// A resistor payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resistor {
    /// Resistance in ohms, always finite and > 0
    pub resistance: f64,
}

impl Resistor {
    /// Create a resistor, rejecting non-positive or non-finite values.
    pub fn new(resistance: f64) -> Result<Self> {
        validate_resistance(resistance)?;
        Ok(Self { resistance })
    }

    /// Voltage drop across the resistor when `current` flows toward `direction`,
    /// seen from the end the walk leaves (`from`).
    ///
    /// Positive when walking with the labelled current.
    pub fn drop_along(&self, current: f64, direction: Option<TerminalId>, from: TerminalId) -> f64 {
        if direction == Some(from) {
            -self.resistance * current
        } else {
            self.resistance * current
        }
    }
}

/// Check that a resistance is usable in the loop equations.
pub fn validate_resistance(resistance: f64) -> Result<()> {
    if resistance.is_finite() && resistance > 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidResistance { value: resistance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistor_validation() {
        assert!(Resistor::new(10.0).is_ok());
        assert!(matches!(
            Resistor::new(0.0),
            Err(GridError::InvalidResistance { .. })
        ));
        assert!(Resistor::new(-3.0).is_err());
        assert!(Resistor::new(f64::NAN).is_err());
        assert!(Resistor::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_drop_along() {
        let r = Resistor::new(5.0).unwrap();
        let a = TerminalId::new(0, 0);
        let b = TerminalId::new(0, 1);
        // Current 2A flows toward b; walking a -> b follows it.
        assert!((r.drop_along(2.0, Some(b), a) - 10.0).abs() < 1e-12);
        // Walking b -> a goes against it.
        assert!((r.drop_along(2.0, Some(b), b) + 10.0).abs() < 1e-12);
    }
}

//! Ideal batteries.

use crate::circuit::TerminalId;
use crate::error::{GridError, Result};

/// An ideal battery payload.
///
/// The voltage is a non-negative magnitude; the sign it contributes to a
/// loop equation depends on which end the loop walk leaves through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Battery {
    pub voltage: f64,
    /// Higher-potential terminal
    pub positive: TerminalId,
}

impl Battery {
    /// Create a battery, rejecting negative or non-finite voltages.
    pub fn new(voltage: f64, positive: TerminalId) -> Result<Self> {
        validate_voltage(voltage)?;
        Ok(Self { voltage, positive })
    }

    /// EMF gained when a walk exits the battery through `exit`.
    ///
    /// Leaving through the positive end means walking negative to positive,
    /// which is a gain.
    pub fn emf_toward(&self, exit: TerminalId) -> f64 {
        if exit == self.positive {
            self.voltage
        } else {
            -self.voltage
        }
    }

    /// Potential of the opposite end given the potential of `known`.
    pub fn other_potential(&self, known: TerminalId, potential: f64) -> f64 {
        if known == self.positive {
            potential - self.voltage
        } else {
            potential + self.voltage
        }
    }
}

/// Check that a battery voltage is a usable magnitude.
pub fn validate_voltage(voltage: f64) -> Result<()> {
    if voltage.is_finite() && voltage >= 0.0 {
        Ok(())
    } else {
        Err(GridError::InvalidVoltage { value: voltage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emf_sign() {
        let pos = TerminalId::new(0, 0);
        let neg = TerminalId::new(1, 0);
        let b = Battery::new(9.0, pos).unwrap();
        assert_eq!(b.emf_toward(pos), 9.0);
        assert_eq!(b.emf_toward(neg), -9.0);
    }

    #[test]
    fn test_other_potential() {
        let pos = TerminalId::new(0, 0);
        let neg = TerminalId::new(1, 0);
        let b = Battery::new(6.0, pos).unwrap();
        assert_eq!(b.other_potential(pos, 6.0), 0.0);
        assert_eq!(b.other_potential(neg, 0.0), 6.0);
    }

    #[test]
    fn test_voltage_validation() {
        assert!(Battery::new(0.0, TerminalId::new(0, 0)).is_ok());
        assert!(matches!(
            Battery::new(-1.5, TerminalId::new(0, 0)),
            Err(GridError::InvalidVoltage { .. })
        ));
    }
}

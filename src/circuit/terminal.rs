//! Grid terminals.

use super::types::{ComponentId, TerminalId};

/// A node of the component graph.
///
/// The incidence list keeps connection order; branch walking and loop
/// discovery break ties by taking the earliest connection, so the order is
/// part of the solver's determinism.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub id: TerminalId,
    connections: Vec<ComponentId>,
    potential: Option<f64>,
}

impl Terminal {
    /// Create an unconnected terminal with no potential.
    pub fn new(id: TerminalId) -> Self {
        Self {
            id,
            connections: Vec::new(),
            potential: None,
        }
    }

    /// Append a component to the incidence list.
    pub fn connect(&mut self, component: ComponentId) {
        self.connections.push(component);
    }

    /// Remove a component from the incidence list, preserving the order of
    /// the remaining connections.
    pub fn disconnect(&mut self, component: ComponentId) {
        debug_assert!(
            self.connections.contains(&component),
            "{} is not connected to terminal {}",
            component,
            self.id
        );
        self.connections.retain(|c| *c != component);
    }

    /// Incident components in connection order.
    pub fn connections(&self) -> &[ComponentId] {
        &self.connections
    }

    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    /// Electrical potential, or `None` if no solve has reached this terminal.
    pub fn potential(&self) -> Option<f64> {
        self.potential
    }

    pub fn set_potential(&mut self, potential: f64) {
        self.potential = Some(potential);
    }

    pub fn clear_potential(&mut self) {
        self.potential = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_disconnect_keeps_order() {
        let mut t = Terminal::new(TerminalId::new(0, 0));
        t.connect(ComponentId(3));
        t.connect(ComponentId(1));
        t.connect(ComponentId(7));
        assert_eq!(t.num_connections(), 3);

        t.disconnect(ComponentId(1));
        assert_eq!(t.connections(), &[ComponentId(3), ComponentId(7)]);
        assert_eq!(t.num_connections(), 2);
    }

    #[test]
    fn test_potential() {
        let mut t = Terminal::new(TerminalId::new(1, 2));
        assert_eq!(t.potential(), None);
        t.set_potential(4.5);
        assert_eq!(t.potential(), Some(4.5));
        t.clear_potential();
        assert_eq!(t.potential(), None);
    }
}

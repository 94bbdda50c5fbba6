//! Linear resistor, used on its own and as a device's series resistance.

use fetsim_core::{Circuit, Element, MnaSystem, NodeId};

use crate::error::Result;
use crate::stamp::{node_to_index, Stamp};

/// A resistor element.
#[derive(Debug, Clone)]
pub struct Resistor {
    /// Device name (e.g., "R1").
    pub name: String,
    /// Positive terminal node.
    pub node_pos: NodeId,
    /// Negative terminal node.
    pub node_neg: NodeId,
    /// Resistance value in ohms.
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(
        name: impl Into<String>,
        node_pos: NodeId,
        node_neg: NodeId,
        resistance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            node_pos,
            node_neg,
            resistance,
        }
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }
}

impl Stamp for Resistor {
    fn stamp(&self, circuit: &Circuit, mna: &mut MnaSystem) -> Result<()> {
        let i = node_to_index(circuit, self.node_pos)?;
        let j = node_to_index(circuit, self.node_neg)?;
        mna.stamp_conductance(i, j, self.conductance());
        Ok(())
    }
}

impl Element for Resistor {
    fn name(&self) -> &str {
        &self.name
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.node_pos, self.node_neg]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resistor_stamp() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node();
        let b = circuit.add_node();
        let r = Resistor::new("R1", a, b, 1000.0);

        let mut mna = MnaSystem::new(2, 0);
        r.stamp(&circuit, &mut mna).unwrap();

        assert!((mna.matrix()[(0, 0)] - 1e-3).abs() < 1e-15);
        assert!((mna.matrix()[(0, 1)] + 1e-3).abs() < 1e-15);
        assert_eq!(r.nodes(), vec![a, b]);
    }

    #[test]
    fn test_resistor_to_ground() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node();
        let r = Resistor::new("R1", a, NodeId::GROUND, 50.0);

        let mut mna = MnaSystem::new(1, 0);
        r.stamp(&circuit, &mut mna).unwrap();
        assert!((mna.matrix()[(0, 0)] - 0.02).abs() < 1e-15);
    }

    #[test]
    fn test_resistor_on_removed_node() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node();
        circuit.remove_node(a).unwrap();
        let r = Resistor::new("R1", a, NodeId::GROUND, 50.0);

        let mut mna = MnaSystem::new(1, 0);
        assert!(r.stamp(&circuit, &mut mna).is_err());
    }
}

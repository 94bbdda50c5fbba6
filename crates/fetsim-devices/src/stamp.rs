//! MNA stamping trait.

use fetsim_core::{Circuit, Error as CoreError, MnaSystem, NodeId};

use crate::error::Result;

/// Trait for devices that can stamp into an MNA matrix.
pub trait Stamp {
    /// Stamp this device's present companion model into the MNA system.
    ///
    /// `circuit` maps the device's nodes to matrix rows; nodes the network
    /// no longer knows about are an error.
    fn stamp(&self, circuit: &Circuit, mna: &mut MnaSystem) -> Result<()>;
}

/// Matrix row of a node, `None` for ground.
pub(crate) fn node_to_index(circuit: &Circuit, node: NodeId) -> Result<Option<usize>> {
    if node.is_ground() {
        return Ok(None);
    }
    circuit
        .matrix_index(node)
        .map(Some)
        .ok_or_else(|| CoreError::NodeNotFound(node.to_string()).into())
}

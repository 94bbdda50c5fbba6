//! The live network graph that devices splice auxiliary elements into.

use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};
use crate::node::{Node, NodeId};

/// A network of nodes plus the names of the elements attached to them.
///
/// Node order is insertion order and is stable across removals, so the
/// position of a node doubles as its row in the MNA matrix.
#[derive(Debug)]
pub struct Circuit {
    nodes: IndexMap<NodeId, Node>,
    elements: IndexMap<String, Vec<NodeId>>,
    next_node_id: u32,
    title: Option<String>,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

impl Circuit {
    /// Create a new network containing only ground.
    pub fn new() -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(NodeId::GROUND, Node::new(NodeId::GROUND));
        Self {
            nodes,
            elements: IndexMap::new(),
            next_node_id: 1, // 0 is reserved for ground
            title: None,
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        let mut circuit = Self::new();
        circuit.title = Some(title.into());
        circuit
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn next_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Add an unnamed node, returning its ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = self.next_id();
        self.nodes.insert(id, Node::new(id));
        id
    }

    /// Add a named node, returning its ID.
    pub fn add_named_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        if self.find_node(&name).is_some() {
            return Err(Error::DuplicateNode(name));
        }
        let id = self.next_id();
        self.nodes.insert(id, Node::with_name(id, name));
        Ok(id)
    }

    /// Add a device-internal node, returning its ID.
    pub fn add_internal_node(&mut self, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        if self.find_node(&name).is_some() {
            return Err(Error::DuplicateNode(name));
        }
        let id = self.next_id();
        debug!("inserting internal node {name} as {id}");
        self.nodes.insert(id, Node::internal(id, name));
        Ok(id)
    }

    /// Remove a node that no attached element references.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Node> {
        if id.is_ground() {
            return Err(Error::InvalidCircuit("ground cannot be removed".into()));
        }
        if let Some((element, _)) = self.elements.iter().find(|(_, n)| n.contains(&id)) {
            return Err(Error::InvalidCircuit(format!(
                "node {id} is still used by {element}"
            )));
        }
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))?;
        debug!("removed node {id}");
        Ok(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Look a node up by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|n| n.name() == Some(name))
            .map(Node::id)
    }

    /// Iterate over all nodes (excluding ground).
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| !n.is_ground())
    }

    /// Number of nodes excluding ground.
    pub fn node_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Row/column of a node in the MNA matrix (`None` for ground).
    pub fn matrix_index(&self, id: NodeId) -> Option<usize> {
        if id.is_ground() {
            return None;
        }
        // ground is always at position 0
        self.nodes.get_index_of(&id).map(|i| i - 1)
    }

    /// Attach a named element between existing nodes.
    pub fn insert_element(&mut self, name: impl Into<String>, nodes: &[NodeId]) -> Result<()> {
        let name = name.into();
        if self.elements.contains_key(&name) {
            return Err(Error::DuplicateElement(name));
        }
        if let Some(missing) = nodes.iter().find(|n| !self.has_node(**n)) {
            return Err(Error::NodeNotFound(missing.to_string()));
        }
        debug!("attached element {name} to nodes {nodes:?}");
        self.elements.insert(name, nodes.to_vec());
        Ok(())
    }

    /// Detach a named element, returning the nodes it was connected to.
    pub fn remove_element(&mut self, name: &str) -> Result<Vec<NodeId>> {
        let nodes = self
            .elements
            .shift_remove(name)
            .ok_or_else(|| Error::ElementNotFound(name.to_string()))?;
        debug!("detached element {name}");
        Ok(nodes)
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.elements.contains_key(name)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Iterate over attached elements and their nodes.
    pub fn elements(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.elements.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_circuit_has_ground() {
        let circuit = Circuit::new();
        assert!(circuit.has_node(NodeId::GROUND));
        assert_eq!(circuit.node_count(), 0);
        assert_eq!(circuit.matrix_index(NodeId::GROUND), None);
    }

    #[test]
    fn test_matrix_index_follows_insertion_order() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node();
        let b = circuit.add_node();
        let c = circuit.add_node();

        assert_eq!(circuit.matrix_index(a), Some(0));
        assert_eq!(circuit.matrix_index(c), Some(2));

        circuit.remove_node(b).unwrap();
        assert_eq!(circuit.matrix_index(a), Some(0));
        assert_eq!(circuit.matrix_index(c), Some(1));
        assert_eq!(circuit.node_count(), 2);
    }

    #[test]
    fn test_duplicate_named_node() {
        let mut circuit = Circuit::with_title("dup");
        circuit.add_named_node("vdd").unwrap();
        assert!(matches!(
            circuit.add_named_node("vdd"),
            Err(Error::DuplicateNode(_))
        ));
        assert_eq!(circuit.title(), Some("dup"));
    }

    #[test]
    fn test_insert_and_remove_element() {
        let mut circuit = Circuit::new();
        let a = circuit.add_node();
        let inner = circuit.add_internal_node("J1.source").unwrap();

        circuit.insert_element("J1.Rs", &[a, inner]).unwrap();
        assert!(circuit.has_element("J1.Rs"));
        assert!(matches!(
            circuit.insert_element("J1.Rs", &[a, inner]),
            Err(Error::DuplicateElement(_))
        ));
        assert_eq!(circuit.element_count(), 1);

        // still referenced
        assert!(circuit.remove_node(inner).is_err());

        assert_eq!(circuit.remove_element("J1.Rs").unwrap(), vec![a, inner]);
        circuit.remove_node(inner).unwrap();
        assert_eq!(circuit.find_node("J1.source"), None);
        assert_eq!(circuit.element_count(), 0);
    }

    #[test]
    fn test_element_on_unknown_node() {
        let mut circuit = Circuit::new();
        let result = circuit.insert_element("R1", &[NodeId::new(9), NodeId::GROUND]);
        assert!(matches!(result, Err(Error::NodeNotFound(_))));
    }

    #[test]
    fn test_ground_cannot_be_removed() {
        let mut circuit = Circuit::new();
        assert!(circuit.remove_node(NodeId::GROUND).is_err());
    }
}

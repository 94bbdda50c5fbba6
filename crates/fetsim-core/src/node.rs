//! Node identifiers and node records for the network graph.

use std::fmt;

/// Unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The ground node (node 0).
    pub const GROUND: NodeId = NodeId(0);

    /// Create a new NodeId from a raw value.
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// Get the raw node ID value.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Check if this is the ground node.
    pub fn is_ground(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground() {
            write!(f, "GND")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A node named in the netlist (or ground).
    External,
    /// A node introduced by a device, e.g. between a terminal and its
    /// series resistance.
    Internal,
}

/// A node in the network graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: Option<String>,
    kind: NodeKind,
}

impl Node {
    /// Create a new unnamed external node.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            name: None,
            kind: NodeKind::External,
        }
    }

    /// Create a named external node.
    pub fn with_name(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            kind: NodeKind::External,
        }
    }

    /// Create a named device-internal node.
    pub fn internal(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            kind: NodeKind::Internal,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_internal(&self) -> bool {
        self.kind == NodeKind::Internal
    }

    pub fn is_ground(&self) -> bool {
        self.id.is_ground()
    }
}

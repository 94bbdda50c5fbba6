//! Element trait for circuit devices.

use crate::NodeId;

/// A circuit element that connects nodes.
pub trait Element: std::fmt::Debug {
    /// Get the element's name.
    fn name(&self) -> &str;

    /// Get the nodes this element is currently wired to, in terminal order.
    fn nodes(&self) -> Vec<NodeId>;
}

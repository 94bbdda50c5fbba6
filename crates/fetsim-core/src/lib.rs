//! Core network representation and matrix primitives for fetsim.
//!
//! This crate provides what device models stamp into: the network graph
//! (nodes and attached elements), per-device terminal stamps, the dense
//! Modified Nodal Analysis (MNA) system, physical constants, SPICE number
//! parsing and admittance/scattering-parameter conversion.

pub mod circuit;
pub mod constants;
pub mod element;
pub mod error;
pub mod mna;
pub mod node;
pub mod sparams;
pub mod stamps;
pub mod units;

pub use circuit::Circuit;
pub use element::Element;
pub use error::{Error, Result};
pub use mna::MnaSystem;
pub use node::{Node, NodeId, NodeKind};
pub use stamps::DeviceStamps;

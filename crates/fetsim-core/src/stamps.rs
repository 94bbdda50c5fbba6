//! Per-element terminal state and stamp storage.
//!
//! Every device owns one [`DeviceStamps`]: the node each terminal is wired
//! to, the terminal voltages last handed over by the solver, and the
//! companion-model stamps the device writes back (DC conductance matrix and
//! current vector, AC scattering matrix). Slots are 0-based terminal indices.

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;

use crate::NodeId;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

#[derive(Debug, Clone)]
pub struct DeviceStamps {
    nodes: Vec<NodeId>,
    voltages: DVector<Complex64>,
    currents: DVector<f64>,
    y: DMatrix<f64>,
    s: DMatrix<Complex64>,
}

impl DeviceStamps {
    /// Create zeroed stamps for a device wired to `nodes`.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        let n = nodes.len();
        Self {
            nodes,
            voltages: DVector::from_element(n, ZERO),
            currents: DVector::zeros(n),
            y: DMatrix::zeros(n, n),
            s: DMatrix::from_element(n, n, ZERO),
        }
    }

    /// Number of terminals.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, slot: usize) -> NodeId {
        self.nodes[slot]
    }

    pub fn set_node(&mut self, slot: usize, node: NodeId) {
        self.nodes[slot] = node;
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn v(&self, slot: usize) -> Complex64 {
        self.voltages[slot]
    }

    pub fn set_v(&mut self, slot: usize, value: impl Into<Complex64>) {
        self.voltages[slot] = value.into();
    }

    pub fn i(&self, slot: usize) -> f64 {
        self.currents[slot]
    }

    pub fn set_i(&mut self, slot: usize, value: f64) {
        self.currents[slot] = value;
    }

    pub fn y(&self, row: usize, col: usize) -> f64 {
        self.y[(row, col)]
    }

    pub fn set_y(&mut self, row: usize, col: usize, value: f64) {
        self.y[(row, col)] = value;
    }

    pub fn s(&self, row: usize, col: usize) -> Complex64 {
        self.s[(row, col)]
    }

    pub fn set_s(&mut self, row: usize, col: usize, value: Complex64) {
        self.s[(row, col)] = value;
    }

    /// The equivalent-current stamp.
    pub fn current_vector(&self) -> &DVector<f64> {
        &self.currents
    }

    /// The conductance stamp.
    pub fn conductance_matrix(&self) -> &DMatrix<f64> {
        &self.y
    }

    /// The scattering-parameter stamp.
    pub fn scattering_matrix(&self) -> &DMatrix<Complex64> {
        &self.s
    }
}

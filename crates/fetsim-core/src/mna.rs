//! Dense real MNA system that device companion models are scattered into.
//!
//! Rows `0..num_nodes` are node voltages in [`Circuit::matrix_index`] order,
//! the rows after them are voltage-source branch currents.
//!
//! [`Circuit::matrix_index`]: crate::Circuit::matrix_index

use nalgebra::{DMatrix, DVector};

use crate::error::{Error, Result};

/// `matrix · x = rhs` for one Newton iteration.
#[derive(Debug, Clone)]
pub struct MnaSystem {
    pub matrix: DMatrix<f64>,
    pub rhs: DVector<f64>,
    /// Non-ground nodes.
    pub num_nodes: usize,
    /// Branch-current unknowns appended after the nodes.
    pub num_vsources: usize,
}

impl MnaSystem {
    pub fn new(num_nodes: usize, num_vsources: usize) -> Self {
        let n = num_nodes + num_vsources;
        Self {
            matrix: DMatrix::zeros(n, n),
            rhs: DVector::zeros(n),
            num_nodes,
            num_vsources,
        }
    }

    /// Zero everything before the next iteration's stamps.
    pub fn clear(&mut self) {
        self.matrix.fill(0.0);
        self.rhs.fill(0.0);
    }

    /// Two-terminal conductance `g` between rows `a` and `b` (`None` is ground).
    pub fn stamp_conductance(&mut self, a: Option<usize>, b: Option<usize>, g: f64) {
        let rows = [a, b];
        let y = [[g, -g], [-g, g]];
        for (r, row) in rows.iter().enumerate() {
            let Some(row) = *row else { continue };
            for (c, col) in rows.iter().enumerate() {
                if let Some(col) = *col {
                    self.matrix[(row, col)] += y[r][c];
                }
            }
        }
    }

    /// Ideal source `V(pos) - V(neg) = volts` using branch-current row
    /// `num_nodes + branch`.
    pub fn stamp_voltage_source(
        &mut self,
        pos: Option<usize>,
        neg: Option<usize>,
        branch: usize,
        volts: f64,
    ) {
        let k = self.num_nodes + branch;
        for (node, sign) in [(pos, 1.0), (neg, -1.0)] {
            if let Some(n) = node {
                self.matrix[(n, k)] += sign;
                self.matrix[(k, n)] += sign;
            }
        }
        self.rhs[k] = volts;
    }

    /// Stamp a multi-terminal companion model.
    ///
    /// `nodes[k]` is the matrix row of terminal `k` (None for ground);
    /// `y` is the terminal conductance block and `currents` the equivalent
    /// currents injected into each terminal. Rows and columns that land on
    /// ground are dropped.
    pub fn stamp_block(
        &mut self,
        nodes: &[Option<usize>],
        y: &DMatrix<f64>,
        currents: &DVector<f64>,
    ) -> Result<()> {
        let n = nodes.len();
        if y.nrows() != n || y.ncols() != n || currents.len() != n {
            return Err(Error::MatrixError(format!(
                "companion block is {}x{} with {} currents, expected {n} terminals",
                y.nrows(),
                y.ncols(),
                currents.len()
            )));
        }

        for (r, row) in nodes.iter().enumerate() {
            let Some(row) = *row else { continue };
            self.rhs[row] += currents[r];
            for (c, col) in nodes.iter().enumerate() {
                if let Some(col) = *col {
                    self.matrix[(row, col)] += y[(r, c)];
                }
            }
        }
        Ok(())
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_system() {
        let sys = MnaSystem::new(3, 1);
        assert_eq!(sys.matrix.shape(), (4, 4));
        assert_eq!(sys.rhs.len(), 4);
        assert_eq!(sys.num_nodes, 3);
        assert_eq!(sys.num_vsources, 1);
    }

    #[test]
    fn test_stamp_conductance() {
        let mut sys = MnaSystem::new(2, 0);

        sys.stamp_conductance(Some(0), Some(1), 1.0);
        sys.stamp_conductance(Some(1), None, 0.5);

        assert_eq!(sys.matrix[(0, 0)], 1.0);
        assert_eq!(sys.matrix[(1, 1)], 1.5);
        assert_eq!(sys.matrix[(0, 1)], -1.0);
        assert_eq!(sys.matrix[(1, 0)], -1.0);
    }

    #[test]
    fn test_stamp_voltage_source() {
        let mut sys = MnaSystem::new(2, 1);

        sys.stamp_voltage_source(Some(0), Some(1), 0, 5.0);

        assert_eq!(sys.matrix[(0, 2)], 1.0);
        assert_eq!(sys.matrix[(2, 0)], 1.0);
        assert_eq!(sys.matrix[(1, 2)], -1.0);
        assert_eq!(sys.matrix[(2, 1)], -1.0);
        assert_eq!(sys.rhs[2], 5.0);
    }

    #[test]
    fn test_stamp_block_drops_ground() {
        let mut sys = MnaSystem::new(2, 0);
        let y = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let i = DVector::from_vec(vec![0.1, 0.2, 0.3]);

        // terminal 1 is grounded, terminals 0 and 2 land on rows 1 and 0
        sys.stamp_block(&[Some(1), None, Some(0)], &y, &i).unwrap();

        assert_eq!(sys.matrix[(1, 1)], 1.0);
        assert_eq!(sys.matrix[(1, 0)], 3.0);
        assert_eq!(sys.matrix[(0, 1)], 7.0);
        assert_eq!(sys.matrix[(0, 0)], 9.0);
        assert_eq!(sys.rhs[1], 0.1);
        assert_eq!(sys.rhs[0], 0.3);
    }

    #[test]
    fn test_stamp_block_size_mismatch() {
        let mut sys = MnaSystem::new(2, 0);
        let y = DMatrix::zeros(2, 2);
        let i = DVector::zeros(3);
        assert!(sys.stamp_block(&[Some(0), Some(1), None], &y, &i).is_err());
    }
}

//! Uniform Cartesian geometry of one refinement level

use super::cell_box::CellBox;
use crate::core_types::Vec3;
use crate::error::{InitError, Result};
use serde::{Deserialize, Serialize};

/// Physical extent and cell spacing of a cell-centered grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    /// Lower corner of the domain (m)
    prob_lo: [f64; 3],
    /// Upper corner of the domain (m)
    prob_hi: [f64; 3],
    /// Cell size per axis (m)
    cell_size: [f64; 3],
    /// Index box of the whole domain at this level
    domain: CellBox,
}

impl GridGeometry {
    /// Create a geometry with `n_cells` cells spanning `[prob_lo, prob_hi]`
    ///
    /// # Errors
    ///
    /// Returns `InvalidGeometry` if any axis has no cells or a non-positive
    /// (or non-finite) extent.
    pub fn new(prob_lo: [f64; 3], prob_hi: [f64; 3], n_cells: [usize; 3]) -> Result<Self> {
        let mut cell_size = [0.0; 3];
        for d in 0..3 {
            let extent = prob_hi[d] - prob_lo[d];
            if n_cells[d] == 0 {
                return Err(InitError::InvalidGeometry(format!("axis {d} has no cells")));
            }
            if !(extent.is_finite() && extent > 0.0) {
                return Err(InitError::InvalidGeometry(format!(
                    "axis {d} extent must be positive, got {extent}"
                )));
            }
            cell_size[d] = extent / n_cells[d] as f64;
        }
        Ok(Self {
            prob_lo,
            prob_hi,
            cell_size,
            domain: CellBox::from_size(n_cells),
        })
    }

    pub fn prob_lo(&self) -> [f64; 3] {
        self.prob_lo
    }

    pub fn prob_hi(&self) -> [f64; 3] {
        self.prob_hi
    }

    pub fn cell_size(&self) -> [f64; 3] {
        self.cell_size
    }

    pub fn domain(&self) -> &CellBox {
        &self.domain
    }

    /// `prob_hi - prob_lo` along one axis
    pub fn domain_length(&self, axis: usize) -> f64 {
        self.prob_hi[axis] - self.prob_lo[axis]
    }

    /// World coordinate of a cell center along one axis: `lo + (idx + 0.5) * dx`
    #[inline]
    pub fn center_coord(&self, axis: usize, idx: i32) -> f64 {
        self.prob_lo[axis] + (f64::from(idx) + 0.5) * self.cell_size[axis]
    }

    /// World position of a cell center
    #[inline]
    pub fn cell_center(&self, cell: [i32; 3]) -> Vec3 {
        Vec3::new(
            self.center_coord(0, cell[0]),
            self.center_coord(1, cell[1]),
            self.center_coord(2, cell[2]),
        )
    }

    /// Partition-independent flat index of a cell over the level domain
    ///
    /// Unique for cells inside the domain. Cells outside it (ghosts) wrap but
    /// are never used as random-stream keys.
    #[inline]
    pub fn global_index(&self, cell: [i32; 3]) -> u64 {
        let [nx, ny, _] = self.domain.size();
        let i = i64::from(cell[0] - self.domain.lo[0]);
        let j = i64::from(cell[1] - self.domain.lo[1]);
        let k = i64::from(cell[2] - self.domain.lo[2]);
        (k * (ny as i64) * (nx as i64) + j * (nx as i64) + i) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cell_size_and_centers() {
        let geom = GridGeometry::new([0.0, -50.0, 0.0], [1000.0, 50.0, 200.0], [10, 4, 20]).unwrap();
        assert_eq!(geom.cell_size(), [100.0, 25.0, 10.0]);
        let c = geom.cell_center([0, 0, 0]);
        assert_relative_eq!(c.x, 50.0);
        assert_relative_eq!(c.y, -37.5);
        assert_relative_eq!(c.z, 5.0);
        assert_relative_eq!(geom.domain_length(1), 100.0);
    }

    #[test]
    fn test_global_index_is_x_fastest() {
        let geom = GridGeometry::new([0.0; 3], [1.0; 3], [4, 3, 2]).unwrap();
        assert_eq!(geom.global_index([0, 0, 0]), 0);
        assert_eq!(geom.global_index([1, 0, 0]), 1);
        assert_eq!(geom.global_index([0, 1, 0]), 4);
        assert_eq!(geom.global_index([3, 2, 1]), 23);
    }

    #[test]
    fn test_rejects_degenerate_axes() {
        assert!(GridGeometry::new([0.0; 3], [1.0; 3], [0, 1, 1]).is_err());
        assert!(GridGeometry::new([0.0; 3], [1.0, 0.0, 1.0], [1, 1, 1]).is_err());
    }
}

//! Cell-centered field storage for one grid patch
//!
//! A `FieldArray` owns the data of a single patch: its valid box grown by a
//! ghost layer, with all components of a cell stored next to each other
//! (`offset * ncomp + comp`). Velocity has three components; density,
//! temperature and TKE have one.

use super::cell_box::CellBox;
use crate::error::{InitError, Result};
use rayon::prelude::*;

/// Field data for one patch
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArray {
    valid: CellBox,
    ghost: i32,
    ncomp: usize,
    data: Vec<f64>,
}

impl FieldArray {
    /// Create a zero-initialized field
    ///
    /// # Arguments
    ///
    /// * `valid` - Cells owned by this patch
    /// * `ghost` - Ghost layer width around `valid`
    /// * `ncomp` - Components per cell (at least 1)
    #[must_use]
    pub fn new(valid: CellBox, ghost: usize, ncomp: usize) -> Self {
        Self::with_value(valid, ghost, ncomp, 0.0)
    }

    /// Create a field with every slot set to `value`
    #[must_use]
    pub fn with_value(valid: CellBox, ghost: usize, ncomp: usize, value: f64) -> Self {
        assert!(ncomp > 0, "a field needs at least one component");
        let ghost = ghost as i32;
        let len = valid.grow(ghost).num_cells() * ncomp;
        Self {
            valid,
            ghost,
            ncomp,
            data: vec![value; len],
        }
    }

    /// Cells owned by this patch
    pub fn valid_box(&self) -> &CellBox {
        &self.valid
    }

    /// Valid box plus ghost layer
    pub fn full_box(&self) -> CellBox {
        self.valid.grow(self.ghost)
    }

    pub fn ncomp(&self) -> usize {
        self.ncomp
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Get one component at a cell
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the full box or `comp >= ncomp`
    #[must_use]
    pub fn get(&self, cell: [i32; 3], comp: usize) -> f64 {
        self.data[self.slot(cell, comp)]
    }

    /// Set one component at a cell
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the full box or `comp >= ncomp`
    pub fn set(&mut self, cell: [i32; 3], comp: usize, value: f64) {
        let idx = self.slot(cell, comp);
        self.data[idx] = value;
    }

    /// Set every component of the valid cells and of the first `nghost` ghost
    /// layers to `value`; layers beyond the allocated width are ignored
    pub fn fill_grown(&mut self, value: f64, nghost: usize) {
        let full = self.full_box();
        let region = self.valid.grow((nghost as i32).min(self.ghost));
        if region == full {
            self.data.fill(value);
            return;
        }
        self.data
            .par_chunks_mut(self.ncomp)
            .enumerate()
            .filter(|(offset, _)| region.contains(full.cell_at(*offset)))
            .for_each(|(_, comps)| comps.fill(value));
    }

    /// Apply `f` to every cell of `region` in parallel
    ///
    /// The closure gets the cell index and that cell's component slice, and
    /// nothing else, so cells cannot observe each other.
    ///
    /// # Errors
    ///
    /// Returns `FieldLayout` if `region` is not inside the full box.
    pub fn par_cells_mut<F>(&mut self, region: &CellBox, f: F) -> Result<()>
    where
        F: Fn([i32; 3], &mut [f64]) + Send + Sync,
    {
        let full = self.full_box();
        if !full.contains_box(region) {
            return Err(InitError::FieldLayout(format!(
                "region {region:?} exceeds field box {full:?}"
            )));
        }
        if region.is_empty() {
            return Ok(());
        }
        self.data
            .par_chunks_mut(self.ncomp)
            .enumerate()
            .for_each(|(offset, comps)| {
                let cell = full.cell_at(offset);
                if region.contains(cell) {
                    f(cell, comps);
                }
            });
        Ok(())
    }

    fn slot(&self, cell: [i32; 3], comp: usize) -> usize {
        let full = self.full_box();
        assert!(
            full.contains(cell) && comp < self.ncomp,
            "Cell {cell:?} component {comp} out of bounds"
        );
        full.offset_of(cell) * self.ncomp + comp
    }
}

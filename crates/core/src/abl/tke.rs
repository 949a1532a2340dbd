//! Subgrid turbulent kinetic energy initialization

use crate::grid::FieldArray;
use rayon::prelude::*;

/// Sets every TKE slot to one constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TkeInitializer {
    value: f64,
}

impl TkeInitializer {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Fill the valid cells and the first ghost layer of every patch
    ///
    /// Wider ghost layers keep their previous contents.
    pub fn apply(&self, tke: &mut [FieldArray]) {
        let value = self.value;
        tke.par_iter_mut().for_each(|patch| patch.fill_grown(value, 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{partition, CellBox};

    #[test]
    fn test_fills_all_patches() {
        let mut patches: Vec<FieldArray> = partition(&CellBox::from_size([9, 9, 4]), 4)
            .into_iter()
            .map(|b| FieldArray::with_value(b, 1, 1, -3.0))
            .collect();
        TkeInitializer::new(0.1).apply(&mut patches);
        assert!(patches
            .iter()
            .all(|p| p.as_slice().iter().all(|&k| k == 0.1)));
    }

    #[test]
    fn test_only_first_ghost_layer_is_set() {
        let valid = CellBox::from_size([3, 3, 3]);
        let mut patches = vec![FieldArray::with_value(valid, 2, 1, -3.0)];
        TkeInitializer::new(0.1).apply(&mut patches);
        let patch = &patches[0];
        assert_eq!(patch.get([1, 1, 1], 0), 0.1);
        assert_eq!(patch.get([-1, -1, -1], 0), 0.1);
        assert_eq!(patch.get([3, 0, 2], 0), 0.1);
        assert_eq!(patch.get([-2, 0, 0], 0), -3.0);
        assert_eq!(patch.get([4, 4, 4], 0), -3.0);
    }

    #[test]
    fn test_empty_inputs_are_noops() {
        let init = TkeInitializer::new(0.4);
        init.apply(&mut []);

        let mut empty = vec![FieldArray::new(CellBox::empty(), 1, 1)];
        init.apply(&mut empty);
        assert!(empty[0].as_slice().is_empty());
    }
}

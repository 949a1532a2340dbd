//! Grid geometry, index boxes and cell-centered field storage
//!
//! Partitioning and refinement belong to the host solver. These types only
//! describe what the initializer is handed: a uniform geometry, rectangular
//! index regions and patch-local field arrays.

pub mod cell_box;
pub mod field;
pub mod geometry;

// Re-export main types
pub use cell_box::*;
pub use field::*;
pub use geometry::*;

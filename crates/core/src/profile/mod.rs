//! Height-keyed scalar profiles
//!
//! The potential temperature profile is authored on the host as a list of
//! breakpoints, mirrored once into an immutable buffer shared by all parallel
//! workers, and evaluated per cell as a piecewise-linear function of height.

pub mod buffer;
pub mod table;

pub use buffer::{HostBuffer, MirroredBuffer};
pub use table::{ProfileTable, ProfileView};

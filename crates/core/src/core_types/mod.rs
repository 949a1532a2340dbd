//! Core types and utilities

pub mod units;
pub mod vec3;

pub use units::{Degrees, Radians};
pub use vec3::Vec3;

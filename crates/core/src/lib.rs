//! ABL Field Initialization Core
//!
//! Generates the initial state of an atmospheric boundary layer LES run for
//! wind-energy studies: velocity, density, potential temperature and subgrid
//! TKE over a 3D cell-centered grid.
//!
//! ## Passes
//!
//! - Piecewise-linear potential temperature profile evaluated per cell
//! - Mean inflow from fixed components or a single-record velocity timetable
//! - Height-damped sinusoidal velocity streaks to trip shear instability
//! - Gaussian temperature noise below a cutoff, seeded per cell so results do
//!   not depend on patch layout or thread count
//! - Constant initial TKE
//!
//! Every pass is a rayon parallel map over cells that reads only immutable
//! shared state and writes only its own cell.

// Core types and utilities
pub mod core_types;
pub mod error;

// Configuration, grid and profile building blocks
pub mod config;
pub mod grid;
pub mod profile;

// Initialization passes
pub mod abl;

// Re-export core types
pub use core_types::{Degrees, Radians, Vec3};
pub use error::{InitError, Result};

pub use config::{AblConfig, ParamValue, ParameterSource, ParameterTable, VelocitySource};
pub use grid::{partition, CellBox, FieldArray, GridGeometry};
pub use profile::ProfileTable;

pub use abl::{
    AblFieldInit, LevelFields, MeanFieldInitializer, StochasticPerturbationInjector,
    TimetableRecord, TkeInitializer, VelocityIntentResolver, VelocityState,
};

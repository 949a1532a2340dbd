//! Atmospheric boundary layer field initialization
//!
//! Builds the initial state of an ABL run in three independent passes:
//!
//! 1. [`MeanFieldInitializer`] - density, mean velocity (plus optional
//!    damped streaks) and the height-dependent potential temperature
//! 2. [`StochasticPerturbationInjector`] - Gaussian temperature noise
//!    below a cutoff height
//! 3. [`TkeInitializer`] - constant subgrid TKE
//!
//! [`AblFieldInit`] builds all of them once from an [`AblConfig`](crate::config::AblConfig)
//! and runs them over a refinement level.

pub mod field_init;
pub mod mean_field;
pub mod temperature_perturbation;
pub mod tke;
pub mod velocity;

pub use field_init::{AblFieldInit, LevelFields};
pub use mean_field::{MeanFieldInitializer, VelocityPerturbation};
pub use temperature_perturbation::{cell_seed, PassId, StochasticPerturbationInjector};
pub use tke::TkeInitializer;
pub use velocity::{TimetableRecord, VelocityIntentResolver, VelocityState};

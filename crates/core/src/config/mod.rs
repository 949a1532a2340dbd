//! Run configuration
//!
//! The key/value loader is an external collaborator; this module only defines
//! the seam it plugs into (`ParameterSource`) and the validated, immutable
//! `AblConfig` snapshot built from it.

pub mod abl;
pub mod parameters;

pub use abl::*;
pub use parameters::{ParamValue, ParameterSource, ParameterTable};

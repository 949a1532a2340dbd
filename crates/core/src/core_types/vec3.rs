//! Vector type alias for cell-center positions and velocities.

use nalgebra::Vector3;

/// 3D vector type for positions and velocities.
///
/// This is a simple alias for `nalgebra::Vector3<f64>`. Flow fields are
/// initialized in double precision so the closed-form perturbations and the
/// timetable wind components are reproduced exactly.
pub type Vec3 = Vector3<f64>;

//! Piecewise-linear potential temperature table

use super::buffer::{HostBuffer, MirroredBuffer};
use crate::config::keys;
use crate::error::{InitError, Result};

/// Height/value breakpoints mirrored for parallel evaluation
#[derive(Debug, Clone)]
pub struct ProfileTable {
    heights: MirroredBuffer<f64>,
    values: MirroredBuffer<f64>,
}

impl ProfileTable {
    /// Build a table from matching height and value arrays
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidation` naming both keys if the lengths differ, or if
    /// the table is empty.
    pub fn build(heights: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        if heights.len() != values.len() {
            return Err(InitError::ConfigValidation {
                keys: vec![
                    keys::TEMPERATURE_HEIGHTS.to_string(),
                    keys::TEMPERATURE_VALUES.to_string(),
                ],
                reason: format!("{} heights but {} values", heights.len(), values.len()),
            });
        }
        if heights.is_empty() {
            return Err(InitError::config(
                keys::TEMPERATURE_HEIGHTS,
                "profile needs at least one breakpoint",
            ));
        }
        Ok(Self {
            heights: HostBuffer::from(heights).sync_to_device(),
            values: HostBuffer::from(values).sync_to_device(),
        })
    }

    /// Evaluate the profile at height `z`
    pub fn evaluate(&self, z: f64) -> f64 {
        self.view().evaluate(z)
    }

    /// Borrowed, `Copy` view over the device copies for use inside kernels
    pub fn view(&self) -> ProfileView<'_> {
        ProfileView {
            heights: self.heights.device(),
            values: self.values.device(),
        }
    }

    pub fn heights(&self) -> &[f64] {
        self.heights.host()
    }

    pub fn values(&self) -> &[f64] {
        self.values.host()
    }
}

/// Kernel-side view of a [`ProfileTable`]
#[derive(Debug, Clone, Copy)]
pub struct ProfileView<'a> {
    heights: &'a [f64],
    values: &'a [f64],
}

impl ProfileView<'_> {
    /// Piecewise-linear lookup
    ///
    /// Starts from the first tabulated value and replaces it with the linear
    /// interpolant of every segment `(h[i], h[i+1]]` containing `z`. Heights
    /// above the last breakpoint match no segment and therefore return the
    /// *first* value, not an extrapolation.
    #[inline]
    pub fn evaluate(&self, z: f64) -> f64 {
        let th = self.heights;
        let tv = self.values;
        let mut theta = tv[0];
        for iz in 0..th.len().saturating_sub(1) {
            if z > th[iz] && z <= th[iz + 1] {
                let slope = (tv[iz + 1] - tv[iz]) / (th[iz + 1] - th[iz]);
                theta = tv[iz] + (z - th[iz]) * slope;
            }
        }
        theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table() -> ProfileTable {
        ProfileTable::build(vec![0.0, 100.0, 500.0], vec![290.0, 300.0, 310.0]).unwrap()
    }

    #[test]
    fn test_reference_points() {
        let t = table();
        assert_eq!(t.evaluate(0.0), 290.0);
        assert_eq!(t.evaluate(50.0), 295.0);
        assert_eq!(t.evaluate(700.0), 290.0);
    }

    #[test]
    fn test_below_first_breakpoint_returns_first_value() {
        let t = table();
        for z in [-1000.0, -1.0, 0.0] {
            assert_eq!(t.evaluate(z), 290.0);
        }
    }

    #[test]
    fn test_segment_upper_end_is_inclusive() {
        let t = table();
        assert_eq!(t.evaluate(100.0), 300.0);
        assert_eq!(t.evaluate(500.0), 310.0);
    }

    #[test]
    fn test_interior_interpolation() {
        let t = table();
        assert_relative_eq!(t.evaluate(300.0), 305.0, epsilon = 1e-12);
        assert_relative_eq!(t.evaluate(120.0), 300.5, epsilon = 1e-12);
    }

    #[test]
    fn test_above_top_returns_first_value() {
        let t = table();
        assert_eq!(t.evaluate(500.000_001), 290.0);
        assert_eq!(t.evaluate(1.0e6), 290.0);
    }

    #[test]
    fn test_single_breakpoint_is_constant() {
        let t = ProfileTable::build(vec![10.0], vec![285.0]).unwrap();
        assert_eq!(t.evaluate(-5.0), 285.0);
        assert_eq!(t.evaluate(50.0), 285.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = ProfileTable::build(vec![0.0, 100.0], vec![290.0]).unwrap_err();
        assert!(matches!(err, InitError::ConfigValidation { .. }));
        assert!(err.to_string().contains(keys::TEMPERATURE_VALUES));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(ProfileTable::build(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_view_matches_host_data() {
        let t = table();
        assert_eq!(t.heights(), &[0.0, 100.0, 500.0]);
        assert_eq!(t.values(), &[290.0, 300.0, 310.0]);
        assert_eq!(t.view().evaluate(250.0), t.evaluate(250.0));
    }
}

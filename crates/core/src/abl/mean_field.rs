//! Mean velocity, density and potential temperature fill
//!
//! Every cell gets the configured density and the resolved mean velocity, the
//! temperature profile is *added* to whatever the temperature field already
//! holds, and optionally the velocity receives height-damped streaks:
//!
//! ```text
//! du = ΔU · e^½ / z_ref · exp(-½ (z / z_ref)²) · z · cos(2π N_U (y - y_lo) / L_y)
//! dv = ΔV · e^½ / z_ref · exp(-½ (z / z_ref)²) · z · cos(2π N_V (x - x_lo) / L_x)
//! ```
//!
//! The envelope `z · exp(-½ (z / z_ref)²)` is zero at the ground, peaks at
//! `z_ref` (where the `e^½ / z_ref` factor normalizes it to ΔU), and decays
//! above.

use crate::config::VelocityPerturbationConfig;
use crate::core_types::Vec3;
use crate::error::{InitError, Result};
use crate::grid::{CellBox, FieldArray, GridGeometry};
use crate::profile::ProfileTable;
use rayon::prelude::*;
use std::f64::consts::PI;
use tracing::debug;

/// Streak perturbation with its geometry-dependent factors precomputed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityPerturbation {
    ufac: f64,
    vfac: f64,
    /// Wavenumber of the u streaks along y
    aval: f64,
    /// Wavenumber of the v streaks along x
    bval: f64,
    ref_height: f64,
    x_lo: f64,
    y_lo: f64,
}

impl VelocityPerturbation {
    pub fn new(config: &VelocityPerturbationConfig, geom: &GridGeometry) -> Self {
        let prob_lo = geom.prob_lo();
        Self {
            ufac: config.delta_u * 0.5_f64.exp() / config.ref_height,
            vfac: config.delta_v * 0.5_f64.exp() / config.ref_height,
            aval: config.u_periods * 2.0 * PI / geom.domain_length(1),
            bval: config.v_periods * 2.0 * PI / geom.domain_length(0),
            ref_height: config.ref_height,
            x_lo: prob_lo[0],
            y_lo: prob_lo[1],
        }
    }

    /// `(du, dv)` at a cell center
    #[inline]
    pub fn increment(&self, x: f64, y: f64, z: f64) -> (f64, f64) {
        let xl = x - self.x_lo;
        let yl = y - self.y_lo;
        let zl = z / self.ref_height;
        let damp = (-0.5 * zl * zl).exp();
        (
            self.ufac * damp * z * (self.aval * yl).cos(),
            self.vfac * damp * z * (self.bval * xl).cos(),
        )
    }
}

/// Primary fill of velocity, density and temperature
#[derive(Debug, Clone)]
pub struct MeanFieldInitializer {
    profile: ProfileTable,
    mean_velocity: Vec3,
    density: f64,
    perturbation: Option<VelocityPerturbationConfig>,
}

impl MeanFieldInitializer {
    pub fn new(
        profile: ProfileTable,
        mean_velocity: Vec3,
        density: f64,
        perturbation: &VelocityPerturbationConfig,
    ) -> Self {
        Self {
            profile,
            mean_velocity,
            density,
            perturbation: perturbation.enabled.then(|| perturbation.clone()),
        }
    }

    pub fn profile(&self) -> &ProfileTable {
        &self.profile
    }

    pub fn mean_velocity(&self) -> Vec3 {
        self.mean_velocity
    }

    pub fn perturbs_velocity(&self) -> bool {
        self.perturbation.is_some()
    }

    /// Fill every cell of `region` on one patch
    ///
    /// The three fields must share one layout (same valid box and ghost width)
    /// and `region` must lie inside it. Cells outside `region` are untouched.
    ///
    /// # Errors
    ///
    /// Returns `FieldLayout` on mismatched layouts, wrong component counts, or a
    /// region outside the fields.
    pub fn apply(
        &self,
        region: &CellBox,
        geom: &GridGeometry,
        velocity: &mut FieldArray,
        density: &mut FieldArray,
        temperature: &mut FieldArray,
    ) -> Result<()> {
        let full = velocity.full_box();
        check_layout(region, &full, velocity, density, temperature)?;
        if region.is_empty() {
            return Ok(());
        }

        let profile = self.profile.view();
        let streaks = self
            .perturbation
            .as_ref()
            .map(|cfg| VelocityPerturbation::new(cfg, geom));
        let mean = self.mean_velocity;
        let rho = self.density;
        let den_stride = density.ncomp();
        let temp_stride = temperature.ncomp();

        velocity
            .as_mut_slice()
            .par_chunks_mut(3)
            .zip(density.as_mut_slice().par_chunks_mut(den_stride))
            .zip(temperature.as_mut_slice().par_chunks_mut(temp_stride))
            .enumerate()
            .for_each(|(offset, ((vel, den), theta))| {
                let cell = full.cell_at(offset);
                if !region.contains(cell) {
                    return;
                }
                let pos = geom.cell_center(cell);

                den[0] = rho;
                vel[0] = mean.x;
                vel[1] = mean.y;
                vel[2] = mean.z;

                theta[0] += profile.evaluate(pos.z);

                if let Some(streaks) = &streaks {
                    let (du, dv) = streaks.increment(pos.x, pos.y, pos.z);
                    vel[0] += du;
                    vel[1] += dv;
                }
            });

        debug!(
            "Mean fill: {} cells in {:?}, perturbed={}",
            region.num_cells(),
            region,
            streaks.is_some()
        );
        Ok(())
    }
}

fn check_layout(
    region: &CellBox,
    full: &CellBox,
    velocity: &FieldArray,
    density: &FieldArray,
    temperature: &FieldArray,
) -> Result<()> {
    if velocity.ncomp() != 3 {
        return Err(InitError::FieldLayout(format!(
            "velocity needs 3 components, has {}",
            velocity.ncomp()
        )));
    }
    if density.full_box() != *full || temperature.full_box() != *full {
        return Err(InitError::FieldLayout(format!(
            "velocity {:?}, density {:?} and temperature {:?} boxes differ",
            full,
            density.full_box(),
            temperature.full_box()
        )));
    }
    if !full.contains_box(region) {
        return Err(InitError::FieldLayout(format!(
            "region {region:?} exceeds field box {full:?}"
        )));
    }
    Ok(())
}

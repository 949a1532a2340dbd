//! Atmospheric boundary layer initialization parameters
//!
//! Defaults follow the usual neutral-ABL setup: velocity streaks on with a
//! 50 m reference height and four periods across the domain, temperature
//! noise off, and a small non-zero initial subgrid TKE.

use super::parameters::ParameterSource;
use crate::error::{InitError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Parameter keys understood by `AblConfig::from_params`
pub mod keys {
    pub const TEMPERATURE_HEIGHTS: &str = "ABL.temperature_heights";
    pub const TEMPERATURE_VALUES: &str = "ABL.temperature_values";
    pub const PERTURB_VELOCITY: &str = "ABL.perturb_velocity";
    pub const PERTURB_REF_HEIGHT: &str = "ABL.perturb_ref_height";
    pub const U_PERIODS: &str = "ABL.Uperiods";
    pub const V_PERIODS: &str = "ABL.Vperiods";
    pub const DELTA_U: &str = "ABL.deltaU";
    pub const DELTA_V: &str = "ABL.deltaV";
    pub const PERTURB_TEMPERATURE: &str = "ABL.perturb_temperature";
    pub const GAUSS_MEAN: &str = "ABL.random_gauss_mean";
    pub const GAUSS_VAR: &str = "ABL.random_gauss_var";
    pub const CUTOFF_HEIGHT: &str = "ABL.cutoff_height";
    pub const THETA_AMPLITUDE: &str = "ABL.theta_amplitude";
    pub const INIT_TKE: &str = "ABL.init_tke";
    pub const RANDOM_SEED: &str = "ABL.random_seed";
    pub const VELOCITY_TIMETABLE: &str = "ABL.velocity_timetable";
    pub const DENSITY: &str = "incflo.density";
    pub const VELOCITY: &str = "incflo.velocity";
}

/// Where the mean inflow velocity comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VelocitySource {
    /// Fixed `[u, v, w]` components (m/s)
    Constant([f64; 3]),
    /// Single-record `time speed direction_deg` file
    Timetable(PathBuf),
}

/// Damped sinusoidal velocity streaks used to trip shear-layer instability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityPerturbationConfig {
    pub enabled: bool,
    /// Height of maximum perturbation (m)
    pub ref_height: f64,
    /// Number of periods of the u streaks across the y extent
    pub u_periods: f64,
    /// Number of periods of the v streaks across the x extent
    pub v_periods: f64,
    /// Peak u amplitude (m/s)
    pub delta_u: f64,
    /// Peak v amplitude (m/s)
    pub delta_v: f64,
}

impl Default for VelocityPerturbationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ref_height: 50.0,
            u_periods: 4.0,
            v_periods: 4.0,
            delta_u: 1.0,
            delta_v: 1.0,
        }
    }
}

/// Gaussian potential-temperature noise below a cutoff height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePerturbationConfig {
    pub enabled: bool,
    pub gauss_mean: f64,
    pub gauss_var: f64,
    /// Cells strictly below this height are overwritten (m)
    pub cutoff_height: f64,
    /// Scale applied to each Gaussian sample (K)
    pub amplitude: f64,
}

impl Default for TemperaturePerturbationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            gauss_mean: 0.0,
            gauss_var: 1.0,
            cutoff_height: 1.0e16,
            amplitude: 0.8,
        }
    }
}

/// Immutable configuration snapshot for the field initializer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AblConfig {
    /// Breakpoint heights of the potential temperature profile (m)
    pub temperature_heights: Vec<f64>,
    /// Potential temperature at each breakpoint (K)
    pub temperature_values: Vec<f64>,
    /// Initial fluid density (kg/m³)
    pub density: f64,
    pub velocity_source: VelocitySource,
    pub velocity_perturbation: VelocityPerturbationConfig,
    pub temperature_perturbation: TemperaturePerturbationConfig,
    /// Initial subgrid-scale turbulent kinetic energy (m²/s²)
    pub init_tke: f64,
    /// Run seed for the stochastic temperature pass
    pub random_seed: u64,
}

impl AblConfig {
    /// Create a configuration with default perturbation settings
    pub fn new(
        temperature_heights: Vec<f64>,
        temperature_values: Vec<f64>,
        density: f64,
        velocity_source: VelocitySource,
    ) -> Self {
        Self {
            temperature_heights,
            temperature_values,
            density,
            velocity_source,
            velocity_perturbation: VelocityPerturbationConfig::default(),
            temperature_perturbation: TemperaturePerturbationConfig::default(),
            init_tke: 0.1,
            random_seed: 0,
        }
    }

    /// Read and validate the configuration from a parameter source
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidation` when a required key is missing, a key has the
    /// wrong type, or the values fail [`AblConfig::validate`].
    pub fn from_params(params: &impl ParameterSource) -> Result<Self> {
        let temperature_heights = require(params.reals(keys::TEMPERATURE_HEIGHTS)?, keys::TEMPERATURE_HEIGHTS)?;
        let temperature_values = require(params.reals(keys::TEMPERATURE_VALUES)?, keys::TEMPERATURE_VALUES)?;
        let density = require(params.real(keys::DENSITY)?, keys::DENSITY)?;

        let timetable = params.text(keys::VELOCITY_TIMETABLE)?.filter(|p| !p.is_empty());
        let velocity = params.reals(keys::VELOCITY)?;
        let velocity_source = match (timetable, velocity) {
            (Some(path), fixed) => {
                if fixed.is_some() {
                    warn!(
                        "Both {} and {} are set; using the timetable",
                        keys::VELOCITY_TIMETABLE,
                        keys::VELOCITY
                    );
                }
                VelocitySource::Timetable(PathBuf::from(path))
            }
            (None, Some(v)) => {
                let components: [f64; 3] = v.as_slice().try_into().map_err(|_| {
                    InitError::config(
                        keys::VELOCITY,
                        format!("expected 3 components, found {}", v.len()),
                    )
                })?;
                VelocitySource::Constant(components)
            }
            (None, None) => {
                return Err(InitError::ConfigValidation {
                    keys: vec![keys::VELOCITY.to_string(), keys::VELOCITY_TIMETABLE.to_string()],
                    reason: "one of the velocity sources is required".to_string(),
                })
            }
        };

        let mut config = Self::new(temperature_heights, temperature_values, density, velocity_source);

        let vp = &mut config.velocity_perturbation;
        override_with(&mut vp.enabled, params.boolean(keys::PERTURB_VELOCITY)?);
        override_with(&mut vp.ref_height, params.real(keys::PERTURB_REF_HEIGHT)?);
        override_with(&mut vp.u_periods, params.real(keys::U_PERIODS)?);
        override_with(&mut vp.v_periods, params.real(keys::V_PERIODS)?);
        override_with(&mut vp.delta_u, params.real(keys::DELTA_U)?);
        override_with(&mut vp.delta_v, params.real(keys::DELTA_V)?);

        let tp = &mut config.temperature_perturbation;
        override_with(&mut tp.enabled, params.boolean(keys::PERTURB_TEMPERATURE)?);
        override_with(&mut tp.gauss_mean, params.real(keys::GAUSS_MEAN)?);
        override_with(&mut tp.gauss_var, params.real(keys::GAUSS_VAR)?);
        override_with(&mut tp.cutoff_height, params.real(keys::CUTOFF_HEIGHT)?);
        override_with(&mut tp.amplitude, params.real(keys::THETA_AMPLITUDE)?);

        override_with(&mut config.init_tke, params.real(keys::INIT_TKE)?);
        if let Some(seed) = params.integer(keys::RANDOM_SEED)? {
            config.random_seed = u64::try_from(seed)
                .map_err(|_| InitError::config(keys::RANDOM_SEED, format!("must be non-negative, got {seed}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidation` naming the offending keys. The Gaussian
    /// variance is checked even when temperature noise is off, since the
    /// sampler is built unconditionally.
    pub fn validate(&self) -> Result<()> {
        if self.temperature_heights.len() != self.temperature_values.len() {
            return Err(InitError::ConfigValidation {
                keys: vec![
                    keys::TEMPERATURE_HEIGHTS.to_string(),
                    keys::TEMPERATURE_VALUES.to_string(),
                ],
                reason: format!(
                    "{} heights but {} values",
                    self.temperature_heights.len(),
                    self.temperature_values.len()
                ),
            });
        }
        if self.temperature_heights.is_empty() {
            return Err(InitError::config(keys::TEMPERATURE_HEIGHTS, "profile needs at least one breakpoint"));
        }
        if self.temperature_heights.windows(2).any(|w| w[1] < w[0]) {
            warn!("{} is not ascending; segments out of order never match", keys::TEMPERATURE_HEIGHTS);
        }

        let vp = &self.velocity_perturbation;
        if vp.enabled && (vp.ref_height <= 0.0 || !vp.ref_height.is_finite()) {
            return Err(InitError::config(
                keys::PERTURB_REF_HEIGHT,
                format!("must be positive when velocity perturbation is enabled, got {}", vp.ref_height),
            ));
        }

        let tp = &self.temperature_perturbation;
        if tp.gauss_var < 0.0 || !tp.gauss_var.is_finite() {
            return Err(InitError::config(
                keys::GAUSS_VAR,
                format!("variance must be finite and non-negative, got {}", tp.gauss_var),
            ));
        }
        Ok(())
    }
}

fn require<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| InitError::config(key, "required parameter is missing"))
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

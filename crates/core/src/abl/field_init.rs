//! ABL field initializer
//!
//! Owns every component built from the run configuration and applies them to
//! the fields of one refinement level, in order: mean fill on each patch,
//! temperature noise (if enabled), then TKE (if the run carries a TKE field).

use super::mean_field::MeanFieldInitializer;
use super::temperature_perturbation::StochasticPerturbationInjector;
use super::tke::TkeInitializer;
use super::velocity::{VelocityIntentResolver, VelocityState};
use crate::config::{AblConfig, ParameterSource};
use crate::error::{InitError, Result};
use crate::grid::{CellBox, FieldArray, GridGeometry};
use crate::profile::ProfileTable;
use rayon::prelude::*;
use tracing::{debug, info};

/// Field patches of one refinement level
///
/// All fields share the same patch layout; TKE is only present for turbulence
/// models that carry it.
#[derive(Debug, Clone)]
pub struct LevelFields {
    pub velocity: Vec<FieldArray>,
    pub density: Vec<FieldArray>,
    pub temperature: Vec<FieldArray>,
    pub tke: Option<Vec<FieldArray>>,
}

impl LevelFields {
    /// Allocate zeroed fields over `patches`
    pub fn new(patches: &[CellBox], ghost: usize, with_tke: bool) -> Self {
        let alloc = |ncomp| {
            patches
                .iter()
                .map(|b| FieldArray::new(*b, ghost, ncomp))
                .collect::<Vec<_>>()
        };
        Self {
            velocity: alloc(3),
            density: alloc(1),
            temperature: alloc(1),
            tke: with_tke.then(|| alloc(1)),
        }
    }

    pub fn num_patches(&self) -> usize {
        self.velocity.len()
    }
}

/// Initial-condition generator for ABL runs
#[derive(Debug, Clone)]
pub struct AblFieldInit {
    config: AblConfig,
    velocity: VelocityIntentResolver,
    mean_field: MeanFieldInitializer,
    temperature_noise: StochasticPerturbationInjector,
    tke: TkeInitializer,
}

impl AblFieldInit {
    /// Build every component from a configuration snapshot
    ///
    /// Reads the velocity timetable if one is configured.
    ///
    /// # Errors
    ///
    /// `ConfigValidation` for inconsistent parameters, `TimetableUnavailable` /
    /// `TimetableMalformed` for timetable problems.
    pub fn new(config: &AblConfig) -> Result<Self> {
        config.validate()?;

        let profile = ProfileTable::build(
            config.temperature_heights.clone(),
            config.temperature_values.clone(),
        )?;
        let velocity = VelocityIntentResolver::new(&config.velocity_source)?;
        let mean_field = MeanFieldInitializer::new(
            profile,
            velocity.mean_velocity(),
            config.density,
            &config.velocity_perturbation,
        );
        let temperature_noise =
            StochasticPerturbationInjector::new(&config.temperature_perturbation, config.random_seed)?;
        let tke = TkeInitializer::new(config.init_tke);

        let mean = velocity.mean_velocity();
        info!(
            "ABL field init: {} profile points, {} velocity ({:.3}, {:.3}, {:.3}) m/s, rho={}, perturb_velocity={}, perturb_temperature={}",
            config.temperature_heights.len(),
            match velocity.state() {
                VelocityState::Constant(_) => "constant",
                VelocityState::Timetable(_) => "timetable",
            },
            mean.x,
            mean.y,
            mean.z,
            config.density,
            config.velocity_perturbation.enabled,
            config.temperature_perturbation.enabled
        );

        Ok(Self {
            config: config.clone(),
            velocity,
            mean_field,
            temperature_noise,
            tke,
        })
    }

    /// Read the configuration from a parameter source and build
    ///
    /// # Errors
    ///
    /// See [`AblConfig::from_params`] and [`AblFieldInit::new`].
    pub fn from_params(params: &impl ParameterSource) -> Result<Self> {
        Self::new(&AblConfig::from_params(params)?)
    }

    pub fn config(&self) -> &AblConfig {
        &self.config
    }

    pub fn velocity_state(&self) -> &VelocityState {
        self.velocity.state()
    }

    pub fn mean_field(&self) -> &MeanFieldInitializer {
        &self.mean_field
    }

    /// Whether the run asks for stochastic temperature perturbations
    pub fn add_temperature_perturbations(&self) -> bool {
        self.config.temperature_perturbation.enabled
    }

    /// Mean fill of velocity, density and temperature over `region` of one patch
    ///
    /// # Errors
    ///
    /// `FieldLayout` if the fields disagree with each other or with `region`.
    pub fn init_mean_fields(
        &self,
        region: &CellBox,
        geom: &GridGeometry,
        velocity: &mut FieldArray,
        density: &mut FieldArray,
        temperature: &mut FieldArray,
    ) -> Result<()> {
        self.mean_field
            .apply(region, geom, velocity, density, temperature)
    }

    /// Overwrite temperature below the cutoff height with Gaussian noise
    ///
    /// # Errors
    ///
    /// `FieldLayout` from the patch views.
    pub fn perturb_temperature(
        &self,
        level: usize,
        geom: &GridGeometry,
        temperature: &mut [FieldArray],
    ) -> Result<()> {
        self.temperature_noise.apply(level, geom, temperature)
    }

    /// Set the subgrid TKE of every patch to the configured constant
    pub fn init_tke(&self, tke: &mut [FieldArray]) {
        self.tke.apply(tke);
    }

    /// Run every initialization pass on one level
    ///
    /// # Errors
    ///
    /// `FieldLayout` if the field lists have different patch counts or layouts.
    pub fn initialize_level(
        &self,
        level: usize,
        geom: &GridGeometry,
        fields: &mut LevelFields,
    ) -> Result<()> {
        let n = fields.num_patches();
        if fields.density.len() != n
            || fields.temperature.len() != n
            || fields.tke.as_ref().is_some_and(|t| t.len() != n)
        {
            return Err(InitError::FieldLayout(format!(
                "level {level}: fields have different patch counts"
            )));
        }
        info!("Initializing ABL fields on level {}: {} patches", level, n);

        fields
            .velocity
            .par_iter_mut()
            .zip(fields.density.par_iter_mut())
            .zip(fields.temperature.par_iter_mut())
            .try_for_each(|((vel, den), temp)| {
                let region = *vel.valid_box();
                self.init_mean_fields(&region, geom, vel, den, temp)
            })?;

        if self.add_temperature_perturbations() {
            self.perturb_temperature(level, geom, &mut fields.temperature)?;
        }

        if let Some(tke) = fields.tke.as_mut() {
            self.init_tke(tke);
            debug!("TKE set to {} on level {}", self.tke.value(), level);
        }
        Ok(())
    }
}

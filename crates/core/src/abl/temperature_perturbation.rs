//! Stochastic potential temperature perturbations
//!
//! Cells below a cutoff height have their temperature *replaced* by an
//! amplitude-scaled Gaussian sample, following the cell perturbation method of
//! Muñoz-Esparza et al. (2015) for triggering turbulence in neutral ABL runs.
//!
//! # References
//!
//! - Muñoz-Esparza, D., Kosović, B., van Beeck, J., Mirocha, J.D. (2015)
//!   "A stochastic perturbation method to generate inflow turbulence in
//!   large-eddy simulation models: Application to neutrally stratified
//!   atmospheric boundary layers." Physics of Fluids 27, 035102.
//!
//! # Reproducibility
//!
//! Each cell draws from its own `ChaCha8Rng`, seeded from the run seed, the
//! refinement level, the pass and the cell's domain-global index. Output is
//! therefore identical for any patch layout and any thread count.

use crate::config::{keys, TemperaturePerturbationConfig};
use crate::error::{InitError, Result};
use crate::grid::{FieldArray, GridGeometry};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use tracing::debug;

/// Identifies which initialization pass a random stream belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassId {
    TemperaturePerturbation,
}

impl PassId {
    fn key(self) -> u64 {
        match self {
            PassId::TemperaturePerturbation => 0x7465_6d70, // "temp"
        }
    }
}

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// `SplitMix64` finalizer
#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of the random stream owned by one cell
///
/// Each input is folded in through a bijective mix, so two cells of the same
/// level and pass never share a seed.
#[inline]
pub fn cell_seed(run_seed: u64, level: usize, pass: PassId, global_index: u64) -> u64 {
    let mut h = mix64(run_seed ^ GOLDEN_GAMMA);
    h = mix64(h ^ pass.key());
    h = mix64(h.wrapping_add(level as u64).wrapping_add(GOLDEN_GAMMA));
    mix64(h ^ global_index)
}

/// Overwrites near-ground temperature with scaled Gaussian noise
#[derive(Debug, Clone)]
pub struct StochasticPerturbationInjector {
    normal: Normal<f64>,
    amplitude: f64,
    cutoff_height: f64,
    run_seed: u64,
}

impl StochasticPerturbationInjector {
    /// Build the sampler; samples are `Normal(mean, sqrt(var))`
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidation` if the variance is negative or not finite.
    pub fn new(config: &TemperaturePerturbationConfig, run_seed: u64) -> Result<Self> {
        let normal = Normal::new(config.gauss_mean, config.gauss_var.sqrt()).map_err(|e| {
            InitError::config(
                keys::GAUSS_VAR,
                format!("cannot build Normal({}, {}): {e}", config.gauss_mean, config.gauss_var),
            )
        })?;
        Ok(Self {
            normal,
            amplitude: config.amplitude,
            cutoff_height: config.cutoff_height,
            run_seed,
        })
    }

    pub fn cutoff_height(&self) -> f64 {
        self.cutoff_height
    }

    /// Perturbation value for one cell, `amplitude * N(mean, sqrt(var))`
    #[inline]
    pub fn sample_for_cell(&self, level: usize, global_index: u64) -> f64 {
        let seed = cell_seed(self.run_seed, level, PassId::TemperaturePerturbation, global_index);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.amplitude * self.normal.sample(&mut rng)
    }

    /// Apply the perturbation to the valid cells of every patch of a level
    ///
    /// Cells whose center height is at or above the cutoff keep their value.
    ///
    /// # Errors
    ///
    /// Returns `FieldLayout` if a patch's valid box reaches outside the level
    /// domain, since its cells would share global indices with other cells.
    /// Propagates `FieldLayout` errors from the patch views.
    pub fn apply(&self, level: usize, geom: &GridGeometry, temperature: &mut [FieldArray]) -> Result<()> {
        let domain = geom.domain();
        if let Some(patch) = temperature.iter().find(|p| !domain.contains_box(p.valid_box())) {
            return Err(InitError::FieldLayout(format!(
                "patch {:?} extends outside level {} domain {:?}",
                patch.valid_box(),
                level,
                domain
            )));
        }
        let cutoff = self.cutoff_height;
        temperature.par_iter_mut().try_for_each(|patch| {
            let region = *patch.valid_box();
            patch.par_cells_mut(&region, |cell, theta| {
                let z = geom.center_coord(2, cell[2]);
                if z < cutoff {
                    theta[0] = self.sample_for_cell(level, geom.global_index(cell));
                }
            })
        })?;
        debug!(
            "Temperature perturbation on level {}: {} patches, cutoff={} m",
            level,
            temperature.len(),
            cutoff
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{partition, CellBox};

    fn config() -> TemperaturePerturbationConfig {
        TemperaturePerturbationConfig {
            enabled: true,
            gauss_mean: 0.5,
            gauss_var: 2.0,
            cutoff_height: 300.0,
            amplitude: 0.8,
        }
    }

    fn geometry() -> GridGeometry {
        GridGeometry::new([0.0; 3], [640.0, 640.0, 400.0], [64, 64, 16]).unwrap()
    }

    fn perturbed(injector: &StochasticPerturbationInjector, geom: &GridGeometry, max_size: usize) -> Vec<FieldArray> {
        let mut patches: Vec<FieldArray> = partition(geom.domain(), max_size)
            .into_iter()
            .map(|b| FieldArray::with_value(b, 1, 1, 300.0))
            .collect();
        injector.apply(0, geom, &mut patches).unwrap();
        patches
    }

    fn gather(geom: &GridGeometry, patches: &[FieldArray]) -> Vec<f64> {
        let domain = geom.domain();
        let mut out = vec![f64::NAN; domain.num_cells()];
        for patch in patches {
            let b = *patch.valid_box();
            for off in 0..b.num_cells() {
                let cell = b.cell_at(off);
                out[domain.offset_of(cell)] = patch.get(cell, 0);
            }
        }
        out
    }

    #[test]
    fn test_seeds_are_distinct_per_cell_level_and_pass_input() {
        let a = cell_seed(7, 0, PassId::TemperaturePerturbation, 0);
        let b = cell_seed(7, 0, PassId::TemperaturePerturbation, 1);
        let c = cell_seed(7, 1, PassId::TemperaturePerturbation, 0);
        let d = cell_seed(8, 0, PassId::TemperaturePerturbation, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a, cell_seed(7, 0, PassId::TemperaturePerturbation, 0));
    }

    #[test]
    fn test_cells_above_cutoff_unchanged() {
        let geom = geometry();
        let injector = StochasticPerturbationInjector::new(&config(), 42).unwrap();
        let patches = perturbed(&injector, &geom, 32);
        for patch in &patches {
            let b = *patch.valid_box();
            for off in 0..b.num_cells() {
                let cell = b.cell_at(off);
                let z = geom.center_coord(2, cell[2]);
                let value = patch.get(cell, 0);
                if z >= 300.0 {
                    assert_eq!(value, 300.0);
                } else {
                    assert_ne!(value, 300.0);
                }
            }
            // Ghost cells are never written
            assert_eq!(patch.get([b.lo[0] - 1, b.lo[1], b.lo[2]], 0), 300.0);
        }
    }

    #[test]
    fn test_sample_statistics() {
        let geom = geometry();
        let cfg = config();
        let injector = StochasticPerturbationInjector::new(&cfg, 2024).unwrap();
        let patches = perturbed(&injector, &geom, 64);
        let values = gather(&geom, &patches);

        // 12 of 16 layers lie below the 300 m cutoff (centers at 12.5..287.5 m)
        let below: Vec<f64> = values[..64 * 64 * 12].to_vec();
        let n = below.len() as f64;
        let mean = below.iter().sum::<f64>() / n;
        let var = below.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

        let expected_mean = cfg.amplitude * cfg.gauss_mean;
        let expected_var = cfg.amplitude * cfg.amplitude * cfg.gauss_var;
        assert!((mean - expected_mean).abs() < 0.03, "mean {mean} vs {expected_mean}");
        assert!((var - expected_var).abs() < 0.06, "var {var} vs {expected_var}");
    }

    #[test]
    fn test_partition_invariance() {
        let geom = geometry();
        let injector = StochasticPerturbationInjector::new(&config(), 99).unwrap();
        let single = gather(&geom, &perturbed(&injector, &geom, 64));
        let fine = gather(&geom, &perturbed(&injector, &geom, 8));
        let odd = gather(&geom, &perturbed(&injector, &geom, 13));
        assert_eq!(single, fine);
        assert_eq!(single, odd);
    }

    #[test]
    fn test_thread_count_invariance() {
        let geom = geometry();
        let injector = StochasticPerturbationInjector::new(&config(), 5).unwrap();
        let run = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| gather(&geom, &perturbed(&injector, &geom, 16)))
        };
        assert_eq!(run(1), run(4));
    }

    #[test]
    fn test_run_seed_changes_output() {
        let geom = geometry();
        let a = StochasticPerturbationInjector::new(&config(), 1).unwrap();
        let b = StochasticPerturbationInjector::new(&config(), 2).unwrap();
        assert_ne!(a.sample_for_cell(0, 10), b.sample_for_cell(0, 10));
        assert_eq!(a.sample_for_cell(0, 10), a.sample_for_cell(0, 10));
        assert_ne!(gather(&geom, &perturbed(&a, &geom, 32)), gather(&geom, &perturbed(&b, &geom, 32)));
    }

    #[test]
    fn test_zero_variance_gives_constant_offset() {
        let cfg = TemperaturePerturbationConfig {
            gauss_var: 0.0,
            ..config()
        };
        let injector = StochasticPerturbationInjector::new(&cfg, 3).unwrap();
        assert_eq!(injector.sample_for_cell(0, 17), 0.8 * 0.5);
    }

    #[test]
    fn test_patch_outside_domain_is_rejected() {
        let geom = GridGeometry::new([0.0; 3], [40.0, 40.0, 40.0], [4, 4, 4]).unwrap();
        let injector = StochasticPerturbationInjector::new(&config(), 7).unwrap();

        // One cell wider than the domain in x
        let wide = CellBox::new([0, 0, 0], [4, 3, 3]);
        let mut patches = vec![FieldArray::with_value(wide, 0, 1, 300.0)];
        let err = injector.apply(0, &geom, &mut patches).unwrap_err();
        assert!(matches!(err, InitError::FieldLayout(_)), "{err}");
        assert!(patches[0].as_slice().iter().all(|&t| t == 300.0));

        let below = CellBox::new([0, -1, 0], [3, 3, 3]);
        let mut patches = vec![FieldArray::with_value(below, 0, 1, 300.0)];
        assert!(matches!(
            injector.apply(0, &geom, &mut patches),
            Err(InitError::FieldLayout(_))
        ));
    }

    #[test]
    fn test_distinct_cells_draw_distinct_samples() {
        let geom = GridGeometry::new([0.0; 3], [40.0, 40.0, 40.0], [4, 4, 4]).unwrap();
        let injector = StochasticPerturbationInjector::new(&config(), 7).unwrap();
        let mut patches = vec![FieldArray::with_value(*geom.domain(), 0, 1, 300.0)];
        injector.apply(0, &geom, &mut patches).unwrap();
        let mut values = patches[0].as_slice().to_vec();
        values.sort_by(f64::total_cmp);
        values.dedup();
        assert_eq!(values.len(), geom.domain().num_cells());
    }

    #[test]
    fn test_empty_patch_list() {
        let geom = geometry();
        let injector = StochasticPerturbationInjector::new(&config(), 3).unwrap();
        let mut patches: Vec<FieldArray> = Vec::new();
        injector.apply(0, &geom, &mut patches).unwrap();

        let mut empty = vec![FieldArray::new(CellBox::empty(), 0, 1)];
        injector.apply(0, &geom, &mut empty).unwrap();
    }
}

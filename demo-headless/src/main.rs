use abl_init_core::config::keys;
use abl_init_core::{partition, AblFieldInit, FieldArray, GridGeometry, LevelFields, ParameterTable};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// ABL initial-condition demo on a uniform grid
#[derive(Parser, Debug)]
#[command(name = "abl-init-demo")]
#[command(about = "Initialize a neutral atmospheric boundary layer and report field statistics", long_about = None)]
struct Args {
    /// Cells along x, y, z
    #[arg(long, num_args = 3, default_values_t = [64, 64, 32])]
    cells: Vec<usize>,

    /// Domain extent along x, y, z in meters
    #[arg(long, num_args = 3, default_values_t = [1000.0, 1000.0, 1000.0])]
    extent: Vec<f64>,

    /// Largest patch edge in cells
    #[arg(long, default_value_t = 32)]
    max_grid_size: usize,

    /// Mean velocity u, v, w in m/s (ignored when --timetable is given)
    #[arg(long, num_args = 3, default_values_t = [6.128355544951824, 5.142300877492314, 0.0])]
    velocity: Vec<f64>,

    /// Single-record `time speed direction_deg` velocity file
    #[arg(short, long)]
    timetable: Option<PathBuf>,

    /// Disable velocity streaks
    #[arg(long)]
    no_velocity_perturbation: bool,

    /// Enable Gaussian temperature noise
    #[arg(short, long)]
    perturb_temperature: bool,

    /// Cutoff height for temperature noise (m)
    #[arg(long, default_value_t = 600.0)]
    cutoff_height: f64,

    /// Run seed for temperature noise
    #[arg(short, long, default_value_t = 0)]
    seed: i64,

    /// Initial subgrid TKE (m²/s²)
    #[arg(long, default_value_t = 0.1)]
    init_tke: f64,
}

struct Stats {
    min: f64,
    max: f64,
    mean: f64,
}

fn valid_stats(patches: &[FieldArray], comp: usize) -> Stats {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    let mut count = 0_usize;
    for patch in patches {
        let b = *patch.valid_box();
        for off in 0..b.num_cells() {
            let v = patch.get(b.cell_at(off), comp);
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }
    }
    Stats {
        min,
        max,
        mean: if count > 0 { sum / count as f64 } else { 0.0 },
    }
}

fn report(name: &str, patches: &[FieldArray], comp: usize) {
    let s = valid_stats(patches, comp);
    info!(
        "{:<12} min={:>10.4} max={:>10.4} mean={:>10.4}",
        name, s.min, s.max, s.mean
    );
}

fn build_params(args: &Args) -> ParameterTable {
    let mut params = ParameterTable::new()
        .with(keys::TEMPERATURE_HEIGHTS, vec![0.0, 650.0, 750.0, 1000.0])
        .with(keys::TEMPERATURE_VALUES, vec![300.0, 300.0, 308.0, 308.75])
        .with(keys::DENSITY, 1.225)
        .with(keys::PERTURB_VELOCITY, !args.no_velocity_perturbation)
        .with(keys::PERTURB_TEMPERATURE, args.perturb_temperature)
        .with(keys::CUTOFF_HEIGHT, args.cutoff_height)
        .with(keys::RANDOM_SEED, args.seed)
        .with(keys::INIT_TKE, args.init_tke);
    match &args.timetable {
        Some(path) => params.insert(keys::VELOCITY_TIMETABLE, path.to_string_lossy().into_owned()),
        None => params.insert(keys::VELOCITY, args.velocity.clone()),
    }
    params
}

fn run(args: &Args) -> abl_init_core::Result<()> {
    let init = AblFieldInit::from_params(&build_params(args))?;

    let geom = GridGeometry::new(
        [0.0; 3],
        [args.extent[0], args.extent[1], args.extent[2]],
        [args.cells[0], args.cells[1], args.cells[2]],
    )?;
    let patches = partition(geom.domain(), args.max_grid_size);
    info!(
        "Grid {}x{}x{} cells, dx=({:.2}, {:.2}, {:.2}) m, {} patches",
        args.cells[0],
        args.cells[1],
        args.cells[2],
        geom.cell_size()[0],
        geom.cell_size()[1],
        geom.cell_size()[2],
        patches.len()
    );

    let mut fields = LevelFields::new(&patches, 1, true);
    init.initialize_level(0, &geom, &mut fields)?;

    report("u", &fields.velocity, 0);
    report("v", &fields.velocity, 1);
    report("w", &fields.velocity, 2);
    report("density", &fields.density, 0);
    report("temperature", &fields.temperature, 0);
    if let Some(tke) = &fields.tke {
        report("tke", tke, 0);
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Initialization failed: {e}");
            ExitCode::FAILURE
        }
    }
}

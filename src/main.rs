use anyhow::{Context, bail};
use clap::Parser;
use grainfall::config::RunnerConfig;
use grainfall::scenario::{ScenarioExecutor, ScenarioExecutorConfig};
use grainfall_core::Grid;
use grainfall_core::simulation::MaterialId;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run a RON scenario and verify its checks
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Runner config file (default: grainfall.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks for a free run
    #[arg(long)]
    ticks: Option<u64>,

    /// Master seed
    #[arg(long)]
    seed: Option<u64>,

    /// Distribute rows over the rayon pool
    #[arg(long)]
    parallel: bool,

    /// Count writers per cell and report the maximum
    #[arg(long)]
    audit: bool,

    /// Grid width for a free run
    #[arg(long)]
    width: Option<usize>,

    /// Grid height for a free run
    #[arg(long)]
    height: Option<usize>,

    /// Material table (RON)
    #[arg(long)]
    materials: Option<PathBuf>,

    /// Print the material table and exit
    #[arg(long)]
    list_materials: bool,

    /// Write the scenario report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log every scenario action
    #[arg(long)]
    verbose: bool,
}

impl Args {
    /// CLI flags take precedence over every config layer
    fn apply(&self, config: &mut RunnerConfig) {
        if let Some(width) = self.width {
            config.grid.width = width;
        }
        if let Some(height) = self.height {
            config.grid.height = height;
        }
        if let Some(seed) = self.seed {
            config.grid.seed = Some(seed);
        }
        if let Some(ticks) = self.ticks {
            config.run.ticks = ticks;
        }
        if let Some(materials) = &self.materials {
            config.run.materials = Some(materials.clone());
        }
        config.grid.parallel |= self.parallel;
        config.grid.audit_claims |= self.audit;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = RunnerConfig::load_from(args.config.as_deref())?;
    args.apply(&mut config);

    if args.list_materials {
        return list_materials(&config);
    }

    match &args.scenario {
        Some(path) => run_scenario(&args, &config, path),
        None => free_run(&config),
    }
}

fn list_materials(config: &RunnerConfig) -> anyhow::Result<()> {
    let materials = config.load_materials()?;
    let table = materials.to_table();
    let ron = ron::ser::to_string_pretty(&table, ron::ser::PrettyConfig::default())
        .context("Failed to serialize material table")?;
    println!("{}", ron);
    Ok(())
}

fn run_scenario(args: &Args, config: &RunnerConfig, path: &Path) -> anyhow::Result<()> {
    let mut executor = ScenarioExecutor::with_config(ScenarioExecutorConfig {
        seed: config.grid.seed,
        force_parallel: config.grid.parallel,
        audit_claims: config.grid.audit_claims,
        materials: config.run.materials.clone(),
        verbose: args.verbose,
    });

    let report = executor.run_file(path)?;

    if let Some(report_path) = &args.report {
        report.save_json(report_path)?;
        log::info!("Report written to {}", report_path.display());
    }

    let failed = report.failures().count();
    if failed > 0 {
        for failure in report.failures() {
            log::error!("Check failed: {}", failure.message);
        }
        bail!(
            "Scenario '{}': {} of {} checks failed",
            report.scenario_name,
            failed,
            report.checks.len()
        );
    }
    Ok(())
}

/// Drop a few blobs of each fluid and powder, then tick
fn free_run(config: &RunnerConfig) -> anyhow::Result<()> {
    let materials = config.load_materials()?;
    let mut grid = Grid::with_config(
        config.grid.width,
        config.grid.height,
        materials,
        config.sim_config(),
    )
    .context("Failed to create grid")?;

    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let radius = (w.min(h) / 10) as u32;
    let blobs = [
        MaterialId::SAND,
        MaterialId::WATER,
        MaterialId::LAVA,
        MaterialId::MUD,
    ];
    for (i, material) in blobs.into_iter().enumerate() {
        if !grid.materials().contains(material) {
            continue;
        }
        let x = w * (2 * i as i32 + 1) / (2 * blobs.len() as i32);
        grid.paint(x, h / 4, material, radius)?;
    }

    log::info!(
        "Free run: {} ticks on {}x{} ({} non-air cells)",
        config.run.ticks,
        w,
        h,
        grid.non_air_count()
    );

    let mut total = grainfall_core::TickStats::default();
    for _ in 0..config.run.ticks {
        total.merge(&grid.tick());
    }

    log::info!(
        "Done after {} ticks: {} moves, {} displacements, {} reactions, {} spreads, {} expirations",
        grid.tick_count(),
        total.moves,
        total.displacements,
        total.reactions,
        total.spreads,
        total.expirations
    );
    if config.grid.audit_claims {
        log::info!("Max writers per cell: {}", total.max_writers);
    }
    for (id, count) in grid.histogram() {
        log::info!("  {:>8} {}", grid.materials().get(id).name, count);
    }
    Ok(())
}

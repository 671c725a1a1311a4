//! Scenario execution engine

use anyhow::{Context, Result, bail};
use bresenham::Bresenham;
use glam::IVec2;
use grainfall_core::simulation::Materials;
use grainfall_core::{Grid, SimConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::actions::ScenarioAction;
use super::definition::ScenarioDefinition;
use super::results::ExecutionReport;

/// Configuration for scenario executor
#[derive(Debug, Clone, Default)]
pub struct ScenarioExecutorConfig {
    /// Seed for scenarios that do not fix their own
    pub seed: Option<u64>,

    /// Run every scenario on the rayon pool, whatever the file says
    pub force_parallel: bool,

    /// Count writers per cell during ticks
    pub audit_claims: bool,

    /// Material table for scenarios that do not name their own
    pub materials: Option<PathBuf>,

    /// Log every action as it runs
    pub verbose: bool,
}

/// Executes scenario actions against a grid
pub struct ScenarioExecutor {
    /// Configuration
    config: ScenarioExecutorConfig,

    /// Action execution log
    log: Vec<String>,

    /// Tick timings (milliseconds)
    tick_times: Vec<f64>,

    /// Counters summed over every tick of the run
    stats: grainfall_core::TickStats,
}

impl ScenarioExecutor {
    /// Create new executor with default config
    pub fn new() -> Self {
        Self::with_config(ScenarioExecutorConfig::default())
    }

    /// Create new executor with custom config
    pub fn with_config(config: ScenarioExecutorConfig) -> Self {
        Self {
            config,
            log: Vec::new(),
            tick_times: Vec::new(),
            stats: Default::default(),
        }
    }

    /// Load a scenario file, build its grid and run it
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<ExecutionReport> {
        let path = path.as_ref();
        let scenario = ScenarioDefinition::from_file(path)?;
        let mut grid = self.build_grid(&scenario, path.parent())?;
        self.execute_scenario(&scenario, &mut grid)
    }

    /// Grid sized and seeded for a scenario
    ///
    /// A scenario's own material table is resolved against `base_dir`.
    pub fn build_grid(
        &self,
        scenario: &ScenarioDefinition,
        base_dir: Option<&Path>,
    ) -> Result<Grid> {
        let materials = match (&scenario.materials, &self.config.materials) {
            (Some(file), _) => {
                let path = match base_dir {
                    Some(dir) => dir.join(file),
                    None => PathBuf::from(file),
                };
                crate::config::load_materials(path)?
            }
            (None, Some(path)) => crate::config::load_materials(path)?,
            (None, None) => Arc::new(Materials::new()),
        };

        let config = SimConfig {
            parallel: scenario.parallel || self.config.force_parallel,
            seed: scenario.seed.or(self.config.seed),
            audit_claims: self.config.audit_claims,
        };

        Grid::with_config(scenario.width, scenario.height, materials, config)
            .with_context(|| format!("Failed to create grid for scenario '{}'", scenario.name))
    }

    /// Execute a complete scenario
    pub fn execute_scenario(
        &mut self,
        scenario: &ScenarioDefinition,
        grid: &mut Grid,
    ) -> Result<ExecutionReport> {
        let start_time = Instant::now();
        let mut report =
            ExecutionReport::new(scenario.name.clone(), grid.seed(), grid.config().parallel);

        self.log.clear();
        self.tick_times.clear();
        self.stats = Default::default();
        let ticks_before = grid.tick_count();

        self.log(&format!("Starting scenario: {}", scenario.name));
        if !scenario.description.is_empty() {
            self.log(&format!("Description: {}", scenario.description));
        }
        self.log(&format!(
            "Grid {}x{}, seed {}, {}",
            grid.width(),
            grid.height(),
            grid.seed(),
            if grid.config().parallel {
                "parallel"
            } else {
                "sequential"
            }
        ));

        // Execute setup actions
        let setup_start = Instant::now();
        if !scenario.setup.is_empty() {
            self.log(&format!("Running {} setup actions", scenario.setup.len()));
            for (idx, action) in scenario.setup.iter().enumerate() {
                self.run_action(idx, "Setup action", action, grid)?;
            }
        }
        report.performance.setup_duration_ms = setup_start.elapsed().as_secs_f64() * 1000.0;

        // Execute main actions
        let action_start = Instant::now();
        self.log(&format!("Running {} main actions", scenario.actions.len()));
        for (idx, action) in scenario.actions.iter().enumerate() {
            self.run_action(idx, "Action", action, grid)?;
        }
        report.performance.action_duration_ms = action_start.elapsed().as_secs_f64() * 1000.0;

        report.actions_executed = scenario.setup.len() + scenario.actions.len();

        // Run verifications
        let verify_start = Instant::now();
        if !scenario.verify.is_empty() {
            self.log(&format!("Running {} verifications", scenario.verify.len()));
            for condition in &scenario.verify {
                let result = condition.evaluate(grid);
                self.log(&format!(
                    "  {} {}",
                    if result.passed { "✓" } else { "✗" },
                    result.message
                ));
                report.checks.push(result);
            }
        }
        report.performance.verification_duration_ms =
            verify_start.elapsed().as_secs_f64() * 1000.0;

        // Finalize report
        report.ticks_executed = grid.tick_count() - ticks_before;
        report.stats = self.stats;
        report.passed = report.success();
        report.performance.total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        if !self.tick_times.is_empty() {
            let total: f64 = self.tick_times.iter().sum();
            report.performance.avg_tick_time_ms = total / self.tick_times.len() as f64;
            report.performance.peak_tick_time_ms =
                self.tick_times.iter().copied().fold(0.0, f64::max);
        }

        self.log(&format!(
            "Scenario complete: {} ({} ticks, {} changes, {:.1}ms)",
            if report.passed { "PASSED" } else { "FAILED" },
            report.ticks_executed,
            report.stats.changes(),
            report.performance.total_duration_ms
        ));
        self.log(&format!("  Performance: {}", report.performance.summary()));

        report.log = self.log.clone();
        Ok(report)
    }

    fn run_action(
        &mut self,
        idx: usize,
        phase: &str,
        action: &ScenarioAction,
        grid: &mut Grid,
    ) -> Result<()> {
        if let Err(e) = self.execute_action(action, grid) {
            let msg = format!("{} {} failed: {:#}", phase, idx, e);
            self.log(&msg);
            bail!(msg);
        }
        Ok(())
    }

    /// Execute a single action
    pub fn execute_action(&mut self, action: &ScenarioAction, grid: &mut Grid) -> Result<()> {
        if self.config.verbose {
            self.log(&format!("[Tick {}] {:?}", grid.tick_count(), action));
        }

        match action {
            ScenarioAction::Paint {
                x,
                y,
                material,
                radius,
            } => {
                let id = resolve_material(grid, material)?;
                let painted = grid.paint(*x, *y, id, *radius)?;
                log::debug!("Painted {} {} cells at ({}, {})", painted, material, x, y);
            }

            ScenarioAction::Line { from, to, material } => {
                let id = resolve_material(grid, material)?;
                let mut painted = 0;
                for pos in line_points(*from, *to) {
                    painted += grid.paint(pos.x, pos.y, id, 0)?;
                }
                log::debug!("Drew {} {} cells from {} to {}", painted, material, from, to);
            }

            ScenarioAction::Fill { region, material } => {
                let id = resolve_material(grid, material)?;
                let positions = region.positions(grid.width(), grid.height());
                for pos in &positions {
                    grid.paint(pos.x, pos.y, id, 0)?;
                }
                log::debug!("Filled {} {} cells", positions.len(), material);
            }

            ScenarioAction::Tick { count } => {
                self.run_ticks(grid, *count);
            }

            ScenarioAction::Log { message } => {
                self.log(&format!("  [LOG] {}", message));
            }
        }

        Ok(())
    }

    /// Advance the grid `count` ticks, keeping timings and counters
    fn run_ticks(&mut self, grid: &mut Grid, count: u64) {
        for _ in 0..count {
            let tick_start = Instant::now();
            let stats = grid.tick();
            self.tick_times
                .push(tick_start.elapsed().as_secs_f64() * 1000.0);
            self.stats.merge(&stats);
        }
    }

    fn log(&mut self, message: &str) {
        log::info!("{}", message);
        self.log.push(message.to_string());
    }
}

impl Default for ScenarioExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_material(grid: &Grid, name: &str) -> Result<u16> {
    let def = grid.materials().find_by_name(name)?;
    Ok(def.id)
}

/// Cells on the line from `from` to `to`, both ends included
fn line_points(from: IVec2, to: IVec2) -> Vec<IVec2> {
    let mut points: Vec<IVec2> = Bresenham::new(
        (from.x as isize, from.y as isize),
        (to.x as isize, to.y as isize),
    )
    .map(|(x, y)| IVec2::new(x as i32, y as i32))
    .collect();
    points.push(to);
    points
}

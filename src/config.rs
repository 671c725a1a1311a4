//! Runner configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `grainfall.ron` (if it exists) or the file passed with `--config`
//! 3. Environment variables prefixed with `GRAINFALL_`
//!
//! Command-line flags are applied on top by the binary.
//!
//! Example environment variable: `GRAINFALL_GRID__PARALLEL=true`

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use grainfall_core::SimConfig;
use grainfall_core::simulation::Materials;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunnerConfig {
    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub run: RunConfig,
}

/// Grid size and scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    /// Rows on the rayon pool instead of a sequential scan
    pub parallel: bool,
    /// Track writers per cell and report the maximum
    pub audit_claims: bool,
    /// Master seed; absent draws one from entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            parallel: false,
            audit_claims: false,
            seed: None,
        }
    }
}

/// What the runner does when no scenario is given
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Ticks for a free run
    pub ticks: u64,
    /// Material table (RON); absent uses the built-in defaults
    #[serde(default)]
    pub materials: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 600,
            materials: None,
        }
    }
}

impl RunnerConfig {
    /// Load with defaults, `grainfall.ron` and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with an explicit config file in place of `grainfall.ron`
    ///
    /// An explicit file must exist; the implicit one is optional.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let file = match path {
            Some(path) => File::from(path)
                .format(config::FileFormat::Ron)
                .required(true),
            None => File::with_name("grainfall")
                .format(config::FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("grid.width", defaults.grid.width as i64)?
            .set_default("grid.height", defaults.grid.height as i64)?
            .set_default("grid.parallel", defaults.grid.parallel)?
            .set_default("grid.audit_claims", defaults.grid.audit_claims)?
            .set_default("run.ticks", defaults.run.ticks as i64)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (GRAINFALL_GRID__WIDTH, etc.)
            .add_source(
                Environment::with_prefix("GRAINFALL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Scheduling settings for a grid built from this configuration
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            parallel: self.grid.parallel,
            seed: self.grid.seed,
            audit_claims: self.grid.audit_claims,
        }
    }

    /// The configured material table, or the defaults
    pub fn load_materials(&self) -> Result<Arc<Materials>> {
        match &self.run.materials {
            Some(path) => load_materials(path),
            None => Ok(Arc::new(Materials::new())),
        }
    }
}

/// Read and validate a RON material table
pub fn load_materials(path: impl AsRef<Path>) -> Result<Arc<Materials>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read material table: {}", path.display()))?;
    let materials = Materials::from_ron_str(&content)
        .with_context(|| format!("Invalid material table: {}", path.display()))?;
    Ok(Arc::new(materials))
}

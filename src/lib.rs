//! # Grainfall - headless falling-sand runner
//!
//! Loads runner settings and RON scenarios, drives a [`grainfall_core::Grid`]
//! through them and checks the resulting grid state.

pub mod config;
pub mod scenario;

pub use config::RunnerConfig;
pub use scenario::{ExecutionReport, ScenarioDefinition, ScenarioExecutor};

/// Common imports for scenario authors and tests
pub mod prelude {
    pub use grainfall_core::simulation::{Cell, MaterialId, MaterialType, Materials};
    pub use grainfall_core::{Grid, SimConfig, TickStats};
    pub use glam::IVec2;
}

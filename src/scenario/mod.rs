//! RON scenarios: set up a grid, run it, verify the outcome
//!
//! - `definition` - top-level scenario file
//! - `actions` - painting and ticking steps
//! - `verification` - checks against the final grid
//! - `executor` - runs a scenario and builds the report
//! - `results` - execution report and timing

pub mod actions;
pub mod definition;
pub mod executor;
pub mod results;
pub mod verification;

pub use actions::{Region, ScenarioAction};
pub use definition::ScenarioDefinition;
pub use executor::{ScenarioExecutor, ScenarioExecutorConfig};
pub use results::{ExecutionReport, PerformanceMetrics};
pub use verification::{VerificationCondition, VerificationResult};

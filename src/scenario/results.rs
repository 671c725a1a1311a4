//! Execution results and reporting

use anyhow::{Context, Result};
use grainfall_core::TickStats;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::verification::VerificationResult;

/// Timing for a scenario execution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Total wall-clock time (milliseconds)
    pub total_duration_ms: f64,

    /// Setup phase duration (milliseconds)
    pub setup_duration_ms: f64,

    /// Main action phase duration (milliseconds)
    pub action_duration_ms: f64,

    /// Verification phase duration (milliseconds)
    pub verification_duration_ms: f64,

    /// Average time per tick (milliseconds)
    pub avg_tick_time_ms: f64,

    /// Slowest tick (milliseconds)
    pub peak_tick_time_ms: f64,
}

impl PerformanceMetrics {
    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.1}ms | Avg tick: {:.3}ms | Peak: {:.3}ms",
            self.total_duration_ms, self.avg_tick_time_ms, self.peak_tick_time_ms
        )
    }
}

/// Report from scenario execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Scenario name
    pub scenario_name: String,

    /// Seed the grid actually ran with
    pub seed: u64,

    /// Whether rows ran on the rayon pool
    pub parallel: bool,

    /// Overall pass/fail status
    pub passed: bool,

    /// Total ticks executed
    pub ticks_executed: u64,

    /// Number of actions executed (setup included)
    pub actions_executed: usize,

    /// Every verification result, in scenario order
    pub checks: Vec<VerificationResult>,

    /// Tick counters summed over the run
    pub stats: TickStats,

    /// Execution log messages
    pub log: Vec<String>,

    /// Timing
    pub performance: PerformanceMetrics,
}

impl ExecutionReport {
    /// Create new execution report
    pub fn new(scenario_name: String, seed: u64, parallel: bool) -> Self {
        Self {
            scenario_name,
            seed,
            parallel,
            passed: false,
            ticks_executed: 0,
            actions_executed: 0,
            checks: Vec::new(),
            stats: TickStats::default(),
            log: Vec::new(),
            performance: PerformanceMetrics::default(),
        }
    }

    /// Check if all verifications passed
    pub fn success(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    /// Failed checks only
    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.checks.iter().filter(|check| !check.passed)
    }

    /// Save report to JSON file
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize execution report to JSON")?;

        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path.as_ref(), json).with_context(|| {
            format!(
                "Failed to write execution report: {}",
                path.as_ref().display()
            )
        })?;

        Ok(())
    }

    /// Load report from JSON file
    pub fn from_json(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read report file: {}", path.as_ref().display()))?;

        let report = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON report: {}", path.as_ref().display()))?;

        Ok(report)
    }
}

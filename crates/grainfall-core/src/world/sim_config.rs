//! Grid simulation settings

use serde::{Deserialize, Serialize};

/// How a grid schedules its ticks
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Distribute rows over the rayon pool instead of scanning sequentially
    pub parallel: bool,
    /// Master seed; None draws one from entropy (and logs it)
    pub seed: Option<u64>,
    /// Count claimed writes per cell and report the maximum in `TickStats`
    pub audit_claims: bool,
}

impl SimConfig {
    /// Sequential, seeded configuration for reproducible runs
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_audit(mut self, audit_claims: bool) -> Self {
        self.audit_claims = audit_claims;
        self
    }
}

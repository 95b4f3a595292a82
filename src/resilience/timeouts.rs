//! Timeout enforcement.
//!
//! # Responsibilities
//! - Hold the per-stage deadlines and the overall chain budget
//! - Map a stage to its deadline
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timed-out stage is abandoned, never retried
//! - Budget exhaustion is distinct from stage timeouts and surfaces as 504

use std::time::Duration;
use crate::config::TimeoutConfig;
use crate::model::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub primary: Duration,
    pub fallback: Duration,
    pub degraded: Duration,
    pub overall: Duration,
}

impl StageTimeouts {
    pub fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Primary => self.primary,
            Stage::Fallback => self.fallback,
            Stage::Degraded => self.degraded,
        }
    }
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutConfig::default())
    }
}

impl From<&TimeoutConfig> for StageTimeouts {
    fn from(config: &TimeoutConfig) -> Self {
        Self {
            primary: Duration::from_secs(config.primary_secs),
            fallback: Duration::from_secs(config.fallback_secs),
            degraded: Duration::from_secs(config.degraded_secs),
            overall: Duration::from_secs(config.overall_secs),
        }
    }
}

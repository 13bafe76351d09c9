//! Refinement Configuration
//!
//! Knobs for one refinement run. Defaults match the tuned production values;
//! all fields are serde-deserializable so callers can load them from a
//! config file.

use serde::{Deserialize, Serialize};

use segflow_core::{CoreError, CoreResult};

/// Corrective rounds allowed after the initial segmentation.
pub const DEFAULT_MAX_RETRY: u32 = 3;
/// Total score at or above which the candidate is accepted outright.
pub const DEFAULT_QUALITY_THRESHOLD: f64 = 0.85;
/// Most-recent memory records forwarded to the oracle each round.
pub const DEFAULT_MEMORY_WINDOW: usize = 5;

/// Configuration for a refinement run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RefineConfig {
    /// Corrective-round budget; exhausting it returns the best mask seen.
    pub max_retry: u32,
    /// Acceptance threshold on the total score.
    pub quality_threshold: f64,
    /// Bounded memory summary size forwarded to the oracle.
    pub memory_window: usize,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_retry: DEFAULT_MAX_RETRY,
            quality_threshold: DEFAULT_QUALITY_THRESHOLD,
            memory_window: DEFAULT_MEMORY_WINDOW,
        }
    }
}

impl RefineConfig {
    /// Reject configurations the loop cannot honor.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.quality_threshold) {
            return Err(CoreError::validation(format!(
                "Quality threshold must be in [0, 1], got {}",
                self.quality_threshold
            )));
        }
        if self.memory_window == 0 {
            return Err(CoreError::validation("Memory window must be at least 1"));
        }
        Ok(())
    }
}

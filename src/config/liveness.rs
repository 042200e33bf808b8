use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LivenessConfig {
    /// Time without any general notification before the node is probed.
    /// The probe itself is given the same amount of time to answer.
    #[serde(default = "default_idle_window_in_ms")]
    pub idle_window_in_ms: u64,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            idle_window_in_ms: default_idle_window_in_ms(),
        }
    }
}

impl LivenessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.idle_window_in_ms < 1 {
            return Err(invalid("liveness.idle_window_in_ms must be at least 1ms"));
        }
        Ok(())
    }

    pub fn idle_window(&self) -> Duration {
        Duration::from_millis(self.idle_window_in_ms)
    }
}

fn default_idle_window_in_ms() -> u64 {
    60_000
}

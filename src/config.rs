//! Configuration types for unpack-once

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coordinator behavior configuration
///
/// Carries the constructor-level defaults for
/// [`ExtractionCoordinator`](crate::coordinator::ExtractionCoordinator).
/// Callers that need a different wait budget for a single call can override it
/// via `extract_with_max_wait` without touching this config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Default maximum time a caller waits for an in-flight extraction before
    /// returning a timeout error, in milliseconds (default: 300000 = 5 minutes)
    ///
    /// A timed-out waiter gives up locally; the extraction itself keeps running
    /// under its owner.
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_wait_ms: default_max_wait_ms(),
        }
    }
}

impl CoordinatorConfig {
    /// The default wait budget as a [`Duration`]
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

fn default_max_wait_ms() -> u64 {
    300_000
}

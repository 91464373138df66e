//! AI configuration handling.
//!
//! Provides a typed interface over a JSON config blob, extracting the standard
//! search fields while preserving tier-specific custom fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

pub const DEFAULT_TIME_BUDGET_MS: u64 = 1500;
pub const DEFAULT_ITERATIONS: u32 = 4000;
pub const DEFAULT_ROLLOUT_DEPTH: u32 = 24;
pub const MAX_WORKERS: usize = 8;

fn default_time_budget_ms() -> u64 {
    DEFAULT_TIME_BUDGET_MS
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_WORKERS)
}

fn default_exploration() -> f64 {
    std::f64::consts::SQRT_2
}

fn default_rollout_depth() -> u32 {
    DEFAULT_ROLLOUT_DEPTH
}

/// Standard configuration for AI players.
///
/// # Standard Fields
///
/// - `seed`: Optional RNG seed. Same seed, same context ⇒ same decision for
///   the single-threaded tiers. ChuckNorris derives per-worker seeds from it
///   but its result still depends on how many iterations fit in the budget.
/// - `time_budget_ms`: wall clock for one ChuckNorris search.
/// - `iterations`: iteration target for one ChuckNorris search.
/// - `workers`: size of the search worker pool.
/// - `exploration`: UCT exploration constant.
/// - `rollout_depth`: maximum simulated actions per rollout.
///
/// # Example JSON Config
///
/// ```json
/// {"seed": 12345, "time_budget_ms": 800, "workers": 2, "bluff_bias": 0.1}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default = "default_time_budget_ms")]
    pub time_budget_ms: u64,

    #[serde(default = "default_iterations")]
    pub iterations: u32,

    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_exploration")]
    pub exploration: f64,

    #[serde(default = "default_rollout_depth")]
    pub rollout_depth: u32,

    /// AI-specific configuration.
    ///
    /// Any field that is not part of the standard schema lands here.
    #[serde(flatten)]
    pub custom: JsonValue,
}

impl AiConfig {
    /// Create an AiConfig from an optional JSON value.
    ///
    /// Falls back to the defaults when the input is `None` or malformed.
    pub fn from_json(config: Option<&JsonValue>) -> Self {
        match config {
            Some(json) => serde_json::from_value(json.clone()).unwrap_or_else(|_| Self::empty()),
            None => Self::empty(),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }

    /// Worker count clamped into `1..=MAX_WORKERS`.
    pub fn worker_count(&self) -> usize {
        self.workers.clamp(1, MAX_WORKERS)
    }

    /// Get a custom configuration field by key.
    ///
    /// ```rust,ignore
    /// let bias = config.get_custom("bluff_bias")
    ///     .and_then(|v| v.as_f64())
    ///     .unwrap_or(0.0);
    /// ```
    pub fn get_custom(&self, key: &str) -> Option<&JsonValue> {
        self.custom.get(key)
    }

    /// Defaults everywhere, no seed, no custom fields.
    pub fn empty() -> Self {
        Self {
            seed: None,
            time_budget_ms: default_time_budget_ms(),
            iterations: default_iterations(),
            workers: default_workers(),
            exploration: default_exploration(),
            rollout_depth: default_rollout_depth(),
            custom: JsonValue::Object(serde_json::Map::new()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::empty()
        }
    }

    pub fn with_budget(mut self, time_budget_ms: u64, iterations: u32) -> Self {
        self.time_budget_ms = time_budget_ms;
        self.iterations = iterations;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::empty()
    }
}

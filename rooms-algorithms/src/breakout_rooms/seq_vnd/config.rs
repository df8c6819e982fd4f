use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// What a neighborhood's best candidate has to beat inside local search.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    /// Current total happiness of the partition.
    Current,
    /// Zero. The controller still only accepts strict improvements over the
    /// current happiness.
    Zero,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Maximum number of neighborhood evaluations, 0 for no limit.
    pub max_iterations: usize,
    /// Wall-clock limit in milliseconds, 0 for no limit.
    pub time_limit_ms: u64,
    pub baseline: Baseline,
    /// Enumerate swap and two-student moves over `student1 < student2` only.
    pub prune_symmetric: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    pub fn defaults() -> Self {
        Self {
            max_iterations: 0,
            time_limit_ms: 0,
            baseline: Baseline::Current,
            prune_symmetric: true,
        }
    }

    pub fn initialize(hyperparameters: &Option<Map<String, Value>>) -> Self {
        let base_params = Self::defaults();

        let mut merged_params = match serde_json::to_value(base_params) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "could not serialize default config, using defaults");
                return base_params;
            }
        };
        if let (Value::Object(ref mut obj), Some(map)) = (&mut merged_params, hyperparameters) {
            for (k, v) in map {
                obj.insert(k.clone(), v.clone());
            }
        }

        serde_json::from_value(merged_params).unwrap_or_else(|e| {
            warn!(error = %e, "invalid hyperparameters, using defaults");
            base_params
        })
    }
}

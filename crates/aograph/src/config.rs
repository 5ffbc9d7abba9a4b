//! Configuration for a planning session.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::planner::Strategy;

/// Environment variable selecting the default suggestion strategy (`long` or `short`).
pub const ENV_STRATEGY: &str = "AOGRAPH_STRATEGY";
/// Environment variable bounding the number of generated paths.
pub const ENV_MAX_PATHS: &str = "AOGRAPH_MAX_PATHS";
/// Environment variable setting the log filter used by the binary.
pub const ENV_LOG_LEVEL: &str = "AOGRAPH_LOG_LEVEL";

/// Defines the configuration for a planning session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Strategy used when a suggestion is requested without naming one.
    pub default_strategy: Strategy,
    /// Upper bound on the number of paths. Path count grows with the product
    /// of OR-branching factors, so large graphs may need a cap.
    pub max_paths: Option<usize>,
    /// Log filter for `env_logger` (e.g. `info`, `debug`).
    pub log_level: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_strategy: Strategy::LongSighted,
            max_paths: None,
            log_level: "info".to_string(),
        }
    }
}

impl PlannerConfig {
    /// Builds a configuration from the environment, falling back to defaults
    /// for unset or unparsable variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(strategy) = std::env::var(ENV_STRATEGY) {
            match strategy.parse() {
                Ok(strategy) => config.default_strategy = strategy,
                Err(e) => warn!("Ignoring {}: {}", ENV_STRATEGY, e),
            }
        }

        if let Ok(max_paths) = std::env::var(ENV_MAX_PATHS) {
            match max_paths.parse::<usize>() {
                Ok(limit) => config.max_paths = Some(limit),
                Err(e) => warn!("Ignoring {}={:?}: {}", ENV_MAX_PATHS, max_paths, e),
            }
        }

        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        config
    }

    /// Sets the default strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.default_strategy = strategy;
        self
    }

    /// Caps the number of generated paths.
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = Some(max_paths);
        self
    }

    /// Sets the log filter.
    pub fn with_log_level(mut self, level: &str) -> Self {
        self.log_level = level.to_string();
        self
    }
}

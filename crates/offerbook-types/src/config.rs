//! Configuration types for an offerbook engine instance.

use serde::{Deserialize, Serialize};

use crate::{OfferbookError, Result, constants};

/// Configuration for a single engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Walk every touched chain after each mutation and fail loudly on any
    /// broken invariant. Costs O(n) per mutation; meant for tests and
    /// staging deployments.
    pub verify_invariants: bool,
    /// Initial offer capacity reserved when a category is first seen.
    pub category_capacity: usize,
    /// Log subscriber configuration.
    pub log: LogConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verify_invariants: false,
            category_capacity: constants::DEFAULT_CATEGORY_CAPACITY,
            log: LogConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Configuration used by the test suites: invariant checks on.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            verify_invariants: true,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON configuration document. Missing fields
    /// take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| OfferbookError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the engine cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.category_capacity > constants::MAX_CATEGORY_CAPACITY {
            return Err(OfferbookError::Configuration(format!(
                "category_capacity {} exceeds maximum {}",
                self.category_capacity,
                constants::MAX_CATEGORY_CAPACITY
            )));
        }
        if self.log.filter.trim().is_empty() {
            return Err(OfferbookError::Configuration(
                "log.filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// JSON lines, for log aggregation.
    Json,
}

/// Log subscriber configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `"info,offerbook_core=debug"`.
    /// `RUST_LOG` takes precedence when set.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: constants::DEFAULT_LOG_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

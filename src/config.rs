//! Validator configuration.
//!
//! Everything has a default, so an absent file and an empty file behave the
//! same. Example:
//!
//! ```yaml
//! jobs: 4
//! heuristic:
//!   min_line_len: 60
//!   max_line_len: 95
//!   min_suspicious_breaks: 2
//! ```

use crate::error::ConfigError;
use crate::parse::yaml_options;
use crate::text::WrapHeuristic;
use crate::validate::Validator;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Line-wrap detector thresholds.
    pub heuristic: WrapHeuristic,
    /// Worker threads for batch validation. `None` uses the global pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl ValidatorConfig {
    /// Load a configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError {
            message: format!("failed to read config {}: {}", path.display(), e),
        })?;
        Self::from_yaml_str(&content).map_err(|e| ConfigError {
            message: format!("{}: {}", path.display(), e.message),
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ValidatorConfig = serde_saphyr::from_str_with_options(content, yaml_options())
            .map_err(|e| ConfigError {
                message: format!("invalid config: {}", e),
            })?;
        if config.jobs == Some(0) {
            return Err(ConfigError {
                message: "jobs must be at least 1".to_string(),
            });
        }
        if config.heuristic.min_line_len > config.heuristic.max_line_len {
            return Err(ConfigError {
                message: format!(
                    "heuristic.min_line_len ({}) exceeds heuristic.max_line_len ({})",
                    config.heuristic.min_line_len, config.heuristic.max_line_len
                ),
            });
        }
        Ok(config)
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.heuristic.clone())
    }
}

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;

/// Lowest and highest number of priority queues an interface may carry.
pub const MIN_QUEUES: u8 = 1;
pub const MAX_QUEUES: u8 = 8;

/// Path-computation strategy. Only one is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathAlgorithm {
    #[default]
    #[serde(rename = "EXTENDED_BREADTH_FIRST_SEARCH_SINGLE_PATH")]
    ExtendedBreadthFirstSearchSinglePath,
}

/// Protocol configuration, validated once at startup and then passed
/// read-only to the admission controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QospfConfig {
    /// Priority queues per interface, in `[1, 8]`.
    #[serde(default = "default_queues_per_interface")]
    pub queues_per_interface: u8,

    #[serde(default)]
    pub algorithm: PathAlgorithm,

    /// Advertise propagation plus queueing delay instead of propagation only.
    #[serde(default)]
    pub queueing_delay_considered: bool,

    /// Seconds between periodic floods; 0 disables periodic flooding.
    #[serde(default)]
    pub flooding_interval_secs: u64,

    /// Seconds between interface utilization samples.
    #[serde(default = "default_observation_interval")]
    pub interface_observation_interval_secs: u64,

    /// Relative change in available bandwidth that triggers a flood.
    #[serde(default = "default_flooding_factor")]
    pub flooding_factor: f64,

    /// Only a single area is supported.
    #[serde(default)]
    pub multi_area: bool,

    #[serde(default = "default_true")]
    pub collect_statistics: bool,

    /// Raise logging of path computation to `trace`.
    #[serde(default)]
    pub trace: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_queues_per_interface() -> u8 {
    3
}
fn default_observation_interval() -> u64 {
    10
}
fn default_flooding_factor() -> f64 {
    0.1
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Default for QospfConfig {
    fn default() -> Self {
        Self {
            queues_per_interface: default_queues_per_interface(),
            algorithm: PathAlgorithm::default(),
            queueing_delay_considered: false,
            flooding_interval_secs: 0,
            interface_observation_interval_secs: default_observation_interval(),
            flooding_factor: default_flooding_factor(),
            multi_area: false,
            collect_statistics: true,
            trace: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl QospfConfig {
    /// Check the configuration. An out-of-range flooding factor is replaced
    /// by the default with a warning; every other violation is an error.
    pub fn validate(&mut self) -> Result<(), CoreError> {
        if !(MIN_QUEUES..=MAX_QUEUES).contains(&self.queues_per_interface) {
            return Err(CoreError::Configuration(format!(
                "queues_per_interface must be in [{}, {}], got {}",
                MIN_QUEUES, MAX_QUEUES, self.queues_per_interface
            )));
        }
        if self.interface_observation_interval_secs == 0 {
            return Err(CoreError::Configuration(
                "interface_observation_interval_secs must be positive".into(),
            ));
        }
        if self.multi_area {
            return Err(CoreError::Configuration(
                "multiple areas are not supported".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.flooding_factor) {
            tracing::warn!(
                flooding_factor = self.flooding_factor,
                default = default_flooding_factor(),
                "flooding factor out of range, using default"
            );
            self.flooding_factor = default_flooding_factor();
        }
        Ok(())
    }

    /// Log level to install, taking the trace flag into account.
    pub fn effective_log_level(&self) -> &str {
        if self.trace {
            "trace"
        } else {
            &self.logging.level
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self, CoreError> {
        let mut config: QospfConfig =
            toml::from_str(contents).map_err(|e| CoreError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| CoreError::Configuration(format!("{}: {}", path.display(), e)))?;
            Self::from_toml(&contents)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Configuration(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::Configuration(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, contents)
            .map_err(|e| CoreError::Configuration(format!("{}: {}", path.display(), e)))
    }
}

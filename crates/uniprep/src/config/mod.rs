//! Configuration system
//!
//! Every tunable of the toolkit lives in [`ToolkitConfig`]. Configurations
//! load from and save to TOML or RON files, chosen by file extension, and
//! every field falls back to its default when omitted.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Top-level toolkit configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Frame scheduler settings
    pub scheduler: SchedulerConfig,
    /// Work runner settings
    pub work: WorkConfig,
    /// Face clustering settings
    pub cluster: ClusterConfig,
}

impl Config for ToolkitConfig {}

/// Frame scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Log a warning when a fixed-step loop asks for more quanta than iterations
    pub warn_on_clamped_quanta: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            warn_on_clamped_quanta: true,
        }
    }
}

/// Work runner settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkConfig {
    /// Executors instantiated up front when the runner is created
    pub prewarm_executors: usize,
}

/// Face clustering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Per-component tolerance when merging duplicate vertex/UV pairs
    pub merge_epsilon: f32,
    /// Padding added to every world bounds extent so flat clusters stay scalable
    pub world_bounds_padding: f32,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            merge_epsilon: 1e-5,
            world_bounds_padding: 0.01,
        }
    }
}

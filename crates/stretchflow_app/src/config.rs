// SPDX-License-Identifier: MIT OR Apache-2.0
//! Application configuration.
//!
//! Stored as RON next to the other per-user config files. Every field has a
//! default, so a partial or missing file is fine.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use stretchflow_routine::{PlayerTimings, RoutineSpeed};
use thiserror::Error;

/// Current config file format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Saved routine file name inside the data directory
pub const DATA_FILE_NAME: &str = "routine.json";

/// Environment variable overriding the config file path
pub const CONFIG_ENV: &str = "STRETCHFLOW_CONFIG";

/// Config errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not read or write the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON
    #[error("Invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Could not render the config
    #[error("Failed to write config: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },
}

/// User-tunable settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Format version
    pub version: u32,
    /// Saved routine location; platform data dir when unset
    pub data_file: Option<PathBuf>,
    /// How often the player recomputes, in milliseconds
    pub tick_interval_ms: u64,
    /// Get-ready hold in seconds
    pub get_ready_secs: f64,
    /// Next-pose announcement hold in seconds
    pub transition_secs: f64,
    /// Speed a routine starts at
    pub default_speed: RoutineSpeed,
    /// Extra `tracing` filter directives, comma separated
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            data_file: None,
            tick_interval_ms: 100,
            get_ready_secs: 3.0,
            transition_secs: 2.0,
            default_speed: RoutineSpeed::Normal,
            log_filter: "stretchflow_app=warn,stretchflow_routine=warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = ron::from_str(&content)?;

        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }

        Ok(config)
    }

    /// Load from a file, or defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        let content = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Player delays, with negative or non-finite values treated as zero
    pub fn timings(&self) -> PlayerTimings {
        PlayerTimings {
            get_ready: secs(self.get_ready_secs),
            transition: secs(self.transition_secs),
        }
    }

    /// Update cadence, at least one millisecond
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Where the routine is saved
    pub fn data_file_path(&self) -> PathBuf {
        self.data_file
            .clone()
            .unwrap_or_else(|| data_dir().join(DATA_FILE_NAME))
    }
}

fn secs(value: f64) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f64(value)
    } else {
        Duration::ZERO
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "StretchFlow", "stretchflow")
}

/// Platform config directory, or `./.config`
pub fn config_dir() -> PathBuf {
    project_directory()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".config"))
}

/// Platform data directory, or `./.data`
pub fn data_dir() -> PathBuf {
    project_directory()
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
}

/// Config path from the flag, the environment, or the platform default
pub fn resolve_config_path(flag: Option<&Path>) -> PathBuf {
    if let Some(path) = flag {
        return path.to_path_buf();
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(path);
    }
    config_dir().join(CONFIG_FILE_NAME)
}

//! evloop configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scheduler::SchedulerConfig;

/// Main evloop configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Event loop timings and log capacity
    pub scheduler: SchedulerConfig,

    /// Terminal UI settings
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; `load` reports them once logging exists.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(path) => path.clone(),
            None => Self::search_paths().into_iter().find(|p| p.exists())?,
        };
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    /// Project-local `.evloop.yml`, then `~/.config/evloop/evloop.yml`
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".evloop.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("evloop").join("evloop.yml"));
        }
        paths
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Ready delay the delay control starts at
    #[serde(rename = "default-delay-ms")]
    pub default_delay_ms: u64,

    /// Upper bound of the delay control
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Increment per key press
    #[serde(rename = "delay-step-ms")]
    pub delay_step_ms: u64,

    /// Redraw interval
    #[serde(rename = "frame-ms")]
    pub frame_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: 50,
            max_delay_ms: 1000,
            delay_step_ms: 10,
            frame_ms: 33,
        }
    }
}

impl UiConfig {
    /// Clamp a requested delay into `0..=max_delay_ms`
    pub fn clamp_delay(&self, delay_ms: i64) -> u64 {
        let max = i64::try_from(self.max_delay_ms).unwrap_or(i64::MAX);
        delay_ms.clamp(0, max).unsigned_abs()
    }

    pub fn initial_delay(&self) -> u64 {
        self.clamp_delay(i64::try_from(self.default_delay_ms).unwrap_or(i64::MAX))
    }

    pub fn frame_rate(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

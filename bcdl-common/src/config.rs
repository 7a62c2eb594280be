//! Configuration loading
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments (`--browser`, `--budget-ms`)
//! 2. Environment variables (`BCDL_BROWSER`, `BCDL_BUDGET_MS`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! Levels 1 and 2 are handled by the binary's argument parser; this module
//! owns the TOML file and the defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default virtual time budget handed to the headless browser (milliseconds)
pub const DEFAULT_VIRTUAL_TIME_BUDGET_MS: u64 = 10_000;

/// Configuration loaded from `config.toml`
///
/// Every section is optional; missing keys fall back to built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Headless browser settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Headless browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Explicit browser executable; overrides the well-known install paths
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// Upper bound on page-settle time passed as `--virtual-time-budget`
    #[serde(default = "default_virtual_time_budget_ms")]
    pub virtual_time_budget_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            virtual_time_budget_ms: default_virtual_time_budget_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_virtual_time_budget_ms() -> u64 {
    DEFAULT_VIRTUAL_TIME_BUDGET_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default configuration file path for the platform
///
/// `~/.config/bcdl/config.toml` on Linux, the equivalent per-user config
/// directory elsewhere. `None` when the platform has no config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bcdl").join("config.toml"))
}

/// Parse TOML configuration text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// Built-in defaults; carries the default path that had no file, if any
    Defaults(Option<PathBuf>),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "config file {}", path.display()),
            ConfigSource::Defaults(Some(path)) => {
                write!(f, "built-in defaults (no config file at {})", path.display())
            }
            ConfigSource::Defaults(None) => write!(f, "built-in defaults"),
        }
    }
}

/// Configuration together with its source
///
/// Loading happens before logging is set up, so the source is returned for
/// the caller to report instead of being logged here.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

/// Load configuration
///
/// An explicit path must exist and parse. Without one, the platform default
/// path is tried; a missing default file is not an error and yields the
/// built-in defaults.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return read_config_file(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => read_config_file(&path),
        missing => Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults(missing),
        }),
    }
}

fn read_config_file(path: &Path) -> Result<LoadedConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(LoadedConfig {
        config: parse_toml_config(&content)?,
        source: ConfigSource::File(path.to_path_buf()),
    })
}

//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/chatvet/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/chatvet/` (~/.config/chatvet/)
//! - State/Logs: `$XDG_STATE_HOME/chatvet/` (~/.local/state/chatvet/)
//!
//! The only validation behavior configuration influences is the linkage
//! strictness of the conversation-tree pass; record validation itself has no
//! knobs.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error
    #[error("configuration error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Conversation-tree linkage configuration
    #[serde(default)]
    pub linkage: LinkageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Strictness of the conversation-tree linkage check.
///
/// The export format guarantees that references resolve but not that child
/// linkage is mutually consistent with parent linkage, so the back-link
/// check is opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkageStrictness {
    /// Check only that parent/children ids resolve within the mapping
    #[default]
    References,
    /// Additionally require each child's parent to point back at the
    /// referencing record
    Bidirectional,
}

impl LinkageStrictness {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkageStrictness::References => "references",
            LinkageStrictness::Bidirectional => "bidirectional",
        }
    }
}

impl std::str::FromStr for LinkageStrictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "references" => Ok(LinkageStrictness::References),
            "bidirectional" => Ok(LinkageStrictness::Bidirectional),
            _ => Err(format!("unknown linkage strictness: {}", s)),
        }
    }
}

/// Conversation-tree linkage configuration
#[derive(Debug, Deserialize, Default)]
pub struct LinkageConfig {
    /// Strictness level for the parent/child consistency check
    #[serde(default)]
    pub strictness: LinkageStrictness,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
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

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Returns the config directory path
    pub fn config_dir() -> PathBuf {
        xdg_config_home().join("chatvet")
    }

    /// Returns the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Returns the state directory path (for logs)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("chatvet")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("chatvet.log")
    }

    /// Load configuration from the default location.
    ///
    /// A missing config file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

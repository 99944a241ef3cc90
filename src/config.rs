//! gobfuscate configuration management.
//!
//! Handles the optional configuration file at:
//! - Linux: ~/.config/gobfuscate/config.toml
//! - macOS: ~/Library/Application Support/gobfuscate/config.toml
//! - Windows: %APPDATA%\gobfuscate\config.toml
//!
//! Command-line flags override every value read here.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ObfuscateError, Result};

/// Default linker flags for the final build
pub const DEFAULT_LDFLAGS: &str = "-s -w -extldflags \"-static\"";

/// gobfuscate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObfuscateConfig {
    /// Encryption key; `hex:` prefix for hex-encoded bytes. Random when unset.
    #[serde(default)]
    pub key: Option<String>,

    /// Extra package path filters, on top of the target package itself
    #[serde(default)]
    pub packages: Vec<String>,

    /// Keep `_test.go` files and let them take part in renaming
    #[serde(default)]
    pub keep_tests: bool,

    /// GOROOT for the interface closure; `go env GOROOT` when unset
    #[serde(default)]
    pub goroot: Option<PathBuf>,

    /// Run the literal pass
    #[serde(default = "default_true")]
    pub obfuscate_strings: bool,

    /// Linker flags passed to `go build`
    #[serde(default = "default_ldflags")]
    pub ldflags: String,

    /// External tool locations
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}

fn default_ldflags() -> String {
    DEFAULT_LDFLAGS.to_string()
}

impl Default for ObfuscateConfig {
    fn default() -> Self {
        Self {
            key: None,
            packages: Vec::new(),
            keep_tests: false,
            goroot: None,
            obfuscate_strings: true,
            ldflags: default_ldflags(),
            tools: ToolsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Tool paths. Unset entries are looked up on `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolsConfig {
    #[serde(default)]
    pub go: Option<PathBuf>,
    #[serde(default)]
    pub gorename: Option<PathBuf>,
    #[serde(default)]
    pub gomvpkg: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Show progress bars while applying rename plans
    #[serde(default = "default_true")]
    pub progress: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            progress: true,
        }
    }
}

impl ObfuscateConfig {
    /// Platform default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gobfuscate").join("config.toml"))
    }

    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ObfuscateError::ConfigError {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ObfuscateError::ConfigError {
            message: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        const LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ObfuscateError::ConfigError {
                message: format!(
                    "Invalid log level: {}. Must be one of: {}",
                    self.logging.level,
                    LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Display configuration as TOML
    pub fn display(&self) -> String {
        let mut shown = self.clone();
        if shown.key.is_some() {
            shown.key = Some("<redacted>".to_string());
        }
        toml::to_string_pretty(&shown).unwrap_or_default()
    }
}

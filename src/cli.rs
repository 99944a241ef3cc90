//! CLI argument definitions using clap
//!
//! Flags override values from the configuration file; anything left unset
//! falls back to the file, then to built-in defaults.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ObfuscateConfig;

/// Obfuscate a Go program by renaming its symbols, packages and literals
#[derive(Parser, Debug)]
#[command(name = "gobfuscate")]
#[command(about = "Keyed source-level obfuscator for Go programs")]
#[command(version)]
pub struct Cli {
    /// Import path of the package to obfuscate
    #[arg(value_name = "PKG")]
    pub package: String,

    /// Output binary, or the GOPATH to create with --outdir
    #[arg(value_name = "OUT")]
    pub out: PathBuf,

    /// Comma-separated extra package path filters (e.g. github.com,gopkg.in/yaml)
    #[arg(long, value_delimiter = ',')]
    pub pkgs: Vec<String>,

    /// Encryption key; prefix with `hex:` for hex-encoded bytes
    #[arg(long, env = "GOBFUSCATE_KEY", hide_env_values = true)]
    pub enckey: Option<String>,

    /// Write the obfuscated GOPATH to OUT instead of building a binary
    #[arg(long)]
    pub outdir: bool,

    /// Keep _test.go files
    #[arg(long)]
    pub keeptests: bool,

    /// Leave string literals as they are
    #[arg(long)]
    pub no_strings: bool,

    /// Plan every rename without running the rename tools
    #[arg(long)]
    pub dry_run: bool,

    /// Report format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    /// Fold command-line flags into a loaded configuration.
    pub fn apply_to(&self, config: &mut ObfuscateConfig) {
        if let Some(key) = &self.enckey {
            config.key = Some(key.clone());
        }
        config.packages.extend(
            self.pkgs
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        );
        if self.keeptests {
            config.keep_tests = true;
        }
        if self.no_strings {
            config.obfuscate_strings = false;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

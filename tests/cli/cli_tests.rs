//! Tests for the command-line surface
//!
//! Only paths that fail before any Go tool runs are exercised here, so the
//! suite does not need a Go installation.

use std::fs;

use crate::common::{run_cli, run_cli_failure, GoWorkspace};

#[test]
fn test_help_lists_flags() {
    let ws = GoWorkspace::new();
    let output = run_cli(ws.root(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--pkgs", "--enckey", "--outdir", "--keeptests", "--dry-run"] {
        assert!(stdout.contains(flag), "help is missing {}: {}", flag, stdout);
    }
}

#[test]
fn test_missing_positionals_is_usage_error() {
    let ws = GoWorkspace::new();
    let (code, stderr) = run_cli_failure(ws.root(), &["example.com/app"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("OUT"), "unexpected usage text: {}", stderr);
}

#[test]
fn test_missing_config_file() {
    let ws = GoWorkspace::new();
    let (code, stderr) = run_cli_failure(
        ws.root(),
        &["--config", "/nonexistent/gobfuscate.toml", "example.com/app", "out"],
    );
    assert_eq!(code, 2);
    assert!(stderr.contains("Error: Configuration error"), "{}", stderr);
}

#[test]
fn test_invalid_log_level_in_config() {
    let ws = GoWorkspace::new();
    let config = ws.root().join("config.toml");
    fs::write(&config, "[logging]\nlevel = \"loud\"\n").unwrap();
    let (code, stderr) = run_cli_failure(
        ws.root(),
        &["--config", config.to_str().unwrap(), "example.com/app", "out"],
    );
    assert_eq!(code, 2);
    assert!(stderr.contains("Invalid log level"), "{}", stderr);
}

#[test]
fn test_invalid_hex_key() {
    let ws = GoWorkspace::new();
    let config = ws.root().join("config.toml");
    fs::write(&config, "").unwrap();
    let (code, stderr) = run_cli_failure(
        ws.root(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--enckey",
            "hex:zz",
            "example.com/app",
            "out",
        ],
    );
    assert_eq!(code, 2);
    assert!(stderr.contains("invalid hex key"), "{}", stderr);
}

#[test]
fn test_missing_go_tool_leaves_no_outdir() {
    let ws = GoWorkspace::new();
    let config = ws.root().join("config.toml");
    fs::write(&config, "[tools]\ngo = \"/nonexistent/bin/go\"\n").unwrap();
    let (code, stderr) = run_cli_failure(
        ws.root(),
        &[
            "--config",
            config.to_str().unwrap(),
            "--outdir",
            "example.com/app",
            "gopath-out",
        ],
    );
    assert_eq!(code, 2);
    assert!(stderr.contains("Required tool not found"), "{}", stderr);
    assert!(!ws.root().join("gopath-out").exists());
}

//! gobfuscate CLI entry point

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

use gobfuscate::provision::provision;
use gobfuscate::toolchain::GoTool;
use gobfuscate::{
    run_pipeline, Cli, DryRunRenamer, Encrypter, GoToolsRenamer, ObfuscateConfig, ObfuscateError,
    ObfuscationReport, OutputFormat, PipelineOptions, RenameOp, Workspace,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn init_logging(level: &str) {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("gobfuscate={}", level).parse() {
        filter = filter.add_directive(directive);
    }
    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(cli: &Cli) -> gobfuscate::Result<ObfuscateConfig> {
    let mut config = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(ObfuscateError::ConfigError {
                message: format!("config file not found: {}", path.display()),
            })
        }
        Some(path) => ObfuscateConfig::load_from(path)?,
        None => ObfuscateConfig::load()?,
    };
    cli.apply_to(&mut config);
    Ok(config)
}

/// Where the scratch GOPATH lives for this run.
enum Scratch {
    /// Removed when dropped
    Temp(TempDir),
    /// Caller-requested output GOPATH
    Kept(PathBuf),
}

impl Scratch {
    fn create(cli: &Cli) -> gobfuscate::Result<Self> {
        if cli.outdir {
            fs::create_dir(&cli.out).map_err(|e| ObfuscateError::ProvisionFailure {
                message: format!("failed to create {}: {}", cli.out.display(), e),
            })?;
            Ok(Self::Kept(cli.out.clone()))
        } else {
            Ok(Self::Temp(TempDir::new()?))
        }
    }

    fn path(&self) -> &Path {
        match self {
            Self::Temp(dir) => dir.path(),
            Self::Kept(path) => path,
        }
    }

    /// A failed run leaves nothing behind, even in an output GOPATH.
    fn discard(self) {
        if let Self::Kept(path) = self {
            if let Err(e) = fs::remove_dir_all(&path) {
                tracing::warn!("could not remove {}: {}", path.display(), e);
            }
        }
    }
}

#[derive(Serialize)]
struct RunOutput<'a> {
    #[serde(flatten)]
    report: &'a ObfuscationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    requests: Option<&'a [RenameOp]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Path>,
}

fn run(cli: &Cli) -> gobfuscate::Result<String> {
    let config = load_config(cli)?;
    init_logging(&config.logging.level);
    tracing::debug!("configuration:\n{}", config.display());

    let encrypter = match &config.key {
        Some(key) => Encrypter::from_key_str(key)?,
        None => {
            tracing::debug!("no key given, using a random key");
            Encrypter::random()
        }
    };
    let go = GoTool::locate(config.tools.go.as_deref())?;

    let scratch = Scratch::create(cli)?;
    match obfuscate(cli, &config, &encrypter, &go, scratch.path()) {
        Ok(output) => Ok(output),
        Err(e) => {
            scratch.discard();
            Err(e)
        }
    }
}

fn obfuscate(
    cli: &Cli,
    config: &ObfuscateConfig,
    encrypter: &Encrypter,
    go: &GoTool,
    gopath: &Path,
) -> gobfuscate::Result<String> {
    // The interface guard needs the standard library sources.
    let goroot = match &config.goroot {
        Some(goroot) => goroot.clone(),
        None => go.goroot().map_err(|e| ObfuscateError::ClosureResolutionFailure {
            message: format!("cannot determine GOROOT: {}", e),
        })?,
    };
    if !goroot.join("src").is_dir() {
        return Err(ObfuscateError::ClosureResolutionFailure {
            message: format!("GOROOT {} has no src directory", goroot.display()),
        });
    }
    let workspace = Workspace::new(gopath).with_goroot(Some(goroot));

    tracing::info!("copying GOPATH");
    provision(go, &cli.package, &workspace, config.keep_tests)?;

    let mut options = PipelineOptions::new(&cli.package, config.packages.iter().cloned());
    options.include_tests = config.keep_tests;
    options.obfuscate_strings = config.obfuscate_strings;
    options.show_progress = config.logging.progress && std::io::stderr().is_terminal();

    let mut requests = None;
    let report = if cli.dry_run {
        let mut renamer = DryRunRenamer::new();
        let report = run_pipeline(&workspace, encrypter, &options, &mut renamer)?;
        requests = Some(renamer.into_ops());
        report
    } else {
        let mut renamer = GoToolsRenamer::locate(
            config.tools.gorename.as_deref(),
            config.tools.gomvpkg.as_deref(),
            gopath,
        )?;
        run_pipeline(&workspace, encrypter, &options, &mut renamer)?
    };

    let output = if cli.dry_run {
        None
    } else if cli.outdir {
        Some(gopath.to_path_buf())
    } else {
        let out = if cli.out.is_absolute() {
            cli.out.clone()
        } else {
            std::env::current_dir()?.join(&cli.out)
        };
        go.build(gopath, &report.entry, &out, &config.ldflags)?;
        Some(out)
    };

    match cli.format {
        OutputFormat::Json => {
            let run = RunOutput {
                report: &report,
                requests: requests.as_deref(),
                output: output.as_deref(),
            };
            serde_json::to_string_pretty(&run)
                .map(|s| s + "\n")
                .map_err(|e| ObfuscateError::ConfigError {
                    message: format!("JSON serialization failed: {}", e),
                })
        }
        OutputFormat::Text => Ok(format_text(
            &report,
            requests.as_deref(),
            output.as_deref(),
        )),
    }
}

fn format_text(
    report: &ObfuscationReport,
    requests: Option<&[RenameOp]>,
    output: Option<&Path>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("target:   {}\n", report.target));
    out.push_str(&format!("entry:    {}\n", report.entry));
    out.push_str(&format!(
        "symbols:  {} top-level, {} methods ({} guarded, {} ambiguous)\n",
        report.symbols.top_level.len(),
        report.symbols.methods.len(),
        report.symbols.methods.guarded.len(),
        report.symbols.top_level.discarded.len() + report.symbols.methods.discarded.len()
    ));
    out.push_str(&format!(
        "packages: {} renamed, {} aliased, {} levels\n",
        report.packages.renamed(),
        report.packages.aliased(),
        report.packages.levels
    ));
    if let Some(strings) = &report.strings {
        out.push_str(&format!(
            "strings:  {} literals in {} files\n",
            strings.literals, strings.files_rewritten
        ));
    }
    if let Some(requests) = requests {
        out.push_str(&format!("\n{} rename requests (dry run):\n", requests.len()));
        for op in requests {
            let line = match op {
                RenameOp::Symbol { from, to } => format!("  symbol {} -> {}\n", from, to),
                RenameOp::Path { from, to } => format!("  path   {} -> {}\n", from, to),
            };
            out.push_str(&line);
        }
    }
    if let Some(output) = output {
        out.push_str(&format!("output:   {}\n", output.display()));
    }
    out
}

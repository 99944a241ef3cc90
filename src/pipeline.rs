//! Obfuscation pipeline
//!
//! Passes run strictly in sequence over one scratch workspace: symbols,
//! then package paths, then literals. Each pass re-reads the tree left by
//! the previous one. The first error from any pass ends the run.

use serde::Serialize;

use crate::eligibility::PackageFilter;
use crate::encrypter::Encrypter;
use crate::error::{ObfuscateError, Result};
use crate::packages::{rename_packages, PathReport};
use crate::renamer::RenamePrimitive;
use crate::strings::{obfuscate_strings, StringReport};
use crate::symbols::{obfuscate_symbols, SymbolReport};
use crate::workspace::Workspace;

/// Read-only state shared by every pass of one run.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub workspace: &'a Workspace,
    pub encrypter: &'a Encrypter,
    pub filter: &'a PackageFilter,
    pub include_tests: bool,
    pub show_progress: bool,
    /// Plan and count only; leave files untouched
    pub dry_run: bool,
}

impl<'a> PassContext<'a> {
    pub fn new(
        workspace: &'a Workspace,
        encrypter: &'a Encrypter,
        filter: &'a PackageFilter,
        include_tests: bool,
    ) -> Self {
        Self {
            workspace,
            encrypter,
            filter,
            include_tests,
            show_progress: false,
            dry_run: false,
        }
    }
}

/// Caller-facing settings for one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Import path of the entry package
    pub target: String,
    pub filter: PackageFilter,
    pub include_tests: bool,
    pub obfuscate_strings: bool,
    pub show_progress: bool,
}

impl PipelineOptions {
    /// Options for `target`, whose own path is always part of the filter.
    pub fn new<I, S>(target: impl Into<String>, extra_packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let target = target.into();
        let patterns: Vec<String> = std::iter::once(target.clone())
            .chain(extra_packages.into_iter().map(Into::into))
            .collect();
        Self {
            filter: PackageFilter::new(patterns),
            target,
            include_tests: false,
            obfuscate_strings: true,
            show_progress: false,
        }
    }
}

/// Everything the passes did, plus the renamed entry package.
#[derive(Debug, Clone, Serialize)]
pub struct ObfuscationReport {
    pub target: String,
    /// Entry package path after renaming; the only input the build needs
    pub entry: String,
    pub dry_run: bool,
    pub symbols: SymbolReport,
    pub packages: PathReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strings: Option<StringReport>,
}

/// Run every pass over a provisioned workspace.
pub fn run_pipeline(
    workspace: &Workspace,
    encrypter: &Encrypter,
    options: &PipelineOptions,
    renamer: &mut dyn RenamePrimitive,
) -> Result<ObfuscationReport> {
    if !workspace.package_dir(&options.target).is_dir() {
        return Err(ObfuscateError::ProvisionFailure {
            message: format!("package {} is not in the workspace", options.target),
        });
    }

    let dry_run = !renamer.applies_changes();
    let ctx = PassContext {
        workspace,
        encrypter,
        filter: &options.filter,
        include_tests: options.include_tests,
        show_progress: options.show_progress,
        dry_run,
    };

    tracing::info!("obfuscating symbols");
    let symbols = obfuscate_symbols(&ctx, &options.target, renamer)?;

    tracing::info!("obfuscating package names");
    let packages = rename_packages(&ctx, renamer)?;

    let strings = if options.obfuscate_strings {
        tracing::info!("obfuscating strings");
        Some(obfuscate_strings(&ctx)?)
    } else {
        None
    };

    let entry = packages.resolve(&options.target);

    Ok(ObfuscationReport {
        target: options.target.clone(),
        entry,
        dry_run,
        symbols,
        packages,
        strings,
    })
}

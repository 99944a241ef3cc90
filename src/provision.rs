//! Scratch workspace provisioning
//!
//! The target's non-standard dependency tree is copied package by package
//! into `<scratch>/src/<import path>`, so the rename tools can run in
//! GOPATH mode against a private copy.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{ObfuscateError, Result};
use crate::fs_utils::copy_package_files;
use crate::toolchain::{GoTool, ListedPackage};
use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub packages: usize,
    pub files: usize,
}

/// List the dependencies of `target` with `go list` and copy them in.
/// With `keep_tests` the test-only dependencies are provisioned too.
pub fn provision(
    go: &GoTool,
    target: &str,
    workspace: &Workspace,
    keep_tests: bool,
) -> Result<ProvisionReport> {
    let packages = go.list_dependencies(target, keep_tests)?;
    if !packages.iter().any(|p| p.import_path == target) {
        return Err(ObfuscateError::ProvisionFailure {
            message: format!("go list did not report package {}", target),
        });
    }
    copy_packages(&packages, workspace, keep_tests)
}

/// Copy already-listed packages into the workspace.
pub fn copy_packages(
    packages: &[ListedPackage],
    workspace: &Workspace,
    keep_tests: bool,
) -> Result<ProvisionReport> {
    let counts: Vec<usize> = packages
        .par_iter()
        .map(|pkg| {
            let dst = workspace.package_dir(&pkg.import_path);
            copy_package_files(&pkg.dir, &dst, keep_tests).map_err(|e| {
                ObfuscateError::ProvisionFailure {
                    message: format!("copying {}: {}", pkg.import_path, e),
                }
            })
        })
        .collect::<Result<_>>()?;

    let report = ProvisionReport {
        packages: packages.len(),
        files: counts.iter().sum(),
    };
    tracing::info!(
        "copied {} packages ({} files) into {}",
        report.packages,
        report.files,
        workspace.root().display()
    );
    Ok(report)
}

//! Scratch GOPATH workspace layout
//!
//! A workspace is a GOPATH-style root whose `src/` directory holds one
//! directory per package. A package's identity is its `/`-separated path
//! relative to `src/`; nothing else identifies it.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::eligibility::{classify_dir, is_candidate_source, DirClass};
use crate::error::{ObfuscateError, Result};
use crate::fs_utils::{is_ignored_dir_name, list_files, to_slash};

/// A Go source file located inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Import path of the owning package
    pub package: String,
    pub path: PathBuf,
}

/// A GOPATH-style scratch workspace.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    goroot: Option<PathBuf>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            goroot: None,
        }
    }

    /// Attach a GOROOT so standard library packages can join import closures.
    pub fn with_goroot(mut self, goroot: Option<PathBuf>) -> Self {
        self.goroot = goroot;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn goroot(&self) -> Option<&Path> {
        self.goroot.as_deref()
    }

    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Directory holding the package with the given import path.
    pub fn package_dir(&self, package: &str) -> PathBuf {
        package
            .split('/')
            .fold(self.src_dir(), |dir, part| dir.join(part))
    }

    /// Import path for a directory under `src/`.
    pub fn package_path(&self, dir: &Path) -> Option<String> {
        let rel = dir.strip_prefix(self.src_dir()).ok()?;
        if rel.as_os_str().is_empty() {
            return None;
        }
        Some(to_slash(rel))
    }

    /// Every directory below `src/` that could be a package, in walk order.
    ///
    /// The live tree is read on each call.
    pub fn package_dirs(&self) -> Result<Vec<PathBuf>> {
        let src = self.src_dir();
        if !src.is_dir() {
            return Err(ObfuscateError::ProvisionFailure {
                message: format!("workspace has no src directory: {}", src.display()),
            });
        }

        let mut builder = WalkBuilder::new(&src);
        builder.standard_filters(false);
        builder.follow_links(false);
        builder.sort_by_file_name(|a, b| a.cmp(b));
        builder.filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_some_and(|t| t.is_dir())
                || !is_ignored_dir_name(&entry.file_name().to_string_lossy())
        });

        let mut dirs = Vec::new();
        for entry in builder.build() {
            let entry = entry.map_err(|e| ObfuscateError::Io(std::io::Error::other(e)))?;
            if entry.depth() > 0 && entry.file_type().is_some_and(|t| t.is_dir()) {
                dirs.push(entry.into_path());
            }
        }
        Ok(dirs)
    }

    /// Candidate Go sources of analyzable packages accepted by `accept`.
    ///
    /// Unsupported directories (assembly / cgo) contribute no files. Header
    /// exclusion is left to the caller, which parses the file anyway.
    pub fn analyzable_sources<F>(&self, include_tests: bool, accept: F) -> Result<Vec<SourceFile>>
    where
        F: Fn(&str) -> bool,
    {
        let mut files = Vec::new();
        for dir in self.package_dirs()? {
            let Some(package) = self.package_path(&dir) else {
                continue;
            };
            if !accept(&package) {
                continue;
            }
            if classify_dir(&dir)? == DirClass::Unsupported {
                tracing::debug!("skipping unsupported package {}", package);
                continue;
            }
            for path in list_files(&dir)? {
                if is_candidate_source(&path, include_tests) {
                    files.push(SourceFile {
                        package: package.clone(),
                        path,
                    });
                }
            }
        }
        Ok(files)
    }
}

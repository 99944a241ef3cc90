//! Eligibility classification for files and package directories
//!
//! Decisions are local to one file or directory and are recomputed on every
//! pass, since earlier passes move and rewrite the tree.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fs_utils::{is_test_file, list_files};
use crate::syntax::GoFile;

/// Marker that tooling places in generated sources.
const GENERATED_MARKER: &str = "DO NOT EDIT";

/// Build tag that removes a file from every build.
const IGNORE_TAG: &str = "ignore";

/// Participation decision for a package directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirClass {
    /// Symbols may be renamed and the directory moved directly.
    Analyzable,
    /// Contains assembly or cgo; references across the boundary cannot be
    /// rewritten, so symbols stay and path moves go through an alias.
    Unsupported,
}

/// Case-insensitive package path filters. `*` matches every package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFilter {
    patterns: Vec<String>,
}

impl PackageFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn matches(&self, package_path: &str) -> bool {
        let path = package_path.to_lowercase();
        self.patterns
            .iter()
            .any(|p| p == "*" || path.contains(&p.to_lowercase()))
    }
}

/// Classify a directory by its direct contents.
pub fn classify_dir(dir: &Path) -> Result<DirClass> {
    if contains_assembly(dir)? || contains_cgo(dir)? {
        Ok(DirClass::Unsupported)
    } else {
        Ok(DirClass::Analyzable)
    }
}

/// True when the directory holds any assembly source (`.s` / `.S`).
pub fn contains_assembly(dir: &Path) -> Result<bool> {
    Ok(list_files(dir)?.iter().any(|f| {
        f.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "s" || e == "S")
    }))
}

/// True when any Go file in the directory imports `"C"`.
pub fn contains_cgo(dir: &Path) -> Result<bool> {
    for file in list_files(dir)? {
        if !is_go_file(&file) {
            continue;
        }
        if GoFile::read(&file)?.uses_cgo() {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn is_go_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("go")
}

/// Whether a Go source path takes part given the test-file setting.
pub fn is_candidate_source(path: &Path, include_tests: bool) -> bool {
    is_go_file(path) && (include_tests || !is_test_file(path))
}

/// True when the file's header excludes it from the build or marks it as
/// generated.
pub fn is_excluded_file(file: &GoFile) -> bool {
    header_excludes(&file.header_comments())
}

/// True when the file carries an `ignore` build constraint and is never
/// compiled. Generated files still compile, so they stay visible to the
/// import graph and the interface guard.
pub fn is_build_ignored(file: &GoFile) -> bool {
    file.header_comments()
        .iter()
        .any(|c| c.lines().any(is_ignore_constraint))
}

/// Header rule over raw comment texts positioned before `package`.
pub fn header_excludes(comments: &[&str]) -> bool {
    comments
        .iter()
        .any(|c| c.contains(GENERATED_MARKER) || c.lines().any(is_ignore_constraint))
}

/// `// +build ignore` or `//go:build ignore` (the tag may appear inside a
/// larger constraint expression).
fn is_ignore_constraint(line: &str) -> bool {
    let line = line.trim_start_matches(['/', '*', ' ', '\t']);
    let expr = if let Some(rest) = line.strip_prefix("+build") {
        rest
    } else if let Some(rest) = line.strip_prefix("go:build") {
        rest
    } else {
        return false;
    };
    expr.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
        .any(|tag| tag == IGNORE_TAG)
}

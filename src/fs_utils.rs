//! Filesystem helpers for GOPATH-style workspaces
//!
//! - `to_slash`: render a relative path as a `/`-separated import path
//! - `list_subdirs`: sorted child directories that can hold Go packages
//! - `copy_package_files`: copy one package directory (files only)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// True for directory names the Go tool never treats as packages:
/// `testdata` and names starting with `.` or `_`.
pub fn is_ignored_dir_name(name: &str) -> bool {
    name == "testdata" || name.starts_with('.') || name.starts_with('_')
}

/// Child directories of `dir` that may hold packages, sorted by name.
pub fn list_subdirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if is_ignored_dir_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        dirs.push(entry.path());
    }
    dirs.sort();
    Ok(dirs)
}

/// Regular files directly inside `dir`, sorted by name.
pub fn list_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// True for Go test sources (`*_test.go`).
pub fn is_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("_test.go"))
}

/// Copy the regular files of one package directory into `dst`.
///
/// Subdirectories are not copied; each package is provisioned on its own.
/// Test sources are skipped unless `keep_tests` is set. Copies are made
/// writable, since sources may come from a read-only module cache. Returns
/// the number of files copied.
#[allow(clippy::permissions_set_readonly_false)]
pub fn copy_package_files(src: &Path, dst: &Path, keep_tests: bool) -> io::Result<usize> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;
    for file in list_files(src)? {
        if !keep_tests && is_test_file(&file) {
            continue;
        }
        if let Some(name) = file.file_name() {
            let target = dst.join(name);
            fs::copy(&file, &target)?;
            let mut perms = fs::metadata(&target)?.permissions();
            if perms.readonly() {
                perms.set_readonly(false);
                fs::set_permissions(&target, perms)?;
            }
            copied += 1;
        }
    }
    Ok(copied)
}

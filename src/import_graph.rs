//! Import graph over the scratch workspace and the standard library
//!
//! Workspace packages are all scanned; standard library packages under
//! `$GOROOT/src` join the graph only when reached by a forward edge.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::eligibility::{is_build_ignored, is_candidate_source};
use crate::error::{ObfuscateError, Result};
use crate::fs_utils::list_files;
use crate::syntax::GoFile;
use crate::workspace::Workspace;

/// Where a package's sources were found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageOrigin {
    Workspace,
    Goroot,
}

#[derive(Debug, Clone)]
pub struct PackageNode {
    pub dir: PathBuf,
    pub origin: PackageOrigin,
}

/// Forward and backward import edges between resolved packages.
#[derive(Debug, Default)]
pub struct ImportGraph {
    packages: BTreeMap<String, PackageNode>,
    forward: BTreeMap<String, BTreeSet<String>>,
    backward: BTreeMap<String, BTreeSet<String>>,
}

impl ImportGraph {
    /// Build the graph for every package directory in the workspace.
    pub fn build(workspace: &Workspace, include_tests: bool) -> Result<Self> {
        let mut graph = Self::default();
        let mut pending: VecDeque<String> = VecDeque::new();

        for dir in workspace.package_dirs()? {
            if let Some(package) = workspace.package_path(&dir) {
                graph.packages.insert(
                    package.clone(),
                    PackageNode {
                        dir,
                        origin: PackageOrigin::Workspace,
                    },
                );
                pending.push_back(package);
            }
        }

        while !pending.is_empty() {
            let batch: Vec<String> = pending.drain(..).collect();
            let scanned: Vec<(String, BTreeSet<String>)> = batch
                .par_iter()
                .map(|package| {
                    let node = &graph.packages[package];
                    let tests = include_tests && node.origin == PackageOrigin::Workspace;
                    package_imports(&node.dir, tests).map(|imports| (package.clone(), imports))
                })
                .collect::<Result<_>>()?;

            for (package, imports) in scanned {
                for import in imports {
                    if import == "C" {
                        continue;
                    }
                    if !graph.packages.contains_key(&import) {
                        match resolve_external(workspace, &import)? {
                            Some(node) => {
                                graph.packages.insert(import.clone(), node);
                                pending.push_back(import.clone());
                            }
                            None => continue,
                        }
                    }
                    graph.add_edge(&package, &import);
                }
            }
        }

        tracing::debug!(
            "import graph: {} packages, {} edges",
            graph.packages.len(),
            graph.forward.values().map(BTreeSet::len).sum::<usize>()
        );
        Ok(graph)
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        self.forward
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
        self.backward
            .entry(to.to_string())
            .or_default()
            .insert(from.to_string());
    }

    pub fn contains(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    pub fn package(&self, package: &str) -> Option<&PackageNode> {
        self.packages.get(package)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn imports_of(&self, package: &str) -> impl Iterator<Item = &str> {
        self.forward
            .get(package)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    pub fn importers_of(&self, package: &str) -> impl Iterator<Item = &str> {
        self.backward
            .get(package)
            .into_iter()
            .flat_map(|s| s.iter().map(String::as_str))
    }

    /// Packages reachable from `seeds` over forward and backward edges.
    pub fn closure<S: AsRef<str>>(&self, seeds: &[S]) -> Result<BTreeSet<String>> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();
        for seed in seeds {
            let seed = seed.as_ref();
            if !self.contains(seed) {
                return Err(ObfuscateError::ClosureResolutionFailure {
                    message: format!("package {} is not in the workspace", seed),
                });
            }
            if seen.insert(seed.to_string()) {
                queue.push_back(seed.to_string());
            }
        }

        while let Some(package) = queue.pop_front() {
            let neighbours: Vec<String> = self
                .imports_of(&package)
                .chain(self.importers_of(&package))
                .map(str::to_string)
                .collect();
            for next in neighbours {
                if seen.insert(next.clone()) {
                    queue.push_back(next);
                }
            }
        }
        Ok(seen)
    }
}

/// Union of imports over the eligible Go files of one directory.
fn package_imports(dir: &Path, include_tests: bool) -> Result<BTreeSet<String>> {
    let mut imports = BTreeSet::new();
    for path in list_files(dir)? {
        if !is_candidate_source(&path, include_tests) {
            continue;
        }
        let file = GoFile::read(&path)?;
        if is_build_ignored(&file) {
            continue;
        }
        imports.extend(file.imports());
    }
    Ok(imports)
}

/// Resolve an import outside the workspace against GOROOT.
fn resolve_external(workspace: &Workspace, import: &str) -> Result<Option<PackageNode>> {
    let Some(goroot) = workspace.goroot() else {
        return Err(ObfuscateError::ClosureResolutionFailure {
            message: format!("cannot find package {} (no GOROOT configured)", import),
        });
    };

    let src = goroot.join("src");
    for base in [src.clone(), src.join("vendor")] {
        let dir = import.split('/').fold(base, |d, part| d.join(part));
        if dir.is_dir() {
            return Ok(Some(PackageNode {
                dir,
                origin: PackageOrigin::Goroot,
            }));
        }
    }
    Err(ObfuscateError::ClosureResolutionFailure {
        message: format!(
            "cannot find package {} in workspace or {}",
            import,
            goroot.display()
        ),
    })
}

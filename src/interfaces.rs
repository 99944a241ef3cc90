//! Interface-method guard
//!
//! Go satisfies interfaces structurally: a method anywhere in the graph can
//! implement an interface declared in any other package with no syntax
//! linking the two. Any method name that appears in an interface reachable
//! from the target package is therefore never renamed.

use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::eligibility::{is_build_ignored, is_candidate_source};
use crate::error::Result;
use crate::fs_utils::list_files;
use crate::import_graph::{ImportGraph, PackageOrigin};
use crate::syntax::GoFile;
use crate::workspace::Workspace;

/// Methods of predeclared interfaces, which never appear in parsed sources.
const PREDECLARED_INTERFACE_METHODS: &[&str] = &["Error"];

/// Plain method names that must keep their spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceMethodSet {
    names: BTreeSet<String>,
}

impl InterfaceMethodSet {
    /// A set holding only the predeclared interface methods.
    pub fn predeclared() -> Self {
        Self {
            names: PREDECLARED_INTERFACE_METHODS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Collect interface members across the import closure of `target`.
    pub fn for_target(workspace: &Workspace, target: &str, include_tests: bool) -> Result<Self> {
        let graph = ImportGraph::build(workspace, include_tests)?;
        let closure = graph.closure(&[target])?;
        tracing::info!("interface closure of {}: {} packages", target, closure.len());
        Self::from_closure(&graph, &closure, include_tests)
    }

    /// Collect interface members from every package in `closure`.
    pub fn from_closure(
        graph: &ImportGraph,
        closure: &BTreeSet<String>,
        include_tests: bool,
    ) -> Result<Self> {
        let packages: Vec<&String> = closure.iter().collect();
        let per_package: Vec<Vec<String>> = packages
            .par_iter()
            .map(|package| {
                let Some(node) = graph.package(package) else {
                    return Ok(Vec::new());
                };
                let tests = include_tests && node.origin == PackageOrigin::Workspace;
                let mut names = Vec::new();
                for path in list_files(&node.dir)? {
                    if !is_candidate_source(&path, tests) {
                        continue;
                    }
                    let file = GoFile::read(&path)?;
                    if is_build_ignored(&file) {
                        continue;
                    }
                    match node.origin {
                        PackageOrigin::Workspace => file.ensure_well_formed()?,
                        PackageOrigin::Goroot => {
                            if let Err(e) = file.ensure_well_formed() {
                                tracing::warn!("partial parse of standard library file: {}", e);
                            }
                        }
                    }
                    names.extend(file.interface_method_names());
                }
                Ok(names)
            })
            .collect::<Result<_>>()?;

        let mut set = Self::predeclared();
        set.names.extend(per_package.into_iter().flatten());
        tracing::debug!("{} interface method names guarded", set.names.len());
        Ok(set)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

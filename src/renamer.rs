//! Rename primitive adapters
//!
//! The primitive rewrites a declaration and every reference to it across the
//! whole workspace, or fails without partial effect. The pipeline treats it
//! as a black box behind [`RenamePrimitive`].

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{ObfuscateError, Result};
use crate::symbols::QualifiedName;
use crate::toolchain::{gopath_command, locate, run};

/// Whole-program symbol and package path rewriting.
pub trait RenamePrimitive {
    /// Rename the symbol `from` to the plain identifier `to`.
    fn move_symbol(&mut self, from: &QualifiedName, to: &str) -> Result<()>;

    /// Move the package at import path `from` to import path `to`.
    fn move_path(&mut self, from: &str, to: &str) -> Result<()>;

    /// False for adapters that only record requests.
    fn applies_changes(&self) -> bool {
        true
    }
}

/// `gorename` and `gomvpkg` run against a scratch GOPATH.
#[derive(Debug, Clone)]
pub struct GoToolsRenamer {
    gorename: PathBuf,
    gomvpkg: PathBuf,
    gopath: PathBuf,
}

impl GoToolsRenamer {
    pub fn new(
        gorename: impl Into<PathBuf>,
        gomvpkg: impl Into<PathBuf>,
        gopath: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gorename: gorename.into(),
            gomvpkg: gomvpkg.into(),
            gopath: gopath.into(),
        }
    }

    /// Resolve both tools from configured paths or `PATH`.
    pub fn locate(
        gorename: Option<&Path>,
        gomvpkg: Option<&Path>,
        gopath: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self::new(
            locate("gorename", gorename)?,
            locate("gomvpkg", gomvpkg)?,
            gopath,
        ))
    }
}

impl RenamePrimitive for GoToolsRenamer {
    fn move_symbol(&mut self, from: &QualifiedName, to: &str) -> Result<()> {
        let from = from.to_string();
        let mut cmd = gopath_command(&self.gorename, &self.gopath);
        cmd.args(["-from", &from, "-to", to, "-force"]);
        run(&mut cmd, |message| ObfuscateError::RenamePrimitiveFailure {
            from: from.clone(),
            to: to.to_string(),
            message,
        })
        .map(|_| ())
    }

    fn move_path(&mut self, from: &str, to: &str) -> Result<()> {
        let mut cmd = gopath_command(&self.gomvpkg, &self.gopath);
        cmd.args(["-from", from, "-to", to]);
        run(&mut cmd, |message| ObfuscateError::PathRenameFailure {
            from: from.to_string(),
            to: to.to_string(),
            message,
        })
        .map(|_| ())
    }
}

/// A request seen by [`DryRunRenamer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenameOp {
    Symbol { from: String, to: String },
    Path { from: String, to: String },
}

/// Records requests without touching the workspace.
#[derive(Debug, Clone, Default)]
pub struct DryRunRenamer {
    ops: Vec<RenameOp>,
}

impl DryRunRenamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[RenameOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<RenameOp> {
        self.ops
    }
}

impl RenamePrimitive for DryRunRenamer {
    fn move_symbol(&mut self, from: &QualifiedName, to: &str) -> Result<()> {
        self.ops.push(RenameOp::Symbol {
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(())
    }

    fn move_path(&mut self, from: &str, to: &str) -> Result<()> {
        self.ops.push(RenameOp::Path {
            from: from.to_string(),
            to: to.to_string(),
        });
        Ok(())
    }

    fn applies_changes(&self) -> bool {
        false
    }
}

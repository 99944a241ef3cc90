//! gobfuscate: keyed source-level obfuscation for Go programs
//!
//! The library plans and applies three passes over a scratch GOPATH
//! workspace holding a copy of the target's dependency tree:
//!
//! - symbols: program-defined functions, types, package-level vars/consts and
//!   methods get keyed replacement names, except where renaming could break
//!   implicit interface satisfaction or pick the wrong build-tag variant
//! - package paths: directories are renamed shallow-first, one depth level
//!   at a time
//! - literals: string literals become closures that rebuild the value at
//!   run time
//!
//! Rewriting references is delegated to a [`RenamePrimitive`]; the stock
//! adapter drives `gorename` and `gomvpkg`.
//!
//! # Example
//!
//! ```ignore
//! use gobfuscate::{run_pipeline, DryRunRenamer, Encrypter, PipelineOptions, Workspace};
//!
//! let workspace = Workspace::new("/tmp/scratch");
//! let encrypter = Encrypter::from_key_str("secret")?;
//! let options = PipelineOptions::new("example.com/app", ["github.com/acme"]);
//! let report = run_pipeline(&workspace, &encrypter, &options, &mut DryRunRenamer::new())?;
//! println!("entry package: {}", report.entry);
//! ```

pub mod cli;
pub mod config;
pub mod eligibility;
pub mod encrypter;
pub mod error;
pub mod fs_utils;
pub mod import_graph;
pub mod interfaces;
pub mod packages;
pub mod pipeline;
pub mod progress;
pub mod provision;
pub mod renamer;
pub mod strings;
pub mod symbols;
pub mod syntax;
pub mod toolchain;
pub mod workspace;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use config::ObfuscateConfig;
pub use eligibility::{classify_dir, DirClass, PackageFilter};
pub use encrypter::Encrypter;
pub use error::{ObfuscateError, Result};
pub use import_graph::ImportGraph;
pub use interfaces::InterfaceMethodSet;
pub use packages::{rename_packages, PathMove, PathReport};
pub use pipeline::{run_pipeline, ObfuscationReport, PassContext, PipelineOptions};
pub use renamer::{DryRunRenamer, GoToolsRenamer, RenameOp, RenamePrimitive};
pub use strings::{obfuscate_strings, StringReport};
pub use symbols::{
    obfuscate_symbols, plan_methods, plan_top_level, QualifiedName, RenamePlan, RenameRequest,
};
pub use syntax::{DeclKind, GoFile};
pub use workspace::Workspace;

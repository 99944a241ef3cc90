//! Symbol plan builder
//!
//! Two declaration-only scans (top-level names, then methods) produce
//! candidate rename requests. Candidates are counted by old identity and only
//! identities seen exactly once survive: build-tag variants that both declare
//! a name make the name ambiguous, and an ambiguous name is never renamed.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

use crate::eligibility::is_excluded_file;
use crate::error::Result;
use crate::fs_utils::is_test_file;
use crate::interfaces::InterfaceMethodSet;
use crate::pipeline::PassContext;
use crate::progress;
use crate::renamer::RenamePrimitive;
use crate::syntax::{DeclKind, Declaration, GoFile};
use crate::workspace::SourceFile;

/// Functions invoked by fixed name from the runtime or the build system.
const ENTRY_POINTS: &[&str] = &["main", "init"];

/// Prefixes of functions the test driver discovers by name.
const TEST_ENTRY_PREFIXES: &[&str] = &["Test", "Benchmark", "Example", "Fuzz"];

/// Identity of a symbol: package path, optional receiver type, plain name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct QualifiedName {
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub name: String,
}

impl QualifiedName {
    pub fn top_level(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            receiver: None,
            name: name.into(),
        }
    }

    pub fn method(
        package: impl Into<String>,
        receiver: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            package: package.into(),
            receiver: Some(receiver.into()),
            name: name.into(),
        }
    }
}

/// Renders in the rename tool's query syntax: `"pkg".Name` or
/// `"pkg".Recv.Name`.
impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(receiver) => write!(f, "\"{}\".{}.{}", self.package, receiver, self.name),
            None => write!(f, "\"{}\".{}", self.package, self.name),
        }
    }
}

/// One accepted (old identity, new name) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRequest {
    pub old: QualifiedName,
    pub new_name: String,
    pub kind: DeclKind,
}

/// Candidate multiset keyed by old identity.
#[derive(Debug, Default)]
pub struct CandidateSet {
    entries: BTreeMap<QualifiedName, (RenameRequest, usize)>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, request: RenameRequest) {
        self.entries
            .entry(request.old.clone())
            .and_modify(|(_, count)| *count += 1)
            .or_insert((request, 1));
    }

    pub fn extend(&mut self, requests: impl IntoIterator<Item = RenameRequest>) {
        for request in requests {
            self.record(request);
        }
    }

    /// Number of times `old` was recorded.
    pub fn count(&self, old: &QualifiedName) -> usize {
        self.entries.get(old).map_or(0, |(_, count)| *count)
    }

    /// Keep identities recorded exactly once; everything else is discarded.
    pub fn into_plan(self) -> RenamePlan {
        let mut plan = RenamePlan::default();
        for (old, (request, count)) in self.entries {
            if count == 1 {
                plan.requests.push(request);
            } else {
                tracing::debug!("discarding ambiguous rename of {} ({} declarations)", old, count);
                plan.discarded.push(old);
            }
        }
        plan
    }
}

/// Ordered, deduplicated rename requests for one scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenamePlan {
    pub requests: Vec<RenameRequest>,
    /// Identities dropped because they were declared more than once
    pub discarded: Vec<QualifiedName>,
    /// Methods kept because an interface in the closure names them
    pub guarded: Vec<QualifiedName>,
}

impl RenamePlan {
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn get(&self, old: &QualifiedName) -> Option<&RenameRequest> {
        self.requests.iter().find(|r| &r.old == old)
    }

    pub fn contains(&self, old: &QualifiedName) -> bool {
        self.get(old).is_some()
    }
}

/// Both symbol plans as they were applied.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolReport {
    pub top_level: RenamePlan,
    pub methods: RenamePlan,
    pub interface_methods: usize,
}

fn is_entry_point(name: &str) -> bool {
    ENTRY_POINTS.contains(&name)
}

/// `TestXxx`, `BenchmarkXxx`, `ExampleXxx`, `FuzzXxx` and `TestMain` in a
/// test file. The suffix must not start with a lowercase letter.
fn is_test_entry_point(name: &str) -> bool {
    TEST_ENTRY_PREFIXES.iter().any(|prefix| {
        name.strip_prefix(prefix)
            .is_some_and(|rest| !rest.starts_with(|c: char| c.is_lowercase()))
    })
}

/// Run `scan` over every eligible file and merge the results.
fn scan_sources<F>(sources: &[SourceFile], scan: F) -> Result<CandidateSet>
where
    F: Fn(&SourceFile, &GoFile) -> Vec<RenameRequest> + Sync,
{
    let per_file: Vec<Vec<RenameRequest>> = sources
        .par_iter()
        .map(|source| {
            let file = GoFile::read(&source.path)?;
            if is_excluded_file(&file) {
                tracing::debug!("excluded by header: {}", source.path.display());
                return Ok(Vec::new());
            }
            file.ensure_well_formed()?;
            Ok(scan(source, &file))
        })
        .collect::<Result<_>>()?;

    let mut candidates = CandidateSet::new();
    for requests in per_file {
        candidates.extend(requests);
    }
    Ok(candidates)
}

fn skip_function(source: &SourceFile, decl: &Declaration) -> bool {
    decl.name == "_"
        || is_entry_point(&decl.name)
        || (is_test_file(&source.path) && is_test_entry_point(&decl.name))
}

/// Top-level scan: functions without receivers, types, package vars/consts.
pub fn plan_top_level(ctx: &PassContext) -> Result<RenamePlan> {
    let sources = ctx
        .workspace
        .analyzable_sources(ctx.include_tests, |p| ctx.filter.matches(p))?;

    let candidates = scan_sources(&sources, |source, file| {
        file.top_level_declarations()
            .into_iter()
            .filter(|decl| match decl.kind {
                DeclKind::Function => !skip_function(source, decl),
                _ => decl.name != "_",
            })
            .map(|decl| RenameRequest {
                old: QualifiedName::top_level(&source.package, &decl.name),
                new_name: ctx.encrypter.encrypt(&decl.name),
                kind: decl.kind,
            })
            .collect()
    })?;
    Ok(candidates.into_plan())
}

/// Method scan. Methods whose names appear in `guard` are left out.
pub fn plan_methods(ctx: &PassContext, guard: &InterfaceMethodSet) -> Result<RenamePlan> {
    let sources = ctx
        .workspace
        .analyzable_sources(ctx.include_tests, |p| ctx.filter.matches(p))?;

    let candidates = scan_sources(&sources, |source, file| {
        file.method_declarations()
            .into_iter()
            .filter(|decl| !skip_function(source, decl))
            .filter_map(|decl| {
                let receiver = decl.receiver?;
                Some(RenameRequest {
                    old: QualifiedName::method(&source.package, receiver, &decl.name),
                    new_name: ctx.encrypter.encrypt(&decl.name),
                    kind: DeclKind::Method,
                })
            })
            .collect()
    })?;

    let mut plan = candidates.into_plan();
    let (kept, guarded): (Vec<_>, Vec<_>) = plan
        .requests
        .into_iter()
        .partition(|r| !guard.contains(&r.old.name));
    plan.requests = kept;
    plan.guarded = guarded.into_iter().map(|r| r.old).collect();
    Ok(plan)
}

/// Hand every request to the rename primitive in plan order.
///
/// The first failure aborts the remaining requests.
pub fn apply_plan(
    plan: &RenamePlan,
    renamer: &mut dyn RenamePrimitive,
    label: &str,
    show_progress: bool,
) -> Result<()> {
    let bar = progress::bar(plan.len() as u64, label, show_progress);
    for request in &plan.requests {
        tracing::debug!("rename {} -> {}", request.old, request.new_name);
        bar.set_message(request.old.name.clone());
        renamer.move_symbol(&request.old, &request.new_name)?;
        bar.inc(1);
    }
    bar.finish_and_clear();
    Ok(())
}

/// Symbol pass: top-level plan, then the interface guard, then methods.
///
/// The guard and the method scan run after top-level renames are applied so
/// receiver type names are read from the rewritten sources.
pub fn obfuscate_symbols(
    ctx: &PassContext,
    target: &str,
    renamer: &mut dyn RenamePrimitive,
) -> Result<SymbolReport> {
    let top_level = plan_top_level(ctx)?;
    tracing::info!(
        "renaming {} top-level symbols ({} ambiguous)",
        top_level.len(),
        top_level.discarded.len()
    );
    apply_plan(&top_level, renamer, "symbols", ctx.show_progress)?;

    let guard = InterfaceMethodSet::for_target(ctx.workspace, target, ctx.include_tests)?;
    let methods = plan_methods(ctx, &guard)?;
    tracing::info!(
        "renaming {} methods ({} guarded by interfaces, {} ambiguous)",
        methods.len(),
        methods.guarded.len(),
        methods.discarded.len()
    );
    apply_plan(&methods, renamer, "methods", ctx.show_progress)?;

    Ok(SymbolReport {
        top_level,
        methods,
        interface_methods: guard.len(),
    })
}

//! Package path renamer
//!
//! Breadth-first over directory depth. Each level is listed fresh from the
//! live tree, fanned out per parent directory, and fully collected before
//! any move at that level is issued. A directory's final name is only known
//! once its parent has been moved, so level `d + 1` is listed after every
//! move at level `d` has completed.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::eligibility::{classify_dir, DirClass};
use crate::error::{ObfuscateError, Result};
use crate::fs_utils::list_subdirs;
use crate::pipeline::PassContext;
use crate::progress;
use crate::renamer::RenamePrimitive;

/// Suffix of the temporary alias used to route unsupported packages
/// through the move machinery.
const ALIAS_SUFFIX: &str = "copy";

/// One directory handled by the path pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathMove {
    pub depth: usize,
    pub from: String,
    pub to: String,
    /// Set when the move went through a temporary alias and back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PathReport {
    pub moves: Vec<PathMove>,
    pub levels: usize,
}

impl PathReport {
    pub fn renamed(&self) -> usize {
        self.moves.iter().filter(|m| m.alias.is_none()).count()
    }

    pub fn aliased(&self) -> usize {
        self.moves.iter().filter(|m| m.alias.is_some()).count()
    }

    /// Follow `package` through the recorded moves, one component at a time.
    ///
    /// Components whose directory kept its name (unsupported packages, or
    /// paths the pass never saw) are carried over unchanged.
    pub fn resolve(&self, package: &str) -> String {
        let mut current = String::new();
        for component in package.split('/').filter(|c| !c.is_empty()) {
            let candidate = join_rel(&current, component);
            current = self
                .moves
                .iter()
                .find(|m| m.from == candidate)
                .map_or(candidate, |m| m.to.clone());
        }
        current
    }
}

/// Directories exactly `depth` levels below `src`, sorted.
///
/// Every step fans out over the parents found so far and joins before the
/// next step.
pub fn list_level(src: &Path, depth: usize) -> Result<Vec<PathBuf>> {
    let mut frontier = vec![src.to_path_buf()];
    for _ in 0..depth {
        let children: Vec<Vec<PathBuf>> = frontier
            .par_iter()
            .map(|dir| list_subdirs(dir))
            .collect::<std::io::Result<_>>()?;
        frontier = children.into_iter().flatten().collect();
        if frontier.is_empty() {
            break;
        }
    }
    frontier.sort();
    Ok(frontier)
}

/// First `<rel>copy`, `<rel>copy1`, ... that does not exist yet.
fn alias_for(src: &Path, rel: &str) -> String {
    let mut n = 0usize;
    loop {
        let candidate = if n == 0 {
            format!("{}{}", rel, ALIAS_SUFFIX)
        } else {
            format!("{}{}{}", rel, ALIAS_SUFFIX, n)
        };
        let on_disk = candidate.split('/').fold(src.to_path_buf(), |d, p| d.join(p));
        if !on_disk.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn split_rel(rel: &str) -> (&str, &str) {
    match rel.rsplit_once('/') {
        Some((parent, base)) => (parent, base),
        None => ("", rel),
    }
}

fn join_rel(parent: &str, base: &str) -> String {
    if parent.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", parent, base)
    }
}

/// Names present in `dir` (any entry type).
fn entry_names(dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        names.insert(entry?.file_name().to_string_lossy().to_string());
    }
    Ok(names)
}

/// A planned move and the on-disk directory that holds the moved entry.
#[derive(Debug, Clone)]
struct PlannedMove {
    parent_dir: PathBuf,
    path_move: PathMove,
}

/// Reject a level whose new names clash with each other or with existing
/// entries under the same parent.
fn check_collisions(planned: &[PlannedMove]) -> Result<()> {
    let mut by_parent: BTreeMap<&Path, Vec<&PathMove>> = BTreeMap::new();
    for p in planned {
        by_parent.entry(&p.parent_dir).or_default().push(&p.path_move);
    }

    for (parent_dir, group) in by_parent {
        let existing = entry_names(parent_dir)?;
        let mut finals: BTreeMap<&str, &str> = BTreeMap::new();
        for m in group {
            let (_, old_base) = split_rel(&m.from);
            let (_, new_base) = split_rel(&m.to);
            if let Some(other) = finals.insert(new_base, &m.from) {
                return Err(ObfuscateError::PathRenameFailure {
                    from: m.from.clone(),
                    to: m.to.clone(),
                    message: format!("encrypted name collides with the new name of {}", other),
                });
            }
            if new_base != old_base && existing.contains(new_base) {
                return Err(ObfuscateError::PathRenameFailure {
                    from: m.from.clone(),
                    to: m.to.clone(),
                    message: format!("{} already exists under {}", new_base, parent_dir.display()),
                });
            }
        }
    }
    Ok(())
}

/// Plan the moves for one level of the live tree.
///
/// With `translate` the tree still carries its original names (nothing was
/// moved), so parents are mapped through the moves planned so far and the
/// plan names the paths a real run would see.
fn plan_level(
    ctx: &PassContext,
    src: &Path,
    depth: usize,
    dirs: &[PathBuf],
    planned_so_far: &PathReport,
    translate: bool,
) -> Result<Vec<PlannedMove>> {
    let classes: Vec<DirClass> = dirs
        .par_iter()
        .map(|dir| classify_dir(dir))
        .collect::<Result<_>>()?;

    let mut planned = Vec::with_capacity(dirs.len());
    for (dir, class) in dirs.iter().zip(classes) {
        let Some(disk_rel) = ctx.workspace.package_path(dir) else {
            continue;
        };
        let (disk_parent, base) = split_rel(&disk_rel);
        let parent = if translate {
            planned_so_far.resolve(disk_parent)
        } else {
            disk_parent.to_string()
        };
        let rel = join_rel(&parent, base);
        let path_move = match class {
            DirClass::Unsupported => {
                let alias = alias_for(src, &disk_rel);
                let (_, alias_base) = split_rel(&alias);
                PathMove {
                    depth,
                    alias: Some(join_rel(&parent, alias_base)),
                    to: rel.clone(),
                    from: rel,
                }
            }
            DirClass::Analyzable => PathMove {
                depth,
                to: join_rel(&parent, &ctx.encrypter.encrypt(base)),
                from: rel,
                alias: None,
            },
        };
        let parent_dir = dir
            .parent()
            .map_or_else(|| src.to_path_buf(), Path::to_path_buf);
        planned.push(PlannedMove {
            parent_dir,
            path_move,
        });
    }
    Ok(planned)
}

/// Rename every package directory under the workspace `src/`, shallow levels
/// first. Unsupported directories keep their path.
pub fn rename_packages(ctx: &PassContext, renamer: &mut dyn RenamePrimitive) -> Result<PathReport> {
    let src = ctx.workspace.src_dir();
    let translate = !renamer.applies_changes();
    let mut report = PathReport::default();
    let mut depth = 1;

    loop {
        let dirs = list_level(&src, depth)?;
        if dirs.is_empty() {
            break;
        }
        let planned = plan_level(ctx, &src, depth, &dirs, &report, translate)?;
        check_collisions(&planned)?;
        let moves: Vec<PathMove> = planned.into_iter().map(|p| p.path_move).collect();
        tracing::info!("package level {}: {} directories", depth, moves.len());

        let bar = progress::bar(moves.len() as u64, "packages", ctx.show_progress);
        for m in &moves {
            bar.set_message(m.from.clone());
            match &m.alias {
                Some(alias) => {
                    tracing::debug!("moving unsupported package {} via {}", m.from, alias);
                    renamer.move_path(&m.from, alias)?;
                    renamer.move_path(alias, &m.to)?;
                }
                None => {
                    tracing::debug!("move {} -> {}", m.from, m.to);
                    renamer.move_path(&m.from, &m.to)?;
                }
            }
            bar.inc(1);
        }
        bar.finish_and_clear();

        report.moves.extend(moves);
        report.levels = depth;
        depth += 1;
    }
    Ok(report)
}

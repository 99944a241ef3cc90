//! Literal obfuscator
//!
//! Each eligible string literal is replaced in place by a closure call that
//! rebuilds the value at run time from a mask and the masked bytes. The mask
//! is the run's keystream for a per-site nonce, so no two sites share one.
//! Replacements stay on the literal's line.

use std::fs;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;

use crate::eligibility::is_excluded_file;
use crate::encrypter::Encrypter;
use crate::error::Result;
use crate::fs_utils::to_slash;
use crate::pipeline::PassContext;
use crate::syntax::literal::hex_escaped;
use crate::syntax::{GoFile, LiteralSite};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StringReport {
    pub files_rewritten: usize,
    pub literals: usize,
}

/// Go expression that evaluates to the bytes `mask ^ masked`.
pub fn decode_expression(mask: &[u8], masked: &[u8]) -> String {
    format!(
        "(func() string {{ mask := []byte({}); maskedStr := []byte({}); res := make([]byte, {}); for i, m := range mask {{ res[i] = m ^ maskedStr[i] }}; return string(res) }}())",
        hex_escaped(mask),
        hex_escaped(masked),
        masked.len()
    )
}

fn site_nonce(file_id: &str, site: &LiteralSite) -> String {
    format!("{}:{}", file_id, site.start_byte)
}

/// Rewrite every eligible literal of `file`. `file_id` seeds the per-site
/// nonces. Returns `None` when nothing was replaced.
pub fn rewrite_source(
    encrypter: &Encrypter,
    file_id: &str,
    file: &GoFile,
) -> Option<(String, usize)> {
    let sites = file.string_literals();
    if sites.is_empty() {
        return None;
    }

    let mut out = file.source().to_string();
    // Back to front so earlier byte offsets stay valid.
    for site in sites.iter().rev() {
        let nonce = site_nonce(file_id, site);
        let mask = encrypter.keystream(nonce.as_bytes(), site.value.len());
        let masked = encrypter.seal(nonce.as_bytes(), &site.value);
        out.replace_range(site.start_byte..site.end_byte, &decode_expression(&mask, &masked));
    }
    Some((out, sites.len()))
}

fn rewrite_file(encrypter: &Encrypter, src: &Path, path: &Path, write: bool) -> Result<usize> {
    let file = GoFile::read(path)?;
    if is_excluded_file(&file) {
        return Ok(0);
    }
    file.ensure_well_formed()?;

    let file_id = path
        .strip_prefix(src)
        .map(to_slash)
        .unwrap_or_else(|_| to_slash(path));
    match rewrite_source(encrypter, &file_id, &file) {
        Some((source, count)) => {
            if write {
                fs::write(path, source)?;
            }
            tracing::debug!("{}: {} literals", file_id, count);
            Ok(count)
        }
        None => Ok(0),
    }
}

/// Literal pass over every analyzable package in the workspace.
///
/// Runs after package paths are renamed, so the package filter no longer
/// applies; files are selected by eligibility alone. In a dry run the
/// literals are counted but files are left as they are.
pub fn obfuscate_strings(ctx: &PassContext) -> Result<StringReport> {
    let src = ctx.workspace.src_dir();
    let sources = ctx.workspace.analyzable_sources(ctx.include_tests, |_| true)?;

    let counts: Vec<usize> = sources
        .par_iter()
        .map(|source| rewrite_file(ctx.encrypter, &src, &source.path, !ctx.dry_run))
        .collect::<Result<_>>()?;

    let report = StringReport {
        files_rewritten: counts.iter().filter(|&&c| c > 0).count(),
        literals: counts.iter().sum(),
    };
    tracing::info!(
        "obfuscated {} literals in {} files",
        report.literals,
        report.files_rewritten
    );
    Ok(report)
}

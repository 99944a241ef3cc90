//! Go toolchain invocation
//!
//! Every command that runs against the scratch workspace gets
//! `GOPATH=<scratch>` and `GO111MODULE=off`, so the tools resolve imports
//! from the provisioned copy and never from a module cache.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ObfuscateError, Result};

/// A package reported by `go list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedPackage {
    pub import_path: String,
    pub dir: PathBuf,
}

/// Resolve a tool from an explicit path or from `PATH`.
pub fn locate(tool: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ObfuscateError::ToolNotFound {
            tool: format!("{} (configured at {})", tool, path.display()),
        });
    }
    which::which(tool).map_err(|_| ObfuscateError::ToolNotFound {
        tool: tool.to_string(),
    })
}

/// A command for `program` bound to a GOPATH-mode workspace.
pub fn gopath_command(program: &Path, gopath: &Path) -> Command {
    let mut cmd = Command::new(program);
    cmd.env("GOPATH", gopath)
        .env("GO111MODULE", "off")
        .env("GOFLAGS", "");
    cmd
}

/// Run a command and return trimmed stdout.
///
/// A spawn failure or non-zero exit is turned into an error by `on_error`,
/// which receives trimmed stderr (or stdout when stderr is empty).
pub fn run<F>(cmd: &mut Command, on_error: F) -> Result<String>
where
    F: FnOnce(String) -> ObfuscateError,
{
    let output = match cmd.output() {
        Ok(output) => output,
        Err(e) => {
            return Err(on_error(format!(
                "failed to execute {:?}: {}",
                cmd.get_program(),
                e
            )))
        }
    };
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(on_error(format!("{} ({})", detail, output.status)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// The `go` binary plus the operations the pipeline needs from it.
#[derive(Debug, Clone)]
pub struct GoTool {
    go: PathBuf,
}

impl GoTool {
    pub fn new(go: impl Into<PathBuf>) -> Self {
        Self { go: go.into() }
    }

    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        locate("go", configured).map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.go
    }

    /// `go env GOROOT`
    pub fn goroot(&self) -> Result<PathBuf> {
        let out = run(Command::new(&self.go).args(["env", "GOROOT"]), |message| {
            ObfuscateError::ProvisionFailure { message }
        })?;
        if out.is_empty() {
            return Err(ObfuscateError::ProvisionFailure {
                message: "go env GOROOT returned nothing".to_string(),
            });
        }
        Ok(PathBuf::from(out))
    }

    /// Non-standard packages in the dependency tree of `package`, the
    /// package itself included. With `include_tests` the dependencies of its
    /// test files are listed too. Runs in the caller's environment.
    pub fn list_dependencies(
        &self,
        package: &str,
        include_tests: bool,
    ) -> Result<Vec<ListedPackage>> {
        let out = run(
            Command::new(&self.go).args(list_args(package, include_tests)),
            |message| ObfuscateError::ProvisionFailure {
                message: format!("go list {}: {}", package, message),
            },
        )?;
        Ok(parse_list_output(&out))
    }

    /// `go build` of the entry package inside the scratch GOPATH.
    pub fn build(&self, gopath: &Path, entry: &str, output: &Path, ldflags: &str) -> Result<()> {
        let mut cmd = gopath_command(&self.go, gopath);
        cmd.current_dir(gopath).arg("build");
        if !ldflags.is_empty() {
            cmd.args(["-ldflags", ldflags]);
        }
        cmd.arg("-o").arg(output).arg(entry);
        tracing::info!("building {} -> {}", entry, output.display());
        run(&mut cmd, |message| ObfuscateError::BuildFailure { message }).map(|_| ())
    }
}

fn list_args(package: &str, include_tests: bool) -> Vec<&str> {
    let mut args = vec!["list", "-deps"];
    if include_tests {
        args.push("-test");
    }
    args.extend([
        "-f",
        "{{if not .Standard}}{{.ImportPath}}\t{{.Dir}}{{end}}",
        package,
    ]);
    args
}

/// Parse `ImportPath<TAB>Dir` lines. Test variants (`p [p.test]`) collapse
/// onto their package and synthetic `p.test` mains are dropped.
fn parse_list_output(out: &str) -> Vec<ListedPackage> {
    let mut seen = BTreeSet::new();
    out.lines()
        .filter_map(|line| {
            let (import_path, dir) = line.trim().split_once('\t')?;
            let import_path = import_path.split(' ').next().unwrap_or_default();
            if import_path.is_empty() || dir.is_empty() || import_path.ends_with(".test") {
                return None;
            }
            if !seen.insert(import_path.to_string()) {
                return None;
            }
            Some(ListedPackage {
                import_path: import_path.to_string(),
                dir: PathBuf::from(dir),
            })
        })
        .collect()
}

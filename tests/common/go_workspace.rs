//! GOPATH-style fixture builder

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use gobfuscate::{Encrypter, PackageFilter, PassContext, Workspace};
use tempfile::TempDir;

/// A scratch GOPATH with a `src/` tree
pub struct GoWorkspace {
    dir: TempDir,
    workspace: Workspace,
}

impl GoWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("src")).expect("Failed to create src");
        let workspace = Workspace::new(dir.path());
        Self { dir, workspace }
    }

    /// Attach a GOROOT stand-in at `<root>/goroot`
    pub fn with_goroot(mut self) -> Self {
        let goroot = self.dir.path().join("goroot");
        fs::create_dir_all(goroot.join("src")).expect("Failed to create goroot");
        self.workspace = self.workspace.clone().with_goroot(Some(goroot));
        self
    }

    /// Add a standard library file below `goroot/src/`
    pub fn add_goroot_file(&self, relative_path: &str, content: &str) -> &Self {
        let full_path = self.dir.path().join("goroot/src").join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Add a file below `src/`
    pub fn add_file(&self, relative_path: &str, content: &str) -> &Self {
        let full_path = self.src().join(relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        self
    }

    /// Read a file below `src/`
    pub fn read(&self, relative_path: &str) -> String {
        fs::read_to_string(self.src().join(relative_path)).expect("Failed to read file")
    }

    pub fn exists(&self, relative_path: &str) -> bool {
        self.src().join(relative_path).exists()
    }

    /// A pass context over this workspace
    pub fn context<'a>(
        &'a self,
        encrypter: &'a Encrypter,
        filter: &'a PackageFilter,
    ) -> PassContext<'a> {
        PassContext::new(&self.workspace, encrypter, filter, false)
    }
}

/// Run the gobfuscate binary from `dir`
pub fn run_cli(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gobfuscate"))
        .current_dir(dir)
        .args(args)
        .env_remove("GOBFUSCATE_KEY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run CLI")
}

/// Run the CLI and expect failure, return (exit code, stderr)
pub fn run_cli_failure(dir: &Path, args: &[&str]) -> (i32, String) {
    let output = run_cli(dir, args);
    assert!(
        !output.status.success(),
        "CLI command {:?} should have failed",
        args
    );
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

impl Default for GoWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

//! Failures abort the pass that hit them

use gobfuscate::{
    obfuscate_strings, obfuscate_symbols, plan_top_level, run_pipeline, Encrypter, ObfuscateError,
    PackageFilter, PipelineOptions, QualifiedName, RenamePrimitive,
};

use crate::common::GoWorkspace;

/// Accepts `fail_at` symbol requests, then fails every later one.
struct FailingRenamer {
    fail_at: usize,
    attempts: usize,
}

impl RenamePrimitive for FailingRenamer {
    fn move_symbol(&mut self, from: &QualifiedName, to: &str) -> gobfuscate::Result<()> {
        self.attempts += 1;
        if self.attempts > self.fail_at {
            return Err(ObfuscateError::RenamePrimitiveFailure {
                from: from.to_string(),
                to: to.to_string(),
                message: "refused".to_string(),
            });
        }
        Ok(())
    }

    fn move_path(&mut self, from: &str, to: &str) -> gobfuscate::Result<()> {
        Err(ObfuscateError::PathRenameFailure {
            from: from.to_string(),
            to: to.to_string(),
            message: "unexpected".to_string(),
        })
    }
}

fn three_functions() -> GoWorkspace {
    let ws = GoWorkspace::new();
    ws.add_file(
        "a.io/app/main.go",
        "package main\n\nfunc one() {}\nfunc two() {}\nfunc three() {}\n\nfunc main() { one(); two(); three() }\n",
    );
    ws
}

#[test]
fn test_parse_failure_aborts_planning() {
    let ws = three_functions();
    ws.add_file("a.io/app/broken.go", "package main\n\nfunc broken( {\n");
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);

    let err = plan_top_level(&ws.context(&enc, &filter)).unwrap_err();
    assert!(matches!(err, ObfuscateError::ParseFailure { .. }));

    let err = obfuscate_strings(&ws.context(&enc, &filter)).unwrap_err();
    assert!(matches!(err, ObfuscateError::ParseFailure { .. }));
}

#[test]
fn test_unresolved_import_is_closure_failure() {
    let ws = GoWorkspace::new();
    ws.add_file(
        "a.io/app/main.go",
        "package main\n\nimport \"b.io/missing\"\n\nfunc main() { missing.Do() }\n",
    );
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let mut renamer = FailingRenamer {
        fail_at: usize::MAX,
        attempts: 0,
    };

    let err = obfuscate_symbols(&ws.context(&enc, &filter), "a.io/app", &mut renamer).unwrap_err();
    assert!(matches!(err, ObfuscateError::ClosureResolutionFailure { .. }));
    assert!(err.to_string().contains("b.io/missing"));
}

#[test]
fn test_rename_failure_stops_remaining_requests() {
    let ws = three_functions();
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let mut renamer = FailingRenamer {
        fail_at: 1,
        attempts: 0,
    };

    let err = obfuscate_symbols(&ws.context(&enc, &filter), "a.io/app", &mut renamer).unwrap_err();
    assert!(matches!(err, ObfuscateError::RenamePrimitiveFailure { .. }));
    assert_eq!(renamer.attempts, 2);
}

#[test]
fn test_pipeline_stops_at_first_failing_pass() {
    let ws = three_functions();
    let enc = Encrypter::new(b"key".to_vec());
    let options = PipelineOptions::new("a.io/app", Vec::<String>::new());
    let mut renamer = FailingRenamer {
        fail_at: usize::MAX,
        attempts: 0,
    };

    let err = run_pipeline(ws.workspace(), &enc, &options, &mut renamer).unwrap_err();
    assert!(matches!(err, ObfuscateError::PathRenameFailure { .. }));
    assert_eq!(renamer.attempts, 3);
    // literals are never reached
    assert_eq!(
        ws.read("a.io/app/main.go"),
        "package main\n\nfunc one() {}\nfunc two() {}\nfunc three() {}\n\nfunc main() { one(); two(); three() }\n"
    );
}

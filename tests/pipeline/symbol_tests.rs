//! Symbol planning across packages

use gobfuscate::{
    obfuscate_symbols, plan_methods, plan_top_level, Encrypter, InterfaceMethodSet, ObfuscateError,
    PackageFilter, QualifiedName,
};

use crate::common::{GoWorkspace, Recorded, RecordingRenamer};

fn interface_fixture() -> GoWorkspace {
    let ws = GoWorkspace::new();
    ws.add_file(
        "a.io/app/main.go",
        r#"package main

import "a.io/impl"

func Foo() {}

type Bar struct{}

func main() {
	Foo()
	var i impl.I = impl.S{}
	i.Foo()
}
"#,
    );
    ws.add_file(
        "a.io/impl/impl.go",
        r#"package impl

type I interface {
	Foo()
}

type S struct{}

func (S) Foo() {}

func (s *S) Extra() {}
"#,
    );
    ws
}

#[test]
fn test_interface_method_kept_while_function_renamed() {
    let ws = interface_fixture();
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let ctx = ws.context(&enc, &filter);
    let mut renamer = RecordingRenamer::new(ws.root());

    let report = obfuscate_symbols(&ctx, "a.io/app", &mut renamer).unwrap();

    let foo = QualifiedName::top_level("a.io/app", "Foo");
    assert_eq!(report.top_level.get(&foo).unwrap().new_name, enc.encrypt("Foo"));
    assert!(report
        .top_level
        .contains(&QualifiedName::top_level("a.io/app", "Bar")));

    let method_foo = QualifiedName::method("a.io/impl", "S", "Foo");
    assert!(!report.methods.contains(&method_foo));
    assert!(report.methods.guarded.contains(&method_foo));
    assert!(report
        .methods
        .contains(&QualifiedName::method("a.io/impl", "S", "Extra")));

    // main is an entry point
    assert!(!report
        .top_level
        .contains(&QualifiedName::top_level("a.io/app", "main")));
}

#[test]
fn test_method_plan_never_names_interface_members() {
    let ws = interface_fixture();
    ws.add_file(
        "a.io/extra/extra.go",
        "package extra\n\nimport \"a.io/impl\"\n\ntype Closer interface{ Close() error }\n\ntype T struct{}\n\nfunc (T) Close() error { return nil }\nfunc (T) Error() string { return \"\" }\nfunc (T) Open() {}\n\nvar _ impl.I\n",
    );
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let ctx = ws.context(&enc, &filter);
    let mut renamer = RecordingRenamer::new(ws.root());

    let report = obfuscate_symbols(&ctx, "a.io/app", &mut renamer).unwrap();
    let guard = InterfaceMethodSet::for_target(ws.workspace(), "a.io/app", false).unwrap();
    for request in &report.methods.requests {
        assert!(
            !guard.contains(&request.old.name),
            "{} should have been guarded",
            request.old
        );
    }
    let renamed: Vec<&str> = report
        .methods
        .requests
        .iter()
        .map(|r| r.old.name.as_str())
        .collect();
    assert!(renamed.contains(&"Open"));
    assert!(!renamed.contains(&"Close"));
    assert!(!renamed.contains(&"Error"));
}

#[test]
fn test_requests_applied_top_level_first() {
    let ws = interface_fixture();
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let ctx = ws.context(&enc, &filter);
    let mut renamer = RecordingRenamer::new(ws.root());

    let report = obfuscate_symbols(&ctx, "a.io/app", &mut renamer).unwrap();
    let seen = renamer.symbols();
    assert_eq!(seen.len(), report.top_level.len() + report.methods.len());
    let first_method = seen.iter().position(|q| q.receiver.is_some()).unwrap();
    assert_eq!(first_method, report.top_level.len());
    assert!(matches!(&renamer.events[0], Recorded::Symbol { .. }));
}

#[test]
fn test_build_tag_duplicates_are_dropped() {
    let ws = GoWorkspace::new();
    ws.add_file(
        "a.io/app/helper_linux.go",
        "//go:build linux\n\npackage app\n\nfunc Helper() {}\n\ntype T struct{}\n\nfunc (T) Method() {}\n",
    );
    ws.add_file(
        "a.io/app/helper_other.go",
        "//go:build !linux\n\npackage app\n\nfunc Helper() {}\n\nfunc (T) Method() {}\n",
    );
    ws.add_file("a.io/app/app.go", "package app\n\nfunc Run() { Helper() }\n");
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let ctx = ws.context(&enc, &filter);

    let plan = plan_top_level(&ctx).unwrap();
    let helper = QualifiedName::top_level("a.io/app", "Helper");
    assert!(!plan.contains(&helper));
    assert!(plan.discarded.contains(&helper));
    assert!(plan.contains(&QualifiedName::top_level("a.io/app", "Run")));
    assert!(plan.contains(&QualifiedName::top_level("a.io/app", "T")));

    let mut renamer = RecordingRenamer::new(ws.root());
    let report = obfuscate_symbols(&ctx, "a.io/app", &mut renamer).unwrap();
    let method = QualifiedName::method("a.io/app", "T", "Method");
    assert!(!report.methods.contains(&method));
    assert!(report.methods.discarded.contains(&method));
}

#[test]
fn test_filter_scopes_renaming() {
    let ws = interface_fixture();
    ws.add_file("b.io/vendorlib/lib.go", "package vendorlib\n\nfunc Exported() {}\n");
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io/app"]);
    let ctx = ws.context(&enc, &filter);

    let plan = plan_top_level(&ctx).unwrap();
    assert!(plan.requests.iter().all(|r| r.old.package == "a.io/app"));
    assert!(!plan.is_empty());
}

#[test]
fn test_plans_are_deterministic_per_key() {
    let plan_with = |key: &[u8]| {
        let ws = interface_fixture();
        let enc = Encrypter::new(key.to_vec());
        let filter = PackageFilter::new(["*"]);
        let ctx = ws.context(&enc, &filter);
        plan_top_level(&ctx).unwrap()
    };
    let first = plan_with(b"same");
    let second = plan_with(b"same");
    let other = plan_with(b"different");

    assert_eq!(first.requests, second.requests);
    assert_eq!(first.len(), other.len());
    assert_ne!(first.requests[0].new_name, other.requests[0].new_name);
}

#[test]
fn test_test_entry_points_kept_with_tests() {
    let ws = GoWorkspace::new();
    ws.add_file("a.io/lib/lib.go", "package lib\n\nfunc Sum() int { return 1 }\n");
    ws.add_file(
        "a.io/lib/lib_test.go",
        "package lib\n\nimport \"testing\"\n\nfunc TestSum(t *testing.T) {}\nfunc BenchmarkSum(b *testing.B) {}\nfunc helper() {}\n",
    );
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let ctx = gobfuscate::PassContext::new(ws.workspace(), &enc, &filter, true);

    let plan = plan_top_level(&ctx).unwrap();
    let names: Vec<&str> = plan.requests.iter().map(|r| r.old.name.as_str()).collect();
    assert_eq!(names, vec!["Sum", "helper"]);

    // without tests the test file is not scanned at all
    let ctx = ws.context(&enc, &filter);
    let plan = plan_top_level(&ctx).unwrap();
    assert_eq!(plan.len(), 1);
}

const STRINGER_APP: &str = r#"package main

import "fmt"

type T struct{}

func (T) String() string { return "t" }

func (T) Label() string { return "l" }

func main() { fmt.Println(T{}) }
"#;

#[test]
fn test_standard_library_interfaces_guard_methods() {
    let ws = GoWorkspace::new().with_goroot();
    ws.add_goroot_file(
        "fmt/print.go",
        "package fmt\n\ntype Stringer interface {\n\tString() string\n}\n\nfunc Println(a ...any) {}\n",
    );
    ws.add_file("a.io/app/main.go", STRINGER_APP);
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let ctx = ws.context(&enc, &filter);

    let guard = InterfaceMethodSet::for_target(ws.workspace(), "a.io/app", false).unwrap();
    assert!(guard.contains("String"));
    let plan = plan_methods(&ctx, &guard).unwrap();
    assert!(!plan.contains(&QualifiedName::method("a.io/app", "T", "String")));
    assert!(plan.contains(&QualifiedName::method("a.io/app", "T", "Label")));
}

#[test]
fn test_standard_import_without_goroot_is_fatal() {
    let ws = GoWorkspace::new();
    ws.add_file("a.io/app/main.go", STRINGER_APP);
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["a.io"]);
    let mut renamer = RecordingRenamer::new(ws.root());

    let err = obfuscate_symbols(&ws.context(&enc, &filter), "a.io/app", &mut renamer).unwrap_err();
    assert!(matches!(err, ObfuscateError::ClosureResolutionFailure { .. }));
    assert!(renamer
        .symbols()
        .iter()
        .all(|q| q.receiver.is_none()));
}

//! Package path renaming over a live tree

use gobfuscate::packages::list_level;
use gobfuscate::{rename_packages, DryRunRenamer, Encrypter, PackageFilter, RenameOp};

use crate::common::{GoWorkspace, RecordingRenamer};

#[test]
fn test_parent_renamed_before_child() {
    let ws = GoWorkspace::new();
    ws.add_file("root/r.go", "package root\n");
    ws.add_file("root/a/a.go", "package a\n");
    ws.add_file("root/a/b/b.go", "package b\n");
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["*"]);
    let ctx = ws.context(&enc, &filter);
    let mut renamer = RecordingRenamer::new(ws.root());

    let report = rename_packages(&ctx, &mut renamer).unwrap();

    let root = enc.encrypt("root");
    let a = format!("{}/{}", root, enc.encrypt("a"));
    let b = format!("{}/{}", a, enc.encrypt("b"));
    assert_eq!(
        renamer.paths(),
        vec![
            ("root", root.as_str()),
            (format!("{}/a", root).as_str(), a.as_str()),
            (format!("{}/b", a).as_str(), b.as_str()),
        ]
    );
    assert_eq!(report.levels, 3);
    assert!(ws.exists(&format!("{}/b.go", b)));
    assert!(!ws.exists("root"));
    assert_eq!(report.resolve("root/a/b"), b);
    assert_eq!(enc.encrypt_components("root/a/b"), b);
}

fn nested_tree() -> GoWorkspace {
    let ws = GoWorkspace::new();
    ws.add_file("root/r.go", "package root\n");
    ws.add_file("root/a/a.go", "package a\n");
    ws.add_file("root/a/b/b.go", "package b\n");
    ws.add_file("root/a/fast/fast.go", "package fast\n");
    ws.add_file("root/a/fast/add_amd64.s", "TEXT ·add(SB),$0\n");
    ws.add_file("root/a/fast/inner/i.go", "package inner\n");
    ws
}

#[test]
fn test_dry_run_reports_the_moves_of_a_real_run() {
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["*"]);

    let real = nested_tree();
    let mut recording = RecordingRenamer::new(real.root());
    let real_report = rename_packages(&real.context(&enc, &filter), &mut recording).unwrap();

    let dry = nested_tree();
    let mut dry_renamer = DryRunRenamer::new();
    let dry_report = rename_packages(&dry.context(&enc, &filter), &mut dry_renamer).unwrap();

    let dry_paths: Vec<(&str, &str)> = dry_renamer
        .ops()
        .iter()
        .filter_map(|op| match op {
            RenameOp::Path { from, to } => Some((from.as_str(), to.as_str())),
            RenameOp::Symbol { .. } => None,
        })
        .collect();
    assert_eq!(dry_paths, recording.paths());
    assert_eq!(dry_report.moves, real_report.moves);
    assert_eq!(dry_report.resolve("root/a/b"), real_report.resolve("root/a/b"));
    assert_eq!(dry_report.resolve("root/a/b"), enc.encrypt_components("root/a/b"));
    assert!(dry.exists("root/a/b/b.go"));
}

#[test]
fn test_levels_complete_before_descending() {
    let ws = GoWorkspace::new();
    for rel in ["x/one/deep/f.go", "x/two/f.go", "y/three/f.go", "y/three/deeper/f.go"] {
        ws.add_file(rel, "package p\n");
    }
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["*"]);
    let ctx = ws.context(&enc, &filter);
    let mut renamer = RecordingRenamer::new(ws.root());

    let report = rename_packages(&ctx, &mut renamer).unwrap();

    let depths: Vec<usize> = report.moves.iter().map(|m| m.depth).collect();
    assert_eq!(depths, vec![1, 1, 2, 2, 2, 3, 3]);
    for (m, (from, _)) in report.moves.iter().zip(renamer.paths()) {
        assert_eq!(m.from, from);
        assert_eq!(from.split('/').count(), m.depth);
    }
    // Nothing is left under an original name
    for level in 1..=3 {
        for dir in list_level(&ws.src(), level).unwrap() {
            let name = dir.file_name().unwrap().to_string_lossy().to_string();
            assert_eq!(name.len(), 24, "{} was not renamed", dir.display());
        }
    }
}

#[test]
fn test_ignored_directories_not_moved() {
    let ws = GoWorkspace::new();
    ws.add_file("app/main.go", "package main\n");
    ws.add_file("app/testdata/fixture.go", "package fixture\n");
    ws.add_file("app/_scratch/s.go", "package s\n");
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["*"]);
    let ctx = ws.context(&enc, &filter);
    let mut renamer = RecordingRenamer::new(ws.root());

    let report = rename_packages(&ctx, &mut renamer).unwrap();
    assert_eq!(report.moves.len(), 1);
    let app = enc.encrypt("app");
    assert!(ws.exists(&format!("{}/testdata/fixture.go", app)));
    assert!(ws.exists(&format!("{}/_scratch/s.go", app)));
}

#[test]
fn test_empty_workspace_has_no_levels() {
    let ws = GoWorkspace::new();
    let enc = Encrypter::new(b"key".to_vec());
    let filter = PackageFilter::new(["*"]);
    let ctx = ws.context(&enc, &filter);
    let mut renamer = RecordingRenamer::new(ws.root());

    let report = rename_packages(&ctx, &mut renamer).unwrap();
    assert_eq!(report.levels, 0);
    assert!(renamer.events.is_empty());
}

//! CLI integration tests
//!
//! These tests drive the `deadsweep` binary end to end: analyze a fact
//! bundle, then list, open, and delete from the written report.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SOURCE: &str = "func used() {}

func unused() {
    print(\"x\")
}
";

/// A project with one source file, its facts, and no config file
struct Project {
    dir: TempDir,
    source: PathBuf,
    facts: PathBuf,
    report: PathBuf,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("Greeter.swift");
        std::fs::write(&source, SOURCE).unwrap();

        let facts = dir.path().join("facts.json");
        let bundle = json!({
            "files": [{
                "path": source,
                "declarations": [
                    {"name": "used", "kind": "function", "line": 1},
                    {"name": "unused", "kind": "function", "line": 3}
                ],
                "facts": {"used_identifiers": ["used", "print"]}
            }]
        });
        std::fs::write(&facts, serde_json::to_string_pretty(&bundle).unwrap()).unwrap();

        let report = dir.path().join("out/report.csv");
        Self {
            dir,
            source,
            facts,
            report,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("deadsweep").unwrap();
        cmd.current_dir(self.dir.path());
        cmd
    }

    fn analyze(&self) {
        self.cmd()
            .args(["analyze", "--facts"])
            .arg(&self.facts)
            .arg("--output")
            .arg(&self.report)
            .assert()
            .success();
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// analyze
// ============================================================================

#[test]
fn test_help() {
    Command::cargo_bin("deadsweep")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_analyze_writes_report_and_lists_findings() {
    let project = Project::new();

    project
        .cmd()
        .args(["analyze", "--facts", arg(&project.facts), "--output", arg(&project.report)])
        .assert()
        .success()
        .stdout(predicate::str::contains("unused"))
        .stdout(predicate::str::contains("Report saved to"));

    let report = std::fs::read_to_string(&project.report).unwrap();
    assert!(report.starts_with("# deadsweep-report v1\n"));
    assert!(report.contains("1,unused,function,"));
    assert!(!report.contains(",used,"));
}

#[test]
fn test_analyze_json_output() {
    let project = Project::new();

    let output = project
        .cmd()
        .args([
            "analyze",
            "--facts",
            arg(&project.facts),
            "--output",
            arg(&project.report),
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["total"], 1);
    assert_eq!(value["declarations"][0]["name"], "unused");
    assert_eq!(value["declarations"][0]["actionable"], true);
}

#[test]
fn test_analyze_missing_facts_fails() {
    let project = Project::new();

    project
        .cmd()
        .args(["analyze", "--facts", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("input not found"));
}

// ============================================================================
// list and open
// ============================================================================

#[test]
fn test_list_filters_by_kind() {
    let project = Project::new();
    project.analyze();

    project
        .cmd()
        .args(["list", "--report", arg(&project.report), "--kind", "function"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'unused'"));

    project
        .cmd()
        .args(["list", "--report", arg(&project.report), "--kind", "variable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No unused declarations found"));
}

#[test]
fn test_list_rejects_unknown_reason() {
    let project = Project::new();
    project.analyze();

    project
        .cmd()
        .args(["list", "--report", arg(&project.report), "--reason", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown exclusion reason"));
}

#[test]
fn test_open_reports_editor_failure() {
    let project = Project::new();
    project.analyze();

    project
        .cmd()
        .env_remove("VISUAL")
        .env("EDITOR", "deadsweep-no-such-editor")
        .args(["open", "--report", arg(&project.report), "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to launch editor"));
}

#[test]
fn test_open_unknown_id() {
    let project = Project::new();
    project.analyze();

    project
        .cmd()
        .args(["open", "--report", arg(&project.report), "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no declaration with id 42"));
}

// ============================================================================
// delete
// ============================================================================

#[test]
fn test_delete_dry_run_leaves_source() {
    let project = Project::new();
    project.analyze();

    project
        .cmd()
        .args(["delete", "--report", arg(&project.report), "--dry-run", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(std::fs::read_to_string(&project.source).unwrap(), SOURCE);
}

#[test]
fn test_delete_by_id_with_undo_script() {
    let project = Project::new();
    project.analyze();
    let undo = project.dir.path().join("undo.sh");

    project
        .cmd()
        .args([
            "delete",
            "--report",
            arg(&project.report),
            "--facts",
            arg(&project.facts),
            "--undo-script",
            arg(&undo),
            "1",
        ])
        .assert()
        .success();

    assert_eq!(std::fs::read_to_string(&project.source).unwrap(), "func used() {}\n");
    assert!(std::fs::read_to_string(&undo).unwrap().contains("func unused()"));
}

#[test]
fn test_delete_requires_ids_or_pattern() {
    let project = Project::new();
    project.analyze();

    project
        .cmd()
        .args(["delete", "--report", arg(&project.report)])
        .assert()
        .failure();
}

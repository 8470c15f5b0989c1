//! Smoke tests for the covreport CLI
//!
//! These tests run the built binary end to end on small fixtures.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use covreport::exec::ExecutionDataWriter;
use covreport::{ClassId, ExecutionData, SessionInfo};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a command for the covreport binary
fn covreport() -> Command {
    Command::cargo_bin("covreport").expect("covreport binary should exist")
}

/// Execution data for `pkg/Foo` with probes 0 and 1 hit out of 3
fn write_exec(path: &Path) {
    let mut writer = ExecutionDataWriter::new(fs::File::create(path).unwrap()).unwrap();
    writer
        .write_session_info(&SessionInfo::new("smoke-host", 1_700_000_000_000, 1_700_000_001_000))
        .unwrap();
    writer
        .write_execution_data(&ExecutionData::new(
            ClassId::new(7),
            "pkg/Foo",
            vec![true, true, false],
        ))
        .unwrap();
    let _ = writer.finish().unwrap();
}

fn write_unit(classes: &Path) {
    let dir = classes.join("pkg");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("Foo.covmap"),
        r#"{ "id": 7, "name": "pkg/Foo", "source_file": "Foo.java",
             "methods": [ { "name": "run", "desc": "()V", "lines": [
               { "nr": 3, "instructions": 2, "probe": 0 },
               { "nr": 4, "instructions": 1, "probe": 1 },
               { "nr": 5, "instructions": 1, "probe": 2 } ] } ] }"#,
    )
    .unwrap();
}

/// Temp dir with `jacoco.exec` and `classes/`
fn fixture() -> (TempDir, PathBuf, PathBuf) {
    let temp = TempDir::new().unwrap();
    let exec = temp.path().join("jacoco.exec");
    let classes = temp.path().join("classes");
    write_exec(&exec);
    write_unit(&classes);
    (temp, exec, classes)
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    covreport()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    covreport()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("execinfo"))
        .stdout(predicate::str::contains("merge"));
}

#[test]
fn test_no_args_shows_usage() {
    covreport()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ============================================================================
// Report Command Tests
// ============================================================================

#[test]
fn test_report_generates_all_formats() {
    let (temp, exec, classes) = fixture();
    let dest = temp.path().join("site");

    covreport()
        .arg("report")
        .arg("-e")
        .arg(&exec)
        .arg("-c")
        .arg(&classes)
        .arg("-d")
        .arg(&dest)
        .arg("--artifact-id")
        .arg("smoke")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated coverage reports in"));

    assert!(dest.join("jacoco.xml").exists());
    assert!(dest.join("index.html").exists());
    let csv = fs::read_to_string(dest.join("jacoco.csv")).unwrap();
    assert!(csv.contains("smoke,pkg,Foo,1,3,0,0,1,2,0,1,0,1"));
}

#[test]
fn test_report_quiet_suppresses_message() {
    let (temp, exec, classes) = fixture();
    let dest = temp.path().join("site");

    covreport()
        .args(["-q", "report", "-e"])
        .arg(&exec)
        .arg("-c")
        .arg(&classes)
        .arg("-d")
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(dest.join("jacoco.csv").exists());
}

#[test]
fn test_report_missing_exec_is_not_fatal() {
    let temp = TempDir::new().unwrap();

    covreport()
        .arg("report")
        .arg("-e")
        .arg(temp.path().join("absent.exec"))
        .arg("-d")
        .arg(temp.path().join("site"))
        .args(["--wait-timeout", "50", "--poll-interval", "10"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to generate coverage reports"));

    assert!(!temp.path().join("site").exists());
}

#[test]
fn test_report_missing_exec_fails_on_request() {
    let temp = TempDir::new().unwrap();

    covreport()
        .arg("report")
        .arg("-e")
        .arg(temp.path().join("absent.exec"))
        .arg("-d")
        .arg(temp.path().join("site"))
        .args(["--wait-timeout", "50", "--poll-interval", "10", "--fail-on-error"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Report generation failed"));
}

#[test]
fn test_report_unknown_encoding_fails_on_request() {
    let (temp, exec, classes) = fixture();

    covreport()
        .arg("report")
        .arg("-e")
        .arg(&exec)
        .arg("-c")
        .arg(&classes)
        .arg("-d")
        .arg(temp.path().join("site"))
        .args(["--output-encoding", "no-such-charset", "--fail-on-error"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported encoding"));
}

// ============================================================================
// Execinfo / Merge Tests
// ============================================================================

#[test]
fn test_execinfo_lists_classes() {
    let (_temp, exec, _classes) = fixture();

    covreport()
        .arg("--color")
        .arg("never")
        .arg("execinfo")
        .arg(&exec)
        .assert()
        .success()
        .stdout(predicate::str::contains("smoke-host"))
        .stdout(predicate::str::contains("pkg/Foo"));
}

#[test]
fn test_execinfo_missing_file_fails() {
    covreport()
        .args(["execinfo", "/nonexistent/jacoco.exec"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_merge_writes_dest() {
    let (temp, exec, _classes) = fixture();
    let dest = temp.path().join("merged/all.exec");

    covreport()
        .arg("merge")
        .arg(&exec)
        .arg(&exec)
        .arg("--dest")
        .arg(&dest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Merged 2 file(s)"));

    assert!(dest.exists());
}

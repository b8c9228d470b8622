//! Runs the generated dispatcher with the system interpreter, unfrozen.
//!
//! Tests return early when no Python interpreter is installed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/simple")
}

fn python() -> Option<PathBuf> {
    which::which("python3").or_else(|_| which::which("python")).ok()
}

/// Renders the fixture's dispatcher into `dir`.
fn render_dispatcher(dir: &Path) -> PathBuf {
    let script = dir.join(".pyinstaller_dispatcher.py");
    Command::cargo_bin("pyinstaller_bundle")
        .unwrap()
        .args(["dispatcher", "-p"])
        .arg(fixture())
        .arg("-o")
        .arg(&script)
        .assert()
        .success();
    script
}

fn run(python: &Path, script: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::new(python);
    cmd.arg(script)
        .current_dir(cwd)
        .env("PYTHONPATH", fixture())
        .env("PYTHONDONTWRITEBYTECODE", "1")
        .env_remove("__process__")
        .env_remove("PROFILE")
        .env_remove("DEBUG");
    cmd
}

#[test]
fn setup_aliases_links_every_alias_idempotently() {
    let Some(python) = python() else { return };
    let tmp = tempfile::tempdir().unwrap();
    let script = render_dispatcher(tmp.path());

    for _ in 0..2 {
        run(&python, &script, tmp.path())
            .arg("setup_aliases")
            .assert()
            .success();
    }

    for alias in ["hello", "simple-python"] {
        let link = tmp.path().join(alias);
        assert!(link.is_file(), "{alias} missing");
        assert_eq!(
            std::fs::read(&link).unwrap(),
            std::fs::read(&script).unwrap()
        );
    }

    run(&python, &tmp.path().join("hello"), tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello from simple"));
}

#[test]
fn process_override_selects_entry_point() {
    let Some(python) = python() else { return };
    let tmp = tempfile::tempdir().unwrap();
    let script = render_dispatcher(tmp.path());

    run(&python, &script, tmp.path())
        .env("__process__", "hello")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello from simple"));
}

#[test]
fn extract_replaces_previous_copy() {
    let Some(python) = python() else { return };
    let tmp = tempfile::tempdir().unwrap();
    let script = render_dispatcher(tmp.path());
    let extracted = tmp.path().join("extracted_bundle");

    run(&python, &script, tmp.path()).arg("extract").assert().success();
    assert!(extracted.join("simple/cli.py").is_file());

    std::fs::write(extracted.join("stale.txt"), "old").unwrap();
    run(&python, &script, tmp.path()).arg("extract").assert().success();
    assert!(extracted.join("simple/cli.py").is_file());
    assert!(!extracted.join("stale.txt").exists());
}

#[test]
fn unrecognized_command_exits_with_usage_status() {
    let Some(python) = python() else { return };
    let tmp = tempfile::tempdir().unwrap();
    let script = render_dispatcher(tmp.path());

    run(&python, &script, tmp.path())
        .arg("bogus")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized command"));
}

//! End-to-end tests for the `st` binary
//!
//! Logs go to a throwaway data directory so runs never touch the real one.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn st(data_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("st").expect("st binary builds");
    cmd.env("XDG_DATA_HOME", data_dir.path())
        .env("HOME", data_dir.path())
        .env_remove("GEMINI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY");
    cmd
}

#[test]
fn test_help_lists_commands_and_key_status() {
    let dir = TempDir::new().expect("temp dir");
    st(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("study"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn test_render_chat_markdown() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("lesson.md");
    fs::write(
        &file,
        "# Photosynthesis\nPlants make sugar.\n* [ ] Read chapter 3\n1. Light\n2. Water\n",
    )
    .expect("write lesson");

    st(&dir)
        .args(["render", file.to_str().expect("utf-8 path")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Photosynthesis"))
        .stdout(predicate::str::contains("[ ] Read chapter 3"))
        .stdout(predicate::str::contains("2. Water"));
}

#[test]
fn test_render_plan_dialect_draws_rules() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("plan.md");
    fs::write(&file, "   ### Cells\n   Name the organelles\n---\n").expect("write plan");

    st(&dir)
        .args(["render", "--dialect", "plan", file.to_str().expect("utf-8 path")])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cells"))
        .stdout(predicate::str::contains("Name the organelles"))
        .stdout(predicate::str::contains("───"));
}

#[test]
fn test_render_missing_file_fails() {
    let dir = TempDir::new().expect("temp dir");
    st(&dir)
        .args(["render", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_plan_rejects_unsupported_file_type() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("slides.pptx");
    fs::write(&file, b"not really slides").expect("write file");

    st(&dir)
        .args(["plan", file.to_str().expect("utf-8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pptx"));
}

#[test]
fn test_plan_without_api_key_fails() {
    let dir = TempDir::new().expect("temp dir");
    let file = dir.path().join("notes.txt");
    fs::write(&file, "Mitochondria make ATP.").expect("write notes");

    st(&dir)
        .args(["plan", file.to_str().expect("utf-8 path")])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key not found"));
}

#[test]
fn test_unknown_level_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    st(&dir)
        .args(["plan", "notes.txt", "--level", "Expert"])
        .assert()
        .failure();
}

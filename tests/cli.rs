//! Command-line behaviour of the `insight-agent` binary.

#![allow(clippy::panic)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("insight-agent").unwrap_or_else(|e| panic!("binary: {e}"));
    cmd.env("HOME", home)
        .env_remove("INSIGHT_PROMPT_DIR")
        .env_remove("INSIGHT_PROVIDER")
        .env_remove("INSIGHT_MAX_ITERATIONS")
        .env_remove("INSIGHT_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_script(dir: &TempDir, responses: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("script.json");
    let json = serde_json::to_string(responses).unwrap_or_else(|e| panic!("encode: {e}"));
    std::fs::write(&path, json).unwrap_or_else(|e| panic!("write: {e}"));
    path
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("init-prompts")));
}

#[test]
fn run_with_replay_prints_report_and_footer() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let script = write_script(
        &home,
        &[
            r#"{"main_objective": "explain"}"#,
            r#"{"kind": "compare", "target": "regions"}"#,
            r#"{"continue": false}"#,
            "# Findings report",
        ],
    );

    cmd(home.path())
        .args(["run", "Why did revenue dip?", "--replay"])
        .arg(&script)
        .assert()
        .success()
        .stdout(
            predicate::str::contains("# Findings report")
                .and(predicate::str::contains("Iterations: 1 | Tools: compare")),
        );
}

#[test]
fn run_json_output_includes_trace() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let script = write_script(&home, &["not a plan", r#"{"kind": "complete"}"#, "report"]);
    let dataset = home.path().join("dataset.json");
    std::fs::write(&dataset, r#"{"filename": "sales.csv", "row_count": 10}"#)
        .unwrap_or_else(|e| panic!("write: {e}"));

    let output = cmd(home.path())
        .args(["--format", "json", "run", "q", "--dataset"])
        .arg(&dataset)
        .arg("--replay")
        .arg(&script)
        .output()
        .unwrap_or_else(|e| panic!("run: {e}"));

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap_or_default();
    assert_eq!(json["report"], "report");
    assert_eq!(json["reasoning_trace"][0]["plan"]["raw_plan"], "not a plan");
    assert_eq!(json["reasoning_trace"][1]["action"]["kind"], "complete");
    assert_eq!(json["iterations"], 1);
}

#[test]
fn run_rejects_zero_iterations() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let script = write_script(&home, &["plan", "report"]);

    cmd(home.path())
        .args(["run", "q", "--max-iterations", "0", "--replay"])
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_iterations"));
}

#[test]
fn run_with_unknown_provider_fails() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));

    cmd(home.path())
        .args(["run", "q", "--provider", "carrier-pigeon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported provider"));
}

#[test]
fn init_prompts_writes_templates_once() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let dir = home.path().join("prompts");

    cmd(home.path())
        .args(["init-prompts", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 3 prompt template(s)"));

    assert!(dir.join("planner.md").exists());
    assert!(dir.join("selector.md").exists());
    assert!(dir.join("synthesizer.md").exists());

    cmd(home.path())
        .args(["init-prompts", "--dir"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn custom_prompt_dir_is_used() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let prompts = home.path().join("prompts");
    std::fs::create_dir_all(&prompts).unwrap_or_else(|e| panic!("mkdir: {e}"));
    std::fs::write(prompts.join("synthesizer.md"), "custom synthesizer")
        .unwrap_or_else(|e| panic!("write: {e}"));
    let script = write_script(&home, &["plan", r#"{"kind": "complete"}"#, "done"]);

    cmd(home.path())
        .args(["run", "q", "--prompt-dir"])
        .arg(&prompts)
        .arg("--replay")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("done"));
}

#[test]
fn short_replay_script_fails_promptly() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let script = write_script(&home, &[r#"{"main_objective": "explain"}"#]);

    cmd(home.path())
        .args(["run", "q", "--replay"])
        .arg(&script)
        .timeout(std::time::Duration::from_secs(10))
        .assert()
        .failure()
        .stderr(predicate::str::contains("scripted responses exhausted"));
}

#[test]
fn respond_prints_reply() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let script = write_script(&home, &["I can analyze uploaded datasets."]);

    cmd(home.path())
        .args(["respond", "What can you do?", "--context", "Hi!", "--replay"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("I can analyze uploaded datasets."));
}

#[test]
fn title_strips_quotes() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let script = write_script(&home, &["\"Q3 Revenue Drop\""]);

    cmd(home.path())
        .args(["title", "Why did Q3 revenue drop?", "--replay"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::diff("Q3 Revenue Drop\n"));
}

#[test]
fn title_falls_back_when_script_is_empty() {
    let home = TempDir::new().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let script = write_script(&home, &[]);

    cmd(home.path())
        .args(["title", "hello", "--replay"])
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("New Analysis Chat"));
}

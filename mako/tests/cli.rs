//! CLI tests for the non-interactive `mako` commands.
//!
//! Spawns the built binary against a scratch working directory and checks
//! stdout and exit codes.

use std::fs;
use std::process::Command;

use serde_json::Value;

use mako::exit_codes;
use mako::io::config::{AgentConfig, load_config};

fn mako(workdir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mako"))
        .arg("--workdir")
        .arg(workdir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run mako")
}

#[test]
fn tools_prints_the_catalog() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = mako(temp.path(), &["tools"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let catalog: Value = serde_json::from_slice(&output.stdout).expect("json catalog");
    let names: Vec<_> = catalog
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|tool| tool["function"]["name"].as_str())
        .collect();
    assert_eq!(names.len(), 5);
    assert!(names.contains(&"run_safe_shell"));
    assert!(catalog.as_array().expect("array").iter().all(|t| t["type"] == "function"));
}

#[test]
fn goals_prints_default_memory_when_missing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = mako(temp.path(), &["goals"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let memory: Value = serde_json::from_slice(&output.stdout).expect("json goals");
    assert_eq!(memory["goals"], serde_json::json!([]));
    assert!(memory["current_focus"].is_null());
    assert!(!temp.path().join("memory").exists());
}

#[test]
fn init_writes_default_config_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = mako(temp.path(), &["init"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let path = temp.path().join("mako.toml");
    assert_eq!(load_config(&path).expect("load"), AgentConfig::default());

    fs::write(&path, "model = \"custom\"\n").expect("edit config");
    let output = mako(temp.path(), &["init"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load").model, "custom");

    let output = mako(temp.path(), &["init", "--force"]);
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load"), AgentConfig::default());
}

#[test]
fn invalid_config_exits_with_invalid_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(temp.path().join("mako.toml"), "temperature = 9.0\n").expect("write config");
    let output = mako(temp.path(), &["tools"]);
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("temperature must be within 0.0..=2.0"), "{stderr}");
}

#[test]
fn chat_quits_on_first_input_and_saves_goals() {
    let temp = tempfile::tempdir().expect("tempdir");
    let mut child = Command::new(env!("CARGO_BIN_EXE_mako"))
        .arg("--workdir")
        .arg(temp.path())
        .arg("chat")
        .env("DO_GENAI_TOKEN", "test-token")
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .expect("spawn mako chat");
    {
        use std::io::Write;
        let mut stdin = child.stdin.take().expect("stdin");
        stdin.write_all(b"quit\n").expect("write quit");
    }
    let output = child.wait_with_output().expect("wait");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(temp.path().join("memory/goals.json").exists());
}

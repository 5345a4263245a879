//! Basic CLI E2E tests.
//!
//! Tests invoke the built CLI binary with HOME pointed at a scratch directory
//! so the user's real configuration is never touched.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_breathwork-cli"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("BREATHWORK_ENV")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json_lines(stdout: &str) -> Vec<serde_json::Value> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("line should be JSON"))
        .collect()
}

#[test]
fn test_patterns_list() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["patterns", "list"]);
    assert_eq!(code, 0, "patterns list failed");
    assert!(stdout.contains("box"));
    assert!(stdout.contains("4-7-8"));
}

#[test]
fn test_patterns_list_json() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["patterns", "list", "--json"]);
    assert_eq!(code, 0, "patterns list --json failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let patterns = parsed.as_array().unwrap();
    assert!(patterns.iter().any(|p| p["id"] == "box"));
}

#[test]
fn test_patterns_show_unknown_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["patterns", "show", "square"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("square"));
}

#[test]
fn test_simulate_box_scenario() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(
        &home,
        &["session", "simulate", "--pattern", "box", "--seconds", "40", "--every", "100"],
    );
    assert_eq!(code, 0, "simulate failed");
    let lines = json_lines(&stdout);
    let summary = lines.last().unwrap();
    assert_eq!(summary["reason"], "countdown");
    assert_eq!(summary["cycles_completed"], 2);
    assert_eq!(summary["remaining_ms"], 0);

    let last_snapshot = &lines[lines.len() - 2];
    assert_eq!(last_snapshot["status"], "complete");
    assert_eq!(last_snapshot["remaining"], "0:00");
}

#[test]
fn test_simulate_stop_after_keeps_remaining() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(
        &home,
        &["session", "simulate", "--seconds", "120", "--stop-after", "10"],
    );
    assert_eq!(code, 0);
    let lines = json_lines(&stdout);
    let summary = lines.last().unwrap();
    assert_eq!(summary["reason"], "stopped");
    assert_eq!(summary["remaining_ms"], 110_000);
}

#[test]
fn test_simulate_events() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(
        &home,
        &["session", "simulate", "-p", "4-7-8", "--cycles", "1", "--events"],
    );
    assert_eq!(code, 0);
    let types: Vec<String> = json_lines(&stdout)
        .iter()
        .map(|e| e["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        types,
        vec![
            "phase_entered",
            "phase_entered",
            "cycle_completed",
            "phase_entered",
            "session_completed",
        ]
    );
}

#[test]
fn test_simulate_rejects_zero_duration() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["session", "simulate", "--seconds", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("greater than zero"));
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&home, &["config", "set", "session.default_pattern", "calm"]);
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(&home, &["config", "get", "session.default_pattern"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "calm");
}

#[test]
fn test_config_set_rejects_unknown_pattern() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(
        &home,
        &["config", "set", "session.default_pattern", "square"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("square"));
}

#[test]
fn test_config_help_lists_every_key() {
    let home = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(&home, &["config", "set", "--help"]);
    assert_eq!(code, 0);
    for key in [
        "session.default_pattern",
        "session.default_duration_secs",
        "session.tick_interval_ms",
        "session.max_tick_delta_ms",
        "display.show_progress_bar",
        "display.bar_width",
        "custom_patterns",
    ] {
        assert!(stdout.contains(key), "{key} missing from help:\n{stdout}");
        if key != "custom_patterns" {
            let (_, _, code) = run_cli(&home, &["config", "get", key]);
            assert_eq!(code, 0, "{key} should be readable");
        }
    }
}

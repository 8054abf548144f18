//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_quitpace"))
        .args(args)
        .env("QUITPACE_DATA_DIR", data_dir)
        .env_remove("QUITPACE_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn onboard(data_dir: &Path) {
    let (_, stderr, code) = run_cli(data_dir, &["onboard", "--cigarettes", "70", "--vapes", "14"]);
    assert_eq!(code, 0, "onboard failed: {stderr}");
}

#[test]
fn test_status_requires_onboarding() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("onboarding"));
}

#[test]
fn test_onboard_json_plan() {
    let dir = tempfile::tempdir().unwrap();
    let plan = run_json(
        dir.path(),
        &["onboard", "--cigarettes", "70", "--speed", "medium", "--json"],
    );
    assert_eq!(plan["plan_speed"], "medium");
    assert_eq!(plan["weeks"][0]["cigarettes_allowed"], 70);
    assert_eq!(plan["weeks"][0]["wait_time_cigs"], 96);
    let weeks = plan["weeks"].as_array().unwrap();
    assert_eq!(weeks.last().unwrap()["total_allowed"], 0);
}

#[test]
fn test_onboard_rejects_zero_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["onboard"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_unknown_speed_falls_back_to_medium() {
    let dir = tempfile::tempdir().unwrap();
    let plan = run_json(dir.path(), &["onboard", "--vapes", "10", "--speed", "warp", "--json"]);
    assert_eq!(plan["plan_speed"], "medium");
}

#[test]
fn test_log_then_too_soon() {
    let dir = tempfile::tempdir().unwrap();
    onboard(dir.path());

    let first = run_json(dir.path(), &["log", "cigarette", "--json"]);
    assert_eq!(first["outcome"], "logged");
    assert_eq!(first["entry"]["type"], "cigarette");

    let (stdout, _, code) = run_cli(dir.path(), &["log", "cigarette"]);
    assert_eq!(code, 2);
    assert!(stdout.contains("Too soon"));

    let forced = run_json(dir.path(), &["log", "cig", "--force", "--json"]);
    assert_eq!(forced["outcome"], "logged");

    let status = run_json(dir.path(), &["status", "--json"]);
    assert_eq!(status["today_count"], 2);
    assert_eq!(status["kinds"][0]["can_log"], false);
    assert_eq!(status["kinds"][1]["can_log"], true);
}

#[test]
fn test_log_unknown_kind() {
    let dir = tempfile::tempdir().unwrap();
    onboard(dir.path());
    let (_, stderr, code) = run_cli(dir.path(), &["log", "cigar"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cigar"));
}

#[test]
fn test_stats_and_achievements_json() {
    let dir = tempfile::tempdir().unwrap();
    onboard(dir.path());

    let stats = run_json(dir.path(), &["stats", "--json"]);
    assert_eq!(stats["days_active"], 0);
    assert_eq!(stats["reduction_percentage"], 0);
    assert_eq!(stats["money_saved"], 0.0);

    let achievements = run_json(dir.path(), &["achievements", "--json"]);
    let list = achievements.as_array().unwrap();
    assert_eq!(list.len(), 16);
    assert!(list.iter().all(|a| a["unlocked_at"].is_null()));
}

#[test]
fn test_plan_text() {
    let dir = tempfile::tempdir().unwrap();
    onboard(dir.path());
    let (stdout, _, code) = run_cli(dir.path(), &["plan"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("medium plan"));
    assert!(stdout.contains("cig wait"));
}

#[test]
fn test_config_get_set_reset() {
    let dir = tempfile::tempdir().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "onboarding.default_speed"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "medium");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "onboarding.default_speed", "quick"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "onboarding.default_speed"]);
    assert_eq!(stdout.trim(), "quick");

    let plan = run_json(dir.path(), &["onboard", "--cigarettes", "20", "--json"]);
    assert_eq!(plan["plan_speed"], "quick");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "display.nope"]);
    assert_eq!(code, 1);
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "notifications.enabled", "maybe"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("notifications.enabled"));

    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let list = run_json(dir.path(), &["config", "list"]);
    assert_eq!(list["onboarding"]["default_speed"], "medium");
}

#[test]
fn test_watch_once_arms_reminder() {
    let dir = tempfile::tempdir().unwrap();
    onboard(dir.path());
    run_json(dir.path(), &["log", "cigarette", "--json"]);

    let pending = run_json(dir.path(), &["watch", "--once", "--json"]);
    let pending = pending.as_array().unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["kind"], "cigarette");
}

#[test]
fn test_reset_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    onboard(dir.path());

    let (_, _, code) = run_cli(dir.path(), &["reset"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 0);

    let (_, _, code) = run_cli(dir.path(), &["reset", "--yes"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 1);
}

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{path::PathBuf, process::Command};

fn checkout_page() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos/checkout.json")
}

fn picker() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_element-picker"));
    cmd.env_remove("RUST_LOG").env("PICKER_LOG_LEVEL", "warn");
    cmd
}

#[test]
fn inspect_by_id_prints_details() {
    let output = picker()
        .args(["inspect", "--page"])
        .arg(checkout_page())
        .args(["--id", "go"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let details: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(details["tagName"], "button");
    assert_eq!(details["id"], "go");
    assert_eq!(details["classes"], serde_json::json!(["btn", "primary"]));
    assert_eq!(details["textContent"], "Go");
    assert_eq!(details["computedStyle"]["fontSize"], "13.33px");
}

#[test]
fn inspect_empty_point_prints_null() {
    let output = picker()
        .args(["inspect", "--page"])
        .arg(checkout_page())
        .args(["--at", "2000,2000"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "null");
}

#[test]
fn session_reports_each_step() {
    let output = picker()
        .args(["session", "--tab", "7", "--click", "15,25", "--page"])
        .arg(checkout_page())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("start: pickingStarted"));
    assert!(stdout.contains("click (15, 25): <button#go>"));
    assert!(stdout.contains("80px x 30px"));
    assert!(stdout.contains("stop: pickingStopped"));
    assert!(stdout.contains("<p>Picking mode stopped.</p>"));
}

#[test]
fn config_check_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("picker.toml");
    std::fs::write(&path, "[coordinator]\nstop_failure_policy = \"sometimes\"\n").unwrap();

    let output = picker()
        .args(["config", "check", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
}

// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the built binary against throwaway config files.

use std::path::Path;
use std::process::{Command, Output};

/// Host variables that would override the test config.
const OVERRIDES: &[&str] = &[
    "RUST_LOG",
    "TWILIO_ACCOUNT_SID",
    "TWILIO_AUTH_TOKEN",
    "TELEGRAM_BOT_TOKEN",
    "PRINTER_DRIVER",
    "CONTACTS",
    "ALLOWLIST",
];

fn kidfax(config: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_kidfax"));
    command.arg("--config").arg(config).args(args);
    for var in OVERRIDES {
        command.env_remove(var);
    }
    command.output().expect("failed to run kidfax")
}

fn write_config(dir: &Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("kidfax.toml");
    let state = dir.join("state.json");
    let content = format!(
        "[state]\npath = {state:?}\n\n[avatar]\nenabled = false\n\n{body}",
        state = state.display().to_string()
    );
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_print_on_dummy_printer() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        dir.path(),
        "[general]\nheader = \"Fax Test\"\n\n[printer]\ndriver = \"dummy\"\n\n\
         [directory.contacts]\ngrandma = \"+15551112222\"\n",
    );

    let output = kidfax(&config, &["test-print", "--from", "grandma", "cookies!"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Fax Test"));
    assert!(stdout.contains("From: grandma (+15551112222)"));
    assert!(stdout.contains("cookies!"));
    assert!(stdout.contains("Printed a test receipt on dummy."));
    assert!(!dir.path().join("state.json").exists());
}

#[test]
fn poll_without_credentials_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[printer]\ndriver = \"dummy\"\n");

    let output = kidfax(&config, &["poll", "sms"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("sms.account_sid"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[printer]\nline_widht = 32\n");

    let output = kidfax(&config, &["doctor", "--plain"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn doctor_reports_checks() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "[printer]\ndriver = \"dummy\"\n");

    let output = kidfax(&config, &["doctor", "--plain"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[OK]   Configuration"));
    assert!(stdout.contains("[WARN] State file"));
    assert!(stdout.contains("[WARN] SMS            not configured"));
}

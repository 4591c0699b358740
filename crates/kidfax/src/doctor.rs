// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kidfax doctor` command implementation.
//!
//! Runs diagnostic checks against the configured state file, printer, avatar
//! directory, status display, and message source credentials.

use std::future::Future;
use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use kidfax_config::{KidfaxConfig, PrinterDriverKind};
use kidfax_core::{HealthStatus, KidfaxError, PluginAdapter};
use kidfax_display::build_display;
use kidfax_printer::build_driver;
use kidfax_receipt::{AvatarStore, Codepage, DitherProcessor};
use kidfax_sms::SmsSource;
use kidfax_state::{LedgerStore, SMS_LEDGER_KEY, TELEGRAM_LEDGER_KEY};
use kidfax_telegram::TelegramSource;

/// Upper bound for any single network or device check.
const CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `kidfax doctor` command.
///
/// With `plain`, disables colored output.
pub async fn run_doctor(config: &KidfaxConfig, plain: bool) -> Result<(), KidfaxError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let results = vec![
        check_state_file(config),
        check_printer(config).await,
        check_avatars(config),
        check_display(config).await,
        check_sms(config).await,
        check_telegram(config).await,
    ];

    println!();
    println!("  kidfax doctor");
    println!("  {}", "-".repeat(50));
    println!("    {}", format_line(&config_ok(), use_color));
    for result in &results {
        println!("    {}", format_line(result, use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

/// Configuration was loaded and validated before the command ran.
fn config_ok() -> CheckResult {
    CheckResult::new("Configuration", CheckStatus::Pass, "valid", Instant::now())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("{symbol} {:<14} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "{tag} {:<14} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

/// Check the state file parses and its directory exists.
fn check_state_file(config: &KidfaxConfig) -> CheckResult {
    let start = Instant::now();
    let name = "State file";
    let path = Path::new(&config.state.path);

    if !path.exists() {
        let parent_ok = path
            .parent()
            .is_none_or(|p| p.as_os_str().is_empty() || p.is_dir());
        return if parent_ok {
            CheckResult::new(
                name,
                CheckStatus::Warn,
                format!(
                    "not found: {} (created on first print)",
                    path.display()
                ),
                start,
            )
        } else {
            CheckResult::new(
                name,
                CheckStatus::Fail,
                format!("directory missing for {}", path.display()),
                start,
            )
        };
    }

    if let Err(e) = std::fs::read_to_string(path) {
        return CheckResult::new(name, CheckStatus::Fail, format!("unreadable: {e}"), start);
    }

    let counts: Vec<String> = [SMS_LEDGER_KEY, TELEGRAM_LEDGER_KEY]
        .into_iter()
        .map(|key| {
            let ledger = LedgerStore::new(path, key, config.state.max_entries).load();
            format!("{key}={}", ledger.len())
        })
        .collect();
    CheckResult::new(name, CheckStatus::Pass, counts.join(", "), start)
}

/// Open and close the configured printer.
async fn check_printer(config: &KidfaxConfig) -> CheckResult {
    let start = Instant::now();
    let name = "Printer";

    let codepage = match Codepage::from_label(&config.printer.encoding) {
        Ok(codepage) => codepage,
        Err(e) => return CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    };
    let driver = build_driver(&config.printer, codepage);
    if config.printer.driver == PrinterDriverKind::Dummy {
        return adapter_result(name, driver.as_ref(), start).await;
    }

    match with_timeout(driver.connect()).await {
        Ok(_connection) => CheckResult::new(
            name,
            CheckStatus::Pass,
            format!("{} driver connected", driver.name()),
            start,
        ),
        Err(e) if config.printer.allow_dummy => CheckResult::new(
            name,
            CheckStatus::Warn,
            format!("{e} (dummy fallback enabled)"),
            start,
        ),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

fn check_avatars(config: &KidfaxConfig) -> CheckResult {
    let start = Instant::now();
    let name = "Avatars";
    if !config.avatar.enabled {
        return CheckResult::new(name, CheckStatus::Pass, "disabled", start);
    }

    let store = AvatarStore::new(
        &config.avatar.dir,
        config.avatar.size,
        std::sync::Arc::new(DitherProcessor::new()),
    );
    if !store.dir().is_dir() {
        return CheckResult::new(
            name,
            CheckStatus::Warn,
            format!("directory not found: {}", store.dir().display()),
            start,
        );
    }

    let avatars = store.list();
    let missing: Vec<&str> = config
        .directory
        .contacts
        .keys()
        .map(String::as_str)
        .filter(|contact| store.find(contact).is_none())
        .collect();
    if missing.is_empty() {
        CheckResult::new(
            name,
            CheckStatus::Pass,
            format!("{} found", avatars.len()),
            start,
        )
    } else {
        CheckResult::new(
            name,
            CheckStatus::Warn,
            format!("no avatar for: {}", missing.join(", ")),
            start,
        )
    }
}

async fn check_display(config: &KidfaxConfig) -> CheckResult {
    let start = Instant::now();
    let display = build_display(config);
    adapter_result("Display", display.as_ref(), start).await
}

async fn check_sms(config: &KidfaxConfig) -> CheckResult {
    let start = Instant::now();
    let name = "SMS";
    if config.sms.account_sid.is_none() && config.sms.auth_token.is_none() {
        return CheckResult::new(name, CheckStatus::Warn, "not configured", start);
    }
    match SmsSource::new(&config.sms) {
        Ok(source) => adapter_result(name, &source, start).await,
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_telegram(config: &KidfaxConfig) -> CheckResult {
    let start = Instant::now();
    let name = "Telegram";
    if config.telegram.bot_token.is_none() {
        return CheckResult::new(name, CheckStatus::Warn, "not configured", start);
    }
    match TelegramSource::new(&config.telegram) {
        Ok(source) => adapter_result(name, &source, start).await,
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

/// Maps an adapter health check onto a check result.
async fn adapter_result<A>(name: &str, adapter: &A, start: Instant) -> CheckResult
where
    A: PluginAdapter + ?Sized,
{
    match with_timeout(adapter.health_check()).await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::new(name, CheckStatus::Pass, format!("{} ok", adapter.name()), start)
        }
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new(name, CheckStatus::Warn, reason, start)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new(name, CheckStatus::Fail, reason, start)
        }
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

async fn with_timeout<T>(
    check: impl Future<Output = Result<T, KidfaxError>>,
) -> Result<T, KidfaxError> {
    tokio::time::timeout(CHECK_TIMEOUT, check)
        .await
        .map_err(|_| KidfaxError::Timeout {
            duration: CHECK_TIMEOUT,
        })?
}

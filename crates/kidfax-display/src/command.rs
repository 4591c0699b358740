// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status display driven by an external program.
//!
//! The program receives four positional arguments after its own configured
//! ones: header, subtitle, `New: <count>`, and `Last: <label>` (empty when
//! there is no label). A Waveshare e-paper script is the usual target.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use kidfax_core::{AdapterType, HealthStatus, KidfaxError, PluginAdapter, StatusDisplay};
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CommandDisplay {
    /// Program followed by its fixed arguments.
    argv: Vec<String>,
    header: String,
    subtitle: String,
    timeout: Duration,
}

impl CommandDisplay {
    pub fn new(argv: Vec<String>, header: &str, subtitle: &str, timeout: Duration) -> Self {
        Self {
            argv,
            header: header.to_string(),
            subtitle: subtitle.to_string(),
            timeout,
        }
    }

    /// Arguments appended after the configured argv.
    fn status_args(&self, printed_count: usize, last_sender_label: Option<&str>) -> [String; 4] {
        let last = last_sender_label
            .map(|label| format!("Last: {}", printable(label)))
            .unwrap_or_default();
        [
            printable(&self.header),
            printable(&self.subtitle),
            format!("New: {printed_count}"),
            last,
        ]
    }
}

/// Drops control characters so a sender label cannot smuggle escapes into
/// the display program.
fn printable(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

#[async_trait]
impl PluginAdapter for CommandDisplay {
    fn name(&self) -> &str {
        "command"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Display
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        match self.argv.first() {
            None => Ok(HealthStatus::Unhealthy(
                "display command is empty".to_string(),
            )),
            Some(program) if program.contains('/') && !std::path::Path::new(program).exists() => {
                Ok(HealthStatus::Unhealthy(format!("{program} does not exist")))
            }
            Some(_) => Ok(HealthStatus::Healthy),
        }
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl StatusDisplay for CommandDisplay {
    async fn show_batch_result(
        &self,
        printed_count: usize,
        last_sender_label: Option<&str>,
    ) -> Result<(), KidfaxError> {
        let Some((program, fixed)) = self.argv.split_first() else {
            return Err(KidfaxError::Display {
                message: "display command is empty".to_string(),
            });
        };

        let child = Command::new(program)
            .args(fixed)
            .args(self.status_args(printed_count, last_sender_label))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| KidfaxError::Display {
                message: format!("failed to start {program}: {e}"),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| KidfaxError::Timeout {
                duration: self.timeout,
            })?
            .map_err(|e| KidfaxError::Display {
                message: format!("{program} failed: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KidfaxError::Display {
                message: format!("{program} exited with {}: {}", output.status, stderr.trim()),
            });
        }

        debug!(program = %program, printed_count, "status display updated");
        Ok(())
    }
}

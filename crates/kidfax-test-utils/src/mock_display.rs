// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use kidfax_core::{AdapterType, HealthStatus, KidfaxError, PluginAdapter, StatusDisplay};
use tokio::sync::Mutex;

/// Records every `show_batch_result` call. Optionally fails or never
/// returns after recording.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    calls: Arc<Mutex<Vec<(usize, Option<String>)>>>,
    failing: Arc<AtomicBool>,
    hanging: Arc<AtomicBool>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call return an error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Makes every later call block forever, like a wedged display script.
    pub fn set_hanging(&self, hanging: bool) {
        self.hanging.store(hanging, Ordering::SeqCst);
    }

    /// `(printed_count, last_sender_label)` per call.
    pub async fn calls(&self) -> Vec<(usize, Option<String>)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for RecordingDisplay {
    fn name(&self) -> &str {
        "recording-display"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Display
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl StatusDisplay for RecordingDisplay {
    async fn show_batch_result(
        &self,
        printed_count: usize,
        last_sender_label: Option<&str>,
    ) -> Result<(), KidfaxError> {
        self.calls
            .lock()
            .await
            .push((printed_count, last_sender_label.map(str::to_string)));
        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(KidfaxError::Display {
                message: "recording display told to fail".to_string(),
            });
        }
        Ok(())
    }
}

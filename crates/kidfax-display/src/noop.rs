// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use kidfax_core::{AdapterType, HealthStatus, KidfaxError, PluginAdapter, StatusDisplay};

/// Used when no status display is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDisplay;

#[async_trait]
impl PluginAdapter for NoopDisplay {
    fn name(&self) -> &str {
        "noop"
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
impl StatusDisplay for NoopDisplay {
    async fn show_batch_result(
        &self,
        _printed_count: usize,
        _last_sender_label: Option<&str>,
    ) -> Result<(), KidfaxError> {
        Ok(())
    }
}

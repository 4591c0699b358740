// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! USB printers exposed by the kernel `usblp` driver as a device file.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use kidfax_core::{
    AdapterType, HealthStatus, KidfaxError, PluginAdapter, PrinterConnection, PrinterDriver,
};
use tracing::info;

use crate::escpos::EscPosEncoder;
use crate::stream::StreamConnection;

pub struct UsbDriver {
    device: PathBuf,
    encoder: EscPosEncoder,
    write_timeout: Duration,
}

impl UsbDriver {
    pub fn new(device: impl Into<PathBuf>, encoder: EscPosEncoder) -> Self {
        Self {
            device: device.into(),
            encoder,
            write_timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait]
impl PluginAdapter for UsbDriver {
    fn name(&self) -> &str {
        "usb"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Printer
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        match tokio::fs::metadata(&self.device).await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "{}: {e}",
                self.device.display()
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl PrinterDriver for UsbDriver {
    async fn connect(&self) -> Result<Box<dyn PrinterConnection>, KidfaxError> {
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .open(&self.device)
            .await
            .map_err(|e| KidfaxError::PrinterUnavailable {
                message: format!("cannot open {}", self.device.display()),
                source: Some(Box::new(e)),
            })?;
        let conn = StreamConnection::open(file, self.encoder, self.write_timeout).await?;
        info!(device = %self.device.display(), "connected to USB printer");
        Ok(Box::new(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kidfax_core::Directive;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_to_device_file() {
        let dir = tempdir().unwrap();
        let device = dir.path().join("lp0");
        std::fs::write(&device, b"").unwrap();

        let driver = UsbDriver::new(&device, EscPosEncoder::default());
        assert_eq!(driver.health_check().await.unwrap(), HealthStatus::Healthy);
        let mut conn = driver.connect().await.unwrap();
        conn.write(&[Directive::Line("ok".to_string())]).await.unwrap();
        drop(conn);

        let written = std::fs::read(&device).unwrap();
        assert!(written.ends_with(b"ok\n"));
    }

    #[tokio::test]
    async fn missing_device_is_unavailable() {
        let dir = tempdir().unwrap();
        let driver = UsbDriver::new(dir.path().join("absent"), EscPosEncoder::default());
        let err = driver.connect().await.err().unwrap();
        assert!(matches!(err, KidfaxError::PrinterUnavailable { .. }));
        assert!(matches!(
            driver.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}

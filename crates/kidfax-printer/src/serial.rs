// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serial printers, including Bluetooth printers bound to an rfcomm device.
//!
//! `serialport` is blocking, so opens and writes run on the blocking pool.

use std::io::Write;
use std::time::Duration;

use async_trait::async_trait;
use kidfax_core::{
    AdapterType, Directive, HealthStatus, KidfaxError, PluginAdapter, PrinterConnection,
    PrinterDriver,
};
use serialport::SerialPort;
use tracing::info;

use crate::escpos::EscPosEncoder;

pub struct SerialDriver {
    /// `serial` or `bluetooth`.
    name: &'static str,
    port: String,
    baud_rate: u32,
    timeout: Duration,
    encoder: EscPosEncoder,
}

impl SerialDriver {
    pub fn new(
        port: impl Into<String>,
        baud_rate: u32,
        timeout: Duration,
        encoder: EscPosEncoder,
    ) -> Self {
        Self {
            name: "serial",
            port: port.into(),
            baud_rate,
            timeout,
            encoder,
        }
    }

    /// A serial driver for a Bluetooth SPP link such as `/dev/rfcomm0`.
    pub fn bluetooth(
        port: impl Into<String>,
        baud_rate: u32,
        timeout: Duration,
        encoder: EscPosEncoder,
    ) -> Self {
        Self {
            name: "bluetooth",
            ..Self::new(port, baud_rate, timeout, encoder)
        }
    }
}

#[async_trait]
impl PluginAdapter for SerialDriver {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Printer
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        if std::path::Path::new(&self.port).exists() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy(format!("{} does not exist", self.port)))
        }
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl PrinterDriver for SerialDriver {
    async fn connect(&self) -> Result<Box<dyn PrinterConnection>, KidfaxError> {
        let port_name = self.port.clone();
        let baud_rate = self.baud_rate;
        let timeout = self.timeout;

        let opened = tokio::task::spawn_blocking(move || {
            serialport::new(&port_name, baud_rate)
                .timeout(timeout)
                .data_bits(serialport::DataBits::Eight)
                .stop_bits(serialport::StopBits::One)
                .parity(serialport::Parity::None)
                .open()
        })
        .await
        .map_err(|e| KidfaxError::Internal(format!("serial open task failed: {e}")))?;

        let port = opened.map_err(|e| KidfaxError::PrinterUnavailable {
            message: format!("cannot open {}", self.port),
            source: Some(Box::new(e)),
        })?;

        let mut conn = SerialConnection {
            port: Some(port),
            encoder: self.encoder,
        };
        let init = self.encoder.init();
        conn.send(init).await.map_err(|e| KidfaxError::PrinterUnavailable {
            message: format!("{} did not accept reset", self.port),
            source: Some(Box::new(e)),
        })?;
        info!(
            driver = self.name,
            port = %self.port,
            baud = self.baud_rate,
            "connected to serial printer"
        );
        Ok(Box::new(conn))
    }
}

struct SerialConnection {
    /// Taken while a write is in flight on the blocking pool.
    port: Option<Box<dyn SerialPort>>,
    encoder: EscPosEncoder,
}

impl SerialConnection {
    async fn send(&mut self, bytes: Vec<u8>) -> Result<(), KidfaxError> {
        let mut port = self.port.take().ok_or_else(|| KidfaxError::PrinterWrite {
            message: "serial port lost after an earlier failure".to_string(),
            source: None,
        })?;

        let (port, result) = tokio::task::spawn_blocking(move || {
            let result = port.write_all(&bytes).and_then(|()| port.flush());
            (port, result)
        })
        .await
        .map_err(|e| KidfaxError::Internal(format!("serial write task failed: {e}")))?;

        self.port = Some(port);
        result.map_err(|e| KidfaxError::printer_write("serial write failed", e))
    }
}

#[async_trait]
impl PrinterConnection for SerialConnection {
    async fn write(&mut self, directives: &[Directive]) -> Result<(), KidfaxError> {
        let bytes = self.encoder.encode(directives);
        self.send(bytes).await
    }

    async fn cut(&mut self) -> Result<(), KidfaxError> {
        let bytes = self.encoder.cut();
        self.send(bytes).await
    }
}

// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw TCP printers (JetDirect / port 9100).

use std::time::Duration;

use async_trait::async_trait;
use kidfax_core::{
    AdapterType, HealthStatus, KidfaxError, PluginAdapter, PrinterConnection, PrinterDriver,
};
use tokio::net::TcpStream;
use tracing::info;

use crate::escpos::EscPosEncoder;
use crate::stream::StreamConnection;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct NetworkDriver {
    host: String,
    port: u16,
    encoder: EscPosEncoder,
}

impl NetworkDriver {
    pub fn new(host: impl Into<String>, port: u16, encoder: EscPosEncoder) -> Self {
        Self {
            host: host.into(),
            port,
            encoder,
        }
    }

    async fn dial(&self) -> Result<TcpStream, KidfaxError> {
        let addr = format!("{}:{}", self.host, self.port);
        match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(KidfaxError::PrinterUnavailable {
                message: format!("cannot connect to {addr}"),
                source: Some(Box::new(e)),
            }),
            Err(_) => Err(KidfaxError::PrinterUnavailable {
                message: format!("connecting to {addr} timed out"),
                source: None,
            }),
        }
    }
}

#[async_trait]
impl PluginAdapter for NetworkDriver {
    fn name(&self) -> &str {
        "network"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Printer
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        match self.dial().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl PrinterDriver for NetworkDriver {
    async fn connect(&self) -> Result<Box<dyn PrinterConnection>, KidfaxError> {
        let stream = self.dial().await?;
        let conn = StreamConnection::open(stream, self.encoder, WRITE_TIMEOUT).await?;
        info!(host = %self.host, port = self.port, "connected to network printer");
        Ok(Box::new(conn))
    }
}

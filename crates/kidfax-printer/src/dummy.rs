// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stand-in printer that writes a plain-text rendering instead of ESC/POS.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kidfax_core::{
    AdapterType, Directive, HealthStatus, KidfaxError, PluginAdapter, PrinterConnection,
    PrinterDriver,
};
use tracing::warn;

const BANNER: &str = "[kidfax] --- dummy printer output ---";

/// Where dummy output goes.
#[derive(Clone)]
enum Output {
    Stdout,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

impl Output {
    fn emit(&self, text: &str) -> Result<(), KidfaxError> {
        match self {
            Output::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(text.as_bytes())
                    .and_then(|()| out.flush())
                    .map_err(|e| KidfaxError::printer_write("stdout write failed", e))
            }
            Output::Buffer(buf) => {
                let mut buf = buf
                    .lock()
                    .map_err(|_| KidfaxError::Internal("dummy buffer poisoned".to_string()))?;
                buf.extend_from_slice(text.as_bytes());
                Ok(())
            }
        }
    }
}

/// Prints receipts as text, for bench testing without hardware.
#[derive(Clone)]
pub struct DummyDriver {
    output: Output,
    rule_width: usize,
}

impl DummyDriver {
    pub fn stdout(rule_width: usize) -> Self {
        Self {
            output: Output::Stdout,
            rule_width,
        }
    }

    /// Captures output in memory; returns the driver and the shared buffer.
    pub fn captured(rule_width: usize) -> (Self, Arc<Mutex<Vec<u8>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let driver = Self {
            output: Output::Buffer(buf.clone()),
            rule_width,
        };
        (driver, buf)
    }
}

#[async_trait]
impl PluginAdapter for DummyDriver {
    fn name(&self) -> &str {
        "dummy"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Printer
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        Ok(HealthStatus::Degraded("dummy printer, output goes to stdout".to_string()))
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl PrinterDriver for DummyDriver {
    async fn connect(&self) -> Result<Box<dyn PrinterConnection>, KidfaxError> {
        warn!("using dummy printer backend");
        self.output.emit(&format!("{BANNER}\n"))?;
        Ok(Box::new(DummyConnection {
            output: self.output.clone(),
            rule_width: self.rule_width,
        }))
    }
}

struct DummyConnection {
    output: Output,
    rule_width: usize,
}

#[async_trait]
impl PrinterConnection for DummyConnection {
    async fn write(&mut self, directives: &[Directive]) -> Result<(), KidfaxError> {
        let mut text = String::new();
        for directive in directives {
            match directive {
                Directive::Style(_) | Directive::Cut => {}
                Directive::Line(line) => {
                    text.push_str(line);
                    text.push('\n');
                }
                Directive::Image(image) => {
                    text.push_str(&format!("[image {}x{}]\n", image.width, image.height));
                }
                Directive::Feed(lines) => {
                    text.push_str(&"\n".repeat(usize::from(*lines)));
                }
            }
        }
        self.output.emit(&text)
    }

    async fn cut(&mut self) -> Result<(), KidfaxError> {
        self.output
            .emit(&format!("\n{}\n", "-".repeat(self.rule_width)))
    }
}

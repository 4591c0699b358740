// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock printer driver that records receipts and fails on demand.
//!
//! A receipt counts as printed once its cut (or the fallback feed after a
//! failed cut) succeeds. Output from a failed write is discarded.

use std::sync::Arc;

use async_trait::async_trait;
use kidfax_core::{
    AdapterType, Directive, HealthStatus, KidfaxError, PluginAdapter, PrinterConnection,
    PrinterDriver,
};
use tokio::sync::Mutex;

#[derive(Default)]
struct Paper {
    fail_connects: usize,
    fail_writes: usize,
    fail_cuts: bool,
    connects: usize,
    pending: Vec<Directive>,
    receipts: Vec<Vec<Directive>>,
}

/// A [`PrinterDriver`] backed by memory. Clones share the same paper.
#[derive(Clone, Default)]
pub struct MockPrinter {
    paper: Arc<Mutex<Paper>>,
}

impl MockPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` connection attempts fail.
    pub async fn fail_connects(&self, count: usize) {
        self.paper.lock().await.fail_connects = count;
    }

    /// Makes the next `count` writes fail.
    pub async fn fail_writes(&self, count: usize) {
        self.paper.lock().await.fail_writes = count;
    }

    /// Makes every cut fail, as on printers without a cutter.
    pub async fn fail_cuts(&self) {
        self.paper.lock().await.fail_cuts = true;
    }

    pub async fn connect_count(&self) -> usize {
        self.paper.lock().await.connects
    }

    /// Completed receipts, oldest first.
    pub async fn receipts(&self) -> Vec<Vec<Directive>> {
        self.paper.lock().await.receipts.clone()
    }

    pub async fn receipt_count(&self) -> usize {
        self.paper.lock().await.receipts.len()
    }

    /// Text lines of each completed receipt.
    pub async fn printed_lines(&self) -> Vec<Vec<String>> {
        self.paper
            .lock()
            .await
            .receipts
            .iter()
            .map(|directives| {
                directives
                    .iter()
                    .filter_map(|d| match d {
                        Directive::Line(line) => Some(line.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .collect()
    }
}

#[async_trait]
impl PluginAdapter for MockPrinter {
    fn name(&self) -> &str {
        "mock-printer"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Printer
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl PrinterDriver for MockPrinter {
    async fn connect(&self) -> Result<Box<dyn PrinterConnection>, KidfaxError> {
        let mut paper = self.paper.lock().await;
        if paper.fail_connects > 0 {
            paper.fail_connects -= 1;
            return Err(KidfaxError::PrinterUnavailable {
                message: "mock printer unplugged".to_string(),
                source: None,
            });
        }
        paper.connects += 1;
        paper.pending.clear();
        Ok(Box::new(MockConnection {
            paper: self.paper.clone(),
        }))
    }
}

struct MockConnection {
    paper: Arc<Mutex<Paper>>,
}

#[async_trait]
impl PrinterConnection for MockConnection {
    async fn write(&mut self, directives: &[Directive]) -> Result<(), KidfaxError> {
        let mut paper = self.paper.lock().await;
        if paper.fail_writes > 0 {
            paper.fail_writes -= 1;
            paper.pending.clear();
            return Err(KidfaxError::PrinterWrite {
                message: "mock paper jam".to_string(),
                source: None,
            });
        }
        // A feed on its own after a failed cut finishes the receipt.
        if paper.fail_cuts && matches!(directives, [Directive::Feed(_)]) {
            let receipt = std::mem::take(&mut paper.pending);
            paper.receipts.push(receipt);
            return Ok(());
        }
        paper.pending.extend_from_slice(directives);
        Ok(())
    }

    async fn cut(&mut self) -> Result<(), KidfaxError> {
        let mut paper = self.paper.lock().await;
        if paper.fail_cuts {
            return Err(KidfaxError::PrinterWrite {
                message: "mock cutter missing".to_string(),
                source: None,
            });
        }
        let receipt = std::mem::take(&mut paper.pending);
        paper.receipts.push(receipt);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_receipts_and_fails_on_demand() {
        let printer = MockPrinter::new();
        printer.fail_connects(1).await;
        assert!(printer.connect().await.is_err());

        let mut conn = printer.connect().await.unwrap();
        printer.fail_writes(1).await;
        assert!(conn.write(&[Directive::Line("lost".into())]).await.is_err());

        conn.write(&[Directive::Line("kept".into())]).await.unwrap();
        conn.cut().await.unwrap();
        assert_eq!(printer.printed_lines().await, vec![vec!["kept".to_string()]]);
        assert_eq!(printer.connect_count().await, 1);
    }
}

// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Printer sink: owns at most one open connection and reopens on demand.
//!
//! ```text
//! Disconnected --open ok--> Connected --print ok--> Connected
//!      ^                        |
//!      +------print fails-------+
//! ```

use std::sync::Arc;

use kidfax_core::{Directive, KidfaxError, PrinterConnection, PrinterDriver, Receipt};
use tracing::{debug, info, warn};

/// Lines fed when the cutter fails, so the receipt can be torn off.
const CUT_FALLBACK_FEED: u8 = 3;

/// Observable connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterState {
    Disconnected,
    Connected,
}

/// Lazily connected printer with an optional fallback driver.
///
/// Any failed write drops the connection; the next `print` reconnects.
pub struct PrinterSink {
    driver: Arc<dyn PrinterDriver>,
    fallback: Option<Arc<dyn PrinterDriver>>,
    connection: Option<Box<dyn PrinterConnection>>,
    /// Name of the driver behind `connection`.
    active: Option<String>,
}

impl PrinterSink {
    /// A disconnected sink over `driver`.
    pub fn new(driver: Arc<dyn PrinterDriver>) -> Self {
        Self {
            driver,
            fallback: None,
            connection: None,
            active: None,
        }
    }

    /// Driver to use when the primary one cannot be opened.
    pub fn with_fallback(mut self, fallback: Arc<dyn PrinterDriver>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn state(&self) -> PrinterState {
        if self.connection.is_some() {
            PrinterState::Connected
        } else {
            PrinterState::Disconnected
        }
    }

    pub fn driver(&self) -> &Arc<dyn PrinterDriver> {
        &self.driver
    }

    /// Name of the connected driver, if any.
    pub fn active_driver(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Connects if not already connected.
    pub async fn open(&mut self) -> Result<(), KidfaxError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let (connection, name) = match self.driver.connect().await {
            Ok(conn) => (conn, self.driver.name().to_string()),
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    warn!(
                        driver = self.driver.name(),
                        error = %e,
                        fallback = fallback.name(),
                        "printer unavailable, using fallback"
                    );
                    (fallback.connect().await?, fallback.name().to_string())
                }
                None => return Err(e),
            },
        };

        info!(driver = %name, "printer connected");
        self.connection = Some(connection);
        self.active = Some(name);
        Ok(())
    }

    /// Drops the open connection, if any.
    pub fn disconnect(&mut self) {
        if self.connection.take().is_some() {
            debug!(driver = ?self.active, "printer disconnected");
        }
        self.active = None;
    }

    /// Prints one receipt, opening the printer first when needed.
    ///
    /// Any failure leaves the sink disconnected.
    pub async fn print(&mut self, receipt: &Receipt) -> Result<(), KidfaxError> {
        self.open().await?;
        let Some(conn) = self.connection.as_mut() else {
            return Err(KidfaxError::Internal(
                "printer connection missing after open".to_string(),
            ));
        };

        match send(conn.as_mut(), &receipt.directives).await {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(driver = ?self.active, error = %e, "printer write failed, disconnecting");
                self.disconnect();
                Err(e)
            }
        }
    }
}

/// Writes directives in runs, sending each `Cut` separately.
async fn send(
    conn: &mut dyn PrinterConnection,
    directives: &[Directive],
) -> Result<(), KidfaxError> {
    for run in directives.split_inclusive(|d| matches!(d, Directive::Cut)) {
        let (body, cut) = match run.split_last() {
            Some((Directive::Cut, body)) => (body, true),
            _ => (run, false),
        };
        if !body.is_empty() {
            conn.write(body).await?;
        }
        if cut && let Err(e) = conn.cut().await {
            debug!(error = %e, "cut failed, feeding paper instead");
            conn.write(&[Directive::Feed(CUT_FALLBACK_FEED)]).await?;
        }
    }
    Ok(())
}

impl std::fmt::Debug for PrinterSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterSink")
            .field("driver", &self.driver.name())
            .field("state", &self.state())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dummy::DummyDriver;
    use async_trait::async_trait;
    use kidfax_core::{AdapterType, HealthStatus, PluginAdapter};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted driver: connects `fail_connects` times with an error first,
    /// and its connections fail writes or cuts on request.
    #[derive(Default)]
    struct Scripted {
        fail_connects: AtomicUsize,
        fail_cut: bool,
        fail_writes: AtomicUsize,
        log: Arc<Mutex<Vec<String>>>,
    }

    struct ScriptedConn {
        fail_cut: bool,
        driver: Arc<Scripted>,
    }

    #[async_trait]
    impl PluginAdapter for Scripted {
        fn name(&self) -> &str {
            "scripted"
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

    struct Handle(Arc<Scripted>);

    #[async_trait]
    impl PluginAdapter for Handle {
        fn name(&self) -> &str {
            self.0.name()
        }
        fn version(&self) -> semver::Version {
            self.0.version()
        }
        fn adapter_type(&self) -> AdapterType {
            self.0.adapter_type()
        }
        async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
            self.0.health_check().await
        }
        async fn shutdown(&self) -> Result<(), KidfaxError> {
            Ok(())
        }
    }

    #[async_trait]
    impl PrinterDriver for Handle {
        async fn connect(&self) -> Result<Box<dyn PrinterConnection>, KidfaxError> {
            let remaining = self.0.fail_connects.load(Ordering::SeqCst);
            if remaining > 0 {
                self.0.fail_connects.store(remaining - 1, Ordering::SeqCst);
                return Err(KidfaxError::PrinterUnavailable {
                    message: "offline".to_string(),
                    source: None,
                });
            }
            self.0.log.lock().unwrap().push("connect".to_string());
            Ok(Box::new(ScriptedConn {
                fail_cut: self.0.fail_cut,
                driver: self.0.clone(),
            }))
        }
    }

    #[async_trait]
    impl PrinterConnection for ScriptedConn {
        async fn write(&mut self, directives: &[Directive]) -> Result<(), KidfaxError> {
            let remaining = self.driver.fail_writes.load(Ordering::SeqCst);
            if remaining > 0 {
                self.driver.fail_writes.store(remaining - 1, Ordering::SeqCst);
                return Err(KidfaxError::printer_write(
                    "paper jam",
                    std::io::Error::other("jam"),
                ));
            }
            self.driver
                .log
                .lock()
                .unwrap()
                .push(format!("write {}", directives.len()));
            Ok(())
        }

        async fn cut(&mut self) -> Result<(), KidfaxError> {
            if self.fail_cut {
                return Err(KidfaxError::printer_write(
                    "no cutter",
                    std::io::Error::other("cutter"),
                ));
            }
            self.driver.log.lock().unwrap().push("cut".to_string());
            Ok(())
        }
    }

    fn receipt() -> Receipt {
        let mut r = Receipt::new();
        r.line("hello");
        r.blank();
        r.push(Directive::Cut);
        r
    }

    fn log(driver: &Scripted) -> Vec<String> {
        driver.log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn print_opens_then_stays_connected() {
        let driver = Arc::new(Scripted::default());
        let mut sink = PrinterSink::new(Arc::new(Handle(driver.clone())));
        assert_eq!(sink.state(), PrinterState::Disconnected);

        sink.print(&receipt()).await.unwrap();
        sink.print(&receipt()).await.unwrap();
        assert_eq!(sink.state(), PrinterState::Connected);
        assert_eq!(sink.active_driver(), Some("scripted"));
        assert_eq!(
            log(&driver),
            vec!["connect", "write 2", "cut", "write 2", "cut"]
        );
    }

    #[tokio::test]
    async fn open_failure_stays_disconnected() {
        let driver = Arc::new(Scripted {
            fail_connects: AtomicUsize::new(1),
            ..Default::default()
        });
        let mut sink = PrinterSink::new(Arc::new(Handle(driver.clone())));
        let err = sink.open().await.unwrap_err();
        assert!(matches!(err, KidfaxError::PrinterUnavailable { .. }));
        assert_eq!(sink.state(), PrinterState::Disconnected);

        sink.open().await.unwrap();
        assert_eq!(sink.state(), PrinterState::Connected);
    }

    #[tokio::test]
    async fn write_failure_disconnects() {
        let driver = Arc::new(Scripted {
            fail_writes: AtomicUsize::new(1),
            ..Default::default()
        });
        let mut sink = PrinterSink::new(Arc::new(Handle(driver.clone())));
        let err = sink.print(&receipt()).await.unwrap_err();
        assert!(err.is_printer_failure());
        assert_eq!(sink.state(), PrinterState::Disconnected);

        sink.print(&receipt()).await.unwrap();
        assert_eq!(log(&driver), vec!["connect", "connect", "write 2", "cut"]);
    }

    #[tokio::test]
    async fn failed_cut_feeds_instead() {
        let driver = Arc::new(Scripted {
            fail_cut: true,
            ..Default::default()
        });
        let mut sink = PrinterSink::new(Arc::new(Handle(driver.clone())));
        sink.print(&receipt()).await.unwrap();
        assert_eq!(log(&driver), vec!["connect", "write 2", "write 1"]);
        assert_eq!(sink.state(), PrinterState::Connected);
    }

    #[tokio::test]
    async fn falls_back_to_dummy_when_allowed() {
        let driver = Arc::new(Scripted {
            fail_connects: AtomicUsize::new(5),
            ..Default::default()
        });
        let (dummy, buf) = DummyDriver::captured(32);
        let mut sink =
            PrinterSink::new(Arc::new(Handle(driver))).with_fallback(Arc::new(dummy));
        sink.print(&receipt()).await.unwrap();
        assert_eq!(sink.active_driver(), Some("dummy"));
        let out = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(out.contains("hello\n"));
    }
}

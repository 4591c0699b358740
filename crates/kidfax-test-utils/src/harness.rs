// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline tests.
//!
//! `TestHarness` wires the real [`Pipeline`] to a [`MockSource`], a
//! [`MockPrinter`], a [`RecordingDisplay`], and a state file in a temp
//! directory. `cycle()` runs one poll cycle; `restart()` simulates a process
//! restart by reloading the Seen-Set from disk.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use kidfax_core::{Directory, KidfaxError, MessageSource};
use kidfax_pipeline::{CycleReport, Pipeline, PipelineSettings, PipelineState};
use kidfax_printer::PrinterSink;
use kidfax_receipt::{Codepage, DitherProcessor, ReceiptRenderer, RenderSettings};
use kidfax_state::{LedgerStore, SMS_LEDGER_KEY, TELEGRAM_LEDGER_KEY};

use crate::mock_display::RecordingDisplay;
use crate::mock_printer::MockPrinter;
use crate::mock_source::MockSource;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    source: MockSource,
    contacts: BTreeMap<String, String>,
    allowlist: BTreeSet<String>,
    max_entries: usize,
    line_width: usize,
}

impl TestHarnessBuilder {
    fn new(source: MockSource) -> Self {
        Self {
            source,
            contacts: BTreeMap::new(),
            allowlist: BTreeSet::new(),
            max_entries: 5000,
            line_width: 32,
        }
    }

    /// Registers a contact name for a sender id.
    pub fn with_contact(mut self, name: &str, sender_id: &str) -> Self {
        self.contacts.insert(name.to_string(), sender_id.to_string());
        self
    }

    /// Restricts printing to these sender ids.
    pub fn with_allowlist(mut self, sender_ids: &[&str]) -> Self {
        self.allowlist = sender_ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_line_width(mut self, line_width: usize) -> Self {
        self.line_width = line_width;
        self
    }

    /// Creates the temp state directory and assembles the pipeline.
    pub fn build(self) -> Result<TestHarness, KidfaxError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| KidfaxError::State {
            source: Box::new(e),
        })?;
        let state_path = temp_dir.path().join("state.json");
        let printer = MockPrinter::new();
        let display = RecordingDisplay::new();
        let directory = Directory::new(self.contacts, self.allowlist);

        let mut harness = TestHarness {
            source: self.source,
            printer,
            display,
            directory,
            max_entries: self.max_entries,
            line_width: self.line_width,
            state_path,
            pipeline: None,
            state: None,
            _temp_dir: temp_dir,
        };
        harness.restart();
        Ok(harness)
    }
}

/// A pipeline wired to mocks, with its loop state held between cycles.
pub struct TestHarness {
    pub source: MockSource,
    pub printer: MockPrinter,
    pub display: RecordingDisplay,
    directory: Directory,
    max_entries: usize,
    line_width: usize,
    state_path: PathBuf,
    pipeline: Option<Pipeline>,
    state: Option<PipelineState>,
    /// Kept alive so the state file survives until the harness drops.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// A harness around a windowed (SMS-like) source.
    pub fn sms() -> TestHarnessBuilder {
        TestHarnessBuilder::new(MockSource::window(SMS_LEDGER_KEY))
    }

    /// A harness around a long-polling (Telegram-like) source.
    pub fn telegram() -> TestHarnessBuilder {
        TestHarnessBuilder::new(MockSource::long_poll(TELEGRAM_LEDGER_KEY))
    }

    fn store(&self) -> LedgerStore {
        LedgerStore::new(
            self.state_path.clone(),
            self.source.ledger_key(),
            self.max_entries,
        )
    }

    /// Drops the pipeline and its loop state and builds fresh ones, as a new
    /// process would. The printer mock and the state file are kept.
    pub fn restart(&mut self) {
        let renderer = ReceiptRenderer::new(
            RenderSettings {
                line_width: self.line_width,
                ..RenderSettings::default()
            },
            Codepage::Cp437,
            None,
            Arc::new(DitherProcessor::new()),
        );
        let pipeline = Pipeline::new(
            Arc::new(self.source.clone()),
            renderer,
            PrinterSink::new(Arc::new(self.printer.clone())),
            Arc::new(self.display.clone()),
            self.store(),
            self.directory.clone(),
            PipelineSettings {
                poll_interval: Duration::from_millis(10),
                reconnect_backoff: Duration::from_millis(10),
            },
        );
        self.state = Some(pipeline.initial_state());
        self.pipeline = Some(pipeline);
    }

    /// Runs one poll cycle.
    pub async fn cycle(&mut self) -> Result<CycleReport, KidfaxError> {
        match (self.pipeline.as_mut(), self.state.as_mut()) {
            (Some(pipeline), Some(state)) => pipeline.run_cycle(state).await,
            _ => Err(KidfaxError::Internal("harness not built".to_string())),
        }
    }

    /// Current in-memory loop state.
    pub fn state(&self) -> Option<&PipelineState> {
        self.state.as_ref()
    }

    /// Mutable access to the pipeline, e.g. to call `run`.
    pub fn pipeline_mut(&mut self) -> Option<&mut Pipeline> {
        self.pipeline.as_mut()
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Ids in the state file, oldest first.
    pub fn persisted_ids(&self) -> Vec<String> {
        self.store()
            .load()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect()
    }
}

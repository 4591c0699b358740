// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The poller: fetch, filter, render, print, record.
//!
//! One [`Pipeline`] serves one source. Loop state lives in [`PipelineState`]
//! and is threaded through every [`Pipeline::run_cycle`] call, so a test can
//! drive cycles one at a time and inspect the state in between.

use std::sync::Arc;
use std::time::Duration;

use kidfax_core::{
    AuthorizedMessage, Cursor, Directory, KidfaxError, MessageSource, StatusDisplay,
};
use kidfax_printer::PrinterSink;
use kidfax_receipt::ReceiptRenderer;
use kidfax_state::{LedgerStore, SeenLedger};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::filter::{self, Verdict};

/// Smallest pause after a failed fetch, so a source without its own wait
/// (Telegram long polling) does not spin while offline.
const MIN_ERROR_DELAY: Duration = Duration::from_secs(5);

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Pause between cycles. Zero for long-polling sources.
    pub poll_interval: Duration,
    /// Pause after the printer could not be opened or a write failed.
    pub reconnect_backoff: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            reconnect_backoff: Duration::from_secs(10),
        }
    }
}

/// Mutable state carried from one cycle to the next.
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Ids already printed or rejected, loaded from disk at start.
    pub ledger: SeenLedger,
    /// Position for the next fetch. Held in memory only.
    pub cursor: Option<Cursor>,
    /// Label of the most recently printed sender.
    pub last_sender: Option<String>,
    /// The ledger changed since the last successful persist.
    pub unsaved: bool,
}

impl PipelineState {
    /// State for a fresh process: no cursor, nothing unsaved.
    pub fn new(ledger: SeenLedger) -> Self {
        Self {
            ledger,
            cursor: None,
            last_sender: None,
            unsaved: false,
        }
    }

    fn record(&mut self, id: kidfax_core::MessageId) {
        let evicted = self.ledger.append(id);
        if !evicted.is_empty() {
            debug!(evicted = evicted.len(), "seen-set full, dropped oldest ids");
        }
        self.unsaved = true;
    }
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// The printer could not be opened; nothing was fetched.
    pub sink_unavailable: bool,
    pub fetched: usize,
    /// Already in the Seen-Set.
    pub skipped: usize,
    pub rejected: usize,
    pub printed: usize,
    /// A write failed; the rest of the batch was left for the next cycle.
    pub print_failed: bool,
    pub persisted: bool,
}

impl CycleReport {
    fn unavailable() -> Self {
        Self {
            sink_unavailable: true,
            ..Self::default()
        }
    }

    /// Whether the loop should wait for the printer before the next cycle.
    pub fn needs_backoff(&self) -> bool {
        self.sink_unavailable || self.print_failed
    }
}

/// The poller for one source.
///
/// Owns the source, renderer, printer sink, status display, Seen-Set store
/// and sender directory. Built once at startup from configuration.
pub struct Pipeline {
    source: Arc<dyn MessageSource>,
    renderer: ReceiptRenderer,
    sink: PrinterSink,
    display: Arc<dyn StatusDisplay>,
    store: LedgerStore,
    directory: Directory,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn MessageSource>,
        renderer: ReceiptRenderer,
        sink: PrinterSink,
        display: Arc<dyn StatusDisplay>,
        store: LedgerStore,
        directory: Directory,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            renderer,
            sink,
            display,
            store,
            directory,
            settings,
        }
    }

    pub fn sink(&self) -> &PrinterSink {
        &self.sink
    }

    pub fn settings(&self) -> PipelineSettings {
        self.settings
    }

    /// Fresh state with the Seen-Set loaded from disk.
    pub fn initial_state(&self) -> PipelineState {
        let ledger = self.store.load();
        info!(
            source = self.source.name(),
            key = self.store.key(),
            entries = ledger.len(),
            "loaded seen-set"
        );
        PipelineState::new(ledger)
    }

    /// Runs one poll cycle.
    ///
    /// Returns `Err` only when the fetch failed; in that case `state` is
    /// untouched.
    pub async fn run_cycle(
        &mut self,
        state: &mut PipelineState,
    ) -> Result<CycleReport, KidfaxError> {
        if let Err(e) = self.sink.open().await {
            warn!(
                error = %e,
                retry_in = ?self.settings.reconnect_backoff,
                "printer is not available"
            );
            return Ok(CycleReport::unavailable());
        }

        let batch = self.source.fetch_new(state.cursor).await?;
        state.cursor = batch.cursor;

        let mut report = CycleReport {
            fetched: batch.messages.len(),
            ..CycleReport::default()
        };

        let mut messages = batch.messages;
        messages.sort_by_key(|m| m.received_order);

        for message in messages {
            if state.ledger.contains(&message.id) {
                report.skipped += 1;
                continue;
            }

            let authorized = match filter::authorize(message, &self.directory) {
                Verdict::Rejected { message, reason } => {
                    info!(
                        sender = %message.sender_id,
                        id = %message.id,
                        %reason,
                        "ignoring message"
                    );
                    state.record(message.id);
                    report.rejected += 1;
                    continue;
                }
                Verdict::Authorized(authorized) => authorized,
            };

            let authorized = self.resolve_attachment(authorized).await;
            let receipt = self.renderer.render(&authorized);
            match self.sink.print(&receipt).await {
                Ok(()) => {
                    info!(
                        sender = %authorized.label,
                        id = %authorized.message.id,
                        "printed message"
                    );
                    state.record(authorized.message.id);
                    state.last_sender = Some(authorized.label);
                    report.printed += 1;
                }
                Err(e) => {
                    warn!(
                        sender = %authorized.label,
                        id = %authorized.message.id,
                        error = %e,
                        "print failed, will retry"
                    );
                    if let Some(position) = authorized.message.cursor {
                        state.cursor = Some(Cursor::rewind_to(position));
                    }
                    report.print_failed = true;
                    break;
                }
            }
        }

        if report.printed > 0
            && let Err(e) = self
                .display
                .show_batch_result(report.printed, state.last_sender.as_deref())
                .await
        {
            debug!(error = %e, "status display update failed");
        }

        if state.unsaved {
            report.persisted = self.persist(state);
        }

        Ok(report)
    }

    /// Downloads a deferred attachment. A failed download prints the message
    /// without it.
    async fn resolve_attachment(&self, mut authorized: AuthorizedMessage) -> AuthorizedMessage {
        let Some(reference) = authorized.message.attachment_ref.take() else {
            return authorized;
        };
        match self.source.fetch_attachment(&reference).await {
            Ok(attachment) => authorized.message.attachment = attachment,
            Err(e) => warn!(
                id = %authorized.message.id,
                file_id = %reference.file_id,
                error = %e,
                "attachment download failed"
            ),
        }
        authorized
    }

    fn persist(&self, state: &mut PipelineState) -> bool {
        match self.store.persist(&state.ledger) {
            Ok(()) => {
                state.unsaved = false;
                true
            }
            Err(e) => {
                warn!(
                    error = %e,
                    path = %self.store.path().display(),
                    "failed to save seen-set"
                );
                false
            }
        }
    }

    /// Polls until `cancel` fires, then saves the Seen-Set one last time.
    ///
    /// Cancellation may interrupt a cycle. Ids recorded before that point
    /// are kept; a message whose write was in flight may print again.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), KidfaxError> {
        let mut state = self.initial_state();
        info!(
            source = self.source.name(),
            poll_interval = ?self.settings.poll_interval,
            "poller started"
        );

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.run_cycle(&mut state) => outcome,
            };

            let delay = match outcome {
                Ok(report) if report.needs_backoff() => self.settings.reconnect_backoff,
                Ok(report) => {
                    debug!(?report, "cycle finished");
                    self.settings.poll_interval
                }
                Err(e) => {
                    warn!(error = %e, "polling error");
                    self.settings.poll_interval.max(MIN_ERROR_DELAY)
                }
            };

            if delay.is_zero() {
                continue;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(source = self.source.name(), "stopping poller");
        self.persist(&mut state);
        self.sink.disconnect();
        if let Err(e) = self.source.shutdown().await {
            debug!(error = %e, "source shutdown failed");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.name())
            .field("sink", &self.sink)
            .field("display", &self.display.name())
            .field("store", &self.store.path())
            .field("settings", &self.settings)
            .finish()
    }
}

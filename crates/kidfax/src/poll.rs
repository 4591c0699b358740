// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kidfax poll` command implementation.
//!
//! Builds one source, the renderer, the printer sink, and the status display
//! from configuration, then runs the pipeline until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use kidfax_config::KidfaxConfig;
use kidfax_core::{KidfaxError, MessageSource};
use kidfax_display::build_display;
use kidfax_pipeline::{Pipeline, PipelineSettings, install_signal_handler};
use kidfax_printer::build_sink;
use kidfax_receipt::ReceiptRenderer;
use kidfax_sms::SmsSource;
use kidfax_state::LedgerStore;
use kidfax_telegram::TelegramSource;
use tracing::info;

use crate::SourceKind;

/// Run the `kidfax poll` command.
pub async fn run_poll(config: &KidfaxConfig, kind: SourceKind) -> Result<(), KidfaxError> {
    let source: Arc<dyn MessageSource> = match kind {
        SourceKind::Sms => Arc::new(SmsSource::new(&config.sms)?),
        SourceKind::Telegram => Arc::new(TelegramSource::new(&config.telegram)?),
    };

    let mut pipeline = build_pipeline(config, source, settings_for(config, kind))?;
    info!(
        source = ?kind,
        state = %config.state.path,
        printer = %config.printer.driver,
        "kidfax starting"
    );

    let cancel = install_signal_handler();
    pipeline.run(cancel).await
}

/// Loop timing for a source. Telegram waits server-side, so it gets no pause.
pub fn settings_for(config: &KidfaxConfig, kind: SourceKind) -> PipelineSettings {
    let poll_interval = match kind {
        SourceKind::Sms => Duration::from_secs(config.sms.poll_interval_secs),
        SourceKind::Telegram => Duration::ZERO,
    };
    PipelineSettings {
        poll_interval,
        reconnect_backoff: config.printer.reconnect_backoff(),
    }
}

/// Wires `source` to the configured renderer, printer, display, and state file.
pub fn build_pipeline(
    config: &KidfaxConfig,
    source: Arc<dyn MessageSource>,
    settings: PipelineSettings,
) -> Result<Pipeline, KidfaxError> {
    let renderer = ReceiptRenderer::from_config(config)?;
    let sink = build_sink(&config.printer, renderer.codepage());
    let store = LedgerStore::new(
        &config.state.path,
        source.ledger_key(),
        config.state.max_entries,
    );

    Ok(Pipeline::new(
        source,
        renderer,
        sink,
        build_display(config),
        store,
        config.directory.to_directory(),
        settings,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kidfax_config::PrinterDriverKind;

    #[test]
    fn telegram_polls_back_to_back() {
        let mut config = KidfaxConfig::default();
        config.sms.poll_interval_secs = 20;
        config.printer.reconnect_backoff_secs = 4;

        let sms = settings_for(&config, SourceKind::Sms);
        assert_eq!(sms.poll_interval, Duration::from_secs(20));
        assert_eq!(sms.reconnect_backoff, Duration::from_secs(4));

        let telegram = settings_for(&config, SourceKind::Telegram);
        assert!(telegram.poll_interval.is_zero());
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_polling() {
        let config = KidfaxConfig::default();
        let err = run_poll(&config, SourceKind::Sms).await.unwrap_err();
        assert!(matches!(err, KidfaxError::Config(_)));
        let err = run_poll(&config, SourceKind::Telegram).await.unwrap_err();
        assert!(matches!(err, KidfaxError::Config(_)));
    }

    #[test]
    fn pipeline_uses_configured_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = KidfaxConfig::default();
        config.state.path = dir.path().join("state.json").display().to_string();
        config.printer.driver = PrinterDriverKind::Dummy;
        config.avatar.enabled = false;
        config.telegram.bot_token = Some("123:abc".to_string());

        let source = Arc::new(TelegramSource::new(&config.telegram).unwrap());
        let pipeline = build_pipeline(&config, source, settings_for(&config, SourceKind::Telegram))
            .unwrap();
        assert!(pipeline.settings().poll_interval.is_zero());
        assert!(pipeline.initial_state().ledger.is_empty());
    }
}

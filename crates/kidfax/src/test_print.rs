// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kidfax test-print`: one sample receipt through the configured printer.
//!
//! Bypasses the allowlist and the Seen-Set.

use chrono::Utc;
use kidfax_config::KidfaxConfig;
use kidfax_core::{AuthorizedMessage, Directory, InboundMessage, KidfaxError, MessageId};
use kidfax_pipeline::sender_label;
use kidfax_printer::build_sink;
use kidfax_receipt::ReceiptRenderer;
use tracing::info;

const DEFAULT_TEXT: &str = "This is a test print. If you can read this, the printer works.";
const DEFAULT_SENDER: &str = "Kid Fax";

pub async fn run_test_print(
    config: &KidfaxConfig,
    from: Option<&str>,
    text: Option<&str>,
) -> Result<(), KidfaxError> {
    let renderer = ReceiptRenderer::from_config(config)?;
    let sample = sample_message(&config.directory.to_directory(), from, text);
    let receipt = renderer.render(&sample);

    let mut sink = build_sink(&config.printer, renderer.codepage());
    sink.print(&receipt).await?;
    let driver = sink.active_driver().unwrap_or("printer").to_string();
    sink.disconnect();

    info!(driver = %driver, sender = %sample.label, "test receipt printed");
    println!("Printed a test receipt on {driver}.");
    Ok(())
}

/// Builds the sample. A known contact prints with its sender id and avatar.
fn sample_message(
    directory: &Directory,
    from: Option<&str>,
    text: Option<&str>,
) -> AuthorizedMessage {
    let (sender_id, label, contact_name) = match from {
        Some(name) => match directory.contacts.get(name) {
            Some(id) => (id.clone(), sender_label(id, directory), Some(name.to_string())),
            None => (name.to_string(), name.to_string(), Some(name.to_string())),
        },
        None => (
            DEFAULT_SENDER.to_string(),
            DEFAULT_SENDER.to_string(),
            None,
        ),
    };

    AuthorizedMessage {
        message: InboundMessage {
            id: MessageId::from("test-print"),
            sender_id,
            text: text.unwrap_or(DEFAULT_TEXT).to_string(),
            attachment: None,
            attachment_ref: None,
            received_order: 0,
            received_at: Utc::now(),
            cursor: None,
        },
        label,
        contact_name,
    }
}

// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message source.
//!
//! Two modes mirror the real sources:
//! - **window**: every fetch returns the whole current window (like the SMS
//!   gateway's recent-messages listing) and ignores the cursor
//! - **long poll**: every fetch returns the messages strictly after the
//!   cursor, and the returned cursor is the highest position seen

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use kidfax_core::{
    AdapterType, Attachment, AttachmentRef, Cursor, FetchBatch, HealthStatus, InboundMessage,
    KidfaxError, MessageId, MessageSource, PluginAdapter,
};
use tokio::sync::Mutex;

/// Builds a text message with no attachment and no cursor.
pub fn inbound(id: &str, sender: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId::from(id),
        sender_id: sender.to_string(),
        text: text.to_string(),
        attachment: None,
        attachment_ref: None,
        received_order: 0,
        received_at: Utc::now(),
        cursor: None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Window,
    LongPoll,
}

#[derive(Default)]
struct Script {
    messages: Vec<InboundMessage>,
    failures: usize,
    requested: Vec<Option<Cursor>>,
    attachment_fetches: Vec<String>,
}

/// A scriptable [`MessageSource`].
#[derive(Clone)]
pub struct MockSource {
    key: &'static str,
    mode: Mode,
    script: Arc<Mutex<Script>>,
}

impl MockSource {
    /// A source that always returns its whole window.
    pub fn window(ledger_key: &'static str) -> Self {
        Self {
            key: ledger_key,
            mode: Mode::Window,
            script: Arc::default(),
        }
    }

    /// A source that honours cursors like a long-polling bot API.
    pub fn long_poll(ledger_key: &'static str) -> Self {
        Self {
            key: ledger_key,
            mode: Mode::LongPoll,
            script: Arc::default(),
        }
    }

    /// Adds a message to the server side.
    pub async fn push(&self, message: InboundMessage) {
        self.script.lock().await.messages.push(message);
    }

    /// Adds a long-poll update whose id and position are `update_id`.
    pub async fn push_update(&self, update_id: i64, sender: &str, text: &str) {
        let mut message = inbound(&update_id.to_string(), sender, text);
        message.cursor = Some(Cursor(update_id));
        self.push(message).await;
    }

    /// Adds a long-poll update carrying a photo that is only downloaded on
    /// request. The photo's file id is `photo-{update_id}`.
    pub async fn push_photo_update(&self, update_id: i64, sender: &str, caption: &str) {
        let mut message = inbound(&update_id.to_string(), sender, caption);
        message.cursor = Some(Cursor(update_id));
        message.attachment_ref = Some(AttachmentRef {
            file_id: format!("photo-{update_id}"),
            declared_size: 4,
        });
        self.push(message).await;
    }

    /// File ids passed to `fetch_attachment`, in call order.
    pub async fn attachment_fetches(&self) -> Vec<String> {
        self.script.lock().await.attachment_fetches.clone()
    }

    /// Makes the next `count` fetches fail with a source error.
    pub async fn fail_next(&self, count: usize) {
        self.script.lock().await.failures = count;
    }

    /// Cursors passed to `fetch_new`, in call order.
    pub async fn requested_cursors(&self) -> Vec<Option<Cursor>> {
        self.script.lock().await.requested.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.script.lock().await.requested.len()
    }
}

#[async_trait]
impl PluginAdapter for MockSource {
    fn name(&self) -> &str {
        "mock-source"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl MessageSource for MockSource {
    fn ledger_key(&self) -> &'static str {
        self.key
    }

    async fn fetch_new(&self, cursor: Option<Cursor>) -> Result<FetchBatch, KidfaxError> {
        let mut script = self.script.lock().await;
        script.requested.push(cursor);
        if script.failures > 0 {
            script.failures -= 1;
            return Err(KidfaxError::Source {
                message: "mock source offline".to_string(),
                source: None,
            });
        }

        let selected: Vec<InboundMessage> = match self.mode {
            Mode::Window => script.messages.iter().cloned().collect(),
            Mode::LongPoll => script
                .messages
                .iter()
                .filter(|m| match (m.cursor, cursor) {
                    (Some(position), Some(after)) => position > after,
                    _ => true,
                })
                .cloned()
                .collect(),
        };

        let messages: Vec<InboundMessage> = selected
            .into_iter()
            .enumerate()
            .map(|(order, mut m)| {
                m.received_order = order;
                m
            })
            .collect();

        let cursor = match self.mode {
            Mode::Window => None,
            Mode::LongPoll => messages.iter().filter_map(|m| m.cursor).chain(cursor).max(),
        };
        Ok(FetchBatch { messages, cursor })
    }

    async fn fetch_attachment(
        &self,
        reference: &AttachmentRef,
    ) -> Result<Option<Attachment>, KidfaxError> {
        self.script
            .lock()
            .await
            .attachment_fetches
            .push(reference.file_id.clone());
        Ok(Some(Attachment {
            data: b"mock".to_vec(),
            mime_type: "image/jpeg".to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn long_poll_returns_only_newer_updates() {
        let source = MockSource::long_poll("seen_update_ids");
        for id in [10, 11, 12] {
            source.push_update(id, "42", "hi").await;
        }

        let batch = source.fetch_new(Some(Cursor(10))).await.unwrap();
        let ids: Vec<_> = batch.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["11", "12"]);
        assert_eq!(batch.messages[1].received_order, 1);
        assert_eq!(batch.cursor, Some(Cursor(12)));

        let empty = source.fetch_new(Some(Cursor(12))).await.unwrap();
        assert!(empty.messages.is_empty());
        assert_eq!(empty.cursor, Some(Cursor(12)));
    }

    #[tokio::test]
    async fn window_ignores_cursor_and_can_fail() {
        let source = MockSource::window("seen_sids");
        source.push(inbound("SM1", "+1", "a")).await;
        source.fail_next(1).await;

        assert!(source.fetch_new(None).await.is_err());
        let batch = source.fetch_new(Some(Cursor(99))).await.unwrap();
        assert_eq!(batch.messages.len(), 1);
        assert!(batch.cursor.is_none());
        assert_eq!(source.fetch_count().await, 2);
    }
}

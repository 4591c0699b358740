// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram bot message source for kidfax.
//!
//! Long-polls `getUpdates` through teloxide. The cursor is the highest update
//! id seen; the next fetch asks for the update after it.

pub mod discover;
pub mod handler;
pub mod media;

use std::time::Duration;

use async_trait::async_trait;
use kidfax_config::TelegramConfig;
use kidfax_core::{
    AdapterType, Attachment, AttachmentRef, Cursor, FetchBatch, HealthStatus, KidfaxError,
    MessageSource, PluginAdapter,
};
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, Update};
use tracing::debug;

pub use discover::DiscoveredChat;

/// Extra client-side time on top of the server long-poll timeout.
const CLIENT_SLACK: Duration = Duration::from_secs(10);

/// Server-side wait used by `discover`.
const DISCOVER_TIMEOUT_SECS: u32 = 10;

pub struct TelegramSource {
    bot: Bot,
    poll_timeout_secs: u32,
    download_photos: bool,
    max_photo_bytes: u64,
}

impl TelegramSource {
    /// Builds the source from `[telegram]`.
    ///
    /// Fails with [`KidfaxError::Config`] when no bot token is configured.
    pub fn new(config: &TelegramConfig) -> Result<Self, KidfaxError> {
        let token = config
            .bot_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                KidfaxError::Config("telegram.bot_token is required to poll Telegram".into())
            })?;

        let longest_wait = config.poll_timeout_secs.max(DISCOVER_TIMEOUT_SECS);
        let client_timeout = Duration::from_secs(u64::from(longest_wait)) + CLIENT_SLACK;
        let client = teloxide::net::default_reqwest_settings()
            .timeout(client_timeout)
            .build()
            .map_err(|e| KidfaxError::from_source("failed to build HTTP client", e))?;

        Ok(Self {
            bot: Bot::with_client(token, client),
            poll_timeout_secs: config.poll_timeout_secs,
            download_photos: config.download_photos,
            max_photo_bytes: config.max_photo_bytes(),
        })
    }

    /// Points the bot at another API server, for running against a mock.
    pub fn with_api_url(mut self, url: reqwest::Url) -> Self {
        self.bot = self.bot.set_api_url(url);
        self
    }

    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u32,
    ) -> Result<Vec<Update>, KidfaxError> {
        let mut request = self
            .bot
            .get_updates()
            .timeout(timeout_secs)
            .allowed_updates(vec![AllowedUpdate::Message]);
        if let Some(offset) = offset {
            let offset = i32::try_from(offset).map_err(|_| {
                KidfaxError::Internal(format!("update offset {offset} out of range"))
            })?;
            request = request.offset(offset);
        }
        request
            .await
            .map_err(|e| KidfaxError::from_source("Telegram getUpdates failed", e))
    }

    /// Chats that messaged the bot among the pending updates.
    ///
    /// Does not pass an offset, so the updates stay queued for the poller.
    pub async fn discover(&self) -> Result<Vec<DiscoveredChat>, KidfaxError> {
        let updates = self.get_updates(None, DISCOVER_TIMEOUT_SECS).await?;
        Ok(discover::discover_chats(&updates))
    }
}

#[async_trait]
impl PluginAdapter for TelegramSource {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl MessageSource for TelegramSource {
    fn ledger_key(&self) -> &'static str {
        kidfax_state::TELEGRAM_LEDGER_KEY
    }

    async fn fetch_new(&self, cursor: Option<Cursor>) -> Result<FetchBatch, KidfaxError> {
        let updates = self
            .get_updates(cursor.map(|c| c.next_offset()), self.poll_timeout_secs)
            .await?;

        let mut messages = Vec::new();
        for update in &updates {
            // Not recorded in the Seen-Set; the cursor moves past it.
            let Some(msg) = handler::message_of(update) else {
                debug!(update_id = update.id.0, "skipping non-message update");
                continue;
            };
            let mut inbound = handler::to_inbound(update, msg, messages.len());
            if self.download_photos {
                inbound.attachment_ref = msg
                    .photo()
                    .and_then(handler::largest_photo)
                    .map(media::photo_ref);
            }
            messages.push(inbound);
        }

        let cursor = handler::batch_cursor(&updates, cursor);
        debug!(
            updates = updates.len(),
            messages = messages.len(),
            ?cursor,
            "fetched Telegram updates"
        );
        Ok(FetchBatch { messages, cursor })
    }

    async fn fetch_attachment(
        &self,
        reference: &AttachmentRef,
    ) -> Result<Option<Attachment>, KidfaxError> {
        media::download_photo(&self.bot, reference, self.max_photo_bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::message_json;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "123:abc";

    fn config() -> TelegramConfig {
        TelegramConfig {
            bot_token: Some(TOKEN.to_string()),
            poll_timeout_secs: 0,
            ..TelegramConfig::default()
        }
    }

    fn source(server: &MockServer, config: &TelegramConfig) -> TelegramSource {
        let url = reqwest::Url::parse(&server.uri()).unwrap();
        TelegramSource::new(config).unwrap().with_api_url(url)
    }

    fn ok(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true, "result": result }))
    }

    fn photo_message() -> serde_json::Value {
        message_json(
            42,
            serde_json::json!({
                "caption": "look",
                "photo": [
                    { "file_id": "small", "file_unique_id": "s", "file_size": 10, "width": 90, "height": 90 },
                    { "file_id": "big", "file_unique_id": "b", "file_size": 600, "width": 800, "height": 800 }
                ]
            }),
        )
    }

    #[test]
    fn missing_token_is_config_error() {
        let err = TelegramSource::new(&TelegramConfig::default()).err().unwrap();
        assert!(matches!(err, KidfaxError::Config(_)));
    }

    #[tokio::test]
    async fn fetch_maps_messages_and_advances_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)^/bot.+/getupdates$"))
            .respond_with(ok(serde_json::json!([
                { "update_id": 1001, "message": message_json(42, serde_json::json!({ "text": "hi" })) },
                { "update_id": 1002, "edited_message": {
                    "message_id": 8, "date": 1700000000i64, "edit_date": 1700000001i64,
                    "chat": { "id": 42, "type": "private", "first_name": "Gran" }, "text": "x"
                } },
                { "update_id": 1003, "message": message_json(7, serde_json::json!({ "text": "yo" })) }
            ])))
            .mount(&server)
            .await;

        let config = TelegramConfig {
            download_photos: false,
            ..config()
        };
        let batch = source(&server, &config).fetch_new(Some(Cursor(1000))).await.unwrap();
        assert_eq!(batch.cursor, Some(Cursor(1003)));
        let ids: Vec<_> = batch.messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["1001", "1003"]);
        assert_eq!(batch.messages[1].sender_id, "7");
        assert_eq!(batch.messages[1].received_order, 1);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["offset"], 1001);
        assert_eq!(body["allowed_updates"], serde_json::json!(["message"]));
    }

    #[tokio::test]
    async fn empty_batch_keeps_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)^/bot.+/getupdates$"))
            .respond_with(ok(serde_json::json!([])))
            .mount(&server)
            .await;

        let batch = source(&server, &config()).fetch_new(Some(Cursor(55))).await.unwrap();
        assert!(batch.messages.is_empty());
        assert_eq!(batch.cursor, Some(Cursor(55)));
    }

    async fn mount_photo_update(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)^/bot.+/getupdates$"))
            .respond_with(ok(serde_json::json!([
                { "update_id": 5, "message": photo_message() }
            ])))
            .mount(server)
            .await;
    }

    fn big_ref() -> AttachmentRef {
        AttachmentRef {
            file_id: "big".to_string(),
            declared_size: 600,
        }
    }

    #[tokio::test]
    async fn fetch_defers_photo_download() {
        let server = MockServer::start().await;
        mount_photo_update(&server).await;

        let batch = source(&server, &config()).fetch_new(None).await.unwrap();
        let msg = &batch.messages[0];
        assert_eq!(msg.text, "look");
        assert!(msg.attachment.is_none());
        assert_eq!(msg.attachment_ref, Some(big_ref()));

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1, "only getUpdates is called");
    }

    #[tokio::test]
    async fn photos_disabled_leave_no_reference() {
        let server = MockServer::start().await;
        mount_photo_update(&server).await;

        let config = TelegramConfig {
            download_photos: false,
            ..config()
        };
        let batch = source(&server, &config).fetch_new(None).await.unwrap();
        assert!(batch.messages[0].attachment_ref.is_none());
    }

    #[tokio::test]
    async fn fetch_attachment_downloads_photo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)^/bot.+/getfile$"))
            .respond_with(ok(serde_json::json!({
                "file_id": "big", "file_unique_id": "b", "file_size": 600, "file_path": "photos/big.jpg"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/file/bot{TOKEN}/photos/big.jpg")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg!!".to_vec()))
            .mount(&server)
            .await;

        let attachment = source(&server, &config())
            .fetch_attachment(&big_ref())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(attachment.data, b"jpeg!!");
        assert_eq!(attachment.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn oversized_photo_is_not_requested() {
        let server = MockServer::start().await;
        let reference = AttachmentRef {
            file_id: "huge".to_string(),
            declared_size: 50 * 1024 * 1024,
        };

        let attachment = source(&server, &config())
            .fetch_attachment(&reference)
            .await
            .unwrap();
        assert!(attachment.is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_photo_download_is_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)^/bot.+/getfile$"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = source(&server, &config())
            .fetch_attachment(&big_ref())
            .await
            .unwrap_err();
        assert!(matches!(err, KidfaxError::Source { .. }));
    }

    #[tokio::test]
    async fn api_failure_is_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ok": false, "error_code": 401, "description": "Unauthorized"
            })))
            .mount(&server)
            .await;

        let err = source(&server, &config()).fetch_new(None).await.unwrap_err();
        assert!(matches!(err, KidfaxError::Source { .. }));
    }
}

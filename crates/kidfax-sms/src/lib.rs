// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio SMS message source for kidfax.
//!
//! Twilio offers no cursor for inbound messages, so every fetch returns the
//! most recent window of messages sent to the configured number and the
//! pipeline drops the ones already in the Seen-Set.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use kidfax_config::SmsConfig;
use kidfax_core::{
    AdapterType, Cursor, FetchBatch, HealthStatus, InboundMessage, KidfaxError, MessageId,
    MessageSource, PluginAdapter,
};
use reqwest::Url;
use tracing::debug;

use crate::types::{ApiError, MessagePage, TwilioMessage};

/// Base URL for the Twilio REST API.
const API_BASE_URL: &str = "https://api.twilio.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Polls Twilio for SMS sent to one number.
#[derive(Debug, Clone)]
pub struct SmsSource {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    number: String,
    fetch_limit: u32,
    base_url: String,
}

impl SmsSource {
    /// Builds the source from `[sms]`.
    ///
    /// Fails with [`KidfaxError::Config`] when the account SID, auth token,
    /// or number is missing.
    pub fn new(config: &SmsConfig) -> Result<Self, KidfaxError> {
        let account_sid = required(config.account_sid.as_deref(), "sms.account_sid")?;
        let auth_token = required(config.auth_token.as_deref(), "sms.auth_token")?;
        let number = required(config.number.as_deref(), "sms.number")?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| KidfaxError::from_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            account_sid,
            auth_token,
            number,
            fetch_limit: config.fetch_limit.max(1),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the API base URL, for running against a mock server.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn account_url(&self, suffix: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}{suffix}",
            self.base_url, self.account_sid
        )
    }

    fn messages_url(&self) -> Result<Url, KidfaxError> {
        let limit = self.fetch_limit.to_string();
        Url::parse_with_params(
            &self.account_url("/Messages.json"),
            [("To", self.number.as_str()), ("PageSize", limit.as_str())],
        )
        .map_err(|e| KidfaxError::Config(format!("invalid Twilio URL: {e}")))
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, KidfaxError> {
        self.client
            .get(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .send()
            .await
            .map_err(|e| KidfaxError::from_source("Twilio request failed", e))
    }

    /// Turns a newest-first page into chronological inbound messages.
    fn to_inbound(page: MessagePage) -> Vec<InboundMessage> {
        let now = Utc::now();
        page.messages
            .into_iter()
            .rev()
            .filter(TwilioMessage::is_inbound)
            .enumerate()
            .map(|(order, msg)| InboundMessage {
                received_at: msg.timestamp(now),
                id: MessageId(msg.sid),
                sender_id: msg.from.unwrap_or_else(|| "Unknown".to_string()),
                text: msg.body.unwrap_or_default(),
                attachment: None,
                attachment_ref: None,
                received_order: order,
                cursor: None,
            })
            .collect()
    }
}

fn required(value: Option<&str>, key: &str) -> Result<String, KidfaxError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(KidfaxError::Config(format!(
            "{key} is required to poll SMS"
        ))),
    }
}

/// Reads a non-2xx response into a source error.
async fn api_error(response: reqwest::Response) -> KidfaxError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiError>(&body) {
        Ok(err) => match err.code {
            Some(code) => format!("Twilio API error {code} ({status}): {}", err.message),
            None => format!("Twilio API error ({status}): {}", err.message),
        },
        Err(_) => format!("Twilio returned {status}: {body}"),
    };
    KidfaxError::Source {
        message,
        source: None,
    }
}

#[async_trait]
impl PluginAdapter for SmsSource {
    fn name(&self) -> &str {
        "sms"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    /// Fetches the account resource to check the credentials.
    async fn health_check(&self) -> Result<HealthStatus, KidfaxError> {
        let url = Url::parse(&self.account_url(".json"))
            .map_err(|e| KidfaxError::Config(format!("invalid Twilio URL: {e}")))?;
        match self.get(url).await {
            Ok(resp) if resp.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(resp) => Ok(HealthStatus::Unhealthy(api_error(resp).await.to_string())),
            Err(e) => Ok(HealthStatus::Degraded(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), KidfaxError> {
        Ok(())
    }
}

#[async_trait]
impl MessageSource for SmsSource {
    fn ledger_key(&self) -> &'static str {
        kidfax_state::SMS_LEDGER_KEY
    }

    async fn fetch_new(&self, _cursor: Option<Cursor>) -> Result<FetchBatch, KidfaxError> {
        let response = self.get(self.messages_url()?).await?;
        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let page: MessagePage = response
            .json()
            .await
            .map_err(|e| KidfaxError::from_source("malformed Twilio response", e))?;
        let fetched = page.messages.len();
        let messages = Self::to_inbound(page);
        debug!(fetched, inbound = messages.len(), "fetched Twilio messages");

        Ok(FetchBatch {
            messages,
            cursor: None,
        })
    }
}

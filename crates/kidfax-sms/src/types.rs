// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio REST API response types (only the fields kidfax reads).

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of `GET /Accounts/{sid}/Messages.json`, newest first.
#[derive(Debug, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub messages: Vec<TwilioMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TwilioMessage {
    pub sid: String,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    /// RFC 2822, e.g. `Thu, 30 Jul 2015 20:12:31 +0000`.
    #[serde(default)]
    pub date_sent: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
}

impl TwilioMessage {
    /// `inbound` for messages received by the number; outbound ones are
    /// `outbound-api`, `outbound-reply` and so on.
    pub fn is_inbound(&self) -> bool {
        self.direction
            .as_deref()
            .is_some_and(|d| d.starts_with("inbound"))
    }

    /// Sent date, falling back to creation date, then to `fallback`.
    pub fn timestamp(&self, fallback: DateTime<Utc>) -> DateTime<Utc> {
        self.date_sent
            .as_deref()
            .or(self.date_created.as_deref())
            .and_then(|raw| DateTime::parse_from_rfc2822(raw).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(fallback)
    }
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: Option<i64>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_twilio_message_page() {
        let page: MessagePage = serde_json::from_str(
            r#"{
                "messages": [{
                    "sid": "SM1",
                    "from": "+15551112222",
                    "to": "+15550000000",
                    "body": "hi",
                    "direction": "inbound",
                    "date_sent": "Thu, 30 Jul 2015 20:12:31 +0000",
                    "num_media": "0"
                }],
                "page": 0
            }"#,
        )
        .unwrap();
        let msg = &page.messages[0];
        assert!(msg.is_inbound());
        assert_eq!(
            msg.timestamp(Utc::now()),
            Utc.with_ymd_and_hms(2015, 7, 30, 20, 12, 31).unwrap()
        );
    }

    #[test]
    fn outbound_and_missing_direction_are_not_inbound() {
        let mut msg: TwilioMessage =
            serde_json::from_str(r#"{"sid": "SM2", "direction": "outbound-api"}"#).unwrap();
        assert!(!msg.is_inbound());
        msg.direction = None;
        assert!(!msg.is_inbound());
    }

    #[test]
    fn unparseable_date_uses_fallback() {
        let msg: TwilioMessage =
            serde_json::from_str(r#"{"sid": "SM3", "date_sent": "yesterday"}"#).unwrap();
        let fallback = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(msg.timestamp(fallback), fallback);
    }
}

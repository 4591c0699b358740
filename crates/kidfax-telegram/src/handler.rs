// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from Telegram updates to kidfax messages.

use kidfax_core::{Cursor, InboundMessage, MessageId};
use teloxide::types::{Message, PhotoSize, Update, UpdateKind};

/// Position of an update, usable as a fetch cursor.
pub fn update_cursor(update: &Update) -> Cursor {
    Cursor(i64::from(update.id.0))
}

/// Highest update id in the batch, or `previous` when the batch is empty.
///
/// Every update counts, message or not, so skipped updates are never
/// fetched again.
pub fn batch_cursor(updates: &[Update], previous: Option<Cursor>) -> Option<Cursor> {
    updates.iter().map(update_cursor).chain(previous).max()
}

/// The message carried by an update, if it is a new message.
pub fn message_of(update: &Update) -> Option<&Message> {
    match &update.kind {
        UpdateKind::Message(msg) => Some(msg),
        _ => None,
    }
}

/// Message text, falling back to the photo caption.
pub fn message_text(msg: &Message) -> &str {
    msg.text().or_else(|| msg.caption()).unwrap_or_default()
}

/// The photo variant with the largest file size.
///
/// Telegram lists sizes smallest first, so ties and unknown sizes resolve to
/// the later entry.
pub fn largest_photo(photos: &[PhotoSize]) -> Option<&PhotoSize> {
    photos.iter().max_by_key(|p| p.file.size)
}

/// Builds the inbound message for an update without its attachment.
///
/// The dedup key is the update id; the sender is the chat id.
pub fn to_inbound(update: &Update, msg: &Message, received_order: usize) -> InboundMessage {
    let cursor = update_cursor(update);
    InboundMessage {
        id: MessageId(cursor.0.to_string()),
        sender_id: msg.chat.id.0.to_string(),
        text: message_text(msg).to_string(),
        attachment: None,
        attachment_ref: None,
        received_order,
        received_at: msg.date,
        cursor: Some(cursor),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn message_json(chat_id: i64, body: serde_json::Value) -> serde_json::Value {
        let mut msg = serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": {
                "id": chat_id,
                "type": "private",
                "first_name": "Gran",
                "username": "granny"
            }
        });
        if let (Some(obj), Some(extra)) = (msg.as_object_mut(), body.as_object()) {
            obj.extend(extra.clone());
        }
        msg
    }

    fn update(update_id: u32, kind: &str, msg: serde_json::Value) -> Update {
        serde_json::from_value(serde_json::json!({ "update_id": update_id, kind: msg }))
            .expect("valid update")
    }

    #[test]
    fn caption_is_used_when_text_is_missing() {
        let up = update(
            1001,
            "message",
            message_json(42, serde_json::json!({ "caption": "look at this" })),
        );
        let msg = message_of(&up).unwrap();
        assert_eq!(message_text(msg), "look at this");

        let inbound = to_inbound(&up, msg, 3);
        assert_eq!(inbound.id.as_str(), "1001");
        assert_eq!(inbound.sender_id, "42");
        assert_eq!(inbound.received_order, 3);
        assert_eq!(inbound.cursor, Some(Cursor(1001)));
        assert_eq!(inbound.received_at.timestamp(), 1700000000);
    }

    #[test]
    fn edited_messages_are_not_new_messages() {
        let mut edited = message_json(42, serde_json::json!({ "text": "typo fixed" }));
        edited["edit_date"] = serde_json::json!(1700000100i64);
        let up = update(1002, "edited_message", edited);
        assert!(message_of(&up).is_none());
    }

    #[test]
    fn cursor_covers_every_update() {
        let ups = vec![
            update(5, "message", message_json(1, serde_json::json!({ "text": "a" }))),
            update(9, "message", message_json(1, serde_json::json!({ "text": "b" }))),
        ];
        assert_eq!(batch_cursor(&ups, Some(Cursor(4))), Some(Cursor(9)));
        assert_eq!(batch_cursor(&[], Some(Cursor(4))), Some(Cursor(4)));
        assert_eq!(batch_cursor(&[], None), None);
    }

    #[test]
    fn picks_largest_photo_by_size() {
        let up = update(
            1,
            "message",
            message_json(
                1,
                serde_json::json!({
                    "photo": [
                        { "file_id": "small", "file_unique_id": "s", "file_size": 10, "width": 90, "height": 90 },
                        { "file_id": "big", "file_unique_id": "b", "file_size": 900, "width": 800, "height": 800 },
                        { "file_id": "mid", "file_unique_id": "m", "file_size": 300, "width": 320, "height": 320 }
                    ]
                }),
            ),
        );
        let photos = message_of(&up).unwrap().photo().unwrap();
        assert_eq!(largest_photo(photos).unwrap().file.id.0, "big");
        assert!(largest_photo(&[]).is_none());
    }
}

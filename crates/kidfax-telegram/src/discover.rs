// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lists the chats that recently messaged the bot, to help fill in
//! `[directory]`.

use std::collections::BTreeMap;

use teloxide::types::Update;

use crate::handler::{message_of, message_text};

/// Characters of the last message kept for display.
const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredChat {
    pub chat_id: i64,
    /// First and last name joined, or `Unknown`.
    pub name: String,
    pub username: Option<String>,
    pub last_message: String,
}

impl DiscoveredChat {
    /// Lowercased first word of the name, a starting point for a contact key.
    pub fn suggested_contact(&self) -> String {
        self.name
            .split_whitespace()
            .next()
            .unwrap_or("contact")
            .to_lowercase()
    }
}

/// One entry per chat, ordered by chat id; later messages win.
pub fn discover_chats(updates: &[Update]) -> Vec<DiscoveredChat> {
    let mut chats = BTreeMap::new();
    for msg in updates.iter().filter_map(message_of) {
        let chat = &msg.chat;
        let name = [chat.first_name(), chat.last_name()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        let name = if name.trim().is_empty() {
            "Unknown".to_string()
        } else {
            name
        };
        chats.insert(
            chat.id.0,
            DiscoveredChat {
                chat_id: chat.id.0,
                name,
                username: chat.username().map(str::to_string),
                last_message: message_text(msg).chars().take(PREVIEW_CHARS).collect(),
            },
        );
    }
    chats.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(update_id: u32, chat: serde_json::Value, text: &str) -> Update {
        serde_json::from_value(serde_json::json!({
            "update_id": update_id,
            "message": {
                "message_id": update_id,
                "date": 1700000000i64,
                "chat": chat,
                "text": text
            }
        }))
        .unwrap()
    }

    #[test]
    fn collects_each_chat_once() {
        let gran = serde_json::json!({
            "id": 42, "type": "private", "first_name": "Grace", "last_name": "Hopper", "username": "gran"
        });
        let uncle = serde_json::json!({ "id": 7, "type": "private", "first_name": "Bob" });
        let long = "x".repeat(80);
        let chats = discover_chats(&[
            update(1, gran.clone(), "first"),
            update(2, uncle, "hey"),
            update(3, gran, &long),
        ]);

        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].chat_id, 7);
        assert_eq!(chats[0].username, None);
        assert_eq!(chats[1].name, "Grace Hopper");
        assert_eq!(chats[1].username.as_deref(), Some("gran"));
        assert_eq!(chats[1].last_message.len(), PREVIEW_CHARS);
        assert_eq!(chats[1].suggested_contact(), "grace");
    }
}

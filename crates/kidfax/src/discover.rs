// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `kidfax discover`: find Telegram chat ids to put in `[directory]`.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use kidfax_config::KidfaxConfig;
use kidfax_core::KidfaxError;
use kidfax_telegram::{DiscoveredChat, TelegramSource};

const RULE_WIDTH: usize = 60;

pub async fn run_discover(config: &KidfaxConfig) -> Result<(), KidfaxError> {
    let source = TelegramSource::new(&config.telegram)?;
    let chats = source.discover().await?;
    print!("{}", render_report(&chats));
    Ok(())
}

/// The chat listing followed by ready-to-paste configuration.
pub fn render_report(chats: &[DiscoveredChat]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    if chats.is_empty() {
        out.push_str("No chats found. Send the bot a message, then run discover again.\n");
        return out;
    }

    let _ = writeln!(out, "{rule}\nTELEGRAM CHATS\n{rule}");
    for chat in chats {
        let _ = writeln!(out, "\nChat ID: {}", chat.chat_id);
        let _ = writeln!(out, "  Name: {}", chat.name);
        if let Some(username) = &chat.username {
            let _ = writeln!(out, "  Username: @{username}");
        }
        let _ = writeln!(out, "  Last message: {}", chat.last_message);
    }

    let names = contact_names(chats);
    let ids: Vec<String> = chats.iter().map(|c| c.chat_id.to_string()).collect();

    let _ = writeln!(out, "\n{rule}\nADD TO kidfax.toml\n{rule}");
    let _ = writeln!(out, "[directory]");
    let quoted: Vec<String> = ids.iter().map(|id| quote(id)).collect();
    let _ = writeln!(out, "allowlist = [{}]", quoted.join(", "));
    let _ = writeln!(out, "\n[directory.contacts]");
    for (name, id) in names.iter().zip(&ids) {
        let _ = writeln!(out, "{} = {}", quote(name), quote(id));
    }

    let _ = writeln!(out, "\n# or as environment variables");
    let pairs: Vec<String> = names
        .iter()
        .zip(&ids)
        .map(|(name, id)| format!("{name}:{id}"))
        .collect();
    let _ = writeln!(out, "CONTACTS={}", pairs.join(","));
    let _ = writeln!(out, "ALLOWLIST={}", ids.join(","));
    out
}

/// Suggested contact names, made unique with a numeric suffix and stripped
/// of the characters the legacy `CONTACTS` format reserves.
fn contact_names(chats: &[DiscoveredChat]) -> Vec<String> {
    let mut used = BTreeSet::new();
    chats
        .iter()
        .map(|chat| {
            let base: String = chat
                .suggested_contact()
                .chars()
                .filter(|c| *c != ':' && *c != ',')
                .collect();
            let base = if base.is_empty() {
                "contact".to_string()
            } else {
                base
            };
            let mut name = base.clone();
            let mut n = 2;
            while !used.insert(name.clone()) {
                name = format!("{base}{n}");
                n += 1;
            }
            name
        })
        .collect()
}

fn quote(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(chat_id: i64, name: &str, username: Option<&str>) -> DiscoveredChat {
        DiscoveredChat {
            chat_id,
            name: name.to_string(),
            username: username.map(str::to_string),
            last_message: "hello".to_string(),
        }
    }

    #[test]
    fn report_suggests_unique_contacts() {
        let report = render_report(&[
            chat(7, "Bob Smith", None),
            chat(42, "Bob Jones", Some("bobj")),
        ]);
        assert!(report.contains("Chat ID: 42"));
        assert!(report.contains("Username: @bobj"));
        assert!(report.contains(r#"allowlist = ["7", "42"]"#));
        assert!(report.contains(r#""bob" = "7""#));
        assert!(report.contains(r#""bob2" = "42""#));
        assert!(report.contains("CONTACTS=bob:7,bob2:42"));
        assert!(report.contains("ALLOWLIST=7,42"));
    }

    #[test]
    fn suggested_config_parses() {
        let report = render_report(&[chat(-100, "Family Group", None)]);
        let start = report.find("[directory]").unwrap();
        let end = report.find("# or as").unwrap();
        let config = kidfax_config::load_and_validate_str(&report[start..end]).unwrap();
        assert_eq!(config.directory.allowlist, vec!["-100".to_string()]);
        assert_eq!(
            config.directory.contacts.get("family").map(String::as_str),
            Some("-100")
        );
    }

    #[test]
    fn empty_listing_explains_next_step() {
        assert!(render_report(&[]).starts_with("No chats found"));
    }

    #[tokio::test]
    async fn discover_needs_a_token() {
        let err = run_discover(&KidfaxConfig::default()).await.unwrap_err();
        assert!(matches!(err, KidfaxError::Config(_)));
    }
}

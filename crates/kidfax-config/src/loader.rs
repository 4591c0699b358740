// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kidfax.toml` > `~/.config/kidfax/kidfax.toml` > `/etc/kidfax/kidfax.toml`
//! with environment variable overrides via the `KIDFAX_` prefix. The flat
//! variables of older `.env` deployments (`TWILIO_ACCOUNT_SID`, `CONTACTS`,
//! `ALLOWLIST`, ...) are honoured below the prefixed ones.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KidfaxConfig;

/// Top-level config sections addressable from `KIDFAX_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &[
    "general",
    "directory",
    "state",
    "printer",
    "avatar",
    "sms",
    "telegram",
    "display",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kidfax/kidfax.toml` (system-wide)
/// 3. `~/.config/kidfax/kidfax.toml` (user XDG config)
/// 4. `./kidfax.toml` (local directory)
/// 5. Legacy flat environment variables
/// 6. `KIDFAX_*` environment variables
pub fn load_config() -> Result<KidfaxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<KidfaxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KidfaxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KidfaxConfig, figment::Error> {
    with_env(
        Figment::new()
            .merge(Serialized::defaults(KidfaxConfig::default()))
            .merge(Toml::file(path)),
    )
    .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    with_env(
        Figment::new()
            .merge(Serialized::defaults(KidfaxConfig::default()))
            .merge(Toml::file("/etc/kidfax/kidfax.toml"))
            .merge(Toml::file(
                dirs::config_dir()
                    .map(|d| d.join("kidfax/kidfax.toml"))
                    .unwrap_or_default(),
            ))
            .merge(Toml::file("kidfax.toml")),
    )
}

fn with_env(figment: Figment) -> Figment {
    let vars: Vec<(String, String)> = std::env::vars().collect();

    let figment = figment.merge(legacy_env_provider());
    let figment = merge_strings(figment, &vars, |key| {
        legacy_env_key(key).map(str::to_string)
    });
    let figment = merge_legacy_directory(
        figment,
        lookup(&vars, "CONTACTS"),
        lookup(&vars, "ALLOWLIST"),
    );
    let figment = figment.merge(env_provider());
    merge_strings(figment, &vars, |key| {
        key.strip_prefix("KIDFAX_").and_then(map_env_key)
    })
}

fn lookup<'a>(vars: &'a [(String, String)], name: &str) -> Option<&'a str> {
    vars.iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Create the `KIDFAX_` environment provider for non-string settings.
///
/// Uses an explicit section mapping rather than `Env::split("_")` because key
/// names contain underscores: `KIDFAX_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("KIDFAX_").filter_map(|key| {
        map_env_key(key.as_str())
            .filter(|mapped| !is_string_key(mapped))
            .map(Into::into)
    })
}

/// Provider for the unprefixed variables used by older deployments.
fn legacy_env_provider() -> Env {
    Env::raw().filter_map(|key| {
        legacy_env_key(key.as_str())
            .filter(|mapped| !is_string_key(mapped))
            .map(Into::into)
    })
}

/// Keys whose values are always text.
///
/// `Env` parses values, so `KIDFAX_SMS_NUMBER=+15551234567` would arrive as
/// an integer. These keys are read verbatim instead.
const STRING_KEYS: &[&str] = &[
    "general.header",
    "general.subtitle",
    "general.log_level",
    "state.path",
    "printer.encoding",
    "printer.usb_device",
    "printer.serial_port",
    "printer.bluetooth_port",
    "printer.network_host",
    "avatar.dir",
    "sms.account_sid",
    "sms.auth_token",
    "sms.number",
    "telegram.bot_token",
];

fn is_string_key(key: &str) -> bool {
    STRING_KEYS.contains(&key)
}

/// Merge string-typed variables from `vars` as literal strings.
pub fn merge_strings(
    figment: Figment,
    vars: &[(String, String)],
    map: impl Fn(&str) -> Option<String>,
) -> Figment {
    vars.iter()
        .filter_map(|(name, value)| {
            map(&name.to_ascii_uppercase())
                .filter(|key| is_string_key(key))
                .map(|key| (key, value))
        })
        .fold(figment, |figment, (key, value)| {
            figment.merge(Serialized::default(&key, value.clone()))
        })
}

/// Map a prefix-stripped `KIDFAX_*` variable name to a config key path.
///
/// Returns `None` for names that belong to no section, so stray variables do
/// not trip `deny_unknown_fields`.
pub fn map_env_key(key: &str) -> Option<String> {
    let key = key.to_ascii_lowercase();

    let alias = match key.as_str() {
        "state_file" => Some("state.path"),
        "state_limit" => Some("state.max_entries"),
        "header" => Some("general.header"),
        "subtitle" => Some("general.subtitle"),
        "log_level" => Some("general.log_level"),
        _ => None,
    };
    if let Some(alias) = alias {
        return Some(alias.to_string());
    }

    SECTIONS.iter().find_map(|section| {
        key.strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
            .filter(|rest| !rest.is_empty())
            .map(|rest| format!("{section}.{rest}"))
    })
}

/// Map a legacy unprefixed variable name to a config key path.
pub fn legacy_env_key(key: &str) -> Option<&'static str> {
    let mapped = match key.to_ascii_lowercase().as_str() {
        "twilio_account_sid" => "sms.account_sid",
        "twilio_auth_token" => "sms.auth_token",
        "twilio_number" => "sms.number",
        "twilio_fetch_limit" => "sms.fetch_limit",
        "poll_seconds" => "sms.poll_interval_secs",
        "telegram_bot_token" => "telegram.bot_token",
        "telegram_poll_timeout" => "telegram.poll_timeout_secs",
        "telegram_download_photos" => "telegram.download_photos",
        "telegram_max_photo_size" => "telegram.max_photo_mb",
        "printer_driver" => "printer.driver",
        "printer_encoding" => "printer.encoding",
        "printer_line_width" => "printer.line_width",
        "allow_dummy_printer" => "printer.allow_dummy",
        "serial_port" => "printer.serial_port",
        "serial_baud" => "printer.baud_rate",
        "bluetooth_serial_port" => "printer.bluetooth_port",
        "network_host" => "printer.network_host",
        "network_port" => "printer.network_port",
        "avatar_enabled" => "avatar.enabled",
        "avatar_dir" => "avatar.dir",
        "avatar_size" => "avatar.size",
        "eink_status_enabled" => "display.enabled",
        _ => return None,
    };
    Some(mapped)
}

/// Merge legacy `CONTACTS=name:id,...` and `ALLOWLIST=id,...` values.
pub fn merge_legacy_directory(
    figment: Figment,
    contacts: Option<&str>,
    allowlist: Option<&str>,
) -> Figment {
    let mut figment = figment;
    if let Some(raw) = contacts {
        figment = figment.merge(Serialized::default("directory.contacts", parse_contacts(raw)));
    }
    if let Some(raw) = allowlist {
        let ids: Vec<String> = parse_allowlist(raw).into_iter().collect();
        figment = figment.merge(Serialized::default("directory.allowlist", ids));
    }
    figment
}

/// Parse `name:id,name2:id2` into a contact map. Malformed chunks are skipped.
pub fn parse_contacts(raw: &str) -> BTreeMap<String, String> {
    raw.split(',')
        .filter_map(|chunk| chunk.split_once(':'))
        .map(|(name, id)| (name.trim().to_string(), id.trim().to_string()))
        .filter(|(name, id)| !name.is_empty() && !id.is_empty())
        .collect()
}

/// Parse a comma-separated allowlist, dropping blanks.
pub fn parse_allowlist(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_keys_map_to_sections() {
        assert_eq!(
            map_env_key("TELEGRAM_BOT_TOKEN").as_deref(),
            Some("telegram.bot_token")
        );
        assert_eq!(
            map_env_key("printer_line_width").as_deref(),
            Some("printer.line_width")
        );
        assert_eq!(map_env_key("sms_number").as_deref(), Some("sms.number"));
    }

    #[test]
    fn prefixed_aliases_from_env_files() {
        assert_eq!(map_env_key("STATE_FILE").as_deref(), Some("state.path"));
        assert_eq!(map_env_key("STATE_LIMIT").as_deref(), Some("state.max_entries"));
        assert_eq!(map_env_key("HEADER").as_deref(), Some("general.header"));
    }

    #[test]
    fn stray_prefixed_keys_are_ignored() {
        assert_eq!(map_env_key("SOMETHING_ELSE"), None);
        assert_eq!(map_env_key("printer"), None);
        assert_eq!(map_env_key("printer_"), None);
    }

    #[test]
    fn legacy_keys_map() {
        assert_eq!(legacy_env_key("TWILIO_ACCOUNT_SID"), Some("sms.account_sid"));
        assert_eq!(legacy_env_key("ALLOW_DUMMY_PRINTER"), Some("printer.allow_dummy"));
        assert_eq!(legacy_env_key("PATH"), None);
    }

    #[test]
    fn parse_contacts_skips_malformed_chunks() {
        let contacts = parse_contacts("grandma:+15551112222, uncle : +15553334444,bogus,:x,y:");
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts["grandma"], "+15551112222");
        assert_eq!(contacts["uncle"], "+15553334444");
    }

    #[test]
    fn parse_allowlist_trims_and_drops_blanks() {
        let ids = parse_allowlist(" +1555 ,, +1666,");
        assert_eq!(ids.len(), 2);
        assert!(ids.contains("+1555"));
        assert!(ids.contains("+1666"));
    }

    #[test]
    fn numeric_looking_strings_stay_strings() {
        let vars = vec![
            ("KIDFAX_SMS_NUMBER".to_string(), "+15551234567".to_string()),
            ("KIDFAX_PRINTER_LINE_WIDTH".to_string(), "40".to_string()),
        ];
        let figment = merge_strings(
            Figment::new().merge(Serialized::defaults(KidfaxConfig::default())),
            &vars,
            |key| key.strip_prefix("KIDFAX_").and_then(map_env_key),
        );
        let config: KidfaxConfig = figment.extract().expect("should extract");
        assert_eq!(config.sms.number.as_deref(), Some("+15551234567"));
        // Non-string keys are left to the Env provider.
        assert_eq!(config.printer.line_width, 32);
    }

    #[test]
    fn legacy_directory_overrides_toml() {
        let figment = Figment::new()
            .merge(Serialized::defaults(KidfaxConfig::default()))
            .merge(Toml::string("[directory]\nallowlist = [\"+1000\"]\n"));
        let config: KidfaxConfig =
            merge_legacy_directory(figment, Some("mom:+1222"), Some("+1222,+1333"))
                .extract()
                .expect("legacy directory should merge");
        assert_eq!(config.directory.contacts["mom"], "+1222");
        assert_eq!(config.directory.allowlist, vec!["+1222", "+1333"]);
    }
}

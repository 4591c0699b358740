// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde attributes cannot express: numeric ranges,
//! non-empty paths, and contact names that survive the legacy
//! `CONTACTS=name:id` format.

use crate::diagnostic::ConfigError;
use crate::model::KidfaxConfig;

/// Longest contact name accepted.
pub const MAX_CONTACT_NAME_LEN: usize = 50;

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &KidfaxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.state.path.trim().is_empty() {
        errors.push(ConfigError::validation("state.path", "must not be empty"));
    }
    if config.state.max_entries == 0 {
        errors.push(ConfigError::validation(
            "state.max_entries",
            "must be at least 1",
        ));
    }

    check_range(
        &mut errors,
        "printer.line_width",
        config.printer.line_width,
        8,
        96,
    );
    check_range(
        &mut errors,
        "avatar.size",
        config.avatar.size as usize,
        32,
        256,
    );
    check_range(
        &mut errors,
        "telegram.image_size",
        config.telegram.image_size as usize,
        32,
        512,
    );

    if config.telegram.max_photo_mb == 0 {
        errors.push(ConfigError::validation(
            "telegram.max_photo_mb",
            "must be at least 1",
        ));
    }
    if config.sms.fetch_limit == 0 {
        errors.push(ConfigError::validation(
            "sms.fetch_limit",
            "must be at least 1",
        ));
    }
    if config.printer.encoding.trim().is_empty() {
        errors.push(ConfigError::validation(
            "printer.encoding",
            "must not be empty",
        ));
    }

    if config.display.enabled && config.display.command.is_empty() {
        errors.push(ConfigError::validation(
            "display.command",
            "must name a program when display.enabled is true",
        ));
    }

    for (name, id) in &config.directory.contacts {
        if let Some(problem) = contact_name_problem(name) {
            errors.push(ConfigError::validation(
                format!("directory.contacts.{name}"),
                problem,
            ));
        }
        if id.trim().is_empty() {
            errors.push(ConfigError::validation(
                format!("directory.contacts.{name}"),
                "must map to a non-empty sender id",
            ));
        }
    }

    if config
        .directory
        .allowlist
        .iter()
        .any(|id| id.trim().is_empty())
    {
        errors.push(ConfigError::validation(
            "directory.allowlist",
            "must not contain empty entries",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Why a contact name is unusable, if it is.
pub fn contact_name_problem(name: &str) -> Option<String> {
    let name = name.trim();
    if name.is_empty() {
        Some("contact name must not be empty".to_string())
    } else if name.contains(':') || name.contains(',') {
        Some("contact name must not contain ':' or ','".to_string())
    } else if name.chars().count() > MAX_CONTACT_NAME_LEN {
        Some(format!(
            "contact name must be at most {MAX_CONTACT_NAME_LEN} characters"
        ))
    } else {
        None
    }
}

fn check_range(errors: &mut Vec<ConfigError>, key: &str, value: usize, min: usize, max: usize) {
    if !(min..=max).contains(&value) {
        errors.push(ConfigError::validation(
            key,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&KidfaxConfig::default()).is_ok());
    }

    #[test]
    fn out_of_range_values_are_all_reported() {
        let config = load_config_from_str(
            r#"
[printer]
line_width = 4

[avatar]
size = 1000

[state]
max_entries = 0
"#,
        )
        .expect("should deserialize");
        let errors = validate_config(&config).expect_err("should fail");
        assert_eq!(errors.len(), 3);
        let text: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(text.iter().any(|e| e.contains("printer.line_width")));
        assert!(text.iter().any(|e| e.contains("avatar.size")));
        assert!(text.iter().any(|e| e.contains("state.max_entries")));
    }

    #[test]
    fn display_without_command_fails() {
        let mut config = KidfaxConfig::default();
        config.display.enabled = true;
        let errors = validate_config(&config).expect_err("should fail");
        assert!(errors[0].to_string().contains("display.command"));
    }

    #[test]
    fn contact_names_are_checked() {
        assert!(contact_name_problem("grandma").is_none());
        assert!(contact_name_problem("a:b").is_some());
        assert!(contact_name_problem("a,b").is_some());
        assert!(contact_name_problem("  ").is_some());
        assert!(contact_name_problem(&"x".repeat(51)).is_some());
        assert!(contact_name_problem(&"x".repeat(50)).is_none());
    }

    #[test]
    fn empty_contact_id_fails() {
        let mut config = KidfaxConfig::default();
        config
            .directory
            .contacts
            .insert("grandma".to_string(), " ".to_string());
        assert!(validate_config(&config).is_err());
    }
}

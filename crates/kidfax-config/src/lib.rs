// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for kidfax.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, `KIDFAX_*` and legacy environment overrides, and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use kidfax_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Printing on {} columns", config.printer.line_width);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{
    load_config, load_config_from_path, load_config_from_str, parse_allowlist, parse_contacts,
};
pub use model::{
    AvatarConfig, DirectoryConfig, DisplayConfig, GeneralConfig, KidfaxConfig, PrinterConfig,
    PrinterDriverKind, SmsConfig, StateConfig, TelegramConfig,
};

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid `KidfaxConfig` or every diagnostic found.
pub fn load_and_validate() -> Result<KidfaxConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<KidfaxConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<KidfaxConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<KidfaxConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<KidfaxConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                driver = %config.printer.driver,
                contacts = config.directory.contacts.len(),
                allowlist = config.directory.allowlist.len(),
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut candidates = vec![std::path::PathBuf::from("/etc/kidfax/kidfax.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join("kidfax/kidfax.toml"));
    }
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join("kidfax.toml"));
    }

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}

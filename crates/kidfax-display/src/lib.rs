// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status display updaters.
//!
//! The pipeline calls the display once per cycle that printed something and
//! ignores any error it returns.

pub mod command;
pub mod noop;

use std::sync::Arc;
use std::time::Duration;

use kidfax_config::KidfaxConfig;
use kidfax_core::StatusDisplay;

pub use command::CommandDisplay;
pub use noop::NoopDisplay;

/// The display described by `[display]`, or [`NoopDisplay`] when disabled.
pub fn build_display(config: &KidfaxConfig) -> Arc<dyn StatusDisplay> {
    if !config.display.enabled || config.display.command.is_empty() {
        return Arc::new(NoopDisplay);
    }
    Arc::new(CommandDisplay::new(
        config.display.command.clone(),
        &config.general.header,
        &config.general.subtitle,
        Duration::from_secs(config.display.timeout_secs),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_display_is_noop() {
        let config = KidfaxConfig::default();
        assert_eq!(build_display(&config).name(), "noop");
    }

    #[test]
    fn enabled_display_runs_command() {
        let mut config = KidfaxConfig::default();
        config.display.enabled = true;
        config.display.command = vec!["true".to_string()];
        assert_eq!(build_display(&config).name(), "command");
    }
}

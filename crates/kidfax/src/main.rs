// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kid Fax - family text messages on a thermal receipt printer.
//!
//! Binary entry point: parses the command line, loads configuration, installs
//! logging, and dispatches to a subcommand.

mod discover;
mod doctor;
mod poll;
mod test_print;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use kidfax_config::{ConfigError, KidfaxConfig};
use tracing::error;

/// Kid Fax - family text messages on a thermal receipt printer.
#[derive(Parser, Debug)]
#[command(name = "kidfax", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Poll one message source and print until interrupted.
    Poll {
        #[arg(value_enum)]
        source: SourceKind,
    },
    /// Check configuration, state file, printer, and source credentials.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Render and print a sample receipt.
    TestPrint {
        /// Contact name to print as the sender.
        #[arg(long, value_name = "NAME")]
        from: Option<String>,
        /// Message body.
        text: Option<String>,
    },
    /// List Telegram chats that recently messaged the bot.
    Discover,
}

/// Message sources the poller can run against.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Sms,
    Telegram,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            kidfax_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.general.log_level);

    let result = match cli.command {
        Commands::Poll { source } => poll::run_poll(&config, source).await,
        Commands::Doctor { plain } => doctor::run_doctor(&config, plain).await,
        Commands::TestPrint { from, text } => {
            test_print::run_test_print(&config, from.as_deref(), text.as_deref()).await
        }
        Commands::Discover => discover::run_discover(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "kidfax exited with an error");
            eprintln!("kidfax: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<KidfaxConfig, Vec<ConfigError>> {
    match path {
        Some(path) => kidfax_config::load_and_validate_path(path),
        None => kidfax_config::load_and_validate(),
    }
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `general.log_level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn default_filter(log_level: &str) -> String {
    format!("kidfax={log_level},warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_poll_with_global_config() {
        let cli = Cli::try_parse_from(["kidfax", "poll", "telegram", "--config", "/tmp/k.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/k.toml")));
        assert_eq!(
            cli.command,
            Commands::Poll {
                source: SourceKind::Telegram
            }
        );
    }

    #[test]
    fn parses_test_print_arguments() {
        let cli =
            Cli::try_parse_from(["kidfax", "test-print", "--from", "grandma", "hi there"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::TestPrint {
                from: Some("grandma".to_string()),
                text: Some("hi there".to_string()),
            }
        );
    }

    #[test]
    fn rejects_unknown_source() {
        assert!(Cli::try_parse_from(["kidfax", "poll", "fax"]).is_err());
        assert!(Cli::try_parse_from(["kidfax"]).is_err());
    }

    #[test]
    fn default_filter_scopes_level_to_kidfax() {
        assert_eq!(default_filter("debug"), "kidfax=debug,warn");
    }
}

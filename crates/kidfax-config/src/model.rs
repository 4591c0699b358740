// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for kidfax.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::Duration;

use kidfax_core::Directory;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level kidfax configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KidfaxConfig {
    /// Receipt branding and logging.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Contacts and allowlist.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Seen-Set state file.
    #[serde(default)]
    pub state: StateConfig,

    /// Receipt printer connection and layout.
    #[serde(default)]
    pub printer: PrinterConfig,

    /// Contact avatar images.
    #[serde(default)]
    pub avatar: AvatarConfig,

    /// Twilio SMS source.
    #[serde(default)]
    pub sms: SmsConfig,

    /// Telegram bot source.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Optional status display.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Receipt header text and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Title printed at the top of every receipt.
    #[serde(default = "default_header")]
    pub header: String,

    /// Subtitle shown on the status display.
    #[serde(default = "default_subtitle")]
    pub subtitle: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            subtitle: default_subtitle(),
            log_level: default_log_level(),
        }
    }
}

fn default_header() -> String {
    "Kid Fax".to_string()
}

fn default_subtitle() -> String {
    "Messages from family".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Contact names and the sender allowlist.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Display name -> sender identifier (phone number or chat id).
    #[serde(default)]
    pub contacts: BTreeMap<String, String>,

    /// Sender identifiers allowed to print. Empty allows everyone.
    #[serde(default)]
    pub allowlist: Vec<String>,
}

impl DirectoryConfig {
    /// Builds the read-only directory consumed by the pipeline.
    pub fn to_directory(&self) -> Directory {
        let allowlist: BTreeSet<String> = self
            .allowlist
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Directory::new(self.contacts.clone(), allowlist)
    }
}

/// Seen-Set state file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StateConfig {
    /// Path of the JSON state file.
    #[serde(default = "default_state_path")]
    pub path: String,

    /// Maximum number of message ids retained per source.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_state_path() -> String {
    home_path(".kidfax_state.json")
}

fn default_max_entries() -> usize {
    5000
}

fn home_path(name: &str) -> String {
    dirs::home_dir()
        .map(|p| p.join(name))
        .unwrap_or_else(|| PathBuf::from(name))
        .to_string_lossy()
        .into_owned()
}

/// Which printer backend to open.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrinterDriverKind {
    /// Raw USB printer device file.
    #[default]
    Usb,
    /// Serial port.
    Serial,
    /// Bluetooth serial (rfcomm) port.
    Bluetooth,
    /// Raw TCP socket, usually port 9100.
    Network,
    /// Writes receipts to stdout.
    Dummy,
}

/// Receipt printer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrinterConfig {
    /// Printer backend.
    #[serde(default)]
    pub driver: PrinterDriverKind,

    /// Fall back to the dummy printer when the real one cannot be opened.
    #[serde(default)]
    pub allow_dummy: bool,

    /// Character encoding supported by the printer (`cp437`, `ascii`, or a WHATWG label).
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Characters per printed line.
    #[serde(default = "default_line_width")]
    pub line_width: usize,

    /// Delay before reopening an unavailable printer.
    #[serde(default = "default_reconnect_backoff_secs")]
    pub reconnect_backoff_secs: u64,

    /// USB printer device file.
    #[serde(default = "default_usb_device")]
    pub usb_device: String,

    /// Serial port for the `serial` driver.
    #[serde(default = "default_serial_port")]
    pub serial_port: String,

    /// rfcomm port for the `bluetooth` driver.
    #[serde(default = "default_bluetooth_port")]
    pub bluetooth_port: String,

    /// Serial baud rate.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Serial write timeout in milliseconds.
    #[serde(default = "default_serial_timeout_ms")]
    pub serial_timeout_ms: u64,

    /// Host of a network printer.
    #[serde(default = "default_network_host")]
    pub network_host: String,

    /// TCP port of a network printer.
    #[serde(default = "default_network_port")]
    pub network_port: u16,
}

impl PrinterConfig {
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            driver: PrinterDriverKind::default(),
            allow_dummy: false,
            encoding: default_encoding(),
            line_width: default_line_width(),
            reconnect_backoff_secs: default_reconnect_backoff_secs(),
            usb_device: default_usb_device(),
            serial_port: default_serial_port(),
            bluetooth_port: default_bluetooth_port(),
            baud_rate: default_baud_rate(),
            serial_timeout_ms: default_serial_timeout_ms(),
            network_host: default_network_host(),
            network_port: default_network_port(),
        }
    }
}

fn default_encoding() -> String {
    "cp437".to_string()
}

fn default_line_width() -> usize {
    32
}

fn default_reconnect_backoff_secs() -> u64 {
    10
}

fn default_usb_device() -> String {
    "/dev/usb/lp0".to_string()
}

fn default_serial_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_bluetooth_port() -> String {
    "/dev/rfcomm0".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_serial_timeout_ms() -> u64 {
    1000
}

fn default_network_host() -> String {
    "192.168.1.100".to_string()
}

fn default_network_port() -> u16 {
    9100
}

/// Contact avatar configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AvatarConfig {
    /// Print the sender's avatar when one is stored.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding `<contact>.png` files.
    #[serde(default = "default_avatar_dir")]
    pub dir: String,

    /// Printed avatar edge length in pixels.
    #[serde(default = "default_image_size")]
    pub size: u32,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_avatar_dir(),
            size: default_image_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_avatar_dir() -> String {
    home_path(".kidfax_avatars")
}

fn default_image_size() -> u32 {
    96
}

/// Twilio SMS source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmsConfig {
    /// Twilio account SID. Required to run the SMS poller.
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Twilio auth token. Required to run the SMS poller.
    #[serde(default)]
    pub auth_token: Option<String>,

    /// The Twilio number receiving messages.
    #[serde(default)]
    pub number: Option<String>,

    /// Size of the recent-message window fetched each poll.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,

    /// Delay between polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            account_sid: None,
            auth_token: None,
            number: None,
            fetch_limit: default_fetch_limit(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_fetch_limit() -> u32 {
    40
}

fn default_poll_interval_secs() -> u64 {
    15
}

/// Telegram bot source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required to run the Telegram poller.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Server-side long-poll timeout.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u32,

    /// Download and print photos attached to messages.
    #[serde(default = "default_true")]
    pub download_photos: bool,

    /// Largest photo to download, in megabytes.
    #[serde(default = "default_max_photo_mb")]
    pub max_photo_mb: u32,

    /// Printed photo edge length in pixels.
    #[serde(default = "default_image_size")]
    pub image_size: u32,
}

impl TelegramConfig {
    pub fn max_photo_bytes(&self) -> u64 {
        u64::from(self.max_photo_mb) * 1024 * 1024
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            poll_timeout_secs: default_poll_timeout_secs(),
            download_photos: true,
            max_photo_mb: default_max_photo_mb(),
            image_size: default_image_size(),
        }
    }
}

fn default_poll_timeout_secs() -> u32 {
    30
}

fn default_max_photo_mb() -> u32 {
    5
}

/// Status display configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Update the status display after printing.
    #[serde(default)]
    pub enabled: bool,

    /// Program and arguments invoked to draw the status screen.
    #[serde(default)]
    pub command: Vec<String>,

    /// Kill the display command after this many seconds.
    #[serde(default = "default_display_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: Vec::new(),
            timeout_secs: default_display_timeout_secs(),
        }
    }
}

fn default_display_timeout_secs() -> u64 {
    10
}

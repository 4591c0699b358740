// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by sources, the renderer, printer drivers, and the pipeline.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a message within its source. This is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        MessageId(value.to_string())
    }
}

/// Position marker for long-polling sources: the last consumed update id.
///
/// The next fetch asks for updates strictly newer than the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cursor(pub i64);

impl Cursor {
    /// The cursor that makes the next fetch start at `position` again.
    pub fn rewind_to(position: Cursor) -> Cursor {
        Cursor(position.0 - 1)
    }

    /// The first position the next fetch should return.
    pub fn next_offset(&self) -> i64 {
        self.0 + 1
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Source,
    Printer,
    Display,
    ImageProcessor,
}

// --- Inbound side ---

/// Raw image bytes attached to an inbound message.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Handle for an attachment the source has not downloaded yet.
///
/// Resolved through [`MessageSource::fetch_attachment`] once the message is
/// known to be printed.
///
/// [`MessageSource::fetch_attachment`]: crate::traits::MessageSource::fetch_attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Source-specific file identifier.
    pub file_id: String,
    /// Size the source reported before download, in bytes.
    pub declared_size: u64,
}

/// A message received from a source. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Dedup key, unique within the source.
    pub id: MessageId,
    /// Phone number or chat id, as text.
    pub sender_id: String,
    /// UTF-8 body, possibly empty.
    pub text: String,
    /// Optional raw image.
    pub attachment: Option<Attachment>,
    /// Image still held by the source, fetched after the filter stage.
    pub attachment_ref: Option<AttachmentRef>,
    /// Position in the fetch batch; defines print order.
    pub received_order: usize,
    /// Timestamp reported by the source.
    pub received_at: DateTime<Utc>,
    /// Source position of this message for long-polling sources.
    pub cursor: Option<Cursor>,
}

/// Result of one `fetch_new` call.
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    /// Candidate messages in chronological order.
    pub messages: Vec<InboundMessage>,
    /// Cursor to pass to the next fetch.
    pub cursor: Option<Cursor>,
}

/// Read-only mapping of contacts and the set of senders allowed to print.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    /// Display name -> sender identifier.
    pub contacts: BTreeMap<String, String>,
    /// Sender identifiers permitted to print. Empty permits everyone.
    pub allowlist: BTreeSet<String>,
}

impl Directory {
    pub fn new(contacts: BTreeMap<String, String>, allowlist: BTreeSet<String>) -> Self {
        Self {
            contacts,
            allowlist,
        }
    }

    /// Reverse lookup: the contact name registered for a sender, if any.
    pub fn contact_name(&self, sender_id: &str) -> Option<&str> {
        self.contacts
            .iter()
            .find(|(_, id)| id.as_str() == sender_id)
            .map(|(name, _)| name.as_str())
    }

    pub fn permits(&self, sender_id: &str) -> bool {
        self.allowlist.is_empty() || self.allowlist.contains(sender_id)
    }
}

/// A message that passed the allowlist, with its resolved sender label.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizedMessage {
    pub message: InboundMessage,
    /// `"{name} ({sender_id})"` for known contacts, otherwise the bare sender id.
    pub label: String,
    /// Contact name used for avatar lookup.
    pub contact_name: Option<String>,
}

// --- Outbound side ---

/// Horizontal alignment on the receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Text style applied to the lines that follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub align: Align,
    pub bold: bool,
    /// Double width and double height.
    pub double_size: bool,
}

impl TextStyle {
    pub const fn new(align: Align, bold: bool, double_size: bool) -> Self {
        Self {
            align,
            bold,
            double_size,
        }
    }
}

/// A 1-bit raster image, rows packed MSB first, `1` meaning a black dot.
#[derive(Clone, PartialEq, Eq)]
pub struct MonoImage {
    pub width: u32,
    pub height: u32,
    pub bits: Vec<u8>,
}

impl MonoImage {
    /// Bytes per packed row.
    pub fn row_bytes(width: u32) -> usize {
        width.div_ceil(8) as usize
    }

    /// Creates an all-white image.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![0; Self::row_bytes(width) * height as usize],
        }
    }

    pub fn set_black(&mut self, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y as usize * Self::row_bytes(self.width) + (x / 8) as usize;
        self.bits[idx] |= 0x80 >> (x % 8);
    }

    pub fn is_black(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * Self::row_bytes(self.width) + (x / 8) as usize;
        self.bits[idx] & (0x80 >> (x % 8)) != 0
    }
}

impl fmt::Debug for MonoImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MonoImage({}x{})", self.width, self.height)
    }
}

/// A single printer instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Style(TextStyle),
    /// One line of text; the newline is implied.
    Line(String),
    Image(MonoImage),
    /// Advance the paper by this many blank lines.
    Feed(u8),
    Cut,
}

/// The rendered, sink-directive form of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    pub directives: Vec<Directive>,
}

impl Receipt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    pub fn style(&mut self, style: TextStyle) {
        self.push(Directive::Style(style));
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.push(Directive::Line(text.into()));
    }

    pub fn blank(&mut self) {
        self.push(Directive::Line(String::new()));
    }

    /// Text lines in order, ignoring styles and images.
    pub fn text_lines(&self) -> Vec<&str> {
        self.directives
            .iter()
            .filter_map(|d| match d {
                Directive::Line(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn image_count(&self) -> usize {
        self.directives
            .iter()
            .filter(|d| matches!(d, Directive::Image(_)))
            .count()
    }
}

// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Allowlist filter and sender labelling.

use std::fmt;

use kidfax_core::{AuthorizedMessage, Directory, InboundMessage};

/// Why a message will not be printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The allowlist is non-empty and does not contain the sender.
    NotAllowlisted,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotAllowlisted => f.write_str("not in allowlist"),
        }
    }
}

/// Outcome of [`authorize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Authorized(AuthorizedMessage),
    Rejected {
        message: InboundMessage,
        reason: RejectReason,
    },
}

/// `"{name} ({sender_id})"` for known contacts, otherwise the bare id.
pub fn sender_label(sender_id: &str, directory: &Directory) -> String {
    match directory.contact_name(sender_id) {
        Some(name) => format!("{name} ({sender_id})"),
        None => sender_id.to_string(),
    }
}

/// Decides whether `message` may print and labels it if so.
pub fn authorize(message: InboundMessage, directory: &Directory) -> Verdict {
    if !directory.permits(&message.sender_id) {
        return Verdict::Rejected {
            message,
            reason: RejectReason::NotAllowlisted,
        };
    }
    let label = sender_label(&message.sender_id, directory);
    let contact_name = directory
        .contact_name(&message.sender_id)
        .map(str::to_string);
    Verdict::Authorized(AuthorizedMessage {
        message,
        label,
        contact_name,
    })
}

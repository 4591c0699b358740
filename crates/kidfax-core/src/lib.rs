// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for kidfax.
//!
//! This crate provides the error type, the shared message and receipt types,
//! and the adapter traits that sources, printer drivers, displays, and image
//! processors implement.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KidfaxError;
pub use types::{
    AdapterType, Align, Attachment, AttachmentRef, AuthorizedMessage, Cursor, Directive, Directory, FetchBatch,
    HealthStatus, InboundMessage, MessageId, MonoImage, Receipt, TextStyle,
};

pub use traits::{
    ImageProcessor, MessageSource, PluginAdapter, PrinterConnection, PrinterDriver, StatusDisplay,
};

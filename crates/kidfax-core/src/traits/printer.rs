// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Printer capability traits: a driver opens connections, a connection prints.

use async_trait::async_trait;

use crate::error::KidfaxError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Directive;

/// Opens connections to one kind of printer (USB, serial, network, dummy).
#[async_trait]
pub trait PrinterDriver: PluginAdapter {
    /// Opens a fresh connection. Failures map to [`KidfaxError::PrinterUnavailable`].
    async fn connect(&self) -> Result<Box<dyn PrinterConnection>, KidfaxError>;
}

/// An open printer handle.
///
/// A handle that returned an error must be discarded; writes are not
/// idempotent across partial failures.
#[async_trait]
pub trait PrinterConnection: Send {
    /// Writes formatting, text, and image directives.
    async fn write(&mut self, directives: &[Directive]) -> Result<(), KidfaxError>;

    /// Cuts the paper.
    async fn cut(&mut self) -> Result<(), KidfaxError>;
}

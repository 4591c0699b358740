// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Async adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod display;
pub mod image;
pub mod printer;
pub mod source;

pub use adapter::PluginAdapter;
pub use display::StatusDisplay;
pub use image::ImageProcessor;
pub use printer::{PrinterConnection, PrinterDriver};
pub use source::MessageSource;

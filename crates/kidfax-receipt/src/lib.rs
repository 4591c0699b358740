// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Receipt rendering for kidfax.
//!
//! Lays out an authorized message as printer directives: header, timestamp,
//! sender, optional avatar, wrapped body, optional photo, cut.

pub mod avatar;
pub mod dither;
pub mod encoding;
pub mod render;
pub mod wrap;

pub use avatar::AvatarStore;
pub use dither::DitherProcessor;
pub use encoding::Codepage;
pub use render::{ReceiptRenderer, RenderSettings};
pub use wrap::wrap_text;

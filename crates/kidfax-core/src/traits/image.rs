// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Image processing trait: raw bytes in, printable 1-bit raster out.

use crate::error::KidfaxError;
use crate::types::MonoImage;

/// Turns an encoded image into a square 1-bit raster of `target_size` pixels.
pub trait ImageProcessor: Send + Sync {
    fn process(&self, raw: &[u8], target_size: u32) -> Result<MonoImage, KidfaxError>;
}

// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Photo and avatar preparation for thermal printing.

use image::imageops::{self, BiLevel, FilterType};
use image::{GrayImage, Luma, RgbaImage};
use kidfax_core::{ImageProcessor, KidfaxError, MonoImage};

/// Largest edge accepted, whatever the configuration says.
const MAX_TARGET: u32 = 1024;

/// Decodes, fits into a white square, and Floyd-Steinberg dithers to 1 bit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DitherProcessor;

impl DitherProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl ImageProcessor for DitherProcessor {
    fn process(&self, raw: &[u8], target_size: u32) -> Result<MonoImage, KidfaxError> {
        let target = target_size.clamp(1, MAX_TARGET);
        let decoded = image::load_from_memory(raw).map_err(|e| KidfaxError::Image {
            message: format!("cannot decode image: {e}"),
        })?;

        let fitted = decoded.resize(target, target, FilterType::Lanczos3);
        let gray = flatten_on_white(&fitted.to_rgba8());

        let mut canvas = GrayImage::from_pixel(target, target, Luma([255]));
        let x = (target - gray.width()) / 2;
        let y = (target - gray.height()) / 2;
        imageops::overlay(&mut canvas, &gray, i64::from(x), i64::from(y));
        imageops::dither(&mut canvas, &BiLevel);

        Ok(pack(&canvas))
    }
}

/// Grayscale conversion that treats transparency as paper white.
fn flatten_on_white(rgba: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let luma = 0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b);
        let alpha = f32::from(a) / 255.0;
        let blended = luma * alpha + 255.0 * (1.0 - alpha);
        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

fn pack(gray: &GrayImage) -> MonoImage {
    let mut mono = MonoImage::blank(gray.width(), gray.height());
    for (x, y, pixel) in gray.enumerate_pixels() {
        if pixel.0[0] < 128 {
            mono.set_black(x, y);
        }
    }
    mono
}

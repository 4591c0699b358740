// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ESC/POS byte encoding for receipt directives.

use kidfax_core::{Align, Directive, MonoImage, TextStyle};
use kidfax_receipt::Codepage;

const ESC: u8 = 0x1b;
const GS: u8 = 0x1d;
const LF: u8 = 0x0a;

/// Encodes directives into the command stream understood by ESC/POS printers.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscPosEncoder {
    codepage: Codepage,
}

impl EscPosEncoder {
    pub fn new(codepage: Codepage) -> Self {
        Self { codepage }
    }

    /// Reset the printer and select the character table.
    pub fn init(&self) -> Vec<u8> {
        let mut out = vec![ESC, b'@'];
        if let Some(table) = self.codepage.escpos_table() {
            out.extend_from_slice(&[ESC, b't', table]);
        }
        out
    }

    /// Feed to the cutter and do a full cut.
    pub fn cut(&self) -> Vec<u8> {
        vec![GS, b'V', 65, 3]
    }

    /// Encodes every directive except [`Directive::Cut`], which needs its own
    /// failure handling and is sent with [`EscPosEncoder::cut`].
    pub fn encode(&self, directives: &[Directive]) -> Vec<u8> {
        let mut out = Vec::new();
        for directive in directives {
            match directive {
                Directive::Style(style) => push_style(&mut out, style),
                Directive::Line(text) => {
                    out.extend(self.codepage.encode(text));
                    out.push(LF);
                }
                Directive::Image(image) => push_raster(&mut out, image),
                Directive::Feed(lines) => out.extend_from_slice(&[ESC, b'd', *lines]),
                Directive::Cut => {}
            }
        }
        out
    }
}

fn push_style(out: &mut Vec<u8>, style: &TextStyle) {
    let align = match style.align {
        Align::Left => 0,
        Align::Center => 1,
        Align::Right => 2,
    };
    out.extend_from_slice(&[ESC, b'a', align]);
    out.extend_from_slice(&[ESC, b'E', u8::from(style.bold)]);
    out.extend_from_slice(&[GS, b'!', if style.double_size { 0x11 } else { 0x00 }]);
}

/// `GS v 0`: print raster bit image, normal density.
fn push_raster(out: &mut Vec<u8>, image: &MonoImage) {
    let row_bytes = MonoImage::row_bytes(image.width) as u16;
    let height = image.height as u16;
    out.extend_from_slice(&[GS, b'v', b'0', 0]);
    out.extend_from_slice(&row_bytes.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&image.bits);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_selects_codepage() {
        assert_eq!(EscPosEncoder::default().init(), vec![ESC, b'@', ESC, b't', 0]);
    }

    #[test]
    fn styles_and_lines() {
        let enc = EscPosEncoder::new(Codepage::Cp437);
        let bytes = enc.encode(&[
            Directive::Style(TextStyle::new(Align::Center, true, true)),
            Directive::Line("Café".to_string()),
        ]);
        assert_eq!(
            bytes,
            vec![
                ESC, b'a', 1, ESC, b'E', 1, GS, b'!', 0x11, b'C', b'a', b'f', 0x82, LF
            ]
        );
    }

    #[test]
    fn raster_header_and_payload() {
        let mut image = MonoImage::blank(10, 2);
        image.set_black(0, 0);
        let bytes = EscPosEncoder::default().encode(&[Directive::Image(image)]);
        assert_eq!(&bytes[..8], &[GS, b'v', b'0', 0, 2, 0, 2, 0]);
        assert_eq!(&bytes[8..], &[0x80, 0, 0, 0]);
    }

    #[test]
    fn feed_and_cut() {
        let enc = EscPosEncoder::default();
        assert_eq!(enc.encode(&[Directive::Feed(3), Directive::Cut]), vec![ESC, b'd', 3]);
        assert_eq!(enc.cut(), vec![GS, b'V', 65, 3]);
    }
}

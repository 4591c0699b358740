// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Printer character sets.
//!
//! Thermal printers speak a single-byte codepage. Text is sanitized to what
//! the codepage can represent before layout, then encoded to bytes by the
//! ESC/POS encoder.

use encoding_rs::Encoding;
use kidfax_core::KidfaxError;

/// Code page 437 glyphs for bytes `0x80..=0xFF`.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

/// The character set a printer was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codepage {
    /// IBM code page 437, the ESC/POS power-on default.
    #[default]
    Cp437,
    /// Seven-bit ASCII only.
    Ascii,
    /// Any single-byte WHATWG encoding, e.g. `windows-1252`.
    Whatwg(&'static Encoding),
}

impl Codepage {
    /// Resolves a configured encoding name.
    pub fn from_label(label: &str) -> Result<Self, KidfaxError> {
        let normalized = label.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "cp437" | "ibm437" | "437" | "pc437" => return Ok(Codepage::Cp437),
            "ascii" | "us-ascii" => return Ok(Codepage::Ascii),
            _ => {}
        }

        let encoding = Encoding::for_label(normalized.as_bytes())
            .ok_or_else(|| KidfaxError::Config(format!("unknown printer encoding `{label}`")))?;
        if !encoding.is_single_byte() {
            return Err(KidfaxError::Config(format!(
                "printer encoding `{label}` is not a single-byte codepage"
            )));
        }
        Ok(Codepage::Whatwg(encoding))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codepage::Cp437 => "cp437",
            Codepage::Ascii => "ascii",
            Codepage::Whatwg(enc) => enc.name(),
        }
    }

    /// The `ESC t n` table number that selects this codepage, when known.
    pub fn escpos_table(&self) -> Option<u8> {
        match self {
            Codepage::Cp437 | Codepage::Ascii => Some(0),
            Codepage::Whatwg(enc) => match enc.name() {
                "IBM866" => Some(17),
                "ISO-8859-2" => Some(39),
                "ISO-8859-15" => Some(40),
                "windows-1252" => Some(16),
                "windows-1250" => Some(45),
                "windows-1251" => Some(46),
                "windows-1253" => Some(47),
                "windows-1254" => Some(48),
                "windows-1255" => Some(49),
                "windows-1256" => Some(50),
                "windows-1257" => Some(51),
                "windows-1258" => Some(52),
                _ => None,
            },
        }
    }

    /// The single byte for `c`, if the codepage has it.
    pub fn encode_char(&self, c: char) -> Option<u8> {
        if c.is_ascii() {
            return (!c.is_ascii_control()).then_some(c as u8);
        }
        match self {
            Codepage::Ascii => None,
            Codepage::Cp437 => CP437_HIGH
                .iter()
                .position(|&g| g == c)
                .map(|i| 0x80 + i as u8),
            Codepage::Whatwg(enc) => {
                let mut buf = [0u8; 4];
                let (bytes, _, had_errors) = enc.encode(c.encode_utf8(&mut buf));
                (!had_errors && bytes.len() == 1).then(|| bytes[0])
            }
        }
    }

    /// Drops characters the printer cannot show.
    ///
    /// Control characters are removed too, so message text can never smuggle
    /// printer commands. Newlines survive; tabs become spaces.
    pub fn sanitize(&self, text: &str) -> String {
        text.chars()
            .filter_map(|c| match c {
                '\n' => Some('\n'),
                '\t' => Some(' '),
                c if self.encode_char(c).is_some() => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Encodes already-sanitized text, skipping anything unrepresentable.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        text.chars().filter_map(|c| self.encode_char(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cp437_keeps_accents_and_drops_emoji() {
        let cp = Codepage::Cp437;
        assert_eq!(cp.sanitize("Café ☕ ok!"), "Café  ok!");
        assert_eq!(cp.encode("é"), vec![0x82]);
        assert_eq!(cp.encode("░"), vec![0xB0]);
    }

    #[test]
    fn ascii_drops_everything_non_ascii() {
        assert_eq!(Codepage::Ascii.sanitize("naïve"), "nave");
    }

    #[test]
    fn control_characters_are_stripped() {
        let cp = Codepage::Cp437;
        assert_eq!(cp.sanitize("a\x1b@b\tc\nd\r"), "a@b c\nd");
    }

    #[test]
    fn whatwg_labels_resolve() {
        let cp = Codepage::from_label("latin1").expect("latin1 is a WHATWG label");
        assert_eq!(cp.name(), "windows-1252");
        assert_eq!(cp.escpos_table(), Some(16));
        assert_eq!(cp.encode("€"), vec![0x80]);
        assert_eq!(cp.sanitize("€ 😀"), "€ ");
    }

    #[test]
    fn unknown_and_multibyte_labels_are_rejected() {
        assert!(matches!(
            Codepage::from_label("klingon"),
            Err(KidfaxError::Config(_))
        ));
        assert!(Codepage::from_label("utf-8").is_err());
        assert_eq!(Codepage::from_label(" CP437 ").unwrap(), Codepage::Cp437);
    }
}

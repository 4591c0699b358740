// SPDX-FileCopyrightText: 2026 Kid Fax Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Greedy word wrap for fixed-width receipt paper.

/// Wraps `text` to lines of at most `width` characters.
///
/// Existing line breaks are kept and each paragraph is wrapped on its own.
/// Words longer than `width` are split across lines; there is no
/// hyphenation. A blank paragraph becomes one empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.strip_suffix('\r').unwrap_or(paragraph);
        let mut current = String::new();
        let mut current_len = 0;
        let mut produced = false;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len <= width {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
                continue;
            }

            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                produced = true;
            }

            if word_len <= width {
                current.push_str(word);
                current_len = word_len;
                continue;
            }

            let chars: Vec<char> = word.chars().collect();
            let mut chunks = chars.chunks(width).peekable();
            while let Some(chunk) = chunks.next() {
                if chunks.peek().is_some() {
                    lines.push(chunk.iter().collect());
                    produced = true;
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
        }

        if current_len > 0 || !produced {
            lines.push(current);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greedy_wrap_at_word_boundary() {
        assert_eq!(wrap_text("hello world foo", 10), vec!["hello", "world foo"]);
    }

    #[test]
    fn paragraphs_wrap_independently() {
        assert_eq!(
            wrap_text("one two\nthree four five", 9),
            vec!["one two", "three", "four five"]
        );
    }

    #[test]
    fn blank_paragraph_is_one_empty_line() {
        assert_eq!(wrap_text("hi\n\nthere", 32), vec!["hi", "", "there"]);
        assert_eq!(wrap_text("", 32), vec![""]);
    }

    #[test]
    fn long_words_are_broken() {
        assert_eq!(
            wrap_text("abcdefghijklmnop xy", 5),
            vec!["abcde", "fghij", "klmno", "p xy"]
        );
    }

    #[test]
    fn exact_width_fits() {
        assert_eq!(wrap_text("abcde fghij", 11), vec!["abcde fghij"]);
        assert_eq!(wrap_text("abcde fghij", 10), vec!["abcde", "fghij"]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(wrap_text("héllo wörld", 5), vec!["héllo", "wörld"]);
    }

    #[test]
    fn crlf_and_extra_spaces_are_normalized() {
        assert_eq!(wrap_text("a   b\r\nc", 10), vec!["a b", "c"]);
    }
}

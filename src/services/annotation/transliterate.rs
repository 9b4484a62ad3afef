//! Pre-reform Russian orthography to modern spelling.
//!
//! Runs before span extraction, so span offsets always refer to the
//! transliterated text.

use std::sync::LazyLock;

use regex::Regex;

/// Historical letters and their modern replacements.
const LETTER_MAP: &[(char, &str)] = &[
    ('\u{0463}', "е"), // ѣ
    ('\u{0462}', "Е"), // Ѣ
    ('\u{0456}', "и"), // і
    ('\u{0406}', "И"), // І
    ('\u{0475}', "и"), // ѵ
    ('\u{0474}', "И"), // Ѵ
    ('\u{0473}', "ф"), // ѳ
    ('\u{0472}', "Ф"), // Ѳ
];

/// Hard sign at the end of a word: before whitespace, punctuation or end of text.
static WORD_FINAL_HARD_SIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[ъЪ]([\s.,;:!?—–"'()\[\]«»]|$)"#).unwrap());

/// Runs of horizontal whitespace; newlines are left alone.
static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Deterministic character-substitution pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct Transliterator;

impl Transliterator {
    pub fn new() -> Self {
        Self
    }

    pub fn transliterate(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match LETTER_MAP.iter().find(|(old, _)| *old == c) {
                Some((_, new)) => out.push_str(new),
                None => out.push(c),
            }
        }

        let out = WORD_FINAL_HARD_SIGN.replace_all(&out, "$1");
        let out = HORIZONTAL_SPACE.replace_all(&out, " ");
        out.trim().to_string()
    }
}

/// Convenience wrapper around `Transliterator::transliterate`.
pub fn transliterate(text: &str) -> String {
    Transliterator.transliterate(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_historical_letters() {
        let input = "Н\u{0463}который текстъ съ дореволюц\u{0456}онными буквами и \u{0463}";
        assert_eq!(
            transliterate(input),
            "Некоторый текст с дореволюционными буквами и е"
        );
    }

    #[test]
    fn test_capitals_and_fita() {
        let input = "\u{0462}гусь по улиц\u{0463} съ собакой \u{0472}омой.";
        assert_eq!(transliterate(input), "Егусь по улице с собакой Фомой.");
    }

    #[test]
    fn test_modern_text_unchanged() {
        let input = "Иду по улице с собакой.";
        assert_eq!(transliterate(input), input);
    }

    #[test]
    fn test_inner_hard_sign_kept() {
        assert_eq!(transliterate("подъездъ"), "подъезд");
    }

    #[test]
    fn test_hard_sign_before_punctuation() {
        assert_eq!(transliterate("миръ, домъ!"), "мир, дом!");
    }

    #[test]
    fn test_whitespace_collapsed_but_lines_kept() {
        assert_eq!(transliterate("  одинъ   два\nтри\t\tчетыре "), "один два\nтри четыре");
    }

    #[test]
    fn test_latin_untouched() {
        assert_eq!(transliterate("year iy"), "year iy");
    }
}

//! Unicode, whitespace, and number normalization shared by every extractor.
//!
//! Accent-insensitive anchor search goes through [`Folded`], which keeps the
//! original text and its folded form side by side with a one-to-one char
//! mapping. Offsets found in the folded text are always translated through
//! that mapping, never reused as raw byte offsets.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

static RE_BLANKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Unicode canonical composition (NFC). Keeps accents, merges combining marks.
pub fn nfc(s: &str) -> String {
    s.nfc().collect()
}

/// Fold a single char for matching: strip diacritics and lowercase.
///
/// Always yields exactly one char, which is what keeps [`Folded`] aligned.
pub fn fold_char(c: char) -> char {
    let base = std::iter::once(c)
        .nfd()
        .find(|d| !is_combining_mark(*d))
        .unwrap_or(c);
    let mut lower = base.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => base,
    }
}

/// Remove diacritics while preserving case and char count.
pub fn strip_accents(s: &str) -> String {
    s.chars()
        .map(|c| {
            std::iter::once(c)
                .nfd()
                .find(|d| !is_combining_mark(*d))
                .unwrap_or(c)
        })
        .collect()
}

/// Fold a whole string (see [`fold_char`]).
pub fn fold(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// An original string paired with its accent-folded, lower-cased twin.
///
/// Both strings have the same number of chars; `bounds` records where each
/// char starts in either string so a match in one can be mapped onto the
/// other.
#[derive(Debug, Clone)]
pub struct Folded<'a> {
    original: &'a str,
    folded: String,
    original_bounds: Vec<usize>,
    folded_bounds: Vec<usize>,
}

impl<'a> Folded<'a> {
    pub fn new(original: &'a str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut original_bounds = Vec::with_capacity(original.len() + 1);
        let mut folded_bounds = Vec::with_capacity(original.len() + 1);

        for (offset, c) in original.char_indices() {
            original_bounds.push(offset);
            folded_bounds.push(folded.len());
            folded.push(fold_char(c));
        }
        original_bounds.push(original.len());
        folded_bounds.push(folded.len());

        Self {
            original,
            folded,
            original_bounds,
            folded_bounds,
        }
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// Number of chars in either string.
    pub fn char_len(&self) -> usize {
        self.original_bounds.len() - 1
    }

    /// Char index of the first accent- and case-insensitive occurrence of
    /// `anchor`.
    pub fn find(&self, anchor: &str) -> Option<usize> {
        let needle = fold(anchor);
        if needle.is_empty() {
            return None;
        }
        let byte = self.folded.find(&needle)?;
        self.folded_bounds.binary_search(&byte).ok()
    }

    /// Byte offset in the original string of the char at `index`.
    pub fn original_offset(&self, index: usize) -> usize {
        self.original_bounds[index.min(self.char_len())]
    }

    /// Up to `len` chars of the original string starting at char `start`.
    pub fn original_window(&self, start: usize, len: usize) -> &'a str {
        let from = self.original_offset(start);
        let to = self.original_offset(start.saturating_add(len));
        &self.original[from..to]
    }
}

/// Collapse runs of spaces and tabs to one space and trim.
pub fn collapse_spaces(s: &str) -> String {
    RE_BLANKS.replace_all(s, " ").trim().to_string()
}

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    RE_WHITESPACE.replace_all(s, " ").trim().to_string()
}

/// Clean a raw table cell: non-breaking spaces become spaces, zero-width
/// characters and BOMs are dropped, surrounding whitespace is trimmed.
pub fn clean_cell(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '\u{200B}' | '\u{FEFF}'))
        .map(|c| if c == '\u{00A0}' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn has_letters(s: &str) -> bool {
    s.chars().any(char::is_alphabetic)
}

/// `true` when `s` has at least one cased char and none of them is lowercase.
pub fn is_upper(s: &str) -> bool {
    let mut cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Parse a decimal that may use either `.` or `,` as separator.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let t = s.trim().replace(',', ".");
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// First number in `s`, truncated to an integer: `"3.0"` → 3, `"03"` → 3.
///
/// Digits are never concatenated across separate runs.
pub fn leading_int(s: &str) -> Option<u32> {
    let m = RE_NUMBER.find(s)?;
    let value = m.as_str().parse::<f64>().ok()?;
    if !(0.0..=f64::from(u32::MAX)).contains(&value) {
        return None;
    }
    Some(value.trunc() as u32)
}

/// `true` when `value` is a plausible credit count.
pub fn is_small_credit(value: u32) -> bool {
    (1..=30).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfc_composes_accents() {
        assert_eq!(nfc("CRE\u{0301}DITOS"), "CR\u{00C9}DITOS");
    }

    #[test]
    fn test_strip_accents_preserves_length() {
        let input = "Kárdex Electrónico Ñandú";
        let out = strip_accents(input);
        assert_eq!(out, "Kardex Electronico Nandu");
        assert_eq!(out.chars().count(), input.chars().count());
    }

    #[test]
    fn test_fold_lowercases_and_strips() {
        assert_eq!(fold("CRÉDITOS"), "creditos");
        assert_eq!(fold(""), "");
    }

    #[test]
    fn test_folded_find_maps_back_to_original() {
        let text = "Áreas: KÁRDEX ELECTRÓNICO\nPROMEDIO 91,5";
        let folded = Folded::new(text);
        let idx = folded.find("kardex electronico").unwrap();
        assert_eq!(folded.original_window(idx, 18), "KÁRDEX ELECTRÓNICO");
    }

    #[test]
    fn test_folded_window_is_clamped() {
        let folded = Folded::new("ÉXITO");
        assert_eq!(folded.original_window(2, 800), "ITO");
        assert_eq!(folded.original_window(10, 5), "");
    }

    #[test]
    fn test_folded_missing_anchor() {
        let folded = Folded::new("sin ancla");
        assert!(folded.find("promedio").is_none());
        assert!(folded.find("").is_none());
    }

    #[test]
    fn test_collapse_spaces_keeps_newlines() {
        assert_eq!(collapse_spaces("  a \t b\nc  "), "a b\nc");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace(" a \n\n b  "), "a b");
    }

    #[test]
    fn test_clean_cell() {
        assert_eq!(clean_cell("\u{FEFF} 04110\u{00A0}\u{200B}"), "04110");
        assert_eq!(clean_cell(""), "");
    }

    #[test]
    fn test_is_upper() {
        assert!(is_upper("DESARROLLO WEB"));
        assert!(is_upper("COMPUTACIÓN MÓVIL"));
        assert!(!is_upper("Desarrollo Web"));
        assert!(!is_upper("1234 --"));
    }

    #[test]
    fn test_parse_decimal_comma_and_dot() {
        assert_eq!(parse_decimal("93,33"), Some(93.33));
        assert_eq!(parse_decimal("93.33"), Some(93.33));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("3.0"), Some(3));
        assert_eq!(leading_int("03"), Some(3));
        assert_eq!(leading_int("6 8"), Some(6));
        assert_eq!(leading_int("sin"), None);
    }

    #[test]
    fn test_is_small_credit_bounds() {
        assert!(!is_small_credit(0));
        assert!(is_small_credit(1));
        assert!(is_small_credit(30));
        assert!(!is_small_credit(45));
    }
}

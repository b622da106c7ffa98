//! Course code canonicalization.

use std::sync::LazyLock;

use regex::Regex;

/// Width every short numeric code is zero-padded to.
pub const CODE_WIDTH: usize = 5;

static RE_CLEAN_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)(?:\.0)?\s*$").unwrap());
static RE_EMBEDDED_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{2,6})\b").unwrap());

/// Canonicalize a raw course code to its fixed-width numeric form.
///
/// `"4110.0"` → `"04110"`, `"121"` → `"00121"`, `"123456"` stays as is.
/// Codes fused with text fall back to the first 2–6 digit run. Returns an
/// empty string when no code can be recovered.
pub fn normalize_code(raw: &str) -> String {
    let digits = match RE_CLEAN_INTEGER.captures(raw) {
        Some(caps) => caps[1].to_string(),
        None => match RE_EMBEDDED_CODE.captures(raw) {
            Some(caps) => caps[1].to_string(),
            None => return String::new(),
        },
    };

    if digits.len() < CODE_WIDTH {
        format!("{digits:0>width$}", width = CODE_WIDTH)
    } else {
        digits
    }
}

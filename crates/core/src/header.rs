//! Transcript header fields (date, program, plan, unit, student, status).

use std::sync::LazyLock;

use regex::Regex;

use crate::text::{collapse_spaces, Folded};
use crate::types::HeaderRecord;

/// Title anchors removed from the text before field extraction, matched
/// without regard to accents or case.
const TITLE_ANCHORS: [&str; 2] = ["universidad de sonora", "kardex electronico"];

/// Decorative status suffix printed next to the status code.
const STATUS_DECORATION: &str = ".. Alumno activo....";

static RE_PAGE_FOOTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)P[aá]gina\s+\d+\s+de\s+\d+").unwrap());
static RE_BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

static RE_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?im)Fecha:\s*(.*)").unwrap());
static RE_PROGRAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)PROGRAMA:\s*(.*)").unwrap());
static RE_PLAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?im)PLAN:\s*([0-9]+)").unwrap());
static RE_UNIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?im)UNIDAD:\s*(.*)").unwrap());
static RE_STUDENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)EXPEDIENTE:\s*([0-9]+)").unwrap());
static RE_STUDENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)EXPEDIENTE:\s*[0-9]+[ \t]+(.*)").unwrap());
static RE_STATUS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?im)ESTATUS:\s*(.*)").unwrap());

/// Remove the run starting at the first accent-insensitive occurrence of
/// `anchor` up to and including the next blank line (or the end of text).
pub fn remove_title_span(text: &str, anchor: &str) -> String {
    let folded = Folded::new(text);
    let Some(start_char) = folded.find(anchor) else {
        return text.to_string();
    };
    let start = folded.original_offset(start_char);
    let tail = &text[start..];
    let end = RE_BLANK_LINE
        .find(tail)
        .map(|m| start + m.end())
        .unwrap_or(text.len());

    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..start]);
    out.push_str(&text[end..]);
    out
}

/// Strip page footers, decorative phrases, and document titles.
pub fn strip_boilerplate(text: &str) -> String {
    let mut cleaned = RE_PAGE_FOOTER.replace_all(text, "").to_string();
    cleaned = cleaned.replace(STATUS_DECORATION, "");
    for anchor in TITLE_ANCHORS {
        cleaned = remove_title_span(&cleaned, anchor);
    }
    cleaned
}

fn grab(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| collapse_spaces(m.as_str()))
        .filter(|v| !v.is_empty())
}

/// Extract the labeled header fields of a transcript. Absent labels leave
/// the field as `None`.
pub fn extract_header(raw_text: &str) -> HeaderRecord {
    let text = strip_boilerplate(raw_text);
    HeaderRecord {
        date: grab(&RE_DATE, &text),
        program: grab(&RE_PROGRAM, &text),
        plan_code: grab(&RE_PLAN, &text),
        unit: grab(&RE_UNIT, &text),
        student_id: grab(&RE_STUDENT_ID, &text),
        student_name: grab(&RE_STUDENT_NAME, &text),
        status: grab(&RE_STATUS, &text),
    }
}

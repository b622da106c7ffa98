//! Curriculum version and credit requirement of a study plan.
//!
//! The version is a four-digit number printed near the word "PLAN". It is
//! looked up through a fallback chain so that five-digit course codes are
//! never mistaken for it.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::search::nearest_after;
use crate::text::{collapse_whitespace, leading_int};
use crate::types::{PlanInfo, PLAN_NAME};

pub const UNKNOWN_VERSION: &str = "N/A";

const PLAN_WINDOW: usize = 120;
const PROGRAM_WINDOW: usize = 80;
const CREDITS_WINDOW: usize = 40;

const PROGRAM_PATTERN: &str = r"INGENIER[ÍI]A\s+EN\s+SISTEMAS\s+DE\s+INFORMACI[ÓO]N";

static RE_PLAN_SAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPLAN\b[ \t]*[:\-]?[ \t]*(\d{4})(?:\D|$)").unwrap());
static RE_PLAN_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bPLAN\b").unwrap());
static RE_FOUR_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})(?:\D|$)").unwrap());
static RE_PROGRAM_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)PROGRAMA:\s*{PROGRAM_PATTERN}")).unwrap());
static RE_PROGRAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){PROGRAM_PATTERN}")).unwrap());
static RE_AFTER_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+(\d{4})(?:\D|$)").unwrap());
static RE_AFTER_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*\(.*?\))?\s*(\d{4})(?:\D|$)").unwrap());

static RE_APPROVED_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)CR[EÉ]DITOS\s+APROBADOS:").unwrap());
static RE_APPROVED_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*\d+\s*DE\s*(\d{2,3})").unwrap());
static RE_MINIMUM_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)M[IÍ]NIMO\s+DE").unwrap());
static RE_MINIMUM_TOTAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s+(\d{2,3})\s+CR[EÉ]DITOS").unwrap());

/// Four-digit plan version, or [`UNKNOWN_VERSION`].
pub fn plan_version(text: &str) -> String {
    if let Some(caps) = RE_PLAN_SAME_LINE.captures(text) {
        return caps[1].to_string();
    }

    if let Some(found) = nearest_after(text, &RE_PLAN_WORD, &RE_FOUR_DIGITS, PLAN_WINDOW) {
        return found.value;
    }

    let flat = collapse_whitespace(text);
    if let Some(found) = nearest_after(&flat, &RE_PROGRAM_LABEL, &RE_AFTER_LABEL, PROGRAM_WINDOW) {
        return found.value;
    }

    if let Some(found) = nearest_after(text, &RE_PROGRAM_NAME, &RE_AFTER_NAME, PROGRAM_WINDOW) {
        return found.value;
    }

    UNKNOWN_VERSION.to_string()
}

/// Total credits required by the plan, zero when unknown.
pub fn total_credits(text: &str) -> u32 {
    nearest_after(text, &RE_APPROVED_ANCHOR, &RE_APPROVED_TOTAL, CREDITS_WINDOW)
        .or_else(|| nearest_after(text, &RE_MINIMUM_ANCHOR, &RE_MINIMUM_TOTAL, CREDITS_WINDOW))
        .and_then(|found| leading_int(&found.value))
        .unwrap_or(0)
}

pub fn extract_plan_info(text: &str) -> PlanInfo {
    let info = PlanInfo {
        name: PLAN_NAME.to_string(),
        version: plan_version(text),
        total_credits: total_credits(text),
        suggested_semesters: 0,
    };
    debug!(
        "plan version={} total_credits={}",
        info.version, info.total_credits
    );
    info
}

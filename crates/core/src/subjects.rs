//! Course rows of a transcript table (`CR CVE MATERIA E1 E2 ORD REG CIC I R B`).

use std::sync::LazyLock;

use regex::Regex;

use crate::dedup::dedup_subjects;
use crate::text::{collapse_spaces, nfc};
use crate::types::SubjectRow;

static RE_CREDIT_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}$").unwrap());
static RE_COURSE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9_-]{2,9}$").unwrap());

fn optional(cells: &[String], index: usize) -> Option<String> {
    cells.get(index).filter(|c| !c.is_empty()).cloned()
}

/// Parse one raw table row. Header rows and noise fail validation.
pub fn parse_subject_row(row: &[String]) -> Option<SubjectRow> {
    if row.len() < 3 {
        return None;
    }
    let cells: Vec<String> = row.iter().map(|c| collapse_spaces(&nfc(c))).collect();

    let (tag, code, name) = (&cells[0], &cells[1], &cells[2]);
    if !RE_CREDIT_TAG.is_match(tag) || !RE_COURSE_CODE.is_match(code) || name.is_empty() {
        return None;
    }

    Some(SubjectRow {
        credit_hours_tag: tag.clone(),
        course_code: code.clone(),
        course_name: name.clone(),
        e1: optional(&cells, 3),
        e2: optional(&cells, 4),
        ord: optional(&cells, 5),
        reg: optional(&cells, 6),
        cycle: optional(&cells, 7),
        i: optional(&cells, 8),
        r: optional(&cells, 9),
        b: optional(&cells, 10),
    })
}

/// Subject rows of every table, deduplicated.
pub fn extract_subject_rows(tables: &[Vec<Vec<String>>]) -> Vec<SubjectRow> {
    let rows = tables
        .iter()
        .flat_map(|grid| grid.iter())
        .filter_map(|row| parse_subject_row(row));
    dedup_subjects(rows)
}

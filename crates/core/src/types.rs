use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::clean_cell;

/// Fixed display name of the program every study plan belongs to.
pub const PLAN_NAME: &str = "Ingeniería en Sistemas de Información";

/// Which generator family produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OriginVariant {
    /// Official registrar export ("Listado de Materias Oficial").
    Official,
    /// Student-portal export.
    Student,
    Unknown,
}

impl fmt::Display for OriginVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OriginVariant::Official => write!(f, "OFFICIAL"),
            OriginVariant::Student => write!(f, "STUDENT"),
            OriginVariant::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Mandatory vs. elective course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CourseType {
    #[default]
    Obl,
    Opt,
}

impl CourseType {
    /// Normalize a raw type tag. `OPT`, `ELE` and `SEL` (with or without a
    /// leading `*`) are electives; anything else is mandatory.
    pub fn from_tag(raw: &str) -> Self {
        let tag = raw.trim().to_uppercase().replace('*', "");
        match tag.as_str() {
            "OPT" | "ELE" | "SEL" => CourseType::Opt,
            _ => CourseType::Obl,
        }
    }
}

/// One course of a study plan. Identity key is `code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub code: String,
    pub name: String,
    pub credits: u32,
    #[serde(rename = "type")]
    pub course_type: CourseType,
    pub semester: Option<u32>,
}

/// One course row of a transcript.
///
/// Identity key is `(credit_hours_tag, course_code, course_name, cycle)`.
/// The optional fields follow the transcript's own column headers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubjectRow {
    pub credit_hours_tag: String,
    pub course_code: String,
    pub course_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ord: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
}

/// Labeled single-line fields from a transcript header.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeaderRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Sub-keys of the credit and subject tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tally {
    Apr,
    Rep,
    Nmr,
    Ins,
}

impl Tally {
    pub fn label(&self) -> &'static str {
        match self {
            Tally::Apr => "APR",
            Tally::Rep => "REP",
            Tally::Nmr => "NMR",
            Tally::Ins => "INS",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStats {
    pub per_period_averages: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate_average: Option<f64>,
    pub credit_counts: BTreeMap<Tally, u32>,
    pub subject_counts: BTreeMap<Tally, u32>,
}

/// A course listed inside a specialization track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<u32>,
}

/// A named elective sub-curriculum ("acentuación").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecializationBlock {
    pub name: String,
    #[serde(rename = "materias")]
    pub entries: Vec<TrackEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanInfo {
    pub name: String,
    /// Four-digit curriculum version or `"N/A"`.
    pub version: String,
    /// Zero when unknown.
    pub total_credits: u32,
    /// Never derived; always zero.
    pub suggested_semesters: u32,
}

/// One raw table as handed over by a table provider, with the first row
/// promoted to a header.
///
/// Cells are cleaned and trimmed; rows that are entirely empty are dropped.
/// Rows keep their original (possibly ragged) width.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Frame {
    pub fn from_grid(grid: &[Vec<String>]) -> Self {
        let mut rows = grid
            .iter()
            .map(|row| row.iter().map(|c| clean_cell(c)).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|c| !c.is_empty()));

        let headers = rows.next().unwrap_or_default();

        Frame {
            headers,
            rows: rows.collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Upper-cased header labels used for column identification.
    pub fn header_keys(&self) -> Vec<String> {
        self.headers.iter().map(|h| h.to_uppercase()).collect()
    }

    /// Number of columns: the most common row length, header included.
    /// Ties go to the wider length.
    pub fn width(&self) -> usize {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for row in self.all_rows() {
            *counts.entry(row.len()).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by_key(|&(len, count)| (count, len))
            .map_or(0, |(len, _)| len)
    }

    /// Header row followed by data rows.
    pub fn all_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        std::iter::once(&self.headers)
            .filter(|h| !h.is_empty())
            .chain(self.rows.iter())
    }
}

/// A document as seen by the parsing core: full text plus ordered table
/// grids.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub text: String,
    pub tables: Vec<Vec<Vec<String>>>,
}

impl Document {
    pub fn new(text: impl Into<String>, tables: Vec<Vec<Vec<String>>>) -> Self {
        Self {
            text: text.into(),
            tables,
        }
    }

    pub fn origin(&self) -> OriginVariant {
        crate::origin::classify(&self.text)
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.tables
            .iter()
            .map(|grid| Frame::from_grid(grid))
            .filter(|frame| !frame.is_empty())
            .collect()
    }
}

//! Parser for the official registrar export.
//!
//! Tables are read by column identity when their header names the code,
//! name, type or credit columns. Tables without a usable header fall back to
//! joining each row into one line and matching `<code> <name> <type> <credits>`.
//!
//! Documents carrying the specialization-track section also list each track
//! as a narrow table of titles and member rows; those tables are segmented
//! into [`SpecializationBlock`]s and kept out of the main course list.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::code::normalize_code;
use crate::dedup::dedup_courses;
use crate::origin::TRACKS_TITLE;
use crate::text::{collapse_spaces, is_small_credit, is_upper, leading_int};
use crate::types::{CourseEntry, CourseType, Frame, SpecializationBlock, TrackEntry};

/// Rows kept for diagnostics.
pub const DEBUG_ROW_LIMIT: usize = 12;

/// Block name for member rows seen before any track title.
pub const DEFAULT_TRACK_NAME: &str = "ACENTUACIÓN";

const MAX_TITLE_LEN: usize = 40;

const BOILERPLATE: [&str; 2] = ["UNIVERSIDAD DE SONORA", "HOJA : "];

static RE_CODE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bCLAVE\b|\bCVE\b").unwrap());
static RE_CODE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{2,6})\b").unwrap());
static RE_TYPE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(OBL|OPT|ELE|SEL)\b").unwrap());
static RE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static RE_EMBEDDED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{2,6})\s+(.*)$").unwrap());
static RE_LEADING_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{2,6})\b\s*").unwrap());
static RE_TRAILING_INT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\s*$").unwrap());

fn is_credit_label(key: &str) -> bool {
    key.contains("CRÉDIT") || key.contains("CREDIT")
}

fn is_boilerplate(upper: &str) -> bool {
    BOILERPLATE.iter().any(|marker| upper.contains(marker))
}

fn is_header_repeat(upper: &str) -> bool {
    upper.contains("CLAVE") && upper.contains("MATERIA")
}

fn join_cells(row: &[String]) -> String {
    let cells: Vec<&str> = row
        .iter()
        .map(String::as_str)
        .filter(|c| !c.is_empty())
        .collect();
    collapse_spaces(&cells.join(" "))
}

/// Column indices identified from a frame header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub code: Option<usize>,
    pub name: Option<usize>,
    pub kind: Option<usize>,
    pub credits: Option<usize>,
}

impl ColumnMap {
    /// First header matching each role wins.
    pub fn detect(keys: &[String]) -> Self {
        let position = |pred: &dyn Fn(&str) -> bool| keys.iter().position(|k| pred(k.as_str()));
        Self {
            code: position(&|k| RE_CODE_HEADER.is_match(k)),
            name: position(&|k| k.contains("MATERIA")),
            kind: position(&|k| k.contains("TIPO")),
            credits: position(&|k| is_credit_label(k)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.name.is_none() && self.kind.is_none() && self.credits.is_none()
    }

    fn cell<'r>(row: &'r [String], index: Option<usize>) -> &'r str {
        index
            .and_then(|i| row.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Read one data row through the mapping.
    pub fn read(&self, row: &[String]) -> Option<CourseEntry> {
        let raw_code = Self::cell(row, self.code);
        let mut raw_name = Self::cell(row, self.name);
        let raw_kind = Self::cell(row, self.kind);
        let raw_credits = Self::cell(row, self.credits);

        let joined = [raw_code, raw_name, raw_kind, raw_credits].join(" ").to_uppercase();
        if raw_code.is_empty() && !RE_CODE_RUN.is_match(&joined) {
            return None;
        }
        if is_header_repeat(&joined) || is_boilerplate(&joined) || raw_name.is_empty() {
            return None;
        }

        let mut code = normalize_code(raw_code);
        if code.is_empty() {
            if let Some(caps) = RE_EMBEDDED_CODE.captures(raw_name) {
                code = normalize_code(&caps[1]);
                raw_name = caps.get(2).map_or("", |m| m.as_str());
            }
        }

        let name = collapse_spaces(raw_name);
        let credits = leading_int(raw_credits).filter(|c| is_small_credit(*c))?;
        if code.is_empty() || name.is_empty() {
            return None;
        }

        Some(CourseEntry {
            code,
            name,
            credits,
            course_type: CourseType::from_tag(raw_kind),
            semester: None,
        })
    }
}

/// Match `<code> <name> <type> <credits>` on a row joined into one line.
pub fn parse_joined_line(line: &str) -> Option<CourseEntry> {
    let code_match = RE_CODE_RUN.captures(line)?.get(1)?;
    let kind = RE_TYPE_TOKEN.find(line)?;
    let credits = RE_INTEGER
        .find_iter(line)
        .last()
        .and_then(|m| leading_int(m.as_str()))
        .filter(|c| is_small_credit(*c))?;

    let code = normalize_code(code_match.as_str());
    let name = collapse_spaces(line.get(code_match.end()..kind.start()).unwrap_or(""));
    if code.is_empty() || name.is_empty() {
        return None;
    }

    Some(CourseEntry {
        code,
        name,
        credits,
        course_type: CourseType::from_tag(kind.as_str()),
        semester: None,
    })
}

/// A frame listing tracks: two or three columns by modal row width, or a
/// code/name/credit header without a type column.
pub fn looks_like_track_frame(frame: &Frame) -> bool {
    if (2..=3).contains(&frame.width()) {
        return true;
    }
    let header = frame.header_keys().join(" ");
    is_header_repeat(&header) && is_credit_label(&header) && !header.contains("TIPO")
}

/// One classified row of a track table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackLine {
    Title(String),
    Member(TrackEntry),
    Skip,
}

impl TrackLine {
    pub fn classify(line: &str) -> Self {
        if line.is_empty() || is_header_repeat(&line.to_uppercase()) {
            return TrackLine::Skip;
        }

        if !RE_CODE_RUN.is_match(line) && is_upper(line) && line.chars().count() <= MAX_TITLE_LEN {
            return TrackLine::Title(line.to_string());
        }

        let Some(caps) = RE_LEADING_CODE.captures(line) else {
            return TrackLine::Skip;
        };
        let code = normalize_code(&caps[1]);
        let mut rest = &line[caps.get(0).map_or(0, |m| m.end())..];

        let mut credits = None;
        if let Some(tail) = RE_TRAILING_INT.captures(rest) {
            credits = leading_int(&tail[1]).filter(|c| *c > 0);
            rest = &rest[..tail.get(0).map_or(rest.len(), |m| m.start())];
        }

        TrackLine::Member(TrackEntry {
            code,
            name: collapse_spaces(rest),
            credits,
        })
    }
}

/// Groups track rows into blocks. State carries over between tables.
#[derive(Debug, Default)]
pub struct TrackSegmenter {
    current: Option<SpecializationBlock>,
    blocks: Vec<SpecializationBlock>,
}

impl TrackSegmenter {
    fn close_current(&mut self) {
        if let Some(block) = self.current.take() {
            if !block.entries.is_empty() {
                self.blocks.push(block);
            }
        }
    }

    pub fn feed(&mut self, line: &str) {
        match TrackLine::classify(line) {
            TrackLine::Title(name) => {
                self.close_current();
                self.current = Some(SpecializationBlock {
                    name,
                    entries: Vec::new(),
                });
            }
            TrackLine::Member(entry) => self
                .current
                .get_or_insert_with(|| SpecializationBlock {
                    name: DEFAULT_TRACK_NAME.to_string(),
                    entries: Vec::new(),
                })
                .entries
                .push(entry),
            TrackLine::Skip => {}
        }
    }

    pub fn finish(mut self) -> Vec<SpecializationBlock> {
        self.close_current();
        self.blocks
    }
}

/// Result of parsing an official-family document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfficialParse {
    pub courses: Vec<CourseEntry>,
    pub tracks: Vec<SpecializationBlock>,
    pub debug_rows: Vec<String>,
}

pub fn parse_official(frames: &[Frame], full_text: &str, want_debug: bool) -> OfficialParse {
    let tracks_mode = full_text.to_uppercase().contains(TRACKS_TITLE);
    let mut segmenter = TrackSegmenter::default();
    let mut courses = Vec::new();
    let mut debug_rows = Vec::new();

    for frame in frames {
        if tracks_mode && looks_like_track_frame(frame) {
            for row in frame.all_rows() {
                segmenter.feed(&join_cells(row));
            }
            continue;
        }

        let columns = ColumnMap::detect(&frame.header_keys());
        if columns.is_empty() {
            for row in frame.all_rows() {
                let line = join_cells(row);
                if want_debug && debug_rows.len() < DEBUG_ROW_LIMIT {
                    debug_rows.push(line.clone());
                }
                if line.is_empty() || is_boilerplate(&line.to_uppercase()) {
                    continue;
                }
                courses.extend(parse_joined_line(&line));
            }
            continue;
        }

        courses.extend(frame.rows.iter().filter_map(|row| columns.read(row)));
    }

    if want_debug {
        let raw_rows = frames
            .iter()
            .flat_map(Frame::all_rows)
            .map(|row| row.join(" | "));
        let room = DEBUG_ROW_LIMIT.saturating_sub(debug_rows.len());
        debug_rows.extend(raw_rows.take(room));
    }

    let courses = dedup_courses(courses);
    let tracks = segmenter.finish();
    debug!(
        "official parser: {} courses, {} track blocks",
        courses.len(),
        tracks.len()
    );

    OfficialParse {
        courses,
        tracks,
        debug_rows,
    }
}

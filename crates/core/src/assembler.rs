//! Reassembly of fragmented course rows from the student-portal export.
//!
//! The portal flattens its course table into loosely ordered text lines and
//! often splits one row over several of them: the name may arrive on lines
//! *before* the code line, or spill onto lines *after* it. [`RowAssembler`]
//! walks the lines once with a cursor and two states:
//!
//! - `Scanning`: no pending name fragments.
//! - `Buffering`: pure-text lines seen since the last emission or noise line.
//!
//! A code line either carries its own name ("inline", which ignores the
//! buffer and never looks ahead) or borrows the buffered fragments plus up to
//! `continuation_budget` following pure-text lines.
//!
//! ```
//! use kardex_core::assembler::RowAssembler;
//!
//! let lines = vec!["DESARROLLO".to_string(), "WEB".to_string(), "04110 OBL 6".to_string()];
//! let courses: Vec<_> = RowAssembler::new(&lines, 2).collect();
//! assert_eq!(courses[0].name, "DESARROLLO WEB");
//! ```

use std::sync::LazyLock;

use regex::{Match, Regex};

use crate::code::normalize_code;
use crate::text::{collapse_spaces, collapse_whitespace, has_letters, is_small_credit, leading_int};
use crate::types::{CourseEntry, CourseType, Frame};

pub const DEFAULT_CONTINUATION_BUDGET: usize = 2;

/// Minimum length of a name found on the code line itself.
const MIN_INLINE_NAME: usize = 4;

static RE_NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)(?:\.0)?\b").unwrap());
static RE_TYPE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:OBL|OPT|ELE|SEL)\b").unwrap());
static RE_PLACEHOLDER_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Unnamed:\s*\d+$").unwrap());

/// Tokens found on one line.
#[derive(Debug, Clone, Copy)]
pub struct LineTokens<'a> {
    /// First numeric token, kept only when it has 2 to 6 digits before an
    /// optional `.0`.
    pub code: Option<Match<'a>>,
    pub kind: Option<Match<'a>>,
    pub letters: bool,
}

impl<'a> LineTokens<'a> {
    pub fn scan(line: &'a str) -> Self {
        let code = RE_NUMBER_TOKEN
            .captures(line)
            .filter(|caps| caps.get(1).is_some_and(|d| (2..=6).contains(&d.len())))
            .and_then(|caps| caps.get(0));
        Self {
            code,
            kind: RE_TYPE_TOKEN.find(line),
            letters: has_letters(line),
        }
    }

    /// Text only: letters, no code, no type tag.
    pub fn is_pure_text(&self) -> bool {
        self.code.is_none() && self.kind.is_none() && self.letters
    }
}

/// A line that may extend a name after its code line: letters, and neither
/// a number of any length nor a type tag.
fn is_continuation(line: &str) -> bool {
    !RE_NUMBER_TOKEN.is_match(line) && !RE_TYPE_TOKEN.is_match(line) && has_letters(line)
}

/// Name text between the code and the type tag (or the end of the line).
fn inline_name(line: &str, code: Match<'_>, kind: Option<Match<'_>>) -> Option<String> {
    let end = kind.map(|k| k.start()).unwrap_or(line.len());
    let name = collapse_whitespace(line.get(code.end()..end).unwrap_or(""));
    (has_letters(&name) && name.chars().count() >= MIN_INLINE_NAME).then_some(name)
}

/// First number after the type tag; without a tag, the first number in the
/// line if it is a plausible credit count.
fn line_credits(line: &str, kind: Option<Match<'_>>) -> Option<u32> {
    kind.and_then(|k| leading_int(&line[k.end()..]))
        .or_else(|| leading_int(line).filter(|v| is_small_credit(*v)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State<'a> {
    Scanning,
    Buffering(Vec<&'a str>),
}

/// Single-pass iterator of [`CourseEntry`] over an immutable line sequence.
#[derive(Debug, Clone)]
pub struct RowAssembler<'a> {
    lines: &'a [String],
    cursor: usize,
    state: State<'a>,
    continuation_budget: usize,
}

impl<'a> RowAssembler<'a> {
    pub fn new(lines: &'a [String], continuation_budget: usize) -> Self {
        Self {
            lines,
            cursor: 0,
            state: State::Scanning,
            continuation_budget,
        }
    }

    /// Name fragments waiting for a code line.
    pub fn pending(&self) -> &[&'a str] {
        match &self.state {
            State::Scanning => &[],
            State::Buffering(parts) => parts.as_slice(),
        }
    }

    fn buffer(&mut self, line: &'a str) {
        match &mut self.state {
            State::Buffering(parts) => parts.push(line),
            State::Scanning => self.state = State::Buffering(vec![line]),
        }
    }

    /// Consume up to `continuation_budget` continuation lines after the
    /// cursor.
    fn take_continuation(&mut self) -> Vec<&'a str> {
        let lines = self.lines;
        let mut taken = Vec::new();
        while taken.len() < self.continuation_budget {
            match lines.get(self.cursor) {
                Some(next) if is_continuation(next) => {
                    taken.push(next.as_str());
                    self.cursor += 1;
                }
                _ => break,
            }
        }
        taken
    }

    fn assemble(&mut self, line: &'a str, tokens: LineTokens<'a>, token: Match<'a>) -> Option<CourseEntry> {
        let code = normalize_code(token.as_str());
        let credits = line_credits(line, tokens.kind);
        let course_type = tokens
            .kind
            .map(|k| CourseType::from_tag(k.as_str()))
            .unwrap_or_default();

        let (name, buffered) = match inline_name(line, token, tokens.kind) {
            Some(name) => (name, false),
            None => {
                let mut parts = self.pending().to_vec();
                parts.extend(self.take_continuation());
                (collapse_whitespace(&parts.join(" ")), true)
            }
        };

        let credits = credits.filter(|c| is_small_credit(*c))?;
        if code.is_empty() || name.is_empty() {
            return None;
        }

        if buffered {
            self.state = State::Scanning;
        }

        Some(CourseEntry {
            code,
            name,
            credits,
            course_type,
            semester: None,
        })
    }
}

impl Iterator for RowAssembler<'_> {
    type Item = CourseEntry;

    fn next(&mut self) -> Option<CourseEntry> {
        let lines = self.lines;
        while let Some(line) = lines.get(self.cursor) {
            self.cursor += 1;
            let tokens = LineTokens::scan(line);

            match tokens.code {
                Some(code) => {
                    if let Some(entry) = self.assemble(line, tokens, code) {
                        return Some(entry);
                    }
                }
                None if tokens.is_pure_text() => self.buffer(line),
                None if !tokens.letters => self.state = State::Scanning,
                // A type tag with text but no code is ignored.
                None => {}
            }
        }
        None
    }
}

/// Flatten the data rows of every frame into single-spaced text lines.
pub fn flatten_frames(frames: &[Frame]) -> Vec<String> {
    frames
        .iter()
        .flat_map(|frame| frame.rows.iter())
        .filter_map(|row| {
            let cells: Vec<&str> = row
                .iter()
                .map(String::as_str)
                .filter(|c| !c.is_empty() && !RE_PLACEHOLDER_CELL.is_match(c))
                .collect();
            let line = collapse_spaces(&cells.join(" "));
            (!line.is_empty()).then_some(line)
        })
        .collect()
}

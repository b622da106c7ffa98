//! Positioned text: content-stream operators to spans, spans to visual lines,
//! lines to vertical blocks.
//!
//! ```text
//! content ops  ->  TextSpan[]  ->  TextLine[]  ->  blocks (Vec<TextLine>[])
//!   (per page)      extract         group_spans      group_lines
//! ```
//!
//! A [`TextLine`] keeps runs that are separated by a wide horizontal gap as
//! distinct spans, so its spans double as table cells.

use std::collections::HashMap;

use log::debug;

use super::backend::{
    decode_text_simple, get_number_from_value, BackendFontInfo, PageId, PdfBackend, PdfValue,
};
use crate::PdfError;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A single run of text at a specific position on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub font_size: f32,
}

impl TextSpan {
    fn end(&self) -> f32 {
        self.x + self.width
    }
}

/// Spans sharing (approximately) the same baseline, left to right.
#[derive(Debug, Clone, Default)]
pub struct TextLine {
    pub spans: Vec<TextSpan>,
    pub y: f32,
    pub font_size: f32,
}

impl TextLine {
    /// Span texts joined by a single space.
    pub fn text(&self) -> String {
        self.cells().join(" ")
    }

    /// Trimmed text of every horizontally separated run.
    pub fn cells(&self) -> Vec<String> {
        self.spans
            .iter()
            .map(|s| s.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Two spans whose Y coordinates differ by less than this share a line.
const Y_TOLERANCE: f32 = 1.0;

/// Approximate glyph width as a fraction of font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Minimum gap (in points) between adjacent spans before a space is inserted.
const MIN_WORD_GAP: f32 = 1.5;

/// Gaps wider than this multiple of the font size separate cells.
const CELL_GAP_FACTOR: f32 = 2.0;

/// A vertical gap larger than this multiple of the font size starts a new
/// block. Table rows on the generated documents sit about 1.5 font sizes
/// apart.
const BLOCK_GAP_FACTOR: f32 = 2.5;

const FONT_SIZE_TOLERANCE: f32 = 0.5;

// ---------------------------------------------------------------------------
// Internal: PDF text-state machine
// ---------------------------------------------------------------------------

/// Mutable state tracked while walking a page's content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Current font resource name (the `/F1`-style key).
    font_key: Vec<u8>,
    font_size: f32,
    /// Elements [a, b, c, d, tx, ty] of the current text matrix.
    text_matrix: [f32; 6],
    /// Text line matrix, set by BT and updated by Td/TD/T*/Tm.
    line_matrix: [f32; 6],
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5] + self.text_rise
    }

    /// Horizontal scale of the text matrix, text space to user space.
    fn matrix_scale_x(&self) -> f32 {
        (self.text_matrix[0].powi(2) + self.text_matrix[1].powi(2)).sqrt()
    }

    /// `font_size * sqrt(b^2 + d^2)` of the text matrix.
    fn effective_font_size(&self) -> f32 {
        let scale = (self.text_matrix[1].powi(2) + self.text_matrix[3].powi(2)).sqrt();
        (self.font_size * scale).abs()
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Td / TD / T*: translate the line matrix and reset the text matrix to it.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn glyph_width(&self) -> f32 {
        self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale
    }

    fn estimate_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.glyph_width()
    }

    /// Move past `text` as if it had been painted.
    fn advance_after_show(&mut self, text: &str) {
        let dx: f32 = text
            .chars()
            .map(|ch| {
                let spacing = if ch == ' ' { self.word_spacing } else { 0.0 };
                self.glyph_width() + self.char_spacing + spacing
            })
            .sum();
        self.advance_x(dx);
    }

    fn span(&self, text: String, x: f32, y: f32) -> TextSpan {
        TextSpan {
            width: self.estimate_width(&text) * self.matrix_scale_x(),
            text,
            x,
            y,
            font_size: self.effective_font_size(),
        }
    }
}

/// Per-page context for decoding string operands.
struct ShowContext<'a> {
    backend: &'a dyn PdfBackend,
    page: PageId,
}

impl ShowContext<'_> {
    fn decode(&self, val: &PdfValue, font_key: &[u8]) -> String {
        let PdfValue::Str(bytes) = val else {
            return String::new();
        };
        let decoded = self.backend.decode_text(self.page, font_key, bytes);
        if decoded.is_empty() {
            decode_text_simple(bytes)
        } else {
            decoded
        }
    }
}

fn number(operands: &[PdfValue], index: usize) -> Option<f32> {
    operands.get(index).and_then(get_number_from_value)
}

// ---------------------------------------------------------------------------
// Public API: span extraction
// ---------------------------------------------------------------------------

/// Walk one page's content stream and produce its [`TextSpan`]s.
///
/// Handles the text-object operators (`BT`, `Tf`, `Tm`, `Td`, `TD`, `T*`,
/// `TL`, `Tc`, `Tw`, `Tz`, `Ts`) and the show operators (`Tj`, `TJ`, `'`,
/// `"`). Everything else is ignored.
pub fn extract_page_spans(
    backend: &dyn PdfBackend,
    page_id: PageId,
) -> Result<Vec<TextSpan>, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let fonts = backend.page_fonts(page_id).unwrap_or_default();
    let ctx = ShowContext {
        backend,
        page: page_id,
    };

    let mut state = TextState::default();
    let mut spans: Vec<TextSpan> = Vec::new();

    for op in &ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "Tf" => handle_tf(operands, &fonts, &mut state),
            "Tm" => handle_tm(operands, &mut state),
            "Td" => {
                if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => {
                if let Some(v) = number(operands, 0) {
                    state.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = number(operands, 0) {
                    state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = number(operands, 0) {
                    state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = number(operands, 0) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = number(operands, 0) {
                    state.text_rise = v;
                }
            }
            "Tj" => {
                if let Some(first) = operands.first() {
                    emit_show_string(first, &ctx, &mut state, &mut spans);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = operands.first() {
                    handle_tj_array(arr, &ctx, &mut state, &mut spans);
                }
            }
            "'" => {
                state.next_line();
                if let Some(first) = operands.first() {
                    emit_show_string(first, &ctx, &mut state, &mut spans);
                }
            }
            "\"" => {
                if let (Some(aw), Some(ac), Some(text)) =
                    (number(operands, 0), number(operands, 1), operands.get(2))
                {
                    state.word_spacing = aw;
                    state.char_spacing = ac;
                    state.next_line();
                    emit_show_string(text, &ctx, &mut state, &mut spans);
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn handle_tf(operands: &[PdfValue], fonts: &[BackendFontInfo], state: &mut TextState) {
    let key = match operands.first() {
        Some(PdfValue::Name(n)) | Some(PdfValue::Str(n)) => n.clone(),
        _ => return,
    };
    if !fonts.is_empty() && !fonts.iter().any(|info| info.name == key) {
        debug!("font {} not in page resources", String::from_utf8_lossy(&key));
    }
    state.font_key = key;
    state.font_size = number(operands, 1).unwrap_or(0.0);
}

fn handle_tm(operands: &[PdfValue], state: &mut TextState) {
    let vals: Vec<f32> = operands
        .iter()
        .take(6)
        .filter_map(get_number_from_value)
        .collect();
    if let Ok(matrix) = <[f32; 6]>::try_from(vals) {
        state.text_matrix = matrix;
        state.line_matrix = matrix;
    }
}

/// Shared by `Tj`, `'` and `"`.
fn emit_show_string(
    operand: &PdfValue,
    ctx: &ShowContext<'_>,
    state: &mut TextState,
    spans: &mut Vec<TextSpan>,
) {
    let text = ctx.decode(operand, &state.font_key);
    if text.is_empty() {
        return;
    }
    spans.push(state.span(text.clone(), state.x(), state.y()));
    state.advance_after_show(&text);
}

/// A `TJ` array mixes strings with kerning adjustments in thousandths of a
/// text-space unit. A large negative adjustment reads as a word space.
fn handle_tj_array(
    arr: &[PdfValue],
    ctx: &ShowContext<'_>,
    state: &mut TextState,
    spans: &mut Vec<TextSpan>,
) {
    let mut buf = String::new();
    let mut span_x = state.x();
    let span_y = state.y();

    for elem in arr {
        if let PdfValue::Str(_) = elem {
            let fragment = ctx.decode(elem, &state.font_key);
            if buf.is_empty() {
                span_x = state.x();
            }
            buf.push_str(&fragment);
            state.advance_after_show(&fragment);
        } else if let Some(adj) = get_number_from_value(elem) {
            let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
            if dx > state.glyph_width() * 0.3 && !buf.is_empty() && !buf.ends_with(' ') {
                buf.push(' ');
            }
            state.advance_x(dx);
        }
    }

    let text = buf.trim_end();
    if !text.is_empty() {
        spans.push(state.span(text.to_string(), span_x, span_y));
    }
}

// ---------------------------------------------------------------------------
// Public API: span -> line grouping
// ---------------------------------------------------------------------------

/// Group spans into lines, top of the page first.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        let same_line = current
            .first()
            .is_some_and(|first| (span.y - first.y).abs() <= Y_TOLERANCE);
        if !same_line && !current.is_empty() {
            lines.push(assemble_line(std::mem::take(&mut current)));
        }
        current.push(span);
    }

    if !current.is_empty() {
        lines.push(assemble_line(current));
    }

    lines
}

/// Merge spans of one baseline into runs. Touching spans are concatenated,
/// a word-sized gap becomes a space, and a wider gap starts a new run.
fn assemble_line(mut spans: Vec<TextSpan>) -> TextLine {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

    let mut merged: Vec<TextSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        if let Some(prev) = merged.last_mut() {
            let gap = span.x - prev.end();
            let same_size = (prev.font_size - span.font_size).abs() < FONT_SIZE_TOLERANCE;

            if same_size && gap < prev.font_size * CELL_GAP_FACTOR && gap > -prev.font_size {
                if gap >= MIN_WORD_GAP && !prev.text.ends_with(' ') {
                    prev.text.push(' ');
                }
                prev.text.push_str(&span.text);
                prev.width = span.end() - prev.x;
                continue;
            }
        }
        merged.push(span);
    }

    TextLine {
        y: merged.first().map(|s| s.y).unwrap_or(0.0),
        font_size: dominant_font_size(&merged),
        spans: merged,
    }
}

/// The font size covering the most characters.
fn dominant_font_size(spans: &[TextSpan]) -> f32 {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for s in spans {
        let key = (s.font_size * 100.0).round() as i32;
        *counts.entry(key).or_insert(0) += s.text.chars().count();
    }
    counts
        .into_iter()
        .max_by_key(|(_, c)| *c)
        .map(|(k, _)| k as f32 / 100.0)
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Public API: line -> block grouping
// ---------------------------------------------------------------------------

/// Split lines into vertical blocks wherever the gap to the previous line
/// exceeds [`BLOCK_GAP_FACTOR`] times its font size.
pub fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<Vec<TextLine>> {
    let mut blocks: Vec<Vec<TextLine>> = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        let gap_break = current
            .last()
            .is_some_and(|prev| (prev.y - line.y).abs() > prev.font_size.max(1.0) * BLOCK_GAP_FACTOR);
        if gap_break {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

// ---------------------------------------------------------------------------
// Public API: whole document
// ---------------------------------------------------------------------------

/// Visual lines of every page, in page order.
pub fn extract_page_lines(backend: &dyn PdfBackend) -> Result<Vec<Vec<TextLine>>, PdfError> {
    let page_map = backend.pages();
    let mut pages = Vec::with_capacity(page_map.len());

    for (&page_num, &page_id) in &page_map {
        let spans = extract_page_spans(backend, page_id)?;
        debug!("page {page_num}: {} spans", spans.len());
        pages.push(group_spans_into_lines(spans));
    }

    Ok(pages)
}

/// Lines of one page joined by newlines.
pub fn page_text(lines: &[TextLine]) -> String {
    lines
        .iter()
        .map(TextLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

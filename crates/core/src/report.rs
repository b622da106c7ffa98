//! Pipeline assembly: one [`Document`] in, one serializable report out.

use log::{debug, info};
use serde::Serialize;

use crate::assembler::{flatten_frames, RowAssembler, DEFAULT_CONTINUATION_BUDGET};
use crate::dedup::dedup_courses;
use crate::header::extract_header;
use crate::plan_info::extract_plan_info;
use crate::sanitize::sanitize_courses;
use crate::subjects::extract_subject_rows;
use crate::summary::extract_summary;
use crate::table::{parse_official, DEBUG_ROW_LIMIT};
use crate::types::{
    CourseEntry, Document, HeaderRecord, OriginVariant, PlanInfo, SpecializationBlock, SubjectRow,
    SummaryStats,
};

/// Knobs for study-plan parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Lines that may be folded into a name after its code line.
    pub continuation_budget: usize,
    /// Include the `debug` section in the report.
    pub debug: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            continuation_budget: DEFAULT_CONTINUATION_BUDGET,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDebug {
    pub extractor: String,
    pub frames_detected: usize,
    pub row_text_examples: Vec<String>,
}

/// Study-plan output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub ok: bool,
    pub plan: PlanInfo,
    pub materias: Vec<CourseEntry>,
    pub origen: OriginVariant,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub acentuaciones: Vec<SpecializationBlock>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<PlanDebug>,
}

/// Transcript output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptReport {
    pub ok: bool,
    pub alumno: HeaderRecord,
    pub materias: Vec<SubjectRow>,
    pub resumen: SummaryStats,
}

/// Parse a study plan. `extractor` names the table strategy that produced
/// `doc.tables` and is echoed in warnings and debug output.
pub fn parse_plan(doc: &Document, extractor: &str, options: &PlanOptions) -> PlanReport {
    let origin = doc.origin();
    let frames = doc.frames();

    let (courses, tracks, debug_rows) = match origin {
        OriginVariant::Official => {
            let parsed = parse_official(&frames, &doc.text, options.debug);
            (parsed.courses, parsed.tracks, parsed.debug_rows)
        }
        OriginVariant::Student | OriginVariant::Unknown => {
            let lines = flatten_frames(&frames);
            debug!("row assembler over {} lines", lines.len());
            let courses = dedup_courses(RowAssembler::new(&lines, options.continuation_budget));
            let samples = if options.debug {
                lines.into_iter().take(DEBUG_ROW_LIMIT).collect()
            } else {
                Vec::new()
            };
            (courses, Vec::new(), samples)
        }
    };

    let courses = sanitize_courses(courses);
    let warnings = if courses.is_empty() {
        vec![format!("no subjects detected with {extractor}")]
    } else {
        Vec::new()
    };
    info!(
        "plan parsed: origin={origin} courses={} tracks={}",
        courses.len(),
        tracks.len()
    );

    PlanReport {
        ok: !courses.is_empty(),
        plan: extract_plan_info(&doc.text),
        materias: courses,
        origen: origin,
        acentuaciones: tracks,
        warnings,
        debug: options.debug.then(|| PlanDebug {
            extractor: extractor.to_string(),
            frames_detected: doc.tables.len(),
            row_text_examples: debug_rows,
        }),
    }
}

/// Parse a transcript: header fields, subject rows, summary statistics.
pub fn parse_transcript(doc: &Document) -> TranscriptReport {
    let report = TranscriptReport {
        ok: true,
        alumno: extract_header(&doc.text),
        materias: extract_subject_rows(&doc.tables),
        resumen: extract_summary(&doc.text),
    };
    info!("transcript parsed: {} subject rows", report.materias.len());
    report
}

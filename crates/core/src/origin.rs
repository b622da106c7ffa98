//! Decide which generator family produced a document.
//!
//! Two independent scores are accumulated over the upper-cased text. The
//! official registrar export carries department boilerplate, page markers,
//! the specialization section and hour columns; the student-portal export
//! carries an "approved credits: N of M" phrase.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::types::OriginVariant;

/// Title of the specialization-track section in the official export.
pub const TRACKS_TITLE: &str = "MATERIAS QUE CONFORMAN LAS ACENTUACIONES";

static RE_DEPARTMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DIRECCI[OÓ]N DE SERVICIOS ESCOLARES").unwrap());
static RE_PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"HOJA\s*:\s*\d+\s*DE\s*\d+").unwrap());
static RE_HOUR_COLUMNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bHORAS\s+(?:TEO|LAB)\.").unwrap());
static RE_AXIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bEJE\b").unwrap());
static RE_REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bREQ\.").unwrap());
static RE_APPROVED_CREDITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CR[EÉ]DITOS\s+APROBADOS:\s*\d+\s*DE\s*\d+").unwrap());
static RE_PROGRAM_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"INGENIER[IÍ]A EN SISTEMAS DE INFORMACI[OÓ]N").unwrap()
});

/// Raw evidence for each family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OriginScores {
    pub official: u32,
    pub student: u32,
}

impl OriginScores {
    pub fn variant(&self) -> OriginVariant {
        if self.official >= 2 && self.official >= self.student {
            OriginVariant::Official
        } else if self.student >= 2 && self.student > self.official {
            OriginVariant::Student
        } else {
            OriginVariant::Unknown
        }
    }
}

pub fn score(text: &str) -> OriginScores {
    let upper = text.to_uppercase();
    let mut scores = OriginScores::default();

    let official_signals = [
        RE_DEPARTMENT.is_match(&upper),
        RE_PAGE_MARKER.is_match(&upper),
        upper.contains(TRACKS_TITLE),
        RE_HOUR_COLUMNS.is_match(&upper),
        RE_AXIS.is_match(&upper) && RE_REQUIREMENT.is_match(&upper),
    ];
    scores.official = official_signals.iter().filter(|hit| **hit).count() as u32;

    // The approved-credits phrase is a strong signal.
    if RE_APPROVED_CREDITS.is_match(&upper) {
        scores.student += 2;
    }
    if upper.contains("PLAN") && RE_PROGRAM_NAME.is_match(&upper) {
        scores.student += 1;
    }

    scores
}

/// Classify `text` as [`OriginVariant::Official`], [`OriginVariant::Student`]
/// or [`OriginVariant::Unknown`].
pub fn classify(text: &str) -> OriginVariant {
    let scores = score(text);
    let variant = scores.variant();
    debug!(
        "origin scores official={} student={} -> {}",
        scores.official, scores.student, variant
    );
    variant
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_official_signals() {
        let text = "Dirección de Servicios Escolares\nHoja : 1 de 5\nClave Materia Eje Req.";
        assert_eq!(classify(text), OriginVariant::Official);
        assert_eq!(score(text).official, 3);
    }

    #[test]
    fn test_student_strong_signal() {
        let text = "CRÉDITOS APROBADOS: 30 DE 180";
        assert_eq!(classify(text), OriginVariant::Student);
        assert_eq!(score(text).student, 2);
    }

    #[test]
    fn test_student_unaccented_phrase() {
        assert_eq!(
            classify("Creditos aprobados: 112 de 393"),
            OriginVariant::Student
        );
    }

    #[test]
    fn test_weak_signals_are_unknown() {
        assert_eq!(classify("Plan de estudios"), OriginVariant::Unknown);
        assert_eq!(classify(""), OriginVariant::Unknown);
        // A single official hit is not enough.
        assert_eq!(classify("Hoja : 2 de 3"), OriginVariant::Unknown);
    }

    #[test]
    fn test_tie_goes_to_official() {
        let text = "Hoja : 1 de 3\nHoras Teo. Horas Lab.\nCréditos aprobados: 10 de 100";
        let scores = score(text);
        assert_eq!(scores.official, 2);
        assert_eq!(scores.student, 2);
        assert_eq!(scores.variant(), OriginVariant::Official);
    }

    #[test]
    fn test_program_name_adds_one() {
        let text = "PLAN 2182 INGENIERÍA EN SISTEMAS DE INFORMACIÓN\nCréditos Aprobados: 1 de 2";
        assert_eq!(score(text).student, 3);
        assert_eq!(classify(text), OriginVariant::Student);
    }

    #[test]
    fn test_tracks_title_counts() {
        let text = format!("{TRACKS_TITLE}\nHOJA : 3 DE 3");
        assert_eq!(classify(&text), OriginVariant::Official);
    }
}

//! Cleanup of course names picked up from the main curriculum list.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::CourseEntry;

static RE_SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static RE_HYPHEN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-\s+(\w)").unwrap());
static RE_EXTERNAL_EVALUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)DESEMPEÑO EN EVALUACIÓN EXTERNA").unwrap());
static RE_HEADER_RESIDUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bClave\s+Materia\s+Creditos\b.*$").unwrap());
static RE_LEADING_ARTICLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:DE|LA|EL)\s+").unwrap());

/// Collapse "DESEMPEÑO EN EVALUACIÓN EXTERNA (...)" printed twice in a row.
fn collapse_repeated_evaluation(name: &str) -> String {
    let Some(start) = RE_EXTERNAL_EVALUATION.find(name).map(|m| m.start()) else {
        return name.to_string();
    };

    for (offset, _) in name[start..].match_indices(')') {
        let end = start + offset + 1;
        let phrase = &name[start..end];
        let rest = &name[end..];
        let after = rest.trim_start();
        if after.len() == rest.len() {
            continue;
        }
        let repeated = after
            .get(..phrase.len())
            .is_some_and(|candidate| candidate.to_lowercase() == phrase.to_lowercase());
        if repeated {
            return format!("{}{}", &name[..end], &after[phrase.len()..]);
        }
    }

    name.to_string()
}

/// Drop one stray leading article when a word follows it.
fn strip_leading_article(name: &str) -> &str {
    match RE_LEADING_ARTICLE.find(name) {
        Some(m) if name[m.end()..].starts_with(char::is_alphabetic) => &name[m.end()..],
        _ => name,
    }
}

pub fn sanitize_name(raw: &str) -> String {
    let name = RE_SPACE_RUN.replace_all(raw, " ");
    let name = RE_HYPHEN_SPLIT.replace_all(&name, "${1}-${2}");
    let name = collapse_repeated_evaluation(&name);
    let name = RE_HEADER_RESIDUE.replace(&name, "");
    let name = name.trim_matches(&[' ', '-'][..]);
    strip_leading_article(name).trim().to_string()
}

/// Sanitize every name; entries left without a name are dropped.
pub fn sanitize_courses(courses: Vec<CourseEntry>) -> Vec<CourseEntry> {
    courses
        .into_iter()
        .filter_map(|mut course| {
            course.name = sanitize_name(&course.name);
            (!course.name.is_empty()).then_some(course)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_spaces() {
        assert_eq!(sanitize_name("BASES   DE  DATOS"), "BASES DE DATOS");
    }

    #[test]
    fn test_joins_hyphen_splits() {
        assert_eq!(sanitize_name("CENEVAL- EGEL"), "CENEVAL-EGEL");
    }

    #[test]
    fn test_collapses_repeated_evaluation_phrase() {
        let raw = "DESEMPEÑO EN EVALUACIÓN EXTERNA (EGEL) DESEMPEÑO EN EVALUACIÓN EXTERNA (EGEL)";
        assert_eq!(sanitize_name(raw), "DESEMPEÑO EN EVALUACIÓN EXTERNA (EGEL)");
    }

    #[test]
    fn test_distinct_evaluation_phrases_are_kept() {
        let raw = "DESEMPEÑO EN EVALUACIÓN EXTERNA (A) DESEMPEÑO EN EVALUACIÓN EXTERNA (B)";
        assert_eq!(sanitize_name(raw), raw);
    }

    #[test]
    fn test_strips_header_residue() {
        assert_eq!(
            sanitize_name("REDES DE COMPUTADORAS - Clave Materia Creditos Tipo"),
            "REDES DE COMPUTADORAS"
        );
    }

    #[test]
    fn test_strips_leading_article() {
        assert_eq!(sanitize_name("LA ADMINISTRACION"), "ADMINISTRACION");
        assert_eq!(sanitize_name("de Sistemas"), "Sistemas");
        assert_eq!(sanitize_name("DESARROLLO WEB"), "DESARROLLO WEB");
        assert_eq!(sanitize_name("EL 2"), "EL 2");
    }

    #[test]
    fn test_sanitize_courses_rewrites_names() {
        let courses = sanitize_courses(vec![CourseEntry {
            code: "04110".into(),
            name: "EL  ALGEBRA".into(),
            credits: 6,
            course_type: Default::default(),
            semester: None,
        }]);
        assert_eq!(courses[0].name, "ALGEBRA");
    }

    #[test]
    fn test_sanitize_courses_drops_residue_only_names() {
        let entry = |code: &str, name: &str| CourseEntry {
            code: code.into(),
            name: name.into(),
            credits: 6,
            course_type: Default::default(),
            semester: None,
        };
        let courses = sanitize_courses(vec![
            entry("04110", "Clave Materia Creditos Tipo"),
            entry("04111", "REDES"),
        ]);
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].code, "04111");
    }
}

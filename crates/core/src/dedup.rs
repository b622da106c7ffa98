use std::collections::{HashMap, HashSet};

use crate::types::{CourseEntry, CourseType, SubjectRow};

/// Merge courses sharing a code, keeping first-seen order.
///
/// On collision a mandatory entry replaces an elective one; any other
/// collision keeps the entry already stored.
pub fn dedup_courses(entries: impl IntoIterator<Item = CourseEntry>) -> Vec<CourseEntry> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<CourseEntry> = Vec::new();

    for entry in entries {
        match slots.get(&entry.code) {
            Some(&slot) => {
                let current = &mut unique[slot];
                if current.course_type == CourseType::Opt && entry.course_type == CourseType::Obl {
                    *current = entry;
                }
            }
            None => {
                slots.insert(entry.code.clone(), unique.len());
                unique.push(entry);
            }
        }
    }

    unique
}

/// Drop transcript rows repeating `(credit_hours_tag, course_code,
/// course_name, cycle)`; the first occurrence wins.
pub fn dedup_subjects(rows: impl IntoIterator<Item = SubjectRow>) -> Vec<SubjectRow> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| {
            seen.insert((
                row.credit_hours_tag.clone(),
                row.course_code.clone(),
                row.course_name.clone(),
                row.cycle.clone(),
            ))
        })
        .collect()
}

//! Transcript summary statistics: per-period averages, the aggregate
//! average, and the credit and subject tallies.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::{nfc, parse_decimal, Folded};
use crate::types::{SummaryStats, Tally};

/// Chars inspected after an anchor word.
pub const BLOCK_RADIUS: usize = 800;

static RE_PERIOD_AVERAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d)\s+\*?(\d{1,3}[.,]\d{1,2})").unwrap());
static RE_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}[.,]\d{1,2})").unwrap());

static RE_APR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)APR\D+(\d+)").unwrap());
static RE_REP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)REP\D+(\d+)").unwrap());
static RE_NMR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)NMR\D+(\d+)").unwrap());
static RE_INS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)INS\D+(\d+)").unwrap());

fn block_after<'a>(folded: &Folded<'a>, anchor: &str) -> Option<&'a str> {
    let start = folded.find(anchor)?;
    Some(folded.original_window(start, BLOCK_RADIUS))
}

fn first_decimal(block: &str) -> Option<f64> {
    RE_DECIMAL
        .captures(block)
        .and_then(|caps| parse_decimal(&caps[1]))
}

fn tally(block: &str, labels: &[(Tally, &Regex)]) -> Vec<(Tally, u32)> {
    labels
        .iter()
        .filter_map(|(key, re)| {
            let caps = re.captures(block)?;
            let value = caps[1].parse::<u32>().ok()?;
            Some((*key, value))
        })
        .collect()
}

pub fn extract_summary(raw_text: &str) -> SummaryStats {
    let text = nfc(raw_text);
    let folded = Folded::new(&text);
    let mut stats = SummaryStats::default();

    for caps in RE_PERIOD_AVERAGE.captures_iter(&text) {
        if let Some(value) = parse_decimal(&caps[2]) {
            stats.per_period_averages.insert(caps[1].to_string(), value);
        }
    }

    stats.aggregate_average = block_after(&folded, "PROMEDIO")
        .and_then(first_decimal)
        .or_else(|| block_after(&folded, "KARDEX").and_then(first_decimal));

    if let Some(block) = block_after(&folded, "CRÉDITOS") {
        let labels = [(Tally::Apr, &*RE_APR), (Tally::Rep, &*RE_REP), (Tally::Ins, &*RE_INS)];
        stats.credit_counts.extend(tally(block, &labels));
    }

    if let Some(block) = block_after(&folded, "MATERIAS") {
        let labels = [
            (Tally::Apr, &*RE_APR),
            (Tally::Rep, &*RE_REP),
            (Tally::Nmr, &*RE_NMR),
            (Tally::Ins, &*RE_INS),
        ];
        stats.subject_counts.extend(tally(block, &labels));
    }

    stats
}

//! Table grids from visual lines.
//!
//! Two strategies share the [`Grid`] output shape (first row is the header
//! row):
//!
//! - [`column_grids`]: per vertical block, find X positions where many rows
//!   start a run and slot every run into the nearest column.
//! - [`line_grids`]: per page, every line is a ragged row of its runs.

use std::collections::{BTreeMap, HashSet};

use log::debug;

use super::layout::{group_lines_into_blocks, TextLine};

/// Rows of cell strings.
pub type Grid = Vec<Vec<String>>;

/// A block accepted as a table: its column anchors and its rows.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Sorted X positions that mark the left edge of each column.
    pub columns: Vec<f32>,
    pub rows: Vec<TextLine>,
}

/// Tuning knobs for the column-alignment heuristic.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    pub min_rows: usize,
    pub min_columns: usize,
    /// Upper bound guarding against noise.
    pub max_columns: usize,
    /// Fraction of rows that must start a run near a position for it to be
    /// accepted as a column.
    pub min_alignment_ratio: f32,
    /// Minimum horizontal distance (points) between two columns.
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 20,
            min_alignment_ratio: 0.5,
            min_column_gap: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Column detection
// ---------------------------------------------------------------------------

/// Column anchors of a set of rows.
///
/// Run start positions are bucketed to the nearest point and each row votes
/// once per bucket. Buckets reaching `min_alignment_ratio` of the rows (and
/// at least two rows) survive. A survivor closer than `min_column_gap` to
/// the previous one is dropped.
pub fn detect_columns(rows: &[TextLine], config: &TableDetectorConfig) -> Vec<f32> {
    if rows.is_empty() {
        return Vec::new();
    }

    let mut x_freq: BTreeMap<i32, (f32, usize)> = BTreeMap::new();
    for row in rows {
        let mut seen_buckets: HashSet<i32> = HashSet::new();
        for span in &row.spans {
            let bucket = span.x.round() as i32;
            if seen_buckets.insert(bucket) {
                let entry = x_freq.entry(bucket).or_insert((0.0, 0));
                entry.0 += span.x;
                entry.1 += 1;
            }
        }
    }

    let min_count = ((rows.len() as f32 * config.min_alignment_ratio).ceil() as usize).max(2);
    let candidates = x_freq
        .values()
        .filter(|(_, count)| *count >= min_count)
        .map(|(sum, count)| sum / *count as f32);

    let mut columns: Vec<f32> = Vec::new();
    for x in candidates {
        if columns
            .last()
            .is_some_and(|&last| (x - last).abs() < config.min_column_gap)
        {
            continue;
        }
        columns.push(x);
    }

    columns
}

/// Accept `rows` as a table when enough columns are found and enough rows
/// align with at least half of them.
pub fn detect_table(rows: &[TextLine], config: &TableDetectorConfig) -> Option<DetectedTable> {
    if rows.len() < config.min_rows {
        return None;
    }

    let columns = detect_columns(rows, config);
    if columns.len() < config.min_columns || columns.len() > config.max_columns {
        return None;
    }

    let aligned_rows = rows
        .iter()
        .filter(|row| {
            let aligned_cols = columns
                .iter()
                .filter(|&&col_x| {
                    row.spans
                        .iter()
                        .any(|s| (s.x - col_x).abs() < config.min_column_gap)
                })
                .count();
            aligned_cols >= columns.len().div_ceil(2)
        })
        .count();

    let ratio = aligned_rows as f32 / rows.len() as f32;
    if ratio < config.min_alignment_ratio {
        return None;
    }

    Some(DetectedTable {
        columns,
        rows: rows.to_vec(),
    })
}

/// Lay the table out as a rectangular grid. Runs landing in the same column
/// are joined with a space.
pub fn table_to_grid(table: &DetectedTable) -> Grid {
    let num_cols = table.columns.len();
    if num_cols == 0 {
        return Vec::new();
    }

    table
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = vec![String::new(); num_cols];
            for span in &row.spans {
                let text = span.text.trim();
                if text.is_empty() {
                    continue;
                }
                let cell = &mut cells[assign_column(span.x, &table.columns)];
                if !cell.is_empty() {
                    cell.push(' ');
                }
                cell.push_str(text);
            }
            cells
        })
        .collect()
}

/// Index of the column anchor closest to `x`.
fn assign_column(x: f32, columns: &[f32]) -> usize {
    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (x - **a)
                .abs()
                .partial_cmp(&(x - **b).abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Column-aligned grids, one per qualifying block of each page.
pub fn column_grids(pages: &[Vec<TextLine>], config: &TableDetectorConfig) -> Vec<Grid> {
    let mut grids = Vec::new();
    for (index, lines) in pages.iter().enumerate() {
        for block in group_lines_into_blocks(lines.clone()) {
            if let Some(table) = detect_table(&block, config) {
                debug!(
                    "page {}: table with {} columns x {} rows",
                    index + 1,
                    table.columns.len(),
                    table.rows.len()
                );
                grids.push(table_to_grid(&table));
            }
        }
    }
    grids
}

/// One ragged grid per non-empty page.
pub fn line_grids(pages: &[Vec<TextLine>]) -> Vec<Grid> {
    pages
        .iter()
        .map(|lines| {
            lines
                .iter()
                .map(TextLine::cells)
                .filter(|cells| !cells.is_empty())
                .collect::<Grid>()
        })
        .filter(|grid| !grid.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::layout::TextSpan;

    fn line(y: f32, runs: &[(&str, f32)]) -> TextLine {
        TextLine {
            spans: runs
                .iter()
                .map(|(text, x)| TextSpan {
                    text: text.to_string(),
                    x: *x,
                    y,
                    width: text.chars().count() as f32 * 5.0,
                    font_size: 10.0,
                })
                .collect(),
            y,
            font_size: 10.0,
        }
    }

    fn plan_rows() -> Vec<TextLine> {
        vec![
            line(700.0, &[("CLAVE", 50.0), ("MATERIA", 120.0), ("TIPO", 400.0), ("CRÉDITOS", 450.0)]),
            line(685.0, &[("04110", 50.0), ("PROGRAMACION", 120.0), ("OBL", 400.0), ("6", 450.0)]),
            line(670.0, &[("04111", 50.4), ("BASES DE DATOS", 120.0), ("OPT", 400.0), ("5", 450.0)]),
        ]
    }

    // -- detect_columns -----------------------------------------------------

    #[test]
    fn test_detect_columns_from_aligned_rows() {
        let columns = detect_columns(&plan_rows(), &TableDetectorConfig::default());
        assert_eq!(columns.len(), 4);
        assert!((columns[0] - 50.13).abs() < 0.1);
        assert_eq!(columns[1], 120.0);
    }

    #[test]
    fn test_detect_columns_ignores_stray_positions() {
        let mut rows = plan_rows();
        rows.push(line(655.0, &[("04112", 50.0), ("ETICA", 133.0)]));
        let columns = detect_columns(&rows, &TableDetectorConfig::default());
        assert_eq!(columns.len(), 4);
    }

    // -- detect_table / table_to_grid ---------------------------------------

    #[test]
    fn test_grid_places_runs_in_columns() {
        let table = detect_table(&plan_rows(), &TableDetectorConfig::default()).unwrap();
        let grid = table_to_grid(&table);
        assert_eq!(grid[0], vec!["CLAVE", "MATERIA", "TIPO", "CRÉDITOS"]);
        assert_eq!(grid[2], vec!["04111", "BASES DE DATOS", "OPT", "5"]);
    }

    #[test]
    fn test_missing_cell_stays_empty() {
        let mut rows = plan_rows();
        rows.push(line(655.0, &[("04112", 50.0), ("OPT", 401.0)]));
        let table = detect_table(&rows, &TableDetectorConfig::default()).unwrap();
        let grid = table_to_grid(&table);
        assert_eq!(grid[3], vec!["04112", "", "OPT", ""]);
    }

    #[test]
    fn test_single_row_is_not_a_table() {
        let rows = vec![line(700.0, &[("A", 10.0), ("B", 100.0)])];
        assert!(detect_table(&rows, &TableDetectorConfig::default()).is_none());
    }

    #[test]
    fn test_prose_is_not_a_table() {
        let rows = vec![
            line(700.0, &[("UNIVERSIDAD DE SONORA", 200.0)]),
            line(685.0, &[("DIRECCIÓN DE SERVICIOS ESCOLARES", 180.0)]),
        ];
        assert!(detect_table(&rows, &TableDetectorConfig::default()).is_none());
    }

    // -- strategies ---------------------------------------------------------

    #[test]
    fn test_column_grids_per_block() {
        let mut page = vec![line(760.0, &[("KÁRDEX", 250.0)])];
        page.extend(plan_rows());
        let grids = column_grids(&[page], &TableDetectorConfig::default());
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].len(), 3);
    }

    #[test]
    fn test_line_grids_are_ragged() {
        let page = vec![
            line(700.0, &[("PLAN 2182", 50.0)]),
            line(685.0, &[("04110", 50.0), ("PROGRAMACION", 120.0), ("OBL", 400.0)]),
            line(670.0, &[("  ", 50.0)]),
        ];
        let grids = line_grids(&[page, Vec::new()]);
        assert_eq!(grids.len(), 1);
        assert_eq!(
            grids[0],
            vec![
                vec!["PLAN 2182".to_string()],
                vec!["04110".into(), "PROGRAMACION".into(), "OBL".into()],
            ]
        );
    }
}

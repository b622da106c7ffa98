//! Ranked extraction providers.
//!
//! A [`DocumentProvider`] offers text, tables, or both. Callers hand a ranked
//! slice of providers to [`extract_text_ranked`] or [`extract_tables_ranked`];
//! a provider that fails is logged and treated as if it found nothing.

use log::{debug, warn};

use crate::cleanup::{cleanup_grid, cleanup_text};
use crate::parser::backend::PdfBackend;
use crate::parser::layout::{extract_page_lines, page_text};
use crate::parser::table::{column_grids, line_grids, Grid, TableDetectorConfig};
use crate::PdfError;

/// Primary text shorter than this (in characters) sends the chain on to the
/// next provider.
pub const MIN_TEXT_LEN: usize = 100;

/// One extraction capability. The default methods mean "not offered".
pub trait DocumentProvider {
    /// Short identifier, reported as the `extractor` for tables.
    fn name(&self) -> &'static str;

    fn extract_text(&self) -> Result<String, PdfError> {
        Ok(String::new())
    }

    fn extract_tables(&self) -> Result<Vec<Grid>, PdfError> {
        Ok(Vec::new())
    }
}

// ---------------------------------------------------------------------------
// Providers over a PdfBackend
// ---------------------------------------------------------------------------

/// Page text rebuilt from positioned spans, one visual line per line.
pub struct LayoutText<'a> {
    backend: &'a dyn PdfBackend,
}

impl<'a> LayoutText<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self { backend }
    }
}

impl DocumentProvider for LayoutText<'_> {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn extract_text(&self) -> Result<String, PdfError> {
        let pages = extract_page_lines(self.backend)?;
        Ok(pages
            .iter()
            .map(|lines| page_text(lines))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// The backend's own page text.
pub struct PlainText<'a> {
    backend: &'a dyn PdfBackend,
}

impl<'a> PlainText<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self { backend }
    }
}

impl DocumentProvider for PlainText<'_> {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn extract_text(&self) -> Result<String, PdfError> {
        let pages = self
            .backend
            .pages()
            .into_keys()
            .map(|number| self.backend.plain_text(number))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages.join("\n"))
    }
}

/// Column-aligned table detection.
pub struct ColumnTables<'a> {
    backend: &'a dyn PdfBackend,
    config: TableDetectorConfig,
}

impl<'a> ColumnTables<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self {
            backend,
            config: TableDetectorConfig::default(),
        }
    }
}

impl DocumentProvider for ColumnTables<'_> {
    fn name(&self) -> &'static str {
        "columns"
    }

    fn extract_tables(&self) -> Result<Vec<Grid>, PdfError> {
        let pages = extract_page_lines(self.backend)?;
        Ok(column_grids(&pages, &self.config))
    }
}

/// Every visual line as a ragged row.
pub struct LineTables<'a> {
    backend: &'a dyn PdfBackend,
}

impl<'a> LineTables<'a> {
    pub fn new(backend: &'a dyn PdfBackend) -> Self {
        Self { backend }
    }
}

impl DocumentProvider for LineTables<'_> {
    fn name(&self) -> &'static str {
        "lines"
    }

    fn extract_tables(&self) -> Result<Vec<Grid>, PdfError> {
        let pages = extract_page_lines(self.backend)?;
        Ok(line_grids(&pages))
    }
}

// ---------------------------------------------------------------------------
// Ranked chains
// ---------------------------------------------------------------------------

fn text_len(text: &str) -> usize {
    text.trim().chars().count()
}

/// Cleaned text from the first provider, falling through to later ones while
/// the best text so far is shorter than [`MIN_TEXT_LEN`]. A later provider's
/// text replaces the current one only if it is longer.
pub fn extract_text_ranked(providers: &[&dyn DocumentProvider]) -> String {
    let mut best = String::new();

    for (rank, provider) in providers.iter().enumerate() {
        if rank > 0 && text_len(&best) >= MIN_TEXT_LEN {
            break;
        }
        let text = match provider.extract_text() {
            Ok(text) => cleanup_text(&text),
            Err(e) => {
                warn!("text provider {} failed: {e}", provider.name());
                continue;
            }
        };
        debug!("text provider {}: {} chars", provider.name(), text_len(&text));
        if text_len(&text) > text_len(&best) {
            best = text;
        }
    }

    best
}

/// Grids found by the winning table strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct TableExtraction {
    /// Name of the provider that produced `tables`, or of the last one tried
    /// when none found anything.
    pub extractor: &'static str,
    pub tables: Vec<Grid>,
}

fn has_content(grid: &Grid) -> bool {
    grid.iter()
        .any(|row| row.iter().any(|cell| !cell.trim().is_empty()))
}

/// The first provider yielding a non-empty grid wins.
pub fn extract_tables_ranked(providers: &[&dyn DocumentProvider]) -> TableExtraction {
    let mut extractor = "";

    for provider in providers {
        extractor = provider.name();
        match provider.extract_tables() {
            Ok(tables) => {
                let tables: Vec<Grid> = tables
                    .into_iter()
                    .filter(has_content)
                    .map(cleanup_grid)
                    .collect();
                if !tables.is_empty() {
                    debug!("table provider {extractor}: {} grids", tables.len());
                    return TableExtraction { extractor, tables };
                }
                debug!("table provider {extractor}: nothing found");
            }
            Err(e) => warn!("table provider {extractor} failed: {e}"),
        }
    }

    TableExtraction {
        extractor,
        tables: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream, StringFormat};

    use super::*;
    use crate::parser::backend::LopdfBackend;

    // ====================================================================
    // Mock providers
    // ====================================================================

    struct Fixed {
        name: &'static str,
        text: Option<&'static str>,
        tables: Option<Vec<Grid>>,
        calls: Cell<usize>,
    }

    impl Fixed {
        fn text(name: &'static str, text: Option<&'static str>) -> Self {
            Self {
                name,
                text,
                tables: Some(Vec::new()),
                calls: Cell::new(0),
            }
        }

        fn tables(name: &'static str, tables: Option<Vec<Grid>>) -> Self {
            Self {
                name,
                text: Some(""),
                tables,
                calls: Cell::new(0),
            }
        }
    }

    impl DocumentProvider for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        fn extract_text(&self) -> Result<String, PdfError> {
            self.calls.set(self.calls.get() + 1);
            self.text
                .map(str::to_string)
                .ok_or_else(|| PdfError::Parse("broken stream".into()))
        }

        fn extract_tables(&self) -> Result<Vec<Grid>, PdfError> {
            self.calls.set(self.calls.get() + 1);
            self.tables
                .clone()
                .ok_or_else(|| PdfError::Parse("broken stream".into()))
        }
    }

    struct NameOnly;

    impl DocumentProvider for NameOnly {
        fn name(&self) -> &'static str {
            "none"
        }
    }

    fn grid(rows: &[&[&str]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    const LONG_TEXT: &str = "KÁRDEX ELECTRÓNICO\nEXPEDIENTE: 222202156 PÉREZ JUAN\nPLAN: 2182\n\
                             PROGRAMA: INGENIERÍA EN SISTEMAS DE INFORMACIÓN (2182)\n";

    // ====================================================================
    // Text chain
    // ====================================================================

    #[test]
    fn test_long_primary_text_skips_fallback() {
        let primary = Fixed::text("layout", Some(LONG_TEXT));
        let fallback = Fixed::text("plain", Some("x"));
        let text = extract_text_ranked(&[&primary, &fallback]);
        assert_eq!(text, LONG_TEXT);
        assert_eq!(fallback.calls.get(), 0);
    }

    #[test]
    fn test_short_primary_uses_longer_fallback() {
        let primary = Fixed::text("layout", Some("PLAN"));
        let fallback = Fixed::text("plain", Some("PLAN: 2182"));
        assert_eq!(extract_text_ranked(&[&primary, &fallback]), "PLAN: 2182");
    }

    #[test]
    fn test_short_primary_kept_over_shorter_fallback() {
        let primary = Fixed::text("layout", Some("PLAN: 2182"));
        let fallback = Fixed::text("plain", Some("PLAN"));
        assert_eq!(extract_text_ranked(&[&primary, &fallback]), "PLAN: 2182");
        assert_eq!(fallback.calls.get(), 1);
    }

    #[test]
    fn test_failing_text_provider_is_skipped() {
        let primary = Fixed::text("layout", None);
        let fallback = Fixed::text("plain", Some("CA\u{0301}LCULO"));
        assert_eq!(extract_text_ranked(&[&primary, &fallback]), "CÁLCULO");
    }

    #[test]
    fn test_default_capabilities_are_empty() {
        assert_eq!(extract_text_ranked(&[&NameOnly]), "");
        let tables = extract_tables_ranked(&[&NameOnly]);
        assert_eq!(tables.extractor, "none");
        assert!(tables.tables.is_empty());
    }

    // ====================================================================
    // Table chain
    // ====================================================================

    #[test]
    fn test_first_non_empty_table_strategy_wins() {
        let columns = Fixed::tables("columns", Some(vec![grid(&[&["", ""]])]));
        let lines = Fixed::tables("lines", Some(vec![grid(&[&["04110 PROGRAMACION"]])]));
        let result = extract_tables_ranked(&[&columns, &lines]);
        assert_eq!(result.extractor, "lines");
        assert_eq!(result.tables, vec![grid(&[&["04110 PROGRAMACION"]])]);
    }

    #[test]
    fn test_later_strategies_not_consulted_after_success() {
        let columns = Fixed::tables("columns", Some(vec![grid(&[&["CLAVE", "MATERIA"]])]));
        let lines = Fixed::tables("lines", Some(Vec::new()));
        let result = extract_tables_ranked(&[&columns, &lines]);
        assert_eq!(result.extractor, "columns");
        assert_eq!(lines.calls.get(), 0);
    }

    #[test]
    fn test_failing_table_provider_is_skipped() {
        let columns = Fixed::tables("columns", None);
        let lines = Fixed::tables("lines", None);
        let result = extract_tables_ranked(&[&columns, &lines]);
        assert_eq!(result.extractor, "lines");
        assert!(result.tables.is_empty());
    }

    #[test]
    fn test_table_cells_are_cleaned() {
        let columns = Fixed::tables("columns", Some(vec![grid(&[&["E\u{0301}TICA\u{00A0}I"]])]));
        let result = extract_tables_ranked(&[&columns]);
        assert_eq!(result.tables[0][0][0], "ÉTICA I");
    }

    // ====================================================================
    // lopdf end to end
    // ====================================================================

    fn win_ansi(text: &str) -> Object {
        Object::String(text.chars().map(|c| c as u8).collect(), StringFormat::Literal)
    }

    /// One page, Helvetica with WinAnsiEncoding, every run placed with `Tm`.
    fn plan_pdf(runs: &[(i64, i64, &str)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 10.into()]),
        ];
        for &(x, y, text) in runs {
            operations.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
            ));
            operations.push(Operation::new("Tj", vec![win_ansi(text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    const PLAN_RUNS: &[(i64, i64, &str)] = &[
        (200, 780, "UNIVERSIDAD DE SONORA"),
        (200, 765, "PLAN DE ESTUDIOS 2182"),
        (50, 700, "CLAVE"),
        (120, 700, "MATERIA"),
        (400, 700, "TIPO"),
        (450, 700, "CRÉDITOS"),
        (50, 685, "04110"),
        (120, 685, "PROGRAMACION"),
        (400, 685, "OBL"),
        (450, 685, "6"),
        (50, 670, "04111"),
        (120, 670, "CÁLCULO"),
        (400, 670, "OPT"),
        (450, 670, "5"),
    ];

    #[test]
    fn test_layout_text_from_lopdf_document() {
        let bytes = plan_pdf(PLAN_RUNS);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        assert_eq!(backend.page_count(), 1);

        let layout = LayoutText::new(&backend);
        let plain = PlainText::new(&backend);
        let text = extract_text_ranked(&[&layout, &plain]);
        assert_eq!(
            text,
            "UNIVERSIDAD DE SONORA\nPLAN DE ESTUDIOS 2182\nCLAVE MATERIA TIPO CRÉDITOS\n\
             04110 PROGRAMACION OBL 6\n04111 CÁLCULO OPT 5"
        );
    }

    #[test]
    fn test_column_tables_from_lopdf_document() {
        let bytes = plan_pdf(PLAN_RUNS);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();

        let columns = ColumnTables::new(&backend);
        let lines = LineTables::new(&backend);
        let result = extract_tables_ranked(&[&columns, &lines]);

        assert_eq!(result.extractor, "columns");
        assert_eq!(
            result.tables,
            vec![grid(&[
                &["CLAVE", "MATERIA", "TIPO", "CRÉDITOS"],
                &["04110", "PROGRAMACION", "OBL", "6"],
                &["04111", "CÁLCULO", "OPT", "5"],
            ])]
        );
    }

    #[test]
    fn test_line_tables_fallback_on_unaligned_page() {
        let bytes = plan_pdf(&[(50, 700, "04110 PROGRAMACION OBL 6"), (200, 600, "CÁLCULO")]);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();

        let columns = ColumnTables::new(&backend);
        let lines = LineTables::new(&backend);
        let result = extract_tables_ranked(&[&columns, &lines]);

        assert_eq!(result.extractor, "lines");
        assert_eq!(
            result.tables,
            vec![grid(&[&["04110 PROGRAMACION OBL 6"], &["CÁLCULO"]])]
        );
    }

    #[test]
    fn test_plain_text_provider_reads_lopdf_text() {
        let bytes = plan_pdf(PLAN_RUNS);
        let backend = LopdfBackend::load_bytes(&bytes).unwrap();
        let text = PlainText::new(&backend).extract_text().unwrap();
        assert!(text.contains("PROGRAMACION"));
    }
}

//! Text and table-grid extraction from PDF files.
//!
//! The crate turns a PDF into the two inputs the heuristic parsers need: the
//! document's plain text and a list of raw table grids. Both come from ranked
//! [`provider::DocumentProvider`] chains over a [`lopdf`] backend:
//!
//! - text: `layout` (positioned spans regrouped into lines), then `plain`
//! - tables: `columns` (column-alignment detection), then `lines` (ragged rows)
//!
//! ```no_run
//! let extraction = kardex_pdf::extract_file("plan.pdf".as_ref())?;
//! println!("{} tables via {}", extraction.tables.len(), extraction.extractor);
//! # Ok::<(), kardex_pdf::PdfError>(())
//! ```

use std::path::Path;

use log::info;
use thiserror::Error;

use parser::backend::LopdfBackend;
use provider::{
    extract_tables_ranked, extract_text_ranked, ColumnTables, LayoutText, LineTables, PlainText,
    TableExtraction,
};

pub mod cleanup;
pub mod parser;
pub mod provider;

pub use parser::table::Grid;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything pulled out of one PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub tables: Vec<Grid>,
    /// Name of the table strategy that produced `tables`.
    pub extractor: &'static str,
}

/// Extract text and tables from PDF bytes.
///
/// Fails only when the document cannot be loaded at all. Individual
/// strategies that fail are skipped.
pub fn extract(bytes: &[u8]) -> Result<Extraction, PdfError> {
    let backend = LopdfBackend::load_bytes(bytes)?;

    let layout = LayoutText::new(&backend);
    let plain = PlainText::new(&backend);
    let text = extract_text_ranked(&[&layout, &plain]);

    let columns = ColumnTables::new(&backend);
    let lines = LineTables::new(&backend);
    let TableExtraction { extractor, tables } = extract_tables_ranked(&[&columns, &lines]);

    info!(
        "extracted {} pages: {} chars, {} tables via {extractor}",
        backend.page_count(),
        text.chars().count(),
        tables.len()
    );

    Ok(Extraction {
        text,
        tables,
        extractor,
    })
}

/// [`extract`] on a file.
pub fn extract_file(path: &Path) -> Result<Extraction, PdfError> {
    let bytes = std::fs::read(path)?;
    extract(&bytes)
}

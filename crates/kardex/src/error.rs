use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("PDF path missing")]
    MissingInput,

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("extraction failed: {0}")]
    Extraction(#[from] kardex_pdf::PdfError),
}

/// The `{ok:false,error}` object printed for a run that could not produce a
/// report.
#[derive(Debug, serde::Serialize)]
pub struct Failure {
    pub ok: bool,
    pub error: String,
}

impl Failure {
    pub fn new(error: impl ToString) -> Self {
        Self {
            ok: false,
            error: error.to_string(),
        }
    }
}

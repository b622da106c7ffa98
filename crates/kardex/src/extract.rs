use std::path::Path;

use kardex_core::types::Document;
use log::debug;

use crate::prelude::*;

/// A document ready for the parsers, plus the table strategy that produced
/// its grids.
#[derive(Debug)]
pub struct Loaded {
    pub document: Document,
    pub extractor: &'static str,
}

/// Read and extract the PDF at `path`.
pub fn load(path: Option<&Path>) -> Result<Loaded, Error> {
    let path = path.ok_or(Error::MissingInput)?;
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let extraction = kardex_pdf::extract_file(path)?;
    debug!(
        "{}: {} chars of text, {} tables via {}",
        path.display(),
        extraction.text.chars().count(),
        extraction.tables.len(),
        extraction.extractor
    );

    Ok(Loaded {
        document: Document::new(extraction.text, extraction.tables),
        extractor: extraction.extractor,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_missing_path() {
        assert!(matches!(load(None), Err(Error::MissingInput)));
    }

    #[test]
    fn test_nonexistent_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kardex.pdf");
        match load(Some(&path)) {
            Err(Error::NotFound(reported)) => assert_eq!(reported, path),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_pdf_is_extraction_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a pdf").unwrap();
        let err = load(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
        assert!(err.to_string().starts_with("extraction failed"));
    }
}

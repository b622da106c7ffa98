use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::PdfError;

// ---------------------------------------------------------------------------
// Type aliases
// ---------------------------------------------------------------------------

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// Font resource of a page.
#[derive(Debug, Clone, Default)]
pub struct BackendFontInfo {
    /// Resource key as used by `Tf` (e.g. `b"F1"`).
    pub name: Vec<u8>,
    pub base_font: Option<String>,
    /// Simple encoding name (`WinAnsiEncoding`, `Identity-H`, ...).
    pub encoding: Option<String>,
}

/// A lopdf-independent PDF operand value.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Dict(Vec<(Vec<u8>, PdfValue)>),
    Reference(PageId),
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` into a [`PdfValue`]. Stream payloads are dropped.
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        lopdf::Object::Dictionary(dict) => PdfValue::Dict(convert_dict(dict)),
        lopdf::Object::Stream(stream) => PdfValue::Dict(convert_dict(&stream.dict)),
        lopdf::Object::Reference(id) => PdfValue::Reference(*id),
    }
}

fn convert_dict(dict: &lopdf::Dictionary) -> Vec<(Vec<u8>, PdfValue)> {
    dict.iter()
        .map(|(k, v)| (k.clone(), convert_object(v)))
        .collect()
}

/// Windows-1252 code points for the 0x80..=0x9F block. Undefined slots map
/// to the replacement character, which cleanup strips later.
const WIN_ANSI_HIGH: [char; 32] = [
    '€', '\u{FFFD}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{FFFD}', 'Ž',
    '\u{FFFD}', '\u{FFFD}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ',
    '\u{FFFD}', 'ž', 'Ÿ',
];

/// Decode single-byte `WinAnsiEncoding` text. Accented Spanish letters sit in
/// the Latin-1 range and map straight to their code points.
pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => WIN_ANSI_HIGH[(b - 0x80) as usize],
            _ => b as char,
        })
        .collect()
}

/// Best-effort decoding of raw PDF string bytes.
///
/// 1. UTF-16BE with BOM (`\xFE\xFF` prefix).
/// 2. Valid UTF-8.
/// 3. Windows-1252 / Latin-1, one byte per character.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let code_units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    decode_win_ansi(bytes)
}

// ---------------------------------------------------------------------------
// PdfBackend trait
// ---------------------------------------------------------------------------

/// Page-level access to a loaded PDF.
///
/// The layout pipeline and the providers only talk to this trait, so they can
/// be driven by hand-built content streams in tests.
pub trait PdfBackend {
    /// Mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Font resources referenced by the given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode the string operand of a text-showing operator using whatever
    /// the backend knows about the font's encoding.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Text of one page as the backend's own extractor sees it, without
    /// positional analysis.
    fn plain_text(&self, page_number: u32) -> Result<String, PdfError>;
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// [`PdfBackend`] over an in-memory [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    fn font_encoding_name(&self, page: PageId, font_name: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font_dict = fonts.get(font_name)?;
        match font_dict.get(b"Encoding").ok()? {
            lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }
}

fn name_entry(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key)
        .ok()
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page fonts: {}", e)))?;

        Ok(fonts_map
            .iter()
            .map(|(name, dict)| BackendFontInfo {
                name: name.clone(),
                base_font: name_entry(dict, b"BaseFont"),
                encoding: name_entry(dict, b"Encoding"),
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Parse(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Parse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        match self.font_encoding_name(page, font_name).as_deref() {
            Some(enc) if enc.contains("Identity") && bytes.len().is_multiple_of(2) => {
                let code_units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                let decoded = String::from_utf16_lossy(&code_units);
                if decoded.chars().any(|c| c != '\u{FFFD}' && c != '\0') {
                    return decoded;
                }
                decode_text_simple(bytes)
            }
            Some("WinAnsiEncoding") => decode_win_ansi(bytes),
            _ => decode_text_simple(bytes),
        }
    }

    fn plain_text(&self, page_number: u32) -> Result<String, PdfError> {
        self.doc
            .extract_text(&[page_number])
            .map_err(|e| PdfError::Parse(format!("page {page_number}: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- decode_text_simple -------------------------------------------------

    #[test]
    fn decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("CÁLCULO".as_bytes()), "CÁLCULO");
    }

    #[test]
    fn decode_text_simple_latin1_accents() {
        // "DISEÑO" in WinAnsi: 0xD1 is Ñ.
        let input: &[u8] = &[0x44, 0x49, 0x53, 0x45, 0xD1, 0x4F];
        assert_eq!(decode_text_simple(input), "DISEÑO");
    }

    #[test]
    fn decode_text_simple_utf16be() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00, 0xC9];
        assert_eq!(decode_text_simple(input), "AÉ");
    }

    #[test]
    fn decode_text_simple_utf16be_odd_trailing_byte() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00];
        assert_eq!(decode_text_simple(input), "A");
    }

    #[test]
    fn decode_text_simple_empty() {
        assert_eq!(decode_text_simple(&[]), "");
    }

    // -- decode_win_ansi ----------------------------------------------------

    #[test]
    fn decode_win_ansi_high_block() {
        assert_eq!(decode_win_ansi(&[0x93, 0x41, 0x94, 0x96]), "“A”–");
    }

    #[test]
    fn decode_win_ansi_undefined_slot() {
        assert_eq!(decode_win_ansi(&[0x81]), "\u{FFFD}");
    }

    // -- get_number_from_value ----------------------------------------------

    #[test]
    fn get_number_accepts_integers_and_reals() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(-10)), Some(-10.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
    }

    #[test]
    fn get_number_from_non_numeric() {
        assert_eq!(get_number_from_value(&PdfValue::Null), None);
        assert_eq!(get_number_from_value(&PdfValue::Str(b"7".to_vec())), None);
        assert_eq!(get_number_from_value(&PdfValue::Reference((1, 0))), None);
    }

    // -- convert_object -----------------------------------------------------

    #[test]
    fn convert_scalars() {
        assert_eq!(convert_object(&lopdf::Object::Null), PdfValue::Null);
        assert_eq!(
            convert_object(&lopdf::Object::Integer(99)),
            PdfValue::Integer(99)
        );
        assert_eq!(
            convert_object(&lopdf::Object::Name(b"F1".to_vec())),
            PdfValue::Name(b"F1".to_vec())
        );
        assert_eq!(
            convert_object(&lopdf::Object::String(
                b"OBL".to_vec(),
                lopdf::StringFormat::Literal
            )),
            PdfValue::Str(b"OBL".to_vec())
        );
    }

    #[test]
    fn convert_tj_array() {
        let arr = lopdf::Object::Array(vec![
            lopdf::Object::string_literal("CLAVE"),
            lopdf::Object::Integer(-250),
        ]);
        assert_eq!(
            convert_object(&arr),
            PdfValue::Array(vec![
                PdfValue::Str(b"CLAVE".to_vec()),
                PdfValue::Integer(-250)
            ])
        );
    }

    #[test]
    fn convert_stream_uses_dict() {
        let mut dict = lopdf::Dictionary::new();
        dict.set("Length", lopdf::Object::Integer(0));
        let obj = lopdf::Object::Stream(lopdf::Stream::new(dict, vec![]));

        match convert_object(&obj) {
            PdfValue::Dict(entries) => {
                assert_eq!(entries.len(), 1);
                assert_eq!(entries[0].0, b"Length");
            }
            other => panic!("expected Dict for stream, got {:?}", other),
        }
    }

    // -- LopdfBackend -------------------------------------------------------

    #[test]
    fn load_bytes_rejects_garbage() {
        assert!(matches!(
            LopdfBackend::load_bytes(b"not a pdf"),
            Err(PdfError::Parse(_))
        ));
    }
}

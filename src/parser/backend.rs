//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for PDF operations, isolating
//! the concrete PDF library (lopdf) from run extraction.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Document as LopdfDocument, Object};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value, if this operand is a number.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Numeric operand at `idx`, or `default` when missing or not a number.
    pub fn number(&self, idx: usize, default: f32) -> f32 {
        self.operands
            .get(idx)
            .and_then(PdfValue::as_number)
            .unwrap_or(default)
    }
}

/// Glyph width used when a font carries no width table (1/1000 em).
pub const FALLBACK_GLYPH_WIDTH: f32 = 500.0;

/// Horizontal glyph advances for one font, in 1/1000 text space units.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Character codes are two bytes wide (Type0 / CID fonts).
    pub two_byte: bool,
    /// First code covered by `widths` (simple fonts).
    pub first_char: u32,
    /// `/Widths` array of a simple font.
    pub widths: Vec<f32>,
    /// Per-CID widths from a descendant font's `/W` array.
    pub cid_widths: HashMap<u32, f32>,
    /// Width for codes not covered above.
    pub default_width: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            two_byte: false,
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            default_width: FALLBACK_GLYPH_WIDTH,
        }
    }
}

impl FontMetrics {
    /// Split a string operand into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
                .collect()
        } else {
            bytes.iter().map(|&b| b as u32).collect()
        }
    }

    /// Advance width of one code.
    pub fn width(&self, code: u32) -> f32 {
        if let Some(w) = self.cid_widths.get(&code) {
            return *w;
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.default_width)
    }
}

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the raw (decompressed) content stream bytes for a page.
    /// A page without a content stream yields an empty buffer.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Glyph widths of a font on the given page. `None` makes run
    /// extraction estimate advances from the decoded text instead.
    fn font_metrics(&self, _page: PageId, _font_name: &[u8]) -> Option<FontMetrics> {
        None
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice.
    ///
    /// Anything lopdf cannot make sense of, including encrypted files, is
    /// reported as [`Error::CorruptDocument`].
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)
            .map_err(|e| Error::CorruptDocument(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(Error::CorruptDocument(
                "encrypted documents are not supported".to_string(),
            ));
        }

        Ok(Self { doc })
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn stream_bytes(&self, id: lopdf::ObjectId) -> Result<Vec<u8>> {
        match self.doc.get_object(id) {
            Ok(Object::Stream(s)) => Ok(s
                .decompressed_content()
                .unwrap_or_else(|_| s.content.clone())),
            Ok(_) => Err(Error::CorruptDocument(
                "content reference is not a stream".to_string(),
            )),
            Err(e) => Err(Error::CorruptDocument(e.to_string())),
        }
    }

    fn concat_streams(&self, parts: &[Object]) -> Result<Vec<u8>> {
        let mut content = Vec::new();
        for obj in parts {
            if let Object::Reference(r) = obj {
                content.extend_from_slice(&self.stream_bytes(*r)?);
                content.push(b' ');
            }
        }
        Ok(content)
    }

    /// Follow a reference, leaving direct objects untouched.
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn numbers(&self, obj: &Object) -> Vec<f32> {
        match self.resolve(obj) {
            Object::Array(arr) => arr
                .iter()
                .filter_map(|o| convert_object(self.resolve(o)).as_number())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn number(&self, dict: &lopdf::Dictionary, key: &[u8]) -> Option<f32> {
        dict.get(key)
            .ok()
            .and_then(|o| convert_object(self.resolve(o)).as_number())
    }

    /// Parse a CID font `/W` array: `c [w1 w2 ...]` or `cfirst clast w`.
    fn cid_widths(&self, obj: &Object) -> HashMap<u32, f32> {
        let mut widths = HashMap::new();
        let items = match self.resolve(obj) {
            Object::Array(arr) => arr,
            _ => return widths,
        };

        let mut i = 0;
        while i < items.len() {
            let first = match convert_object(self.resolve(&items[i])).as_number() {
                Some(n) if n >= 0.0 => n as u32,
                _ => break,
            };
            match items.get(i + 1).map(|o| self.resolve(o)) {
                Some(Object::Array(list)) => {
                    for (offset, w) in list.iter().enumerate() {
                        if let Some(w) = convert_object(self.resolve(w)).as_number() {
                            widths.insert(first + offset as u32, w);
                        }
                    }
                    i += 2;
                }
                Some(last) => {
                    let last = convert_object(last).as_number();
                    let w = items
                        .get(i + 2)
                        .and_then(|o| convert_object(self.resolve(o)).as_number());
                    match (last, w) {
                        (Some(last), Some(w)) if last >= first as f32 => {
                            for code in first..=last as u32 {
                                widths.insert(code, w);
                            }
                        }
                        _ => break,
                    }
                    i += 3;
                }
                None => break,
            }
        }
        widths
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        let contents = match page_dict.get(b"Contents") {
            Ok(c) => c,
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                // Some writers point Contents at an array object.
                Ok(Object::Array(arr)) => self.concat_streams(arr),
                _ => self.stream_bytes(*r),
            },
            Object::Array(arr) => self.concat_streams(arr),
            _ => Err(Error::CorruptDocument("invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)?;

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
        if let Ok(fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn font_metrics(&self, page: PageId, font_name: &[u8]) -> Option<FontMetrics> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font = fonts.get(font_name)?;

        let is_type0 = matches!(font.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == b"Type0");
        if is_type0 {
            let descendant = font
                .get(b"DescendantFonts")
                .ok()
                .map(|o| self.resolve(o))
                .and_then(|o| match o {
                    Object::Array(arr) => arr.first().map(|d| self.resolve(d)),
                    _ => None,
                })
                .and_then(|o| o.as_dict().ok());

            let mut metrics = FontMetrics {
                two_byte: true,
                default_width: 1000.0,
                ..FontMetrics::default()
            };
            if let Some(cid_font) = descendant {
                if let Some(dw) = self.number(cid_font, b"DW") {
                    metrics.default_width = dw;
                }
                if let Ok(w) = cid_font.get(b"W") {
                    metrics.cid_widths = self.cid_widths(w);
                }
            }
            return Some(metrics);
        }

        let widths = font.get(b"Widths").map(|w| self.numbers(w)).ok()?;
        if widths.is_empty() {
            return None;
        }
        let missing = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|d| self.resolve(d).as_dict().ok())
            .and_then(|d| self.number(d, b"MissingWidth"));

        Some(FontMetrics {
            two_byte: false,
            first_char: self.number(font, b"FirstChar").unwrap_or(0.0).max(0.0) as u32,
            widths,
            cid_widths: HashMap::new(),
            default_width: missing.unwrap_or(FALLBACK_GLYPH_WIDTH),
        })
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("مرحبا".as_bytes()), "مرحبا");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        // BOM + U+0628 U+0643 ("بك")
        let bytes = vec![0xFE, 0xFF, 0x06, 0x28, 0x06, 0x43];
        assert_eq!(decode_text_simple(&bytes), "بك");
    }

    #[test]
    fn test_content_op_number() {
        let op = ContentOp {
            operator: "Td".to_string(),
            operands: vec![PdfValue::Integer(42), PdfValue::Real(3.5), PdfValue::Other],
        };
        assert_eq!(op.number(0, 0.0), 42.0);
        assert_eq!(op.number(1, 0.0), 3.5);
        assert_eq!(op.number(2, 7.0), 7.0);
        assert_eq!(op.number(9, 1.0), 1.0);
    }

    #[test]
    fn test_font_metrics_simple_widths() {
        let metrics = FontMetrics {
            first_char: 32,
            widths: vec![250.0, 333.0],
            ..FontMetrics::default()
        };
        assert_eq!(metrics.codes(b" !"), vec![32, 33]);
        assert_eq!(metrics.width(33), 333.0);
        assert_eq!(metrics.width(10), FALLBACK_GLYPH_WIDTH);
    }

    #[test]
    fn test_font_metrics_two_byte_codes() {
        let metrics = FontMetrics {
            two_byte: true,
            cid_widths: HashMap::from([(0x0102, 600.0)]),
            default_width: 1000.0,
            ..FontMetrics::default()
        };
        assert_eq!(metrics.codes(&[0x01, 0x02, 0x00, 0x05]), vec![0x0102, 0x0005]);
        assert_eq!(metrics.width(0x0102), 600.0);
        assert_eq!(metrics.width(0x0005), 1000.0);
    }

    #[test]
    fn test_load_garbage_is_corrupt() {
        let result = LopdfBackend::load_bytes(b"%PDF-1.4\nthis is not a pdf");
        assert!(matches!(result, Err(Error::CorruptDocument(_))));
    }
}

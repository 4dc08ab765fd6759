//! Document parsing: PDF text layers, line reconstruction and Word files.

mod backend;
mod lines;
mod options;
mod pdf;
mod runs;
mod word;

pub use backend::{
    decode_text_simple, ContentOp, FontMetrics, LopdfBackend, PageId, PdfBackend, PdfValue,
    FALLBACK_GLYPH_WIDTH,
};
pub use lines::{is_arabic_script, lines_to_text, page_text, reconstruct_lines};
pub use options::{
    CancelFlag, ExtractOptions, PageSelection, DEFAULT_OCR_SCALE, DEFAULT_OCR_THRESHOLD,
    DEFAULT_OCR_TIMEOUT,
};
pub use pdf::PdfExtractor;
pub use runs::{collect_runs, extract_page_runs};
pub use word::WordExtractor;

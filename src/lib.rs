//! # arextract
//!
//! Text extraction for Arabic PDF and Word uploads.
//!
//! PDF pages are read from their embedded text layer and regrouped into
//! right-to-left lines. Pages with little or no text layer are rendered
//! and sent to an OCR service. Word documents contribute their paragraph
//! text. Everything ends in one normalization pass that collapses
//! whitespace and repairs known Arabic glyph-order artifacts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use arextract::{extract_text_blocking, Extractor, OcrSpaceClient, SourceDocument};
//!
//! fn main() -> arextract::Result<()> {
//!     let source = SourceDocument::from_path("lesson.pdf")?;
//!
//!     let mut extractor = Extractor::new();
//!     if let Ok(client) = OcrSpaceClient::from_env() {
//!         extractor = extractor.with_ocr(client);
//!     }
//!
//!     let extracted = extract_text_blocking(&source, &extractor)?;
//!     println!("{}", extracted.text);
//!     println!("skipped pages: {:?}", extracted.report.skipped_pages());
//!     Ok(())
//! }
//! ```
//!
//! ## Failure policy
//!
//! Unsupported formats, unreadable files and cancellation fail the whole
//! call. Everything that goes wrong on a single PDF page (malformed content,
//! missing OCR credential, OCR errors and timeouts) skips that page, logs a
//! warning and is recorded in the [`ExtractionReport`].

pub mod detect;
pub mod error;
pub mod model;
pub mod normalize;
pub mod ocr;
pub mod parser;

pub use detect::{classify, sniff_media_type, DocumentFormat};
pub use error::{Error, ErrorKind, Result};
pub use model::{
    Direction, ExtractedText, ExtractionReport, PageOutcome, PageTextRun, RasterImage,
    ReconstructedLine, SkipReason, SourceDocument,
};
pub use normalize::{ArabicNormalizer, Correction, CorrectionTable, NormalizeOptions};
pub use ocr::{HayroRasterizer, OcrConfig, OcrEngine, OcrSpaceClient, PageRasterizer};
pub use parser::{CancelFlag, ExtractOptions, PageSelection, PdfExtractor, WordExtractor};

use std::sync::Arc;

/// Extraction settings plus the injected OCR and rendering services.
///
/// An extractor holds no per-document state and can be shared between
/// concurrent calls.
#[derive(Clone)]
pub struct Extractor {
    options: ExtractOptions,
    ocr: Option<Arc<dyn OcrEngine>>,
    rasterizer: Arc<dyn PageRasterizer>,
    cancel: CancelFlag,
}

impl Extractor {
    /// Default options, `hayro` rendering, no OCR engine.
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::default(),
            ocr: None,
            rasterizer: Arc::new(HayroRasterizer::new()),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Send low-yield pages to this engine.
    pub fn with_ocr<E: OcrEngine + 'static>(mut self, engine: E) -> Self {
        self.ocr = Some(Arc::new(engine));
        self
    }

    /// Replace the page renderer.
    pub fn with_rasterizer<R: PageRasterizer + 'static>(mut self, rasterizer: R) -> Self {
        self.rasterizer = Arc::new(rasterizer);
        self
    }

    /// Share a cancellation flag with the caller.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    /// Same as [`extract_text_from_file`].
    pub async fn extract(&self, source: &SourceDocument) -> Result<ExtractedText> {
        extract_text_from_file(source, self).await
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("options", &self.options)
            .field("ocr", &self.ocr.as_ref().map(|e| e.name().to_string()))
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

/// Turn an upload into normalized plain text.
///
/// The format is chosen from the file name and declared media type (PDF
/// first, then Word). The text is normalized before it is returned.
///
/// # Errors
///
/// - [`Error::UnsupportedFormat`] when the upload is neither PDF nor Word
/// - [`Error::CorruptDocument`] when the bytes cannot be parsed
/// - [`Error::Cancelled`] when the extractor's flag was raised
/// - [`Error::Config`] when the correction table is invalid
pub async fn extract_text_from_file(
    source: &SourceDocument,
    extractor: &Extractor,
) -> Result<ExtractedText> {
    let format = classify(source.name(), source.media_type())?;
    let normalizer = ArabicNormalizer::new(extractor.options.normalize.clone())?;

    log::info!(
        "extracting {:?} ({} bytes) as {}",
        source.name(),
        source.len(),
        format
    );

    let (raw, report) = match format {
        DocumentFormat::Pdf => {
            let mut pdf = PdfExtractor::new(&extractor.options, extractor.rasterizer.as_ref())
                .with_cancel_flag(&extractor.cancel);
            if let Some(engine) = &extractor.ocr {
                pdf = pdf.with_ocr(engine.as_ref());
            }
            pdf.extract(source.bytes()).await?
        }
        DocumentFormat::Word => {
            let text = WordExtractor::new().extract(source.bytes())?;
            (text, ExtractionReport::new(DocumentFormat::Word, 0))
        }
    };

    Ok(ExtractedText::new(normalizer.normalize(&raw), report))
}

/// Blocking wrapper around [`extract_text_from_file`] for callers without
/// an async runtime.
pub fn extract_text_blocking(
    source: &SourceDocument,
    extractor: &Extractor,
) -> Result<ExtractedText> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(extract_text_from_file(source, extractor))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_reports_media_type() {
        let source = SourceDocument::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = extract_text_blocking(&source, &Extractor::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(err.to_string().contains("text/plain"));
    }

    #[test]
    fn test_corrupt_pdf_fails_whole_document() {
        let source = SourceDocument::new("broken.pdf", "", b"%PDF-1.4 garbage".to_vec());
        let err = extract_text_blocking(&source, &Extractor::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptDocument);
    }

    #[test]
    fn test_invalid_corrections_rejected_before_parsing() {
        let table: CorrectionTable = vec![Correction::new("", "x")].into_iter().collect();
        let options =
            ExtractOptions::new().with_normalize(NormalizeOptions::new().with_corrections(table));
        let source = SourceDocument::new("a.pdf", "", Vec::new());
        let err = extract_text_blocking(&source, &Extractor::new().with_options(options))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_extractor_builder() {
        let flag = CancelFlag::new();
        let extractor = Extractor::new()
            .with_options(ExtractOptions::new().with_ocr_threshold(5))
            .with_cancel_flag(flag.clone());
        assert_eq!(extractor.options().ocr_threshold, 5);
        assert!(!extractor.has_ocr());
        flag.cancel();
        assert!(extractor.cancel_flag().is_cancelled());
    }
}

//! Page-by-page PDF extraction with OCR fallback.

use crate::detect::DocumentFormat;
use crate::error::{Error, Result};
use crate::model::{ExtractionReport, PageOutcome, RasterImage, SkipReason};
use crate::ocr::{OcrEngine, PageRasterizer};

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::lines::page_text;
use super::options::{CancelFlag, ExtractOptions};
use super::runs::extract_page_runs;

/// PDF page extractor.
///
/// Pages are processed strictly in order. A page whose reconstructed text
/// is at or below [`ExtractOptions::ocr_threshold`] has its text layer
/// discarded and is rendered and sent to OCR instead. Any per-page failure
/// skips that page and is recorded in the [`ExtractionReport`]; only an
/// unreadable document or cancellation aborts the whole run.
pub struct PdfExtractor<'a> {
    options: &'a ExtractOptions,
    rasterizer: &'a dyn PageRasterizer,
    ocr: Option<&'a dyn OcrEngine>,
    cancel: Option<&'a CancelFlag>,
}

impl<'a> PdfExtractor<'a> {
    /// Create an extractor without OCR.
    pub fn new(options: &'a ExtractOptions, rasterizer: &'a dyn PageRasterizer) -> Self {
        Self {
            options,
            rasterizer,
            ocr: None,
            cancel: None,
        }
    }

    /// Use an OCR engine for low-yield pages.
    pub fn with_ocr(mut self, engine: &'a dyn OcrEngine) -> Self {
        self.ocr = Some(engine);
        self
    }

    /// Stop between pages once the flag is raised.
    pub fn with_cancel_flag(mut self, flag: &'a CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Extract raw (not yet normalized) text from PDF bytes.
    pub async fn extract(&self, data: &[u8]) -> Result<(String, ExtractionReport)> {
        let backend = LopdfBackend::load_bytes(data)?;
        log::debug!("loaded PDF {}", backend.version());
        self.extract_with_backend(&backend, data).await
    }

    /// Extract using an already-loaded backend. `data` is the raw file,
    /// handed to the rasterizer for OCR pages.
    pub async fn extract_with_backend<B>(
        &self,
        backend: &B,
        data: &[u8],
    ) -> Result<(String, ExtractionReport)>
    where
        B: PdfBackend + ?Sized,
    {
        let pages = backend.pages();
        let mut report = ExtractionReport::new(DocumentFormat::Pdf, pages.len() as u32);
        let mut text = String::new();

        for (&page_num, &page_id) in pages.iter() {
            if !self.options.pages.includes(page_num) {
                continue;
            }

            if self.cancel.is_some_and(CancelFlag::is_cancelled) {
                log::info!("extraction cancelled before page {}", page_num);
                return Err(Error::Cancelled);
            }

            let (page_text, outcome) = self.process_page(backend, data, page_num, page_id).await;

            if let PageOutcome::Skipped(reason) = &outcome {
                log::warn!("skipping page {}: {}", page_num, reason);
            }
            if let Some(page_text) = page_text {
                text.push_str(&page_text);
                text.push_str("\n\n");
            }
            report.record(page_num, outcome);
        }

        log::info!(
            "extracted {} of {} pages ({} via OCR, {} skipped)",
            report.pages.len() - report.skipped_pages().len(),
            report.page_count,
            report.ocr_pages().len(),
            report.skipped_pages().len()
        );

        Ok((text, report))
    }

    async fn process_page<B>(
        &self,
        backend: &B,
        data: &[u8],
        page_num: u32,
        page_id: PageId,
    ) -> (Option<String>, PageOutcome)
    where
        B: PdfBackend + ?Sized,
    {
        let runs = match extract_page_runs(backend, page_num, page_id) {
            Ok(runs) => runs,
            Err(e) => {
                return (None, PageOutcome::Skipped(SkipReason::PageError(e.to_string())));
            }
        };
        log::debug!("page {}: {} text runs", page_num, runs.len());

        let embedded = page_text(runs);
        if !self.options.needs_ocr(&embedded) {
            let chars = embedded.chars().count();
            return (Some(embedded), PageOutcome::Embedded { chars });
        }

        log::debug!(
            "page {}: text layer at or below {} characters, trying OCR",
            page_num,
            self.options.ocr_threshold
        );

        match self.ocr_page(data, page_num).await {
            Ok(text) if text.trim().is_empty() => (None, PageOutcome::Skipped(SkipReason::Empty)),
            Ok(text) => {
                let chars = text.chars().count();
                (Some(text), PageOutcome::Ocr { chars })
            }
            Err(reason) => (None, PageOutcome::Skipped(reason)),
        }
    }

    async fn ocr_page(&self, data: &[u8], page_num: u32) -> std::result::Result<String, SkipReason> {
        let engine = self.ocr.ok_or(SkipReason::OcrUnavailable)?;

        let image = self
            .rasterizer
            .render(data, page_num, self.options.ocr_scale)
            .map_err(|e| SkipReason::RenderFailed(e.to_string()))?;

        self.recognize(engine, &image).await.map_err(|e| {
            log::debug!("page {}: {}", page_num, e);
            SkipReason::from_ocr_error(&e)
        })
    }

    /// Run the engine under the per-page budget.
    async fn recognize(&self, engine: &dyn OcrEngine, image: &RasterImage) -> Result<String> {
        let budget = self.options.ocr_timeout;
        tokio::time::timeout(budget, engine.recognize(image))
            .await
            .map_err(|_| Error::OcrTimeout(budget))?
    }
}

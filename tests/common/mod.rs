//! Shared fixtures: in-memory PDFs and fake OCR/rendering services.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arextract::{Error, OcrEngine, PageRasterizer, RasterImage, Result};
use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One positioned string on a page.
pub type Run<'a> = (f32, f32, &'a str);

/// Build a PDF with one content stream per page. Text is written as raw
/// UTF-8 with a font that is not in the page resources, so extraction
/// falls back to plain byte decoding.
pub fn build_pdf(pages: &[Vec<Run<'_>>]) -> Vec<u8> {
    let streams: Vec<Vec<Operation>> = pages
        .iter()
        .map(|runs| {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F9".into(), 12.into()]),
            ];
            for (x, y, text) in runs {
                operations.push(Operation::new(
                    "Tm",
                    vec![
                        1.into(),
                        0.into(),
                        0.into(),
                        1.into(),
                        (*x).into(),
                        (*y).into(),
                    ],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            }
            operations.push(Operation::new("ET", vec![]));
            operations
        })
        .collect();
    build_pdf_from_operations(streams)
}

/// Build a PDF whose pages carry the given content stream operations verbatim.
pub fn build_pdf_from_operations(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::new();

    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Arabic line comfortably above the OCR threshold.
pub const ARABIC_LINE: &str = "هذا نص عربي طويل بما يكفي لتجاوز الحد";

/// Renders every page as a single white pixel.
pub struct WhitePageRasterizer;

impl PageRasterizer for WhitePageRasterizer {
    fn render(&self, _pdf: &[u8], page_number: u32, _scale: f32) -> Result<RasterImage> {
        RasterImage::from_rgba(page_number, 1, 1, vec![255; 4])
    }
}

/// Rasterizer that always fails.
pub struct BrokenRasterizer;

impl PageRasterizer for BrokenRasterizer {
    fn render(&self, _pdf: &[u8], _page_number: u32, _scale: f32) -> Result<RasterImage> {
        Err(Error::Image("renderer unavailable".to_string()))
    }
}

/// Returns a fixed text and counts how often it was asked.
#[derive(Clone)]
pub struct FixedOcr {
    pub text: String,
    pub calls: Arc<AtomicUsize>,
}

impl FixedOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FixedOcr {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn recognize(&self, _image: &RasterImage) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Reports a processing error like the real service does.
pub struct FailingOcr;

#[async_trait]
impl OcrEngine for FailingOcr {
    fn name(&self) -> &str {
        "failing"
    }

    async fn recognize(&self, _image: &RasterImage) -> Result<String> {
        Err(Error::OcrService("Unable to recognize the file type".to_string()))
    }
}

/// Never answers within any sensible budget.
pub struct StalledOcr;

#[async_trait]
impl OcrEngine for StalledOcr {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn recognize(&self, _image: &RasterImage) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("too late".to_string())
    }
}

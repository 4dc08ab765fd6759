//! Rasterization and OCR for pages without a usable text layer.
//!
//! Two seams keep the pipeline testable without a renderer or network:
//! [`PageRasterizer`] turns a PDF page into a [`RasterImage`], and
//! [`OcrEngine`] turns that image into text. The production pair is
//! [`HayroRasterizer`] and [`OcrSpaceClient`].

mod ocr_space;
mod raster;

pub use ocr_space::{
    OcrConfig, OcrSpaceClient, DEFAULT_ENDPOINT, DEFAULT_ENGINE, DEFAULT_LANGUAGE,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use raster::{HayroRasterizer, PageRasterizer};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::RasterImage;

/// Text recognition service.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Recognize the text on one page image.
    ///
    /// Returns [`Error::OcrService`](crate::Error::OcrService) when the
    /// service rejects the image. An empty string means nothing was found.
    async fn recognize(&self, image: &RasterImage) -> Result<String>;
}

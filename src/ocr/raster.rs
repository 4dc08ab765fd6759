//! Page rendering with the pure Rust `hayro` renderer.

use std::sync::Arc;

use hayro::{InterpreterSettings, Pdf, RenderSettings};

use crate::error::{Error, Result};
use crate::model::RasterImage;

/// Renders one PDF page to an RGBA bitmap.
pub trait PageRasterizer: Send + Sync {
    /// Render page `page_number` (1-based) of `pdf` at `scale` times its
    /// natural size.
    fn render(&self, pdf: &[u8], page_number: u32, scale: f32) -> Result<RasterImage>;
}

/// [`PageRasterizer`] backed by `hayro`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HayroRasterizer;

impl HayroRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRasterizer for HayroRasterizer {
    fn render(&self, pdf: &[u8], page_number: u32, scale: f32) -> Result<RasterImage> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::Image(format!("invalid render scale {}", scale)));
        }

        let index = page_number
            .checked_sub(1)
            .ok_or_else(|| Error::Image("page numbers start at 1".to_string()))?
            as usize;

        let pdf = Pdf::new(Arc::new(pdf.to_vec()))
            .map_err(|e| Error::Image(format!("failed to parse PDF: {:?}", e)))?;

        let page = pdf
            .pages()
            .get(index)
            .ok_or_else(|| Error::Image(format!("page {} not found", page_number)))?;

        let media_box = page.media_box();
        if media_box.x1 - media_box.x0 <= 0.0 || media_box.y1 - media_box.y0 <= 0.0 {
            return Err(Error::Image(format!("page {} has an empty media box", page_number)));
        }

        let settings = RenderSettings {
            x_scale: scale,
            y_scale: scale,
            ..Default::default()
        };
        let pixmap = hayro::render(page, &InterpreterSettings::default(), &settings);

        RasterImage::from_rgba(
            page_number,
            u32::from(pixmap.width()),
            u32::from(pixmap.height()),
            pixmap.data_as_u8_slice().to_vec(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_page_zero() {
        let result = HayroRasterizer::new().render(b"%PDF-1.4", 0, 3.0);
        assert!(matches!(result, Err(Error::Image(_))));
    }

    #[test]
    fn test_rejects_bad_scale() {
        let result = HayroRasterizer::new().render(b"%PDF-1.4", 1, 0.0);
        assert!(matches!(result, Err(Error::Image(_))));
    }

    #[test]
    fn test_garbage_is_image_error() {
        let result = HayroRasterizer::new().render(b"not a pdf", 1, 1.0);
        assert!(matches!(result, Err(Error::Image(_))));
    }
}

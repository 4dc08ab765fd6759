//! In-memory page bitmaps used as OCR input.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::{Error, Result};

/// An RGBA8 rendering of one page.
#[derive(Debug, Clone)]
pub struct RasterImage {
    /// Page the bitmap was rendered from (1-based)
    pub page_number: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Row-major RGBA pixels, `width * height * 4` bytes
    pub pixels: Vec<u8>,
}

impl RasterImage {
    /// Wrap raw RGBA pixels, checking the buffer size.
    pub fn from_rgba(page_number: u32, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::Image(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }

        Ok(Self {
            page_number,
            width,
            height,
            pixels,
        })
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
            .ok_or_else(|| Error::Image("pixel buffer does not match dimensions".to_string()))?;

        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| Error::Image(e.to_string()))?;
        Ok(buf.into_inner())
    }
}

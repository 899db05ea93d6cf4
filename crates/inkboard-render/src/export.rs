//! PNG export of a rendered surface.

use image::RgbaImage;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: surface is {0}x{1}")]
    EmptySurface(u32, u32),
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Result of PNG rendering - contains the raw RGBA pixel data and dimensions.
#[derive(Debug, Clone)]
pub struct PngRenderResult {
    /// RGBA pixel data (4 bytes per pixel).
    pub rgba_data: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl PngRenderResult {
    pub fn from_surface(surface: &RgbaImage) -> Self {
        Self {
            rgba_data: surface.as_raw().clone(),
            width: surface.width(),
            height: surface.height(),
        }
    }

    /// Encode the pixels as a PNG file.
    pub fn encode(&self) -> Result<Vec<u8>, ExportError> {
        encode_rgba(&self.rgba_data, self.width, self.height)
    }
}

/// Encode a surface as PNG bytes.
pub fn encode_png(surface: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    encode_rgba(surface.as_raw(), surface.width(), surface.height())
}

fn encode_rgba(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    if width == 0 || height == 0 {
        return Err(ExportError::EmptySurface(width, height));
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(data)?;
        writer.finish()?;
    }
    Ok(png_data)
}

//! Off-thread image decoding.
//!
//! Each request runs on its own worker thread and reports back exactly once
//! over an mpsc channel. Owners drain the channel from the event thread with
//! `poll`; results arrive in completion order, not request order.

use image::RgbaImage;
use inkboard_core::shapes::{Image, ImageFormat};
use inkboard_core::workspace::TabId;
use kurbo::Point;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use thiserror::Error;

/// Image decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("could not start decode worker: {0}")]
    Spawn(String),
}

/// Decode encoded bytes into an RGBA raster.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

fn spawn_worker<T: Send + 'static>(
    name: &str,
    sender: Sender<T>,
    job: impl FnOnce() -> T + Send + 'static,
) -> Result<(), DecodeError> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            // The receiver may be gone if the owner was dropped; nothing to do then.
            let _ = sender.send(job());
        })
        .map(|_| ())
        .map_err(|e| DecodeError::Spawn(e.to_string()))
}

/// Outcome of a cache decode request.
#[derive(Debug)]
pub struct DecodedImage {
    /// Key given with the request.
    pub key: u64,
    pub result: Result<RgbaImage, DecodeError>,
}

/// Decodes embedded image shapes for the renderer's cache.
pub struct ImageDecoder {
    sender: Sender<DecodedImage>,
    receiver: Receiver<DecodedImage>,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDecoder {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Start decoding `bytes`; the result is reported under `key`.
    pub fn request(&self, key: u64, bytes: Vec<u8>) -> Result<(), DecodeError> {
        spawn_worker("inkboard-decode", self.sender.clone(), move || DecodedImage {
            key,
            result: decode_rgba(&bytes),
        })
    }

    /// Drain every finished decode.
    pub fn poll(&self) -> Vec<DecodedImage> {
        self.receiver.try_iter().collect()
    }
}

/// An imported file turned into an image shape for a given tab.
#[derive(Debug)]
pub struct ImportedImage {
    /// Tab that was active when the import started.
    pub tab_id: TabId,
    pub image: Image,
}

/// Outcome of a file import.
#[derive(Debug)]
pub struct ImportResult {
    pub tab_id: TabId,
    pub result: Result<ImportedImage, DecodeError>,
}

/// Turns picked files into image shapes off the event thread.
pub struct ImageImporter {
    sender: Sender<ImportResult>,
    receiver: Receiver<ImportResult>,
}

impl Default for ImageImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageImporter {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    /// Start importing `bytes` into `tab_id`.
    pub fn import(&self, tab_id: TabId, bytes: Vec<u8>) -> Result<(), DecodeError> {
        spawn_worker("inkboard-import", self.sender.clone(), move || {
            let result = build_image(&bytes).map(|image| ImportedImage {
                tab_id: tab_id.clone(),
                image,
            });
            ImportResult { tab_id, result }
        })
    }

    /// Drain every finished import.
    pub fn poll(&self) -> Vec<ImportResult> {
        self.receiver.try_iter().collect()
    }
}

/// Build an image shape at natural size, anchored at the origin.
pub fn build_image(bytes: &[u8]) -> Result<Image, DecodeError> {
    let format = ImageFormat::from_magic_bytes(bytes).ok_or(DecodeError::UnsupportedFormat)?;
    let decoded = decode_rgba(bytes)?;
    let (width, height) = decoded.dimensions();
    Ok(Image::new(Point::ZERO, bytes, width, height, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::encode_png;
    use image::Rgba;
    use std::time::{Duration, Instant};

    fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        encode_png(&img).unwrap()
    }

    fn wait_for<T>(mut poll: impl FnMut() -> Vec<T>) -> Vec<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let items = poll();
            if !items.is_empty() || Instant::now() > deadline {
                return items;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_build_image_reads_dimensions() {
        let image = build_image(&sample_png()).unwrap();
        assert_eq!((image.source_width, image.source_height), (3, 2));
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!(image.position, Point::ZERO);
    }

    #[test]
    fn test_build_image_rejects_unknown_bytes() {
        assert!(matches!(build_image(b"not an image"), Err(DecodeError::UnsupportedFormat)));
    }

    #[test]
    fn test_decoder_reports_by_key() {
        let decoder = ImageDecoder::new();
        decoder.request(42, sample_png()).unwrap();

        let done = wait_for(|| decoder.poll());
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].key, 42);
        assert_eq!(done[0].result.as_ref().unwrap().dimensions(), (3, 2));
    }

    #[test]
    fn test_decoder_reports_failures() {
        let decoder = ImageDecoder::new();
        decoder.request(7, vec![0x89, 0x50, 0x4E, 0x47, 0, 0]).unwrap();

        let done = wait_for(|| decoder.poll());
        assert!(done[0].result.is_err());
    }

    #[test]
    fn test_importer_keeps_tab_id() {
        let importer = ImageImporter::new();
        let tab = TabId("tab-a".to_string());
        importer.import(tab.clone(), sample_png()).unwrap();

        let done = wait_for(|| importer.poll());
        assert_eq!(done[0].tab_id, tab);
        let imported = done[0].result.as_ref().unwrap();
        assert_eq!(imported.tab_id, tab);
        assert_eq!(imported.image.source_width, 3);
    }
}

//! CPU raster renderer implementation.

use crate::decode::ImageDecoder;
use crate::export::PngRenderResult;
use crate::raster::{self, Layer};
use crate::renderer::{RenderContext, Renderer};
use crate::text::GlyphFont;
use image::RgbaImage;
use inkboard_core::shapes::{Freehand, Image, Shape, Text};
use kurbo::{Affine, BezPath, Point, Rect, Shape as KurboShape};
use peniko::Color;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

const PLACEHOLDER_FILL: Color = Color::from_rgba8(200, 200, 200, 255);
const PLACEHOLDER_CROSS: Color = Color::from_rgba8(150, 150, 150, 255);
const PLACEHOLDER_BORDER: Color = Color::from_rgba8(100, 100, 100, 255);

enum CachedImage {
    Pending,
    Ready(RgbaImage),
    Failed,
}

/// Renderer that draws into an in-memory RGBA surface.
pub struct RasterRenderer {
    surface: RgbaImage,
    font: Option<GlyphFont>,
    warned_missing_font: bool,
    decoder: ImageDecoder,
    /// Decoded images keyed by a hash of their encoded data.
    image_cache: HashMap<u64, CachedImage>,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterRenderer {
    /// Renderer using the bundled font for text.
    pub fn new() -> Self {
        let font = match GlyphFont::bundled() {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        };
        Self {
            surface: RgbaImage::new(1, 1),
            font,
            warned_missing_font: false,
            decoder: ImageDecoder::new(),
            image_cache: HashMap::new(),
        }
    }

    pub fn with_font(mut self, font: Option<GlyphFont>) -> Self {
        self.font = font;
        self
    }

    pub fn font(&self) -> Option<&GlyphFont> {
        self.font.as_ref()
    }

    /// The surface as of the last `build_scene`.
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    pub fn to_png_result(&self) -> PngRenderResult {
        PngRenderResult::from_surface(&self.surface)
    }

    /// Collect finished decodes. Returns true when a redraw would show something new.
    pub fn poll_images(&mut self) -> bool {
        let done = self.decoder.poll();
        let mut changed = false;
        for decoded in done {
            // Dropped from the document while decoding.
            let Some(slot) = self.image_cache.get_mut(&decoded.key) else {
                continue;
            };
            *slot = match decoded.result {
                Ok(rgba) => CachedImage::Ready(rgba),
                Err(e) => {
                    log::warn!("Image decode failed: {}", e);
                    CachedImage::Failed
                }
            };
            changed = true;
        }
        changed
    }

    /// Whether any image is still being decoded.
    pub fn has_pending_images(&self) -> bool {
        self.image_cache
            .values()
            .any(|entry| matches!(entry, CachedImage::Pending))
    }

    fn render_shape(&mut self, layer: &mut Layer, shape: &Shape, transform: Affine) {
        match shape {
            Shape::Rectangle(_) | Shape::Circle(_) | Shape::Triangle(_) => {
                let path = shape.to_path();
                let style = shape.style();
                if shape.is_filled() {
                    layer.fill(&path, style.color());
                } else {
                    layer.stroke(&path, style.stroke_width, style.color());
                }
            }
            Shape::Freehand(stroke) => render_freehand(layer, stroke),
            Shape::Text(text) => self.render_text(layer, text),
            Shape::Image(image) => {
                layer.flush_onto(&mut self.surface);
                self.render_image(layer, image, transform);
            }
        }
    }

    fn render_text(&mut self, layer: &mut Layer, text: &Text) {
        let Some(font) = &self.font else {
            if !self.warned_missing_font {
                log::warn!("No font loaded; text shapes are not drawn");
                self.warned_missing_font = true;
            }
            return;
        };
        let outline = font.outline_path(&text.content, text.baseline(), text.font_size);
        layer.fill(&outline, text.style.color());
    }

    fn render_image(&mut self, layer: &mut Layer, image: &Image, transform: Affine) {
        let key = image_key(image);

        match self.image_cache.get(&key) {
            Some(CachedImage::Ready(rgba)) => {
                let dest = transform.transform_rect_bbox(image.as_rect());
                raster::draw_image(&mut self.surface, rgba, dest);
            }
            Some(CachedImage::Failed) => render_image_placeholder(layer, image.as_rect()),
            Some(CachedImage::Pending) => {}
            None => {
                let entry = match image.data() {
                    Some(bytes) => match self.decoder.request(key, bytes) {
                        Ok(()) => CachedImage::Pending,
                        Err(e) => {
                            log::warn!("{}", e);
                            CachedImage::Failed
                        }
                    },
                    None => {
                        log::warn!("Image data for {:x} is not valid base64", key);
                        CachedImage::Failed
                    }
                };
                if matches!(entry, CachedImage::Failed) {
                    render_image_placeholder(layer, image.as_rect());
                }
                self.image_cache.insert(key, entry);
            }
        }
    }
}

fn render_freehand(layer: &mut Layer, stroke: &Freehand) {
    if stroke.points.len() < 2 {
        return;
    }
    let mut path = BezPath::new();
    path.move_to(stroke.points[0]);
    for p in &stroke.points[1..] {
        path.line_to(*p);
    }
    let color = stroke.style.color().multiply_alpha(stroke.pen.opacity() as f32);
    layer.stroke(&path, stroke.style.stroke_width, color);
}

/// Gray box with an X, drawn for images that couldn't be decoded.
fn render_image_placeholder(layer: &mut Layer, dest: Rect) {
    let rect_path = dest.to_path(0.1);
    layer.fill(&rect_path, PLACEHOLDER_FILL);

    let mut x_path = BezPath::new();
    x_path.move_to(Point::new(dest.x0, dest.y0));
    x_path.line_to(Point::new(dest.x1, dest.y1));
    x_path.move_to(Point::new(dest.x1, dest.y0));
    x_path.line_to(Point::new(dest.x0, dest.y1));
    layer.stroke(&x_path, 2.0, PLACEHOLDER_CROSS);
    layer.stroke(&rect_path, 2.0, PLACEHOLDER_BORDER);
}

fn image_key(image: &Image) -> u64 {
    let mut hasher = DefaultHasher::new();
    image.data_base64.hash(&mut hasher);
    hasher.finish()
}

impl Renderer for RasterRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let width = (ctx.viewport_size.width.ceil().max(0.0) as u32).max(1);
        let height = (ctx.viewport_size.height.ceil().max(0.0) as u32).max(1);
        let background = self.background_color(ctx);
        self.surface = raster::cleared(width, height, background);

        let camera_transform = ctx.camera.transform();
        let mut layer = Layer::new(width, height);
        layer.set_transform(camera_transform);

        // Draw all shapes in z-order
        let mut seen = HashSet::new();
        for shape in ctx.document.shapes() {
            if let Shape::Image(image) = shape {
                seen.insert(image_key(image));
            }
            self.render_shape(&mut layer, shape, camera_transform);
        }
        layer.flush_onto(&mut self.surface);

        // Images no longer in the document, including undecided ones.
        self.image_cache.retain(|key, _| seen.contains(key));
    }
}

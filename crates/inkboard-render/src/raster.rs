//! Drawing onto the RGBA surface.
//!
//! Vector paths are recorded into a [`Layer`] backed by a `vello_cpu`
//! context and rasterized when the layer is flushed. Bitmaps are composited
//! with `image`, so the layer is flushed before each one to keep z-order.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, Cap, Join, Rect, Stroke};
use peniko::Color;
use vello_cpu::{Pixmap, RenderContext};

/// Recorded vector drawing for one surface-sized pass.
pub struct Layer {
    ctx: RenderContext,
    transform: Affine,
    width: u16,
    height: u16,
    dirty: bool,
}

impl Layer {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.clamp(1, u16::MAX as u32) as u16;
        let height = height.clamp(1, u16::MAX as u32) as u16;
        Self {
            ctx: RenderContext::new(width, height),
            transform: Affine::IDENTITY,
            width,
            height,
            dirty: false,
        }
    }

    /// Transform applied to everything drawn after this call.
    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
        self.ctx.set_transform(transform);
    }

    /// Fill `path` with the nonzero rule.
    pub fn fill(&mut self, path: &BezPath, color: Color) {
        self.ctx.set_paint(color);
        self.ctx.fill_path(path);
        self.dirty = true;
    }

    /// Stroke `path` with round caps and joins. `width` is in path units.
    pub fn stroke(&mut self, path: &BezPath, width: f64, color: Color) {
        if width <= 0.0 {
            return;
        }
        self.ctx
            .set_stroke(Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round));
        self.ctx.set_paint(color);
        self.ctx.stroke_path(path);
        self.dirty = true;
    }

    /// Rasterize what was recorded, composite it over `target`, and start over.
    pub fn flush_onto(&mut self, target: &mut RgbaImage) {
        if !self.dirty {
            return;
        }
        let mut pixmap = Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        let layer = to_straight_rgba(&pixmap, self.width as u32, self.height as u32);
        imageops::overlay(target, &layer, 0, 0);

        self.ctx = RenderContext::new(self.width, self.height);
        self.ctx.set_transform(self.transform);
        self.dirty = false;
    }
}

/// Surface filled with one color.
pub fn cleared(width: u32, height: u32, color: Color) -> RgbaImage {
    let rgba = color.to_rgba8();
    RgbaImage::from_pixel(width, height, Rgba([rgba.r, rgba.g, rgba.b, rgba.a]))
}

/// Composite `src` scaled into `dest` (surface coordinates) with nearest sampling.
///
/// Only the part of `src` that lands on the surface is scaled.
pub fn draw_image(target: &mut RgbaImage, src: &RgbaImage, dest: Rect) {
    let (src_w, src_h) = src.dimensions();
    let dest = dest.round();
    let bounds = Rect::new(0.0, 0.0, target.width() as f64, target.height() as f64);
    let visible = dest.intersect(bounds);
    if src_w == 0 || src_h == 0 || visible.width() < 1.0 || visible.height() < 1.0 {
        return;
    }

    let scale_x = src_w as f64 / dest.width();
    let scale_y = src_h as f64 / dest.height();
    let x0 = (((visible.x0 - dest.x0) * scale_x).floor() as u32).min(src_w - 1);
    let y0 = (((visible.y0 - dest.y0) * scale_y).floor() as u32).min(src_h - 1);
    let x1 = (((visible.x1 - dest.x0) * scale_x).ceil() as u32).clamp(x0 + 1, src_w);
    let y1 = (((visible.y1 - dest.y0) * scale_y).ceil() as u32).clamp(y0 + 1, src_h);

    let part = imageops::crop_imm(src, x0, y0, x1 - x0, y1 - y0);
    let scaled = imageops::resize(
        &*part,
        visible.width() as u32,
        visible.height() as u32,
        FilterType::Nearest,
    );
    imageops::overlay(target, &scaled, visible.x0 as i64, visible.y0 as i64);
}

/// Convert the pixmap's premultiplied bytes to straight RGBA.
fn to_straight_rgba(pixmap: &Pixmap, width: u32, height: u32) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(pixmap.data_as_u8_slice().chunks_exact(4)) {
        let a = src[3] as u16;
        if a == 0 {
            continue;
        }
        let unpremultiply = |c: u8| ((c as u16 * 255 + a / 2) / a).min(255) as u8;
        *dst = Rgba([unpremultiply(src[0]), unpremultiply(src[1]), unpremultiply(src[2]), src[3]]);
    }
    out
}

//! Text measurement and glyph drawing.

use crate::renderer::{RenderResult, RendererError};
use ab_glyph::{Font, FontArc, OutlineCurve, PxScale, ScaleFont};
use inkboard_core::shapes::TextMeasure;
use kurbo::{BezPath, Point};
use std::path::Path;

/// Average advance used when no font is available, in ems.
pub const APPROXIMATE_ADVANCE_EM: f64 = 0.6;

/// Fonts tried, in order, when none is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Fixed-width estimate: every character advances 0.6 em.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMetrics;

impl TextMeasure for ApproximateMetrics {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * APPROXIMATE_ADVANCE_EM
    }
}

/// A loaded outline font.
#[derive(Clone)]
pub struct GlyphFont {
    font: FontArc,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont").finish_non_exhaustive()
    }
}

impl GlyphFont {
    /// Parse a TrueType/OpenType font from memory.
    pub fn from_bytes(data: Vec<u8>) -> RenderResult<Self> {
        let font = FontArc::try_from_vec(data).map_err(|e| RendererError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    /// Load a font file.
    pub fn load(path: &Path) -> RenderResult<Self> {
        let data = std::fs::read(path)
            .map_err(|e| RendererError::Font(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(data)
    }

    /// The sans face shipped with egui, compiled into the binary.
    pub fn bundled() -> RenderResult<Self> {
        let font = FontArc::try_from_slice(epaint_default_fonts::UBUNTU_LIGHT)
            .map_err(|e| RendererError::Font(format!("bundled font: {}", e)))?;
        Ok(Self { font })
    }

    /// First font found among common system locations, else [`GlyphFont::bundled`].
    pub fn system_default() -> RenderResult<Self> {
        match Self::find_system() {
            Some(font) => Ok(font),
            None => {
                log::info!("No system font found; using the bundled face");
                Self::bundled()
            }
        }
    }

    fn find_system() -> Option<Self> {
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(Path::new)
            .filter(|path| path.exists())
            .find_map(|path| match Self::load(path) {
                Ok(font) => {
                    log::info!("Using font {}", path.display());
                    Some(font)
                }
                Err(e) => {
                    log::debug!("Skipping font: {}", e);
                    None
                }
            })
    }

    /// Outline of a single line of text with its baseline starting at `origin`.
    ///
    /// Glyph curves are scaled to `px_size` and flipped to y-down.
    pub fn outline_path(&self, text: &str, origin: Point, px_size: f64) -> BezPath {
        let mut path = BezPath::new();
        if px_size <= 0.0 {
            return path;
        }
        let scaled = self.font.as_scaled(PxScale::from(px_size as f32));
        let factor = scaled.scale_factor();

        let mut caret = 0.0f32;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let pen_x = caret;
            caret += scaled.h_advance(id);
            previous = Some(id);

            let Some(outline) = self.font.outline(id) else {
                continue;
            };
            let to_px = |p: ab_glyph::Point| {
                Point::new(
                    origin.x + (pen_x + p.x * factor.horizontal) as f64,
                    origin.y - (p.y * factor.vertical) as f64,
                )
            };
            let mut last: Option<Point> = None;
            for curve in &outline.curves {
                let (start, end) = match curve {
                    OutlineCurve::Line(a, b) | OutlineCurve::Quad(a, _, b) | OutlineCurve::Cubic(a, _, _, b) => {
                        (to_px(*a), to_px(*b))
                    }
                };
                if last.is_none_or(|p| p.distance(start) > 1e-6) {
                    path.move_to(start);
                }
                match curve {
                    OutlineCurve::Line(..) => path.line_to(end),
                    OutlineCurve::Quad(_, c, _) => path.quad_to(to_px(*c), end),
                    OutlineCurve::Cubic(_, c1, c2, _) => path.curve_to(to_px(*c1), to_px(*c2), end),
                }
                last = Some(end);
            }
        }
        path
    }
}

impl TextMeasure for GlyphFont {
    fn measure(&self, text: &str, font_size: f64) -> f64 {
        let scaled = self.font.as_scaled(PxScale::from(font_size as f32));
        let mut width = 0.0f32;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width as f64
    }
}

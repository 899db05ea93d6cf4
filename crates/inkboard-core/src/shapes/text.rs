//! Text shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, frame_contains, frame_rect};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Default font size in pixels.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Measures the advance width of a string, provided by the rendering engine.
pub trait TextMeasure {
    /// Width of `text` laid out on a single line at `font_size` pixels.
    fn measure(&self, text: &str, font_size: f64) -> f64;
}

/// A single line of text.
///
/// `position` is the top-left corner; the baseline sits at `position.y + height`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub(crate) id: ShapeId,
    pub position: Point,
    /// The text content.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Measured width at `font_size`.
    pub width: f64,
    /// Line height, equal to the font size.
    pub height: f64,
    pub style: ShapeStyle,
}

impl Text {
    /// Create a text shape measured with `measure`.
    pub fn new(position: Point, content: String, font_size: f64, measure: &dyn TextMeasure) -> Self {
        let width = measure.measure(&content, font_size);
        Self {
            id: ShapeId::default(),
            position,
            content,
            font_size,
            width,
            height: font_size,
            style: ShapeStyle::default(),
        }
    }

    /// Baseline origin used when drawing.
    pub fn baseline(&self) -> Point {
        Point::new(self.position.x, self.position.y + self.height)
    }
}

impl ShapeTrait for Text {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        frame_rect(self.position, self.width, self.height)
    }

    fn contains(&self, point: Point) -> bool {
        frame_contains(self.position, self.width, self.height, point)
    }

    fn to_path(&self) -> BezPath {
        // Glyphs are drawn by the renderer; the path is the layout box.
        self.bounds().to_path(0.1)
    }

    fn style(&self) -> &ShapeStyle {
        &self.style
    }

    fn style_mut(&mut self) -> &mut ShapeStyle {
        &mut self.style
    }

    fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedAdvance(f64);

    impl TextMeasure for FixedAdvance {
        fn measure(&self, text: &str, font_size: f64) -> f64 {
            text.chars().count() as f64 * font_size * self.0
        }
    }

    #[test]
    fn test_text_measured_on_creation() {
        let text = Text::new(Point::new(5.0, 5.0), "abcd".into(), 20.0, &FixedAdvance(0.5));
        assert!((text.width - 40.0).abs() < f64::EPSILON);
        assert!((text.height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_baseline() {
        let text = Text::new(Point::new(5.0, 5.0), "x".into(), 12.0, &FixedAdvance(0.5));
        assert_eq!(text.baseline(), Point::new(5.0, 17.0));
    }
}

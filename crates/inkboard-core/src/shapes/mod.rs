//! Shape definitions for the whiteboard.

mod circle;
mod freehand;
mod image;
mod rectangle;
mod text;
mod triangle;

pub use circle::Circle;
pub use freehand::{Freehand, PenKind};
pub use image::{Image, ImageFormat};
pub use rectangle::Rectangle;
pub use text::{DEFAULT_FONT_SIZE, Text, TextMeasure};
pub use triangle::Triangle;

use kurbo::{BezPath, Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. Returns `None` for anything else.
    pub fn parse_hex(color: &str) -> Option<Self> {
        if color == "transparent" {
            return Some(Self::transparent());
        }
        let hex = color.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Style properties shared by every shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Stroke and fill color.
    pub color: SerializableColor,
    /// Stroke width in document units.
    pub stroke_width: f64,
}

impl ShapeStyle {
    pub fn new(color: SerializableColor, stroke_width: f64) -> Self {
        Self {
            color,
            stroke_width,
        }
    }

    /// Get the color as a peniko Color.
    pub fn color(&self) -> Color {
        self.color.into()
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: SerializableColor::black(),
            stroke_width: 5.0,
        }
    }
}

/// Identifier of a shape. Unique within its document only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rectangle spanned by a position and a possibly negative size, normalized.
pub(crate) fn frame_rect(position: Point, width: f64, height: f64) -> Rect {
    Rect::new(
        position.x,
        position.y,
        position.x + width,
        position.y + height,
    )
    .abs()
}

/// Raw `[x, x+width] × [y, y+height]` containment, no normalization.
pub(crate) fn frame_contains(position: Point, width: f64, height: f64, point: Point) -> bool {
    point.x >= position.x
        && point.x <= position.x + width
        && point.y >= position.y
        && point.y <= position.y + height
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the identifier.
    fn id(&self) -> ShapeId;

    /// Get the normalized bounding box in document coordinates.
    fn bounds(&self) -> Rect;

    /// Bounding-box containment test on the stored position and size.
    fn contains(&self, point: Point) -> bool;

    /// Get the outline for rendering, in document coordinates.
    fn to_path(&self) -> BezPath;

    /// Get the style.
    fn style(&self) -> &ShapeStyle;

    /// Get mutable style.
    fn style_mut(&mut self) -> &mut ShapeStyle;

    /// Move the shape by a delta.
    fn translate(&mut self, delta: Vec2);
}

/// Enum wrapper for all shape types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Rectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Text(Text),
    Image(Image),
    Freehand(Freehand),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Rectangle(s) => s.id(),
            Shape::Circle(s) => s.id(),
            Shape::Triangle(s) => s.id(),
            Shape::Text(s) => s.id(),
            Shape::Image(s) => s.id(),
            Shape::Freehand(s) => s.id(),
        }
    }

    pub(crate) fn set_id(&mut self, id: ShapeId) {
        match self {
            Shape::Rectangle(s) => s.id = id,
            Shape::Circle(s) => s.id = id,
            Shape::Triangle(s) => s.id = id,
            Shape::Text(s) => s.id = id,
            Shape::Image(s) => s.id = id,
            Shape::Freehand(s) => s.id = id,
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rectangle(s) => s.bounds(),
            Shape::Circle(s) => s.bounds(),
            Shape::Triangle(s) => s.bounds(),
            Shape::Text(s) => s.bounds(),
            Shape::Image(s) => s.bounds(),
            Shape::Freehand(s) => s.bounds(),
        }
    }

    /// Bounds with negative sizes folded in; what rendering and hit tests see.
    pub fn normalized_bounds(&self) -> Rect {
        self.bounds()
    }

    pub fn contains(&self, point: Point) -> bool {
        match self {
            Shape::Rectangle(s) => s.contains(point),
            Shape::Circle(s) => s.contains(point),
            Shape::Triangle(s) => s.contains(point),
            Shape::Text(s) => s.contains(point),
            Shape::Image(s) => s.contains(point),
            Shape::Freehand(s) => s.contains(point),
        }
    }

    pub fn to_path(&self) -> BezPath {
        match self {
            Shape::Rectangle(s) => s.to_path(),
            Shape::Circle(s) => s.to_path(),
            Shape::Triangle(s) => s.to_path(),
            Shape::Text(s) => s.to_path(),
            Shape::Image(s) => s.to_path(),
            Shape::Freehand(s) => s.to_path(),
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style(),
            Shape::Circle(s) => s.style(),
            Shape::Triangle(s) => s.style(),
            Shape::Text(s) => s.style(),
            Shape::Image(s) => s.style(),
            Shape::Freehand(s) => s.style(),
        }
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        match self {
            Shape::Rectangle(s) => s.style_mut(),
            Shape::Circle(s) => s.style_mut(),
            Shape::Triangle(s) => s.style_mut(),
            Shape::Text(s) => s.style_mut(),
            Shape::Image(s) => s.style_mut(),
            Shape::Freehand(s) => s.style_mut(),
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        match self {
            Shape::Rectangle(s) => s.translate(delta),
            Shape::Circle(s) => s.translate(delta),
            Shape::Triangle(s) => s.translate(delta),
            Shape::Text(s) => s.translate(delta),
            Shape::Image(s) => s.translate(delta),
            Shape::Freehand(s) => s.translate(delta),
        }
    }

    /// Top-left corner as stored (not normalized).
    pub fn position(&self) -> Point {
        match self {
            Shape::Rectangle(s) => s.position,
            Shape::Circle(s) => s.position,
            Shape::Triangle(s) => s.position,
            Shape::Text(s) => s.position,
            Shape::Image(s) => s.position,
            Shape::Freehand(s) => s.position,
        }
    }

    /// Stored `(width, height)`, possibly negative during creation.
    pub fn size(&self) -> (f64, f64) {
        match self {
            Shape::Rectangle(s) => (s.width, s.height),
            Shape::Circle(s) => (s.width, s.height),
            Shape::Triangle(s) => (s.width, s.height),
            Shape::Text(s) => (s.width, s.height),
            Shape::Image(s) => (s.width, s.height),
            Shape::Freehand(s) => (s.width, s.height),
        }
    }

    /// Set the stored size. Has no effect on freehand strokes, whose size follows their points.
    pub fn set_size(&mut self, width: f64, height: f64) {
        match self {
            Shape::Rectangle(s) => (s.width, s.height) = (width, height),
            Shape::Circle(s) => (s.width, s.height) = (width, height),
            Shape::Triangle(s) => (s.width, s.height) = (width, height),
            Shape::Text(s) => (s.width, s.height) = (width, height),
            Shape::Image(s) => (s.width, s.height) = (width, height),
            Shape::Freehand(_) => {}
        }
    }

    /// Move the origin to `position`, carrying any owned geometry along.
    pub fn set_position(&mut self, position: Point) {
        let delta = position - self.position();
        self.translate(delta);
    }

    /// Fold a negative width/height into the position so the size is non-negative.
    pub fn normalize(&mut self) {
        let rect = self.bounds();
        match self {
            Shape::Freehand(s) => s.refresh_bounds(),
            _ => {
                let delta = Point::new(rect.x0, rect.y0) - self.position();
                self.translate(delta);
                self.set_size(rect.width(), rect.height());
            }
        }
    }

    /// Short lowercase name of the variant.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rectangle(_) => "rectangle",
            Shape::Circle(_) => "circle",
            Shape::Triangle(_) => "triangle",
            Shape::Text(_) => "text",
            Shape::Image(_) => "image",
            Shape::Freehand(_) => "freehand",
        }
    }

    /// Whether the outline is filled rather than stroked.
    pub fn is_filled(&self) -> bool {
        match self {
            Shape::Rectangle(s) => s.filled,
            Shape::Circle(s) => s.filled,
            Shape::Triangle(s) => s.filled,
            Shape::Text(_) | Shape::Image(_) | Shape::Freehand(_) => false,
        }
    }

    pub fn as_freehand(&self) -> Option<&Freehand> {
        match self {
            Shape::Freehand(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_freehand_mut(&mut self) -> Option<&mut Freehand> {
        match self {
            Shape::Freehand(f) => Some(f),
            _ => None,
        }
    }
}

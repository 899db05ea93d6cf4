//! Circle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, frame_contains, frame_rect};
use kurbo::{BezPath, Circle as KurboCircle, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// A circle inscribed along the width of its bounding box.
///
/// The radius is half the normalized width and the circle is centered in the
/// box; the height only contributes to hit testing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub(crate) id: ShapeId,
    /// Top-left corner of the bounding box.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub filled: bool,
    pub style: ShapeStyle,
}

impl Circle {
    /// Create a new circle from its bounding box.
    pub fn new(position: Point, width: f64, height: f64, filled: bool) -> Self {
        Self {
            id: ShapeId::default(),
            position,
            width,
            height,
            filled,
            style: ShapeStyle::default(),
        }
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn radius(&self) -> f64 {
        self.width.abs() / 2.0
    }

    pub fn as_kurbo(&self) -> KurboCircle {
        KurboCircle::new(self.center(), self.radius())
    }
}

impl ShapeTrait for Circle {
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
        self.as_kurbo().to_path(0.1)
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

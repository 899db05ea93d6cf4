//! Triangle shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, frame_contains, frame_rect};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An isosceles triangle with its apex at the top-middle of its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub(crate) id: ShapeId,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub filled: bool,
    pub style: ShapeStyle,
}

impl Triangle {
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

    /// Apex, bottom-left and bottom-right corners of the normalized box.
    pub fn vertices(&self) -> [Point; 3] {
        let rect = self.bounds();
        [
            Point::new(rect.x0 + rect.width() / 2.0, rect.y0),
            Point::new(rect.x0, rect.y1),
            Point::new(rect.x1, rect.y1),
        ]
    }
}

impl ShapeTrait for Triangle {
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
        let [apex, left, right] = self.vertices();
        let mut path = BezPath::new();
        path.move_to(apex);
        path.line_to(left);
        path.line_to(right);
        path.close_path();
        path
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

//! Freehand drawing shape.

use super::{ShapeId, ShapeStyle, ShapeTrait, frame_contains, frame_rect};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Pen category used for a freehand stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenKind {
    #[default]
    Pencil,
    Pen,
    Highlighter,
    Brush,
}

impl PenKind {
    /// Stroke opacity for this pen.
    pub fn opacity(&self) -> f64 {
        match self {
            PenKind::Highlighter => 0.5,
            PenKind::Pencil | PenKind::Pen | PenKind::Brush => 1.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PenKind::Pencil => "Pencil",
            PenKind::Pen => "Pen",
            PenKind::Highlighter => "Highlighter",
            PenKind::Brush => "Brush",
        }
    }
}

/// A freehand drawing (series of points in document space).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub(crate) id: ShapeId,
    /// Top-left of the point bounds as of the last refresh.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Points in the freehand path.
    pub points: Vec<Point>,
    pub pen: PenKind,
    pub style: ShapeStyle,
}

impl Freehand {
    /// Start a stroke with a single point.
    pub fn new(start: Point, pen: PenKind) -> Self {
        Self {
            id: ShapeId::default(),
            position: start,
            width: 0.0,
            height: 0.0,
            points: vec![start],
            pen,
            style: ShapeStyle::default(),
        }
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>, pen: PenKind) -> Self {
        let mut freehand = Self {
            id: ShapeId::default(),
            position: points.first().copied().unwrap_or(Point::ZERO),
            width: 0.0,
            height: 0.0,
            points,
            pen,
            style: ShapeStyle::default(),
        };
        freehand.refresh_bounds();
        freehand
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Recompute position and size from the points. Keeps the old frame when empty.
    pub fn refresh_bounds(&mut self) {
        let Some(first) = self.points.first() else {
            return;
        };
        let rect = self
            .points
            .iter()
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p));
        self.position = Point::new(rect.x0, rect.y0);
        self.width = rect.width();
        self.height = rect.height();
    }

    /// Drop every point within `radius` of `center`. Returns how many were removed.
    pub fn erase_within(&mut self, center: Point, radius: f64) -> usize {
        let before = self.points.len();
        self.points.retain(|p| p.distance(center) > radius);
        before - self.points.len()
    }
}

impl ShapeTrait for Freehand {
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
        let mut path = BezPath::new();

        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };

        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }

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
        for point in &mut self.points {
            *point += delta;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freehand_creation() {
        let freehand = Freehand::new(Point::new(3.0, 4.0), PenKind::Brush);
        assert_eq!(freehand.len(), 1);
        assert_eq!(freehand.position, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_add_points() {
        let mut freehand = Freehand::new(Point::ZERO, PenKind::Pen);
        freehand.add_point(Point::new(10.0, 10.0));
        assert_eq!(freehand.len(), 2);
    }

    #[test]
    fn test_refresh_bounds() {
        let freehand = Freehand::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(50.0, 100.0),
            ],
            PenKind::Pencil,
        );

        let bounds = freehand.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds_kept_when_emptied() {
        let mut freehand = Freehand::from_points(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            PenKind::Pen,
        );
        freehand.points.clear();
        freehand.refresh_bounds();
        assert!((freehand.width - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_erase_within_is_inclusive() {
        let mut freehand = Freehand::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(3.0, 4.0),
                Point::new(6.0, 8.0),
            ],
            PenKind::Pen,
        );
        let removed = freehand.erase_within(Point::ZERO, 5.0);
        assert_eq!(removed, 2);
        assert_eq!(freehand.points, vec![Point::new(6.0, 8.0)]);
    }

    #[test]
    fn test_empty_path() {
        let freehand = Freehand::from_points(Vec::new(), PenKind::Pen);
        assert!(freehand.is_empty());
        assert!(freehand.to_path().elements().is_empty());
    }

    #[test]
    fn test_highlighter_opacity() {
        assert!((PenKind::Highlighter.opacity() - 0.5).abs() < f64::EPSILON);
        assert!((PenKind::Pen.opacity() - 1.0).abs() < f64::EPSILON);
    }
}

//! Tool system for the whiteboard.

use crate::shapes::{
    Circle, DEFAULT_FONT_SIZE, Freehand, PenKind, Rectangle, SerializableColor, Shape, ShapeId,
    ShapeStyle, Triangle,
};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    Move,
    #[default]
    Pencil,
    Pen,
    Highlighter,
    Brush,
    Eraser,
    Rectangle,
    Circle,
    Triangle,
    Text,
}

impl ToolKind {
    /// Every tool, in toolbar order.
    pub const ALL: [ToolKind; 10] = [
        ToolKind::Move,
        ToolKind::Pencil,
        ToolKind::Pen,
        ToolKind::Highlighter,
        ToolKind::Brush,
        ToolKind::Eraser,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Triangle,
        ToolKind::Text,
    ];

    /// Pen used by a freehand tool, `None` for every other tool.
    pub fn pen_kind(&self) -> Option<PenKind> {
        match self {
            ToolKind::Pencil => Some(PenKind::Pencil),
            ToolKind::Pen => Some(PenKind::Pen),
            ToolKind::Highlighter => Some(PenKind::Highlighter),
            ToolKind::Brush => Some(PenKind::Brush),
            _ => None,
        }
    }

    /// Whether the tool creates a box-shaped primitive by dragging.
    pub fn is_shape_tool(&self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Circle | ToolKind::Triangle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Move => "Move",
            ToolKind::Pencil => "Pencil",
            ToolKind::Pen => "Pen",
            ToolKind::Highlighter => "Highlighter",
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Triangle => "Triangle",
            ToolKind::Text => "Text",
        }
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ToolState {
    /// Tool is idle, waiting for interaction.
    #[default]
    Idle,
    /// Resizing a freshly created primitive.
    CreatingShape { shape_id: ShapeId },
    /// Appending points to a freehand stroke.
    DrawingFreehand { shape_id: ShapeId },
    /// Moving an existing shape; `grab_offset` is pointer minus shape origin.
    DraggingShape { shape_id: ShapeId, grab_offset: Vec2 },
    /// Panning the view; `last_screen` is the previous pointer position in screen space.
    Panning { last_screen: Point },
    Erasing,
    /// Waiting for text to be committed at `anchor` (document space).
    TextPending { anchor: Point },
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current state of the tool.
    pub state: ToolState,
    /// Current style to apply to new shapes. The stroke width doubles as the brush size.
    pub current_style: ShapeStyle,
    /// Whether new primitives are filled.
    pub filled: bool,
    /// Font size for new text.
    pub font_size: f64,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            current_style: ShapeStyle::default(),
            filled: false,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = ToolState::Idle;
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.current_style.color = color;
    }

    pub fn brush_size(&self) -> f64 {
        self.current_style.stroke_width
    }

    pub fn set_brush_size(&mut self, size: f64) {
        self.current_style.stroke_width = size.max(1.0);
    }

    /// Check whether a pointer session is open.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle | ToolState::TextPending { .. })
    }

    /// Pending text anchor, if the text tool is waiting for input.
    pub fn text_anchor(&self) -> Option<Point> {
        match self.state {
            ToolState::TextPending { anchor } => Some(anchor),
            _ => None,
        }
    }

    /// Build the zero-size primitive the current shape tool starts with.
    pub fn new_primitive(&self, origin: Point) -> Option<Shape> {
        let mut shape = match self.current_tool {
            ToolKind::Rectangle => Shape::Rectangle(Rectangle::new(origin, 0.0, 0.0, self.filled)),
            ToolKind::Circle => Shape::Circle(Circle::new(origin, 0.0, 0.0, self.filled)),
            ToolKind::Triangle => Shape::Triangle(Triangle::new(origin, 0.0, 0.0, self.filled)),
            _ => return None,
        };
        *shape.style_mut() = self.current_style.clone();
        Some(shape)
    }

    /// Build the one-point stroke the current pen tool starts with.
    pub fn new_stroke(&self, start: Point) -> Option<Shape> {
        let pen = self.current_tool.pen_kind()?;
        let mut stroke = Freehand::new(start, pen);
        stroke.style = self.current_style.clone();
        Some(Shape::Freehand(stroke))
    }
}

//! Canvas document and state management.

use crate::camera::Camera;
use crate::input::PointerEvent;
use crate::shapes::{Image, Shape, ShapeId, Text, TextMeasure};
use crate::tools::{ToolKind, ToolManager, ToolState};
use crate::workspace::{TabId, Workspace, WorkspaceError};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Maximum number of undone shapes kept for redo.
pub const MAX_REDO_HISTORY: usize = 50;

/// A canvas document: one tab's ordered shapes.
///
/// Append order is the z-order (back to front).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Unique document identifier.
    pub id: TabId,
    /// Document name, shown on the tab.
    pub name: String,
    shapes: Vec<Shape>,
    #[serde(default)]
    next_shape_id: u64,
    /// Undone shapes, most recent last.
    #[serde(skip)]
    redo_stack: Vec<Shape>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::with_name("Untitled")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            id: TabId::generate(),
            name: name.into(),
            shapes: Vec::new(),
            next_shape_id: 1,
            redo_stack: Vec::new(),
        }
    }

    /// Shapes in z-order (back to front).
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Append a shape, assigning it a fresh id. Clears the redo stack.
    pub fn add_shape(&mut self, mut shape: Shape) -> ShapeId {
        let id = ShapeId(self.next_shape_id);
        self.next_shape_id += 1;
        shape.set_id(id);
        self.shapes.push(shape);
        self.redo_stack.clear();
        id
    }

    /// Get a shape by ID.
    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_shape_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    /// Topmost shape whose frame contains `point`.
    pub fn topmost_at(&self, point: Point) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.contains(point))
            .map(Shape::id)
    }

    /// Remove every freehand point within `radius` of `point`; returns the number removed.
    ///
    /// Strokes that lose points get their bounds refreshed. Emptied strokes are kept.
    pub fn erase_at(&mut self, point: Point, radius: f64) -> usize {
        let mut removed = 0;
        for stroke in self.shapes.iter_mut().filter_map(Shape::as_freehand_mut) {
            let n = stroke.erase_within(point, radius);
            if n > 0 {
                stroke.refresh_bounds();
                removed += n;
            }
        }
        removed
    }

    /// Pop the last shape onto the redo stack.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(shape) = self.shapes.pop() else {
            return false;
        };
        self.redo_stack.push(shape);
        if self.redo_stack.len() > MAX_REDO_HISTORY {
            self.redo_stack.remove(0);
        }
        true
    }

    /// Re-append the most recently undone shape, keeping its id.
    pub fn redo(&mut self) -> bool {
        let Some(shape) = self.redo_stack.pop() else {
            return false;
        };
        self.shapes.push(shape);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.shapes.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop all shapes and the redo history.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.redo_stack.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, WorkspaceError> {
        let mut document: CanvasDocument = serde_json::from_str(json)?;
        document.repair_ids()?;
        Ok(document)
    }

    /// Reject duplicate shape ids and move the id allocator past every loaded id.
    pub(crate) fn repair_ids(&mut self) -> Result<(), WorkspaceError> {
        let mut seen = HashSet::new();
        for shape in &self.shapes {
            if !seen.insert(shape.id()) {
                return Err(WorkspaceError::Invalid(format!(
                    "duplicate shape id {} in {}",
                    shape.id(),
                    self.id
                )));
            }
        }
        let max = self.shapes.iter().map(|s| s.id().0).max().unwrap_or(0);
        self.next_shape_id = self.next_shape_id.max(max + 1);
        Ok(())
    }
}

/// The canvas: open documents plus view and interaction state.
#[derive(Debug, Clone)]
pub struct Canvas {
    workspace: Workspace,
    /// Camera for view transform.
    pub camera: Camera,
    /// Tool manager.
    pub tool_manager: ToolManager,
    /// Viewport size in screen pixels.
    pub viewport_size: Size,
    revision: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with a fresh workspace.
    pub fn new() -> Self {
        Self::with_workspace(Workspace::new())
    }

    /// Create a canvas over an existing workspace.
    pub fn with_workspace(workspace: Workspace) -> Self {
        Self {
            workspace,
            camera: Camera::new(),
            tool_manager: ToolManager::new(),
            viewport_size: Size::new(800.0, 600.0),
            revision: 0,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn document(&self) -> &CanvasDocument {
        self.workspace.active_document()
    }

    /// Monotonic counter bumped on every visible change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Set the viewport size.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        let size = Size::new(width, height);
        if size != self.viewport_size {
            self.viewport_size = size;
            self.touch();
        }
    }

    /// Set the current tool, closing any open session.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool_manager.set_tool(tool);
    }

    pub fn zoom_in(&mut self) {
        self.camera.zoom_in();
        self.touch();
    }

    pub fn zoom_out(&mut self) {
        self.camera.zoom_out();
        self.touch();
    }

    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.camera.zoom_at(screen_point, factor);
        self.touch();
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.touch();
    }

    // --- Tabs ---

    pub fn add_tab(&mut self) -> TabId {
        self.tool_manager.state = ToolState::Idle;
        let id = self.workspace.add_tab();
        self.touch();
        id
    }

    pub fn remove_tab(&mut self, id: &TabId) -> Result<CanvasDocument, WorkspaceError> {
        let removed = self.workspace.remove_tab(id)?;
        self.tool_manager.state = ToolState::Idle;
        self.touch();
        Ok(removed)
    }

    /// Select another tab. Any open session ends, since shape ids are per document.
    pub fn switch_tab(&mut self, id: &TabId) -> Result<(), WorkspaceError> {
        self.workspace.switch_tab(id)?;
        self.tool_manager.state = ToolState::Idle;
        self.touch();
        Ok(())
    }

    pub fn rename_tab(&mut self, id: &TabId, name: impl Into<String>) -> Result<(), WorkspaceError> {
        self.workspace.rename_tab(id, name)?;
        self.touch();
        Ok(())
    }

    /// Replace the whole workspace, e.g. after loading from storage.
    pub fn replace_workspace(&mut self, workspace: Workspace) {
        self.workspace = workspace;
        self.tool_manager.state = ToolState::Idle;
        self.touch();
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        let done = self.workspace.active_document_mut().undo();
        if done {
            self.touch();
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.workspace.active_document_mut().redo();
        if done {
            self.touch();
        }
        done
    }

    /// Clear the active document.
    pub fn clear(&mut self) {
        self.workspace.active_document_mut().clear();
        self.tool_manager.state = ToolState::Idle;
        self.touch();
    }

    // --- Pointer state machine ---

    /// Dispatch a pointer event in screen coordinates.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } | PointerEvent::Leave => self.pointer_up(),
        }
    }

    pub fn pointer_down(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);
        let tool = self.tool_manager.current_tool;

        let state = match tool {
            ToolKind::Rectangle | ToolKind::Circle | ToolKind::Triangle => {
                let Some(shape) = self.tool_manager.new_primitive(world) else {
                    return;
                };
                let shape_id = self.workspace.active_document_mut().add_shape(shape);
                ToolState::CreatingShape { shape_id }
            }
            ToolKind::Pencil | ToolKind::Pen | ToolKind::Highlighter | ToolKind::Brush => {
                let Some(stroke) = self.tool_manager.new_stroke(world) else {
                    return;
                };
                let shape_id = self.workspace.active_document_mut().add_shape(stroke);
                ToolState::DrawingFreehand { shape_id }
            }
            ToolKind::Move => {
                let document = self.workspace.active_document();
                match document.topmost_at(world).and_then(|id| document.get_shape(id)) {
                    Some(shape) => ToolState::DraggingShape {
                        shape_id: shape.id(),
                        grab_offset: world - shape.position(),
                    },
                    None => ToolState::Panning {
                        last_screen: screen,
                    },
                }
            }
            ToolKind::Eraser => {
                self.erase(world);
                ToolState::Erasing
            }
            ToolKind::Text => ToolState::TextPending { anchor: world },
        };

        log::trace!("pointer down with {:?} -> {:?}", tool, state);
        self.tool_manager.state = state;
        self.touch();
    }

    pub fn pointer_move(&mut self, screen: Point) {
        let world = self.camera.screen_to_world(screen);

        match self.tool_manager.state {
            ToolState::CreatingShape { shape_id } => {
                let Some(shape) = self.workspace.active_document_mut().get_shape_mut(shape_id) else {
                    return;
                };
                let delta = world - shape.position();
                shape.set_size(delta.x, delta.y);
            }
            ToolState::DrawingFreehand { shape_id } => {
                let Some(stroke) = self
                    .workspace
                    .active_document_mut()
                    .get_shape_mut(shape_id)
                    .and_then(Shape::as_freehand_mut)
                else {
                    return;
                };
                stroke.add_point(world);
            }
            ToolState::DraggingShape {
                shape_id,
                grab_offset,
            } => {
                let Some(shape) = self.workspace.active_document_mut().get_shape_mut(shape_id) else {
                    return;
                };
                shape.set_position(world - grab_offset);
            }
            ToolState::Panning { last_screen } => {
                self.camera.pan(screen - last_screen);
                self.tool_manager.state = ToolState::Panning {
                    last_screen: screen,
                };
            }
            ToolState::Erasing => self.erase(world),
            ToolState::Idle | ToolState::TextPending { .. } => return,
        }

        self.touch();
    }

    /// End the open pointer session (pointer released or left the surface).
    pub fn pointer_up(&mut self) {
        match self.tool_manager.state {
            ToolState::CreatingShape { shape_id } | ToolState::DrawingFreehand { shape_id } => {
                if let Some(shape) = self.workspace.active_document_mut().get_shape_mut(shape_id) {
                    shape.normalize();
                }
            }
            ToolState::TextPending { .. } => return,
            ToolState::Idle => return,
            ToolState::DraggingShape { .. } | ToolState::Panning { .. } | ToolState::Erasing => {}
        }
        self.tool_manager.state = ToolState::Idle;
        self.touch();
    }

    fn erase(&mut self, world: Point) {
        let radius = self.tool_manager.brush_size() / self.camera.zoom;
        let removed = self.workspace.active_document_mut().erase_at(world, radius);
        if removed > 0 {
            log::trace!("erased {} points", removed);
        }
    }

    // --- Explicit inserts ---

    /// Insert text at the pending anchor. Empty content or no anchor is a no-op.
    pub fn commit_text(&mut self, content: &str, measure: &dyn TextMeasure) -> Option<ShapeId> {
        let Some(anchor) = self.tool_manager.text_anchor() else {
            log::debug!("commit_text without a pending anchor");
            return None;
        };
        if content.trim().is_empty() {
            log::debug!("Ignoring empty text");
            return None;
        }

        let mut text = Text::new(anchor, content.to_string(), self.tool_manager.font_size, measure);
        text.style.color = self.tool_manager.current_style.color;
        let id = self.workspace.active_document_mut().add_shape(Shape::Text(text));

        self.tool_manager.state = ToolState::Idle;
        self.touch();
        Some(id)
    }

    /// Drop the pending text anchor without inserting anything.
    pub fn cancel_text(&mut self) {
        if self.tool_manager.text_anchor().is_some() {
            self.tool_manager.state = ToolState::Idle;
        }
    }

    /// Insert a decoded image into `tab_id`, anchored at the origin.
    ///
    /// Completions for tabs that were closed in the meantime are dropped.
    pub fn insert_image(&mut self, tab_id: &TabId, mut image: Image) -> Option<ShapeId> {
        let Some(document) = self.workspace.document_mut(tab_id) else {
            log::debug!("Dropping image for closed tab {}", tab_id);
            return None;
        };
        image.position = Point::ZERO;
        let id = document.add_shape(Shape::Image(image));
        self.touch();
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Freehand, ImageFormat, PenKind, Rectangle};
    use kurbo::Vec2;

    struct HalfEm;

    impl TextMeasure for HalfEm {
        fn measure(&self, text: &str, font_size: f64) -> f64 {
            text.chars().count() as f64 * font_size * 0.5
        }
    }

    fn down(canvas: &mut Canvas, x: f64, y: f64) {
        canvas.handle_pointer(PointerEvent::Down {
            position: Point::new(x, y),
        });
    }

    fn move_to(canvas: &mut Canvas, x: f64, y: f64) {
        canvas.handle_pointer(PointerEvent::Move {
            position: Point::new(x, y),
        });
    }

    fn up(canvas: &mut Canvas, x: f64, y: f64) {
        canvas.handle_pointer(PointerEvent::Up {
            position: Point::new(x, y),
        });
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Shape {
        Shape::Rectangle(Rectangle::new(Point::new(x, y), w, h, false))
    }

    #[test]
    fn test_document_creation() {
        let doc = CanvasDocument::new();
        assert!(doc.is_empty());
        assert_eq!(doc.name, "Untitled");
    }

    #[test]
    fn test_add_shape_allocates_ids() {
        let mut doc = CanvasDocument::new();
        let a = doc.add_shape(rect(0.0, 0.0, 1.0, 1.0));
        let b = doc.add_shape(rect(0.0, 0.0, 1.0, 1.0));
        assert_ne!(a, b);
        assert_eq!(doc.len(), 2);
        assert!(doc.get_shape(a).is_some());
    }

    #[test]
    fn test_topmost_at() {
        let mut doc = CanvasDocument::new();
        let below = doc.add_shape(rect(0.0, 0.0, 100.0, 100.0));
        let above = doc.add_shape(rect(50.0, 50.0, 100.0, 100.0));

        assert_eq!(doc.topmost_at(Point::new(75.0, 75.0)), Some(above));
        assert_eq!(doc.topmost_at(Point::new(10.0, 10.0)), Some(below));
        assert_eq!(doc.topmost_at(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_undo_restores_previous_sequence() {
        let mut doc = CanvasDocument::new();
        doc.add_shape(rect(0.0, 0.0, 10.0, 10.0));
        let before = doc.shapes().to_vec();

        doc.add_shape(rect(5.0, 5.0, 10.0, 10.0));
        assert!(doc.undo());
        assert_eq!(doc.shapes(), before.as_slice());
    }

    #[test]
    fn test_redo_restores_same_id() {
        let mut doc = CanvasDocument::new();
        let id = doc.add_shape(rect(0.0, 0.0, 10.0, 10.0));
        doc.undo();
        assert!(doc.can_redo());
        assert!(doc.redo());
        assert_eq!(doc.shapes()[0].id(), id);
        assert!(!doc.redo());
    }

    #[test]
    fn test_add_clears_redo() {
        let mut doc = CanvasDocument::new();
        doc.add_shape(rect(0.0, 0.0, 10.0, 10.0));
        doc.undo();
        doc.add_shape(rect(1.0, 1.0, 10.0, 10.0));
        assert!(!doc.can_redo());
    }

    #[test]
    fn test_redo_history_is_bounded() {
        let mut doc = CanvasDocument::new();
        for i in 0..(MAX_REDO_HISTORY + 10) {
            doc.add_shape(rect(i as f64, 0.0, 1.0, 1.0));
        }
        while doc.undo() {}
        let mut redone = 0;
        while doc.redo() {
            redone += 1;
        }
        assert_eq!(redone, MAX_REDO_HISTORY);
    }

    #[test]
    fn test_undo_empty_document() {
        let mut doc = CanvasDocument::new();
        assert!(!doc.undo());
        assert!(!doc.redo());
    }

    #[test]
    fn test_clear_drops_redo() {
        let mut doc = CanvasDocument::new();
        doc.add_shape(rect(0.0, 0.0, 1.0, 1.0));
        doc.add_shape(rect(0.0, 0.0, 1.0, 1.0));
        doc.undo();
        doc.clear();
        assert!(doc.is_empty());
        assert!(!doc.can_redo());
    }

    #[test]
    fn test_erase_at_removes_points_within_radius() {
        let mut doc = CanvasDocument::new();
        let stroke = Freehand::from_points(
            vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(20.0, 0.0)],
            PenKind::Pen,
        );
        let id = doc.add_shape(Shape::Freehand(stroke));

        assert_eq!(doc.erase_at(Point::new(0.0, 0.0), 4.0), 2);
        let stroke = doc.get_shape(id).and_then(Shape::as_freehand).unwrap();
        assert_eq!(stroke.points, vec![Point::new(20.0, 0.0)]);
        assert_eq!(stroke.position, Point::new(20.0, 0.0));

        assert_eq!(doc.erase_at(Point::new(20.0, 0.0), 0.5), 1);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_erase_at_covers_every_stroke_and_skips_other_shapes() {
        let mut doc = CanvasDocument::new();
        let first = doc.add_shape(Shape::Freehand(Freehand::from_points(
            vec![Point::new(10.0, 10.0), Point::new(12.0, 10.0), Point::new(50.0, 50.0)],
            PenKind::Pencil,
        )));
        let boxed = doc.add_shape(rect(0.0, 0.0, 30.0, 30.0));
        let second = doc.add_shape(Shape::Freehand(Freehand::from_points(
            vec![Point::new(11.0, 12.0), Point::new(80.0, 80.0)],
            PenKind::Brush,
        )));
        let rect_before = doc.get_shape(boxed).unwrap().clone();

        assert_eq!(doc.erase_at(Point::new(11.0, 11.0), 3.0), 3);

        let first = doc.get_shape(first).and_then(Shape::as_freehand).unwrap();
        assert_eq!(first.points, vec![Point::new(50.0, 50.0)]);
        let second = doc.get_shape(second).and_then(Shape::as_freehand).unwrap();
        assert_eq!(second.points, vec![Point::new(80.0, 80.0)]);
        assert_eq!(doc.get_shape(boxed), Some(&rect_before));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_document_json_moves_id_allocator() {
        let mut doc = CanvasDocument::new();
        doc.add_shape(rect(0.0, 0.0, 1.0, 1.0));
        let last = doc.add_shape(rect(0.0, 0.0, 1.0, 1.0));

        let mut value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("next_shape_id");
        let mut restored = CanvasDocument::from_json(&value.to_string()).unwrap();

        let fresh = restored.add_shape(rect(0.0, 0.0, 1.0, 1.0));
        assert!(fresh.0 > last.0);
    }

    #[test]
    fn test_draw_rectangle() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Rectangle);

        down(&mut canvas, 10.0, 10.0);
        move_to(&mut canvas, 60.0, 30.0);
        move_to(&mut canvas, 110.0, 60.0);
        up(&mut canvas, 110.0, 60.0);

        let shape = &canvas.document().shapes()[0];
        assert_eq!(shape.kind_name(), "rectangle");
        assert_eq!(shape.position(), Point::new(10.0, 10.0));
        assert_eq!(shape.size(), (100.0, 50.0));
        assert!(!shape.is_filled());
        assert_eq!(canvas.tool_manager.state, ToolState::Idle);
    }

    #[test]
    fn test_reverse_drag_is_normalized_on_up() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Circle);

        down(&mut canvas, 100.0, 80.0);
        move_to(&mut canvas, 40.0, 20.0);

        // Raw negative size while the session is open.
        assert_eq!(canvas.document().shapes()[0].size(), (-60.0, -60.0));

        canvas.handle_pointer(PointerEvent::Leave);
        let shape = &canvas.document().shapes()[0];
        assert_eq!(shape.position(), Point::new(40.0, 20.0));
        assert_eq!(shape.size(), (60.0, 60.0));
    }

    #[test]
    fn test_draw_uses_world_coordinates() {
        let mut canvas = Canvas::new();
        canvas.camera.set_zoom(2.0);
        canvas.set_tool(ToolKind::Pen);

        down(&mut canvas, 200.0, 100.0);
        move_to(&mut canvas, 220.0, 140.0);
        up(&mut canvas, 220.0, 140.0);

        let stroke = canvas.document().shapes()[0].as_freehand().unwrap();
        assert_eq!(stroke.pen, PenKind::Pen);
        assert_eq!(stroke.points, vec![Point::new(100.0, 50.0), Point::new(110.0, 70.0)]);
        assert!((stroke.width - 10.0).abs() < f64::EPSILON);
        assert!((stroke.height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_new_shapes_take_current_style() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.tool_manager.filled = true;
        canvas.tool_manager.set_brush_size(12.0);

        down(&mut canvas, 0.0, 0.0);
        up(&mut canvas, 0.0, 0.0);

        let shape = &canvas.document().shapes()[0];
        assert!(shape.is_filled());
        assert!((shape.style().stroke_width - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_move_drags_topmost_shape() {
        let mut canvas = Canvas::new();
        canvas.workspace.active_document_mut().add_shape(rect(0.0, 0.0, 100.0, 100.0));
        let top = canvas
            .workspace
            .active_document_mut()
            .add_shape(rect(50.0, 50.0, 100.0, 100.0));
        canvas.set_tool(ToolKind::Move);

        down(&mut canvas, 60.0, 60.0);
        move_to(&mut canvas, 70.0, 90.0);
        up(&mut canvas, 70.0, 90.0);

        let moved = canvas.document().get_shape(top).unwrap();
        assert_eq!(moved.position(), Point::new(60.0, 80.0));
        assert_eq!(canvas.document().shapes()[0].position(), Point::ZERO);
    }

    #[test]
    fn test_move_carries_freehand_points() {
        let mut canvas = Canvas::new();
        let stroke = Freehand::from_points(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)],
            PenKind::Pencil,
        );
        let id = canvas
            .workspace
            .active_document_mut()
            .add_shape(Shape::Freehand(stroke));
        canvas.set_tool(ToolKind::Move);

        down(&mut canvas, 5.0, 5.0);
        move_to(&mut canvas, 15.0, 25.0);
        up(&mut canvas, 15.0, 25.0);

        let stroke = canvas.document().get_shape(id).and_then(Shape::as_freehand).unwrap();
        assert_eq!(stroke.points, vec![Point::new(10.0, 20.0), Point::new(20.0, 30.0)]);
    }

    #[test]
    fn test_move_on_empty_canvas_pans() {
        let mut canvas = Canvas::new();
        canvas.camera.set_zoom(2.0);
        canvas.set_tool(ToolKind::Move);

        down(&mut canvas, 100.0, 100.0);
        move_to(&mut canvas, 130.0, 90.0);
        move_to(&mut canvas, 140.0, 100.0);
        up(&mut canvas, 140.0, 100.0);

        assert_eq!(canvas.camera.offset, Vec2::new(40.0, 0.0));
        assert!(canvas.document().is_empty());
    }

    #[test]
    fn test_eraser_uses_zoomed_radius() {
        let mut canvas = Canvas::new();
        let stroke = Freehand::from_points(
            vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0), Point::new(4.0, 0.0)],
            PenKind::Pen,
        );
        let id = canvas
            .workspace
            .active_document_mut()
            .add_shape(Shape::Freehand(stroke));
        canvas.camera.set_zoom(2.0);
        canvas.tool_manager.set_brush_size(5.0);
        canvas.set_tool(ToolKind::Eraser);

        // Screen (0,0) is world (0,0); radius is 2.5 in world units.
        down(&mut canvas, 0.0, 0.0);
        let stroke = canvas.document().get_shape(id).and_then(Shape::as_freehand).unwrap();
        assert_eq!(stroke.points, vec![Point::new(4.0, 0.0)]);

        move_to(&mut canvas, 8.0, 0.0);
        up(&mut canvas, 8.0, 0.0);
        let stroke = canvas.document().get_shape(id).and_then(Shape::as_freehand).unwrap();
        assert!(stroke.is_empty());
        assert_eq!(canvas.document().len(), 1);
    }

    #[test]
    fn test_text_pending_survives_up() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Text);
        canvas.tool_manager.font_size = 20.0;

        down(&mut canvas, 30.0, 40.0);
        up(&mut canvas, 30.0, 40.0);
        assert_eq!(canvas.tool_manager.text_anchor(), Some(Point::new(30.0, 40.0)));

        let id = canvas.commit_text("Hi", &HalfEm).unwrap();
        let shape = canvas.document().get_shape(id).unwrap();
        assert_eq!(shape.position(), Point::new(30.0, 40.0));
        assert_eq!(shape.size(), (20.0, 20.0));
        assert_eq!(canvas.tool_manager.text_anchor(), None);
    }

    #[test]
    fn test_commit_empty_text_is_noop() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Text);
        down(&mut canvas, 0.0, 0.0);

        assert!(canvas.commit_text("   ", &HalfEm).is_none());
        assert!(canvas.document().is_empty());

        canvas.set_tool(ToolKind::Pencil);
        assert!(canvas.commit_text("late", &HalfEm).is_none());
    }

    #[test]
    fn test_undo_during_session_makes_moves_noop() {
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Rectangle);
        down(&mut canvas, 0.0, 0.0);
        assert!(canvas.undo());

        move_to(&mut canvas, 50.0, 50.0);
        up(&mut canvas, 50.0, 50.0);
        assert!(canvas.document().is_empty());
        assert_eq!(canvas.tool_manager.state, ToolState::Idle);
    }

    #[test]
    fn test_tabs_keep_their_shapes() {
        let mut canvas = Canvas::new();
        let a = canvas.workspace().active_id().clone();
        canvas.set_tool(ToolKind::Rectangle);
        down(&mut canvas, 0.0, 0.0);
        move_to(&mut canvas, 10.0, 10.0);
        up(&mut canvas, 10.0, 10.0);

        let b = canvas.add_tab();
        for i in 0..3 {
            let x = i as f64 * 20.0;
            down(&mut canvas, x, 0.0);
            move_to(&mut canvas, x + 10.0, 10.0);
            up(&mut canvas, x + 10.0, 10.0);
        }

        assert_eq!(canvas.workspace().document(&a).unwrap().len(), 1);
        assert_eq!(canvas.workspace().document(&b).unwrap().len(), 3);
    }

    #[test]
    fn test_switch_tab_ends_session() {
        let mut canvas = Canvas::new();
        let a = canvas.workspace().active_id().clone();
        canvas.add_tab();
        canvas.set_tool(ToolKind::Pen);
        down(&mut canvas, 0.0, 0.0);

        canvas.switch_tab(&a).unwrap();
        move_to(&mut canvas, 10.0, 10.0);
        assert!(canvas.document().is_empty());
        assert_eq!(canvas.tool_manager.state, ToolState::Idle);
    }

    #[test]
    fn test_insert_image_into_closed_tab_is_noop() {
        let mut canvas = Canvas::new();
        let doomed = canvas.add_tab();
        canvas.remove_tab(&doomed).unwrap();

        let image = Image::new(Point::new(5.0, 5.0), &[1, 2, 3], 4, 4, ImageFormat::Png);
        assert!(canvas.insert_image(&doomed, image).is_none());
        assert!(canvas.document().is_empty());
    }

    #[test]
    fn test_insert_image_anchors_at_origin() {
        let mut canvas = Canvas::new();
        let target = canvas.workspace().active_id().clone();
        canvas.add_tab();

        let image = Image::new(Point::new(5.0, 5.0), &[1, 2, 3], 4, 4, ImageFormat::Png);
        let id = canvas.insert_image(&target, image).unwrap();

        // Lands in the tab it was imported from, not the active one.
        let doc = canvas.workspace().document(&target).unwrap();
        assert_eq!(doc.get_shape(id).unwrap().position(), Point::ZERO);
        assert!(canvas.document().is_empty());
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut canvas = Canvas::new();
        let start = canvas.revision();
        canvas.set_tool(ToolKind::Pencil);
        down(&mut canvas, 0.0, 0.0);
        assert!(canvas.revision() > start);

        let after_down = canvas.revision();
        canvas.set_tool(ToolKind::Text);
        move_to(&mut canvas, 5.0, 5.0);
        assert_eq!(canvas.revision(), after_down);
    }
}

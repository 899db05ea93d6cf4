//! Renderer trait abstraction.

use inkboard_core::camera::Camera;
use inkboard_core::canvas::{Canvas, CanvasDocument};
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Font load failed: {0}")]
    Font(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Default surface background.
pub const DEFAULT_BACKGROUND: Color = Color::WHITE;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The document to render (the active tab).
    pub document: &'a CanvasDocument,
    pub camera: &'a Camera,
    /// Viewport size in egui points, mapped 1:1 to surface pixels.
    pub viewport_size: Size,
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    /// Create a render context for the canvas's active document.
    pub fn new(canvas: &'a Canvas) -> Self {
        Self {
            document: canvas.document(),
            camera: &canvas.camera,
            viewport_size: canvas.viewport_size,
            background_color: DEFAULT_BACKGROUND,
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_viewport_size(mut self, size: Size) -> Self {
        self.viewport_size = size;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Draw a whole frame for `ctx`.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

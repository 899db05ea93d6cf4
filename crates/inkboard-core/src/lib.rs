//! Inkboard Core Library
//!
//! Platform-agnostic data structures and interaction logic for the Inkboard whiteboard.

pub mod camera;
pub mod canvas;
pub mod input;
pub mod shapes;
pub mod storage;
pub mod tools;
pub mod workspace;

pub use camera::Camera;
pub use canvas::{Canvas, CanvasDocument};
pub use input::PointerEvent;
pub use shapes::{Shape, ShapeId, ShapeStyle, TextMeasure};
pub use tools::{ToolKind, ToolManager, ToolState};
pub use workspace::{TabId, Workspace, WorkspaceError};

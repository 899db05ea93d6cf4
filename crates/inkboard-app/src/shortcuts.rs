//! Keyboard shortcut registry.

use egui::{Event, Key, Modifiers};
use inkboard_core::tools::ToolKind;

use crate::ui::UiAction;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: Key,
    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub command: bool,
    pub shift: bool,
    pub action: UiAction,
    pub description: &'static str,
}

impl Shortcut {
    pub fn new(key: Key, command: bool, shift: bool, action: UiAction, description: &'static str) -> Self {
        Self {
            key,
            command,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key.name());
        parts.join("+")
    }

    fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key && self.command == modifiers.command && self.shift == modifiers.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        let tool = |key, kind: ToolKind| Shortcut::new(key, false, false, UiAction::SetTool(kind), kind.name());
        vec![
            tool(Key::V, ToolKind::Move),
            tool(Key::P, ToolKind::Pencil),
            tool(Key::N, ToolKind::Pen),
            tool(Key::H, ToolKind::Highlighter),
            tool(Key::B, ToolKind::Brush),
            tool(Key::E, ToolKind::Eraser),
            tool(Key::R, ToolKind::Rectangle),
            tool(Key::C, ToolKind::Circle),
            tool(Key::G, ToolKind::Triangle),
            tool(Key::T, ToolKind::Text),
            Shortcut::new(Key::Z, true, false, UiAction::Undo, "Undo"),
            Shortcut::new(Key::Z, true, true, UiAction::Redo, "Redo"),
            Shortcut::new(Key::Y, true, false, UiAction::Redo, "Redo"),
            Shortcut::new(Key::S, true, false, UiAction::SaveBoard, "Save board"),
            Shortcut::new(Key::E, true, false, UiAction::ExportPng, "Export to PNG"),
            Shortcut::new(Key::O, true, false, UiAction::ImportImage, "Import image..."),
            Shortcut::new(Key::T, true, false, UiAction::AddTab, "New tab"),
            Shortcut::new(Key::Equals, true, false, UiAction::ZoomIn, "Zoom in"),
            Shortcut::new(Key::Plus, true, false, UiAction::ZoomIn, "Zoom in"),
            Shortcut::new(Key::Minus, true, false, UiAction::ZoomOut, "Zoom out"),
            Shortcut::new(Key::Num0, true, false, UiAction::ZoomReset, "Reset zoom"),
            Shortcut::new(Key::Escape, false, false, UiAction::CancelText, "Cancel text"),
        ]
    }

    /// Actions for the key presses in `events`, in order.
    pub fn actions_for(events: &[Event]) -> Vec<UiAction> {
        let shortcuts = Self::all();
        events
            .iter()
            .filter_map(|event| match event {
                Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    modifiers,
                    ..
                } => shortcuts
                    .iter()
                    .find(|s| s.matches(*key, *modifiers))
                    .map(|s| s.action.clone()),
                _ => None,
            })
            .collect()
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

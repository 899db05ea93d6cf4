//! Inkboard Application
//!
//! The desktop shell: an eframe window around the canvas, with toolbar, tabs,
//! file dialogs and the image generation client.

mod app;
mod config;
mod event_handler;
pub mod generate;
mod shortcuts;
mod ui;

pub use app::App;
pub use config::{AppConfig, ConfigError};
pub use event_handler::EventHandler;
pub use generate::{GenerateError, GenerationClient, GenerationStatus};
pub use shortcuts::{Shortcut, ShortcutRegistry};
pub use ui::{UiAction, UiState, render_ui};

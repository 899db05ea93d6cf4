//! Core application state and lifecycle.

use egui::{Color32, ColorImage, Pos2, Rect, Sense, TextureHandle, TextureOptions};
use inkboard_core::camera::Camera;
use inkboard_core::canvas::Canvas;
use inkboard_core::shapes::TextMeasure;
use inkboard_core::storage::{FileStorage, LAST_WORKSPACE_KEY, Storage};
use inkboard_render::{
    ApproximateMetrics, GlyphFont, ImageImporter, RasterRenderer, RenderContext, Renderer,
    encode_png,
};
use kurbo::{Point, Size};
use peniko::Color;
use std::time::Duration;

use crate::config::AppConfig;
use crate::event_handler::{EventHandler, scroll_zoom_factor};
use crate::generate::GenerationClient;
use crate::shortcuts::ShortcutRegistry;
use crate::ui::{UiAction, UiState, render_ui, to_shape_color};

/// How often to wake up while background work is outstanding.
const BACKGROUND_POLL: Duration = Duration::from_millis(50);

mod file_ops {
    /// Pick an image file and read it.
    pub fn pick_image() -> Option<Vec<u8>> {
        let path = rfd::FileDialog::new()
            .set_title("Add Image")
            .add_filter("Image", &["png", "jpg", "jpeg", "webp"])
            .pick_file()?;

        match std::fs::read(&path) {
            Ok(bytes) => {
                log::info!("Read image {:?} ({} bytes)", path, bytes.len());
                Some(bytes)
            }
            Err(e) => {
                log::error!("Failed to read image: {}", e);
                None
            }
        }
    }

    /// Export PNG to file using native file dialog.
    pub fn export_png(png_data: &[u8]) {
        let dialog = rfd::FileDialog::new()
            .set_title("Export PNG")
            .set_file_name("whiteboard.png")
            .add_filter("PNG Image", &["png"]);

        let Some(path) = dialog.save_file() else {
            log::warn!("Export cancelled");
            return;
        };
        if let Err(e) = std::fs::write(&path, png_data) {
            log::error!("Failed to write PNG: {}", e);
        } else {
            log::info!("Exported PNG to: {:?}", path);
        }
    }
}

/// What the canvas texture was last drawn from.
#[derive(Debug, Clone, PartialEq)]
struct DrawnFrame {
    revision: u64,
    camera: Camera,
    size: Size,
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    background: Color,
    canvas: Canvas,
    renderer: RasterRenderer,
    importer: ImageImporter,
    generation: GenerationClient,
    storage: Option<Box<dyn Storage>>,
    event_handler: EventHandler,
    ui_state: UiState,
    texture: Option<TextureHandle>,
    drawn: Option<DrawnFrame>,
    pending_imports: usize,
}

impl App {
    /// Build the app from config, opening the board directory it names.
    pub fn new(config: AppConfig) -> Self {
        let storage = match &config.storage_dir {
            Some(dir) => FileStorage::new(dir.clone()),
            None => FileStorage::default_location(),
        };
        let storage: Option<Box<dyn Storage>> = match storage {
            Ok(storage) => {
                log::info!("Boards stored in {}", storage.base_path().display());
                Some(Box::new(storage))
            }
            Err(e) => {
                log::warn!("Local storage unavailable: {}", e);
                None
            }
        };

        let font = match &config.font_path {
            Some(path) => GlyphFont::load(path).or_else(|e| {
                log::warn!("{}; trying system fonts", e);
                GlyphFont::system_default()
            }),
            None => GlyphFont::system_default(),
        };
        let font = match font {
            Ok(font) => Some(font),
            Err(e) => {
                log::warn!("{}; text will not be drawn", e);
                None
            }
        };

        let mut app = Self::with_storage(config, storage);
        app.renderer = RasterRenderer::new().with_font(font);
        app.restore_board();
        app
    }

    /// Build the app over an explicit storage backend.
    pub fn with_storage(config: AppConfig, storage: Option<Box<dyn Storage>>) -> Self {
        let background = config.background().unwrap_or_else(|e| {
            log::warn!("{}", e);
            inkboard_render::DEFAULT_BACKGROUND
        });
        let generation = GenerationClient::new(config.generation_endpoint.clone());
        Self {
            config,
            background,
            canvas: Canvas::new(),
            renderer: RasterRenderer::new(),
            importer: ImageImporter::new(),
            generation,
            storage,
            event_handler: EventHandler::new(),
            ui_state: UiState::default(),
            texture: None,
            drawn: None,
            pending_imports: 0,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Load the last saved workspace, if any.
    pub fn restore_board(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };
        match pollster::block_on(storage.exists(LAST_WORKSPACE_KEY)) {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                log::warn!("Could not check for a saved board: {}", e);
                return;
            }
        }
        match pollster::block_on(storage.load(LAST_WORKSPACE_KEY)) {
            Ok(workspace) => {
                log::info!("Restored {} tab(s)", workspace.len());
                self.canvas.replace_workspace(workspace);
            }
            Err(e) => log::warn!("Could not restore board: {}", e),
        }
    }

    /// Persist the whole workspace under the last-board key.
    pub fn save_board(&self) {
        let Some(storage) = &self.storage else {
            log::warn!("No storage configured; board not saved");
            return;
        };
        match pollster::block_on(storage.save(LAST_WORKSPACE_KEY, self.canvas.workspace())) {
            Ok(()) => log::info!("Board saved"),
            Err(e) => log::error!("Failed to save board: {}", e),
        }
    }

    /// Render the active tab into the renderer's surface.
    fn render_canvas(&mut self) {
        let ctx = RenderContext::new(&self.canvas).with_background(self.background);
        self.renderer.build_scene(&ctx);
    }

    /// Render and encode the active tab.
    fn snapshot_png(&mut self) -> Option<Vec<u8>> {
        self.render_canvas();
        match encode_png(self.renderer.surface()) {
            Ok(png) => Some(png),
            Err(e) => {
                log::warn!("Could not encode canvas: {}", e);
                None
            }
        }
    }

    /// Drain finished background work. Returns true when anything changed.
    fn poll_background(&mut self) -> bool {
        let mut changed = false;

        for done in self.importer.poll() {
            self.pending_imports = self.pending_imports.saturating_sub(1);
            match done.result {
                Ok(imported) => {
                    if self.canvas.insert_image(&imported.tab_id, imported.image).is_some() {
                        log::info!("Image added to tab {}", imported.tab_id);
                        changed = true;
                    }
                }
                Err(e) => log::warn!("Import into tab {} failed: {}", done.tab_id, e),
            }
        }

        changed |= self.renderer.poll_images();
        changed |= self.generation.poll();
        changed
    }

    fn has_background_work(&self) -> bool {
        self.pending_imports > 0
            || self.renderer.has_pending_images()
            || self.generation.status().is_pending()
    }

    /// Start importing image bytes into the active tab.
    fn import_image(&mut self, bytes: Vec<u8>) {
        let tab_id = self.canvas.workspace().active_id().clone();
        match self.importer.import(tab_id, bytes) {
            Ok(()) => self.pending_imports += 1,
            Err(e) => log::error!("{}", e),
        }
    }

    fn handle_ui_action(&mut self, action: UiAction) {
        match action {
            UiAction::SetTool(tool) => {
                self.canvas.set_tool(tool);
            }
            UiAction::SetColor(color) => {
                self.canvas.tool_manager.set_color(to_shape_color(color));
            }
            UiAction::SetBrushSize(size) => {
                self.canvas.tool_manager.set_brush_size(size as f64);
            }
            UiAction::SetFilled(filled) => {
                self.canvas.tool_manager.filled = filled;
            }
            UiAction::SetFontSize(size) => {
                self.canvas.tool_manager.font_size = size;
            }
            UiAction::Undo => {
                self.canvas.undo();
            }
            UiAction::Redo => {
                self.canvas.redo();
            }
            UiAction::ClearDocument => {
                self.canvas.clear();
            }
            UiAction::ZoomIn => self.canvas.zoom_in(),
            UiAction::ZoomOut => self.canvas.zoom_out(),
            UiAction::ZoomReset => self.canvas.reset_view(),
            UiAction::ImportImage => {
                if let Some(bytes) = file_ops::pick_image() {
                    self.import_image(bytes);
                }
            }
            UiAction::ExportPng => {
                if let Some(png) = self.snapshot_png() {
                    file_ops::export_png(&png);
                }
            }
            UiAction::SaveBoard => self.save_board(),
            UiAction::Generate => {
                if let Some(png) = self.snapshot_png() {
                    self.generation.submit(png);
                }
            }
            UiAction::AddTab => {
                self.canvas.add_tab();
            }
            UiAction::CloseTab(id) => {
                if let Err(e) = self.canvas.remove_tab(&id) {
                    log::warn!("Cannot close tab: {}", e);
                }
            }
            UiAction::SwitchTab(id) => {
                if let Err(e) = self.canvas.switch_tab(&id) {
                    log::warn!("Cannot switch tab: {}", e);
                }
            }
            UiAction::RenameTab(id, name) => {
                if let Err(e) = self.canvas.rename_tab(&id, name) {
                    log::warn!("Cannot rename tab: {}", e);
                }
            }
            UiAction::CommitText(content) => {
                let measure: &dyn TextMeasure = match self.renderer.font() {
                    Some(font) => font,
                    None => &ApproximateMetrics,
                };
                self.canvas.commit_text(&content, measure);
            }
            UiAction::CancelText => self.canvas.cancel_text(),
        }
    }

    /// Feed this frame's input to the canvas.
    fn handle_canvas_input(&mut self, ctx: &egui::Context, rect: Rect, response: &egui::Response) {
        if !response.hovered() && !self.event_handler.is_pressed() {
            return;
        }

        let events = ctx.input(|i| i.events.clone());
        for event in self.event_handler.translate_events(&events, rect) {
            self.canvas.handle_pointer(event);
        }

        if response.hovered() {
            let (scroll, hover) = ctx.input(|i| (i.smooth_scroll_delta.y, i.pointer.hover_pos()));
            if let (Some(factor), Some(pos)) = (scroll_zoom_factor(scroll), hover) {
                let local = Point::new((pos.x - rect.min.x) as f64, (pos.y - rect.min.y) as f64);
                self.canvas.zoom_at(local, factor);
            }
        }
    }

    /// Redraw and upload the canvas texture if anything it depends on changed.
    fn update_texture(&mut self, ctx: &egui::Context, force: bool) {
        let frame = DrawnFrame {
            revision: self.canvas.revision(),
            camera: self.canvas.camera.clone(),
            size: self.canvas.viewport_size,
        };
        if !force && self.texture.is_some() && self.drawn.as_ref() == Some(&frame) {
            return;
        }

        self.render_canvas();
        let surface = self.renderer.surface();
        let size = [surface.width() as usize, surface.height() as usize];
        let image = ColorImage::from_rgba_unmultiplied(size, surface.as_raw());

        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => self.texture = Some(ctx.load_texture("canvas", image, TextureOptions::NEAREST)),
        }
        self.drawn = Some(frame);
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let background_changed = self.poll_background();

        self.ui_state.sync(&self.canvas, self.generation.status());
        let mut actions: Vec<UiAction> = render_ui(ctx, &mut self.ui_state).into_iter().collect();
        if !ctx.wants_keyboard_input() {
            actions.extend(ctx.input(|i| ShortcutRegistry::actions_for(&i.events)));
        }
        for action in actions {
            self.handle_ui_action(action);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
                self.canvas
                    .set_viewport_size(rect.width() as f64, rect.height() as f64);
                self.handle_canvas_input(ctx, rect, &response);
                self.update_texture(ctx, background_changed);

                if let Some(texture) = &self.texture {
                    let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                    ui.painter().image(texture.id(), rect, uv, Color32::WHITE);
                }
            });

        if ctx.input(|i| i.viewport().close_requested()) {
            self.save_board();
        }

        if self.has_background_work() {
            ctx.request_repaint_after(BACKGROUND_POLL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkboard_core::PointerEvent;
    use inkboard_core::storage::MemoryStorage;
    use inkboard_core::tools::ToolKind;
    use image::{Rgba, RgbaImage};
    use std::time::Instant;

    fn app() -> App {
        App::with_storage(AppConfig::default(), Some(Box::new(MemoryStorage::new())))
    }

    fn draw_rect(app: &mut App, from: Point, to: Point) {
        app.handle_ui_action(UiAction::SetTool(ToolKind::Rectangle));
        app.canvas.handle_pointer(PointerEvent::Down { position: from });
        app.canvas.handle_pointer(PointerEvent::Move { position: to });
        app.canvas.handle_pointer(PointerEvent::Up { position: to });
    }

    fn wait_for_imports(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.pending_imports > 0 && Instant::now() < deadline {
            app.poll_background();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn sample_png() -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(4, 4, Rgba([0, 128, 0, 255]))).unwrap()
    }

    #[test]
    fn test_save_and_restore_board() {
        let mut app = app();
        draw_rect(&mut app, Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        app.handle_ui_action(UiAction::AddTab);
        app.save_board();

        let storage = app.storage.take();
        let mut restored = App::with_storage(AppConfig::default(), storage);
        restored.restore_board();

        let workspace = restored.canvas.workspace();
        assert_eq!(workspace.len(), 2);
        assert_eq!(workspace.tabs()[0].len(), 1);
    }

    #[test]
    fn test_tab_actions() {
        let mut app = app();
        let first = app.canvas.workspace().active_id().clone();
        app.handle_ui_action(UiAction::AddTab);
        assert_ne!(app.canvas.workspace().active_id(), &first);

        app.handle_ui_action(UiAction::SwitchTab(first.clone()));
        assert_eq!(app.canvas.workspace().active_id(), &first);

        app.handle_ui_action(UiAction::RenameTab(first.clone(), "Sketch".to_string()));
        assert_eq!(app.canvas.document().name, "Sketch");

        app.handle_ui_action(UiAction::CloseTab(first.clone()));
        assert_eq!(app.canvas.workspace().len(), 1);
        // The last tab stays.
        let last = app.canvas.workspace().active_id().clone();
        app.handle_ui_action(UiAction::CloseTab(last));
        assert_eq!(app.canvas.workspace().len(), 1);
    }

    #[test]
    fn test_style_actions_reach_tool_manager() {
        let mut app = app();
        app.handle_ui_action(UiAction::SetColor(Color32::from_rgb(255, 0, 0)));
        app.handle_ui_action(UiAction::SetBrushSize(20.0));
        app.handle_ui_action(UiAction::SetFilled(true));
        app.handle_ui_action(UiAction::SetFontSize(24.0));

        let tools = &app.canvas.tool_manager;
        assert_eq!(tools.current_style.color.r, 255);
        assert!((tools.brush_size() - 20.0).abs() < f64::EPSILON);
        assert!(tools.filled);
        assert!((tools.font_size - 24.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_commit_text_measures_with_renderer_font() {
        let mut app = app();
        app.handle_ui_action(UiAction::SetTool(ToolKind::Text));
        app.canvas.handle_pointer(PointerEvent::Down { position: Point::new(20.0, 20.0) });
        app.handle_ui_action(UiAction::CommitText("hi".to_string()));

        let expected = app.renderer.font().unwrap().measure("hi", 16.0);
        let shapes = app.canvas.document().shapes();
        assert_eq!(shapes.len(), 1);
        assert!((shapes[0].size().0 - expected).abs() < 1e-9);
    }

    #[test]
    fn test_commit_text_uses_fallback_metrics() {
        let mut app = app();
        app.renderer = RasterRenderer::new().with_font(None);
        app.handle_ui_action(UiAction::SetTool(ToolKind::Text));
        app.canvas.handle_pointer(PointerEvent::Down { position: Point::new(20.0, 20.0) });
        app.handle_ui_action(UiAction::CommitText("hi".to_string()));

        let shapes = app.canvas.document().shapes();
        assert_eq!(shapes.len(), 1);
        // 2 chars * 16px * 0.6
        assert!((shapes[0].size().0 - 19.2).abs() < 1e-9);
    }

    #[test]
    fn test_import_lands_in_originating_tab() {
        let mut app = app();
        let origin = app.canvas.workspace().active_id().clone();
        app.import_image(sample_png());
        app.handle_ui_action(UiAction::AddTab);
        wait_for_imports(&mut app);

        assert_eq!(app.canvas.workspace().document(&origin).unwrap().len(), 1);
        assert!(app.canvas.document().is_empty());
    }

    #[test]
    fn test_import_for_closed_tab_is_dropped() {
        let mut app = app();
        let origin = app.canvas.workspace().active_id().clone();
        app.handle_ui_action(UiAction::AddTab);
        app.handle_ui_action(UiAction::SwitchTab(origin.clone()));
        app.import_image(sample_png());
        app.handle_ui_action(UiAction::CloseTab(origin));
        wait_for_imports(&mut app);

        assert_eq!(app.canvas.workspace().len(), 1);
        assert!(app.canvas.document().is_empty());
    }

    #[test]
    fn test_failed_import_is_logged_not_inserted() {
        let mut app = app();
        app.import_image(b"definitely not an image".to_vec());
        wait_for_imports(&mut app);
        assert!(app.canvas.document().is_empty());
        assert_eq!(app.pending_imports, 0);
    }

    #[test]
    fn test_snapshot_uses_configured_background() {
        let config = AppConfig {
            background_color: "#102030".to_string(),
            ..AppConfig::default()
        };
        let mut app = App::with_storage(config, None);
        app.canvas.set_viewport_size(8.0, 6.0);

        let png = app.snapshot_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert_eq!(decoded.get_pixel(3, 3).0, [0x10, 0x20, 0x30, 255]);
    }
}

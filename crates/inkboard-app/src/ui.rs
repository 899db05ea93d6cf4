//! UI components using egui.

use egui::{Align2, Color32, Context, CornerRadius, Frame, Margin, Stroke, Vec2};
use inkboard_core::canvas::Canvas;
use inkboard_core::shapes::SerializableColor;
use inkboard_core::tools::ToolKind;
use inkboard_core::workspace::TabId;

use crate::generate::GenerationStatus;

/// Font sizes offered for text.
pub const FONT_SIZES: [f64; 4] = [12.0, 16.0, 20.0, 24.0];

/// Brush size slider range.
pub const BRUSH_RANGE: std::ops::RangeInclusive<f32> = 1.0..=50.0;

/// Actions that can be triggered by UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Change the current tool.
    SetTool(ToolKind),
    SetColor(Color32),
    SetBrushSize(f32),
    SetFilled(bool),
    /// Set font size for text shapes.
    SetFontSize(f64),
    Undo,
    Redo,
    /// Remove every shape from the active tab.
    ClearDocument,
    ZoomIn,
    ZoomOut,
    /// Reset zoom to 100% and pan to the origin.
    ZoomReset,
    /// Pick an image file and add it to the active tab.
    ImportImage,
    /// Export the active tab as PNG.
    ExportPng,
    /// Persist the whole workspace.
    SaveBoard,
    /// Send the active tab to the generation endpoint.
    Generate,
    AddTab,
    CloseTab(TabId),
    SwitchTab(TabId),
    RenameTab(TabId, String),
    /// Insert the typed text at the pending anchor.
    CommitText(String),
    CancelText,
}

/// A tab as shown in the tab bar.
#[derive(Debug, Clone, PartialEq)]
pub struct TabEntry {
    pub id: TabId,
    pub name: String,
    pub active: bool,
}

/// UI state that egui needs between frames, plus a mirror of the canvas.
#[derive(Debug, Clone)]
pub struct UiState {
    pub current_tool: ToolKind,
    pub color: Color32,
    pub brush_size: f32,
    pub filled: bool,
    pub font_size: f64,
    pub zoom_percent: u32,
    pub can_undo: bool,
    pub can_redo: bool,
    pub tabs: Vec<TabEntry>,
    /// Whether a text anchor is waiting for input.
    pub text_pending: bool,
    /// Text typed into the input box.
    pub text_buffer: String,
    /// Tab being renamed and the edited name.
    pub renaming: Option<(TabId, String)>,
    pub generation: GenerationStatus,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            color: Color32::BLACK,
            brush_size: 5.0,
            filled: false,
            font_size: 16.0,
            zoom_percent: 100,
            can_undo: false,
            can_redo: false,
            tabs: Vec::new(),
            text_pending: false,
            text_buffer: String::new(),
            renaming: None,
            generation: GenerationStatus::Idle,
        }
    }
}

impl UiState {
    /// Refresh the mirrored fields from the canvas.
    pub fn sync(&mut self, canvas: &Canvas, generation: &GenerationStatus) {
        let tools = &canvas.tool_manager;
        let color = tools.current_style.color;
        self.current_tool = tools.current_tool;
        self.color = Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a);
        self.brush_size = tools.brush_size() as f32;
        self.filled = tools.filled;
        self.font_size = tools.font_size;
        self.zoom_percent = canvas.camera.zoom_percent();

        let document = canvas.document();
        self.can_undo = document.can_undo();
        self.can_redo = document.can_redo();

        let workspace = canvas.workspace();
        self.tabs = workspace
            .tabs()
            .iter()
            .map(|doc| TabEntry {
                id: doc.id.clone(),
                name: doc.name.clone(),
                active: &doc.id == workspace.active_id(),
            })
            .collect();

        let pending = tools.text_anchor().is_some();
        if !pending {
            self.text_buffer.clear();
        }
        self.text_pending = pending;
        self.generation = generation.clone();
    }
}

/// Convert an egui color to the stored shape color.
pub fn to_shape_color(color: Color32) -> SerializableColor {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    SerializableColor::new(r, g, b, a)
}

fn panel_frame() -> Frame {
    Frame::new()
        .fill(Color32::from_rgba_unmultiplied(250, 250, 252, 250))
        .corner_radius(CornerRadius::same(8))
        .stroke(Stroke::new(1.0, Color32::from_gray(220)))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 6,
            offset: [0, 2],
            color: Color32::from_black_alpha(10),
        })
        .inner_margin(Margin::symmetric(10, 6))
}

/// Render all UI panels and return at most one action.
pub fn render_ui(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let tabs_action = render_tab_bar(ctx, ui_state);
    let toolbar_action = render_toolbar(ctx, ui_state);
    let bottom_action = render_bottom_toolbar(ctx, ui_state);
    let text_action = render_text_input(ctx, ui_state);

    // Text input takes precedence so Enter never triggers anything else
    text_action.or(tabs_action).or(toolbar_action).or(bottom_action)
}

fn render_tab_bar(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    egui::TopBottomPanel::top("tab_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            for tab in &ui_state.tabs {
                let renaming_this = ui_state
                    .renaming
                    .as_ref()
                    .is_some_and(|(id, _)| id == &tab.id);

                if renaming_this {
                    if let Some((id, name)) = ui_state.renaming.as_mut() {
                        let response = ui.add(egui::TextEdit::singleline(name).desired_width(120.0));
                        if response.lost_focus() {
                            action = Some(UiAction::RenameTab(id.clone(), name.clone()));
                        } else {
                            response.request_focus();
                        }
                    }
                } else {
                    let response = ui.selectable_label(tab.active, tab.name.as_str());
                    if response.double_clicked() {
                        ui_state.renaming = Some((tab.id.clone(), tab.name.clone()));
                    } else if response.clicked() && !tab.active {
                        action = Some(UiAction::SwitchTab(tab.id.clone()));
                    }
                }

                if ui_state.tabs.len() > 1
                    && ui.small_button("x").on_hover_text("Close tab").clicked()
                {
                    action = Some(UiAction::CloseTab(tab.id.clone()));
                }
                ui.separator();
            }

            if ui.button("+").on_hover_text("New tab (Ctrl+T)").clicked() {
                action = Some(UiAction::AddTab);
            }
        });
    });

    if matches!(action, Some(UiAction::RenameTab(..))) {
        ui_state.renaming = None;
    }
    action
}

fn render_toolbar(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("toolbar"))
        .anchor(Align2::LEFT_CENTER, Vec2::new(12.0, 0.0))
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(0.0, 2.0);
                    for tool in ToolKind::ALL {
                        let selected = ui_state.current_tool == tool;
                        if ui.selectable_label(selected, tool.name()).clicked() {
                            action = Some(UiAction::SetTool(tool));
                        }
                    }
                });
            });
        });

    action
}

fn render_bottom_toolbar(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("bottom_toolbar"))
        .anchor(Align2::CENTER_BOTTOM, Vec2::new(0.0, -12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let mut color = ui_state.color;
                    if ui.color_edit_button_srgba(&mut color).changed() {
                        action = Some(UiAction::SetColor(color));
                    }

                    let mut size = ui_state.brush_size;
                    if ui
                        .add(egui::Slider::new(&mut size, BRUSH_RANGE).text("Size"))
                        .changed()
                    {
                        action = Some(UiAction::SetBrushSize(size));
                    }

                    let mut font_size = ui_state.font_size;
                    egui::ComboBox::from_id_salt("font_size")
                        .selected_text(format!("{}px", font_size))
                        .width(64.0)
                        .show_ui(ui, |ui| {
                            for size in FONT_SIZES {
                                ui.selectable_value(&mut font_size, size, format!("{}px", size));
                            }
                        });
                    if font_size != ui_state.font_size {
                        action = Some(UiAction::SetFontSize(font_size));
                    }

                    let mut filled = ui_state.filled;
                    if ui.checkbox(&mut filled, "Filled").changed() {
                        action = Some(UiAction::SetFilled(filled));
                    }

                    ui.separator();

                    if ui.button("-").on_hover_text("Zoom out").clicked() {
                        action = Some(UiAction::ZoomOut);
                    }
                    if ui
                        .button(format!("{}%", ui_state.zoom_percent))
                        .on_hover_text("Reset zoom")
                        .clicked()
                    {
                        action = Some(UiAction::ZoomReset);
                    }
                    if ui.button("+").on_hover_text("Zoom in").clicked() {
                        action = Some(UiAction::ZoomIn);
                    }

                    ui.separator();

                    if ui
                        .add_enabled(ui_state.can_undo, egui::Button::new("Undo"))
                        .on_hover_text("Undo (Ctrl+Z)")
                        .clicked()
                    {
                        action = Some(UiAction::Undo);
                    }
                    if ui
                        .add_enabled(ui_state.can_redo, egui::Button::new("Redo"))
                        .on_hover_text("Redo (Ctrl+Shift+Z)")
                        .clicked()
                    {
                        action = Some(UiAction::Redo);
                    }
                    if ui.button("Clear").clicked() {
                        action = Some(UiAction::ClearDocument);
                    }

                    ui.separator();

                    if ui.button("Image...").on_hover_text("Import image (Ctrl+O)").clicked() {
                        action = Some(UiAction::ImportImage);
                    }
                    if ui.button("Export PNG").on_hover_text("Ctrl+E").clicked() {
                        action = Some(UiAction::ExportPng);
                    }
                    if ui.button("Save board").on_hover_text("Ctrl+S").clicked() {
                        action = Some(UiAction::SaveBoard);
                    }
                    if ui
                        .add_enabled(!ui_state.generation.is_pending(), egui::Button::new("Generate"))
                        .clicked()
                    {
                        action = Some(UiAction::Generate);
                    }

                    render_generation_status(ui, &ui_state.generation);
                });
            });
        });

    action
}

fn render_generation_status(ui: &mut egui::Ui, status: &GenerationStatus) {
    match status {
        GenerationStatus::Idle => {}
        GenerationStatus::Pending => {
            ui.spinner();
            ui.label(status.label());
        }
        GenerationStatus::Succeeded { image_url } => {
            ui.hyperlink_to(status.label(), image_url);
        }
        GenerationStatus::Failed(_) => {
            ui.colored_label(Color32::from_rgb(200, 40, 40), status.label());
        }
    }
}

fn render_text_input(ctx: &Context, ui_state: &mut UiState) -> Option<UiAction> {
    if !ui_state.text_pending {
        return None;
    }
    let mut action = None;

    egui::Window::new("Text")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 48.0))
        .show(ctx, |ui| {
            let response = ui.text_edit_singleline(&mut ui_state.text_buffer);
            response.request_focus();
            let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
            let escape = ui.input(|i| i.key_pressed(egui::Key::Escape));

            ui.horizontal(|ui| {
                if ui.button("Add").clicked() || enter {
                    action = Some(UiAction::CommitText(ui_state.text_buffer.clone()));
                }
                if ui.button("Cancel").clicked() || escape {
                    action = Some(UiAction::CancelText);
                }
            });
        });

    action
}

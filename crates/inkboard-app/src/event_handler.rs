//! Translation from egui input to canvas pointer events.

use egui::{Event, PointerButton, Pos2, Rect};
use inkboard_core::input::PointerEvent;
use kurbo::Point;

/// Zoom factor applied per scrolled point.
const SCROLL_ZOOM_SPEED: f64 = 0.0015;

/// Tracks the primary button across frames so a drag that leaves the canvas ends there.
#[derive(Debug, Default)]
pub struct EventHandler {
    pressed: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a primary-button drag started on the canvas is in progress.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Convert raw egui events to pointer events local to `canvas_rect`.
    ///
    /// Presses outside the canvas are ignored. A held drag that moves off the
    /// canvas ends with `Leave`, and its later release is dropped.
    pub fn translate_events(&mut self, events: &[Event], canvas_rect: Rect) -> Vec<PointerEvent> {
        let local = |pos: Pos2| Point::new((pos.x - canvas_rect.min.x) as f64, (pos.y - canvas_rect.min.y) as f64);
        let mut out = Vec::new();

        for event in events {
            match event {
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        if canvas_rect.contains(*pos) {
                            self.pressed = true;
                            out.push(PointerEvent::Down { position: local(*pos) });
                        }
                    } else if self.pressed {
                        self.pressed = false;
                        out.push(PointerEvent::Up { position: local(*pos) });
                    }
                }
                Event::PointerMoved(pos) => {
                    if canvas_rect.contains(*pos) {
                        out.push(PointerEvent::Move { position: local(*pos) });
                    } else if self.pressed {
                        self.pressed = false;
                        out.push(PointerEvent::Leave);
                    }
                }
                Event::PointerGone => {
                    if self.pressed {
                        self.pressed = false;
                        out.push(PointerEvent::Leave);
                    }
                }
                _ => {}
            }
        }
        out
    }
}

/// Zoom factor for a vertical scroll delta, or `None` when there is nothing to apply.
pub fn scroll_zoom_factor(scroll_y: f32) -> Option<f64> {
    if scroll_y.abs() < f32::EPSILON {
        return None;
    }
    Some((scroll_y as f64 * SCROLL_ZOOM_SPEED).exp())
}

use std::collections::BTreeSet;

use eframe::egui;

use mandeltile_core::{GestureEvent, Vector2};

/// Contact id used for the mouse. Touch ids from the platform never reach it.
pub const MOUSE_POINTER_ID: u64 = u64::MAX;

/// Converts raw egui events into canvas-local [`GestureEvent`]s.
///
/// Touch contacts keep their platform ids. While any touch is down, pointer
/// events are ignored, since most platforms also emulate a mouse from the
/// first finger. Positions come out in physical pixels.
#[derive(Debug)]
pub struct GestureTranslator {
    touches: BTreeSet<u64>,
    mouse_down: bool,
    last_pointer: Option<egui::Pos2>,
    pixels_per_point: f32,
}

impl Default for GestureTranslator {
    fn default() -> Self {
        Self {
            touches: BTreeSet::new(),
            mouse_down: false,
            last_pointer: None,
            pixels_per_point: 1.0,
        }
    }
}

impl GestureTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pixels_per_point(&mut self, pixels_per_point: f32) {
        self.pixels_per_point = pixels_per_point;
    }

    /// Translate one event for a canvas occupying `canvas`. Presses outside
    /// the canvas are ignored; moves and releases of contacts that started
    /// inside are always forwarded.
    pub fn translate(&mut self, event: &egui::Event, canvas: egui::Rect) -> Option<GestureEvent> {
        let ppp = self.pixels_per_point as f64;
        let local = |p: egui::Pos2| {
            Vector2::new(
                (p.x - canvas.min.x) as f64 * ppp,
                (p.y - canvas.min.y) as f64 * ppp,
            )
        };

        match *event {
            egui::Event::Touch { id, phase, pos, .. } => {
                let id = id.0;
                match phase {
                    egui::TouchPhase::Start => {
                        if !canvas.contains(pos) {
                            return None;
                        }
                        self.touches.insert(id);
                        Some(GestureEvent::Down { id, pos: local(pos) })
                    }
                    egui::TouchPhase::Move => self
                        .touches
                        .contains(&id)
                        .then(|| GestureEvent::Move { id, pos: local(pos) }),
                    egui::TouchPhase::End | egui::TouchPhase::Cancel => self
                        .touches
                        .remove(&id)
                        .then(|| GestureEvent::Up { id, pos: local(pos) }),
                }
            }
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } => {
                self.last_pointer = Some(pos);
                if !self.touches.is_empty() {
                    return None;
                }
                if pressed {
                    if self.mouse_down || !canvas.contains(pos) {
                        return None;
                    }
                    self.mouse_down = true;
                    Some(GestureEvent::Down {
                        id: MOUSE_POINTER_ID,
                        pos: local(pos),
                    })
                } else {
                    self.release_mouse(local(pos))
                }
            }
            egui::Event::PointerMoved(pos) => {
                self.last_pointer = Some(pos);
                (self.mouse_down && self.touches.is_empty()).then(|| GestureEvent::Move {
                    id: MOUSE_POINTER_ID,
                    pos: local(pos),
                })
            }
            egui::Event::PointerGone => {
                let pos = self.last_pointer.take().map(local).unwrap_or_default();
                self.release_mouse(pos)
            }
            egui::Event::MouseWheel { delta, .. } => {
                let pos = self.last_pointer.filter(|p| canvas.contains(*p))?;
                (delta.y != 0.0).then(|| GestureEvent::Wheel {
                    pos: local(pos),
                    delta_y: delta.y as f64,
                })
            }
            _ => None,
        }
    }

    fn release_mouse(&mut self, pos: Vector2) -> Option<GestureEvent> {
        if !self.mouse_down {
            return None;
        }
        self.mouse_down = false;
        Some(GestureEvent::Up {
            id: MOUSE_POINTER_ID,
            pos,
        })
    }

    /// Forget all contacts, e.g. after the canvas was rebuilt.
    pub fn reset(&mut self) {
        self.touches.clear();
        self.mouse_down = false;
    }
}

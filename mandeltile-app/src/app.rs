use std::cell::Cell;
use std::rc::Rc;

use eframe::egui;
use tracing::{debug, error, warn};

use mandeltile_core::Vector2;
use mandeltile_render::FractalView;

use crate::input::GestureTranslator;
use crate::preferences::AppPreferences;
use crate::texture_sink::TextureSink;

/// HUD box margin.
const HUD_MARGIN: f32 = 8.0;
/// HUD box corner radius.
const HUD_CORNER_RADIUS: f32 = 6.0;

pub struct MandelTileApp {
    preferences: AppPreferences,
    view: Option<FractalView<TextureSink>>,
    canvas_size: [u32; 2],
    input: GestureTranslator,
    /// Gesture commits seen by the view-changed hook.
    gesture_commits: Rc<Cell<u64>>,
    build_error: Option<String>,
}

impl MandelTileApp {
    pub fn new(preferences: AppPreferences) -> Self {
        Self {
            preferences,
            view: None,
            canvas_size: [0, 0],
            input: GestureTranslator::new(),
            gesture_commits: Rc::new(Cell::new(0)),
            build_error: None,
        }
    }

    /// Rebuild the view when the canvas changes size, keeping the current
    /// position in the set.
    fn check_resize(&mut self, ctx: &egui::Context, width: u32, height: u32) {
        if width == 0 || height == 0 || [width, height] == self.canvas_size {
            return;
        }
        self.canvas_size = [width, height];

        let previous = self.view.as_ref().map(|v| v.current_view());
        // Join the old grids before the new ones start competing for the pool.
        self.view = None;
        self.input.reset();

        let config = self.preferences.view_config(width, height);
        let result = FractalView::new(config, |buffer, id, rect| {
            TextureSink::new(ctx, format!("tile_{buffer}_{}", id.0), rect.width, rect.height)
        });
        let mut view = match result {
            Ok(view) => view,
            Err(e) => {
                error!("Failed to build fractal view: {e}");
                self.build_error = Some(e.to_string());
                return;
            }
        };
        self.build_error = None;

        if let Some(previous) = previous {
            if let Err(e) = view.update(previous) {
                warn!("Could not restore view after resize: {e}");
            }
        }

        let commits = Rc::clone(&self.gesture_commits);
        view.set_on_view_changed(move |v| {
            commits.set(commits.get() + 1);
            debug!(
                offset_x = v.offset_x,
                offset_y = v.offset_y,
                scale = v.scale,
                "View changed"
            );
        });

        debug!(width, height, "Canvas resized");
        self.view = Some(view);
    }

    fn feed_input(&mut self, ctx: &egui::Context, canvas: egui::Rect) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let events = ctx.input(|i| i.events.clone());
        for event in &events {
            if let Some(gesture) = self.input.translate(event, canvas) {
                view.handle_input(&gesture);
            }
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        let (reset, toggle_hud) =
            ctx.input(|i| (i.key_pressed(egui::Key::R), i.key_pressed(egui::Key::H)));
        if reset {
            if let Some(view) = self.view.as_mut() {
                view.reset_view();
            }
        }
        if toggle_hud {
            self.preferences.show_hud = !self.preferences.show_hud;
            self.preferences.save();
        }
    }

    /// Tiles are in physical pixels; the painter works in points.
    fn draw_tiles(&self, painter: &egui::Painter, canvas: egui::Rect, pixels_per_point: f32) {
        let Some(view) = self.view.as_ref() else {
            return;
        };
        let transform = view.foreground_transform();
        let scale = transform.scale as f32 / pixels_per_point;
        let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

        for (_, rect, sink) in view.foreground_tiles() {
            let Some(texture) = sink.texture() else {
                continue;
            };
            let min = transform.apply(Vector2::new(rect.x as f64, rect.y as f64));
            let screen = egui::Rect::from_min_size(
                canvas.min + egui::vec2(min.x as f32, min.y as f32) / pixels_per_point,
                egui::vec2(rect.width as f32, rect.height as f32) * scale,
            );
            painter.image(texture.id(), screen, uv, egui::Color32::WHITE);
        }
    }

    fn show_hud(&self, ctx: &egui::Context) {
        if !self.preferences.show_hud {
            return;
        }
        egui::Area::new(egui::Id::new("hud_view"))
            .anchor(egui::Align2::LEFT_TOP, [HUD_MARGIN, HUD_MARGIN])
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(166))
                    .inner_margin(egui::Margin::same(8))
                    .corner_radius(HUD_CORNER_RADIUS)
                    .show(ui, |ui| {
                        ui.style_mut().visuals.override_text_color =
                            Some(egui::Color32::from_rgb(220, 220, 220));

                        if let Some(err) = &self.build_error {
                            ui.colored_label(egui::Color32::from_rgb(255, 120, 90), err);
                            return;
                        }
                        let Some(view) = self.view.as_ref() else {
                            return;
                        };
                        let v = view.current_view();
                        ui.label(format!("Offset: {:.10} {:+.10}i", v.offset_x, v.offset_y));
                        ui.label(format!("Zoom: {:.3e}", v.scale));
                        ui.label(format!("Iterations: {}", view.config().max_iterations));
                        ui.label(format!(
                            "Tiles: {} of {}px",
                            view.foreground_grid().len(),
                            view.config().tile_size
                        ));
                        if view.is_pending_swap() {
                            ui.label(format!(
                                "Rendering: {} tiles left",
                                view.background_grid().pending_count()
                            ));
                        } else {
                            ui.label(format!("Swaps: {}", view.swap_count()));
                        }
                        ui.label(format!("Gestures: {}", self.gesture_commits.get()));
                        ui.weak("R: reset view   H: hide HUD");
                    });
            });
    }
}

/// Physical pixel size of a canvas measured in points, at least 1x1.
fn canvas_pixels(size: egui::Vec2, pixels_per_point: f32) -> [u32; 2] {
    let px = size * pixels_per_point;
    [px.x.round().max(1.0) as u32, px.y.round().max(1.0) as u32]
}

impl eframe::App for MandelTileApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());
        self.handle_keyboard(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                let available = ui.available_size();
                let pixels_per_point = ctx.pixels_per_point();
                let [width, height] = canvas_pixels(available, pixels_per_point);
                self.check_resize(ctx, width, height);

                let (response, painter) =
                    ui.allocate_painter(available, egui::Sense::click_and_drag());
                self.input.set_pixels_per_point(pixels_per_point);
                self.feed_input(ctx, response.rect);

                if let Some(view) = self.view.as_mut() {
                    if view.tick() {
                        debug!(swaps = view.swap_count(), "Frame ready");
                    }
                }
                self.draw_tiles(&painter, response.rect, pixels_per_point);
            });

        self.show_hud(ctx);

        let pending = self.view.as_ref().is_some_and(|v| v.is_pending_swap());
        if pending {
            ctx.request_repaint();
        }
    }
}

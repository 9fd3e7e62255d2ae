use std::collections::BTreeMap;

use tracing::trace;

use crate::transform::{Similarity, Vector2};

/// Wheel zoom factor for a negative vertical delta.
pub const WHEEL_STEP_NEGATIVE: f64 = 0.95;
/// Wheel zoom factor for a positive vertical delta.
pub const WHEEL_STEP_POSITIVE: f64 = 1.05;

/// Raw pointer input in device-local pixels.
///
/// `id` identifies one contact for its whole down → up lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Down { id: u64, pos: Vector2 },
    Move { id: u64, pos: Vector2 },
    Up { id: u64, pos: Vector2 },
    Wheel { pos: Vector2, delta_y: f64 },
}

/// One active contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTouch {
    pub current: Vector2,
    pub previous: Vector2,
}

impl GestureTouch {
    fn at(pos: Vector2) -> Self {
        Self {
            current: pos,
            previous: pos,
        }
    }
}

/// Turns touch, mouse and wheel input into an accumulated pan/zoom transform.
///
/// The transform maps the content as it was at the last
/// [`reset_accumulator`](Self::reset_accumulator) to where the user has
/// dragged it on screen. [`handle_input`](Self::handle_input) reports when a
/// gesture has finished and the owner should fold the transform into its view.
#[derive(Debug, Clone, Default)]
pub struct Camera {
    touches: BTreeMap<u64, GestureTouch>,
    transform: Similarity,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one input event. Returns `true` when the view should be committed:
    /// after the last contact lifts, or after each wheel step.
    pub fn handle_input(&mut self, event: &GestureEvent) -> bool {
        match *event {
            GestureEvent::Down { id, pos } => {
                self.touches.insert(id, GestureTouch::at(pos));
                false
            }
            GestureEvent::Up { id, .. } => {
                if self.touches.remove(&id).is_none() {
                    return false;
                }
                let ended = self.touches.is_empty();
                if ended {
                    trace!(
                        scale = self.transform.scale,
                        dx = self.transform.translation.x,
                        dy = self.transform.translation.y,
                        "Gesture ended"
                    );
                }
                ended
            }
            GestureEvent::Wheel { pos, delta_y } => {
                if delta_y == 0.0 {
                    return false;
                }
                let factor = if delta_y < 0.0 {
                    WHEEL_STEP_NEGATIVE
                } else {
                    WHEEL_STEP_POSITIVE
                };
                self.transform.then_scale_about(pos, factor);
                trace!(factor, "Wheel zoom step");
                true
            }
            GestureEvent::Move { id, pos } => {
                self.on_move(id, pos);
                false
            }
        }
    }

    fn on_move(&mut self, id: u64, pos: Vector2) {
        let Some(primary) = self.touches.get_mut(&id) else {
            return;
        };
        primary.previous = primary.current;
        primary.current = pos;
        let primary = *primary;

        if self.touches.len() == 1 {
            self.transform
                .then_translate(primary.current - primary.previous);
            return;
        }

        // Pinch uses exactly two contacts: the moving one and the lowest other id.
        let Some((&other_id, &secondary)) = self.touches.iter().find(|(k, _)| **k != id) else {
            return;
        };

        let center = primary.current.midpoint(secondary.current);
        let prev_center = primary.previous.midpoint(secondary.previous);
        let dist = primary.current.distance(secondary.current);
        let prev_dist = primary.previous.distance(secondary.previous);

        self.transform.then_translate(center - prev_center);
        let factor = dist / prev_dist;
        if prev_dist > f64::EPSILON && factor.is_finite() && factor > 0.0 {
            self.transform.then_scale_about(center, factor);
        }

        for key in [id, other_id] {
            if let Some(t) = self.touches.get_mut(&key) {
                t.previous = t.current;
            }
        }
    }

    /// Uniform scale accumulated since the last reset.
    pub fn scale_factor(&self) -> f64 {
        self.transform.scale
    }

    /// Translation in pixels accumulated since the last reset.
    pub fn offset_delta(&self) -> Vector2 {
        self.transform.translation
    }

    pub fn transform(&self) -> Similarity {
        self.transform
    }

    pub fn active_touches(&self) -> usize {
        self.touches.len()
    }

    pub fn touch(&self, id: u64) -> Option<&GestureTouch> {
        self.touches.get(&id)
    }

    /// Clear the accumulated transform. Active contacts are kept, so a
    /// gesture in progress continues from the new identity.
    pub fn reset_accumulator(&mut self) {
        self.transform = Similarity::IDENTITY;
    }

    /// Forget all contacts and the accumulated transform.
    pub fn reset(&mut self) {
        self.touches.clear();
        self.reset_accumulator();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn v(x: f64, y: f64) -> Vector2 {
        Vector2::new(x, y)
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPSILON, "{a} != {b}");
    }

    #[test]
    fn single_touch_drag_translates_exactly() {
        let mut cam = Camera::new();
        assert!(!cam.handle_input(&GestureEvent::Down { id: 1, pos: v(10.0, 10.0) }));
        assert!(!cam.handle_input(&GestureEvent::Move { id: 1, pos: v(20.0, 15.0) }));
        assert_close(cam.offset_delta().x, 10.0);
        assert_close(cam.offset_delta().y, 5.0);
        assert_close(cam.scale_factor(), 1.0);
        assert!(cam.handle_input(&GestureEvent::Up { id: 1, pos: v(20.0, 15.0) }));
        assert_eq!(cam.active_touches(), 0);
    }

    #[test]
    fn drag_accumulates_over_several_moves() {
        let mut cam = Camera::new();
        cam.handle_input(&GestureEvent::Down { id: 0, pos: v(0.0, 0.0) });
        cam.handle_input(&GestureEvent::Move { id: 0, pos: v(3.0, 1.0) });
        cam.handle_input(&GestureEvent::Move { id: 0, pos: v(7.0, -2.0) });
        assert_close(cam.offset_delta().x, 7.0);
        assert_close(cam.offset_delta().y, -2.0);
    }

    #[test]
    fn pinch_scales_about_current_midpoint() {
        let mut cam = Camera::new();
        cam.handle_input(&GestureEvent::Down { id: 1, pos: v(100.0, 100.0) });
        cam.handle_input(&GestureEvent::Down { id: 2, pos: v(200.0, 100.0) });
        // Spread to 3× the distance, keeping the midpoint at (150, 100).
        cam.handle_input(&GestureEvent::Move { id: 1, pos: v(0.0, 100.0) });
        cam.handle_input(&GestureEvent::Move { id: 2, pos: v(300.0, 100.0) });

        // First move: distance 100 → 200 about (100, 100) after a (-50, 0)
        // pan; second: 200 → 300 about (150, 100) after a (50, 0) pan.
        assert_close(cam.scale_factor(), 3.0);
        let t = cam.transform();
        // The contacts' original positions follow the fingers.
        let p1 = t.apply(v(100.0, 100.0));
        let p2 = t.apply(v(200.0, 100.0));
        assert_close(p1.x, 0.0);
        assert_close(p2.x, 300.0);
        assert_close(p1.y, 100.0);
    }

    #[test]
    fn pinch_ratio_with_fixed_anchor() {
        let mut cam = Camera::new();
        cam.handle_input(&GestureEvent::Down { id: 0, pos: v(0.0, 0.0) });
        cam.handle_input(&GestureEvent::Down { id: 1, pos: v(10.0, 0.0) });
        cam.handle_input(&GestureEvent::Move { id: 1, pos: v(20.0, 0.0) });
        // Ratio 2 about the current midpoint (10, 0), after panning by (5, 0).
        let t = cam.transform();
        assert_close(t.scale, 2.0);
        assert_close(t.translation.x, 0.0);
        assert_close(t.translation.y, 0.0);
        assert_eq!(cam.touch(1).map(|t| t.previous), Some(v(20.0, 0.0)));
        assert_eq!(cam.touch(0).map(|t| t.previous), Some(v(0.0, 0.0)));
    }

    #[test]
    fn pinch_with_coincident_touches_only_pans() {
        let mut cam = Camera::new();
        cam.handle_input(&GestureEvent::Down { id: 0, pos: v(5.0, 5.0) });
        cam.handle_input(&GestureEvent::Down { id: 1, pos: v(5.0, 5.0) });
        cam.handle_input(&GestureEvent::Move { id: 1, pos: v(9.0, 5.0) });
        assert_close(cam.scale_factor(), 1.0);
        assert_close(cam.offset_delta().x, 2.0);
    }

    #[test]
    fn gesture_ends_only_when_last_touch_lifts() {
        let mut cam = Camera::new();
        cam.handle_input(&GestureEvent::Down { id: 1, pos: v(0.0, 0.0) });
        cam.handle_input(&GestureEvent::Down { id: 2, pos: v(5.0, 0.0) });
        assert!(!cam.handle_input(&GestureEvent::Up { id: 1, pos: v(0.0, 0.0) }));
        assert!(cam.handle_input(&GestureEvent::Up { id: 2, pos: v(5.0, 0.0) }));
    }

    #[test]
    fn wheel_negative_zooms_out_about_pointer() {
        let mut cam = Camera::new();
        let p = v(40.0, 30.0);
        assert!(cam.handle_input(&GestureEvent::Wheel { pos: p, delta_y: -1.0 }));
        let t = cam.transform();
        assert_close(t.scale, 0.95);
        let fixed = t.apply(p);
        assert_close(fixed.x, p.x);
        assert_close(fixed.y, p.y);
    }

    #[test]
    fn wheel_positive_zooms_in_about_pointer() {
        let mut cam = Camera::new();
        let p = v(-8.0, 12.0);
        assert!(cam.handle_input(&GestureEvent::Wheel { pos: p, delta_y: 3.5 }));
        assert_close(cam.scale_factor(), 1.05);
        assert_close(cam.offset_delta().x, p.x - 1.05 * p.x);
        assert_close(cam.offset_delta().y, p.y - 1.05 * p.y);
    }

    #[test]
    fn wheel_without_vertical_delta_is_ignored() {
        let mut cam = Camera::new();
        assert!(!cam.handle_input(&GestureEvent::Wheel { pos: v(1.0, 1.0), delta_y: 0.0 }));
        assert!(cam.transform().is_identity());
    }

    #[test]
    fn malformed_sequences_are_no_ops() {
        let mut cam = Camera::new();
        assert!(!cam.handle_input(&GestureEvent::Move { id: 9, pos: v(5.0, 5.0) }));
        assert!(!cam.handle_input(&GestureEvent::Up { id: 9, pos: v(5.0, 5.0) }));
        assert_eq!(cam.active_touches(), 0);
        assert!(cam.transform().is_identity());

        cam.handle_input(&GestureEvent::Down { id: 1, pos: v(0.0, 0.0) });
        assert!(!cam.handle_input(&GestureEvent::Move { id: 7, pos: v(50.0, 50.0) }));
        assert!(cam.transform().is_identity());
    }

    #[test]
    fn reset_accumulator_keeps_touches() {
        let mut cam = Camera::new();
        cam.handle_input(&GestureEvent::Down { id: 1, pos: v(0.0, 0.0) });
        cam.handle_input(&GestureEvent::Move { id: 1, pos: v(4.0, 0.0) });
        cam.reset_accumulator();
        assert!(cam.transform().is_identity());
        assert_eq!(cam.active_touches(), 1);
        cam.handle_input(&GestureEvent::Move { id: 1, pos: v(6.0, 0.0) });
        assert_close(cam.offset_delta().x, 2.0);

        cam.reset();
        assert_eq!(cam.active_touches(), 0);
        assert!(cam.transform().is_identity());
    }
}

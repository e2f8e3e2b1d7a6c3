//! Pointer input for the scene window.
//!
//! Turns raw winit mouse events into the three things the scene reacts to:
//! drag deltas for the orbit controls, wheel zoom, and double clicks for the
//! fullscreen toggle.

use std::time::{Duration, Instant};

use glam::Vec2;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Maximum time between the two presses of a double click.
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(400);
/// Maximum pointer travel, in logical pixels, between the two presses.
pub const DOUBLE_CLICK_DISTANCE: f32 = 6.0;

/// Something the scene should act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Left-button drag by a logical pixel delta.
    Drag(Vec2),
    /// Wheel scroll in lines; positive is away from the user.
    Zoom(f32),
    DoubleClick,
}

/// Detects double clicks from a stream of press times and positions.
#[derive(Debug, Clone, Default)]
pub struct DoubleClick {
    last_press: Option<(Instant, Vec2)>,
}

impl DoubleClick {
    /// Record a press. Returns `true` if it completes a double click.
    pub fn press(&mut self, now: Instant, pos: Vec2) -> bool {
        let is_double = match self.last_press {
            Some((t, p)) => {
                now.saturating_duration_since(t) <= DOUBLE_CLICK_INTERVAL
                    && p.distance(pos) <= DOUBLE_CLICK_DISTANCE
            }
            None => false,
        };
        // A completed double click does not start the next one.
        self.last_press = if is_double { None } else { Some((now, pos)) };
        is_double
    }
}

/// Mouse state for one window.
#[derive(Debug, Clone, Default)]
pub struct Pointer {
    dragging: bool,
    position: Option<Vec2>,
    double_click: DoubleClick,
}

impl Pointer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a window event. `scale_factor` converts physical to logical pixels.
    pub fn handle_event(&mut self, event: &WindowEvent, scale_factor: f64) -> Option<PointerAction> {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.button(*state == ElementState::Pressed, Instant::now()),
            WindowEvent::CursorMoved { position, .. } => self.moved(logical(position, scale_factor)),
            WindowEvent::CursorLeft { .. } => {
                self.position = None;
                None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                Some(PointerAction::Zoom(lines))
            }
            _ => None,
        }
    }

    /// Follow an event the panel consumed.
    ///
    /// Any drag ends and presses are not counted, but the cursor position
    /// stays current so the next drag starts from where the pointer is.
    pub fn track(&mut self, event: &WindowEvent, scale_factor: f64) {
        match event {
            WindowEvent::CursorMoved { position, .. } => self.follow(Some(logical(position, scale_factor))),
            WindowEvent::CursorLeft { .. } => self.follow(None),
            _ => self.dragging = false,
        }
    }

    fn follow(&mut self, position: Option<Vec2>) {
        self.dragging = false;
        self.position = position;
    }

    fn button(&mut self, pressed: bool, now: Instant) -> Option<PointerAction> {
        self.dragging = pressed;
        if !pressed {
            return None;
        }
        let pos = self.position.unwrap_or(Vec2::ZERO);
        self.double_click
            .press(now, pos)
            .then_some(PointerAction::DoubleClick)
    }

    fn moved(&mut self, pos: Vec2) -> Option<PointerAction> {
        match self.position.replace(pos) {
            Some(last) if self.dragging => Some(PointerAction::Drag(pos - last)),
            _ => None,
        }
    }
}

fn logical(position: &PhysicalPosition<f64>, scale_factor: f64) -> Vec2 {
    let logical = position.to_logical::<f32>(scale_factor);
    Vec2::new(logical.x, logical.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_quick_presses_are_a_double_click() {
        let mut dc = DoubleClick::default();
        let t0 = Instant::now();
        assert!(!dc.press(t0, Vec2::new(10.0, 10.0)));
        assert!(dc.press(t0 + Duration::from_millis(200), Vec2::new(12.0, 11.0)));
    }

    #[test]
    fn test_slow_presses_are_not_a_double_click() {
        let mut dc = DoubleClick::default();
        let t0 = Instant::now();
        dc.press(t0, Vec2::ZERO);
        assert!(!dc.press(t0 + Duration::from_millis(900), Vec2::ZERO));
    }

    #[test]
    fn test_distant_presses_are_not_a_double_click() {
        let mut dc = DoubleClick::default();
        let t0 = Instant::now();
        dc.press(t0, Vec2::ZERO);
        assert!(!dc.press(t0 + Duration::from_millis(100), Vec2::new(50.0, 0.0)));
    }

    #[test]
    fn test_triple_click_toggles_once() {
        let mut dc = DoubleClick::default();
        let t0 = Instant::now();
        let ms = Duration::from_millis;
        assert!(!dc.press(t0, Vec2::ZERO));
        assert!(dc.press(t0 + ms(100), Vec2::ZERO));
        assert!(!dc.press(t0 + ms(200), Vec2::ZERO));
    }

    #[test]
    fn test_drag_reports_deltas_while_pressed() {
        let mut p = Pointer::new();
        let t0 = Instant::now();
        assert_eq!(p.moved(Vec2::new(10.0, 10.0)), None);
        assert_eq!(p.button(true, t0), None);
        assert_eq!(p.moved(Vec2::new(14.0, 7.0)), Some(PointerAction::Drag(Vec2::new(4.0, -3.0))));
        assert_eq!(p.button(false, t0), None);
        assert_eq!(p.moved(Vec2::new(20.0, 7.0)), None);
    }

    #[test]
    fn test_drag_after_panel_starts_from_current_position() {
        let mut p = Pointer::new();
        let t0 = Instant::now();
        p.moved(Vec2::ZERO);
        // The cursor crosses the panel.
        p.follow(Some(Vec2::new(100.0, 0.0)));
        p.follow(Some(Vec2::new(200.0, 0.0)));

        p.button(true, t0);
        assert_eq!(p.moved(Vec2::new(205.0, 0.0)), Some(PointerAction::Drag(Vec2::new(5.0, 0.0))));
    }

    #[test]
    fn test_panel_ends_a_drag() {
        let mut p = Pointer::new();
        p.moved(Vec2::ZERO);
        p.button(true, Instant::now());
        p.follow(Some(Vec2::new(50.0, 0.0)));
        assert_eq!(p.moved(Vec2::new(60.0, 0.0)), None);
    }
}

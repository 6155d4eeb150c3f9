//! Pointer, wheel and window input.
//!
//! `Input` folds raw winit events into the per-frame state the bridge needs:
//! where the pointer is (in pixels and NDC), whether it is inside the
//! window, how far it was dragged with the left button, how many wheel lines
//! were scrolled, and whether the last pointer came from a touch screen.
//!
//! Per-frame values (drag, wheel, escape) accumulate across the events of one
//! frame and are cleared by [`Input::begin_frame`].

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels per wheel line for trackpads reporting pixel deltas.
const PIXELS_PER_LINE: f32 = 100.0;

/// Input state tracking for pointer, wheel and window size.
#[derive(Debug, Default)]
pub struct Input {
    // Pointer position
    cursor: Option<Vec2>,
    cursor_ndc: Option<Vec2>,

    // Left-button drag
    dragging: bool,
    drag_delta: Vec2,

    // Scroll
    wheel_lines: f32,

    touch: bool,
    escape_pressed: bool,

    // Window size for NDC calculation
    window_size: (u32, u32),
    scale_factor: f64,
}

impl Input {
    /// Create a new input tracker.
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            scale_factor: 1.0,
            ..Default::default()
        }
    }

    // ========== Queries ==========

    /// Pointer position in physical pixels, `None` when outside the window.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Pointer in normalized device coordinates (-1 to 1), y up.
    pub fn cursor_ndc(&self) -> Option<Vec2> {
        self.cursor_ndc
    }

    /// Drag distance with the left button held, this frame.
    pub fn drag_delta(&self) -> Vec2 {
        self.drag_delta
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Wheel lines scrolled this frame. Positive is toward the user (scroll down).
    pub fn wheel_lines(&self) -> f32 {
        self.wheel_lines
    }

    /// Whether the most recent pointer input came from a touch screen.
    pub fn is_touch(&self) -> bool {
        self.touch
    }

    /// Escape went down this frame.
    pub fn escape_pressed(&self) -> bool {
        self.escape_pressed
    }

    /// Window size in physical pixels.
    pub fn window_size(&self) -> Vec2 {
        Vec2::new(self.window_size.0 as f32, self.window_size.1 as f32)
    }

    /// Window width in logical pixels.
    pub fn logical_width(&self) -> f32 {
        (self.window_size.0 as f64 / self.scale_factor.max(f64::EPSILON)) as f32
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    // ========== Updates ==========

    /// Called at the start of each frame to clear per-frame state.
    pub fn begin_frame(&mut self) {
        self.drag_delta = Vec2::ZERO;
        self.wheel_lines = 0.0;
        self.escape_pressed = false;
    }

    /// Update window size for NDC calculations.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
        self.cursor_ndc = self.cursor.and_then(|c| self.to_ndc(c));
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor;
    }

    /// Process a winit window event.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    && event.state == ElementState::Pressed
                    && !event.repeat
                {
                    self.escape_pressed = true;
                }
            }

            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.dragging = *state == ElementState::Pressed;
            }

            WindowEvent::CursorMoved { position, .. } => {
                let new_pos = Vec2::new(position.x as f32, position.y as f32);
                self.move_pointer(new_pos);
                self.touch = false;
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.cursor_ndc = None;
                self.dragging = false;
            }

            WindowEvent::MouseWheel { delta, .. } => {
                self.wheel_lines -= match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
            }

            WindowEvent::Touch(Touch { phase, location, .. }) => {
                self.touch = true;
                match phase {
                    TouchPhase::Started | TouchPhase::Moved => {
                        self.move_pointer(Vec2::new(location.x as f32, location.y as f32));
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        self.cursor = None;
                        self.cursor_ndc = None;
                    }
                }
            }

            WindowEvent::Resized(size) => self.set_window_size(size.width, size.height),

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => self.set_scale_factor(*scale_factor),

            _ => {}
        }
    }

    fn move_pointer(&mut self, position: Vec2) {
        if self.dragging {
            if let Some(last) = self.cursor {
                self.drag_delta += position - last;
            }
        }
        self.cursor = Some(position);
        self.cursor_ndc = self.to_ndc(position);
    }

    fn to_ndc(&self, position: Vec2) -> Option<Vec2> {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return None;
        }
        Some(Vec2::new(
            (position.x / w as f32) * 2.0 - 1.0,
            1.0 - (position.y / h as f32) * 2.0, // Y flipped
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_ndc() {
        let mut input = Input::new();
        input.set_window_size(800, 600);
        input.move_pointer(Vec2::new(400.0, 300.0));
        let ndc = input.cursor_ndc().unwrap();
        assert!(ndc.x.abs() < 0.01);
        assert!(ndc.y.abs() < 0.01);

        input.move_pointer(Vec2::new(800.0, 0.0));
        assert_eq!(input.cursor_ndc(), Some(Vec2::new(1.0, 1.0)));
    }

    #[test]
    fn test_zero_window_has_no_ndc() {
        let mut input = Input::new();
        input.set_window_size(0, 0);
        input.move_pointer(Vec2::new(10.0, 10.0));
        assert!(input.cursor().is_some());
        assert!(input.cursor_ndc().is_none());
    }

    #[test]
    fn test_drag_accumulates_and_clears() {
        let mut input = Input::new();
        input.move_pointer(Vec2::new(10.0, 10.0));
        input.dragging = true;
        input.move_pointer(Vec2::new(15.0, 12.0));
        input.move_pointer(Vec2::new(20.0, 10.0));
        assert_eq!(input.drag_delta(), Vec2::new(10.0, 0.0));

        input.begin_frame();
        assert_eq!(input.drag_delta(), Vec2::ZERO);
        assert!(input.is_dragging());
    }

    #[test]
    fn test_move_without_drag_has_no_delta() {
        let mut input = Input::new();
        input.move_pointer(Vec2::new(10.0, 10.0));
        input.move_pointer(Vec2::new(50.0, 50.0));
        assert_eq!(input.drag_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_logical_width() {
        let mut input = Input::new();
        input.set_window_size(1600, 900);
        input.set_scale_factor(2.0);
        assert_eq!(input.logical_width(), 800.0);
    }
}

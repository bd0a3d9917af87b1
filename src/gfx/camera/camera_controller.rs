use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseScrollDelta},
    keyboard::KeyCode,
};

/// Pixel-precise wheel deltas are scaled down to roughly one line per notch.
const PIXELS_PER_LINE: f32 = 20.0;

/// A discrete camera event, applied immediately and independently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraInput {
    Orbit { dx: f32, dy: f32 },
    Zoom(f32),
    WidenFov,
    NarrowFov,
    Resize { width: u32, height: u32 },
    Reset,
}

/// Translates raw mouse and keyboard state into [`CameraInput`] events.
///
/// Mouse drags and wheel turns produce events as they arrive. Arrow and
/// bracket keys are level-triggered: while held they produce one event per
/// frame through [`CameraController::held_inputs`].
pub struct CameraController {
    /// Orbit delta emitted per frame for each held arrow key
    pub key_orbit_speed: f32,
    is_mouse_pressed: bool,
    is_shift_held: bool,
    held: HeldKeys,
}

#[derive(Debug, Default, Clone, Copy)]
struct HeldKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    widen: bool,
    narrow: bool,
}

impl CameraController {
    pub fn new(key_orbit_speed: f32) -> Self {
        Self {
            key_orbit_speed,
            is_mouse_pressed: false,
            is_shift_held: false,
            held: HeldKeys::default(),
        }
    }

    pub fn process_mouse_button(&mut self, state: ElementState) {
        self.is_mouse_pressed = state == ElementState::Pressed;
    }

    /// Raw pointer motion; only orbits while the left button is held.
    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) -> Option<CameraInput> {
        if !self.is_mouse_pressed {
            return None;
        }
        // screen Y grows downward, the camera expects it growing upward
        Some(CameraInput::Orbit {
            dx: delta.0 as f32,
            dy: -delta.1 as f32,
        })
    }

    pub fn process_scroll(&mut self, delta: MouseScrollDelta) -> CameraInput {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, scroll) => scroll,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y: scroll, .. }) => {
                scroll as f32 / PIXELS_PER_LINE
            }
        };
        CameraInput::Zoom(lines)
    }

    /// Tracks key state. Returns an event for edge-triggered bindings (Shift+C).
    pub fn process_key(&mut self, key: KeyCode, state: ElementState) -> Option<CameraInput> {
        let pressed = state == ElementState::Pressed;
        match key {
            KeyCode::ShiftLeft | KeyCode::ShiftRight => self.is_shift_held = pressed,
            KeyCode::ArrowLeft => self.held.left = pressed,
            KeyCode::ArrowRight => self.held.right = pressed,
            KeyCode::ArrowUp => self.held.up = pressed,
            KeyCode::ArrowDown => self.held.down = pressed,
            KeyCode::BracketRight => self.held.widen = pressed,
            KeyCode::BracketLeft => self.held.narrow = pressed,
            KeyCode::KeyC if pressed && self.is_shift_held => {
                log::info!("Resetting camera to default position");
                return Some(CameraInput::Reset);
            }
            _ => (),
        }
        None
    }

    /// Events for every binding currently held down, once per frame.
    pub fn held_inputs(&self) -> Vec<CameraInput> {
        let speed = self.key_orbit_speed;
        let mut inputs = Vec::new();
        if self.held.left {
            inputs.push(CameraInput::Orbit { dx: speed, dy: 0.0 });
        }
        if self.held.right {
            inputs.push(CameraInput::Orbit { dx: -speed, dy: 0.0 });
        }
        if self.held.up {
            inputs.push(CameraInput::Orbit { dx: 0.0, dy: speed });
        }
        if self.held.down {
            inputs.push(CameraInput::Orbit { dx: 0.0, dy: -speed });
        }
        if self.held.narrow {
            inputs.push(CameraInput::NarrowFov);
        }
        if self.held.widen {
            inputs.push(CameraInput::WidenFov);
        }
        inputs
    }

    /// Drops all held state, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.is_mouse_pressed = false;
        self.is_shift_held = false;
        self.held = HeldKeys::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_orbits_only_while_pressed() {
        let mut controller = CameraController::new(5.0);
        assert_eq!(controller.process_mouse_motion((3.0, 4.0)), None);

        controller.process_mouse_button(ElementState::Pressed);
        assert_eq!(
            controller.process_mouse_motion((3.0, 4.0)),
            Some(CameraInput::Orbit { dx: 3.0, dy: -4.0 })
        );

        controller.process_mouse_button(ElementState::Released);
        assert_eq!(controller.process_mouse_motion((3.0, 4.0)), None);
    }

    #[test]
    fn test_scroll_maps_to_zoom() {
        let mut controller = CameraController::new(5.0);
        assert_eq!(
            controller.process_scroll(MouseScrollDelta::LineDelta(0.0, 2.0)),
            CameraInput::Zoom(2.0)
        );
        assert_eq!(
            controller.process_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -40.0))),
            CameraInput::Zoom(-2.0)
        );
    }

    #[test]
    fn test_held_keys_repeat_every_frame() {
        let mut controller = CameraController::new(5.0);
        assert!(controller.held_inputs().is_empty());

        controller.process_key(KeyCode::ArrowLeft, ElementState::Pressed);
        controller.process_key(KeyCode::BracketRight, ElementState::Pressed);
        let expected = vec![
            CameraInput::Orbit { dx: 5.0, dy: 0.0 },
            CameraInput::WidenFov,
        ];
        assert_eq!(controller.held_inputs(), expected);
        assert_eq!(controller.held_inputs(), expected);

        controller.process_key(KeyCode::ArrowLeft, ElementState::Released);
        assert_eq!(controller.held_inputs(), vec![CameraInput::WidenFov]);

        controller.release_all();
        assert!(controller.held_inputs().is_empty());
    }

    #[test]
    fn test_shift_c_resets() {
        let mut controller = CameraController::new(5.0);
        assert_eq!(controller.process_key(KeyCode::KeyC, ElementState::Pressed), None);

        controller.process_key(KeyCode::ShiftLeft, ElementState::Pressed);
        assert_eq!(
            controller.process_key(KeyCode::KeyC, ElementState::Pressed),
            Some(CameraInput::Reset)
        );
        assert_eq!(controller.process_key(KeyCode::KeyC, ElementState::Released), None);
    }
}

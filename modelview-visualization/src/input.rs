//! Keyboard and mouse state polled once per frame

use std::collections::HashSet;

use modelview_core::CameraMovement;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

/// Camera movement bound to `key`, if any
pub fn movement_for_key(key: KeyCode) -> Option<CameraMovement> {
    match key {
        KeyCode::KeyW => Some(CameraMovement::Forward),
        KeyCode::KeyA => Some(CameraMovement::Left),
        KeyCode::KeyS => Some(CameraMovement::Backward),
        KeyCode::KeyD => Some(CameraMovement::Right),
        KeyCode::KeyJ => Some(CameraMovement::Up),
        KeyCode::KeyK => Some(CameraMovement::Down),
        _ => None,
    }
}

/// Order in which held movement keys are applied
const MOVEMENT_KEYS: [KeyCode; 6] = [
    KeyCode::KeyW,
    KeyCode::KeyA,
    KeyCode::KeyS,
    KeyCode::KeyD,
    KeyCode::KeyJ,
    KeyCode::KeyK,
];

/// Held keys and the mouse movement accumulated since the last frame
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    looking: bool,
    cursor: Option<(f64, f64)>,
    look_delta: (f32, f32),
    exit_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if key == KeyCode::Escape && pressed {
            self.exit_requested = true;
        }
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
    }

    /// The right button starts and ends look-around dragging
    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if button == MouseButton::Right {
            self.looking = pressed;
        }
    }

    pub fn handle_cursor_moved(&mut self, x: f64, y: f64) {
        if let (true, Some((last_x, last_y))) = (self.looking, self.cursor) {
            self.look_delta.0 += (x - last_x) as f32;
            self.look_delta.1 += (y - last_y) as f32;
        }
        self.cursor = Some((x, y));
    }

    /// Forget held keys and drags, e.g. when the window loses focus
    pub fn release_all(&mut self) {
        self.held.clear();
        self.looking = false;
        self.look_delta = (0.0, 0.0);
    }

    pub fn is_looking(&self) -> bool {
        self.looking
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Movements for every held binding, in W/A/S/D/J/K order
    pub fn held_movements(&self) -> Vec<CameraMovement> {
        MOVEMENT_KEYS
            .iter()
            .filter(|key| self.held.contains(key))
            .filter_map(|&key| movement_for_key(key))
            .collect()
    }

    /// Mouse movement while dragging since the previous call
    pub fn take_look_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.look_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(movement_for_key(KeyCode::KeyW), Some(CameraMovement::Forward));
        assert_eq!(movement_for_key(KeyCode::KeyA), Some(CameraMovement::Left));
        assert_eq!(movement_for_key(KeyCode::KeyS), Some(CameraMovement::Backward));
        assert_eq!(movement_for_key(KeyCode::KeyD), Some(CameraMovement::Right));
        assert_eq!(movement_for_key(KeyCode::KeyJ), Some(CameraMovement::Up));
        assert_eq!(movement_for_key(KeyCode::KeyK), Some(CameraMovement::Down));
        assert_eq!(movement_for_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_held_keys_repeat_until_released() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::KeyD, true);
        input.handle_key(KeyCode::KeyW, true);
        input.handle_key(KeyCode::KeyX, true);
        assert_eq!(
            input.held_movements(),
            vec![CameraMovement::Forward, CameraMovement::Right]
        );
        assert_eq!(input.held_movements().len(), 2);

        input.handle_key(KeyCode::KeyW, false);
        assert_eq!(input.held_movements(), vec![CameraMovement::Right]);
    }

    #[test]
    fn test_look_delta_only_while_dragging() {
        let mut input = InputState::new();
        input.handle_cursor_moved(10.0, 10.0);
        input.handle_cursor_moved(20.0, 15.0);
        assert_eq!(input.take_look_delta(), (0.0, 0.0));

        input.handle_mouse_button(MouseButton::Right, true);
        input.handle_cursor_moved(25.0, 13.0);
        input.handle_cursor_moved(30.0, 14.0);
        assert_eq!(input.take_look_delta(), (10.0, -1.0));
        assert_eq!(input.take_look_delta(), (0.0, 0.0));

        input.handle_mouse_button(MouseButton::Left, false);
        assert!(input.is_looking());
        input.handle_mouse_button(MouseButton::Right, false);
        input.handle_cursor_moved(50.0, 50.0);
        assert_eq!(input.take_look_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_escape_requests_exit() {
        let mut input = InputState::new();
        assert!(!input.exit_requested());
        input.handle_key(KeyCode::Escape, true);
        assert!(input.exit_requested());
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::new();
        input.handle_key(KeyCode::KeyS, true);
        input.handle_mouse_button(MouseButton::Right, true);
        input.release_all();
        assert!(input.held_movements().is_empty());
        assert!(!input.is_looking());
    }
}

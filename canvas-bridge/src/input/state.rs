use super::event::{Modifiers, MouseButton};

pub const KEY_COUNT: usize = 256;

/// Held-button, key and modifier state as last reported by native callbacks.
///
/// Mutators only record state; they never produce events.
#[derive(Clone, Debug)]
pub struct InputState {
    position: [f64; 2],
    left: bool,
    middle: bool,
    right: bool,
    modifiers: Modifiers,
    wheel_delta: f64,
    inside: bool,
    keys: [bool; KEY_COUNT],
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            left: false,
            middle: false,
            right: false,
            modifiers: Modifiers::default(),
            wheel_delta: 0.0,
            inside: true,
            keys: [false; KEY_COUNT],
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Middle => self.middle = pressed,
            MouseButton::Right => self.right = pressed,
            _ => {}
        }
    }

    pub fn on_key(&mut self, key_code: i32, pressed: bool) {
        let Ok(index) = usize::try_from(key_code) else {
            return;
        };

        if let Some(slot) = self.keys.get_mut(index) {
            *slot = pressed;
        }
    }

    pub fn on_modifier_change(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        self.position = [x, y];
    }

    pub fn on_pointer_enter_leave(&mut self, entered: bool) {
        self.inside = entered;

        // Releases that happen outside the window are never reported.
        if !entered {
            self.left = false;
            self.middle = false;
            self.right = false;
        }
    }

    pub fn on_wheel(&mut self, delta: f64) {
        self.wheel_delta = delta;
    }

    pub fn position(&self) -> [f64; 2] {
        self.position
    }

    pub fn button_mask(&self) -> u8 {
        (self.left as u8) | ((self.middle as u8) << 1) | ((self.right as u8) << 2)
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Middle => self.middle,
            MouseButton::Right => self.right,
            _ => false,
        }
    }

    pub fn is_key_pressed(&self, key_code: i32) -> bool {
        usize::try_from(key_code)
            .ok()
            .and_then(|index| self.keys.get(index).copied())
            .unwrap_or(false)
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn last_wheel_delta(&self) -> f64 {
        self.wheel_delta
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }
}

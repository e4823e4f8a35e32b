use serde::{Deserialize, Serialize};

/// Canonical event kinds. The lowercase names are the stable vocabulary the
/// embedded engine keys its event construction on.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    PointerMove,
    PointerDown,
    PointerUp,
    PointerOut,
    MouseMove,
    MouseDown,
    MouseUp,
    MouseOut,
    Wheel,
    KeyDown,
    KeyUp,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PointerMove => "pointermove",
            Self::PointerDown => "pointerdown",
            Self::PointerUp => "pointerup",
            Self::PointerOut => "pointerout",
            Self::MouseMove => "mousemove",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseOut => "mouseout",
            Self::Wheel => "wheel",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    /// Button id in DOM numbering.
    pub fn id(self) -> i32 {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
            Self::Back => 3,
            Self::Forward => 4,
            Self::Other(n) => i32::from(n),
        }
    }

    /// Bit in the held-buttons mask, for the three tracked buttons.
    pub fn mask_bit(self) -> Option<u8> {
        match self {
            Self::Left => Some(1),
            Self::Middle => Some(2),
            Self::Right => Some(4),
            _ => None,
        }
    }
}

#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize,
)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

pub const NO_BUTTON: i32 = -1;
pub const NO_KEY: i32 = -1;

/// One canonical input record. Every field is captured when the native
/// callback fires and never re-derived afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputEvent {
    pub kind: EventKind,
    pub position: [f64; 2],
    pub movement: [f64; 2],
    pub button: i32,
    pub button_mask: u8,
    pub modifiers: Modifiers,
    pub wheel_delta: f64,
    pub key_code: i32,
    /// DOM `code` name for key events, empty otherwise.
    pub key_name: &'static str,
}

impl InputEvent {
    pub fn new(
        kind: EventKind,
        position: [f64; 2],
        button_mask: u8,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            kind,
            position,
            movement: [0.0, 0.0],
            button: NO_BUTTON,
            button_mask,
            modifiers,
            wheel_delta: 0.0,
            key_code: NO_KEY,
            key_name: "",
        }
    }

    pub fn with_movement(mut self, movement: [f64; 2]) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_button(mut self, button: i32) -> Self {
        self.button = button;
        self
    }

    pub fn with_wheel_delta(mut self, delta: f64) -> Self {
        self.wheel_delta = delta;
        self
    }

    pub fn with_key(mut self, key_code: i32, key_name: &'static str) -> Self {
        self.key_code = key_code;
        self.key_name = key_name;
        self
    }
}

use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::ModifiersState;

use super::event::{Modifiers, MouseButton};
use super::keys::key_id;
use super::synth::NativeMessage;
use crate::pixels::SurfaceSize;

/// Pixel-precise scroll deltas are converted to line units using this many
/// pixels per line.
pub const PIXELS_PER_LINE: f64 = 100.0;

/// Reduces a winit window event to the bridge's native message set. Events the
/// bridge does not consume yield `None`.
pub fn native_message(event: &WindowEvent) -> Option<NativeMessage> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            Some(NativeMessage::PointerMove {
                x: position.x,
                y: position.y,
            })
        }
        WindowEvent::MouseInput { state, button, .. } => {
            Some(NativeMessage::ButtonChange {
                button: mouse_button(*button),
                pressed: *state == ElementState::Pressed,
            })
        }
        WindowEvent::MouseWheel { delta, .. } => Some(NativeMessage::Wheel {
            delta: wheel_lines(*delta),
        }),
        WindowEvent::CursorEntered { .. } => {
            Some(NativeMessage::EnterLeave { entered: true })
        }
        WindowEvent::CursorLeft { .. } => {
            Some(NativeMessage::EnterLeave { entered: false })
        }
        WindowEvent::ModifiersChanged(modifiers) => {
            Some(NativeMessage::ModifiersChange(modifiers_from(
                modifiers.state(),
            )))
        }
        WindowEvent::KeyboardInput { event, .. } => {
            Some(NativeMessage::KeyChange {
                key: key_id(event.physical_key),
                pressed: event.state == ElementState::Pressed,
            })
        }
        WindowEvent::Resized(size) => {
            Some(NativeMessage::Resize(SurfaceSize::new(size.width, size.height)))
        }
        _ => None,
    }
}

pub fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Back => MouseButton::Back,
        winit::event::MouseButton::Forward => MouseButton::Forward,
        winit::event::MouseButton::Other(n) => MouseButton::Other(n),
    }
}

pub fn wheel_lines(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => f64::from(y),
        MouseScrollDelta::PixelDelta(position) => position.y / PIXELS_PER_LINE,
    }
}

pub fn modifiers_from(state: ModifiersState) -> Modifiers {
    Modifiers {
        ctrl: state.control_key(),
        shift: state.shift_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

use winit::keyboard::{KeyCode, PhysicalKey};

use super::event::NO_KEY;
use super::synth::KeyId;

pub const UNIDENTIFIED: &str = "Unidentified";

/// Maps a physical key to its legacy DOM key code and DOM `code` name.
/// Keys without a legacy code map to `-1`/`"Unidentified"`.
pub fn key_id(key: PhysicalKey) -> KeyId {
    let PhysicalKey::Code(code) = key else {
        return unidentified();
    };

    let (code, name) = match code {
        KeyCode::KeyA => (65, "KeyA"),
        KeyCode::KeyB => (66, "KeyB"),
        KeyCode::KeyC => (67, "KeyC"),
        KeyCode::KeyD => (68, "KeyD"),
        KeyCode::KeyE => (69, "KeyE"),
        KeyCode::KeyF => (70, "KeyF"),
        KeyCode::KeyG => (71, "KeyG"),
        KeyCode::KeyH => (72, "KeyH"),
        KeyCode::KeyI => (73, "KeyI"),
        KeyCode::KeyJ => (74, "KeyJ"),
        KeyCode::KeyK => (75, "KeyK"),
        KeyCode::KeyL => (76, "KeyL"),
        KeyCode::KeyM => (77, "KeyM"),
        KeyCode::KeyN => (78, "KeyN"),
        KeyCode::KeyO => (79, "KeyO"),
        KeyCode::KeyP => (80, "KeyP"),
        KeyCode::KeyQ => (81, "KeyQ"),
        KeyCode::KeyR => (82, "KeyR"),
        KeyCode::KeyS => (83, "KeyS"),
        KeyCode::KeyT => (84, "KeyT"),
        KeyCode::KeyU => (85, "KeyU"),
        KeyCode::KeyV => (86, "KeyV"),
        KeyCode::KeyW => (87, "KeyW"),
        KeyCode::KeyX => (88, "KeyX"),
        KeyCode::KeyY => (89, "KeyY"),
        KeyCode::KeyZ => (90, "KeyZ"),
        KeyCode::Digit0 => (48, "Digit0"),
        KeyCode::Digit1 => (49, "Digit1"),
        KeyCode::Digit2 => (50, "Digit2"),
        KeyCode::Digit3 => (51, "Digit3"),
        KeyCode::Digit4 => (52, "Digit4"),
        KeyCode::Digit5 => (53, "Digit5"),
        KeyCode::Digit6 => (54, "Digit6"),
        KeyCode::Digit7 => (55, "Digit7"),
        KeyCode::Digit8 => (56, "Digit8"),
        KeyCode::Digit9 => (57, "Digit9"),
        KeyCode::F1 => (112, "F1"),
        KeyCode::F2 => (113, "F2"),
        KeyCode::F3 => (114, "F3"),
        KeyCode::F4 => (115, "F4"),
        KeyCode::F5 => (116, "F5"),
        KeyCode::F6 => (117, "F6"),
        KeyCode::F7 => (118, "F7"),
        KeyCode::F8 => (119, "F8"),
        KeyCode::F9 => (120, "F9"),
        KeyCode::F10 => (121, "F10"),
        KeyCode::F11 => (122, "F11"),
        KeyCode::F12 => (123, "F12"),
        KeyCode::Numpad0 => (96, "Numpad0"),
        KeyCode::Numpad1 => (97, "Numpad1"),
        KeyCode::Numpad2 => (98, "Numpad2"),
        KeyCode::Numpad3 => (99, "Numpad3"),
        KeyCode::Numpad4 => (100, "Numpad4"),
        KeyCode::Numpad5 => (101, "Numpad5"),
        KeyCode::Numpad6 => (102, "Numpad6"),
        KeyCode::Numpad7 => (103, "Numpad7"),
        KeyCode::Numpad8 => (104, "Numpad8"),
        KeyCode::Numpad9 => (105, "Numpad9"),
        KeyCode::Backspace => (8, "Backspace"),
        KeyCode::Tab => (9, "Tab"),
        KeyCode::Enter => (13, "Enter"),
        KeyCode::ShiftLeft => (16, "ShiftLeft"),
        KeyCode::ShiftRight => (16, "ShiftRight"),
        KeyCode::ControlLeft => (17, "ControlLeft"),
        KeyCode::ControlRight => (17, "ControlRight"),
        KeyCode::AltLeft => (18, "AltLeft"),
        KeyCode::AltRight => (18, "AltRight"),
        KeyCode::Pause => (19, "Pause"),
        KeyCode::CapsLock => (20, "CapsLock"),
        KeyCode::Escape => (27, "Escape"),
        KeyCode::Space => (32, "Space"),
        KeyCode::PageUp => (33, "PageUp"),
        KeyCode::PageDown => (34, "PageDown"),
        KeyCode::End => (35, "End"),
        KeyCode::Home => (36, "Home"),
        KeyCode::ArrowLeft => (37, "ArrowLeft"),
        KeyCode::ArrowUp => (38, "ArrowUp"),
        KeyCode::ArrowRight => (39, "ArrowRight"),
        KeyCode::ArrowDown => (40, "ArrowDown"),
        KeyCode::Insert => (45, "Insert"),
        KeyCode::Delete => (46, "Delete"),
        KeyCode::SuperLeft => (91, "MetaLeft"),
        KeyCode::SuperRight => (92, "MetaRight"),
        KeyCode::ContextMenu => (93, "ContextMenu"),
        KeyCode::NumpadMultiply => (106, "NumpadMultiply"),
        KeyCode::NumpadAdd => (107, "NumpadAdd"),
        KeyCode::NumpadSubtract => (109, "NumpadSubtract"),
        KeyCode::NumpadDecimal => (110, "NumpadDecimal"),
        KeyCode::NumpadDivide => (111, "NumpadDivide"),
        KeyCode::NumpadEnter => (13, "NumpadEnter"),
        KeyCode::NumLock => (144, "NumLock"),
        KeyCode::ScrollLock => (145, "ScrollLock"),
        KeyCode::Semicolon => (186, "Semicolon"),
        KeyCode::Equal => (187, "Equal"),
        KeyCode::Comma => (188, "Comma"),
        KeyCode::Minus => (189, "Minus"),
        KeyCode::Period => (190, "Period"),
        KeyCode::Slash => (191, "Slash"),
        KeyCode::Backquote => (192, "Backquote"),
        KeyCode::BracketLeft => (219, "BracketLeft"),
        KeyCode::Backslash => (220, "Backslash"),
        KeyCode::BracketRight => (221, "BracketRight"),
        KeyCode::Quote => (222, "Quote"),
        _ => return unidentified(),
    };

    KeyId { code, name }
}

fn unidentified() -> KeyId {
    KeyId {
        code: NO_KEY,
        name: UNIDENTIFIED,
    }
}

use crate::keyboard::{Key, KeyMapping};

// Tables are matched with eq_ignore_ascii_case, so specs work in any case.

const MODIFIERS: &[(&str, Key)] = &[
    ("SHIFT", Key::LeftShift),
    ("LSHIFT", Key::LeftShift),
    ("LEFTSHIFT", Key::LeftShift),
    ("RSHIFT", Key::RightShift),
    ("RIGHTSHIFT", Key::RightShift),
    ("CTRL", Key::LeftControl),
    ("CONTROL", Key::LeftControl),
    ("LCTRL", Key::LeftControl),
    ("LEFTCTRL", Key::LeftControl),
    ("RCTRL", Key::RightControl),
    ("RIGHTCTRL", Key::RightControl),
    ("ALT", Key::LeftAlt),
    ("LALT", Key::LeftAlt),
    ("LEFTALT", Key::LeftAlt),
    ("RALT", Key::RightAlt),
    ("RIGHTALT", Key::RightAlt),
    ("ALTGR", Key::RightAlt),
    ("META", Key::LeftGui),
    ("WIN", Key::LeftGui),
    ("CMD", Key::LeftGui),
    ("GUI", Key::LeftGui),
    ("LMETA", Key::LeftGui),
    ("LEFTMETA", Key::LeftGui),
    ("RMETA", Key::RightGui),
    ("RIGHTMETA", Key::RightGui),
    ("RWIN", Key::RightGui),
];

const NAMED: &[(&str, Key)] = &[
    ("SPACE", Key::Space),
    ("SPC", Key::Space),
    ("ENTER", Key::Enter),
    ("RETURN", Key::Enter),
    ("TAB", Key::Tab),
    ("ESC", Key::Escape),
    ("ESCAPE", Key::Escape),
    ("BACKSPACE", Key::Backspace),
    ("BS", Key::Backspace),
    ("DELETE", Key::Delete),
    ("DEL", Key::Delete),
    ("CAPSLOCK", Key::CapsLock),
    ("CAPS", Key::CapsLock),
    ("HOME", Key::Home),
    ("END", Key::End),
    ("PAGEUP", Key::PageUp),
    ("PGUP", Key::PageUp),
    ("PAGEDOWN", Key::PageDown),
    ("PGDN", Key::PageDown),
    ("UP", Key::UpArrow),
    ("DOWN", Key::DownArrow),
    ("LEFT", Key::LeftArrow),
    ("RIGHT", Key::RightArrow),
    ("COMMA", Key::Comma),
    ("DOT", Key::Period),
    ("PERIOD", Key::Period),
    ("SLASH", Key::Slash),
    ("MINUS", Key::HyphenMinus),
    ("DASH", Key::HyphenMinus),
    ("HYPHEN", Key::HyphenMinus),
    ("EQUAL", Key::Equal),
    ("EQUALS", Key::Equal),
    ("LEFTBRACKET", Key::LeftSquareBracket),
    ("LBRACKET", Key::LeftSquareBracket),
    ("RIGHTBRACKET", Key::RightSquareBracket),
    ("RBRACKET", Key::RightSquareBracket),
    ("BACKSLASH", Key::Backslash),
    ("SEMICOLON", Key::Semicolon),
    ("APOSTROPHE", Key::Apostrophe),
    ("QUOTE", Key::Apostrophe),
    ("GRAVE", Key::Grave),
    ("BACKTICK", Key::Grave),
    ("F1", Key::F1),
    ("F2", Key::F2),
    ("F3", Key::F3),
    ("F4", Key::F4),
    ("F5", Key::F5),
    ("F6", Key::F6),
    ("F7", Key::F7),
    ("F8", Key::F8),
    ("F9", Key::F9),
    ("F10", Key::F10),
    ("F11", Key::F11),
    ("F12", Key::F12),
];

const LETTERS: [Key; 26] = [
    Key::A,
    Key::B,
    Key::C,
    Key::D,
    Key::E,
    Key::F,
    Key::G,
    Key::H,
    Key::I,
    Key::J,
    Key::K,
    Key::L,
    Key::M,
    Key::N,
    Key::O,
    Key::P,
    Key::Q,
    Key::R,
    Key::S,
    Key::T,
    Key::U,
    Key::V,
    Key::W,
    Key::X,
    Key::Y,
    Key::Z,
];

const DIGITS: [Key; 10] = [
    Key::Digit0,
    Key::Digit1,
    Key::Digit2,
    Key::Digit3,
    Key::Digit4,
    Key::Digit5,
    Key::Digit6,
    Key::Digit7,
    Key::Digit8,
    Key::Digit9,
];

/// Resolves a key-spec string into a table entry.
///
/// Grammar: `BASEKEY`, `MODIFIER+BASEKEY` or `BASEKEY+MODIFIER`. A modifier
/// token that matches nothing contributes no bits but does not fail the
/// spec; an unknown base key does. A modifier name standing alone (or as
/// the base of a combination) yields a modifier-only mapping with no
/// key-code slot.
pub fn resolve(spec: &str) -> Option<KeyMapping> {
    let spec = spec.trim();
    let (mask, base) = match spec.split_once('+') {
        Some((left, right)) => {
            let (left, right) = (left.trim(), right.trim());
            if let Some(bit) = modifier_bit(left) {
                (bit, right)
            } else if let Some(bit) = modifier_bit(right) {
                (bit, left)
            } else {
                (0, right)
            }
        }
        None => (0, spec),
    };

    if let Some(key) = base_key(base) {
        Some(KeyMapping::new(key.key_code(), mask))
    } else if let Some(bit) = modifier_bit(base) {
        Some(KeyMapping::new(0, mask | bit))
    } else {
        None
    }
}

fn modifier_bit(token: &str) -> Option<u8> {
    MODIFIERS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, key)| key.modifier_key_flag())
}

fn base_key(token: &str) -> Option<Key> {
    if token.len() == 1 {
        let b = token.as_bytes()[0].to_ascii_uppercase();
        match b {
            b'A'..=b'Z' => return Some(LETTERS[usize::from(b - b'A')]),
            b'0'..=b'9' => return Some(DIGITS[usize::from(b - b'0')]),
            b',' => return Some(Key::Comma),
            b'.' => return Some(Key::Period),
            b'/' => return Some(Key::Slash),
            b'-' => return Some(Key::HyphenMinus),
            b'=' => return Some(Key::Equal),
            b'[' => return Some(Key::LeftSquareBracket),
            b']' => return Some(Key::RightSquareBracket),
            b'\\' => return Some(Key::Backslash),
            b';' => return Some(Key::Semicolon),
            b'\'' => return Some(Key::Apostrophe),
            b'`' => return Some(Key::Grave),
            _ => {}
        }
    }
    NAMED
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(token))
        .map(|(_, key)| *key)
}

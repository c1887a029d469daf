use super::parser::{is_any, parse_bool, parse_duration, parse_switch_note};
use crate::keyboard::Profile;

pub const SWITCH_NOTE_DISABLED: u8 = 255;

pub(crate) const FAST_PRESS_KEYS: &[&str] = &["FAST_PRESS_MODE", "FASTPRESS"];
pub(crate) const DURATION_KEYS: &[&str] = &["PRESS_DURATION", "DURATION"];
pub(crate) const SWITCH_NOTE_KEYS: &[&str] =
    &["PROFILE_SWITCH_NOTE", "PROFILE_SWITCH", "SWITCH_NOTE"];

/// Global settings, read once at startup. Also the source of per-profile
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub fast_press_mode: bool,
    pub press_duration_ms: u16,
    pub profile_switch_note: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            fast_press_mode: true,
            press_duration_ms: 0,
            profile_switch_note: 24,
        }
    }
}

impl Config {
    /// Applies one `KEY=VALUE` line. Unknown keys and out-of-range values
    /// leave the prior state untouched.
    pub fn apply(&mut self, key: &str, value: &str) {
        if is_any(key, FAST_PRESS_KEYS) {
            self.fast_press_mode = parse_bool(value);
        } else if is_any(key, DURATION_KEYS) {
            if let Some(ms) = parse_duration(value) {
                self.press_duration_ms = ms;
            }
        } else if is_any(key, SWITCH_NOTE_KEYS) {
            if let Some(note) = parse_switch_note(value) {
                self.profile_switch_note = note;
            }
        }
    }
}

/// The two settings a mapping file may override for its own profile.
/// Returns false when the line is not a setting at all, so the caller can
/// try it as a note mapping instead.
pub(crate) fn apply_profile_setting(profile: &mut Profile, key: &str, value: &str) -> bool {
    if is_any(key, FAST_PRESS_KEYS) {
        profile.fast_press_mode = parse_bool(value);
        true
    } else if is_any(key, DURATION_KEYS) {
        if let Some(ms) = parse_duration(value) {
            profile.press_duration_ms = ms;
        }
        true
    } else {
        false
    }
}

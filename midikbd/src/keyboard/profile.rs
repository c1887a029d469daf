use heapless::String;

use crate::config::Config;

use super::{Key, KeyMapping};

pub const NOTE_COUNT: usize = 128;
pub const PROFILE_NAME_LEN: usize = 32;

/// One complete note-to-key table plus the fast-press settings it was loaded
/// with. Settings default from the global config and are fixed after load.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String<PROFILE_NAME_LEN>,
    pub is_valid: bool,
    pub fast_press_mode: bool,
    pub press_duration_ms: u16,
    mappings: [KeyMapping; NOTE_COUNT],
}

impl Profile {
    pub fn new(name: &str, defaults: &Config) -> Self {
        let mut owned: String<PROFILE_NAME_LEN> = String::new();
        for c in name.chars() {
            if owned.push(c).is_err() {
                break;
            }
        }
        Profile {
            name: owned,
            is_valid: false,
            fast_press_mode: defaults.fast_press_mode,
            press_duration_ms: defaults.press_duration_ms,
            mappings: [KeyMapping::UNMAPPED; NOTE_COUNT],
        }
    }

    /// The built-in profile used when no mapping source exists, so a valid
    /// active profile is available from the first tick.
    pub fn fallback(defaults: &Config) -> Self {
        let mut profile = Profile::new("DEFAULT", defaults);
        profile.set_mapping(60, KeyMapping::new(Key::H.key_code(), 0));
        profile.set_mapping(58, KeyMapping::new(Key::G.key_code(), 0));
        profile.is_valid = true;
        profile
    }

    /// Out-of-range notes read as unmapped.
    pub fn mapping(&self, note: u8) -> KeyMapping {
        self.mappings
            .get(usize::from(note))
            .copied()
            .unwrap_or(KeyMapping::UNMAPPED)
    }

    pub fn set_mapping(&mut self, note: u8, mapping: KeyMapping) {
        if let Some(entry) = self.mappings.get_mut(usize::from(note)) {
            *entry = mapping;
        }
    }
}

/// One note-table entry: a key-code slot value plus a modifier bitmask.
///
/// `key_code == 0` with a non-zero mask is a modifier-only mapping, letting a
/// pad hold Shift/Ctrl/… without producing a character key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyMapping {
    pub key_code: u8,
    pub modifiers: u8,
}

impl KeyMapping {
    pub const UNMAPPED: KeyMapping = KeyMapping {
        key_code: 0,
        modifiers: 0,
    };

    pub const fn new(key_code: u8, modifiers: u8) -> Self {
        KeyMapping {
            key_code,
            modifiers,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        self.key_code == 0 && self.modifiers == 0
    }

    pub fn is_modifier_only(&self) -> bool {
        self.key_code == 0 && self.modifiers != 0
    }
}

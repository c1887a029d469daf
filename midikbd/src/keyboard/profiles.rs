use heapless::Vec;

use crate::config::Config;

use super::Profile;

pub const MAX_PROFILES: usize = 8;

/// The loaded profile collection plus the active index. The active index
/// always names a valid profile; if construction sees none, the built-in
/// fallback replaces the whole list.
#[derive(Debug)]
pub struct Profiles {
    profiles: Vec<Profile, MAX_PROFILES>,
    current: usize,
}

impl Profiles {
    pub fn new(mut profiles: Vec<Profile, MAX_PROFILES>, defaults: &Config) -> Self {
        if !profiles.iter().any(|p| p.is_valid) {
            profiles.clear();
            let _ = profiles.push(Profile::fallback(defaults));
        }
        let current = profiles
            .iter()
            .position(|p| p.is_valid)
            .unwrap_or_default();
        Profiles { profiles, current }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn active(&self) -> &Profile {
        &self.profiles[self.current]
    }

    pub fn active_index(&self) -> usize {
        self.current
    }

    pub fn get(&self, index: usize) -> Option<&Profile> {
        self.profiles.get(index)
    }

    pub fn can_switch_to(&self, index: usize) -> bool {
        self.profiles.get(index).is_some_and(|p| p.is_valid)
    }

    /// Moves the active index; the caller is responsible for releasing any
    /// held state first. Returns false for out-of-range or invalid targets.
    pub fn activate(&mut self, index: usize) -> bool {
        if !self.can_switch_to(index) {
            return false;
        }
        self.current = index;
        true
    }

    pub fn next_index(&self) -> usize {
        (self.current + 1) % self.profiles.len()
    }
}

use heapless::Vec;

use super::{KeyMapping, NUM_ROLLOVER};

/// Insertion-ordered set of currently held regular keys, bounded by the
/// 6-key rollover of a keyboard report. Uniqueness is on the whole
/// (key code, modifiers) pair; once full, new keys are dropped rather than
/// evicting older ones.
#[derive(Debug, Default)]
pub struct PressedKeys {
    keys: Vec<KeyMapping, NUM_ROLLOVER>,
}

impl PressedKeys {
    pub fn new() -> Self {
        PressedKeys { keys: Vec::new() }
    }

    /// Returns false when the pair was already held or the set is full.
    pub fn push(&mut self, mapping: KeyMapping) -> bool {
        if self.keys.iter().any(|k| *k == mapping) {
            return false;
        }
        self.keys.push(mapping).is_ok()
    }

    /// Removes the exact pair, compacting without reordering the survivors.
    /// Removing an absent pair is a no-op.
    pub fn remove(&mut self, mapping: &KeyMapping) -> bool {
        let Some(index) = self.keys.iter().position(|k| k == mapping) else {
            return false;
        };
        for i in index..self.keys.len() - 1 {
            self.keys[i] = self.keys[i + 1];
        }
        self.keys.pop();
        true
    }

    pub fn first(&self) -> Option<KeyMapping> {
        self.keys.first().copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[KeyMapping] {
        &self.keys
    }
}

use heapless::Vec;

use super::{KeyMapping, NUM_ROLLOVER};

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FastPressTimer {
    pub mapping: KeyMapping,
    pub release_at_ms: u64,
}

/// Pending timed releases for fast-press mode. Bounded like the pressed-key
/// set; a timer that does not fit is dropped and its key stays held until a
/// profile switch clears it.
#[derive(Debug, Default)]
pub struct FastPressTimers {
    timers: Vec<FastPressTimer, NUM_ROLLOVER>,
}

impl FastPressTimers {
    pub fn new() -> Self {
        FastPressTimers { timers: Vec::new() }
    }

    pub fn schedule(&mut self, mapping: KeyMapping, release_at_ms: u64) -> bool {
        self.timers
            .push(FastPressTimer {
                mapping,
                release_at_ms,
            })
            .is_ok()
    }

    /// Takes the latest-scheduled elapsed timer, compacting the survivors in
    /// order. Call repeatedly until `None` to drain everything due.
    pub fn pop_expired(&mut self, now_ms: u64) -> Option<KeyMapping> {
        let index = self
            .timers
            .iter()
            .rposition(|t| now_ms >= t.release_at_ms)?;
        let timer = self.timers[index];
        for i in index..self.timers.len() - 1 {
            self.timers[i] = self.timers[i + 1];
        }
        self.timers.pop();
        Some(timer.mapping)
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

use heapless::Vec;

use super::KeyMapping;

/// Keys per report, fixed by the boot-keyboard report layout.
pub const NUM_ROLLOVER: usize = 6;

/// One full keyboard state as the host sees it: up to six key codes plus the
/// modifier byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub modifier: u8,
    pub key_codes: [u8; NUM_ROLLOVER],
}

impl Report {
    pub const fn empty() -> Self {
        Report {
            modifier: 0,
            key_codes: [0; NUM_ROLLOVER],
        }
    }
}

impl Default for Report {
    fn default() -> Self {
        Report::empty()
    }
}

/// Turns the held keys and the standing modifier mask into the report
/// sequence for one refresh.
///
/// Keys are kept in press order. Entries that disagree on modifiers cannot
/// share a report without merging their modifiers onto each other's keys, so
/// the ordered list is split into maximal runs of consecutive entries with
/// equal modifiers and one report is emitted per run, back to back. The
/// standing mask from modifier-only pads is OR-ed into every report.
pub fn batch(keys: &[KeyMapping], modifiers: u8) -> Vec<Report, NUM_ROLLOVER> {
    let mut reports: Vec<Report, NUM_ROLLOVER> = Vec::new();

    let keys: Vec<&KeyMapping, NUM_ROLLOVER> =
        keys.iter().filter(|k| k.key_code != 0).take(NUM_ROLLOVER).collect();

    if keys.is_empty() {
        let mut report = Report::empty();
        report.modifier = modifiers;
        let _ = reports.push(report);
        return reports;
    }

    let mut start = 0;
    while start < keys.len() {
        let run_modifier = keys[start].modifiers;
        let mut end = start + 1;
        while end < keys.len() && keys[end].modifiers == run_modifier {
            end += 1;
        }

        let mut report = Report::empty();
        report.modifier = run_modifier | modifiers;
        for (slot, key) in keys[start..end].iter().enumerate() {
            report.key_codes[slot] = key.key_code;
        }
        let _ = reports.push(report);

        start = end;
    }
    reports
}

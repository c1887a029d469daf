use super::MidiEvent;

/// One enumerated MIDI input. `poll` hands over at most one decoded event
/// and never blocks; the polling loop calls it once per source per tick.
pub trait MidiSource {
    fn poll(&mut self) -> Option<MidiEvent>;
}

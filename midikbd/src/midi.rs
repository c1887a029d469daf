mod event;
mod serial;
mod source;
pub mod usb_midi;

pub use event::MidiEvent;
pub use serial::SerialMidi;
pub use source::MidiSource;

use embedded_hal_0_2::serial;

use super::{MidiEvent, MidiSource};

/// MIDI over a DIN-5 (or TRS) serial link at 31250 baud.
///
/// Decodes the byte stream incrementally: running status is honored,
/// real-time bytes pass through without disturbing a message in flight, and
/// system-common bytes cancel the running status as the wire protocol
/// requires. Channel-voice messages other than note on/off are consumed at
/// their proper length so the decoder stays in sync.
pub struct SerialMidi<R> {
    reader: R,
    status: u8,
    data: [u8; 2],
    have: usize,
}

impl<R> SerialMidi<R> {
    pub fn new(reader: R) -> Self {
        SerialMidi {
            reader,
            status: 0,
            data: [0; 2],
            have: 0,
        }
    }

    fn feed(&mut self, byte: u8) -> Option<MidiEvent> {
        if byte >= 0xf8 {
            // Real-time: clock, start, stop... transparent to the stream.
            return None;
        }
        if byte >= 0xf0 {
            self.status = 0;
            self.have = 0;
            return None;
        }
        if byte >= 0x80 {
            self.status = byte;
            self.have = 0;
            return None;
        }

        if self.status == 0 {
            // Stray data byte with no status to attach it to.
            return None;
        }
        self.data[self.have] = byte;
        self.have += 1;
        if self.have < data_length(self.status) {
            return None;
        }
        self.have = 0; // status stays latched for running status

        match self.status >> 4 {
            0x9 => Some(MidiEvent::NoteOn {
                note: self.data[0],
                velocity: self.data[1],
            }),
            0x8 => Some(MidiEvent::NoteOff { note: self.data[0] }),
            _ => None,
        }
    }
}

fn data_length(status: u8) -> usize {
    match status >> 4 {
        0xc | 0xd => 1, // program change, channel pressure
        _ => 2,
    }
}

impl<R: serial::Read<u8>> MidiSource for SerialMidi<R> {
    fn poll(&mut self) -> Option<MidiEvent> {
        loop {
            let byte = match self.reader.read() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => return None,
                Err(nb::Error::Other(_)) => {
                    warn!("serial read error");
                    return None;
                }
            };
            if let Some(event) = self.feed(byte) {
                return Some(event);
            }
        }
    }
}

//! USB-MIDI event packets, as read from a class-compliant device through a
//! host stack. Every packet is 4 bytes: a cable/code-index byte followed by
//! the MIDI message itself.

use super::MidiEvent;

const CIN_NOTE_OFF: u8 = 0x8;
const CIN_NOTE_ON: u8 = 0x9;

pub fn decode_packet(packet: &[u8; 4]) -> Option<MidiEvent> {
    match packet[0] & 0x0f {
        CIN_NOTE_ON => Some(MidiEvent::NoteOn {
            note: packet[2] & 0x7f,
            velocity: packet[3] & 0x7f,
        }),
        CIN_NOTE_OFF => Some(MidiEvent::NoteOff {
            note: packet[2] & 0x7f,
        }),
        _ => None,
    }
}

/// Note events in one bulk transfer, in wire order. Non-note packets and a
/// ragged tail are skipped.
pub fn events(buffer: &[u8]) -> impl Iterator<Item = MidiEvent> + '_ {
    buffer
        .chunks_exact(4)
        .filter_map(|chunk| <&[u8; 4]>::try_from(chunk).ok())
        .filter_map(decode_packet)
}

/// Channel voice messages the voice understands, already parsed from bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Parse a raw channel message. Running status and system messages are not handled.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let data1 = *data.first()? & 0x7F;
        let data2 = data.get(1).map(|b| b & 0x7F);

        let event = match status & 0xF0 {
            0x80 => MidiEvent::NoteOff {
                channel,
                key: data1,
                velocity: data2?,
            },
            0x90 => MidiEvent::NoteOn {
                channel,
                key: data1,
                velocity: data2?,
            },
            0xB0 => MidiEvent::ControlChange {
                channel,
                controller: data1,
                value: data2?,
            },
            0xC0 => MidiEvent::ProgramChange {
                channel,
                program: data1,
            },
            0xE0 => MidiEvent::PitchBend {
                channel,
                value: ((i16::from(data2?) << 7) | i16::from(data1)) - 8192,
            },
            _ => return None,
        };
        Some(event)
    }
}

use crate::{io::midi::MidiEvent, synth::message::SynthMessage};

/// MIDI controller number for "all notes off".
pub const CC_ALL_NOTES_OFF: u8 = 123;

/// Convert a MIDI event on `channel_filter` into a voice message.
///
/// A note-on with velocity 0 is a note-off, as running-status keyboards send it.
pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity: 0,
        } if channel == channel_filter => Some(SynthMessage::NoteOff {
            pitch: i16::from(key),
        }),
        MidiEvent::NoteOn { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOn {
                pitch: i16::from(key),
            })
        }
        MidiEvent::NoteOff { channel, key, .. } if channel == channel_filter => {
            Some(SynthMessage::NoteOff {
                pitch: i16::from(key),
            })
        }
        MidiEvent::ControlChange {
            channel,
            controller: CC_ALL_NOTES_OFF,
            ..
        } if channel == channel_filter => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}

pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

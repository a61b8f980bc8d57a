#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::synth::keyboard::NoteMode;
use crate::synth::params::ParamId;

/// Control events sent to a voice from outside the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { pitch: i16 },
    NoteOff { pitch: i16 },
    /// Normalized parameter change.
    SetParam { id: ParamId, value: f32 },
    SetPriority(NoteMode),
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Drains a plain queue; handy for offline rendering and tests.
impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}

//! Shared state types for UI communication
//!
//! Static data is handed over once at startup, dynamic updates from the
//! audio callback are allocation-free `Copy` snapshots.

use cvsynth::{dsp::EnvelopeStage, synth::FmVoice, synth::NoteMode};

/// Static information gathered before the stream starts (can allocate)
#[derive(Clone, Debug)]
pub struct UiInit {
    /// Output device name
    pub device: String,
    /// Audio sample rate in Hz
    pub sample_rate: f32,
    /// Output channel count
    pub channels: usize,
    /// Whether the terminal reports key releases
    pub key_releases: bool,
}

/// Voice snapshot pushed by the audio callback once per buffer
#[derive(Clone, Copy, Debug)]
pub struct VoiceStatus {
    /// Pitch the keyboard considers sounding
    pub current_pitch: Option<i16>,
    /// Envelope stage of op1 (modulator) and op2 (carrier)
    pub stages: [EnvelopeStage; 2],
    /// Active note priority
    pub priority: NoteMode,
    /// Carrier frequency before key mod, in Hz
    pub carrier_frequency: f32,
}

impl VoiceStatus {
    pub fn from_voice(voice: &FmVoice) -> Self {
        Self {
            current_pitch: voice.current_pitch(),
            stages: voice.envelope_stages(),
            priority: voice.priority(),
            carrier_frequency: voice.params().operators[1].frequency,
        }
    }
}

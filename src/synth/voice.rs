use crate::dsp::envelope::EnvelopeStage;
use crate::graph::amplify::Amplifier;
use crate::graph::mix::Mixer;
use crate::graph::module::Pitched;
use crate::graph::operator::FmOperator;
use crate::graph::rack::{Handle, Rack};
use crate::io::AudioOutput;
use crate::synth::keyboard::{Keyboard, MonoKeyboard, NoteMode};
use crate::synth::message::{MessageReceiver, SynthMessage};
use crate::synth::params::{OperatorParam, ParamId, PatchParams};

/*
Two-Operator FM Voice
=====================

The complete instrument: two operators in series, a mixer and a master amp,
driven by one monophonic keyboard.

    keyboard ──pitch──→ op1, op2
             ──gate───→ op1.envelope, op2.envelope

    ┌─────┐ modulator ┌─────┐     ┌───────┐     ┌────────┐
    │ op1 ├──────────→│ op2 ├────→│ mixer ├────→│ master ├──→ out
    └─────┘           └─────┘     └───────┘     └────────┘

op1 is never heard directly. Its level is the modulation index applied to op2,
so raising op1's level (up to 2π) brightens the tone, and op1's frequency
relative to op2's sets which sidebands appear:

    op1 = op2           → all harmonics, saw-like
    op1 = 2 · op2       → odd harmonics, square-like
    op1 = 3.5 · op2     → inharmonic, bell-like

Both operators default to 440 Hz, which the keyboard scales by key mod, so a
patch keeps its ratio across the keyboard.

Lifecycle
---------

The modules exist from `new()` on, but nothing is wired until `activate()`.
`deactivate()` releases held notes and drops all wiring; the voice is silent
until activated again.
*/

/// The two-operator FM patch with its keyboard and parameter state.
pub struct FmVoice {
    rack: Rack,
    operators: [Handle<FmOperator>; 2],
    mixer: Handle<Mixer>,
    master: Handle<Amplifier>,
    keyboard: MonoKeyboard,
    params: PatchParams,
    active: bool,
}

impl FmVoice {
    pub fn new(sample_rate: f32) -> Self {
        let mut rack = Rack::with_sample_rate(sample_rate);
        let op1 = rack.add(FmOperator::new());
        let op2 = rack.add(FmOperator::new());
        let mixer = rack.add(Mixer::with_capacity(1));
        let master = rack.add(Amplifier::new());

        let mut voice = Self {
            rack,
            operators: [op1, op2],
            mixer,
            master,
            keyboard: MonoKeyboard::default(),
            params: PatchParams::default(),
            active: false,
        };
        voice.apply_patch(&PatchParams::default());
        voice
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.rack.set_sample_rate(sample_rate);
    }

    pub fn sample_rate(&self) -> f32 {
        self.rack.sample_rate()
    }

    /// Wire the patch. Does nothing if already active.
    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        let [op1, op2] = self.operators;

        for op in self.operators {
            self.keyboard.add_pitch_receiver(op);
            self.keyboard.add_gate_receiver(op);
        }
        self.rack[self.mixer].add_input(op2);
        self.rack[self.master].set_input(self.mixer);
        self.rack[op2].add_modulator(op1);

        self.active = true;
        log::info!(
            "fm voice: activated at {} Hz ({} priority)",
            self.rack.sample_rate(),
            self.keyboard.mode().name()
        );
    }

    /// Release held notes and drop all wiring. Does nothing if inactive.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        self.keyboard.all_notes_off(&mut self.rack);
        for op in self.operators {
            self.rack.clear(op);
        }
        self.rack.clear(self.mixer);
        self.keyboard.clear();

        self.active = false;
        log::info!("fm voice: deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn key_on(&mut self, pitch: i16) {
        self.keyboard.key_on(&mut self.rack, pitch);
    }

    pub fn key_off(&mut self, pitch: i16) {
        self.keyboard.key_off(&mut self.rack, pitch);
    }

    pub fn all_notes_off(&mut self) {
        self.keyboard.all_notes_off(&mut self.rack);
    }

    pub fn set_priority(&mut self, mode: NoteMode) {
        if mode != self.keyboard.mode() {
            log::debug!(
                "fm voice: note priority {} -> {}",
                self.keyboard.mode().name(),
                mode.name()
            );
        }
        self.keyboard.set_mode(&mut self.rack, mode);
    }

    pub fn priority(&self) -> NoteMode {
        self.keyboard.mode()
    }

    /// Set a parameter from a normalized `0.0..=1.0` value.
    pub fn set_param(&mut self, id: ParamId, normalized: f32) {
        self.set_physical(id, id.to_physical(normalized));
    }

    /// Set a parameter by its raw host id. Returns false for unknown ids.
    pub fn set_raw_param(&mut self, raw: u32, normalized: f32) -> bool {
        match ParamId::from_raw(raw) {
            Some(id) => {
                self.set_param(id, normalized);
                true
            }
            None => {
                log::warn!("fm voice: ignoring unknown parameter id {raw}");
                false
            }
        }
    }

    /// Set every parameter from physical values.
    pub fn apply_patch(&mut self, patch: &PatchParams) {
        for id in ParamId::ALL {
            self.set_physical(id, patch.get(id));
        }
    }

    /// Current physical parameter values.
    pub fn params(&self) -> &PatchParams {
        &self.params
    }

    fn set_physical(&mut self, id: ParamId, value: f32) {
        self.params.set(id, value);

        let Some((index, param)) = id.target() else {
            self.rack[self.master].set_volume(value);
            return;
        };
        let op = &mut self.rack[self.operators[index]];
        match param {
            OperatorParam::Level => op.set_volume(value),
            OperatorParam::Frequency => op.set_frequency(value),
            OperatorParam::Attack => op.set_attack(value),
            OperatorParam::Decay => op.set_decay(value),
            OperatorParam::Sustain => op.set_sustain(value),
            OperatorParam::Release => op.set_release(value),
        }
    }

    pub fn handle_message(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { pitch } => self.key_on(pitch),
            SynthMessage::NoteOff { pitch } => self.key_off(pitch),
            SynthMessage::SetParam { id, value } => self.set_param(id, value),
            SynthMessage::SetPriority(mode) => self.set_priority(mode),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Apply every pending message.
    pub fn drain<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) {
        while let Some(msg) = rx.pop() {
            self.handle_message(msg);
        }
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.rack.output(self.master)
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.rack.output(self.master);
        }
    }

    /// Render `frames` mono samples into every channel of `output`.
    pub fn process(&mut self, output: &mut AudioOutput, frames: usize) {
        let Some((first, rest)) = output.buffers.split_first_mut() else {
            return;
        };
        let frames = frames.min(first.len());
        self.render_block(&mut first[..frames]);

        // Copy mono to the remaining channels
        for channel in rest {
            let n = frames.min(channel.len());
            channel[..n].copy_from_slice(&first[..n]);
        }
    }

    /// Pitch the keyboard considers sounding, if its priority tracks one.
    pub fn current_pitch(&self) -> Option<i16> {
        self.keyboard.current_pitch()
    }

    pub fn envelope_stages(&self) -> [EnvelopeStage; 2] {
        self.operators
            .map(|op| self.rack[op].envelope().stage())
    }

    /// Whether anything is still sounding.
    pub fn is_sounding(&self) -> bool {
        self.active && self.rack.is_on(self.master) && self.rack.is_on(self.operators[1])
    }

    pub fn rack(&self) -> &Rack {
        &self.rack
    }

    pub fn operator(&self, index: usize) -> Option<&FmOperator> {
        let handle = *self.operators.get(index)?;
        self.rack.get(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn active_voice() -> FmVoice {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.activate();
        voice
    }

    fn peak(voice: &mut FmVoice, frames: usize) -> f32 {
        let mut block = vec![0.0; frames];
        voice.render_block(&mut block);
        block.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    #[test]
    fn silent_until_a_key_is_pressed() {
        let mut voice = active_voice();
        assert_eq!(peak(&mut voice, 1024), 0.0);
        assert_eq!(voice.envelope_stages(), [EnvelopeStage::Off; 2]);
    }

    #[test]
    fn inactive_voice_ignores_keys() {
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.key_on(60);
        assert_eq!(peak(&mut voice, 1024), 0.0);
        assert_eq!(voice.envelope_stages(), [EnvelopeStage::Off; 2]);
    }

    #[test]
    fn key_on_sounds_and_release_decays() {
        let mut voice = active_voice();
        voice.key_on(69);

        let level = peak(&mut voice, 4_800);
        assert!(level > 0.1, "voice too quiet: {level}");
        assert!(level <= 1.0 + 1e-6, "voice clipped: {level}");
        assert_eq!(voice.current_pitch(), Some(69));

        voice.key_off(69);
        // 5 ms release plus margin
        peak(&mut voice, 960);
        assert_eq!(voice.envelope_stages(), [EnvelopeStage::Off; 2]);
        assert_eq!(peak(&mut voice, 256), 0.0);
    }

    #[test]
    fn activation_is_idempotent() {
        let mut voice = active_voice();
        voice.activate();

        let mixer = &voice.rack()[voice.mixer];
        assert_eq!(mixer.len(), 1, "second activate must not rewire");
        assert_eq!(voice.operator(1).map(|op| op.modulators().len()), Some(1));

        voice.deactivate();
        voice.deactivate();
        assert!(!voice.is_active());
        assert!(voice.operator(1).is_some_and(|op| op.modulators().is_empty()));
    }

    #[test]
    fn deactivate_silences_and_reactivate_restores() {
        let mut voice = active_voice();
        voice.key_on(60);
        voice.deactivate();
        assert_eq!(peak(&mut voice, 1024), 0.0);

        voice.activate();
        voice.key_on(60);
        assert!(peak(&mut voice, 1024) > 0.0);
    }

    #[test]
    fn params_map_to_operators() {
        let mut voice = active_voice();
        voice.set_param(ParamId::Op1Level, 0.5);
        voice.set_param(ParamId::Op2Frequency, 0.25);
        voice.set_param(ParamId::Op2Attack, 0.1);

        let op1 = voice.operator(0).expect("op1");
        let op2 = voice.operator(1).expect("op2");
        assert!((op1.volume() - std::f32::consts::PI).abs() < 1e-5);
        assert_eq!(op2.oscillator().core().base_frequency(), 220.0);
        assert!((op2.envelope().attack_time() - 0.105).abs() < 1e-6);
        assert!((voice.params().operators[1].attack - 0.105).abs() < 1e-6);
    }

    #[test]
    fn unknown_raw_param_is_rejected() {
        let mut voice = active_voice();
        assert!(voice.set_raw_param(112, 0.5));
        assert!(!voice.set_raw_param(7, 0.5));
        assert_eq!(voice.params().master_volume, 0.5);
    }

    #[test]
    fn zero_master_volume_mutes() {
        let mut voice = active_voice();
        voice.set_param(ParamId::MasterVolume, 0.0);
        voice.key_on(69);
        assert_eq!(peak(&mut voice, 1024), 0.0);
    }

    #[test]
    fn master_volume_scales_output() {
        let mut full = active_voice();
        let mut half = active_voice();
        half.set_param(ParamId::MasterVolume, 0.5);
        full.key_on(69);
        half.key_on(69);

        let mut a = vec![0.0; 256];
        let mut b = vec![0.0; 256];
        full.render_block(&mut a);
        half.render_block(&mut b);

        assert!(a.iter().any(|s| s.abs() > 0.1));
        for (x, y) in a.iter().zip(&b) {
            assert!((x * 0.5 - y).abs() < 1e-6);
        }
    }

    #[test]
    fn drain_applies_queued_messages() {
        let mut voice = active_voice();
        let mut queue = VecDeque::from([
            SynthMessage::SetPriority(NoteMode::Highest),
            SynthMessage::NoteOn { pitch: 64 },
            SynthMessage::NoteOn { pitch: 60 },
        ]);
        voice.drain(&mut queue);

        assert!(queue.is_empty());
        assert_eq!(voice.priority(), NoteMode::Highest);
        assert_eq!(voice.current_pitch(), Some(64));

        voice.handle_message(SynthMessage::AllNotesOff);
        assert_eq!(voice.current_pitch(), None);
    }

    #[test]
    fn process_copies_mono_to_every_channel() {
        let mut voice = active_voice();
        voice.key_on(72);

        let mut output = AudioOutput {
            buffers: vec![vec![0.0; 256]; 2],
        };
        voice.process(&mut output, 256);

        assert_eq!(output.buffers[0], output.buffers[1]);
        assert!(output.buffers[0].iter().any(|s| *s != 0.0));
    }
}

use crate::dsp::envelope::LinearAdsr;
use crate::graph::amplify::ModAmp;
use crate::graph::mix::Mixer;
use crate::graph::module::{Module, Pitched, Signal, Triggerable};
use crate::graph::oscillator::FmOscillator;
use crate::graph::rack::{ModuleId, Rack};

/*
FM Operator
===========

An operator is the unit FM patches are built from: a sine oscillator with its
own envelope and output level, plus an FM input that averages any number of
other operators.

    modulators ──→ ┌───────┐
    (other ops)    │ Mixer │──┐ phase offset
                   └───────┘  ▼
                         ┌──────────────┐     ┌──────────────────────┐
                         │ FmOscillator │────→│ ModAmp               │──→ out
                         └──────────────┘     │  · volume            │
                         ┌──────────────┐     │  · envelope          │
                         │  LinearAdsr  │────→│                      │
                         └──────────────┘     └──────────────────────┘

    out = envelope · volume · sin(phase + mean(modulators))

All four parts are owned by value; only other operators (or any rack module)
plugged in with `add_modulator` are wiring references.

Chaining
--------

Because an operator is itself a module, operators feed each other:

    let op1 = rack.add(FmOperator::new());
    let mut op2 = FmOperator::new();
    op2.add_modulator(op1);          // op1 → op2
    let op2 = rack.add(op2);

An operator can even modulate itself: the rack hands back its previous sample
when it is asked for an operator that is mid-evaluation, which is classic
one-sample operator feedback.

Modulation depth
----------------

The modulator's output is used directly as a phase offset in radians, so the
volume of a modulating operator IS its modulation index. A modulator at
volume 2π swings the carrier's phase a full cycle either way.

Silence
-------

The operator is off while its volume is zero or its envelope is off. While off
it neither pulls its modulators nor advances its oscillator.
*/

/// Oscillator plus the mixer feeding its FM input.
#[derive(Debug, Clone)]
struct FmCore {
    oscillator: FmOscillator,
    modulators: Mixer,
}

impl Signal for FmCore {
    #[inline]
    fn sample(&mut self, rack: &mut Rack) -> f32 {
        let offset = self.modulators.output(rack);
        self.oscillator.output_with(offset)
    }

    fn is_on(&self, _rack: &Rack) -> bool {
        true
    }
}

/// Composite FM voice unit: oscillator, modulator mixer, amplifier and envelope.
#[derive(Debug, Clone)]
pub struct FmOperator {
    amp: ModAmp<FmCore, LinearAdsr>,
}

impl FmOperator {
    pub fn new() -> Self {
        let core = FmCore {
            oscillator: FmOscillator::new(),
            modulators: Mixer::new(),
        };
        Self {
            amp: ModAmp::with_parts(core, LinearAdsr::new()),
        }
    }

    /// Add a module to the averaged FM input.
    pub fn add_modulator(&mut self, modulator: impl Into<ModuleId>) {
        self.amp.input_mut().modulators.add_input(modulator);
    }

    pub fn modulators(&self) -> &[ModuleId] {
        self.amp.input().modulators.inputs()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.amp.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.amp.volume()
    }

    pub fn set_attack(&mut self, seconds: f32) {
        self.envelope_mut().set_attack(seconds);
    }

    pub fn set_decay(&mut self, seconds: f32) {
        self.envelope_mut().set_decay(seconds);
    }

    pub fn set_sustain(&mut self, level: f32) {
        self.envelope_mut().set_sustain(level);
    }

    pub fn set_release(&mut self, seconds: f32) {
        self.envelope_mut().set_release(seconds);
    }

    pub fn oscillator(&self) -> &FmOscillator {
        &self.amp.input().oscillator
    }

    pub fn envelope(&self) -> &LinearAdsr {
        self.amp.modulator()
    }

    pub fn envelope_mut(&mut self) -> &mut LinearAdsr {
        self.amp.modulator_mut()
    }
}

impl Default for FmOperator {
    fn default() -> Self {
        Self::new()
    }
}

impl Pitched for FmOperator {
    fn set_frequency(&mut self, frequency: f32) {
        self.amp.input_mut().oscillator.set_frequency(frequency);
    }

    fn set_key_mod(&mut self, key_mod: f32) {
        self.amp.input_mut().oscillator.set_key_mod(key_mod);
    }
}

impl Triggerable for FmOperator {
    fn press(&mut self) {
        self.envelope_mut().press();
    }

    fn release(&mut self) {
        self.envelope_mut().release();
    }
}

impl Module for FmOperator {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        let core = self.amp.input_mut();
        core.oscillator.set_sample_rate(sample_rate);
        core.modulators.set_sample_rate(sample_rate);
        self.envelope_mut().set_sample_rate(sample_rate);
    }

    fn output(&mut self, rack: &mut Rack) -> f32 {
        self.amp.process(rack)
    }

    fn is_on(&self, rack: &Rack) -> bool {
        self.amp.is_open(rack)
    }

    /// Empties the modulator list. Envelope, pitch and volume are kept.
    fn clear(&mut self) {
        self.amp.input_mut().modulators.clear();
    }

    fn as_pitched(&mut self) -> Option<&mut dyn Pitched> {
        Some(self)
    }

    fn as_triggerable(&mut self) -> Option<&mut dyn Triggerable> {
        Some(self.envelope_mut())
    }
}

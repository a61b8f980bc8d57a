use crate::dsp::oscillator::SineOscillator;
use crate::graph::module::{Module, Pitched};
use crate::graph::rack::{Rack, Source};

/*
Oscillator Modules
==================

Three flavours of the same sine core, from least to most patchable:

  Tone          Fixed 440 Hz. No pitch input at all; a test tone.

  Oscillator    Pitched. A keyboard writes key_mod, the base frequency is the
                pitch of MIDI note 69 (A4), so the played pitch is

                    frequency = base · key_mod

  FmOscillator  Pitched, plus a modulator jack. Each sample the modulator is
                pulled and added to the sine argument:

                    out = sin(phase + modulator)

Wiring an FM pair
-----------------

    ┌────────────┐  modulator   ┌──────────────┐
    │ Oscillator ├─────────────→│ FmOscillator ├──→ out
    └────────────┘              └──────────────┘

With an unconnected modulator jack the FmOscillator sounds exactly like a plain
Oscillator.

Example usage:
  let modulator = rack.add(Oscillator::with_frequency(220.0));
  let mut carrier = FmOscillator::new();
  carrier.set_modulator(modulator);
  let carrier = rack.add(carrier);
*/

/// Base frequency every oscillator module starts at.
pub const A4_FREQUENCY: f32 = 440.0;

/// Fixed-frequency sine at 440 Hz.
#[derive(Debug, Clone)]
pub struct Tone {
    core: SineOscillator,
}

impl Tone {
    pub fn new() -> Self {
        Self {
            core: SineOscillator::new(A4_FREQUENCY),
        }
    }

    pub fn core(&self) -> &SineOscillator {
        &self.core
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for Tone {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.core.set_sample_rate(sample_rate);
    }

    fn output(&mut self, _rack: &mut Rack) -> f32 {
        self.core.next_sample()
    }
}

/// Keyboard-pitched sine oscillator.
#[derive(Debug, Clone)]
pub struct Oscillator {
    core: SineOscillator,
}

impl Oscillator {
    pub fn new() -> Self {
        Self::with_frequency(A4_FREQUENCY)
    }

    pub fn with_frequency(frequency: f32) -> Self {
        Self {
            core: SineOscillator::new(frequency),
        }
    }

    pub fn core(&self) -> &SineOscillator {
        &self.core
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Pitched for Oscillator {
    fn set_frequency(&mut self, frequency: f32) {
        self.core.set_frequency(frequency);
    }

    fn set_key_mod(&mut self, key_mod: f32) {
        self.core.set_key_mod(key_mod);
    }
}

impl Module for Oscillator {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.core.set_sample_rate(sample_rate);
    }

    fn output(&mut self, _rack: &mut Rack) -> f32 {
        self.core.next_sample()
    }

    fn as_pitched(&mut self) -> Option<&mut dyn Pitched> {
        Some(self)
    }
}

/// Pitched sine oscillator whose phase is offset by a modulator each sample.
#[derive(Debug, Clone)]
pub struct FmOscillator {
    core: SineOscillator,
    modulator: Source,
}

impl FmOscillator {
    pub fn new() -> Self {
        Self::with_frequency(A4_FREQUENCY)
    }

    pub fn with_frequency(frequency: f32) -> Self {
        Self {
            core: SineOscillator::new(frequency),
            modulator: Source::Silent,
        }
    }

    pub fn set_modulator(&mut self, modulator: impl Into<Source>) {
        self.modulator = modulator.into();
    }

    pub fn modulator(&self) -> Source {
        self.modulator
    }

    /// Advance one sample using `offset` as the phase modulation.
    ///
    /// Used by owners that compute the modulation themselves instead of
    /// going through the modulator jack.
    #[inline]
    pub fn output_with(&mut self, offset: f32) -> f32 {
        self.core.next_sample_modulated(offset)
    }

    pub fn core(&self) -> &SineOscillator {
        &self.core
    }
}

impl Default for FmOscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Pitched for FmOscillator {
    fn set_frequency(&mut self, frequency: f32) {
        self.core.set_frequency(frequency);
    }

    fn set_key_mod(&mut self, key_mod: f32) {
        self.core.set_key_mod(key_mod);
    }
}

impl Module for FmOscillator {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.core.set_sample_rate(sample_rate);
    }

    fn output(&mut self, rack: &mut Rack) -> f32 {
        let offset = self.modulator.output(rack);
        self.output_with(offset)
    }

    fn as_pitched(&mut self) -> Option<&mut dyn Pitched> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    /// Constant DC source for predictable modulation.
    struct Dc(f32);

    impl Module for Dc {
        fn output(&mut self, _rack: &mut Rack) -> f32 {
            self.0
        }
    }

    #[test]
    fn test_tone_plays_a4() {
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
        let tone = rack.add(Tone::new());

        let first = rack.output(tone);
        let expected = (TAU * 440.0 / SAMPLE_RATE).sin();
        assert!((first - expected).abs() < 1e-6, "got {first}, expected {expected}");
        assert_eq!(rack[tone].core().frequency(), 440.0);
    }

    #[test]
    fn test_key_mod_doubles_frequency() {
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
        let osc = rack.add(Oscillator::new());

        let pitched = rack
            .pitched_mut(osc.id())
            .expect("oscillator should be pitched");
        pitched.set_key_mod(2.0);

        assert!((rack[osc].core().frequency() - 880.0).abs() < 1e-3);
    }

    #[test]
    fn test_tone_is_not_pitched() {
        let mut rack = Rack::new();
        let tone = rack.add(Tone::new());
        assert!(rack.pitched_mut(tone.id()).is_none());
    }

    #[test]
    fn test_unmodulated_fm_matches_plain_oscillator() {
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
        let plain = rack.add(Oscillator::with_frequency(330.0));
        let fm = rack.add(FmOscillator::with_frequency(330.0));

        for i in 0..512 {
            let a = rack.output(plain);
            let b = rack.output(fm);
            assert_eq!(a, b, "sample {i} differs");
        }
    }

    #[test]
    fn test_modulator_offsets_phase() {
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
        let dc = rack.add(Dc(std::f32::consts::FRAC_PI_2));
        let mut fm = FmOscillator::new();
        fm.set_modulator(dc);
        let fm = rack.add(fm);

        let out = rack.output(fm);
        let phase = rack[fm].core().phase();
        // sin(x + π/2) = cos(x)
        assert!((out - phase.cos()).abs() < 1e-5);
        assert!((phase - TAU * 440.0 / SAMPLE_RATE).abs() < 1e-6, "offset leaked into phase");
    }
}

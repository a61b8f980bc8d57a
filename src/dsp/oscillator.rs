use std::f32::consts::TAU;

/*
Phase Accumulator Sine
======================

Every oscillator in the rack is built on the same core: a phase that walks
around the circle by a fixed step per sample, and a sine of that phase.

Vocabulary
----------

  phase       Position in the current cycle, in radians, kept in [0, 2π).

  increment   How far the phase moves per sample:

                  increment = 2π · key_mod · base_frequency / sample_rate

  key_mod     A unitless pitch multiplier written by a keyboard. 1.0 plays the
              base frequency, 2.0 an octave above, 0.5 an octave below.

  base        The frequency the oscillator plays when key_mod is 1.0. For a
  frequency   keyboard-driven oscillator this is the pitch of MIDI note 69.


One Cycle
---------

At 48 kHz a 480 Hz tone advances by 2π/100 per sample, so after exactly
sample_rate / frequency = 100 samples the phase is back where it started:

    phase
     2π ┤        ╱│        ╱│
        │      ╱  │      ╱  │
        │    ╱    │    ╱    │
        │  ╱      │  ╱      │
      0 ┼╱────────┴╱────────┴──→ samples
        0        100       200


Phase Modulation (what "FM" really is here)
-------------------------------------------

A frequency-modulated oscillator adds a modulator sample to the sine argument:

    out = sin(phase + modulator)

The offset is applied to THIS sample only. The stored phase keeps advancing
by the plain increment, so the oscillator never drifts away from its pitch no
matter how hard it is modulated. Large modulator amplitudes push the sine
argument further around the circle and produce more sidebands; nothing is
clamped because that is the sound.
*/

/// Sine oscillator core: phase accumulator plus pitch state.
///
/// The increment is zero until a sample rate has been set, which keeps the
/// phase stuck at zero and the output silent.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    sample_rate: f32,
    base_frequency: f32,
    key_mod: f32,
    phase: f32,
    increment: f32,
}

impl SineOscillator {
    pub fn new(base_frequency: f32) -> Self {
        Self {
            sample_rate: 0.0,
            base_frequency,
            key_mod: 1.0,
            phase: 0.0,
            increment: 0.0,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_increment();
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.base_frequency = frequency;
        self.update_increment();
    }

    pub fn set_key_mod(&mut self, key_mod: f32) {
        self.key_mod = key_mod;
        self.update_increment();
    }

    fn update_increment(&mut self) {
        self.increment = if self.sample_rate > 0.0 {
            TAU * self.key_mod * self.base_frequency / self.sample_rate
        } else {
            0.0
        };
    }

    /// Move the phase forward one sample and return the new phase.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let mut phase = (self.phase + self.increment).rem_euclid(TAU);
        // rem_euclid can round up to the modulus itself
        if phase >= TAU {
            phase = 0.0;
        }
        self.phase = phase;
        phase
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        self.advance().sin()
    }

    /// Advance and return `sin(phase + offset)` without storing the offset.
    #[inline]
    pub fn next_sample_modulated(&mut self, offset: f32) -> f32 {
        (self.advance() + offset).sin()
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn key_mod(&self) -> f32 {
        self.key_mod
    }

    /// The frequency actually played: base frequency scaled by key mod.
    pub fn frequency(&self) -> f32 {
        self.base_frequency * self.key_mod
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angular_distance(a: f32, b: f32) -> f32 {
        let d = (a - b).rem_euclid(TAU);
        d.min(TAU - d)
    }

    #[test]
    fn one_cycle_returns_to_start_phase() {
        let sample_rate = 48_000.0;
        let frequency = 480.0;
        let mut osc = SineOscillator::new(frequency);
        osc.set_sample_rate(sample_rate);

        let start = osc.phase();
        let mut max_phase = 0.0f32;
        for _ in 0..(sample_rate / frequency) as usize {
            max_phase = max_phase.max(osc.advance());
        }

        assert!(
            angular_distance(osc.phase(), start) < 1e-3,
            "expected a full cycle, phase drifted to {}",
            osc.phase()
        );
        assert!(max_phase < TAU, "phase must stay below 2π");
    }

    #[test]
    fn increment_tracks_every_setter() {
        let mut osc = SineOscillator::new(440.0);
        assert_eq!(osc.increment(), 0.0, "no rate yet, no motion");

        osc.set_sample_rate(44_100.0);
        let base = osc.increment();
        assert!((base - TAU * 440.0 / 44_100.0).abs() < 1e-7);

        osc.set_key_mod(2.0);
        assert!((osc.increment() - 2.0 * base).abs() < 1e-6);

        osc.set_frequency(220.0);
        assert!((osc.increment() - base).abs() < 1e-6);
        assert!((osc.frequency() - 440.0).abs() < 1e-4);
    }

    #[test]
    fn output_before_sample_rate_is_silent() {
        let mut osc = SineOscillator::new(440.0);
        for _ in 0..64 {
            assert_eq!(osc.next_sample(), 0.0);
        }
    }

    #[test]
    fn modulation_does_not_accumulate_into_phase() {
        let mut plain = SineOscillator::new(440.0);
        let mut modulated = SineOscillator::new(440.0);
        plain.set_sample_rate(48_000.0);
        modulated.set_sample_rate(48_000.0);

        for _ in 0..1000 {
            plain.next_sample();
            modulated.next_sample_modulated(3.0);
        }

        assert_eq!(plain.phase(), modulated.phase());
    }

    #[test]
    fn negative_frequency_keeps_phase_in_range() {
        let mut osc = SineOscillator::new(-440.0);
        osc.set_sample_rate(48_000.0);
        for _ in 0..500 {
            let phase = osc.advance();
            assert!((0.0..TAU).contains(&phase), "phase out of range: {phase}");
        }
    }
}

use crate::graph::module::{Module, Signal};
use crate::graph::rack::{Rack, Source};

/*
Amplifiers
==========

Every amplifier is one input in, one sample out, built from two reusable
stages:

  GainStage         A fixed volume. Open while volume > 0.

                        out = volume · x

  ModulationStage   A modulator signal multiplied in (an envelope, an LFO,
                    another oscillator for ring modulation). Open while the
                    modulator is on, or while nothing is patched in.

                        out = modulator · x

The four amplifiers are the combinations:

                      gain   modulation   on when
    PassThrough        -         -        input on
    Amplifier          ✓         -        volume > 0 and input on
    ModOnlyAmp         -         ✓        modulator on (input ignored)
    ModAmp             ✓         ✓        volume > 0 and modulator on

A closed amplifier returns 0.0 WITHOUT pulling its input or modulator, so a
silent branch of the patch costs nothing and its oscillators keep their phase.

An unconnected modulator jack keeps the amplifier open but reads the silent
source, so the product is 0.0. Use an Amplifier for a plain volume knob.

ModAmp is generic over where its input and modulator come from. Standalone it
reads both through rack `Source`s; an FM operator instead owns its oscillator
and envelope by value inside a ModAmp so the whole operator is one module.
*/

/// Fixed output volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainStage {
    volume: f32,
}

impl GainStage {
    pub fn new(volume: f32) -> Self {
        Self { volume }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.volume > 0.0
    }

    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        self.volume * x
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Multiplies the signal by a modulator.
#[derive(Debug, Clone, Default)]
pub struct ModulationStage<M = Source> {
    modulator: M,
}

impl<M> ModulationStage<M> {
    pub fn new(modulator: M) -> Self {
        Self { modulator }
    }

    pub fn modulator(&self) -> &M {
        &self.modulator
    }

    pub fn modulator_mut(&mut self) -> &mut M {
        &mut self.modulator
    }
}

impl<M: Signal> ModulationStage<M> {
    #[inline]
    pub fn is_open(&self, rack: &Rack) -> bool {
        self.modulator.is_on(rack) || self.modulator.is_silent()
    }

    #[inline]
    pub fn sample(&mut self, rack: &mut Rack) -> f32 {
        self.modulator.sample(rack)
    }
}

/// Forwards its input unchanged.
#[derive(Debug, Clone, Default)]
pub struct PassThrough {
    input: Source,
}

impl PassThrough {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, input: impl Into<Source>) {
        self.input = input.into();
    }

    pub fn input(&self) -> Source {
        self.input
    }
}

impl Module for PassThrough {
    fn output(&mut self, rack: &mut Rack) -> f32 {
        self.input.output(rack)
    }

    fn is_on(&self, rack: &Rack) -> bool {
        self.input.is_on(rack)
    }
}

/// Input scaled by a fixed volume.
#[derive(Debug, Clone, Default)]
pub struct Amplifier {
    input: Source,
    gain: GainStage,
}

impl Amplifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, input: impl Into<Source>) {
        self.input = input.into();
    }

    pub fn input(&self) -> Source {
        self.input
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.gain.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.gain.volume()
    }
}

impl Module for Amplifier {
    fn output(&mut self, rack: &mut Rack) -> f32 {
        if !self.is_on(rack) {
            return 0.0;
        }
        let x = self.input.output(rack);
        self.gain.apply(x)
    }

    fn is_on(&self, rack: &Rack) -> bool {
        self.gain.is_open() && self.input.is_on(rack)
    }
}

/// Modulator times input, with no volume of its own.
///
/// Its activity follows the modulator alone: a silent input behind an open
/// modulator still counts as on.
#[derive(Debug, Clone, Default)]
pub struct ModOnlyAmp {
    input: Source,
    modulation: ModulationStage,
}

impl ModOnlyAmp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, input: impl Into<Source>) {
        self.input = input.into();
    }

    pub fn input(&self) -> Source {
        self.input
    }

    pub fn set_modulator(&mut self, modulator: impl Into<Source>) {
        *self.modulation.modulator_mut() = modulator.into();
    }

    pub fn modulator(&self) -> Source {
        *self.modulation.modulator()
    }
}

impl Module for ModOnlyAmp {
    fn output(&mut self, rack: &mut Rack) -> f32 {
        if !self.is_on(rack) {
            return 0.0;
        }
        let m = self.modulation.sample(rack);
        let x = self.input.output(rack);
        m * x
    }

    fn is_on(&self, rack: &Rack) -> bool {
        self.modulation.is_open(rack)
    }
}

/// Volume and modulator combined: `volume · modulator · input`.
#[derive(Debug, Clone)]
pub struct ModAmp<I = Source, M = Source> {
    input: I,
    gain: GainStage,
    modulation: ModulationStage<M>,
}

impl ModAmp {
    pub fn new() -> Self {
        Self::with_parts(Source::Silent, Source::Silent)
    }
}

impl Default for ModAmp {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, M> ModAmp<I, M> {
    /// Build around an owned input and modulator at volume 1.0.
    pub fn with_parts(input: I, modulator: M) -> Self {
        Self {
            input,
            gain: GainStage::default(),
            modulation: ModulationStage::new(modulator),
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.gain.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.gain.volume()
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn modulator(&self) -> &M {
        self.modulation.modulator()
    }

    pub fn modulator_mut(&mut self) -> &mut M {
        self.modulation.modulator_mut()
    }
}

impl<M> ModAmp<Source, M> {
    pub fn set_input(&mut self, input: impl Into<Source>) {
        self.input = input.into();
    }
}

impl<I> ModAmp<I, Source> {
    pub fn set_modulator(&mut self, modulator: impl Into<Source>) {
        *self.modulation.modulator_mut() = modulator.into();
    }
}

impl<I: Signal, M: Signal> ModAmp<I, M> {
    #[inline]
    pub fn is_open(&self, rack: &Rack) -> bool {
        self.gain.is_open() && self.modulation.is_open(rack)
    }

    /// One sample of `volume · modulator · input`, or 0.0 while closed.
    #[inline]
    pub fn process(&mut self, rack: &mut Rack) -> f32 {
        if !self.is_open(rack) {
            return 0.0;
        }
        let m = self.modulation.sample(rack);
        let x = self.input.sample(rack);
        self.gain.apply(m * x)
    }
}

impl<I: Signal + 'static, M: Signal + 'static> Module for ModAmp<I, M> {
    fn output(&mut self, rack: &mut Rack) -> f32 {
        self.process(rack)
    }

    fn is_on(&self, rack: &Rack) -> bool {
        self.is_open(rack)
    }
}

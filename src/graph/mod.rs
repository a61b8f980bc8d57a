//! Patchable rack modules built on the DSP primitives.
//!
//! A [`Rack`] owns the modules of a patch; modules reference each other by
//! [`ModuleId`] and pull one sample at a time through the rack. Keyboards reach
//! into modules through the [`Pitched`] and [`Triggerable`] capabilities.

/// Pass-through, gain and modulation amplifiers.
pub mod amplify;
/// Module impls for gates and the linear ADSR.
pub mod envelope;
/// Equal-weight N-input mixer.
pub mod mix;
/// Core traits shared by all modules.
pub mod module;
/// Composite FM operator (oscillator + mixer + amp + envelope).
pub mod operator;
/// Fixed, pitched and phase-modulated sine oscillators.
pub mod oscillator;
/// Module arena, handles and wiring sources.
pub mod rack;

pub use amplify::{Amplifier, GainStage, ModAmp, ModOnlyAmp, ModulationStage, PassThrough};
pub use mix::Mixer;
pub use module::{Module, Pitched, Signal, Silence, Triggerable};
pub use operator::FmOperator;
pub use oscillator::{FmOscillator, Oscillator, Tone};
pub use rack::{Handle, ModuleId, Rack, Source};

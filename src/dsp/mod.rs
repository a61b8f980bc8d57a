//! Low-level DSP primitives used by the rack modules.
//!
//! These components are allocation-free and know nothing about wiring: an
//! oscillator core advances a phase, an envelope advances a state machine.
//! The `graph` layer wraps them into modules that can be patched together.

/// Gates, smoothed gates and the linear ADSR state machine.
pub mod envelope;
/// Phase-accumulating sine core shared by every oscillator module.
pub mod oscillator;

pub use envelope::{EnvelopeStage, Gate, GateStage, LinearAdsr, SmoothGate};
pub use oscillator::SineOscillator;

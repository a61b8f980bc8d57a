pub mod dsp;
pub mod graph; // Patchable rack modules
pub mod io;
pub mod synth; // Keyboards, parameters and the FM voice

/// Largest block the player renders in one call.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Sample rate used when the host has not reported one.
pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;

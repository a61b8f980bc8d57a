//! Benchmarks for single rack modules.

mod amplify;
mod envelope;
mod mix;
mod oscillator;

pub use amplify::bench_amplify;
pub use envelope::bench_envelope;
pub use mix::bench_mix;
pub use oscillator::bench_oscillator;

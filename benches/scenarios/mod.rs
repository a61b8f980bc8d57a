//! FM patch benchmarks.
//!
//! These model how the voice is actually played: operators chained through
//! their modulator mixers, and the complete keyboard-driven voice.

mod operator;
mod voice;

pub use operator::bench_operator;
pub use voice::bench_voice;

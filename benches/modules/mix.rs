//! Benchmarks for the averaging mixer at different fan-in.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cvsynth::graph::{Mixer, Oscillator, Rack};

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules/mix");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for inputs in [2usize, 8] {
            let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
            let mut mixer = Mixer::with_capacity(inputs);
            for i in 0..inputs {
                mixer.add_input(rack.add(Oscillator::with_frequency(110.0 * (i + 1) as f32)));
            }
            let mixer = rack.add(mixer);

            group.bench_with_input(
                BenchmarkId::new(format!("{inputs}_inputs"), size),
                &size,
                |b, _| b.iter(|| render(&mut rack, mixer, black_box(&mut buffer))),
            );
        }
    }

    group.finish();
}

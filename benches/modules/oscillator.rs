//! Benchmarks for sine oscillator modules.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cvsynth::graph::{FmOscillator, Oscillator, Rack};

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);

        let plain = rack.add(Oscillator::new());
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| render(&mut rack, plain, black_box(&mut buffer)))
        });

        // Modulator pulled through the rack every sample
        let modulator = rack.add(Oscillator::with_frequency(220.0));
        let mut fm = FmOscillator::new();
        fm.set_modulator(modulator);
        let fm = rack.add(fm);
        group.bench_with_input(BenchmarkId::new("fm_sine", size), &size, |b, _| {
            b.iter(|| render(&mut rack, fm, black_box(&mut buffer)))
        });
    }

    group.finish();
}

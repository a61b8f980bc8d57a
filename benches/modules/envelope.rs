//! Benchmarks for the linear ADSR in each busy stage.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cvsynth::dsp::LinearAdsr;
use cvsynth::graph::Rack;

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);

        // Attack phase (long enough to stay ramping for the whole run)
        let attack = rack.add(LinearAdsr::adsr(10.0, 0.1, 0.7, 0.3));
        rack[attack].press();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| render(&mut rack, attack, black_box(&mut buffer)))
        });

        // Sustain phase (holding steady)
        let sustain = rack.add(LinearAdsr::adsr(0.001, 0.001, 0.7, 0.3));
        rack[sustain].press();
        for _ in 0..200 {
            rack.output(sustain);
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| render(&mut rack, sustain, black_box(&mut buffer)))
        });

        // Release phase (ramping down)
        let release = rack.add(LinearAdsr::adsr(0.001, 0.001, 0.7, 10.0));
        rack[release].press();
        for _ in 0..200 {
            rack.output(release);
        }
        rack[release].release();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| render(&mut rack, release, black_box(&mut buffer)))
        });
    }

    group.finish();
}

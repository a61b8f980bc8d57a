//! Benchmarks for amplifiers, open and closed.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cvsynth::dsp::LinearAdsr;
use cvsynth::graph::{Amplifier, ModAmp, Oscillator, Rack};

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_amplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("modules/amplify");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
        let osc = rack.add(Oscillator::new());

        let mut gain = Amplifier::new();
        gain.set_input(osc);
        gain.set_volume(0.5);
        let gain = rack.add(gain);
        group.bench_with_input(BenchmarkId::new("gain", size), &size, |b, _| {
            b.iter(|| render(&mut rack, gain, black_box(&mut buffer)))
        });

        let env = rack.add(LinearAdsr::adsr(0.001, 0.001, 0.7, 0.3));
        rack[env].press();
        let mut vca = ModAmp::new();
        vca.set_input(osc);
        vca.set_modulator(env);
        let vca = rack.add(vca);
        group.bench_with_input(BenchmarkId::new("mod_amp", size), &size, |b, _| {
            b.iter(|| render(&mut rack, vca, black_box(&mut buffer)))
        });

        // Closed amp: the whole input branch is skipped
        let idle_env = rack.add(LinearAdsr::new());
        let mut closed = ModAmp::new();
        closed.set_input(osc);
        closed.set_modulator(idle_env);
        let closed = rack.add(closed);
        group.bench_with_input(BenchmarkId::new("mod_amp_closed", size), &size, |b, _| {
            b.iter(|| render(&mut rack, closed, black_box(&mut buffer)))
        });
    }

    group.finish();
}

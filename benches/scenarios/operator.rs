//! Benchmarks for FM operator chains.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cvsynth::graph::{FmOperator, Handle, Rack, Triggerable};

use crate::{render, BLOCK_SIZES, SAMPLE_RATE};

/// `count` operators in series, each modulating the next. Returns the last.
fn chain(rack: &mut Rack, count: usize) -> Handle<FmOperator> {
    let mut previous: Option<Handle<FmOperator>> = None;
    for _ in 0..count {
        let mut op = FmOperator::new();
        op.set_volume(2.0);
        if let Some(modulator) = previous {
            op.add_modulator(modulator);
        }
        op.press();
        previous = Some(rack.add(op));
    }
    previous.unwrap_or_else(|| rack.add(FmOperator::new()))
}

pub fn bench_operator(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/operator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SINGLE OPERATOR ===
        // baseline: oscillator, empty mixer, envelope, amp
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
        let single = chain(&mut rack, 1);
        group.bench_with_input(BenchmarkId::new("single", size), &size, |b, _| {
            b.iter(|| render(&mut rack, single, black_box(&mut buffer)))
        });

        // === FOUR-OPERATOR STACK ===
        // DX-style algorithm 1 column: 4 → 3 → 2 → 1
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
        let stack = chain(&mut rack, 4);
        group.bench_with_input(BenchmarkId::new("stack_of_4", size), &size, |b, _| {
            b.iter(|| render(&mut rack, stack, black_box(&mut buffer)))
        });

        // === SELF FEEDBACK ===
        // operator reading its own previous sample
        let mut rack = Rack::with_sample_rate(SAMPLE_RATE);
        let feedback = chain(&mut rack, 1);
        rack[feedback].add_modulator(feedback);
        group.bench_with_input(BenchmarkId::new("feedback", size), &size, |b, _| {
            b.iter(|| render(&mut rack, feedback, black_box(&mut buffer)))
        });
    }

    group.finish();
}

//! Benchmarks for the complete two-operator voice.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use cvsynth::synth::{FmVoice, NoteMode, ParamId};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Held note with a bright patch
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.activate();
        voice.set_param(ParamId::Op1Level, 0.4);
        voice.set_param(ParamId::Op1Frequency, 1.0);
        voice.key_on(57);
        group.bench_with_input(BenchmarkId::new("held_note", size), &size, |b, _| {
            b.iter(|| voice.render_block(black_box(&mut buffer)))
        });

        // Legato trill: retune between every block
        let mut voice = FmVoice::new(SAMPLE_RATE);
        voice.activate();
        voice.set_priority(NoteMode::Last);
        voice.key_on(60);
        let mut upper = false;
        group.bench_with_input(BenchmarkId::new("legato_trill", size), &size, |b, _| {
            b.iter(|| {
                if upper {
                    voice.key_off(62);
                } else {
                    voice.key_on(62);
                }
                upper = !upper;
                voice.render_block(black_box(&mut buffer));
            })
        });

        // Idle voice: everything closed
        let mut idle = FmVoice::new(SAMPLE_RATE);
        idle.activate();
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| idle.render_block(black_box(&mut buffer)))
        });
    }

    group.finish();
}

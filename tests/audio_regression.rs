use std::collections::VecDeque;

use cvsynth::io::AudioOutput;
use cvsynth::synth::{FmVoice, NoteMode, ParamId, SynthMessage};

const SAMPLE_RATE: f32 = 48_000.0;
const FRAMES: usize = 512;

fn samples(output: &AudioOutput) -> Vec<f32> {
    output
        .buffers
        .iter()
        .flat_map(|c| c.iter())
        .copied()
        .collect()
}

#[test]
fn renders_silence_without_notes() {
    let mut voice = FmVoice::new(SAMPLE_RATE);
    voice.activate();
    let mut output = AudioOutput::new(2, FRAMES);
    voice.process(&mut output, FRAMES);

    assert!(samples(&output).iter().all(|s| *s == 0.0));
}

#[test]
fn renders_bounded_audio_for_a_held_note() {
    let mut voice = FmVoice::new(SAMPLE_RATE);
    voice.activate();
    voice.set_param(ParamId::Op1Level, 0.3);
    voice.key_on(60);

    let mut output = AudioOutput::new(2, FRAMES);
    voice.process(&mut output, FRAMES);
    let rendered = samples(&output);

    assert!(rendered.iter().any(|s| s.abs() > 0.0));
    assert!(rendered.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
    assert_eq!(output.buffers[0], output.buffers[1], "mono copied to every channel");
}

#[test]
fn queued_messages_drive_the_voice() {
    let mut voice = FmVoice::new(SAMPLE_RATE);
    voice.activate();

    let mut queue: VecDeque<SynthMessage> = VecDeque::new();
    queue.push_back(SynthMessage::SetPriority(NoteMode::Highest));
    queue.push_back(SynthMessage::NoteOn { pitch: 48 });
    queue.push_back(SynthMessage::NoteOn { pitch: 55 });
    voice.drain(&mut queue);

    assert!(queue.is_empty());
    assert_eq!(voice.priority(), NoteMode::Highest);
    assert_eq!(voice.current_pitch(), Some(55));

    queue.push_back(SynthMessage::AllNotesOff);
    voice.drain(&mut queue);

    // Default release is 5ms; a few blocks later the voice is quiet again
    let mut output = AudioOutput::new(1, FRAMES);
    for _ in 0..4 {
        voice.process(&mut output, FRAMES);
    }
    assert!(!voice.is_sounding());
    assert!(samples(&output).iter().all(|s| *s == 0.0));
}

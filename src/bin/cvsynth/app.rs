//! Audio setup: one FM voice rendered inside the cpal callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    SampleFormat,
};
use rtrb::RingBuffer;

use cvsynth::{
    synth::{FmVoice, SynthMessage},
    MAX_BLOCK_SIZE,
};

use crate::keys;
use crate::ui::{
    state::{UiInit, VoiceStatus},
    UiApp, VIS_BUFFER_SIZE,
};

const CONTROL_QUEUE_SIZE: usize = 256;
const STATUS_QUEUE_SIZE: usize = 16;
const ERROR_QUEUE_SIZE: usize = 16;

/// Open the default output device and run the terminal UI until quit.
pub fn run() -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let device_name = device
        .name()
        .unwrap_or_else(|_| String::from("unknown device"));
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    if config.sample_format() != SampleFormat::F32 {
        return Err(eyre!(
            "{device_name} wants {:?} samples, only f32 output is supported",
            config.sample_format()
        ));
    }

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    // UI → audio control, audio → UI samples, status and stream errors
    let (control_tx, mut control_rx) = RingBuffer::<SynthMessage>::new(CONTROL_QUEUE_SIZE);
    let (mut vis_tx, vis_rx) = RingBuffer::<f32>::new(VIS_BUFFER_SIZE * 4);
    let (mut status_tx, status_rx) = RingBuffer::<VoiceStatus>::new(STATUS_QUEUE_SIZE);
    let (mut error_tx, error_rx) = RingBuffer::<String>::new(ERROR_QUEUE_SIZE);

    let mut voice = FmVoice::new(sample_rate);
    voice.activate();
    let initial_status = VoiceStatus::from_voice(&voice);

    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                voice.drain(&mut control_rx);

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    voice.render_block(block);

                    // Copy to output (mono to all channels)
                    let start = frames_written * channels;
                    let end = start + frames_to_render * channels;
                    for (frame, &sample) in data[start..end]
                        .chunks_exact_mut(channels)
                        .zip(block.iter())
                    {
                        frame.fill(sample);
                    }

                    // Scope feed; drop what the UI has not caught up with
                    for &sample in block.iter() {
                        if vis_tx.push(sample).is_err() {
                            break;
                        }
                    }

                    frames_written += frames_to_render;
                }

                let _ = status_tx.push(VoiceStatus::from_voice(&voice));
            },
            move |err| {
                let _ = error_tx.push(err.to_string());
            },
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    let mut terminal = ratatui::init();
    let key_releases = keys::enable_key_releases();
    let init = UiInit {
        device: device_name,
        sample_rate,
        channels,
        key_releases,
    };

    let result = UiApp::new(init, control_tx, vis_rx, status_rx, error_rx, initial_status)
        .run(&mut terminal);

    keys::disable_key_releases(key_releases);
    ratatui::restore();
    drop(stream);
    result
}

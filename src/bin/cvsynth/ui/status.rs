//! Status bar widget - held note, priority, envelope stages and audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use cvsynth::dsp::EnvelopeStage;

use super::state::{UiInit, VoiceStatus};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// "A4" style name of a MIDI pitch
pub fn note_name(pitch: i16) -> String {
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[pitch.rem_euclid(12) as usize], octave)
}

fn stage_style(stage: EnvelopeStage) -> (&'static str, Color) {
    match stage {
        EnvelopeStage::Off => ("off", Color::DarkGray),
        EnvelopeStage::Attack => ("att", Color::Green),
        EnvelopeStage::Decay => ("dec", Color::Yellow),
        EnvelopeStage::Sustain => ("sus", Color::Cyan),
        EnvelopeStage::Release => ("rel", Color::Magenta),
    }
}

/// Render the status bar
pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    init: &UiInit,
    status: &VoiceStatus,
    stats: &AudioStats,
    last_error: Option<&str>,
) {
    let block = Block::default()
        .title(" cvsynth ")
        .borders(Borders::ALL);

    let note = status
        .current_pitch
        .map_or_else(|| String::from("--"), note_name);

    let mut spans = vec![
        Span::styled(format!(" Note: {note:<4} "), Style::default().fg(Color::White)),
        Span::styled(
            format!("Priority: {:<8} ", status.priority.name()),
            Style::default().fg(Color::Cyan),
        ),
    ];
    for (label, stage) in ["op1", "op2"].iter().zip(status.stages) {
        let (name, color) = stage_style(stage);
        spans.push(Span::raw(format!("{label} ")));
        spans.push(Span::styled(format!("{name}  "), Style::default().fg(color)));
    }
    spans.push(Span::styled(
        format!("{:.1}kHz x{}  ", init.sample_rate / 1000.0, init.channels),
        Style::default().fg(Color::DarkGray),
    ));
    spans.push(Span::styled(
        format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
        Style::default().fg(Color::Magenta),
    ));
    if let Some(err) = last_error {
        spans.push(Span::styled(format!("  ! {err}"), Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(0), "C-1");
    }

    #[test]
    fn stats_of_square() {
        let stats = AudioStats::from_buffer(&[0.5, -0.5, 0.5, -0.5]);
        assert_eq!(stats.peak, 0.5);
        assert!((stats.rms - 0.5).abs() < 1e-6);
    }
}

//! Triggered oscilloscope widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Index of the first rising zero crossing in the first half of `buffer`.
///
/// Starting the trace there keeps a steady tone standing still on screen.
fn trigger_point(buffer: &[f32]) -> usize {
    let search = buffer.len() / 2;
    buffer[..search.min(buffer.len())]
        .windows(2)
        .position(|w| w[0] < 0.0 && w[1] >= 0.0)
        .map_or(0, |i| i + 1)
}

/// Render half the buffer, starting at a rising zero crossing
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let start = trigger_point(audio_buffer);
    let len = audio_buffer.len() / 2;
    let window = &audio_buffer[start..(start + len).min(audio_buffer.len())];

    let block = Block::default()
        .title(" Scope ")
        .borders(Borders::ALL);

    let data: Vec<(f64, f64)> = window
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / len.max(1) as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

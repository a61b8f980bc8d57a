//! Spectrum analyzer widget
//!
//! Hann-windowed FFT, log-spaced display bins, and markers at the harmonics of
//! the note being played so FM sidebands can be read off against them.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Number of frequency bins to display
const SPECTRUM_BINS: usize = 96;

/// Harmonics marked above the fundamental
const HARMONIC_MARKERS: usize = 12;

/// Display floor in dB
const FLOOR_DB: f64 = -100.0;

const MIN_FREQ: f32 = 20.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// FFT bin index for each display bin
    bin_indices: Vec<usize>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (log10 frequency, magnitude dB) per display bin
    spectrum: Vec<(f64, f64)>,
    sample_rate: f32,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the buffers passed to `update`.
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        // Hann window - reduces spectral leakage
        let denom = buffer_len.saturating_sub(1).max(1) as f32;
        let window = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let max_freq = (sample_rate / 2.0).min(20_000.0).max(MIN_FREQ * 2.0);
        let ratio = (max_freq / MIN_FREQ) as f64;
        let last_bin = (buffer_len / 2).saturating_sub(1);

        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = MIN_FREQ as f64 * ratio.powf(t);
            let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
            bin_indices.push(index.min(last_bin));
            spectrum.push((freq.log10(), FLOOR_DB));
        }

        Self {
            window,
            bin_indices,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
            sample_rate,
        }
    }

    /// Recompute the spectrum. Buffers of the wrong length are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Normalize so a full-scale sine peaks near 0 dB
        let scale = 2.0 / self.window.iter().sum::<f32>().max(1.0);
        for (point, &index) in self.spectrum.iter_mut().zip(&self.bin_indices) {
            let magnitude = self.scratch[index].norm() * scale;
            point.1 = (20.0 * (magnitude.max(1e-6) as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

/// Render the spectrum with harmonic markers for `fundamental` (Hz), if any
pub fn render_spectrum(
    frame: &mut Frame,
    area: Rect,
    analyzer: &SpectrumAnalyzer,
    fundamental: Option<f32>,
) {
    let block = Block::default()
        .title(" Spectrum ")
        .borders(Borders::ALL);

    let nyquist = analyzer.sample_rate() / 2.0;
    let markers: Vec<(f64, f64)> = fundamental
        .into_iter()
        .flat_map(|f0| (1..=HARMONIC_MARKERS).map(move |k| f0 * k as f32))
        .filter(|&f| f >= MIN_FREQ && f < nyquist)
        .map(|f| ((f as f64).log10(), -6.0))
        .collect();

    let mut datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(analyzer.data())];
    if !markers.is_empty() {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Yellow))
                .data(&markers),
        );
    }

    let max_x = analyzer.data().last().map_or(4.3, |(x, _)| *x);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([(MIN_FREQ as f64).log10(), max_x])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
